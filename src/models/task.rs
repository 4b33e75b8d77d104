use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::error::AppError;

/// Derived classification of a task. Never stored; recomputed from
/// `completed` and `deadline` against the current UTC date on every listing.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum TaskStatus {
    Completed,
    Overdue,
    #[serde(rename = "Due Today")]
    DueToday,
    Pending,
}

impl TaskStatus {
    /// Priority rank used by the status sort:
    /// Overdue first, then Due Today, then Pending, Completed last.
    pub fn rank(self) -> u8 {
        match self {
            TaskStatus::Overdue => 1,
            TaskStatus::DueToday => 2,
            TaskStatus::Pending => 3,
            TaskStatus::Completed => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Completed => "Completed",
            TaskStatus::Overdue => "Overdue",
            TaskStatus::DueToday => "Due Today",
            TaskStatus::Pending => "Pending",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A task as stored in the `tasks` table. Tasks are shared across all
/// authenticated users; there is no per-user ownership.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    /// Input accepts a time-of-day, but status and sorting operate on the
    /// date component only.
    pub deadline: DateTime<Utc>,
    pub completed: bool,
}

impl Task {
    /// Derives the task status for the given date.
    ///
    /// Completion overrides the deadline comparison regardless of how far
    /// past or future the deadline is; otherwise the deadline's date
    /// component is compared against `today`.
    pub fn status(&self, today: NaiveDate) -> TaskStatus {
        let deadline_date = self.deadline.date_naive();
        if self.completed {
            TaskStatus::Completed
        } else if deadline_date < today {
            TaskStatus::Overdue
        } else if deadline_date == today {
            TaskStatus::DueToday
        } else {
            TaskStatus::Pending
        }
    }

    /// Display form of the deadline, `DD Mon YY` (e.g. `20 Oct 24`).
    /// Purely cosmetic; sorting and filtering never look at it.
    pub fn formatted_deadline(&self) -> String {
        self.deadline.format("%d %b %y").to_string()
    }
}

/// Form input for creating a task. The deadline arrives as a `YYYY-MM-DD`
/// literal and is validated separately via [`TaskForm::parse_deadline`].
#[derive(Debug, Deserialize, Validate)]
pub struct TaskForm {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    pub deadline: String,
}

impl TaskForm {
    /// Parses the submitted deadline. Creation fails when the value is not a
    /// `YYYY-MM-DD` date; on success the task is stored at midnight UTC.
    pub fn parse_deadline(&self) -> Result<DateTime<Utc>, AppError> {
        let date = NaiveDate::parse_from_str(self.deadline.trim(), "%Y-%m-%d")
            .map_err(|_| AppError::Validation("deadline must be a YYYY-MM-DD date".into()))?;
        let midnight = date.and_hms_opt(0, 0, 0).expect("midnight is a valid time");
        Ok(midnight.and_utc())
    }

    /// Empty descriptions from the form are treated as absent.
    pub fn normalized_description(&self) -> Option<String> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string)
    }
}

/// A task augmented with its derived fields, as handed to the rendering
/// collaborator.
#[derive(Debug, Serialize)]
pub struct TaskView {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub deadline: DateTime<Utc>,
    pub completed: bool,
    pub status: TaskStatus,
    pub formatted_deadline: String,
}

impl TaskView {
    pub fn from_task(task: Task, today: NaiveDate) -> Self {
        let status = task.status(today);
        let formatted_deadline = task.formatted_deadline();
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            deadline: task.deadline,
            completed: task.completed,
            status,
            formatted_deadline,
        }
    }
}

/// Recognized `sort_by` query values. Anything else falls back to the
/// default deadline ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    Deadline,
    Status,
    Overdue,
    Today,
}

impl SortBy {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("status") => SortBy::Status,
            Some("overdue") => SortBy::Overdue,
            Some("today") => SortBy::Today,
            _ => SortBy::Deadline,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortBy::Deadline => "deadline",
            SortBy::Status => "status",
            SortBy::Overdue => "overdue",
            SortBy::Today => "today",
        }
    }
}

/// Sort direction. Only the literal `"desc"` selects descending; every other
/// value is ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("desc") => SortDirection::Desc,
            _ => SortDirection::Asc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Raw query parameters of the dashboard.
#[derive(Debug, Deserialize)]
pub struct TaskQuery {
    pub sort_by: Option<String>,
    pub sort_direction: Option<String>,
}

/// Applies the listing policy to the full task collection.
///
/// - `deadline`: order by the raw deadline value.
/// - `status`: order by priority rank (Overdue, Due Today, Pending,
///   Completed) with deadline as the tie-break; `desc` reverses both keys.
/// - `overdue`: keep incomplete tasks whose deadline date is before `today`,
///   ordered by deadline.
/// - `today`: keep incomplete tasks whose deadline date equals `today`,
///   ordered by deadline.
pub fn sort_tasks(
    mut tasks: Vec<Task>,
    sort_by: SortBy,
    direction: SortDirection,
    today: NaiveDate,
) -> Vec<Task> {
    match sort_by {
        SortBy::Deadline => tasks.sort_by_key(|t| t.deadline),
        SortBy::Status => tasks.sort_by_key(|t| (t.status(today).rank(), t.deadline)),
        SortBy::Overdue => {
            tasks.retain(|t| t.status(today) == TaskStatus::Overdue);
            tasks.sort_by_key(|t| t.deadline);
        }
        SortBy::Today => {
            tasks.retain(|t| !t.completed && t.deadline.date_naive() == today);
            tasks.sort_by_key(|t| t.deadline);
        }
    }
    if direction == SortDirection::Desc {
        tasks.reverse();
    }
    tasks
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn task(id: i32, deadline: &str, completed: bool) -> Task {
        Task {
            id,
            title: format!("task {}", id),
            description: None,
            deadline: date(deadline).and_hms_opt(0, 0, 0).unwrap().and_utc(),
            completed,
        }
    }

    #[test]
    fn test_completion_overrides_deadline() {
        let today = date("2024-10-20");
        // Far past, today, and far future deadlines are all Completed once
        // the flag is set.
        assert_eq!(task(1, "1999-01-01", true).status(today), TaskStatus::Completed);
        assert_eq!(task(2, "2024-10-20", true).status(today), TaskStatus::Completed);
        assert_eq!(task(3, "2099-12-31", true).status(today), TaskStatus::Completed);
    }

    #[test]
    fn test_status_derivation_for_incomplete_tasks() {
        let today = date("2024-10-20");
        assert_eq!(task(1, "2024-10-19", false).status(today), TaskStatus::Overdue);
        assert_eq!(task(2, "2024-10-20", false).status(today), TaskStatus::DueToday);
        assert_eq!(task(3, "2024-10-21", false).status(today), TaskStatus::Pending);
    }

    #[test]
    fn test_status_display_strings() {
        assert_eq!(TaskStatus::Completed.to_string(), "Completed");
        assert_eq!(TaskStatus::Overdue.to_string(), "Overdue");
        assert_eq!(TaskStatus::DueToday.to_string(), "Due Today");
        assert_eq!(TaskStatus::Pending.to_string(), "Pending");
    }

    #[test]
    fn test_due_today_serializes_with_space() {
        let json = serde_json::to_string(&TaskStatus::DueToday).unwrap();
        assert_eq!(json, "\"Due Today\"");
    }

    #[test]
    fn test_formatted_deadline() {
        assert_eq!(task(1, "2024-10-20", false).formatted_deadline(), "20 Oct 24");
        assert_eq!(task(2, "2025-01-01", false).formatted_deadline(), "01 Jan 25");
    }

    #[test]
    fn test_parse_deadline() {
        let form = TaskForm {
            title: "t".to_string(),
            description: None,
            deadline: "2025-01-01".to_string(),
        };
        let parsed = form.parse_deadline().unwrap();
        assert_eq!(parsed.date_naive(), date("2025-01-01"));

        for bad in ["", "tomorrow", "01-01-2025", "2025-13-01", "2025-01-32"] {
            let form = TaskForm {
                title: "t".to_string(),
                description: None,
                deadline: bad.to_string(),
            };
            assert!(
                matches!(form.parse_deadline(), Err(AppError::Validation(_))),
                "{:?} should not parse",
                bad
            );
        }
    }

    #[test]
    fn test_task_form_requires_title() {
        let form = TaskForm {
            title: "".to_string(),
            description: None,
            deadline: "2025-01-01".to_string(),
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_normalized_description_drops_empty() {
        let form = TaskForm {
            title: "t".to_string(),
            description: Some("  ".to_string()),
            deadline: "2025-01-01".to_string(),
        };
        assert_eq!(form.normalized_description(), None);

        let form = TaskForm {
            title: "t".to_string(),
            description: Some(" notes ".to_string()),
            deadline: "2025-01-01".to_string(),
        };
        assert_eq!(form.normalized_description(), Some("notes".to_string()));
    }

    #[test]
    fn test_sort_param_parsing() {
        assert_eq!(SortBy::parse(Some("status")), SortBy::Status);
        assert_eq!(SortBy::parse(Some("overdue")), SortBy::Overdue);
        assert_eq!(SortBy::parse(Some("today")), SortBy::Today);
        assert_eq!(SortBy::parse(Some("deadline")), SortBy::Deadline);
        assert_eq!(SortBy::parse(Some("priority")), SortBy::Deadline);
        assert_eq!(SortBy::parse(None), SortBy::Deadline);

        assert_eq!(SortDirection::parse(Some("desc")), SortDirection::Desc);
        assert_eq!(SortDirection::parse(Some("DESC")), SortDirection::Asc);
        assert_eq!(SortDirection::parse(Some("descending")), SortDirection::Asc);
        assert_eq!(SortDirection::parse(None), SortDirection::Asc);
    }

    #[test]
    fn test_sort_by_deadline() {
        let today = date("2024-10-20");
        let tasks = vec![
            task(1, "2024-10-25", false),
            task(2, "2024-10-01", true),
            task(3, "2024-10-20", false),
        ];

        let asc = sort_tasks(tasks.clone(), SortBy::Deadline, SortDirection::Asc, today);
        assert_eq!(asc.iter().map(|t| t.id).collect::<Vec<_>>(), vec![2, 3, 1]);

        let desc = sort_tasks(tasks, SortBy::Deadline, SortDirection::Desc, today);
        assert_eq!(desc.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 3, 2]);
    }

    #[test]
    fn test_sort_by_status_orders_by_rank() {
        let today = date("2024-10-20");
        let completed = task(1, "2024-10-19", true);
        let overdue = task(2, "2024-10-19", false);
        let due_today = task(3, "2024-10-20", false);
        let pending = task(4, "2024-10-21", false);

        let sorted = sort_tasks(
            vec![completed, pending, due_today, overdue],
            SortBy::Status,
            SortDirection::Asc,
            today,
        );
        assert_eq!(sorted.iter().map(|t| t.id).collect::<Vec<_>>(), vec![2, 3, 4, 1]);
        let statuses: Vec<TaskStatus> = sorted.iter().map(|t| t.status(today)).collect();
        assert_eq!(
            statuses,
            vec![
                TaskStatus::Overdue,
                TaskStatus::DueToday,
                TaskStatus::Pending,
                TaskStatus::Completed,
            ]
        );
    }

    #[test]
    fn test_sort_by_status_breaks_ties_by_deadline() {
        let today = date("2024-10-20");
        let tasks = vec![
            task(1, "2024-10-18", false), // Overdue, later of the two
            task(2, "2024-10-10", false), // Overdue, earlier
        ];

        let asc = sort_tasks(tasks.clone(), SortBy::Status, SortDirection::Asc, today);
        assert_eq!(asc.iter().map(|t| t.id).collect::<Vec<_>>(), vec![2, 1]);

        // desc reverses both the rank and the tie-break key
        let desc = sort_tasks(tasks, SortBy::Status, SortDirection::Desc, today);
        assert_eq!(desc.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_status_desc_puts_completed_first() {
        let today = date("2024-10-20");
        let tasks = vec![
            task(1, "2024-10-19", false), // Overdue
            task(2, "2024-10-01", true),  // Completed
        ];
        let desc = sort_tasks(tasks, SortBy::Status, SortDirection::Desc, today);
        assert_eq!(desc[0].id, 2);
    }

    #[test]
    fn test_overdue_filter_is_date_only_and_skips_completed() {
        let today = date("2024-10-20");
        let tasks = vec![
            task(1, "2024-10-19", false), // overdue
            task(2, "2024-10-19", true),  // completed, excluded
            task(3, "2024-10-20", false), // due today, not overdue
            task(4, "2024-10-25", false), // pending
            task(5, "2024-10-01", false), // overdue, earliest
        ];

        let filtered = sort_tasks(tasks, SortBy::Overdue, SortDirection::Asc, today);
        assert_eq!(filtered.iter().map(|t| t.id).collect::<Vec<_>>(), vec![5, 1]);
    }

    #[test]
    fn test_today_filter() {
        let today = date("2024-10-20");
        let tasks = vec![
            task(1, "2024-10-20", false),
            task(2, "2024-10-20", true), // completed, excluded
            task(3, "2024-10-19", false),
            task(4, "2024-10-21", false),
        ];

        let filtered = sort_tasks(tasks, SortBy::Today, SortDirection::Asc, today);
        assert_eq!(filtered.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_task_view_round_trip() {
        let today = date("2024-12-15");
        let view = TaskView::from_task(task(7, "2025-01-01", false), today);
        assert_eq!(view.id, 7);
        assert_eq!(view.status, TaskStatus::Pending);
        assert_eq!(view.deadline.date_naive(), date("2025-01-01"));
        assert_eq!(view.formatted_deadline, "01 Jan 25");
    }
}
