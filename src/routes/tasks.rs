use actix_web::{get, post, web, HttpRequest, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

use crate::auth::policy::{self, Operation};
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::flash::{self, Flash};
use crate::models::{sort_tasks, SortBy, SortDirection, Task, TaskForm, TaskQuery, TaskView};
use crate::routes::render;

/// The shared task list with derived status and display deadline.
///
/// Tasks are read fresh from the store on every call and the sort/filter
/// policy is applied against today's UTC date, also taken fresh.
///
/// ## Query parameters
/// - `sort_by`: `deadline` (default), `status`, `overdue`, `today`;
///   unrecognized values fall back to `deadline`.
/// - `sort_direction`: `asc` (default) or `desc`.
#[get("/dashboard")]
pub async fn dashboard(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    query: web::Query<TaskQuery>,
    req: HttpRequest,
) -> Result<impl Responder, AppError> {
    policy::authorize(&pool, user.0, Operation::ListTasks).await?;

    let tasks = sqlx::query_as::<_, Task>(
        "SELECT id, title, description, deadline, completed FROM tasks",
    )
    .fetch_all(&**pool)
    .await?;

    let sort_by = SortBy::parse(query.sort_by.as_deref());
    let direction = SortDirection::parse(query.sort_direction.as_deref());
    let today = Utc::now().date_naive();

    let tasks: Vec<TaskView> = sort_tasks(tasks, sort_by, direction, today)
        .into_iter()
        .map(|task| TaskView::from_task(task, today))
        .collect();

    Ok(render(
        &req,
        "dashboard",
        json!({
            "tasks": tasks,
            "sort_by": sort_by.as_str(),
            "sort_direction": direction.as_str(),
        }),
    ))
}

#[get("/add")]
pub async fn add_task_page(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    req: HttpRequest,
) -> Result<impl Responder, AppError> {
    policy::authorize(&pool, user.0, Operation::AddTask).await?;
    Ok(render(&req, "add_task", json!({})))
}

/// Create a task. Admin only.
///
/// Fails back to the form with a flash message when the title is empty or
/// the deadline is not a `YYYY-MM-DD` date. New tasks start incomplete.
#[post("/add")]
pub async fn add_task(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    form: web::Form<TaskForm>,
) -> Result<impl Responder, AppError> {
    policy::authorize(&pool, user.0, Operation::AddTask).await?;

    if form.validate().is_err() {
        return Ok(flash::redirect("/add", Flash::InvalidTask));
    }
    let deadline = match form.parse_deadline() {
        Ok(deadline) => deadline,
        Err(_) => return Ok(flash::redirect("/add", Flash::InvalidTask)),
    };

    sqlx::query("INSERT INTO tasks (title, description, deadline) VALUES ($1, $2, $3)")
        .bind(&form.title)
        .bind(form.normalized_description())
        .bind(deadline)
        .execute(&**pool)
        .await?;

    Ok(flash::redirect("/dashboard", Flash::TaskAdded))
}

/// Delete a task. Admin only; unknown ids land back on the dashboard with a
/// flash message.
#[get("/delete/{id}")]
pub async fn delete_task(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    task_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    policy::authorize(&pool, user.0, Operation::DeleteTask).await?;

    let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
        .bind(task_id.into_inner())
        .execute(&**pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Task not found".into()));
    }

    Ok(flash::redirect("/dashboard", Flash::TaskDeleted))
}

/// Flip a task's completion flag. Any authenticated user.
///
/// The flip is a single statement, so concurrent toggles on the same id are
/// last-write-wins with no partial state.
#[get("/update_status/{id}")]
pub async fn toggle_task(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    task_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    policy::authorize(&pool, user.0, Operation::ToggleTask).await?;

    let updated = sqlx::query_scalar::<_, i32>(
        "UPDATE tasks SET completed = NOT completed WHERE id = $1 RETURNING id",
    )
    .bind(task_id.into_inner())
    .fetch_optional(&**pool)
    .await?;

    if updated.is_none() {
        return Err(AppError::NotFound("Task not found".into()));
    }

    Ok(flash::redirect_to("/dashboard"))
}
