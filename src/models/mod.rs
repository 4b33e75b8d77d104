pub mod task;
pub mod user;

pub use task::{sort_tasks, SortBy, SortDirection, Task, TaskForm, TaskQuery, TaskStatus, TaskView};
pub use user::{Role, User};
