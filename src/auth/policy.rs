//! Authorization policy.
//!
//! One table decides which role, if any, each operation demands; the single
//! [`authorize`] function consults it before dispatch. Route handlers never
//! compare roles themselves.

use sqlx::PgPool;

use crate::error::AppError;
use crate::models::user::{Role, User};

/// Every operation the service exposes after authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListTasks,
    AddTask,
    DeleteTask,
    ToggleTask,
    Logout,
}

/// The role an operation demands beyond an authenticated session.
/// `None` means any authenticated user may perform it.
pub fn required_role(operation: Operation) -> Option<Role> {
    match operation {
        Operation::AddTask | Operation::DeleteTask => Some(Role::Admin),
        Operation::ListTasks | Operation::ToggleTask | Operation::Logout => None,
    }
}

/// Checks that the session user may perform `operation`.
///
/// The session binds only a user id, so the role is read fresh from the
/// store. A session whose user no longer exists is treated as anonymous.
pub async fn authorize(
    pool: &PgPool,
    user_id: i32,
    operation: Operation,
) -> Result<(), AppError> {
    let required = match required_role(operation) {
        Some(role) => role,
        None => return Ok(()),
    };

    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, password_hash, role FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    match user {
        Some(user) if user.role().satisfies(required) => Ok(()),
        Some(user) => Err(AppError::Forbidden(format!(
            "user {} lacks the {} role",
            user.username,
            required.as_str()
        ))),
        None => Err(AppError::Unauthorized("session user no longer exists".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_mutations_demand_admin() {
        assert_eq!(required_role(Operation::AddTask), Some(Role::Admin));
        assert_eq!(required_role(Operation::DeleteTask), Some(Role::Admin));
        assert_eq!(required_role(Operation::ListTasks), None);
        assert_eq!(required_role(Operation::ToggleTask), None);
        assert_eq!(required_role(Operation::Logout), None);
    }
}
