use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Authorization tier for a user. Stored as lowercase text in the `role`
/// column; anything unrecognized degrades to `User`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn parse(value: &str) -> Self {
        match value {
            "admin" => Role::Admin,
            _ => Role::User,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    /// Whether a user holding this role may act where `required` is demanded.
    /// Admins satisfy every requirement.
    pub fn satisfies(self, required: Role) -> bool {
        match required {
            Role::User => true,
            Role::Admin => self == Role::Admin,
        }
    }
}

/// A registered user as stored in the `users` table.
///
/// Usernames are unique, case-sensitive, and immutable; there is no rename,
/// profile-edit, or delete route. The password is only ever stored as a
/// bcrypt digest.
#[derive(Debug, Serialize, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
}

impl User {
    pub fn role(&self) -> Role {
        Role::parse(&self.role)
    }
}
