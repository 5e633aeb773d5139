use serde::Serialize;
use utoipa::ToSchema;

use super::role::Role;

/// A registered account. `password` holds the argon2 PHC string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub password: String,
    pub role: Role,
    /// Set only for employees; always points at a user with role=manager.
    pub manager_id: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub role: Role,
    pub manager_id: Option<u64>,
}

/// Public projection of a user, without the credential hash.
#[derive(Debug, Serialize, ToSchema)]
#[schema(example = json!({
    "id": 3,
    "username": "employee_one",
    "role": "employee",
    "manager_id": 1
}))]
pub struct UserView {
    #[schema(example = 3)]
    pub id: u64,
    #[schema(example = "employee_one")]
    pub username: String,
    pub role: Role,
    #[schema(example = 1)]
    pub manager_id: Option<u64>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
            manager_id: user.manager_id,
        }
    }
}
