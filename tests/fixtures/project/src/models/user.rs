use serde::{Deserialize, Serialize};

/// A registered user.
///
/// @apiDefine: User
#[derive(Debug, Serialize, Deserialize)]
pub struct User {
    #[openapi("required;example:42")]
    pub id: u64,
    #[openapi("required;maxLength:64;minLength:1")]
    pub name: String,
    #[openapi("pattern:^[^@]+@[^@]+$")]
    pub email: Option<String>,
    pub role: Role,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(skip)]
    pub password_hash: String,
}

/// @apiDefine: UserList
#[derive(Debug, Serialize, Deserialize)]
pub struct UserList {
    pub users: Vec<User>,
    #[openapi("minimum:0")]
    pub total: u32,
}

/// @apiDefine: CreateUser
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    #[openapi("required")]
    pub name: String,
    pub role: Role,
    #[openapi("ignored")]
    pub internal_note: String,
}

/// @apiDefine: UserPath
pub struct UserPath {
    #[openapi("in:path;example:42")]
    pub id: u64,
}

/// @apiDefine: Pagination
pub struct Pagination {
    #[openapi("in:query;example:1")]
    pub page: u32,
    #[openapi("in:query;maximum:100")]
    pub limit: u32,
}

/// @apiEnum: Role
#[derive(Debug, Serialize, Deserialize)]
pub enum Role {
    #[openapi("enumValue:admin")]
    Admin,
    #[openapi("enumValue:member")]
    Member,
    #[serde(rename = "guest")]
    Guest,
}

/// Not documented, never emitted.
pub struct Session {
    pub token: String,
}
