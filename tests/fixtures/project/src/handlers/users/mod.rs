use crate::models::{CreateUser, User, UserList};

/// @apiPath: /users
/// @apiMethod: GET
/// @apiSummary: List users
/// @apiTag: users
/// @apiParametersRef: Pagination
/// @apiResponseRef: UserList
/// @apiErrorStatusCodes: 404, 500
pub async fn list_users() -> UserList {
    unimplemented!()
}

/// @apiPath: /users
/// @apiMethod: POST
/// @apiSummary: Create a user
/// @apiTag: users
/// @apiRequestRef: CreateUser
/// @apiResponseRef: User
/// @apiStatusCode: 201
/// @apiSecurity: bearer
/// @apiErrorStatusCodes: 400, 500
/// @apiCustomErrorRef400: Error
/// @apiCustomErrorDescription400: The user payload is invalid
pub async fn create_user(body: CreateUser) -> User {
    unimplemented!()
}

/// @apiPath: users/{id}
/// @apiMethod: DELETE
/// @apiDescription: Removes the user and every session they own.
/// @apiTag: users
/// @apiParametersRef: UserPath
/// @apiStatusCode: 204
/// @apiDeprecated: true
/// @apiSecurity: oauth, users:write
/// @apiErrorStatusCodes: 404
pub async fn delete_user(id: u64) {}
