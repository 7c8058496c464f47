// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Every route in this tier sits behind `jwt_auth_middleware`; handlers take
// `AuthUser` as an argument and scope their queries by its `user_id`.
pub mod documents;
pub mod posts;
pub mod users;
