// handlers/public/auth/mod.rs - Public authentication handlers
//
// Token acquisition endpoints that do not require authentication.

use serde::Serialize;

use crate::database::models::UserProfile;

pub mod login;    // POST /api/auth/login - authenticate and get JWT
pub mod register; // POST /api/auth/register - create account and get JWT

pub use login::login;
pub use register::register;

/// Issued token plus the account it belongs to
#[derive(Debug, Serialize)]
pub struct AuthSession {
    pub token: String,
    pub expires_in: i64,
    pub user: UserProfile,
}
