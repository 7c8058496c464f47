// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (JWT auth). Routing lives in `crate::routes`.
pub mod public;    // No authentication required (/health, /api/auth/*, post reads)
pub mod protected; // JWT authentication required (/api/users/*, /api/documents/*, likes)

use crate::error::ApiError;

/// Parse a numeric path id, naming the resource in the 400 message.
///
/// Zero and negative ids are rejected here as malformed (400) rather than
/// looked up and reported missing (404).
pub(crate) fn parse_id(raw: &str, resource: &str) -> Result<i64, ApiError> {
    raw.trim()
        .parse::<i64>()
        .ok()
        // BIGSERIAL ids start at 1
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::bad_request(format!("Invalid {} ID", resource)))
}
