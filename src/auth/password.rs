use crate::error::ApiError;

/// Hash a password with bcrypt on the blocking pool.
pub async fn hash_password(password: String, cost: u32) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| {
            tracing::error!("password hashing task failed: {}", e);
            ApiError::internal_server_error("Failed to process password")
        })?
        .map_err(|e| {
            tracing::error!("bcrypt hash error: {}", e);
            ApiError::internal_server_error("Failed to process password")
        })
}

/// Check a password against a stored bcrypt hash. A malformed hash counts as a mismatch.
pub async fn verify_password(password: String, hash: String) -> Result<bool, ApiError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash).unwrap_or(false))
        .await
        .map_err(|e| {
            tracing::error!("password verification task failed: {}", e);
            ApiError::internal_server_error("Failed to process password")
        })
}
