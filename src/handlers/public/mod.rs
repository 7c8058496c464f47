// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition, liveness, and read-only access to the community feed.
pub mod auth;
pub mod health;
pub mod posts;
