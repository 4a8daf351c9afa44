//! Collection Creator backend.
//!
//! Two independent pieces of glue around an axum server:
//! - `POST /app/direct-update`, an unauthenticated action that acknowledges
//!   collection updates without performing them (see [`routes::direct_update`])
//! - a keep-alive pinger that keeps a Render free-tier instance awake by
//!   periodically requesting its own `/health` endpoint (see [`keepalive`])

pub mod config;
pub mod error;
pub mod http;
pub mod keepalive;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::*;
