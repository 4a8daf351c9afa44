//! HTTP server module.
//!
//! Serves plain HTTP; TLS is terminated by the hosting platform in front of
//! the process. The server shuts down gracefully on SIGTERM/SIGINT.

mod server;
mod shutdown;

pub use server::{start_server, ServerError};
pub use shutdown::shutdown_signal;
