//! HTTP transport for the phonebook service.
//!
//! The router decodes and validates requests, then hands typed messages to the
//! core [`Mediator`](phonebook_core::Mediator).

pub mod config;
pub mod error;
pub mod routes;

pub use config::ServerConfig;
pub use error::{ApiError, ErrorResponse};
pub use routes::{AppState, BASE_PATH, build_router};
