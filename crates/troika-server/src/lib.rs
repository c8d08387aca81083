//! # troika-server
//!
//! JSON HTTP API over the troika engine: views, task actions, settings.
//!
//! The transport is deliberately thin — handlers parse and validate input,
//! call into troika-engine, and map errors onto status codes. No rendering
//! happens here; clients receive structured task data plus pagination
//! metadata.

#![deny(unsafe_code)]

pub mod error;
pub mod handlers;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use server::{build_router, start, ServerConfig, ServerHandle};
