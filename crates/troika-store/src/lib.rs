//! # troika-store
//!
//! SQLite-backed record store for tasks and users.
//!
//! The selection engine treats storage as an opaque collaborator; this crate
//! is the local implementation of that collaborator. All writes go through a
//! single mutex-guarded connection, which gives the engine the "store
//! serializes writes to a single record" guarantee it assumes.

#![deny(unsafe_code)]

pub mod database;
pub mod error;
pub mod row_helpers;
pub mod schema;
pub mod tasks;
pub mod users;

pub use database::Database;
pub use error::StoreError;
pub use tasks::{CategoryCounts, TaskRepo};
pub use users::{UserRepo, UserRow};
