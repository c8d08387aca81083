//! # troika-core
//!
//! Foundation types for the Troika task tracker.
//!
//! This crate provides the shared vocabulary the other troika crates depend on:
//!
//! - **Branded IDs**: [`ids::TaskId`], [`ids::UserId`] as newtypes
//! - **Task model**: [`task::Task`] with its urgency [`task::Category`]
//! - **User settings**: [`settings::UserSettings`] with clamped display limit
//! - **Pagination**: [`page::Page`] windows for the non-urgent tiers
//!
//! ## Crate Position
//!
//! Foundation crate. Depended on by all other troika crates. No I/O.

#![deny(unsafe_code)]

pub mod ids;
pub mod page;
pub mod settings;
pub mod task;
