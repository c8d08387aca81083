//! # troika-engine
//!
//! The display-selection engine and task lifecycle state machine.
//!
//! - [`select`]: pool-size-adaptive fair selection — never-shown tasks
//!   first, then least-exposed, with no immediate repeats while
//!   alternatives exist
//! - [`display`]: per-user memory of the previous selection
//! - [`lifecycle`]: valid category transitions, completion, deletion
//! - [`views`]: the orchestration that ties store, tracker, and selection
//!   together per request
//!
//! The engine holds no durable state. Everything in-process lives in the
//! [`display::DisplayTracker`]; losing it (process restart) resets fairness
//! history but breaks nothing.

#![deny(unsafe_code)]

pub mod display;
pub mod error;
pub mod lifecycle;
pub mod select;
pub mod views;

pub use display::DisplayTracker;
pub use error::EngineError;
pub use lifecycle::{MoveOutcome, TaskLifecycle};
pub use select::{select, RegimeWeights, SelectionConfig};
pub use views::{NowView, TierView, ViewEngine};
