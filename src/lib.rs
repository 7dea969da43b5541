//! Deptrace - Static dependency tracing and refactor planning
//!
//! Answers, for a component-based source tree, what a file depends on,
//! what depends on it, and where it should move if it is relocated.
//! Works from a persisted file-level dependency index.

pub mod cli;
pub mod core;
pub mod trace;

pub use core::config::Config;
pub use core::error::{Error, Result};
pub use trace::{TraceOutcome, TraceRequest, TraceResult, Tracer};
