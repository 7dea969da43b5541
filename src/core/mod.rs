//! Ambient plumbing shared by every tracer component

pub mod config;
pub mod error;
pub mod exit_codes;
pub mod logger;
pub mod timeout;
