//! Foundation module - Core utilities shared by the session and its backends
//!
//! - Frame pacing
//! - Logging utilities

pub mod logging;
pub mod time;
