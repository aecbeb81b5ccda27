//! Interchange qualification engine and the service plumbing around it.

pub mod config;
pub mod error;
pub mod qualification;
pub mod telemetry;
