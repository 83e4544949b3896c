//! Shared building blocks for the Southmain client crates.
//!
//! Logging setup, wall-clock helpers and API endpoint configuration.

pub mod config;
pub mod logger;
pub mod time;
