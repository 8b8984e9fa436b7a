//! CLI support for the tsax binary.

pub mod args;
pub mod config;
pub mod driver;
pub mod tracing_init;
