//! CLI command implementations.

pub mod app;
