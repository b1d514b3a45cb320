//! CLI command implementations.

pub mod build;
pub mod check;
pub mod deploy;
pub mod serve;
pub mod start;
