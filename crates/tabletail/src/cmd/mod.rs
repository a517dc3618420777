//! CLI commands

pub mod describe;
pub mod serve;
