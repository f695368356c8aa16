//! CLI subcommands.

pub mod common;
pub mod config;
pub mod fit;
pub mod replay;
