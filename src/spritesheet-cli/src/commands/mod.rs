//! Command handlers for the spritesheet CLI
//!
//! Each subcommand has its own module with a `handle` function.

pub mod configure;
pub mod export;
pub mod extract;
pub mod pack;
pub mod stats;
