//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait. [`CommandRouter`] routes
//! parsed subcommands to them over one shared [`CommandContext`].

pub mod agent;
pub mod check;
pub mod completions;
pub mod env;
pub mod exec;
pub mod project;
pub mod query;
pub mod router;
pub mod run;
pub mod status;

pub use router::{Command, CommandContext, CommandOutcome, CommandRouter};
