//! fluxloop-env - environment resolution and command dispatch for the
//! FluxLoop toolchain.
//!
//! Given a project directory, fluxloop-env finds the Python interpreter,
//! the FluxLoop CLI and the FluxLoop MCP server a command should use, and
//! runs commands through that environment.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Layered settings files and change detection
//! - [`dispatch`] - Interactive and captured command dispatch
//! - [`environment`] - Environment discovery, resolution and caching
//! - [`error`] - Error types and result aliases
//! - [`integration`] - Tool status checks, knowledge search and Flux Agent
//! - [`project`] - Registry of FluxLoop projects
//! - [`session`] - Per-invocation context tying the above together
//! - [`shell`] - Process execution and platform conventions
//! - [`ui`] - Terminal output, spinners and prompts
//!
//! # Example
//!
//! ```
//! use fluxloop_env::environment::{EnvironmentKind, EnvironmentResolver, ExecutionConfiguration};
//!
//! let mut resolver = EnvironmentResolver::new();
//! let descriptor = resolver.resolve(
//!     std::path::Path::new("/definitely/not/here"),
//!     &ExecutionConfiguration::default(),
//! );
//! assert_eq!(descriptor.kind(), EnvironmentKind::Unknown);
//! ```

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod environment;
pub mod error;
pub mod integration;
pub mod project;
pub mod session;
pub mod shell;
pub mod ui;

pub use error::{FluxError, Result};
