//! Command dispatch.
//!
//! Two ways to run a logical command, with different completion contracts:
//!
//! - [`CommandDispatcher::launch_interactive`] hands a fully assembled
//!   command line to a [`TerminalSink`] and returns immediately
//! - [`CommandRunner::run_captured`] waits for the process and returns its
//!   exit status and output

pub mod dispatcher;
pub mod env;
pub mod quoting;
pub mod sink;

pub use dispatcher::{resolve_executable_path, CommandDispatcher, CommandRunner, TERMINAL_NAME};
pub use env::process_env;
pub use quoting::{build_command_line, quote_argument, quote_executable};
pub use sink::{LaunchRequest, RecordingTerminal, ShellTerminal, TerminalSink};
