//! fluxloop-env CLI entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use fluxloop_env::cli::{Cli, CommandContext, CommandRouter};
use fluxloop_env::config::fluxloop_home;
use fluxloop_env::dispatch::{CommandDispatcher, ShellTerminal};
use fluxloop_env::session::Session;
use fluxloop_env::shell::is_ci;
use fluxloop_env::ui::{create_ui, OutputMode};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is INFO
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("fluxloop_env=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fluxloop_env=info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    tracing::debug!("fluxloop-env starting with args: {:?}", cli);

    let output_mode = OutputMode::from_flags(cli.verbose, cli.quiet);
    if cli.no_color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }
    let mut ui = create_ui(!is_ci(), output_mode, !cli.no_color);

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let session = match Session::load(cli.folders(cwd), cli.overrides()) {
        Ok(session) => session,
        Err(e) => {
            ui.error(&format!("Error: {}", e));
            return ExitCode::from(1);
        }
    };

    let dispatcher = CommandDispatcher::new(session, ShellTerminal::new());
    let mut router = CommandRouter::new(CommandContext::new(dispatcher, fluxloop_home()));

    let outcome = router.dispatch(&cli, ui.as_mut());

    // Interactive launches return immediately; stay alive until they exit.
    let terminal_ok = match router.context_mut().dispatcher.terminal_mut().wait_all() {
        Ok(all_ok) => all_ok,
        Err(e) => {
            ui.error(&format!("Error: {}", e));
            false
        }
    };

    match outcome {
        Ok(result) if result.success && !terminal_ok => ExitCode::from(1),
        Ok(result) => ExitCode::from(result.exit_code.clamp(0, 255) as u8),
        Err(e) => {
            ui.error(&format!("Error: {}", e));
            ExitCode::from(1)
        }
    }
}
