//! User-facing output for the CLI.
//!
//! - [`UserInterface`] trait so commands can be tested with [`MockUI`]
//! - [`TerminalUI`] for interactive terminals
//! - [`NonInteractiveUI`] for pipes and CI
//!
//! Diagnostics go through `tracing`; this module is only for what a
//! command reports to the user.

pub mod mock;
pub mod non_interactive;
pub mod output;
pub mod prompts;
pub mod spinner;
pub mod terminal;
pub mod theme;

pub use mock::MockUI;
pub use non_interactive::NonInteractiveUI;
pub use output::OutputMode;
pub use prompts::prompt_select;
pub use spinner::ProgressSpinner;
pub use terminal::{create_ui, TerminalUI};
pub use theme::{should_use_colors, FluxTheme};

use crate::error::Result;

/// Trait for user interface interactions.
pub trait UserInterface {
    fn output_mode(&self) -> OutputMode;

    fn message(&mut self, msg: &str);

    fn success(&mut self, msg: &str);

    fn warning(&mut self, msg: &str);

    /// Errors are shown in every output mode.
    fn error(&mut self, msg: &str);

    fn show_header(&mut self, title: &str);

    /// One `key: value` line of a details block.
    fn key_value(&mut self, key: &str, value: &str);

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle>;

    /// Ask the user to pick one option. Returns the chosen value.
    fn select(&mut self, prompt: &Prompt) -> Result<String>;

    fn is_interactive(&self) -> bool;
}

/// Handle for controlling a spinner.
pub trait SpinnerHandle {
    fn set_message(&mut self, msg: &str);

    fn finish_success(&mut self, msg: &str);

    fn finish_error(&mut self, msg: &str);
}

/// A single-choice prompt.
#[derive(Debug, Clone)]
pub struct Prompt {
    /// Lookup key, also used for `FLUXLOOP_PROMPT_<KEY>` overrides.
    pub key: String,
    pub question: String,
    pub options: Vec<PromptOption>,
    /// Value picked when the user just presses enter.
    pub default: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptOption {
    pub label: String,
    pub value: String,
}

impl PromptOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_option_new() {
        let opt = PromptOption::new("agent (/work/agent)", "a1b2");
        assert_eq!(opt.label, "agent (/work/agent)");
        assert_eq!(opt.value, "a1b2");
    }
}
