//! Non-interactive UI for pipes and CI.

use std::collections::HashMap;

use crate::error::{FluxError, Result};

use super::spinner::ProgressSpinner;
use super::theme::FluxTheme;
use super::{OutputMode, Prompt, SpinnerHandle, UserInterface};

const PROMPT_ENV_PREFIX: &str = "FLUXLOOP_PROMPT_";

/// Plain line output. Prompts are answered from `FLUXLOOP_PROMPT_<KEY>`
/// or the prompt default.
pub struct NonInteractiveUI {
    mode: OutputMode,
    theme: FluxTheme,
    env_overrides: HashMap<String, String>,
}

impl NonInteractiveUI {
    pub fn new(mode: OutputMode) -> Self {
        let env_overrides = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .filter(|(k, _)| k.starts_with(PROMPT_ENV_PREFIX))
            .collect();
        Self::with_overrides(mode, env_overrides)
    }

    /// Create with explicit overrides (for testing).
    pub fn with_overrides(mode: OutputMode, overrides: HashMap<String, String>) -> Self {
        Self {
            mode,
            theme: FluxTheme::plain(),
            env_overrides: overrides,
        }
    }
}

impl UserInterface for NonInteractiveUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", msg);
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", self.theme.format_success(msg));
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            eprintln!("{}", self.theme.format_warning(msg));
        }
    }

    fn error(&mut self, msg: &str) {
        eprintln!("{}", self.theme.format_error(msg));
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            println!("{}", self.theme.format_header(title));
        }
    }

    fn key_value(&mut self, key: &str, value: &str) {
        if self.mode.shows_status() {
            println!("{}", self.theme.format_key_value(key, value));
        }
    }

    fn start_spinner(&mut self, _message: &str) -> Box<dyn SpinnerHandle> {
        Box::new(ProgressSpinner::hidden())
    }

    fn select(&mut self, prompt: &Prompt) -> Result<String> {
        let env_key = format!("{}{}", PROMPT_ENV_PREFIX, prompt.key.to_uppercase());
        if let Some(value) = self.env_overrides.get(&env_key) {
            return Ok(value.clone());
        }
        if let Some(default) = &prompt.default {
            return Ok(default.clone());
        }
        Err(FluxError::Prerequisite {
            message: format!(
                "Cannot prompt for '{}' in non-interactive mode (no default value)",
                prompt.key
            ),
        })
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::PromptOption;

    fn prompt(default: Option<&str>) -> Prompt {
        Prompt {
            key: "project".to_string(),
            question: "Select a FluxLoop project".to_string(),
            options: vec![PromptOption::new("agent", "abc")],
            default: default.map(String::from),
        }
    }

    #[test]
    fn select_uses_env_override() {
        let mut overrides = HashMap::new();
        overrides.insert("FLUXLOOP_PROMPT_PROJECT".to_string(), "xyz".to_string());
        let mut ui = NonInteractiveUI::with_overrides(OutputMode::Normal, overrides);
        assert_eq!(ui.select(&prompt(Some("abc"))).unwrap(), "xyz");
    }

    #[test]
    fn select_falls_back_to_default() {
        let mut ui = NonInteractiveUI::with_overrides(OutputMode::Normal, HashMap::new());
        assert_eq!(ui.select(&prompt(Some("abc"))).unwrap(), "abc");
    }

    #[test]
    fn select_without_default_fails() {
        let mut ui = NonInteractiveUI::with_overrides(OutputMode::Normal, HashMap::new());
        let err = ui.select(&prompt(None)).unwrap_err();
        assert!(err.to_string().contains("non-interactive"));
    }

    #[test]
    fn is_never_interactive() {
        let ui = NonInteractiveUI::with_overrides(OutputMode::Quiet, HashMap::new());
        assert!(!ui.is_interactive());
    }
}
