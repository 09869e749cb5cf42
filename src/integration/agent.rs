//! Flux Agent: repository analysis plus a chat completion.

use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use super::chat::{ChatClient, ChatMessage};
use super::service::IntegrationService;
use super::status::{require, MCP_STATUS, PYTHON_STATUS};
use crate::config::Settings;
use crate::dispatch::CommandRunner;
use crate::error::{FluxError, Result};

/// Longest file excerpt or selection sent in a prompt, in characters.
pub const MAX_EXCERPT_CHARS: usize = 4000;

const SYSTEM_PROMPT: &str = "You are Flux Agent, an expert developer advocate for FluxLoop SDK.";

/// Cut `text` to `max` characters, marking the cut.
pub fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}\n... [truncated]", &text[..cut]),
        None => text.to_string(),
    }
}

/// Lines `start..=end` of `text`, 1-based. Out of range lines are dropped.
pub fn select_lines(text: &str, start: usize, end: usize) -> String {
    let start = start.max(1);
    text.lines()
        .enumerate()
        .filter(|(i, _)| *i + 1 >= start && *i < end)
        .map(|(_, line)| line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Inputs to [`compose_prompt`].
#[derive(Debug, Clone)]
pub struct PromptInput<'a> {
    pub workspace: &'a Path,
    pub file: &'a Path,
    pub content: &'a str,
    pub selection: &'a str,
    pub workflow: &'a Value,
}

fn relative_to(base: &Path, path: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}

pub fn compose_prompt(input: &PromptInput<'_>) -> String {
    let selection = if input.selection.is_empty() {
        "No explicit selection was provided. Focus on the entire file context.".to_string()
    } else {
        format!("Selected code snippet:\n{}\n", input.selection)
    };
    let workflow =
        serde_json::to_string_pretty(input.workflow).unwrap_or_else(|_| input.workflow.to_string());
    let active_file = format!("Active file: {}", relative_to(input.workspace, input.file));

    [
        "You are Flux Agent, an assistant that helps developers integrate FluxLoop SDK into repositories.",
        "Use the provided repository analysis and edit plan to craft actionable, step-by-step guidance.",
        "",
        &active_file,
        "",
        &selection,
        "",
        "File excerpt (truncated):",
        input.content,
        "",
        "Integration workflow result (JSON):",
        &workflow,
        "",
        "Instructions:",
        "- Provide a concise summary (less than 5 sentences).",
        "- Outline the recommended changes as ordered steps.",
        "- Highlight any critical checks or testing commands.",
        "- Include relevant files or anchors mentioned in the plan.",
        "- Use Markdown formatting (## headings, bullet lists, code blocks).",
    ]
    .join("\n")
}

/// Result of a Flux Agent run.
#[derive(Debug, Clone, Serialize)]
pub struct Suggestion {
    pub query: String,
    pub answer: String,
    pub file_path: PathBuf,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub selection: String,
    pub workflow: Value,
}

/// Runs the integration workflow for a file and asks the chat model for
/// integration guidance.
pub struct FluxAgent<'a> {
    settings: &'a Settings,
}

impl<'a> FluxAgent<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    /// Prerequisites are checked in order: python, the auxiliary tool, a
    /// workspace, then the API key once the workflow has run.
    pub fn run<R: CommandRunner + ?Sized>(
        &self,
        service: &mut IntegrationService<'_, R>,
        file: &Path,
        selection: Option<&str>,
    ) -> Result<Suggestion> {
        let statuses = service.refresh_status();
        require(
            &statuses,
            PYTHON_STATUS,
            "Python environment is not available. Install python3 to continue.",
        )?;
        require(
            &statuses,
            MCP_STATUS,
            "fluxloop-mcp package is not installed. Install it before running Flux Agent.",
        )?;
        let workspace = service.workspace_path().ok_or_else(|| FluxError::Prerequisite {
            message: "Open a FluxLoop project workspace before running Flux Agent.".to_string(),
        })?;

        let text = fs::read_to_string(file)?;
        let content = truncate(&text, MAX_EXCERPT_CHARS);
        let selection = selection
            .filter(|s| !s.is_empty())
            .map(|s| truncate(s, MAX_EXCERPT_CHARS))
            .unwrap_or_default();

        tracing::info!("[Flux Agent] Running integration workflow...");
        let workflow = service.run_integration_workflow(&workspace)?;
        tracing::info!("[Flux Agent] Workflow result received.");

        let chat = ChatClient::from_settings(self.settings)?;
        let prompt = compose_prompt(&PromptInput {
            workspace: &workspace,
            file,
            content: &content,
            selection: &selection,
            workflow: &workflow,
        });

        tracing::info!("[Flux Agent] Requesting suggestion from {}...", chat.model());
        let answer = chat.complete(&[ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)])?;
        tracing::info!("[Flux Agent] Suggestion received.");

        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Suggestion {
            query: format!("Integration suggestion for {}", file_name),
            answer,
            file_path: file.to_path_buf(),
            selection,
            workflow,
        })
    }
}
