//! Integration flows built on captured command runs.
//!
//! Everything here talks to the outside world through
//! [`CommandRunner`](crate::dispatch::CommandRunner) and, for Flux Agent,
//! an OpenAI-compatible chat endpoint.

pub mod agent;
pub mod chat;
pub mod service;
pub mod status;

pub use agent::{compose_prompt, select_lines, truncate, FluxAgent, PromptInput, Suggestion};
pub use chat::{resolve_api_key, ChatClient, ChatMessage};
pub use service::IntegrationService;
pub use status::{require, StatusState, SystemStatus};
