//! Error types for fluxloop-env operations.
//!
//! This module defines [`FluxError`], the primary error type used throughout
//! the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Discovery gaps are never errors; they are recorded as descriptor notes
//! - Use `FluxError` for conditions a top-level command reports to the user
//! - Use `anyhow::Error` (via `FluxError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for fluxloop-env operations.
#[derive(Debug, Error)]
pub enum FluxError {
    /// Failed to parse a settings file.
    #[error("Failed to parse settings at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// A setting has a value that cannot be used.
    #[error("Invalid setting '{key}': {message}")]
    InvalidSetting { key: String, message: String },

    /// No explicit directory, active project, or workspace folder is available.
    #[error("Select a FluxLoop project to continue.")]
    NoProjectSelected,

    /// The resolution root does not exist as a directory.
    #[error("No environment: source root does not exist: {root}")]
    NoEnvironment { root: PathBuf },

    /// Referenced project is not registered.
    #[error("Unknown project: {id}")]
    UnknownProject { id: String },

    /// An external tool exited non-zero or could not be spawned.
    #[error("{tool} failed: {stderr}")]
    ToolFailed { tool: String, stderr: String },

    /// An external tool printed something other than the expected JSON.
    #[error("Unable to parse {tool} output: {message}")]
    MalformedToolOutput { tool: String, message: String },

    /// A prerequisite for an integration flow is missing.
    #[error("{message}")]
    Prerequisite { message: String },

    /// No OpenAI API key was configured.
    #[error("OpenAI API key is required to run Flux Agent.")]
    MissingApiKey,

    /// The chat completion endpoint returned an error.
    #[error("OpenAI API error: {message}")]
    ChatCompletion { message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for fluxloop-env operations.
pub type Result<T> = std::result::Result<T, FluxError>;
