//! Execution environment discovery and resolution.
//!
//! Works out which Python interpreter, primary CLI and auxiliary tool to
//! use for a directory. The search order is:
//!
//! 1. Virtual environment directories under the root (`.venv`, `venv`,
//!    `env`, `.env`, `.conda`, then the project's source `.venv`)
//! 2. The global PATH
//! 3. Configured path overrides, applied on top of either
//!
//! The execution mode can skip step 1 or relabel the result.

pub mod cache;
pub mod descriptor;
pub mod discovery;
pub mod manager;
pub mod probe;
pub mod resolver;

pub use cache::{CacheKey, ResolutionCache};
pub use descriptor::{EnvironmentDescriptor, EnvironmentKind, ExecutableSlot, ToolSet};
pub use discovery::{CandidateDir, Discovery};
pub use manager::{
    execution_configuration, resolve_target_root, ChangeEvent, EnvironmentManager,
    SubscriptionId, WorkspaceView,
};
pub use probe::{find_in_dir, find_on_path, parse_system_path, FileProbe, RealFs};
pub use resolver::{EnvironmentCheck, EnvironmentResolver, ExecutionConfiguration};
