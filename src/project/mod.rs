//! Project registry.
//!
//! A project is a directory containing FluxLoop configuration. One project
//! may be active; its source root anchors environment resolution and is
//! the default working directory for dispatched commands.

pub mod registry;

pub use registry::{has_config, project_id, ProjectEntry, ProjectRegistry};
