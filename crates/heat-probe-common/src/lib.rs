//! heat-probe-common - Shared types and defaults
//!
//! This crate holds the types shared by the probe library and its binary
//! that do not need an HTTP stack: severity reporting, Heat status parsing,
//! the force-deletable resource allow-list and default configuration values.
//!
//! ## Modules
//!
//! - [`defaults`]: Default timeouts, intervals and naming
//! - [`resource_kind`]: Resource types that support forced removal
//! - [`severity`]: Monitoring severity levels and probe outcomes
//! - [`status`]: Stack and resource status parsing

pub mod defaults;
pub mod resource_kind;
pub mod severity;
pub mod status;

// Re-export commonly used types
pub use resource_kind::ResourceKind;
pub use severity::{Outcome, Severity};
pub use status::{ResourceStatus, StackState, StackStatus};
