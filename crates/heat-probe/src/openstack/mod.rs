//! OpenStack client modules for the probe
//!
//! This module provides thin HTTP clients for:
//! - Heat: stack lifecycle and resource listing
//! - Nova: server delete / force-delete
//! - Cinder: volume delete / force-delete
//! - Glance: image name lookup
//!
//! Authentication is not handled here: every client sends a pre-issued
//! token held by [`OpenStackContext`].

pub mod compute;
pub mod context;
pub mod error;
pub mod heat;
pub mod image;
pub mod operations;
pub mod types;
pub mod volume;

// Core clients
pub use compute::ComputeClient;
pub use context::{OpenStackContext, RetryPolicy};
pub use heat::HeatClient;
pub use image::ImageClient;
pub use volume::VolumeClient;

// Operation traits
pub use operations::{ForceDeleteOperations, ImageLookup, StackOperations};

// Error handling
pub use error::{classify_status, ApiError};

pub use types::{CreateStackRequest, StackRef, StackResource};
