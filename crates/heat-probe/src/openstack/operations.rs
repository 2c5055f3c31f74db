//! Service operation traits
//!
//! These traits abstract the OpenStack clients so that the teardown and
//! probe logic can be exercised without a cloud.

use super::error::ApiError;
use super::types::{CreateStackRequest, StackRef, StackResource};
use heat_probe_common::StackStatus;

/// Operations on the orchestration service.
#[allow(async_fn_in_trait)] // Internal use only, Send+Sync bounds on trait are sufficient
#[cfg_attr(test, mockall::automock)]
pub trait StackOperations: Send + Sync {
    /// Find a stack by exact name
    async fn find_stack(&self, name: &str) -> Result<Option<StackRef>, ApiError>;

    /// Request stack creation; returns once Heat has accepted the request
    async fn create_stack(&self, request: CreateStackRequest) -> Result<StackRef, ApiError>;

    /// Current status of a stack
    async fn stack_status(&self, stack: &StackRef) -> Result<StackStatus, ApiError>;

    /// Request stack deletion; returns once Heat has accepted the request
    async fn delete_stack(&self, stack: &StackRef) -> Result<(), ApiError>;

    /// Resources currently owned by a stack
    async fn list_resources(&self, stack: &StackRef) -> Result<Vec<StackResource>, ApiError>;
}

/// Delete and force-delete on a backing service (compute or block storage).
#[allow(async_fn_in_trait)]
#[cfg_attr(test, mockall::automock)]
pub trait ForceDeleteOperations: Send + Sync {
    /// Regular delete request
    async fn delete(&self, id: &str) -> Result<(), ApiError>;

    /// Privileged delete that bypasses state checks
    async fn force_delete(&self, id: &str) -> Result<(), ApiError>;
}

/// Image lookup on the image service.
#[allow(async_fn_in_trait)]
#[cfg_attr(test, mockall::automock)]
pub trait ImageLookup: Send + Sync {
    /// Id of the first image with this exact name
    async fn find_image_id(&self, name: &str) -> Result<Option<String>, ApiError>;
}
