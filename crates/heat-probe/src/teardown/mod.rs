//! Resilient stack teardown
//!
//! A graceful stack delete is attempted first. If Heat reports the delete
//! as failed, the stack's resources are listed, ordered by dependency, and
//! every `DELETE_FAILED` resource with a forced-removal path is
//! force-deleted before the stack delete is retried once.
//!
//! ## Modules
//!
//! - [`graph`]: Dependency graph built from a resource listing
//! - [`topo`]: Lazy topological order with stall detection
//! - [`force`]: Best-effort delete / force-delete of one resource

pub mod force;
pub mod graph;
pub mod topo;

pub use force::{force_delete_resource, ForceDeletePolicy};
pub use graph::DependencyGraph;
pub use topo::{topological_sort, TopologicalOrder, TopologicalSortFailure};

use crate::openstack::{ApiError, ForceDeleteOperations, StackOperations, StackRef, StackResource};
use crate::wait::{wait_for_completion, FailedOperation, PollConfig, PollResult};
use heat_probe_common::{ResourceKind, StackStatus};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Teardown timing
#[derive(Debug, Clone)]
pub struct TeardownConfig {
    /// Poll settings for each deletion attempt
    pub poll: PollConfig,
    /// Grace waits around forced removal
    pub force: ForceDeletePolicy,
}

impl TeardownConfig {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            poll: PollConfig::with_timeout(timeout),
            force: ForceDeletePolicy::default(),
        }
    }
}

/// Successful teardown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionOutcome {
    /// First delete request succeeded
    Deleted { elapsed: Duration },
    /// Stack only went away after forcing stuck resources
    ForceDeleted {
        elapsed: Duration,
        /// Names of the resources that were force-deleted
        forced: Vec<String>,
    },
}

impl DeletionOutcome {
    pub fn needed_force(&self) -> bool {
        matches!(self, DeletionOutcome::ForceDeleted { .. })
    }
}

/// Failed teardown
#[derive(Debug, Error)]
pub enum TeardownError {
    /// First delete did not finish within budget
    #[error("Stack deletion took too long")]
    TimedOut { elapsed: Duration },

    /// Delete failed and the forced retry failed too.
    ///
    /// Only the first failure is shown; the retry's failure is kept for logs.
    #[error("Error while deleting the Heat stack: {first}")]
    Failed {
        first: FailedOperation,
        retry_error: String,
    },

    /// Stuck resources could not be ordered
    #[error("Error while deleting the Heat stack: {0}")]
    Unordered(#[from] TopologicalSortFailure),

    /// API call failed outside the recovery path
    #[error("Error while deleting the Heat stack: {0}")]
    Api(#[from] ApiError),
}

/// Stack deletion with one forced-recovery attempt
pub struct Teardown<'a, S, C, V> {
    stacks: &'a S,
    servers: &'a C,
    volumes: &'a V,
    config: TeardownConfig,
}

impl<'a, S, C, V> Teardown<'a, S, C, V>
where
    S: StackOperations,
    C: ForceDeleteOperations,
    V: ForceDeleteOperations,
{
    pub fn new(stacks: &'a S, servers: &'a C, volumes: &'a V, config: TeardownConfig) -> Self {
        Self {
            stacks,
            servers,
            volumes,
            config,
        }
    }

    /// Delete a stack, forcing stuck resources if the first attempt fails.
    pub async fn delete_stack(&self, stack: &StackRef) -> Result<DeletionOutcome, TeardownError> {
        let first = match self.request_and_wait(stack).await? {
            PollResult::Complete { elapsed } => {
                info!(stack = %stack, elapsed_secs = elapsed.as_secs(), "Stack deleted");
                return Ok(DeletionOutcome::Deleted { elapsed });
            }
            PollResult::TimedOut { elapsed } => {
                return Err(TeardownError::TimedOut { elapsed });
            }
            PollResult::Failed(first) => first,
        };

        warn!(stack = %stack, error = %first, "Stack deletion failed, forcing stuck resources");

        let resources = match self.stacks.list_resources(stack).await {
            Ok(resources) => resources,
            Err(e) => return Err(second_failure(stack, first, e.to_string())),
        };
        let forced = self.force_stuck_resources(&resources).await?;

        let retry_error = match self.request_and_wait(stack).await {
            Ok(PollResult::Complete { elapsed }) => {
                warn!(
                    stack = %stack,
                    forced = ?forced,
                    elapsed_secs = elapsed.as_secs(),
                    "Stack deleted after forcing stuck resources"
                );
                return Ok(DeletionOutcome::ForceDeleted { elapsed, forced });
            }
            Ok(PollResult::Failed(second)) => second.to_string(),
            Ok(PollResult::TimedOut { .. }) => "Stack deletion took too long".to_string(),
            Err(e) => e.to_string(),
        };

        Err(second_failure(stack, first, retry_error))
    }

    async fn request_and_wait(&self, stack: &StackRef) -> Result<PollResult, ApiError> {
        match self.stacks.delete_stack(stack).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                debug!(stack = %stack, "Stack already gone");
                return Ok(PollResult::Complete {
                    elapsed: Duration::ZERO,
                });
            }
            Err(e) => return Err(e),
        }
        wait_for_completion(
            &self.config.poll,
            || self.deletion_status(stack),
            "stack deletion",
        )
        .await
    }

    /// A stack that has disappeared counts as deleted.
    async fn deletion_status(&self, stack: &StackRef) -> Result<StackStatus, ApiError> {
        match self.stacks.stack_status(stack).await {
            Err(e) if e.is_not_found() => Ok(StackStatus::deleted()),
            other => other,
        }
    }

    /// Walk the dependency order and force-delete every stuck resource
    /// that has a forced-removal path. Returns the names forced.
    async fn force_stuck_resources(
        &self,
        resources: &[StackResource],
    ) -> Result<Vec<String>, TopologicalSortFailure> {
        let by_name: HashMap<&str, &StackResource> =
            resources.iter().map(|r| (r.name.as_str(), r)).collect();
        let graph = DependencyGraph::from_resources(resources);
        debug!(nodes = graph.len(), "Built resource dependency graph");

        let mut forced = Vec::new();
        for name in TopologicalOrder::new(graph) {
            let name = name?;

            // Dependents Heat named but did not list
            let Some(resource) = by_name.get(name.as_str()) else {
                continue;
            };
            if !resource.status.is_delete_failed() {
                continue;
            }

            let Some(kind) = ResourceKind::from_heat_type(&resource.resource_type) else {
                debug!(
                    resource = %resource.name,
                    resource_type = %resource.resource_type,
                    "No forced removal for resource type, skipping"
                );
                continue;
            };
            let Some(id) = resource.physical_id.as_deref() else {
                warn!(resource = %resource.name, "Stuck resource has no physical id, skipping");
                continue;
            };

            match kind {
                ResourceKind::Volume => {
                    force_delete_resource(self.volumes, id, &self.config.force).await
                }
                ResourceKind::Server => {
                    force_delete_resource(self.servers, id, &self.config.force).await
                }
            }
            forced.push(resource.name.clone());
        }

        Ok(forced)
    }
}

fn second_failure(stack: &StackRef, first: FailedOperation, retry_error: String) -> TeardownError {
    warn!(
        stack = %stack,
        first_error = %first,
        retry_error = %retry_error,
        "Forced stack deletion failed"
    );
    TeardownError::Failed { first, retry_error }
}
