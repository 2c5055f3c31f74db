//! Best-effort forced removal of a single stuck resource

use crate::openstack::ForceDeleteOperations;
use heat_probe_common::defaults::FORCE_DELETE_GRACE;
use std::time::Duration;
use tracing::{debug, info};

/// Timing of the delete / force-delete sequence
#[derive(Debug, Clone)]
pub struct ForceDeletePolicy {
    /// Wait after each request for the backing service to converge
    pub grace: Duration,
}

impl Default for ForceDeletePolicy {
    fn default() -> Self {
        Self {
            grace: FORCE_DELETE_GRACE,
        }
    }
}

/// Delete, wait, force-delete, wait.
///
/// Backing services process deletes asynchronously and reject a
/// force-delete issued too early, hence the grace wait between the two.
/// Errors from either request are logged and swallowed so a resource that
/// is already gone, or refuses to go, does not stop its siblings.
pub async fn force_delete_resource<C>(client: &C, id: &str, policy: &ForceDeletePolicy)
where
    C: ForceDeleteOperations,
{
    info!(resource_id = %id, "Force deleting resource");

    if let Err(e) = client.delete(id).await {
        debug!(resource_id = %id, error = %e, "Delete request failed, ignoring");
    }
    tokio::time::sleep(policy.grace).await;

    if let Err(e) = client.force_delete(id).await {
        debug!(resource_id = %id, error = %e, "Force delete request failed, ignoring");
    }
    tokio::time::sleep(policy.grace).await;
}
