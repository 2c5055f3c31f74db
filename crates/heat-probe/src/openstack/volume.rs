//! Block storage (Cinder) API client

use super::context::{join_url, OpenStackContext};
use super::error::ApiError;
use super::operations::ForceDeleteOperations;
use serde_json::json;
use tracing::debug;

/// Cinder client limited to volume removal
#[derive(Debug, Clone)]
pub struct VolumeClient {
    ctx: OpenStackContext,
    endpoint: String,
}

impl VolumeClient {
    /// Create a Cinder client from a shared context and the tenant-scoped
    /// block storage endpoint.
    pub fn from_context(ctx: &OpenStackContext, endpoint: impl Into<String>) -> Self {
        Self {
            ctx: ctx.clone(),
            endpoint: endpoint.into(),
        }
    }

    fn volume_url(&self, id: &str) -> String {
        join_url(&self.endpoint, &format!("volumes/{id}"))
    }
}

impl ForceDeleteOperations for VolumeClient {
    async fn delete(&self, id: &str) -> Result<(), ApiError> {
        debug!(volume_id = %id, "Deleting volume");
        self.ctx
            .send(self.ctx.delete(&self.volume_url(id)), "volume", id)
            .await?;
        Ok(())
    }

    async fn force_delete(&self, id: &str) -> Result<(), ApiError> {
        debug!(volume_id = %id, "Force deleting volume");
        let url = format!("{}/action", self.volume_url(id));
        self.ctx
            .send(
                self.ctx.post(&url).json(&json!({ "os-force_delete": {} })),
                "volume",
                id,
            )
            .await?;
        Ok(())
    }
}
