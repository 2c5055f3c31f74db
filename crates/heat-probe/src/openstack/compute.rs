//! Compute (Nova) API client

use super::context::{join_url, OpenStackContext};
use super::error::ApiError;
use super::operations::ForceDeleteOperations;
use serde_json::json;
use tracing::debug;

/// Nova client limited to server removal
#[derive(Debug, Clone)]
pub struct ComputeClient {
    ctx: OpenStackContext,
    endpoint: String,
}

impl ComputeClient {
    /// Create a Nova client from a shared context and the compute endpoint.
    pub fn from_context(ctx: &OpenStackContext, endpoint: impl Into<String>) -> Self {
        Self {
            ctx: ctx.clone(),
            endpoint: endpoint.into(),
        }
    }

    fn server_url(&self, id: &str) -> String {
        join_url(&self.endpoint, &format!("servers/{id}"))
    }
}

impl ForceDeleteOperations for ComputeClient {
    async fn delete(&self, id: &str) -> Result<(), ApiError> {
        debug!(server_id = %id, "Deleting server");
        self.ctx
            .send(self.ctx.delete(&self.server_url(id)), "server", id)
            .await?;
        Ok(())
    }

    async fn force_delete(&self, id: &str) -> Result<(), ApiError> {
        debug!(server_id = %id, "Force deleting server");
        let url = format!("{}/action", self.server_url(id));
        self.ctx
            .send(
                self.ctx.post(&url).json(&json!({ "forceDelete": null })),
                "server",
                id,
            )
            .await?;
        Ok(())
    }
}
