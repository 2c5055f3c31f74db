//! Orchestration (Heat) API client

use super::context::{decode, join_url, OpenStackContext};
use super::error::ApiError;
use super::operations::StackOperations;
use super::types::{CreateStackRequest, StackRef, StackResource};
use heat_probe_common::StackStatus;
use serde::Deserialize;
use tracing::{debug, info};

const SERVICE: &str = "heat";

#[derive(Debug, Deserialize)]
struct StackList {
    stacks: Vec<StackSummary>,
}

#[derive(Debug, Deserialize)]
struct StackSummary {
    id: String,
    stack_name: String,
}

#[derive(Debug, Deserialize)]
struct CreatedEnvelope {
    stack: CreatedStack,
}

#[derive(Debug, Deserialize)]
struct CreatedStack {
    id: String,
}

#[derive(Debug, Deserialize)]
struct StackEnvelope {
    stack: StackDetail,
}

#[derive(Debug, Deserialize)]
struct StackDetail {
    stack_status: String,
    #[serde(default)]
    stack_status_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResourceList {
    resources: Vec<StackResource>,
}

/// Heat client for stack lifecycle operations
#[derive(Debug, Clone)]
pub struct HeatClient {
    ctx: OpenStackContext,
    endpoint: String,
}

impl HeatClient {
    /// Create a Heat client from a shared context and the tenant-scoped
    /// orchestration endpoint (e.g. `https://heat:8004/v1/<tenant_id>`).
    pub fn from_context(ctx: &OpenStackContext, endpoint: impl Into<String>) -> Self {
        Self {
            ctx: ctx.clone(),
            endpoint: endpoint.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.endpoint, path)
    }
}

impl StackOperations for HeatClient {
    async fn find_stack(&self, name: &str) -> Result<Option<StackRef>, ApiError> {
        let list: StackList = self
            .ctx
            .get_json(&self.url("stacks"), &[("name", name)], SERVICE, "stack", name)
            .await?;

        Ok(list
            .stacks
            .into_iter()
            .find(|s| s.stack_name == name)
            .map(|s| StackRef::new(s.stack_name, s.id)))
    }

    async fn create_stack(&self, request: CreateStackRequest) -> Result<StackRef, ApiError> {
        info!(
            stack = %request.stack_name,
            parameters = request.parameters.len(),
            timeout_mins = request.timeout_mins,
            "Creating stack"
        );

        let response = self
            .ctx
            .send(
                self.ctx.post(&self.url("stacks")).json(&request),
                "stack",
                &request.stack_name,
            )
            .await?;
        let created: CreatedEnvelope = decode(SERVICE, response).await?;

        Ok(StackRef::new(request.stack_name, created.stack.id))
    }

    async fn stack_status(&self, stack: &StackRef) -> Result<StackStatus, ApiError> {
        let envelope: StackEnvelope = self
            .ctx
            .get_json(&self.url(&stack.path()), &[], SERVICE, "stack", &stack.id)
            .await?;

        let status = StackStatus::parse(
            &envelope.stack.stack_status,
            envelope.stack.stack_status_reason,
        );
        debug!(stack = %stack, status = %status, "Fetched stack status");
        Ok(status)
    }

    async fn delete_stack(&self, stack: &StackRef) -> Result<(), ApiError> {
        info!(stack = %stack, "Deleting stack");
        self.ctx
            .send(self.ctx.delete(&self.url(&stack.path())), "stack", &stack.id)
            .await?;
        Ok(())
    }

    async fn list_resources(&self, stack: &StackRef) -> Result<Vec<StackResource>, ApiError> {
        let path = format!("{}/resources", stack.path());
        let list: ResourceList = self
            .ctx
            .get_json(&self.url(&path), &[], SERVICE, "stack", &stack.id)
            .await?;

        debug!(stack = %stack, count = list.resources.len(), "Listed stack resources");
        Ok(list.resources)
    }
}
