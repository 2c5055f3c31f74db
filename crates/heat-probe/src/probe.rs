//! End-to-end probe run: create a stack, wait for it, tear it down.
//!
//! Every path ends in an [`Outcome`]; nothing here exits the process.

use crate::config::ProbeConfig;
use crate::openstack::{
    ApiError, CreateStackRequest, ForceDeleteOperations, ImageLookup, StackOperations, StackRef,
};
use crate::teardown::{DeletionOutcome, Teardown, TeardownConfig, TeardownError};
use crate::wait::{wait_for_completion, PollConfig, PollResult};
use heat_probe_common::defaults::{IMAGE_ID_PARAMETER, STACK_NAME_PREFIX};
use heat_probe_common::Outcome;
use std::collections::BTreeMap;
use tokio::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

/// Service handles used by a probe run
pub struct ProbeClients<'a, S, C, V, I> {
    pub stacks: &'a S,
    pub servers: &'a C,
    pub volumes: &'a V,
    /// Only needed when an image name is configured
    pub images: Option<&'a I>,
}

/// One probe run over a loaded template
pub struct Probe<'a, S, C, V, I> {
    clients: ProbeClients<'a, S, C, V, I>,
    config: &'a ProbeConfig,
    template: String,
    poll: PollConfig,
    teardown_config: TeardownConfig,
}

impl<'a, S, C, V, I> Probe<'a, S, C, V, I>
where
    S: StackOperations,
    C: ForceDeleteOperations,
    V: ForceDeleteOperations,
    I: ImageLookup,
{
    pub fn new(
        clients: ProbeClients<'a, S, C, V, I>,
        config: &'a ProbeConfig,
        template: String,
    ) -> Self {
        Self {
            clients,
            config,
            template,
            poll: PollConfig::with_timeout(config.create_timeout()),
            teardown_config: TeardownConfig::with_timeout(config.delete_timeout()),
        }
    }

    fn teardown(&self) -> Teardown<'_, S, C, V> {
        Teardown::new(
            self.clients.stacks,
            self.clients.servers,
            self.clients.volumes,
            self.teardown_config.clone(),
        )
    }

    /// Run the full lifecycle and classify the result.
    pub async fn run(&self) -> Outcome {
        let mut parameters = self.config.stack.parameters.clone();
        if let Some(image) = self.config.image_name() {
            match self.resolve_image(image).await {
                Ok(id) => {
                    parameters.insert(IMAGE_ID_PARAMETER.to_string(), id);
                }
                Err(outcome) => return outcome,
            }
        }

        let stack_name = match self.config.stack_name() {
            Some(name) => {
                if let Err(outcome) = self.clear_existing(name).await {
                    return outcome;
                }
                name.to_string()
            }
            None => generated_stack_name(),
        };

        let start = Instant::now();
        let stack = match self.create(stack_name, parameters).await {
            Ok(stack) => stack,
            Err(outcome) => return outcome,
        };

        tokio::time::sleep(self.config.timeouts.settle).await;

        match self.teardown().delete_stack(&stack).await {
            Ok(DeletionOutcome::Deleted { .. }) => {
                let elapsed = start.elapsed().as_secs();
                info!(stack = %stack, elapsed_secs = elapsed, "Probe succeeded");
                Outcome::ok(format!("Stack creation and deletion took {elapsed} seconds"))
            }
            Ok(DeletionOutcome::ForceDeleted { .. }) => {
                Outcome::warning("Stack needed to be force deleted")
            }
            Err(e) => teardown_failure(e),
        }
    }

    async fn resolve_image(&self, name: &str) -> Result<String, Outcome> {
        let Some(images) = self.clients.images else {
            return Err(Outcome::unknown(
                "--image-name requires an image service endpoint",
            ));
        };

        match images.find_image_id(name).await {
            Ok(Some(id)) => {
                info!(image = %name, image_id = %id, "Resolved image");
                Ok(id)
            }
            Ok(None) => Err(Outcome::critical(format!("Cannot find the image {name}"))),
            Err(e) => Err(Outcome::critical(format!(
                "Cannot find the image {name} ({e})"
            ))),
        }
    }

    /// Fail on a stack that already holds our name, or tear it down when
    /// forced. Any non-clean teardown ends the probe.
    async fn clear_existing(&self, name: &str) -> Result<(), Outcome> {
        let existing = self
            .clients
            .stacks
            .find_stack(name)
            .await
            .map_err(creation_error)?;

        let Some(existing) = existing else {
            return Ok(());
        };

        if !self.config.force_delete() {
            return Err(Outcome::critical(format!("Stack {name} already exists")));
        }

        info!(stack = %existing, "Deleting pre-existing stack");
        match self.teardown().delete_stack(&existing).await {
            Ok(DeletionOutcome::Deleted { .. }) => Ok(()),
            Ok(DeletionOutcome::ForceDeleted { .. }) => {
                Err(Outcome::warning("Stack needed to be force deleted"))
            }
            Err(e) => Err(teardown_failure(e)),
        }
    }

    /// Create the stack and wait for it. A stack that was accepted but did
    /// not come up is torn down before the failure is reported.
    async fn create(
        &self,
        stack_name: String,
        parameters: BTreeMap<String, String>,
    ) -> Result<StackRef, Outcome> {
        let request = CreateStackRequest {
            stack_name,
            parameters,
            template: self.template.clone(),
            files: BTreeMap::new(),
            environment: BTreeMap::new(),
            timeout_mins: self.config.timeouts.create_timeout_mins(),
        };

        let stack = self
            .clients
            .stacks
            .create_stack(request)
            .await
            .map_err(creation_error)?;

        let created = wait_for_completion(
            &self.poll,
            || self.clients.stacks.stack_status(&stack),
            "stack creation",
        )
        .await;

        let failure = match created {
            Ok(PollResult::Complete { elapsed }) => {
                info!(stack = %stack, elapsed_secs = elapsed.as_secs(), "Stack created");
                return Ok(stack);
            }
            Ok(PollResult::Failed(failed)) => {
                Outcome::critical(format!("Error while creating the Heat stack: {failed}"))
            }
            Ok(PollResult::TimedOut { .. }) => Outcome::critical("Stack creation took too long"),
            Err(e) => creation_error(e),
        };

        warn!(stack = %stack, error = %failure.message, "Stack creation failed, cleaning up");
        if let Err(e) = self.teardown().delete_stack(&stack).await {
            warn!(stack = %stack, error = %e, "Cleanup after failed creation failed");
        }

        Err(failure)
    }
}

/// Name for a probe stack when none is configured
pub fn generated_stack_name() -> String {
    format!("{STACK_NAME_PREFIX}{}", Uuid::new_v4())
}

fn creation_error(e: ApiError) -> Outcome {
    Outcome::critical(format!("Error while creating the Heat stack: {e}"))
}

fn teardown_failure(e: TeardownError) -> Outcome {
    Outcome::critical(e.to_string())
}
