//! Shared fakes for the probe integration tests
//!
//! `FakeCloud` scripts the orchestration service: stack statuses are
//! replayed in order (the last one repeats) and every call is recorded in a
//! journal shared with the compute and volume fakes, so tests can assert on
//! the exact sequence of remote calls.

#![allow(dead_code)]

use heat_probe::openstack::{
    ApiError, CreateStackRequest, ForceDeleteOperations, ImageLookup, StackOperations, StackRef,
    StackResource,
};
use heat_probe_common::{ResourceStatus, StackStatus};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// Ordered record of remote calls
#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn record(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.entries().iter().filter(|e| e.starts_with(prefix)).count()
    }
}

/// One scripted answer to a status poll
#[derive(Debug, Clone)]
pub enum Step {
    Status(&'static str),
    StatusWithReason(&'static str, &'static str),
    /// The stack is gone (404)
    Gone,
    /// Transport-level failure
    Unavailable,
}

/// Scripted orchestration service
#[derive(Debug, Default)]
pub struct FakeCloud {
    pub journal: Journal,
    existing: Mutex<Option<StackRef>>,
    statuses: Mutex<VecDeque<Step>>,
    resources: Mutex<Vec<StackResource>>,
    fail_create: Mutex<bool>,
    created: Mutex<Vec<CreateStackRequest>>,
}

impl FakeCloud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_statuses(self, steps: impl IntoIterator<Item = Step>) -> Self {
        *self.statuses.lock().unwrap() = steps.into_iter().collect();
        self
    }

    pub fn with_resources(self, resources: Vec<StackResource>) -> Self {
        *self.resources.lock().unwrap() = resources;
        self
    }

    pub fn with_existing(self, name: &str, id: &str) -> Self {
        *self.existing.lock().unwrap() = Some(StackRef::new(name, id));
        self
    }

    pub fn failing_create(self) -> Self {
        *self.fail_create.lock().unwrap() = true;
        self
    }

    pub fn created(&self) -> Vec<CreateStackRequest> {
        self.created.lock().unwrap().clone()
    }

    fn next_step(&self) -> Step {
        let mut steps = self.statuses.lock().unwrap();
        if steps.len() > 1 {
            steps.pop_front().unwrap()
        } else {
            steps.front().cloned().unwrap_or(Step::Gone)
        }
    }
}

impl StackOperations for FakeCloud {
    async fn find_stack(&self, name: &str) -> Result<Option<StackRef>, ApiError> {
        self.journal.record(format!("find {name}"));
        Ok(self.existing.lock().unwrap().clone())
    }

    async fn create_stack(&self, request: CreateStackRequest) -> Result<StackRef, ApiError> {
        self.journal.record(format!("create {}", request.stack_name));
        if *self.fail_create.lock().unwrap() {
            return Err(ApiError::Http {
                status: 400,
                message: "Invalid template".to_string(),
            });
        }
        let stack = StackRef::new(request.stack_name.clone(), "new-id");
        self.created.lock().unwrap().push(request);
        Ok(stack)
    }

    async fn stack_status(&self, stack: &StackRef) -> Result<StackStatus, ApiError> {
        self.journal.record(format!("status {}", stack.id));
        match self.next_step() {
            Step::Status(raw) => Ok(StackStatus::parse(raw, None)),
            Step::StatusWithReason(raw, reason) => {
                Ok(StackStatus::parse(raw, Some(reason.to_string())))
            }
            Step::Gone => Err(ApiError::NotFound {
                resource_type: "stack",
                resource_id: stack.id.clone(),
            }),
            Step::Unavailable => Err(ApiError::Unavailable { status: 503 }),
        }
    }

    async fn delete_stack(&self, stack: &StackRef) -> Result<(), ApiError> {
        self.journal.record(format!("delete {}", stack.id));
        Ok(())
    }

    async fn list_resources(&self, stack: &StackRef) -> Result<Vec<StackResource>, ApiError> {
        self.journal.record(format!("list {}", stack.id));
        Ok(self.resources.lock().unwrap().clone())
    }
}

/// Compute or block storage fake sharing the cloud's journal
#[derive(Debug)]
pub struct FakeService {
    service: &'static str,
    journal: Journal,
}

impl FakeService {
    pub fn new(service: &'static str, journal: &Journal) -> Self {
        Self {
            service,
            journal: journal.clone(),
        }
    }
}

impl ForceDeleteOperations for FakeService {
    async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.journal.record(format!("{} delete {id}", self.service));
        // Stuck resources reject the regular delete
        Err(ApiError::Conflict {
            message: format!("{id} is in an error state"),
        })
    }

    async fn force_delete(&self, id: &str) -> Result<(), ApiError> {
        self.journal
            .record(format!("{} force_delete {id}", self.service));
        Ok(())
    }
}

/// Image service fake
#[derive(Debug, Default)]
pub struct FakeImages(pub HashMap<String, String>);

impl ImageLookup for FakeImages {
    async fn find_image_id(&self, name: &str) -> Result<Option<String>, ApiError> {
        Ok(self.0.get(name).cloned())
    }
}

pub fn resource(
    name: &str,
    resource_type: &str,
    status: ResourceStatus,
    required_by: &[&str],
) -> StackResource {
    StackResource {
        name: name.to_string(),
        resource_type: resource_type.to_string(),
        physical_id: Some(format!("{name}-id")),
        status,
        required_by: required_by.iter().map(|s| s.to_string()).collect(),
    }
}
