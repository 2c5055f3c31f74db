//! Domain types exchanged with the orchestration service

use heat_probe_common::ResourceStatus;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Handle on a stack: Heat addresses stacks by `name/id`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackRef {
    pub id: String,
    pub name: String,
}

impl StackRef {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Canonical `stacks/{name}/{id}` path
    pub fn path(&self) -> String {
        format!("stacks/{}/{}", self.name, self.id)
    }
}

impl std::fmt::Display for StackRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.name, self.id)
    }
}

/// One provisioned unit inside a stack
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StackResource {
    /// Unique within the stack
    #[serde(rename = "resource_name")]
    pub name: String,
    /// Heat type tag, e.g. `OS::Cinder::Volume`
    #[serde(rename = "resource_type")]
    pub resource_type: String,
    /// Id in the owning service; Heat sends `""` before the resource exists
    #[serde(
        rename = "physical_resource_id",
        default,
        deserialize_with = "empty_as_none"
    )]
    pub physical_id: Option<String>,
    #[serde(rename = "resource_status")]
    pub status: ResourceStatus,
    /// Names of resources that depend on this one
    #[serde(default)]
    pub required_by: Vec<String>,
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

/// Stack creation request body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateStackRequest {
    pub stack_name: String,
    pub parameters: BTreeMap<String, String>,
    /// Template text, sent verbatim
    pub template: String,
    /// Files referenced by the template (`get_file`)
    pub files: BTreeMap<String, String>,
    pub environment: BTreeMap<String, String>,
    pub timeout_mins: u64,
}
