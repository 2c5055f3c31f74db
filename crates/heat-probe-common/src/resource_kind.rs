//! Resource types with a known forced-removal path
//!
//! Only two backing services expose a force-delete affordance, so only
//! their resources are eligible for forceful teardown. Every other Heat
//! resource type is left to the stack-level delete.

/// Heat resource types that can be force-deleted
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
pub enum ResourceKind {
    /// Block storage volume (deleted through the volume service)
    #[strum(serialize = "OS::Cinder::Volume")]
    Volume,
    /// Compute instance (deleted through the compute service)
    #[strum(serialize = "OS::Nova::Server")]
    Server,
}

impl ResourceKind {
    /// Look up a Heat resource type on the allow-list.
    ///
    /// Returns `None` for types without a forced-removal path.
    pub fn from_heat_type(resource_type: &str) -> Option<Self> {
        resource_type.parse().ok()
    }
}
