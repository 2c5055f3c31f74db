//! Configuration types for the probe

use heat_probe_common::defaults::{
    default_create_timeout, default_delete_timeout, SETTLE_DELAY,
};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Invalid probe configuration. Always reported as UNKNOWN.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Property {0} must be in format key=value")]
    InvalidProperty(String),

    #[error("Cannot read template {}: {source}", .path.display())]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("The {0} timeout must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("--image-name requires an image service endpoint")]
    MissingImageEndpoint,
}

/// What to create
#[derive(Debug, Clone)]
pub struct StackConfig {
    /// Fixed stack name; a fresh name is generated when absent
    pub name: Option<String>,
    /// Path to the Heat template
    pub template: PathBuf,
    /// Template parameters, keys lowercased
    pub parameters: BTreeMap<String, String>,
    /// Image to resolve and pass as the `image_id` parameter
    pub image_name: Option<String>,
}

/// Service endpoints and credentials
#[derive(Clone)]
pub struct EndpointConfig {
    /// Pre-issued keystone token
    pub token: String,
    /// Tenant-scoped orchestration endpoint
    pub heat_url: String,
    /// Tenant-scoped compute endpoint
    pub compute_url: String,
    /// Tenant-scoped block storage endpoint
    pub volume_url: String,
    /// Image service endpoint, only needed for `--image-name`
    pub image_url: Option<String>,
}

impl fmt::Debug for EndpointConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointConfig")
            .field("token", &"<redacted>")
            .field("heat_url", &self.heat_url)
            .field("compute_url", &self.compute_url)
            .field("volume_url", &self.volume_url)
            .field("image_url", &self.image_url)
            .finish()
    }
}

/// Time budgets
#[derive(Debug, Clone)]
pub struct Timeouts {
    pub create: Duration,
    pub delete: Duration,
    /// Pause between create completion and deletion
    pub settle: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            create: default_create_timeout(),
            delete: default_delete_timeout(),
            settle: SETTLE_DELAY,
        }
    }
}

impl Timeouts {
    /// Build from CLI seconds, rejecting zero budgets.
    pub fn from_secs(create: u64, delete: u64) -> Result<Self, ConfigError> {
        if create == 0 {
            return Err(ConfigError::ZeroTimeout("create"));
        }
        if delete == 0 {
            return Err(ConfigError::ZeroTimeout("delete"));
        }
        Ok(Self {
            create: Duration::from_secs(create),
            delete: Duration::from_secs(delete),
            ..Default::default()
        })
    }

    /// Heat's own create timeout, in whole minutes (at least one)
    pub fn create_timeout_mins(&self) -> u64 {
        self.create.as_secs().div_ceil(60).max(1)
    }
}

/// Runtime behavior flags
#[derive(Debug, Clone, Default)]
pub struct RuntimeFlags {
    /// Tear down a pre-existing stack of the same name instead of failing
    pub force_delete: bool,
    /// Number of `-v` given
    pub verbose: u8,
}

/// Configuration for one probe run
///
/// Composed of focused sub-configs. Fields are accessible both through the
/// sub-configs and through flat accessors.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub stack: StackConfig,
    pub endpoints: EndpointConfig,
    pub timeouts: Timeouts,
    pub flags: RuntimeFlags,
}

impl ProbeConfig {
    pub fn stack_name(&self) -> Option<&str> {
        self.stack.name.as_deref()
    }
    pub fn template(&self) -> &Path {
        &self.stack.template
    }
    pub fn image_name(&self) -> Option<&str> {
        self.stack.image_name.as_deref()
    }

    pub fn create_timeout(&self) -> Duration {
        self.timeouts.create
    }
    pub fn delete_timeout(&self) -> Duration {
        self.timeouts.delete
    }

    pub fn force_delete(&self) -> bool {
        self.flags.force_delete
    }

    /// Cross-field checks that clap cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stack.image_name.is_some() && self.endpoints.image_url.is_none() {
            return Err(ConfigError::MissingImageEndpoint);
        }
        Ok(())
    }
}

/// Parse repeated `key=value` entries into a map with lowercased keys.
///
/// Each entry must contain exactly one `=`. Later entries win.
pub fn parse_properties<S: AsRef<str>>(
    properties: &[S],
) -> Result<BTreeMap<String, String>, ConfigError> {
    let mut parsed = BTreeMap::new();

    for property in properties {
        let property = property.as_ref();
        let mut parts = property.split('=');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(key), Some(value), None) => {
                parsed.insert(key.to_lowercase(), value.to_string());
            }
            _ => return Err(ConfigError::InvalidProperty(property.to_string())),
        }
    }

    Ok(parsed)
}

/// Read the template file verbatim.
pub fn load_template(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::TemplateRead {
        path: path.to_path_buf(),
        source,
    })
}
