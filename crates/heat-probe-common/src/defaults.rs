//! Default configuration values shared between the library and the CLI
//!
//! These constants keep the probe's timing contract in one place.

use std::time::Duration;

/// Default budget for stack creation, in seconds
pub const DEFAULT_CREATE_TIMEOUT: u64 = 120;

/// Default budget for stack deletion, in seconds
pub const DEFAULT_DELETE_TIMEOUT: u64 = 45;

/// Interval between two stack status polls
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Wait after each delete / force-delete request on a stuck resource
pub const FORCE_DELETE_GRACE: Duration = Duration::from_secs(15);

/// Pause between create completion and the deletion request
pub const SETTLE_DELAY: Duration = Duration::from_secs(10);

/// Prefix for generated stack names
pub const STACK_NAME_PREFIX: &str = "check_heat-stack-";

/// Parameter name the looked-up image id is passed as
pub const IMAGE_ID_PARAMETER: &str = "image_id";

/// Returns the default create timeout as a `Duration`
pub fn default_create_timeout() -> Duration {
    Duration::from_secs(DEFAULT_CREATE_TIMEOUT)
}

/// Returns the default delete timeout as a `Duration`
pub fn default_delete_timeout() -> Duration {
    Duration::from_secs(DEFAULT_DELETE_TIMEOUT)
}
