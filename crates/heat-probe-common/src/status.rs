//! Stack and resource status parsing
//!
//! Heat reports stack status as a single `<ACTION>_<STATE>` string such as
//! `CREATE_IN_PROGRESS` or `DELETE_FAILED`. The probe only cares about the
//! state half; the action is kept for logging.

use serde::Deserialize;
use std::fmt;

/// State half of a Heat stack status
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StackState {
    /// Operation still running
    InProgress,
    /// Operation finished successfully
    Complete,
    /// Operation failed
    Failed,
    /// Any other state Heat may report (e.g. `SUSPENDED`)
    Other(String),
}

impl StackState {
    pub fn parse(s: &str) -> Self {
        match s {
            "IN_PROGRESS" => Self::InProgress,
            "COMPLETE" => Self::Complete,
            "FAILED" => Self::Failed,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::InProgress => "IN_PROGRESS",
            Self::Complete => "COMPLETE",
            Self::Failed => "FAILED",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for StackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed stack status with its optional reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackStatus {
    /// Action half, e.g. `CREATE` or `DELETE` (empty if Heat sent no action)
    pub action: String,
    pub state: StackState,
    /// Free-form explanation from Heat (`stack_status_reason`)
    pub reason: Option<String>,
}

impl StackStatus {
    /// Parse a Heat `stack_status` string, splitting at the first underscore.
    pub fn parse(stack_status: &str, reason: Option<String>) -> Self {
        let (action, state) = match stack_status.split_once('_') {
            Some((action, state)) => (action, state),
            None => ("", stack_status),
        };

        Self {
            action: action.to_string(),
            state: StackState::parse(state),
            reason: reason.filter(|r| !r.is_empty()),
        }
    }

    /// Status of a stack that no longer exists
    pub fn deleted() -> Self {
        Self {
            action: "DELETE".to_string(),
            state: StackState::Complete,
            reason: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.state == StackState::Complete
    }

    pub fn is_in_progress(&self) -> bool {
        self.state == StackState::InProgress
    }
}

impl fmt::Display for StackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.action.is_empty() {
            write!(f, "{}", self.state)
        } else {
            write!(f, "{}_{}", self.action, self.state)
        }
    }
}

/// Status of a single stack resource
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum ResourceStatus {
    CreateComplete,
    DeleteComplete,
    DeleteFailed,
    /// Any other in-progress or failed state
    Other(String),
}

impl ResourceStatus {
    pub fn parse(s: &str) -> Self {
        match s {
            "CREATE_COMPLETE" => Self::CreateComplete,
            "DELETE_COMPLETE" => Self::DeleteComplete,
            "DELETE_FAILED" => Self::DeleteFailed,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::CreateComplete => "CREATE_COMPLETE",
            Self::DeleteComplete => "DELETE_COMPLETE",
            Self::DeleteFailed => "DELETE_FAILED",
            Self::Other(s) => s,
        }
    }

    pub fn is_delete_failed(&self) -> bool {
        *self == Self::DeleteFailed
    }
}

impl From<String> for ResourceStatus {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
