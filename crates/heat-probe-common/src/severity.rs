//! Monitoring severity levels and probe outcomes
//!
//! The probe reports to a Nagios-compatible monitoring system, which reads
//! the process exit code and a single line of output:
//! - `Ok = 0`: Stack was created and deleted within budget
//! - `Warning = 1`: Probe succeeded but needed forceful intervention
//! - `Critical = 2`: Creation or deletion failed or timed out
//! - `Unknown = 3`: Probe could not run (bad arguments or configuration)

use chrono::{DateTime, Utc};

/// Severity levels with their monitoring exit codes
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
    strum::FromRepr,
    strum::AsRefStr,
)]
#[strum(ascii_case_insensitive)]
#[repr(i32)]
pub enum Severity {
    #[strum(serialize = "OK")]
    Ok = 0,
    #[strum(serialize = "WARNING")]
    Warning = 1,
    #[strum(serialize = "CRITICAL")]
    Critical = 2,
    #[strum(serialize = "UNKNOWN")]
    Unknown = 3,
}

impl Severity {
    /// Process exit code for this severity
    pub fn exit_code(self) -> i32 {
        self as i32
    }

    /// Whether the line goes to stderr rather than stdout
    pub fn is_problem(self) -> bool {
        self != Self::Ok
    }
}

/// Final result of one probe run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub severity: Severity,
    pub message: String,
}

impl Outcome {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }

    pub fn ok(message: impl Into<String>) -> Self {
        Self::new(Severity::Ok, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn critical(message: impl Into<String>) -> Self {
        Self::new(Severity::Critical, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(Severity::Unknown, message)
    }

    /// Render the report line.
    ///
    /// OK lines carry only the message; problem lines are stamped with the
    /// UTC time they were reported at, e.g.
    /// `CRITICAL - Stack creation took too long (UTC: 2024-01-01 12:00:00.000000)`.
    pub fn render(&self, at: DateTime<Utc>) -> String {
        if self.severity.is_problem() {
            format!(
                "{} - {} (UTC: {})",
                self.severity,
                self.message.trim_end(),
                at.format("%Y-%m-%d %H:%M:%S%.6f")
            )
        } else {
            format!("{} - {}", self.severity, self.message.trim_end())
        }
    }
}
