use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use thiserror::Error;

use crate::store::TelemetryLog;

/// Which half of the reading store a device belongs to
#[derive(
    AsRefStr,
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    EnumString,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Devices reported through `sense` statements
    Sensor,
    /// Devices reported through `actuate` statements
    Actuator,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Sensor, Category::Actuator];
}

/// Timestamp convention of a log.
///
/// Older logs are read as raw tick counts; newer tooling reports the same
/// ticks as seconds by dividing by one million. The convention is never
/// detected from the data, it is chosen when the parser is built.
#[derive(
    AsRefStr,
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    EnumString,
    Eq,
    PartialEq,
    Serialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TimeScale {
    /// Integer tick counts as written in the file
    #[default]
    Ticks,
    /// Ticks divided by 1,000,000 (seconds)
    Microseconds,
}

impl TimeScale {
    /// Ticks per reported unit
    pub fn divisor(&self) -> f64 {
        match self {
            TimeScale::Ticks => 1.0,
            TimeScale::Microseconds => 1_000_000.0,
        }
    }

    /// Convert a raw tick count into the reported time unit
    #[inline]
    pub fn apply(&self, ticks: u64) -> f64 {
        ticks as f64 / self.divisor()
    }

    /// Unit label used by exports and the CLI
    pub fn unit(&self) -> &'static str {
        match self {
            TimeScale::Ticks => "ticks",
            TimeScale::Microseconds => "s",
        }
    }
}

/// Kind of input anomaly found while parsing
#[derive(AsRefStr, Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
pub enum DiagnosticKind {
    /// First token of a top-level line is not an integer timestamp
    UnrecognizedLine,
    /// Timestamp with nothing after it
    MissingVerb,
    /// `create` without an argument
    ShortCreate,
    /// `create` with an argument other than `binfile`
    UnknownCreate,
    /// `actuate`/`sense` without a device name
    EmptyDevice,
    /// Block entry that does not split into exactly `key:value`
    MalformedPair,
    /// Block entry whose value is not a number
    NonNumericValue,
}

/// A malformed-input report. Parsing always continues past these.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// 1-based physical line number in the source file
    pub line: usize,
    /// Timestamp of the statement being processed, or the last one seen
    pub timestamp: Option<u64>,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.timestamp {
            Some(ts) => write!(f, "line {} (t={}): {}", self.line, ts, self.message),
            None => write!(f, "line {}: {}", self.line, self.message),
        }
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Errors surfaced by loading, parsing and querying telemetry logs
#[derive(Debug, Error)]
pub enum TlogError {
    /// Failed to open or map the log file
    #[error("Failed to read log file {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The cursor was advanced past the last token line
    #[error("Read past end of input at line index {position}")]
    CursorExhausted { position: usize },

    /// Query named a device that never appeared in the log
    #[error("No {category} device named '{device}'")]
    DeviceNotFound { category: Category, device: String },

    /// Query named a measurement the device never reported
    #[error("{category} device '{device}' has no measurement '{measurement}'")]
    MeasurementNotFound {
        category: Category,
        device: String,
        measurement: String,
    },
}

/// Trait for log file parsers
pub trait Parseable {
    fn parse(&self, data: &str) -> Result<TelemetryLog, TlogError>;
}
