use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Byte progress of a layer download/upload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressDetail {
    /// Bytes transferred so far.
    #[serde(default)]
    pub current: i64,

    /// Total bytes, when known.
    #[serde(default)]
    pub total: i64,
}

/// Structured error attached to a progress record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Engine error code, when provided.
    #[serde(default)]
    pub code: i64,

    /// Error message.
    #[serde(default)]
    pub message: String,
}

/// A progress/status record streamed by image pull, push, build and import.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressMessage {
    /// Layer or image id the record refers to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Status text, e.g. `Downloading` or `Pull complete`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Origin of the record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,

    /// Pre-rendered progress bar.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<String>,

    /// Byte progress.
    #[serde(rename = "progressDetail", default, skip_serializing_if = "Option::is_none")]
    pub progress_detail: Option<ProgressDetail>,

    /// Raw output text (builds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<String>,

    /// Error text reported by the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Structured error.
    #[serde(rename = "errorDetail", default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<ErrorDetail>,

    /// Unix timestamp in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,

    /// Unix timestamp in nanoseconds.
    #[serde(rename = "timeNano", default, skip_serializing_if = "Option::is_none")]
    pub time_nano: Option<i64>,

    /// Auxiliary payload (image digest after a push, build result ids).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aux: Option<Value>,
}

impl ProgressMessage {
    /// Whether the engine reported a failure in this record.
    ///
    /// The stream keeps going after such a record; the monitor delivers it
    /// like any other message and leaves the decision to the sink.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some() || self.error_detail.is_some()
    }

    /// Error text, preferring the structured detail.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error_detail
            .as_ref()
            .map(|detail| detail.message.as_str())
            .filter(|m| !m.is_empty())
            .or(self.error.as_deref())
    }
}
