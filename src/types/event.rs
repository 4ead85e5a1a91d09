use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The object an engine event is about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Id of the container, image, network, ...
    #[serde(rename = "ID", default)]
    pub id: String,

    /// Free-form attributes (container name, image, exit code, ...).
    #[serde(rename = "Attributes", default)]
    pub attributes: HashMap<String, String>,
}

/// An engine event as streamed by `GET /events`.
///
/// Older engines only fill the lower-case `status`/`id`/`from` fields; newer
/// ones add `Type`, `Action` and `Actor`. Every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMessage {
    /// Deprecated action name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Deprecated target id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Deprecated origin (image of a container event).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,

    /// Object type: `container`, `image`, `network`, ...
    #[serde(rename = "Type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// What happened: `create`, `start`, `die`, `pull`, ...
    #[serde(rename = "Action", default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,

    /// Target of the event.
    #[serde(rename = "Actor", default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<Actor>,

    /// `local` or `swarm`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Unix timestamp in seconds.
    #[serde(default)]
    pub time: i64,

    /// Unix timestamp in nanoseconds.
    #[serde(rename = "timeNano", default)]
    pub time_nano: i64,
}

impl EventMessage {
    /// Action name, falling back to the deprecated `status` field.
    #[must_use]
    pub fn action(&self) -> Option<&str> {
        self.action.as_deref().or(self.status.as_deref())
    }

    /// Target id, falling back to the deprecated `id` field.
    #[must_use]
    pub fn target_id(&self) -> Option<&str> {
        match &self.actor {
            Some(actor) if !actor.id.is_empty() => Some(actor.id.as_str()),
            _ => self.id.as_deref(),
        }
    }
}
