//! Messages carried by streaming response bodies.

mod event;
mod progress;

pub use event::{Actor, EventMessage};
pub use progress::{ErrorDetail, ProgressDetail, ProgressMessage};

/// Any message a monitor can deliver.
///
/// Both variants share one wire format (a bare JSON object), so which one a
/// frame decodes into is decided by the endpoint being monitored, never by the
/// frame's contents.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamMessage {
    /// Image pull/push/import progress.
    Progress(ProgressMessage),
    /// Engine event.
    Event(EventMessage),
}

impl From<ProgressMessage> for StreamMessage {
    fn from(msg: ProgressMessage) -> Self {
        Self::Progress(msg)
    }
}

impl From<EventMessage> for StreamMessage {
    fn from(msg: EventMessage) -> Self {
        Self::Event(msg)
    }
}
