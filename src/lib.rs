//! `dockhand` - query encoding and stream monitoring for container-engine
//! HTTP API clients.
//!
//! This crate is the part of an engine SDK that is easy to get subtly wrong:
//! - declarative query-string encoding with required-field validation,
//!   zero-value omission and pluggable value converters
//! - the engine's nested `filters` JSON convention
//! - monitoring of unbounded JSON message streams (pull/push progress,
//!   engine events) with cooperative cancellation
//!
//! The HTTP stack is yours: implement [`Transport`] over it and hand the
//! client a streaming body.
//!
//! ## Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use dockhand::{CancelToken, Client, Transport, params::ImagesCreateParameters};
//! # async fn demo(transport: Arc<dyn Transport>) -> dockhand::Result<()> {
//! let client = Client::builder(transport).api_version("1.41").build();
//!
//! let cancel = CancelToken::new();
//! let params = ImagesCreateParameters::pull("alpine", "3.19");
//! let outcome = client
//!     .create_image(&params, |msg: dockhand::types::ProgressMessage| {
//!         println!("{:?}: {:?}", msg.id, msg.status);
//!     }, &cancel)
//!     .await?;
//! println!("pull finished: {outcome:?}");
//! # Ok(()) }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cancel;
mod client;
mod transport;

pub mod error;
pub mod monitor;
pub mod params;
pub mod query;
pub mod request;
pub mod types;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use cancel::CancelToken;
pub use client::{Client, ClientBuilder, ClientOptions};
pub use error::{Error, ErrorKind, Result};
pub use monitor::{
    MessageSink, MessageStream, MonitorOptions, MonitorOutcome, StreamMonitor, UnifiedSink,
};
pub use query::{QueryParameters, encode_filters, encode_query};
pub use request::{ApiRequest, Method};
pub use transport::{AsyncBody, ResponseBody, Transport};
pub use types::StreamMessage;
