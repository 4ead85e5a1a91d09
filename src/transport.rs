//! The seam between this crate and the caller's HTTP stack.

use std::{future::Future, pin::Pin};

use tokio::io::AsyncRead;

use crate::{error::Result, request::ApiRequest};

/// Any async byte source usable as a streaming response body.
pub trait AsyncBody: AsyncRead + Unpin + Send {}
impl<T> AsyncBody for T where T: AsyncRead + Unpin + Send {}

/// A response body.
///
/// Boxed so the rest of the crate does not care which HTTP client (or which
/// socket type) produced it.
pub type ResponseBody = Box<dyn AsyncBody>;

/// Sends requests to the engine.
///
/// Implementations own connection setup, TLS, authentication headers and
/// status-code handling; a non-success status should be mapped to
/// [`crate::Error::Transport`]. The returned body is consumed incrementally
/// and may never end (event streams).
pub trait Transport: Send + Sync {
    /// Send `request` and return the response body.
    fn send<'a>(
        &'a self,
        request: &'a ApiRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ResponseBody>> + Send + 'a>>;
}
