//! Invocation results.
//!
//! A service returns an [`ActionResult`]; the response marshaler turns it into
//! a wire response. [`ActionResult::Deferred`] wraps a computation that has
//! not finished yet; the marshaler awaits it once and propagates its error.

use crate::error::{SwiftError, SwiftResult};
use bytes::Bytes;
use futures_util::future::BoxFuture;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use tokio::io::AsyncRead;

/// A readable byte stream returned by a service.
pub type ByteStream = Pin<Box<dyn AsyncRead + Send>>;

/// What a service returned.
pub enum ActionResult {
    /// Nothing.
    Empty,
    /// Structured data, serialized as JSON.
    Json(Value),
    /// UTF-8 text.
    Text(String),
    /// A binary blob sent as an attachment.
    Blob {
        /// Contents.
        data: Bytes,
        /// Attachment file name.
        file_name: Option<String>,
        /// Content type; defaults to `application/octet-stream`.
        content_type: Option<String>,
    },
    /// A file on disk sent as an attachment if it exists.
    File(PathBuf),
    /// A byte stream copied into the response body.
    Stream(ByteStream),
    /// A complete response passed through untouched.
    Response(http::Response<Bytes>),
    /// A result that is not available yet.
    Deferred(BoxFuture<'static, SwiftResult<ActionResult>>),
}

impl ActionResult {
    /// Serializes `value` into [`ActionResult::Json`].
    ///
    /// `None`-like values serialize to null and therefore marshal as no
    /// content.
    pub fn json<T: Serialize>(value: &T) -> SwiftResult<Self> {
        Ok(Self::Json(serde_json::to_value(value)?))
    }

    /// Wraps plain text.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Wraps a binary blob.
    #[must_use]
    pub fn blob(data: impl Into<Bytes>) -> Self {
        Self::Blob {
            data: data.into(),
            file_name: None,
            content_type: None,
        }
    }

    /// Wraps a file path.
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    /// Wraps a readable stream.
    #[must_use]
    pub fn stream<R>(reader: R) -> Self
    where
        R: AsyncRead + Send + 'static,
    {
        Self::Stream(Box::pin(reader))
    }

    /// Wraps a computation that completes later.
    #[must_use]
    pub fn deferred<F>(future: F) -> Self
    where
        F: Future<Output = SwiftResult<ActionResult>> + Send + 'static,
    {
        Self::Deferred(Box::pin(future))
    }

    /// Short variant name for logs.
    #[must_use]
    pub const fn variant(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Json(_) => "json",
            Self::Text(_) => "text",
            Self::Blob { .. } => "blob",
            Self::File(_) => "file",
            Self::Stream(_) => "stream",
            Self::Response(_) => "response",
            Self::Deferred(_) => "deferred",
        }
    }

    /// Awaits one level of deferral.
    ///
    /// A deferred result resolving to another deferred result is an error.
    pub async fn resolve(self) -> SwiftResult<Self> {
        match self {
            Self::Deferred(future) => match future.await? {
                Self::Deferred(_) => Err(SwiftError::internal(
                    "deferred result resolved to another deferred result",
                )),
                ready => Ok(ready),
            },
            ready => Ok(ready),
        }
    }
}

impl fmt::Debug for ActionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(value) => f.debug_tuple("Json").field(value).finish(),
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::File(path) => f.debug_tuple("File").field(path).finish(),
            Self::Blob {
                data, file_name, ..
            } => f
                .debug_struct("Blob")
                .field("len", &data.len())
                .field("file_name", file_name)
                .finish(),
            other => f.write_str(other.variant()),
        }
    }
}

impl From<Value> for ActionResult {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<String> for ActionResult {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<()> for ActionResult {
    fn from((): ()) -> Self {
        Self::Empty
    }
}
