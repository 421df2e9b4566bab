//! HTTP transport: the reqwest client and the response-body reader seam.

pub mod http;

pub use http::{HttpTransport, ReqwestBodyReader};

use bytes::Bytes;

/// Failures that happen before a complete HTTP status is available, or while
/// the body is being read.
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request cancelled")]
    Cancelled,

    #[error("Transport error: {0}")]
    Other(String),
}

/// Pull-based access to a response body.
///
/// Each `read` yields the bytes of one network read, `Ok(None)` once the body is
/// exhausted. `release` gives the underlying connection back; the owning
/// [`ReaderGuard`](crate::pipeline::ReaderGuard) calls it exactly once.
#[async_trait::async_trait]
pub trait BodyReader: Send {
    async fn read(&mut self) -> Result<Option<Bytes>, NetworkError>;

    fn release(&mut self) -> Result<(), NetworkError> {
        Ok(())
    }
}
