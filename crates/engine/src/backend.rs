//! The remote grid service, as the engine sees it.

use std::fmt;

use sheetdb_protocol::{
    BatchReadRequest, BatchReadResponse, BatchWriteRequest, BatchWriteResponse, GridSnapshot,
};

/// Blocking RPC collaborator holding the authoritative grid.
///
/// Implementations must apply a `batch_write` in op order. Timeouts are the
/// implementation's concern; the engine never cancels a call.
pub trait GridBackend: Send + Sync {
    /// Every sheet with its full cell contents.
    fn load_grid(&self) -> Result<GridSnapshot, BackendError>;

    fn batch_write(&self, request: &BatchWriteRequest) -> Result<BatchWriteResponse, BackendError>;

    /// Values for each requested range, in request order.
    fn batch_read(&self, request: &BatchReadRequest) -> Result<BatchReadResponse, BackendError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Transport failure (connect, timeout, TLS).
    Network(String),
    /// Non-success status with response body.
    Http(u16, String),
    /// Response body could not be decoded.
    Parse(String),
    /// The service refused the request as invalid.
    Rejected(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "network error: {msg}"),
            Self::Http(status, body) => write!(f, "HTTP {status}: {body}"),
            Self::Parse(msg) => write!(f, "parse error: {msg}"),
            Self::Rejected(msg) => write!(f, "rejected: {msg}"),
        }
    }
}

impl std::error::Error for BackendError {}
