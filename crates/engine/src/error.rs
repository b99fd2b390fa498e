use std::fmt;

use sheetdb_core::AddressError;

use crate::backend::BackendError;

/// A name-indexed lookup that did not resolve to exactly one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    NotFound { kind: &'static str, name: String },
    /// More than one entry carries the name. Never resolved first-match-wins.
    Duplicate { kind: &'static str, name: String, count: usize },
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { kind, name } => write!(f, "{kind} '{name}' not found"),
            Self::Duplicate { kind, name, count } => {
                write!(f, "{kind} '{name}' is ambiguous ({count} matches)")
            }
        }
    }
}

impl std::error::Error for LookupError {}

/// Everything a store operation can fail with.
#[derive(Debug)]
pub enum StoreError {
    /// Malformed address, or a range with no A1 form.
    Address(AddressError),
    Lookup(LookupError),
    /// A queued write's baseline no longer matches the mirror.
    Conflict { address: String },
    /// An RPC failed. Earlier RPCs of the same sync are not rolled back.
    Backend { context: &'static str, source: BackendError },
    /// Values larger than the range they are written to.
    InvalidValues { address: String, rows: usize, cols: usize },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address(e) => write!(f, "address error: {e}"),
            Self::Lookup(e) => write!(f, "lookup error: {e}"),
            Self::Conflict { address } => {
                write!(f, "write conflict: {address} changed since the update was queued")
            }
            Self::Backend { context, source } => write!(f, "{context} failed: {source}"),
            Self::InvalidValues { address, rows, cols } => {
                write!(f, "{rows}x{cols} values do not fit in {address}")
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Address(e) => Some(e),
            Self::Lookup(e) => Some(e),
            Self::Backend { source, .. } => Some(source),
            Self::Conflict { .. } | Self::InvalidValues { .. } => None,
        }
    }
}

impl From<AddressError> for StoreError {
    fn from(e: AddressError) -> Self {
        Self::Address(e)
    }
}

impl From<LookupError> for StoreError {
    fn from(e: LookupError) -> Self {
        Self::Lookup(e)
    }
}

impl StoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    pub(crate) fn backend(context: &'static str) -> impl FnOnce(BackendError) -> Self {
        move |source| Self::Backend { context, source }
    }
}
