//! Error types shared by the store, decoder and traversals

use std::path::PathBuf;

use crate::object::{ObjectId, ObjectKind};

/// Result type for inspector operations
pub type Result<T> = std::result::Result<T, Error>;

/// Structural problems found while parsing an inflated payload
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed header: {0}")]
    MalformedHeader(String),

    #[error("malformed {kind} object: {reason}")]
    MalformedObject { kind: ObjectKind, reason: String },
}

impl DecodeError {
    pub(crate) fn malformed(kind: ObjectKind, reason: impl Into<String>) -> Self {
        DecodeError::MalformedObject {
            kind,
            reason: reason.into(),
        }
    }
}

/// Errors that can occur while resolving and decoding objects
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid object id {0:?}: expected 40 hex characters")]
    InvalidObjectId(String),

    #[error("object not found: {0}")]
    NotFound(ObjectId),

    #[error("reference not found: {}", .0.display())]
    RefNotFound(PathBuf),

    #[error("corrupt object {id}: {source}")]
    CorruptObject {
        id: ObjectId,
        #[source]
        source: std::io::Error,
    },

    #[error("object {id}: {source}")]
    Decode {
        id: ObjectId,
        #[source]
        source: DecodeError,
    },

    #[error("object {id} is a {actual}, expected a {expected}")]
    UnexpectedKind {
        id: ObjectId,
        expected: ObjectKind,
        actual: ObjectKind,
    },

    #[error("tree {id} contains itself at {path:?}")]
    TreeCycle { id: ObjectId, path: String },

    #[error("hash mismatch: requested {expected}, content hashes to {actual}")]
    HashMismatch {
        expected: ObjectId,
        actual: ObjectId,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn decode(id: ObjectId, source: DecodeError) -> Self {
        Error::Decode { id, source }
    }

    /// True when the error means the object simply is not in the store
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_) | Error::RefNotFound(_))
    }
}
