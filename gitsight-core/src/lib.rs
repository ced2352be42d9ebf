//! Gitsight Core Library
//!
//! Read-only inspection of a Git object store:
//! - Object model (Blob, Tree, Commit)
//! - Loose object storage with zlib inflation
//! - Object decoding
//! - Commit history walking with merge-parent ordering
//! - Tree flattening into file paths
//! - Branch references

pub mod decode;
pub mod error;
pub mod flatten;
pub mod inspector;
pub mod object;
pub mod refs;
pub mod storage;
pub mod walk;

pub use decode::{ByteCursor, decode};
pub use error::{DecodeError, Error, Result};
pub use flatten::TreeFlattener;
pub use inspector::{Inspector, InspectorConfig};
pub use object::{
    Blob, Commit, CommitLogEntry, Object, ObjectHeader, ObjectId, ObjectKind, Signature, Tree,
    TreeEntry,
};
pub use refs::{Branch, RefStore};
pub use storage::{LooseObjectStore, MemoryObjectStore, ObjectStore};
pub use walk::CommitWalker;
