//! Object storage layer for gitsight
//!
//! Resolves object ids to inflated payloads. The loose store reads the
//! `objects/xx/yyyy...` layout of a Git directory; the memory store backs
//! tests and tooling that synthesise objects on the fly.

use flate2::read::ZlibDecoder;
use std::collections::HashMap;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::decode::decode;
use crate::error::{Error, Result};
use crate::object::{Commit, Object, ObjectId, ObjectKind, Tree};

/// Generic object store interface
///
/// Every backend hands out the full inflated payload, header included.
pub trait ObjectStore {
    /// Get the inflated bytes of an object
    fn read_raw(&self, id: &ObjectId) -> Result<Vec<u8>>;

    /// Read and decode an object of any kind
    fn read_object(&self, id: &ObjectId) -> Result<Object> {
        let raw = self.read_raw(id)?;
        let (_, object) = decode(&raw).map_err(|e| Error::decode(*id, e))?;
        Ok(object)
    }

    /// Read an object that must be a commit
    fn read_commit(&self, id: &ObjectId) -> Result<Commit> {
        match self.read_object(id)? {
            Object::Commit(commit) => Ok(commit),
            other => Err(Error::UnexpectedKind {
                id: *id,
                expected: ObjectKind::Commit,
                actual: other.kind(),
            }),
        }
    }

    /// Read an object that must be a tree
    fn read_tree(&self, id: &ObjectId) -> Result<Tree> {
        match self.read_object(id)? {
            Object::Tree(tree) => Ok(tree),
            other => Err(Error::UnexpectedKind {
                id: *id,
                expected: ObjectKind::Tree,
                actual: other.kind(),
            }),
        }
    }
}

impl<S: ObjectStore + ?Sized> ObjectStore for &S {
    fn read_raw(&self, id: &ObjectId) -> Result<Vec<u8>> {
        (**self).read_raw(id)
    }
}

/// Loose object store over a `.git` directory
///
/// Layout on disk:
/// ```text
/// {git_dir}/
///   objects/{hash[0..2]}/{hash[2..]}  — one zlib stream per object
/// ```
#[derive(Debug, Clone)]
pub struct LooseObjectStore {
    objects_dir: PathBuf,
    verify_hashes: bool,
}

impl LooseObjectStore {
    /// Open the object directory of a Git directory
    pub fn open(git_dir: impl AsRef<Path>) -> Self {
        Self {
            objects_dir: git_dir.as_ref().join("objects"),
            verify_hashes: false,
        }
    }

    /// Re-hash every inflated payload and reject mismatches
    pub fn with_verification(mut self, verify: bool) -> Self {
        self.verify_hashes = verify;
        self
    }

    /// Path of the loose file holding `id`
    pub fn object_path(&self, id: &ObjectId) -> PathBuf {
        let hex = id.to_hex();
        self.objects_dir.join(&hex[..2]).join(&hex[2..])
    }
}

impl ObjectStore for LooseObjectStore {
    fn read_raw(&self, id: &ObjectId) -> Result<Vec<u8>> {
        let path = self.object_path(id);
        tracing::trace!("reading loose object {} from {}", id, path.display());

        let compressed = match fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(Error::NotFound(*id)),
            Err(e) => return Err(Error::Io(e)),
        };

        let raw = inflate(&compressed).map_err(|source| Error::CorruptObject { id: *id, source })?;

        if self.verify_hashes {
            let actual = ObjectId::from_data(&raw);
            if actual != *id {
                return Err(Error::HashMismatch {
                    expected: *id,
                    actual,
                });
            }
        }

        Ok(raw)
    }
}

/// Inflate a complete zlib stream, failing on truncation or bad data
pub fn inflate(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    ZlibDecoder::new(data).read_to_end(&mut out)?;
    Ok(out)
}

/// In-memory object store keyed by id
#[derive(Debug, Clone, Default)]
pub struct MemoryObjectStore {
    objects: HashMap<ObjectId, Vec<u8>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frame `body` as an object of `kind`, store it and return its id
    pub fn insert(&mut self, kind: ObjectKind, body: &[u8]) -> ObjectId {
        let mut raw = format!("{} {}\0", kind, body.len()).into_bytes();
        raw.extend_from_slice(body);
        let id = ObjectId::from_data(&raw);
        self.objects.insert(id, raw);
        id
    }

    /// Store an already framed payload under an arbitrary id
    pub fn insert_raw(&mut self, id: ObjectId, raw: Vec<u8>) {
        self.objects.insert(id, raw);
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl ObjectStore for MemoryObjectStore {
    fn read_raw(&self, id: &ObjectId) -> Result<Vec<u8>> {
        self.objects.get(id).cloned().ok_or(Error::NotFound(*id))
    }
}
