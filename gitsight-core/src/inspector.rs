//! Read-only repository inspector
//!
//! Ties the object store, ref store, walker and flattener together behind
//! the entry points the command line front end uses.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::flatten::TreeFlattener;
use crate::object::{CommitLogEntry, Object, ObjectId};
use crate::refs::{Branch, RefStore};
use crate::storage::{LooseObjectStore, ObjectStore};
use crate::walk::CommitWalker;

/// Inspector configuration
#[derive(Debug, Clone, Default)]
pub struct InspectorConfig {
    /// Re-hash every object read and reject content that does not match its id
    pub verify_hashes: bool,
}

/// Entry points over one Git directory
pub struct Inspector<S = LooseObjectStore> {
    store: S,
    refs: RefStore,
}

impl Inspector<LooseObjectStore> {
    /// Open the `.git` directory at `git_dir`
    pub fn open(git_dir: impl AsRef<Path>, config: &InspectorConfig) -> Self {
        let git_dir = git_dir.as_ref();
        tracing::debug!(
            "opening git directory {} (verify hashes: {})",
            git_dir.display(),
            config.verify_hashes
        );
        let store = LooseObjectStore::open(git_dir).with_verification(config.verify_hashes);
        Self::with_store(store, git_dir.to_path_buf())
    }
}

impl<S: ObjectStore> Inspector<S> {
    /// Inspector over an arbitrary object store, reading refs from `git_dir`
    pub fn with_store(store: S, git_dir: PathBuf) -> Self {
        Self {
            store,
            refs: RefStore::new(git_dir),
        }
    }

    /// Decode any object by id
    pub fn decode_object(&self, id: &ObjectId) -> Result<Object> {
        self.store.read_object(id)
    }

    /// History starting at `tip` in log order
    pub fn log(&self, tip: ObjectId) -> Result<Vec<CommitLogEntry>> {
        CommitWalker::new(&self.store).walk(tip)
    }

    /// History of a local branch
    pub fn log_branch(&self, branch: &str) -> Result<Vec<CommitLogEntry>> {
        let tip = self.refs.branch_tip(branch)?;
        self.log(tip)
    }

    /// Every file path in the snapshot of `commit`, sorted
    pub fn list_paths(&self, commit: &ObjectId) -> Result<Vec<String>> {
        let commit = self.store.read_commit(commit)?;
        TreeFlattener::new(&self.store).sorted_paths(commit.tree)
    }

    pub fn list_branches(&self) -> Result<Vec<Branch>> {
        self.refs.list_branches()
    }

    pub fn branch_tip(&self, branch: &str) -> Result<ObjectId> {
        self.refs.branch_tip(branch)
    }
}
