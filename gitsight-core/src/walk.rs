//! Commit history walker
//!
//! Linearizes ancestry starting at a tip commit. Along the main line every
//! commit's extra merge parents are listed (tagged as merged ancestors)
//! before the walk continues with its first parent. A merged ancestor's own
//! parents are not expanded further.

use std::collections::HashSet;

use crate::error::Result;
use crate::object::{CommitLogEntry, ObjectId};
use crate::storage::ObjectStore;

/// One traversal over a commit graph
///
/// The visited-set and work stack live for a single [`CommitWalker::walk`]
/// call; each walk starts from a clean context.
pub struct CommitWalker<S> {
    store: S,
    visited: HashSet<ObjectId>,
    stack: Vec<(ObjectId, bool)>,
}

impl<S: ObjectStore> CommitWalker<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            visited: HashSet::new(),
            stack: Vec::new(),
        }
    }

    /// Walk history from `root`, returning commits in log order
    pub fn walk(&mut self, root: ObjectId) -> Result<Vec<CommitLogEntry>> {
        self.visited.clear();
        self.stack.clear();
        self.stack.push((root, false));

        let mut log = Vec::new();
        while let Some((id, is_merged_ancestor)) = self.stack.pop() {
            if !self.visited.insert(id) {
                tracing::debug!("skipping already visited commit {}", id);
                continue;
            }

            let commit = self.store.read_commit(&id)?;

            if !is_merged_ancestor {
                // Popped in reverse: extra parents in order, then the first parent.
                if let Some((first, rest)) = commit.parents.split_first() {
                    self.stack.push((*first, false));
                    self.stack.extend(rest.iter().rev().map(|p| (*p, true)));
                }
            }

            tracing::debug!(
                "visited commit {} (merged: {}, parents: {})",
                id,
                is_merged_ancestor,
                commit.parents.len()
            );
            log.push(CommitLogEntry {
                id,
                commit,
                is_merged_ancestor,
            });
        }

        Ok(log)
    }
}
