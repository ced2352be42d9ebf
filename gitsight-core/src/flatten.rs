//! Tree flattening
//!
//! Expands a tree and all of its subtrees into file paths relative to the
//! tree root. Output order is unspecified; callers sort when presenting.

use crate::error::{Error, Result};
use crate::object::ObjectId;
use crate::storage::ObjectStore;

/// Recursive tree expander backed by an object store
pub struct TreeFlattener<S> {
    store: S,
}

impl<S: ObjectStore> TreeFlattener<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// All leaf paths under `tree`, each prefixed with `prefix` when non-empty
    ///
    /// The same subtree may appear under several names. A subtree that lists
    /// one of its own ancestors fails with [`Error::TreeCycle`].
    pub fn flatten(&self, tree: ObjectId, prefix: &str) -> Result<Vec<String>> {
        let mut paths = Vec::new();
        // (tree id, index of the enclosing tree)
        let mut frames: Vec<(ObjectId, Option<usize>)> = vec![(tree, None)];
        let mut pending = vec![(0usize, prefix.to_string())];

        while let Some((frame, prefix)) = pending.pop() {
            let tree_id = frames[frame].0;
            let tree = self.store.read_tree(&tree_id)?;
            tracing::debug!("expanding tree {} at {:?} ({} entries)", tree_id, prefix, tree.len());

            for entry in tree.entries {
                let is_dir = entry.is_dir();
                let full_path = if prefix.is_empty() {
                    entry.name
                } else {
                    format!("{}/{}", prefix, entry.name)
                };

                if !is_dir {
                    paths.push(full_path);
                    continue;
                }

                if encloses(&frames, frame, &entry.target) {
                    return Err(Error::TreeCycle {
                        id: entry.target,
                        path: full_path,
                    });
                }
                frames.push((entry.target, Some(frame)));
                pending.push((frames.len() - 1, full_path));
            }
        }

        Ok(paths)
    }

    /// Like [`TreeFlattener::flatten`] from the root, sorted lexicographically
    pub fn sorted_paths(&self, tree: ObjectId) -> Result<Vec<String>> {
        let mut paths = self.flatten(tree, "")?;
        paths.sort();
        Ok(paths)
    }
}

/// Whether `id` is the tree at `frame` or one of the trees above it
fn encloses(frames: &[(ObjectId, Option<usize>)], frame: usize, id: &ObjectId) -> bool {
    let mut current = Some(frame);
    while let Some(index) = current {
        let (tree, parent) = frames[index];
        if tree == *id {
            return true;
        }
        current = parent;
    }
    false
}
