//! Branch references
//!
//! Reads `HEAD` and the loose `refs/heads/*` files of a Git directory.

use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::object::ObjectId;

const HEAD_REF_PREFIX: &str = "ref: refs/heads/";

/// A local branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Branch {
    pub name: String,
    /// HEAD points at this branch
    pub is_current: bool,
}

/// Loose reference reader
#[derive(Debug, Clone)]
pub struct RefStore {
    git_dir: PathBuf,
}

impl RefStore {
    pub fn new(git_dir: impl AsRef<Path>) -> Self {
        Self {
            git_dir: git_dir.as_ref().to_path_buf(),
        }
    }

    fn heads_dir(&self) -> PathBuf {
        self.git_dir.join("refs").join("heads")
    }

    /// Branch HEAD points at, or `None` for a detached HEAD
    pub fn current_branch(&self) -> Result<Option<String>> {
        let head = read_ref_file(&self.git_dir.join("HEAD"))?;
        Ok(head
            .trim()
            .strip_prefix(HEAD_REF_PREFIX)
            .map(|name| name.to_string()))
    }

    /// Commit id stored in `refs/heads/<name>`
    pub fn branch_tip(&self, name: &str) -> Result<ObjectId> {
        let content = read_ref_file(&self.heads_dir().join(name))?;
        let hash: String = content.chars().filter(|c| *c != '\r' && *c != '\n').collect();
        ObjectId::from_hex(&hash)
    }

    /// Branches directly under `refs/heads`, sorted by name
    pub fn list_branches(&self) -> Result<Vec<Branch>> {
        let heads = self.heads_dir();
        let current = self.current_branch()?;

        let entries = match fs::read_dir(&heads) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(Error::RefNotFound(heads)),
            Err(e) => return Err(Error::Io(e)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();

        Ok(names
            .into_iter()
            .map(|name| Branch {
                is_current: current.as_deref() == Some(name.as_str()),
                name,
            })
            .collect())
    }
}

fn read_ref_file(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(Error::RefNotFound(path.to_path_buf())),
        Err(e) => Err(Error::Io(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const TIP: &str = "0eee6a98471a350b2c2316313114185ecaf82f0e";

    fn setup(head: &str, branches: &[&str]) -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let heads = temp_dir.path().join("refs").join("heads");
        fs::create_dir_all(&heads).unwrap();
        fs::write(temp_dir.path().join("HEAD"), head).unwrap();
        for branch in branches {
            fs::write(heads.join(branch), format!("{TIP}\n")).unwrap();
        }
        temp_dir
    }

    #[test]
    fn test_list_branches_sorted_with_current() {
        let temp_dir = setup("ref: refs/heads/main\n", &["main", "feature", "dev"]);
        fs::create_dir_all(temp_dir.path().join("refs/heads/team")).unwrap();

        let branches = RefStore::new(temp_dir.path()).list_branches().unwrap();
        let view: Vec<_> = branches.iter().map(|b| (b.name.as_str(), b.is_current)).collect();
        assert_eq!(view, [("dev", false), ("feature", false), ("main", true)]);
    }

    #[test]
    fn test_detached_head_has_no_current_branch() {
        let temp_dir = setup(&format!("{TIP}\n"), &["main"]);
        let refs = RefStore::new(temp_dir.path());
        assert_eq!(refs.current_branch().unwrap(), None);
        assert!(refs.list_branches().unwrap().iter().all(|b| !b.is_current));
    }

    #[test]
    fn test_branch_tip_strips_newlines() {
        let temp_dir = setup("ref: refs/heads/main\n", &["main"]);
        fs::write(temp_dir.path().join("refs/heads/crlf"), format!("{TIP}\r\n\r\n")).unwrap();

        let refs = RefStore::new(temp_dir.path());
        assert_eq!(refs.branch_tip("main").unwrap().to_hex(), TIP);
        assert_eq!(refs.branch_tip("crlf").unwrap().to_hex(), TIP);
    }

    #[test]
    fn test_missing_branch_is_ref_not_found() {
        let temp_dir = setup("ref: refs/heads/main\n", &["main"]);
        let err = RefStore::new(temp_dir.path()).branch_tip("nope").unwrap_err();
        assert!(matches!(err, Error::RefNotFound(path) if path.ends_with("refs/heads/nope")));
    }

    #[test]
    fn test_garbage_ref_is_invalid_id() {
        let temp_dir = setup("ref: refs/heads/main\n", &[]);
        fs::write(temp_dir.path().join("refs/heads/bad"), "not-a-hash\n").unwrap();
        assert!(matches!(
            RefStore::new(temp_dir.path()).branch_tip("bad"),
            Err(Error::InvalidObjectId(_))
        ));
    }
}
