//! Human-readable and JSON output for the gitsight commands

use anyhow::Result;
use gitsight_core::{Branch, Commit, CommitLogEntry, Object, ObjectId};
use serde::Serialize;
use std::io::Write;

/// JSON shape of `cat-file`
#[derive(Serialize)]
struct ObjectView<'a> {
    id: ObjectId,
    #[serde(flatten)]
    object: &'a Object,
}

/// Print a decoded object the way `cat-file` shows it
pub fn write_object(writer: &mut dyn Write, object: &Object) -> Result<()> {
    writeln!(writer, "*{}*", object.kind().as_str().to_uppercase())?;
    match object {
        Object::Blob(blob) => writeln!(writer, "{}", blob.as_text())?,
        Object::Tree(tree) => {
            for entry in tree.iter() {
                writeln!(writer, "{} {} {}", entry.mode, entry.target, entry.name)?;
            }
        }
        Object::Commit(commit) => write_commit(writer, commit)?,
    }
    Ok(())
}

fn write_commit(writer: &mut dyn Write, commit: &Commit) -> Result<()> {
    writeln!(writer, "tree: {}", commit.tree)?;
    if !commit.parents.is_empty() {
        let parents: Vec<String> = commit.parents.iter().map(ObjectId::to_hex).collect();
        writeln!(writer, "parents: {}", parents.join(" | "))?;
    }
    writeln!(
        writer,
        "author: {} {} original timestamp: {}",
        commit.author.name,
        commit.author.email,
        commit.author.format_time()
    )?;
    writeln!(
        writer,
        "committer: {} {} commit timestamp: {}",
        commit.committer.name,
        commit.committer.email,
        commit.committer.format_time()
    )?;
    if !commit.message.is_empty() {
        writeln!(writer, "commit message:")?;
        writeln!(writer, "{}", commit.message)?;
    }
    Ok(())
}

/// Print history blocks separated by blank lines
pub fn write_log(writer: &mut dyn Write, log: &[CommitLogEntry]) -> Result<()> {
    for (index, entry) in log.iter().enumerate() {
        if index != 0 {
            writeln!(writer)?;
        }
        let merged = if entry.is_merged_ancestor { " (merged)" } else { "" };
        let committer = &entry.commit.committer;
        writeln!(writer, "Commit: {}{}", entry.id, merged)?;
        writeln!(
            writer,
            "{} {} commit timestamp: {}",
            committer.name,
            committer.email,
            committer.format_time()
        )?;
        writeln!(writer, "{}", entry.commit.message)?;
    }
    Ok(())
}

/// Print branches with the current one starred
pub fn write_branches(writer: &mut dyn Write, branches: &[Branch]) -> Result<()> {
    for branch in branches {
        let marker = if branch.is_current { '*' } else { ' ' };
        writeln!(writer, "{} {}", marker, branch.name)?;
    }
    Ok(())
}

pub fn write_paths(writer: &mut dyn Write, paths: &[String]) -> Result<()> {
    for path in paths {
        writeln!(writer, "{}", path)?;
    }
    Ok(())
}

pub fn write_object_json(writer: &mut dyn Write, id: ObjectId, object: &Object) -> Result<()> {
    write_json(writer, &ObjectView { id, object })
}

pub fn write_json<T: Serialize + ?Sized>(writer: &mut dyn Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, value)?;
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gitsight_core::decode::parse_signature;
    use gitsight_core::{Blob, Tree, TreeEntry};

    fn id(byte: u8) -> ObjectId {
        ObjectId::new([byte; 20])
    }

    fn commit(parents: Vec<ObjectId>, message: &str) -> Commit {
        Commit {
            tree: id(0x11),
            parents,
            author: parse_signature("Mr. Smith <mr.smith@matrix> 1585491500 +0300").unwrap(),
            committer: parse_signature("Mr. Anderson <neo@matrix> 1585491500 -0500").unwrap(),
            message: message.to_string(),
        }
    }

    fn render<F: FnOnce(&mut dyn Write) -> Result<()>>(f: F) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_cat_file_commit() {
        let object = Object::Commit(commit(vec![id(0x22), id(0x33)], "subject\n\nbody"));
        let text = render(|w| write_object(w, &object));
        let expected = format!(
            "*COMMIT*\ntree: {}\nparents: {} | {}\n\
             author: Mr. Smith mr.smith@matrix original timestamp: 2020-03-29 17:18:20 +03:00\n\
             committer: Mr. Anderson neo@matrix commit timestamp: 2020-03-29 09:18:20 -05:00\n\
             commit message:\nsubject\n\nbody\n",
            id(0x11),
            id(0x22),
            id(0x33)
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn test_cat_file_root_commit_omits_parents() {
        let object = Object::Commit(commit(vec![], "init"));
        let text = render(|w| write_object(w, &object));
        assert!(!text.contains("parents:"));
        assert!(text.ends_with("commit message:\ninit\n"));
    }

    #[test]
    fn test_cat_file_tree_and_blob() {
        let tree = Object::Tree(Tree::new(vec![
            TreeEntry::new("100644", "main.rs", id(0xab)),
            TreeEntry::new("40000", "src", id(0xcd)),
        ]));
        assert_eq!(
            render(|w| write_object(w, &tree)),
            format!("*TREE*\n100644 {} main.rs\n40000 {} src\n", id(0xab), id(0xcd))
        );

        let blob = Object::Blob(Blob::new(b"hello".to_vec()));
        assert_eq!(render(|w| write_object(w, &blob)), "*BLOB*\nhello\n");
    }

    #[test]
    fn test_log_marks_merged_entries() {
        let log = vec![
            CommitLogEntry {
                id: id(1),
                commit: commit(vec![id(2), id(3)], "merge"),
                is_merged_ancestor: false,
            },
            CommitLogEntry {
                id: id(3),
                commit: commit(vec![], "feature"),
                is_merged_ancestor: true,
            },
        ];
        let text = render(|w| write_log(w, &log));
        let expected = format!(
            "Commit: {}\nMr. Anderson neo@matrix commit timestamp: 2020-03-29 09:18:20 -05:00\nmerge\n\n\
             Commit: {} (merged)\nMr. Anderson neo@matrix commit timestamp: 2020-03-29 09:18:20 -05:00\nfeature\n",
            id(1),
            id(3)
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn test_branches_star_current() {
        let branches = vec![
            Branch { name: "feature".into(), is_current: false },
            Branch { name: "master".into(), is_current: true },
        ];
        assert_eq!(render(|w| write_branches(w, &branches)), "  feature\n* master\n");
    }

    #[test]
    fn test_object_json_is_tagged() {
        let blob = Object::Blob(Blob::new(b"hi".to_vec()));
        let text = render(|w| write_object_json(w, id(9), &blob));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["type"], "blob");
        assert_eq!(value["id"], id(9).to_hex());
        assert_eq!(value["text"], "hi");
        assert_eq!(value["size"], 2);
    }
}
