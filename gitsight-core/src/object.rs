//! Core object model for gitsight
//!
//! Typed views of the three loose object kinds found in a Git object store:
//! Blob, Tree and Commit, all addressed by a 20-byte SHA-1 ObjectId.

use chrono::{DateTime, FixedOffset};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use sha1::{Digest, Sha1};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Length of a raw object id in bytes
pub const OID_LEN: usize = 20;

/// Length of a hex-encoded object id
pub const OID_HEX_LEN: usize = OID_LEN * 2;

/// Mode prefix marking a tree entry as a subdirectory
pub const DIR_MODE_PREFIX: &str = "40000";

/// Unique identifier for any stored object
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId([u8; OID_LEN]);

impl ObjectId {
    /// Create a new ObjectId from raw bytes
    pub fn new(bytes: [u8; OID_LEN]) -> Self {
        Self(bytes)
    }

    /// Build an id from a slice that must be exactly 20 bytes long
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let arr: [u8; OID_LEN] = bytes.try_into().ok()?;
        Some(Self(arr))
    }

    /// Compute the id Git assigns to an object of `kind` with this body
    pub fn for_object(kind: ObjectKind, body: &[u8]) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(format!("{} {}\0", kind, body.len()).as_bytes());
        hasher.update(body);
        Self(hasher.finalize().into())
    }

    /// Hash an already framed payload (header included)
    pub fn from_data(data: &[u8]) -> Self {
        Self(Sha1::digest(data).into())
    }

    /// Convert to lowercase hexadecimal string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from a 40 character hexadecimal string
    pub fn from_hex(hex_str: &str) -> Result<Self, Error> {
        if hex_str.len() != OID_HEX_LEN {
            return Err(Error::InvalidObjectId(hex_str.to_string()));
        }
        let mut arr = [0u8; OID_LEN];
        hex::decode_to_slice(hex_str, &mut arr)
            .map_err(|_| Error::InvalidObjectId(hex_str.to_string()))?;
        Ok(Self(arr))
    }

    /// Get raw bytes
    pub fn as_bytes(&self) -> &[u8; OID_LEN] {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Object type discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Blob,
    Tree,
    Commit,
}

impl ObjectKind {
    /// The type word used in object headers
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Blob => "blob",
            ObjectKind::Tree => "tree",
            ObjectKind::Commit => "commit",
        }
    }

    /// Parse a header type word
    pub fn from_type_word(word: &str) -> Option<Self> {
        match word {
            "blob" => Some(ObjectKind::Blob),
            "tree" => Some(ObjectKind::Tree),
            "commit" => Some(ObjectKind::Commit),
            _ => None,
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Leading `"<type> <length>"` segment of a decompressed object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ObjectHeader {
    pub kind: ObjectKind,
    /// Length as declared in the header; the body itself is authoritative
    pub declared_len: usize,
}

/// File content object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    /// Raw content data
    pub data: Vec<u8>,
}

impl Blob {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Content rendered as UTF-8, replacing invalid sequences
    pub fn as_text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.data)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Serialize for Blob {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Blob", 2)?;
        state.serialize_field("size", &self.data.len())?;
        state.serialize_field("text", &self.as_text())?;
        state.end()
    }
}

/// Directory tree entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeEntry {
    /// Permission string as stored, e.g. "100644" or "40000"
    pub mode: String,
    /// Single path segment
    pub name: String,
    /// Blob or Tree the entry points at
    pub target: ObjectId,
}

impl TreeEntry {
    pub fn new(mode: impl Into<String>, name: impl Into<String>, target: ObjectId) -> Self {
        Self {
            mode: mode.into(),
            name: name.into(),
            target,
        }
    }

    /// Whether the entry names a subdirectory
    pub fn is_dir(&self) -> bool {
        self.mode.starts_with(DIR_MODE_PREFIX)
    }
}

/// Directory object, entries kept in stored order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Tree {
    pub entries: Vec<TreeEntry>,
}

impl Tree {
    pub fn new(entries: Vec<TreeEntry>) -> Self {
        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = &TreeEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Identity and time of an author or committer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: String,
    pub email: String,
    /// Unix seconds
    pub timestamp: i64,
    /// Zone the time was recorded in
    pub offset: FixedOffset,
}

impl Signature {
    /// The recorded instant in its own zone, if the timestamp is representable
    pub fn when(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::from_timestamp(self.timestamp, 0).map(|utc| utc.with_timezone(&self.offset))
    }

    /// `YYYY-MM-DD HH:MM:SS ±HH:MM` in the recorded zone
    pub fn format_time(&self) -> String {
        self.when()
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S %:z").to_string())
            .unwrap_or_else(|| self.timestamp.to_string())
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Signature", 4)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("email", &self.email)?;
        state.serialize_field("timestamp", &self.timestamp)?;
        state.serialize_field("time", &self.format_time())?;
        state.end()
    }
}

/// Commit object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Commit {
    /// Root tree of the snapshot
    pub tree: ObjectId,
    /// Parent commit ids; the first is the primary lineage
    pub parents: Vec<ObjectId>,
    pub author: Signature,
    pub committer: Signature,
    pub message: String,
}

/// Generic object that can be any type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Object {
    Blob(Blob),
    Tree(Tree),
    Commit(Commit),
}

impl Object {
    /// Get the object kind
    pub fn kind(&self) -> ObjectKind {
        match self {
            Object::Blob(_) => ObjectKind::Blob,
            Object::Tree(_) => ObjectKind::Tree,
            Object::Commit(_) => ObjectKind::Commit,
        }
    }
}

/// One commit produced by a history walk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitLogEntry {
    pub id: ObjectId,
    pub commit: Commit,
    /// Reached as a second-or-later parent rather than along the main line
    pub is_merged_ancestor: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_id_roundtrip() {
        let hex = "1f7a7a472abf3dd9643fd615f6da379c4acb3e3a";
        let id = ObjectId::from_hex(hex).unwrap();
        assert_eq!(id.to_hex(), hex);
        assert_eq!(id.to_string(), hex);
    }

    #[test]
    fn test_object_id_uppercase_is_normalized() {
        let id: ObjectId = "ABCDEF0123456789ABCDEF0123456789ABCDEF01".parse().unwrap();
        assert_eq!(id.to_hex(), "abcdef0123456789abcdef0123456789abcdef01");
    }

    #[test]
    fn test_object_id_rejects_bad_input() {
        assert!(matches!(
            ObjectId::from_hex("abc"),
            Err(Error::InvalidObjectId(_))
        ));
        assert!(matches!(
            ObjectId::from_hex("zz7a7a472abf3dd9643fd615f6da379c4acb3e3a"),
            Err(Error::InvalidObjectId(_))
        ));
    }

    #[test]
    fn test_empty_blob_id_matches_git() {
        let id = ObjectId::for_object(ObjectKind::Blob, b"");
        assert_eq!(id.to_hex(), "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391");
        assert_eq!(id, ObjectId::from_data(b"blob 0\0"));
    }

    #[test]
    fn test_tree_entry_is_dir() {
        let id = ObjectId::new([7u8; OID_LEN]);
        assert!(TreeEntry::new("40000", "src", id).is_dir());
        assert!(!TreeEntry::new("100644", "README", id).is_dir());
        assert!(!TreeEntry::new("120000", "link", id).is_dir());
    }

    #[test]
    fn test_signature_format_time_in_offset() {
        let sig = Signature {
            name: "Mr. Smith".into(),
            email: "mr.smith@matrix".into(),
            timestamp: 1585491500,
            offset: FixedOffset::east_opt(3 * 3600).unwrap(),
        };
        assert_eq!(sig.format_time(), "2020-03-29 17:18:20 +03:00");
    }

    #[test]
    fn test_object_id_serializes_as_hex() {
        let id = ObjectId::new([0xab; OID_LEN]);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", "ab".repeat(OID_LEN)));
    }
}
