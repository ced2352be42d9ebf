//! Object decoder
//!
//! Turns an inflated payload (`"<type> <len>\0<body>"`) into a typed
//! [`Object`]. Binary tree records are read through [`ByteCursor`], which
//! keeps every delimiter scan and fixed-width read bounds-checked.

use chrono::FixedOffset;

use crate::error::DecodeError;
use crate::object::{
    Blob, Commit, OID_LEN, Object, ObjectHeader, ObjectId, ObjectKind, Signature, Tree, TreeEntry,
};

/// Forward-only reader over a byte slice
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes up to (not including) the next `delim`; the delimiter is consumed.
    /// Returns `None` without moving if the delimiter never appears.
    pub fn read_until(&mut self, delim: u8) -> Option<&'a [u8]> {
        let rest = &self.data[self.pos..];
        let idx = rest.iter().position(|&b| b == delim)?;
        self.pos += idx + 1;
        Some(&rest[..idx])
    }

    /// Exactly `n` bytes, or `None` without moving if fewer remain
    pub fn read_exact(&mut self, n: usize) -> Option<&'a [u8]> {
        if self.remaining().len() < n {
            return None;
        }
        let out = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Some(out)
    }

    /// Unread bytes
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    pub fn position(&self) -> usize {
        self.pos
    }
}

/// Decode a full inflated payload into its header and typed body
pub fn decode(raw: &[u8]) -> Result<(ObjectHeader, Object), DecodeError> {
    let (header, body) = decode_header(raw)?;
    if header.declared_len != body.len() {
        tracing::debug!(
            "{} header declares {} bytes, body has {}",
            header.kind,
            header.declared_len,
            body.len()
        );
    }
    let object = decode_body(header.kind, body)?;
    Ok((header, object))
}

/// Split the `"<type> <len>\0"` header off a payload
pub fn decode_header(raw: &[u8]) -> Result<(ObjectHeader, &[u8]), DecodeError> {
    let mut cursor = ByteCursor::new(raw);
    let header = cursor
        .read_until(0)
        .ok_or_else(|| DecodeError::MalformedHeader("no NUL after object header".into()))?;
    let header = std::str::from_utf8(header)
        .map_err(|_| DecodeError::MalformedHeader("header is not valid UTF-8".into()))?;
    let (word, len) = header
        .split_once(' ')
        .ok_or_else(|| DecodeError::MalformedHeader(format!("no space in header {header:?}")))?;
    let kind = ObjectKind::from_type_word(word)
        .ok_or_else(|| DecodeError::MalformedHeader(format!("unsupported object type {word:?}")))?;
    let declared_len = len
        .parse::<usize>()
        .map_err(|_| DecodeError::MalformedHeader(format!("invalid object length {len:?}")))?;

    Ok((ObjectHeader { kind, declared_len }, cursor.remaining()))
}

/// Decode a body whose kind is already known
pub fn decode_body(kind: ObjectKind, body: &[u8]) -> Result<Object, DecodeError> {
    match kind {
        ObjectKind::Blob => Ok(Object::Blob(Blob::new(body.to_vec()))),
        ObjectKind::Tree => parse_tree(body).map(Object::Tree),
        ObjectKind::Commit => parse_commit(body).map(Object::Commit),
    }
}

/// Parse the binary `<mode> <name>\0<20 byte id>` records of a tree body
pub fn parse_tree(body: &[u8]) -> Result<Tree, DecodeError> {
    let malformed = |reason: String| DecodeError::malformed(ObjectKind::Tree, reason);
    let mut cursor = ByteCursor::new(body);
    let mut entries = Vec::new();

    while !cursor.is_empty() {
        let at = cursor.position();
        let mode = cursor
            .read_until(b' ')
            .ok_or_else(|| malformed(format!("entry at byte {at} has no mode terminator")))?;
        let mode = std::str::from_utf8(mode)
            .ok()
            .filter(|m| !m.is_empty() && m.bytes().all(|b| b.is_ascii_digit()))
            .ok_or_else(|| malformed(format!("entry at byte {at} has an invalid mode")))?;
        let name = cursor
            .read_until(0)
            .ok_or_else(|| malformed(format!("entry at byte {at} has no name terminator")))?;
        if name.is_empty() {
            return Err(malformed(format!("entry at byte {at} has an empty name")));
        }
        let target = cursor
            .read_exact(OID_LEN)
            .and_then(ObjectId::from_slice)
            .ok_or_else(|| malformed(format!("entry at byte {at} is truncated before its id")))?;

        entries.push(TreeEntry::new(
            mode,
            String::from_utf8_lossy(name).into_owned(),
            target,
        ));
    }

    Ok(Tree::new(entries))
}

/// Parse the line-oriented text of a commit body
pub fn parse_commit(body: &[u8]) -> Result<Commit, DecodeError> {
    let malformed = |reason: String| DecodeError::malformed(ObjectKind::Commit, reason);
    let text = String::from_utf8_lossy(body);
    let mut lines = text.lines();

    let mut tree = None;
    let mut parents = Vec::new();
    let mut author = None;
    let mut committer = None;

    for line in lines.by_ref() {
        if line.is_empty() {
            break;
        }
        // Continuation of a multi-line header such as gpgsig
        if line.starts_with(' ') {
            continue;
        }
        let (key, value) = line.split_once(' ').unwrap_or((line, ""));
        match key {
            "tree" => {
                if tree.is_some() {
                    return Err(malformed("more than one tree line".into()));
                }
                tree = Some(parse_id(value).ok_or_else(|| malformed(format!("bad tree id {value:?}")))?);
            }
            "parent" => {
                parents.push(parse_id(value).ok_or_else(|| malformed(format!("bad parent id {value:?}")))?);
            }
            "author" => author = Some(parse_signature(value).map_err(|r| malformed(format!("author: {r}")))?),
            "committer" => {
                committer = Some(parse_signature(value).map_err(|r| malformed(format!("committer: {r}")))?)
            }
            _ => {}
        }
    }

    let mut message: Vec<&str> = lines.collect();
    while message.last().is_some_and(|l| l.is_empty()) {
        message.pop();
    }

    Ok(Commit {
        tree: tree.ok_or_else(|| malformed("missing tree line".into()))?,
        parents,
        author: author.ok_or_else(|| malformed("missing author line".into()))?,
        committer: committer.ok_or_else(|| malformed("missing committer line".into()))?,
        message: message.join("\n"),
    })
}

fn parse_id(value: &str) -> Option<ObjectId> {
    ObjectId::from_hex(value.trim()).ok()
}

/// Parse `<name> <<email>> <unix seconds> <±HHMM>`
pub fn parse_signature(value: &str) -> Result<Signature, String> {
    let lt = value.find('<').ok_or("no '<' before email")?;
    let gt = value[lt..].find('>').map(|i| lt + i).ok_or("no '>' after email")?;

    let name = value[..lt].trim().to_string();
    let email = value[lt + 1..gt].to_string();

    let mut rest = value[gt + 1..].split_whitespace();
    let timestamp = rest.next().ok_or("missing timestamp")?;
    let timestamp = timestamp
        .parse::<i64>()
        .map_err(|_| format!("invalid timestamp {timestamp:?}"))?;
    let offset = rest.next().ok_or("missing zone offset")?;
    let offset = parse_offset(offset).ok_or_else(|| format!("invalid zone offset {offset:?}"))?;

    let signature = Signature {
        name,
        email,
        timestamp,
        offset,
    };
    if signature.when().is_none() {
        return Err(format!("timestamp {timestamp} is out of range"));
    }
    Ok(signature)
}

/// `±HHMM` to a fixed zone
pub fn parse_offset(raw: &str) -> Option<FixedOffset> {
    let bytes = raw.as_bytes();
    if bytes.len() != 5 || !bytes[1..].iter().all(u8::is_ascii_digit) {
        return None;
    }
    let sign = match bytes[0] {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };
    let hours: i32 = raw[1..3].parse().ok()?;
    let minutes: i32 = raw[3..5].parse().ok()?;
    if minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
