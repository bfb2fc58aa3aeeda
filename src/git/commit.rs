//! git::commit
//!
//! In-memory commit snapshots and the raw commit object encoding.
//!
//! A [`Commit`] is an immutable copy of a stored commit. "Changing" a
//! commit always goes through [`Git::update_commit`](super::Git::update_commit)
//! with a [`CommitUpdate`], which writes a brand new object.

use crate::core::types::{Oid, Signature};

/// An immutable commit read from the object store.
///
/// Two commits are equal exactly when their object ids are equal.
#[derive(Debug, Clone)]
pub struct Commit {
    /// Object id of this commit
    pub oid: Oid,
    /// Object id of the root tree
    pub tree: Oid,
    /// Parent commit ids, in order
    pub parents: Vec<Oid>,
    /// Author identity
    pub author: Signature,
    /// Committer identity
    pub committer: Signature,
    /// Value of the `encoding` header, if any
    pub encoding: Option<String>,
    /// Raw message bytes
    pub message: Vec<u8>,
}

impl PartialEq for Commit {
    fn eq(&self, other: &Self) -> bool {
        self.oid == other.oid
    }
}

impl Eq for Commit {}

impl std::hash::Hash for Commit {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.oid.hash(state);
    }
}

impl Commit {
    /// The abbreviated object id shown in todo lists.
    pub fn short(&self) -> &str {
        self.oid.short()
    }

    /// First line of the message, without the line terminator.
    pub fn summary(&self) -> &[u8] {
        summary_of(&self.message)
    }

    /// First line of the message, decoded lossily for display.
    pub fn summary_lossy(&self) -> String {
        String::from_utf8_lossy(self.summary()).into_owned()
    }

    /// Check if this commit has no parents.
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// Check if this commit has more than one parent.
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    /// The message with its first line replaced by `summary`.
    ///
    /// Everything from the first newline on is kept as is.
    ///
    /// # Example
    ///
    /// ```ignore
    /// // message: "old title\n\nbody\n"
    /// assert_eq!(commit.message_with_edited_summary(b"new title"), b"new title\n\nbody\n");
    /// ```
    pub fn message_with_edited_summary(&self, summary: &[u8]) -> Vec<u8> {
        let body = match self.message.iter().position(|&b| b == b'\n') {
            Some(pos) => &self.message[pos..],
            None => &b""[..],
        };
        let mut message = Vec::with_capacity(summary.len() + body.len());
        message.extend_from_slice(summary);
        message.extend_from_slice(body);
        message
    }
}

/// First line of a message, without the line terminator.
pub(crate) fn summary_of(message: &[u8]) -> &[u8] {
    let line = match message.iter().position(|&b| b == b'\n') {
        Some(pos) => &message[..pos],
        None => message,
    };
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Fields to override when deriving a new commit from an existing one.
///
/// Unset fields are copied from the base commit.
#[derive(Debug, Clone, Default)]
pub struct CommitUpdate {
    pub(crate) tree: Option<Oid>,
    pub(crate) parents: Option<Vec<Oid>>,
    pub(crate) message: Option<Vec<u8>>,
    pub(crate) author: Option<Signature>,
}

impl CommitUpdate {
    /// Start an update that changes nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the root tree.
    pub fn tree(mut self, tree: Oid) -> Self {
        self.tree = Some(tree);
        self
    }

    /// Replace the parent list.
    pub fn parents(mut self, parents: Vec<Oid>) -> Self {
        self.parents = Some(parents);
        self
    }

    /// Replace the message.
    pub fn message(mut self, message: impl Into<Vec<u8>>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Replace the author.
    pub fn author(mut self, author: Signature) -> Self {
        self.author = Some(author);
        self
    }

    /// Check if applying this update to `base` would produce the same commit.
    pub fn is_noop_for(&self, base: &Commit) -> bool {
        self.tree.as_ref().map_or(true, |t| *t == base.tree)
            && self.parents.as_ref().map_or(true, |p| *p == base.parents)
            && self.message.as_ref().map_or(true, |m| *m == base.message)
            && self.author.as_ref().map_or(true, |a| *a == base.author)
    }
}

/// Encode a commit object body the way git stores it.
pub(crate) fn encode_commit(
    tree: &Oid,
    parents: &[Oid],
    author: &Signature,
    committer: &Signature,
    encoding: Option<&str>,
    message: &[u8],
) -> Vec<u8> {
    let mut body = format!("tree {tree}\n").into_bytes();
    for parent in parents {
        body.extend_from_slice(format!("parent {parent}\n").as_bytes());
    }
    push_identity(&mut body, b"author ", author);
    push_identity(&mut body, b"committer ", committer);
    if let Some(encoding) = encoding {
        body.extend_from_slice(format!("encoding {encoding}\n").as_bytes());
    }
    body.push(b'\n');
    body.extend_from_slice(message);
    body
}

fn push_identity(body: &mut Vec<u8>, field: &[u8], signature: &Signature) {
    body.extend_from_slice(field);
    body.extend_from_slice(&signature.to_header());
    body.push(b'\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(fill: char) -> Oid {
        Oid::new(fill.to_string().repeat(40)).unwrap()
    }

    fn sig() -> Signature {
        Signature::from_parts("Test User", "test@example.com", 1_700_000_000, 0).unwrap()
    }

    fn commit(message: &[u8]) -> Commit {
        Commit {
            oid: oid('a'),
            tree: oid('b'),
            parents: vec![oid('c')],
            author: sig(),
            committer: sig(),
            encoding: None,
            message: message.to_vec(),
        }
    }

    mod summary {
        use super::*;

        #[test]
        fn first_line_only() {
            assert_eq!(commit(b"title\n\nbody\n").summary(), b"title");
            assert_eq!(commit(b"no newline").summary(), b"no newline");
            assert_eq!(commit(b"crlf\r\nbody").summary(), b"crlf");
        }

        #[test]
        fn edited_summary_keeps_body() {
            let c = commit(b"old title\n\nbody line\n");
            assert_eq!(
                c.message_with_edited_summary(b"new title"),
                b"new title\n\nbody line\n"
            );
        }

        #[test]
        fn edited_summary_without_body() {
            let c = commit(b"single");
            assert_eq!(c.message_with_edited_summary(b"other"), b"other");
        }
    }

    mod update {
        use super::*;

        #[test]
        fn empty_update_is_noop() {
            assert!(CommitUpdate::new().is_noop_for(&commit(b"m\n")));
        }

        #[test]
        fn same_values_are_noop() {
            let c = commit(b"m\n");
            let update = CommitUpdate::new()
                .tree(c.tree.clone())
                .parents(c.parents.clone())
                .message(c.message.clone());
            assert!(update.is_noop_for(&c));
        }

        #[test]
        fn changed_message_is_not_noop() {
            let update = CommitUpdate::new().message(b"other\n".to_vec());
            assert!(!update.is_noop_for(&commit(b"m\n")));
        }
    }

    mod encode {
        use super::*;

        #[test]
        fn header_layout() {
            let body = encode_commit(
                &oid('b'),
                &[oid('c'), oid('d')],
                &sig(),
                &sig(),
                Some("ISO-8859-1"),
                b"title\n",
            );
            let expected = format!(
                "tree {}\nparent {}\nparent {}\n\
                 author Test User <test@example.com> 1700000000 +0000\n\
                 committer Test User <test@example.com> 1700000000 +0000\n\
                 encoding ISO-8859-1\n\ntitle\n",
                oid('b'),
                oid('c'),
                oid('d')
            );
            assert_eq!(body, expected.into_bytes());
        }

        #[test]
        fn latin1_identity_is_written_verbatim() {
            let author =
                Signature::from_parts(&b"Caf\xe9 Person"[..], "cafe@example.com", 1_700_000_000, 0)
                    .unwrap();
            let body = encode_commit(&oid('b'), &[], &author, &sig(), Some("ISO-8859-1"), b"m");

            let line = body
                .split(|&b| b == b'\n')
                .find(|line| line.starts_with(b"author "))
                .unwrap();
            assert_eq!(line, b"author Caf\xe9 Person <cafe@example.com> 1700000000 +0000");
        }

        #[test]
        fn root_commit_has_no_parent_lines() {
            let body = encode_commit(&oid('b'), &[], &sig(), &sig(), None, b"m");
            let text = String::from_utf8(body).unwrap();
            assert!(!text.contains("parent "));
            assert!(text.ends_with("\n\nm"));
        }
    }
}
