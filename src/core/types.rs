//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`Oid`] - Git object identifier (hex SHA)
//! - [`RefName`] - Validated Git reference name
//! - [`Signature`] - Authorship identity with a timezone-aware timestamp
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, preventing entire classes of bugs.
//!
//! # Examples
//!
//! ```
//! use revise::core::types::{Oid, RefName};
//!
//! let oid = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
//! assert_eq!(oid.short(), "abc123def456");
//!
//! let refname = RefName::new("refs/heads/feature").unwrap();
//! assert!(refname.is_branch_ref());
//!
//! assert!(Oid::new("not-a-sha").is_err());
//! assert!(RefName::new("refs/heads/bad..name").is_err());
//! ```

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid object id: {0}")]
    InvalidOid(String),

    #[error("invalid ref name: {0}")]
    InvalidRefName(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),
}

/// A Git object identifier (SHA-1 or SHA-256).
///
/// Identity is the only notion of equality for commits and trees. OIDs
/// are normalized to lowercase so that comparisons are exact.
///
/// # Example
///
/// ```
/// use revise::core::types::Oid;
///
/// let oid = Oid::new("ABC123DEF4567890ABC123DEF4567890ABC12345").unwrap();
/// assert_eq!(oid.as_str(), "abc123def4567890abc123def4567890abc12345");
/// assert_eq!(oid.abbrev(7), "abc123d");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Oid(String);

impl Oid {
    /// Length of the short form used in todo lists and progress output.
    pub const SHORT_LEN: usize = 12;

    /// Create a new validated object id.
    ///
    /// The OID is normalized to lowercase.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidOid` if the string is not a valid hex OID.
    pub fn new(oid: impl Into<String>) -> Result<Self, TypeError> {
        let oid = oid.into().to_ascii_lowercase();
        Self::validate(&oid)?;
        Ok(Self(oid))
    }

    /// Get the abbreviated form used in todo lists.
    pub fn short(&self) -> &str {
        self.abbrev(Self::SHORT_LEN)
    }

    /// Get the first `len` characters. If `len` exceeds the OID length,
    /// returns the full OID.
    pub fn abbrev(&self, len: usize) -> &str {
        let end = len.min(self.0.len());
        &self.0[..end]
    }

    /// Validate an object id.
    fn validate(oid: &str) -> Result<(), TypeError> {
        // SHA-1 is 40 hex chars, SHA-256 is 64
        if oid.len() != 40 && oid.len() != 64 {
            return Err(TypeError::InvalidOid(format!(
                "expected 40 or 64 hex characters, got {}",
                oid.len()
            )));
        }
        if !oid.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidOid(
                "object id must be hexadecimal".into(),
            ));
        }
        Ok(())
    }

    /// Get the object id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Oid {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Oid> for String {
    fn from(oid: Oid) -> Self {
        oid.0
    }
}

impl AsRef<str> for Oid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated Git reference name.
///
/// Reference names must conform to Git's refname rules (see `git check-ref-format`).
///
/// # Example
///
/// ```
/// use revise::core::types::RefName;
///
/// let refname = RefName::new("refs/heads/feature/foo").unwrap();
/// assert_eq!(refname.strip_prefix("refs/heads/"), Some("feature/foo"));
/// assert!(refname.is_branch_ref());
/// assert!(!refname.is_tag_ref());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RefName(String);

impl RefName {
    /// Create a new validated ref name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidRefName` if the name violates Git's refname rules.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    /// Create a ref name from raw todo-list bytes.
    pub fn from_bytes(name: &[u8]) -> Result<Self, TypeError> {
        let name = std::str::from_utf8(name)
            .map_err(|_| TypeError::InvalidRefName("ref name must be valid UTF-8".into()))?;
        Self::new(name)
    }

    /// Strip a prefix from the ref name and return the remainder.
    ///
    /// Returns `None` if the ref doesn't start with the given prefix.
    pub fn strip_prefix(&self, prefix: &str) -> Option<&str> {
        self.0.strip_prefix(prefix)
    }

    /// Check if this ref is a branch ref.
    pub fn is_branch_ref(&self) -> bool {
        self.0.starts_with("refs/heads/")
    }

    /// Check if this ref is a tag ref.
    pub fn is_tag_ref(&self) -> bool {
        self.0.starts_with("refs/tags/")
    }

    /// Validate a ref name against Git's refname rules.
    fn validate(name: &str) -> Result<(), TypeError> {
        if name.is_empty() {
            return Err(TypeError::InvalidRefName("ref name cannot be empty".into()));
        }

        if name.starts_with('/') {
            return Err(TypeError::InvalidRefName(
                "ref name cannot start with '/'".into(),
            ));
        }

        if name.ends_with('/') {
            return Err(TypeError::InvalidRefName(
                "ref name cannot end with '/'".into(),
            ));
        }
        if name.ends_with(".lock") {
            return Err(TypeError::InvalidRefName(
                "ref name cannot end with '.lock'".into(),
            ));
        }

        for forbidden in ["..", "@{", "//"] {
            if name.contains(forbidden) {
                return Err(TypeError::InvalidRefName(format!(
                    "ref name cannot contain '{forbidden}'"
                )));
            }
        }

        const INVALID_CHARS: [char; 8] = [' ', '~', '^', ':', '\\', '?', '*', '['];
        for c in INVALID_CHARS {
            if name.contains(c) {
                return Err(TypeError::InvalidRefName(format!(
                    "ref name cannot contain '{c}'"
                )));
            }
        }

        if name.chars().any(|c| c.is_ascii_control()) {
            return Err(TypeError::InvalidRefName(
                "ref name cannot contain control characters".into(),
            ));
        }

        for component in name.split('/').filter(|c| !c.is_empty()) {
            if component.starts_with('.') {
                return Err(TypeError::InvalidRefName(
                    "path component cannot start with '.'".into(),
                ));
            }
            if component.ends_with(".lock") {
                return Err(TypeError::InvalidRefName(
                    "path component cannot end with '.lock'".into(),
                ));
            }
        }

        Ok(())
    }

    /// Get the ref name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the ref name as raw bytes, the way todo lists carry it.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl TryFrom<String> for RefName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RefName> for String {
    fn from(name: RefName) -> Self {
        name.0
    }
}

impl AsRef<str> for RefName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RefName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Authorship or committer identity of a commit.
///
/// Name and email are raw bytes: commits written under a legacy
/// `encoding` header carry identities that are not UTF-8, and they must
/// survive a rewrite untouched. Timestamps keep the original timezone
/// offset; two signatures are only equal if they name the same instant
/// *and* the same offset, which is what the serialized commit header
/// encodes.
///
/// # Example
///
/// ```
/// use revise::core::types::Signature;
///
/// let sig = Signature::from_parts("Test User", "test@example.com", 1_700_000_000, 60).unwrap();
/// assert_eq!(sig.to_header(), b"Test User <test@example.com> 1700000000 +0100");
/// ```
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// Display name, as stored
    pub name: Vec<u8>,
    /// Email address, as stored
    pub email: Vec<u8>,
    /// Timestamp with the author's offset
    pub when: DateTime<FixedOffset>,
}

impl Signature {
    /// Build a signature from a Unix timestamp and an offset in minutes.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidSignature` if the offset or timestamp is
    /// out of range.
    pub fn from_parts(
        name: impl Into<Vec<u8>>,
        email: impl Into<Vec<u8>>,
        seconds: i64,
        offset_minutes: i32,
    ) -> Result<Self, TypeError> {
        let offset = FixedOffset::east_opt(offset_minutes * 60).ok_or_else(|| {
            TypeError::InvalidSignature(format!("offset out of range: {offset_minutes} minutes"))
        })?;
        let when = DateTime::from_timestamp(seconds, 0)
            .ok_or_else(|| TypeError::InvalidSignature(format!("timestamp out of range: {seconds}")))?
            .with_timezone(&offset);

        Ok(Self {
            name: name.into(),
            email: email.into(),
            when,
        })
    }

    /// Seconds since the Unix epoch.
    pub fn seconds(&self) -> i64 {
        self.when.timestamp()
    }

    /// Timezone offset in minutes east of UTC.
    pub fn offset_minutes(&self) -> i32 {
        self.when.offset().local_minus_utc() / 60
    }

    /// Render the identity the way commit headers store it:
    /// `Name <email> <seconds> <+hhmm>`.
    pub fn to_header(&self) -> Vec<u8> {
        let mut header = Vec::with_capacity(self.name.len() + self.email.len() + 24);
        header.extend_from_slice(&self.name);
        header.extend_from_slice(b" <");
        header.extend_from_slice(&self.email);
        header.extend_from_slice(b"> ");
        header.extend_from_slice(self.when.format("%s %z").to_string().as_bytes());
        header
    }
}

impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.email == other.email
            && self.when == other.when
            && self.when.offset() == other.when.offset()
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} <{}>",
            String::from_utf8_lossy(&self.name),
            String::from_utf8_lossy(&self.email)
        )
    }
}
