//! git::ident
//!
//! Default author and committer identities, resolved the way git resolves
//! them: `GIT_{AUTHOR,COMMITTER}_{NAME,EMAIL,DATE}` from the environment
//! first, then `user.name`/`user.email` from config, then the current time.

use std::ffi::OsString;

use chrono::{DateTime, FixedOffset, Local};

use crate::core::types::Signature;

/// Which identity is being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentRole {
    Author,
    Committer,
}

impl IdentRole {
    fn var(self, field: &str) -> String {
        let role = match self {
            IdentRole::Author => "AUTHOR",
            IdentRole::Committer => "COMMITTER",
        };
        format!("GIT_{role}_{field}")
    }
}

/// Failure to build an identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum IdentError {
    /// Neither the environment nor config names this field.
    Missing(&'static str),
    /// A `GIT_*_DATE` value git would not accept either.
    BadDate { variable: String, value: String },
    /// A parsed timestamp or offset outside the representable range.
    OutOfRange(String),
}

/// Resolve an identity from `env`, asking `config` for the name and email
/// the environment leaves out.
pub(crate) fn resolve<E, C>(role: IdentRole, env: E, config: C) -> Result<Signature, IdentError>
where
    E: Fn(&str) -> Option<OsString>,
    C: FnOnce() -> Option<(Vec<u8>, Vec<u8>)>,
{
    let from_env = |field: &str| {
        env(&role.var(field))
            .map(OsString::into_encoded_bytes)
            .filter(|value| !value.is_empty())
    };

    let mut name = from_env("NAME");
    let mut email = from_env("EMAIL");
    if name.is_none() || email.is_none() {
        if let Some((config_name, config_email)) = config() {
            name = name.or(Some(config_name));
            email = email.or(Some(config_email));
        }
    }
    let name = name.ok_or(IdentError::Missing("name"))?;
    let email = email.ok_or(IdentError::Missing("email"))?;

    let variable = role.var("DATE");
    let when = match env(&variable) {
        Some(raw) => {
            let value = raw.to_string_lossy().into_owned();
            parse_date(&value).ok_or(IdentError::BadDate { variable, value })?
        }
        None => Local::now().fixed_offset(),
    };

    Signature::from_parts(
        name,
        email,
        when.timestamp(),
        when.offset().local_minus_utc() / 60,
    )
    .map_err(|e| IdentError::OutOfRange(e.to_string()))
}

/// Parse a date in one of the forms git accepts for `GIT_*_DATE`: its
/// internal `[@]<seconds> <+hhmm>`, RFC 2822, RFC 3339, or
/// `YYYY-MM-DD HH:MM:SS +hhmm`.
pub(crate) fn parse_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Some(date) = parse_internal(raw.strip_prefix('@').unwrap_or(raw)) {
        return Some(date);
    }
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S %z"))
        .ok()
}

fn parse_internal(raw: &str) -> Option<DateTime<FixedOffset>> {
    let mut parts = raw.split_whitespace();
    let seconds: i64 = parts.next()?.parse().ok()?;
    let offset = match parts.next() {
        Some(zone) => parse_zone(zone)?,
        None => FixedOffset::east_opt(0)?,
    };
    if parts.next().is_some() {
        return None;
    }
    DateTime::from_timestamp(seconds, 0).map(|utc| utc.with_timezone(&offset))
}

/// `+hhmm` / `-hhmm`.
fn parse_zone(zone: &str) -> Option<FixedOffset> {
    let (sign, digits) = match zone.as_bytes().first()? {
        b'+' => (1, &zone[1..]),
        b'-' => (-1, &zone[1..]),
        _ => return None,
    };
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
