//! OMERO database schema version tokens.
//!
//! A token such as `OMERO5.1DEV__0` names one revision of the database schema.
//! Tokens appear as upgrade script directory and file names and as the value
//! recorded in the `dbpatch` table. They are never compared as raw strings:
//! [`SchemaVersion`] decomposes them into fields with a total order where
//! numeric parts compare numerically and a qualified pre-release (`DEV`) sorts
//! before the final release of the same numeric version.

use crate::error::{CoreError, CoreResult};
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::OnceLock;

/// Anchored grammar: marker, major, optional `.`/`A` series, optional minor,
/// optional uppercase qualifier, `__`, patch.
static TOKEN_PATTERN: OnceLock<Regex> = OnceLock::new();

fn token_pattern() -> &'static Regex {
    TOKEN_PATTERN.get_or_init(|| {
        Regex::new(r"^OMERO(\d+)(\.|A)?(\d*)([A-Z]*)__(\d+)$").expect("valid regex literal")
    })
}

/// Returns true if `s` is exactly one schema version token.
///
/// ```
/// use omego_core::is_schema_token;
///
/// assert!(is_schema_token("OMERO5.1DEV__10"));
/// assert!(!is_schema_token("OMERO-precheck.sql"));
/// ```
pub fn is_schema_token(s: &str) -> bool {
    token_pattern().is_match(s)
}

/// A parsed schema version token.
///
/// Equality, hashing and ordering only consider the decomposed fields, so two
/// spellings of the same version (e.g. a leading zero) are the same version.
/// The original spelling is kept for display.
#[derive(Debug, Clone)]
pub struct SchemaVersion {
    token: String,
    major: u64,
    series: Option<char>,
    minor: Option<u64>,
    qualifier: Option<String>,
    patch: u64,
}

impl SchemaVersion {
    /// Parse a token, failing with [`CoreError::InvalidSchemaToken`] if it does
    /// not follow the grammar.
    pub fn parse(token: &str) -> CoreResult<Self> {
        let invalid = || CoreError::InvalidSchemaToken {
            token: token.to_string(),
        };
        let caps = token_pattern().captures(token).ok_or_else(invalid)?;

        let number = |idx: usize| -> CoreResult<Option<u64>> {
            match caps.get(idx).map(|m| m.as_str()).filter(|s| !s.is_empty()) {
                Some(digits) => digits.parse::<u64>().map(Some).map_err(|_| invalid()),
                None => Ok(None),
            }
        };

        let major = number(1)?.ok_or_else(invalid)?;
        let series = caps.get(2).and_then(|m| m.as_str().chars().next());
        let minor = number(3)?;
        let qualifier = caps
            .get(4)
            .map(|m| m.as_str())
            .filter(|s| !s.is_empty())
            .map(String::from);
        let patch = number(5)?.ok_or_else(invalid)?;

        Ok(Self {
            token: token.to_string(),
            major,
            series,
            minor,
            qualifier,
            patch,
        })
    }

    /// Build a token from the `currentversion` and `currentpatch` columns of
    /// the `dbpatch` table, e.g. (`OMERO4.4`, `0`) becomes `OMERO4.4__0`.
    pub fn from_db_row(version: &str, patch: &str) -> CoreResult<Self> {
        Self::parse(&format!("{}__{}", version.trim(), patch.trim()))
    }

    /// The token as it was spelled.
    pub fn as_str(&self) -> &str {
        &self.token
    }

    pub fn major(&self) -> u64 {
        self.major
    }

    /// Series disambiguator: `.` for dotted series, a letter for lettered
    /// sub-series such as `3A`, `None` when absent.
    pub fn series(&self) -> Option<char> {
        self.series
    }

    pub fn minor(&self) -> Option<u64> {
        self.minor
    }

    /// Pre-release qualifier such as `DEV`, `None` for a final release.
    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }

    pub fn patch(&self) -> u64 {
        self.patch
    }

    /// Ordering key. A final release maps its qualifier to `(true, "")`, which
    /// sorts after every `(false, qualifier)`.
    fn sort_key(&self) -> (u64, Option<char>, Option<u64>, (bool, &str), u64) {
        (
            self.major,
            self.series,
            self.minor,
            match &self.qualifier {
                Some(q) => (false, q.as_str()),
                None => (true, ""),
            },
            self.patch,
        )
    }
}

impl PartialEq for SchemaVersion {
    fn eq(&self, other: &Self) -> bool {
        self.sort_key() == other.sort_key()
    }
}

impl Eq for SchemaVersion {}

impl Hash for SchemaVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.sort_key().hash(state);
    }
}

impl PartialOrd for SchemaVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SchemaVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl FromStr for SchemaVersion {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token)
    }
}

/// Sort schema version tokens in upgrade order.
///
/// Fails on the first token that does not follow the grammar. The sort is
/// stable, so duplicate tokens keep their relative order.
pub fn sort_schemas<I, S>(tokens: I) -> CoreResult<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut versions = tokens
        .into_iter()
        .map(|t| SchemaVersion::parse(t.as_ref()))
        .collect::<CoreResult<Vec<_>>>()?;
    versions.sort();
    Ok(versions.into_iter().map(|v| v.token).collect())
}

#[cfg(test)]
#[path = "schema_version_test.rs"]
mod tests;
