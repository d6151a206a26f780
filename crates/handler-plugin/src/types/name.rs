//! Qualified type names such as `A::B::C`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ReloadError;

/// Separator between namespace segments.
pub const SEPARATOR: &str = "::";

/// A validated, `::`-separated path naming a handler type.
///
/// Every segment starts with an ASCII uppercase letter followed by ASCII
/// alphanumerics or underscores. A leading `::` anchors the name at the
/// root namespace and is dropped during parsing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QualifiedName(String);

impl QualifiedName {
    /// Builds a name from already-validated segments.
    fn from_segments<'a>(segments: impl IntoIterator<Item = &'a str>) -> Self {
        Self(segments.into_iter().collect::<Vec<_>>().join(SEPARATOR))
    }

    /// Returns the full name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the segments from outermost to innermost.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(SEPARATOR)
    }

    /// Returns the number of segments.
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// Returns the last segment.
    pub fn leaf(&self) -> &str {
        self.0
            .rsplit_once(SEPARATOR)
            .map_or(self.0.as_str(), |(_, leaf)| leaf)
    }

    /// Returns the enclosing namespace, or `None` for a top-level name.
    pub fn namespace(&self) -> Option<QualifiedName> {
        self.0
            .rsplit_once(SEPARATOR)
            .map(|(namespace, _)| Self(namespace.to_string()))
    }

    /// Returns every enclosing namespace from the outermost inwards.
    ///
    /// `A::B::C` yields `A` then `A::B`.
    pub fn ancestors(&self) -> Vec<QualifiedName> {
        let segments: Vec<&str> = self.segments().collect();
        (1..segments.len())
            .map(|len| Self::from_segments(segments[..len].iter().copied()))
            .collect()
    }

    /// Returns whether `self` is nested (at any depth) inside `namespace`.
    pub fn is_nested_in(&self, namespace: &QualifiedName) -> bool {
        self.0
            .strip_prefix(namespace.as_str())
            .is_some_and(|rest| rest.starts_with(SEPARATOR))
    }

    /// Compares against a raw name, ignoring surrounding whitespace and a
    /// leading root anchor.
    pub fn matches(&self, raw: &str) -> bool {
        self.0 == normalize(raw)
    }
}

/// Strips surrounding whitespace and a leading root anchor from a raw name.
///
/// The result is not validated; names that are not qualified type names
/// pass through unchanged.
pub fn normalize(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed.strip_prefix(SEPARATOR).unwrap_or(trimmed)
}

fn validate_segment(segment: &str) -> Result<(), &'static str> {
    let mut chars = segment.chars();
    match chars.next() {
        None => Err("empty segment"),
        Some(first) if !first.is_ascii_uppercase() => {
            Err("segments must start with an uppercase ASCII letter")
        }
        Some(_) if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') => {
            Err("segments may only contain ASCII letters, digits, and underscores")
        }
        Some(_) => Ok(()),
    }
}

impl FromStr for QualifiedName {
    type Err = ReloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = normalize(s);

        for segment in body.split(SEPARATOR) {
            validate_segment(segment).map_err(|reason| ReloadError::InvalidName {
                name: s.to_string(),
                reason: reason.to_string(),
            })?;
        }

        Ok(Self(body.to_string()))
    }
}

impl TryFrom<String> for QualifiedName {
    type Error = ReloadError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<QualifiedName> for String {
    fn from(name: QualifiedName) -> String {
        name.0
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for QualifiedName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
