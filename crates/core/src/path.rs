//! Hierarchical logger names.

use core::fmt;
use core::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Separator used when a path is rendered as, or parsed from, a dotted name.
pub const SEPARATOR: char = '.';

/// Position of a logger in the hierarchy, as an ordered list of segments.
///
/// The empty path is the root. Cloning is cheap: segments are shared.
///
/// ```
/// use plume_core::LoggerPath;
///
/// let path: LoggerPath = "com.acme.billing".parse().unwrap();
/// assert_eq!(path.len(), 3);
/// assert_eq!(path.segment(1), Some("acme"));
/// assert_eq!(path.to_string(), "com.acme.billing");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct LoggerPath(Arc<[String]>);

impl LoggerPath {
    /// The empty path.
    pub fn root() -> Self {
        Self(Arc::from(Vec::new()))
    }

    /// Build a path from already-split segments.
    ///
    /// Segments are taken as-is; use [`LoggerPath::parse`] for dotted names.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Parse a dotted logger name such as `com.acme.billing`.
    ///
    /// The empty string is the root. Empty segments are rejected.
    pub fn parse(name: &str) -> Result<Self, CoreError> {
        if name.is_empty() {
            return Ok(Self::root());
        }

        let mut segments = Vec::new();
        for (index, segment) in name.split(SEPARATOR).enumerate() {
            if segment.is_empty() {
                return Err(CoreError::invalid_path(format!(
                    "empty segment at index {index} in '{name}'"
                )));
            }
            segments.push(segment.to_string());
        }

        Ok(Self(segments.into()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segment(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// The first `len` segments (clamped to the path length).
    pub fn prefix(&self, len: usize) -> Self {
        let len = len.min(self.0.len());
        if len == self.0.len() {
            return self.clone();
        }
        Self(self.0[..len].into())
    }

    /// The enclosing path, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            None
        } else {
            Some(self.prefix(self.0.len() - 1))
        }
    }

    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.to_vec();
        segments.push(segment.into());
        Self(segments.into())
    }

    /// True when `self` is a strict prefix of `other`.
    pub fn is_ancestor_of(&self, other: &LoggerPath) -> bool {
        self.0.len() < other.0.len() && other.0[..self.0.len()] == self.0[..]
    }
}

impl Default for LoggerPath {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for LoggerPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, segment) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(".")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl FromStr for LoggerPath {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<Vec<String>> for LoggerPath {
    type Error = CoreError;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        if let Some(index) = value.iter().position(String::is_empty) {
            return Err(CoreError::invalid_path(format!("empty segment at index {index}")));
        }
        Ok(Self(value.into()))
    }
}

impl From<LoggerPath> for Vec<String> {
    fn from(value: LoggerPath) -> Self {
        value.0.to_vec()
    }
}

impl From<&[&str]> for LoggerPath {
    fn from(value: &[&str]) -> Self {
        Self::new(value.iter().copied())
    }
}

impl<const N: usize> From<[&str; N]> for LoggerPath {
    fn from(value: [&str; N]) -> Self {
        Self::new(value)
    }
}
