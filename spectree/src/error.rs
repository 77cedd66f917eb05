//! Error types for building a specification tree

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using SpecError.
pub type Result<T> = std::result::Result<T, SpecError>;

/// What kind of alias collided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictKind {
    /// Two sibling subcommands share an alias.
    Subcommand,
    /// Two options visible at the same node share an alias. This covers local/local
    /// collisions and local options shadowing a persistent ancestor option.
    Option,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictKind::Subcommand => write!(f, "subcommand"),
            ConflictKind::Option => write!(f, "option"),
        }
    }
}

/// An alias collision found while building the tree.
///
/// `first` is the canonical name of the entry that keeps the alias under
/// [`ConflictPolicy::FirstWins`](crate::ConflictPolicy::FirstWins); `second` is the
/// later declaration that lost it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub kind: ConflictKind,
    /// Space separated canonical path of the node where the collision happens
    pub scope: String,
    pub alias: String,
    pub first: String,
    pub second: String,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} alias '{}' under '{}' is declared by both '{}' and '{}'",
            self.kind, self.alias, self.scope, self.first, self.second
        )
    }
}

/// Errors raised while loading or building a specification.
///
/// Resolution itself never fails: an unmatched token is a normal dead end and is
/// reported through [`ResolverState::Error`](crate::ResolverState::Error).
#[derive(Error, Debug)]
pub enum SpecError {
    /// Duplicate alias among siblings, or colliding local/persistent option names.
    #[error("specification conflict: {0}")]
    Conflict(Conflict),

    /// Structurally invalid authoring data.
    #[error("invalid specification at '{path}': {message}")]
    InvalidSpec { path: String, message: String },

    /// Unknown file extension for a specification file.
    #[error("unsupported specification format for '{path}' (expected .json, .yaml or .yml)")]
    UnsupportedFormat { path: PathBuf },

    /// Failed to read a specification file.
    #[error("failed to read specification '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON parse error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parse error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl SpecError {
    /// Create an InvalidSpec error.
    pub fn invalid(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSpec {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a FileRead error.
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// The conflict carried by this error, if it is one.
    pub fn conflict(&self) -> Option<&Conflict> {
        match self {
            SpecError::Conflict(conflict) => Some(conflict),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_display() {
        let err = SpecError::Conflict(Conflict {
            kind: ConflictKind::Subcommand,
            scope: "exo iam access-key".into(),
            alias: "add".into(),
            first: "add".into(),
            second: "add".into(),
        });
        let msg = err.to_string();
        assert!(msg.starts_with("specification conflict: subcommand alias 'add'"));
        assert!(msg.contains("exo iam access-key"));
        assert!(err.conflict().is_some());
    }

    #[test]
    fn test_invalid_spec_display() {
        let err = SpecError::invalid("exo dns add --ttl", "more than one argument");
        assert_eq!(
            err.to_string(),
            "invalid specification at 'exo dns add --ttl': more than one argument"
        );
        assert!(err.conflict().is_none());
    }
}
