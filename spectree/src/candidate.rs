//! Completion candidates handed to shell renderers

use serde::Serialize;

/// What a candidate stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CandidateKind {
    Subcommand,
    Option,
    /// Informational placeholder for an option value; not a literal token
    ArgumentHint,
}

/// One suggested completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub kind: CandidateKind,
    /// Text to insert. For an argument hint this is the placeholder name.
    pub value: String,
    /// Canonical name of the subcommand or option the candidate belongs to.
    pub canonical: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Advisory default value, only set on argument hints
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl Candidate {
    pub fn subcommand(
        value: impl Into<String>,
        canonical: impl Into<String>,
        description: Option<&str>,
    ) -> Self {
        Self {
            kind: CandidateKind::Subcommand,
            value: value.into(),
            canonical: canonical.into(),
            description: description.map(str::to_string),
            default: None,
        }
    }

    pub fn option(
        value: impl Into<String>,
        canonical: impl Into<String>,
        description: Option<&str>,
    ) -> Self {
        Self {
            kind: CandidateKind::Option,
            value: value.into(),
            canonical: canonical.into(),
            description: description.map(str::to_string),
            default: None,
        }
    }

    pub fn argument_hint(
        placeholder: impl Into<String>,
        option: impl Into<String>,
        description: Option<&str>,
        default: Option<&str>,
    ) -> Self {
        Self {
            kind: CandidateKind::ArgumentHint,
            value: placeholder.into(),
            canonical: option.into(),
            description: description.map(str::to_string),
            default: default.map(str::to_string),
        }
    }

    /// True when `value` is a token the shell may insert.
    pub fn is_literal(&self) -> bool {
        self.kind != CandidateKind::ArgumentHint
    }
}
