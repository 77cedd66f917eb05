//! Authoring format for command specifications
//!
//! These types mirror the static specification data field by field and carry no
//! invariants of their own. [`SpecTree::build`](crate::SpecTree::build) validates them
//! and produces the indexed tree used for completion.
//!
//! ```json
//! {
//!   "name": "exo",
//!   "subcommands": [
//!     { "name": ["ls", "list"], "description": "List things" }
//!   ],
//!   "options": [
//!     { "name": ["--zone", "-z"], "args": [{ "name": "zone" }], "isPersistent": true }
//!   ]
//! }
//! ```

use crate::error::{Result, SpecError};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

/// A command or subcommand as written in the specification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCommand {
    #[serde(deserialize_with = "one_or_many")]
    pub name: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subcommands: Vec<RawCommand>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<RawOption>,
}

/// A flag as written in the specification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOption {
    #[serde(deserialize_with = "one_or_many")]
    pub name: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub args: Vec<RawArg>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_repeatable: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_persistent: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub hidden: bool,
}

/// The value slot of an option.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawArg {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Accept either a single value or a list of values.
fn one_or_many<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany<T> {
        Many(Vec<T>),
        One(T),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::Many(values) => values,
        OneOrMany::One(value) => vec![value],
    })
}

impl RawCommand {
    /// Create a command with the given aliases, canonical name first.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: names.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_subcommand(mut self, subcommand: RawCommand) -> Self {
        self.subcommands.push(subcommand);
        self
    }

    pub fn with_subcommands(mut self, subcommands: impl IntoIterator<Item = RawCommand>) -> Self {
        self.subcommands.extend(subcommands);
        self
    }

    pub fn with_option(mut self, option: RawOption) -> Self {
        self.options.push(option);
        self
    }

    /// Parse a specification from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parse a specification from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml_ng::from_str(text)?)
    }

    /// Load a specification file, choosing the parser from the file extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        let text = std::fs::read_to_string(path).map_err(|e| SpecError::file_read(path, e))?;
        tracing::debug!("Loading specification from {}", path.display());

        match extension.as_deref() {
            Some("json") => Self::from_json(&text),
            Some("yaml") | Some("yml") => Self::from_yaml(&text),
            _ => Err(SpecError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

impl RawOption {
    /// Create a boolean flag with the given aliases.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: names.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Make the option consume one value.
    pub fn with_arg(mut self, name: impl Into<String>, default: Option<&str>) -> Self {
        self.args = vec![RawArg {
            name: name.into(),
            default: default.map(str::to_string),
        }];
        self
    }

    pub fn repeatable(mut self) -> Self {
        self.is_repeatable = true;
        self
    }

    pub fn persistent(mut self) -> Self {
        self.is_persistent = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}
