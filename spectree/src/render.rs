//! Rendering resolutions for shell completion scripts
//!
//! [`Format::Protocol`] speaks the line protocol used by cobra-generated completion
//! scripts: one `token<TAB>description` line per candidate, an optional `_activeHelp_`
//! line, and a final `:<directive>` line.

use crate::candidate::Candidate;
use crate::error::Result;
use crate::resolver::{Resolution, ResolverState};
use serde::Serialize;
use std::fmt::Write;

/// Prefix marking an informational line the shell displays but never inserts.
pub const ACTIVE_HELP_MARKER: &str = "_activeHelp_ ";

/// Shell completion directive bit flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Directive(u8);

impl Directive {
    /// Let the shell perform its default completion.
    pub const DEFAULT: Directive = Directive(0);
    /// Completion failed; the shell should offer nothing.
    pub const ERROR: Directive = Directive(1);
    /// Do not append a space after the inserted token.
    pub const NO_SPACE: Directive = Directive(2);
    /// Do not fall back to file name completion.
    pub const NO_FILE_COMP: Directive = Directive(4);

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, other: Directive) -> bool {
        self.0 & other.0 == other.0
    }

    /// The directive matching the end state of a resolution.
    pub fn for_resolution(resolution: &Resolution) -> Self {
        match resolution.state {
            ResolverState::Error => Directive::ERROR,
            ResolverState::InOptionArg => Directive::DEFAULT,
            ResolverState::AtCommand | ResolverState::Terminal => Directive::NO_FILE_COMP,
        }
    }
}

impl std::ops::BitOr for Directive {
    type Output = Directive;

    fn bitor(self, rhs: Directive) -> Directive {
        Directive(self.0 | rhs.0)
    }
}

/// Output formats for a resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    /// Tab separated candidates followed by a `:<directive>` line
    #[default]
    Protocol,
    /// One literal token per line
    Plain,
    /// The full resolution as a JSON document
    Json,
}

/// Rendering switches that never change the candidate set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Drop descriptions from the output. Argument hints keep their placeholder and
    /// default.
    pub no_descriptions: bool,
}

#[derive(Serialize)]
struct JsonResolution<'a> {
    state: ResolverState,
    path: &'a [String],
    directive: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    unmatched: Option<&'a str>,
    candidates: Vec<Candidate>,
}

/// Render `resolution` for a shell or a human.
pub fn render(resolution: &Resolution, format: Format, options: RenderOptions) -> Result<String> {
    let directive = Directive::for_resolution(resolution);
    match format {
        Format::Protocol => Ok(render_protocol(resolution, directive, options)),
        Format::Plain => Ok(render_plain(resolution)),
        Format::Json => {
            let candidates = resolution
                .candidates
                .iter()
                .cloned()
                .map(|mut candidate| {
                    if options.no_descriptions {
                        candidate.description = None;
                    }
                    candidate
                })
                .collect();
            let document = JsonResolution {
                state: resolution.state,
                path: &resolution.path,
                directive: directive.bits(),
                unmatched: resolution.unmatched.as_deref(),
                candidates,
            };
            Ok(serde_json::to_string_pretty(&document)?)
        }
    }
}

fn render_protocol(resolution: &Resolution, directive: Directive, options: RenderOptions) -> String {
    let mut out = String::new();
    for candidate in &resolution.candidates {
        if candidate.is_literal() {
            out.push_str(&candidate.value);
            if let Some(description) = candidate.description.as_deref() {
                if !options.no_descriptions {
                    out.push('\t');
                    out.push_str(&single_line(description));
                }
            }
            out.push('\n');
        } else {
            out.push_str(ACTIVE_HELP_MARKER);
            out.push_str(&hint_text(candidate, options));
            out.push('\n');
        }
    }
    // Writing into a String cannot fail
    let _ = writeln!(out, ":{}", directive.bits());
    out
}

fn render_plain(resolution: &Resolution) -> String {
    resolution
        .literals()
        .map(|candidate| format!("{}\n", candidate.value))
        .collect()
}

/// Hint text such as `<disk-size> value for --disk-size: disk size (default: 50)`.
///
/// Without descriptions the `: disk size` part is left out; the placeholder and the
/// default stay.
fn hint_text(candidate: &Candidate, options: RenderOptions) -> String {
    let mut text = format!("<{}> value for {}", candidate.value, candidate.canonical);
    if let Some(description) = candidate.description.as_deref() {
        if !options.no_descriptions {
            text.push_str(": ");
            text.push_str(&single_line(description));
        }
    }
    if let Some(default) = candidate.default.as_deref() {
        text.push_str(&format!(" (default: {default})"));
    }
    text
}

/// Shell protocols are line based; keep descriptions on one line.
fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
