//! Resolve and render completions

use crate::error::{CliError, CliResult};
use crate::exit_codes::{EXIT_ERROR, EXIT_SUCCESS};
use crate::logging::Pretty;
use spectree::{render, CommandLine, Format, RenderOptions, SpecTree};
use std::io::Write;

/// Resolve `line` against `tree` and write the rendered candidates.
///
/// A dead end is not a failure: the protocol output carries the error directive and
/// the command still exits successfully.
pub fn run(
    tree: &SpecTree,
    line: &CommandLine,
    format: Format,
    options: RenderOptions,
    out: &mut dyn Write,
) -> CliResult<i32> {
    tracing::trace!(
        "Completing {:?} with partial {:?}",
        line.complete_tokens(),
        line.partial()
    );

    let resolution = tree.resolve(line);
    tracing::debug!(
        "{:?} at '{}' with candidates: {}",
        resolution.state,
        resolution.path.join(" "),
        Pretty(&resolution.candidates)
    );

    let rendered = render(&resolution, format, options)
        .map_err(|e| CliError::with_source("Failed to render completions", EXIT_ERROR, e))?;
    out.write_all(rendered.as_bytes())?;
    Ok(EXIT_SUCCESS)
}
