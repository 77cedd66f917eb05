//! Report alias collisions in a specification

use crate::config::SpectreeConfig;
use crate::error::CliResult;
use crate::exit_codes::{EXIT_ERROR, EXIT_SUCCESS, EXIT_WARNING};
use crate::loader;
use spectree::{ConflictPolicy, SpecTree};
use std::io::Write;

/// Build the tree with every collision recorded and list them.
///
/// The tree is always built under the first-wins policy so that every collision is
/// reported, not just the first. The configured policy decides the exit code.
pub fn run(config: &SpectreeConfig, out: &mut dyn Write) -> CliResult<i32> {
    let diagnostics = SpectreeConfig {
        conflicts: ConflictPolicy::FirstWins,
        ..config.clone()
    };
    let tree = loader::load_tree(&diagnostics)?;
    report(&tree, config.conflicts, out)
}

fn report(tree: &SpecTree, policy: ConflictPolicy, out: &mut dyn Write) -> CliResult<i32> {
    for conflict in tree.conflicts() {
        writeln!(out, "{conflict}")?;
    }

    let root = tree.node(tree.root()).canonical();
    let count = tree.conflicts().len();
    writeln!(
        out,
        "{root}: {} commands, {} options, {count} alias conflicts",
        tree.len(),
        tree.option_count()
    )?;

    Ok(match (count, policy) {
        (0, _) => EXIT_SUCCESS,
        (_, ConflictPolicy::Strict) => EXIT_ERROR,
        (_, ConflictPolicy::FirstWins) => EXIT_WARNING,
    })
}
