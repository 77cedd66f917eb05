//! Derived `help` command
//!
//! `help <command path>` is completed like the real tree but carries no options of its
//! own. The subtree is projected from the normalized tree at build time, so it cannot
//! drift from the commands it describes.

use crate::error::Result;
use crate::raw::RawCommand;
use crate::tree::{NodeId, SpecTree, TreeBuilder};

/// Name of the derived help command.
pub const HELP_COMMAND: &str = "help";

const HELP_DESCRIPTION: &str = "Help about any command";

/// Project the subtree under `node` into a summary-only command (names and
/// descriptions, no options).
///
/// Aliases lost to an earlier sibling are left out, and so are nodes with no reachable
/// alias, so the projection never repeats a conflict of the source tree.
pub fn project(tree: &SpecTree, node: NodeId) -> RawCommand {
    let source = tree.node(node);
    RawCommand {
        name: tree.reachable_names(node).map(str::to_string).collect(),
        description: source.description().map(str::to_string),
        subcommands: project_children(tree, node),
        options: Vec::new(),
    }
}

fn project_children(tree: &SpecTree, node: NodeId) -> Vec<RawCommand> {
    tree.node(node)
        .subcommands()
        .iter()
        .copied()
        .filter(|child| !tree.node(*child).is_derived())
        .map(|child| project(tree, child))
        .filter(|projected| !projected.name.is_empty())
        .collect()
}

/// Append the derived help command under `root`.
pub(crate) fn attach(builder: &mut TreeBuilder, root: NodeId) -> Result<()> {
    let tree = builder.tree();
    if tree.child(root, HELP_COMMAND).is_some() {
        tracing::warn!(
            "'{}' already declares a '{}' subcommand; skipping the derived help projection",
            tree.node(root).canonical(),
            HELP_COMMAND
        );
        return Ok(());
    }

    let help = RawCommand::new([HELP_COMMAND])
        .with_description(HELP_DESCRIPTION)
        .with_subcommands(project_children(tree, root));

    let id = builder.insert_command(&help, Some(root), true)?;
    builder.index_child(root, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::RawOption;
    use crate::tree::{BuildOptions, ConflictPolicy};

    fn raw() -> RawCommand {
        RawCommand::new(["exo"])
            .with_option(RawOption::new(["--help", "-h"]).persistent())
            .with_subcommand(
                RawCommand::new(["c", "compute"])
                    .with_description("Compute services management")
                    .with_subcommand(
                        RawCommand::new(["i", "instance"]).with_option(
                            RawOption::new(["--zone", "-z"]).with_arg("zone", None),
                        ),
                    ),
            )
    }

    #[test]
    fn test_projection_mirrors_commands_without_options() {
        let tree = SpecTree::build(&raw()).unwrap();
        let projected = project(&tree, tree.root());
        assert_eq!(projected.name, vec!["exo"]);
        let compute = &projected.subcommands[0];
        assert_eq!(compute.name, vec!["c", "compute"]);
        assert_eq!(
            compute.description.as_deref(),
            Some("Compute services management")
        );
        assert!(compute.subcommands[0].options.is_empty());
        assert!(projected.options.is_empty());
    }

    #[test]
    fn test_attached_help_is_derived() {
        let options = BuildOptions::default().with_help_projection(true);
        let tree = SpecTree::build_with(&raw(), &options).unwrap();

        let help = tree.child(tree.root(), HELP_COMMAND).unwrap();
        assert!(tree.node(help).is_derived());
        assert_eq!(tree.node(help).description(), Some(HELP_DESCRIPTION));

        let instance = tree.find(&["help", "compute", "instance"]).unwrap();
        assert!(tree.node(instance).is_derived());
        assert!(tree.node(instance).options().is_empty());
        assert!(tree.lookup_option(instance, "--zone").is_none());
        assert!(tree.lookup_option(instance, "-h").is_some());
    }

    #[test]
    fn test_authored_help_is_replaced() {
        let raw = raw().with_subcommand(
            RawCommand::new(["help"])
                .with_subcommand(RawCommand::new(["stale"]).with_description("drifted")),
        );
        let options = BuildOptions::default().with_help_projection(true);
        let tree = SpecTree::build_with(&raw, &options).unwrap();
        assert!(tree.find(&["help", "stale"]).is_none());
        assert!(tree.find(&["help", "compute"]).is_some());

        let plain = SpecTree::build(&raw).unwrap();
        assert!(plain.find(&["help", "stale"]).is_some());
    }

    #[test]
    fn test_projection_skips_lost_aliases() {
        let raw = RawCommand::new(["exo"])
            .with_subcommand(RawCommand::new(["ls", "list"]))
            .with_subcommand(RawCommand::new(["ls", "versions"]));
        let options = BuildOptions::default()
            .with_conflict_policy(ConflictPolicy::FirstWins)
            .with_help_projection(true);
        let tree = SpecTree::build_with(&raw, &options).unwrap();

        assert_eq!(tree.conflicts().len(), 1);
        let versions = tree.find(&["help", "versions"]).unwrap();
        assert_eq!(tree.node(versions).names(), ["versions"]);
    }
}
