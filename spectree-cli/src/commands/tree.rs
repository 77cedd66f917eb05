//! Print a command subtree for inspection

use crate::error::{CliError, CliResult};
use crate::exit_codes::{EXIT_ERROR, EXIT_SUCCESS};
use spectree::{NodeId, OptionSpec, SpecTree};
use std::io::Write;

const INDENT: &str = "  ";

/// Print the node reached by `path` and everything below it.
pub fn run(tree: &SpecTree, path: &[String], out: &mut dyn Write) -> CliResult<i32> {
    let node = tree.find(path).ok_or_else(|| {
        CliError::new(
            format!("No command '{}' in the specification", path.join(" ")),
            EXIT_ERROR,
        )
    })?;
    print_node(tree, node, 0, out)?;
    Ok(EXIT_SUCCESS)
}

fn print_node(tree: &SpecTree, id: NodeId, depth: usize, out: &mut dyn Write) -> CliResult<()> {
    let node = tree.node(id);
    let indent = INDENT.repeat(depth);

    let mut line = format!("{indent}{}", node.names().join(", "));
    if let Some(description) = node.description() {
        line.push_str(&format!(" - {}", one_line(description)));
    }
    writeln!(out, "{line}")?;

    for option in node.options() {
        writeln!(out, "{indent}{INDENT}{}", option_line(tree.option(*option)))?;
    }
    for child in node.subcommands() {
        print_node(tree, *child, depth + 1, out)?;
    }
    Ok(())
}

fn option_line(option: &OptionSpec) -> String {
    let mut line = option.names().join(", ");
    if let Some(arg) = option.arg() {
        line.push_str(&format!(" <{}>", arg.name));
        if let Some(default) = arg.default.as_deref() {
            line.push_str(&format!(" (default: {default})"));
        }
    }
    for (set, tag) in [
        (option.is_persistent(), "persistent"),
        (option.is_repeatable(), "repeatable"),
        (option.is_hidden(), "hidden"),
    ] {
        if set {
            line.push_str(&format!(" [{tag}]"));
        }
    }
    if let Some(description) = option.description() {
        line.push_str(&format!(" - {}", one_line(description)));
    }
    line
}

fn one_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use spectree::{RawCommand, RawOption};

    fn tree() -> SpecTree {
        let raw = RawCommand::new(["tool"])
            .with_option(RawOption::new(["--quiet", "-q"]).persistent())
            .with_subcommand(
                RawCommand::new(["run", "r"])
                    .with_description("Run\nit")
                    .with_option(
                        RawOption::new(["--label"])
                            .with_arg("label", Some("none"))
                            .repeatable()
                            .with_description("Label"),
                    ),
            );
        SpecTree::build(&raw).unwrap()
    }

    #[test]
    fn test_prints_subtree() {
        let mut out = Vec::new();
        run(&tree(), &[], &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "tool\n  --quiet, -q [persistent]\n  run, r - Run it\n    --label <label> (default: none) [repeatable] - Label\n"
        );
    }

    #[test]
    fn test_unknown_path() {
        let mut out = Vec::new();
        let err = run(&tree(), &["walk".to_string()], &mut out).unwrap_err();
        assert_eq!(err.exit_code, EXIT_ERROR);
        assert!(err.message.contains("walk"));
    }
}
