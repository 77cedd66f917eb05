use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output formats of the `complete` command
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Default)]
pub enum FormatArg {
    /// `token<TAB>description` lines and a `:<directive>` line
    #[default]
    Protocol,
    /// One token per line
    Plain,
    /// JSON document
    Json,
}

impl From<FormatArg> for spectree::Format {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Protocol => spectree::Format::Protocol,
            FormatArg::Plain => spectree::Format::Plain,
            FormatArg::Json => spectree::Format::Json,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "spectree")]
#[command(version)]
#[command(about = "Shell completion backend driven by a command specification tree")]
#[command(long_about = "
spectree resolves shell completions from a declarative command specification.
Completion scripts call the hidden `__complete` command with the words typed so
far; the last word is the one being completed and may be empty.

Global arguments must precede the command:
  --spec        Use a specification file instead of the bundled exo specification
  --strict      Treat alias collisions in the specification as errors
  --verbose     Show detailed trace output on stderr
  --debug       Show debug output on stderr
  --quiet       Only log errors

Example usage:
  spectree __complete compute instance ''        # Completion protocol
  spectree complete --format json -- storage ''  # Inspect a resolution
  spectree validate                              # Report alias collisions
  spectree tree compute instance                 # Print a subtree
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Command specification file (.json, .yaml or .yml)
    #[arg(long, value_name = "PATH")]
    pub spec: Option<PathBuf>,

    /// Fail on colliding aliases instead of keeping the first declaration
    #[arg(long)]
    pub strict: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Completion protocol entry point used by shell scripts
    #[command(name = "__complete", hide = true, disable_help_flag = true)]
    Protocol {
        /// Words typed so far; the last one is being completed
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, num_args = 0..)]
        words: Vec<String>,
    },
    /// Resolve completions for a command line
    Complete {
        /// Output format
        #[arg(long, value_enum, default_value_t = FormatArg::Protocol)]
        format: FormatArg,

        /// Raw command line up to the cursor, tokenized like a shell would
        #[arg(long, value_name = "LINE", conflicts_with = "words")]
        line: Option<String>,

        /// The last word is complete; complete the word after it
        #[arg(long)]
        trailing_space: bool,

        /// Omit descriptions from the output
        #[arg(long)]
        no_descriptions: bool,

        /// Words typed so far; pass them after `--`
        #[arg(last = true)]
        words: Vec<String>,
    },
    /// Build the specification tree and report alias collisions
    Validate,
    /// Print the command tree below a command path
    Tree {
        /// Subcommand aliases leading to the node to print
        path: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_words_keep_flags() {
        let cli = Cli::try_parse_from([
            "spectree",
            "__complete",
            "compute",
            "instance",
            "--zone",
            "",
        ])
        .unwrap();
        match cli.command {
            Commands::Protocol { words } => {
                assert_eq!(words, vec!["compute", "instance", "--zone", ""]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_protocol_passes_help_through() {
        let cli = Cli::try_parse_from(["spectree", "__complete", "--help", ""]).unwrap();
        match cli.command {
            Commands::Protocol { words } => assert_eq!(words, vec!["--help", ""]),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_complete_arguments() {
        let cli = Cli::try_parse_from([
            "spectree",
            "--strict",
            "complete",
            "--format",
            "json",
            "--no-descriptions",
            "--",
            "storage",
            "-",
        ])
        .unwrap();
        assert!(cli.strict);
        match cli.command {
            Commands::Complete {
                format,
                no_descriptions,
                words,
                line,
                trailing_space,
            } => {
                assert_eq!(format, FormatArg::Json);
                assert!(no_descriptions);
                assert!(!trailing_space);
                assert!(line.is_none());
                assert_eq!(words, vec!["storage", "-"]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_tree_path() {
        let cli = Cli::try_parse_from(["spectree", "tree", "compute", "instance"]).unwrap();
        match cli.command {
            Commands::Tree { path } => assert_eq!(path, vec!["compute", "instance"]),
            other => panic!("unexpected command {other:?}"),
        }
    }
}
