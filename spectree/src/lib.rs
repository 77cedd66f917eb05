//! Command specification trees and shell completion resolution.
//!
//! A command surface (nested subcommands, aliases, options, option arguments) is authored
//! as static data, normalized once into an immutable [`SpecTree`], and then queried per
//! keystroke by the [`Resolver`] to find the tokens a shell may offer next.
//!
//! # Example
//!
//! ```rust
//! use spectree::{CommandLine, RawCommand, RawOption, SpecTree, ResolverState};
//!
//! let raw = RawCommand::new(["exo"])
//!     .with_option(RawOption::new(["--quiet", "-Q"]).persistent())
//!     .with_subcommand(
//!         RawCommand::new(["c", "compute"]).with_subcommand(
//!             RawCommand::new(["ls", "list"]).with_option(
//!                 RawOption::new(["--zone", "-z"])
//!                     .with_description("instance zone")
//!                     .with_arg("zone", None),
//!             ),
//!         ),
//!     );
//! let tree = SpecTree::build(&raw)?;
//!
//! let resolution = tree.resolve(&CommandLine::parse("compute ls --z"));
//! assert_eq!(resolution.state, ResolverState::Terminal);
//! assert_eq!(resolution.candidates[0].value, "--zone");
//!
//! let resolution = tree.resolve(&CommandLine::parse("compute ls --zone "));
//! assert_eq!(resolution.state, ResolverState::InOptionArg);
//! # Ok::<(), spectree::SpecError>(())
//! ```
//!
//! # Bundled data
//!
//! [`builtin::exo`] returns the command surface of the Exoscale `exo` CLI. That data
//! declares a few colliding sibling aliases, so it only builds with
//! [`ConflictPolicy::FirstWins`]; the collisions are then reported by
//! [`SpecTree::conflicts`].

pub mod builtin;
mod candidate;
mod error;
pub mod help;
mod line;
mod raw;
pub mod render;
mod resolver;
mod tree;

pub use candidate::{Candidate, CandidateKind};
pub use error::{Conflict, ConflictKind, Result, SpecError};
pub use line::CommandLine;
pub use raw::{RawArg, RawCommand, RawOption};
pub use render::{render, Directive, Format, RenderOptions};
pub use resolver::{OptionOccurrence, Resolution, Resolver, ResolverState};
pub use tree::{
    ArgSpec, BuildOptions, CommandNode, ConflictPolicy, NodeId, OptionId, OptionSpec, SpecTree,
};
