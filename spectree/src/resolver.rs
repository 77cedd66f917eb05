//! Completion resolution
//!
//! [`Resolver::resolve`] walks the complete tokens of a [`CommandLine`] down the
//! [`SpecTree`] and then assembles candidates for the partial token:
//!
//! ```text
//!             subcommand / flag
//!            ┌────────────────┐
//!            ▼                │
//!      ┌────────────┐ flag with value ┌──────────────┐
//! ───▶ │ AT_COMMAND │ ──────────────▶ │ IN_OPTION_ARG │
//!      └────────────┘ ◀────────────── └──────────────┘
//!         │     │        any token
//!         │     │ unknown token
//!         │     ▼
//!         │  ┌───────┐
//!         │  │ ERROR │   (no candidates)
//!         │  └───────┘
//!         │ leaf node, tokens exhausted
//!         ▼
//!    ┌──────────┐
//!    │ TERMINAL │   (options only)
//!    └──────────┘
//! ```
//!
//! Resolution never fails; a token that matches nothing ends in [`ResolverState::Error`]
//! with an empty candidate list.

use crate::candidate::Candidate;
use crate::line::CommandLine;
use crate::tree::{NodeId, OptionId, SpecTree};
use serde::Serialize;

/// Option flag sigil.
const FLAG_SIGIL: char = '-';

/// Separator for inline option values (`--zone=de-fra-1`).
const INLINE_VALUE_SEPARATOR: char = '=';

/// Where the walk ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolverState {
    /// Expecting a subcommand or an option flag
    AtCommand,
    /// The partial token is the value of the option that preceded it
    InOptionArg,
    /// Leaf command with no further tokens; only options are offered
    Terminal,
    /// A complete token matched nothing
    Error,
}

/// Occurrences of one option seen during the walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionOccurrence {
    pub option: OptionId,
    pub count: usize,
    /// Supplied values. Repeatable options accumulate; others keep the last value.
    pub values: Vec<String>,
}

/// Outcome of one resolution request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub state: ResolverState,
    /// Deepest command reached
    pub node: NodeId,
    /// Canonical path of `node`, root included
    pub path: Vec<String>,
    /// Option whose value is being completed in [`ResolverState::InOptionArg`]
    pub pending_option: Option<OptionId>,
    /// The complete token that ended the walk in [`ResolverState::Error`]
    pub unmatched: Option<String>,
    pub occurrences: Vec<OptionOccurrence>,
    pub candidates: Vec<Candidate>,
}

impl Resolution {
    /// Occurrences of `option`, if it was typed.
    pub fn occurrence(&self, option: OptionId) -> Option<&OptionOccurrence> {
        self.occurrences.iter().find(|o| o.option == option)
    }

    /// Candidates the shell may insert verbatim.
    pub fn literals(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter().filter(|c| c.is_literal())
    }
}

/// Walks command lines against one tree.
///
/// The resolver borrows the tree and holds no state between calls, so one tree can serve
/// any number of concurrent requests.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    tree: &'a SpecTree,
}

/// Mutable walk state for a single request.
struct Walk {
    node: NodeId,
    pending: Option<OptionId>,
    unmatched: Option<String>,
    occurrences: Vec<OptionOccurrence>,
}

impl Walk {
    fn record(&mut self, tree: &SpecTree, option: OptionId, value: Option<&str>) {
        let repeatable = tree.option(option).is_repeatable();
        let index = match self.occurrences.iter().position(|o| o.option == option) {
            Some(index) => index,
            None => {
                self.occurrences.push(OptionOccurrence {
                    option,
                    count: 0,
                    values: Vec::new(),
                });
                self.occurrences.len() - 1
            }
        };

        let occurrence = &mut self.occurrences[index];
        occurrence.count += 1;
        if let Some(value) = value {
            if !repeatable {
                occurrence.values.clear();
            }
            occurrence.values.push(value.to_string());
        }
    }
}

/// Split `--name=value` into its alias and inline value.
fn split_inline(token: &str) -> (&str, Option<&str>) {
    match token.split_once(INLINE_VALUE_SEPARATOR) {
        Some((alias, value)) => (alias, Some(value)),
        None => (token, None),
    }
}

impl<'a> Resolver<'a> {
    pub fn new(tree: &'a SpecTree) -> Self {
        Self { tree }
    }

    /// Resolve the candidates for the partial token of `line`.
    pub fn resolve(&self, line: &CommandLine) -> Resolution {
        let tree = self.tree;
        let mut walk = Walk {
            node: tree.root(),
            pending: None,
            unmatched: None,
            occurrences: Vec::new(),
        };

        for token in line.complete_tokens() {
            if let Some(option) = walk.pending.take() {
                tracing::trace!("'{}' is the value of {}", token, tree.option(option).canonical());
                walk.record(tree, option, Some(token.as_str()));
                continue;
            }

            if token.starts_with(FLAG_SIGIL) {
                let (alias, inline) = split_inline(token);
                match tree.lookup_option(walk.node, alias) {
                    Some(option) if tree.option(option).takes_value() => match inline {
                        Some(value) => walk.record(tree, option, Some(value)),
                        None => walk.pending = Some(option),
                    },
                    Some(option) if inline.is_none() => walk.record(tree, option, None),
                    // Flags without a value reject `--flag=value`, complete or partial
                    _ => {
                        walk.unmatched = Some(token.clone());
                        break;
                    }
                }
                continue;
            }

            match tree.child(walk.node, token) {
                Some(child) => {
                    tracing::trace!("'{}' descends into {}", token, tree.path(child).join(" "));
                    walk.node = child;
                }
                None => {
                    walk.unmatched = Some(token.clone());
                    break;
                }
            }
        }

        let (state, candidates) = self.assemble(&mut walk, line.partial());
        if state == ResolverState::Error {
            tracing::debug!(
                "No completions: '{}' matches nothing under '{}'",
                walk.unmatched.as_deref().unwrap_or_default(),
                tree.path(walk.node).join(" ")
            );
        }

        Resolution {
            state,
            node: walk.node,
            path: tree.path(walk.node).into_iter().map(str::to_string).collect(),
            pending_option: walk.pending,
            unmatched: walk.unmatched,
            occurrences: walk.occurrences,
            candidates,
        }
    }

    fn assemble(&self, walk: &mut Walk, partial: &str) -> (ResolverState, Vec<Candidate>) {
        if walk.unmatched.is_some() {
            return (ResolverState::Error, Vec::new());
        }

        if walk.pending.is_none() && partial.starts_with(FLAG_SIGIL) {
            if let (alias, Some(_)) = split_inline(partial) {
                match self.tree.lookup_option(walk.node, alias) {
                    Some(option) if self.tree.option(option).takes_value() => {
                        walk.pending = Some(option);
                    }
                    _ => return (ResolverState::Error, Vec::new()),
                }
            }
        }

        if let Some(option) = walk.pending {
            return (ResolverState::InOptionArg, self.argument_hint(option));
        }

        let state = if self.tree.node(walk.node).has_subcommands() {
            ResolverState::AtCommand
        } else {
            ResolverState::Terminal
        };
        (state, self.candidates(walk.node, partial))
    }

    fn argument_hint(&self, option: OptionId) -> Vec<Candidate> {
        let spec = self.tree.option(option);
        spec.arg()
            .map(|arg| {
                Candidate::argument_hint(
                    &arg.name,
                    spec.canonical(),
                    spec.description(),
                    arg.default.as_deref(),
                )
            })
            .into_iter()
            .collect()
    }

    /// Subcommands first in declaration order, then every non-hidden option alias.
    fn candidates(&self, node: NodeId, prefix: &str) -> Vec<Candidate> {
        let tree = self.tree;
        let mut candidates = Vec::new();

        for &child in tree.node(node).subcommands() {
            let command = tree.node(child);
            if let Some(alias) = tree
                .reachable_names(child)
                .find(|alias| alias.starts_with(prefix))
            {
                candidates.push(Candidate::subcommand(
                    alias,
                    command.canonical(),
                    command.description(),
                ));
            }
        }

        for option in tree.visible_options(node) {
            let spec = tree.option(option);
            if spec.is_hidden() {
                continue;
            }
            candidates.extend(
                tree.reachable_option_names(node, option)
                    .filter(|alias| alias.starts_with(prefix))
                    .map(|alias| Candidate::option(alias, spec.canonical(), spec.description())),
            );
        }

        candidates
    }
}

impl SpecTree {
    /// Shorthand for `Resolver::new(self).resolve(line)`.
    pub fn resolve(&self, line: &CommandLine) -> Resolution {
        Resolver::new(self).resolve(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::CandidateKind;
    use crate::raw::{RawCommand, RawOption};
    use crate::tree::{BuildOptions, ConflictPolicy};

    fn tree() -> SpecTree {
        let raw = RawCommand::new(["exo"])
            .with_option(
                RawOption::new(["--output-format", "-O"])
                    .with_arg("output-format", None)
                    .persistent(),
            )
            .with_option(RawOption::new(["--quiet", "-Q"]).persistent())
            .with_subcommand(
                RawCommand::new(["c", "compute"]).with_subcommand(
                    RawCommand::new(["i", "instance"])
                        .with_option(
                            RawOption::new(["--zone", "-z"])
                                .with_description("instance zone")
                                .with_arg("zone", None),
                        )
                        .with_subcommand(
                            RawCommand::new(["add", "create"])
                                .with_description("Create a Compute instance")
                                .with_option(
                                    RawOption::new(["--label"])
                                        .with_arg("label", None)
                                        .repeatable(),
                                )
                                .with_option(
                                    RawOption::new(["--disk-size"])
                                        .with_arg("disk-size", Some("50")),
                                )
                                .with_option(RawOption::new(["--ipv6"]))
                                .with_option(RawOption::new(["--secret"]).hidden()),
                        )
                        .with_subcommand(RawCommand::new(["ls", "list"])),
                ),
            );
        SpecTree::build(&raw).unwrap()
    }

    fn resolve(tree: &SpecTree, tokens: &[&str], partial: &str) -> Resolution {
        let line = CommandLine::new(
            tokens.iter().map(|t| t.to_string()).collect(),
            partial,
        );
        tree.resolve(&line)
    }

    fn values(resolution: &Resolution) -> Vec<&str> {
        resolution
            .candidates
            .iter()
            .map(|c| c.value.as_str())
            .collect()
    }

    #[test]
    fn test_root_lists_subcommands_then_options() {
        let tree = tree();
        let resolution = resolve(&tree, &[], "");
        assert_eq!(resolution.state, ResolverState::AtCommand);
        assert_eq!(
            values(&resolution),
            vec!["c", "--output-format", "-O", "--quiet", "-Q"]
        );
    }

    #[test]
    fn test_alias_match_inserts_matching_alias_once() {
        let tree = tree();
        let resolution = resolve(&tree, &[], "co");
        assert_eq!(values(&resolution), vec!["compute"]);
        assert_eq!(resolution.candidates[0].canonical, "c");
    }

    #[test]
    fn test_zone_prefix_yields_single_option() {
        let tree = tree();
        let resolution = resolve(&tree, &["compute", "instance"], "--zo");
        assert_eq!(resolution.candidates.len(), 1);
        let zone = &resolution.candidates[0];
        assert_eq!(zone.kind, CandidateKind::Option);
        assert_eq!(zone.value, "--zone");
        assert_eq!(zone.description.as_deref(), Some("instance zone"));
    }

    #[test]
    fn test_option_value_enters_in_option_arg() {
        let tree = tree();
        let resolution = resolve(&tree, &["compute", "instance", "--zone"], "");
        assert_eq!(resolution.state, ResolverState::InOptionArg);
        assert_eq!(resolution.candidates.len(), 1);
        let hint = &resolution.candidates[0];
        assert_eq!(hint.kind, CandidateKind::ArgumentHint);
        assert_eq!(hint.value, "zone");
        assert_eq!(hint.default, None);
        assert!(resolution.literals().next().is_none());
    }

    #[test]
    fn test_hint_carries_default() {
        let tree = tree();
        let resolution = resolve(&tree, &["c", "i", "add", "--disk-size"], "1");
        assert_eq!(resolution.state, ResolverState::InOptionArg);
        assert_eq!(resolution.candidates[0].default.as_deref(), Some("50"));
    }

    #[test]
    fn test_value_token_is_consumed_unconditionally() {
        let tree = tree();
        // "ls" is the zone value here, not the subcommand
        let resolution = resolve(&tree, &["c", "i", "--zone", "ls"], "");
        assert_eq!(resolution.state, ResolverState::AtCommand);
        assert_eq!(resolution.path, vec!["exo", "c", "i"]);
        let zone = tree.lookup_option(resolution.node, "--zone").unwrap();
        assert_eq!(resolution.occurrence(zone).unwrap().values, vec!["ls"]);
    }

    #[test]
    fn test_unknown_token_is_a_dead_end() {
        let tree = tree();
        let resolution = resolve(&tree, &["c", "i", "add", "--foobar"], "");
        assert_eq!(resolution.state, ResolverState::Error);
        assert!(resolution.candidates.is_empty());
        assert_eq!(resolution.unmatched.as_deref(), Some("--foobar"));

        let resolution = resolve(&tree, &["compute", "nope", "i"], "--");
        assert_eq!(resolution.state, ResolverState::Error);
        assert!(resolution.candidates.is_empty());
    }

    #[test]
    fn test_leaf_is_terminal_with_inherited_options() {
        let tree = tree();
        let resolution = resolve(&tree, &["c", "i", "ls"], "");
        assert_eq!(resolution.state, ResolverState::Terminal);
        assert_eq!(
            values(&resolution),
            vec!["--output-format", "-O", "--quiet", "-Q"]
        );
    }

    #[test]
    fn test_hidden_option_is_typeable_but_not_offered() {
        let tree = tree();
        let offered = resolve(&tree, &["c", "i", "add"], "--s");
        assert!(offered.candidates.is_empty());

        let typed = resolve(&tree, &["c", "i", "add", "--secret"], "--ip");
        assert_eq!(typed.state, ResolverState::Terminal);
        assert_eq!(values(&typed), vec!["--ipv6"]);
    }

    #[test]
    fn test_repeatable_values_accumulate() {
        let tree = tree();
        let resolution = resolve(
            &tree,
            &["c", "i", "add", "--label", "a", "--label=b", "-O", "json", "-O", "text"],
            "",
        );
        let add = resolution.node;
        let label = tree.lookup_option(add, "--label").unwrap();
        let label = resolution.occurrence(label).unwrap();
        assert_eq!(label.count, 2);
        assert_eq!(label.values, vec!["a", "b"]);

        let format = tree.lookup_option(add, "-O").unwrap();
        let format = resolution.occurrence(format).unwrap();
        assert_eq!(format.count, 2);
        assert_eq!(format.values, vec!["text"]);
    }

    #[test]
    fn test_inline_partial_value_gives_hint() {
        let tree = tree();
        let resolution = resolve(&tree, &["c", "i"], "--zone=de");
        assert_eq!(resolution.state, ResolverState::InOptionArg);
        assert_eq!(resolution.candidates[0].value, "zone");

        let resolution = resolve(&tree, &["c", "i", "add"], "--ipv6=");
        assert_eq!(resolution.state, ResolverState::Error);
    }

    #[test]
    fn test_inline_value_on_flag_is_a_dead_end() {
        let tree = tree();
        let finished = resolve(&tree, &["c", "i", "add", "--ipv6=false"], "--d");
        assert_eq!(finished.state, ResolverState::Error);
        assert!(finished.candidates.is_empty());
        assert_eq!(finished.unmatched.as_deref(), Some("--ipv6=false"));

        let typing = resolve(&tree, &["c", "i", "add"], "--ipv6=fa");
        assert_eq!(typing.state, ResolverState::Error);
        assert!(typing.candidates.is_empty());

        let plain = resolve(&tree, &["c", "i", "add", "--ipv6"], "--d");
        assert_eq!(plain.state, ResolverState::Terminal);
        assert_eq!(values(&plain), vec!["--disk-size"]);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let tree = tree();
        let first = resolve(&tree, &["c"], "");
        let second = resolve(&tree, &["c"], "");
        assert_eq!(first, second);
    }

    #[test]
    fn test_first_wins_offers_each_sibling_once() {
        let raw = RawCommand::new(["exo"])
            .with_subcommand(RawCommand::new(["ls", "list"]))
            .with_subcommand(RawCommand::new(["ls", "versions"]));
        let options = BuildOptions::default().with_conflict_policy(ConflictPolicy::FirstWins);
        let tree = SpecTree::build_with(&raw, &options).unwrap();

        let all = resolve(&tree, &[], "");
        assert_eq!(values(&all), vec!["ls", "versions"]);
        assert_eq!(all.candidates[1].canonical, "ls");

        let ls = resolve(&tree, &[], "l");
        assert_eq!(values(&ls), vec!["ls"]);
    }
}
