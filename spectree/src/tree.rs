//! Normalized, indexed command specification tree
//!
//! The tree is built once from a [`RawCommand`] and never mutated afterwards. Commands and
//! options live in two arenas addressed by [`NodeId`] and [`OptionId`]; every node keeps an
//! alias index over its direct subcommands and over its own options.
//!
//! Persistent options are not copied into descendants. A lookup walks the parent chain and
//! consults each ancestor's persistent index, so the innermost scope is checked first:
//!
//! ```text
//! exo                 --config -C --quiet -Q --help -h   (persistent)
//! └── compute
//!     └── instance
//!         └── ls      --zone -z                          (local)
//! ```
//!
//! At `exo compute instance ls` the visible options are `--zone`, then every persistent
//! option of `exo`.

use crate::error::{Conflict, ConflictKind, Result, SpecError};
use crate::raw::{RawCommand, RawOption};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Index of a command node in a [`SpecTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(usize);

/// Index of an option in a [`SpecTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct OptionId(usize);

/// What to do when two entries claim the same alias in one scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictPolicy {
    /// Fail construction with [`SpecError::Conflict`].
    #[default]
    Strict,
    /// Keep the first declared owner of the alias and record the collision.
    FirstWins,
}

/// Options controlling [`SpecTree::build_with`].
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub conflict_policy: ConflictPolicy,
    /// Append a derived `help` command mirroring the tree without options.
    pub help_projection: bool,
}

impl BuildOptions {
    pub fn with_conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.conflict_policy = policy;
        self
    }

    pub fn with_help_projection(mut self, enabled: bool) -> Self {
        self.help_projection = enabled;
        self
    }
}

/// The value slot of an option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArgSpec {
    /// Placeholder shown to the user; never a literal token
    pub name: String,
    /// Advisory default, displayed as a hint only
    pub default: Option<String>,
}

/// One flag, owned by the node that declares it.
#[derive(Debug, Clone, Serialize)]
pub struct OptionSpec {
    names: Vec<String>,
    description: Option<String>,
    arg: Option<ArgSpec>,
    repeatable: bool,
    persistent: bool,
    hidden: bool,
    owner: NodeId,
}

impl OptionSpec {
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn canonical(&self) -> &str {
        &self.names[0]
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn arg(&self) -> Option<&ArgSpec> {
        self.arg.as_ref()
    }

    /// True when the option consumes the following token as its value.
    pub fn takes_value(&self) -> bool {
        self.arg.is_some()
    }

    pub fn is_repeatable(&self) -> bool {
        self.repeatable
    }

    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// The node declaring this option.
    pub fn owner(&self) -> NodeId {
        self.owner
    }
}

/// One command or subcommand.
#[derive(Debug, Clone)]
pub struct CommandNode {
    names: Vec<String>,
    description: Option<String>,
    parent: Option<NodeId>,
    depth: usize,
    subcommands: Vec<NodeId>,
    options: Vec<OptionId>,
    children: IndexMap<String, NodeId>,
    local_options: IndexMap<String, OptionId>,
    persistent_options: IndexMap<String, OptionId>,
    derived: bool,
}

impl CommandNode {
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// The first alias, used in help text and programmatic references.
    pub fn canonical(&self) -> &str {
        &self.names[0]
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Distance from the root (the root is 0).
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Direct subcommands in declaration order.
    pub fn subcommands(&self) -> &[NodeId] {
        &self.subcommands
    }

    /// Options declared on this node in declaration order.
    pub fn options(&self) -> &[OptionId] {
        &self.options
    }

    pub fn has_subcommands(&self) -> bool {
        !self.subcommands.is_empty()
    }

    /// True for nodes generated by the help projection.
    pub fn is_derived(&self) -> bool {
        self.derived
    }
}

/// Immutable command specification tree with alias indexes.
///
/// `SpecTree` holds no interior mutability and can be shared across threads behind an
/// `Arc` without locking.
#[derive(Debug, Clone)]
pub struct SpecTree {
    nodes: Vec<CommandNode>,
    options: Vec<OptionSpec>,
    conflicts: Vec<Conflict>,
}

impl SpecTree {
    /// Build a tree with the default options (strict conflicts, no help projection).
    pub fn build(raw: &RawCommand) -> Result<Self> {
        Self::build_with(raw, &BuildOptions::default())
    }

    /// Build a tree, validating alias uniqueness at every scope.
    pub fn build_with(raw: &RawCommand, options: &BuildOptions) -> Result<Self> {
        let mut builder = TreeBuilder {
            tree: SpecTree {
                nodes: Vec::new(),
                options: Vec::new(),
                conflicts: Vec::new(),
            },
            policy: options.conflict_policy,
            help_projection: options.help_projection,
        };

        let root = builder.insert_command(raw, None, false)?;
        if options.help_projection {
            crate::help::attach(&mut builder, root)?;
        }

        let tree = builder.tree;
        tracing::debug!(
            "Built specification tree '{}' with {} commands, {} options, {} conflicts",
            tree.node(tree.root()).canonical(),
            tree.nodes.len(),
            tree.options.len(),
            tree.conflicts.len()
        );
        Ok(tree)
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &CommandNode {
        &self.nodes[id.0]
    }

    pub fn option(&self, id: OptionId) -> &OptionSpec {
        &self.options[id.0]
    }

    /// Number of command nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    /// Alias collisions recorded under [`ConflictPolicy::FirstWins`].
    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    /// All node ids in pre-order (parents before children, siblings in declaration order).
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Resolve a subcommand alias among the direct children of `node`.
    pub fn child(&self, node: NodeId, alias: &str) -> Option<NodeId> {
        self.node(node).children.get(alias).copied()
    }

    /// Resolve an option alias visible at `node`: its own options first, then the
    /// persistent options of each ancestor from the nearest outward.
    pub fn lookup_option(&self, node: NodeId, alias: &str) -> Option<OptionId> {
        if let Some(id) = self.node(node).local_options.get(alias) {
            return Some(*id);
        }
        self.lookup_inherited(self.node(node).parent, alias)
    }

    fn lookup_inherited(&self, mut scope: Option<NodeId>, alias: &str) -> Option<OptionId> {
        while let Some(id) = scope {
            let node = self.node(id);
            if let Some(option) = node.persistent_options.get(alias) {
                return Some(*option);
            }
            scope = node.parent;
        }
        None
    }

    /// Every option usable at `node`, in presentation order.
    pub fn visible_options(&self, node: NodeId) -> Vec<OptionId> {
        let mut visible: Vec<OptionId> = self.node(node).options.clone();
        let mut scope = self.node(node).parent;
        while let Some(id) = scope {
            let ancestor = self.node(id);
            visible.extend(
                ancestor
                    .options
                    .iter()
                    .copied()
                    .filter(|option| self.option(*option).persistent),
            );
            scope = ancestor.parent;
        }
        visible
    }

    /// Canonical names from the root down to `node`, root included.
    pub fn path(&self, node: NodeId) -> Vec<&str> {
        let mut path = Vec::with_capacity(self.node(node).depth + 1);
        let mut scope = Some(node);
        while let Some(id) = scope {
            path.push(self.node(id).canonical());
            scope = self.node(id).parent;
        }
        path.reverse();
        path
    }

    /// Follow a sequence of subcommand aliases from the root.
    pub fn find<S: AsRef<str>>(&self, aliases: &[S]) -> Option<NodeId> {
        aliases
            .iter()
            .try_fold(self.root(), |node, alias| self.child(node, alias.as_ref()))
    }

    /// Aliases of `node` that actually resolve to it in its parent's index.
    ///
    /// Under [`ConflictPolicy::FirstWins`] an alias lost to an earlier sibling is skipped.
    pub fn reachable_names(&self, node: NodeId) -> impl Iterator<Item = &str> + '_ {
        let parent = self.node(node).parent;
        self.node(node)
            .names
            .iter()
            .map(String::as_str)
            .filter(move |alias| match parent {
                Some(parent) => self.child(parent, alias) == Some(node),
                None => true,
            })
    }

    /// Aliases of `option` that resolve to it when looked up at `node`.
    pub fn reachable_option_names(
        &self,
        node: NodeId,
        option: OptionId,
    ) -> impl Iterator<Item = &str> + '_ {
        self.option(option)
            .names
            .iter()
            .map(String::as_str)
            .filter(move |alias| self.lookup_option(node, alias) == Some(option))
    }
}

/// Mutable state while a tree is assembled.
pub(crate) struct TreeBuilder {
    tree: SpecTree,
    policy: ConflictPolicy,
    help_projection: bool,
}

impl TreeBuilder {
    pub(crate) fn tree(&self) -> &SpecTree {
        &self.tree
    }

    fn scope_label(&self, node: NodeId) -> String {
        self.tree.path(node).join(" ")
    }

    /// Record a collision or fail, depending on the policy.
    fn conflict(&mut self, conflict: Conflict) -> Result<()> {
        match self.policy {
            ConflictPolicy::Strict => Err(SpecError::Conflict(conflict)),
            ConflictPolicy::FirstWins => {
                tracing::warn!("Keeping first declaration: {}", conflict);
                self.tree.conflicts.push(conflict);
                Ok(())
            }
        }
    }

    pub(crate) fn insert_command(
        &mut self,
        raw: &RawCommand,
        parent: Option<NodeId>,
        derived: bool,
    ) -> Result<NodeId> {
        let names = validated_names(&raw.name, || match parent {
            Some(parent) => format!("{} <subcommand>", self.scope_label(parent)),
            None => "<root>".to_string(),
        })?;

        let id = NodeId(self.tree.nodes.len());
        let depth = parent.map_or(0, |p| self.tree.node(p).depth + 1);
        self.tree.nodes.push(CommandNode {
            names,
            description: raw.description.clone(),
            parent,
            depth,
            subcommands: Vec::new(),
            options: Vec::new(),
            children: IndexMap::new(),
            local_options: IndexMap::new(),
            persistent_options: IndexMap::new(),
            derived,
        });

        for raw_option in &raw.options {
            self.insert_option(id, raw_option)?;
        }

        for raw_child in &raw.subcommands {
            if parent.is_none() && self.help_projection && is_authored_help(raw_child) {
                tracing::warn!(
                    "Dropping hand-authored 'help' subtree; it is derived from the command tree"
                );
                continue;
            }
            let child = self.insert_command(raw_child, Some(id), derived)?;
            self.index_child(id, child)?;
        }

        Ok(id)
    }

    /// Register an already inserted node under `parent`.
    pub(crate) fn index_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.tree.nodes[parent.0].subcommands.push(child);

        let names = self.tree.node(child).names.clone();
        for alias in names {
            match self.tree.node(parent).children.get(&alias).copied() {
                Some(existing) if existing == child => {}
                Some(existing) => {
                    let conflict = Conflict {
                        kind: ConflictKind::Subcommand,
                        scope: self.scope_label(parent),
                        alias,
                        first: self.tree.node(existing).canonical().to_string(),
                        second: self.tree.node(child).canonical().to_string(),
                    };
                    self.conflict(conflict)?;
                }
                None => {
                    self.tree.nodes[parent.0].children.insert(alias, child);
                }
            }
        }
        Ok(())
    }

    fn insert_option(&mut self, node: NodeId, raw: &RawOption) -> Result<OptionId> {
        let names = validated_names(&raw.name, || {
            format!("{} <option>", self.scope_label(node))
        })?;

        let arg = match raw.args.as_slice() {
            [] => None,
            [arg] => Some(ArgSpec {
                name: arg.name.clone(),
                default: arg.default.clone(),
            }),
            _ => {
                return Err(SpecError::invalid(
                    format!("{} {}", self.scope_label(node), names[0]),
                    format!("options take at most one argument, found {}", raw.args.len()),
                ))
            }
        };

        let id = OptionId(self.tree.options.len());
        self.tree.options.push(OptionSpec {
            names: names.clone(),
            description: raw.description.clone(),
            arg,
            repeatable: raw.is_repeatable,
            persistent: raw.is_persistent,
            hidden: raw.hidden,
            owner: node,
        });
        self.tree.nodes[node.0].options.push(id);

        for alias in names {
            let local = self.tree.node(node).local_options.get(&alias).copied();
            let inherited = self
                .tree
                .lookup_inherited(self.tree.node(node).parent, &alias);

            match local.or(inherited) {
                Some(existing) if existing == id => {}
                Some(existing) => {
                    let conflict = Conflict {
                        kind: ConflictKind::Option,
                        scope: self.scope_label(node),
                        alias,
                        first: self.tree.option(existing).canonical().to_string(),
                        second: self.tree.option(id).canonical().to_string(),
                    };
                    self.conflict(conflict)?;
                }
                None => {
                    let entry = &mut self.tree.nodes[node.0];
                    if raw.is_persistent {
                        entry.persistent_options.insert(alias.clone(), id);
                    }
                    entry.local_options.insert(alias, id);
                }
            }
        }

        Ok(id)
    }
}

fn is_authored_help(raw: &RawCommand) -> bool {
    raw.name.first().is_some_and(|name| name == "help")
}

fn validated_names(names: &[String], location: impl FnOnce() -> String) -> Result<Vec<String>> {
    if names.is_empty() {
        return Err(SpecError::invalid(location(), "at least one name is required"));
    }
    if let Some(blank) = names.iter().find(|name| name.trim().is_empty() || name.contains(char::is_whitespace)) {
        return Err(SpecError::invalid(
            location(),
            format!("alias '{blank}' must be a non-empty word without whitespace"),
        ));
    }
    Ok(names.to_vec())
}
