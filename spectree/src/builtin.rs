//! Command specifications bundled with the crate

use crate::error::Result;
use crate::raw::RawCommand;

const EXO_SPEC: &str = include_str!("../data/exo.json");

/// The Exoscale `exo` CLI command surface.
pub fn exo() -> Result<RawCommand> {
    RawCommand::from_json(EXO_SPEC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{BuildOptions, ConflictPolicy, SpecTree};

    #[test]
    fn test_bundled_spec_parses() {
        let raw = exo().unwrap();
        assert_eq!(raw.name, vec!["exo"]);
        assert_eq!(raw.subcommands[1].name, vec!["c", "compute"]);
    }

    #[test]
    fn test_bundled_spec_has_known_collisions() {
        let raw = exo().unwrap();
        assert!(SpecTree::build(&raw).is_err());

        let options = BuildOptions::default().with_conflict_policy(ConflictPolicy::FirstWins);
        let tree = SpecTree::build_with(&raw, &options).unwrap();
        let scopes: Vec<&str> = tree.conflicts().iter().map(|c| c.scope.as_str()).collect();
        assert!(scopes.contains(&"exo iam key"));
        assert!(scopes.contains(&"exo dns"));
        assert_eq!(tree.conflicts().len(), 6);
    }
}
