// trust/store.rs - Trust Assertion Store

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::entity::{AssertionLevel, EntityName};
use super::error::TrustError;

/// A signed statement `signer -> target : level`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustAssertion {
    /// Who is vouching
    pub signer: EntityName,

    /// Who is being vouched for
    pub target: EntityName,

    /// Strength of the vouching
    pub level: AssertionLevel,

    /// Unix timestamp of the last write to this edge
    pub asserted_at: i64,
}

/// Summary counts over the store
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub entities: usize,
    pub complete_assertions: usize,
    pub partial_assertions: usize,
}

impl StoreStats {
    pub fn total_assertions(&self) -> usize {
        self.complete_assertions + self.partial_assertions
    }
}

/// Known entities and the directed assertions between them
///
/// Edges are keyed by signer then target, so each ordered pair holds at most
/// one assertion and iteration order is deterministic.
#[derive(Clone, Debug, Default)]
pub struct TrustAssertionStore {
    entities: BTreeSet<EntityName>,
    outgoing: BTreeMap<EntityName, BTreeMap<EntityName, TrustAssertion>>,
    revision: u64,
}

impl TrustAssertionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new entity, reporting duplicates as an error
    pub fn try_register_entity(&mut self, name: impl Into<EntityName>) -> Result<(), TrustError> {
        let name = name.into();
        if self.entities.contains(&name) {
            return Err(TrustError::DuplicateEntity(name));
        }
        self.entities.insert(name);
        self.revision += 1;
        Ok(())
    }

    /// Register a new entity. Returns `false` if the name is already taken.
    pub fn register_entity(&mut self, name: impl Into<EntityName>) -> bool {
        self.try_register_entity(name).is_ok()
    }

    /// Check that an assertion between these two names would be accepted
    pub fn validate_endpoints(&self, signer: &str, target: &str) -> Result<(), TrustError> {
        for name in [signer, target] {
            if !self.contains(name) {
                return Err(TrustError::UnknownEntity(name.into()));
            }
        }
        if signer == target {
            return Err(TrustError::SelfAssertion(signer.into()));
        }
        Ok(())
    }

    /// Insert or overwrite the `signer -> target` assertion, stamped now
    ///
    /// Returns the level that was replaced, if any. On error the store is
    /// left untouched.
    pub fn assert_trust(
        &mut self,
        signer: &str,
        target: &str,
        level: AssertionLevel,
    ) -> Result<Option<AssertionLevel>, TrustError> {
        self.assert_trust_at(signer, target, level, chrono::Utc::now().timestamp())
    }

    /// Like [`assert_trust`](Self::assert_trust) with an explicit unix timestamp
    pub fn assert_trust_at(
        &mut self,
        signer: &str,
        target: &str,
        level: AssertionLevel,
        asserted_at: i64,
    ) -> Result<Option<AssertionLevel>, TrustError> {
        self.validate_endpoints(signer, target)?;

        let assertion = TrustAssertion {
            signer: signer.into(),
            target: target.into(),
            level,
            asserted_at,
        };

        let previous = self
            .outgoing
            .entry(assertion.signer.clone())
            .or_default()
            .insert(assertion.target.clone(), assertion)
            .map(|old| old.level);

        self.revision += 1;
        Ok(previous)
    }

    /// Same as [`assert_trust`](Self::assert_trust) with the level given as text
    ///
    /// Endpoint errors take precedence over a malformed level.
    pub fn assert_trust_str(
        &mut self,
        signer: &str,
        target: &str,
        level: &str,
    ) -> Result<Option<AssertionLevel>, TrustError> {
        self.validate_endpoints(signer, target)?;
        let level: AssertionLevel = level.parse()?;
        self.assert_trust(signer, target, level)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entities.contains(name)
    }

    /// All registered entities in name order
    pub fn entities(&self) -> impl Iterator<Item = &EntityName> {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// The assertion `signer -> target`, if one exists
    pub fn assertion(&self, signer: &str, target: &str) -> Option<&TrustAssertion> {
        self.outgoing.get(signer)?.get(target)
    }

    /// Assertions issued by `signer`, ordered by target
    pub fn outgoing(&self, signer: &str) -> impl Iterator<Item = &TrustAssertion> {
        self.outgoing.get(signer).into_iter().flat_map(|edges| edges.values())
    }

    /// Assertions naming `target`, ordered by signer
    pub fn incoming<'a>(&'a self, target: &'a str) -> impl Iterator<Item = &'a TrustAssertion> {
        self.outgoing.values().filter_map(move |edges| edges.get(target))
    }

    /// Every assertion in the store
    pub fn assertions(&self) -> impl Iterator<Item = &TrustAssertion> {
        self.outgoing.values().flat_map(|edges| edges.values())
    }

    /// Counter bumped by every successful mutation
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn stats(&self) -> StoreStats {
        let mut stats = StoreStats {
            entities: self.entities.len(),
            ..Default::default()
        };
        for assertion in self.assertions() {
            match assertion.level {
                AssertionLevel::Complete => stats.complete_assertions += 1,
                AssertionLevel::Partial => stats.partial_assertions += 1,
            }
        }
        stats
    }

    /// Drop every entity and assertion
    pub fn reset(&mut self) {
        self.entities.clear();
        self.outgoing.clear();
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(names: &[&str]) -> TrustAssertionStore {
        let mut store = TrustAssertionStore::new();
        for name in names {
            assert!(store.register_entity(*name));
        }
        store
    }

    #[test]
    fn test_register_entity() {
        let mut store = TrustAssertionStore::new();
        assert!(store.is_empty());
        assert!(store.register_entity("alice"));
        assert!(!store.register_entity("alice"));
        assert_eq!(
            store.try_register_entity("alice"),
            Err(TrustError::DuplicateEntity("alice".into()))
        );
        assert_eq!(store.len(), 1);
        assert!(store.contains("alice"));
        assert!(!store.contains("bob"));
    }

    #[test]
    fn test_assert_trust_overwrites() {
        let mut store = store_with(&["alice", "bob"]);

        let previous = store.assert_trust("alice", "bob", AssertionLevel::Partial).unwrap();
        assert_eq!(previous, None);

        let previous = store.assert_trust("alice", "bob", AssertionLevel::Complete).unwrap();
        assert_eq!(previous, Some(AssertionLevel::Partial));

        let edge = store.assertion("alice", "bob").unwrap();
        assert_eq!(edge.level, AssertionLevel::Complete);
        assert!(edge.asserted_at > 0);
        assert_eq!(store.stats().total_assertions(), 1);
        assert!(store.assertion("bob", "alice").is_none());
    }

    #[test]
    fn test_unknown_entity_leaves_store_unchanged() {
        let mut store = store_with(&["Y"]);
        let revision = store.revision();

        let err = store.assert_trust_str("X", "Y", "partial").unwrap_err();
        assert_eq!(err, TrustError::UnknownEntity("X".into()));

        let err = store.assert_trust("Y", "Z", AssertionLevel::Partial).unwrap_err();
        assert_eq!(err, TrustError::UnknownEntity("Z".into()));

        assert_eq!(store.revision(), revision);
        assert_eq!(store.stats().total_assertions(), 0);
    }

    #[test]
    fn test_self_assertion_rejected() {
        let mut store = store_with(&["x"]);

        let err = store.assert_trust_str("x", "x", "complete").unwrap_err();
        assert_eq!(err, TrustError::SelfAssertion("x".into()));
        assert!(store.assertion("x", "x").is_none());
        assert_eq!(store.stats().total_assertions(), 0);
    }

    #[test]
    fn test_invalid_level_after_endpoint_checks() {
        let mut store = store_with(&["a", "b"]);

        let err = store.assert_trust_str("a", "b", "ultimate").unwrap_err();
        assert!(matches!(err, TrustError::InvalidLevel(_)));

        // Unknown endpoints are reported before the bad level
        let err = store.assert_trust_str("a", "nobody", "ultimate").unwrap_err();
        assert!(matches!(err, TrustError::UnknownEntity(_)));
        assert!(store.assertion("a", "b").is_none());
    }

    #[test]
    fn test_incoming_and_outgoing() {
        let mut store = store_with(&["a", "b", "c"]);
        store.assert_trust("a", "c", AssertionLevel::Partial).unwrap();
        store.assert_trust("b", "c", AssertionLevel::Complete).unwrap();
        store.assert_trust("a", "b", AssertionLevel::Complete).unwrap();

        let signers: Vec<_> = store.incoming("c").map(|a| a.signer.as_str()).collect();
        assert_eq!(signers, vec!["a", "b"]);

        let targets: Vec<_> = store.outgoing("a").map(|a| a.target.as_str()).collect();
        assert_eq!(targets, vec!["b", "c"]);
        assert_eq!(store.outgoing("c").count(), 0);

        let stats = store.stats();
        assert_eq!(stats.entities, 3);
        assert_eq!(stats.complete_assertions, 2);
        assert_eq!(stats.partial_assertions, 1);
    }

    #[test]
    fn test_rewrite_refreshes_timestamp() {
        let mut store = store_with(&["a", "b"]);
        store.assert_trust_at("a", "b", AssertionLevel::Partial, 1_700_000_000).unwrap();
        assert_eq!(store.assertion("a", "b").unwrap().asserted_at, 1_700_000_000);

        let previous = store
            .assert_trust_at("a", "b", AssertionLevel::Partial, 1_700_000_500)
            .unwrap();
        assert_eq!(previous, Some(AssertionLevel::Partial));
        assert_eq!(store.assertion("a", "b").unwrap().asserted_at, 1_700_000_500);
        assert_eq!(store.stats().total_assertions(), 1);

        let err = store
            .assert_trust_at("a", "a", AssertionLevel::Complete, 1_700_000_900)
            .unwrap_err();
        assert_eq!(err, TrustError::SelfAssertion("a".into()));
    }

    #[test]
    fn test_reset() {
        let mut store = store_with(&["a", "b"]);
        store.assert_trust("a", "b", AssertionLevel::Complete).unwrap();
        let revision = store.revision();

        store.reset();
        assert!(store.is_empty());
        assert_eq!(store.assertions().count(), 0);
        assert!(store.revision() > revision);
        assert!(store.register_entity("a"));
    }
}
