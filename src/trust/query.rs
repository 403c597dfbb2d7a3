// trust/query.rs - Trust Queries and Verdicts

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::entity::{AssertionLevel, EntityName, ValidityLevel};
use super::paths::{PathExplainer, PathLimits, PathSearch, TrustPath};
use super::store::TrustAssertionStore;
use super::validity::{ValidityEngine, ValidityMap};
use crate::observability::record_trust_check;

pub const REASON_UNKNOWN_ENTITY: &str = "unknown entity";
pub const REASON_NOT_TRUSTED: &str = "not trusted by viewer";
pub const REASON_SELF_TRUST: &str = "self trust (implicit)";
pub const REASON_COMPLETE: &str = "complete trust path exists";

/// Outcome of a trust check, with the paths that justify it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustVerdict {
    pub trusted: bool,
    pub trust_level: ValidityLevel,
    pub reason: String,
    pub paths: Vec<TrustPath>,

    /// Path limits cut the evidence short
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub truncated: bool,
}

impl TrustVerdict {
    fn untrusted(reason: &str) -> Self {
        Self {
            trusted: false,
            trust_level: ValidityLevel::Invalid,
            reason: reason.to_owned(),
            paths: Vec::new(),
            truncated: false,
        }
    }

    fn implicit(viewer: &EntityName) -> Self {
        Self {
            trusted: true,
            trust_level: ValidityLevel::Implicit,
            reason: REASON_SELF_TRUST.to_owned(),
            paths: vec![TrustPath::trivial(viewer.clone())],
            truncated: false,
        }
    }

    fn from_search(level: ValidityLevel, reason: String, search: PathSearch) -> Self {
        Self {
            trusted: true,
            trust_level: level,
            reason,
            paths: search.paths,
            truncated: search.truncated,
        }
    }

    /// Paths as plain name lists
    pub fn path_names(&self) -> Vec<Vec<String>> {
        self.paths.iter().map(TrustPath::to_names).collect()
    }
}

/// Single entry point composing validity and path explanation
pub struct TrustQueryFacade<'a> {
    store: &'a TrustAssertionStore,
    limits: PathLimits,
}

impl<'a> TrustQueryFacade<'a> {
    pub fn new(store: &'a TrustAssertionStore) -> Self {
        Self {
            store,
            limits: PathLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: PathLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Decide whether `viewer` trusts `target`, and why
    pub fn check_trust(&self, viewer: &str, target: &str) -> TrustVerdict {
        self.evaluate(viewer, target, || {
            Cow::Owned(ValidityEngine::new(self.store).compute_validity_map(viewer))
        })
    }

    /// Same as [`check_trust`](Self::check_trust) with an already computed map
    ///
    /// `validity` must be the map for `viewer` over this store.
    pub fn check_trust_with(
        &self,
        viewer: &str,
        target: &str,
        validity: &ValidityMap,
    ) -> TrustVerdict {
        self.evaluate(viewer, target, || Cow::Borrowed(validity))
    }

    fn evaluate<'m>(
        &self,
        viewer: &str,
        target: &str,
        validity: impl FnOnce() -> Cow<'m, ValidityMap>,
    ) -> TrustVerdict {
        let verdict = if !self.store.contains(viewer) || !self.store.contains(target) {
            TrustVerdict::untrusted(REASON_UNKNOWN_ENTITY)
        } else if viewer == target {
            TrustVerdict::implicit(&viewer.into())
        } else {
            self.classify(viewer, target, &validity())
        };
        self.finish(viewer, target, verdict)
    }

    fn classify(&self, viewer: &str, target: &str, validity: &ValidityMap) -> TrustVerdict {
        let explainer = PathExplainer::new(self.store).with_limits(self.limits);

        match validity.get(target) {
            ValidityLevel::Complete => {
                let search = explainer.search(viewer, target, validity, AssertionLevel::Complete);
                TrustVerdict::from_search(ValidityLevel::Complete, REASON_COMPLETE.to_owned(), search)
            }
            ValidityLevel::Marginal => {
                let search = explainer.search(viewer, target, validity, AssertionLevel::Partial);
                let reason = format!(
                    "marginal trust through {} partial trust paths",
                    search.paths.len()
                );
                TrustVerdict::from_search(ValidityLevel::Marginal, reason, search)
            }
            // Implicit is only ever the viewer's own level
            ValidityLevel::Invalid | ValidityLevel::Implicit => {
                TrustVerdict::untrusted(REASON_NOT_TRUSTED)
            }
        }
    }

    fn finish(&self, viewer: &str, target: &str, verdict: TrustVerdict) -> TrustVerdict {
        record_trust_check(verdict.trust_level);
        debug!(
            viewer = %viewer,
            target = %target,
            trusted = verdict.trusted,
            level = %verdict.trust_level,
            paths = verdict.paths.len(),
            "Trust checked"
        );
        verdict
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use AssertionLevel::{Complete, Partial};

    fn store_with(names: &[&str], edges: &[(&str, &str, AssertionLevel)]) -> TrustAssertionStore {
        let mut store = TrustAssertionStore::new();
        for name in names {
            store.register_entity(*name);
        }
        for (signer, target, level) in edges {
            store.assert_trust(signer, target, *level).unwrap();
        }
        store
    }

    #[test]
    fn test_marginal_scenario() {
        let store = store_with(
            &["A", "B", "C", "D"],
            &[("A", "B", Complete), ("B", "D", Partial), ("C", "D", Partial), ("A", "C", Complete)],
        );
        let verdict = TrustQueryFacade::new(&store).check_trust("A", "D");

        assert!(verdict.trusted);
        assert_eq!(verdict.trust_level, ValidityLevel::Marginal);
        assert_eq!(verdict.path_names(), vec![vec!["A", "B", "D"], vec!["A", "C", "D"]]);
        assert_eq!(verdict.reason, "marginal trust through 2 partial trust paths");
        assert!(!verdict.truncated);
    }

    #[test]
    fn test_no_assertions_not_trusted() {
        let store = store_with(&["A", "B"], &[]);
        let verdict = TrustQueryFacade::new(&store).check_trust("A", "B");

        assert!(!verdict.trusted);
        assert_eq!(verdict.trust_level, ValidityLevel::Invalid);
        assert_eq!(verdict.reason, REASON_NOT_TRUSTED);
        assert!(verdict.paths.is_empty());
    }

    #[test]
    fn test_self_trust() {
        let store = store_with(&["v"], &[]);
        let verdict = TrustQueryFacade::new(&store).check_trust("v", "v");

        assert!(verdict.trusted);
        assert_eq!(verdict.trust_level, ValidityLevel::Implicit);
        assert_eq!(verdict.path_names(), vec![vec!["v"]]);
    }

    #[test]
    fn test_unknown_entity() {
        let store = store_with(&["a"], &[]);
        let facade = TrustQueryFacade::new(&store);

        for (viewer, target) in [("a", "ghost"), ("ghost", "a"), ("ghost", "ghost")] {
            let verdict = facade.check_trust(viewer, target);
            assert!(!verdict.trusted);
            assert_eq!(verdict.trust_level, ValidityLevel::Invalid);
            assert_eq!(verdict.reason, REASON_UNKNOWN_ENTITY);
            assert!(verdict.paths.is_empty());
        }
    }

    #[test]
    fn test_complete_chain_and_direction() {
        let store = store_with(&["a", "b", "c"], &[("a", "b", Complete), ("b", "c", Complete)]);
        let facade = TrustQueryFacade::new(&store);

        let forward = facade.check_trust("a", "c");
        assert!(forward.trusted);
        assert_eq!(forward.trust_level, ValidityLevel::Complete);
        assert_eq!(forward.reason, REASON_COMPLETE);
        assert_eq!(forward.path_names(), vec![vec!["a", "b", "c"]]);

        let backward = facade.check_trust("c", "a");
        assert!(!backward.trusted);
        assert_eq!(backward.reason, REASON_NOT_TRUSTED);
    }

    #[test]
    fn test_limits_flag_truncation() {
        let store = store_with(
            &["A", "B", "C", "D"],
            &[("A", "B", Complete), ("A", "C", Complete), ("B", "D", Partial), ("C", "D", Partial)],
        );
        let verdict = TrustQueryFacade::new(&store)
            .with_limits(PathLimits {
                max_depth: None,
                max_paths: Some(1),
            })
            .check_trust("A", "D");

        assert!(verdict.trusted);
        assert_eq!(verdict.paths.len(), 1);
        assert!(verdict.truncated);
    }

    #[test]
    fn test_check_trust_with_precomputed_map() {
        let store = store_with(&["a", "b", "c"], &[("a", "b", Complete), ("b", "c", Partial)]);
        let facade = TrustQueryFacade::new(&store);
        let map = ValidityEngine::new(&store).compute_validity_map("a");

        assert_eq!(facade.check_trust_with("a", "b", &map), facade.check_trust("a", "b"));
        assert_eq!(facade.check_trust_with("a", "c", &map), facade.check_trust("a", "c"));
        assert_eq!(facade.check_trust_with("a", "a", &map).trust_level, ValidityLevel::Implicit);
    }

    #[test]
    fn test_verdict_json_shape() {
        let store = store_with(&["a", "b"], &[("a", "b", Complete)]);
        let verdict = TrustQueryFacade::new(&store).check_trust("a", "b");
        let json = serde_json::to_value(&verdict).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "trusted": true,
                "trust_level": "complete",
                "reason": "complete trust path exists",
                "paths": [["a", "b"]],
            })
        );
    }
}
