// trust/paths.rs - Trust Path Enumeration

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::entity::{AssertionLevel, EntityName};
use super::store::TrustAssertionStore;
use super::validity::ValidityMap;
use crate::observability::record_paths_found;

/// A simple chain of endorsements `[viewer, ..., target]`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrustPath(Vec<EntityName>);

impl TrustPath {
    /// The single-entity path used for implicit self-trust
    pub fn trivial(viewer: impl Into<EntityName>) -> Self {
        Self(vec![viewer.into()])
    }

    pub fn entities(&self) -> &[EntityName] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of assertions along the path
    pub fn hops(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    pub fn source(&self) -> Option<&EntityName> {
        self.0.first()
    }

    pub fn target(&self) -> Option<&EntityName> {
        self.0.last()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|entity| entity.as_str() == name)
    }

    pub fn to_names(&self) -> Vec<String> {
        self.0.iter().map(|entity| entity.to_string()).collect()
    }
}

impl fmt::Display for TrustPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entity) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{}", entity)?;
        }
        Ok(())
    }
}

/// Optional bounds on path enumeration
///
/// Exhaustive search is exponential on dense graphs. `None` means unbounded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathLimits {
    /// Maximum number of assertions in a returned path
    pub max_depth: Option<usize>,

    /// Maximum number of paths returned
    pub max_paths: Option<usize>,
}

impl PathLimits {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn is_unbounded(&self) -> bool {
        self.max_depth.is_none() && self.max_paths.is_none()
    }
}

/// Result of a path search
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PathSearch {
    pub paths: Vec<TrustPath>,

    /// A limit stopped exploration, so some paths may be missing
    pub truncated: bool,
}

/// Depth-first enumerator of justifying paths
pub struct PathExplainer<'a> {
    store: &'a TrustAssertionStore,
    limits: PathLimits,
}

impl<'a> PathExplainer<'a> {
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

    /// Every simple path from `viewer` to `target` for the given edge type
    ///
    /// `validity` must be the map computed for `viewer`.
    pub fn find_paths(
        &self,
        viewer: &str,
        target: &str,
        validity: &ValidityMap,
        edge_type: AssertionLevel,
    ) -> Vec<TrustPath> {
        self.search(viewer, target, validity, edge_type).paths
    }

    /// Like [`find_paths`](Self::find_paths), also reporting truncation
    ///
    /// An assertion is followed when its level satisfies `edge_type` and its
    /// target is valid in `validity`. Entities already on the current path
    /// are never revisited, but may appear again in other paths. Paths stop at
    /// `target`; the zero-hop self path is never returned.
    pub fn search(
        &self,
        viewer: &str,
        target: &str,
        validity: &ValidityMap,
        edge_type: AssertionLevel,
    ) -> PathSearch {
        let mut result = PathSearch::default();
        if viewer == target || !self.store.contains(viewer) || !self.store.contains(target) {
            return result;
        }

        let mut path: Vec<&str> = vec![viewer];
        let mut on_path: HashSet<&str> = HashSet::from([viewer]);
        let mut stack = vec![self.store.outgoing(viewer)];

        while let Some(edges) = stack.last_mut() {
            let Some(assertion) = edges.next() else {
                stack.pop();
                if let Some(done) = path.pop() {
                    on_path.remove(done);
                }
                continue;
            };

            let next = assertion.target.as_str();
            if !assertion.level.satisfies(edge_type)
                || on_path.contains(next)
                || !validity.is_valid(next)
            {
                continue;
            }

            // Hops in the path once `next` is appended
            let hops = path.len();

            if next == target {
                if self.limits.max_depth.is_some_and(|max| hops > max) {
                    result.truncated = true;
                    continue;
                }
                if self.limits.max_paths.is_some_and(|max| result.paths.len() >= max) {
                    result.truncated = true;
                    break;
                }
                let entities = path.iter().copied().chain([target]).map(EntityName::from);
                result.paths.push(TrustPath(entities.collect()));
                continue;
            }

            if self.limits.max_depth.is_some_and(|max| hops >= max) {
                result.truncated = true;
                continue;
            }

            path.push(next);
            on_path.insert(next);
            stack.push(self.store.outgoing(next));
        }

        record_paths_found(edge_type, result.paths.len(), result.truncated);
        debug!(
            viewer = %viewer,
            target = %target,
            edge_type = %edge_type,
            paths = result.paths.len(),
            truncated = result.truncated,
            "Trust paths enumerated"
        );

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trust::validity::ValidityEngine;
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

    fn names(paths: &[TrustPath]) -> Vec<Vec<String>> {
        paths.iter().map(TrustPath::to_names).collect()
    }

    fn diamond() -> TrustAssertionStore {
        store_with(
            &["A", "B", "C", "D"],
            &[("A", "B", Complete), ("A", "C", Complete), ("B", "D", Partial), ("C", "D", Partial)],
        )
    }

    #[test]
    fn test_partial_paths_through_complete_introducers() {
        let store = diamond();
        let map = ValidityEngine::new(&store).compute_validity_map("A");
        let paths = PathExplainer::new(&store).find_paths("A", "D", &map, Partial);

        assert_eq!(names(&paths), vec![vec!["A", "B", "D"], vec!["A", "C", "D"]]);
    }

    #[test]
    fn test_complete_paths_follow_complete_edges_only() {
        let store = store_with(
            &["a", "b", "c", "x"],
            &[("a", "b", Complete), ("b", "c", Complete), ("a", "x", Partial), ("x", "c", Complete)],
        );
        let map = ValidityEngine::new(&store).compute_validity_map("a");
        let explainer = PathExplainer::new(&store);

        let paths = explainer.find_paths("a", "c", &map, Complete);
        assert_eq!(names(&paths), vec![vec!["a", "b", "c"]]);
        assert_eq!(paths[0].hops(), 2);
        assert_eq!(paths[0].to_string(), "a -> b -> c");
    }

    #[test]
    fn test_invalid_intermediates_are_skipped() {
        let store = store_with(
            &["a", "b", "x", "t"],
            &[("a", "b", Complete), ("b", "t", Complete), ("x", "t", Complete), ("a", "x", Partial)],
        );
        let map = ValidityEngine::new(&store).compute_validity_map("a");
        assert!(!map.is_valid("x"));

        let paths = PathExplainer::new(&store).find_paths("a", "t", &map, Partial);
        assert_eq!(names(&paths), vec![vec!["a", "b", "t"]]);
    }

    #[test]
    fn test_cycles_and_shared_entities() {
        let store = store_with(
            &["a", "b", "c", "t"],
            &[
                ("a", "b", Complete),
                ("a", "c", Complete),
                ("b", "c", Complete),
                ("c", "b", Complete),
                ("b", "t", Complete),
                ("c", "t", Complete),
                ("b", "a", Complete),
            ],
        );
        let map = ValidityEngine::new(&store).compute_validity_map("a");
        let paths = PathExplainer::new(&store).find_paths("a", "t", &map, Complete);

        assert_eq!(
            names(&paths),
            vec![
                vec!["a", "b", "c", "t"],
                vec!["a", "b", "t"],
                vec!["a", "c", "b", "t"],
                vec!["a", "c", "t"],
            ]
        );
        for path in &paths {
            let unique: HashSet<_> = path.entities().iter().collect();
            assert_eq!(unique.len(), path.len());
        }
    }

    #[test]
    fn test_self_and_unknown_yield_nothing() {
        let store = diamond();
        let map = ValidityEngine::new(&store).compute_validity_map("A");
        let explainer = PathExplainer::new(&store);

        assert!(explainer.find_paths("A", "A", &map, Complete).is_empty());
        assert!(explainer.find_paths("A", "nobody", &map, Partial).is_empty());
        assert!(explainer.find_paths("nobody", "D", &map, Partial).is_empty());
    }

    #[test]
    fn test_max_paths_limit() {
        let store = diamond();
        let map = ValidityEngine::new(&store).compute_validity_map("A");
        let explainer = PathExplainer::new(&store).with_limits(PathLimits {
            max_paths: Some(1),
            ..Default::default()
        });

        let search = explainer.search("A", "D", &map, Partial);
        assert_eq!(names(&search.paths), vec![vec!["A", "B", "D"]]);
        assert!(search.truncated);
    }

    #[test]
    fn test_max_depth_limit() {
        let store = store_with(
            &["a", "b", "c", "d"],
            &[("a", "b", Complete), ("b", "c", Complete), ("c", "d", Complete), ("a", "d", Complete)],
        );
        let map = ValidityEngine::new(&store).compute_validity_map("a");

        let unbounded = PathExplainer::new(&store).search("a", "d", &map, Complete);
        assert_eq!(unbounded.paths.len(), 2);
        assert!(!unbounded.truncated);

        let bounded = PathExplainer::new(&store)
            .with_limits(PathLimits {
                max_depth: Some(2),
                max_paths: None,
            })
            .search("a", "d", &map, Complete);
        assert_eq!(names(&bounded.paths), vec![vec!["a", "d"]]);
        assert!(bounded.truncated);
    }

    #[test]
    fn test_limits_not_hit_are_not_truncated() {
        let store = diamond();
        let map = ValidityEngine::new(&store).compute_validity_map("A");
        let search = PathExplainer::new(&store)
            .with_limits(PathLimits {
                max_depth: Some(5),
                max_paths: Some(2),
            })
            .search("A", "D", &map, Partial);

        assert_eq!(search.paths.len(), 2);
        assert!(!search.truncated);
        assert!(PathLimits::default().is_unbounded());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::trust::validity::ValidityEngine;
    use proptest::prelude::*;

    const NAMES: [&str; 6] = ["a", "b", "c", "d", "e", "f"];

    proptest! {
        /// Every returned path is simple, well-formed and uses valid entities
        #[test]
        fn prop_paths_are_simple_and_justified(
            edges in prop::collection::vec((0..NAMES.len(), 0..NAMES.len(), any::<bool>()), 0..30),
            viewer in 0..NAMES.len(),
            target in 0..NAMES.len(),
            complete in any::<bool>(),
        ) {
            let mut store = TrustAssertionStore::new();
            for name in NAMES {
                store.register_entity(name);
            }
            for (signer, target, complete) in edges {
                let level = if complete { AssertionLevel::Complete } else { AssertionLevel::Partial };
                let _ = store.assert_trust(NAMES[signer], NAMES[target], level);
            }

            let (viewer, target) = (NAMES[viewer], NAMES[target]);
            let edge_type = if complete { AssertionLevel::Complete } else { AssertionLevel::Partial };
            let map = ValidityEngine::new(&store).compute_validity_map(viewer);
            let paths = PathExplainer::new(&store).find_paths(viewer, target, &map, edge_type);

            for path in &paths {
                prop_assert!(path.len() >= 2);
                prop_assert_eq!(path.source().map(EntityName::as_str), Some(viewer));
                prop_assert_eq!(path.target().map(EntityName::as_str), Some(target));

                let unique: HashSet<_> = path.entities().iter().collect();
                prop_assert_eq!(unique.len(), path.len());

                for pair in path.entities().windows(2) {
                    let edge = store.assertion(pair[0].as_str(), pair[1].as_str());
                    prop_assert!(edge.is_some_and(|e| e.level.satisfies(edge_type)));
                    prop_assert!(map.is_valid(pair[1].as_str()));
                }
            }
        }
    }
}
