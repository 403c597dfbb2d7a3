// trust/validity.rs - Viewer-relative Validity Calculation

use std::collections::BTreeMap;
use std::time::Instant;

use serde::Serialize;
use tracing::debug;

use super::entity::{AssertionLevel, EntityName, ValidityLevel};
use super::store::TrustAssertionStore;
use crate::observability::record_validity_computation;

/// Number of distinct valid signers needed for marginal validity
pub const MARGINALS_NEEDED: usize = 2;

/// Validity of every known entity from one viewer's perspective
///
/// Derived from a single store snapshot and never persisted.
#[derive(Clone, Debug, Serialize)]
pub struct ValidityMap {
    viewer: EntityName,
    levels: BTreeMap<EntityName, ValidityLevel>,
    passes: usize,
}

impl ValidityMap {
    /// The entity this map was computed for
    pub fn viewer(&self) -> &EntityName {
        &self.viewer
    }

    /// Level of `name`; unknown names are `Invalid`
    pub fn get(&self, name: &str) -> ValidityLevel {
        self.levels.get(name).copied().unwrap_or_default()
    }

    pub fn is_valid(&self, name: &str) -> bool {
        self.get(name).is_valid()
    }

    /// Entries in name order
    pub fn iter(&self) -> impl Iterator<Item = (&EntityName, ValidityLevel)> {
        self.levels.iter().map(|(name, level)| (name, *level))
    }

    /// Number of full passes the fixed point took (0 for an unknown viewer)
    pub fn passes(&self) -> usize {
        self.passes
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn count(&self, level: ValidityLevel) -> usize {
        self.levels.values().filter(|l| **l == level).count()
    }

    /// Entities at or above `min`, excluding the viewer itself
    pub fn valid_entities(&self, min: ValidityLevel) -> Vec<&EntityName> {
        self.levels
            .iter()
            .filter(|(name, level)| **level >= min && level.is_valid() && **name != self.viewer)
            .map(|(name, _)| name)
            .collect()
    }
}

/// Computes validity maps over a borrowed store snapshot
pub struct ValidityEngine<'a> {
    store: &'a TrustAssertionStore,
}

impl<'a> ValidityEngine<'a> {
    pub fn new(store: &'a TrustAssertionStore) -> Self {
        Self { store }
    }

    /// Least fixed point of the promotion rules for `viewer`
    ///
    /// Every entity starts `Invalid` (the viewer `Implicit`) and full passes
    /// promote entities until a pass changes nothing. Levels only move up
    /// `Invalid -> Marginal -> Complete`, so there are at most
    /// `2 * |entities|` promotions.
    pub fn compute_validity_map(&self, viewer: &str) -> ValidityMap {
        let started = Instant::now();

        let mut levels: BTreeMap<EntityName, ValidityLevel> = self
            .store
            .entities()
            .map(|name| (name.clone(), ValidityLevel::Invalid))
            .collect();

        if !self.store.contains(viewer) {
            debug!(viewer = %viewer, "Unknown viewer, every entity is invalid");
            return ValidityMap {
                viewer: viewer.into(),
                levels,
                passes: 0,
            };
        }
        levels.insert(viewer.into(), ValidityLevel::Implicit);

        let mut incoming: BTreeMap<&EntityName, Vec<(&EntityName, AssertionLevel)>> =
            BTreeMap::new();
        for assertion in self.store.assertions() {
            incoming
                .entry(&assertion.target)
                .or_default()
                .push((&assertion.signer, assertion.level));
        }

        let entities: Vec<&EntityName> = self.store.entities().collect();
        let mut passes = 0;
        let mut promotions = 0;

        loop {
            passes += 1;
            let mut changed = 0;

            for &entity in &entities {
                let current = levels.get(entity).copied().unwrap_or_default();
                if current.is_terminal() {
                    continue;
                }

                let edges = incoming.get(entity).map(Vec::as_slice).unwrap_or(&[]);
                let next = promote(viewer, current, edges, &levels);
                if next > current {
                    levels.insert(entity.clone(), next);
                    changed += 1;
                }
            }

            promotions += changed;
            if changed == 0 {
                break;
            }
        }
        debug_assert!(promotions <= 2 * entities.len());

        let map = ValidityMap {
            viewer: viewer.into(),
            levels,
            passes,
        };

        let elapsed = started.elapsed();
        record_validity_computation(passes, elapsed);
        debug!(
            viewer = %viewer,
            passes,
            promotions,
            complete = map.count(ValidityLevel::Complete),
            marginal = map.count(ValidityLevel::Marginal),
            elapsed_us = elapsed.as_micros() as u64,
            "Validity map computed"
        );

        map
    }
}

/// Apply one step of the promotion rules to a non-terminal entity
fn promote(
    viewer: &str,
    current: ValidityLevel,
    edges: &[(&EntityName, AssertionLevel)],
    levels: &BTreeMap<EntityName, ValidityLevel>,
) -> ValidityLevel {
    let level_of = |name: &EntityName| levels.get(name).copied().unwrap_or_default();

    let completely_endorsed = edges.iter().any(|(signer, level)| {
        *level == AssertionLevel::Complete
            && (signer.as_str() == viewer || level_of(*signer) == ValidityLevel::Complete)
    });
    if completely_endorsed {
        return ValidityLevel::Complete;
    }

    if current == ValidityLevel::Marginal {
        return current;
    }

    // The store keeps one edge per ordered pair, so these signers are distinct.
    let valid_signers = edges
        .iter()
        .filter(|(signer, level)| {
            level.satisfies(AssertionLevel::Partial) && level_of(*signer).is_valid()
        })
        .count();

    if valid_signers >= MARGINALS_NEEDED {
        ValidityLevel::Marginal
    } else {
        current
    }
}
