// trust/web.rs - Shared Web of Trust

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock, RwLockReadGuard};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::entity::{AssertionLevel, EntityName};
use super::error::TrustError;
use super::paths::PathLimits;
use super::query::{TrustQueryFacade, TrustVerdict};
use super::store::{StoreStats, TrustAssertion, TrustAssertionStore};
use super::validity::{ValidityEngine, ValidityMap};
use crate::observability::{record_assertion, record_assertion_rejected, record_entity_registered};

/// Configuration for trust queries
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrustConfig {
    /// Bounds on path enumeration (unbounded by default)
    pub path_limits: PathLimits,

    /// Reuse validity maps per viewer until the store changes
    pub cache_validity_maps: bool,
}

impl Default for TrustConfig {
    fn default() -> Self {
        Self {
            path_limits: PathLimits::unbounded(),
            cache_validity_maps: true,
        }
    }
}

/// Structured result of a mutation at the string interface
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionOutcome {
    pub success: bool,
    pub message: String,

    /// Unix timestamp stored on the edge, absent on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asserted_at: Option<i64>,
}

impl AssertionOutcome {
    fn succeeded(message: String, asserted_at: i64) -> Self {
        Self {
            success: true,
            message,
            asserted_at: Some(asserted_at),
        }
    }

    fn failed(error: &TrustError) -> Self {
        Self {
            success: false,
            message: error.to_string(),
            asserted_at: None,
        }
    }
}

type ValidityCache = HashMap<EntityName, (u64, Arc<ValidityMap>)>;

/// Shared handle to a trust assertion store
///
/// Clones share the same store. Mutations take the write lock; a query holds
/// the read lock for its whole duration so the validity map and the paths
/// come from one snapshot.
#[derive(Clone)]
pub struct WebOfTrust {
    store: Arc<RwLock<TrustAssertionStore>>,
    config: TrustConfig,
    validity_cache: Arc<Mutex<ValidityCache>>,
}

impl Default for WebOfTrust {
    fn default() -> Self {
        Self::new(TrustConfig::default())
    }
}

impl WebOfTrust {
    /// Create an empty web of trust
    pub fn new(config: TrustConfig) -> Self {
        Self::with_store(TrustAssertionStore::new(), config)
    }

    /// Wrap an existing store
    pub fn with_store(store: TrustAssertionStore, config: TrustConfig) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            config,
            validity_cache: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn config(&self) -> &TrustConfig {
        &self.config
    }

    /// Register an entity. Returns `false` if the name is already taken.
    pub fn register_entity(&self, name: &str) -> bool {
        self.try_register_entity(name).is_ok()
    }

    pub fn try_register_entity(&self, name: &str) -> Result<(), TrustError> {
        let result = self.store.write().try_register_entity(name);
        record_entity_registered(result.is_ok());

        match &result {
            Ok(()) => {
                self.invalidate_cache();
                info!(entity = %name, "Entity registered");
            }
            Err(e) => debug!(entity = %name, error = %e, "Entity registration rejected"),
        }
        result
    }

    /// Record `signer -> target : level` with the level given as text
    pub fn assert_trust(&self, signer: &str, target: &str, level: &str) -> AssertionOutcome {
        match self.try_assert_trust(signer, target, level) {
            Ok((assertion, None)) => AssertionOutcome::succeeded(
                format!("{} asserts {} trust in {}", signer, assertion.level, target),
                assertion.asserted_at,
            ),
            Ok((assertion, Some(previous))) => AssertionOutcome::succeeded(
                format!(
                    "{} asserts {} trust in {} (was {})",
                    signer, assertion.level, target, previous
                ),
                assertion.asserted_at,
            ),
            Err(e) => AssertionOutcome::failed(&e),
        }
    }

    /// Typed variant of [`assert_trust`](Self::assert_trust)
    ///
    /// Returns the stored assertion and the level it replaced, if any.
    pub fn try_assert_trust(
        &self,
        signer: &str,
        target: &str,
        level: &str,
    ) -> Result<(TrustAssertion, Option<AssertionLevel>), TrustError> {
        let result = {
            let mut store = self.store.write();
            store.validate_endpoints(signer, target).and_then(|()| {
                let assertion = TrustAssertion {
                    signer: signer.into(),
                    target: target.into(),
                    level: level.parse()?,
                    asserted_at: chrono::Utc::now().timestamp(),
                };
                let previous =
                    store.assert_trust_at(signer, target, assertion.level, assertion.asserted_at)?;
                Ok((assertion, previous))
            })
        };

        match &result {
            Ok((stored, previous)) => {
                self.invalidate_cache();
                record_assertion(stored.level);
                info!(
                    signer = %signer,
                    target = %target,
                    level = %stored.level,
                    previous = ?previous,
                    asserted_at = stored.asserted_at,
                    "Trust asserted"
                );
            }
            Err(e) => {
                record_assertion_rejected(e.kind());
                debug!(signer = %signer, target = %target, error = %e, "Trust assertion rejected");
            }
        }
        result
    }

    /// Decide whether `viewer` trusts `target`, and why
    pub fn check_trust(&self, viewer: &str, target: &str) -> TrustVerdict {
        let store = self.store.read();
        let facade = TrustQueryFacade::new(&store).with_limits(self.config.path_limits);

        // Unknown names and self checks are answered without a validity map
        let needs_map = viewer != target && store.contains(viewer) && store.contains(target);
        if !self.config.cache_validity_maps || !needs_map {
            return facade.check_trust(viewer, target);
        }

        let validity = self.cached_validity_map(&store, viewer);
        facade.check_trust_with(viewer, target, &validity)
    }

    /// Validity of every entity as seen by `viewer`
    ///
    /// Maps for unregistered viewers are computed but never cached.
    pub fn validity_map(&self, viewer: &str) -> Arc<ValidityMap> {
        let store = self.store.read();
        if self.config.cache_validity_maps && store.contains(viewer) {
            self.cached_validity_map(&store, viewer)
        } else {
            Arc::new(ValidityEngine::new(&store).compute_validity_map(viewer))
        }
    }

    /// Consistent read snapshot of the store
    pub fn read(&self) -> RwLockReadGuard<'_, TrustAssertionStore> {
        self.store.read()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.store.read().contains(name)
    }

    pub fn entities(&self) -> Vec<EntityName> {
        self.store.read().entities().cloned().collect()
    }

    pub fn stats(&self) -> StoreStats {
        self.store.read().stats()
    }

    /// Drop every entity and assertion
    pub fn reset(&self) {
        self.store.write().reset();
        self.invalidate_cache();
        info!("Web of trust reset");
    }

    fn cached_validity_map(&self, store: &TrustAssertionStore, viewer: &str) -> Arc<ValidityMap> {
        let revision = store.revision();
        if let Some((cached_at, map)) = self.validity_cache.lock().get(viewer) {
            if *cached_at == revision {
                return Arc::clone(map);
            }
        }

        let map = Arc::new(ValidityEngine::new(store).compute_validity_map(viewer));
        self.validity_cache
            .lock()
            .insert(viewer.into(), (revision, Arc::clone(&map)));
        map
    }

    fn invalidate_cache(&self) {
        self.validity_cache.lock().clear();
    }
}
