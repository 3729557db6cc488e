//! Persistence collaborator and cycle repository.
//!
//! The backend is a plain synchronous key-value store; the repository owns
//! the key layout and the JSON encoding of cycles. The in-memory adapter is
//! deterministic and test-friendly.

use std::collections::HashMap;
use std::sync::RwLock;

use thiserror::Error;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::config::ScheduleConfig;
use crate::cycle::{CommitmentCycle, CycleSnapshot};
use crate::error::{CycleError, Result};

/// Storage-layer errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("backend error: {0}")]
    Backend(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),
}

/// Minimal synchronous key-value backend.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> std::result::Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: String) -> std::result::Result<(), StoreError>;
    fn remove(&self, key: &str) -> std::result::Result<(), StoreError>;
}

/// In-memory key-value store.
#[derive(Default)]
pub struct InMemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> std::result::Result<Option<String>, StoreError> {
        let guard = self
            .entries
            .read()
            .map_err(|_| StoreError::Backend("entries lock poisoned".to_string()))?;
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> std::result::Result<(), StoreError> {
        if key.is_empty() {
            return Err(StoreError::InvalidKey("key must not be empty".to_string()));
        }
        let mut guard = self
            .entries
            .write()
            .map_err(|_| StoreError::Backend("entries lock poisoned".to_string()))?;
        guard.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> std::result::Result<(), StoreError> {
        let mut guard = self
            .entries
            .write()
            .map_err(|_| StoreError::Backend("entries lock poisoned".to_string()))?;
        guard.remove(key);
        Ok(())
    }
}

const DEFAULT_NAMESPACE: &str = "habitstake";

/// Saves and restores commitment cycles through a [`KeyValueStore`].
///
/// Keys: `{namespace}:cycle:{contract_id}` for each cycle and
/// `{namespace}:active` for the id of the session's active contract.
pub struct CycleRepository<S> {
    store: S,
    namespace: String,
    schedule_config: ScheduleConfig,
}

impl<S: KeyValueStore> CycleRepository<S> {
    pub fn new(store: S) -> Self {
        Self::with_namespace(store, DEFAULT_NAMESPACE)
    }

    pub fn with_namespace(store: S, namespace: impl Into<String>) -> Self {
        Self {
            store,
            namespace: namespace.into(),
            schedule_config: ScheduleConfig::default(),
        }
    }

    /// Use a non-default schedule configuration when regenerating schedules.
    pub fn with_schedule_config(mut self, config: ScheduleConfig) -> Self {
        self.schedule_config = config;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn cycle_key(&self, contract_id: &str) -> String {
        format!("{}:cycle:{}", self.namespace, contract_id)
    }

    fn active_key(&self) -> String {
        format!("{}:active", self.namespace)
    }

    /// Persist the cycle's current state.
    pub fn save(&self, cycle: &CommitmentCycle) -> Result<()> {
        let json = serde_json::to_string(&cycle.snapshot())?;
        self.store.set(&self.cycle_key(cycle.contract_id()), json)?;
        debug!(contract = %cycle.contract_id(), "Cycle saved");
        Ok(())
    }

    /// Load and reconcile a stored cycle.
    pub fn load(&self, contract_id: &str, clock: &dyn Clock) -> Result<Option<CommitmentCycle>> {
        let Some(json) = self.store.get(&self.cycle_key(contract_id))? else {
            return Ok(None);
        };
        let snapshot: CycleSnapshot = serde_json::from_str(&json)?;
        if snapshot.terms.contract_id != contract_id {
            return Err(CycleError::ContractMismatch {
                expected: contract_id.to_string(),
                found: snapshot.terms.contract_id,
            });
        }
        Ok(Some(CommitmentCycle::restore(
            snapshot,
            &self.schedule_config,
            clock,
        )))
    }

    /// Make `cycle` the active one, discarding any cycle it replaces.
    ///
    /// The new cycle and the active pointer are written before the old
    /// record is removed, so a failed write leaves the previous cycle intact.
    pub fn activate(&self, cycle: &CommitmentCycle) -> Result<()> {
        let previous = self.active_contract_id()?;
        self.save(cycle)?;
        self.store
            .set(&self.active_key(), cycle.contract_id().to_string())?;

        if let Some(previous) = previous.filter(|id| id != cycle.contract_id()) {
            self.store.remove(&self.cycle_key(&previous))?;
            info!(previous = %previous, contract = %cycle.contract_id(), "Active cycle replaced");
        }
        Ok(())
    }

    pub fn active_contract_id(&self) -> Result<Option<String>> {
        Ok(self.store.get(&self.active_key())?)
    }

    /// Load the active cycle, if there is one.
    pub fn load_active(&self, clock: &dyn Clock) -> Result<Option<CommitmentCycle>> {
        match self.active_contract_id()? {
            Some(contract_id) => self.load(&contract_id, clock),
            None => Ok(None),
        }
    }

    /// Discard a cycle, e.g. when its contract ends.
    pub fn discard(&self, contract_id: &str) -> Result<()> {
        self.store.remove(&self.cycle_key(contract_id))?;
        if self.active_contract_id()?.as_deref() == Some(contract_id) {
            self.store.remove(&self.active_key())?;
        }
        info!(contract = %contract_id, "Cycle discarded");
        Ok(())
    }
}
