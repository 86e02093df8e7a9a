use crate::error::CacheError;
use crate::handle::{LoadHandle, ResourceValue, downcast_value};
use crate::key::{AssetKey, GroupKey};
use crate::loader::{Placement, ResourceLoader};
use quarry_containers::error::ContainerErrors;
use quarry_containers::group_map::GroupMap;
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// How releasing one group's entry treats a resource other groups still hold
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ReleasePolicy {
    /// Release the underlying resource only once no group still holds it
    #[default]
    Refcounted,
    /// Release immediately; surviving groups observe an invalid handle
    Independent,
}

/// Whether releasing an unknown group is an error or a no-op
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum UnknownGroupPolicy {
    #[default]
    Error,
    NoOp,
}

#[derive(Debug, Copy, Clone, Default)]
pub struct CacheConfig {
    pub shared_release: ReleasePolicy,
    pub on_unknown_group: UnknownGroupPolicy,
}

#[derive(Default)]
struct CacheState {
    /// Loads not yet settled, keyed by asset, for request coalescing
    in_flight: HashMap<AssetKey, LoadHandle>,
    /// Settled handles, scoped by group for bulk release
    registered: GroupMap<GroupKey, AssetKey, LoadHandle>,
}

/// Cache of outstanding load handles with request coalescing and
/// group-scoped release
///
/// Both maps live behind one mutex which is never held across an await, so
/// the check-then-register step of a load is atomic and at most one
/// unsettled load exists per key at any time.
pub struct HandleCache {
    loader: Arc<dyn ResourceLoader>,
    config: CacheConfig,
    state: Mutex<CacheState>,
}

impl HandleCache {
    pub fn new(loader: Arc<dyn ResourceLoader>) -> Self {
        Self::with_config(loader, CacheConfig::default())
    }

    pub fn with_config(loader: Arc<dyn ResourceLoader>, config: CacheConfig) -> Self {
        Self {
            loader,
            config,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn config(&self) -> CacheConfig {
        self.config
    }

    /// Load `key` under `group`, coalescing with any load of the same key
    /// already in flight
    pub async fn load<T: Any + Send + Sync>(
        &self,
        group: GroupKey,
        key: impl Into<AssetKey>,
    ) -> Result<Arc<T>, CacheError> {
        let key = key.into();
        let value = self
            .load_erased(group, key.clone(), |loader, key| loader.start_load(key))
            .await?;
        downcast_value(&key, value)
    }

    /// Load `key` and place an instance, passing `placement` through to the
    /// loader untouched
    pub async fn instantiate<T: Any + Send + Sync>(
        &self,
        group: GroupKey,
        key: impl Into<AssetKey>,
        placement: Placement,
    ) -> Result<Arc<T>, CacheError> {
        let key = key.into();
        let value = self
            .load_erased(group, key.clone(), move |loader, key| {
                loader.start_instantiate(key, placement)
            })
            .await?;
        downcast_value(&key, value)
    }

    /// Load every resource tagged with `label`
    pub async fn load_by_label<T: Any + Send + Sync>(
        &self,
        group: GroupKey,
        label: impl Into<AssetKey>,
    ) -> Result<Vec<Arc<T>>, CacheError> {
        let label = label.into();
        let value = self
            .load_erased(group, label.clone(), |loader, label| {
                loader.start_load_by_label(label)
            })
            .await?;
        let values = downcast_value::<Vec<ResourceValue>>(&label, value)?;
        values
            .iter()
            .map(|value| downcast_value(&label, value.clone()))
            .collect()
    }

    /// Read an already-registered value without loading
    pub fn get<T: Any + Send + Sync>(
        &self,
        group: &GroupKey,
        key: &AssetKey,
    ) -> Result<Arc<T>, CacheError> {
        let state = self.state.lock().unwrap();
        let handle = state
            .registered
            .get(group, key)
            .ok_or_else(|| CacheError::EntryNotFound(group.clone(), key.clone()))?;
        downcast_value(key, handle.try_value()?)
    }

    /// Whether a registered, settled entry exists for `(group, key)`
    pub fn is_loaded(&self, group: &GroupKey, key: &AssetKey) -> bool {
        self.state.lock().unwrap().registered.contains(group, key)
    }

    /// Release the entry under `(group, key)` and its underlying resource
    pub fn release(&self, group: &GroupKey, key: &AssetKey) -> Result<(), CacheError> {
        let mut state = self.state.lock().unwrap();
        let handle = state
            .registered
            .remove(group, key)
            .map_err(|error| match error {
                ContainerErrors::NonexistentGroup => CacheError::GroupNotFound(group.clone()),
                ContainerErrors::NonexistentEntry => {
                    CacheError::EntryNotFound(group.clone(), key.clone())
                }
            })?;
        self.release_handle(&state, handle);
        tracing::debug!("Asset released: {} (group '{}')", key, group);
        Ok(())
    }

    /// Release every entry in `group`, then delete the group
    pub fn release_all(&self, group: &GroupKey) -> Result<(), CacheError> {
        let mut state = self.state.lock().unwrap();
        self.release_group_locked(&mut state, group)
    }

    /// Release every group, leaving the cache empty
    pub fn release_all_groups(&self) {
        let mut state = self.state.lock().unwrap();
        for group in state.registered.group_keys() {
            // groups cannot vanish while the lock is held
            let _ = self.release_group_locked(&mut state, &group);
        }
    }

    fn release_group_locked(
        &self,
        state: &mut CacheState,
        group: &GroupKey,
    ) -> Result<(), CacheError> {
        let entries = match state.registered.remove_group(group) {
            Ok(entries) => entries,
            Err(_) => {
                return match self.config.on_unknown_group {
                    UnknownGroupPolicy::Error => Err(CacheError::GroupNotFound(group.clone())),
                    UnknownGroupPolicy::NoOp => Ok(()),
                };
            }
        };
        for handle in entries.into_values() {
            if !handle.is_valid() {
                // already released through another group, not an error
                continue;
            }
            self.release_handle(state, handle);
        }
        tracing::debug!("Asset group released: {}", group);
        Ok(())
    }

    /// `handle` must already be removed from the registered map
    fn release_handle(&self, state: &CacheState, handle: LoadHandle) {
        if matches!(self.config.shared_release, ReleasePolicy::Refcounted) {
            // the same key loaded again after settling yields a distinct
            // operation, so sharing is decided by operation identity, not key
            let still_held = state
                .registered
                .values_for_key(handle.key())
                .into_iter()
                .any(|other| LoadHandle::ptr_eq(other, &handle));
            if still_held {
                return;
            }
        }
        handle.invalidate();
        self.loader.release_underlying(&handle);
    }

    async fn load_erased(
        &self,
        group: GroupKey,
        key: AssetKey,
        start: impl FnOnce(&dyn ResourceLoader, &AssetKey) -> LoadHandle,
    ) -> Result<ResourceValue, CacheError> {
        let handle = {
            let mut state = self.state.lock().unwrap();
            if let Some(handle) = state.registered.get(&group, &key) {
                // registered entries are settled; no suspension, no loader call
                return handle.try_value();
            }
            match state.in_flight.get(&key) {
                Some(handle) => handle.clone(),
                None => {
                    let handle = start(self.loader.as_ref(), &key);
                    state.in_flight.insert(key.clone(), handle.clone());
                    handle
                }
            }
        };

        let settlement = handle.settled().await;

        let mut state = self.state.lock().unwrap();
        // clear only our own entry so a retry already in flight is untouched
        if state
            .in_flight
            .get(&key)
            .is_some_and(|current| LoadHandle::ptr_eq(current, &handle))
        {
            state.in_flight.remove(&key);
        }
        match settlement {
            Ok(value) => {
                state.registered.insert(group, key.clone(), handle);
                tracing::debug!("Asset loaded: {}", key);
                Ok(value)
            }
            Err(failure) => {
                tracing::error!("Asset load failed: {} ({})", key, failure);
                Err(CacheError::LoadFailed { key, failure })
            }
        }
    }
}
