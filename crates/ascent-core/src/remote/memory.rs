//! In-memory remote, for tests and offline runs.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use super::{LifeContextSource, ModuleProgress, RemoteProgressService, UserId};
use crate::error::RemoteError;
use crate::life_context::LifeContext;

#[derive(Default)]
struct Inner {
    progress: HashMap<UserId, BTreeMap<String, Vec<u32>>>,
    life_contexts: HashMap<UserId, LifeContext>,
    failing_saves: usize,
    offline: bool,
    save_calls: usize,
}

/// Remote service backed by a map. Failures can be injected.
#[derive(Default)]
pub struct MemoryRemote {
    inner: Mutex<Inner>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` saves fail with `Unavailable`.
    pub fn fail_next_saves(&self, n: usize) {
        self.lock().failing_saves = n;
    }

    /// While offline every call fails.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    pub fn set_life_context(&self, user: &UserId, ctx: LifeContext) {
        self.lock().life_contexts.insert(user.clone(), ctx);
    }

    /// Seed remote progress for a user.
    pub fn seed(&self, user: &UserId, module_id: &str, units: &[u32]) {
        let mut inner = self.lock();
        let stored = inner
            .progress
            .entry(user.clone())
            .or_default()
            .entry(module_id.to_string())
            .or_default();
        stored.extend_from_slice(units);
        stored.sort_unstable();
        stored.dedup();
    }

    pub fn completed_units(&self, user: &UserId, module_id: &str) -> Vec<u32> {
        self.lock()
            .progress
            .get(user)
            .and_then(|modules| modules.get(module_id))
            .cloned()
            .unwrap_or_default()
    }

    /// Number of `save_progress` calls received, successful or not.
    pub fn save_calls(&self) -> usize {
        self.lock().save_calls
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl RemoteProgressService for MemoryRemote {
    fn get_user_progress(&self, user: &UserId) -> Result<Vec<ModuleProgress>, RemoteError> {
        let inner = self.lock();
        if inner.offline {
            return Err(RemoteError::Unavailable("offline".into()));
        }
        Ok(inner
            .progress
            .get(user)
            .map(|modules| {
                modules
                    .iter()
                    .map(|(module_id, units)| ModuleProgress {
                        module_id: module_id.clone(),
                        completed_units: units.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    fn save_progress(
        &self,
        user: &UserId,
        module_id: &str,
        unit_index: u32,
    ) -> Result<(), RemoteError> {
        let mut inner = self.lock();
        inner.save_calls += 1;
        if inner.offline {
            return Err(RemoteError::Unavailable("offline".into()));
        }
        if inner.failing_saves > 0 {
            inner.failing_saves -= 1;
            return Err(RemoteError::Unavailable("injected failure".into()));
        }
        let units = inner
            .progress
            .entry(user.clone())
            .or_default()
            .entry(module_id.to_string())
            .or_default();
        if let Err(pos) = units.binary_search(&unit_index) {
            units.insert(pos, unit_index);
        }
        Ok(())
    }
}

impl LifeContextSource for MemoryRemote {
    fn life_context(&self, user: &UserId) -> Result<Option<LifeContext>, RemoteError> {
        let inner = self.lock();
        if inner.offline {
            return Err(RemoteError::Unavailable("offline".into()));
        }
        Ok(inner.life_contexts.get(user).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_is_idempotent_per_unit() {
        let remote = MemoryRemote::new();
        let user = UserId::from("u1");
        remote.save_progress(&user, "m1", 2).unwrap();
        remote.save_progress(&user, "m1", 2).unwrap();
        remote.save_progress(&user, "m1", 1).unwrap();
        assert_eq!(remote.completed_units(&user, "m1"), vec![1, 2]);
        assert_eq!(remote.save_calls(), 3);
    }

    #[test]
    fn injected_failures_are_consumed() {
        let remote = MemoryRemote::new();
        let user = UserId::from("u1");
        remote.fail_next_saves(1);
        assert!(remote.save_progress(&user, "m1", 0).is_err());
        assert!(remote.save_progress(&user, "m1", 0).is_ok());
    }

    #[test]
    fn unknown_user_has_no_progress() {
        let remote = MemoryRemote::new();
        assert!(remote.get_user_progress(&UserId::from("nobody")).unwrap().is_empty());
        assert!(remote.life_context(&UserId::from("nobody")).unwrap().is_none());
    }
}
