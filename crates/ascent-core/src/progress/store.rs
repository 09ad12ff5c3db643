//! The progress store: single owner of the user's `ProgressRecord`.
//!
//! ## Lifecycle
//!
//! ```text
//! new() -> init(identity) -> [mutations, sync()]* -> dispose()
//! ```
//!
//! - Anonymous: the local record is loaded synchronously and every mutation
//!   writes the full record back (latest snapshot only, no log).
//! - Authenticated: the remote read starts `Pending` and supersedes module
//!   completion once it resolves. Completions commit locally first and are
//!   queued for remote delivery through the outbox.
//!
//! The store does not spawn work. The caller pumps the remote boundary with
//! `sync()`, the same way a timer is ticked.

use chrono::Utc;
use std::sync::Arc;

use super::level::Level;
use super::outbox::{DeliveryFailure, FlushReport, Outbox};
use super::record::{AssessmentScores, AssessmentSnapshot, DecisionTopic, ProgressRecord};
use crate::error::ValidationError;
use crate::remote::{Identity, ModuleProgress, Query, RemoteProgressService, UserId};
use crate::storage::{Config, LocalStore};

/// Tunables for a `ProgressStore`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    pub max_attempts: u32,
    /// Push anonymous completions to the remote on sign-in.
    pub merge_local_on_sign_in: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            merge_local_on_sign_in: false,
        }
    }
}

impl From<&Config> for StoreOptions {
    fn from(config: &Config) -> Self {
        Self {
            max_attempts: config.outbox.max_attempts,
            merge_local_on_sign_in: config.sign_in.merge_local_progress,
        }
    }
}

/// What one `sync()` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncReport {
    /// The pending remote read resolved during this call.
    pub resolved: bool,
    pub flush: FlushReport,
}

pub struct ProgressStore {
    local: Box<dyn LocalStore>,
    remote: Arc<dyn RemoteProgressService>,
    options: StoreOptions,
    /// `None` until `init`, and again after `dispose`.
    identity: Option<Identity>,
    remote_query: Query<Vec<ModuleProgress>>,
    record: ProgressRecord,
    outbox: Outbox,
}

impl ProgressStore {
    pub fn new(
        local: Box<dyn LocalStore>,
        remote: Arc<dyn RemoteProgressService>,
        options: StoreOptions,
    ) -> Self {
        Self {
            local,
            remote,
            options,
            identity: None,
            remote_query: Query::Skip,
            record: ProgressRecord::default(),
            outbox: Outbox::new(options.max_attempts),
        }
    }

    /// Mount the store for `identity`. Re-initializing disposes first.
    pub fn init(&mut self, identity: Identity) {
        if self.identity.is_some() {
            self.dispose();
        }

        match &identity {
            Identity::Anonymous => {
                self.record = self.local.load().unwrap_or_default();
                self.remote_query = Query::Skip;
                tracing::debug!(level = %self.record.current_level, "progress store mounted anonymously");
            }
            Identity::User(user) => {
                self.record = ProgressRecord::default();
                self.remote_query = Query::Pending;
                if self.options.merge_local_on_sign_in {
                    self.merge_local_into(user.clone());
                }
                tracing::debug!(user = %user, "progress store mounted, remote read pending");
            }
        }
        self.identity = Some(identity);
    }

    /// Unmount. Undelivered remote writes are discarded; returns how many.
    pub fn dispose(&mut self) -> usize {
        let dropped = self.outbox.clear();
        if dropped > 0 {
            tracing::warn!(dropped, "disposing progress store with undelivered remote writes");
        }
        self.identity = None;
        self.remote_query = Query::Skip;
        dropped
    }

    /// Queue anonymous completions for `user`, then drop them from the local
    /// record so a later sign-in does not queue them again.
    fn merge_local_into(&mut self, user: UserId) {
        let Some(mut local) = self.local.load() else {
            return;
        };
        if local.module_completion.is_empty() {
            return;
        }
        let mut queued = 0usize;
        for (module_id, units) in &local.module_completion {
            for &unit in units {
                self.record.insert_unit(module_id, unit);
                self.outbox.enqueue(user.clone(), module_id, unit);
                queued += 1;
            }
        }
        local.module_completion.clear();
        if let Err(e) = self.local.save(&local) {
            tracing::warn!(error = %e, "failed to mark anonymous progress as merged");
        }
        tracing::info!(user = %user, queued, "queued anonymous progress for sign-in merge");
    }

    /// Pump the remote boundary: resolve a pending read, then flush the outbox.
    ///
    /// Never fails. A failed read leaves the query `Pending` for the next call.
    pub fn sync(&mut self) -> SyncReport {
        let mut report = SyncReport::default();

        let pending_user = match (&self.identity, &self.remote_query) {
            (Some(Identity::User(user)), Query::Pending) => Some(user.clone()),
            _ => None,
        };
        if let Some(user) = pending_user {
            match self.remote.get_user_progress(&user) {
                Ok(progress) => {
                    self.supersede(&user, progress);
                    report.resolved = true;
                }
                Err(e) => {
                    tracing::warn!(user = %user, error = %e, "remote progress read failed");
                }
            }
        }

        report.flush = self.outbox.flush(self.remote.as_ref());
        report
    }

    /// Apply a pushed remote update (subscription callback).
    pub fn resolve_remote(&mut self, progress: Vec<ModuleProgress>) {
        match self.identity.as_ref().and_then(Identity::user_id).cloned() {
            Some(user) => self.supersede(&user, progress),
            None => tracing::debug!("ignoring remote progress for an unauthenticated store"),
        }
    }

    /// Replace module completion with the remote view, keeping writes that
    /// have not reached the remote yet.
    fn supersede(&mut self, user: &UserId, progress: Vec<ModuleProgress>) {
        self.record.module_completion.clear();
        for module in &progress {
            for &unit in &module.completed_units {
                self.record.insert_unit(&module.module_id, unit);
            }
        }
        let unsent: Vec<(String, u32)> = self
            .outbox
            .pending_for(user)
            .map(|w| (w.module_id.clone(), w.unit_index))
            .collect();
        for (module_id, unit) in unsent {
            self.record.insert_unit(&module_id, unit);
        }
        tracing::debug!(
            modules = self.record.module_completion.len(),
            "remote progress superseded local view"
        );
        self.remote_query = Query::Ready(progress);
    }

    /// Write the latest snapshot locally when anonymous.
    fn persist_local(&self) {
        if let Some(Identity::Anonymous) = self.identity {
            if let Err(e) = self.local.save(&self.record) {
                tracing::warn!(error = %e, "failed to persist local progress");
            }
        }
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Set net worth (absolute) and re-derive the level.
    pub fn update_net_worth(&mut self, amount: u64) {
        let before = self.record.current_level;
        self.record.set_net_worth(amount);
        if before != self.record.current_level {
            tracing::info!(from = %before, to = %self.record.current_level, "level changed");
        }
        self.persist_local();
    }

    /// Set revenue (absolute). Non-finite amounts are ignored.
    pub fn update_revenue(&mut self, amount: f64) {
        if !amount.is_finite() {
            tracing::warn!(amount, "ignoring non-finite revenue");
            return;
        }
        self.record.revenue = amount;
        self.persist_local();
    }

    /// Mark a unit complete. Returns whether the completion set changed.
    ///
    /// Local state updates immediately. When authenticated a remote write is
    /// queued even for a duplicate, so a lost earlier write gets another try.
    pub fn complete_module(&mut self, module_id: &str, unit_index: u32) -> bool {
        let changed = self.record.insert_unit(module_id, unit_index);
        if let Some(Identity::User(user)) = &self.identity {
            self.outbox.enqueue(user.clone(), module_id, unit_index);
        }
        self.persist_local();
        changed
    }

    /// Append a timestamped self-assessment.
    ///
    /// # Errors
    /// Returns an error if any sub-score is above the maximum.
    pub fn add_assessment_snapshot(&mut self, scores: AssessmentScores) -> Result<(), ValidationError> {
        scores.validate()?;
        self.record.assessment_history.push(AssessmentSnapshot {
            scores,
            recorded_at: Utc::now(),
        });
        self.persist_local();
        Ok(())
    }

    pub fn update_decision(&mut self, topic: DecisionTopic, value: impl Into<String>) {
        self.record.strategic_decisions.insert(topic, value.into());
        self.persist_local();
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn record(&self) -> &ProgressRecord {
        &self.record
    }

    pub fn level(&self) -> Level {
        self.record.current_level
    }

    pub fn module_completion_count(&self, module_id: &str) -> usize {
        self.record.completion_count(module_id)
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn remote_query(&self) -> &Query<Vec<ModuleProgress>> {
        &self.remote_query
    }

    pub fn outbox_pending(&self) -> usize {
        self.outbox.len()
    }

    /// Drain remote writes that exhausted their retries.
    pub fn take_failures(&mut self) -> Vec<DeliveryFailure> {
        self.outbox.take_failures()
    }
}
