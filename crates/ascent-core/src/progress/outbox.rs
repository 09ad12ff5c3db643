//! Queue of remote progress writes.
//!
//! Local state commits first; the remote write is queued here and delivered
//! on the next `flush`. A write that keeps failing is retried up to
//! `max_attempts` flushes, then dropped and reported on the failure channel.
//! Nothing is rolled back locally.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::remote::{RemoteProgressService, UserId};

/// One queued `save_progress` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingWrite {
    pub user_id: UserId,
    pub module_id: String,
    pub unit_index: u32,
    /// Delivery attempts made so far.
    pub attempts: u32,
    pub queued_at: DateTime<Utc>,
}

/// A write that exhausted its attempts.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryFailure {
    pub write: PendingWrite,
    pub error: String,
}

/// Result of one flush pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlushReport {
    pub delivered: usize,
    pub retrying: usize,
    pub failed: usize,
}

pub struct Outbox {
    pending: VecDeque<PendingWrite>,
    failures: Vec<DeliveryFailure>,
    max_attempts: u32,
}

impl Outbox {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            pending: VecDeque::new(),
            failures: Vec::new(),
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn enqueue(&mut self, user_id: UserId, module_id: &str, unit_index: u32) {
        self.pending.push_back(PendingWrite {
            user_id,
            module_id: module_id.to_string(),
            unit_index,
            attempts: 0,
            queued_at: Utc::now(),
        });
    }

    /// Attempt every pending write once, in FIFO order.
    pub fn flush(&mut self, remote: &dyn RemoteProgressService) -> FlushReport {
        let mut report = FlushReport::default();
        let mut still_pending = VecDeque::with_capacity(self.pending.len());

        while let Some(mut write) = self.pending.pop_front() {
            write.attempts += 1;
            match remote.save_progress(&write.user_id, &write.module_id, write.unit_index) {
                Ok(()) => {
                    tracing::debug!(
                        module_id = %write.module_id,
                        unit_index = write.unit_index,
                        "remote progress write delivered"
                    );
                    report.delivered += 1;
                }
                Err(e) if write.attempts >= self.max_attempts => {
                    tracing::warn!(
                        module_id = %write.module_id,
                        unit_index = write.unit_index,
                        attempts = write.attempts,
                        error = %e,
                        "giving up on remote progress write"
                    );
                    report.failed += 1;
                    self.failures.push(DeliveryFailure {
                        write,
                        error: e.to_string(),
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        module_id = %write.module_id,
                        unit_index = write.unit_index,
                        attempts = write.attempts,
                        error = %e,
                        "remote progress write failed, will retry"
                    );
                    report.retrying += 1;
                    still_pending.push_back(write);
                }
            }
        }

        self.pending = still_pending;
        report
    }

    /// Drain the failure channel.
    pub fn take_failures(&mut self) -> Vec<DeliveryFailure> {
        std::mem::take(&mut self.failures)
    }

    pub fn pending_for<'a>(&'a self, user: &'a UserId) -> impl Iterator<Item = &'a PendingWrite> + 'a {
        self.pending.iter().filter(move |w| &w.user_id == user)
    }

    /// Drop every pending write; returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
