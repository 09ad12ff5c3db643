//! Curriculum progress: tier ladder, per-user record, and the store that
//! owns it across local and remote persistence.

mod level;
mod outbox;
mod record;
mod store;

pub use level::Level;
pub use outbox::{DeliveryFailure, FlushReport, Outbox, PendingWrite};
pub use record::{
    AssessmentScores, AssessmentSnapshot, CategoryScore, DecisionTopic, ProgressRecord, MAX_SCORE,
};
pub use store::{ProgressStore, StoreOptions, SyncReport};
