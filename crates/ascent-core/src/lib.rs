//! # Ascent Core Library
//!
//! Progress tracking and adaptive context for the Ascent wealth-building
//! curriculum. The CLI is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Progress**: level ladder, the per-user progress record, and a store
//!   that reconciles local persistence with a remote service through an
//!   outbox of pending writes
//! - **Storage**: SQLite key-value persistence and TOML configuration
//! - **Remote**: trait seams for the progress service and life-context source,
//!   with an HTTP client and an in-memory double
//! - **Activity**: navigation tracking with bounded histories and dwell time
//!
//! Nothing here owns a timer. Callers pump `ProgressStore::sync` and
//! `ActivityTracker::tick` (or spawn a `DwellTicker`).
//!
//! ## Key Components
//!
//! - [`ProgressStore`]: optimistic progress state with remote reconciliation
//! - [`ActivityTracker`]: what the user is looking at right now
//! - [`PromptBuilder`]: pure assembly of the assistant prompt
//! - [`Config`]: application configuration management

pub mod activity;
pub mod curriculum;
pub mod error;
pub mod life_context;
pub mod progress;
pub mod prompt;
pub mod remote;
pub mod storage;

pub use activity::{ActivityEvent, ActivitySnapshot, ActivityTracker, DwellTicker};
pub use curriculum::Curriculum;
pub use error::{ConfigError, CoreError, DatabaseError, RemoteError, ValidationError};
pub use life_context::LifeContext;
pub use progress::{Level, ProgressRecord, ProgressStore, StoreOptions};
pub use prompt::{build_prompt, PromptBuilder, PromptInput};
pub use remote::{
    HttpProgressService, Identity, LifeContextSource, MemoryRemote, Query, RemoteProgressService,
    UserId,
};
pub use storage::{Config, Database, LocalStore, SqliteLocalStore};
