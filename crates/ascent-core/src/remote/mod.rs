//! Remote progress and life-context services.
//!
//! The remote store itself is an external collaborator. This module defines
//! the seam the engine consumes it through, the query state the progress
//! store tracks while a read is outstanding, and two implementations: an
//! HTTP client and an in-memory stand-in.

mod http;
mod memory;

pub use http::HttpProgressService;
pub use memory::MemoryRemote;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::RemoteError;
use crate::life_context::LifeContext;

/// Authenticated user identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Who the current session belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Identity {
    #[default]
    Anonymous,
    User(UserId),
}

impl Identity {
    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            Identity::Anonymous => None,
            Identity::User(id) => Some(id),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Identity::User(_))
    }
}

/// State of a reactive remote read.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Query<T> {
    /// No identity, so nothing to ask for.
    #[default]
    Skip,
    /// Asked, not answered yet.
    Pending,
    Ready(T),
}

impl<T> Query<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, Query::Pending)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Query::Ready(data) => Some(data),
            _ => None,
        }
    }
}

/// Completed units for one module, as the remote stores them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleProgress {
    pub module_id: String,
    pub completed_units: Vec<u32>,
}

/// Per-user progress records held by the remote service.
///
/// Writes are serialized per user on the remote side; the engine is the
/// only writer for its own user.
pub trait RemoteProgressService: Send + Sync {
    fn get_user_progress(&self, user: &UserId) -> Result<Vec<ModuleProgress>, RemoteError>;

    fn save_progress(
        &self,
        user: &UserId,
        module_id: &str,
        unit_index: u32,
    ) -> Result<(), RemoteError>;
}

/// Read-only source of a user's life context.
pub trait LifeContextSource: Send + Sync {
    /// `Ok(None)` when the user has no life context on record.
    fn life_context(&self, user: &UserId) -> Result<Option<LifeContext>, RemoteError>;
}
