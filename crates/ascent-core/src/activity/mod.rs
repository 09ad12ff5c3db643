//! Live activity tracking: where the user is and what they are doing.

mod path;
mod ticker;
mod tracker;

pub use path::{match_path, PathMatch};
pub use ticker::{DwellTicker, TICK_INTERVAL};
pub use tracker::{
    ActivityEvent, ActivitySnapshot, ActivityTracker, ClickRecord, CLICK_HISTORY_CAP,
    SESSION_HISTORY_CAP,
};
