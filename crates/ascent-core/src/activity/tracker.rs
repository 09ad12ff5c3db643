//! Per-session activity tracker.
//!
//! One state per navigation path. A path change is the only transition: it
//! resets dwell time and scroll depth, re-derives module/unit, and appends to
//! the bounded session history. Like the rest of the engine it owns no
//! timer; the caller (or a [`DwellTicker`](super::DwellTicker)) calls
//! `tick()` to refresh dwell time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::path::match_path;
use crate::storage::ActivityConfig;

/// One tracked click.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickRecord {
    pub element_id: String,
    pub at: DateTime<Utc>,
}

/// What the user is doing right now.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySnapshot {
    pub current_path: String,
    pub current_module_id: Option<String>,
    pub current_unit_id: Option<String>,
    pub time_on_current_path_secs: u64,
    /// Deepest scroll percentage seen on this path.
    pub scroll_depth: u8,
    /// Most recent paths, oldest first.
    pub session_history: VecDeque<String>,
    /// Most recent clicks, oldest first.
    pub click_history: VecDeque<ClickRecord>,
    pub hovered_element: Option<String>,
    pub last_interaction_at: Option<DateTime<Utc>>,
    pub path_entered_at: DateTime<Utc>,
}

impl ActivitySnapshot {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            current_path: String::new(),
            current_module_id: None,
            current_unit_id: None,
            time_on_current_path_secs: 0,
            scroll_depth: 0,
            session_history: VecDeque::new(),
            click_history: VecDeque::new(),
            hovered_element: None,
            last_interaction_at: None,
            path_entered_at: now,
        }
    }
}

/// Replayable input to the tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActivityEvent {
    Navigate {
        path: String,
        at: DateTime<Utc>,
    },
    Scroll {
        depth: u8,
        at: DateTime<Utc>,
    },
    Click {
        element_id: String,
        at: DateTime<Utc>,
    },
    Hover {
        #[serde(default)]
        element_id: Option<String>,
        at: DateTime<Utc>,
    },
    Tick {
        at: DateTime<Utc>,
    },
}

impl ActivityEvent {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            ActivityEvent::Navigate { at, .. }
            | ActivityEvent::Scroll { at, .. }
            | ActivityEvent::Click { at, .. }
            | ActivityEvent::Hover { at, .. }
            | ActivityEvent::Tick { at } => *at,
        }
    }
}

/// Upper bound on `session_history`; config may only lower it.
pub const SESSION_HISTORY_CAP: usize = 20;
/// Upper bound on `click_history`; config may only lower it.
pub const CLICK_HISTORY_CAP: usize = 50;

fn push_bounded<T>(buf: &mut VecDeque<T>, item: T, cap: usize) {
    buf.push_back(item);
    while buf.len() > cap {
        buf.pop_front();
    }
}

pub struct ActivityTracker {
    snapshot: ActivitySnapshot,
    session_history_cap: usize,
    click_history_cap: usize,
    disposed: bool,
}

impl ActivityTracker {
    pub fn new(config: &ActivityConfig, now: DateTime<Utc>) -> Self {
        Self {
            snapshot: ActivitySnapshot::new(now),
            session_history_cap: config.session_history_cap.min(SESSION_HISTORY_CAP),
            click_history_cap: config.click_history_cap.min(CLICK_HISTORY_CAP),
            disposed: false,
        }
    }

    pub fn snapshot(&self) -> &ActivitySnapshot {
        &self.snapshot
    }

    /// Handle a path change. Returns `false` if `path` is already current.
    pub fn navigate(&mut self, path: &str, now: DateTime<Utc>) -> bool {
        if self.snapshot.current_path == path {
            return false;
        }
        let matched = match_path(path);
        let s = &mut self.snapshot;
        s.current_path = path.to_string();
        s.current_module_id = matched.module_id;
        s.current_unit_id = matched.unit_id;
        s.time_on_current_path_secs = 0;
        s.scroll_depth = 0;
        s.path_entered_at = now;
        push_bounded(&mut s.session_history, path.to_string(), self.session_history_cap);
        tracing::debug!(
            path,
            module = ?s.current_module_id,
            unit = ?s.current_unit_id,
            "navigation"
        );
        true
    }

    /// Recompute dwell time on the current path. No-op after `dispose`.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        if self.disposed {
            return;
        }
        let elapsed = (now - self.snapshot.path_entered_at).num_seconds();
        self.snapshot.time_on_current_path_secs = elapsed.max(0) as u64;
    }

    /// Record a scroll position; depth only ever grows within a path.
    pub fn record_scroll(&mut self, depth: u8, now: DateTime<Utc>) {
        let depth = depth.min(100);
        self.snapshot.scroll_depth = self.snapshot.scroll_depth.max(depth);
        self.snapshot.last_interaction_at = Some(now);
    }

    pub fn record_click(&mut self, element_id: &str, now: DateTime<Utc>) {
        push_bounded(
            &mut self.snapshot.click_history,
            ClickRecord {
                element_id: element_id.to_string(),
                at: now,
            },
            self.click_history_cap,
        );
        self.snapshot.last_interaction_at = Some(now);
    }

    /// Last write wins; `None` clears the hover.
    pub fn hover(&mut self, element_id: Option<&str>, now: DateTime<Utc>) {
        self.snapshot.hovered_element = element_id.map(str::to_string);
        self.snapshot.last_interaction_at = Some(now);
    }

    pub fn apply(&mut self, event: &ActivityEvent) {
        match event {
            ActivityEvent::Navigate { path, at } => {
                self.navigate(path, *at);
            }
            ActivityEvent::Scroll { depth, at } => self.record_scroll(*depth, *at),
            ActivityEvent::Click { element_id, at } => self.record_click(element_id, *at),
            ActivityEvent::Hover { element_id, at } => self.hover(element_id.as_deref(), *at),
            ActivityEvent::Tick { at } => self.tick(*at),
        }
    }

    /// Teardown: further ticks are ignored.
    pub fn dispose(&mut self) {
        self.disposed = true;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
    }

    fn tracker() -> ActivityTracker {
        ActivityTracker::new(&ActivityConfig::default(), t0())
    }

    #[test]
    fn navigating_into_a_lesson_derives_module_and_unit() {
        let mut t = tracker();
        t.navigate("/curriculum/m1", t0());
        t.tick(t0() + Duration::seconds(42));
        assert_eq!(t.snapshot().time_on_current_path_secs, 42);

        t.navigate("/curriculum/m1/lessons/3", t0() + Duration::seconds(45));
        let s = t.snapshot();
        assert_eq!(s.current_module_id.as_deref(), Some("m1"));
        assert_eq!(s.current_unit_id.as_deref(), Some("3"));
        assert_eq!(s.time_on_current_path_secs, 0);
    }

    #[test]
    fn unmatched_path_clears_module_and_unit() {
        let mut t = tracker();
        t.navigate("/curriculum/m1/lessons/3", t0());
        t.navigate("/dashboard", t0());
        assert_eq!(t.snapshot().current_module_id, None);
        assert_eq!(t.snapshot().current_unit_id, None);
    }

    #[test]
    fn tick_does_not_rederive_module() {
        let mut t = tracker();
        t.navigate("/curriculum/m1", t0());
        t.snapshot.current_module_id = None;
        t.tick(t0() + Duration::seconds(1));
        assert_eq!(t.snapshot().current_module_id, None);
    }

    #[test]
    fn same_path_is_not_a_transition() {
        let mut t = tracker();
        assert!(t.navigate("/curriculum/m1", t0()));
        t.record_scroll(40, t0());
        assert!(!t.navigate("/curriculum/m1", t0() + Duration::seconds(5)));
        assert_eq!(t.snapshot().scroll_depth, 40);
        assert_eq!(t.snapshot().session_history.len(), 1);
    }

    #[test]
    fn scroll_depth_is_monotonic_and_resets_on_navigation() {
        let mut t = tracker();
        t.navigate("/curriculum/m1", t0());
        t.record_scroll(30, t0());
        t.record_scroll(70, t0());
        t.record_scroll(10, t0());
        assert_eq!(t.snapshot().scroll_depth, 70);
        t.record_scroll(250, t0());
        assert_eq!(t.snapshot().scroll_depth, 100);

        t.navigate("/curriculum/m2", t0());
        assert_eq!(t.snapshot().scroll_depth, 0);
    }

    #[test]
    fn session_history_keeps_last_twenty() {
        let mut t = tracker();
        for i in 0..25 {
            t.navigate(&format!("/page/{i}"), t0());
        }
        let history = &t.snapshot().session_history;
        assert_eq!(history.len(), 20);
        assert_eq!(history.front().map(String::as_str), Some("/page/5"));
        assert_eq!(history.back().map(String::as_str), Some("/page/24"));
    }

    #[test]
    fn click_history_keeps_last_fifty() {
        let mut t = tracker();
        for i in 0..60 {
            t.record_click(&format!("btn-{i}"), t0() + Duration::seconds(i));
        }
        let clicks = &t.snapshot().click_history;
        assert_eq!(clicks.len(), 50);
        assert_eq!(clicks.front().unwrap().element_id, "btn-10");
        assert_eq!(clicks.back().unwrap().element_id, "btn-59");
        assert_eq!(
            t.snapshot().last_interaction_at,
            Some(t0() + Duration::seconds(59))
        );
    }

    #[test]
    fn oversized_config_caps_are_clamped() {
        let config = ActivityConfig {
            session_history_cap: 100,
            click_history_cap: 500,
        };
        let mut t = ActivityTracker::new(&config, t0());
        for i in 0..60 {
            t.navigate(&format!("/page/{i}"), t0());
        }
        for i in 0..80 {
            t.record_click(&format!("btn-{i}"), t0());
        }
        let s = t.snapshot();
        assert_eq!(s.session_history.len(), SESSION_HISTORY_CAP);
        assert_eq!(s.click_history.len(), CLICK_HISTORY_CAP);
        assert_eq!(s.session_history.back().map(String::as_str), Some("/page/59"));
    }

    #[test]
    fn hover_is_last_write_wins() {
        let mut t = tracker();
        t.hover(Some("card-a"), t0());
        t.hover(Some("card-b"), t0());
        assert_eq!(t.snapshot().hovered_element.as_deref(), Some("card-b"));
        t.hover(None, t0());
        assert_eq!(t.snapshot().hovered_element, None);
    }

    #[test]
    fn tick_after_dispose_is_ignored() {
        let mut t = tracker();
        t.navigate("/curriculum/m1", t0());
        t.dispose();
        t.tick(t0() + Duration::seconds(30));
        assert_eq!(t.snapshot().time_on_current_path_secs, 0);
        assert!(t.is_disposed());
    }

    #[test]
    fn tick_before_path_entry_clamps_to_zero() {
        let mut t = tracker();
        t.navigate("/curriculum/m1", t0());
        t.tick(t0() - Duration::seconds(5));
        assert_eq!(t.snapshot().time_on_current_path_secs, 0);
    }

    #[test]
    fn events_decode_and_apply() {
        let raw = r#"[
            {"type":"navigate","path":"/curriculum/m1","at":"2025-03-01T09:00:00Z"},
            {"type":"scroll","depth":55,"at":"2025-03-01T09:00:05Z"},
            {"type":"click","element_id":"next","at":"2025-03-01T09:00:06Z"},
            {"type":"hover","element_id":"help","at":"2025-03-01T09:00:07Z"},
            {"type":"tick","at":"2025-03-01T09:00:10Z"}
        ]"#;
        let events: Vec<ActivityEvent> = serde_json::from_str(raw).unwrap();
        assert_eq!(events[4].at(), t0() + Duration::seconds(10));
        let mut t = tracker();
        for event in &events {
            t.apply(event);
        }
        let s = t.snapshot();
        assert_eq!(s.current_module_id.as_deref(), Some("m1"));
        assert_eq!(s.scroll_depth, 55);
        assert_eq!(s.click_history.len(), 1);
        assert_eq!(s.hovered_element.as_deref(), Some("help"));
        assert_eq!(s.time_on_current_path_secs, 10);
    }
}
