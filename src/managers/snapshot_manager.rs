//! Live Tab Snapshot.
//!
//! Turns browser tab/window events into Today-section refreshes. Bursts
//! of events (a dozen favicons resolving at once) are coalesced through a
//! 300 ms debounce window; the pending set decides between a cheap
//! active-state patch and a full structural merge.

use std::collections::HashSet;
use std::time::Duration;

use tokio::time::Instant;

use crate::browser::api::{NativeWindow, WindowKind};
use crate::types::section::{Section, SectionItem, SectionKind};
use crate::types::tab::Tab;

/// Coalescing window matching the UI event burst profile.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(300);

/// URL prefixes that never appear in the sidebar.
const INTERNAL_URL_PREFIXES: &[&str] = &["chrome://", "chrome-extension://", "about:"];

/// A tab lifecycle event as reported by the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TabEvent {
    Created,
    Removed,
    Activated,
    /// Title, favicon, or load-state change.
    Updated,
    PinnedChanged,
    WindowFocusChanged,
}

/// What kind of refresh the pending events call for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshKind {
    /// Re-query everything and run the full Today merge.
    Structural,
    /// Only active flags moved: patch them in place, skip the merge.
    ActiveOnly,
}

/// Decides the refresh kind for a set of coalesced events. Structural
/// changes win over cheap ones; an empty set means nothing to do.
pub fn classify(pending: &HashSet<TabEvent>) -> Option<RefreshKind> {
    if pending.is_empty() {
        return None;
    }
    let structural = pending.contains(&TabEvent::Created)
        || pending.contains(&TabEvent::Removed)
        || pending.contains(&TabEvent::PinnedChanged);
    Some(if structural {
        RefreshKind::Structural
    } else {
        RefreshKind::ActiveOnly
    })
}

/// Debouncer over tab events. Each event restarts the window (the decision
/// to refresh is last-write-wins); when the window elapses, the pending
/// set collapses into one refresh kind.
#[derive(Debug)]
pub struct RefreshDebouncer {
    window: Duration,
    pending: HashSet<TabEvent>,
    deadline: Option<Instant>,
}

impl RefreshDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: HashSet::new(),
            deadline: None,
        }
    }

    /// Records an event and restarts the coalescing window.
    pub fn note(&mut self, event: TabEvent) {
        self.pending.insert(event);
        self.deadline = Some(Instant::now() + self.window);
    }

    /// When the next refresh is due, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Drains the pending set once the window has elapsed at `now`.
    /// Returns `None` while the window is still open or nothing is pending.
    pub fn poll(&mut self, now: Instant) -> Option<RefreshKind> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                let pending = std::mem::take(&mut self.pending);
                classify(&pending)
            }
            _ => None,
        }
    }
}

impl Default for RefreshDebouncer {
    fn default() -> Self {
        Self::new(DEBOUNCE_WINDOW)
    }
}

/// Normalizes native windows into the Today tab list: normal windows
/// only, internal URLs skipped, favorites-group members excluded.
pub fn snapshot_window_tabs(windows: &[NativeWindow], excluded_group: Option<u64>) -> Vec<Tab> {
    let mut tabs = Vec::new();
    for window in windows.iter().filter(|w| w.kind == WindowKind::Normal) {
        for native in &window.tabs {
            if is_internal_url(&native.url) {
                continue;
            }
            if let (Some(excluded), Some(group)) = (excluded_group, native.group_id) {
                if group == excluded {
                    continue;
                }
            }
            tabs.push(Tab {
                id: native.id,
                url: native.url.clone(),
                title: native.title.clone(),
                favicon: native.favicon.clone(),
                active: native.active,
                pinned: native.pinned,
                window_id: native.window_id,
                index: native.index,
                group_id: native.group_id,
            });
        }
    }
    tabs
}

/// The cheap refresh path: update the active flag of Today tabs in place
/// without re-running the merge. Functionally a full merge would also be
/// correct, just slower.
pub fn patch_active_states(sections: &[Section], live_tabs: &[Tab]) -> Vec<Section> {
    sections
        .iter()
        .map(|section| {
            if section.kind != SectionKind::Today {
                return section.clone();
            }
            let mut section = section.clone();
            for item in &mut section.items {
                if let SectionItem::Tab(tab) = item {
                    if let Some(live) = live_tabs.iter().find(|t| t.id == tab.id) {
                        tab.active = live.active;
                    }
                }
            }
            section
        })
        .collect()
}

fn is_internal_url(url: &str) -> bool {
    INTERNAL_URL_PREFIXES.iter().any(|p| url.starts_with(p))
}
