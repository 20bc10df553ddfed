//! Persistent Section Store.
//!
//! Load/save of the section tree and the pinned-tab list, each under its
//! own storage key. The only seeding logic lives here: an empty store
//! yields the default tree. Values are validated on load — a malformed
//! blob is logged and replaced by its default rather than letting nulls
//! propagate into the tree model.

use std::sync::Arc;

use crate::database::Database;
use crate::managers::section_manager::create_default_sections;
use crate::types::errors::StorageError;
use crate::types::section::{Section, SectionKind};
use crate::types::tab::{PinnedTabRecord, Tab};

pub const KEY_SECTIONS: &str = "sections";
pub const KEY_PINNED_TABS: &str = "pinnedTabs";
pub const KEY_DEBUG_MODE: &str = "debugMode";
pub const KEY_LAST_BUILD_ID: &str = "lastBuildId";
pub const KEY_PREVIOUS_VERSION: &str = "previousVersion";

/// Store for the section tree, pinned-tab records, and small flags.
pub struct SectionStore {
    db: Arc<Database>,
}

impl SectionStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Loads the section tree, seeding the default tree when nothing is
    /// stored. A stored blob that fails to parse is discarded with a
    /// warning and the default tree is returned in its place.
    pub fn load_sections(&self) -> Result<Vec<Section>, StorageError> {
        match self.db.get_raw(KEY_SECTIONS)? {
            Some(raw) => match serde_json::from_str::<Vec<Section>>(&raw) {
                Ok(sections) => Ok(sanitize_sections(sections)),
                Err(e) => {
                    log::warn!("discarding malformed section tree: {}", e);
                    Ok(create_default_sections())
                }
            },
            None => Ok(create_default_sections()),
        }
    }

    pub fn save_sections(&self, sections: &[Section]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(sections)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.db.put_raw(KEY_SECTIONS, &raw)
    }

    /// Loads the stored pinned-tab records; empty when nothing is stored
    /// or the stored blob is malformed.
    pub fn load_pinned_tabs(&self) -> Result<Vec<PinnedTabRecord>, StorageError> {
        match self.db.get_raw(KEY_PINNED_TABS)? {
            Some(raw) => match serde_json::from_str::<Vec<PinnedTabRecord>>(&raw) {
                Ok(records) => Ok(records),
                Err(e) => {
                    log::warn!("discarding malformed pinned-tab list: {}", e);
                    Ok(Vec::new())
                }
            },
            None => Ok(Vec::new()),
        }
    }

    pub fn save_pinned_tabs(&self, records: &[PinnedTabRecord]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(records)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.db.put_raw(KEY_PINNED_TABS, &raw)
    }

    /// Records the currently-live pinned tabs, upserting by URL. Records
    /// whose tab is no longer live are kept — that is the point: they
    /// resurface as placeholders until explicitly dismissed.
    pub fn remember_pinned_tabs(&self, live_tabs: &[Tab]) -> Result<(), StorageError> {
        let mut records = self.load_pinned_tabs()?;
        for tab in live_tabs.iter().filter(|t| t.pinned && !t.is_placeholder()) {
            match records.iter_mut().find(|r| r.url == tab.url) {
                Some(record) => *record = PinnedTabRecord::from_tab(tab),
                None => records.push(PinnedTabRecord::from_tab(tab)),
            }
        }
        self.save_pinned_tabs(&records)
    }

    /// Drops the stored record for `url`, e.g. when the user dismisses a
    /// stored-pinned placeholder.
    pub fn forget_pinned_url(&self, url: &str) -> Result<(), StorageError> {
        let records = self.load_pinned_tabs()?;
        let kept: Vec<PinnedTabRecord> =
            records.into_iter().filter(|r| r.url != url).collect();
        self.save_pinned_tabs(&kept)
    }

    pub fn debug_mode(&self) -> Result<bool, StorageError> {
        self.load_bool(KEY_DEBUG_MODE)
    }

    pub fn set_debug_mode(&self, enabled: bool) -> Result<(), StorageError> {
        self.db.put_raw(KEY_DEBUG_MODE, if enabled { "true" } else { "false" })
    }

    /// Records the running build id, rotating the previous one into
    /// `previousVersion`. Returns `true` when the build changed since the
    /// last run (i.e. the extension was updated).
    pub fn record_build_id(&self, build_id: &str) -> Result<bool, StorageError> {
        let previous = self.db.get_raw(KEY_LAST_BUILD_ID)?;
        let changed = previous.as_deref() != Some(build_id);
        if changed {
            if let Some(prev) = previous {
                self.db.put_raw(KEY_PREVIOUS_VERSION, &prev)?;
            }
            self.db.put_raw(KEY_LAST_BUILD_ID, build_id)?;
        }
        Ok(changed)
    }

    pub fn last_build_id(&self) -> Result<Option<String>, StorageError> {
        self.db.get_raw(KEY_LAST_BUILD_ID)
    }

    pub fn previous_version(&self) -> Result<Option<String>, StorageError> {
        self.db.get_raw(KEY_PREVIOUS_VERSION)
    }

    /// Per-build session flag, used for once-per-build behaviors such as
    /// showing the post-update welcome page.
    pub fn session_flag(&self, build_id: &str) -> Result<bool, StorageError> {
        self.load_bool(&format!("session.{}", build_id))
    }

    pub fn set_session_flag(&self, build_id: &str, value: bool) -> Result<(), StorageError> {
        self.db
            .put_raw(&format!("session.{}", build_id), if value { "true" } else { "false" })
    }

    fn load_bool(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self
            .db
            .get_raw(key)?
            .map(|raw| raw == "true")
            .unwrap_or(false))
    }
}

/// Repairs a parsed tree so downstream code never has to re-check its
/// shape: exactly one Today section, and a favorites section present.
fn sanitize_sections(sections: Vec<Section>) -> Vec<Section> {
    let mut seen_today = false;
    let mut out: Vec<Section> = sections
        .into_iter()
        .filter(|s| {
            if s.kind == SectionKind::Today {
                if seen_today {
                    log::warn!("dropping duplicate today section {}", s.id);
                    return false;
                }
                seen_today = true;
            }
            true
        })
        .collect();

    if !seen_today {
        log::warn!("stored tree had no today section, inserting an empty one");
        let insert_at = out
            .iter()
            .position(|s| s.kind != SectionKind::Favorites)
            .unwrap_or(out.len());
        out.insert(insert_at, Section::new("today", "Today", SectionKind::Today));
    }

    if !out.iter().any(|s| s.kind == SectionKind::Favorites) {
        log::warn!("stored tree had no favorites section, inserting an empty one");
        out.insert(0, Section::new("favorites", "Favorites", SectionKind::Favorites));
    }

    out
}
