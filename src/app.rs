//! App Core for Archy.
//!
//! Central context constructed at service-worker start. Service workers
//! are ephemeral, so everything held here is a best-effort cache; only
//! what goes through `SectionStore` survives a restart. Side-panel state
//! in particular is optimistic — the native panel API offers no "is it
//! open" query, so the router tracks what it believes.

use std::collections::HashMap;
use std::sync::Arc;

use crate::database::Database;
use crate::services::recovery::FailureGuard;
use crate::store::SectionStore;

/// Central application context for the background surface.
pub struct App {
    pub db: Arc<Database>,
    pub store: SectionStore,
    pub failure_guard: FailureGuard,
    side_panel_open: HashMap<u64, bool>,
    overlay_visible: bool,
}

impl App {
    /// Creates the context against an on-disk database.
    pub fn new(db_path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let db = Arc::new(Database::open(db_path)?);
        Ok(Self::with_database(db))
    }

    /// Creates the context against an in-memory database (tests, demo).
    pub fn new_in_memory() -> Result<Self, Box<dyn std::error::Error>> {
        let db = Arc::new(Database::open_in_memory()?);
        Ok(Self::with_database(db))
    }

    fn with_database(db: Arc<Database>) -> Self {
        let store = SectionStore::new(db.clone());
        Self {
            db,
            store,
            failure_guard: FailureGuard::default(),
            side_panel_open: HashMap::new(),
            overlay_visible: false,
        }
    }

    /// Startup sequence: record the running build for update detection.
    pub fn startup(&mut self) {
        let build = env!("CARGO_PKG_VERSION");
        match self.store.record_build_id(build) {
            Ok(true) => {
                let previous = self.store.previous_version().ok().flatten();
                log::info!(
                    "build changed to {} (previous: {})",
                    build,
                    previous.as_deref().unwrap_or("none")
                );
            }
            Ok(false) => {}
            Err(e) => log::warn!("cannot record build id: {}", e),
        }
    }

    /// Marks the side panel open or closed for a window. Optimistic: this
    /// is what the router believes, not what the browser reports.
    pub fn set_side_panel_open(&mut self, window_id: u64, open: bool) {
        self.side_panel_open.insert(window_id, open);
    }

    pub fn is_side_panel_open(&self, window_id: u64) -> bool {
        self.side_panel_open.get(&window_id).copied().unwrap_or(false)
    }

    /// Flips the content-script overlay and reports the new state.
    pub fn toggle_overlay(&mut self) -> bool {
        self.overlay_visible = !self.overlay_visible;
        self.overlay_visible
    }

    pub fn is_overlay_visible(&self) -> bool {
        self.overlay_visible
    }
}
