use serde::{Deserialize, Serialize};

/// A browser tab mirrored into the sidebar.
///
/// Tab ids are assigned by the browser and always positive. Negative ids are
/// synthesized for stored pinned tabs that are no longer open — they render
/// as inert placeholders in the Today section until clicked or dismissed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tab {
    pub id: i64,
    pub url: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    pub active: bool,
    pub pinned: bool,
    /// Owning window. Zero for stored-pinned placeholders.
    pub window_id: u64,
    pub index: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<u64>,
}

impl Tab {
    /// True when this is a stored-pinned placeholder rather than a live tab.
    pub fn is_placeholder(&self) -> bool {
        self.id < 0
    }
}

/// Durable echo of a pinned tab, kept in storage so pinned tabs survive
/// being closed. Reconciled against live tabs on every Today refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinnedTabRecord {
    pub id: i64,
    pub url: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
}

impl PinnedTabRecord {
    /// Remembers a live pinned tab.
    pub fn from_tab(tab: &Tab) -> Self {
        Self {
            id: tab.id,
            url: tab.url.clone(),
            title: tab.title.clone(),
            favicon: tab.favicon.clone(),
        }
    }
}
