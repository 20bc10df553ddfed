use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::tab::Tab;

/// A saved favorite. Ids are generated locally and stable for the life of
/// the favorite; dedup is always by URL, never by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
}

impl Bookmark {
    pub fn new(title: &str, url: &str, favicon: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            url: url.to_string(),
            favicon,
        }
    }

    /// Converts a tab into a bookmark, e.g. when a tab is dropped onto
    /// favorites or a folder.
    pub fn from_tab(tab: &Tab) -> Self {
        Self::new(&tab.title, &tab.url, tab.favicon.clone())
    }
}

/// A named, collapsible container inside favorites. Folders nest
/// arbitrarily; they can hold bookmarks and other folders but never tabs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub id: String,
    pub name: String,
    pub collapsed: bool,
    pub items: Vec<FolderItem>,
}

impl Folder {
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            collapsed: false,
            items: Vec::new(),
        }
    }
}

/// A folder child. The explicit `kind` tag removes the structural-typing
/// ambiguity the extension otherwise has to duck-type around.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FolderItem {
    Bookmark(Bookmark),
    Folder(Folder),
}
