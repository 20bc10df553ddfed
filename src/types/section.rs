use serde::{Deserialize, Serialize};

use crate::types::bookmark::{Bookmark, Folder};
use crate::types::tab::Tab;

/// Top-level grouping kind. Exactly one `today` section exists in any
/// well-formed tree; `favorites` holds the user-curated tree mirrored to
/// native bookmarks and tab groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Favorites,
    Today,
    Workspace,
    Archive,
}

/// A record of a tab the user archived. Inert: only the link matters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchivedTab {
    pub id: i64,
    pub url: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    /// Unix milliseconds at the moment of archiving.
    pub archived_at: i64,
}

/// A section child. Tabs appear only in `today`, archived records only in
/// `archive`; folders and bookmarks live in `favorites` and workspaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SectionItem {
    Tab(Tab),
    Bookmark(Bookmark),
    Folder(Folder),
    Archived(ArchivedTab),
}

impl SectionItem {
    pub fn url(&self) -> Option<&str> {
        match self {
            SectionItem::Tab(t) => Some(&t.url),
            SectionItem::Bookmark(b) => Some(&b.url),
            SectionItem::Archived(a) => Some(&a.url),
            SectionItem::Folder(_) => None,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            SectionItem::Tab(t) => &t.title,
            SectionItem::Bookmark(b) => &b.title,
            SectionItem::Archived(a) => &a.title,
            SectionItem::Folder(f) => &f.name,
        }
    }
}

/// A named top-level grouping with an ordered item list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SectionKind,
    pub collapsed: bool,
    pub items: Vec<SectionItem>,
}

impl Section {
    pub fn new(id: &str, name: &str, kind: SectionKind) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            kind,
            collapsed: false,
            items: Vec::new(),
        }
    }
}

/// A flattened url/title pair in display order, used when pushing the
/// favorites tree into the native tab group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteLink {
    pub url: String,
    pub title: String,
}
