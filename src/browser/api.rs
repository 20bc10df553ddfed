//! The native browser API contract.
//!
//! The browser's tab, window, bookmark, and tab-group APIs are external
//! collaborators: an asynchronous CRUD surface the core awaits but never
//! owns. Each capability is its own trait so engines declare exactly what
//! they touch; `MemoryBrowser` implements all of them for the demo binary
//! and the test suite.
//!
//! Calls are non-blocking and may fail at any time (a tab closed from
//! under us, an index invalidated by concurrent reindexing). Callers in
//! the sync engines treat every failure as recoverable.

use serde::{Deserialize, Serialize};

use crate::types::errors::BrowserError;

/// The native id of the bookmarks bar folder.
pub const BOOKMARKS_BAR_ID: &str = "1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowKind {
    Normal,
    Popup,
}

/// A tab as the browser reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NativeTab {
    pub id: i64,
    pub window_id: u64,
    pub index: u32,
    pub url: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    pub active: bool,
    pub pinned: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<u64>,
}

/// A window with its populated tab list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NativeWindow {
    pub id: u64,
    pub focused: bool,
    pub kind: WindowKind,
    pub tabs: Vec<NativeTab>,
}

/// A node in the native bookmark tree. `url` of `None` marks a folder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NativeBookmarkNode {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub index: u32,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl NativeBookmarkNode {
    pub fn is_folder(&self) -> bool {
        self.url.is_none()
    }
}

/// The fixed palette of native tab-group colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupColor {
    Grey,
    Blue,
    Red,
    Yellow,
    Green,
    Pink,
    Purple,
    Cyan,
    Orange,
}

/// A native tab group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NativeGroup {
    pub id: u64,
    pub window_id: u64,
    pub title: String,
    pub color: GroupColor,
    pub collapsed: bool,
}

/// Tab CRUD, grouping, and movement.
#[allow(async_fn_in_trait)]
pub trait BrowserTabs {
    async fn query_tabs(&self) -> Result<Vec<NativeTab>, BrowserError>;
    async fn tabs_in_window(&self, window_id: u64) -> Result<Vec<NativeTab>, BrowserError>;
    async fn tabs_in_group(&self, group_id: u64) -> Result<Vec<NativeTab>, BrowserError>;
    async fn get_tab(&self, tab_id: i64) -> Result<NativeTab, BrowserError>;
    /// Creates a tab. `window_id` of `None` targets the focused window.
    async fn create_tab(
        &self,
        window_id: Option<u64>,
        url: Option<&str>,
        active: bool,
        pinned: bool,
    ) -> Result<NativeTab, BrowserError>;
    fn close_tab(
        &self,
        tab_id: i64,
    ) -> impl std::future::Future<Output = Result<(), BrowserError>> + Send;
    async fn activate_tab(&self, tab_id: i64) -> Result<(), BrowserError>;
    async fn set_tab_pinned(&self, tab_id: i64, pinned: bool) -> Result<(), BrowserError>;
    async fn move_tab(&self, tab_id: i64, index: u32) -> Result<(), BrowserError>;
    /// Adds tabs to a group. `group_id` of `None` creates a new group in
    /// `window_id` and returns its id; a group always needs at least one
    /// member tab, so creation goes through here rather than a group API.
    async fn group_tabs(
        &self,
        tab_ids: &[i64],
        group_id: Option<u64>,
        window_id: u64,
    ) -> Result<u64, BrowserError>;
    async fn ungroup_tabs(&self, tab_ids: &[i64]) -> Result<(), BrowserError>;
}

/// Window enumeration and focus.
#[allow(async_fn_in_trait)]
pub trait BrowserWindows {
    async fn current_window(&self) -> Result<NativeWindow, BrowserError>;
    async fn all_windows(&self) -> Result<Vec<NativeWindow>, BrowserError>;
    async fn focus_window(&self, window_id: u64) -> Result<(), BrowserError>;
    async fn create_window(&self, url: Option<&str>) -> Result<NativeWindow, BrowserError>;
    /// Creates a window around an existing tab (tear-off).
    async fn create_window_with_tab(&self, tab_id: i64) -> Result<NativeWindow, BrowserError>;
}

/// The native bookmark tree. Sibling indices are reassigned by the
/// browser on every create/move/remove, which is why sync passes issue
/// their calls strictly in sequence.
#[allow(async_fn_in_trait)]
pub trait BrowserBookmarks {
    /// Finds a folder by exact title anywhere in the tree.
    async fn find_folder(&self, title: &str) -> Result<Option<NativeBookmarkNode>, BrowserError>;
    async fn bookmark_children(
        &self,
        parent_id: &str,
    ) -> Result<Vec<NativeBookmarkNode>, BrowserError>;
    async fn create_folder(
        &self,
        parent_id: &str,
        title: &str,
    ) -> Result<NativeBookmarkNode, BrowserError>;
    async fn create_bookmark(
        &self,
        parent_id: &str,
        title: &str,
        url: &str,
    ) -> Result<NativeBookmarkNode, BrowserError>;
    /// Removes a node and, for folders, its entire subtree.
    async fn remove_bookmark_tree(&self, id: &str) -> Result<(), BrowserError>;
    async fn move_bookmark_node(
        &self,
        id: &str,
        parent_id: &str,
        index: u32,
    ) -> Result<(), BrowserError>;
    async fn set_bookmark_title(&self, id: &str, title: &str) -> Result<(), BrowserError>;
}

/// Native tab-group metadata.
#[allow(async_fn_in_trait)]
pub trait BrowserGroups {
    async fn query_groups(&self, window_id: u64) -> Result<Vec<NativeGroup>, BrowserError>;
    async fn get_group(&self, group_id: u64) -> Result<NativeGroup, BrowserError>;
    async fn update_group(
        &self,
        group_id: u64,
        title: Option<&str>,
        color: Option<GroupColor>,
        collapsed: Option<bool>,
    ) -> Result<(), BrowserError>;
}

/// Runtime-level operations: notifications and the last-resort reload.
#[allow(async_fn_in_trait)]
pub trait BrowserRuntime {
    async fn notify(&self, title: &str, message: &str) -> Result<(), BrowserError>;
    async fn reload_extension(&self) -> Result<(), BrowserError>;
}
