//! In-memory browser host.
//!
//! A deterministic implementation of the native API contract, used by the
//! demo binary and the test suite. It reproduces the behaviors the sync
//! engines are written against: sibling reindexing on every bookmark
//! create/move/remove, out-of-range move rejection, the
//! group-needs-a-member-tab constraint, and group garbage collection when
//! the last member closes.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::browser::api::{
    BrowserBookmarks, BrowserGroups, BrowserRuntime, BrowserTabs, BrowserWindows, GroupColor,
    NativeBookmarkNode, NativeGroup, NativeTab, NativeWindow, WindowKind, BOOKMARKS_BAR_ID,
};
use crate::types::errors::BrowserError;

const ROOT_ID: &str = "0";
const OTHER_BOOKMARKS_ID: &str = "2";

#[derive(Debug, Clone)]
struct NodeData {
    title: String,
    url: Option<String>,
}

#[derive(Debug)]
struct WindowState {
    id: u64,
    focused: bool,
    kind: WindowKind,
    tabs: Vec<NativeTab>,
}

#[derive(Debug)]
struct State {
    windows: Vec<WindowState>,
    groups: Vec<NativeGroup>,
    nodes: HashMap<String, NodeData>,
    children: HashMap<String, Vec<String>>,
    next_tab_id: i64,
    next_group_id: u64,
    next_window_id: u64,
    next_node_id: u64,
    notifications: Vec<(String, String)>,
    reload_count: u32,
}

impl State {
    fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(ROOT_ID.to_string(), NodeData { title: String::new(), url: None });
        nodes.insert(
            BOOKMARKS_BAR_ID.to_string(),
            NodeData { title: "Bookmarks Bar".to_string(), url: None },
        );
        nodes.insert(
            OTHER_BOOKMARKS_ID.to_string(),
            NodeData { title: "Other Bookmarks".to_string(), url: None },
        );
        let mut children = HashMap::new();
        children.insert(
            ROOT_ID.to_string(),
            vec![BOOKMARKS_BAR_ID.to_string(), OTHER_BOOKMARKS_ID.to_string()],
        );
        children.insert(BOOKMARKS_BAR_ID.to_string(), Vec::new());
        children.insert(OTHER_BOOKMARKS_ID.to_string(), Vec::new());

        Self {
            windows: vec![WindowState {
                id: 1,
                focused: true,
                kind: WindowKind::Normal,
                tabs: Vec::new(),
            }],
            groups: Vec::new(),
            nodes,
            children,
            next_tab_id: 1,
            next_group_id: 1,
            next_window_id: 2,
            next_node_id: 1,
            notifications: Vec::new(),
            reload_count: 0,
        }
    }

    fn window_mut(&mut self, window_id: u64) -> Result<&mut WindowState, BrowserError> {
        self.windows
            .iter_mut()
            .find(|w| w.id == window_id)
            .ok_or(BrowserError::WindowNotFound(window_id))
    }

    fn focused_window_id(&self) -> u64 {
        self.windows
            .iter()
            .find(|w| w.focused)
            .or_else(|| self.windows.first())
            .map(|w| w.id)
            .unwrap_or(1)
    }

    fn find_tab(&self, tab_id: i64) -> Result<&NativeTab, BrowserError> {
        self.windows
            .iter()
            .flat_map(|w| w.tabs.iter())
            .find(|t| t.id == tab_id)
            .ok_or(BrowserError::TabNotFound(tab_id))
    }

    fn reindex_window(window: &mut WindowState) {
        for (i, tab) in window.tabs.iter_mut().enumerate() {
            tab.index = i as u32;
        }
    }

    /// Drops groups whose last member tab went away, like the browser does.
    fn gc_groups(&mut self) {
        let live: Vec<u64> = self
            .windows
            .iter()
            .flat_map(|w| w.tabs.iter())
            .filter_map(|t| t.group_id)
            .collect();
        self.groups.retain(|g| live.contains(&g.id));
    }

    fn detach_tab(&mut self, tab_id: i64) -> Result<NativeTab, BrowserError> {
        for window in &mut self.windows {
            if let Some(pos) = window.tabs.iter().position(|t| t.id == tab_id) {
                let tab = window.tabs.remove(pos);
                Self::reindex_window(window);
                return Ok(tab);
            }
        }
        Err(BrowserError::TabNotFound(tab_id))
    }

    fn node_children(&self, parent_id: &str) -> Result<Vec<NativeBookmarkNode>, BrowserError> {
        let ids = self
            .children
            .get(parent_id)
            .ok_or_else(|| BrowserError::NodeNotFound(parent_id.to_string()))?;
        Ok(ids
            .iter()
            .enumerate()
            .map(|(i, id)| {
                let data = &self.nodes[id];
                NativeBookmarkNode {
                    id: id.clone(),
                    parent_id: Some(parent_id.to_string()),
                    index: i as u32,
                    title: data.title.clone(),
                    url: data.url.clone(),
                }
            })
            .collect())
    }

    fn insert_node(
        &mut self,
        parent_id: &str,
        title: &str,
        url: Option<&str>,
    ) -> Result<NativeBookmarkNode, BrowserError> {
        if !self.children.contains_key(parent_id) {
            return Err(BrowserError::NodeNotFound(parent_id.to_string()));
        }
        let id = format!("bm-{}", self.next_node_id);
        self.next_node_id += 1;
        self.nodes.insert(
            id.clone(),
            NodeData { title: title.to_string(), url: url.map(|u| u.to_string()) },
        );
        if url.is_none() {
            self.children.insert(id.clone(), Vec::new());
        }
        let siblings = self.children.get_mut(parent_id).expect("parent checked above");
        siblings.push(id.clone());
        Ok(NativeBookmarkNode {
            id,
            parent_id: Some(parent_id.to_string()),
            index: (siblings.len() - 1) as u32,
            title: title.to_string(),
            url: url.map(|u| u.to_string()),
        })
    }

    fn remove_node_recursive(&mut self, id: &str) {
        if let Some(child_ids) = self.children.remove(id) {
            for child in child_ids {
                self.remove_node_recursive(&child);
            }
        }
        self.nodes.remove(id);
    }
}

/// The in-memory host. Clone-free: share it behind an `Arc`.
pub struct MemoryBrowser {
    state: Mutex<State>,
}

impl MemoryBrowser {
    pub fn new() -> Self {
        Self { state: Mutex::new(State::new()) }
    }

    fn state(&self) -> Result<MutexGuard<'_, State>, BrowserError> {
        self.state
            .lock()
            .map_err(|_| BrowserError::Unavailable("browser state poisoned".to_string()))
    }

    /// Notifications raised so far, for assertions.
    pub fn notifications(&self) -> Vec<(String, String)> {
        self.state
            .lock()
            .map(|s| s.notifications.clone())
            .unwrap_or_default()
    }

    /// How many times the extension asked to be reloaded.
    pub fn reload_count(&self) -> u32 {
        self.state.lock().map(|s| s.reload_count).unwrap_or(0)
    }
}

impl Default for MemoryBrowser {
    fn default() -> Self {
        Self::new()
    }
}

impl BrowserTabs for MemoryBrowser {
    async fn query_tabs(&self) -> Result<Vec<NativeTab>, BrowserError> {
        let state = self.state()?;
        Ok(state.windows.iter().flat_map(|w| w.tabs.clone()).collect())
    }

    async fn tabs_in_window(&self, window_id: u64) -> Result<Vec<NativeTab>, BrowserError> {
        let state = self.state()?;
        state
            .windows
            .iter()
            .find(|w| w.id == window_id)
            .map(|w| w.tabs.clone())
            .ok_or(BrowserError::WindowNotFound(window_id))
    }

    async fn tabs_in_group(&self, group_id: u64) -> Result<Vec<NativeTab>, BrowserError> {
        let state = self.state()?;
        Ok(state
            .windows
            .iter()
            .flat_map(|w| w.tabs.iter())
            .filter(|t| t.group_id == Some(group_id))
            .cloned()
            .collect())
    }

    async fn get_tab(&self, tab_id: i64) -> Result<NativeTab, BrowserError> {
        let state = self.state()?;
        state.find_tab(tab_id).cloned()
    }

    async fn create_tab(
        &self,
        window_id: Option<u64>,
        url: Option<&str>,
        active: bool,
        pinned: bool,
    ) -> Result<NativeTab, BrowserError> {
        let mut state = self.state()?;
        let target = window_id.unwrap_or_else(|| state.focused_window_id());
        let id = state.next_tab_id;
        state.next_tab_id += 1;
        let url = url.unwrap_or("about:blank").to_string();
        let window = state.window_mut(target)?;
        if active {
            for tab in &mut window.tabs {
                tab.active = false;
            }
        }
        let tab = NativeTab {
            id,
            window_id: target,
            index: window.tabs.len() as u32,
            title: url.clone(),
            url,
            favicon: None,
            active,
            pinned,
            group_id: None,
        };
        window.tabs.push(tab.clone());
        Ok(tab)
    }

    async fn close_tab(&self, tab_id: i64) -> Result<(), BrowserError> {
        let mut state = self.state()?;
        state.detach_tab(tab_id)?;
        state.gc_groups();
        Ok(())
    }

    async fn activate_tab(&self, tab_id: i64) -> Result<(), BrowserError> {
        let mut state = self.state()?;
        let window_id = state.find_tab(tab_id)?.window_id;
        let window = state.window_mut(window_id)?;
        for tab in &mut window.tabs {
            tab.active = tab.id == tab_id;
        }
        Ok(())
    }

    async fn set_tab_pinned(&self, tab_id: i64, pinned: bool) -> Result<(), BrowserError> {
        let mut state = self.state()?;
        let window_id = state.find_tab(tab_id)?.window_id;
        let window = state.window_mut(window_id)?;
        if let Some(tab) = window.tabs.iter_mut().find(|t| t.id == tab_id) {
            tab.pinned = pinned;
        }
        Ok(())
    }

    async fn move_tab(&self, tab_id: i64, index: u32) -> Result<(), BrowserError> {
        let mut state = self.state()?;
        let window_id = state.find_tab(tab_id)?.window_id;
        let window = state.window_mut(window_id)?;
        let pos = window
            .tabs
            .iter()
            .position(|t| t.id == tab_id)
            .ok_or(BrowserError::TabNotFound(tab_id))?;
        let tab = window.tabs.remove(pos);
        let index = (index as usize).min(window.tabs.len());
        window.tabs.insert(index, tab);
        State::reindex_window(window);
        Ok(())
    }

    async fn group_tabs(
        &self,
        tab_ids: &[i64],
        group_id: Option<u64>,
        window_id: u64,
    ) -> Result<u64, BrowserError> {
        let mut state = self.state()?;
        let group_id = match group_id {
            Some(id) => {
                if !state.groups.iter().any(|g| g.id == id) {
                    return Err(BrowserError::GroupNotFound(id));
                }
                id
            }
            None => {
                if tab_ids.is_empty() {
                    return Err(BrowserError::Unavailable(
                        "a tab group needs at least one member tab".to_string(),
                    ));
                }
                let id = state.next_group_id;
                state.next_group_id += 1;
                state.groups.push(NativeGroup {
                    id,
                    window_id,
                    title: String::new(),
                    color: GroupColor::Grey,
                    collapsed: false,
                });
                id
            }
        };
        for &tab_id in tab_ids {
            state.find_tab(tab_id)?;
            for window in &mut state.windows {
                if let Some(tab) = window.tabs.iter_mut().find(|t| t.id == tab_id) {
                    tab.group_id = Some(group_id);
                }
            }
        }
        Ok(group_id)
    }

    async fn ungroup_tabs(&self, tab_ids: &[i64]) -> Result<(), BrowserError> {
        let mut state = self.state()?;
        for &tab_id in tab_ids {
            state.find_tab(tab_id)?;
            for window in &mut state.windows {
                if let Some(tab) = window.tabs.iter_mut().find(|t| t.id == tab_id) {
                    tab.group_id = None;
                }
            }
        }
        state.gc_groups();
        Ok(())
    }
}

impl BrowserWindows for MemoryBrowser {
    async fn current_window(&self) -> Result<NativeWindow, BrowserError> {
        let state = self.state()?;
        let id = state.focused_window_id();
        state
            .windows
            .iter()
            .find(|w| w.id == id)
            .map(|w| NativeWindow {
                id: w.id,
                focused: w.focused,
                kind: w.kind,
                tabs: w.tabs.clone(),
            })
            .ok_or(BrowserError::WindowNotFound(id))
    }

    async fn all_windows(&self) -> Result<Vec<NativeWindow>, BrowserError> {
        let state = self.state()?;
        Ok(state
            .windows
            .iter()
            .map(|w| NativeWindow {
                id: w.id,
                focused: w.focused,
                kind: w.kind,
                tabs: w.tabs.clone(),
            })
            .collect())
    }

    async fn focus_window(&self, window_id: u64) -> Result<(), BrowserError> {
        let mut state = self.state()?;
        if !state.windows.iter().any(|w| w.id == window_id) {
            return Err(BrowserError::WindowNotFound(window_id));
        }
        for window in &mut state.windows {
            window.focused = window.id == window_id;
        }
        Ok(())
    }

    async fn create_window(&self, url: Option<&str>) -> Result<NativeWindow, BrowserError> {
        let mut state = self.state()?;
        let id = state.next_window_id;
        state.next_window_id += 1;
        let tab_id = state.next_tab_id;
        state.next_tab_id += 1;
        let url = url.unwrap_or("about:blank").to_string();
        for window in &mut state.windows {
            window.focused = false;
        }
        let window = WindowState {
            id,
            focused: true,
            kind: WindowKind::Normal,
            tabs: vec![NativeTab {
                id: tab_id,
                window_id: id,
                index: 0,
                title: url.clone(),
                url,
                favicon: None,
                active: true,
                pinned: false,
                group_id: None,
            }],
        };
        let out = NativeWindow {
            id: window.id,
            focused: window.focused,
            kind: window.kind,
            tabs: window.tabs.clone(),
        };
        state.windows.push(window);
        Ok(out)
    }

    async fn create_window_with_tab(&self, tab_id: i64) -> Result<NativeWindow, BrowserError> {
        let mut state = self.state()?;
        let mut tab = state.detach_tab(tab_id)?;
        state.gc_groups();
        let id = state.next_window_id;
        state.next_window_id += 1;
        for window in &mut state.windows {
            window.focused = false;
        }
        tab.window_id = id;
        tab.index = 0;
        tab.active = true;
        tab.group_id = None;
        let window = WindowState {
            id,
            focused: true,
            kind: WindowKind::Normal,
            tabs: vec![tab],
        };
        let out = NativeWindow {
            id: window.id,
            focused: window.focused,
            kind: window.kind,
            tabs: window.tabs.clone(),
        };
        state.windows.push(window);
        Ok(out)
    }
}

impl BrowserBookmarks for MemoryBrowser {
    async fn find_folder(&self, title: &str) -> Result<Option<NativeBookmarkNode>, BrowserError> {
        let state = self.state()?;
        // Breadth-first from the root so the bookmarks bar wins over
        // deeper folders with the same title.
        let mut queue = vec![ROOT_ID.to_string()];
        while let Some(parent) = queue.pop() {
            for node in state.node_children(&parent)? {
                if node.is_folder() {
                    if node.title == title {
                        return Ok(Some(node));
                    }
                    queue.insert(0, node.id);
                }
            }
        }
        Ok(None)
    }

    async fn bookmark_children(&self, parent_id: &str) -> Result<Vec<NativeBookmarkNode>, BrowserError> {
        let state = self.state()?;
        state.node_children(parent_id)
    }

    async fn create_folder(
        &self,
        parent_id: &str,
        title: &str,
    ) -> Result<NativeBookmarkNode, BrowserError> {
        let mut state = self.state()?;
        state.insert_node(parent_id, title, None)
    }

    async fn create_bookmark(
        &self,
        parent_id: &str,
        title: &str,
        url: &str,
    ) -> Result<NativeBookmarkNode, BrowserError> {
        let mut state = self.state()?;
        state.insert_node(parent_id, title, Some(url))
    }

    async fn remove_bookmark_tree(&self, id: &str) -> Result<(), BrowserError> {
        let mut state = self.state()?;
        if !state.nodes.contains_key(id) {
            return Err(BrowserError::NodeNotFound(id.to_string()));
        }
        for siblings in state.children.values_mut() {
            siblings.retain(|c| c != id);
        }
        state.remove_node_recursive(id);
        Ok(())
    }

    async fn move_bookmark_node(&self, id: &str, parent_id: &str, index: u32) -> Result<(), BrowserError> {
        let mut state = self.state()?;
        if !state.nodes.contains_key(id) {
            return Err(BrowserError::NodeNotFound(id.to_string()));
        }
        if !state.children.contains_key(parent_id) {
            return Err(BrowserError::NodeNotFound(parent_id.to_string()));
        }
        for siblings in state.children.values_mut() {
            siblings.retain(|c| c != id);
        }
        let siblings = state.children.get_mut(parent_id).expect("parent checked above");
        if index as usize > siblings.len() {
            return Err(BrowserError::InvalidIndex(index as usize));
        }
        siblings.insert(index as usize, id.to_string());
        Ok(())
    }

    async fn set_bookmark_title(&self, id: &str, title: &str) -> Result<(), BrowserError> {
        let mut state = self.state()?;
        match state.nodes.get_mut(id) {
            Some(data) => {
                data.title = title.to_string();
                Ok(())
            }
            None => Err(BrowserError::NodeNotFound(id.to_string())),
        }
    }
}

impl BrowserGroups for MemoryBrowser {
    async fn query_groups(&self, window_id: u64) -> Result<Vec<NativeGroup>, BrowserError> {
        let state = self.state()?;
        Ok(state
            .groups
            .iter()
            .filter(|g| g.window_id == window_id)
            .cloned()
            .collect())
    }

    async fn get_group(&self, group_id: u64) -> Result<NativeGroup, BrowserError> {
        let state = self.state()?;
        state
            .groups
            .iter()
            .find(|g| g.id == group_id)
            .cloned()
            .ok_or(BrowserError::GroupNotFound(group_id))
    }

    async fn update_group(
        &self,
        group_id: u64,
        title: Option<&str>,
        color: Option<GroupColor>,
        collapsed: Option<bool>,
    ) -> Result<(), BrowserError> {
        let mut state = self.state()?;
        let group = state
            .groups
            .iter_mut()
            .find(|g| g.id == group_id)
            .ok_or(BrowserError::GroupNotFound(group_id))?;
        if let Some(title) = title {
            group.title = title.to_string();
        }
        if let Some(color) = color {
            group.color = color;
        }
        if let Some(collapsed) = collapsed {
            group.collapsed = collapsed;
        }
        Ok(())
    }
}

impl BrowserRuntime for MemoryBrowser {
    async fn notify(&self, title: &str, message: &str) -> Result<(), BrowserError> {
        let mut state = self.state()?;
        state
            .notifications
            .push((title.to_string(), message.to_string()));
        Ok(())
    }

    async fn reload_extension(&self) -> Result<(), BrowserError> {
        let mut state = self.state()?;
        state.reload_count += 1;
        Ok(())
    }
}
