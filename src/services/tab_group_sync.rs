//! Native Tab-Group Sync.
//!
//! Maintains one native tab group per favorites context: a shared group
//! for flat favorites plus one group per folder, each mirroring its
//! bookmark URLs in order. Triggered opportunistically after any
//! favorites-mutating action and explicitly best-effort — a failed native
//! call is logged at its call site and never blocks the tree mutation
//! that triggered it.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::browser::api::{BrowserGroups, BrowserTabs, GroupColor, NativeTab};
use crate::types::errors::BrowserError;
use crate::types::section::FavoriteLink;

pub const FAVORITES_GROUP_TITLE: &str = "Archy Favorites";
pub const FAVORITES_GROUP_COLOR: GroupColor = GroupColor::Blue;

/// Grace period before closing the throwaway tab used to materialize a
/// new group. The close is fire-and-forget: if it loses the race the
/// throwaway survives visibly, which is the acceptable degraded state.
const THROWAWAY_CLOSE_DELAY: Duration = Duration::from_millis(150);

/// Reconciles native tab groups against favorites/folder URL lists.
pub struct TabGroupSyncEngine<B> {
    browser: Arc<B>,
}

impl<B> TabGroupSyncEngine<B>
where
    B: BrowserTabs + BrowserGroups + Send + Sync + 'static,
{
    pub fn new(browser: Arc<B>) -> Self {
        Self { browser }
    }

    /// The id of the group titled `name` in this window, if it exists.
    pub async fn group_id_by_name(
        &self,
        window_id: u64,
        name: &str,
    ) -> Result<Option<u64>, BrowserError> {
        let groups = self.browser.query_groups(window_id).await?;
        Ok(groups.into_iter().find(|g| g.title == name).map(|g| g.id))
    }

    /// Idempotent lookup-or-create. The native API cannot create an empty
    /// group, so creation opens a throwaway tab, groups it, configures the
    /// group, then schedules the throwaway's close.
    pub async fn get_or_create_group(
        &self,
        window_id: u64,
        name: &str,
        color: GroupColor,
    ) -> Result<u64, BrowserError> {
        if let Some(id) = self.group_id_by_name(window_id, name).await? {
            return Ok(id);
        }

        let throwaway = self
            .browser
            .create_tab(Some(window_id), None, false, false)
            .await?;
        let group_id = self
            .browser
            .group_tabs(&[throwaway.id], None, window_id)
            .await?;
        self.browser
            .update_group(group_id, Some(name), Some(color), Some(false))
            .await?;
        log::info!("created tab group '{}' ({})", name, group_id);

        let browser = Arc::clone(&self.browser);
        let throwaway_id = throwaway.id;
        tokio::spawn(async move {
            tokio::time::sleep(THROWAWAY_CLOSE_DELAY).await;
            if let Err(e) = browser.close_tab(throwaway_id).await {
                log::warn!("throwaway tab {} left open: {}", throwaway_id, e);
            }
        });

        Ok(group_id)
    }

    /// Member tabs of the group titled `name`, in window order.
    pub async fn group_tabs(&self, window_id: u64, name: &str) -> Vec<NativeTab> {
        match self.group_id_by_name(window_id, name).await {
            Ok(Some(id)) => self.browser.tabs_in_group(id).await.unwrap_or_default(),
            Ok(None) => Vec::new(),
            Err(e) => {
                log::warn!("cannot query group '{}': {}", name, e);
                Vec::new()
            }
        }
    }

    /// True when the tab belongs to the group titled `name`.
    pub async fn is_tab_in_group(&self, tab_id: i64, name: &str) -> bool {
        let Ok(tab) = self.browser.get_tab(tab_id).await else {
            return false;
        };
        let Some(group_id) = tab.group_id else {
            return false;
        };
        match self.browser.get_group(group_id).await {
            Ok(group) => group.title == name,
            Err(_) => false,
        }
    }

    /// Adds a live tab to the group, closing it instead when the group
    /// already holds its URL in another tab.
    pub async fn add_tab_to_group(&self, tab: &NativeTab, name: &str, color: GroupColor) {
        let group_id = match self.get_or_create_group(tab.window_id, name, color).await {
            Ok(id) => id,
            Err(e) => {
                log::warn!("cannot materialize group '{}': {}", name, e);
                return;
            }
        };
        if tab.group_id == Some(group_id) {
            return;
        }
        let members = self.browser.tabs_in_group(group_id).await.unwrap_or_default();
        if members.iter().any(|t| t.url == tab.url && t.id != tab.id) {
            log::debug!("closing duplicate of {} already in '{}'", tab.url, name);
            if let Err(e) = self.browser.close_tab(tab.id).await {
                log::warn!("failed to close duplicate tab {}: {}", tab.id, e);
            }
            return;
        }
        if let Err(e) = self
            .browser
            .group_tabs(&[tab.id], Some(group_id), tab.window_id)
            .await
        {
            log::warn!("failed to group tab {}: {}", tab.id, e);
        }
    }

    /// Takes a tab out of the group titled `name`; tabs in other groups
    /// are left alone.
    pub async fn remove_tab_from_group(&self, tab_id: i64, name: &str) {
        if !self.is_tab_in_group(tab_id, name).await {
            return;
        }
        if let Err(e) = self.browser.ungroup_tabs(&[tab_id]).await {
            log::warn!("failed to ungroup tab {}: {}", tab_id, e);
        }
    }

    /// Opens (or focuses) a URL inside the group.
    pub async fn open_in_group(
        &self,
        window_id: u64,
        link: &FavoriteLink,
        name: &str,
        color: GroupColor,
    ) {
        let group_id = match self.get_or_create_group(window_id, name, color).await {
            Ok(id) => id,
            Err(e) => {
                log::warn!("cannot materialize group '{}': {}", name, e);
                return;
            }
        };
        let members = self.browser.tabs_in_group(group_id).await.unwrap_or_default();
        if let Some(existing) = members.iter().find(|t| t.url == link.url) {
            if let Err(e) = self.browser.activate_tab(existing.id).await {
                log::warn!("failed to focus tab {}: {}", existing.id, e);
            }
            return;
        }
        match self
            .browser
            .create_tab(Some(window_id), Some(&link.url), false, false)
            .await
        {
            Ok(tab) => {
                if let Err(e) = self
                    .browser
                    .group_tabs(&[tab.id], Some(group_id), window_id)
                    .await
                {
                    log::warn!("failed to group new tab {}: {}", tab.id, e);
                }
            }
            Err(e) => log::warn!("failed to open {}: {}", link.url, e),
        }
    }

    /// Diffs group membership against the desired URL list: unwanted
    /// member tabs close, missing URLs open and join. An empty desired
    /// list tears the group's members down entirely (the group itself is
    /// garbage-collected by the browser with its last tab).
    pub async fn sync_urls_to_group(
        &self,
        window_id: u64,
        name: &str,
        color: GroupColor,
        desired: &[FavoriteLink],
    ) {
        if desired.is_empty() {
            let members = self.group_tabs(window_id, name).await;
            for tab in members {
                if let Err(e) = self.browser.close_tab(tab.id).await {
                    log::warn!("teardown failed for tab {}: {}", tab.id, e);
                }
            }
            return;
        }

        let group_id = match self.get_or_create_group(window_id, name, color).await {
            Ok(id) => id,
            Err(e) => {
                log::warn!("cannot materialize group '{}': {}", name, e);
                return;
            }
        };

        let members = self.browser.tabs_in_group(group_id).await.unwrap_or_default();
        let desired_urls: HashSet<&str> = desired.iter().map(|l| l.url.as_str()).collect();
        let present: HashSet<String> = members
            .iter()
            .filter(|t| desired_urls.contains(t.url.as_str()))
            .map(|t| t.url.clone())
            .collect();

        // Open missing URLs before closing stale members: a group with no
        // tabs left is dissolved by the browser, losing the group id.
        let mut opened = Vec::new();
        for link in desired {
            if present.contains(&link.url) {
                continue;
            }
            match self
                .browser
                .create_tab(Some(window_id), Some(&link.url), false, false)
                .await
            {
                Ok(tab) => opened.push(tab.id),
                Err(e) => log::warn!("failed to open {}: {}", link.url, e),
            }
        }
        if !opened.is_empty() {
            if let Err(e) = self
                .browser
                .group_tabs(&opened, Some(group_id), window_id)
                .await
            {
                log::warn!("failed to group {} new tabs: {}", opened.len(), e);
            }
        }

        for tab in &members {
            if !desired_urls.contains(tab.url.as_str()) {
                if let Err(e) = self.browser.close_tab(tab.id).await {
                    log::warn!("failed to close stale tab {}: {}", tab.id, e);
                }
            }
        }

        if let Err(e) = self
            .browser
            .update_group(group_id, None, None, Some(false))
            .await
        {
            log::warn!("failed to expand group '{}': {}", name, e);
        }
    }

    /// Moves each member tab to the index matching its position in the
    /// desired order; members not in the list sort last, stably.
    pub async fn reorder_group_tabs(&self, window_id: u64, name: &str, desired: &[FavoriteLink]) {
        let Ok(Some(group_id)) = self.group_id_by_name(window_id, name).await else {
            return;
        };
        let members = self.browser.tabs_in_group(group_id).await.unwrap_or_default();
        if members.is_empty() {
            return;
        }

        let rank = |tab: &NativeTab| {
            desired
                .iter()
                .position(|l| l.url == tab.url)
                .unwrap_or(usize::MAX)
        };
        let mut sorted = members;
        sorted.sort_by_key(|t| rank(t));

        for (position, tab) in sorted.iter().enumerate() {
            if tab.index as usize != position {
                if let Err(e) = self.browser.move_tab(tab.id, position as u32).await {
                    log::warn!("failed to reorder tab {}: {}", tab.id, e);
                }
            }
        }
    }

    /// Retitles the folder's group when the folder is renamed.
    pub async fn rename_folder_group(&self, window_id: u64, old_name: &str, new_name: &str) {
        match self.group_id_by_name(window_id, old_name).await {
            Ok(Some(group_id)) => {
                if let Err(e) = self
                    .browser
                    .update_group(group_id, Some(new_name), None, None)
                    .await
                {
                    log::warn!("failed to rename group '{}': {}", old_name, e);
                }
            }
            Ok(None) => {}
            Err(e) => log::warn!("cannot query group '{}': {}", old_name, e),
        }
    }

    /// Closes every member of the folder's group when the folder goes away.
    pub async fn remove_folder_group(&self, window_id: u64, name: &str) {
        let members = self.group_tabs(window_id, name).await;
        for tab in members {
            if let Err(e) = self.browser.close_tab(tab.id).await {
                log::warn!("teardown failed for tab {}: {}", tab.id, e);
            }
        }
    }
}
