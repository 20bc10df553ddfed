//! Native Bookmark Sync.
//!
//! Keeps a dedicated native folder ("Archy Favorites") mirroring the
//! favorites section — bookmarks matched by URL, folders by title,
//! recursively. The mirror is one-directional in steady state (tree →
//! native); the only read-back is the first-run bootstrap that seeds an
//! empty favorites section from the user's pre-existing bar bookmarks.
//!
//! Every native call is isolated: one failed create/move/remove is logged
//! and the rest of the pass continues. Partial synchronization beats a
//! fully-failed batch — the in-memory tree stays authoritative and the
//! mirror catches up on the next pass.

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use url::Url;

use crate::browser::api::{BrowserBookmarks, NativeBookmarkNode, BOOKMARKS_BAR_ID};
use crate::types::bookmark::{Bookmark, Folder, FolderItem};
use crate::types::errors::BrowserError;
use crate::types::section::{Section, SectionItem};

pub const FAVORITES_FOLDER_TITLE: &str = "Archy Favorites";
pub const BACKUP_FOLDER_TITLE: &str = "Archy Backup";
/// Only the five most recent backup snapshots are kept.
pub const BACKUP_RETENTION: usize = 5;

/// What one level of the mirror should look like, in order.
#[derive(Debug, Clone)]
enum DesiredNode {
    Bookmark { title: String, url: String },
    Folder { name: String, children: Vec<DesiredNode> },
}

fn desired_from_folder_items(items: &[FolderItem]) -> Vec<DesiredNode> {
    items
        .iter()
        .map(|item| match item {
            FolderItem::Bookmark(b) => DesiredNode::Bookmark {
                title: b.title.clone(),
                url: b.url.clone(),
            },
            FolderItem::Folder(f) => DesiredNode::Folder {
                name: f.name.clone(),
                children: desired_from_folder_items(&f.items),
            },
        })
        .collect()
}

fn desired_from_section_items(items: &[SectionItem]) -> Vec<DesiredNode> {
    items
        .iter()
        .filter_map(|item| match item {
            SectionItem::Bookmark(b) => Some(DesiredNode::Bookmark {
                title: b.title.clone(),
                url: b.url.clone(),
            }),
            SectionItem::Folder(f) => Some(DesiredNode::Folder {
                name: f.name.clone(),
                children: desired_from_folder_items(&f.items),
            }),
            _ => None,
        })
        .collect()
}

/// Reconciles the native bookmark mirror against the favorites section.
pub struct BookmarkSyncEngine<B> {
    browser: Arc<B>,
}

impl<B: BrowserBookmarks> BookmarkSyncEngine<B> {
    pub fn new(browser: Arc<B>) -> Self {
        Self { browser }
    }

    /// Finds or creates the "Archy Favorites" folder under the bar.
    pub async fn get_or_create_root(&self) -> Result<NativeBookmarkNode, BrowserError> {
        if let Some(folder) = self.browser.find_folder(FAVORITES_FOLDER_TITLE).await? {
            return Ok(folder);
        }
        let folder = self
            .browser
            .create_folder(BOOKMARKS_BAR_ID, FAVORITES_FOLDER_TITLE)
            .await?;
        log::info!("created native favorites folder {}", folder.id);
        Ok(folder)
    }

    /// Reconciles the whole mirror. Only root-folder resolution can fail;
    /// everything below is best-effort per node.
    pub async fn sync_favorites(&self, favorites: &Section) -> Result<(), BrowserError> {
        let root = self.get_or_create_root().await?;
        self.sync_level(root.id, desired_from_section_items(&favorites.items))
            .await;
        Ok(())
    }

    /// One level of the reconcile, recursing into folders. Deletions run
    /// first so later position math is not fighting stale siblings.
    fn sync_level(
        &self,
        parent_id: String,
        want: Vec<DesiredNode>,
    ) -> Pin<Box<dyn Future<Output = ()> + '_>> {
        Box::pin(async move {
            let existing = match self.browser.bookmark_children(&parent_id).await {
                Ok(children) => children,
                Err(e) => {
                    log::warn!("cannot list native folder {}: {}", parent_id, e);
                    return;
                }
            };

            let want_urls: HashSet<&str> = want
                .iter()
                .filter_map(|n| match n {
                    DesiredNode::Bookmark { url, .. } => Some(url.as_str()),
                    _ => None,
                })
                .collect();
            let want_folders: HashSet<&str> = want
                .iter()
                .filter_map(|n| match n {
                    DesiredNode::Folder { name, .. } => Some(name.as_str()),
                    _ => None,
                })
                .collect();

            for child in &existing {
                let keep = match &child.url {
                    Some(url) => want_urls.contains(url.as_str()),
                    None => want_folders.contains(child.title.as_str()),
                };
                if !keep {
                    if let Err(e) = self.browser.remove_bookmark_tree(&child.id).await {
                        log::warn!("failed to remove stale node {}: {}", child.title, e);
                    }
                }
            }

            // Re-fetch after deletion; indices have shifted.
            let current = match self.browser.bookmark_children(&parent_id).await {
                Ok(children) => children,
                Err(e) => {
                    log::warn!("cannot re-list native folder {}: {}", parent_id, e);
                    return;
                }
            };

            for (position, node) in want.iter().enumerate() {
                match node {
                    DesiredNode::Folder { name, children } => {
                        let matched = current
                            .iter()
                            .find(|c| c.is_folder() && c.title == *name)
                            .cloned();
                        let folder = match matched {
                            Some(folder) => {
                                if folder.index as usize != position {
                                    self.move_into_place(&folder.id, &parent_id, position).await;
                                }
                                folder
                            }
                            None => match self.browser.create_folder(&parent_id, name).await {
                                Ok(folder) => {
                                    if folder.index as usize != position {
                                        self.move_into_place(&folder.id, &parent_id, position)
                                            .await;
                                    }
                                    folder
                                }
                                Err(e) => {
                                    log::warn!("failed to create folder {}: {}", name, e);
                                    continue;
                                }
                            },
                        };
                        self.sync_level(folder.id, children.clone()).await;
                    }
                    DesiredNode::Bookmark { title, url } => {
                        let matched = current
                            .iter()
                            .find(|c| c.url.as_deref() == Some(url.as_str()))
                            .cloned();
                        match matched {
                            Some(bookmark) => {
                                if bookmark.index as usize != position {
                                    self.move_into_place(&bookmark.id, &parent_id, position)
                                        .await;
                                }
                                if bookmark.title != *title {
                                    if let Err(e) =
                                        self.browser.set_bookmark_title(&bookmark.id, title).await
                                    {
                                        log::warn!("failed to retitle {}: {}", url, e);
                                    }
                                }
                            }
                            None => match self.browser.create_bookmark(&parent_id, title, url).await
                            {
                                Ok(bookmark) => {
                                    if bookmark.index as usize != position {
                                        self.move_into_place(&bookmark.id, &parent_id, position)
                                            .await;
                                    }
                                }
                                Err(e) => {
                                    log::warn!("failed to create bookmark {}: {}", url, e);
                                }
                            },
                        }
                    }
                }
            }
        })
    }

    /// Bounds-checked move: the native API rejects out-of-range indices,
    /// so cap against the current sibling count before calling.
    async fn move_into_place(&self, node_id: &str, parent_id: &str, index: usize) {
        let count = match self.browser.bookmark_children(parent_id).await {
            Ok(children) => children.len(),
            Err(e) => {
                log::warn!("cannot size folder {} for move: {}", parent_id, e);
                return;
            }
        };
        let capped = index.min(count.saturating_sub(1));
        if let Err(e) = self
            .browser
            .move_bookmark_node(node_id, parent_id, capped as u32)
            .await
        {
            log::warn!("failed to move node {}: {}", node_id, e);
        }
    }

    /// Writes a timestamped snapshot of favorites under "Archy Backup"
    /// and prunes the oldest snapshots beyond the retention cap.
    pub async fn snapshot_backup(
        &self,
        favorites: &Section,
        timestamp_secs: i64,
    ) -> Result<(), BrowserError> {
        let backup_root = match self.browser.find_folder(BACKUP_FOLDER_TITLE).await? {
            Some(folder) => folder,
            None => {
                self.browser
                    .create_folder(BOOKMARKS_BAR_ID, BACKUP_FOLDER_TITLE)
                    .await?
            }
        };

        let title = format!("backup-{}", timestamp_secs);
        let snapshot = self.browser.create_folder(&backup_root.id, &title).await?;
        self.write_tree(snapshot.id, desired_from_section_items(&favorites.items))
            .await;

        let mut snapshots = self.browser.bookmark_children(&backup_root.id).await?;
        snapshots.sort_by_key(|n| parse_backup_timestamp(&n.title));
        while snapshots.len() > BACKUP_RETENTION {
            let oldest = snapshots.remove(0);
            if let Err(e) = self.browser.remove_bookmark_tree(&oldest.id).await {
                log::warn!("failed to prune backup {}: {}", oldest.title, e);
            }
        }
        Ok(())
    }

    /// Plain write into a fresh folder — no reconcile needed.
    fn write_tree(
        &self,
        parent_id: String,
        nodes: Vec<DesiredNode>,
    ) -> Pin<Box<dyn Future<Output = ()> + '_>> {
        Box::pin(async move {
            for node in nodes {
                match node {
                    DesiredNode::Bookmark { title, url } => {
                        if let Err(e) =
                            self.browser.create_bookmark(&parent_id, &title, &url).await
                        {
                            log::warn!("backup write failed for {}: {}", url, e);
                        }
                    }
                    DesiredNode::Folder { name, children } => {
                        match self.browser.create_folder(&parent_id, &name).await {
                            Ok(folder) => self.write_tree(folder.id, children).await,
                            Err(e) => log::warn!("backup write failed for {}: {}", name, e),
                        }
                    }
                }
            }
        })
    }

    /// First-run seeding: reads the user's direct bar bookmarks and groups
    /// them by domain — domains with two or more entries become folders,
    /// the rest stay top-level. Invoked only when favorites is empty.
    pub async fn bootstrap_from_native(&self) -> Result<Vec<SectionItem>, BrowserError> {
        let bar = self.browser.bookmark_children(BOOKMARKS_BAR_ID).await?;

        let mut order: Vec<String> = Vec::new();
        let mut groups: Vec<(String, Vec<Bookmark>)> = Vec::new();
        for node in bar.iter().filter(|n| !n.is_folder()) {
            let Some(url) = node.url.as_deref() else {
                continue;
            };
            let domain = Url::parse(url)
                .ok()
                .and_then(|u| u.host_str().map(|h| h.to_string()))
                .unwrap_or_else(|| "other".to_string());
            let bookmark = Bookmark::new(&node.title, url, None);
            match groups.iter_mut().find(|(d, _)| *d == domain) {
                Some((_, list)) => list.push(bookmark),
                None => {
                    order.push(domain.clone());
                    groups.push((domain, vec![bookmark]));
                }
            }
        }

        let mut items = Vec::new();
        for domain in order {
            let Some(position) = groups.iter().position(|(d, _)| *d == domain) else {
                continue;
            };
            let (name, bookmarks) = groups.remove(position);
            if bookmarks.len() >= 2 {
                let mut folder = Folder::new(&name);
                folder.items = bookmarks.into_iter().map(FolderItem::Bookmark).collect();
                items.push(SectionItem::Folder(folder));
            } else {
                items.extend(bookmarks.into_iter().map(SectionItem::Bookmark));
            }
        }
        Ok(items)
    }
}

fn parse_backup_timestamp(title: &str) -> i64 {
    title
        .strip_prefix("backup-")
        .and_then(|t| t.parse().ok())
        .unwrap_or(0)
}
