//! Section Tree Model.
//!
//! Pure functions over `&[Section]` — every operation returns a fresh tree
//! and never mutates its input; callers persist the result. Expected
//! conditions (missing id, duplicate URL) never produce errors: the input
//! tree comes back unchanged and a diagnostic is logged, leaving the
//! decision to surface it to the caller.
//!
//! All folder-touching operations go through one shared set of recursive
//! walkers (`rewrite_folder`, `take_bookmark`, `count`), so the
//! "siblings untouched" guarantee holds structurally instead of being
//! re-implemented per call site.

use crate::managers::drag_manager::DragItem;
use crate::types::bookmark::{Bookmark, Folder, FolderItem};
use crate::types::section::{
    ArchivedTab, FavoriteLink, Section, SectionItem, SectionKind,
};
use crate::types::tab::{PinnedTabRecord, Tab};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Starter favorites seeded on first run.
const DEFAULT_BOOKMARKS: &[(&str, &str, &str)] = &[
    ("getting-started", "Getting Started", "https://arc.net/getting-started"),
    ("arc-resources", "Arc Resources", "https://resources.arc.net/"),
    ("import-logins-bookmarks", "Import Logins & Bookmarks", "https://arc.net/import"),
    ("try-arc-max", "Try Arc Max", "https://arc.net/max"),
    ("the-browser-company", "The Browser Company", "https://thebrowser.company/"),
    ("keeping-tabs", "Keeping Tabs", "https://arc.net/keeping-tabs"),
];

/// The default tree: seeded favorites, empty Today, empty collapsed Archive.
pub fn create_default_sections() -> Vec<Section> {
    let favorites = Section {
        id: "favorites".to_string(),
        name: "Favorites".to_string(),
        kind: SectionKind::Favorites,
        collapsed: false,
        items: DEFAULT_BOOKMARKS
            .iter()
            .map(|(id, title, url)| {
                SectionItem::Bookmark(Bookmark {
                    id: (*id).to_string(),
                    title: (*title).to_string(),
                    url: (*url).to_string(),
                    favicon: None,
                })
            })
            .collect(),
    };
    let today = Section::new("today", "Today", SectionKind::Today);
    let mut archive = Section::new("archive", "Archive Tabs", SectionKind::Archive);
    archive.collapsed = true;
    vec![favorites, today, archive]
}

/// A fresh, empty workspace section.
pub fn create_workspace_section(name: &str) -> Section {
    Section::new(
        &format!("workspace-{}", Uuid::new_v4()),
        name,
        SectionKind::Workspace,
    )
}

// ─── Shared tree walkers ───

/// Applies `edit` to the folder with `folder_id` wherever it sits, at any
/// depth. `edit` returning `None` deletes the folder (and its subtree).
/// Every other item is passed through untouched.
fn rewrite_folder_items<F>(items: Vec<FolderItem>, folder_id: &str, edit: &F) -> Vec<FolderItem>
where
    F: Fn(Folder) -> Option<Folder>,
{
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        match item {
            FolderItem::Folder(folder) => {
                if folder.id == folder_id {
                    if let Some(edited) = edit(folder) {
                        out.push(FolderItem::Folder(edited));
                    }
                } else {
                    let mut folder = folder;
                    folder.items = rewrite_folder_items(folder.items, folder_id, edit);
                    out.push(FolderItem::Folder(folder));
                }
            }
            other => out.push(other),
        }
    }
    out
}

fn rewrite_folder_in_section<F>(
    items: Vec<SectionItem>,
    folder_id: &str,
    edit: &F,
) -> Vec<SectionItem>
where
    F: Fn(Folder) -> Option<Folder>,
{
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        match item {
            SectionItem::Folder(folder) => {
                if folder.id == folder_id {
                    if let Some(edited) = edit(folder) {
                        out.push(SectionItem::Folder(edited));
                    }
                } else {
                    let mut folder = folder;
                    folder.items = rewrite_folder_items(folder.items, folder_id, edit);
                    out.push(SectionItem::Folder(folder));
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Rewrites the matching folder across every section.
fn rewrite_folder<F>(sections: &[Section], folder_id: &str, edit: F) -> Vec<Section>
where
    F: Fn(Folder) -> Option<Folder>,
{
    sections
        .iter()
        .map(|section| {
            let mut section = section.clone();
            section.items = rewrite_folder_in_section(section.items, folder_id, &edit);
            section
        })
        .collect()
}

fn take_bookmark_from_folder_items(
    items: Vec<FolderItem>,
    bookmark_id: &str,
    taken: &mut Option<Bookmark>,
) -> Vec<FolderItem> {
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        match item {
            FolderItem::Bookmark(b) if b.id == bookmark_id && taken.is_none() => {
                *taken = Some(b);
            }
            FolderItem::Folder(mut folder) => {
                folder.items = take_bookmark_from_folder_items(folder.items, bookmark_id, taken);
                out.push(FolderItem::Folder(folder));
            }
            other => out.push(other),
        }
    }
    out
}

/// Extracts the bookmark with `bookmark_id` from wherever it lives —
/// top level or nested inside any folder.
fn take_bookmark(
    sections: &[Section],
    bookmark_id: &str,
) -> (Vec<Section>, Option<Bookmark>) {
    let mut taken: Option<Bookmark> = None;
    let rewritten = sections
        .iter()
        .map(|section| {
            let mut section = section.clone();
            let mut items = Vec::with_capacity(section.items.len());
            for item in section.items {
                match item {
                    SectionItem::Bookmark(b) if b.id == bookmark_id && taken.is_none() => {
                        taken = Some(b);
                    }
                    SectionItem::Folder(mut folder) => {
                        folder.items =
                            take_bookmark_from_folder_items(folder.items, bookmark_id, &mut taken);
                        items.push(SectionItem::Folder(folder));
                    }
                    other => items.push(other),
                }
            }
            section.items = items;
            section
        })
        .collect();
    (rewritten, taken)
}

fn count_bookmarks_in_folder_items(items: &[FolderItem]) -> usize {
    items
        .iter()
        .map(|item| match item {
            FolderItem::Bookmark(_) => 1,
            FolderItem::Folder(f) => count_bookmarks_in_folder_items(&f.items),
        })
        .sum()
}

/// Total bookmark count across the whole tree, folders included.
pub fn count_all_bookmarks(sections: &[Section]) -> usize {
    sections
        .iter()
        .flat_map(|s| s.items.iter())
        .map(|item| match item {
            SectionItem::Bookmark(_) => 1,
            SectionItem::Folder(f) => count_bookmarks_in_folder_items(&f.items),
            _ => 0,
        })
        .sum()
}

fn favorites_top_level_has_url(sections: &[Section], url: &str) -> bool {
    sections
        .iter()
        .filter(|s| s.kind == SectionKind::Favorites)
        .flat_map(|s| s.items.iter())
        .any(|item| item.url() == Some(url))
}

// ─── Bookmark operations ───

/// Appends a bookmark to favorites unless its URL already exists at the
/// top level of that section. Duplicate adds are a silent no-op.
pub fn add_bookmark_to_favorites(sections: &[Section], bookmark: Bookmark) -> Vec<Section> {
    if favorites_top_level_has_url(sections, &bookmark.url) {
        log::debug!("bookmark already in favorites: {}", bookmark.url);
        return sections.to_vec();
    }
    sections
        .iter()
        .map(|section| {
            let mut section = section.clone();
            if section.kind == SectionKind::Favorites {
                section.items.push(SectionItem::Bookmark(bookmark.clone()));
            }
            section
        })
        .collect()
}

/// Removes a bookmark by id from the top level of favorites only; nested
/// bookmarks are removed via their folder.
pub fn remove_bookmark_from_favorites(sections: &[Section], bookmark_id: &str) -> Vec<Section> {
    sections
        .iter()
        .map(|section| {
            let mut section = section.clone();
            if section.kind == SectionKind::Favorites {
                section.items.retain(|item| {
                    !matches!(item, SectionItem::Bookmark(b) if b.id == bookmark_id)
                });
            }
            section
        })
        .collect()
}

// ─── Folder operations ───

/// Appends a folder to the top level of favorites.
pub fn add_folder_to_favorites(sections: &[Section], folder: Folder) -> Vec<Section> {
    sections
        .iter()
        .map(|section| {
            let mut section = section.clone();
            if section.kind == SectionKind::Favorites {
                section.items.push(SectionItem::Folder(folder.clone()));
            }
            section
        })
        .collect()
}

/// Appends a subfolder to the parent folder, wherever it is nested.
pub fn add_subfolder(sections: &[Section], parent_folder_id: &str, subfolder: Folder) -> Vec<Section> {
    rewrite_folder(sections, parent_folder_id, move |mut parent| {
        parent.items.push(FolderItem::Folder(subfolder.clone()));
        Some(parent)
    })
}

pub fn toggle_folder_collapse(sections: &[Section], folder_id: &str) -> Vec<Section> {
    rewrite_folder(sections, folder_id, |mut folder| {
        folder.collapsed = !folder.collapsed;
        Some(folder)
    })
}

pub fn rename_folder(sections: &[Section], folder_id: &str, new_name: &str) -> Vec<Section> {
    rewrite_folder(sections, folder_id, |mut folder| {
        folder.name = new_name.to_string();
        Some(folder)
    })
}

/// Hard delete: the folder and its entire subtree go away. Children are
/// not promoted; the caller confirms with the user before invoking this.
pub fn remove_folder(sections: &[Section], folder_id: &str) -> Vec<Section> {
    rewrite_folder(sections, folder_id, |_| None)
}

/// Appends a bookmark to the folder unless the folder already holds that
/// URL (duplicates rejected, logged).
pub fn add_bookmark_to_folder(
    sections: &[Section],
    folder_id: &str,
    bookmark: Bookmark,
) -> Vec<Section> {
    rewrite_folder(sections, folder_id, move |mut folder| {
        let exists = folder
            .items
            .iter()
            .any(|i| matches!(i, FolderItem::Bookmark(b) if b.url == bookmark.url));
        if exists {
            log::debug!("bookmark already in folder {}: {}", folder.name, bookmark.url);
        } else {
            folder.items.push(FolderItem::Bookmark(bookmark.clone()));
        }
        Some(folder)
    })
}

pub fn remove_bookmark_from_folder(
    sections: &[Section],
    folder_id: &str,
    bookmark_id: &str,
) -> Vec<Section> {
    rewrite_folder(sections, folder_id, |mut folder| {
        folder
            .items
            .retain(|i| !matches!(i, FolderItem::Bookmark(b) if b.id == bookmark_id));
        Some(folder)
    })
}

/// Two-phase move: extract the bookmark from wherever it currently lives,
/// then append it to the target folder. A missing bookmark leaves the
/// tree unchanged — non-fatal, but logged so the condition is observable.
pub fn move_bookmark_to_folder(
    sections: &[Section],
    bookmark_id: &str,
    target_folder_id: &str,
) -> Vec<Section> {
    let (without, taken) = take_bookmark(sections, bookmark_id);
    match taken {
        Some(bookmark) => add_bookmark_to_folder(&without, target_folder_id, bookmark),
        None => {
            log::warn!("move requested for unknown bookmark {}", bookmark_id);
            sections.to_vec()
        }
    }
}

// ─── Today merge ───

/// Replaces the Today section's items with the merge of live tabs and
/// stored pinned records. Display order: live pinned tabs (live order),
/// then stored pinned records whose URL is not live (materialized as
/// inactive placeholders with negative ids), then unpinned live tabs.
/// Every other section passes through untouched.
pub fn update_today_section(
    sections: &[Section],
    live_tabs: &[Tab],
    stored_pinned: &[PinnedTabRecord],
    excluded_group: Option<u64>,
) -> Vec<Section> {
    let live: Vec<&Tab> = live_tabs
        .iter()
        .filter(|t| match (excluded_group, t.group_id) {
            (Some(excluded), Some(group)) => group != excluded,
            _ => true,
        })
        .collect();

    let mut merged: Vec<SectionItem> = Vec::with_capacity(live.len() + stored_pinned.len());
    let mut seen_urls: Vec<&str> = Vec::new();

    for tab in live.iter().filter(|t| t.pinned) {
        merged.push(SectionItem::Tab((*tab).clone()));
        seen_urls.push(&tab.url);
    }

    for (position, record) in stored_pinned.iter().enumerate() {
        if seen_urls.contains(&record.url.as_str()) {
            continue;
        }
        let placeholder_id = if record.id != 0 {
            -record.id.abs()
        } else {
            -(position as i64 + 1)
        };
        merged.push(SectionItem::Tab(Tab {
            id: placeholder_id,
            url: record.url.clone(),
            title: record.title.clone(),
            favicon: record.favicon.clone(),
            active: false,
            pinned: true,
            window_id: 0,
            index: 0,
            group_id: None,
        }));
        seen_urls.push(&record.url);
    }

    for tab in live.iter().filter(|t| !t.pinned) {
        merged.push(SectionItem::Tab((*tab).clone()));
    }

    sections
        .iter()
        .map(|section| {
            if section.kind == SectionKind::Today {
                let mut section = section.clone();
                section.items = merged.clone();
                section
            } else {
                section.clone()
            }
        })
        .collect()
}

// ─── Archive ───

/// Prepends a timestamped record of the tab to the Archive section. The
/// Today section is untouched; closing the real tab is the caller's job.
pub fn archive_tab(sections: &[Section], tab: &Tab) -> Vec<Section> {
    let archived = ArchivedTab {
        id: tab.id,
        url: tab.url.clone(),
        title: tab.title.clone(),
        favicon: tab.favicon.clone(),
        archived_at: now_millis(),
    };
    sections
        .iter()
        .map(|section| {
            let mut section = section.clone();
            if section.kind == SectionKind::Archive {
                section.items.insert(0, SectionItem::Archived(archived.clone()));
            }
            section
        })
        .collect()
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

// ─── Section-level operations ───

/// Flips the collapsed flag on the matching section. The model does not
/// special-case Today — callers enforce the "Today never collapses" rule.
pub fn toggle_section_collapse(sections: &[Section], section_id: &str) -> Vec<Section> {
    sections
        .iter()
        .map(|section| {
            let mut section = section.clone();
            if section.id == section_id {
                section.collapsed = !section.collapsed;
            }
            section
        })
        .collect()
}

/// Reorders an item inside one section. `to` is an insertion point before
/// removal; `None` means the end of the list.
pub fn reorder_within_section(
    sections: &[Section],
    section_id: &str,
    from: usize,
    to: Option<usize>,
) -> Vec<Section> {
    sections
        .iter()
        .map(|section| {
            let mut section = section.clone();
            if section.id == section_id && from < section.items.len() {
                let item = section.items.remove(from);
                let mut index = to.unwrap_or(section.items.len());
                if index > from {
                    index -= 1;
                }
                let index = index.min(section.items.len());
                section.items.insert(index, item);
            }
            section
        })
        .collect()
}

/// Moves an item across sections: remove at the source slot, convert tabs
/// into bookmarks when the destination is favorites, reject duplicate
/// URLs there, and insert at the target slot. A rejected move returns the
/// input tree unchanged rather than dropping the item.
pub fn move_item_between_sections(
    sections: &[Section],
    source_section_id: &str,
    source_index: usize,
    target_section_id: &str,
    target_index: Option<usize>,
) -> Vec<Section> {
    let Some(source) = sections.iter().find(|s| s.id == source_section_id) else {
        log::warn!("move from unknown section {}", source_section_id);
        return sections.to_vec();
    };
    let Some(item) = source.items.get(source_index).cloned() else {
        log::warn!(
            "move from {} index {} out of bounds",
            source_section_id,
            source_index
        );
        return sections.to_vec();
    };

    let target_kind = sections
        .iter()
        .find(|s| s.id == target_section_id)
        .map(|s| s.kind);
    let Some(target_kind) = target_kind else {
        log::warn!("move to unknown section {}", target_section_id);
        return sections.to_vec();
    };

    let item = if target_kind == SectionKind::Favorites {
        match item {
            SectionItem::Tab(ref tab) => SectionItem::Bookmark(Bookmark::from_tab(tab)),
            SectionItem::Archived(ref a) => SectionItem::Bookmark(Bookmark::new(
                &a.title,
                &a.url,
                a.favicon.clone(),
            )),
            other => other,
        }
    } else {
        item
    };

    if target_kind == SectionKind::Favorites {
        if let Some(url) = item.url() {
            if favorites_top_level_has_url(sections, url) {
                log::debug!("rejecting duplicate favorites entry: {}", url);
                return sections.to_vec();
            }
        }
    }

    sections
        .iter()
        .map(|section| {
            let mut section = section.clone();
            if section.id == source_section_id {
                section.items.remove(source_index);
            }
            if section.id == target_section_id {
                let index = target_index
                    .unwrap_or(section.items.len())
                    .min(section.items.len());
                section.items.insert(index, item.clone());
            }
            section
        })
        .collect()
}

// ─── Flattening for native mirrors ───

fn collect_links_from_folder_items(items: &[FolderItem], out: &mut Vec<FavoriteLink>) {
    for item in items {
        match item {
            FolderItem::Bookmark(b) => out.push(FavoriteLink {
                url: b.url.clone(),
                title: b.title.clone(),
            }),
            FolderItem::Folder(f) => collect_links_from_folder_items(&f.items, out),
        }
    }
}

fn collect_bookmarks_from_folder_items(items: &[FolderItem], out: &mut Vec<Bookmark>) {
    for item in items {
        match item {
            FolderItem::Bookmark(b) => out.push(b.clone()),
            FolderItem::Folder(f) => collect_bookmarks_from_folder_items(&f.items, out),
        }
    }
}

/// Every bookmark in the tree, folders included, in display order.
pub fn collect_bookmarks(sections: &[Section]) -> Vec<Bookmark> {
    let mut out = Vec::new();
    for section in sections {
        for item in &section.items {
            match item {
                SectionItem::Bookmark(b) => out.push(b.clone()),
                SectionItem::Folder(f) => collect_bookmarks_from_folder_items(&f.items, &mut out),
                _ => {}
            }
        }
    }
    out
}

/// Flattens the favorites section into url/title pairs in display order,
/// depth-first through folders. This is the desired member list for the
/// native tab group.
pub fn collect_favorite_links(favorites: &Section) -> Vec<FavoriteLink> {
    let mut out = Vec::new();
    for item in &favorites.items {
        match item {
            SectionItem::Bookmark(b) => out.push(FavoriteLink {
                url: b.url.clone(),
                title: b.title.clone(),
            }),
            SectionItem::Folder(f) => collect_links_from_folder_items(&f.items, &mut out),
            _ => {}
        }
    }
    out
}

// ─── Drag-move planning ───

/// What a committed drag-and-drop should turn into. Today-internal moves
/// become real browser calls; everything else is a tree edit.
#[derive(Debug, Clone, PartialEq)]
pub enum MovePlan {
    /// Same-slot drop or an impossible move: do nothing.
    None,
    /// Move the live browser tab to a new position in its window.
    MoveBrowserTab { tab_id: i64, to_index: u32 },
    /// Dragged an unpinned tab above the pinned divider: pin it.
    PinBrowserTab { tab_id: i64 },
    /// Dragged a pinned tab below the divider: unpin it and drop its
    /// stored record.
    UnpinBrowserTab { tab_id: i64, url: String },
    /// Apply this already-computed tree and persist it.
    TreeEdit(Vec<Section>),
}

/// Translates a committed drag into a plan. This is the consuming move
/// handler of the drag reducer: it detects same-slot no-ops, special-cases
/// Today (live tab moves, crossing the pinned divider), converts tabs to
/// bookmarks when favorites is the destination, and rejects duplicates.
pub fn plan_move(
    sections: &[Section],
    drag: &DragItem,
    target_section_id: &str,
    target_index: Option<usize>,
) -> MovePlan {
    if drag.section_id == target_section_id {
        if let Some(index) = target_index {
            if index == drag.index || index == drag.index + 1 {
                return MovePlan::None;
            }
        }
    }

    let today = sections.iter().find(|s| s.kind == SectionKind::Today);
    let today_id = today.map(|s| s.id.as_str());

    if Some(drag.section_id.as_str()) == today_id && Some(target_section_id) == today_id {
        if let SectionItem::Tab(tab) = &drag.item {
            if tab.is_placeholder() {
                log::debug!("ignoring reorder of stored-pinned placeholder {}", tab.url);
                return MovePlan::None;
            }
            let today_items = today.map(|s| s.items.as_slice()).unwrap_or(&[]);
            let pinned_count = today_items
                .iter()
                .filter(|i| matches!(i, SectionItem::Tab(t) if t.pinned))
                .count();
            let index = target_index.unwrap_or(today_items.len());

            if tab.pinned && index >= pinned_count {
                return MovePlan::UnpinBrowserTab {
                    tab_id: tab.id,
                    url: tab.url.clone(),
                };
            }
            if !tab.pinned && index < pinned_count {
                return MovePlan::PinBrowserTab { tab_id: tab.id };
            }

            let mut to_index = index;
            if to_index > drag.index {
                to_index -= 1;
            }
            return MovePlan::MoveBrowserTab {
                tab_id: tab.id,
                to_index: to_index as u32,
            };
        }
    }

    let edited = if drag.section_id == target_section_id {
        reorder_within_section(sections, &drag.section_id, drag.index, target_index)
    } else {
        move_item_between_sections(
            sections,
            &drag.section_id,
            drag.index,
            target_section_id,
            target_index,
        )
    };
    if edited == sections {
        return MovePlan::None;
    }
    MovePlan::TreeEdit(edited)
}
