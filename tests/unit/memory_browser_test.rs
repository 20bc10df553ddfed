//! Unit tests for the in-memory browser host — the behaviors the sync
//! engines depend on: sibling reindexing, the group-needs-a-tab
//! constraint, group garbage collection, and bounds-checked moves.

use archy::browser::api::{
    BrowserBookmarks, BrowserGroups, BrowserTabs, BrowserWindows, GroupColor, BOOKMARKS_BAR_ID,
};
use archy::browser::MemoryBrowser;
use archy::types::errors::BrowserError;

// ─── Tabs ───

#[tokio::test]
async fn test_created_tabs_are_indexed_in_order() {
    let browser = MemoryBrowser::new();
    let a = browser.create_tab(Some(1), Some("https://a.example/"), false, false).await.unwrap();
    let b = browser.create_tab(Some(1), Some("https://b.example/"), false, false).await.unwrap();
    assert_eq!(a.index, 0);
    assert_eq!(b.index, 1);
}

#[tokio::test]
async fn test_closing_a_tab_reindexes_siblings() {
    let browser = MemoryBrowser::new();
    let a = browser.create_tab(Some(1), None, false, false).await.unwrap();
    let b = browser.create_tab(Some(1), None, false, false).await.unwrap();
    let c = browser.create_tab(Some(1), None, false, false).await.unwrap();

    browser.close_tab(b.id).await.unwrap();
    let tabs = browser.tabs_in_window(1).await.unwrap();
    assert_eq!(tabs.len(), 2);
    assert_eq!(tabs[0].id, a.id);
    assert_eq!(tabs[0].index, 0);
    assert_eq!(tabs[1].id, c.id);
    assert_eq!(tabs[1].index, 1);
}

#[tokio::test]
async fn test_move_tab_clamps_to_window_size() {
    let browser = MemoryBrowser::new();
    let a = browser.create_tab(Some(1), None, false, false).await.unwrap();
    let _b = browser.create_tab(Some(1), None, false, false).await.unwrap();

    browser.move_tab(a.id, 99).await.unwrap();
    let tabs = browser.tabs_in_window(1).await.unwrap();
    assert_eq!(tabs[1].id, a.id);
}

#[tokio::test]
async fn test_activate_tab_deactivates_others() {
    let browser = MemoryBrowser::new();
    let a = browser.create_tab(Some(1), None, true, false).await.unwrap();
    let b = browser.create_tab(Some(1), None, false, false).await.unwrap();

    browser.activate_tab(b.id).await.unwrap();
    let tabs = browser.tabs_in_window(1).await.unwrap();
    assert!(!tabs.iter().find(|t| t.id == a.id).unwrap().active);
    assert!(tabs.iter().find(|t| t.id == b.id).unwrap().active);
}

#[tokio::test]
async fn test_closing_unknown_tab_errors() {
    let browser = MemoryBrowser::new();
    assert!(matches!(
        browser.close_tab(999).await,
        Err(BrowserError::TabNotFound(999))
    ));
}

// ─── Windows ───

#[tokio::test]
async fn test_create_window_with_tab_tears_off() {
    let browser = MemoryBrowser::new();
    let a = browser.create_tab(Some(1), Some("https://a.example/"), false, false).await.unwrap();
    let _b = browser.create_tab(Some(1), None, false, false).await.unwrap();

    let window = browser.create_window_with_tab(a.id).await.unwrap();
    assert_eq!(window.tabs.len(), 1);
    assert_eq!(window.tabs[0].id, a.id);
    assert_eq!(window.tabs[0].window_id, window.id);

    let original = browser.tabs_in_window(1).await.unwrap();
    assert!(original.iter().all(|t| t.id != a.id));
}

#[tokio::test]
async fn test_new_window_takes_focus() {
    let browser = MemoryBrowser::new();
    let window = browser.create_window(Some("https://w.example/")).await.unwrap();
    let current = browser.current_window().await.unwrap();
    assert_eq!(current.id, window.id);
}

// ─── Groups ───

#[tokio::test]
async fn test_group_creation_requires_a_member_tab() {
    let browser = MemoryBrowser::new();
    let result = browser.group_tabs(&[], None, 1).await;
    assert!(matches!(result, Err(BrowserError::Unavailable(_))));
}

#[tokio::test]
async fn test_group_is_garbage_collected_with_last_member() {
    let browser = MemoryBrowser::new();
    let tab = browser.create_tab(Some(1), None, false, false).await.unwrap();
    let group_id = browser.group_tabs(&[tab.id], None, 1).await.unwrap();
    browser
        .update_group(group_id, Some("Archy Favorites"), Some(GroupColor::Blue), Some(false))
        .await
        .unwrap();
    assert_eq!(browser.query_groups(1).await.unwrap().len(), 1);

    browser.close_tab(tab.id).await.unwrap();
    assert!(browser.query_groups(1).await.unwrap().is_empty());
    assert!(matches!(
        browser.get_group(group_id).await,
        Err(BrowserError::GroupNotFound(_))
    ));
}

// ─── Bookmarks ───

#[tokio::test]
async fn test_bookmark_children_reindex_after_removal() {
    let browser = MemoryBrowser::new();
    let a = browser.create_bookmark(BOOKMARKS_BAR_ID, "A", "https://a.example/").await.unwrap();
    let _b = browser.create_bookmark(BOOKMARKS_BAR_ID, "B", "https://b.example/").await.unwrap();
    let _c = browser.create_bookmark(BOOKMARKS_BAR_ID, "C", "https://c.example/").await.unwrap();

    browser.remove_bookmark_tree(&a.id).await.unwrap();
    let children = browser.bookmark_children(BOOKMARKS_BAR_ID).await.unwrap();
    assert_eq!(children.len(), 2);
    assert_eq!(children[0].title, "B");
    assert_eq!(children[0].index, 0);
    assert_eq!(children[1].index, 1);
}

#[tokio::test]
async fn test_remove_folder_tree_drops_descendants() {
    let browser = MemoryBrowser::new();
    let folder = browser.create_folder(BOOKMARKS_BAR_ID, "F").await.unwrap();
    let inner = browser.create_folder(&folder.id, "Inner").await.unwrap();
    let leaf = browser.create_bookmark(&inner.id, "Leaf", "https://leaf.example/").await.unwrap();

    browser.remove_bookmark_tree(&folder.id).await.unwrap();
    assert!(matches!(
        browser.bookmark_children(&inner.id).await,
        Err(BrowserError::NodeNotFound(_))
    ));
    assert!(matches!(
        browser.set_bookmark_title(&leaf.id, "x").await,
        Err(BrowserError::NodeNotFound(_))
    ));
}

#[tokio::test]
async fn test_move_node_rejects_out_of_range_index() {
    let browser = MemoryBrowser::new();
    let a = browser.create_bookmark(BOOKMARKS_BAR_ID, "A", "https://a.example/").await.unwrap();

    let result = browser.move_bookmark_node(&a.id, BOOKMARKS_BAR_ID, 5).await;
    assert!(matches!(result, Err(BrowserError::InvalidIndex(5))));
}

#[tokio::test]
async fn test_find_folder_prefers_shallow_match() {
    let browser = MemoryBrowser::new();
    let outer = browser.create_folder(BOOKMARKS_BAR_ID, "Projects").await.unwrap();
    let _nested = browser.create_folder(&outer.id, "Projects").await.unwrap();

    let found = browser.find_folder("Projects").await.unwrap().unwrap();
    assert_eq!(found.id, outer.id);
}
