//! Unit tests for Native Tab-Group Sync: group materialization, URL
//! diffing, reordering, rename, and teardown.

use std::sync::Arc;
use std::time::Duration;

use archy::browser::api::{BrowserGroups, BrowserTabs, GroupColor};
use archy::browser::MemoryBrowser;
use archy::services::tab_group_sync::{
    TabGroupSyncEngine, FAVORITES_GROUP_COLOR, FAVORITES_GROUP_TITLE,
};
use archy::types::section::FavoriteLink;

const WINDOW: u64 = 1;

fn link(url: &str) -> FavoriteLink {
    FavoriteLink {
        url: url.to_string(),
        title: url.to_string(),
    }
}

fn setup() -> (TabGroupSyncEngine<MemoryBrowser>, Arc<MemoryBrowser>) {
    let browser = Arc::new(MemoryBrowser::new());
    (TabGroupSyncEngine::new(Arc::clone(&browser)), browser)
}

async fn member_urls(engine: &TabGroupSyncEngine<MemoryBrowser>, name: &str) -> Vec<String> {
    engine
        .group_tabs(WINDOW, name)
        .await
        .into_iter()
        .map(|t| t.url)
        .collect()
}

// ─── Group materialization ───

#[tokio::test]
async fn test_get_or_create_group_is_idempotent() {
    let (engine, browser) = setup();
    let first = engine
        .get_or_create_group(WINDOW, FAVORITES_GROUP_TITLE, FAVORITES_GROUP_COLOR)
        .await
        .unwrap();
    let second = engine
        .get_or_create_group(WINDOW, FAVORITES_GROUP_TITLE, FAVORITES_GROUP_COLOR)
        .await
        .unwrap();
    assert_eq!(first, second);

    let group = browser.get_group(first).await.unwrap();
    assert_eq!(group.title, FAVORITES_GROUP_TITLE);
    assert_eq!(group.color, GroupColor::Blue);
    assert!(!group.collapsed);
}

#[tokio::test]
async fn test_throwaway_tab_is_closed_after_delay() {
    let (engine, browser) = setup();
    let group_id = engine
        .get_or_create_group(WINDOW, FAVORITES_GROUP_TITLE, FAVORITES_GROUP_COLOR)
        .await
        .unwrap();

    // Immediately after creation the throwaway still anchors the group
    assert_eq!(browser.tabs_in_group(group_id).await.unwrap().len(), 1);

    // Keep the group alive with a real member, then let the close fire
    engine
        .sync_urls_to_group(
            WINDOW,
            FAVORITES_GROUP_TITLE,
            FAVORITES_GROUP_COLOR,
            &[link("https://keep.example/")],
        )
        .await;
    tokio::time::sleep(Duration::from_millis(250)).await;

    let urls: Vec<String> = browser
        .tabs_in_group(group_id)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.url)
        .collect();
    assert_eq!(urls, vec!["https://keep.example/"]);
}

// ─── URL diffing ───

#[tokio::test]
async fn test_sync_opens_missing_urls_in_order() {
    let (engine, _browser) = setup();
    let desired = vec![link("https://a.example/"), link("https://b.example/")];
    engine
        .sync_urls_to_group(WINDOW, FAVORITES_GROUP_TITLE, FAVORITES_GROUP_COLOR, &desired)
        .await;

    let mut urls = member_urls(&engine, FAVORITES_GROUP_TITLE).await;
    urls.retain(|u| u != "about:blank"); // throwaway may still be closing
    assert_eq!(urls, vec!["https://a.example/", "https://b.example/"]);
}

#[tokio::test]
async fn test_sync_closes_unwanted_members() {
    let (engine, _browser) = setup();
    engine
        .sync_urls_to_group(
            WINDOW,
            FAVORITES_GROUP_TITLE,
            FAVORITES_GROUP_COLOR,
            &[link("https://a.example/"), link("https://b.example/")],
        )
        .await;
    engine
        .sync_urls_to_group(
            WINDOW,
            FAVORITES_GROUP_TITLE,
            FAVORITES_GROUP_COLOR,
            &[link("https://a.example/")],
        )
        .await;

    let mut urls = member_urls(&engine, FAVORITES_GROUP_TITLE).await;
    urls.retain(|u| u != "about:blank");
    assert_eq!(urls, vec!["https://a.example/"]);
}

#[tokio::test]
async fn test_empty_desired_list_tears_group_down() {
    let (engine, browser) = setup();
    engine
        .sync_urls_to_group(
            WINDOW,
            FAVORITES_GROUP_TITLE,
            FAVORITES_GROUP_COLOR,
            &[link("https://a.example/")],
        )
        .await;
    tokio::time::sleep(Duration::from_millis(250)).await;

    engine
        .sync_urls_to_group(WINDOW, FAVORITES_GROUP_TITLE, FAVORITES_GROUP_COLOR, &[])
        .await;

    assert!(member_urls(&engine, FAVORITES_GROUP_TITLE).await.is_empty());
    // Without members the group itself is gone
    assert!(browser.query_groups(WINDOW).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_desired_list_does_not_create_group() {
    let (engine, browser) = setup();
    engine
        .sync_urls_to_group(WINDOW, FAVORITES_GROUP_TITLE, FAVORITES_GROUP_COLOR, &[])
        .await;
    assert!(browser.query_groups(WINDOW).await.unwrap().is_empty());
}

// ─── Reordering ───

#[tokio::test]
async fn test_reorder_matches_desired_order() {
    let (engine, browser) = setup();
    let desired = vec![
        link("https://a.example/"),
        link("https://b.example/"),
        link("https://c.example/"),
    ];
    engine
        .sync_urls_to_group(WINDOW, FAVORITES_GROUP_TITLE, FAVORITES_GROUP_COLOR, &desired)
        .await;
    tokio::time::sleep(Duration::from_millis(250)).await;

    let reversed = vec![
        link("https://c.example/"),
        link("https://b.example/"),
        link("https://a.example/"),
    ];
    engine
        .reorder_group_tabs(WINDOW, FAVORITES_GROUP_TITLE, &reversed)
        .await;

    let tabs = browser.tabs_in_window(WINDOW).await.unwrap();
    let urls: Vec<&str> = tabs.iter().map(|t| t.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "https://c.example/",
            "https://b.example/",
            "https://a.example/",
        ]
    );
}

// ─── Membership helpers ───

#[tokio::test]
async fn test_add_tab_to_group_closes_duplicate_url() {
    let (engine, browser) = setup();
    engine
        .sync_urls_to_group(
            WINDOW,
            FAVORITES_GROUP_TITLE,
            FAVORITES_GROUP_COLOR,
            &[link("https://a.example/")],
        )
        .await;

    // A second loose tab with the same URL gets closed, not grouped
    let dup = browser
        .create_tab(Some(WINDOW), Some("https://a.example/"), false, false)
        .await
        .unwrap();
    engine
        .add_tab_to_group(&dup, FAVORITES_GROUP_TITLE, FAVORITES_GROUP_COLOR)
        .await;

    assert!(browser.get_tab(dup.id).await.is_err());
    let mut urls = member_urls(&engine, FAVORITES_GROUP_TITLE).await;
    urls.retain(|u| u != "about:blank");
    assert_eq!(urls, vec!["https://a.example/"]);
}

#[tokio::test]
async fn test_is_tab_in_group_and_remove() {
    let (engine, browser) = setup();
    engine
        .sync_urls_to_group(
            WINDOW,
            FAVORITES_GROUP_TITLE,
            FAVORITES_GROUP_COLOR,
            &[link("https://a.example/")],
        )
        .await;
    let member = engine
        .group_tabs(WINDOW, FAVORITES_GROUP_TITLE)
        .await
        .into_iter()
        .find(|t| t.url == "https://a.example/")
        .unwrap();
    assert!(engine.is_tab_in_group(member.id, FAVORITES_GROUP_TITLE).await);

    engine
        .remove_tab_from_group(member.id, FAVORITES_GROUP_TITLE)
        .await;
    assert!(!engine.is_tab_in_group(member.id, FAVORITES_GROUP_TITLE).await);
    assert!(browser.get_tab(member.id).await.is_ok());
}

// ─── Folder groups ───

#[tokio::test]
async fn test_rename_folder_group() {
    let (engine, browser) = setup();
    engine
        .sync_urls_to_group(WINDOW, "Work", GroupColor::Green, &[link("https://w.example/")])
        .await;

    engine.rename_folder_group(WINDOW, "Work", "Projects").await;

    let groups = browser.query_groups(WINDOW).await.unwrap();
    assert!(groups.iter().any(|g| g.title == "Projects"));
    assert!(!groups.iter().any(|g| g.title == "Work"));
}

#[tokio::test]
async fn test_remove_folder_group_closes_members() {
    let (engine, browser) = setup();
    engine
        .sync_urls_to_group(WINDOW, "Work", GroupColor::Green, &[link("https://w.example/")])
        .await;
    tokio::time::sleep(Duration::from_millis(250)).await;

    engine.remove_folder_group(WINDOW, "Work").await;

    assert!(engine.group_tabs(WINDOW, "Work").await.is_empty());
    assert!(browser.query_groups(WINDOW).await.unwrap().is_empty());
}
