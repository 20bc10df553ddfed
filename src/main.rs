//! Archy — vertical-tab and favorites sidebar core.
//!
//! Entry point: an interactive console demo walking the core components
//! against the in-memory browser host. The real extension surfaces drive
//! the same code through the message router.

use std::sync::Arc;

use archy::app::App;
use archy::browser::api::{BrowserTabs, BrowserWindows};
use archy::browser::MemoryBrowser;
use archy::managers::drag_manager::{DragController, DragItem};
use archy::managers::section_manager::{
    self, add_bookmark_to_favorites, add_folder_to_favorites, collect_favorite_links,
    count_all_bookmarks, update_today_section,
};
use archy::message_router::handle_message;
use archy::services::bookmark_sync::BookmarkSyncEngine;
use archy::services::tab_group_sync::{
    TabGroupSyncEngine, FAVORITES_GROUP_COLOR, FAVORITES_GROUP_TITLE,
};
use archy::types::bookmark::{Bookmark, Folder};
use archy::types::section::SectionKind;
use archy::types::tab::PinnedTabRecord;

use serde_json::json;
use tokio::sync::Mutex;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                 Archy v{} — Demo Mode                     ║", env!("CARGO_PKG_VERSION"));
    println!("║     Vertical-tab and favorites sidebar core                ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    let browser = Arc::new(MemoryBrowser::new());

    demo_store();
    demo_section_tree();
    demo_today_merge();
    demo_drag_drop();
    demo_bookmark_sync(&browser).await;
    demo_tab_group_sync(&browser).await;
    demo_router(&browser).await;

    println!();
    println!("═══════════════════════════════════════════════════════════════");
    println!("  ✅ All core components demonstrated successfully!");
    println!("═══════════════════════════════════════════════════════════════");
}

fn section(name: &str) {
    println!("───────────────────────────────────────────────────────────────");
    println!("  📦 {}", name);
    println!("───────────────────────────────────────────────────────────────");
}

fn demo_store() {
    section("Persistent Section Store");

    let app = App::new_in_memory().expect("Failed to init App");
    let sections = app.store.load_sections().expect("load failed");
    println!("  Seeded {} sections on first load", sections.len());
    println!(
        "  Favorites starts with {} bookmarks",
        count_all_bookmarks(&sections)
    );

    app.store.save_sections(&sections).expect("save failed");
    let reloaded = app.store.load_sections().expect("reload failed");
    assert_eq!(reloaded, sections);
    println!("  Round-tripped the tree through storage");
    println!("  ✓ SectionStore OK");
    println!();
}

fn demo_section_tree() {
    section("Section Tree Model");

    let tree = section_manager::create_default_sections();
    let tree = add_bookmark_to_favorites(&tree, Bookmark::new("Rust", "https://rust-lang.org/", None));
    let folder = Folder::new("Reading");
    let folder_id = folder.id.clone();
    let tree = add_folder_to_favorites(&tree, folder);
    let before = count_all_bookmarks(&tree);
    let bookmark_id = "getting-started";
    let tree = section_manager::move_bookmark_to_folder(&tree, bookmark_id, &folder_id);
    assert_eq!(count_all_bookmarks(&tree), before);
    println!("  Added a bookmark, created a folder, moved a bookmark into it");
    println!("  Bookmark count preserved across the move: {}", before);

    let favorites = tree
        .iter()
        .find(|s| s.kind == SectionKind::Favorites)
        .expect("favorites present");
    let links = collect_favorite_links(favorites);
    println!("  Flattened favorites for the native mirrors: {} links", links.len());
    println!("  ✓ Section tree OK");
    println!();
}

fn demo_today_merge() {
    section("Today Merge");

    let tree = section_manager::create_default_sections();
    let live = vec![
        tab(1, "https://a.example/", true),
        tab(2, "https://b.example/", false),
    ];
    let stored = vec![PinnedTabRecord {
        id: 9,
        url: "https://pinned.example/".to_string(),
        title: "Pinned".to_string(),
        favicon: None,
    }];
    let merged = update_today_section(&tree, &live, &stored, None);
    let today = merged
        .iter()
        .find(|s| s.kind == SectionKind::Today)
        .expect("today present");
    println!("  Merged {} live tabs + 1 stored pin into {} Today items", live.len(), today.items.len());
    println!("  ✓ Today merge OK");
    println!();
}

fn tab(id: i64, url: &str, pinned: bool) -> archy::types::tab::Tab {
    archy::types::tab::Tab {
        id,
        url: url.to_string(),
        title: url.to_string(),
        favicon: None,
        active: false,
        pinned,
        window_id: 1,
        index: 0,
        group_id: None,
    }
}

fn demo_drag_drop() {
    section("Drag & Drop Reducer");

    let tree = section_manager::create_default_sections();
    let favorites = &tree[0];
    let mut controller = DragController::new();
    controller.begin_drag(DragItem::new(favorites.items[0].clone(), "favorites", 0));
    controller.drag_over_item("favorites", 2, 120.0, 100.0, 24.0);
    let intent = controller
        .drop_on("favorites", Some(3))
        .expect("drag in flight");
    let plan = section_manager::plan_move(&tree, &intent.drag, &intent.target_section_id, intent.target_index);
    println!("  Drag of '{}' produced plan {}", intent.drag.item.title(), discriminant_name(&plan));
    assert!(!controller.is_dragging());
    println!("  Drag state cleared after drop");
    println!("  ✓ Drag & drop OK");
    println!();
}

fn discriminant_name(plan: &section_manager::MovePlan) -> &'static str {
    match plan {
        section_manager::MovePlan::None => "None",
        section_manager::MovePlan::MoveBrowserTab { .. } => "MoveBrowserTab",
        section_manager::MovePlan::PinBrowserTab { .. } => "PinBrowserTab",
        section_manager::MovePlan::UnpinBrowserTab { .. } => "UnpinBrowserTab",
        section_manager::MovePlan::TreeEdit(_) => "TreeEdit",
    }
}

async fn demo_bookmark_sync(browser: &Arc<MemoryBrowser>) {
    section("Native Bookmark Sync");

    let engine = BookmarkSyncEngine::new(Arc::clone(browser));
    let tree = section_manager::create_default_sections();
    let favorites = &tree[0];
    engine.sync_favorites(favorites).await.expect("sync failed");
    let root = engine.get_or_create_root().await.expect("root missing");
    println!("  Mirrored favorites into native folder '{}'", root.title);
    engine
        .snapshot_backup(favorites, 1_700_000_000)
        .await
        .expect("backup failed");
    println!("  Wrote a timestamped backup snapshot");
    println!("  ✓ Bookmark sync OK");
    println!();
}

async fn demo_tab_group_sync(browser: &Arc<MemoryBrowser>) {
    section("Native Tab-Group Sync");

    let engine = TabGroupSyncEngine::new(Arc::clone(browser));
    let window = browser.current_window().await.expect("window present");
    let tree = section_manager::create_default_sections();
    let links = collect_favorite_links(&tree[0]);
    engine
        .sync_urls_to_group(window.id, FAVORITES_GROUP_TITLE, FAVORITES_GROUP_COLOR, &links)
        .await;
    let members = engine.group_tabs(window.id, FAVORITES_GROUP_TITLE).await;
    println!("  Opened {} favorites as grouped tabs", members.len());
    engine
        .reorder_group_tabs(window.id, FAVORITES_GROUP_TITLE, &links)
        .await;
    println!("  Reordered group members to match favorites order");
    println!("  ✓ Tab-group sync OK");
    println!();
}

async fn demo_router(browser: &Arc<MemoryBrowser>) {
    section("Message Router");

    let app = Mutex::new(App::new_in_memory().expect("Failed to init App"));
    let res = handle_message(&app, browser.as_ref(), "PING", &json!({}))
        .await
        .expect("ping failed");
    println!("  PING -> {}", res);
    let tab = browser
        .create_tab(None, Some("https://docs.example/"), true, false)
        .await
        .expect("tab created");
    let res = handle_message(
        &app,
        browser.as_ref(),
        "SEARCH_ALL",
        &json!({"query": "docs"}),
    )
    .await
    .expect("search failed");
    println!(
        "  SEARCH_ALL found {} result(s) for 'docs' (tab {})",
        res.as_array().map(|a| a.len()).unwrap_or(0),
        tab.id
    );
    println!("  ✓ Message router OK");
    println!();
}
