//! Unit tests for the Section Tree Model: bookmark/folder operations,
//! archiving, reordering, cross-section moves, and drag-move planning.

use archy::managers::drag_manager::DragItem;
use archy::managers::section_manager::*;
use archy::types::bookmark::{Bookmark, Folder, FolderItem};
use archy::types::section::{Section, SectionItem, SectionKind};
use archy::types::tab::Tab;

fn bookmark(id: &str, url: &str) -> Bookmark {
    Bookmark {
        id: id.to_string(),
        title: id.to_string(),
        url: url.to_string(),
        favicon: None,
    }
}

fn tab(id: i64, url: &str, pinned: bool) -> Tab {
    Tab {
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

/// Favorites with two top-level bookmarks plus a folder holding one
/// bookmark and a nested folder with another.
fn fixture() -> Vec<Section> {
    let deep = Folder {
        id: "deep".to_string(),
        name: "Deep".to_string(),
        collapsed: false,
        items: vec![FolderItem::Bookmark(bookmark("d1", "https://d1.example/"))],
    };
    let work = Folder {
        id: "work".to_string(),
        name: "Work".to_string(),
        collapsed: false,
        items: vec![
            FolderItem::Bookmark(bookmark("w1", "https://w1.example/")),
            FolderItem::Folder(deep),
        ],
    };
    let mut favorites = Section::new("favorites", "Favorites", SectionKind::Favorites);
    favorites.items = vec![
        SectionItem::Bookmark(bookmark("a", "https://a.example/")),
        SectionItem::Bookmark(bookmark("b", "https://b.example/")),
        SectionItem::Folder(work),
    ];
    let mut today = Section::new("today", "Today", SectionKind::Today);
    today.items = vec![
        SectionItem::Tab(tab(1, "https://one.example/", true)),
        SectionItem::Tab(tab(2, "https://two.example/", false)),
        SectionItem::Tab(tab(3, "https://three.example/", false)),
    ];
    let archive = Section::new("archive", "Archive Tabs", SectionKind::Archive);
    vec![favorites, today, archive]
}

fn favorites(sections: &[Section]) -> &Section {
    sections
        .iter()
        .find(|s| s.kind == SectionKind::Favorites)
        .expect("favorites present")
}

// ─── Defaults ───

#[test]
fn test_default_sections_shape() {
    let sections = create_default_sections();
    assert_eq!(sections.len(), 3);
    assert_eq!(sections[0].kind, SectionKind::Favorites);
    assert!(!sections[0].items.is_empty());
    assert_eq!(sections[1].kind, SectionKind::Today);
    assert!(sections[1].items.is_empty());
    assert_eq!(sections[2].kind, SectionKind::Archive);
    assert!(sections[2].collapsed);
}

#[test]
fn test_workspace_sections_get_unique_ids() {
    let a = create_workspace_section("Research");
    let b = create_workspace_section("Research");
    assert_eq!(a.kind, SectionKind::Workspace);
    assert_ne!(a.id, b.id);
}

// ─── Bookmark add/remove ───

#[test]
fn test_add_bookmark_appends_to_favorites() {
    let tree = fixture();
    let updated = add_bookmark_to_favorites(&tree, bookmark("c", "https://c.example/"));
    let favorites = favorites(&updated);
    assert_eq!(favorites.items.len(), 4);
    assert_eq!(favorites.items[3].url(), Some("https://c.example/"));
}

#[test]
fn test_add_duplicate_url_is_noop_even_with_new_id() {
    let tree = fixture();
    let updated = add_bookmark_to_favorites(&tree, bookmark("fresh-id", "https://a.example/"));
    assert_eq!(updated, tree);
}

#[test]
fn test_remove_bookmark_from_top_level() {
    let tree = fixture();
    let updated = remove_bookmark_from_favorites(&tree, "a");
    let favorites = favorites(&updated);
    assert_eq!(favorites.items.len(), 2);
    assert!(favorites.items.iter().all(|i| i.url() != Some("https://a.example/")));
}

#[test]
fn test_remove_bookmark_does_not_recurse_into_folders() {
    let tree = fixture();
    let updated = remove_bookmark_from_favorites(&tree, "w1");
    // w1 lives inside the Work folder, so nothing changes
    assert_eq!(updated, tree);
}

// ─── Folders ───

#[test]
fn test_toggle_nested_folder_preserves_everything_else() {
    let tree = fixture();
    let updated = toggle_folder_collapse(&tree, "deep");

    // Only the Deep folder's collapsed flag changed
    let reverted = toggle_folder_collapse(&updated, "deep");
    assert_eq!(reverted, tree);

    let favorites = favorites(&updated);
    let SectionItem::Folder(work) = &favorites.items[2] else {
        panic!("work folder missing");
    };
    let FolderItem::Folder(deep) = &work.items[1] else {
        panic!("deep folder missing");
    };
    assert!(deep.collapsed);
    // Sibling bookmark inside Work untouched
    assert_eq!(work.items[0], FolderItem::Bookmark(bookmark("w1", "https://w1.example/")));
}

#[test]
fn test_rename_nested_folder() {
    let tree = fixture();
    let updated = rename_folder(&tree, "deep", "Deeper");
    let favorites = favorites(&updated);
    let SectionItem::Folder(work) = &favorites.items[2] else {
        panic!("work folder missing");
    };
    let FolderItem::Folder(deep) = &work.items[1] else {
        panic!("deep folder missing");
    };
    assert_eq!(deep.name, "Deeper");
    assert_eq!(rename_folder(&updated, "deep", "Deep"), tree);
}

#[test]
fn test_remove_folder_deletes_subtree() {
    let tree = fixture();
    assert_eq!(count_all_bookmarks(&tree), 4);
    let updated = remove_folder(&tree, "work");
    // w1 and d1 went away with the folder
    assert_eq!(count_all_bookmarks(&updated), 2);
    let favorites = favorites(&updated);
    assert_eq!(favorites.items.len(), 2);
}

#[test]
fn test_remove_unknown_folder_is_noop() {
    let tree = fixture();
    assert_eq!(remove_folder(&tree, "ghost"), tree);
}

#[test]
fn test_add_subfolder_nests_under_parent() {
    let tree = fixture();
    let sub = Folder::new("Sub");
    let sub_id = sub.id.clone();
    let updated = add_subfolder(&tree, "deep", sub);
    let after = toggle_folder_collapse(&updated, &sub_id);
    // The new subfolder is reachable by id, so the toggle changed the tree
    assert_ne!(after, updated);
}

#[test]
fn test_add_bookmark_to_folder_rejects_duplicate_url() {
    let tree = fixture();
    let updated = add_bookmark_to_folder(&tree, "work", bookmark("w1-copy", "https://w1.example/"));
    assert_eq!(updated, tree);

    let grown = add_bookmark_to_folder(&tree, "work", bookmark("w2", "https://w2.example/"));
    assert_eq!(count_all_bookmarks(&grown), 5);
}

#[test]
fn test_remove_bookmark_from_folder() {
    let tree = fixture();
    let updated = remove_bookmark_from_folder(&tree, "work", "w1");
    assert_eq!(count_all_bookmarks(&updated), 3);
}

// ─── Moving bookmarks ───

#[test]
fn test_move_top_level_bookmark_into_nested_folder() {
    let tree = fixture();
    let updated = move_bookmark_to_folder(&tree, "a", "deep");

    assert_eq!(count_all_bookmarks(&updated), count_all_bookmarks(&tree));
    let favorites = favorites(&updated);
    // Gone from the top level
    assert!(!favorites
        .items
        .iter()
        .any(|i| matches!(i, SectionItem::Bookmark(b) if b.id == "a")));
    // Present inside Deep
    let SectionItem::Folder(work) = &favorites.items[1] else {
        panic!("work folder missing");
    };
    let FolderItem::Folder(deep) = &work.items[1] else {
        panic!("deep folder missing");
    };
    assert!(deep
        .items
        .iter()
        .any(|i| matches!(i, FolderItem::Bookmark(b) if b.id == "a")));
}

#[test]
fn test_move_nested_bookmark_to_other_folder() {
    let tree = fixture();
    let updated = move_bookmark_to_folder(&tree, "d1", "work");
    assert_eq!(count_all_bookmarks(&updated), 4);
    let favorites = favorites(&updated);
    let SectionItem::Folder(work) = &favorites.items[2] else {
        panic!("work folder missing");
    };
    assert!(work
        .items
        .iter()
        .any(|i| matches!(i, FolderItem::Bookmark(b) if b.id == "d1")));
}

#[test]
fn test_move_unknown_bookmark_is_silent_noop() {
    let tree = fixture();
    assert_eq!(move_bookmark_to_folder(&tree, "ghost", "work"), tree);
}

// ─── Archive ───

#[test]
fn test_archive_tab_prepends_record_and_leaves_today_alone() {
    let tree = fixture();
    let target = tab(7, "https://seven.example/", false);
    let updated = archive_tab(&tree, &target);

    let archive = updated
        .iter()
        .find(|s| s.kind == SectionKind::Archive)
        .unwrap();
    let SectionItem::Archived(record) = &archive.items[0] else {
        panic!("expected archived record first");
    };
    assert_eq!(record.url, "https://seven.example/");
    assert!(record.archived_at > 0);

    let today_before = tree.iter().find(|s| s.kind == SectionKind::Today).unwrap();
    let today_after = updated
        .iter()
        .find(|s| s.kind == SectionKind::Today)
        .unwrap();
    assert_eq!(today_after, today_before);
}

#[test]
fn test_archive_newest_first() {
    let tree = fixture();
    let first = archive_tab(&tree, &tab(7, "https://old.example/", false));
    let second = archive_tab(&first, &tab(8, "https://new.example/", false));
    let archive = second
        .iter()
        .find(|s| s.kind == SectionKind::Archive)
        .unwrap();
    assert_eq!(archive.items[0].url(), Some("https://new.example/"));
    assert_eq!(archive.items[1].url(), Some("https://old.example/"));
}

// ─── Section collapse / reorder ───

#[test]
fn test_toggle_section_collapse_matches_by_id_only() {
    let tree = fixture();
    let updated = toggle_section_collapse(&tree, "favorites");
    assert!(favorites(&updated).collapsed);
    // Unknown id leaves everything alone
    assert_eq!(toggle_section_collapse(&tree, "ghost"), tree);
}

#[test]
fn test_reorder_within_section_moving_down_adjusts_index() {
    let tree = fixture();
    // Move "a" (index 0) to insertion point 2: lands before the folder
    let updated = reorder_within_section(&tree, "favorites", 0, Some(2));
    let favorites = favorites(&updated);
    assert_eq!(favorites.items[0].url(), Some("https://b.example/"));
    assert_eq!(favorites.items[1].url(), Some("https://a.example/"));
}

#[test]
fn test_reorder_to_end_with_none_index() {
    let tree = fixture();
    let updated = reorder_within_section(&tree, "favorites", 0, None);
    let favorites = favorites(&updated);
    assert_eq!(favorites.items[2].url(), Some("https://a.example/"));
}

#[test]
fn test_reorder_out_of_bounds_source_is_noop() {
    let tree = fixture();
    assert_eq!(reorder_within_section(&tree, "favorites", 99, Some(0)), tree);
}

// ─── Cross-section moves ───

#[test]
fn test_tab_moved_to_favorites_becomes_bookmark() {
    let tree = fixture();
    let updated = move_item_between_sections(&tree, "today", 1, "favorites", None);

    let favorites = favorites(&updated);
    let last = favorites.items.last().unwrap();
    assert!(matches!(last, SectionItem::Bookmark(b) if b.url == "https://two.example/"));

    let today = updated.iter().find(|s| s.kind == SectionKind::Today).unwrap();
    assert_eq!(today.items.len(), 2);
}

#[test]
fn test_duplicate_url_move_to_favorites_is_rejected_without_loss() {
    let mut tree = fixture();
    // Today tab 2 shares its URL with favorites bookmark "a"
    tree[1].items[1] = SectionItem::Tab(tab(2, "https://a.example/", false));

    let updated = move_item_between_sections(&tree, "today", 1, "favorites", None);
    assert_eq!(updated, tree);
}

// ─── Drag-move planning ───

#[test]
fn test_plan_move_same_slot_is_none() {
    let tree = fixture();
    let drag = DragItem::new(tree[0].items[1].clone(), "favorites", 1);
    assert_eq!(plan_move(&tree, &drag, "favorites", Some(1)), MovePlan::None);
    assert_eq!(plan_move(&tree, &drag, "favorites", Some(2)), MovePlan::None);
}

#[test]
fn test_plan_move_today_tab_reorder_maps_to_browser_move() {
    let tree = fixture();
    // Unpinned tab at index 1, dropped at insertion point 3 (below tab 3)
    let drag = DragItem::new(tree[1].items[1].clone(), "today", 1);
    let plan = plan_move(&tree, &drag, "today", Some(3));
    assert_eq!(plan, MovePlan::MoveBrowserTab { tab_id: 2, to_index: 2 });
}

#[test]
fn test_plan_move_unpinned_above_divider_pins() {
    let tree = fixture();
    let drag = DragItem::new(tree[1].items[2].clone(), "today", 2);
    let plan = plan_move(&tree, &drag, "today", Some(0));
    assert_eq!(plan, MovePlan::PinBrowserTab { tab_id: 3 });
}

#[test]
fn test_plan_move_pinned_below_divider_unpins() {
    let tree = fixture();
    let drag = DragItem::new(tree[1].items[0].clone(), "today", 0);
    let plan = plan_move(&tree, &drag, "today", Some(2));
    assert_eq!(
        plan,
        MovePlan::UnpinBrowserTab {
            tab_id: 1,
            url: "https://one.example/".to_string()
        }
    );
}

#[test]
fn test_plan_move_placeholder_tab_is_ignored() {
    let mut tree = fixture();
    tree[1].items.insert(
        1,
        SectionItem::Tab(Tab {
            id: -12,
            pinned: true,
            ..tab(0, "https://stored.example/", true)
        }),
    );
    let drag = DragItem::new(tree[1].items[1].clone(), "today", 1);
    assert_eq!(plan_move(&tree, &drag, "today", Some(3)), MovePlan::None);
}

#[test]
fn test_plan_move_cross_section_is_tree_edit() {
    let tree = fixture();
    let drag = DragItem::new(tree[1].items[1].clone(), "today", 1);
    match plan_move(&tree, &drag, "favorites", Some(0)) {
        MovePlan::TreeEdit(edited) => {
            let favorites = &edited[0];
            assert!(matches!(
                &favorites.items[0],
                SectionItem::Bookmark(b) if b.url == "https://two.example/"
            ));
        }
        other => panic!("expected TreeEdit, got {:?}", other),
    }
}

// ─── Flattening ───

#[test]
fn test_collect_favorite_links_walks_folders_in_display_order() {
    let tree = fixture();
    let links = collect_favorite_links(favorites(&tree));
    let urls: Vec<&str> = links.iter().map(|l| l.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "https://a.example/",
            "https://b.example/",
            "https://w1.example/",
            "https://d1.example/",
        ]
    );
}

#[test]
fn test_collect_bookmarks_spans_all_sections() {
    let mut tree = fixture();
    let mut workspace = create_workspace_section("Side");
    workspace
        .items
        .push(SectionItem::Bookmark(bookmark("ws", "https://ws.example/")));
    tree.push(workspace);

    let all = collect_bookmarks(&tree);
    assert_eq!(all.len(), 5);
    assert!(all.iter().any(|b| b.id == "ws"));
}
