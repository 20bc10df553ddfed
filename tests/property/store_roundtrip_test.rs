//! Property-based tests for persistence: any well-formed section tree
//! survives a save/load round-trip through the key-value store unchanged.

use std::sync::Arc;

use archy::database::Database;
use archy::store::SectionStore;
use archy::types::bookmark::{Bookmark, Folder, FolderItem};
use archy::types::section::{ArchivedTab, Section, SectionItem, SectionKind};
use archy::types::tab::{PinnedTabRecord, Tab};
use proptest::prelude::*;

fn bookmark(slug: &str) -> Bookmark {
    Bookmark {
        id: format!("bm-{}", slug),
        title: slug.to_string(),
        url: format!("https://{}.example/", slug),
        favicon: Some(format!("https://{}.example/favicon.ico", slug)),
    }
}

/// A well-formed tree: favorites (with a folder), exactly one today
/// holding tabs, an archive with one record, and an optional workspace.
fn build_tree(slugs: &[String], collapsed: bool, with_workspace: bool) -> Vec<Section> {
    let half = slugs.len() / 2;
    let (top, nested) = slugs.split_at(half);

    let folder = Folder {
        id: "folder".to_string(),
        name: "Folder".to_string(),
        collapsed,
        items: nested
            .iter()
            .map(|s| FolderItem::Bookmark(bookmark(s)))
            .collect(),
    };
    let mut favorites = Section::new("favorites", "Favorites", SectionKind::Favorites);
    favorites.items = top
        .iter()
        .map(|s| SectionItem::Bookmark(bookmark(s)))
        .chain(std::iter::once(SectionItem::Folder(folder)))
        .collect();

    let mut today = Section::new("today", "Today", SectionKind::Today);
    today.items = slugs
        .iter()
        .enumerate()
        .map(|(i, s)| {
            SectionItem::Tab(Tab {
                id: i as i64 + 1,
                url: format!("https://{}.example/", s),
                title: s.clone(),
                favicon: None,
                active: i == 0,
                pinned: i % 2 == 0,
                window_id: 1,
                index: i as u32,
                group_id: if i % 3 == 0 { Some(7) } else { None },
            })
        })
        .collect();

    let mut archive = Section::new("archive", "Archive Tabs", SectionKind::Archive);
    archive.collapsed = true;
    archive.items = vec![SectionItem::Archived(ArchivedTab {
        id: 99,
        url: "https://archived.example/".to_string(),
        title: "Archived".to_string(),
        favicon: None,
        archived_at: 1_700_000_000_000,
    })];

    let mut sections = vec![favorites, today, archive];
    if with_workspace {
        let mut workspace = Section::new("workspace-x", "Research", SectionKind::Workspace);
        workspace.items = vec![SectionItem::Bookmark(bookmark("workspace-only"))];
        sections.push(workspace);
    }
    sections
}

fn arb_slugs() -> impl Strategy<Value = Vec<String>> {
    prop::collection::hash_set("[a-z]{4,8}", 2..10)
        .prop_map(|set| set.into_iter().collect())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    // save -> load is the identity on well-formed trees.
    #[test]
    fn sections_roundtrip(
        slugs in arb_slugs(),
        collapsed in any::<bool>(),
        with_workspace in any::<bool>(),
    ) {
        let db = Arc::new(Database::open_in_memory().expect("in-memory db"));
        let store = SectionStore::new(db);
        let tree = build_tree(&slugs, collapsed, with_workspace);

        store.save_sections(&tree).expect("save");
        let loaded = store.load_sections().expect("load");
        prop_assert_eq!(loaded, tree);
    }

    // Saving twice overwrites: the last tree wins.
    #[test]
    fn last_save_wins(slugs in arb_slugs()) {
        let db = Arc::new(Database::open_in_memory().expect("in-memory db"));
        let store = SectionStore::new(db);

        let first = build_tree(&slugs, false, false);
        let second = build_tree(&slugs, true, true);
        store.save_sections(&first).expect("save first");
        store.save_sections(&second).expect("save second");

        let loaded = store.load_sections().expect("load");
        prop_assert_eq!(loaded, second);
    }

    // Pinned-tab records round-trip as well.
    #[test]
    fn pinned_records_roundtrip(slugs in arb_slugs()) {
        let db = Arc::new(Database::open_in_memory().expect("in-memory db"));
        let store = SectionStore::new(db);

        let records: Vec<PinnedTabRecord> = slugs
            .iter()
            .enumerate()
            .map(|(i, s)| PinnedTabRecord {
                id: i as i64 + 1,
                url: format!("https://{}.example/", s),
                title: s.clone(),
                favicon: None,
            })
            .collect();

        store.save_pinned_tabs(&records).expect("save");
        let loaded = store.load_pinned_tabs().expect("load");
        prop_assert_eq!(loaded, records);
    }
}
