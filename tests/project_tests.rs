mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use common::{demo_blobs, demo_urls, fixture_blob, test_services};
use ecad_viewer::project::{CacheKey, Snapshot};
use ecad_viewer::render::display_net_name;
use ecad_viewer::{LoadOutcome, LoadSources, Project, SnapshotCache, ViewerOptions};

#[test]
fn test_second_load_is_served_from_cache_without_fetching() {
    let options = ViewerOptions::default();
    let t = test_services(&options);
    let sources = demo_urls();

    let mut first = Project::new(t.services.clone());
    assert_eq!(first.load(&sources), LoadOutcome::Parsed { files: 5 });
    assert_eq!(t.fetcher.count(), 5);

    let mut second = Project::new(t.services.clone());
    assert_eq!(second.load(&sources), LoadOutcome::FromCache);
    assert_eq!(t.fetcher.count(), 5, "Cache-Treffer darf nichts laden");

    assert_eq!(first.bom_items(), second.bom_items());
    assert_eq!(
        first.pages().collect::<Vec<_>>(),
        second.pages().collect::<Vec<_>>()
    );
    assert_eq!(
        first.files_by_name().keys().collect::<Vec<_>>(),
        second.files_by_name().keys().collect::<Vec<_>>()
    );
    // kein Re-Parse: dieselben Dokument-Instanzen
    assert!(Arc::ptr_eq(&first.boards()[0], &second.boards()[0]));
}

#[test]
fn test_loaded_project_has_hierarchy_bom_and_indices() {
    let options = ViewerOptions::default();
    let t = test_services(&options);
    let mut project = Project::new(t.services);
    project.load(&demo_blobs());

    assert!(project.is_loaded());
    assert_eq!(project.display_name(), Some("demo"));
    assert_eq!(project.boards().len(), 1);
    assert_eq!(project.schematics().len(), 3);
    assert_eq!(
        project.root_page().map(|p| p.filename.as_str()),
        Some("demo.kicad_sch")
    );

    let pages: Vec<&str> = project
        .pages()
        .filter_map(|p| p.page.as_deref())
        .collect();
    assert_eq!(pages, vec!["1", "2", "10"]);

    let caps = project
        .bom_items()
        .iter()
        .find(|b| b.value == "100n")
        .expect("Kondensatorzeile");
    assert_eq!(caps.designators, vec!["C1", "C2"]);
    assert_eq!(project.bom_items().len(), 3);

    assert!(project.find_designator("U1").is_some());
    assert!(!project.net_refs_by_label("/mcu/SDA").is_empty());
}

#[test]
fn test_unknown_and_broken_files_do_not_abort_load() {
    let options = ViewerOptions::default();
    let t = test_services(&options);
    let mut project = Project::new(t.services);

    let sources = LoadSources::from_blobs(vec![
        fixture_blob("demo.kicad_pcb"),
        ecad_viewer::SourceBlob::new("notes.txt", "kein KiCad"),
        ecad_viewer::SourceBlob::new("broken.kicad_sch", "(kicad_sch (version"),
    ]);
    assert_eq!(project.load(&sources), LoadOutcome::Parsed { files: 1 });
    assert_eq!(project.files_by_name().len(), 1);
    assert!(project.bom_items().iter().any(|b| b.value == "4k7"));
}

#[test]
fn test_cache_key_changes_with_content_and_filename() {
    let prefix = ViewerOptions::default().cache_key_hash_prefix_bytes;
    let blob = fixture_blob("demo.kicad_pcb");
    let base = CacheKey::from_sources(&LoadSources::from_blobs(vec![blob.clone()]), prefix);

    let mut changed = blob.clone();
    changed.content = changed.content.replacen("4k7", "4k8", 1);
    let by_content = CacheKey::from_sources(&LoadSources::from_blobs(vec![changed]), prefix);
    assert_ne!(base, by_content);

    let mut renamed = blob;
    renamed.filename = "other.kicad_pcb".into();
    let by_name = CacheKey::from_sources(&LoadSources::from_blobs(vec![renamed]), prefix);
    assert_ne!(base, by_name);
}

#[test]
fn test_lru_and_ttl_eviction() {
    let ttl = Duration::from_secs(600);
    let mut cache: SnapshotCache<u32> = SnapshotCache::new(ttl, 3);
    let start = Instant::now();
    let keys: Vec<CacheKey> = (0..4)
        .map(|i| CacheKey::from_sources(&LoadSources::from_urls([format!("f{i}.kicad_pcb")]), 64))
        .collect();

    for (i, key) in keys.iter().enumerate() {
        let now = start + Duration::from_secs(i as u64);
        cache.put(key.clone(), Snapshot::new(i as u32, now));
    }
    let now = start + Duration::from_secs(5);
    assert!(cache.get(&keys[0], now).is_none(), "ältester Eintrag verdrängt");
    assert_eq!(cache.get(&keys[3], now).as_deref(), Some(&3));

    let later = now + ttl + Duration::from_secs(1);
    for key in &keys {
        assert!(cache.get(key, later).is_none());
    }
    assert!(cache.is_empty());
}

#[test]
fn test_project_cache_entries_expire_with_manual_clock() {
    let options = ViewerOptions::default();
    let t = test_services(&options);
    let sources = demo_urls();

    Project::new(t.services.clone()).load(&sources);
    t.clock
        .advance(options.snapshot_ttl() + Duration::from_secs(1));
    let mut again = Project::new(t.services.clone());
    assert_eq!(again.load(&sources), LoadOutcome::Parsed { files: 5 });
    assert_eq!(t.fetcher.count(), 10);
}

#[test]
fn test_disposed_project_discards_late_result() {
    let options = ViewerOptions::default();
    let t = test_services(&options);
    let mut project = Project::new(t.services);

    let prepared = project.prepare(&demo_blobs());
    project.dispose();
    assert_eq!(project.commit(prepared), LoadOutcome::Discarded);
    assert!(!project.is_loaded());
    assert!(project.files_by_name().is_empty());
}

#[test]
fn test_net_name_truncation() {
    assert_eq!(display_net_name("/aaa/bbb"), "bbb");
    assert_eq!(display_net_name("GND"), "GND");
    assert_eq!(display_net_name("unconnected-(U1-Pad3)"), "x");
}

#[test]
fn test_reload_with_other_sources_replaces_previous_files() {
    let options = ViewerOptions::default();
    let t = test_services(&options);
    let board_only = LoadSources::from_blobs(vec![fixture_blob("demo.kicad_pcb")]);
    let sheet_only = LoadSources::from_blobs(vec![fixture_blob("power.kicad_sch")]);

    let mut project = Project::new(t.services.clone());
    project.load(&board_only);
    assert_eq!(project.load(&sheet_only), LoadOutcome::Parsed { files: 1 });
    assert_eq!(
        project.files_by_name().keys().collect::<Vec<_>>(),
        vec!["power.kicad_sch"]
    );
    assert!(project.boards().is_empty());
    assert!(project.find_designator("R1").is_none());
}

#[test]
fn test_cache_entry_holds_only_files_of_its_own_sources() {
    let options = ViewerOptions::default();
    let t = test_services(&options);
    let board_only = LoadSources::from_blobs(vec![fixture_blob("demo.kicad_pcb")]);
    let sheet_only = LoadSources::from_blobs(vec![fixture_blob("power.kicad_sch")]);

    let mut first = Project::new(t.services.clone());
    first.load(&board_only);
    first.load(&sheet_only);

    let mut fresh = Project::new(t.services.clone());
    assert_eq!(fresh.load(&sheet_only), LoadOutcome::FromCache);
    assert_eq!(
        fresh.files_by_name().keys().collect::<Vec<_>>(),
        vec!["power.kicad_sch"]
    );
    assert_eq!(fresh.boards().len(), 0);

    let mut other = Project::new(t.services.clone());
    assert_eq!(other.load(&board_only), LoadOutcome::FromCache);
    assert_eq!(
        other.files_by_name().keys().collect::<Vec<_>>(),
        vec!["demo.kicad_pcb"]
    );
    assert!(other.schematics().is_empty());
}

#[test]
fn test_duplicate_filenames_in_one_source_list_are_parsed_once() {
    let options = ViewerOptions::default();
    let t = test_services(&options);
    let mut project = Project::new(t.services);
    let sources = LoadSources::from_blobs(vec![
        fixture_blob("demo.kicad_pcb"),
        fixture_blob("demo.kicad_pcb"),
    ]);
    assert_eq!(project.load(&sources), LoadOutcome::Parsed { files: 1 });
    assert_eq!(project.boards().len(), 1);
}
