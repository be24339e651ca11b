use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

use chartmap_map::{MappingRegistry, RegistryError};
use chartmap_model::{ChartId, DataType, Mapping, MappingItem, MappingStatus};

fn chart(id: &str) -> ChartId {
    ChartId::new(id).expect("chart id")
}

fn draft(id: &str) -> Mapping {
    Mapping::new(chart(id), "v1", "v1").with_item(MappingItem::new(
        "${chart_title}",
        DataType::String,
        "chart_meta",
        "title",
    ))
}

#[test]
fn save_draft_round_trips() {
    let registry = MappingRegistry::default();
    let original = draft("basic_bar_chart");
    let saved = registry.save_draft("alice", original.clone()).expect("save");

    assert_eq!(saved.mapping_version.as_deref(), Some("v1"));
    assert_eq!(saved.status, MappingStatus::Draft);
    assert_eq!(saved.updated_by.as_deref(), Some("alice"));
    assert!(saved.updated_at.is_some());

    let loaded = registry
        .get_by_version(&chart("basic_bar_chart"), "v1")
        .expect("load");
    assert_eq!(loaded.items, original.items);
    assert_eq!(loaded.template_version, original.template_version);
    assert_eq!(loaded.spec_version, original.spec_version);
}

#[test]
fn drafts_never_touch_chart_registry() {
    let registry = MappingRegistry::default();
    registry.save_draft("alice", draft("pie_chart")).expect("save");
    assert!(registry.charts().get(&chart("pie_chart")).expect("get").is_none());
    assert!(registry.get_active(&chart("pie_chart")).expect("active").is_none());
}

#[test]
fn activation_deprecates_previous_version() {
    let registry = MappingRegistry::default();
    let id = chart("basic_line_chart");
    registry.save_draft("alice", draft("basic_line_chart")).expect("v1");
    registry.save_draft("bob", draft("basic_line_chart")).expect("v2");

    registry.activate(&id, "v1").expect("activate v1");
    let entry = registry.activate(&id, "v2").expect("activate v2");
    assert_eq!(entry.active_mapping_version, "v2");
    assert_eq!(entry.active_template_version, "v1");

    let statuses: Vec<MappingStatus> = registry
        .list_versions(&id)
        .expect("list")
        .iter()
        .map(|m| m.status)
        .collect();
    assert_eq!(statuses, vec![MappingStatus::Deprecated, MappingStatus::Active]);
    assert_eq!(
        registry.charts().get(&id).expect("get").map(|e| e.active_mapping_version),
        Some("v2".to_string())
    );
}

#[test]
fn failed_activation_leaves_state_untouched() {
    let registry = MappingRegistry::default();
    let id = chart("gauge_chart");
    registry.save_draft("alice", draft("gauge_chart")).expect("save");
    registry.activate(&id, "v1").expect("activate");
    let before = registry.snapshot(&id).expect("snapshot").expect("record");

    let err = registry.activate(&id, "v9").expect_err("unknown version");
    assert!(matches!(err, RegistryError::VersionNotFound { .. }));
    let err = registry
        .activate(&chart("unknown_chart"), "v1")
        .expect_err("unknown chart");
    assert!(matches!(err, RegistryError::ChartNotFound { .. }));

    let after = registry.snapshot(&id).expect("snapshot").expect("record");
    assert!(Arc::ptr_eq(&before, &after));
}

#[test]
fn unknown_chart_lists_no_versions() {
    let registry = MappingRegistry::default();
    assert!(registry.list_versions(&chart("nothing")).expect("list").is_empty());
    assert!(registry.charts().list().expect("list").is_empty());
}

#[test]
fn delete_removes_versions_and_entry() {
    let registry = MappingRegistry::default();
    let id = chart("basic_area_chart");
    registry.save_draft("alice", draft("basic_area_chart")).expect("v1");
    registry.save_draft("alice", draft("basic_area_chart")).expect("v2");
    registry.activate(&id, "v2").expect("activate");
    registry.save_draft("bob", draft("pie_chart")).expect("other chart");

    assert!(registry.delete(&id).expect("delete"));
    assert!(registry.list_versions(&id).expect("list").is_empty());
    assert!(registry.get_active(&id).expect("active").is_none());
    assert!(registry.charts().get(&id).expect("get").is_none());
    assert!(!registry.delete(&id).expect("second delete"));
    assert_eq!(registry.list_versions(&chart("pie_chart")).expect("list").len(), 1);

    // A fresh record numbers its drafts from the start again.
    let again = registry.save_draft("carol", draft("basic_area_chart")).expect("save");
    assert_eq!(again.mapping_version.as_deref(), Some("v1"));
}

#[test]
fn deletes_race_with_drafts_without_losing_writes() {
    let registry = Arc::new(MappingRegistry::default());
    let id = chart("basic_line_chart");
    let handles: Vec<_> = (0..8)
        .map(|n| {
            let registry = Arc::clone(&registry);
            let id = id.clone();
            thread::spawn(move || {
                for _ in 0..20 {
                    if n % 2 == 0 {
                        registry.delete(&id).expect("delete");
                    } else {
                        registry
                            .save_draft("writer", draft("basic_line_chart"))
                            .expect("save");
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("writer thread");
    }

    // Whatever survived is one consistent record with gapless versions.
    let versions: Vec<String> = registry
        .list_versions(&id)
        .expect("list")
        .iter()
        .filter_map(|m| m.mapping_version.clone())
        .collect();
    let expected: Vec<String> = (1..=versions.len()).map(|n| format!("v{n}")).collect();
    assert_eq!(versions, expected);
}

#[test]
fn concurrent_drafts_get_unique_versions() {
    let registry = Arc::new(MappingRegistry::default());
    let handles: Vec<_> = (0..8)
        .map(|n| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                (0..25)
                    .map(|_| {
                        registry
                            .save_draft(&format!("user{n}"), draft("stacked_line_chart"))
                            .expect("save")
                            .mapping_version
                            .clone()
                            .expect("version")
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut versions = BTreeSet::new();
    for handle in handles {
        for version in handle.join().expect("thread") {
            assert!(versions.insert(version), "duplicate version");
        }
    }
    assert_eq!(versions.len(), 200);
    let listed = registry
        .list_versions(&chart("stacked_line_chart"))
        .expect("list");
    let expected: Vec<String> = (1..=200).map(|n| format!("v{n}")).collect();
    let got: Vec<String> = listed
        .iter()
        .filter_map(|m| m.mapping_version.clone())
        .collect();
    assert_eq!(got, expected);
}

#[test]
fn readers_see_one_active_version_during_activations() {
    let registry = Arc::new(MappingRegistry::default());
    let id = chart("basic_bar_chart");
    for _ in 0..4 {
        registry.save_draft("alice", draft("basic_bar_chart")).expect("save");
    }
    registry.activate(&id, "v1").expect("activate");

    let writers: Vec<_> = (0..4)
        .map(|n| {
            let registry = Arc::clone(&registry);
            let id = id.clone();
            thread::spawn(move || {
                for round in 0..50 {
                    let version = format!("v{}", (n + round) % 4 + 1);
                    registry.activate(&id, &version).expect("activate");
                }
            })
        })
        .collect();

    let reader = {
        let registry = Arc::clone(&registry);
        let id = id.clone();
        thread::spawn(move || {
            for _ in 0..500 {
                let record = registry.snapshot(&id).expect("snapshot").expect("record");
                let active: Vec<_> = record
                    .versions
                    .iter()
                    .filter(|m| m.status == MappingStatus::Active)
                    .collect();
                assert_eq!(active.len(), 1);
                let entry = record.registry.as_ref().expect("entry");
                assert_eq!(
                    active[0].mapping_version.as_deref(),
                    Some(entry.active_mapping_version.as_str())
                );
            }
        })
    };

    for writer in writers {
        writer.join().expect("writer");
    }
    reader.join().expect("reader");
}

#[test]
fn different_charts_progress_independently() {
    let registry = Arc::new(MappingRegistry::default());
    let handles: Vec<_> = ["basic_bar_chart", "pie_chart", "radar_chart"]
        .into_iter()
        .map(|name| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                for _ in 0..10 {
                    registry.save_draft("alice", draft(name)).expect("save");
                }
                registry.activate(&chart(name), "v10").expect("activate");
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("thread");
    }

    let entries = registry.charts().list().expect("list");
    let ids: Vec<&str> = entries.iter().map(|e| e.chart_id.as_str()).collect();
    assert_eq!(ids, vec!["basic_bar_chart", "pie_chart", "radar_chart"]);
    assert!(entries.iter().all(|e| e.active_mapping_version == "v10"));
}
