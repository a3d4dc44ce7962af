use chrono::TimeZone;
use chrono::Utc;
use devdeck_registry::Registry;
use devdeck_registry::factory::Backend;
use devdeck_registry::factory::open_state_store;
use devdeck_registry::store::PersistedState;
use devdeck_registry::types::*;
use pretty_assertions::assert_eq;
use std::path::PathBuf;

fn backends() -> Vec<Backend> {
    #[cfg(feature = "sqlite")]
    {
        vec![Backend::Json, Backend::Sqlite]
    }
    #[cfg(not(feature = "sqlite"))]
    {
        vec![Backend::Json]
    }
}

fn sample_local(path: &str) -> Project {
    Project::Local(LocalProject {
        id: ProjectId::new(),
        name: "tool".to_string(),
        path: PathBuf::from(path),
        summary: format!("Project located at {path}"),
        readme: None,
        tags: vec!["clap".to_string()],
        is_favorite: false,
        last_updated: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        git_url: Some("git@github.com:me/tool.git".to_string()),
        screenshots: vec![],
    })
}

#[test]
fn state_round_trip_and_export_import() {
    for be in backends() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_state_store(dir.path(), Some(be)).unwrap();

        // empty store
        assert!(store.load().unwrap().is_none());

        let mut registry = Registry::new();
        let id = registry.add_or_update(sample_local("/src/tool")).id();
        registry.toggle_favorite(id).unwrap();

        let mut state = PersistedState::default();
        state.projects = registry.projects().to_vec();
        assert!(state.add_scan_location(&PathBuf::from("/src")));
        assert!(!state.add_scan_location(&PathBuf::from("/src")));
        state.auto_scan_on_startup = true;
        store.save(&state).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded, state);

        // overwrite keeps a single blob
        state.auto_scan_on_startup = false;
        store.save(&state).unwrap();
        assert!(!store.load().unwrap().unwrap().auto_scan_on_startup);

        // export then import into a fresh store
        let mut buf = Vec::new();
        store.export(&mut buf).unwrap();
        let dir2 = tempfile::tempdir().unwrap();
        let store2 = open_state_store(dir2.path(), Some(be)).unwrap();
        assert_eq!(store2.import(&mut buf.as_slice()).unwrap(), 1);
        let imported = store2.load().unwrap().unwrap();
        assert_eq!(imported.projects[0].id(), id);
        assert!(imported.projects[0].is_favorite());
    }
}

#[test]
fn json_store_reads_legacy_blob() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(
        &path,
        r#"{"state":{"projects":[],"scanLocations":["/home/me/src"],"autoScanOnStartup":true},"version":0}"#,
    )
    .unwrap();

    let store = open_state_store(dir.path(), Some(Backend::Json)).unwrap();
    let state = store.load().unwrap().unwrap();
    assert_eq!(state.scan_locations, vec![PathBuf::from("/home/me/src")]);
    assert!(state.auto_scan_on_startup);
}

#[test]
fn remove_scan_location_reports_change() {
    let mut state = PersistedState::default();
    state.add_scan_location(&PathBuf::from("/a"));
    assert!(state.remove_scan_location(&PathBuf::from("/a")));
    assert!(!state.remove_scan_location(&PathBuf::from("/a")));
}
