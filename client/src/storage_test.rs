use super::*;

fn temp_state_file(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("labtrack-storage-{}-{name}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir.join("nested").join("state.json")
}

#[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
struct Draft {
    barcode: String,
    volume_ml: Option<f64>,
}

// =============================================================
// MemoryStore
// =============================================================

#[test]
fn memory_store_save_load_remove() {
    let store = MemoryStore::new();
    assert_eq!(store.load("accessToken").unwrap(), None);

    store.save("accessToken", "A1").unwrap();
    store.save("accessToken", "A2").unwrap();
    assert_eq!(store.load("accessToken").unwrap().as_deref(), Some("A2"));

    store.remove("accessToken").unwrap();
    store.remove("accessToken").unwrap();
    assert_eq!(store.load("accessToken").unwrap(), None);
}

#[test]
fn json_helpers_use_the_port() {
    let store = MemoryStore::new();
    let draft = Draft { barcode: "SAMP-2026-001234".into(), volume_ml: Some(4.5) };

    save_json(&store, "draft", &draft).unwrap();
    let loaded: Option<Draft> = load_json(&store, "draft").unwrap();
    assert_eq!(loaded, Some(draft));

    let missing: Option<Draft> = load_json(&store, "other").unwrap();
    assert!(missing.is_none());
}

#[test]
fn load_json_reports_corrupt_values() {
    let store = MemoryStore::new();
    store.save("draft", "{not json").unwrap();

    let err = load_json::<Draft>(&store, "draft").unwrap_err();
    assert!(matches!(err, StorageError::Corrupt(_)));
}

// =============================================================
// FileStore
// =============================================================

#[test]
fn file_store_missing_file_reads_empty() {
    let store = FileStore::new(temp_state_file("missing"));
    assert_eq!(store.load("refreshToken").unwrap(), None);
}

#[test]
fn file_store_persists_across_instances() {
    let path = temp_state_file("persist");
    let first = FileStore::new(&path);
    first.save("accessToken", "A1").unwrap();
    first.save("refreshToken", "R1").unwrap();

    let second = FileStore::new(&path);
    assert_eq!(second.load("accessToken").unwrap().as_deref(), Some("A1"));
    assert_eq!(second.load("refreshToken").unwrap().as_deref(), Some("R1"));

    second.remove("accessToken").unwrap();
    assert_eq!(first.load("accessToken").unwrap(), None);
    assert_eq!(first.load("refreshToken").unwrap().as_deref(), Some("R1"));
}

#[test]
fn file_store_rejects_corrupt_file() {
    let path = temp_state_file("corrupt");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "[1, 2").unwrap();

    let store = FileStore::new(&path);
    let error = store.load("accessToken").unwrap_err();
    assert!(matches!(error, StorageError::Corrupt(_)));
    assert_eq!(error.error_code(), "E_STORAGE_CORRUPT");
}
