use iconscan::{DHash, IconScanError, TableLoader, TableSource};
use std::fs;
use std::sync::Arc;

const TABLE_A: &str = r#"{"abra": "00000000000000ff", "kadabra": "ff00000000000000"}"#;
const TABLE_B: &str = r#"{"zubat": "0f0f0f0f0f0f0f0f"}"#;

#[test]
fn falls_back_past_missing_and_malformed_sources() {
    let dir = tempfile::tempdir().unwrap();
    let broken = dir.path().join("broken.json");
    let good = dir.path().join("good.json");
    fs::write(&broken, "{ not json").unwrap();
    fs::write(&good, TABLE_A).unwrap();

    let loader = TableLoader::new(vec![
        TableSource::File(dir.path().join("missing.json")),
        TableSource::File(broken),
        TableSource::File(good),
    ]);
    assert!(!loader.is_loaded());

    let table = loader.ensure_loaded().unwrap();
    assert!(loader.is_loaded());
    assert_eq!(table.len(), 2);
    assert_eq!(table.get("kadabra"), Some(DHash(0xff00_0000_0000_0000)));
}

#[test]
fn reports_every_failed_source() {
    let dir = tempfile::tempdir().unwrap();
    let empty = dir.path().join("empty.json");
    fs::write(&empty, "{}").unwrap();

    let loader = TableLoader::new(vec![
        TableSource::File(dir.path().join("missing.json")),
        TableSource::File(empty),
    ]);
    match loader.ensure_loaded() {
        Err(IconScanError::TableUnavailable { attempts }) => {
            assert_eq!(attempts.len(), 2);
            assert!(attempts[0].contains("missing.json"));
            assert!(attempts[1].contains("empty.json"));
        }
        other => panic!("expected TableUnavailable, got {other:?}"),
    }
    assert!(!loader.is_loaded());

    let err = TableLoader::new(Vec::new()).ensure_loaded().unwrap_err();
    assert!(matches!(err, IconScanError::TableUnavailable { .. }));
}

#[test]
fn caches_until_reset() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("icon-hashes.json");
    fs::write(&path, TABLE_A).unwrap();

    let loader = TableLoader::with_default_sources(dir.path());
    let first = loader.ensure_loaded().unwrap();

    fs::write(&path, TABLE_B).unwrap();
    let second = loader.ensure_loaded().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert!(second.get("abra").is_some());

    loader.reset();
    assert!(!loader.is_loaded());
    let third = loader.ensure_loaded().unwrap();
    assert_eq!(third.keys(), ["zubat"]);
}

#[test]
fn cached_table_survives_source_removal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("table.json");
    fs::write(&path, TABLE_A).unwrap();

    let loader = TableLoader::new(vec![TableSource::File(path.clone())]);
    loader.ensure_loaded().unwrap();
    fs::remove_file(&path).unwrap();
    assert_eq!(loader.ensure_loaded().unwrap().len(), 2);
}

#[test]
fn concurrent_first_loads_share_one_table() {
    let loader = TableLoader::new(vec![TableSource::Inline(TABLE_A.to_string())]);

    let tables: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| loader.ensure_loaded().unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    for table in &tables[1..] {
        assert!(Arc::ptr_eq(&tables[0], table));
    }
}

#[test]
fn default_sources_follow_conventional_order() {
    let loader = TableLoader::with_default_sources("/srv/app");
    let labels: Vec<String> = loader.sources().iter().map(ToString::to_string).collect();
    assert_eq!(
        labels,
        [
            "/srv/app/icon-hashes.json",
            "/icon-hashes.json",
            "/srv/app/public/icon-hashes.json"
        ]
    );
}
