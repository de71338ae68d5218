//! Concurrent writers hammering one manifest file through real OS
//! threads, exercising `ManifestStore`'s exclusive-lock-guarded
//! read-modify-write under actual contention rather than single-threaded
//! sequencing.

use chrono::Utc;
use deskarena_orchestrator::ManifestStore;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

#[test]
fn concurrent_mark_started_never_loses_a_writer() {
    let dir = TempDir::new().unwrap();
    let path = Arc::new(dir.path().join("manifest.json"));

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let path = Arc::clone(&path);
            thread::spawn(move || {
                let store = ManifestStore::new(path.as_path());
                store.mark_started(&format!("exp-{i}"), Utc::now()).unwrap();
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let store = ManifestStore::new(path.as_path());
    let mut names = store.names().unwrap();
    names.sort();
    let expected: Vec<String> = (0..16).map(|i| format!("exp-{i}")).collect();
    assert_eq!(names, expected);
    for name in &names {
        assert!(store.is_unresolved(name).unwrap());
    }
}
