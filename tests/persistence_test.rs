mod common;

use std::sync::Arc;
use common::CORPUS;
use kvsearch::storage::wal::SyncMode;
use kvsearch::{Config, Engine, ErrorKind, IndexStats, Query, WhitespaceTokenizer};

fn config(path: &std::path::Path) -> Config {
    Config {
        sync_mode: SyncMode::Immediate,
        ..Config::with_storage_path(path)
    }
}

fn open(config: Config) -> Engine {
    Engine::open(config, Arc::new(WhitespaceTokenizer)).unwrap()
}

#[test]
fn index_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let expected = {
        let engine = open(config(dir.path()));
        engine.add_documents("en", CORPUS).unwrap();
        engine.delete_documents("en", ["4"]).unwrap();
        let results = engine.search(&Query::new("en").must(["c", "d"])).unwrap();
        engine.close().unwrap();
        results
    };

    let engine = open(config(dir.path()));
    assert_eq!(engine.index_stats("en").unwrap(), IndexStats { document_count: 4, total_term_count: 20 });
    let results = engine.search(&Query::new("en").must(["c", "d"])).unwrap();
    assert_eq!(results.hits, expected.hits);
    assert_eq!(engine.suggest("en", "a").unwrap(), vec!["a"]);
}

#[test]
fn checkpointed_store_reopens_with_later_writes() {
    let dir = tempfile::tempdir().unwrap();
    let small_wal = Config {
        compaction_threshold_bytes: 512,
        ..config(dir.path())
    };
    {
        let engine = open(small_wal.clone());
        for (id, text) in CORPUS {
            engine.add_documents("en", [(id, text)]).unwrap();
        }
        engine.add_documents("en", [("5", "fresh words")]).unwrap();
    }
    assert!(dir.path().join("db").join("meta").join("snapshot.bin").exists());

    let engine = open(small_wal);
    assert_eq!(engine.index_stats("en").unwrap().document_count, 6);
    assert_eq!(engine.search(&Query::new("en").matching("fresh")).unwrap().ids(), vec!["5"]);
}

#[test]
fn second_engine_on_same_directory_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let _engine = open(config(dir.path()));
    let err = Engine::open(config(dir.path()), Arc::new(WhitespaceTokenizer)).err().unwrap();
    assert_eq!(err.kind, ErrorKind::Storage);
}

#[test]
fn wipe_deletes_the_store_directory() {
    let dir = tempfile::tempdir().unwrap();
    let engine = open(config(dir.path()));
    engine.add_documents("en", CORPUS).unwrap();
    assert!(dir.path().join("db").exists());

    engine.wipe().unwrap();
    assert!(!dir.path().join("db").exists());

    let engine = open(config(dir.path()));
    assert_eq!(engine.index_stats("en").unwrap(), IndexStats::default());
}

#[test]
fn config_file_drives_engine_parameters() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.json");
    let json = format!(
        r#"{{ "storage_path": {:?}, "default_page_size": 2, "sync_mode": "None" }}"#,
        dir.path().join("store")
    );
    std::fs::write(&config_path, json).unwrap();

    let engine = open(Config::from_json_file(&config_path).unwrap());
    engine.add_documents("en", CORPUS).unwrap();
    let results = engine.search(&Query::new("en").matching("d")).unwrap();
    assert_eq!(results.hits.len(), 2);
    assert_eq!(results.total_hits, 4);
}
