use buddy_core::model::{AggregateStats, ProblemId, ProblemRecord};
use serde_json::json;
use storage::codec::{ProblemMap, decode_api_key, decode_problems, decode_stats, encode};
use storage::repository::{Entries, KeyValueStore, StoreKey};
use storage::sqlite::SqliteStore;

async fn connect(name: &str) -> SqliteStore {
    let store = SqliteStore::connect(&format!("sqlite:file:{name}?mode=memory&cache=shared"))
        .await
        .expect("connect");
    store.migrate().await.expect("migrate");
    store
}

#[tokio::test]
async fn sqlite_roundtrips_typed_entries() {
    let store = connect("memdb_kv_roundtrip").await;
    let id: ProblemId = "https://leetcode.com/problems/two-sum/".parse().unwrap();
    let record = ProblemRecord {
        title: "1. Two Sum".into(),
        time_spent: 60,
        hints_used: 1,
        hints: vec![Some("Try sorting.".into())],
        ..ProblemRecord::default()
    };
    let stats = AggregateStats {
        total_problems: 1,
        total_time: 60,
        total_hints: 1,
        total_solutions: 0,
    };

    let mut entries = Entries::new();
    encode(&mut entries, StoreKey::Problems, &ProblemMap::from([(id.clone(), record.clone())])).unwrap();
    encode(&mut entries, StoreKey::Stats, &stats).unwrap();
    entries.insert(StoreKey::ApiKey, json!("secret"));
    store.set(entries).await.expect("set");

    let fetched = store.get(&StoreKey::ALL).await.expect("get");
    assert_eq!(decode_api_key(&fetched).unwrap().as_deref(), Some("secret"));
    assert_eq!(decode_stats(&fetched).unwrap(), stats);
    assert_eq!(decode_problems(&fetched).unwrap()[&id], record);
}

#[tokio::test]
async fn sqlite_set_overwrites_and_remove_deletes() {
    let store = connect("memdb_kv_overwrite").await;
    store
        .set(Entries::from([(StoreKey::Stats, json!({"totalProblems": 1}))]))
        .await
        .unwrap();
    store
        .set(Entries::from([(StoreKey::Stats, json!({"totalProblems": 2}))]))
        .await
        .unwrap();

    let fetched = store.get(&[StoreKey::Stats]).await.unwrap();
    assert_eq!(decode_stats(&fetched).unwrap().total_problems, 2);

    store.remove(&[StoreKey::Stats]).await.unwrap();
    assert!(store.get(&[StoreKey::Stats]).await.unwrap().is_empty());
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let store = connect("memdb_kv_migrate_twice").await;
    store.migrate().await.expect("second migrate");
}
