//! Failed commits: errors surface and the last committed state survives

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use twizzle::config::StoreConfig;
use twizzle::kv::{KvStore, MemoryKvStore};
use twizzle::metadata::Metadata;
use twizzle::runner::{from_fn, AlgorithmOutput, RunState, TestRunner};
use twizzle::store::Database;
use twizzle::{Error, Result};

/// Memory backend that accepts a fixed number of writes, then fails every `set`.
struct WriteBudgetKv {
    inner: MemoryKvStore,
    writes_left: Arc<AtomicUsize>,
}

impl WriteBudgetKv {
    fn open(writes: usize) -> (Database, Arc<AtomicUsize>) {
        let writes_left = Arc::new(AtomicUsize::new(writes));
        let kv = Self {
            inner: MemoryKvStore::new(),
            writes_left: Arc::clone(&writes_left),
        };
        let db = Database::with_kv(StoreConfig::in_memory(), Box::new(kv)).unwrap();
        (db, writes_left)
    }
}

impl KvStore for WriteBudgetKv {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        self.writes_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .map_err(|_| Error::Storage("disk full".to_string()))?;
        self.inner.set(key, value)
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.inner.delete(key)
    }
}

fn add_one(db: &Database, name: &str) -> Result<()> {
    db.challenges().add(
        name,
        vec!["o1.png".into(), "o2.png".into()],
        vec!["c1.png".into(), "c2.png".into()],
        vec![true, false],
        Metadata::new(),
    )
}

#[test]
fn test_failed_add_keeps_last_committed_catalog() {
    let (db, _) = WriteBudgetKv::open(1);

    add_one(&db, "committed").unwrap();
    let err = add_one(&db, "lost").unwrap_err();

    assert!(matches!(err, Error::Storage(ref msg) if msg == "disk full"));
    assert_eq!(db.challenges().names().unwrap(), vec!["committed".to_string()]);
}

#[test]
fn test_failed_remove_keeps_challenge() {
    let (db, _) = WriteBudgetKv::open(1);
    add_one(&db, "kept").unwrap();

    assert!(matches!(db.challenges().remove("kept"), Err(Error::Storage(_))));
    assert!(db.challenges().contains("kept").unwrap());
}

#[test]
fn test_failed_test_append_fails_the_run() {
    let (db, _) = WriteBudgetKv::open(1);
    add_one(&db, "c").unwrap();
    let db = Arc::new(db);
    let runner = TestRunner::new(Arc::clone(&db), 1).unwrap();

    let always_same = from_fn(|o: &[String], _c: &[String], _p: &()| {
        Ok(AlgorithmOutput::new(vec![true; o.len()], Metadata::new()))
    });

    assert!(matches!(runner.run("c", &always_same, &()), Err(Error::Storage(_))));

    let handle = runner.run_async("c", Arc::new(always_same), ());
    while !handle.is_finished() {
        thread::sleep(Duration::from_millis(1));
    }
    assert_eq!(handle.state(), RunState::Failed);
    assert!(matches!(handle.wait(), Err(Error::Storage(_))));

    assert!(db.tests().is_empty().unwrap());
    assert_eq!(db.challenges().len().unwrap(), 1);
}

#[test]
fn test_writes_resume_after_backend_recovers() {
    let (db, writes_left) = WriteBudgetKv::open(0);
    assert!(add_one(&db, "first").is_err());
    assert!(db.challenges().is_empty().unwrap());

    writes_left.store(1, Ordering::SeqCst);
    add_one(&db, "first").unwrap();
    assert_eq!(db.challenges().len().unwrap(), 1);
}

#[test]
fn test_invalid_stored_challenge_is_reported() {
    let kv = MemoryKvStore::new();
    kv.set(
        "challenges",
        br#"[{"challenge":"bad","originals":["a","b"],"comparatives":["c"],"ground_truth":[true]}]"#
            .to_vec(),
    )
    .unwrap();
    let db = Database::with_kv(StoreConfig::in_memory(), Box::new(kv)).unwrap();

    let err = db.challenges().list().unwrap_err();
    assert!(matches!(err, Error::Storage(ref msg) if msg.contains("bad")));
}
