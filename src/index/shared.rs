//! Shared index handle
//!
//! The engine itself carries no locking. Callers that need to share one
//! index across threads go through this handle, which holds a single mutex
//! for the whole duration of every operation.

use super::linear_hash::{IndexStats, LinearHashIndex};
use crate::types::Record;
use crate::Result;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Clone)]
pub struct SharedIndex {
    inner: Arc<Mutex<LinearHashIndex>>,
}

impl SharedIndex {
    pub fn new(index: LinearHashIndex) -> Self {
        Self {
            inner: Arc::new(Mutex::new(index)),
        }
    }

    pub fn insert(&self, record: &Record) -> Result<()> {
        self.inner.lock().insert(record)
    }

    pub fn lookup(&self, id: u32) -> Result<Option<Record>> {
        self.inner.lock().lookup(id)
    }

    pub fn len(&self) -> u64 {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> Result<IndexStats> {
        self.inner.lock().stats()
    }

    /// Run `f` with exclusive access, e.g. for a bulk load
    pub fn with<R>(&self, f: impl FnOnce(&mut LinearHashIndex) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IndexConfig;
    use std::thread;
    use tempfile::TempDir;

    #[test]
    fn test_concurrent_inserts() {
        let temp_dir = TempDir::new().unwrap();
        let index =
            LinearHashIndex::create(temp_dir.path().join("shared.idx"), IndexConfig::for_testing())
                .unwrap();
        let shared = SharedIndex::new(index);

        let handles: Vec<_> = (0..4u32)
            .map(|t| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for k in 0..50u32 {
                        let id = t * 1000 + k;
                        shared
                            .insert(&Record::new(id, format!("worker {t}"), "", t))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(shared.len(), 200);
        for t in 0..4u32 {
            for k in 0..50u32 {
                let record = shared.lookup(t * 1000 + k).unwrap().unwrap();
                assert_eq!(record.name, format!("worker {t}"));
            }
        }
    }

    #[test]
    fn test_with_exclusive_access() {
        let temp_dir = TempDir::new().unwrap();
        let index = LinearHashIndex::with_defaults(temp_dir.path().join("with.idx")).unwrap();
        let shared = SharedIndex::new(index);

        let buckets = shared.with(|index| {
            for id in 0..30 {
                index.insert(&Record::new(id, "n", "b", 0)).unwrap();
            }
            index.bucket_count()
        });
        assert!(buckets > 4);
        assert_eq!(shared.stats().unwrap().buckets, buckets);
        assert!(!shared.is_empty());
    }
}
