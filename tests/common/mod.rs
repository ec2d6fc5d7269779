//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use config_resolver::resilience::{BackoffPolicy, RetryEngine};
use config_resolver::store::{ConfigEntry, MemoryStore, Store, StoreResult};
use config_resolver::Resolver;

pub const BACKOFF: Duration = Duration::from_secs(300);
pub const BUDGET: Duration = Duration::from_secs(30);

/// One scripted fetch outcome.
#[derive(Debug, Clone)]
pub enum Step {
    Absent,
    Empty,
    Fault,
    Value(&'static str),
}

/// A fetch function that plays `script` in order, repeating the last step.
///
/// Returns the function and a counter of calls made.
pub fn scripted_fetch(
    script: Vec<Step>,
) -> (
    impl Fn() -> Result<Option<String>, String> + Send + 'static,
    Arc<AtomicU32>,
) {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let script = Arc::new(Mutex::new(script));

    let fetch = move || {
        let n = counter.fetch_add(1, Ordering::SeqCst) as usize;
        let script = script.lock().unwrap();
        let step = script.get(n).or(script.last()).cloned().unwrap_or(Step::Absent);
        match step {
            Step::Absent => Ok(None),
            Step::Empty => Ok(Some(String::new())),
            Step::Fault => Err(format!("store unavailable (call {})", n + 1)),
            Step::Value(v) => Ok(Some(v.to_string())),
        }
    };
    (fetch, calls)
}

/// Memory store that counts reads, to observe how many loops are polling.
#[derive(Clone, Default)]
pub struct CountingStore {
    inner: MemoryStore,
    reads: Arc<AtomicU32>,
}

impl CountingStore {
    pub fn reads(&self) -> u32 {
        self.reads.load(Ordering::SeqCst)
    }
}

impl Store for CountingStore {
    fn entry(&self, key: &str) -> StoreResult<Option<ConfigEntry>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.entry(key)
    }

    fn put(&self, key: &str, value: &str, description: &str) -> StoreResult<()> {
        self.inner.put(key, value, description)
    }

    fn entries(&self) -> StoreResult<Vec<ConfigEntry>> {
        self.inner.entries()
    }
}

pub fn engine() -> RetryEngine {
    RetryEngine::new(BackoffPolicy::fixed(BACKOFF))
}

pub fn resolver<S: Store + Clone + 'static>(store: &S, share_tasks: bool) -> Resolver {
    Resolver::new(Arc::new(store.clone()), engine())
        .with_budget(BUDGET)
        .with_shared_tasks(share_tasks)
}
