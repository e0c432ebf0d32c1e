use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::AnalyzeError;

use super::{AccountData, AccountSource};

/// A scripted source for tests. Returns the same outcome on every call and
/// records which handles were requested.
pub struct MockSource {
    outcome: Result<AccountData, AnalyzeError>,
    calls: AtomicUsize,
    handles: Mutex<Vec<String>>,
}

impl MockSource {
    pub fn new(outcome: Result<AccountData, AnalyzeError>) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
            handles: Mutex::new(Vec::new()),
        }
    }

    pub fn succeeding(data: AccountData) -> Self {
        Self::new(Ok(data))
    }

    pub fn failing(err: AnalyzeError) -> Self {
        Self::new(Err(err))
    }

    /// How many times `fetch` was called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Handles passed to `fetch`, in call order.
    pub fn handles(&self) -> Vec<String> {
        self.handles
            .lock()
            .map(|h| h.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl AccountSource for MockSource {
    async fn fetch(&self, handle: &str) -> Result<AccountData, AnalyzeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut handles) = self.handles.lock() {
            handles.push(handle.to_string());
        }
        self.outcome.clone()
    }
}
