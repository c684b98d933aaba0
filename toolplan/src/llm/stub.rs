//! Scripted in-process backend for tests and offline use.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::backend::{BackendInfo, GenerateRequest, ModelBackend};
use crate::error::BackendError;

/// Replays queued responses in order and records every request.
#[derive(Debug, Default)]
pub struct StubBackend {
    responses: Mutex<VecDeque<Result<String, BackendError>>>,
    requests: Mutex<Vec<GenerateRequest>>,
    supports_schema: bool,
    probes: AtomicUsize,
}

impl StubBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, text: impl Into<String>) -> Self {
        lock(&self.responses).push_back(Ok(text.into()));
        self
    }

    pub fn with_error(self, error: BackendError) -> Self {
        lock(&self.responses).push_back(Err(error));
        self
    }

    /// Answer for [`ModelBackend::supports_json_schema`]. Defaults to `false`.
    pub fn with_schema_support(mut self, supported: bool) -> Self {
        self.supports_schema = supported;
        self
    }

    pub fn requests(&self) -> Vec<GenerateRequest> {
        lock(&self.requests).clone()
    }

    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    pub fn remaining(&self) -> usize {
        lock(&self.responses).len()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl ModelBackend for StubBackend {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, BackendError> {
        lock(&self.requests).push(request.clone());
        lock(&self.responses).pop_front().unwrap_or_else(|| {
            Err(BackendError::Unavailable(
                "stub backend has no scripted response".to_string(),
            ))
        })
    }

    async fn supports_json_schema(&self) -> bool {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.supports_schema
    }

    fn info(&self) -> BackendInfo {
        BackendInfo {
            provider: "stub".to_string(),
            model: "stub".to_string(),
            endpoint: None,
        }
    }
}
