//! Scripted in-memory [`JobApi`] for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use okza_core::JobId;
use serde_json::{Value, json};

use crate::api::{JobApi, JobRequest};
use crate::error::FetchError;

/// Replays queued responses in order.
///
/// Once the status queue is drained every further status call returns
/// the fallback body.
pub(crate) struct ScriptedApi {
    submits: Mutex<VecDeque<Result<Value, FetchError>>>,
    statuses: Mutex<VecDeque<Result<Value, FetchError>>>,
    fallback: Value,
    submitted: Mutex<Vec<JobRequest>>,
    status_calls: Mutex<Vec<JobId>>,
}

impl ScriptedApi {
    pub(crate) fn new() -> Self {
        Self {
            submits: Mutex::new(VecDeque::new()),
            statuses: Mutex::new(VecDeque::new()),
            fallback: json!({"tasks": [{"result": null}]}),
            submitted: Mutex::new(Vec::new()),
            status_calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_submit(self, response: Result<Value, FetchError>) -> Self {
        self.submits.lock().unwrap().push_back(response);
        self
    }

    pub(crate) fn with_status(self, response: Result<Value, FetchError>) -> Self {
        self.statuses.lock().unwrap().push_back(response);
        self
    }

    pub(crate) fn with_counts(mut self, counts: &[u64]) -> Self {
        for &count in counts {
            self = self.with_status(Ok(status_body(count)));
        }
        self
    }

    pub(crate) fn with_fallback(mut self, body: Value) -> Self {
        self.fallback = body;
        self
    }

    pub(crate) fn submitted(&self) -> Vec<JobRequest> {
        self.submitted.lock().unwrap().clone()
    }

    pub(crate) fn status_calls(&self) -> Vec<JobId> {
        self.status_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobApi for ScriptedApi {
    async fn submit(&self, _auth_header: &str, request: &JobRequest) -> Result<Value, FetchError> {
        self.submitted.lock().unwrap().push(request.clone());
        self.submits
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(json!({"tasks": [{"id": "job-1"}]})))
    }

    async fn status(&self, _auth_header: &str, job_id: &JobId) -> Result<Value, FetchError> {
        self.status_calls.lock().unwrap().push(job_id.clone());
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(self.fallback.clone()))
    }
}

/// A status body reporting `count` items, each priced at its index.
pub(crate) fn status_body(count: u64) -> Value {
    let items: Vec<Value> = (0..count)
        .rev()
        .map(|i| json!({"title": format!("item-{i}"), "price": i}))
        .collect();
    json!({"tasks": [{"result": [{"items_count": count, "items": items}]}]})
}
