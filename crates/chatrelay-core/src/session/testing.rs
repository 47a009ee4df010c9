//! Test doubles for the session ports.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::{Value, json};

use chatrelay_types::error::{InferenceError, RepositoryError};
use chatrelay_types::message::Message;

use crate::inference::client::{InferenceClient, InferenceRequest};
use crate::store::log_store::SessionLogStore;
use crate::store::memory::InMemorySessionLogStore;

/// Inference client answering from a script, then with numbered replies.
pub(crate) struct ScriptedInference {
    script: Mutex<VecDeque<Result<Value, InferenceError>>>,
    always_fail: Option<InferenceError>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl ScriptedInference {
    pub(crate) fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            always_fail: None,
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            delay: None,
        }
    }

    pub(crate) fn with_script(script: Vec<Result<Value, InferenceError>>) -> Self {
        let inference = Self::new();
        *inference.script.lock().unwrap() = script.into();
        inference
    }

    pub(crate) fn failing(error: InferenceError) -> Self {
        Self {
            always_fail: Some(error),
            ..Self::new()
        }
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl InferenceClient for ScriptedInference {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &InferenceRequest) -> Result<Value, InferenceError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.prompts.lock().unwrap().push(request.prompt.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = &self.always_fail {
            return Err(err.clone());
        }

        let scripted = self.script.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| Ok(json!({ "response": format!("reply {n}") })))
    }
}

/// In-memory store that can be told to fail upcoming loads or saves.
#[derive(Default)]
pub(crate) struct FlakyStore {
    inner: InMemorySessionLogStore,
    failing_saves: AtomicUsize,
    failing_loads: AtomicUsize,
    saves: AtomicUsize,
    loads: AtomicUsize,
}

impl FlakyStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fail_next_saves(&self, n: usize) {
        self.failing_saves.store(n, Ordering::SeqCst);
    }

    pub(crate) fn fail_next_loads(&self, n: usize) {
        self.failing_loads.store(n, Ordering::SeqCst);
    }

    pub(crate) fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub(crate) fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub(crate) fn snapshot(&self, session_id: &str) -> Option<Vec<Message>> {
        self.inner.snapshot(session_id)
    }

    fn take_failure(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl SessionLogStore for FlakyStore {
    async fn load(&self, session_id: &str) -> Result<Option<Vec<Message>>, RepositoryError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if Self::take_failure(&self.failing_loads) {
            return Err(RepositoryError::Connection);
        }
        self.inner.load(session_id).await
    }

    async fn save(&self, session_id: &str, messages: &[Message]) -> Result<(), RepositoryError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        if Self::take_failure(&self.failing_saves) {
            return Err(RepositoryError::Query("disk full".to_string()));
        }
        self.inner.save(session_id, messages).await
    }
}
