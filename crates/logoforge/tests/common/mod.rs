//! Fake backends shared by the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use logoforge::backend::{BackendRequest, BackendResponse};
use logoforge::{BackendError, ContractLayer, GenerativeBackend};

pub fn text(body: impl Into<String>) -> BackendResponse {
    BackendResponse {
        text: Some(body.into()),
        ..Default::default()
    }
}

/// What a scripted backend does for one call.
pub struct Reply {
    pub delay: Duration,
    pub result: Result<BackendResponse, BackendError>,
}

impl Reply {
    pub fn now(result: Result<BackendResponse, BackendError>) -> Self {
        Self {
            delay: Duration::ZERO,
            result,
        }
    }

    pub fn after(delay: Duration, result: Result<BackendResponse, BackendError>) -> Self {
        Self { delay, result }
    }
}

type Script = dyn Fn(usize, &BackendRequest) -> Reply + Send + Sync;

/// Answers each call from a closure given the zero-based call index.
pub struct ScriptedBackend {
    script: Box<Script>,
    calls: Mutex<Vec<BackendRequest>>,
}

impl ScriptedBackend {
    pub fn new<F>(script: F) -> Arc<Self>
    where
        F: Fn(usize, &BackendRequest) -> Reply + Send + Sync + 'static,
    {
        Arc::new(Self {
            script: Box::new(script),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<BackendRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerativeBackend for ScriptedBackend {
    async fn generate(&self, request: BackendRequest) -> Result<BackendResponse, BackendError> {
        let reply = {
            let mut calls = self.calls.lock().unwrap();
            let reply = (self.script)(calls.len(), &request);
            calls.push(request);
            reply
        };
        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }
        reply.result
    }
}

/// Holds every call until the test releases it.
pub struct GatedBackend {
    gate: Semaphore,
    started: AtomicUsize,
    response: Result<BackendResponse, BackendError>,
}

impl GatedBackend {
    pub fn new(response: Result<BackendResponse, BackendError>) -> Arc<Self> {
        Arc::new(Self {
            gate: Semaphore::new(0),
            started: AtomicUsize::new(0),
            response,
        })
    }

    /// Let one waiting (or future) call finish.
    pub fn release(&self) {
        self.gate.add_permits(1);
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerativeBackend for GatedBackend {
    async fn generate(&self, _request: BackendRequest) -> Result<BackendResponse, BackendError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        permit.forget();
        self.response.clone()
    }
}

pub fn layer(backend: Arc<dyn GenerativeBackend>) -> ContractLayer {
    ContractLayer::new(backend)
}
