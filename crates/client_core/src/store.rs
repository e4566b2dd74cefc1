use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use shared::domain::{GroupingResult, Groups};
use tokio::sync::broadcast;
use tracing::{error, info};

use crate::{error::ClientError, requests::GroupingBackend, transport::log_error};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClusterizerState {
    pub loading: bool,
    pub phrases: Vec<String>,
    pub groups: Groups,
    pub singles: Vec<String>,
    /// Message from the last failed request, when errors are surfaced.
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorReporting {
    /// Failures are only logged; `last_error` is never set.
    LogOnly,
    /// Failures are logged and their user-facing message lands in `last_error`.
    #[default]
    Surface,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StoreOptions {
    pub error_reporting: ErrorReporting,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    LoadingChanged(bool),
    GroupsUpdated,
    RequestFailed(String),
}

struct StoreInner {
    state: ClusterizerState,
    /// Token of the most recently started request.
    generation: u64,
}

pub struct ClusterizerStore {
    backend: Arc<dyn GroupingBackend>,
    options: StoreOptions,
    inner: Mutex<StoreInner>,
    events: broadcast::Sender<StoreEvent>,
}

impl ClusterizerStore {
    pub fn new(backend: Arc<dyn GroupingBackend>) -> Self {
        Self::with_options(backend, StoreOptions::default())
    }

    pub fn with_options(backend: Arc<dyn GroupingBackend>, options: StoreOptions) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            backend,
            options,
            inner: Mutex::new(StoreInner {
                state: ClusterizerState::default(),
                generation: 0,
            }),
            events,
        }
    }

    pub fn state(&self) -> ClusterizerState {
        self.lock().state.clone()
    }

    pub fn set_phrases(&self, phrases: Vec<String>) {
        self.lock().state.phrases = phrases;
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Groups the current phrases through the backend.
    ///
    /// Only the most recently started call may update state when it settles;
    /// results of superseded calls are dropped.
    pub async fn request_group_phrases(&self) {
        let (generation, phrases) = {
            let mut inner = self.lock();
            inner.generation += 1;
            inner.state.loading = true;
            (inner.generation, inner.state.phrases.clone())
        };
        self.emit(StoreEvent::LoadingChanged(true));

        let mut settlement = Settlement {
            store: self,
            generation,
            settled: false,
        };
        let outcome = self.backend.group_phrases(&phrases).await;
        settlement.settle(outcome);
    }

    fn apply(&self, generation: u64, outcome: Result<GroupingResult, ClientError>) {
        let mut events = Vec::with_capacity(2);
        {
            let mut inner = self.lock();
            if inner.generation != generation {
                info!(
                    generation,
                    latest = inner.generation,
                    "clusterizer: discarding result of superseded grouping request"
                );
                if let Err(err) = &outcome {
                    error!(error = %err, "Error when grouping phrases");
                }
                return;
            }

            match outcome {
                Ok(result) => {
                    inner.state.groups = result.groups;
                    inner.state.singles = result.singles;
                    inner.state.last_error = None;
                    events.push(StoreEvent::GroupsUpdated);
                }
                Err(err) => {
                    error!(error = %err, "Error when grouping phrases");
                    if self.options.error_reporting == ErrorReporting::Surface {
                        let message = log_error(&err);
                        inner.state.last_error = Some(message.clone());
                        events.push(StoreEvent::RequestFailed(message));
                    }
                }
            }
            inner.state.loading = false;
            events.push(StoreEvent::LoadingChanged(false));
        }
        for event in events {
            self.emit(event);
        }
    }

    fn release_abandoned(&self, generation: u64) {
        let released = {
            let mut inner = self.lock();
            let current = inner.generation == generation && inner.state.loading;
            if current {
                inner.state.loading = false;
            }
            current
        };
        if released {
            info!(generation, "clusterizer: grouping request abandoned before settling");
            self.emit(StoreEvent::LoadingChanged(false));
        }
    }

    fn emit(&self, event: StoreEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Resets `loading` even when the request future is dropped mid-flight.
struct Settlement<'a> {
    store: &'a ClusterizerStore,
    generation: u64,
    settled: bool,
}

impl Settlement<'_> {
    fn settle(&mut self, outcome: Result<GroupingResult, ClientError>) {
        self.settled = true;
        self.store.apply(self.generation, outcome);
    }
}

impl Drop for Settlement<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.store.release_abandoned(self.generation);
        }
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
