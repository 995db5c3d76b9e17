//! The dispatcher task.
//!
//! A single task owns the [`SearchMachine`], the [`DebounceTimer`] and the
//! [`Presenter`]. Inputs arrive over a channel from [`DispatcherHandle`]s;
//! each search runs on its own spawned worker, which hands its result back
//! over a second channel. Presenter callbacks therefore only ever run on
//! the dispatcher task.

use std::sync::Arc;
use std::time::Duration;

use pricescout_core::AppConfig;
use pricescout_scraper::{ScraperError, SearchOutcome};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::backend::SearchBackend;
use crate::presenter::Presenter;
use crate::state::{Action, SearchMachine};
use crate::timer::DebounceTimer;

const EVENT_BUFFER: usize = 64;

/// Inputs from the presentation shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchEvent {
    QueryChanged(String),
    Submit(String),
    /// Start any debounce-pending search, wait for the one in flight, then
    /// stop.
    Finish,
    Close,
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("dispatcher has shut down")]
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Minimum trimmed query length that arms the debounce timer.
    pub min_query_len: usize,
    pub debounce: Duration,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            min_query_len: 2,
            debounce: Duration::from_millis(500),
        }
    }
}

impl DispatchConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            min_query_len: config.min_query_len,
            debounce: Duration::from_millis(config.debounce_ms),
        }
    }
}

/// Cloneable sender side of a running dispatcher.
#[derive(Debug, Clone)]
pub struct DispatcherHandle {
    tx: mpsc::Sender<DispatchEvent>,
}

impl DispatcherHandle {
    /// # Errors
    ///
    /// Returns [`DispatchError::Closed`] once the dispatcher has stopped.
    pub async fn send(&self, event: DispatchEvent) -> Result<(), DispatchError> {
        self.tx.send(event).await.map_err(|_| DispatchError::Closed)
    }

    /// # Errors
    ///
    /// Returns [`DispatchError::Closed`] once the dispatcher has stopped.
    pub async fn query_changed(&self, text: impl Into<String>) -> Result<(), DispatchError> {
        self.send(DispatchEvent::QueryChanged(text.into())).await
    }

    /// # Errors
    ///
    /// Returns [`DispatchError::Closed`] once the dispatcher has stopped.
    pub async fn submit(&self, text: impl Into<String>) -> Result<(), DispatchError> {
        self.send(DispatchEvent::Submit(text.into())).await
    }

    /// Asks the dispatcher to stop once the pending or in-flight search has
    /// been delivered.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Closed`] if the dispatcher already stopped.
    pub async fn finish(&self) -> Result<(), DispatchError> {
        self.send(DispatchEvent::Finish).await
    }

    /// Asks the dispatcher to stop. In-flight searches are abandoned.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Closed`] if the dispatcher already stopped.
    pub async fn close(&self) -> Result<(), DispatchError> {
        self.send(DispatchEvent::Close).await
    }
}

/// Result of one worker run.
struct Completion {
    request_id: u64,
    result: Result<SearchOutcome, ScraperError>,
}

pub struct Dispatcher<B, P> {
    backend: Arc<B>,
    presenter: P,
    machine: SearchMachine,
    timer: DebounceTimer,
    events: mpsc::Receiver<DispatchEvent>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    finishing: bool,
}

impl<B: SearchBackend, P: Presenter> Dispatcher<B, P> {
    #[must_use]
    pub fn new(backend: Arc<B>, presenter: P, config: DispatchConfig) -> (Self, DispatcherHandle) {
        let (tx, events) = mpsc::channel(EVENT_BUFFER);
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let dispatcher = Self {
            backend,
            presenter,
            machine: SearchMachine::new(config.min_query_len),
            timer: DebounceTimer::new(config.debounce),
            events,
            completions_tx,
            completions_rx,
            finishing: false,
        };
        (dispatcher, DispatcherHandle { tx })
    }

    /// Processes events until [`DispatchEvent::Close`] arrives, every
    /// handle is dropped, or a [`DispatchEvent::Finish`] has nothing left in
    /// flight, then returns the presenter.
    pub async fn run(mut self) -> P {
        loop {
            if self.finishing && !self.machine.is_searching() {
                break;
            }
            tokio::select! {
                biased;

                event = self.events.recv() => match event {
                    Some(DispatchEvent::QueryChanged(text)) => {
                        let action = self.machine.query_changed(&text);
                        self.apply(action);
                    }
                    Some(DispatchEvent::Submit(text)) => {
                        let action = self.machine.submit(&text);
                        if action == Action::GoIdle {
                            tracing::warn!("refusing to search for an empty query");
                        }
                        self.apply(action);
                    }
                    Some(DispatchEvent::Finish) => {
                        let action = self.machine.flush();
                        self.apply(action);
                        self.finishing = true;
                    }
                    Some(DispatchEvent::Close) | None => break,
                },
                Some(completion) = self.completions_rx.recv() => self.deliver(completion),
                query = self.timer.fired() => {
                    let action = self.machine.timer_fired(&query);
                    self.apply(action);
                }
            }
        }
        tracing::debug!("dispatcher stopped");
        self.presenter
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::GoIdle => {
                self.timer.cancel();
                self.presenter.on_idle();
            }
            Action::Arm(query) => {
                tracing::trace!(query = %query, "debounce armed");
                self.timer.arm(query);
            }
            Action::Dispatch { request_id, query } => {
                self.timer.cancel();
                self.presenter.on_searching(&query);
                self.start_worker(request_id, query);
            }
            Action::Ignore => {}
        }
    }

    fn start_worker(&self, request_id: u64, query: String) {
        tracing::debug!(request_id, query = %query, "dispatching search");
        let backend = Arc::clone(&self.backend);
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            let result = backend.search(&query).await;
            // The dispatcher may already be gone; nothing to deliver to then.
            let _ = tx.send(Completion { request_id, result });
        });
    }

    fn deliver(&mut self, completion: Completion) {
        let Completion { request_id, result } = completion;
        if !self.machine.complete(request_id) {
            tracing::debug!(request_id, "discarding superseded search result");
            return;
        }
        match result {
            Ok(SearchOutcome::Found(records)) => {
                tracing::debug!(request_id, records = records.len(), "delivering results");
                self.presenter.on_results(records);
            }
            Ok(SearchOutcome::Empty(reason)) => {
                tracing::debug!(request_id, %reason, "delivering empty result");
                self.presenter.on_empty(reason);
            }
            Err(err) => {
                tracing::warn!(request_id, error = %err, "search failed");
                self.presenter.on_error(&err.user_message());
            }
        }
    }
}

/// Spawns a dispatcher on the current runtime.
///
/// The join handle yields the presenter once the dispatcher stops.
pub fn spawn<B, P>(
    backend: Arc<B>,
    presenter: P,
    config: DispatchConfig,
) -> (DispatcherHandle, JoinHandle<P>)
where
    B: SearchBackend,
    P: Presenter + Send + 'static,
{
    let (dispatcher, handle) = Dispatcher::new(backend, presenter, config);
    (handle, tokio::spawn(dispatcher.run()))
}
