// ── Controller ──
//
// Owns the fetch lifecycle and the search pipeline. Every state mutation
// goes through one `watch` sender; fetches are tagged with a sequence
// number so a slow, older result can never overwrite a newer one.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ControllerConfig;
use crate::debounce::SearchDebouncer;
use crate::error::CoreError;
use crate::filter::filter_records;
use crate::model::{Record, RecordSnapshot};
use crate::notify::{Notification, NotificationSink};
use crate::persist::SearchStore;
use crate::source::{ConnectivityProbe, RecordSource};
use crate::state::{ControllerState, ErrorKind, FetchError, FetchStatus, RefreshTrigger};
use crate::stream::StateStream;

// ── Services ─────────────────────────────────────────────────────

/// The collaborators a controller drives.
#[derive(Clone)]
pub struct Services {
    pub source: Arc<dyn RecordSource>,
    pub probe: Arc<dyn ConnectivityProbe>,
    pub store: Arc<dyn SearchStore>,
    pub notifier: Arc<dyn NotificationSink>,
}

impl Services {
    /// HTTP record source and TCP reachability probe for `config.endpoint`.
    pub fn for_endpoint(
        config: &ControllerConfig,
        store: Arc<dyn SearchStore>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Result<Self, CoreError> {
        Ok(Self {
            source: Arc::new(config.record_client()?),
            probe: Arc::new(config.reachability_probe()?),
            store,
            notifier,
        })
    }
}

// ── Controller ───────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. Call
/// [`start()`](Self::start) once on mount, [`set_query()`](Self::set_query)
/// on every keystroke, and [`refresh()`](Self::refresh) on a manual
/// refresh gesture. Observe results through [`subscribe()`](Self::subscribe).
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: ControllerConfig,
    services: Services,
    state: Arc<watch::Sender<ControllerState>>,
    /// Highest sequence number handed out so far.
    issued_seq: AtomicU64,
    started: AtomicBool,
    debouncer: Mutex<Option<SearchDebouncer>>,
    cancel: CancellationToken,
}

impl Controller {
    /// Create a controller. Does NOT fetch -- call [`start()`](Self::start).
    pub fn new(config: ControllerConfig, services: Services) -> Self {
        let (state, _) = watch::channel(ControllerState::default());

        Self {
            inner: Arc::new(ControllerInner {
                config,
                services,
                state: Arc::new(state),
                issued_seq: AtomicU64::new(0),
                started: AtomicBool::new(false),
                debouncer: Mutex::new(None),
                cancel: CancellationToken::new(),
            }),
        }
    }

    /// Create a controller that fetches over HTTP from `config.endpoint`.
    pub fn for_endpoint(
        config: ControllerConfig,
        store: Arc<dyn SearchStore>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Result<Self, CoreError> {
        let services = Services::for_endpoint(&config, store, notifier)?;
        Ok(Self::new(config, services))
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Seed the query from the store, start the search debouncer, and run
    /// the initial fetch.
    ///
    /// Only the first call does anything; later calls return the current
    /// status without touching the store or the network.
    pub async fn start(&self) -> Result<FetchStatus, CoreError> {
        if self.inner.cancel.is_cancelled() {
            return Err(CoreError::ShutDown);
        }
        if self.inner.started.swap(true, Ordering::SeqCst) {
            debug!("start() called again -- ignoring");
            return Ok(self.status());
        }
        self.inner
            .state
            .send_modify(|s| s.status = FetchStatus::Loading);

        let key = &self.inner.config.search_key;
        let query = match self.inner.services.store.get(key).await {
            Ok(value) => value.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "failed to read persisted query, starting empty");
                String::new()
            }
        };
        debug!(query = %query, "seeded query from store");

        self.inner.state.send_modify(|s| {
            s.query = query;
            s.filtered = filter_records(&s.collection, &s.query);
        });

        let debouncer = self.spawn_debouncer();
        *self.lock_debouncer() = Some(debouncer);

        info!(endpoint = %self.inner.config.endpoint, "controller started");
        Ok(self.refresh(RefreshTrigger::Initial).await)
    }

    /// Cancel the search debouncer and wait for it to exit.
    ///
    /// A query edit still inside its quiet period is dropped, not written.
    /// Fetches already in flight may still complete and update state.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        let debouncer = self.lock_debouncer().take();
        if let Some(debouncer) = debouncer {
            debouncer.shutdown().await;
        }
        debug!("controller shut down");
    }

    // ── Fetching ─────────────────────────────────────────────────

    /// Begin a fetch.
    ///
    /// The invocation is tagged and the in-progress status published
    /// synchronously; the returned future performs the probe and the
    /// remote call. It resolves to the status visible once this
    /// invocation has settled. Failures are never retried automatically.
    pub fn refresh(
        &self,
        trigger: RefreshTrigger,
    ) -> impl Future<Output = FetchStatus> + Send + 'static {
        let seq = self.inner.issued_seq.fetch_add(1, Ordering::SeqCst) + 1;

        self.inner.state.send_modify(|s| {
            s.error = None;
            s.status = if trigger == RefreshTrigger::UserPull && s.has_collection() {
                FetchStatus::RefreshingInBackground
            } else {
                FetchStatus::Loading
            };
        });
        debug!(seq, %trigger, "fetch started");

        let controller = self.clone();
        async move { controller.run_fetch(seq).await }
    }

    async fn run_fetch(&self, seq: u64) -> FetchStatus {
        let services = &self.inner.services;

        let outcome = if services.probe.is_connected().await {
            services.source.fetch_all().await.map_err(|e| FetchError {
                kind: ErrorKind::from(&e),
                message: e.to_string(),
            })
        } else {
            debug!(seq, "probe reports no connectivity, skipping remote call");
            Err(FetchError {
                kind: ErrorKind::Offline,
                message: "No network connection".into(),
            })
        };

        self.apply_outcome(seq, outcome)
    }

    /// Apply a fetch result if it is newer than the last applied one.
    ///
    /// A success that completes while a newer fetch is still outstanding
    /// replaces the collection but leaves the newer fetch's in-progress
    /// status alone. A failure in that position is dropped, since the
    /// newer fetch decides the status.
    fn apply_outcome(&self, seq: u64, outcome: Result<Vec<Record>, FetchError>) -> FetchStatus {
        let issued = &self.inner.issued_seq;
        let mut failed = None;

        let applied = self.inner.state.send_if_modified(|s| {
            if seq <= s.applied_seq {
                return false;
            }
            let superseded = issued.load(Ordering::SeqCst) > seq;

            match outcome {
                Ok(records) => {
                    let collection: RecordSnapshot =
                        Arc::new(records.into_iter().map(Arc::new).collect());
                    s.filtered = filter_records(&collection, &s.query);
                    s.collection = collection;
                    s.last_fetched_at = Some(Utc::now());
                    s.applied_seq = seq;
                    if !superseded {
                        s.status = FetchStatus::Succeeded;
                        s.error = None;
                    }
                    true
                }
                Err(_) if superseded => false,
                Err(err) => {
                    s.status = FetchStatus::Failed(err.kind);
                    s.applied_seq = seq;
                    failed = Some(err.clone());
                    s.error = Some(err);
                    true
                }
            }
        });

        if !applied {
            debug!(seq, "discarding stale fetch result");
        } else if let Some(err) = failed {
            warn!(seq, kind = %err.kind, message = %err.message, "fetch failed");
            self.inner
                .services
                .notifier
                .notify(Notification::for_failure(err.kind));
        } else {
            let state = self.inner.state.borrow();
            debug!(
                seq,
                records = state.collection.len(),
                visible = state.filtered.len(),
                "fetch applied"
            );
        }

        self.status()
    }

    // ── Search ───────────────────────────────────────────────────

    /// Record a query edit.
    ///
    /// The query is visible in state immediately; persistence and the
    /// filtered view follow once edits pause for the debounce interval.
    pub fn set_query(&self, query: impl Into<String>) -> Result<(), CoreError> {
        let query = query.into();
        let guard = self.lock_debouncer();
        let Some(debouncer) = guard.as_ref() else {
            return Err(self.inactive_error());
        };

        self.inner.state.send_if_modified(|s| {
            if s.query == query {
                return false;
            }
            s.query.clone_from(&query);
            true
        });

        if debouncer.push(query) {
            Ok(())
        } else {
            Err(CoreError::ShutDown)
        }
    }

    /// Commit a pending query edit now rather than after the quiet period.
    pub async fn flush_query(&self) -> Result<(), CoreError> {
        let handle = self
            .lock_debouncer()
            .as_ref()
            .map(SearchDebouncer::handle)
            .ok_or_else(|| self.inactive_error())?;
        handle.flush().await;
        Ok(())
    }

    fn spawn_debouncer(&self) -> SearchDebouncer {
        let state = Arc::clone(&self.inner.state);
        let store = Arc::clone(&self.inner.services.store);
        let key = self.inner.config.search_key.clone();

        SearchDebouncer::spawn(self.inner.config.debounce, &self.inner.cancel, move |query| {
            let state = Arc::clone(&state);
            let store = Arc::clone(&store);
            let key = key.clone();
            async move {
                if let Err(e) = store.set(&key, &query).await {
                    warn!(error = %e, "failed to persist query");
                }
                state.send_modify(|s| {
                    s.filtered = filter_records(&s.collection, &s.query);
                });
                debug!(query = %query, "query committed");
            }
        })
    }

    /// Error for a search call made with no running debouncer.
    fn inactive_error(&self) -> CoreError {
        if self.inner.cancel.is_cancelled() {
            CoreError::ShutDown
        } else {
            CoreError::NotStarted
        }
    }

    fn lock_debouncer(&self) -> MutexGuard<'_, Option<SearchDebouncer>> {
        self.inner
            .debouncer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // ── State observation ────────────────────────────────────────

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> StateStream {
        StateStream::new(self.inner.state.subscribe())
    }

    /// A snapshot of the full state.
    pub fn state(&self) -> ControllerState {
        self.inner.state.borrow().clone()
    }

    pub fn status(&self) -> FetchStatus {
        self.inner.state.borrow().status
    }

    pub fn query(&self) -> String {
        self.inner.state.borrow().query.clone()
    }

    pub fn collection(&self) -> RecordSnapshot {
        Arc::clone(&self.inner.state.borrow().collection)
    }

    pub fn filtered(&self) -> RecordSnapshot {
        Arc::clone(&self.inner.state.borrow().filtered)
    }
}
