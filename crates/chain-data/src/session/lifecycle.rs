use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use log::{debug, trace, warn};
use tokio::sync::{watch, Mutex as AsyncMutex, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

use super::metrics::{Counters, SessionMetrics};
use super::state::{Phase, SessionState};
use crate::errors::ChainDataError;
use crate::models::{BoundValue, RawValue, SourceDescriptor, SourceMode};
use crate::normalizer::normalize;
use crate::source::{CancelHandle, ChainDataSource, ValueCallback};

/// Smallest interval a polling session will use.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// State shared between the session owner, its background task and the
/// value callback handed to the source.
struct Shared {
    id: Uuid,
    descriptor: SourceDescriptor,
    phase: Mutex<Phase>,
    slot: watch::Sender<Option<BoundValue>>,
    closed: Notify,
    task: Mutex<Option<JoinHandle<()>>>,
    counters: Counters,
}

impl Shared {
    /// Lock the phase mutex, recovering from poison if necessary.
    ///
    /// The worst case after a poisoned lock is a stale phase, which is
    /// better than panicking inside a source callback.
    fn lock_phase(&self) -> MutexGuard<'_, Phase> {
        self.phase.lock().unwrap_or_else(|poisoned| {
            warn!("Binder session phase mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn lock_task(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.task.lock().unwrap_or_else(|poisoned| {
            warn!("Binder session task mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn state(&self) -> SessionState {
        self.lock_phase().state()
    }

    fn is_closed(&self) -> bool {
        self.state() == SessionState::Closed
    }

    /// Handle one delivery from the source.
    ///
    /// Absent values never overwrite the slot. Anything arriving after close
    /// is dropped and reported as [`ChainDataError::SessionClosed`].
    fn deliver(&self, raw: Option<RawValue>) -> Result<(), ChainDataError> {
        if self.is_closed() {
            return Err(self.discard_late());
        }

        let Some(raw) = raw else {
            Counters::bump(&self.counters.absent);
            return Ok(());
        };

        debug!(
            "Session {}: {} value for '{}'",
            self.id,
            raw.shape(),
            self.descriptor.name()
        );
        let normalized = normalize(self.descriptor.name(), raw);
        if normalized.diagnostic.is_some() {
            Counters::bump(&self.counters.diagnostics);
        }

        // Re-check under the lock so a concurrent close wins.
        let phase = self.lock_phase();
        if phase.state() == SessionState::Closed {
            drop(phase);
            return Err(self.discard_late());
        }
        self.slot.send_replace(Some(normalized.value));
        Counters::bump(&self.counters.updates);
        Ok(())
    }

    fn discard_late(&self) -> ChainDataError {
        let error = ChainDataError::SessionClosed;
        Counters::bump(&self.counters.late);
        trace!(
            "Session {}: discarding delivery for '{}' ({:?})",
            self.id,
            self.descriptor.name(),
            error.failure_class()
        );
        error
    }

    /// Store the cancel handle once the subscription has opened.
    fn attach(&self, handle: CancelHandle) {
        let mut phase = self.lock_phase();
        match phase.state() {
            SessionState::Opening => {
                *phase = Phase::Active(Some(handle));
                debug!(
                    "Session {}: subscription to '{}' active",
                    self.id,
                    self.descriptor.name()
                );
            }
            state => {
                drop(phase);
                if state == SessionState::Closed {
                    debug!(
                        "Session {}: closed while opening '{}', releasing subscription",
                        self.id,
                        self.descriptor.name()
                    );
                } else {
                    warn!(
                        "Session {}: unexpected subscription handle in state {}, releasing",
                        self.id, state
                    );
                }
                Counters::bump(&self.counters.cancellations);
                handle.cancel();
            }
        }
    }

    /// Opening -> Active once a call has resolved. Other phases are left alone.
    fn settle(&self) {
        let mut phase = self.lock_phase();
        if phase.state() == SessionState::Opening {
            *phase = Phase::Active(None);
        }
    }

    fn record_failure(&self, error: &ChainDataError) {
        Counters::bump(&self.counters.failures);
        warn!(
            "Session {}: {} ({:?}), keeping previous value",
            self.id,
            error,
            error.failure_class()
        );
    }

    /// A rejected one-shot or subscription ends the session.
    fn fail(&self, error: &ChainDataError) {
        self.record_failure(error);
        let previous = std::mem::replace(&mut *self.lock_phase(), Phase::Closed);
        if previous.state() != SessionState::Closed {
            self.closed.notify_waiters();
        }
    }

    /// Keep the task handle so close can abort it. A task registered after
    /// close is aborted right away.
    fn track(&self, handle: JoinHandle<()>) {
        let mut task = self.lock_task();
        if self.is_closed() {
            handle.abort();
        } else {
            *task = Some(handle);
        }
    }

    fn close(&self) {
        let previous = std::mem::replace(&mut *self.lock_phase(), Phase::Closed);
        let was = previous.state();
        match previous {
            Phase::Closed => {
                trace!("Session {}: already closed", self.id);
                return;
            }
            Phase::Active(Some(handle)) => {
                Counters::bump(&self.counters.cancellations);
                handle.cancel();
            }
            Phase::Idle | Phase::Opening | Phase::Active(None) => {}
        }

        if let Some(task) = self.lock_task().take() {
            task.abort();
        }
        self.closed.notify_waiters();
        debug!(
            "Session {}: closed '{}' (was {})",
            self.id,
            self.descriptor.name(),
            was
        );
    }
}

/// One binding between a source descriptor and its bound value.
///
/// The session is torn down when [`close`](Self::close) is called or when it
/// is dropped, whichever happens first. Closing is idempotent: the
/// subscription's cancel handle is released at most once.
pub struct BinderSession {
    shared: Arc<Shared>,
    source: Arc<dyn ChainDataSource>,
    poll_interval: Duration,
    /// Receiver backing [`changed`](Self::changed). Created with the slot so
    /// an update stored before the first wait is still reported.
    observer: AsyncMutex<watch::Receiver<Option<BoundValue>>>,
}

impl BinderSession {
    /// Create an idle session. Nothing is invoked until [`open`](Self::open).
    ///
    /// `poll_interval` is used by poll-mode descriptors that carry no
    /// interval of their own.
    pub fn new(
        descriptor: SourceDescriptor,
        source: Arc<dyn ChainDataSource>,
        poll_interval: Duration,
    ) -> Self {
        let (slot, observer) = watch::channel(None);
        Self {
            shared: Arc::new(Shared {
                id: Uuid::new_v4(),
                descriptor,
                phase: Mutex::new(Phase::Idle),
                slot,
                closed: Notify::new(),
                task: Mutex::new(None),
                counters: Counters::default(),
            }),
            source,
            poll_interval,
            observer: AsyncMutex::new(observer),
        }
    }

    /// Invoke the source for this session's descriptor.
    ///
    /// Only the first call on an idle session does anything.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime.
    pub fn open(&self) {
        {
            let mut phase = self.shared.lock_phase();
            if phase.state() != SessionState::Idle {
                debug!(
                    "Session {}: open ignored in state {}",
                    self.shared.id,
                    phase.state()
                );
                return;
            }
            *phase = Phase::Opening;
        }
        debug!("Session {}: opening {}", self.shared.id, self.shared.descriptor);

        let shared = self.shared.clone();
        let source = self.source.clone();
        match self.shared.descriptor.mode() {
            // Never aborted: the resolution must be observed to release the handle.
            SourceMode::Subscribe => {
                tokio::spawn(run_subscribe(shared, source));
            }
            SourceMode::OneShot => {
                let task = tokio::spawn(run_one_shot(shared, source));
                self.shared.track(task);
            }
            SourceMode::Poll { interval } => {
                let every = interval
                    .unwrap_or(self.poll_interval)
                    .max(MIN_POLL_INTERVAL);
                let task = tokio::spawn(run_poll(shared, source, every));
                self.shared.track(task);
            }
        }
    }

    /// Tear the session down.
    pub fn close(&self) {
        self.shared.close();
    }

    pub fn id(&self) -> Uuid {
        self.shared.id
    }

    pub fn descriptor(&self) -> &SourceDescriptor {
        &self.shared.descriptor
    }

    pub fn state(&self) -> SessionState {
        self.shared.state()
    }

    /// The current bound value, `None` until a value has been stored.
    pub fn value(&self) -> Option<BoundValue> {
        self.shared.slot.borrow().clone()
    }

    /// Receiver that observes every update of the bound value.
    pub fn watch(&self) -> watch::Receiver<Option<BoundValue>> {
        self.shared.slot.subscribe()
    }

    /// Wait for the next update of the bound value.
    ///
    /// Each update is reported once, including one stored before the first
    /// call. Returns `None` once the session is closed.
    pub async fn changed(&self) -> Option<BoundValue> {
        let mut rx = self.observer.lock().await;
        let closed = self.shared.closed.notified();
        tokio::pin!(closed);
        closed.as_mut().enable();

        if self.shared.is_closed() {
            return None;
        }

        tokio::select! {
            result = rx.changed() => {
                result.ok()?;
                let value = rx.borrow_and_update().clone();
                value
            }
            _ = &mut closed => None,
        }
    }

    pub fn metrics(&self) -> SessionMetrics {
        self.shared.counters.snapshot()
    }
}

impl Drop for BinderSession {
    fn drop(&mut self) {
        self.shared.close();
    }
}

impl std::fmt::Debug for BinderSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinderSession")
            .field("id", &self.shared.id)
            .field("descriptor", &self.shared.descriptor)
            .field("state", &self.state())
            .finish()
    }
}

async fn run_subscribe(shared: Arc<Shared>, source: Arc<dyn ChainDataSource>) {
    let weak = Arc::downgrade(&shared);
    let on_value: ValueCallback = Arc::new(move |raw| {
        if let Some(shared) = weak.upgrade() {
            let _ = shared.deliver(raw);
        }
    });

    let descriptor = &shared.descriptor;
    match source
        .subscribe(descriptor.name(), descriptor.params(), on_value)
        .await
    {
        Ok(handle) => shared.attach(handle),
        Err(error) => shared.fail(&error),
    }
}

async fn run_one_shot(shared: Arc<Shared>, source: Arc<dyn ChainDataSource>) {
    let descriptor = &shared.descriptor;
    match source.call(descriptor.name(), descriptor.params()).await {
        Ok(value) => {
            if shared.deliver(value).is_ok() {
                shared.settle();
            }
        }
        Err(error) => shared.fail(&error),
    }
}

async fn run_poll(shared: Arc<Shared>, source: Arc<dyn ChainDataSource>, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        if shared.is_closed() {
            break;
        }

        let descriptor = &shared.descriptor;
        match source.call(descriptor.name(), descriptor.params()).await {
            Ok(value) => {
                if shared.deliver(value).is_err() {
                    break;
                }
                shared.settle();
            }
            // Polling keeps going; the next tick may succeed.
            Err(error) => shared.record_failure(&error),
        }
    }
}
