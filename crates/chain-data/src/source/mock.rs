//! Scriptable in-memory chain data source.
//!
//! Useful for tests and for views that need a source before a node is
//! reachable. Values are scripted per source name; subscriptions receive
//! whatever is [`publish`](MockChainSource::publish)ed to them.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use async_trait::async_trait;
use log::warn;
use tokio::sync::Semaphore;

use super::traits::{CancelHandle, ChainDataSource, ValueCallback};
use crate::errors::ChainDataError;
use crate::models::{Param, RawValue};

type CallResult = Result<Option<RawValue>, ChainDataError>;

struct Subscriber {
    id: u64,
    callback: ValueCallback,
}

#[derive(Default)]
struct MockState {
    /// Scripted one-shot results; the last one repeats.
    responses: HashMap<String, VecDeque<CallResult>>,
    /// Scripted subscribe failures.
    subscribe_errors: HashMap<String, ChainDataError>,
    /// Open subscriptions per source name.
    subscribers: HashMap<String, Vec<Subscriber>>,
    /// Held sources: invocations wait until the gate is released.
    gates: HashMap<String, Arc<Semaphore>>,
    /// Artificial latency per source name.
    delays: HashMap<String, Duration>,
    /// Required parameter count per source name.
    arity: HashMap<String, usize>,
    calls: HashMap<String, usize>,
    cancellations: HashMap<String, usize>,
    params: HashMap<String, Vec<Param>>,
    next_id: u64,
}

/// In-memory [`ChainDataSource`] with scripted responses.
#[derive(Clone, Default)]
pub struct MockChainSource {
    state: Arc<Mutex<MockState>>,
}

fn lock(state: &Mutex<MockState>) -> MutexGuard<'_, MockState> {
    state.lock().unwrap_or_else(|poisoned| {
        warn!("Mock chain source mutex was poisoned, recovering");
        poisoned.into_inner()
    })
}

impl MockChainSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        lock(&self.state)
    }

    /// Queue a one-shot result for `name`. The last queued result repeats.
    pub fn respond(&self, name: &str, result: CallResult) -> &Self {
        self.state()
            .responses
            .entry(name.to_string())
            .or_default()
            .push_back(result);
        self
    }

    /// Queue a present one-shot value for `name`.
    pub fn respond_with(&self, name: &str, value: impl Into<RawValue>) -> &Self {
        self.respond(name, Ok(Some(value.into())))
    }

    /// Make every subscribe to `name` fail with `error`.
    pub fn fail_subscribe(&self, name: &str, error: ChainDataError) -> &Self {
        self.state()
            .subscribe_errors
            .insert(name.to_string(), error);
        self
    }

    /// Hold invocations of `name` until [`release`](Self::release) is called.
    pub fn hold(&self, name: &str) -> &Self {
        self.state()
            .gates
            .insert(name.to_string(), Arc::new(Semaphore::new(0)));
        self
    }

    /// Let held and future invocations of `name` proceed.
    pub fn release(&self, name: &str) {
        if let Some(gate) = self.state().gates.remove(name) {
            gate.close();
        }
    }

    /// Delay every invocation of `name` by `latency`.
    pub fn delay(&self, name: &str, latency: Duration) -> &Self {
        self.state().delays.insert(name.to_string(), latency);
        self
    }

    /// Reject invocations of `name` that do not pass exactly `count` params.
    pub fn expect_params(&self, name: &str, count: usize) -> &Self {
        self.state().arity.insert(name.to_string(), count);
        self
    }

    /// Deliver `value` to every open subscription of `name`.
    ///
    /// Returns the number of subscriptions reached.
    pub fn publish(&self, name: &str, value: Option<RawValue>) -> usize {
        let callbacks: Vec<ValueCallback> = self
            .state()
            .subscribers
            .get(name)
            .map(|subs| subs.iter().map(|s| s.callback.clone()).collect())
            .unwrap_or_default();

        for callback in &callbacks {
            callback(value.clone());
        }
        callbacks.len()
    }

    /// Number of call/subscribe invocations of `name`.
    pub fn call_count(&self, name: &str) -> usize {
        self.state().calls.get(name).copied().unwrap_or(0)
    }

    /// Number of cancellations released for `name`.
    pub fn cancel_count(&self, name: &str) -> usize {
        self.state().cancellations.get(name).copied().unwrap_or(0)
    }

    /// Number of subscriptions of `name` currently open.
    pub fn subscriber_count(&self, name: &str) -> usize {
        self.state().subscribers.get(name).map_or(0, Vec::len)
    }

    /// Parameters of the last invocation of `name`.
    pub fn last_params(&self, name: &str) -> Option<Vec<Param>> {
        self.state().params.get(name).cloned()
    }

    fn record(&self, name: &str, params: &[Param]) -> (Option<Arc<Semaphore>>, Option<Duration>) {
        let mut state = self.state();
        *state.calls.entry(name.to_string()).or_insert(0) += 1;
        state.params.insert(name.to_string(), params.to_vec());
        (state.gates.get(name).cloned(), state.delays.get(name).copied())
    }

    fn check_params(state: &MockState, name: &str, params: &[Param]) -> Result<(), ChainDataError> {
        match state.arity.get(name) {
            Some(&count) if count != params.len() => Err(ChainDataError::invalid_params(
                name,
                format!("expected {} params, got {}", count, params.len()),
            )),
            _ => Ok(()),
        }
    }

    async fn wait(gate: Option<Arc<Semaphore>>, delay: Option<Duration>) {
        if let Some(gate) = gate {
            // A closed semaphore is the release signal.
            let _ = gate.acquire().await;
        }
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

fn cancel_subscriber(state: Weak<Mutex<MockState>>, name: String, id: u64) {
    let Some(state) = state.upgrade() else {
        return;
    };
    let mut state = lock(&state);
    if let Some(subs) = state.subscribers.get_mut(&name) {
        subs.retain(|s| s.id != id);
    }
    *state.cancellations.entry(name).or_insert(0) += 1;
}

#[async_trait]
impl ChainDataSource for MockChainSource {
    async fn call(&self, name: &str, params: &[Param]) -> CallResult {
        let (gate, delay) = self.record(name, params);
        Self::wait(gate, delay).await;

        let mut state = self.state();
        Self::check_params(&state, name, params)?;
        match state.responses.get_mut(name) {
            Some(queue) if queue.len() > 1 => queue
                .pop_front()
                .unwrap_or_else(|| Err(ChainDataError::UnknownSource(name.to_string()))),
            Some(queue) => queue
                .front()
                .cloned()
                .unwrap_or_else(|| Err(ChainDataError::UnknownSource(name.to_string()))),
            None => Err(ChainDataError::UnknownSource(name.to_string())),
        }
    }

    async fn subscribe(
        &self,
        name: &str,
        params: &[Param],
        on_value: ValueCallback,
    ) -> Result<CancelHandle, ChainDataError> {
        let (gate, delay) = self.record(name, params);
        Self::wait(gate, delay).await;

        let mut state = self.state();
        Self::check_params(&state, name, params)?;
        if let Some(error) = state.subscribe_errors.get(name) {
            return Err(error.clone());
        }

        let id = state.next_id;
        state.next_id += 1;
        state
            .subscribers
            .entry(name.to_string())
            .or_default()
            .push(Subscriber {
                id,
                callback: on_value,
            });

        let weak = Arc::downgrade(&self.state);
        let name = name.to_string();
        Ok(CancelHandle::new(move || cancel_subscriber(weak, name, id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_scripted_responses_repeat_last() {
        let source = MockChainSource::new();
        source
            .respond_with("getEraProgress", 1u128)
            .respond_with("getEraProgress", 2u128);

        let first = source.call("getEraProgress", &[]).await.unwrap();
        let second = source.call("getEraProgress", &[]).await.unwrap();
        let third = source.call("getEraProgress", &[]).await.unwrap();

        assert_eq!(first, Some(RawValue::LargeInteger(1)));
        assert_eq!(second, Some(RawValue::LargeInteger(2)));
        assert_eq!(third, Some(RawValue::LargeInteger(2)));
        assert_eq!(source.call_count("getEraProgress"), 3);
    }

    #[tokio::test]
    async fn test_unknown_source_is_rejected() {
        let source = MockChainSource::new();
        let result = source.call("getNothing", &[]).await;
        assert_eq!(
            result,
            Err(ChainDataError::UnknownSource("getNothing".to_string()))
        );
    }

    #[tokio::test]
    async fn test_publish_and_cancel() {
        let source = MockChainSource::new();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        let callback: ValueCallback = Arc::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let handle = source
            .subscribe("getValidators", &[Param::from("0xABC")], callback)
            .await
            .unwrap();
        assert_eq!(source.subscriber_count("getValidators"), 1);
        assert_eq!(
            source.last_params("getValidators"),
            Some(vec![Param::from("0xABC")])
        );

        assert_eq!(source.publish("getValidators", None), 1);
        handle.cancel();

        assert_eq!(source.publish("getValidators", None), 0);
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(source.cancel_count("getValidators"), 1);
    }

    #[tokio::test]
    async fn test_wrong_param_count_is_invalid() {
        let source = MockChainSource::new();
        source
            .respond_with("getFreeBalance", 10u128)
            .expect_params("getFreeBalance", 1);

        let result = source.call("getFreeBalance", &[]).await;
        assert_eq!(
            result,
            Err(ChainDataError::invalid_params(
                "getFreeBalance",
                "expected 1 params, got 0"
            ))
        );

        let result = source.call("getFreeBalance", &[Param::from("5Alice")]).await;
        assert_eq!(result, Ok(Some(RawValue::LargeInteger(10))));
    }
}
