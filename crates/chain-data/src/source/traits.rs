//! Chain data source trait definitions.
//!
//! This module defines the `ChainDataSource` trait: the capability a binder
//! is constructed with, standing in for the chain SDK.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::ChainDataError;
use crate::models::{Param, RawValue};

/// Callback a subscription invokes for every delivered value.
///
/// `None` means the source delivered an absent value.
pub type ValueCallback = Arc<dyn Fn(Option<RawValue>) + Send + Sync>;

/// Cancellation capability returned when a subscription opens.
///
/// Consumed on use, so it can be invoked at most once.
pub struct CancelHandle {
    cancel: Box<dyn FnOnce() + Send>,
}

impl CancelHandle {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Box::new(cancel),
        }
    }

    /// Release the subscription.
    pub fn cancel(self) {
        (self.cancel)()
    }
}

impl fmt::Debug for CancelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CancelHandle")
    }
}

/// Trait for chain data sources.
///
/// Implement this trait to expose a chain SDK to the binder. Source names
/// follow the SDK's `action + section` convention, e.g. `getEraLength`.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use odin_chain_data::source::{CancelHandle, ChainDataSource, ValueCallback};
///
/// struct RpcSource {
///     client: RpcClient,
/// }
///
/// #[async_trait]
/// impl ChainDataSource for RpcSource {
///     async fn call(&self, name: &str, params: &[Param]) -> Result<Option<RawValue>, ChainDataError> {
///         self.client.request(name, params).await
///     }
///
///     async fn subscribe(
///         &self,
///         name: &str,
///         params: &[Param],
///         on_value: ValueCallback,
///     ) -> Result<CancelHandle, ChainDataError> {
///         let id = self.client.subscribe(name, params, move |v| on_value(v)).await?;
///         let client = self.client.clone();
///         Ok(CancelHandle::new(move || client.unsubscribe(id)))
///     }
/// }
/// ```
#[async_trait]
pub trait ChainDataSource: Send + Sync {
    /// Invoke `name` once with `params`.
    ///
    /// # Returns
    ///
    /// The raw value, `None` if the source resolved with nothing, or a
    /// `ChainDataError` if the call was rejected.
    async fn call(&self, name: &str, params: &[Param]) -> Result<Option<RawValue>, ChainDataError>;

    /// Open a subscription to `name` with `params`.
    ///
    /// `on_value` may be invoked any number of times, from any task, in the
    /// order values are produced, and may already fire before this future
    /// resolves.
    ///
    /// # Returns
    ///
    /// The cancellation capability for the subscription, or a
    /// `ChainDataError` if it could not be opened.
    async fn subscribe(
        &self,
        name: &str,
        params: &[Param],
        on_value: ValueCallback,
    ) -> Result<CancelHandle, ChainDataError>;
}
