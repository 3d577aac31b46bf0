//! Data binder: the consumer-facing entry point.
//!
//! A [`DataBinder`] is constructed with the chain data source it reads from
//! and hands out sessions:
//!
//! - [`DataBinder::bind`] for a single source, bound once
//! - [`DataBinder::bind_all`] for a fixed-size list of sources, each with its
//!   own independent session

mod fan_out;

pub use fan_out::Bindings;

use std::sync::Arc;

use log::debug;

use crate::config::BinderConfig;
use crate::models::SourceDescriptor;
use crate::session::BinderSession;
use crate::source::ChainDataSource;

/// Binds named chain data sources to normalized values.
#[derive(Clone)]
pub struct DataBinder {
    source: Arc<dyn ChainDataSource>,
    config: BinderConfig,
}

impl DataBinder {
    /// Create a binder with default configuration.
    pub fn new(source: Arc<dyn ChainDataSource>) -> Self {
        Self::with_config(source, BinderConfig::default())
    }

    /// Create a binder with custom configuration.
    pub fn with_config(source: Arc<dyn ChainDataSource>, config: BinderConfig) -> Self {
        debug!(
            "Data binder for {} (poll every {:?})",
            config.active_endpoint().ws_url,
            config.poll_interval
        );
        Self { source, config }
    }

    pub fn config(&self) -> &BinderConfig {
        &self.config
    }

    /// Shared handle to the underlying source.
    pub fn source(&self) -> Arc<dyn ChainDataSource> {
        self.source.clone()
    }

    /// Open a session for one descriptor.
    ///
    /// The session is bound once; to follow a different descriptor, drop it
    /// and bind again.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime.
    pub fn bind(&self, descriptor: impl Into<SourceDescriptor>) -> BinderSession {
        let session = BinderSession::new(
            descriptor.into(),
            self.source.clone(),
            self.config.poll_interval,
        );
        session.open();
        session
    }

    /// Open one independent session per descriptor.
    ///
    /// The number of descriptors is part of the type, so it cannot change
    /// for the lifetime of the returned [`Bindings`].
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime.
    pub fn bind_all<const N: usize>(&self, descriptors: [SourceDescriptor; N]) -> Bindings<N> {
        Bindings::new(descriptors.map(|descriptor| self.bind(descriptor)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BoundValue, SourceOptions};
    use crate::session::SessionState;
    use crate::source::MockChainSource;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_bind_uses_descriptor_params() {
        let source = MockChainSource::new();
        source.respond_with("getFreeBalance", 1_000_000u128);
        let binder = DataBinder::new(Arc::new(source.clone()));

        let session = binder.bind((
            "getFreeBalance",
            SourceOptions::one_shot().with_param("5Alice"),
        ));

        assert_eq!(session.changed().await, Some(BoundValue::from("1000000")));
        assert_eq!(
            source.last_params("getFreeBalance"),
            Some(vec![serde_json::json!("5Alice")])
        );
    }

    #[tokio::test]
    async fn test_bind_all_is_index_aligned() {
        let source = MockChainSource::new();
        source
            .respond_with("getEraLength", 2000u128)
            .respond_with("getSessionLength", 100u128);
        let binder = DataBinder::new(Arc::new(source.clone()));

        let bindings = binder.bind_all([
            SourceDescriptor::one_shot("getEraLength"),
            SourceDescriptor::one_shot("getSessionLength"),
            SourceDescriptor::from("getValidators"),
        ]);
        assert_eq!(bindings.len(), 3);
        assert_eq!(bindings.values(), [None, None, None]);

        let mut updates = bindings.updates();
        let mut seen: Vec<usize> = Vec::new();
        while seen.len() < 2 {
            let (index, _) = updates.next().await.unwrap();
            seen.push(index);
        }
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1]);

        let [era, session, validators] = bindings.values();
        assert_eq!(era, Some(BoundValue::from("2000")));
        assert_eq!(session, Some(BoundValue::from("100")));
        assert_eq!(validators, None);
        assert_ne!(bindings[2].state(), SessionState::Closed);
    }
}
