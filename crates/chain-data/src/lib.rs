//! Odin Chain Data Crate
//!
//! Binds named chain data sources (era progress, validator lists, balances,
//! validator preferences) to normalized values the wallet views render.
//!
//! # Overview
//!
//! A source is either called once, polled on an interval, or subscribed to.
//! Every delivered value is normalized and stored in a session's bound value
//! slot. Sessions guarantee that a subscription is released exactly once,
//! even when the view goes away before the subscription has finished
//! opening.
//!
//! # Architecture
//!
//! ```text
//! +------------------+     +--------------------+
//! |    DataBinder    | --> | SourceDescriptor   |  (name + params + mode)
//! +------------------+     +--------------------+
//!          |
//!          v
//! +------------------+     +--------------------+
//! |  BinderSession   | --> |  ChainDataSource   |  (injected SDK capability)
//! +------------------+     +--------------------+
//!          |                         |
//!          |                         v
//!          |               +--------------------+
//!          |               |     RawValue       |  (tagged at the boundary)
//!          |               +--------------------+
//!          |                         |
//!          v                         v
//! +------------------+     +--------------------+
//! |   BoundValue     | <-- |    normalize()     |
//! +------------------+     +--------------------+
//! ```
//!
//! # Core Types
//!
//! - [`DataBinder`] - Hands out sessions for descriptors
//! - [`BinderSession`] - One descriptor, one bound value, at most one subscription
//! - [`Bindings`] - Fixed-size fan-out of independent sessions
//! - [`ChainDataSource`] - The capability the binder reads from
//! - [`ConnectivityMonitor`] - Latency probe publishing a [`SignalLevel`]

pub mod binder;
pub mod config;
pub mod connectivity;
pub mod errors;
pub mod models;
pub mod normalizer;
pub mod session;
pub mod source;

// Re-export all public types from models
pub use models::{
    BoundValue, Param, RawScalar, RawValue, SourceDescriptor, SourceMode, SourceName,
    SourceOptions, ValidatorPrefs,
};

pub use binder::{Bindings, DataBinder};
pub use config::{BinderConfig, ConnectivityConfig, Endpoint, Endpoints, Network, SignalThresholds};
pub use connectivity::{ConnectivityMonitor, SignalLevel};
pub use errors::{ChainDataError, FailureClass};
pub use normalizer::{normalize, Normalized};
pub use session::{BinderSession, SessionMetrics, SessionState};
pub use source::{CancelHandle, ChainDataSource, MockChainSource, ValueCallback};
