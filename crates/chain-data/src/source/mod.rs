//! Chain data source abstractions.
//!
//! This module contains:
//! - The `ChainDataSource` trait the binder is constructed with
//! - The `CancelHandle` capability returned by subscriptions
//! - `MockChainSource`, a scriptable in-memory implementation

pub mod mock;
mod traits;

// Re-exports
pub use mock::MockChainSource;
pub use traits::{CancelHandle, ChainDataSource, ValueCallback};
