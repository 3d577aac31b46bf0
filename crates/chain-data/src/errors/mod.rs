//! Error types and failure classification for the chain data crate.
//!
//! This module provides:
//! - [`ChainDataError`]: The main error enum for all binder operations
//! - [`FailureClass`]: Classification for how a session degrades on error

mod class;

pub use class::FailureClass;

use thiserror::Error;

/// Errors that can occur while binding chain data.
///
/// Each variant is classified into a [`FailureClass`] via the
/// [`failure_class`](Self::failure_class) method.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainDataError {
    /// The source rejected a one-shot call.
    #[error("Call rejected: {source_name} - {message}")]
    Rejected {
        /// Name of the source that was called
        source_name: String,
        /// The rejection message from the source
        message: String,
    },

    /// The source could not open a subscription.
    #[error("Subscription failed: {source_name} - {message}")]
    SubscriptionFailed {
        /// Name of the source that was subscribed to
        source_name: String,
        /// The failure message from the source
        message: String,
    },

    /// The source does not know this name.
    #[error("Unknown source: {0}")]
    UnknownSource(String),

    /// The parameters do not match what the source expects.
    #[error("Invalid params for {source_name}: {message}")]
    InvalidParams {
        /// Name of the source that was invoked
        source_name: String,
        /// What was wrong with the parameters
        message: String,
    },

    /// The session was already closed when the event arrived.
    #[error("Session closed")]
    SessionClosed,
}

impl ChainDataError {
    /// Build a [`ChainDataError::Rejected`] for `source_name`.
    pub fn rejected(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Build a [`ChainDataError::SubscriptionFailed`] for `source_name`.
    pub fn subscription_failed(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SubscriptionFailed {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Build a [`ChainDataError::InvalidParams`] for `source_name`.
    pub fn invalid_params(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParams {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Returns the failure classification for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use odin_chain_data::errors::{ChainDataError, FailureClass};
    ///
    /// let error = ChainDataError::rejected("getEraLength", "node unreachable");
    /// assert_eq!(error.failure_class(), FailureClass::Degraded);
    ///
    /// assert_eq!(ChainDataError::SessionClosed.failure_class(), FailureClass::Discarded);
    /// ```
    pub fn failure_class(&self) -> FailureClass {
        match self {
            Self::Rejected { .. }
            | Self::SubscriptionFailed { .. }
            | Self::UnknownSource(_)
            | Self::InvalidParams { .. } => FailureClass::Degraded,

            Self::SessionClosed => FailureClass::Discarded,
        }
    }
}
