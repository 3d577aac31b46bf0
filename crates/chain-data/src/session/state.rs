use std::fmt;

use crate::source::CancelHandle;

/// Observable lifecycle state of a binder session.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SessionState {
    /// Created, nothing invoked yet.
    Idle,
    /// Waiting for the source to resolve the call or subscription.
    Opening,
    /// Subscription open, or one-shot/poll result received.
    Active,
    /// Torn down; every later delivery is discarded.
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Opening => write!(f, "Opening"),
            Self::Active => write!(f, "Active"),
            Self::Closed => write!(f, "Closed"),
        }
    }
}

/// Internal phase. Only `Active` can own a cancel handle, so a session never
/// holds more than one.
#[derive(Debug)]
pub(crate) enum Phase {
    Idle,
    Opening,
    Active(Option<CancelHandle>),
    Closed,
}

impl Phase {
    pub(crate) fn state(&self) -> SessionState {
        match self {
            Self::Idle => SessionState::Idle,
            Self::Opening => SessionState::Opening,
            Self::Active(_) => SessionState::Active,
            Self::Closed => SessionState::Closed,
        }
    }
}
