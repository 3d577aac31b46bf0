//! Binder session lifecycle.
//!
//! A session ties one source descriptor to one bound value slot and, for
//! subscriptions, to one cancel handle. States:
//!
//! - **Idle**: created, nothing invoked.
//! - **Opening**: call or subscribe in flight.
//! - **Active**: subscription open, or a result received.
//! - **Closed**: torn down; later deliveries are discarded.
//!
//! Closing while still `Opening` is tracked: the cancel handle is released
//! the moment the source resolves instead of being stored.

mod lifecycle;
mod metrics;
mod state;

pub use lifecycle::BinderSession;
pub use metrics::SessionMetrics;
pub use state::SessionState;
