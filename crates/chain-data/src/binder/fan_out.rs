use std::ops::Index;

use futures::future;
use futures::stream::{self, BoxStream, StreamExt};
use tokio_stream::wrappers::WatchStream;

use crate::models::BoundValue;
use crate::session::BinderSession;

/// A fixed-size group of independent sessions, index-aligned with the
/// descriptors they were bound from.
///
/// Dropping the group closes every session in it.
#[derive(Debug)]
pub struct Bindings<const N: usize> {
    sessions: [BinderSession; N],
}

impl<const N: usize> Bindings<N> {
    pub(crate) fn new(sessions: [BinderSession; N]) -> Self {
        Self { sessions }
    }

    pub fn len(&self) -> usize {
        N
    }

    pub fn is_empty(&self) -> bool {
        N == 0
    }

    /// Snapshot of every bound value, in descriptor order.
    pub fn values(&self) -> [Option<BoundValue>; N] {
        std::array::from_fn(|index| self.sessions[index].value())
    }

    pub fn get(&self, index: usize) -> Option<&BinderSession> {
        self.sessions.get(index)
    }

    pub fn sessions(&self) -> &[BinderSession; N] {
        &self.sessions
    }

    /// Stream of `(index, value)` pairs as sessions update.
    ///
    /// Updates of one session arrive in order; there is no ordering across
    /// sessions. Only changes after this call are yielded. The stream ends
    /// once every session has been dropped.
    pub fn updates(&self) -> BoxStream<'static, (usize, BoundValue)> {
        let streams = self.sessions.iter().enumerate().map(|(index, session)| {
            WatchStream::from_changes(session.watch())
                .filter_map(move |value| future::ready(value.map(|value| (index, value))))
                .boxed()
        });
        stream::select_all(streams).boxed()
    }

    /// Close every session. Idempotent.
    pub fn close_all(&self) {
        for session in &self.sessions {
            session.close();
        }
    }
}

impl<const N: usize> Index<usize> for Bindings<N> {
    type Output = BinderSession;

    fn index(&self, index: usize) -> &Self::Output {
        &self.sessions[index]
    }
}
