/// Classification of binder failures.
///
/// Used to decide how a session reacts to an error from the chain data
/// source. Nothing in the binder is fatal: every class degrades to a stale
/// or absent bound value.
///
/// # Behavior Summary
///
/// | Class | Bound value | Logged as |
/// |-------|-------------|-----------|
/// | `Degraded` | Prior value kept | `warn` |
/// | `Discarded` | Untouched | `trace` |
/// | `Diagnostic` | Raw value stored | `warn` |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FailureClass {
    /// The call or subscription was rejected by the source.
    ///
    /// The session keeps whatever value it already had (or `None`).
    /// Surfacing the failure to the user is the consumer's job.
    Degraded,

    /// The event arrived after the session was closed.
    ///
    /// Expected race between teardown and the source, not a fault.
    Discarded,

    /// The value could not be classified but was still stored as-is.
    Diagnostic,
}
