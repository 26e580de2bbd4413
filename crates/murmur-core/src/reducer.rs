//! Reducer abstraction.

/// A pure state transition: prior state plus one event gives the next state.
///
/// Implementations take `self` by value so the prior state cannot be observed
/// half-updated, and have no side effects.
pub trait Reducer: Sized {
    /// Event consumed by this reducer.
    type Event;

    /// Produce the next state.
    #[must_use]
    fn reduce(self, event: Self::Event) -> Self;
}
