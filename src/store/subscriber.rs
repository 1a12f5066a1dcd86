use super::state::State;

/// A handle that receives state slices from a store.
///
/// `render` is called on every notification. `set_state` is called once
/// at subscription time by stores that prime new subscribers
/// (see [`PrimeAndRender`](crate::PrimeAndRender)).
pub trait Subscriber: Send + Sync {
    /// Receive the slice after a state change.
    fn render(&self, selected: &State);

    /// Receive the current slice when subscribing to a priming store.
    fn set_state(&self, selected: &State);
}

/// Closures act as subscribers; both capabilities call the closure.
impl<F> Subscriber for F
where
    F: Fn(&State) + Send + Sync,
{
    fn render(&self, selected: &State) {
        self(selected)
    }

    fn set_state(&self, selected: &State) {
        self(selected)
    }
}
