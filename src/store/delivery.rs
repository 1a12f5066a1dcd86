//! Notification strategies.
//!
//! A [`Delivery`] decides how a selected slice reaches a subscriber beyond
//! the store's own unconditional `render` call, and whether new subscribers
//! are primed with their current slice.

use super::state::State;
use super::subscriber::Subscriber;
use crate::error::{StoreError, StoreResult};

/// How a store hands slices to its subscribers.
pub trait Delivery: Send + Sync {
    /// Called for every subscriber on every notification pass, before the
    /// store's own `render` call. An error aborts the pass.
    fn deliver(&self, subscriber: &dyn Subscriber, selected: &State) -> StoreResult<()>;

    /// Called once when a subscriber is registered.
    fn prime(&self, _subscriber: &dyn Subscriber, _selected: &State) {}
}

/// Default strategy: fails every delivery.
///
/// A store using it can hold state and run actions, but the first
/// notification with a subscriber present returns
/// [`StoreError::UnimplementedNotification`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Unconfigured;

impl Delivery for Unconfigured {
    fn deliver(&self, _subscriber: &dyn Subscriber, _selected: &State) -> StoreResult<()> {
        Err(StoreError::UnimplementedNotification)
    }
}

/// Primes subscribers through `set_state` and delivers through `render`.
///
/// Since the store always calls `render` after `deliver`, a subscriber sees
/// each slice twice per notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct PrimeAndRender;

impl Delivery for PrimeAndRender {
    fn deliver(&self, subscriber: &dyn Subscriber, selected: &State) -> StoreResult<()> {
        subscriber.render(selected);
        Ok(())
    }

    fn prime(&self, subscriber: &dyn Subscriber, selected: &State) {
        subscriber.set_state(selected);
    }
}

impl<F> Delivery for F
where
    F: Fn(&dyn Subscriber, &State) -> StoreResult<()> + Send + Sync,
{
    fn deliver(&self, subscriber: &dyn Subscriber, selected: &State) -> StoreResult<()> {
        self(subscriber, selected)
    }
}
