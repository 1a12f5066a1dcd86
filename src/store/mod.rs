//! The state store.
//!
//! A [`Store`] holds a flat JSON mapping, a table of named actions that
//! update it, and an ordered list of subscribers. Every update pushes each
//! subscriber the slice of state it asked for, first through the store's
//! [`Delivery`] strategy and then through the subscriber's `render`.

mod delivery;
mod state;
mod store;
mod subscriber;

pub use delivery::{Delivery, PrimeAndRender, Unconfigured};
pub use state::{from_value, merge, select, PropNames, State};
pub use store::{Action, Store, StoreBuilder};
pub use subscriber::Subscriber;
