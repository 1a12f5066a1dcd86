//! # Lego Store
//!
//! A minimal publish/subscribe state store.
//!
//! - [`Store`] - holds a flat key-value state, named actions and subscribers
//! - [`Subscriber`] - a handle that receives the slice of state it asked for
//! - [`Delivery`] - how slices reach subscribers; [`PrimeAndRender`] also
//!   hands every new subscriber its current slice
//!
//! ```
//! use std::sync::Arc;
//! use lego_store::{State, Store, StoreResult};
//! use serde_json::{json, Value};
//!
//! let store = Store::priming(lego_store::from_value(json!({ "count": 0 }))?);
//! store.add_action("increment", |store: &Store, _args: &[Value]| -> StoreResult<()> {
//!     let count = store.get("count").and_then(|v| v.as_i64()).unwrap_or(0);
//!     store.set_state(lego_store::from_value(json!({ "count": count + 1 }))?)
//! });
//! store.subscribe(Arc::new(|selected: &State| println!("{selected:?}")), ["count"]);
//!
//! store.dispatch("increment", &[])?;
//! # Ok::<(), lego_store::StoreError>(())
//! ```

pub mod error;
pub mod store;

// Re-export main types for convenience
pub use error::{StoreError, StoreResult};
pub use store::{
    from_value, Action, Delivery, PrimeAndRender, PropNames, State, Store, StoreBuilder,
    Subscriber, Unconfigured,
};
