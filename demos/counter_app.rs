//! Counter application driven by named actions and sliced subscribers.
//!
//! Run with `RUST_LOG=lego_store=debug` to see store events.

use serde_json::{json, Value};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use lego_store::{from_value, State, Store, StoreError, StoreResult, Subscriber};

/// A view that prints whatever slice it is handed.
struct View {
    name: &'static str,
}

impl Subscriber for View {
    fn render(&self, selected: &State) {
        println!("   [{} render] {}", self.name, Value::Object(selected.clone()));
    }

    fn set_state(&self, selected: &State) {
        println!("   [{} initial] {}", self.name, Value::Object(selected.clone()));
    }
}

fn count_of(store: &Store) -> i64 {
    store.get("count").and_then(|v| v.as_i64()).unwrap_or(0)
}

fn step_of(store: &Store) -> i64 {
    store.get("step").and_then(|v| v.as_i64()).unwrap_or(1)
}

fn push_history(store: &Store, count: i64) -> StoreResult<()> {
    let mut history = store
        .get("history")
        .and_then(|v| v.as_array().cloned())
        .unwrap_or_default();
    history.push(json!(count));
    store.set_state(from_value(json!({ "count": count, "history": history }))?)
}

fn main() -> StoreResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Counter Application ===\n");

    println!("1. Initializing counter store");
    let store = Store::builder()
        .state_json(json!({ "count": 0, "step": 1, "history": [0] }))?
        .delivery(lego_store::PrimeAndRender)
        .action("increment", |store: &Store, _args: &[Value]| {
            push_history(store, count_of(store) + step_of(store))
        })
        .action("decrement", |store: &Store, _args: &[Value]| {
            push_history(store, count_of(store) - step_of(store))
        })
        .action("reset", |store: &Store, _args: &[Value]| push_history(store, 0))
        .action("set_step", |store: &Store, args: &[Value]| {
            let step = args
                .first()
                .and_then(Value::as_i64)
                .ok_or_else(|| StoreError::action("set_step expects an integer"))?;
            store.set_state(from_value(json!({ "step": step }))?)
        })
        .build();
    println!("   actions: {:?}", store.action_names());

    println!("\n2. Subscribing views");
    store.subscribe(Arc::new(View { name: "counter" }), ["count", "step"]);
    store.subscribe(Arc::new(View { name: "history" }), json!({ "history": true }));

    println!("\n3. Incrementing");
    store.dispatch("increment", &[])?;
    store.dispatch("increment", &[])?;

    println!("\n4. Changing step to 5");
    store.dispatch("set_step", &[json!(5)])?;
    store.dispatch("increment", &[])?;

    println!("\n5. Decrementing");
    store.dispatch("decrement", &[])?;

    println!("\n6. Bad input and unknown actions");
    if let Err(err) = store.dispatch("set_step", &[json!("five")]) {
        println!("   error: {err}");
    }
    if let Err(err) = store.dispatch("multiply", &[]) {
        println!("   error: {err}");
    }

    println!("\n7. Resetting");
    store.dispatch("reset", &[])?;

    println!("\nFinal state: {}", Value::Object(store.state().as_ref().clone()));
    println!("\n✓ Example complete!");
    Ok(())
}
