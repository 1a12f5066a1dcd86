use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

use super::delivery::{Delivery, PrimeAndRender, Unconfigured};
use super::state::{self, PropNames, State};
use super::subscriber::Subscriber;
use crate::error::{StoreError, StoreResult};

/// A named state transition.
///
/// Receives the store it was dispatched on and the dispatch arguments.
pub type Action = Arc<dyn Fn(&Store, &[Value]) -> StoreResult<()> + Send + Sync>;

#[derive(Clone)]
struct SubscriberEntry {
    target: Arc<dyn Subscriber>,
    props: PropNames,
}

/// A shared state container with named actions and sliced subscriptions.
///
/// Cloning a store yields another handle to the same state, actions and
/// subscribers.
///
/// # Examples
///
/// ```
/// use lego_store::{Store, StoreResult};
/// use serde_json::{json, Value};
///
/// let store = Store::builder()
///     .state_json(json!({ "count": 0 }))?
///     .action("increment", |store: &Store, _args: &[Value]| -> StoreResult<()> {
///         let count = store.get("count").and_then(|v| v.as_i64()).unwrap_or(0);
///         store.set_state(lego_store::from_value(json!({ "count": count + 1 }))?)
///     })
///     .build();
///
/// store.dispatch("increment", &[])?;
/// assert_eq!(store.get("count"), Some(json!(1)));
/// # Ok::<(), lego_store::StoreError>(())
/// ```
pub struct Store {
    state: Arc<RwLock<Arc<State>>>,
    actions: Arc<RwLock<HashMap<String, Action>>>,
    subscribers: Arc<RwLock<Vec<SubscriberEntry>>>,
    delivery: Arc<dyn Delivery>,
}

impl Store {
    /// Create a store that has no delivery strategy.
    ///
    /// Notifying any subscriber of such a store fails with
    /// [`StoreError::UnimplementedNotification`](crate::StoreError::UnimplementedNotification).
    pub fn new(initial: State) -> Self {
        Self::with_delivery(initial, Unconfigured)
    }

    /// Create a store that primes new subscribers and renders on change.
    pub fn priming(initial: State) -> Self {
        Self::with_delivery(initial, PrimeAndRender)
    }

    /// Create a store with an explicit delivery strategy.
    pub fn with_delivery(initial: State, delivery: impl Delivery + 'static) -> Self {
        Self {
            state: Arc::new(RwLock::new(Arc::new(initial))),
            actions: Arc::new(RwLock::new(HashMap::new())),
            subscribers: Arc::new(RwLock::new(Vec::new())),
            delivery: Arc::new(delivery),
        }
    }

    /// Create a store without a delivery strategy from a JSON object.
    pub fn from_json(initial: Value) -> StoreResult<Self> {
        Ok(Self::new(state::from_value(initial)?))
    }

    /// Start configuring a store.
    pub fn builder() -> StoreBuilder {
        StoreBuilder::default()
    }

    /// Register `action` under `name`, replacing any previous action.
    pub fn add_action<F>(&self, name: impl Into<String>, action: F)
    where
        F: Fn(&Store, &[Value]) -> StoreResult<()> + Send + Sync + 'static,
    {
        self.insert_action(name.into(), Arc::new(action));
    }

    fn insert_action(&self, name: String, action: Action) {
        let replaced = self.actions.write().insert(name.clone(), action).is_some();
        debug!(action = %name, replaced, "registered action");
    }

    /// Whether an action is registered under `name`.
    pub fn has_action(&self, name: &str) -> bool {
        self.actions.read().contains_key(name)
    }

    /// Names of all registered actions, sorted.
    pub fn action_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.actions.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Register `subscriber` for the keys named by `props`.
    ///
    /// The same subscriber may be registered more than once; each entry is
    /// notified independently.
    pub fn subscribe(&self, subscriber: Arc<dyn Subscriber>, props: impl Into<PropNames>) {
        let props = props.into();
        let entry = SubscriberEntry {
            target: subscriber,
            props,
        };
        let count = {
            let mut subscribers = self.subscribers.write();
            subscribers.push(entry.clone());
            subscribers.len()
        };
        debug!(props = ?entry.props, subscribers = count, "subscribed");

        let selected = self.selected_state(&entry.props);
        self.delivery.prime(entry.target.as_ref(), &selected);
    }

    /// Number of subscriber entries, duplicates included.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Current state snapshot.
    ///
    /// The snapshot never changes; later updates replace the store's
    /// mapping instead of mutating it.
    pub fn state(&self) -> Arc<State> {
        self.state.read().clone()
    }

    /// Clone of a single top-level value.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.state.read().get(key).cloned()
    }

    /// Project the current state onto `props`.
    pub fn selected_state(&self, props: &PropNames) -> State {
        state::select(&self.state(), props)
    }

    /// Shallow-merge `partial` into the state and notify every subscriber.
    ///
    /// The new state is kept even if a notification fails.
    pub fn set_state(&self, partial: State) -> StoreResult<()> {
        trace!(keys = ?partial.keys().collect::<Vec<_>>(), "set_state");
        {
            let mut current = self.state.write();
            let next = state::merge(&current, partial);
            *current = Arc::new(next);
        }
        self.notify()
    }

    fn notify(&self) -> StoreResult<()> {
        // Snapshot so that callbacks may subscribe without deadlocking.
        let subscribers = self.subscribers.read().clone();
        trace!(subscribers = subscribers.len(), "notifying");

        for SubscriberEntry { target, props } in &subscribers {
            let selected = self.selected_state(props);
            self.delivery.deliver(target.as_ref(), &selected)?;
            // Delivery may have dispatched, so select again.
            let selected = self.selected_state(props);
            target.render(&selected);
        }
        Ok(())
    }

    /// Run the action registered under `name` with `args`.
    ///
    /// Whatever the action returns is passed through unchanged.
    pub fn dispatch(&self, name: &str, args: &[Value]) -> StoreResult<()> {
        let action = self
            .actions
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::unknown_action(name))?;
        debug!(action = name, args = args.len(), "dispatch");
        action(self, args)
    }
}

impl Clone for Store {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            actions: Arc::clone(&self.actions),
            subscribers: Arc::clone(&self.subscribers),
            delivery: Arc::clone(&self.delivery),
        }
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(State::new())
    }
}

/// Configures initial state, actions and delivery for a [`Store`].
pub struct StoreBuilder {
    state: State,
    actions: Vec<(String, Action)>,
    delivery: Arc<dyn Delivery>,
}

impl Default for StoreBuilder {
    fn default() -> Self {
        Self {
            state: State::new(),
            actions: Vec::new(),
            delivery: Arc::new(Unconfigured),
        }
    }
}

impl StoreBuilder {
    /// Set the initial state.
    pub fn state(mut self, state: State) -> Self {
        self.state = state;
        self
    }

    /// Use a JSON object as the initial state.
    pub fn state_json(self, state: Value) -> StoreResult<Self> {
        Ok(self.state(state::from_value(state)?))
    }

    /// Add an action to register at build time.
    pub fn action<F>(mut self, name: impl Into<String>, action: F) -> Self
    where
        F: Fn(&Store, &[Value]) -> StoreResult<()> + Send + Sync + 'static,
    {
        self.actions.push((name.into(), Arc::new(action)));
        self
    }

    /// Add several prebuilt actions, in order.
    pub fn actions<I, K>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = (K, Action)>,
        K: Into<String>,
    {
        self.actions
            .extend(actions.into_iter().map(|(name, action)| (name.into(), action)));
        self
    }

    /// Set the delivery strategy; defaults to [`Unconfigured`].
    pub fn delivery(mut self, delivery: impl Delivery + 'static) -> Self {
        self.delivery = Arc::new(delivery);
        self
    }

    /// Build the store, registering every action in order.
    pub fn build(self) -> Store {
        let store = Store {
            state: Arc::new(RwLock::new(Arc::new(self.state))),
            actions: Arc::new(RwLock::new(HashMap::new())),
            subscribers: Arc::new(RwLock::new(Vec::new())),
            delivery: self.delivery,
        };
        for (name, action) in self.actions {
            store.insert_action(name, action);
        }
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn state(value: Value) -> State {
        state::from_value(value).unwrap()
    }

    #[derive(Default)]
    struct Recorder {
        renders: Mutex<Vec<Value>>,
        primes: Mutex<Vec<Value>>,
    }

    impl Subscriber for Recorder {
        fn render(&self, selected: &State) {
            self.renders.lock().push(Value::Object(selected.clone()));
        }

        fn set_state(&self, selected: &State) {
            self.primes.lock().push(Value::Object(selected.clone()));
        }
    }

    #[test]
    fn store_set_state_merges() {
        let store = Store::new(state(json!({ "count": 0, "name": "test" })));

        store.set_state(state(json!({ "count": 42 }))).unwrap();

        assert_eq!(store.get("count"), Some(json!(42)));
        assert_eq!(store.get("name"), Some(json!("test")));
    }

    #[test]
    fn store_snapshot_survives_update() {
        let store = Store::new(state(json!({ "count": 0 })));
        let before = store.state();

        store.set_state(state(json!({ "count": 1 }))).unwrap();

        assert_eq!(before["count"], json!(0));
        assert_eq!(store.state()["count"], json!(1));
    }

    #[test]
    fn add_action_overwrites() {
        let store = Store::default();
        let calls = Arc::new(AtomicUsize::new(0));

        store.add_action("bump", |_store: &Store, _args: &[Value]| Ok(()));
        let calls_clone = calls.clone();
        store.add_action("bump", move |_store: &Store, _args: &[Value]| {
            calls_clone.fetch_add(10, Ordering::SeqCst);
            Ok(())
        });

        store.dispatch("bump", &[]).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 10);
        assert_eq!(store.action_names(), vec!["bump"]);
    }

    #[test]
    fn dispatch_passes_arguments() {
        let store = Store::new(state(json!({ "total": 0 })));
        store.add_action("add", |store: &Store, args: &[Value]| {
            let total = store.get("total").and_then(|v| v.as_i64()).unwrap_or(0);
            let amount: i64 = args.iter().filter_map(Value::as_i64).sum();
            store.set_state(state::from_value(json!({ "total": total + amount }))?)
        });

        store.dispatch("add", &[json!(2), json!(3)]).unwrap();
        assert_eq!(store.get("total"), Some(json!(5)));
    }

    #[test]
    fn dispatch_unknown_action_leaves_state() {
        let store = Store::new(state(json!({ "count": 0 })));

        let err = store.dispatch("increment", &[]).unwrap_err();

        assert!(matches!(err, StoreError::UnknownAction { ref name } if name == "increment"));
        assert_eq!(store.get("count"), Some(json!(0)));
    }

    #[test]
    fn base_store_notification_is_unimplemented() {
        let store = Store::new(state(json!({ "count": 0 })));
        let recorder = Arc::new(Recorder::default());
        store.subscribe(recorder.clone(), ["count"]);

        let err = store.set_state(state(json!({ "count": 1 }))).unwrap_err();

        assert!(matches!(err, StoreError::UnimplementedNotification));
        assert_eq!(store.get("count"), Some(json!(1)));
        assert!(recorder.renders.lock().is_empty());
        assert!(recorder.primes.lock().is_empty());
    }

    #[test]
    fn base_store_without_subscribers_updates() {
        let store = Store::new(state(json!({ "count": 0 })));
        store.set_state(state(json!({ "count": 1 }))).unwrap();
        assert_eq!(store.get("count"), Some(json!(1)));
    }

    #[test]
    fn priming_store_primes_on_subscribe() {
        let store = Store::priming(state(json!({ "count": 1, "name": "x" })));
        let recorder = Arc::new(Recorder::default());

        store.subscribe(recorder.clone(), ["count"]);

        assert_eq!(*recorder.primes.lock(), vec![json!({ "count": 1 })]);
        assert!(recorder.renders.lock().is_empty());
    }

    #[test]
    fn priming_store_renders_twice_per_update() {
        let store = Store::priming(state(json!({ "count": 1, "name": "x" })));
        let recorder = Arc::new(Recorder::default());
        store.subscribe(recorder.clone(), json!({ "name": true }));

        store.set_state(state(json!({ "name": "y" }))).unwrap();

        assert_eq!(
            *recorder.renders.lock(),
            vec![json!({ "name": "y" }), json!({ "name": "y" })]
        );
    }

    #[test]
    fn custom_delivery_runs_before_render() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let delivery_order = order.clone();
        let store = Store::builder()
            .state(state(json!({ "count": 0 })))
            .delivery(move |_subscriber: &dyn Subscriber, _selected: &State| -> StoreResult<()> {
                delivery_order.lock().push("deliver");
                Ok(())
            })
            .build();
        let render_order = order.clone();
        store.subscribe(
            Arc::new(move |_selected: &State| render_order.lock().push("render")),
            ["count"],
        );

        store.set_state(state(json!({ "count": 1 }))).unwrap();

        assert_eq!(*order.lock(), vec!["deliver", "render"]);
    }

    #[test]
    fn builder_registers_every_action() {
        let noop: Action =
            Arc::new(|_store: &Store, _args: &[Value]| -> StoreResult<()> { Ok(()) });
        let store = Store::builder()
            .action("reset", |store: &Store, _args: &[Value]| {
                store.set_state(state::from_value(json!({ "count": 0 }))?)
            })
            .actions(vec![("noop", noop.clone()), ("other", noop)])
            .build();

        assert_eq!(store.action_names(), vec!["noop", "other", "reset"]);
        assert!(store.has_action("reset"));
        assert!(!store.has_action("missing"));
    }

    #[test]
    fn subscriber_added_mid_pass_waits_for_next_pass() {
        let store = Store::priming(state(json!({ "count": 0 })));
        let late = Arc::new(Recorder::default());
        let inner = store.clone();
        let late_clone = late.clone();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        store.subscribe(
            Arc::new(move |_selected: &State| {
                // Call 0 is the priming call, 1 the first delivery.
                if calls_clone.fetch_add(1, Ordering::SeqCst) == 1 {
                    inner.subscribe(late_clone.clone(), ["count"]);
                }
            }),
            ["count"],
        );

        store.set_state(state(json!({ "count": 1 }))).unwrap();

        assert_eq!(store.subscriber_count(), 2);
        assert_eq!(*late.primes.lock(), vec![json!({ "count": 1 })]);
        assert!(late.renders.lock().is_empty());

        store.set_state(state(json!({ "count": 2 }))).unwrap();

        assert_eq!(
            *late.renders.lock(),
            vec![json!({ "count": 2 }), json!({ "count": 2 })]
        );
    }

    #[test]
    fn failed_delivery_skips_later_subscribers() {
        let store = Store::builder()
            .state(state(json!({ "count": 0 })))
            .delivery(|_subscriber: &dyn Subscriber, selected: &State| -> StoreResult<()> {
                if selected.get("count") == Some(&json!(2)) {
                    return Err(StoreError::action("count 2 rejected"));
                }
                Ok(())
            })
            .build();
        let first = Arc::new(Recorder::default());
        let second = Arc::new(Recorder::default());
        store.subscribe(first.clone(), ["count"]);
        store.subscribe(second.clone(), ["count"]);

        store.set_state(state(json!({ "count": 1 }))).unwrap();
        let err = store.set_state(state(json!({ "count": 2 }))).unwrap_err();

        assert_eq!(err.to_string(), "action failed: count 2 rejected");
        assert_eq!(store.get("count"), Some(json!(2)));
        assert_eq!(*first.renders.lock(), vec![json!({ "count": 1 })]);
        assert_eq!(*second.renders.lock(), vec![json!({ "count": 1 })]);
    }

    #[test]
    fn subscribe_accepts_erased_handles() {
        let store = Store::priming(state(json!({ "count": 3 })));
        let recorder = Arc::new(Recorder::default());
        let handles: Vec<Arc<dyn Subscriber>> = vec![
            recorder.clone(),
            Arc::new(|_selected: &State| {}),
        ];

        for handle in handles {
            store.subscribe(handle, ["count"]);
        }

        assert_eq!(store.subscriber_count(), 2);
        assert_eq!(*recorder.primes.lock(), vec![json!({ "count": 3 })]);
    }
}
