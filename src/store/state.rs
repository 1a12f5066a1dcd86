use serde_json::{Map, Value};

use crate::error::{StoreError, StoreResult};

/// A flat mapping from top-level keys to arbitrary JSON values.
pub type State = Map<String, Value>;

/// Ordered list of state keys a subscriber is interested in.
///
/// Built from either a sequence of names or a mapping whose keys are used
/// (the mapping's values are ignored).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PropNames(Vec<String>);

impl PropNames {
    /// An empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Names in request order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of names, duplicates included.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no names were requested.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume the list into its names.
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<Vec<String>> for PropNames {
    fn from(names: Vec<String>) -> Self {
        Self(names)
    }
}

impl From<Vec<&str>> for PropNames {
    fn from(names: Vec<&str>) -> Self {
        Self(names.into_iter().map(str::to_owned).collect())
    }
}

impl From<&[&str]> for PropNames {
    fn from(names: &[&str]) -> Self {
        Self(names.iter().map(|name| (*name).to_owned()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for PropNames {
    fn from(names: [&str; N]) -> Self {
        Self(names.iter().map(|name| (*name).to_owned()).collect())
    }
}

impl From<&State> for PropNames {
    fn from(props: &State) -> Self {
        Self(props.keys().cloned().collect())
    }
}

impl From<State> for PropNames {
    fn from(props: State) -> Self {
        Self::from(&props)
    }
}

impl From<&Value> for PropNames {
    fn from(props: &Value) -> Self {
        match props {
            Value::Object(map) => Self::from(map),
            Value::Array(items) => Self(
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_owned))
                    .collect(),
            ),
            _ => Self::default(),
        }
    }
}

impl From<Value> for PropNames {
    fn from(props: Value) -> Self {
        Self::from(&props)
    }
}

/// Project `state` onto `props`, in request order.
///
/// Names absent from `state` are skipped.
pub fn select(state: &State, props: &PropNames) -> State {
    props
        .iter()
        .filter_map(|prop| state.get(prop).map(|value| (prop.to_owned(), value.clone())))
        .collect()
}

/// Shallow merge: keys in `partial` win, every other key of `base` is kept.
pub fn merge(base: &State, partial: State) -> State {
    let mut next = base.clone();
    next.extend(partial);
    next
}

/// Convert a JSON value into a state mapping.
pub fn from_value(value: Value) -> StoreResult<State> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::NotAnObject {
            found: kind_of(&other),
        }),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
