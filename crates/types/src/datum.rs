use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

/// The one value type stored in the root document.
///
/// A `Datum` is either a scalar string, a list of strings, a mapping from
/// string keys to further `Datum`s, or absent (the "not found" case, which
/// never appears inside a stored tree — only as the result of a read).
///
/// Singleton collapse: a `List` of length 1 is never constructed or
/// persisted; it collapses to its single element stored as `String`. Empty
/// `List`s and empty `Mapping`s are never stored as a value in a parent
/// mapping; the key is removed instead. Callers that build a `Datum`
/// programmatically should go through [`Datum::from_list`] and
/// [`Mapping::insert_collapsing`] to get this for free rather than
/// constructing variants directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Datum {
  String(String),
  List(Vec<String>),
  Mapping(Mapping),
}

pub type Mapping = IndexMap<String, Datum>;

impl Datum {
  pub fn empty_mapping() -> Self {
    Datum::Mapping(Mapping::new())
  }

  /// Builds a list value, applying singleton collapse: zero elements
  /// means "no value at all" (the caller must delete the key instead of
  /// storing this), one element collapses to a bare string.
  pub fn from_list(mut items: Vec<String>) -> Option<Self> {
    match items.len() {
      0 => None,
      1 => Some(Datum::String(items.pop().unwrap())),
      _ => Some(Datum::List(items)),
    }
  }

  pub fn as_mapping(&self) -> Option<&Mapping> {
    match self {
      Datum::Mapping(m) => Some(m),
      _ => None,
    }
  }

  pub fn as_mapping_mut(&mut self) -> Option<&mut Mapping> {
    match self {
      Datum::Mapping(m) => Some(m),
      _ => None,
    }
  }

  pub fn is_empty_container(&self) -> bool {
    match self {
      Datum::Mapping(m) => m.is_empty(),
      Datum::List(l) => l.is_empty(),
      Datum::String(_) => false,
    }
  }

  /// Every string this datum stands for, in order. A scalar yields one
  /// element, a list yields its elements, a mapping yields none (search
  /// and append treat mappings as non-matchable, non-appendable values).
  pub fn as_strings(&self) -> Vec<&str> {
    match self {
      Datum::String(s) => vec![s.as_str()],
      Datum::List(items) => items.iter().map(String::as_str).collect(),
      Datum::Mapping(_) => Vec::new(),
    }
  }

  /// Converts an arbitrary JSON value into a `Datum`, coercing scalars to
  /// their textual form at the leaves (numbers via canonical decimal,
  /// booleans as `true`/`false`, `null` as the literal string `null`).
  /// Returns `None` for a JSON value with no Datum representation (an
  /// empty array or empty object), mirroring invariant S.
  pub fn from_json(value: &Json) -> Option<Self> {
    match value {
      Json::Null => Some(Datum::String("null".to_string())),
      Json::Bool(b) => Some(Datum::String(b.to_string())),
      Json::Number(n) => Some(Datum::String(n.to_string())),
      Json::String(s) => Some(Datum::String(s.clone())),
      Json::Array(items) => {
        let strings: Vec<String> = items.iter().filter_map(scalar_to_string).collect();
        Datum::from_list(strings)
      }
      Json::Object(obj) => {
        let mut mapping = Mapping::new();
        for (k, v) in obj {
          if let Some(child) = Datum::from_json(v) {
            mapping.insert(k.clone(), child);
          }
        }
        if mapping.is_empty() {
          None
        } else {
          Some(Datum::Mapping(mapping))
        }
      }
    }
  }
}

fn scalar_to_string(value: &Json) -> Option<String> {
  match value {
    Json::Null => Some("null".to_string()),
    Json::Bool(b) => Some(b.to_string()),
    Json::Number(n) => Some(n.to_string()),
    Json::String(s) => Some(s.clone()),
    // Nested arrays/objects inside a --set list payload have no scalar
    // form; they are dropped rather than guessed at.
    _ => None,
  }
}

/// Inserts `value` under `key`, applying invariant S: inserting an empty
/// container removes the key instead of storing it.
pub fn insert_collapsing(mapping: &mut Mapping, key: String, value: Datum) {
  if value.is_empty_container() {
    mapping.shift_remove(&key);
  } else {
    mapping.insert(key, value);
  }
}
