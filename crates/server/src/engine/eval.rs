use apocrypha_types::{insert_collapsing, Datum, Mapping};
use serde_json::Value as Json;

use super::error::EngineError;

/// Reads the value at `path` without mutating anything. Returns `Ok(None)`
/// for an absent path and `Err(NotAMapping)` if a non-terminal segment
/// resolves to something other than a mapping.
pub fn resolve<'a>(root: &'a Mapping, path: &[String]) -> Result<Option<&'a Datum>, EngineError> {
  let mut map = root;
  for (i, key) in path.iter().enumerate() {
    match map.get(key) {
      None => return Ok(None),
      Some(datum) => {
        if i + 1 == path.len() {
          return Ok(Some(datum));
        }
        match datum {
          Datum::Mapping(child) => map = child,
          _ => return Err(EngineError::NotAMapping),
        }
      }
    }
  }
  Ok(None)
}

/// Walks `path`'s ancestors, creating missing mappings along the way
/// (autovivification), and returns the direct parent mapping of the leaf
/// key. Errors, without mutating, if an existing ancestor is not a
/// mapping. Safe for validate-before-mutate: any insertion only happens
/// for segments that did not previously exist, so an ancestor that turns
/// out to have the wrong type is always detected before anything is
/// created past it.
pub fn autoviv_parent<'a>(
  root: &'a mut Mapping,
  path: &[String],
) -> Result<(&'a mut Mapping, &'a str), EngineError> {
  let (leaf, ancestors) = path.split_last().ok_or(EngineError::EmptyPath)?;
  let mut map = root;
  for key in ancestors {
    let existed = map.contains_key(key);
    if existed {
      match map.get(key).unwrap() {
        Datum::Mapping(_) => {}
        _ => return Err(EngineError::NotAMapping),
      }
    } else {
      map.insert(key.clone(), Datum::empty_mapping());
    }
    map = match map.get_mut(key).unwrap() {
      Datum::Mapping(child) => child,
      _ => unreachable!("checked above"),
    };
  }
  Ok((map, leaf.as_str()))
}

/// Assigns `values` at `path`, autovivifying ancestors. Zero values
/// deletes the leaf (pruning empty ancestors), matching `=`'s
/// equivalence to `--del`.
pub fn assign(root: &mut Mapping, path: &[String], values: Vec<String>) -> Result<(), EngineError> {
  if values.is_empty() {
    return delete(root, path);
  }
  let (parent, leaf) = autoviv_parent(root, path)?;
  let datum = Datum::from_list(values).expect("non-empty values");
  parent.insert(leaf.to_string(), datum);
  Ok(())
}

/// Appends `values` onto the leaf at `path`. An absent leaf behaves like
/// `assign`. A string leaf becomes a list; a list leaf is extended; a
/// mapping leaf is an error.
pub fn append(root: &mut Mapping, path: &[String], values: Vec<String>) -> Result<(), EngineError> {
  let current = resolve(root, path)?;
  let new_items: Vec<String> = match current {
    None => values,
    Some(Datum::String(s)) => {
      let mut items = vec![s.clone()];
      items.extend(values);
      items
    }
    Some(Datum::List(items)) => {
      let mut items = items.clone();
      items.extend(values);
      items
    }
    Some(Datum::Mapping(_)) => return Err(EngineError::AppendToDict),
  };
  let (parent, leaf) = autoviv_parent(root, path)?;
  let datum = Datum::from_list(new_items).expect("append always yields at least one value");
  parent.insert(leaf.to_string(), datum);
  Ok(())
}

/// Removes every occurrence of every value in `values` from the leaf at
/// `path`. Validates that all values are present before mutating
/// anything; applies invariant S to the remainder, pruning the leaf (and
/// any ancestor left empty as a result) via `delete` when nothing is left.
pub fn remove(root: &mut Mapping, path: &[String], values: Vec<String>) -> Result<(), EngineError> {
  let current = resolve(root, path)?;
  match current {
    Some(Datum::List(items)) => {
      for v in &values {
        if !items.contains(v) {
          return Err(EngineError::ValueNotFound);
        }
      }
      let remaining: Vec<String> = items
        .iter()
        .filter(|item| !values.contains(item))
        .cloned()
        .collect();
      match Datum::from_list(remaining) {
        Some(datum) => {
          let (parent, leaf) = autoviv_parent(root, path)?;
          parent.insert(leaf.to_string(), datum);
        }
        None => delete(root, path)?,
      }
      Ok(())
    }
    Some(Datum::String(s)) => {
      if values.len() == 1 && values[0] == *s {
        delete(root, path)
      } else {
        Err(EngineError::ValueNotFound)
      }
    }
    Some(Datum::Mapping(_)) => Err(EngineError::RemoveFromDict),
    None => Err(EngineError::ValueNotFound),
  }
}

/// Deletes the leaf at `path` from its parent mapping, then recursively
/// prunes any ancestor that becomes empty as a result (never the root
/// itself). A path with no value at it is a silent no-op.
pub fn delete(root: &mut Mapping, path: &[String]) -> Result<(), EngineError> {
  if path.is_empty() {
    return Err(EngineError::EmptyPath);
  }
  del_recursive(root, path)
}

fn del_recursive(map: &mut Mapping, path: &[String]) -> Result<(), EngineError> {
  let key = &path[0];
  if path.len() == 1 {
    map.shift_remove(key);
    return Ok(());
  }
  match map.get_mut(key) {
    Some(Datum::Mapping(child)) => {
      del_recursive(child, &path[1..])?;
      if child.is_empty() {
        map.shift_remove(key);
      }
      Ok(())
    }
    Some(_) => Err(EngineError::NotAMapping),
    None => Ok(()),
  }
}

/// Parses `json_text` and replaces the leaf at `path` with it, coercing
/// JSON scalars to their textual form. A value with no Datum
/// representation (empty array/object) deletes the leaf instead.
pub fn set(root: &mut Mapping, path: &[String], json_text: &str) -> Result<(), EngineError> {
  let value: Json = serde_json::from_str(json_text).map_err(|_| EngineError::MalformedJson)?;
  match Datum::from_json(&value) {
    None => delete(root, path),
    Some(datum) => {
      let (parent, leaf) = autoviv_parent(root, path)?;
      insert_collapsing(parent, leaf.to_string(), datum);
      Ok(())
    }
  }
}

/// Returns the keys of the mapping at `path`, in insertion order.
pub fn keys(root: &Mapping, path: &[String]) -> Result<Vec<String>, EngineError> {
  match resolve(root, path)? {
    Some(Datum::Mapping(m)) => Ok(m.keys().cloned().collect()),
    _ => Err(EngineError::NotAMapping),
  }
}

/// Depth-first, insertion-order search for `target` across the whole
/// document. A mapping entry matches if its value is the target string,
/// or a list containing it. Every match is reported as the full path
/// (root-relative key sequence) to that entry, and the walk continues
/// into mapping-valued children regardless of whether the entry matched.
pub fn search(root: &Mapping, target: &str) -> Vec<Vec<String>> {
  let mut hits = Vec::new();
  search_into(root, target, &mut Vec::new(), &mut hits);
  hits
}

fn search_into(map: &Mapping, target: &str, prefix: &mut Vec<String>, hits: &mut Vec<Vec<String>>) {
  for (key, value) in map.iter() {
    prefix.push(key.clone());
    let matches = match value {
      Datum::String(s) => s == target,
      Datum::List(items) => items.iter().any(|s| s == target),
      Datum::Mapping(_) => false,
    };
    if matches {
      hits.push(prefix.clone());
    }
    if let Datum::Mapping(child) = value {
      search_into(child, target, prefix, hits);
    }
    prefix.pop();
  }
}
