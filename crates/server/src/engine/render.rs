use apocrypha_types::{Datum, Mapping};
use serde_json::Value as Json;

/// Renders the result of an `index` query. Matches scenario 6 of the
/// acceptance corpus (`apple` -> `"{'pie': 'great'}\n"`): mappings use a
/// Python-dict-literal style with single-quoted keys and string values,
/// chosen because it is the one the test corpus exercises; everything
/// else is one element per line.
pub fn render_index(datum: Option<&Datum>) -> String {
  match datum {
    None => String::new(),
    Some(Datum::String(s)) => format!("{s}\n"),
    Some(Datum::List(items)) => {
      let mut out = items.join("\n");
      out.push('\n');
      out
    }
    Some(Datum::Mapping(m)) => format!("{}\n", render_mapping_literal(m)),
  }
}

fn render_mapping_literal(m: &Mapping) -> String {
  let mut out = String::from("{");
  for (i, (k, v)) in m.iter().enumerate() {
    if i > 0 {
      out.push_str(", ");
    }
    out.push('\'');
    out.push_str(&escape_single_quotes(k));
    out.push_str("': ");
    out.push_str(&render_value_literal(v));
  }
  out.push('}');
  out
}

fn render_value_literal(datum: &Datum) -> String {
  match datum {
    Datum::String(s) => format!("'{}'", escape_single_quotes(s)),
    Datum::List(items) => {
      let rendered: Vec<String> = items
        .iter()
        .map(|s| format!("'{}'", escape_single_quotes(s)))
        .collect();
      format!("[{}]", rendered.join(", "))
    }
    Datum::Mapping(m) => render_mapping_literal(m),
  }
}

fn escape_single_quotes(s: &str) -> String {
  s.replace('\'', "\\'")
}

/// Renders the result of a `--keys` query: one key per line, in the
/// order `eval::keys` returned them (insertion order).
pub fn render_keys_list(keys: &[String]) -> String {
  let mut out = String::new();
  for key in keys {
    out.push_str(key);
    out.push('\n');
  }
  out
}

/// Renders the result of a `--edit` query: compact JSON on one line.
pub fn render_edit(datum: Option<&Datum>) -> String {
  let json = datum.map(datum_to_json).unwrap_or(Json::Null);
  serde_json::to_string(&json).unwrap_or_else(|_| "null".to_string())
}

fn datum_to_json(datum: &Datum) -> Json {
  match datum {
    Datum::String(s) => Json::String(s.clone()),
    Datum::List(items) => Json::Array(items.iter().cloned().map(Json::String).collect()),
    Datum::Mapping(m) => {
      let obj = m
        .iter()
        .map(|(k, v)| (k.clone(), datum_to_json(v)))
        .collect();
      Json::Object(obj)
    }
  }
}

/// Renders the result of a `@` search: one path per line, each path its
/// space-joined keys from the root.
pub fn render_search_hits(hits: &[Vec<String>]) -> String {
  let mut out = String::new();
  for hit in hits {
    out.push_str(&hit.join(" "));
    out.push('\n');
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;
  use apocrypha_types::Mapping;

  #[test]
  fn renders_nested_mapping_with_single_quotes() {
    let mut m = Mapping::new();
    m.insert("pie".to_string(), Datum::String("great".to_string()));
    assert_eq!(render_index(Some(&Datum::Mapping(m))), "{'pie': 'great'}\n");
  }

  #[test]
  fn renders_list_one_per_line() {
    let d = Datum::List(vec!["spaghetti".into(), "lasagna".into()]);
    assert_eq!(render_index(Some(&d)), "spaghetti\nlasagna\n");
  }

  #[test]
  fn absent_index_is_empty() {
    assert_eq!(render_index(None), "");
  }

  #[test]
  fn edit_renders_compact_json() {
    let d = Datum::List(vec!["a".into(), "b".into()]);
    assert_eq!(render_edit(Some(&d)), r#"["a","b"]"#);
  }
}
