//! The query engine: parses a token list into an operator and dispatches
//! it against the root mapping. One entry point, [`evaluate`], is invoked
//! with exclusive access to the root for the query's full lifetime.

mod error;
mod eval;
mod parser;
mod render;

pub use error::EngineError;
pub use parser::{normalize_tokens, Op, ParsedQuery};

use apocrypha_types::Mapping;
use parser::parse;

/// The result of evaluating one query.
pub struct Evaluation {
  /// The textual response body (possibly empty).
  pub output: String,
  /// Whether this query mutated the root. Mutating queries, regardless
  /// of whether they also read, are never cached and always clear the
  /// cache and set the dirty flag.
  pub mutated: bool,
}

/// Evaluates `tokens` against `root`, which is `apocrypha_types::Mapping`
/// (itself an `IndexMap`), the mapping the root document owns directly.
///
/// Validate-before-mutate: every mutating handler below either checks
/// preconditions before touching `root`, or computes the new value before
/// performing the single insert/remove that applies it, so a returned
/// `Err` always means `root` is unchanged.
pub fn evaluate(tokens: &[String], root: &mut Mapping) -> Result<Evaluation, EngineError> {
  let query = parse(tokens)?;

  match query.op {
    Op::Index => {
      let datum = eval::resolve(root, &query.left)?;
      Ok(Evaluation {
        output: render::render_index(datum),
        mutated: false,
      })
    }
    Op::Assign => {
      eval::assign(root, &query.left, query.right)?;
      Ok(Evaluation {
        output: String::new(),
        mutated: true,
      })
    }
    Op::Append => {
      eval::append(root, &query.left, query.right)?;
      Ok(Evaluation {
        output: String::new(),
        mutated: true,
      })
    }
    Op::Remove => {
      eval::remove(root, &query.left, query.right)?;
      Ok(Evaluation {
        output: String::new(),
        mutated: true,
      })
    }
    Op::Search => {
      let target = &query.right[0];
      let hits = eval::search(root, target);
      Ok(Evaluation {
        output: render::render_search_hits(&hits),
        mutated: false,
      })
    }
    Op::Keys => {
      let keys = eval::keys(root, &query.left)?;
      Ok(Evaluation {
        output: render::render_keys_list(&keys),
        mutated: false,
      })
    }
    Op::Set => {
      eval::set(root, &query.left, &query.right[0])?;
      Ok(Evaluation {
        output: String::new(),
        mutated: true,
      })
    }
    Op::Edit => {
      let datum = eval::resolve(root, &query.left)?;
      Ok(Evaluation {
        output: format!("{}\n", render::render_edit(datum)),
        mutated: false,
      })
    }
    Op::Del => {
      eval::delete(root, &query.left)?;
      Ok(Evaluation {
        output: String::new(),
        mutated: true,
      })
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn toks(s: &str) -> Vec<String> {
    s.split_whitespace().map(String::from).collect()
  }

  fn run(root: &mut Mapping, s: &str) -> Evaluation {
    evaluate(&toks(s), root).unwrap()
  }

  #[test]
  fn scenario_apples_granny() {
    let mut root = Mapping::new();
    assert_eq!(run(&mut root, "apples granny = good").output, "");
    assert_eq!(run(&mut root, "apples").output, "{'granny': 'good'}\n");
    assert_eq!(run(&mut root, "apples granny").output, "good\n");
  }

  #[test]
  fn scenario_toppings_append() {
    let mut root = Mapping::new();
    run(&mut root, "toppings = mushrooms");
    run(&mut root, "toppings + pineapple");
    assert_eq!(run(&mut root, "toppings").output, "mushrooms\npineapple\n");
  }

  #[test]
  fn scenario_sweets_remove() {
    let mut root = Mapping::new();
    run(&mut root, "sweets = cake pie pizza");
    run(&mut root, "sweets - pizza");
    assert_eq!(run(&mut root, "sweets").output, "cake\npie\n");
  }

  #[test]
  fn scenario_search() {
    let mut root = Mapping::new();
    run(&mut root, "rasp = berry");
    run(&mut root, "blue = berry");
    assert_eq!(run(&mut root, "@ berry").output, "rasp\nblue\n");
  }

  #[test]
  fn scenario_set_json_list() {
    let mut root = Mapping::new();
    run(&mut root, r#"pasta --set ["spaghetti","lasagna"]"#);
    assert_eq!(run(&mut root, "pasta").output, "spaghetti\nlasagna\n");
  }

  #[test]
  fn scenario_del_prunes_to_sibling() {
    let mut root = Mapping::new();
    run(&mut root, "apple sauce = good");
    run(&mut root, "apple pie = great");
    run(&mut root, "apple sauce --del");
    assert_eq!(run(&mut root, "apple").output, "{'pie': 'great'}\n");
  }

  #[test]
  fn unknown_operator_like_token_is_just_a_path_segment() {
    // Tokens that are not recognized operators are literal keys/values,
    // so a bogus "operator" never appears here; this test instead checks
    // that a genuinely malformed query (two operators) is rejected.
    let mut root = Mapping::new();
    let err = evaluate(&toks("a = b + c"), &mut root).unwrap_err();
    assert_eq!(err, EngineError::MultipleOperators);
  }

  #[test]
  fn index_into_string_is_an_error() {
    let mut root = Mapping::new();
    run(&mut root, "a = scalar");
    let err = evaluate(&toks("a b"), &mut root).unwrap_err();
    assert_eq!(err, EngineError::NotAMapping);
  }
}
