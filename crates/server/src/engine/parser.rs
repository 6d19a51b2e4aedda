use super::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
  Index,
  Assign,
  Append,
  Remove,
  Search,
  Keys,
  Set,
  Edit,
  Del,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParsedQuery {
  pub op: Op,
  pub left: Vec<String>,
  pub right: Vec<String>,
}

/// Normalizes every token's short alias to its long operator form. Used
/// both by [`parse`] and by the query cache to canonicalize a token list
/// into its cache key before the two short-vs-long forms of an otherwise
/// identical query would otherwise miss each other.
pub fn normalize_tokens(tokens: &[String]) -> Vec<String> {
  tokens.iter().map(|t| normalize(t).to_string()).collect()
}

/// Normalizes a short alias to its long operator form. Non-operator
/// tokens pass through unchanged.
fn normalize(token: &str) -> &str {
  match token {
    "-k" => "--keys",
    "-s" => "--set",
    "-e" => "--edit",
    "-d" => "--del",
    other => other,
  }
}

fn operator_for(token: &str) -> Option<Op> {
  match token {
    "=" => Some(Op::Assign),
    "+" => Some(Op::Append),
    "-" => Some(Op::Remove),
    "@" => Some(Op::Search),
    "--keys" => Some(Op::Keys),
    "--set" => Some(Op::Set),
    "--edit" => Some(Op::Edit),
    "--del" => Some(Op::Del),
    _ => None,
  }
}

/// Splits a raw token list into an operator plus its left path and right
/// payload, normalizing short aliases first (this is also the
/// canonicalization the cache key relies on). Exactly one operator token
/// is permitted anywhere in the list; none means a pure index over the
/// whole token list as a path.
pub fn parse(tokens: &[String]) -> Result<ParsedQuery, EngineError> {
  let normalized: Vec<String> = tokens.iter().map(|t| normalize(t).to_string()).collect();

  let operator_positions: Vec<usize> = normalized
    .iter()
    .enumerate()
    .filter_map(|(i, t)| operator_for(t).map(|_| i))
    .collect();

  let parsed = match operator_positions.as_slice() {
    [] => ParsedQuery {
      op: Op::Index,
      left: normalized,
      right: Vec::new(),
    },
    [i] => {
      let op = operator_for(&normalized[*i]).expect("position came from operator_for");
      let left = normalized[..*i].to_vec();
      let right = normalized[*i + 1..].to_vec();
      ParsedQuery { op, left, right }
    }
    _ => return Err(EngineError::MultipleOperators),
  };

  validate_arity(&parsed)?;
  Ok(parsed)
}

fn validate_arity(q: &ParsedQuery) -> Result<(), EngineError> {
  match q.op {
    Op::Index => Ok(()),
    Op::Assign => requires_path(&q.left),
    Op::Append | Op::Remove => {
      requires_path(&q.left)?;
      if q.right.is_empty() {
        Err(EngineError::MissingValue)
      } else {
        Ok(())
      }
    }
    Op::Search => {
      if !q.left.is_empty() {
        Err(EngineError::UnexpectedSearchPrefix)
      } else if q.right.len() != 1 {
        Err(EngineError::SearchArity)
      } else {
        Ok(())
      }
    }
    Op::Keys | Op::Edit | Op::Del => {
      requires_path(&q.left)?;
      if q.right.is_empty() {
        Ok(())
      } else {
        Err(EngineError::UnexpectedPayload)
      }
    }
    Op::Set => {
      requires_path(&q.left)?;
      if q.right.len() == 1 {
        Ok(())
      } else {
        Err(EngineError::MissingValue)
      }
    }
  }
}

fn requires_path(left: &[String]) -> Result<(), EngineError> {
  if left.is_empty() {
    Err(EngineError::EmptyPath)
  } else {
    Ok(())
  }
}
