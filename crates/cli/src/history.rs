//! The client's "memory of last server": `~/.apocrypha_history`'s first
//! line holds the host the client last connected to successfully; every
//! following line is one REPL query, newest last, the way `rustyline`'s
//! own history file would look on its own. Grounded on the teacher's
//! `DefaultEditor` + dotfile history pattern in `src/client/repl.rs`,
//! extended to also carry the remembered host since apocrypha has no
//! server-side session to ask.

use std::fs;
use std::path::PathBuf;

fn history_path() -> PathBuf {
  dirs::home_dir()
    .unwrap_or_else(|| PathBuf::from("."))
    .join(".apocrypha_history")
}

/// Reads the remembered host, if a history file exists and its first
/// line is non-empty.
pub fn read_last_host() -> Option<String> {
  let contents = fs::read_to_string(history_path()).ok()?;
  let first = contents.lines().next()?;
  if first.is_empty() {
    None
  } else {
    Some(first.to_string())
  }
}

/// Every remembered query, oldest first, to seed a fresh REPL session.
pub fn read_query_history() -> Vec<String> {
  match fs::read_to_string(history_path()) {
    Ok(contents) => contents.lines().skip(1).map(str::to_string).collect(),
    Err(_) => Vec::new(),
  }
}

/// Rewrites the history file with `host` as its first line and
/// `queries` as the remaining lines. Called after every successful
/// connection (host may be unchanged) and after every REPL query.
pub fn write(host: &str, queries: &[String]) {
  let mut body = String::from(host);
  body.push('\n');
  for q in queries {
    body.push_str(q);
    body.push('\n');
  }
  let _ = fs::write(history_path(), body);
}
