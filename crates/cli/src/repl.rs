use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use apocrypha_client::Connection;

use crate::history;

/// The interactive client, grounded on `src/client/repl.rs`: a
/// `rustyline`-backed prompt over one persistent connection. Unlike the
/// teacher's REPL, there is no `.tables`/`.changes()` subscription
/// machinery here — apocrypha's query language is the entire surface, so
/// every non-`.`-prefixed line is sent verbatim as a query.
pub struct Repl {
  conn: Connection,
  editor: DefaultEditor,
  queries: Vec<String>,
}

impl Repl {
  pub fn new(conn: Connection) -> Result<Self, anyhow::Error> {
    let mut editor = DefaultEditor::new()?;
    let queries = history::read_query_history();
    for q in &queries {
      let _ = editor.add_history_entry(q.as_str());
    }
    Ok(Self { conn, editor, queries })
  }

  pub async fn run(&mut self) -> Result<(), anyhow::Error> {
    println!("{} v{}", "Apocrypha".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("Connected to {}. Type {} for help\n", self.conn.host().cyan(), ".help".cyan());

    loop {
      match self.editor.readline(&format!("{} ", "apocrypha>".green())) {
        Ok(line) => {
          let line = line.trim();
          if line.is_empty() {
            continue;
          }
          let _ = self.editor.add_history_entry(line);
          if line.starts_with('.') {
            if !self.command(line) {
              break;
            }
          } else {
            self.queries.push(line.to_string());
            history::write(self.conn.host(), &self.queries);
            self.query(line).await;
          }
        }
        Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
        Err(e) => {
          eprintln!("Error: {e:?}");
          break;
        }
      }
    }
    Ok(())
  }

  fn command(&self, cmd: &str) -> bool {
    match cmd.split_whitespace().next().unwrap_or("") {
      ".help" => println!("Commands: .help, .clear, .quit"),
      ".clear" => print!("\x1B[2J\x1B[1;1H"),
      ".quit" | ".exit" => return false,
      _ => eprintln!("Unknown command"),
    }
    true
  }

  async fn query(&self, q: &str) {
    match self.conn.query_line(q).await {
      Ok(body) => {
        if let Some(cause) = body.strip_prefix("error: ") {
          eprintln!("{}: {}", "error".red(), cause.trim_end());
        } else {
          print!("{body}");
        }
      }
      Err(e) => eprintln!("{}: {e}", "connection error".red()),
    }
  }
}
