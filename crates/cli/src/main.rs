mod commands;
mod history;
mod repl;

use clap::Parser;
use colored::Colorize;

use apocrypha_client::Connection;
use commands::{ClientArgs, DEFAULT_HOST};
use repl::Repl;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
  let args = ClientArgs::parse();

  let host = args
    .host
    .or_else(history::read_last_host)
    .unwrap_or_else(|| DEFAULT_HOST.to_string());

  let conn = Connection::connect(&host).await?;
  history::write(conn.host(), &history::read_query_history());

  if let Some(q) = &args.command {
    print_query(&conn, q).await;
    return Ok(());
  }

  if let Some(file) = &args.file {
    for line in std::fs::read_to_string(file)?
      .lines()
      .filter(|l| !l.trim().is_empty() && !l.starts_with("//"))
    {
      print_query(&conn, line).await;
    }
    return Ok(());
  }

  Repl::new(conn)?.run().await
}

async fn print_query(conn: &Connection, query: &str) {
  match conn.query_line(query).await {
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
