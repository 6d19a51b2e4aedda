use clap::Parser;

pub const DEFAULT_HOST: &str = "localhost:9999";

#[derive(Parser)]
#[command(name = "apocrypha", about = "Apocrypha document store client", version)]
pub struct ClientArgs {
  /// Server address, host:port. Defaults to the last server this client
  /// successfully connected to, falling back to localhost:9999.
  #[arg(short = 'H', long)]
  pub host: Option<String>,

  /// Run one query and exit.
  #[arg(short, long)]
  pub command: Option<String>,

  /// Run every non-blank, non-`//`-comment line of this file as a query
  /// and exit.
  #[arg(short, long)]
  pub file: Option<String>,
}
