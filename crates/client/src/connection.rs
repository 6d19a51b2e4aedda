use std::io;

use apocrypha_types::{check_frame_len, encode_tokens, FrameError};
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum ClientError {
  #[error("connecting to {host}: {source}")]
  Connect { host: String, source: io::Error },
  #[error("sending query: {0}")]
  Send(#[source] io::Error),
  #[error("reading response: {0}")]
  Recv(#[source] io::Error),
  #[error("server sent a malformed frame: {0}")]
  Protocol(#[from] FrameError),
}

/// One TCP connection to an `apocryphad` server.
///
/// A query is a request/response round trip over the same framing the
/// server speaks: a 4-byte big-endian length prefix around a UTF-8
/// payload, in both directions. The server handles one request per
/// connection at a time, so [`Connection::query`] serializes callers
/// behind an internal lock rather than assuming the socket itself is safe
/// for concurrent use.
pub struct Connection {
  stream: Mutex<TcpStream>,
  host: String,
}

impl Connection {
  pub async fn connect(host: &str) -> Result<Self, ClientError> {
    let stream = TcpStream::connect(host).await.map_err(|source| ClientError::Connect {
      host: host.to_string(),
      source,
    })?;
    Ok(Self {
      stream: Mutex::new(stream),
      host: host.to_string(),
    })
  }

  pub fn host(&self) -> &str {
    &self.host
  }

  /// Sends `tokens` as one query and returns the response body verbatim,
  /// including a leading `error: ` line if the server rejected the query.
  pub async fn query(&self, tokens: &[String]) -> Result<String, ClientError> {
    let mut stream = self.stream.lock().await;

    let payload = encode_tokens(tokens);
    stream
      .write_u32(payload.len() as u32)
      .await
      .map_err(ClientError::Send)?;
    stream.write_all(&payload).await.map_err(ClientError::Send)?;
    stream.flush().await.map_err(ClientError::Send)?;

    let len = stream.read_u32().await.map_err(ClientError::Recv)?;
    check_frame_len(len)?;
    let mut buf = vec![0u8; len as usize];
    stream.read_exact(&mut buf).await.map_err(ClientError::Recv)?;

    String::from_utf8(buf).map_err(|_| ClientError::Protocol(FrameError::InvalidUtf8))
  }

  /// Convenience wrapper for a query given as one whitespace-split line,
  /// the form both the REPL and `-c`/`-f` modes accept.
  pub async fn query_line(&self, line: &str) -> Result<String, ClientError> {
    let tokens: Vec<String> = line.split_whitespace().map(str::to_string).collect();
    self.query(&tokens).await
  }
}
