//! The line-framed TCP accept loop: no handshake, no encoding negotiation,
//! just a 4-byte big-endian length prefix around a UTF-8 payload in both
//! directions.

use std::sync::Arc;

use apocrypha_types::{check_frame_len, decode_tokens, encode_tokens, FrameError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use crate::store::Store;

/// Runs the accept loop until `shutdown` fires.
pub async fn run(
  store: Arc<Store>,
  addr: &str,
  mut shutdown: tokio::sync::watch::Receiver<bool>,
) -> anyhow::Result<()> {
  let listener = TcpListener::bind(addr).await?;
  tracing::info!("apocryphad listening on {addr}");

  loop {
    tokio::select! {
      accepted = listener.accept() => {
        let (stream, peer) = accepted?;
        tracing::debug!("connection from {peer}");
        let store = store.clone();
        tokio::spawn(async move {
          if let Err(e) = handle_connection(stream, &store).await {
            tracing::debug!("connection from {peer} closed: {e}");
          }
        });
      }
      _ = shutdown.changed() => {
        tracing::info!("tcp: shutting down accept loop");
        break;
      }
    }
  }
  Ok(())
}

/// Serves one connection: read a framed request, evaluate it, write the
/// framed response, loop. A query once dispatched to the engine runs to
/// completion regardless of what happens to the socket afterward; if the
/// client is gone by the time the response is written, that write error
/// just ends the loop — the engine's mutation, if any, already stands.
async fn handle_connection(mut stream: TcpStream, store: &Store) -> anyhow::Result<()> {
  loop {
    let tokens = match read_request(&mut stream).await? {
      Some(tokens) => tokens,
      None => return Ok(()), // clean EOF between requests
    };

    let body = match store.evaluate(&tokens) {
      Ok(output) => output,
      Err(e) => format!("error: {e}\n"),
    };

    write_response(&mut stream, body.as_bytes()).await?;
  }
}

/// Reads one framed request. Returns `None` on a clean EOF at a frame
/// boundary (the client closed the connection between requests); any
/// other framing problem (oversize length, non-UTF-8 body, a short read
/// mid-frame) is a `ProtocolError` and the connection is dropped.
async fn read_request(stream: &mut TcpStream) -> anyhow::Result<Option<Vec<String>>> {
  let len = match stream.read_u32().await {
    Ok(len) => len,
    Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
    Err(e) => return Err(e.into()),
  };
  check_frame_len(len).map_err(protocol_error)?;

  let mut buf = vec![0u8; len as usize];
  stream.read_exact(&mut buf).await?;
  let tokens = decode_tokens(&buf).map_err(protocol_error)?;
  Ok(Some(tokens))
}

async fn write_response(stream: &mut TcpStream, body: &[u8]) -> anyhow::Result<()> {
  stream.write_u32(body.len() as u32).await?;
  stream.write_all(body).await?;
  stream.flush().await?;
  Ok(())
}

fn protocol_error(e: FrameError) -> anyhow::Error {
  anyhow::anyhow!("protocol error: {e}")
}

#[cfg(test)]
mod tests {
  use super::*;
  use apocrypha_types::Mapping;
  use std::path::PathBuf;
  use tokio::net::TcpStream as ClientStream;

  async fn spawn_server() -> (std::net::SocketAddr, Arc<Store>) {
    let store = Arc::new(Store::new(Mapping::new(), PathBuf::from("/tmp/unused.json"), 16));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let accepted_store = store.clone();
    tokio::spawn(async move {
      loop {
        let (stream, _) = listener.accept().await.unwrap();
        let store = accepted_store.clone();
        tokio::spawn(async move {
          let _ = handle_connection(stream, &store).await;
        });
      }
    });
    (addr, store)
  }

  async fn roundtrip(stream: &mut ClientStream, tokens: &[&str]) -> String {
    let owned: Vec<String> = tokens.iter().map(|s| s.to_string()).collect();
    let payload = encode_tokens(&owned);
    stream.write_u32(payload.len() as u32).await.unwrap();
    stream.write_all(&payload).await.unwrap();
    let len = stream.read_u32().await.unwrap();
    let mut buf = vec![0u8; len as usize];
    stream.read_exact(&mut buf).await.unwrap();
    String::from_utf8(buf).unwrap()
  }

  #[tokio::test]
  async fn query_round_trips_over_the_wire() {
    let (addr, _store) = spawn_server().await;
    let mut stream = ClientStream::connect(addr).await.unwrap();

    assert_eq!(roundtrip(&mut stream, &["apples", "granny", "=", "good"]).await, "");
    assert_eq!(roundtrip(&mut stream, &["apples", "granny"]).await, "good\n");
  }

  #[tokio::test]
  async fn malformed_query_yields_error_line() {
    let (addr, _store) = spawn_server().await;
    let mut stream = ClientStream::connect(addr).await.unwrap();

    let out = roundtrip(&mut stream, &["a", "=", "b", "+", "c"]).await;
    assert_eq!(out, "error: multiple operators\n");
  }
}
