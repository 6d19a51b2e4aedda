//! The on-the-wire framing shared by the server and the client: a 4-byte
//! big-endian length prefix followed by a UTF-8 payload. The payload is a
//! query's tokens joined with `\n`, with a trailing `\n`.

use thiserror::Error;

pub const MAX_FRAME_LEN: u32 = 16 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum FrameError {
  #[error("frame of {0} bytes exceeds the {1} byte limit")]
  TooLarge(u32, u32),
  #[error("payload is not valid UTF-8")]
  InvalidUtf8,
}

/// Joins query tokens into the wire payload: one token per line, trailing
/// newline included.
pub fn encode_tokens(tokens: &[String]) -> Vec<u8> {
  let mut body = tokens.join("\n");
  body.push('\n');
  body.into_bytes()
}

/// Splits a received payload back into tokens, dropping the trailing
/// empty line produced by the final `\n`.
pub fn decode_tokens(payload: &[u8]) -> Result<Vec<String>, FrameError> {
  let text = std::str::from_utf8(payload).map_err(|_| FrameError::InvalidUtf8)?;
  let mut lines: Vec<String> = text.split('\n').map(str::to_string).collect();
  if lines.last().is_some_and(|l| l.is_empty()) {
    lines.pop();
  }
  Ok(lines)
}

pub fn check_frame_len(len: u32) -> Result<(), FrameError> {
  if len > MAX_FRAME_LEN {
    Err(FrameError::TooLarge(len, MAX_FRAME_LEN))
  } else {
    Ok(())
  }
}
