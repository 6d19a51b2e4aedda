mod datum;
mod wire;

pub use datum::{insert_collapsing, Datum, Mapping};
pub use wire::{check_frame_len, decode_tokens, encode_tokens, FrameError, MAX_FRAME_LEN};
