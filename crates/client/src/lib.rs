//! A small async connection library wrapping apocrypha's wire protocol:
//! connect to a running `apocryphad`, send a query's tokens, get back its
//! textual response body. Grounded on `crates/client/src/connection.rs`'s
//! split between a thin connection type and the request/response plumbing,
//! simplified to the spec's actual framing (no subscriptions, no message
//! envelope — just one frame out, one frame back, per query).

mod connection;

pub use connection::{ClientError, Connection};
