//! Thin transport façade: decodes requests into File Service calls and
//! encodes outcomes, over HTTP (`http`) and line-delimited JSON-RPC on
//! stdio (`stdio`). Both route through the same `dispatch` module so
//! validation lives in exactly one place.

pub mod dispatch;
pub mod error;
pub mod http;
pub mod protocol;
pub mod stdio;

pub use error::Error;
pub use http::router;
pub use stdio::StdioServer;
