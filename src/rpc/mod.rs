//! JSON-RPC clients: HTTP transport, eth namespace, dev-chain controls.

pub mod dev;
pub mod eth;
pub mod http;

pub use dev::{DevRpc, NodeFamily};
pub use eth::EthRpc;
pub use http::HttpTransport;
