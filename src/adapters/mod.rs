// Adapters layer: concrete implementations at the edges (HTTP transport, filesystem storage).

pub mod http;
pub mod storage;
