//! Remote access to zset stores.
//!
//! A [`Transport`] exposes the same seven operations as the in-process
//! store, so callers can compose local and remote stores uniformly. Each
//! transport carries a stable 32-bit hash of its endpoint for sharding and
//! deduplication. Concrete transports are built by a [`TransportStrategy`]
//! chosen by protocol tag.

pub mod config;
pub mod hash;
pub mod http;
pub mod strategy;
pub mod traits;

pub use config::TransportConfig;
pub use hash::endpoint_hash;
pub use http::HttpTransport;
pub use strategy::{strategy_for, HttpStrategy, TransportStrategy, HTTP_PROTOCOL};
pub use traits::Transport;
