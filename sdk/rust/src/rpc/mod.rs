//! JSON-RPC plumbing.
//!
//! - [`Transport`]: the pluggable request/response seam. Anything that can
//!   answer a JSON-RPC method with a JSON value can back a contract.
//! - [`http`]: reqwest-backed HTTP transport (feature `native`).
//! - [`eth`]: typed helpers for the handful of `eth_*` / `net_*` methods the
//!   binding layer issues.

use crate::error::Result;
use futures::future::BoxFuture;
use serde_json::Value;
use std::sync::Arc;

pub mod eth;
#[cfg(feature = "native")]
pub mod http;

/// A JSON-RPC request/response channel.
///
/// Implementations return the `result` member of the response (which may be
/// `null`), or the node's error object as [`crate::Error::Rpc`]. They must not
/// retry on their own.
pub trait Transport: Send + Sync {
    fn request<'a>(&'a self, method: &'a str, params: Value) -> BoxFuture<'a, Result<Value>>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn request<'a>(&'a self, method: &'a str, params: Value) -> BoxFuture<'a, Result<Value>> {
        (**self).request(method, params)
    }
}

/// Shared, type-erased transport handle.
pub type Provider = Arc<dyn Transport>;
