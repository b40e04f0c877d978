// Scripted in-memory JSON-RPC node shared by the integration tests.
//
// Answers come from two tables: one-shot answers queued per method (consumed
// first, in order) and a sticky answer per method used once the queue is
// empty. Unknown methods fail like a node would (-32601).

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use contract_binding::error::RpcErrorObj;
use contract_binding::rpc::Transport;
use contract_binding::{Error, Result};
use futures::future::{BoxFuture, FutureExt};
use serde_json::{json, Value};

#[derive(Default)]
pub struct MockNode {
    queued: Mutex<HashMap<String, VecDeque<Result<Value>>>>,
    sticky: Mutex<HashMap<String, Value>>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl MockNode {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Answer every `method` request with `value` (after queued answers).
    pub fn on(&self, method: &str, value: Value) -> &Self {
        self.sticky.lock().unwrap().insert(method.to_string(), value);
        self
    }

    /// Queue a single answer for the next `method` request.
    pub fn push(&self, method: &str, answer: Result<Value>) -> &Self {
        self.queued.lock().unwrap().entry(method.to_string()).or_default().push_back(answer);
        self
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, method: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|(m, _)| m == method).count()
    }

    /// Params of the last `method` request.
    pub fn last_params(&self, method: &str) -> Option<Value> {
        self.calls.lock().unwrap().iter().rev().find(|(m, _)| m == method).map(|(_, p)| p.clone())
    }

    fn answer(&self, method: &str) -> Result<Value> {
        if let Some(next) = self.queued.lock().unwrap().get_mut(method).and_then(VecDeque::pop_front) {
            return next;
        }
        match self.sticky.lock().unwrap().get(method) {
            Some(v) => Ok(v.clone()),
            None => Err(Error::Rpc(RpcErrorObj::new(-32601, format!("method {method} not found"), None))),
        }
    }
}

impl Transport for MockNode {
    fn request<'a>(&'a self, method: &'a str, params: Value) -> BoxFuture<'a, Result<Value>> {
        self.calls.lock().unwrap().push((method.to_string(), params));
        let answer = self.answer(method);
        async move { answer }.boxed()
    }
}

pub fn tx_hash_hex() -> String {
    format!("0x{}", "ab".repeat(32))
}

pub fn receipt(contract_address: Option<&str>) -> Value {
    json!({
        "transactionHash": tx_hash_hex(),
        "blockHash": format!("0x{}", "cd".repeat(32)),
        "blockNumber": "0x2a",
        "contractAddress": contract_address,
        "gasUsed": "0x5208",
        "status": "0x1",
        "logs": [],
    })
}

/// `uint256` return data.
pub fn word(n: u64) -> Value {
    json!(format!("0x{n:064x}"))
}
