// In-memory node for the console tests: canned answers per JSON-RPC method,
// every request recorded.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use contract_binding::error::RpcErrorObj;
use contract_binding::prelude::*;
use futures::future::{BoxFuture, FutureExt};
use serde_json::{json, Value};

pub const ALICE: &str = "0x1111111111111111111111111111111111111111";
pub const BOB: &str = "0x2222222222222222222222222222222222222222";
/// Address recorded for `Test` under the `default` network.
pub const TEST_ADDRESS: &str = "0x60b8e8baaeb9de2020e00a9e2c43000f6f4f49b4";

#[derive(Default)]
pub struct ScriptedNode {
    answers: Mutex<HashMap<String, VecDeque<Result<Value>>>>,
    requests: Mutex<Vec<(String, Value)>>,
}

impl ScriptedNode {
    /// Node on main net (`net_version` = 1) with the given accounts.
    pub fn with_accounts(accounts: &[&str]) -> Arc<Self> {
        let node = Arc::new(Self::default());
        node.reply("net_version", json!("1"));
        node.reply("eth_accounts", json!(accounts));
        node
    }

    /// Queue an answer; the last queued answer for a method is reused.
    pub fn reply(&self, method: &str, value: Value) -> &Self {
        self.answer(method, Ok(value))
    }

    pub fn answer(&self, method: &str, answer: Result<Value>) -> &Self {
        self.answers.lock().unwrap().entry(method.to_string()).or_default().push_back(answer);
        self
    }

    pub fn requests(&self, method: &str) -> Vec<Value> {
        self.requests.lock().unwrap().iter().filter(|(m, _)| m == method).map(|(_, p)| p.clone()).collect()
    }

    fn next(&self, method: &str) -> Result<Value> {
        let mut answers = self.answers.lock().unwrap();
        let Some(queue) = answers.get_mut(method) else {
            return Err(Error::Rpc(RpcErrorObj::new(-32601, format!("method {method} not found"), None)));
        };
        if queue.len() > 1 {
            return queue.pop_front().unwrap();
        }
        match queue.front() {
            Some(Ok(v)) => Ok(v.clone()),
            _ => queue
                .pop_front()
                .unwrap_or_else(|| Err(Error::Rpc(RpcErrorObj::new(-32603, "no answer left", None)))),
        }
    }
}

impl Transport for ScriptedNode {
    fn request<'a>(&'a self, method: &'a str, params: Value) -> BoxFuture<'a, Result<Value>> {
        self.requests.lock().unwrap().push((method.to_string(), params));
        let answer = self.next(method);
        async move { answer }.boxed()
    }
}

/// ABI words (`0x` + 64 hex chars each) concatenated into call return data.
pub fn words(words: &[String]) -> Value {
    json!(format!("0x{}", words.concat()))
}

pub fn uint(n: u64) -> String {
    format!("{n:064x}")
}

pub fn text(s: &str) -> String {
    format!("{:0<64}", hex_of(s))
}

fn hex_of(s: &str) -> String {
    s.bytes().map(|b| format!("{b:02x}")).collect()
}

pub fn tx_hash() -> String {
    format!("0x{}", "ab".repeat(32))
}

pub fn receipt(contract_address: Option<&str>) -> Value {
    json!({
        "transactionHash": tx_hash(),
        "blockNumber": "0x2a",
        "contractAddress": contract_address,
        "status": "0x1",
        "logs": [],
    })
}

/// Console sink the test keeps a handle on after the session consumed it.
#[derive(Clone, Default)]
pub struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    pub fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl std::io::Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
