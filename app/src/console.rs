//! Titled output blocks and the small text helpers the commands share.

use std::io::{self, Write};

use contract_binding::prelude::{Confirmation, DecodedEvent, B256};
use serde_json::Value;

use crate::bindings::test::{
    EVENT_CONTRACT_DESTROY, EVENT_CREATE_TIME, EVENT_PAID, EVENT_PAY, EVENT_PAYMENT_SUCCESS, EVENT_USER_RECEIVE,
};

pub const DEFAULT_TITLE: &str = "Notice";

/// Writes every result as a titled block:
///
/// ```text
/// == Notice ==
/// Current balance left: 42
/// ```
pub struct Console<W: Write> {
    out: W,
}

impl Console<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Console<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn print(&mut self, body: &str, title: Option<&str>) -> io::Result<()> {
        writeln!(self.out, "== {} ==", title.unwrap_or(DEFAULT_TITLE))?;
        writeln!(self.out, "{}", body.trim_end())?;
        self.out.flush()
    }

    pub fn print_lines<S: AsRef<str>>(&mut self, lines: &[S], title: Option<&str>) -> io::Result<()> {
        let body = lines.iter().map(AsRef::as_ref).collect::<Vec<_>>().join("\n");
        self.print(&body, title)
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Text stored in a `bytes32`: trailing zero padding removed, invalid UTF-8
/// replaced.
pub fn bytes32_text(word: &B256) -> String {
    let end = word.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
    String::from_utf8_lossy(&word[..end]).into_owned()
}

/// `bytes32` form of short text (right-padded, truncated at 32 bytes).
pub fn text_bytes32(text: &str) -> B256 {
    let bytes = text.as_bytes();
    B256::right_padding_from(&bytes[..bytes.len().min(32)])
}

/// `0. name : true` lines for a pair of parallel name / flag lists.
pub fn status_lines(names: &[B256], flags: &[bool]) -> Vec<String> {
    names
        .iter()
        .zip(flags)
        .enumerate()
        .map(|(i, (name, flag))| format!("{i}. {} : {flag}", bytes32_text(name)))
        .collect()
}

/// One-line summary of a mined transaction.
pub fn confirmation_line(c: &Confirmation) -> String {
    match c.receipt.block_number {
        Some(block) => format!("Transaction {:#x} mined in block {}", c.tx_hash, block.to::<u64>()),
        None => format!("Transaction {:#x} mined", c.tx_hash),
    }
}

/// What the console says when a `Test` event shows up.
pub fn event_message(event: &DecodedEvent) -> String {
    match event.event.as_str() {
        EVENT_CREATE_TIME => "contract created!".to_string(),
        EVENT_PAY => "Time to pay!".to_string(),
        EVENT_USER_RECEIVE => "money transferred".to_string(),
        EVENT_PAID => "All paid by company".to_string(),
        EVENT_CONTRACT_DESTROY => "Contract terminated".to_string(),
        EVENT_PAYMENT_SUCCESS => Value::Object(event.args.clone()).to_string(),
        other if event.args.is_empty() => other.to_string(),
        other => format!("{other} {}", Value::Object(event.args.clone())),
    }
}
