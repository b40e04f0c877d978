//! Call parameters (`from`, `gas`, `value`, ...) and the trailing-options
//! convention of the dynamic call surface.
//!
//! A call's positional arguments may end with a plain JSON object carrying
//! per-call overrides. That object is removed from the argument list and
//! merged over the configured defaults (argument keys win). Numeric wrappers
//! serialized as objects are *not* options: they stay positional.
//!
//! Recognized numeric wrappers:
//! - bignumber.js: `{"s": 1, "e": 2, "c": [100]}`
//! - ethers:       `{"type": "BigNumber", "hex": "0x64"}`

use crate::error::{Error, Result};
use alloy_primitives::{Address, Bytes, U256};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Transaction / call overrides. Every field is optional; unset fields fall
/// back to the defaults they are merged over.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TxParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Bytes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<U256>,
    /// Keys this struct does not model, passed through verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl TxParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    pub fn gas(mut self, gas: u64) -> Self {
        self.gas = Some(U256::from(gas));
        self
    }

    pub fn gas_price(mut self, gas_price: U256) -> Self {
        self.gas_price = Some(gas_price);
        self
    }

    pub fn value(mut self, value: U256) -> Self {
        self.value = Some(value);
        self
    }

    pub fn data(mut self, data: impl Into<Bytes>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Merge `self` over `defaults`: every key set on `self` wins, every key
    /// only set on `defaults` is kept.
    pub fn merged_over(self, defaults: &TxParams) -> TxParams {
        let mut extra = defaults.extra.clone();
        extra.extend(self.extra);
        TxParams {
            from: self.from.or(defaults.from),
            to: self.to.or(defaults.to),
            gas: self.gas.or(defaults.gas),
            gas_price: self.gas_price.or(defaults.gas_price),
            value: self.value.or(defaults.value),
            data: self.data.or_else(|| defaults.data.clone()),
            nonce: self.nonce.or(defaults.nonce),
            extra,
        }
    }

    /// Build from a JSON options object. Quantities may be JSON numbers,
    /// decimal strings or `0x` hex strings.
    pub fn from_object(obj: &Map<String, Value>) -> Result<Self> {
        let mut out = TxParams::default();
        for (key, value) in obj {
            match key.as_str() {
                "from" => out.from = Some(json_address(key, value)?),
                "to" => out.to = Some(json_address(key, value)?),
                "gas" => out.gas = Some(json_quantity(key, value)?),
                "gasPrice" => out.gas_price = Some(json_quantity(key, value)?),
                "value" => out.value = Some(json_quantity(key, value)?),
                "nonce" => out.nonce = Some(json_quantity(key, value)?),
                "data" => {
                    let s = value
                        .as_str()
                        .ok_or_else(|| Error::InvalidParams(format!("'data' must be a hex string, got {value}")))?;
                    out.data = Some(Bytes::from(decode_hex(s)?));
                }
                _ => {
                    out.extra.insert(key.clone(), value.clone());
                }
            }
        }
        Ok(out)
    }

    /// JSON object form as sent in `eth_call` / `eth_sendTransaction`.
    pub fn to_json(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// `true` for JSON objects that serialize a big-number value.
pub fn is_numeric_like(v: &Value) -> bool {
    let Some(obj) = v.as_object() else {
        return false;
    };
    let bignumber_js = obj.contains_key("c")
        && obj.get("c").is_some_and(Value::is_array)
        && obj.keys().all(|k| matches!(k.as_str(), "s" | "e" | "c"));
    let ethers = obj.get("type").and_then(Value::as_str) == Some("BigNumber")
        && obj.get("hex").is_some_and(Value::is_string);
    bignumber_js || ethers
}

/// `true` for a plain options record: an object that is not a numeric wrapper.
pub fn is_options_like(v: &Value) -> bool {
    v.is_object() && !is_numeric_like(v)
}

/// Remove a trailing options record from `args`, if present.
pub fn split_tx_params(args: &mut Vec<Value>) -> Result<Option<TxParams>> {
    if args.last().is_some_and(is_options_like) {
        if let Some(Value::Object(obj)) = args.pop() {
            return Ok(Some(TxParams::from_object(&obj)?));
        }
    }
    Ok(None)
}

/// Largest bignumber.js exponent that can still fit a 256-bit quantity.
const MAX_EXPONENT: i64 = 77;

/// Decimal digits of a numeric wrapper (see module docs), sign included.
pub fn numeric_to_string(v: &Value) -> Option<String> {
    let obj = v.as_object()?;
    if let Some(hex) = obj.get("hex").and_then(Value::as_str) {
        let (neg, body) = match hex.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, hex),
        };
        let n: U256 = body.parse().ok()?;
        return Some(if neg { format!("-{n}") } else { n.to_string() });
    }

    // bignumber.js: coefficient in base-1e14 limbs, `e` is the exponent of
    // the leading digit.
    let limbs = obj.get("c")?.as_array()?;
    let e = obj.get("e")?.as_i64()?;
    // 2^256 has 78 decimal digits; anything wider or fractional is rejected
    // before a digit is built.
    if !(0..=MAX_EXPONENT).contains(&e) {
        return None;
    }
    let s = obj.get("s").and_then(Value::as_i64).unwrap_or(1);
    let mut digits = String::new();
    for (i, limb) in limbs.iter().enumerate() {
        let limb = limb.as_u64()?;
        if i == 0 {
            digits.push_str(&limb.to_string());
        } else {
            digits.push_str(&format!("{limb:014}"));
        }
    }
    let int_len = usize::try_from(e.checked_add(1)?).ok()?;
    if digits.len() > int_len {
        // fractional part; only integers are meaningful on-chain
        if digits[int_len..].bytes().any(|b| b != b'0') {
            return None;
        }
        digits.truncate(int_len);
    }
    while digits.len() < int_len {
        digits.push('0');
    }
    if digits.is_empty() {
        digits.push('0');
    }
    Some(if s < 0 && digits != "0" { format!("-{digits}") } else { digits })
}

// ---- helpers ----------------------------------------------------------------

fn json_address(key: &str, v: &Value) -> Result<Address> {
    v.as_str()
        .and_then(|s| s.parse::<Address>().ok())
        .ok_or_else(|| Error::InvalidParams(format!("'{key}' must be an address, got {v}")))
}

pub(crate) fn json_quantity(key: &str, v: &Value) -> Result<U256> {
    let bad = || Error::InvalidParams(format!("'{key}' must be a non-negative quantity, got {v}"));
    match v {
        Value::Number(n) => n.as_u64().map(U256::from).ok_or_else(bad),
        Value::String(s) => s.parse::<U256>().map_err(|_| bad()),
        other if is_numeric_like(other) => numeric_to_string(other)
            .and_then(|d| d.parse::<U256>().ok())
            .ok_or_else(bad),
        _ => Err(bad()),
    }
}

pub(crate) fn decode_hex(s: &str) -> Result<Vec<u8>> {
    let raw = s.strip_prefix("0x").unwrap_or(s);
    Ok(hex::decode(raw)?)
}
