//! ABI model + JSON ⇄ ABI coercion.
//!
//! The model mirrors the JSON interface schema shipped in contract artifacts:
//!
//! ```json
//! [
//!   {"constant": true, "inputs": [], "name": "queryBalance",
//!    "outputs": [{"name": "", "type": "uint256"}], "type": "function"},
//!   {"inputs": [{"name": "_createDate", "type": "uint256"}], "type": "constructor"},
//!   {"anonymous": false, "inputs": [], "name": "pay", "type": "event"}
//! ]
//! ```
//!
//! Both the legacy `constant` / `payable` flags and the newer
//! `stateMutability` field are understood. Wire encoding and decoding is
//! delegated to `alloy-dyn-abi`; this module only resolves items, builds
//! canonical signatures and converts between JSON arguments and ABI tokens.
//!
//! Argument coercion rules:
//! - `address`: `0x`-hex string.
//! - `bool`: JSON bool, `"true"`/`"false"`, `0`/`1`.
//! - `uintN` / `intN`: JSON integer, decimal or `0x`-hex string, or a
//!   serialized big-number wrapper (see `crate::params`).
//! - `bytesN`: `0x`-hex (right-padded) or plain text taken as UTF-8 bytes
//!   (right-padded), so `"john"` is a valid `bytes32`.
//! - `bytes`: `0x`-hex or UTF-8 text. `string`: any JSON string.
//! - arrays / fixed arrays / tuples: JSON arrays.

use crate::error::{Error, Result};
use crate::params::{is_numeric_like, numeric_to_string};
use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{keccak256, Address, B256, I256, U256};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// ABI item kind (`type` field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Function,
    Constructor,
    Event,
    Fallback,
    Receive,
    Error,
}

fn default_kind() -> ItemKind {
    ItemKind::Function
}

/// Function/event/constructor parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    #[serde(default)]
    pub name: String,
    /// Solidity type string (`uint256`, `bytes32[]`, `tuple`, ...).
    #[serde(rename = "type")]
    pub ty: String,
    /// Events only: whether the parameter is sent as a topic.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub indexed: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Param>,
}

impl Param {
    /// Canonical type as used in signatures (`uint` → `uint256`, tuples expanded).
    pub fn canonical_type(&self) -> String {
        if let Some(suffix) = self.ty.strip_prefix("tuple") {
            let inner: Vec<String> = self.components.iter().map(Param::canonical_type).collect();
            return format!("({}){}", inner.join(","), suffix);
        }
        let split = self.ty.find('[').unwrap_or(self.ty.len());
        let (base, suffix) = self.ty.split_at(split);
        let base = match base {
            "uint" => "uint256",
            "int" => "int256",
            "byte" => "bytes1",
            other => other,
        };
        format!("{base}{suffix}")
    }

    pub fn sol_type(&self) -> Result<DynSolType> {
        let canonical = self.canonical_type();
        DynSolType::parse(&canonical).map_err(|e| Error::Abi(format!("type '{canonical}': {e}")))
    }
}

/// One ABI entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbiItem {
    #[serde(rename = "type", default = "default_kind")]
    pub kind: ItemKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub inputs: Vec<Param>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<Param>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constant: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_mutability: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anonymous: Option<bool>,
}

impl AbiItem {
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    /// Read-only functions are dispatched as `eth_call`, everything else as a
    /// transaction.
    pub fn is_read_only(&self) -> bool {
        self.constant == Some(true)
            || matches!(self.state_mutability.as_deref(), Some("view") | Some("pure"))
    }

    /// `name(type1,type2,...)`
    pub fn signature(&self) -> String {
        let types: Vec<String> = self.inputs.iter().map(Param::canonical_type).collect();
        format!("{}({})", self.name(), types.join(","))
    }

    /// First four bytes of `keccak256(signature)`.
    pub fn selector(&self) -> [u8; 4] {
        let h = keccak256(self.signature().as_bytes());
        [h[0], h[1], h[2], h[3]]
    }

    /// `keccak256(signature)`, the first topic of a non-anonymous event log.
    pub fn topic(&self) -> B256 {
        keccak256(self.signature().as_bytes())
    }

    pub fn input_types(&self) -> Result<Vec<DynSolType>> {
        self.inputs.iter().map(Param::sol_type).collect()
    }

    pub fn output_types(&self) -> Result<Vec<DynSolType>> {
        self.outputs.iter().map(Param::sol_type).collect()
    }
}

/// A contract's full interface schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Abi {
    pub items: Vec<AbiItem>,
}

impl Abi {
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn functions(&self) -> impl Iterator<Item = &AbiItem> {
        self.items.iter().filter(|i| i.kind == ItemKind::Function)
    }

    pub fn events(&self) -> impl Iterator<Item = &AbiItem> {
        self.items.iter().filter(|i| i.kind == ItemKind::Event)
    }

    pub fn constructor(&self) -> Option<&AbiItem> {
        self.items.iter().find(|i| i.kind == ItemKind::Constructor)
    }

    /// Resolve a function by name or by full signature (`set(address)`).
    ///
    /// A bare name picks the overload taking `arity` arguments; two overloads
    /// of the same arity are ambiguous and need the signature.
    pub fn function(&self, name: &str, arity: usize) -> Result<&AbiItem> {
        if name.contains('(') {
            return self
                .functions()
                .find(|f| f.signature() == name)
                .ok_or_else(|| Error::UnknownMethod(name.to_string()));
        }
        let candidates: Vec<&AbiItem> = self.functions().filter(|f| f.name() == name).collect();
        if let [only] = candidates.as_slice() {
            return Ok(only);
        }
        let matching: Vec<&AbiItem> = candidates.iter().copied().filter(|f| f.inputs.len() == arity).collect();
        match matching.as_slice() {
            [] if candidates.is_empty() => Err(Error::UnknownMethod(name.to_string())),
            [] => Err(Error::UnknownMethod(format!("{name} with {arity} argument(s)"))),
            [one] => Ok(one),
            many => {
                let sigs: Vec<String> = many.iter().map(|f| f.signature()).collect();
                Err(Error::UnknownMethod(format!("{name} is ambiguous, use one of: {}", sigs.join(", "))))
            }
        }
    }

    pub fn event(&self, name: &str) -> Option<&AbiItem> {
        self.events().find(|e| e.name() == name)
    }

    /// Non-anonymous event whose topic matches `topic0`.
    pub fn event_by_topic(&self, topic0: &B256) -> Option<&AbiItem> {
        self.events().find(|e| e.anonymous != Some(true) && &e.topic() == topic0)
    }
}

// ---- Encoding -----------------------------------------------------------------

/// ABI-encode `args` against `params` (head/tail parameter encoding).
pub fn encode_args(params: &[Param], args: &[Value]) -> Result<Vec<u8>> {
    if params.len() != args.len() {
        return Err(Error::InvalidParams(format!(
            "Invalid number of arguments to Solidity function: expected {}, got {}",
            params.len(),
            args.len()
        )));
    }
    if params.is_empty() {
        return Ok(Vec::new());
    }
    let mut tokens = Vec::with_capacity(args.len());
    for (param, arg) in params.iter().zip(args) {
        let ty = param.sol_type()?;
        let token = coerce(&ty, arg).map_err(|e| match e {
            Error::Abi(msg) => Error::Abi(format!("argument '{}' ({}): {msg}", param.name, param.ty)),
            other => other,
        })?;
        tokens.push(token);
    }
    Ok(DynSolValue::Tuple(tokens).abi_encode_params())
}

/// Selector followed by the encoded arguments.
pub fn encode_call(item: &AbiItem, args: &[Value]) -> Result<Vec<u8>> {
    let mut out = item.selector().to_vec();
    out.extend(encode_args(&item.inputs, args)?);
    Ok(out)
}

/// Decode a function's return data into one token per output.
pub fn decode_output(item: &AbiItem, data: &[u8]) -> Result<Vec<DynSolValue>> {
    if item.outputs.is_empty() {
        return Ok(Vec::new());
    }
    if data.is_empty() {
        return Err(Error::Abi(format!("{}: empty return data", item.signature())));
    }
    let ty = DynSolType::Tuple(item.output_types()?);
    match ty.abi_decode_params(data)? {
        DynSolValue::Tuple(values) => Ok(values),
        other => Ok(vec![other]),
    }
}

/// JSON view of decoded outputs: `null` for none, the bare value for one,
/// an array for several.
pub fn outputs_to_json(values: &[DynSolValue]) -> Value {
    match values {
        [] => Value::Null,
        [one] => token_to_json(one),
        many => Value::Array(many.iter().map(token_to_json).collect()),
    }
}

/// JSON view of a single token. Integers are decimal strings so no
/// precision is lost.
pub fn token_to_json(v: &DynSolValue) -> Value {
    match v {
        DynSolValue::Bool(b) => Value::Bool(*b),
        DynSolValue::Uint(n, _) => Value::String(n.to_string()),
        DynSolValue::Int(i, _) => Value::String(i.to_string()),
        DynSolValue::Address(a) => Value::String(a.to_checksum(None)),
        DynSolValue::FixedBytes(word, size) => Value::String(format!("0x{}", hex::encode(&word[..*size]))),
        DynSolValue::Bytes(b) => Value::String(format!("0x{}", hex::encode(b))),
        DynSolValue::String(s) => Value::String(s.clone()),
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) | DynSolValue::Tuple(items) => {
            Value::Array(items.iter().map(token_to_json).collect())
        }
        other => Value::String(format!("{other:?}")),
    }
}

// ---- Coercion -------------------------------------------------------------------

/// Convert a JSON argument into a token of type `ty`.
pub fn coerce(ty: &DynSolType, v: &Value) -> Result<DynSolValue> {
    let mismatch = || Error::Abi(format!("cannot use {v} as {ty}"));
    match ty {
        DynSolType::Address => {
            let s = v.as_str().ok_or_else(mismatch)?;
            let a = s.parse::<Address>().map_err(|_| mismatch())?;
            Ok(DynSolValue::Address(a))
        }
        DynSolType::Bool => match v {
            Value::Bool(b) => Ok(DynSolValue::Bool(*b)),
            Value::String(s) if s == "true" => Ok(DynSolValue::Bool(true)),
            Value::String(s) if s == "false" => Ok(DynSolValue::Bool(false)),
            Value::Number(n) if n.as_u64() == Some(0) => Ok(DynSolValue::Bool(false)),
            Value::Number(n) if n.as_u64() == Some(1) => Ok(DynSolValue::Bool(true)),
            _ => Err(mismatch()),
        },
        DynSolType::Uint(bits) => {
            let n = json_uint(v).ok_or_else(mismatch)?;
            if *bits < 256 && n.bit_len() > *bits {
                return Err(Error::Abi(format!("{n} does not fit in uint{bits}")));
            }
            Ok(DynSolValue::Uint(n, *bits))
        }
        DynSolType::Int(bits) => {
            let i = json_int(v).ok_or_else(mismatch)?;
            if *bits < 256 {
                // [-2^(bits-1), 2^(bits-1) - 1]
                let limit = U256::from(1u8) << (*bits - 1);
                let abs = i.unsigned_abs();
                let fits = if i.is_negative() { abs <= limit } else { abs < limit };
                if !fits {
                    return Err(Error::Abi(format!("{i} does not fit in int{bits}")));
                }
            }
            Ok(DynSolValue::Int(i, *bits))
        }
        DynSolType::FixedBytes(size) => {
            let s = v.as_str().ok_or_else(mismatch)?;
            let bytes = text_or_hex(s)?;
            if bytes.len() > *size {
                return Err(Error::Abi(format!("{} bytes do not fit in bytes{size}", bytes.len())));
            }
            Ok(DynSolValue::FixedBytes(B256::right_padding_from(&bytes), *size))
        }
        DynSolType::Bytes => {
            let s = v.as_str().ok_or_else(mismatch)?;
            Ok(DynSolValue::Bytes(text_or_hex(s)?))
        }
        DynSolType::String => match v {
            Value::String(s) => Ok(DynSolValue::String(s.clone())),
            Value::Number(n) => Ok(DynSolValue::String(n.to_string())),
            _ => Err(mismatch()),
        },
        DynSolType::Array(inner) => {
            let items = v.as_array().ok_or_else(mismatch)?;
            let tokens = items.iter().map(|item| coerce(inner, item)).collect::<Result<Vec<_>>>()?;
            Ok(DynSolValue::Array(tokens))
        }
        DynSolType::FixedArray(inner, len) => {
            let items = v.as_array().ok_or_else(mismatch)?;
            if items.len() != *len {
                return Err(Error::Abi(format!("expected {len} elements, got {}", items.len())));
            }
            let tokens = items.iter().map(|item| coerce(inner, item)).collect::<Result<Vec<_>>>()?;
            Ok(DynSolValue::FixedArray(tokens))
        }
        DynSolType::Tuple(types) => {
            let items = v.as_array().ok_or_else(mismatch)?;
            if items.len() != types.len() {
                return Err(Error::Abi(format!("expected {} tuple fields, got {}", types.len(), items.len())));
            }
            let tokens = types
                .iter()
                .zip(items)
                .map(|(t, item)| coerce(t, item))
                .collect::<Result<Vec<_>>>()?;
            Ok(DynSolValue::Tuple(tokens))
        }
        _ => Err(Error::Abi(format!("unsupported parameter type {ty}"))),
    }
}

fn json_uint(v: &Value) -> Option<U256> {
    match v {
        Value::Number(n) => n.as_u64().map(U256::from),
        Value::String(s) => s.trim().parse::<U256>().ok(),
        other if is_numeric_like(other) => numeric_to_string(other)?.parse::<U256>().ok(),
        _ => None,
    }
}

fn json_int(v: &Value) -> Option<I256> {
    let digits = match v {
        Value::Number(n) => n.as_i64()?.to_string(),
        Value::String(s) => s.trim().to_string(),
        other if is_numeric_like(other) => numeric_to_string(other)?,
        _ => return None,
    };
    if digits.starts_with("0x") || digits.starts_with("-0x") {
        I256::from_hex_str(&digits).ok()
    } else {
        I256::from_dec_str(&digits).ok()
    }
}

fn text_or_hex(s: &str) -> Result<Vec<u8>> {
    match s.strip_prefix("0x") {
        Some(digits) => Ok(hex::decode(digits)?),
        None => Ok(s.as_bytes().to_vec()),
    }
}
