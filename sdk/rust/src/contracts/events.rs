//! Event log decoding.
//!
//! - topic0 = `keccak256("Name(type1,type2,...)")` selects the ABI event;
//!   anonymous events have no such topic and are not matched.
//! - Topics 1.. carry the **indexed** parameters. Static types are decoded
//!   from the 32-byte word; dynamic ones (`string`, `bytes`, arrays, tuples)
//!   are only present as `keccak256(value)` and are surfaced as that hash.
//! - Non-indexed parameters are ABI-encoded in `data`.
//!
//! Decoded values use the same JSON conventions as call results (integers as
//! decimal strings, checksummed addresses, `0x` hex bytes). Parameters without
//! a name are keyed by their position.

use crate::abi::{token_to_json, Abi, AbiItem, Param};
use crate::error::{Error, Result};
use crate::types::{Log, TxHash};
use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{Address, B256};
use serde::Serialize;
use serde_json::{Map, Value};

/// A log matched against an ABI event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedEvent {
    pub event: String,
    pub address: Address,
    pub args: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<TxHash>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_index: Option<u64>,
}

/// Decode one log. `Ok(None)` when no event in `abi` matches its topic0.
pub fn decode_log(abi: &Abi, log: &Log) -> Result<Option<DecodedEvent>> {
    let Some(topic0) = log.topics.first() else {
        return Ok(None);
    };
    let Some(event) = abi.event_by_topic(topic0) else {
        return Ok(None);
    };
    let args = decode_args(event, &log.topics[1..], &log.data)?;
    Ok(Some(DecodedEvent {
        event: event.name().to_string(),
        address: log.address,
        args,
        block_number: log.block_number.map(|n| n.to::<u64>()),
        transaction_hash: log.transaction_hash,
        log_index: log.log_index.map(|n| n.to::<u64>()),
    }))
}

/// Decode every log `abi` knows about; unknown logs are skipped.
pub fn decode_logs(abi: &Abi, logs: &[Log]) -> Result<Vec<DecodedEvent>> {
    let mut out = Vec::new();
    for log in logs {
        if let Some(ev) = decode_log(abi, log)? {
            out.push(ev);
        }
    }
    Ok(out)
}

fn decode_args(event: &AbiItem, topics: &[B256], data: &[u8]) -> Result<Map<String, Value>> {
    let indexed_count = event.inputs.iter().filter(|p| p.indexed).count();
    if topics.len() < indexed_count {
        return Err(Error::Abi(format!(
            "{}: expected {indexed_count} indexed topics, got {}",
            event.signature(),
            topics.len()
        )));
    }

    let plain: Vec<&Param> = event.inputs.iter().filter(|p| !p.indexed).collect();
    let mut plain_values = if plain.is_empty() {
        Vec::new()
    } else {
        let types = plain.iter().map(|p| p.sol_type()).collect::<Result<Vec<_>>>()?;
        match DynSolType::Tuple(types).abi_decode_params(data)? {
            DynSolValue::Tuple(values) => values,
            other => vec![other],
        }
    }
    .into_iter();

    let mut topics = topics.iter();
    let mut args = Map::new();
    for (i, param) in event.inputs.iter().enumerate() {
        let value = if param.indexed {
            let topic = topics.next().ok_or_else(|| Error::Abi("missing topic".into()))?;
            indexed_value(param, topic)?
        } else {
            let token = plain_values.next().ok_or_else(|| Error::Abi("missing event data".into()))?;
            token_to_json(&token)
        };
        let key = if param.name.is_empty() { i.to_string() } else { param.name.clone() };
        args.insert(key, value);
    }
    Ok(args)
}

fn indexed_value(param: &Param, topic: &B256) -> Result<Value> {
    let ty = param.sol_type()?;
    if is_hashed(&ty) {
        return Ok(Value::String(format!("{topic:#x}")));
    }
    Ok(token_to_json(&ty.abi_decode(topic.as_slice())?))
}

fn is_hashed(ty: &DynSolType) -> bool {
    matches!(
        ty,
        DynSolType::String
            | DynSolType::Bytes
            | DynSolType::Array(_)
            | DynSolType::FixedArray(..)
            | DynSolType::Tuple(_)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;
    use serde_json::json;

    fn abi() -> Abi {
        serde_json::from_value(json!([
            {"anonymous": false, "inputs": [{"indexed": false, "name": "", "type": "string"}],
             "name": "paymentSuccess", "type": "event"},
            {"anonymous": false, "inputs": [
                {"indexed": true, "name": "to", "type": "address"},
                {"indexed": false, "name": "amount", "type": "uint256"},
                {"indexed": true, "name": "memo", "type": "string"}],
             "name": "userReceive", "type": "event"}
        ]))
        .unwrap()
    }

    fn log(topics: Vec<B256>, data: Vec<u8>) -> Log {
        serde_json::from_value(json!({
            "address": Address::repeat_byte(0x11),
            "topics": topics,
            "data": format!("0x{}", hex::encode(data)),
            "blockNumber": "0x10",
            "logIndex": "0x0",
        }))
        .unwrap()
    }

    #[test]
    fn decodes_non_indexed_string() {
        let abi = abi();
        let topic = abi.event("paymentSuccess").unwrap().topic();
        let data = DynSolValue::Tuple(vec![DynSolValue::String("paid".into())]).abi_encode_params();
        let ev = decode_log(&abi, &log(vec![topic], data)).unwrap().unwrap();
        assert_eq!(ev.event, "paymentSuccess");
        assert_eq!(ev.args["0"], json!("paid"));
        assert_eq!(ev.block_number, Some(16));
    }

    #[test]
    fn indexed_static_and_dynamic_params() {
        let abi = abi();
        let topic = abi.event("userReceive").unwrap().topic();
        let to = Address::repeat_byte(0x22);
        let memo_hash = B256::repeat_byte(0x33);
        let data = DynSolValue::Tuple(vec![DynSolValue::Uint(U256::from(500), 256)]).abi_encode_params();
        let ev = decode_log(&abi, &log(vec![topic, to.into_word(), memo_hash], data)).unwrap().unwrap();
        assert_eq!(ev.args["to"], json!(to.to_checksum(None)));
        assert_eq!(ev.args["amount"], json!("500"));
        assert_eq!(ev.args["memo"], json!(format!("{memo_hash:#x}")));
    }

    #[test]
    fn unknown_topics_are_skipped() {
        let abi = abi();
        let logs = vec![log(vec![B256::repeat_byte(9)], vec![]), log(vec![], vec![])];
        assert!(decode_logs(&abi, &logs).unwrap().is_empty());
    }

    #[test]
    fn missing_indexed_topic_is_an_error() {
        let abi = abi();
        let topic = abi.event("userReceive").unwrap().topic();
        assert!(decode_log(&abi, &log(vec![topic], vec![])).is_err());
    }
}
