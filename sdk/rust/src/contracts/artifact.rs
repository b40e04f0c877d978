//! Per-network contract descriptors (artifacts) and library linking.
//!
//! Artifact JSON layout:
//!
//! ```json
//! {
//!   "contract_name": "Test",
//!   "generated_with": "3.1.2",
//!   "networks": {
//!     "default": {
//!       "abi": [ ... ],
//!       "unlinked_binary": "0x6060...__StringUtils___________________________...",
//!       "address": "0x60b8e8baaeb9de2020e00a9e2c43000f6f4f49b4",
//!       "links": { "StringUtils": "0x205314f71527ee020cdb58fc79d9971af6979918" },
//!       "updated_at": 1476624079367,
//!       "events": { "0x<topic>": { "type": "event", ... } }
//!     }
//!   }
//! }
//! ```
//!
//! Library references in bytecode are 40-character placeholder slots of the
//! form `__<Name>___...`; linking replaces each slot with the library's
//! address (hex, no `0x`).

use crate::abi::{Abi, AbiItem};
use crate::address::bare_hex;
use crate::error::{Error, Result};
use crate::types::NetworkId;
use alloy_primitives::Address;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Network keys tried, in order, when the node reports the main network.
pub const MAINNET_ALIASES: [&str; 3] = ["1", "live", "default"];

/// Everything known about a contract on one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkArtifact {
    pub abi: Abi,
    /// Creation bytecode (`0x`-hex) possibly containing library placeholders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlinked_binary: Option<String>,
    /// Deployed address on this network, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    /// Library name → deployed library address.
    #[serde(default)]
    pub links: BTreeMap<String, Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<u64>,
    /// Event items keyed by topic hash, as recorded at compile time.
    #[serde(default)]
    pub events: BTreeMap<String, AbiItem>,
}

/// A contract's artifacts across all networks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractDescriptor {
    pub contract_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_with: Option<String>,
    pub networks: BTreeMap<NetworkId, NetworkArtifact>,
}

impl ContractDescriptor {
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn network_ids(&self) -> Vec<&str> {
        self.networks.keys().map(String::as_str).collect()
    }

    pub fn network(&self, id: &str) -> Option<&NetworkArtifact> {
        self.networks.get(id)
    }

    /// Map the id a node reports onto an artifact key.
    ///
    /// The main network (`"1"`) may be recorded as `"1"`, `"live"` or
    /// `"default"`; the first present wins. Any other id must match exactly.
    pub fn select_network(&self, reported: &str) -> Result<NetworkId> {
        let chosen = if reported == "1" {
            MAINNET_ALIASES.iter().find(|id| self.networks.contains_key(**id)).copied().unwrap_or(reported)
        } else {
            reported
        };
        if self.networks.contains_key(chosen) {
            Ok(chosen.to_string())
        } else {
            Err(Error::UnknownNetwork { contract: self.contract_name.clone(), network_id: chosen.to_string() })
        }
    }
}

/// Replace every `__<name>_*` slot with the linked library address.
pub fn link_bytecode(unlinked: &str, links: &BTreeMap<String, Address>) -> Result<String> {
    let mut binary = unlinked.to_string();
    for (name, address) in links {
        let slot = Regex::new(&format!("__{}_*", regex::escape(name)))
            .map_err(|e| Error::InvalidParams(format!("library name '{name}': {e}")))?;
        binary = slot.replace_all(&binary, bare_hex(address).as_str()).into_owned();
    }
    Ok(binary)
}

/// Library names still referenced by placeholder slots: sorted, de-duplicated.
pub fn unresolved_libraries(binary: &str) -> Vec<String> {
    let mut names: Vec<String> = placeholder_pattern()
        .find_iter(binary)
        .map(|m| m.as_str().replace('_', ""))
        .collect();
    names.sort();
    names.dedup();
    names
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new("__[^_]+_+").expect("placeholder pattern is valid"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn slot(name: &str) -> String {
        format!("__{name}{}", "_".repeat(38 - name.len()))
    }

    fn descriptor(keys: &[&str]) -> ContractDescriptor {
        let networks: serde_json::Map<String, serde_json::Value> =
            keys.iter().map(|k| (k.to_string(), json!({"abi": []}))).collect();
        serde_json::from_value(json!({"contract_name": "Yo", "networks": networks})).unwrap()
    }

    #[test]
    fn links_every_occurrence() {
        let lib = Address::repeat_byte(0x20);
        let code = format!("0x6060{}aa{}", slot("StringUtils"), slot("StringUtils"));
        let linked = link_bytecode(&code, &BTreeMap::from([("StringUtils".to_string(), lib)])).unwrap();
        assert_eq!(linked, format!("0x6060{}aa{}", "20".repeat(20), "20".repeat(20)));
        assert!(unresolved_libraries(&linked).is_empty());
    }

    #[test]
    fn lists_unresolved_sorted_and_unique() {
        let code = format!("0x60{}00{}00{}", slot("Zeta"), slot("Alpha"), slot("Zeta"));
        assert_eq!(unresolved_libraries(&code), vec!["Alpha".to_string(), "Zeta".to_string()]);
    }

    #[test]
    fn mainnet_prefers_numeric_then_live_then_default() {
        assert_eq!(descriptor(&["default", "live"]).select_network("1").unwrap(), "live");
        assert_eq!(descriptor(&["default"]).select_network("1").unwrap(), "default");
        assert_eq!(descriptor(&["1", "default"]).select_network("1").unwrap(), "1");
    }

    #[test]
    fn other_networks_must_match_exactly() {
        let d = descriptor(&["default"]);
        let err = d.select_network("1337").unwrap_err();
        assert_eq!(err.to_string(), "Yo error: Can't find artifacts for network id '1337'");
    }
}
