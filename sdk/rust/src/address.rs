//! Account / contract addresses (`0x` + 40 hex chars).
//!
//! Lookups by address reject anything that is not exactly 42 characters long
//! before any RPC round-trip, matching the length check of the descriptor API.
//! Mixed-case input is accepted without enforcing the EIP-55 checksum; output
//! is always checksummed.

use crate::error::{Error, Result};
use alloy_primitives::Address;

/// Textual length of an address: `0x` prefix plus 40 hex digits.
pub const ADDRESS_STR_LEN: usize = 42;

/// Parse a `0x`-prefixed address string, labelling failures with `contract`.
pub fn parse_address(contract: &str, s: &str) -> Result<Address> {
    let invalid = || Error::InvalidAddress { contract: contract.to_string(), address: s.to_string() };
    if s.len() != ADDRESS_STR_LEN {
        return Err(invalid());
    }
    let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).ok_or_else(invalid)?;
    let mut out = [0u8; 20];
    hex::decode_to_slice(digits, &mut out).map_err(|_| invalid())?;
    Ok(Address::from(out))
}

/// Lowercase hex without `0x`, as spliced into linked bytecode.
pub fn bare_hex(addr: &Address) -> String {
    hex::encode(addr.as_slice())
}

/// EIP-55 checksummed string form.
pub fn to_checksum(addr: &Address) -> String {
    addr.to_checksum(None)
}
