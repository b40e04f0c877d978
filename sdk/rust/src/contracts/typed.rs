//! Conversions used by generated bindings: Rust values → JSON arguments, and
//! decoded ABI tokens → Rust values.

use crate::abi::token_to_json;
use crate::error::{Error, Result};
use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, Bytes, FixedBytes, I256, U256};
use serde_json::Value;

/// A value usable as a positional contract argument.
pub trait IntoArg {
    fn into_arg(self) -> Value;
}

impl IntoArg for Value {
    fn into_arg(self) -> Value {
        self
    }
}

impl IntoArg for &str {
    fn into_arg(self) -> Value {
        Value::String(self.to_string())
    }
}

impl IntoArg for String {
    fn into_arg(self) -> Value {
        Value::String(self)
    }
}

impl IntoArg for bool {
    fn into_arg(self) -> Value {
        Value::Bool(self)
    }
}

macro_rules! int_arg {
    ($($t:ty),+) => {
        $(impl IntoArg for $t {
            fn into_arg(self) -> Value {
                Value::from(self)
            }
        })+
    };
}

int_arg!(u8, u16, u32, u64, i8, i16, i32, i64);

impl IntoArg for U256 {
    fn into_arg(self) -> Value {
        Value::String(self.to_string())
    }
}

impl IntoArg for I256 {
    fn into_arg(self) -> Value {
        Value::String(self.to_string())
    }
}

impl IntoArg for Address {
    fn into_arg(self) -> Value {
        Value::String(self.to_checksum(None))
    }
}

impl<const N: usize> IntoArg for FixedBytes<N> {
    fn into_arg(self) -> Value {
        Value::String(format!("0x{}", hex::encode(self.as_slice())))
    }
}

impl IntoArg for Bytes {
    fn into_arg(self) -> Value {
        Value::String(format!("0x{}", hex::encode(&self)))
    }
}

impl<T: IntoArg> IntoArg for Vec<T> {
    fn into_arg(self) -> Value {
        Value::Array(self.into_iter().map(IntoArg::into_arg).collect())
    }
}

/// A Rust value decodable from one ABI token.
pub trait FromToken: Sized {
    fn from_token(token: DynSolValue) -> Result<Self>;
}

fn unexpected<T>(want: &str, got: &DynSolValue) -> Result<T> {
    Err(Error::Abi(format!("expected {want}, got {got:?}")))
}

impl FromToken for DynSolValue {
    fn from_token(token: DynSolValue) -> Result<Self> {
        Ok(token)
    }
}

impl FromToken for Value {
    fn from_token(token: DynSolValue) -> Result<Self> {
        Ok(token_to_json(&token))
    }
}

impl FromToken for U256 {
    fn from_token(token: DynSolValue) -> Result<Self> {
        match token {
            DynSolValue::Uint(n, _) => Ok(n),
            other => unexpected("uint", &other),
        }
    }
}

impl FromToken for I256 {
    fn from_token(token: DynSolValue) -> Result<Self> {
        match token {
            DynSolValue::Int(i, _) => Ok(i),
            other => unexpected("int", &other),
        }
    }
}

impl FromToken for Address {
    fn from_token(token: DynSolValue) -> Result<Self> {
        match token {
            DynSolValue::Address(a) => Ok(a),
            other => unexpected("address", &other),
        }
    }
}

impl FromToken for bool {
    fn from_token(token: DynSolValue) -> Result<Self> {
        match token {
            DynSolValue::Bool(b) => Ok(b),
            other => unexpected("bool", &other),
        }
    }
}

impl FromToken for String {
    fn from_token(token: DynSolValue) -> Result<Self> {
        match token {
            DynSolValue::String(s) => Ok(s),
            other => unexpected("string", &other),
        }
    }
}

impl FromToken for Bytes {
    fn from_token(token: DynSolValue) -> Result<Self> {
        match token {
            DynSolValue::Bytes(b) => Ok(Bytes::from(b)),
            other => unexpected("bytes", &other),
        }
    }
}

impl<const N: usize> FromToken for FixedBytes<N> {
    fn from_token(token: DynSolValue) -> Result<Self> {
        match token {
            DynSolValue::FixedBytes(word, size) if size == N => Ok(FixedBytes::<N>::from_slice(&word[..N])),
            other => unexpected(&format!("bytes{N}"), &other),
        }
    }
}

impl<T: FromToken> FromToken for Vec<T> {
    fn from_token(token: DynSolValue) -> Result<Self> {
        match token {
            DynSolValue::Array(items) | DynSolValue::FixedArray(items) => {
                items.into_iter().map(T::from_token).collect()
            }
            other => unexpected("array", &other),
        }
    }
}

/// A Rust value decodable from a function's full list of outputs.
///
/// Single-output functions decode into the output's type, multi-output
/// functions into a tuple, output-less functions into `()`.
pub trait FromOutputs: Sized {
    fn from_outputs(tokens: Vec<DynSolValue>) -> Result<Self>;
}

impl FromOutputs for () {
    fn from_outputs(_tokens: Vec<DynSolValue>) -> Result<Self> {
        Ok(())
    }
}

fn single(tokens: Vec<DynSolValue>) -> Result<DynSolValue> {
    let n = tokens.len();
    let mut it = tokens.into_iter();
    match (it.next(), n) {
        (Some(token), 1) => Ok(token),
        _ => Err(Error::Abi(format!("expected exactly one output, got {n}"))),
    }
}

macro_rules! single_output {
    ($($t:ty),+) => {
        $(impl FromOutputs for $t {
            fn from_outputs(tokens: Vec<DynSolValue>) -> Result<Self> {
                <$t>::from_token(single(tokens)?)
            }
        })+
    };
}

single_output!(DynSolValue, Value, U256, I256, Address, bool, String, Bytes);

impl<const N: usize> FromOutputs for FixedBytes<N> {
    fn from_outputs(tokens: Vec<DynSolValue>) -> Result<Self> {
        Self::from_token(single(tokens)?)
    }
}

impl<T: FromToken> FromOutputs for Vec<T> {
    fn from_outputs(tokens: Vec<DynSolValue>) -> Result<Self> {
        Self::from_token(single(tokens)?)
    }
}

macro_rules! tuple_outputs {
    ($($name:ident),+) => {
        impl<$($name: FromToken),+> FromOutputs for ($($name,)+) {
            fn from_outputs(tokens: Vec<DynSolValue>) -> Result<Self> {
                let expected = [$(stringify!($name)),+].len();
                if tokens.len() != expected {
                    return Err(Error::Abi(format!("expected {expected} outputs, got {}", tokens.len())));
                }
                let mut it = tokens.into_iter();
                Ok(($(
                    $name::from_token(it.next().ok_or_else(|| Error::Abi("missing output".into()))?)?,
                )+))
            }
        }
    };
}

tuple_outputs!(A, B);
tuple_outputs!(A, B, C);
tuple_outputs!(A, B, C, D);
tuple_outputs!(A, B, C, D, E);
