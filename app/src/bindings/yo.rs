// Generated by contract-binding-codegen from `Yo.json`. Do not edit.
// Artifact compiled with 3.1.2.
#![allow(clippy::too_many_arguments, dead_code)]

use contract_binding::prelude::*;

/// `Yo` artifact: ABI, bytecode and per-network addresses.
pub const ARTIFACT: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/artifacts/Yo.json"));

pub const EVENT_TRIGGER: &str = "trigger";

/// Typed handle to a `Yo` instance.
#[derive(Debug, Clone)]
pub struct Yo {
    inner: Contract,
}

impl From<Contract> for Yo {
    fn from(inner: Contract) -> Self {
        Self { inner }
    }
}

impl Yo {
    /// Factory over the embedded artifact.
    pub fn factory() -> Result<ContractFactory> {
        ContractFactory::from_json(ARTIFACT)
    }

    /// Deploy a new instance (`constructor()`).
    pub async fn deploy(factory: &ContractFactory, params: TxParams) -> Result<Self> {
        let args = vec![];
        factory.deploy_with(args, params).await.map(Self::from)
    }

    pub fn at(factory: &ContractFactory, address: &str) -> Result<Self> {
        factory.at(address).map(Self::from)
    }

    pub async fn deployed(factory: &ContractFactory) -> Result<Self> {
        factory.deployed().await.map(Self::from)
    }

    pub fn contract(&self) -> &Contract {
        &self.inner
    }

    pub fn address(&self) -> Address {
        self.inner.address()
    }

    /// `__callback(bytes32,string,bytes)`.
    pub async fn callback(&self, myid: B256, result: String, proof: Bytes, params: TxParams) -> Result<Confirmation> {
        let args = vec![myid.into_arg(), result.into_arg(), proof.into_arg()];
        self.inner.send_and_confirm_with("__callback", args, params).await
    }

    /// `ora()`, read-only.
    pub async fn ora(&self, params: TxParams) -> Result<Address> {
        let args = vec![];
        self.inner.call_as("ora", args, params).await
    }

    /// `update(uint256)`.
    pub async fn update(&self, delay: U256, params: TxParams) -> Result<Confirmation> {
        let args = vec![delay.into_arg()];
        self.inner.send_and_confirm_with("update", args, params).await
    }

    /// `owner()`, read-only.
    pub async fn owner(&self, params: TxParams) -> Result<Address> {
        let args = vec![];
        self.inner.call_as("owner", args, params).await
    }

    /// `balance()`, read-only.
    pub async fn balance(&self, params: TxParams) -> Result<U256> {
        let args = vec![];
        self.inner.call_as("balance", args, params).await
    }

    /// `ETHXBT()`, read-only.
    pub async fn ethxbt(&self, params: TxParams) -> Result<String> {
        let args = vec![];
        self.inner.call_as("ETHXBT", args, params).await
    }

    /// `trig(uint256)`.
    pub async fn trig(&self, result: U256, params: TxParams) -> Result<Confirmation> {
        let args = vec![result.into_arg()];
        self.inner.send_and_confirm_with("trig", args, params).await
    }
}
