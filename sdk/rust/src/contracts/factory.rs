//! Contract factory: descriptor-level operations.
//!
//! A [`ContractFactory`] wraps one [`ContractDescriptor`] plus everything
//! needed to reach a node: provider, immutable [`BindingConfig`] and any
//! extra library links. Every `with_*` / `link*` method returns a new value,
//! so factories for several networks can coexist.
//!
//! ```no_run
//! # async fn demo(provider: contract_binding::rpc::Provider, json: &str) -> contract_binding::Result<()> {
//! use contract_binding::prelude::*;
//! use serde_json::json;
//!
//! let factory = ContractFactory::from_json(json)?.with_provider(provider);
//! let test = factory.deploy(vec![json!(100), json!({"gas": 3_000_000})]).await?;
//! println!("{} at {:#x}", test.name(), test.address());
//! # Ok(()) }
//! ```

use crate::abi::{encode_args, Abi};
use crate::address::parse_address;
use crate::config::BindingConfig;
use crate::contracts::artifact::{link_bytecode, unresolved_libraries, ContractDescriptor, NetworkArtifact};
use crate::contracts::client::Contract;
use crate::contracts::poller::ConfirmationPoller;
use crate::error::{Error, Result};
use crate::params::{decode_hex, split_tx_params, TxParams};
use crate::rpc::{eth, Provider};
use crate::types::NetworkId;
use alloy_primitives::{Address, Bytes};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

#[derive(Clone)]
pub struct ContractFactory {
    descriptor: Arc<ContractDescriptor>,
    provider: Option<Provider>,
    config: BindingConfig,
    links: BTreeMap<String, Address>,
}

impl std::fmt::Debug for ContractFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractFactory")
            .field("contract", &self.descriptor.contract_name)
            .field("has_provider", &self.provider.is_some())
            .field("config", &self.config)
            .field("links", &self.links)
            .finish()
    }
}

impl ContractFactory {
    pub fn new(descriptor: ContractDescriptor) -> Self {
        Self::from_descriptor(Arc::new(descriptor))
    }

    pub fn from_descriptor(descriptor: Arc<ContractDescriptor>) -> Self {
        Self { descriptor, provider: None, config: BindingConfig::default(), links: BTreeMap::new() }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::new(ContractDescriptor::from_json(json)?))
    }

    pub fn contract_name(&self) -> &str {
        &self.descriptor.contract_name
    }

    pub fn generated_with(&self) -> Option<&str> {
        self.descriptor.generated_with.as_deref()
    }

    pub fn descriptor(&self) -> &ContractDescriptor {
        &self.descriptor
    }

    pub fn provider(&self) -> Option<&Provider> {
        self.provider.as_ref()
    }

    pub fn config(&self) -> &BindingConfig {
        &self.config
    }

    // ---- builders ----------------------------------------------------------

    pub fn with_provider(mut self, provider: Provider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: BindingConfig) -> Self {
        self.config = config;
        self
    }

    /// Merge `defaults` over the current class defaults.
    pub fn with_defaults(mut self, defaults: TxParams) -> Self {
        self.config = self.config.with_defaults(defaults);
        self
    }

    /// Pin the network instead of asking the node.
    pub fn with_network(mut self, network: impl Into<NetworkId>) -> Self {
        self.config = self.config.with_network(network);
        self
    }

    /// Link a library by name; overrides the artifact's own link of that name.
    pub fn link(mut self, name: impl Into<String>, address: Address) -> Self {
        self.links.insert(name.into(), address);
        self
    }

    pub fn link_all<I, S>(mut self, links: I) -> Self
    where
        I: IntoIterator<Item = (S, Address)>,
        S: Into<String>,
    {
        self.links.extend(links.into_iter().map(|(n, a)| (n.into(), a)));
        self
    }

    // ---- network resolution ------------------------------------------------

    /// Network ids the descriptor has artifacts for.
    pub fn networks(&self) -> Vec<&str> {
        self.descriptor.network_ids()
    }

    pub fn artifact(&self, network: &str) -> Result<&NetworkArtifact> {
        self.descriptor.network(network).ok_or_else(|| Error::UnknownNetwork {
            contract: self.contract_name().to_string(),
            network_id: network.to_string(),
        })
    }

    /// Pinned network, or the one the node reports via `net_version`.
    pub async fn resolve_network(&self) -> Result<NetworkId> {
        if let Some(pinned) = &self.config.network {
            self.artifact(pinned)?;
            return Ok(pinned.clone());
        }
        let provider = self.require_provider()?;
        let reported = eth::net_version(provider.as_ref()).await?;
        let chosen = self.descriptor.select_network(&reported)?;
        debug!(contract = self.contract_name(), %reported, %chosen, "network resolved");
        Ok(chosen)
    }

    /// Creation bytecode for `network` with every known library linked.
    pub fn binary(&self, network: &str) -> Result<String> {
        let artifact = self.artifact(network)?;
        let unlinked = artifact
            .unlinked_binary
            .as_deref()
            .filter(|b| !b.is_empty() && *b != "0x")
            .ok_or_else(|| Error::MissingBinary { contract: self.contract_name().to_string() })?;
        let mut links = artifact.links.clone();
        links.extend(self.links.iter().map(|(n, a)| (n.clone(), *a)));
        link_bytecode(unlinked, &links)
    }

    // ---- instances ---------------------------------------------------------

    /// Deploy a new instance. `args` are the constructor arguments, optionally
    /// followed by an options object.
    pub async fn deploy(&self, mut args: Vec<Value>) -> Result<Contract> {
        let params = split_tx_params(&mut args)?.unwrap_or_default();
        self.deploy_with(args, params).await
    }

    #[instrument(level = "debug", skip(self, args, params), fields(contract = %self.descriptor.contract_name))]
    pub async fn deploy_with(&self, args: Vec<Value>, params: TxParams) -> Result<Contract> {
        let provider = self.require_provider()?.clone();
        // Fail on unlinked libraries before asking the node when the network
        // is already known.
        if let Some(network) = self.static_network() {
            self.ensure_linked(&self.binary(&network)?)?;
        }
        let network = self.resolve_network().await?;
        let binary = self.binary(&network)?;
        self.ensure_linked(&binary)?;

        let abi = self.artifact(&network)?.abi.clone();
        let mut tx = params.merged_over(&self.config.defaults);
        let mut data = match tx.data.take() {
            Some(explicit) => explicit.to_vec(),
            None => decode_hex(&binary)?,
        };
        if let Some(ctor) = abi.constructor() {
            data.extend(encode_args(&ctor.inputs, &args)?);
        } else if !args.is_empty() {
            return Err(Error::InvalidParams(format!(
                "{} has no constructor but {} argument(s) were given",
                self.contract_name(),
                args.len()
            )));
        }
        tx.data = Some(Bytes::from(data));

        let tx_hash = eth::send_transaction(provider.as_ref(), tx.to_json()?).await?;
        info!(contract = self.contract_name(), %network, tx = %tx_hash, "deployment submitted");

        let confirmation = ConfirmationPoller::from_config(&self.config).wait(provider.as_ref(), tx_hash).await?;
        let address = confirmation
            .receipt
            .contract_address
            .ok_or_else(|| Error::RpcResponse(format!("receipt for {tx_hash:#x} has no contractAddress")))?;
        let code = eth::get_code(provider.as_ref(), &address).await?;
        if code.is_empty() {
            return Err(Error::ContractNotStored { address: format!("{address:#x}") });
        }
        info!(contract = self.contract_name(), address = %address, "deployed");

        Ok(self.bind(abi, address, provider).with_transaction_hash(tx_hash))
    }

    /// Bind to an existing deployment. The address is validated before any
    /// node round-trip; the ABI comes from the pinned network, or the only
    /// network present, or `"default"`.
    pub fn at(&self, address: &str) -> Result<Contract> {
        let address = parse_address(self.contract_name(), address)?;
        let provider = self.require_provider()?.clone();
        let abi = self.static_abi()?;
        Ok(self.bind(abi, address, provider))
    }

    /// Like [`at`](Self::at) but resolves the network through the node first.
    pub async fn at_resolved(&self, address: &str) -> Result<Contract> {
        let address = parse_address(self.contract_name(), address)?;
        let provider = self.require_provider()?.clone();
        let network = self.resolve_network().await?;
        let abi = self.artifact(&network)?.abi.clone();
        Ok(self.bind(abi, address, provider))
    }

    /// Instance at the address recorded for the resolved network.
    pub async fn deployed(&self) -> Result<Contract> {
        let provider = self.require_provider()?.clone();
        let network = self.resolve_network().await?;
        let artifact = self.artifact(&network)?;
        let address = artifact.address.ok_or_else(|| Error::NotDeployed { contract: self.contract_name().to_string() })?;
        Ok(self.bind(artifact.abi.clone(), address, provider))
    }

    // ---- internals ---------------------------------------------------------

    fn require_provider(&self) -> Result<&Provider> {
        self.provider.as_ref().ok_or_else(|| Error::NoProvider { contract: self.contract_name().to_string() })
    }

    /// Network known without a node round-trip: pinned, or the only one.
    fn static_network(&self) -> Option<NetworkId> {
        if let Some(pinned) = &self.config.network {
            return Some(pinned.clone());
        }
        let mut ids = self.descriptor.networks.keys();
        match (ids.next(), ids.next()) {
            (Some(only), None) => Some(only.clone()),
            _ => None,
        }
    }

    fn ensure_linked(&self, binary: &str) -> Result<()> {
        let unresolved = unresolved_libraries(binary);
        if unresolved.is_empty() {
            return Ok(());
        }
        Err(Error::UnlinkedLibraries { contract: self.contract_name().to_string(), libraries: unresolved.join(", ") })
    }

    fn static_abi(&self) -> Result<Abi> {
        if let Some(pinned) = &self.config.network {
            return Ok(self.artifact(pinned)?.abi.clone());
        }
        let mut networks = self.descriptor.networks.iter();
        match (networks.next(), networks.next()) {
            (Some((_, only)), None) => Ok(only.abi.clone()),
            _ => Ok(self.artifact("default")?.abi.clone()),
        }
    }

    fn bind(&self, abi: Abi, address: Address, provider: Provider) -> Contract {
        Contract::new(self.contract_name(), Arc::new(abi), address, provider, Arc::new(self.config.clone()))
    }
}
