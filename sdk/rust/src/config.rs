//! Immutable binding configuration.
//!
//! One `BindingConfig` value is handed to each factory / contract at
//! construction; nothing in the crate mutates it afterwards. Changing a
//! setting means building a new value (`with_*` methods return copies).

use crate::params::TxParams;
use crate::types::NetworkId;
use std::time::Duration;

/// Default confirmation timeout (240 s).
pub const DEFAULT_SYNCHRONIZATION_TIMEOUT: Duration = Duration::from_secs(240);

/// Fixed interval between receipt queries.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Default JSON-RPC host / port.
pub const DEFAULT_RPC_HOST: &str = "localhost";
pub const DEFAULT_RPC_PORT: u16 = 8545;

/// Per-contract dispatch settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingConfig {
    /// Pinned network id. `None` means auto-detect via `net_version`.
    pub network: Option<NetworkId>,
    /// Call parameters every call starts from.
    pub defaults: TxParams,
    /// How long to wait for a receipt; `Duration::ZERO` waits forever.
    pub synchronization_timeout: Duration,
    /// Delay between receipt queries.
    pub poll_interval: Duration,
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            network: None,
            defaults: TxParams::default(),
            synchronization_timeout: DEFAULT_SYNCHRONIZATION_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl BindingConfig {
    pub fn with_network(mut self, network: impl Into<NetworkId>) -> Self {
        self.network = Some(network.into());
        self
    }

    /// Merge `defaults` over the existing defaults.
    pub fn with_defaults(mut self, defaults: TxParams) -> Self {
        self.defaults = defaults.merged_over(&self.defaults);
        self
    }

    pub fn with_synchronization_timeout(mut self, timeout: Duration) -> Self {
        self.synchronization_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// `None` when the timeout is disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (!self.synchronization_timeout.is_zero()).then_some(self.synchronization_timeout)
    }
}

/// Location of the JSON-RPC endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcConfig {
    pub host: String,
    pub port: u16,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self { host: DEFAULT_RPC_HOST.to_string(), port: DEFAULT_RPC_PORT }
    }
}

impl RpcConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self { host: host.into(), port }
    }

    /// `http://<host>:<port>`
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}
