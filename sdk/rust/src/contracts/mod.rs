//! Contract bindings: descriptors, factories, bound instances.
//!
//! The flow is:
//!
//! ```text
//! artifact JSON ──► ContractFactory ──deploy/at/deployed──► Contract
//!                        │                                     │
//!                  resolve_network                 invoke / call / send
//!                  link / binary                     └─► ConfirmationPoller
//! ```
//!
//! ## Examples
//! ```no_run
//! use contract_binding::prelude::*;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # async fn demo(artifact: &str) -> contract_binding::Result<()> {
//! let provider: Provider = Arc::new(HttpTransport::new("http://localhost:8545")?);
//! let test = ContractFactory::from_json(artifact)?.with_provider(provider).deployed().await?;
//! let balance = test.call("queryBalance", vec![]).await?;
//! println!("balance={balance}");
//! # Ok(()) }
//! ```

pub mod artifact;
pub mod client;
pub mod events;
pub mod factory;
pub mod poller;
pub mod typed;

pub use artifact::{ContractDescriptor, NetworkArtifact};
pub use client::{Contract, Outcome};
pub use events::DecodedEvent;
pub use factory::ContractFactory;
pub use poller::{wait_for_receipt, ConfirmationPoller};
pub use typed::{FromOutputs, FromToken, IntoArg};
