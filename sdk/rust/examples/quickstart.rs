// Deploy + call quickstart for the contract binding layer.
// --------------------------------------------------------
// This example shows how to:
//
// 1) Connect to a node via JSON-RPC
// 2) Deploy a contract from its artifact, from the node's first account
// 3) Call a read-only function and send a transaction
//
// Requirements
// - A local dev node (ganache, anvil, geth --dev) with unlocked accounts
//
// Run:
//   cargo run -p contract-binding --example quickstart -- path/to/Yo.json
//
// Optional env:
//   RPC_URL   (default: http://localhost:8545)
//   RUST_LOG  (e.g. contract_binding=debug)

use std::env;
use std::sync::Arc;

use contract_binding::prelude::*;
use contract_binding::rpc::eth;
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let rpc_url = env::var("RPC_URL").unwrap_or_else(|_| RpcConfig::default().url());
    let artifact_path = env::args().nth(1).ok_or("usage: quickstart <artifact.json>")?;
    let artifact = std::fs::read_to_string(&artifact_path)?;

    let provider: Provider = Arc::new(HttpTransport::new(&rpc_url)?);
    let accounts = eth::accounts(provider.as_ref()).await?;
    let from = *accounts.first().ok_or("node returned no accounts")?;

    let factory = ContractFactory::from_json(&artifact)?
        .with_provider(provider)
        .with_defaults(TxParams::new().from(from).gas(3_000_000));
    println!("networks in artifact: {:?}", factory.networks());

    let yo = factory.deploy(vec![]).await?;
    println!("{} deployed at {:#x}", yo.name(), yo.address());

    let balance: U256 = yo.call_as("balance", vec![], TxParams::default()).await?;
    println!("balance() → {balance}");

    let confirmation = yo.send_and_confirm("trig", vec![json!(10)]).await?;
    println!(
        "trig(10) mined in block {:?} (gas used {:?})",
        confirmation.receipt.block_number, confirmation.receipt.gas_used
    );
    for ev in yo.decode_events(&confirmation.receipt)? {
        println!("  event {} {}", ev.event, serde_json::Value::Object(ev.args));
    }
    Ok(())
}
