// RPC round-trip smoke tests against a live node.
//
// These tests are *ignored by default* so they don't fail CI when no
// local node is running. To run them, start a dev node and execute:
//
//   RPC_URL=http://localhost:8545 \
//   cargo test -p contract-binding --test rpc_roundtrip -- --ignored --nocapture
//
// Optional env:
//   RPC_URL   (default: http://localhost:8545)

use std::env;
use std::time::Duration;

use contract_binding::rpc::eth;
use contract_binding::rpc::http::HttpTransport;

fn rpc_url() -> String {
    env::var("RPC_URL").unwrap_or_else(|_| "http://localhost:8545".to_string())
}

fn transport() -> HttpTransport {
    HttpTransport::builder(&rpc_url())
        .and_then(|b| b.timeout(Duration::from_secs(10)).build())
        .expect("valid RPC_URL")
}

#[tokio::test]
#[ignore]
async fn net_version_and_accounts() -> Result<(), Box<dyn std::error::Error>> {
    let t = transport();

    let network = eth::net_version(&t).await?;
    println!("net_version → {network}");
    assert!(!network.is_empty());

    let accounts = eth::accounts(&t).await?;
    println!("eth_accounts → {} account(s)", accounts.len());
    Ok(())
}

#[tokio::test]
#[ignore]
async fn unknown_method_is_an_rpc_error() {
    let t = transport();
    let err = contract_binding::rpc::eth::call::<serde_json::Value>(&t, "nope_doesNotExist", serde_json::json!([]))
        .await
        .unwrap_err();
    eprintln!("expected error: {err}");
    assert!(err.is_rpc());
}
