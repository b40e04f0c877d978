// Call dispatch and descriptor-level behaviour against a scripted node.

mod common;

use std::sync::Arc;

use common::{receipt, tx_hash_hex, word, MockNode};
use contract_binding::prelude::*;
use serde_json::{json, Value};

const A: &str = "0x1111111111111111111111111111111111111111";
const B: &str = "0x2222222222222222222222222222222222222222";
const LIB: &str = "0x205314f71527ee020cdb58fc79d9971af6979918";
const DEPLOYED: &str = "0x60b8e8baaeb9de2020e00a9e2c43000f6f4f49b4";

fn slot(name: &str) -> String {
    format!("__{name}{}", "_".repeat(38 - name.len()))
}

fn abi() -> Value {
    json!([
        {"constant": true, "inputs": [], "name": "queryBalance",
         "outputs": [{"name": "", "type": "uint256"}], "type": "function"},
        {"constant": false, "inputs": [{"name": "_amount", "type": "uint256"}],
         "name": "receive", "outputs": [], "type": "function"},
        {"constant": true, "inputs": [], "name": "getInfo",
         "outputs": [{"name": "", "type": "bytes32"}, {"name": "", "type": "bytes32"}, {"name": "", "type": "uint256"}],
         "type": "function"},
        {"inputs": [{"name": "_createDate", "type": "uint256"}], "type": "constructor"},
        {"anonymous": false, "inputs": [{"indexed": false, "name": "", "type": "string"}],
         "name": "paymentSuccess", "type": "event"}
    ])
}

fn factory(networks: Value) -> ContractFactory {
    let json = json!({"contract_name": "Test", "generated_with": "3.1.2", "networks": networks}).to_string();
    ContractFactory::from_json(&json).unwrap()
}

fn linked_test() -> ContractFactory {
    factory(json!({
        "default": {
            "abi": abi(),
            "unlinked_binary": format!("0x6060{}00", slot("StringUtils")),
            "links": {"StringUtils": LIB},
            "address": DEPLOYED,
        }
    }))
}

fn with_node(f: ContractFactory, node: &Arc<MockNode>) -> ContractFactory {
    let provider: Provider = node.clone();
    f.with_provider(provider)
}

async fn bound(node: &Arc<MockNode>, defaults: TxParams) -> Contract {
    with_node(linked_test(), node).with_network("default").with_defaults(defaults).at(DEPLOYED).unwrap()
}

// ---- dispatch ----------------------------------------------------------------

#[tokio::test]
async fn trailing_options_merge_over_defaults() {
    let node = MockNode::new();
    node.on("eth_sendTransaction", json!(tx_hash_hex()));
    node.on("eth_getTransactionReceipt", receipt(None));
    let defaults = TxParams::new().from(A.parse().unwrap()).gas(90_000);
    let test = bound(&node, defaults).await;

    let outcome = test.invoke("receive", vec![json!(500), json!({"from": B})]).await.unwrap();

    let confirmation = outcome.confirmation().expect("transaction path");
    assert_eq!(format!("{:#x}", confirmation.tx_hash), tx_hash_hex());
    let tx = &node.last_params("eth_sendTransaction").unwrap()[0];
    assert_eq!(tx["from"].as_str().unwrap().to_lowercase(), B);
    assert_eq!(tx["gas"], json!("0x15f90"));
    assert_eq!(tx["to"].as_str().unwrap().to_lowercase(), DEPLOYED);
    assert!(tx["data"].as_str().unwrap().ends_with(&format!("{:064x}", 500)));
}

#[tokio::test]
async fn numeric_wrapper_stays_positional() {
    let node = MockNode::new();
    node.on("eth_sendTransaction", json!(tx_hash_hex()));
    node.on("eth_getTransactionReceipt", receipt(None));
    let test = bound(&node, TxParams::default()).await;

    test.invoke("receive", vec![json!({"s": 1, "e": 2, "c": [500]})]).await.unwrap();

    let tx = &node.last_params("eth_sendTransaction").unwrap()[0];
    assert!(tx["data"].as_str().unwrap().ends_with(&format!("{:064x}", 500)));
    assert!(tx.get("from").is_none());
}

#[tokio::test]
async fn read_only_returns_decoded_value() {
    let node = MockNode::new();
    node.on("eth_call", word(42));
    let test = bound(&node, TxParams::default()).await;

    let outcome = test.invoke("queryBalance", vec![]).await.unwrap();

    assert_eq!(outcome, Outcome::Value(json!("42")));
    assert_eq!(node.count("eth_call"), 1);
    assert_eq!(node.count("eth_sendTransaction"), 0);
}

#[tokio::test]
async fn typed_tuple_outputs() {
    let node = MockNode::new();
    let mut data = String::from("0x");
    data.push_str(&hex::encode(B256::right_padding_from(b"john")));
    data.push_str(&hex::encode(B256::right_padding_from(b"kuo")));
    data.push_str(&format!("{:064x}", 12));
    node.on("eth_call", json!(data));
    let test = bound(&node, TxParams::default()).await;

    let (first, last, age): (B256, B256, U256) = test.call_as("getInfo", vec![], TxParams::default()).await.unwrap();

    assert_eq!(&first[..4], b"john");
    assert_eq!(&last[..3], b"kuo");
    assert_eq!(age, U256::from(12));
}

#[tokio::test]
async fn rpc_errors_propagate_unchanged() {
    let node = MockNode::new();
    let test = bound(&node, TxParams::default()).await;

    let err = test.invoke("queryBalance", vec![]).await.unwrap_err();

    assert!(matches!(&err, Error::Rpc(obj) if obj.code == -32601));
    assert_eq!(node.count("eth_call"), 1);
}

// ---- descriptor-level ----------------------------------------------------------

#[tokio::test]
async fn short_address_fails_before_any_rpc() {
    let node = MockNode::new();
    let f = with_node(linked_test(), &node);

    let err = f.at(&DEPLOYED[..41]).unwrap_err();

    assert!(matches!(err, Error::InvalidAddress { .. }));
    assert!(node.calls().is_empty());
}

#[tokio::test]
async fn deploy_without_provider_fails_immediately() {
    let err = linked_test().deploy(vec![json!(100)]).await.unwrap_err();
    assert!(matches!(err, Error::NoProvider { .. }));
    assert!(err.to_string().contains("Please call with_provider() first"));
}

#[tokio::test]
async fn unresolved_libraries_are_listed() {
    let node = MockNode::new();
    let f = with_node(
        factory(json!({"default": {
            "abi": abi(),
            "unlinked_binary": format!("0x60{}00{}00{}", slot("StringUtils"), slot("Math"), slot("StringUtils")),
        }})),
        &node,
    )
    .with_network("default");

    let err = f.deploy(vec![json!(100)]).await.unwrap_err();

    match err {
        Error::UnlinkedLibraries { contract, libraries } => {
            assert_eq!(contract, "Test");
            assert_eq!(libraries, "Math, StringUtils");
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(node.calls().is_empty());
}

#[tokio::test]
async fn single_network_unlinked_binary_fails_without_asking_the_node() {
    let node = MockNode::new();
    node.on("net_version", json!("1"));
    let f = with_node(
        factory(json!({"default": {
            "abi": abi(),
            "unlinked_binary": format!("0x60{}00", slot("Math")),
        }})),
        &node,
    );

    let err = f.deploy(vec![json!(100)]).await.unwrap_err();

    assert!(matches!(err, Error::UnlinkedLibraries { ref libraries, .. } if libraries == "Math"), "{err:?}");
    assert_eq!(node.count("net_version"), 0);
    assert!(node.calls().is_empty());
}

#[tokio::test]
async fn deploy_links_submits_and_verifies_code() {
    let node = MockNode::new();
    let new_address = "0x3333333333333333333333333333333333333333";
    node.on("net_version", json!("1337"));
    node.on("eth_sendTransaction", json!(tx_hash_hex()));
    node.push("eth_getTransactionReceipt", Ok(Value::Null));
    node.on("eth_getTransactionReceipt", receipt(Some(new_address)));
    node.on("eth_getCode", json!("0x6060"));
    let f = with_node(
        factory(json!({"1337": {"abi": abi(), "unlinked_binary": format!("0x6060{}00", slot("StringUtils"))}})),
        &node,
    )
    .link("StringUtils", LIB.parse().unwrap())
    .with_config(BindingConfig::default().with_poll_interval(std::time::Duration::from_millis(1)));

    let test = f.deploy(vec![json!(100), json!({"gas": 3_000_000})]).await.unwrap();

    assert_eq!(format!("{:#x}", test.address()), new_address);
    assert_eq!(test.transaction_hash().map(|h| format!("{h:#x}")), Some(tx_hash_hex()));
    let tx = &node.last_params("eth_sendTransaction").unwrap()[0];
    let expected = format!("0x6060{}00{:064x}", &LIB[2..], 100);
    assert_eq!(tx["data"], json!(expected));
    assert_eq!(tx["gas"], json!("0x2dc6c0"));
    assert_eq!(node.count("eth_getTransactionReceipt"), 2);
}

#[tokio::test]
async fn deploy_with_empty_code_is_reported() {
    let node = MockNode::new();
    let new_address = "0x3333333333333333333333333333333333333333";
    node.on("eth_sendTransaction", json!(tx_hash_hex()));
    node.on("eth_getTransactionReceipt", receipt(Some(new_address)));
    node.on("eth_getCode", json!("0x"));
    let f = with_node(linked_test(), &node).with_network("default");

    let err = f.deploy(vec![json!(100)]).await.unwrap_err();

    assert!(matches!(err, Error::ContractNotStored { .. }));
}

#[tokio::test]
async fn mainnet_resolves_through_aliases() {
    let node = MockNode::new();
    node.on("net_version", json!("1"));
    let f = with_node(
        factory(json!({
            "live": {"abi": abi(), "address": B},
            "default": {"abi": abi(), "address": A},
        })),
        &node,
    );

    assert_eq!(f.resolve_network().await.unwrap(), "live");
    let test = f.deployed().await.unwrap();
    assert_eq!(format!("{:#x}", test.address()), B);
}

#[tokio::test]
async fn unknown_network_and_missing_address() {
    let node = MockNode::new();
    node.on("net_version", json!("42"));
    let f = with_node(linked_test(), &node);
    let err = f.deployed().await.unwrap_err();
    assert!(err.to_string().contains("Can't find artifacts for network id '42'"));

    let f = with_node(factory(json!({"default": {"abi": abi()}})), &node).with_network("default");
    assert!(matches!(f.deployed().await.unwrap_err(), Error::NotDeployed { .. }));
}

#[tokio::test]
async fn past_events_filter_by_topic() {
    let node = MockNode::new();
    let test = bound(&node, TxParams::default()).await;
    let topic = test.abi().event("paymentSuccess").unwrap().topic();
    let data = format!(
        "0x{:064x}{:064x}{}",
        0x20,
        4,
        format!("{:0<64}", hex::encode("paid"))
    );
    node.on(
        "eth_getLogs",
        json!([{"address": DEPLOYED, "topics": [topic], "data": data, "blockNumber": "0x5"}]),
    );

    let events = test.past_events(Some("paymentSuccess"), 0).await.unwrap();

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].args["0"], json!("paid"));
    let filter = &node.last_params("eth_getLogs").unwrap()[0];
    assert_eq!(filter["fromBlock"], json!("0x0"));
    assert_eq!(filter["topics"][0], json!(topic));
}
