//! One subcommand per action of the contract console.
//!
//! A [`Session`] is opened once per process: it fetches the node's accounts
//! (the first one signs everything) and then runs a single [`Command`]
//! against the `Test` / `Yo` bindings.

use std::io::Write;

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use contract_binding::prelude::*;
use contract_binding::rpc::eth;
use tracing::{debug, info};

use crate::bindings::{Test, Yo};
use crate::console::{bytes32_text, confirmation_line, event_message, status_lines, text_bytes32, Console};

pub const ACCOUNTS_ERROR: &str = "There was an error fetching your accounts.";
pub const NO_ACCOUNTS: &str =
    "Couldn't get any accounts! Make sure your Ethereum client is configured correctly.";

/// Creation date passed to the `Test` constructor by `init`.
pub const CREATE_DATE: u64 = 100;
/// Amount sent by `receive`.
pub const RECEIVE_AMOUNT: u64 = 500;
/// Time stamp passed to `destroy`.
pub const DESTROY_TIME: u64 = 100;
/// Oracle result pushed by `get-price`.
pub const TRIGGER_RESULT: u64 = 10;

const CUSTOMER_FIRST_NAME: &str = "john";
const CUSTOMER_LAST_NAME: &str = "kuo";
const CUSTOMER_AGE: u64 = 12;
const TARGET_ID: u64 = 235;

/// Which deployed instance a command talks to.
#[derive(Args, Clone, Debug, Default, PartialEq, Eq)]
pub struct Target {
    /// Contract address; defaults to the one recorded in the artifact.
    #[arg(long)]
    pub address: Option<String>,
}

#[derive(Args, Clone, Debug, Default, PartialEq, Eq)]
pub struct EventsArgs {
    #[command(flatten)]
    pub target: Target,
    /// Only this event (e.g. `paymentSuccess`).
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long, default_value_t = 0)]
    pub from_block: u64,
}

#[derive(Subcommand, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Deploy a new `Test` contract and report its address and events.
    Init,
    /// Push an oracle result into `Yo` and print its balance.
    GetPrice(Target),
    /// Print the contract definition.
    GetDefinition(Target),
    /// Pay into the contract.
    Receive(Target),
    /// List obligations and whether each is frozen.
    ObligationStatus(Target),
    /// List rights and whether each is frozen.
    RightStatus(Target),
    /// Print the remaining balance.
    QueryBalance(Target),
    AddCustomer(Target),
    AddTarget(Target),
    /// Register the second node account as beneficiary.
    AddBeneficiary(Target),
    /// Print the stored customer.
    GetCustomer(Target),
    /// Terminate the contract.
    Destroy(Target),
    /// Print events already emitted by the contract.
    Events(EventsArgs),
}

/// Connected console: provider, binding config, node accounts, output.
pub struct Session<W: Write> {
    provider: Provider,
    config: BindingConfig,
    accounts: Vec<Address>,
    console: Console<W>,
}

impl<W: Write> Session<W> {
    /// Fetch the node's accounts. Both failure modes are reported on the
    /// console before the error is returned.
    pub async fn connect(provider: Provider, config: BindingConfig, mut console: Console<W>) -> Result<Self> {
        let accounts = match eth::accounts(&*provider).await {
            Ok(accounts) => accounts,
            Err(err) => {
                console.print(ACCOUNTS_ERROR, None)?;
                return Err(anyhow::Error::new(err).context(ACCOUNTS_ERROR));
            }
        };
        if accounts.is_empty() {
            console.print(NO_ACCOUNTS, None)?;
            bail!(NO_ACCOUNTS);
        }
        debug!(count = accounts.len(), "accounts loaded");
        Ok(Self { provider, config, accounts, console })
    }

    pub fn accounts(&self) -> &[Address] {
        &self.accounts
    }

    /// The signing account (`accounts[0]`).
    pub fn account(&self) -> Address {
        self.accounts[0]
    }

    pub fn into_console(self) -> Console<W> {
        self.console
    }

    pub async fn run(&mut self, command: Command) -> Result<()> {
        info!(?command, "running");
        match command {
            Command::Init => self.init().await.map(|_| ()),
            Command::GetPrice(t) => self.get_price(&t).await,
            Command::GetDefinition(t) => self.get_definition(&t).await,
            Command::Receive(t) => self.receive(&t).await,
            Command::ObligationStatus(t) => self.obligation_status(&t).await,
            Command::RightStatus(t) => self.right_status(&t).await,
            Command::QueryBalance(t) => self.query_balance(&t).await,
            Command::AddCustomer(t) => self.add_customer(&t).await,
            Command::AddTarget(t) => self.add_target(&t).await,
            Command::AddBeneficiary(t) => self.add_beneficiary(&t).await,
            Command::GetCustomer(t) => self.get_customer(&t).await,
            Command::Destroy(t) => self.destroy(&t).await,
            Command::Events(args) => self.events(&args).await,
        }
    }

    /// Deploy `Test(100)` from `accounts[0]`, then report the events the
    /// deployment emitted.
    pub async fn init(&mut self) -> Result<Test> {
        let factory = self.factory(Test::factory()?);
        let test = Test::deploy(&factory, U256::from(CREATE_DATE), self.params())
            .await
            .context("deploying Test")?;

        let tx_hash = test.contract().transaction_hash().map(|h| format!("{h:#x}")).unwrap_or_default();
        let body = format!("Contract address: {}\nTransaction hash: {tx_hash}", test.address());
        self.console.print(&body, Some("Created"))?;

        for event in test.contract().past_events(None, 0).await? {
            self.console.print(&event_message(&event), None)?;
        }
        Ok(test)
    }

    pub async fn get_price(&mut self, target: &Target) -> Result<()> {
        let factory = self.factory(Yo::factory()?);
        let yo = match &target.address {
            Some(address) => Yo::at(&factory, address)?,
            None => Yo::deployed(&factory).await?,
        };
        yo.trig(U256::from(TRIGGER_RESULT), self.params()).await?;
        let balance = yo.balance(self.params()).await?;
        self.console.print(&balance.to_string(), None)?;
        Ok(())
    }

    pub async fn get_definition(&mut self, target: &Target) -> Result<()> {
        let test = self.test(target).await?;
        let definition = test.get_definition(self.params()).await?;
        self.console.print(&bytes32_text(&definition), Some("Contract content"))?;
        Ok(())
    }

    pub async fn receive(&mut self, target: &Target) -> Result<()> {
        let test = self.test(target).await?;
        let confirmation = test.receive(U256::from(RECEIVE_AMOUNT), self.params()).await?;
        self.console.print(&confirmation_line(&confirmation), None)?;
        Ok(())
    }

    pub async fn obligation_status(&mut self, target: &Target) -> Result<()> {
        let test = self.test(target).await?;
        let (names, flags) = test.get_obligation_status(self.params()).await?;
        self.console.print_lines(&status_lines(&names, &flags), None)?;
        Ok(())
    }

    pub async fn right_status(&mut self, target: &Target) -> Result<()> {
        let test = self.test(target).await?;
        let (names, flags) = test.get_right_status(self.params()).await?;
        self.console.print_lines(&status_lines(&names, &flags), None)?;
        Ok(())
    }

    pub async fn query_balance(&mut self, target: &Target) -> Result<()> {
        let test = self.test(target).await?;
        let balance = test.query_balance(self.params()).await?;
        self.console.print(&format!("Current balance left: {balance}"), None)?;
        Ok(())
    }

    pub async fn add_customer(&mut self, target: &Target) -> Result<()> {
        let test = self.test(target).await?;
        let confirmation = test
            .add_customer(
                text_bytes32(CUSTOMER_FIRST_NAME),
                text_bytes32(CUSTOMER_LAST_NAME),
                U256::from(CUSTOMER_AGE),
                self.params(),
            )
            .await?;
        self.console.print(&confirmation_line(&confirmation), None)?;
        Ok(())
    }

    pub async fn add_target(&mut self, target: &Target) -> Result<()> {
        let test = self.test(target).await?;
        let confirmation = test
            .add_target(
                text_bytes32(CUSTOMER_FIRST_NAME),
                text_bytes32(CUSTOMER_LAST_NAME),
                U256::from(CUSTOMER_AGE),
                U256::from(TARGET_ID),
                self.params(),
            )
            .await?;
        self.console.print(&confirmation_line(&confirmation), None)?;
        Ok(())
    }

    pub async fn add_beneficiary(&mut self, target: &Target) -> Result<()> {
        let Some(&beneficiary) = self.accounts.get(1) else {
            bail!("add-beneficiary needs a second node account");
        };
        let test = self.test(target).await?;
        let confirmation = test
            .add_beneficiary(
                text_bytes32(CUSTOMER_FIRST_NAME),
                text_bytes32(CUSTOMER_LAST_NAME),
                beneficiary,
                self.params(),
            )
            .await?;
        self.console.print(&confirmation_line(&confirmation), None)?;
        Ok(())
    }

    pub async fn get_customer(&mut self, target: &Target) -> Result<()> {
        let test = self.test(target).await?;
        let (first, last, age) = test.get_info(self.params()).await?;
        let lines = [bytes32_text(&first), bytes32_text(&last), age.to_string()];
        self.console.print_lines(&lines, None)?;
        Ok(())
    }

    pub async fn destroy(&mut self, target: &Target) -> Result<()> {
        let test = self.test(target).await?;
        let confirmation = test.destroy(U256::from(DESTROY_TIME), self.params()).await?;
        self.console.print(&confirmation_line(&confirmation), None)?;
        Ok(())
    }

    pub async fn events(&mut self, args: &EventsArgs) -> Result<()> {
        let test = self.test(&args.target).await?;
        let events = test.contract().past_events(args.name.as_deref(), args.from_block).await?;
        if events.is_empty() {
            self.console.print("No events", None)?;
            return Ok(());
        }
        let lines: Vec<String> = events
            .iter()
            .map(|e| match e.block_number {
                Some(block) => format!("#{block} {}", event_message(e)),
                None => event_message(e),
            })
            .collect();
        self.console.print_lines(&lines, Some("Events"))?;
        Ok(())
    }

    // ---- helpers -----------------------------------------------------------

    fn params(&self) -> TxParams {
        TxParams::new().from(self.account())
    }

    fn factory(&self, factory: ContractFactory) -> ContractFactory {
        factory.with_provider(self.provider.clone()).with_config(self.config.clone())
    }

    async fn test(&self, target: &Target) -> Result<Test> {
        let factory = self.factory(Test::factory()?);
        let test = match &target.address {
            Some(address) => Test::at(&factory, address)?,
            None => Test::deployed(&factory).await?,
        };
        Ok(test)
    }
}
