//! Confirmation poller: wait for a submitted transaction to be mined.
//!
//! The receipt is queried immediately and then once per interval until:
//! - a receipt comes back → `Ok(Confirmation)`;
//! - the query itself fails → that error, unchanged;
//! - the timeout (if any) has elapsed → `Error::ReceiptTimeout`.
//!
//! There is no backoff and no jitter. The loop sleeps on a tokio timer and
//! has no cancellation hook; dropping the future is the only way to stop it.

use crate::config::BindingConfig;
use crate::error::{Error, Result};
use crate::rpc::{eth, Transport};
use crate::types::{Confirmation, TxHash};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, instrument, trace, warn};

/// Interval + timeout pair driving one wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPoller {
    pub interval: Duration,
    /// `None` polls forever.
    pub timeout: Option<Duration>,
}

impl ConfirmationPoller {
    pub fn new(interval: Duration, timeout: Option<Duration>) -> Self {
        Self { interval, timeout }
    }

    pub fn from_config(cfg: &BindingConfig) -> Self {
        Self::new(cfg.poll_interval, cfg.timeout())
    }

    /// Poll `eth_getTransactionReceipt` for `tx_hash`. The clock starts now,
    /// which callers arrange to be right after submission.
    #[instrument(level = "debug", skip(self, transport), fields(tx = %tx_hash))]
    pub async fn wait(&self, transport: &dyn Transport, tx_hash: TxHash) -> Result<Confirmation> {
        let start = Instant::now();
        let mut attempt: u64 = 0;
        loop {
            attempt += 1;
            trace!(attempt, "eth_getTransactionReceipt");
            if let Some(receipt) = eth::get_transaction_receipt(transport, &tx_hash).await? {
                debug!(attempt, elapsed_ms = start.elapsed().as_millis() as u64, "receipt found");
                return Ok(Confirmation { tx_hash, receipt });
            }

            let elapsed = start.elapsed();
            if let Some(limit) = self.timeout {
                if elapsed >= limit {
                    warn!(attempt, elapsed_secs = elapsed.as_secs(), "no receipt before timeout");
                    return Err(Error::ReceiptTimeout {
                        tx_hash: format!("{tx_hash:#x}"),
                        elapsed_secs: elapsed.as_secs(),
                    });
                }
            }
            sleep(self.interval).await;
        }
    }
}

/// Shorthand for `ConfirmationPoller::from_config(cfg).wait(..)`.
pub async fn wait_for_receipt(transport: &dyn Transport, tx_hash: TxHash, cfg: &BindingConfig) -> Result<Confirmation> {
    ConfirmationPoller::from_config(cfg).wait(transport, tx_hash).await
}
