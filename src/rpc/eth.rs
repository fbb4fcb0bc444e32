//! Execution-layer JSON-RPC methods (eth_*).

use crate::domain::error::Error;
use crate::domain::types::{Address, BlockTag, Bytes, CallRequest, Hash, TransactionReceipt, U256};
use crate::ports::Transport;
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, instrument};

/// Ethereum RPC client
pub struct EthRpc {
    transport: Arc<dyn Transport>,
    receipt_poll_interval: Duration,
    receipt_timeout: Duration,
}

impl EthRpc {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            receipt_poll_interval: Duration::from_millis(100),
            receipt_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_receipt_polling(mut self, interval: Duration, timeout: Duration) -> Self {
        self.receipt_poll_interval = interval;
        self.receipt_timeout = timeout;
        self
    }

    pub fn transport(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.transport)
    }

    /// eth_chainId
    #[instrument(skip(self))]
    pub async fn chain_id(&self) -> Result<U256, Error> {
        let result = self.transport.request("eth_chainId", json!([])).await?;
        Ok(serde_json::from_value(result)?)
    }

    /// eth_blockNumber
    #[instrument(skip(self))]
    pub async fn block_number(&self) -> Result<U256, Error> {
        let result = self.transport.request("eth_blockNumber", json!([])).await?;
        Ok(serde_json::from_value(result)?)
    }

    /// eth_getBalance (latest)
    #[instrument(skip(self))]
    pub async fn get_balance(&self, address: Address) -> Result<U256, Error> {
        let result = self
            .transport
            .request(
                "eth_getBalance",
                json!([address, BlockTag::Latest.as_str()]),
            )
            .await?;
        Ok(serde_json::from_value(result)?)
    }

    /// eth_getCode (latest)
    #[instrument(skip(self))]
    pub async fn get_code(&self, address: Address) -> Result<Bytes, Error> {
        let result = self
            .transport
            .request("eth_getCode", json!([address, BlockTag::Latest.as_str()]))
            .await?;
        Ok(serde_json::from_value(result)?)
    }

    /// eth_getTransactionCount (latest)
    #[instrument(skip(self))]
    pub async fn get_transaction_count(&self, address: Address) -> Result<U256, Error> {
        let result = self
            .transport
            .request(
                "eth_getTransactionCount",
                json!([address, BlockTag::Latest.as_str()]),
            )
            .await?;
        Ok(serde_json::from_value(result)?)
    }

    /// eth_call - execute a read without creating a transaction.
    ///
    /// Reverts surface as [`Error::Reverted`] with the decoded reason.
    #[instrument(skip(self, call))]
    pub async fn call(&self, call: &CallRequest) -> Result<Bytes, Error> {
        let result = self
            .transport
            .request("eth_call", json!([call, BlockTag::Latest.as_str()]))
            .await?;
        Ok(serde_json::from_value(result)?)
    }

    /// eth_sendTransaction - the dev node signs for unlocked or impersonated
    /// senders.
    #[instrument(skip(self, call))]
    pub async fn send_transaction(&self, call: &CallRequest) -> Result<Hash, Error> {
        let result = self
            .transport
            .request("eth_sendTransaction", json!([call]))
            .await?;
        Ok(serde_json::from_value(result)?)
    }

    /// eth_getTransactionReceipt
    #[instrument(skip(self))]
    pub async fn transaction_receipt(
        &self,
        tx_hash: Hash,
    ) -> Result<Option<TransactionReceipt>, Error> {
        let result = self
            .transport
            .request("eth_getTransactionReceipt", json!([tx_hash]))
            .await?;
        if result.is_null() {
            Ok(None)
        } else {
            Ok(Some(serde_json::from_value(result)?))
        }
    }

    /// Poll for a receipt until it appears or the timeout elapses.
    ///
    /// A mined receipt with status 0 is reported as [`Error::Reverted`].
    pub async fn wait_for_receipt(&self, tx_hash: Hash) -> Result<TransactionReceipt, Error> {
        let started = Instant::now();
        loop {
            if let Some(receipt) = self.transaction_receipt(tx_hash).await? {
                debug!(
                    tx_hash = %tx_hash,
                    block = receipt.block_number.map(|b| b.as_u64()),
                    "receipt received"
                );
                if !receipt.succeeded() {
                    return Err(Error::Reverted {
                        reason: None,
                        data: None,
                    });
                }
                return Ok(receipt);
            }
            if started.elapsed() >= self.receipt_timeout {
                return Err(Error::ReceiptTimeout {
                    tx_hash: format!("{tx_hash:?}"),
                    waited_ms: started.elapsed().as_millis() as u64,
                });
            }
            tokio::time::sleep(self.receipt_poll_interval).await;
        }
    }

    /// Send a transaction and wait for its successful receipt.
    pub async fn send_and_confirm(&self, call: &CallRequest) -> Result<TransactionReceipt, Error> {
        let tx_hash = self.send_transaction(call).await?;
        self.wait_for_receipt(tx_hash).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::Value;

    /// Node that never mines the transaction.
    struct PendingForever;

    #[async_trait]
    impl Transport for PendingForever {
        async fn request(&self, method: &str, _params: Value) -> Result<Value, Error> {
            assert_eq!(method, "eth_getTransactionReceipt");
            Ok(Value::Null)
        }
    }

    /// Node that mines every transaction with status 0.
    struct AlwaysReverts;

    #[async_trait]
    impl Transport for AlwaysReverts {
        async fn request(&self, method: &str, params: Value) -> Result<Value, Error> {
            assert_eq!(method, "eth_getTransactionReceipt");
            Ok(json!({
                "transactionHash": params[0],
                "blockNumber": "0x1",
                "status": "0x0"
            }))
        }
    }

    #[tokio::test]
    async fn test_receipt_polling_times_out() {
        let eth = EthRpc::new(Arc::new(PendingForever))
            .with_receipt_polling(Duration::from_millis(1), Duration::from_millis(10));
        match eth.wait_for_receipt(Hash::zero()).await {
            Err(Error::ReceiptTimeout { waited_ms, .. }) => assert!(waited_ms >= 10),
            other => panic!("expected receipt timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_status_zero_receipt_surfaces_as_revert() {
        let eth = EthRpc::new(Arc::new(AlwaysReverts));
        match eth.wait_for_receipt(Hash::zero()).await {
            Err(Error::Reverted { reason: None, data: None }) => {}
            other => panic!("expected revert, got {other:?}"),
        }
    }
}
