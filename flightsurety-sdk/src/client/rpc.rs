//! HTTP JSON-RPC client for an Ethereum node.

use super::ClientError;
use crate::objects::rpc::{JsonRpcRequest, JsonRpcResponse};
use crate::objects::{HexBytes, Log, LogFilter, TransactionReceipt, TransactionRequest};
use crate::{Address, H256, U256};
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use url::Url;

const NO_PARAMS: [(); 0] = [];

/// Typed HTTP client for the Ethereum JSON-RPC API.
///
/// Transactions are sent with `eth_sendTransaction`, so the node must hold
/// the sending accounts unlocked (as development nodes do).
#[derive(Debug, Clone)]
pub struct RpcClient {
    http: Client,
    url: Url,
    next_id: Arc<AtomicU64>,
    receipt_poll_interval: Duration,
    receipt_poll_attempts: u32,
}

impl RpcClient {
    /// Create a new `RpcClient` for the node at `url`.
    pub fn new(url: Url) -> Self {
        Self {
            http: Client::new(),
            url,
            next_id: Arc::new(AtomicU64::new(1)),
            receipt_poll_interval: Duration::from_millis(200),
            receipt_poll_attempts: 150,
        }
    }

    /// Replace the default `reqwest::Client` with a custom one (e.g. to
    /// configure timeouts or a proxy).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// Configure how long [`send_transaction`](Self::send_transaction) waits
    /// for a receipt.
    pub fn with_receipt_polling(mut self, interval: Duration, attempts: u32) -> Self {
        self.receipt_poll_interval = interval;
        self.receipt_poll_attempts = attempts.max(1);
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Issue a raw JSON-RPC request.
    pub async fn request<P: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        params: P,
    ) -> Result<R, ClientError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = JsonRpcRequest::new(id, method, params);

        let resp = self.http.post(self.url.clone()).json(&body).send().await?;
        parse_response(resp).await
    }

    /// `eth_accounts` – accounts managed by the node.
    pub async fn accounts(&self) -> Result<Vec<Address>, ClientError> {
        self.request("eth_accounts", NO_PARAMS).await
    }

    /// `eth_blockNumber`
    pub async fn block_number(&self) -> Result<U256, ClientError> {
        self.request("eth_blockNumber", NO_PARAMS).await
    }

    /// `eth_call` against the latest block.
    pub async fn call(&self, tx: &TransactionRequest) -> Result<HexBytes, ClientError> {
        self.request("eth_call", (tx, "latest")).await
    }

    /// `eth_sendTransaction`, resolving once the transaction is mined.
    ///
    /// Fails with [`ClientError::Reverted`] when the receipt reports a
    /// failed execution.
    pub async fn send_transaction(
        &self,
        tx: &TransactionRequest,
    ) -> Result<TransactionReceipt, ClientError> {
        let tx_hash: H256 = self.request("eth_sendTransaction", [tx]).await?;
        let receipt = self.wait_for_receipt(tx_hash).await?;
        if !receipt.is_success() {
            return Err(ClientError::Reverted { tx_hash });
        }
        Ok(receipt)
    }

    /// `eth_getTransactionReceipt`; `None` while the transaction is pending.
    pub async fn transaction_receipt(
        &self,
        tx_hash: H256,
    ) -> Result<Option<TransactionReceipt>, ClientError> {
        self.request("eth_getTransactionReceipt", [tx_hash]).await
    }

    /// Poll for a receipt until it appears or the attempts run out.
    pub async fn wait_for_receipt(&self, tx_hash: H256) -> Result<TransactionReceipt, ClientError> {
        for attempt in 0..self.receipt_poll_attempts {
            if let Some(receipt) = self.transaction_receipt(tx_hash).await? {
                return Ok(receipt);
            }
            if attempt + 1 < self.receipt_poll_attempts {
                tokio::time::sleep(self.receipt_poll_interval).await;
            }
        }
        Err(ClientError::ReceiptTimeout { tx_hash })
    }

    /// `eth_getLogs`
    pub async fn logs(&self, filter: &LogFilter) -> Result<Vec<Log>, ClientError> {
        self.request("eth_getLogs", [filter]).await
    }
}

async fn parse_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ClientError::Node { status, body });
    }
    let bytes = resp.bytes().await?;
    let response: JsonRpcResponse = serde_json::from_slice(&bytes)?;
    if let Some(error) = response.error {
        return Err(ClientError::Rpc(error));
    }
    serde_json::from_value(response.result).map_err(ClientError::Json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::State;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{Value, json};
    use std::sync::atomic::AtomicUsize;
    use tokio::net::TcpListener;

    const TX_HASH: u64 = 0xfeed;

    /// Node that mines every transaction after `pending_polls` empty
    /// receipt lookups, with the given receipt status.
    #[derive(Clone)]
    struct Node {
        pending_polls: usize,
        status: Option<&'static str>,
        polls: Arc<AtomicUsize>,
    }

    impl Node {
        fn new(pending_polls: usize, status: Option<&'static str>) -> Self {
            Self {
                pending_polls,
                status,
                polls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn polls(&self) -> usize {
            self.polls.load(Ordering::SeqCst)
        }
    }

    async fn handle(State(node): State<Node>, Json(request): Json<Value>) -> Json<Value> {
        let id = request["id"].clone();
        let result = match request["method"].as_str() {
            Some("eth_sendTransaction") => json!(H256::from_low_u64_be(TX_HASH)),
            Some("eth_getTransactionReceipt") => {
                let poll = node.polls.fetch_add(1, Ordering::SeqCst);
                match node.status {
                    Some(status) if poll >= node.pending_polls => json!({
                        "transactionHash": H256::from_low_u64_be(TX_HASH),
                        "blockNumber": "0x1",
                        "status": status,
                    }),
                    _ => Value::Null,
                }
            }
            Some("eth_call") => {
                return Json(json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "error": {"code": -32000, "message": "VM Exception while processing transaction: revert"},
                }));
            }
            _ => Value::Null,
        };
        Json(json!({"jsonrpc": "2.0", "id": id, "result": result}))
    }

    async fn spawn_node(node: Node) -> RpcClient {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = Router::new().route("/", post(handle)).with_state(node);
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });

        RpcClient::new(format!("http://{addr}/").parse().unwrap())
            .with_http_client(Client::builder().no_proxy().build().unwrap())
            .with_receipt_polling(Duration::from_millis(1), 5)
    }

    fn transfer() -> TransactionRequest {
        TransactionRequest {
            from: Some(Address::from_low_u64_be(1)),
            to: Some(Address::from_low_u64_be(2)),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_send_transaction_waits_for_receipt() {
        let node = Node::new(2, Some("0x1"));
        let client = spawn_node(node.clone()).await;

        let receipt = client.send_transaction(&transfer()).await.unwrap();
        assert_eq!(receipt.transaction_hash, H256::from_low_u64_be(TX_HASH));
        assert!(receipt.is_success());
        assert_eq!(node.polls(), 3);
    }

    #[tokio::test]
    async fn test_send_transaction_reverted() {
        let node = Node::new(1, Some("0x0"));
        let client = spawn_node(node.clone()).await;

        let err = client.send_transaction(&transfer()).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Reverted { tx_hash } if tx_hash == H256::from_low_u64_be(TX_HASH)
        ));
        assert_eq!(node.polls(), 2);
    }

    #[tokio::test]
    async fn test_receipt_timeout() {
        let node = Node::new(0, None);
        let client = spawn_node(node.clone()).await;

        let err = client
            .wait_for_receipt(H256::from_low_u64_be(TX_HASH))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::ReceiptTimeout { .. }));
        assert_eq!(node.polls(), 5);
    }

    #[tokio::test]
    async fn test_rpc_error_is_returned() {
        let client = spawn_node(Node::new(0, None)).await;

        let err = client.call(&transfer()).await.unwrap_err();
        match err {
            ClientError::Rpc(error) => {
                assert_eq!(error.code, -32000);
                assert!(error.message.contains("revert"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
