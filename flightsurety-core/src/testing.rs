//! Test doubles: an in-memory [`OracleGateway`] and a loopback node that
//! serves scripted logs over HTTP and WebSocket.

use crate::gateway::OracleGateway;
use async_trait::async_trait;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use flightsurety_sdk::abi::ContractAbi;
use flightsurety_sdk::client::{ClientError, Contract, RpcClient};
use flightsurety_sdk::objects::{FlightKey, OracleIndexes};
use flightsurety_sdk::{Address, H256, U256};
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub oracle: Address,
    pub index: u8,
    pub flight: FlightKey,
    pub status_code: u8,
}

#[derive(Default)]
pub struct MockGateway {
    pub accounts: Vec<Address>,
    pub fee: U256,
    pub indexes: HashMap<Address, OracleIndexes>,
    pub failing: HashSet<Address>,
    pub reject_authorize: bool,
    pub authorized_by: Mutex<Option<Address>>,
    pub registered: Mutex<Vec<(Address, U256)>>,
    pub submissions: Mutex<Vec<Submission>>,
}

pub fn account(n: u64) -> Address {
    Address::from_low_u64_be(n + 1)
}

fn rejected() -> ClientError {
    ClientError::Reverted {
        tx_hash: H256::zero(),
    }
}

impl MockGateway {
    pub fn with_accounts(count: u64) -> Self {
        Self {
            accounts: (0..count).map(account).collect(),
            fee: U256::from(10u64).pow(U256::from(18u64)),
            ..Default::default()
        }
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl OracleGateway for MockGateway {
    async fn accounts(&self) -> Result<Vec<Address>, ClientError> {
        Ok(self.accounts.clone())
    }

    async fn authorize_app(&self, owner: Address) -> Result<(), ClientError> {
        if self.reject_authorize {
            return Err(rejected());
        }
        *self.authorized_by.lock().unwrap() = Some(owner);
        Ok(())
    }

    async fn registration_fee(&self) -> Result<U256, ClientError> {
        Ok(self.fee)
    }

    async fn register_oracle(&self, oracle: Address, fee: U256) -> Result<(), ClientError> {
        if self.failing.contains(&oracle) {
            return Err(rejected());
        }
        self.registered.lock().unwrap().push((oracle, fee));
        Ok(())
    }

    async fn oracle_indexes(&self, oracle: Address) -> Result<OracleIndexes, ClientError> {
        self.indexes.get(&oracle).cloned().ok_or_else(rejected)
    }

    async fn submit_response(
        &self,
        oracle: Address,
        index: u8,
        flight: &FlightKey,
        status_code: u8,
    ) -> Result<(), ClientError> {
        self.submissions.lock().unwrap().push(Submission {
            oracle,
            index,
            flight: flight.clone(),
            status_code,
        });
        if self.failing.contains(&oracle) {
            return Err(rejected());
        }
        Ok(())
    }
}

pub fn app_abi() -> Arc<ContractAbi> {
    Arc::new(ContractAbi::from_json(include_str!("../../abi/FlightSuretyApp.json")).unwrap())
}

const SUBSCRIPTION_ID: &str = "0x1";

/// What the WebSocket side does once the live logs are sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterLive {
    /// Keep the subscription open until the client leaves.
    Hold,
    /// Close the socket from the node side.
    Close,
}

/// A node answering `eth_getLogs` with `past` and pushing `live` on the
/// first `logs` subscription.
pub struct MockNode {
    pub http_url: Url,
    pub ws_url: Url,
}

impl MockNode {
    pub async fn spawn(past: Vec<Value>, live: Vec<Value>, after_live: AfterLive) -> Self {
        let http = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let http_addr = http.local_addr().unwrap();
        let router = Router::new()
            .route("/", post(handle_rpc))
            .with_state(Arc::new(past));
        tokio::spawn(async move { axum::serve(http, router).await.unwrap() });

        let ws = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let ws_addr = ws.local_addr().unwrap();
        tokio::spawn(async move {
            let (stream, _) = ws.accept().await.unwrap();
            let mut socket = tokio_tungstenite::accept_async(stream).await.unwrap();
            let Some(Ok(Message::Text(request))) = socket.next().await else {
                return;
            };
            let request: Value = serde_json::from_str(&request).unwrap();
            assert_eq!(request["method"], "eth_subscribe");
            let ack = json!({"jsonrpc": "2.0", "id": request["id"], "result": SUBSCRIPTION_ID});
            let _ = socket.send(Message::Text(ack.to_string())).await;

            for log in live {
                let frame = json!({
                    "jsonrpc": "2.0",
                    "method": "eth_subscription",
                    "params": {"subscription": SUBSCRIPTION_ID, "result": log},
                });
                let _ = socket.send(Message::Text(frame.to_string())).await;
            }

            match after_live {
                AfterLive::Close => {
                    let _ = socket.close(None).await;
                }
                AfterLive::Hold => {
                    while let Some(Ok(_)) = socket.next().await {}
                }
            }
        });

        Self {
            http_url: format!("http://{http_addr}/").parse().unwrap(),
            ws_url: format!("ws://{ws_addr}/").parse().unwrap(),
        }
    }

    pub fn contract(&self, address: Address, abi: Arc<ContractAbi>) -> Contract {
        let rpc = RpcClient::new(self.http_url.clone())
            .with_http_client(reqwest::Client::builder().no_proxy().build().unwrap());
        Contract::new(rpc, address, abi)
    }
}

async fn handle_rpc(State(past): State<Arc<Vec<Value>>>, Json(request): Json<Value>) -> Json<Value> {
    let result = match request["method"].as_str() {
        Some("eth_getLogs") => Value::Array(past.to_vec()),
        _ => Value::Null,
    };
    Json(json!({"jsonrpc": "2.0", "id": request["id"], "result": result}))
}
