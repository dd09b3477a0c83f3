//! A deployed contract bound to an address and its ABI.

use super::{ClientError, LogSubscription, RpcClient};
use crate::abi::{AbiError, ContractAbi, Token};
use crate::objects::{
    BlockNumber, ContractEvent, Log, LogFilter, TransactionReceipt, TransactionRequest,
};
use crate::{Address, U256};
use std::sync::Arc;
use url::Url;

/// Sender-side options of a state-changing call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendOptions {
    pub from: Address,
    /// Wei attached to the call (payable functions only).
    pub value: Option<U256>,
    pub gas: Option<U256>,
}

impl SendOptions {
    pub fn new(from: Address) -> Self {
        Self {
            from,
            value: None,
            gas: None,
        }
    }

    pub fn value(mut self, value: U256) -> Self {
        self.value = Some(value);
        self
    }

    pub fn gas(mut self, gas: u64) -> Self {
        self.gas = Some(U256::from(gas));
        self
    }
}

/// A contract instance: ABI, address and the node to reach it through.
#[derive(Debug, Clone)]
pub struct Contract {
    rpc: RpcClient,
    address: Address,
    abi: Arc<ContractAbi>,
}

impl Contract {
    pub fn new(rpc: RpcClient, address: Address, abi: Arc<ContractAbi>) -> Self {
        Self { rpc, address, abi }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn abi(&self) -> &ContractAbi {
        &self.abi
    }

    pub fn rpc(&self) -> &RpcClient {
        &self.rpc
    }

    /// Execute a read-only method with `eth_call` and decode its outputs.
    pub async fn call(
        &self,
        method: &str,
        from: Option<Address>,
        args: &[Token],
    ) -> Result<Vec<Token>, ClientError> {
        let function = self.abi.function(method)?;
        let tx = TransactionRequest {
            from,
            to: Some(self.address),
            data: Some(function.encode_input(args)?.into()),
            ..Default::default()
        };
        let output = self.rpc.call(&tx).await?;
        Ok(function.decode_output(output.as_slice())?)
    }

    /// Send a transaction invoking `method` and wait until it is mined.
    pub async fn send(
        &self,
        method: &str,
        options: SendOptions,
        args: &[Token],
    ) -> Result<TransactionReceipt, ClientError> {
        let function = self.abi.function(method)?;
        if options.value.is_some_and(|v| !v.is_zero()) && !function.payable {
            return Err(AbiError::ArgumentMismatch {
                function: function.signature(),
                reason: "value sent to a non-payable function".to_string(),
            }
            .into());
        }
        let tx = TransactionRequest {
            from: Some(options.from),
            to: Some(self.address),
            gas: options.gas,
            value: options.value,
            data: Some(function.encode_input(args)?.into()),
        };
        self.rpc.send_transaction(&tx).await
    }

    /// Filter matching every emission of `event` by this contract.
    pub fn event_filter(&self, event: &str) -> Result<LogFilter, AbiError> {
        let event = self.abi.event(event)?;
        Ok(LogFilter::new(self.address, event.topic()))
    }

    /// Fetch past logs of `E` from `from_block` up to the latest block.
    pub async fn past_logs<E: ContractEvent>(
        &self,
        from_block: BlockNumber,
    ) -> Result<Vec<Log>, ClientError> {
        let filter = self
            .event_filter(E::NAME)?
            .from_block(from_block)
            .to_block(BlockNumber::Latest);
        self.rpc.logs(&filter).await
    }

    /// Open a live subscription to `E` over the node's WebSocket endpoint.
    pub async fn subscribe<E: ContractEvent>(
        &self,
        ws_url: &Url,
    ) -> Result<LogSubscription, ClientError> {
        let filter = self.event_filter(E::NAME)?;
        LogSubscription::subscribe(ws_url, &filter).await
    }

    /// Decode a log into the typed event `E`.
    pub fn decode_event<E: ContractEvent>(&self, log: &Log) -> Result<E, AbiError> {
        let event = self.abi.event(E::NAME)?;
        let decoded = event.decode_log(&log.topics, log.data.as_slice())?;
        E::from_log(decoded)
    }
}
