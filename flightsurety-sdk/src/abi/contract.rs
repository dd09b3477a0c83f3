//! Contract interface descriptions.
//!
//! Parses the JSON ABI emitted by the Solidity toolchain, either as a bare
//! array or wrapped in a build artifact (`{"contractName": ..., "abi": [...]}`).

use super::{AbiError, ParamType, Token, codec, keccak256};
use crate::H256;
use serde::Deserialize;

/// A named, typed function or event parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub kind: ParamType,
    /// Only meaningful for event inputs.
    pub indexed: bool,
}

/// A contract function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub name: String,
    pub inputs: Vec<Param>,
    pub outputs: Vec<Param>,
    pub payable: bool,
}

/// A contract event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub name: String,
    pub inputs: Vec<Param>,
    pub anonymous: bool,
}

/// An event log decoded into named values, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedLog {
    pub event: String,
    pub params: Vec<(String, Token)>,
}

/// The parsed interface of one contract.
#[derive(Debug, Clone, Default)]
pub struct ContractAbi {
    functions: Vec<Function>,
    events: Vec<Event>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(rename = "type", default = "default_entry_type")]
    kind: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    inputs: Vec<RawParam>,
    #[serde(default)]
    outputs: Vec<RawParam>,
    #[serde(default)]
    anonymous: bool,
    #[serde(rename = "stateMutability", default)]
    state_mutability: Option<String>,
    #[serde(default)]
    payable: bool,
}

#[derive(Debug, Deserialize)]
struct RawParam {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    indexed: bool,
}

fn default_entry_type() -> String {
    "function".to_string()
}

fn signature(name: &str, params: &[Param]) -> String {
    let types: Vec<String> = params.iter().map(|p| p.kind.to_string()).collect();
    format!("{}({})", name, types.join(","))
}

fn convert_params(raw: Vec<RawParam>) -> Result<Vec<Param>, AbiError> {
    raw.into_iter()
        .map(|p| {
            Ok(Param {
                name: p.name,
                kind: p.kind.parse()?,
                indexed: p.indexed,
            })
        })
        .collect()
}

impl Function {
    /// Canonical signature, e.g. `registerFlight(address,string,uint256)`.
    pub fn signature(&self) -> String {
        signature(&self.name, &self.inputs)
    }

    /// First four bytes of the keccak-256 hash of the signature.
    pub fn selector(&self) -> [u8; 4] {
        let hash = keccak256(self.signature());
        [hash[0], hash[1], hash[2], hash[3]]
    }

    /// Build calldata: selector followed by the encoded arguments.
    pub fn encode_input(&self, args: &[Token]) -> Result<Vec<u8>, AbiError> {
        if args.len() != self.inputs.len() {
            return Err(AbiError::ArgumentMismatch {
                function: self.signature(),
                reason: format!("expected {} arguments, got {}", self.inputs.len(), args.len()),
            });
        }
        for (position, (arg, param)) in args.iter().zip(&self.inputs).enumerate() {
            if !arg.matches(&param.kind) {
                return Err(AbiError::ArgumentMismatch {
                    function: self.signature(),
                    reason: format!("argument {position} is not a valid {}", param.kind),
                });
            }
        }

        let mut calldata = self.selector().to_vec();
        calldata.extend(codec::encode(args));
        Ok(calldata)
    }

    /// Decode the return data of an `eth_call`.
    pub fn decode_output(&self, data: &[u8]) -> Result<Vec<Token>, AbiError> {
        let types: Vec<ParamType> = self.outputs.iter().map(|p| p.kind.clone()).collect();
        codec::decode(&types, data)
    }
}

impl Event {
    /// Canonical signature, e.g. `OracleRequest(uint8,address,string,uint256)`.
    pub fn signature(&self) -> String {
        signature(&self.name, &self.inputs)
    }

    /// The keccak-256 hash of the signature, emitted as `topics[0]`.
    pub fn topic(&self) -> H256 {
        H256::from(keccak256(self.signature()))
    }

    /// Decode a log emitted by this event.
    ///
    /// Indexed static parameters are read from the topics; indexed dynamic
    /// parameters only carry their hash and are returned as `FixedBytes`.
    pub fn decode_log(&self, topics: &[H256], data: &[u8]) -> Result<DecodedLog, AbiError> {
        let mut topics = topics.iter();
        if !self.anonymous && topics.next() != Some(&self.topic()) {
            return Err(AbiError::TopicMismatch(self.signature()));
        }

        let data_types: Vec<ParamType> = self
            .inputs
            .iter()
            .filter(|p| !p.indexed)
            .map(|p| p.kind.clone())
            .collect();
        let mut data_tokens = codec::decode(&data_types, data)?.into_iter();

        let mut params = Vec::with_capacity(self.inputs.len());
        for param in &self.inputs {
            let token = if param.indexed {
                let topic = topics
                    .next()
                    .ok_or_else(|| AbiError::MissingParam(param.name.clone()))?;
                if param.kind.is_dynamic() {
                    Token::FixedBytes(topic.as_bytes().to_vec())
                } else {
                    codec::decode(std::slice::from_ref(&param.kind), topic.as_bytes())?
                        .into_iter()
                        .next()
                        .ok_or_else(|| AbiError::MissingParam(param.name.clone()))?
                }
            } else {
                data_tokens
                    .next()
                    .ok_or_else(|| AbiError::MissingParam(param.name.clone()))?
            };
            params.push((param.name.clone(), token));
        }

        Ok(DecodedLog {
            event: self.name.clone(),
            params,
        })
    }
}

impl DecodedLog {
    pub fn get(&self, name: &str) -> Option<&Token> {
        self.params
            .iter()
            .find(|(param, _)| param == name)
            .map(|(_, token)| token)
    }

    /// Remove and return a parameter by name.
    pub fn take(&mut self, name: &str) -> Result<Token, AbiError> {
        let position = self
            .params
            .iter()
            .position(|(param, _)| param == name)
            .ok_or_else(|| AbiError::MissingParam(name.to_string()))?;
        Ok(self.params.remove(position).1)
    }
}

impl ContractAbi {
    /// Parse a bare ABI array or a build artifact containing an `abi` field.
    pub fn from_json(json: &str) -> Result<Self, AbiError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, AbiError> {
        let entries = match value {
            serde_json::Value::Array(_) => value,
            serde_json::Value::Object(mut artifact) => artifact
                .remove("abi")
                .ok_or_else(|| AbiError::InvalidArtifact("missing \"abi\" field".to_string()))?,
            _ => {
                return Err(AbiError::InvalidArtifact(
                    "expected an ABI array or an artifact object".to_string(),
                ));
            }
        };
        let entries: Vec<RawEntry> = serde_json::from_value(entries)?;

        let mut abi = ContractAbi::default();
        for entry in entries {
            match entry.kind.as_str() {
                "function" => abi.functions.push(Function {
                    payable: entry.payable || entry.state_mutability.as_deref() == Some("payable"),
                    name: entry.name,
                    inputs: convert_params(entry.inputs)?,
                    outputs: convert_params(entry.outputs)?,
                }),
                "event" => abi.events.push(Event {
                    name: entry.name,
                    inputs: convert_params(entry.inputs)?,
                    anonymous: entry.anonymous,
                }),
                // constructor, fallback, receive, error
                _ => {}
            }
        }
        Ok(abi)
    }

    /// Look up a function by name. Overloads resolve to the first declaration.
    pub fn function(&self, name: &str) -> Result<&Function, AbiError> {
        self.functions
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| AbiError::UnknownFunction(name.to_string()))
    }

    pub fn event(&self, name: &str) -> Result<&Event, AbiError> {
        self.events
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| AbiError::UnknownEvent(name.to_string()))
    }

    /// Find the event whose topic matches `topics[0]` of a log.
    pub fn event_by_topic(&self, topic: &H256) -> Option<&Event> {
        self.events
            .iter()
            .find(|e| !e.anonymous && &e.topic() == topic)
    }

    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }
}
