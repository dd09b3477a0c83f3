#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

pub mod config;
pub mod dapp;
pub mod events;
pub mod gateway;
pub mod oracles;
pub mod processors;

#[cfg(test)]
mod testing;
