//! EventWatcher processor.
//!
//! The EventWatcher is responsible for:
//! - Subscribing to live logs of one contract event over WebSocket
//! - Replaying past logs of that event from a configured block
//! - Decoding each log into its typed event
//! - Forwarding events to the next processor over a bounded channel
//!
//! The subscription is opened before the replay so that no log emitted in
//! between is lost; logs seen during the replay are skipped when they show up
//! again on the live stream.

use flightsurety_sdk::H256;
use flightsurety_sdk::U256;
use flightsurety_sdk::client::{ClientError, Contract};
use flightsurety_sdk::objects::{BlockNumber, ContractEvent, Log};
use std::collections::HashSet;
use std::fmt::Debug;
use std::marker::PhantomData;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};
use url::Url;

/// Watches one contract event and forwards it as `M`.
pub struct EventWatcher<E> {
    contract: Contract,
    ws_url: Url,
    from_block: BlockNumber,
    _event: PhantomData<fn() -> E>,
}

impl<E> EventWatcher<E>
where
    E: ContractEvent + Debug,
{
    pub fn new(contract: Contract, ws_url: Url, from_block: BlockNumber) -> Self {
        Self {
            contract,
            ws_url,
            from_block,
            _event: PhantomData,
        }
    }

    /// Run the watcher until shutdown or the receiving side going away.
    ///
    /// Failures to subscribe or to fetch past logs are returned, and so is
    /// the node closing the subscription. Errors on individual logs are
    /// logged and skipped.
    pub async fn run<M>(
        self,
        mut shutdown_rx: watch::Receiver<bool>,
        event_tx: mpsc::Sender<M>,
    ) -> Result<(), ClientError>
    where
        M: From<E>,
    {
        let mut subscription = self.contract.subscribe::<E>(&self.ws_url).await?;
        let past = self.contract.past_logs::<E>(self.from_block).await?;
        info!(
            event = E::NAME,
            replayed = past.len(),
            subscription = subscription.id(),
            "EventWatcher started"
        );

        let mut seen = SeenLogs::default();
        for log in past {
            if seen.admit(&log) && !self.forward(&log, &event_tx).await {
                return Ok(());
            }
        }
        seen.finish_replay();

        let outcome = loop {
            tokio::select! {
                biased;

                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!(event = E::NAME, "EventWatcher received shutdown signal");
                        break Ok(());
                    }
                }

                frame = subscription.next() => {
                    match frame {
                        Some(Ok(log)) => {
                            if seen.admit(&log) && !self.forward(&log, &event_tx).await {
                                break Ok(());
                            }
                        }
                        Some(Err(e)) => {
                            warn!(event = E::NAME, error = %e, "Failed to read from subscription");
                        }
                        None => {
                            error!(event = E::NAME, "Subscription closed by node");
                            break Err(ClientError::SubscriptionClosed);
                        }
                    }
                }
            }
        };

        if let Err(e) = subscription.close().await {
            debug!(event = E::NAME, error = %e, "Failed to close subscription");
        }
        info!(event = E::NAME, "EventWatcher shutdown complete");
        outcome
    }

    /// Decode and forward a log. Returns `false` once the receiver is gone.
    async fn forward<M: From<E>>(&self, log: &Log, event_tx: &mpsc::Sender<M>) -> bool {
        let event = match self.contract.decode_event::<E>(log) {
            Ok(event) => event,
            Err(e) => {
                warn!(
                    event = E::NAME,
                    tx = ?log.transaction_hash,
                    error = %e,
                    "Skipping undecodable log"
                );
                return true;
            }
        };
        debug!(event = E::NAME, payload = ?event, "Received contract event");

        if event_tx.send(event.into()).await.is_err() {
            info!(event = E::NAME, "Event channel closed");
            return false;
        }
        true
    }
}

/// Filters reorged logs and logs delivered by both the replay and the live
/// subscription.
#[derive(Debug, Default)]
struct SeenLogs {
    replayed: HashSet<(H256, U256)>,
    replay_done: bool,
}

impl SeenLogs {
    fn admit(&mut self, log: &Log) -> bool {
        if log.removed {
            return false;
        }
        let Some(id) = log.id() else {
            return true;
        };
        if self.replay_done {
            // Each replayed log shows up at most once on the live stream.
            !self.replayed.remove(&id)
        } else {
            self.replayed.insert(id)
        }
    }

    fn finish_replay(&mut self) {
        self.replay_done = true;
    }
}
