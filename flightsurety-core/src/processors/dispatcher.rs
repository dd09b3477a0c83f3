//! OracleDispatcher processor.
//!
//! The OracleDispatcher is responsible for:
//! - Receiving `OracleRequest` events via the `Processor` trait
//! - Drawing one pseudo-random status code per request
//! - Spawning one `submitOracleResponse` per registered oracle holding the
//!   requested index, all carrying the same status code
//!
//! Submissions are fire-and-forget: each runs in its own task, the outcome is
//! only logged and nothing is retried.

use crate::events::{OracleRequestReceiver, OracleResponse};
use crate::gateway::OracleGateway;
use crate::oracles::OracleRegistry;
use flightsurety_sdk::objects::{FlightStatus, OracleRequest};
use kanau::processor::Processor;
use rand::Rng;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Status codes the simulated oracles report.
const SIMULATED_STATUSES: [FlightStatus; 5] = [
    FlightStatus::Unknown,
    FlightStatus::OnTime,
    FlightStatus::LateAirline,
    FlightStatus::LateWeather,
    FlightStatus::LateTechnical,
];

/// Draw a status code uniformly from `0, 10, 20, 30, 40`.
pub fn random_status_code<R: Rng + ?Sized>(rng: &mut R) -> u8 {
    SIMULATED_STATUSES[rng.random_range(0..SIMULATED_STATUSES.len())].code()
}

/// The responses owed by `registry` to `request`, in registration order.
pub fn plan_responses(
    registry: &OracleRegistry,
    request: &OracleRequest,
    status_code: u8,
) -> Vec<OracleResponse> {
    registry
        .matching(request.index)
        .map(|oracle| OracleResponse::new(oracle.address, request, status_code))
        .collect()
}

/// What the dispatcher did with one request.
#[derive(Debug)]
pub struct Dispatched {
    pub status_code: u8,
    /// One handle per spawned submission.
    pub handles: Vec<JoinHandle<()>>,
}

pub struct OracleDispatcher {
    gateway: Arc<dyn OracleGateway>,
    registry: OracleRegistry,
}

impl OracleDispatcher {
    pub fn new(gateway: Arc<dyn OracleGateway>, registry: OracleRegistry) -> Self {
        Self { gateway, registry }
    }

    /// Run the OracleDispatcher until shutdown is signaled or the request
    /// channel closes.
    pub async fn run(
        self,
        mut shutdown_rx: watch::Receiver<bool>,
        mut request_rx: OracleRequestReceiver,
    ) {
        info!(oracles = self.registry.len(), "OracleDispatcher started");

        loop {
            tokio::select! {
                biased;

                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("OracleDispatcher received shutdown signal");
                        break;
                    }
                }

                Some(request) = request_rx.recv() => {
                    let _ = self.process(request).await;
                }

                else => {
                    info!("OracleRequest channel closed");
                    break;
                }
            }
        }

        info!("OracleDispatcher shutdown complete");
    }

    fn spawn_submission(&self, response: OracleResponse) -> JoinHandle<()> {
        let gateway = Arc::clone(&self.gateway);
        tokio::spawn(async move {
            let OracleResponse {
                oracle,
                index,
                flight,
                status_code,
            } = response;
            match gateway
                .submit_response(oracle, index, &flight, status_code)
                .await
            {
                Ok(()) => info!(
                    oracle = ?oracle,
                    index,
                    status_code,
                    "RESULT: oracle response accepted"
                ),
                Err(e) => warn!(
                    oracle = ?oracle,
                    index,
                    error = %e,
                    "Oracle response was rejected"
                ),
            }
        })
    }
}

impl Processor<OracleRequest> for OracleDispatcher {
    type Output = Dispatched;
    type Error = Infallible;

    async fn process(&self, request: OracleRequest) -> Result<Dispatched, Infallible> {
        let status_code = random_status_code(&mut rand::rng());
        let responses = plan_responses(&self.registry, &request, status_code);

        debug!(
            index = request.index,
            airline = ?request.flight.airline,
            flight = %request.flight.flight,
            timestamp = request.flight.timestamp,
            status_code,
            responders = responses.len(),
            "Received OracleRequest"
        );

        let handles = responses
            .into_iter()
            .map(|response| self.spawn_submission(response))
            .collect();
        Ok(Dispatched {
            status_code,
            handles,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracles::OracleRegistration;
    use crate::testing::{MockGateway, account};
    use flightsurety_sdk::objects::FlightKey;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use smallvec::smallvec;
    use std::collections::HashSet;

    fn request(index: u8) -> OracleRequest {
        OracleRequest {
            index,
            flight: FlightKey::new(account(0), "ND1309", 1_700_000_000),
        }
    }

    fn registry() -> OracleRegistry {
        [
            OracleRegistration::new(account(1), smallvec![1, 4, 7]),
            OracleRegistration::new(account(2), smallvec![2, 4, 8]),
            OracleRegistration::new(account(3), smallvec![0, 3, 5]),
            OracleRegistration::new(account(4), smallvec![4, 6, 9]),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_random_status_code_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let codes: HashSet<u8> = (0..500).map(|_| random_status_code(&mut rng)).collect();
        assert_eq!(codes, HashSet::from([0, 10, 20, 30, 40]));
    }

    #[test]
    fn test_plan_responses_only_matching_oracles() {
        let planned = plan_responses(&registry(), &request(4), 20);
        let oracles: Vec<_> = planned.iter().map(|r| r.oracle).collect();
        assert_eq!(oracles, vec![account(1), account(2), account(4)]);
        assert!(planned.iter().all(|r| r.index == 4 && r.status_code == 20));

        assert!(plan_responses(&registry(), &request(255), 20).is_empty());
    }

    #[tokio::test]
    async fn test_one_submission_per_matching_oracle() {
        let gateway = Arc::new(MockGateway::default());
        let dispatcher = OracleDispatcher::new(gateway.clone(), registry());

        let Ok(dispatched) = dispatcher.process(request(4)).await;
        assert_eq!(dispatched.handles.len(), 3);
        for handle in dispatched.handles {
            handle.await.unwrap();
        }

        let submissions = gateway.submissions();
        let mut oracles: Vec<_> = submissions.iter().map(|s| s.oracle).collect();
        oracles.sort();
        assert_eq!(oracles, vec![account(1), account(2), account(4)]);
        assert!(submissions.iter().all(|s| s.index == 4));
        assert!(submissions.iter().all(|s| s.flight == request(4).flight));
        assert!(
            submissions
                .iter()
                .all(|s| s.status_code == dispatched.status_code)
        );
        assert!([0, 10, 20, 30, 40].contains(&dispatched.status_code));
    }

    #[tokio::test]
    async fn test_rejected_submission_does_not_affect_others() {
        let mut gateway = MockGateway::default();
        gateway.failing.insert(account(2));
        let gateway = Arc::new(gateway);
        let dispatcher = OracleDispatcher::new(gateway.clone(), registry());

        let Ok(dispatched) = dispatcher.process(request(4)).await;
        for handle in dispatched.handles {
            handle.await.unwrap();
        }
        assert_eq!(gateway.submissions().len(), 3);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let gateway = Arc::new(MockGateway::default());
        let dispatcher = OracleDispatcher::new(gateway.clone(), registry());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (request_tx, request_rx) = crate::events::oracle_request_channel();

        let handle = tokio::spawn(dispatcher.run(shutdown_rx, request_rx));
        request_tx.send(request(3)).await.unwrap();
        tokio::task::yield_now().await;
        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
    }
}
