//! Axum server setup and router configuration.

use crate::state::AppState;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing::get};
use flightsurety_core::oracles::OracleRegistration;
use serde::Serialize;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::watch;

/// Build the main application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        .route("/api", get(api_info))
        .route("/api/oracles", get(list_oracles))
        .with_state(state)
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Simple health check - returns OK if the server is running.
async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct ApiInfoResponse {
    message: &'static str,
}

async fn api_info() -> impl IntoResponse {
    Json(ApiInfoResponse {
        message: "An API for use with your Dapp!",
    })
}

#[derive(Serialize)]
struct OraclesResponse<'a> {
    network: &'a str,
    count: usize,
    oracles: &'a [OracleRegistration],
}

/// Registered oracles and their indexes.
async fn list_oracles(State(state): State<AppState>) -> Response {
    let registry = state.registry();
    Json(OraclesResponse {
        network: &state.network,
        count: registry.len(),
        oracles: registry.as_slice(),
    })
    .into_response()
}

/// Run the server until `shutdown_rx` turns `true`.
pub async fn run_server(
    router: Router,
    addr: SocketAddr,
    mut shutdown_rx: watch::Receiver<bool>,
) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.wait_for(|stop| *stop).await;
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use flightsurety_core::oracles::OracleRegistry;
    use flightsurety_sdk::Address;
    use serde_json::{Value, json};
    use smallvec::smallvec;
    use tower::ServiceExt;

    fn router(registry: OracleRegistry) -> (Router, watch::Sender<OracleRegistry>) {
        let (registry_tx, registry_rx) = watch::channel(registry);
        (
            build_router(AppState::new("localhost".into(), registry_rx)),
            registry_tx,
        )
    }

    async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_api_message() {
        let (router, _tx) = router(OracleRegistry::default());
        let (status, body) = get_json(router, "/api").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "An API for use with your Dapp!"}));
    }

    #[tokio::test]
    async fn test_health() {
        let (router, _tx) = router(OracleRegistry::default());
        let (status, body) = get_json(router, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_oracles_follow_registry_updates() {
        let (router, registry_tx) = router(OracleRegistry::default());
        let (_, body) = get_json(router.clone(), "/api/oracles").await;
        assert_eq!(body["count"], 0);

        registry_tx.send_replace(
            [OracleRegistration::new(
                Address::from_low_u64_be(1),
                smallvec![2, 5, 8],
            )]
            .into_iter()
            .collect(),
        );
        let (_, body) = get_json(router, "/api/oracles").await;
        assert_eq!(body["network"], "localhost");
        assert_eq!(body["count"], 1);
        assert_eq!(body["oracles"][0]["indexes"], json!([2, 5, 8]));
    }
}
