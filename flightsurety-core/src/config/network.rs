use compact_str::CompactString;
use flightsurety_sdk::Address;
use url::Url;

/// Connection details and contract addresses of one deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    /// Name of the network entry, e.g. `localhost`.
    pub name: CompactString,
    /// HTTP JSON-RPC endpoint.
    pub url: Url,
    /// WebSocket endpoint used for log subscriptions.
    pub ws_url: Url,
    pub app_address: Address,
    pub data_address: Address,
}

/// Derive the WebSocket endpoint from an HTTP one by swapping the scheme
/// prefix (`http` -> `ws`, `https` -> `wss`).
pub fn derive_ws_url(http: &Url) -> Result<Url, url::ParseError> {
    Url::parse(&http.as_str().replacen("http", "ws", 1))
}
