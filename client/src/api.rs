use aspexis_shared::{ClientConfig, Endpoint, FetchError, QueryKey, RawResponse, TransportResult};
use gloo_net::http::Request;

fn encode_component(raw: &str) -> String {
    String::from(js_sys::encode_uri_component(raw))
}

/// GET the backend route for `key`. Every HTTP status comes back as a response;
/// only network and body-read failures are `Err`.
pub async fn fetch(base: &str, key: &QueryKey) -> TransportResult {
    key.validate()?;
    let url = Endpoint::for_key(key).to_url(base, encode_component);

    let resp = Request::get(&url)
        .send()
        .await
        .map_err(|e| FetchError::Transport(format!("fetch error: {e}")))?;
    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|e| FetchError::Transport(format!("read error: {e}")))?;
    Ok(RawResponse { status, body })
}

/// Deployment config served next to the bundle. Missing or broken config means
/// the backend shares our origin.
pub async fn load_client_config() -> ClientConfig {
    let Ok(resp) = Request::get("/config.json").send().await else {
        return ClientConfig::default();
    };
    if !resp.ok() {
        return ClientConfig::default();
    }
    match resp.json::<ClientConfig>().await {
        Ok(config) => config,
        Err(e) => {
            crate::storage::log_warn(&format!("ignoring malformed /config.json: {e}"));
            ClientConfig::default()
        }
    }
}

pub fn origin() -> String {
    web_sys::window()
        .and_then(|window| window.location().origin().ok())
        .unwrap_or_default()
}
