//! HTTP focus service client and background poller.
//!
//! The service answers `GET <endpoint>` with a JSON object carrying a
//! `focused` field. Implementations disagree on its type, so booleans,
//! numbers (nonzero is focused) and strings (`true`, `1`, `yes`, `y`) are
//! all accepted. Every failure reads as [`FocusReading::Unavailable`].

use serde_json::Value;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};
use url::Url;

use super::{FocusReading, SharedFocus};
use crate::error::FocusError;

/// Fastest allowed poll rate (2 Hz).
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Normalize a focus service response body.
pub fn parse_focus_body(body: &Value) -> bool {
    match body.get("focused") {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        Some(Value::String(s)) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "1" | "yes" | "y"
        ),
        _ => false,
    }
}

#[derive(Debug, Clone)]
pub struct HttpFocusClient {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpFocusClient {
    /// # Errors
    ///
    /// Returns an error if `endpoint` is not an http(s) URL or the HTTP
    /// client cannot be built.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, FocusError> {
        let url = Url::parse(endpoint).map_err(|e| FocusError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(FocusError::InvalidEndpoint {
                endpoint: endpoint.to_string(),
                message: format!("unsupported scheme '{}'", url.scheme()),
            });
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: url,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Query the service once.
    pub async fn fetch(&self) -> Result<bool, FocusError> {
        let response = self.client.get(self.endpoint.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FocusError::Status(status.as_u16()));
        }
        let body: Value = response.json().await?;
        Ok(parse_focus_body(&body))
    }

    /// Query the service once, folding every failure into `Unavailable`.
    pub async fn probe(&self) -> FocusReading {
        match self.fetch().await {
            Ok(focused) => FocusReading::from_focused(focused),
            Err(e) => {
                debug!(endpoint = %self.endpoint, error = %e, "focus probe failed");
                FocusReading::Unavailable
            }
        }
    }
}

/// Background task keeping a [`SharedFocus`] up to date.
///
/// The task stops on [`FocusPoller::stop`] or when the poller is dropped.
pub struct FocusPoller {
    handle: Option<JoinHandle<()>>,
    shutdown: watch::Sender<bool>,
}

impl FocusPoller {
    /// Spawn on the current tokio runtime. Intervals below
    /// [`MIN_POLL_INTERVAL`] are raised to it.
    pub fn spawn(client: HttpFocusClient, shared: SharedFocus, interval: Duration) -> Self {
        let interval = interval.max(MIN_POLL_INTERVAL);
        let (shutdown, shutdown_rx) = watch::channel(false);
        info!(endpoint = %client.endpoint(), ?interval, "starting focus poller");
        let handle = tokio::spawn(poll_loop(client, shared, interval, shutdown_rx));
        Self {
            handle: Some(handle),
            shutdown,
        }
    }

    pub async fn stop(&mut self) {
        let _ = self.shutdown.send(true);
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for FocusPoller {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

async fn poll_loop(
    client: HttpFocusClient,
    shared: SharedFocus,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                shared.set(client.probe().await);
            }
            _ = shutdown.changed() => {
                debug!("focus poller shutting down");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::focus::FocusSignal;
    use serde_json::json;

    #[test]
    fn normalizes_boolean_number_and_string() {
        assert!(parse_focus_body(&json!({"focused": true})));
        assert!(!parse_focus_body(&json!({"focused": false})));
        assert!(parse_focus_body(&json!({"focused": 1})));
        assert!(parse_focus_body(&json!({"focused": -3})));
        assert!(!parse_focus_body(&json!({"focused": 0})));
        for s in ["true", "1", "yes", "y", " YES ", "True", "Y"] {
            assert!(parse_focus_body(&json!({ "focused": s })), "{s}");
        }
        for s in ["false", "0", "no", "", "maybe"] {
            assert!(!parse_focus_body(&json!({ "focused": s })), "{s}");
        }
    }

    #[test]
    fn missing_or_odd_field_is_unfocused() {
        assert!(!parse_focus_body(&json!({})));
        assert!(!parse_focus_body(&json!({"focused": null})));
        assert!(!parse_focus_body(&json!({"focused": [true]})));
        assert!(!parse_focus_body(&json!([true])));
    }

    #[test]
    fn rejects_non_http_endpoints() {
        let timeout = Duration::from_secs(1);
        assert!(HttpFocusClient::new("not a url", timeout).is_err());
        assert!(HttpFocusClient::new("ftp://localhost/focus", timeout).is_err());
        assert!(HttpFocusClient::new("http://127.0.0.1:5000/focus", timeout).is_ok());
    }

    #[tokio::test]
    async fn probe_reads_service_answer() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/focus")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"focused": " Yes "}"#)
            .create_async()
            .await;

        let client =
            HttpFocusClient::new(&format!("{}/focus", server.url()), Duration::from_secs(2))
                .unwrap();
        assert_eq!(client.probe().await, FocusReading::Focused);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn probe_fails_closed() {
        let mut server = mockito::Server::new_async().await;
        let _down = server
            .mock("GET", "/down")
            .with_status(503)
            .create_async()
            .await;
        let _garbled = server
            .mock("GET", "/garbled")
            .with_status(200)
            .with_body("<html>focused</html>")
            .create_async()
            .await;

        let timeout = Duration::from_secs(2);
        let down = HttpFocusClient::new(&format!("{}/down", server.url()), timeout).unwrap();
        assert!(matches!(down.fetch().await, Err(FocusError::Status(503))));
        assert_eq!(down.probe().await, FocusReading::Unavailable);

        let garbled = HttpFocusClient::new(&format!("{}/garbled", server.url()), timeout).unwrap();
        assert_eq!(garbled.probe().await, FocusReading::Unavailable);
    }

    #[tokio::test]
    async fn poller_updates_shared_value() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/focus")
            .with_status(200)
            .with_body(r#"{"focused": 0}"#)
            .create_async()
            .await;

        let client =
            HttpFocusClient::new(&format!("{}/focus", server.url()), Duration::from_secs(2))
                .unwrap();
        let shared = SharedFocus::new();
        let mut poller = FocusPoller::spawn(client, shared.clone(), Duration::from_millis(10));

        let polled = tokio::time::timeout(Duration::from_secs(5), async {
            while shared.read() == FocusReading::Unavailable {
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        })
        .await;
        assert!(polled.is_ok());
        assert_eq!(shared.read(), FocusReading::Unfocused);
        poller.stop().await;
    }
}
