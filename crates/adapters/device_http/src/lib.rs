//! # feedlot-adapter-device-http
//!
//! HTTP transport for networked feeding controllers. Implements the
//! [`FeederTransport`] port against the controller's small REST surface:
//!
//! | Round-trip | Request | Response |
//! |------------|---------|----------|
//! | Liveness probe | `GET /` | any 2xx |
//! | Scale reading | `GET /weight` | plain numeric body, e.g. `2.75` |
//! | Dispense | `POST /feed` with `{"quantity": 5.0}` | any 2xx |
//!
//! Per-call deadlines are the caller's concern; the connectivity manager
//! in `feedlot-app` wraps every round-trip in its own timeout.
//!
//! ## Dependency rule
//!
//! Depends on `feedlot-app` (port traits) and `feedlot-domain` only.

use feedlot_app::ports::FeederTransport;
use feedlot_domain::error::DeviceUnreachableError;

/// HTTP client for one feeding controller.
#[derive(Debug, Clone)]
pub struct HttpFeeder {
    address: String,
    client: reqwest::Client,
}

impl HttpFeeder {
    /// Create a transport for the controller at `address`
    /// (e.g. `http://10.0.0.7:8080`). A trailing slash is trimmed so the
    /// endpoint paths concatenate cleanly.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        let mut address = address.into();
        while address.ends_with('/') {
            address.pop();
        }
        Self {
            address,
            client: reqwest::Client::new(),
        }
    }

    fn unreachable(&self, reason: impl Into<String>) -> DeviceUnreachableError {
        DeviceUnreachableError {
            address: self.address.clone(),
            reason: reason.into(),
        }
    }

    fn check_status(&self, response: &reqwest::Response) -> Result<(), DeviceUnreachableError> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(self.unreachable(format!("controller answered {status}")))
        }
    }
}

impl FeederTransport for HttpFeeder {
    fn address(&self) -> &str {
        &self.address
    }

    #[tracing::instrument(skip(self), fields(address = %self.address))]
    async fn probe(&self) -> Result<(), DeviceUnreachableError> {
        let response = self
            .client
            .get(&self.address)
            .send()
            .await
            .map_err(|err| self.unreachable(err.to_string()))?;
        self.check_status(&response)
    }

    #[tracing::instrument(skip(self), fields(address = %self.address))]
    async fn read_weight(&self) -> Result<f64, DeviceUnreachableError> {
        let url = format!("{}/weight", self.address);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| self.unreachable(err.to_string()))?;
        self.check_status(&response)?;

        let body = response
            .text()
            .await
            .map_err(|err| self.unreachable(err.to_string()))?;
        body.trim()
            .parse()
            .map_err(|_| self.unreachable(format!("unparseable weight reading {body:?}")))
    }

    #[tracing::instrument(skip(self), fields(address = %self.address))]
    async fn send_feed(&self, quantity: f64) -> Result<(), DeviceUnreachableError> {
        let url = format!("{}/feed", self.address);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "quantity": quantity }))
            .send()
            .await
            .map_err(|err| self.unreachable(err.to_string()))?;
        self.check_status(&response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::Mutex;

    use axum::Json;
    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::{get, post};

    #[derive(Clone, Default)]
    struct Controller {
        weight: Arc<Mutex<f64>>,
        garbled: Arc<AtomicBool>,
        last_feed: Arc<Mutex<Option<f64>>>,
    }

    async fn serve(controller: Controller) -> String {
        let app = axum::Router::new()
            .route("/", get(|| async { "feeder v1" }))
            .route(
                "/weight",
                get(|State(c): State<Controller>| async move {
                    if c.garbled.load(Ordering::SeqCst) {
                        "not-a-number".to_owned()
                    } else {
                        format!("{}\n", c.weight.lock().await)
                    }
                }),
            )
            .route(
                "/feed",
                post(
                    |State(c): State<Controller>, Json(body): Json<serde_json::Value>| async move {
                        let quantity = body["quantity"].as_f64();
                        match quantity {
                            Some(q) if q > 0.0 => {
                                *c.last_feed.lock().await = Some(q);
                                StatusCode::OK
                            }
                            _ => StatusCode::UNPROCESSABLE_ENTITY,
                        }
                    },
                ),
            )
            .with_state(controller);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        address
    }

    #[tokio::test]
    async fn should_probe_live_controller() {
        let address = serve(Controller::default()).await;
        let feeder = HttpFeeder::new(address);
        assert!(feeder.probe().await.is_ok());
    }

    #[tokio::test]
    async fn should_fail_probe_when_nothing_listens() {
        // Bind then drop to get an address that refuses connections.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let feeder = HttpFeeder::new(address.clone());
        let err = feeder.probe().await.unwrap_err();
        assert_eq!(err.address, address);
    }

    #[tokio::test]
    async fn should_read_weight_from_plain_text_body() {
        let controller = Controller::default();
        *controller.weight.lock().await = 2.75;
        let address = serve(controller).await;

        let feeder = HttpFeeder::new(address);
        let weight = feeder.read_weight().await.unwrap();
        assert_eq!(weight, 2.75);
    }

    #[tokio::test]
    async fn should_fail_when_weight_body_is_garbled() {
        let controller = Controller::default();
        controller.garbled.store(true, Ordering::SeqCst);
        let address = serve(controller).await;

        let feeder = HttpFeeder::new(address);
        let err = feeder.read_weight().await.unwrap_err();
        assert!(err.reason.contains("unparseable weight reading"));
    }

    #[tokio::test]
    async fn should_send_feed_command_as_json() {
        let controller = Controller::default();
        let address = serve(controller.clone()).await;

        let feeder = HttpFeeder::new(address);
        feeder.send_feed(5.0).await.unwrap();

        assert_eq!(*controller.last_feed.lock().await, Some(5.0));
    }

    #[tokio::test]
    async fn should_surface_controller_refusal_as_unreachable() {
        let controller = Controller::default();
        let address = serve(controller).await;

        let feeder = HttpFeeder::new(address);
        let err = feeder.send_feed(-1.0).await.unwrap_err();
        assert!(err.reason.contains("422"));
    }

    #[test]
    fn should_trim_trailing_slash_from_address() {
        let feeder = HttpFeeder::new("http://10.0.0.7:8080/");
        assert_eq!(feeder.address(), "http://10.0.0.7:8080");
    }
}
