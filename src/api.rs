/// Monitoring API relay: the second persistence tier.
///
/// When the primary database is unreachable, readings are relayed to the
/// central monitoring API as JSON over HTTP. The endpoint evaluates its
/// own alerts for readings it accepts and may report how many it
/// generated.
///
/// Delivery is only counted on HTTP 200 AND an application-level
/// `success: true` in the response body. Any other status, any transport
/// error, and any `success: false` is a failed attempt; attempts repeat
/// up to the configured retry budget with a fixed delay in between. The
/// inter-retry sleep is the one deliberate pause in the ingest loop.

use crate::config::ApiConfig;
use crate::model::{SensorReading, StoreError, Tier};
use crate::store::ReadingStore;
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// Response interpretation
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ApiResponse {
    success: bool,
    message: Option<String>,
    alerts_generated: Option<u32>,
}

/// Decides whether one HTTP exchange counts as delivery.
/// Returns the server-side alert count on success.
fn interpret_response(status: u16, body: &str) -> Result<Option<u32>, StoreError> {
    if status != 200 {
        return Err(StoreError::Rejected(format!("API error {}: {}", status, body.trim())));
    }

    let response: ApiResponse = serde_json::from_str(body)
        .map_err(|e| StoreError::Rejected(format!("unparseable API response: {}", e)))?;

    if response.success {
        Ok(response.alerts_generated)
    } else {
        Err(StoreError::Rejected(format!(
            "API reported failure: {}",
            response.message.unwrap_or_else(|| "no message".to_string())
        )))
    }
}

// ---------------------------------------------------------------------------
// Relay tier
// ---------------------------------------------------------------------------

/// Blocking HTTP relay to the monitoring API.
pub struct ApiRelay {
    client: reqwest::blocking::Client,
    url: String,
    api_key: String,
    max_retries: u32,
    retry_delay: Duration,
}

impl ApiRelay {
    pub fn new(config: &ApiConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            url: config.url.clone(),
            api_key: config.api_key.clone(),
            max_retries: config.max_retries.max(1),
            retry_delay: config.retry_delay(),
        })
    }

    fn submit_once(&self, reading: &SensorReading) -> Result<Option<u32>, StoreError> {
        let response = self
            .client
            .post(&self.url)
            .header("X-API-Key", &self.api_key)
            .json(reading)
            .send()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        interpret_response(status, &body)
    }
}

impl ReadingStore for ApiRelay {
    fn tier(&self) -> Tier {
        Tier::RemoteApi
    }

    fn store_reading(&mut self, reading: &SensorReading) -> Result<(), StoreError> {
        let mut last_error = StoreError::Unavailable("no attempt made".to_string());

        for attempt in 1..=self.max_retries {
            match self.submit_once(reading) {
                Ok(alerts_generated) => {
                    info!(
                        "reading delivered to API. Alerts generated: {}",
                        alerts_generated.unwrap_or(0)
                    );
                    return Ok(());
                }
                Err(e) => {
                    warn!("API attempt {}/{} failed: {}", attempt, self.max_retries, e);
                    last_error = e;
                }
            }

            if attempt < self.max_retries {
                std::thread::sleep(self.retry_delay);
            }
        }

        Err(last_error)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
