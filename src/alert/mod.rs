/// Alert evaluation and recording for durably persisted readings.
///
/// `thresholds` detects danger conditions; this module writes them out.
/// Alert rows go through an ordered list of sinks — primary store first,
/// local fallback second — so that a danger condition is still durably
/// recorded when the primary database is down. The remote API is not a
/// sink: it evaluates its own alerts server-side for readings it accepts.
///
/// Every recorded alert is paired at creation time with an automatic
/// acknowledgment response. If no sink accepts the alert, the condition is
/// logged as a hard failure and nothing more is done: a real danger went
/// unrecorded. A retry or alert-on-alert-failure strategy belongs to a
/// future revision.

pub mod thresholds;

use crate::model::{NewAlert, NewAlertResponse, SensorReading, StoreError, Tier};
use chrono::Utc;
use self::thresholds::DangerCondition;
use tracing::{error, info, warn};

// ---------------------------------------------------------------------------
// Sink capability
// ---------------------------------------------------------------------------

/// A store that can record alerts and their paired responses.
pub trait AlertSink {
    fn tier(&self) -> Tier;

    /// Inserts the alert row and returns its assigned id.
    fn insert_alert(&mut self, alert: &NewAlert) -> Result<i64, StoreError>;

    /// Inserts the acknowledgment row paired with a previously inserted
    /// alert in this same sink.
    fn insert_alert_response(&mut self, response: &NewAlertResponse) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// Recorder
// ---------------------------------------------------------------------------

/// One alert successfully written, with where it landed.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedAlert {
    pub alert_id: i64,
    pub tier: Tier,
    pub condition: DangerCondition,
}

/// Writes detected danger conditions through ordered sinks.
pub struct AlertRecorder {
    sinks: Vec<Box<dyn AlertSink>>,
}

impl AlertRecorder {
    pub fn new(sinks: Vec<Box<dyn AlertSink>>) -> Self {
        Self { sinks }
    }

    /// Evaluates every threshold rule against `reading` and records each
    /// triggered condition. Callers must only invoke this after the
    /// reading is durably persisted — never for a lost reading.
    pub fn record_alerts(&mut self, reading: &SensorReading) -> Vec<RecordedAlert> {
        let conditions = thresholds::evaluate(reading);
        if conditions.is_empty() {
            return Vec::new();
        }

        let Some(location_id) = reading.location_id else {
            // Unreachable after router validation; guard anyway.
            error!("cannot record alerts for a reading without a location id");
            return Vec::new();
        };

        let mut recorded = Vec::new();
        for condition in conditions {
            if let Some(entry) = self.record_one(location_id, condition) {
                recorded.push(entry);
            }
        }
        recorded
    }

    fn record_one(&mut self, location_id: i64, condition: DangerCondition) -> Option<RecordedAlert> {
        let alert = NewAlert {
            location_id,
            type_id: condition.type_id,
            condition_id: condition.condition_id,
            severity: condition.severity,
            threshold_value: condition.threshold,
            measured_value: condition.measured,
            start_time: Utc::now(),
        };

        for sink in &mut self.sinks {
            let tier = sink.tier();
            match sink.insert_alert(&alert) {
                Ok(alert_id) => {
                    if condition.from_estimate {
                        warn!(
                            "alert {} ({}) was triggered by an estimated value, not a measurement",
                            alert_id, condition.description
                        );
                    }
                    info!(
                        "recorded alert {} in {}: {} (severity {}, threshold {}, measured {})",
                        alert_id,
                        tier,
                        condition.description,
                        condition.severity,
                        condition.threshold,
                        condition.measured
                    );

                    let response = NewAlertResponse {
                        alert_id,
                        response_type: "Automatic".to_string(),
                        response_time: Utc::now(),
                        responding_crew: "System".to_string(),
                        notes: format!("{} detected automatically", condition.description),
                    };
                    if let Err(e) = sink.insert_alert_response(&response) {
                        error!(
                            "alert {} recorded in {} but its automatic response failed: {}",
                            alert_id, tier, e
                        );
                    }

                    return Some(RecordedAlert { alert_id, tier, condition });
                }
                Err(e) => {
                    warn!("{} refused alert insert: {}", tier, e);
                }
            }
        }

        error!(
            "danger condition went unrecorded: {} (severity {}, threshold {}, measured {})",
            condition.description, condition.severity, condition.threshold, condition.measured
        );
        None
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
