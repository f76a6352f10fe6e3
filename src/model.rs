/// Core data types for the mine environmental monitoring service.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no I/O and no pipeline logic — only types and the small
/// helpers that belong to them.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

// ---------------------------------------------------------------------------
// Measurement provenance
// ---------------------------------------------------------------------------

/// Where a channel value came from.
///
/// The normalizer fills three missing channels (oxygen, methane, airflow)
/// with plausible placeholders. Those are estimates, not measurements, and
/// downstream consumers must be able to tell the difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// Reported by a physical sensor on the serial line.
    Measured,
    /// Substituted by the normalizer for an absent channel.
    Estimated,
}

/// One optional-channel value plus its provenance.
///
/// Serializes as the bare number: the API wire format and the store schemas
/// carry no provenance column, so the tag is an in-process distinction only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub value: f64,
    pub provenance: Provenance,
}

impl Measurement {
    pub fn measured(value: f64) -> Self {
        Self { value, provenance: Provenance::Measured }
    }

    pub fn estimated(value: f64) -> Self {
        Self { value, provenance: Provenance::Estimated }
    }

    pub fn is_estimated(&self) -> bool {
        self.provenance == Provenance::Estimated
    }
}

impl Serialize for Measurement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.value)
    }
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// One timestamped set of sensor measurements from one mine location.
///
/// `location_id`, `temperature`, and `humidity` must be present before the
/// reading enters the persistence chain; the router rejects anything less.
/// `reading_time` is stamped at persist time when absent. Every other
/// channel is genuinely optional and stays `None` unless a sensor reported
/// it or the normalizer estimated it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorReading {
    pub location_id: Option<i64>,
    pub reading_time: Option<DateTime<Utc>>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub co2_ppm: Option<Measurement>,
    pub pm1_ugm3: Option<Measurement>,
    pub pm25_ugm3: Option<Measurement>,
    pub pm10_ugm3: Option<Measurement>,
    pub no2_ppm: Option<Measurement>,
    pub nh3_ppm: Option<Measurement>,
    pub co_ppm: Option<Measurement>,
    pub methane_percent: Option<Measurement>,
    pub oxygen_percent: Option<Measurement>,
    pub h2s_ppm: Option<Measurement>,
    pub airflow_ms: Option<Measurement>,
}

impl SensorReading {
    /// An empty reading; callers fill in what they have.
    pub fn empty() -> Self {
        Self {
            location_id: None,
            reading_time: None,
            temperature: None,
            humidity: None,
            co2_ppm: None,
            pm1_ugm3: None,
            pm25_ugm3: None,
            pm10_ugm3: None,
            no2_ppm: None,
            nh3_ppm: None,
            co_ppm: None,
            methane_percent: None,
            oxygen_percent: None,
            h2s_ppm: None,
            airflow_ms: None,
        }
    }

    /// Name of the first missing required field, if any.
    pub fn missing_required(&self) -> Option<&'static str> {
        if self.location_id.is_none() {
            Some("location_id")
        } else if self.temperature.is_none() {
            Some("temperature")
        } else if self.humidity.is_none() {
            Some("humidity")
        } else {
            None
        }
    }

    /// Channels whose current value was estimated rather than measured.
    pub fn estimated_channels(&self) -> Vec<&'static str> {
        let mut channels = Vec::new();
        let tagged: [(&'static str, &Option<Measurement>); 11] = [
            ("co2_ppm", &self.co2_ppm),
            ("pm1_ugm3", &self.pm1_ugm3),
            ("pm25_ugm3", &self.pm25_ugm3),
            ("pm10_ugm3", &self.pm10_ugm3),
            ("no2_ppm", &self.no2_ppm),
            ("nh3_ppm", &self.nh3_ppm),
            ("co_ppm", &self.co_ppm),
            ("methane_percent", &self.methane_percent),
            ("oxygen_percent", &self.oxygen_percent),
            ("h2s_ppm", &self.h2s_ppm),
            ("airflow_ms", &self.airflow_ms),
        ];
        for (name, value) in tagged {
            if value.map(|m| m.is_estimated()).unwrap_or(false) {
                channels.push(name);
            }
        }
        channels
    }
}

// ---------------------------------------------------------------------------
// Persistence outcomes
// ---------------------------------------------------------------------------

/// One of the three persistence destinations, in strict failover order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// The authoritative relational store.
    Primary,
    /// The cross-host HTTP path, used when the local database is unreachable.
    RemoteApi,
    /// The local embedded store; last-resort durability net.
    Fallback,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Primary => write!(f, "primary store"),
            Tier::RemoteApi => write!(f, "remote API"),
            Tier::Fallback => write!(f, "fallback store"),
        }
    }
}

/// Terminal state of one reading after the failover chain has run.
///
/// Deliberately three-state together with the separate validation rejection:
/// alert evaluation must only run on `Stored`, never on `Lost`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOutcome {
    /// The reading is durable in exactly one tier.
    Stored(Tier),
    /// Every tier failed; the reading is gone.
    Lost,
}

// ---------------------------------------------------------------------------
// Alert records
// ---------------------------------------------------------------------------

/// A danger condition instance to be recorded, tied to one reading.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAlert {
    pub location_id: i64,
    pub type_id: i32,
    pub condition_id: i32,
    pub severity: i32,
    pub threshold_value: f64,
    pub measured_value: f64,
    pub start_time: DateTime<Utc>,
}

/// The acknowledgment record paired with an alert at creation time.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAlertResponse {
    pub alert_id: i64,
    pub response_type: String,
    pub response_time: DateTime<Utc>,
    pub responding_crew: String,
    pub notes: String,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// A reading was rejected before any store attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The first required field found missing.
    pub missing: &'static str,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "missing required reading field: {}", self.missing)
    }
}

impl std::error::Error for ValidationError {}

/// Failure of a single tier attempt. Recovered by falling through to the
/// next tier; only the final tier's failure makes the reading `Lost`.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The backing store could not be reached or the write itself failed.
    Unavailable(String),
    /// The store answered but reported an application-level failure.
    Rejected(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Unavailable(msg) => write!(f, "store unavailable: {}", msg),
            StoreError::Rejected(msg) => write!(f, "store rejected write: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
