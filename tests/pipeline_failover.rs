/// Integration tests for the frame-to-alert pipeline and its failover
/// behavior.
///
/// These tests drive the real `Pipeline` — frame parsing, location
/// resolution, normalization, the persistence router, and the alert
/// recorder — with substitutable primary/API tiers and a REAL in-memory
/// SQLite fallback store, so the last-resort path is exercised end to end
/// without external infrastructure.
///
/// Run with: cargo test --test pipeline_failover

use minemon_service::alert::{AlertRecorder, AlertSink};
use minemon_service::daemon::{FrameOutcome, Pipeline};
use minemon_service::fallback::FallbackStore;
use minemon_service::locations::LocationDirectory;
use minemon_service::model::{
    NewAlert, NewAlertResponse, SensorReading, StoreError, Tier,
};
use minemon_service::store::{PersistenceRouter, ReadingStore};
use std::cell::RefCell;
use std::rc::Rc;

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------

/// Resolver with a fixed directory, as if the lookups had already been
/// warehoused.
struct StaticDirectory;

impl LocationDirectory for StaticDirectory {
    fn resolve(&mut self, section_name: &str) -> i64 {
        match section_name {
            "North-Adit" => 11,
            "Shaft-2" => 12,
            "Decline-1" => 13,
            _ => 1,
        }
    }
}

/// A primary/API tier that is either up (capturing readings) or down.
struct SwitchableStore {
    tier: Tier,
    up: bool,
    accepted: Rc<RefCell<Vec<SensorReading>>>,
}

impl SwitchableStore {
    fn up(tier: Tier) -> (Box<dyn ReadingStore>, Rc<RefCell<Vec<SensorReading>>>) {
        let accepted = Rc::new(RefCell::new(Vec::new()));
        (Box::new(Self { tier, up: true, accepted: accepted.clone() }), accepted)
    }

    fn down(tier: Tier) -> Box<dyn ReadingStore> {
        Box::new(Self { tier, up: false, accepted: Rc::new(RefCell::new(Vec::new())) })
    }
}

impl ReadingStore for SwitchableStore {
    fn tier(&self) -> Tier {
        self.tier
    }

    fn store_reading(&mut self, reading: &SensorReading) -> Result<(), StoreError> {
        if !self.up {
            return Err(StoreError::Unavailable("unreachable".to_string()));
        }
        self.accepted.borrow_mut().push(reading.clone());
        Ok(())
    }
}

/// Capturing primary-tier alert sink.
struct CapturingSink {
    up: bool,
    alerts: Rc<RefCell<Vec<NewAlert>>>,
    responses: Rc<RefCell<Vec<NewAlertResponse>>>,
}

impl CapturingSink {
    fn up() -> (
        Box<dyn AlertSink>,
        Rc<RefCell<Vec<NewAlert>>>,
        Rc<RefCell<Vec<NewAlertResponse>>>,
    ) {
        let alerts = Rc::new(RefCell::new(Vec::new()));
        let responses = Rc::new(RefCell::new(Vec::new()));
        (
            Box::new(Self { up: true, alerts: alerts.clone(), responses: responses.clone() }),
            alerts,
            responses,
        )
    }

    fn down() -> Box<dyn AlertSink> {
        Box::new(Self {
            up: false,
            alerts: Rc::new(RefCell::new(Vec::new())),
            responses: Rc::new(RefCell::new(Vec::new())),
        })
    }
}

impl AlertSink for CapturingSink {
    fn tier(&self) -> Tier {
        Tier::Primary
    }

    fn insert_alert(&mut self, alert: &NewAlert) -> Result<i64, StoreError> {
        if !self.up {
            return Err(StoreError::Unavailable("unreachable".to_string()));
        }
        self.alerts.borrow_mut().push(alert.clone());
        Ok(self.alerts.borrow().len() as i64)
    }

    fn insert_alert_response(&mut self, response: &NewAlertResponse) -> Result<(), StoreError> {
        if !self.up {
            return Err(StoreError::Unavailable("unreachable".to_string()));
        }
        self.responses.borrow_mut().push(response.clone());
        Ok(())
    }
}

const FULL_FRAME: &str =
    "DB_INSERT|North-Adit|22.5|45.0|1200|5|8|12|0.2|1.0|3|0.5|20.6|1.0|0.4";

// ---------------------------------------------------------------------------
// Scenario 1: healthy primary
// ---------------------------------------------------------------------------

#[test]
fn test_healthy_primary_stores_reading_and_records_co2_alert() {
    let (primary, primary_readings) = SwitchableStore::up(Tier::Primary);
    let (api, api_readings) = SwitchableStore::up(Tier::RemoteApi);
    let fallback = FallbackStore::open_in_memory().unwrap();

    let router = PersistenceRouter::new(vec![primary, api, Box::new(fallback.handle())]);
    let (sink, alerts, responses) = CapturingSink::up();
    let recorder = AlertRecorder::new(vec![sink, Box::new(fallback.handle())]);
    let mut pipeline = Pipeline::new(Box::new(StaticDirectory), router, recorder);

    let outcome = pipeline.handle_frame(FULL_FRAME);

    assert_eq!(
        outcome,
        FrameOutcome::Persisted { tier: Tier::Primary, alerts_recorded: 1 }
    );

    // The reading went to the primary tier only.
    assert_eq!(primary_readings.borrow().len(), 1);
    assert!(api_readings.borrow().is_empty(), "API must not be touched after primary success");
    assert_eq!(fallback.pending_upload_count().unwrap(), 0);

    // One High-CO2 alert with its automatic response.
    let alerts = alerts.borrow();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].location_id, 11);
    assert_eq!(alerts[0].severity, 8);
    assert_eq!(alerts[0].threshold_value, 1000.0);
    assert_eq!(alerts[0].measured_value, 1200.0);

    let responses = responses.borrow();
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0].response_type, "Automatic");
    assert_eq!(responses[0].responding_crew, "System");
    assert!(responses[0].notes.contains("High CO2 levels"));
}

// ---------------------------------------------------------------------------
// Scenario 2: primary down, API unreachable
// ---------------------------------------------------------------------------

#[test]
fn test_double_outage_lands_in_fallback_and_still_alerts() {
    let fallback = FallbackStore::open_in_memory().unwrap();

    let router = PersistenceRouter::new(vec![
        SwitchableStore::down(Tier::Primary),
        SwitchableStore::down(Tier::RemoteApi),
        Box::new(fallback.handle()),
    ]);
    let recorder = AlertRecorder::new(vec![CapturingSink::down(), Box::new(fallback.handle())]);
    let mut pipeline = Pipeline::new(Box::new(StaticDirectory), router, recorder);

    let outcome = pipeline.handle_frame(FULL_FRAME);

    assert_eq!(
        outcome,
        FrameOutcome::Persisted { tier: Tier::Fallback, alerts_recorded: 1 }
    );

    // The reading is in the fallback store, flagged for the reconciler.
    assert_eq!(fallback.pending_upload_count().unwrap(), 1);

    // The same High-CO2 alert exists, recorded through the fallback sink,
    // with its paired automatic response.
    let alerts = fallback.recorded_alerts().unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].location_id, 11);
    assert_eq!(alerts[0].severity, 8);
    assert_eq!(alerts[0].threshold_value, 1000.0);
    assert_eq!(alerts[0].measured_value, 1200.0);

    let paired = fallback.response_count_for(1).unwrap();
    assert_eq!(paired, 1, "the automatic response must accompany the alert");
}

// ---------------------------------------------------------------------------
// Scenario 3: trailing garbage token
// ---------------------------------------------------------------------------

#[test]
fn test_trailing_garbage_token_is_discarded_not_fatal() {
    let (primary, primary_readings) = SwitchableStore::up(Tier::Primary);
    let fallback = FallbackStore::open_in_memory().unwrap();

    let router = PersistenceRouter::new(vec![primary, Box::new(fallback.handle())]);
    let (sink, alerts, _) = CapturingSink::up();
    let recorder = AlertRecorder::new(vec![sink]);
    let mut pipeline = Pipeline::new(Box::new(StaticDirectory), router, recorder);

    let outcome =
        pipeline.handle_frame("DB_INSERT|Shaft-2|21.0|40.0|300|1|2|3|0.1|0.2|0.5|abc");

    assert!(
        matches!(outcome, FrameOutcome::Persisted { tier: Tier::Primary, .. }),
        "expected persistence, got {:?}",
        outcome
    );

    let readings = primary_readings.borrow();
    assert_eq!(readings[0].location_id, Some(12));
    assert_eq!(readings[0].co2_ppm.unwrap().value, 300.0);
    assert_eq!(readings[0].co_ppm.unwrap().value, 0.5);
    assert!(alerts.borrow().is_empty(), "300 ppm CO2 is safe");
}

// ---------------------------------------------------------------------------
// Scenario 4: absent channels are estimated before persistence
// ---------------------------------------------------------------------------

#[test]
fn test_absent_channels_are_estimated_within_ranges_before_storing() {
    let (primary, primary_readings) = SwitchableStore::up(Tier::Primary);
    let fallback = FallbackStore::open_in_memory().unwrap();

    let router = PersistenceRouter::new(vec![primary, Box::new(fallback.handle())]);
    let (sink, _, _) = CapturingSink::up();
    let recorder = AlertRecorder::new(vec![sink]);
    let mut pipeline = Pipeline::new(Box::new(StaticDirectory), router, recorder);

    pipeline.handle_frame("DB_INSERT|Decline-1|24.0|52.0|450|3|6|9|0.1|0.4|2");

    let readings = primary_readings.borrow();
    let reading = &readings[0];

    let oxygen = reading.oxygen_percent.expect("oxygen must be filled");
    assert!(oxygen.is_estimated());
    assert!((20.2..=20.8).contains(&oxygen.value), "oxygen {} out of range", oxygen.value);

    let methane = reading.methane_percent.expect("methane must be filled");
    assert!(methane.is_estimated());
    assert!((0.1..=0.8).contains(&methane.value), "methane {} out of range", methane.value);

    let airflow = reading.airflow_ms.expect("airflow must be filled");
    assert!(airflow.is_estimated());
    assert!((0.3..=0.8).contains(&airflow.value), "airflow {} out of range", airflow.value);

    assert_eq!(reading.h2s_ppm, None, "H2S has no estimate policy and stays absent");
}

// ---------------------------------------------------------------------------
// Loss accounting
// ---------------------------------------------------------------------------

#[test]
fn test_total_outage_reports_lost_and_records_no_alert() {
    let router = PersistenceRouter::new(vec![
        SwitchableStore::down(Tier::Primary),
        SwitchableStore::down(Tier::RemoteApi),
        SwitchableStore::down(Tier::Fallback),
    ]);
    let (sink, alerts, _) = CapturingSink::up();
    let recorder = AlertRecorder::new(vec![sink]);
    let mut pipeline = Pipeline::new(Box::new(StaticDirectory), router, recorder);

    let outcome = pipeline.handle_frame(FULL_FRAME);

    assert_eq!(outcome, FrameOutcome::Lost);
    assert!(
        alerts.borrow().is_empty(),
        "a lost reading must never reach alert evaluation"
    );
}
