/// Local fallback store: embedded SQLite last-resort durability net.
///
/// This tier must never depend on the network or the primary database.
/// Readings land here only after both other tiers have failed, marked
/// `uploaded = 0, upload_attempts = 0` so the out-of-process reconciler
/// can re-attempt delivery later (reconciliation is not this service's
/// job). Alerts are also recordable here so a danger condition detected
/// while the primary is down is still durably written.
///
/// The database file and schema are created at startup. Failure to open
/// the fallback store is fatal: without the last-resort net the service
/// has no durability guarantee to offer.

use crate::alert::AlertSink;
use crate::model::{NewAlert, NewAlertResponse, SensorReading, StoreError, Tier};
use crate::store::ReadingStore;
use rusqlite::{Connection, params};
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

/// Fallback schema: the primary reading schema plus reconciliation
/// bookkeeping, and local alert tables for primary-down operation.
const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS sensor_data (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        reading_time TEXT NOT NULL,
        location_id INTEGER NOT NULL,
        temperature REAL,
        humidity REAL,
        co2_ppm REAL,
        pm1_ugm3 REAL,
        pm25_ugm3 REAL,
        pm10_ugm3 REAL,
        no2_ppm REAL,
        nh3_ppm REAL,
        co_ppm REAL,
        methane_percent REAL,
        oxygen_percent REAL,
        h2s_ppm REAL,
        airflow_ms REAL,
        uploaded BOOLEAN DEFAULT 0,
        upload_attempts INTEGER DEFAULT 0
    );

    CREATE TABLE IF NOT EXISTS alerts (
        alert_id INTEGER PRIMARY KEY AUTOINCREMENT,
        location_id INTEGER NOT NULL,
        type_id INTEGER NOT NULL,
        condition_id INTEGER NOT NULL,
        severity INTEGER NOT NULL,
        threshold_value REAL NOT NULL,
        measured_value REAL NOT NULL,
        start_time TEXT NOT NULL,
        is_active BOOLEAN NOT NULL DEFAULT 1
    );

    CREATE TABLE IF NOT EXISTS alert_responses (
        response_id INTEGER PRIMARY KEY AUTOINCREMENT,
        alert_id INTEGER NOT NULL,
        response_type TEXT NOT NULL,
        response_time TEXT NOT NULL,
        responding_crew TEXT NOT NULL,
        notes TEXT
    );
";

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// The third persistence tier and last-choice alert sink.
pub struct FallbackStore {
    conn: Rc<RefCell<Connection>>,
}

impl FallbackStore {
    /// Opens (creating if needed) the fallback database and its schema.
    pub fn open(path: &Path) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn: Rc::new(RefCell::new(conn)) })
    }

    /// In-memory store, for tests and dry runs.
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn: Rc::new(RefCell::new(conn)) })
    }

    /// A second handle over the same connection, so the alert sink and the
    /// reading tier share one database session.
    pub fn handle(&self) -> Self {
        Self { conn: self.conn.clone() }
    }

    /// Readings awaiting reconciliation (uploaded = 0).
    pub fn pending_upload_count(&self) -> Result<i64, rusqlite::Error> {
        self.conn.borrow().query_row(
            "SELECT COUNT(*) FROM sensor_data WHERE uploaded = 0",
            [],
            |row| row.get(0),
        )
    }

    /// Alerts recorded locally, oldest first. Read by the reconciliation
    /// tooling when it re-homes primary-down alerts.
    pub fn recorded_alerts(&self) -> Result<Vec<NewAlert>, rusqlite::Error> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(
            "SELECT location_id, type_id, condition_id, severity,
                    threshold_value, measured_value, start_time
             FROM alerts ORDER BY alert_id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(NewAlert {
                location_id: row.get(0)?,
                type_id: row.get(1)?,
                condition_id: row.get(2)?,
                severity: row.get(3)?,
                threshold_value: row.get(4)?,
                measured_value: row.get(5)?,
                start_time: row.get(6)?,
            })
        })?;
        rows.collect()
    }

    /// Automatic responses recorded for a given local alert.
    pub fn response_count_for(&self, alert_id: i64) -> Result<i64, rusqlite::Error> {
        self.conn.borrow().query_row(
            "SELECT COUNT(*) FROM alert_responses WHERE alert_id = ?1",
            params![alert_id],
            |row| row.get(0),
        )
    }
}

impl ReadingStore for FallbackStore {
    fn tier(&self) -> Tier {
        Tier::Fallback
    }

    fn store_reading(&mut self, reading: &SensorReading) -> Result<(), StoreError> {
        self.conn
            .borrow_mut()
            .execute(
                "INSERT INTO sensor_data (
                     reading_time, location_id, temperature, humidity, co2_ppm,
                     pm1_ugm3, pm25_ugm3, pm10_ugm3, no2_ppm, nh3_ppm, co_ppm,
                     methane_percent, oxygen_percent, h2s_ppm, airflow_ms,
                     uploaded, upload_attempts
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, 0, 0)",
                params![
                    reading.reading_time.map(|t| t.to_rfc3339()),
                    reading.location_id,
                    reading.temperature,
                    reading.humidity,
                    reading.co2_ppm.map(|m| m.value),
                    reading.pm1_ugm3.map(|m| m.value),
                    reading.pm25_ugm3.map(|m| m.value),
                    reading.pm10_ugm3.map(|m| m.value),
                    reading.no2_ppm.map(|m| m.value),
                    reading.nh3_ppm.map(|m| m.value),
                    reading.co_ppm.map(|m| m.value),
                    reading.methane_percent.map(|m| m.value),
                    reading.oxygen_percent.map(|m| m.value),
                    reading.h2s_ppm.map(|m| m.value),
                    reading.airflow_ms.map(|m| m.value),
                ],
            )
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(())
    }
}

impl AlertSink for FallbackStore {
    fn tier(&self) -> Tier {
        Tier::Fallback
    }

    fn insert_alert(&mut self, alert: &NewAlert) -> Result<i64, StoreError> {
        let conn = self.conn.borrow_mut();
        conn.execute(
            "INSERT INTO alerts (
                 location_id, type_id, condition_id, severity,
                 threshold_value, measured_value, start_time, is_active
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1)",
            params![
                alert.location_id,
                alert.type_id,
                alert.condition_id,
                alert.severity,
                alert.threshold_value,
                alert.measured_value,
                alert.start_time.to_rfc3339(),
            ],
        )
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(conn.last_insert_rowid())
    }

    fn insert_alert_response(&mut self, response: &NewAlertResponse) -> Result<(), StoreError> {
        self.conn
            .borrow_mut()
            .execute(
                "INSERT INTO alert_responses (
                     alert_id, response_type, response_time, responding_crew, notes
                 ) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    response.alert_id,
                    response.response_type,
                    response.response_time.to_rfc3339(),
                    response.responding_crew,
                    response.notes,
                ],
            )
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
