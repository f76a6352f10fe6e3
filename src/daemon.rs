/// Core daemon implementation for the mine monitoring ingest service
///
/// This module implements the main ingest loop that:
/// 1. Validates store connectivity on startup (primary tolerated down,
///    fallback required)
/// 2. Builds the failover chain, alert recorder, and location resolver
///    over explicitly owned, injected connection handles
/// 3. Continuously reads frames from the serial transport
/// 4. Drives each reading through parse → resolve → normalize → persist →
///    alert, strictly one frame at a time and in arrival order
/// 5. Releases store connections on loop exit, whatever the exit path

use crate::alert::AlertRecorder;
use crate::api::ApiRelay;
use crate::config::Config;
use crate::db::{self, PrimaryStore};
use crate::fallback::FallbackStore;
use crate::ingest::frame::{self, FrameError, ParsedFrame};
use crate::locations::{LocationDirectory, LocationResolver};
use crate::model::{Measurement, PersistOutcome, SensorReading, Tier};
use crate::normalize;
use crate::store::PersistenceRouter;
use crate::transport::LineTransport;
use std::cell::RefCell;
use std::error::Error;
use std::path::Path;
use std::rc::Rc;
use tracing::{debug, error, info, warn};

// ---------------------------------------------------------------------------
// Frame outcomes
// ---------------------------------------------------------------------------

/// What became of one transport line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Not a reading frame; ignored.
    Skipped,
    /// A reading frame that could not be parsed; dropped.
    Malformed,
    /// Persisted to a tier, with however many alerts that triggered.
    Persisted { tier: Tier, alerts_recorded: usize },
    /// Every persistence tier failed; the reading is gone.
    Lost,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// The per-frame processing pipeline, assembled from substitutable parts.
pub struct Pipeline {
    resolver: Box<dyn LocationDirectory>,
    router: PersistenceRouter,
    alerts: AlertRecorder,
}

impl Pipeline {
    pub fn new(
        resolver: Box<dyn LocationDirectory>,
        router: PersistenceRouter,
        alerts: AlertRecorder,
    ) -> Self {
        Self { resolver, router, alerts }
    }

    /// Processes one transport line to completion. Alert evaluation for
    /// this reading finishes before the caller reads the next line, which
    /// is what keeps danger-alert semantics in arrival order.
    pub fn handle_frame(&mut self, line: &str) -> FrameOutcome {
        let parsed = match frame::parse_frame(line) {
            Ok(parsed) => parsed,
            Err(FrameError::NotAReading) => {
                debug!("ignoring non-reading frame: {}", line);
                return FrameOutcome::Skipped;
            }
            Err(e) => {
                warn!("dropping malformed reading frame: {} ({})", e, line);
                return FrameOutcome::Malformed;
            }
        };

        let location_id = self.resolver.resolve(&parsed.location_name);
        let mut reading = reading_from_frame(location_id, &parsed);
        normalize::fill_estimates(&mut reading);

        match self.router.persist(&mut reading) {
            Ok(PersistOutcome::Stored(tier)) => {
                let recorded = self.alerts.record_alerts(&reading);
                FrameOutcome::Persisted { tier, alerts_recorded: recorded.len() }
            }
            Ok(PersistOutcome::Lost) => FrameOutcome::Lost,
            Err(e) => {
                // A parsed frame always carries the required fields, so
                // this only fires for a bug upstream of the router.
                error!("parsed reading failed validation: {}", e);
                FrameOutcome::Malformed
            }
        }
    }
}

/// Maps a parsed wire frame onto the domain record. Every wire value is a
/// real measurement; estimates only enter via the normalizer.
fn reading_from_frame(location_id: i64, parsed: &ParsedFrame) -> SensorReading {
    let mut reading = SensorReading::empty();
    reading.location_id = Some(location_id);
    reading.temperature = Some(parsed.temperature);
    reading.humidity = Some(parsed.humidity);
    reading.co2_ppm = Some(Measurement::measured(parsed.co2_ppm));
    reading.pm1_ugm3 = Some(Measurement::measured(parsed.pm1_ugm3));
    reading.pm25_ugm3 = Some(Measurement::measured(parsed.pm25_ugm3));
    reading.pm10_ugm3 = Some(Measurement::measured(parsed.pm10_ugm3));
    reading.no2_ppm = Some(Measurement::measured(parsed.no2_ppm));
    reading.nh3_ppm = Some(Measurement::measured(parsed.nh3_ppm));
    reading.co_ppm = Some(Measurement::measured(parsed.co_ppm));
    reading.methane_percent = parsed.methane_percent.map(Measurement::measured);
    reading.oxygen_percent = parsed.oxygen_percent.map(Measurement::measured);
    reading.h2s_ppm = parsed.h2s_ppm.map(Measurement::measured);
    reading.airflow_ms = parsed.airflow_ms.map(Measurement::measured);
    reading
}

// ---------------------------------------------------------------------------
// Daemon
// ---------------------------------------------------------------------------

/// Main daemon state
pub struct Daemon {
    config: Config,
    pipeline: Option<Pipeline>,
}

impl Daemon {
    /// Create a new daemon instance; call `initialize` before `run`.
    pub fn new(config: Config) -> Self {
        Self { config, pipeline: None }
    }

    /// Initialize daemon: connect stores and assemble the pipeline.
    ///
    /// The primary store being down is tolerated — the chain degrades to
    /// the API and fallback tiers. A fallback store that cannot open is
    /// fatal: without the last-resort net the service has nothing to
    /// promise.
    pub fn initialize(&mut self) -> Result<(), Box<dyn Error>> {
        let primary = match db::connect_and_verify(&db::REQUIRED_TABLES) {
            Ok(client) => {
                info!("connected to primary store");
                Some(Rc::new(RefCell::new(client)))
            }
            Err(e) => {
                warn!("primary store unavailable at startup, degrading to API/fallback: {}", e);
                None
            }
        };

        let fallback = FallbackStore::open(Path::new(&self.config.fallback.path))?;
        let pending = fallback.pending_upload_count().unwrap_or(0);
        if pending > 0 {
            info!("fallback store holds {} readings awaiting reconciliation", pending);
        }

        let relay = ApiRelay::new(&self.config.api)?;

        let router = PersistenceRouter::new(vec![
            Box::new(PrimaryStore::new(primary.clone())),
            Box::new(relay),
            Box::new(fallback.handle()),
        ]);

        let alerts = AlertRecorder::new(vec![
            Box::new(PrimaryStore::new(primary.clone())),
            Box::new(fallback),
        ]);

        let resolver =
            LocationResolver::new(primary, self.config.location_defaults.clone());

        self.pipeline = Some(Pipeline::new(Box::new(resolver), router, alerts));
        Ok(())
    }

    /// Main ingest loop (runs until the transport fails).
    ///
    /// One frame is fully parsed, normalized, persisted, and
    /// alert-evaluated before the next is read: the failover chain —
    /// retry delays included — runs to completion per reading. Per-frame
    /// errors never end the loop; only a fatal transport error does, and
    /// the store handles are released by drop on every exit path.
    pub fn run(&mut self, transport: &mut dyn LineTransport) -> Result<(), Box<dyn Error>> {
        let pipeline = self.pipeline.as_mut().ok_or("Daemon not initialized")?;

        loop {
            match transport.next_line() {
                Ok(Some(line)) => {
                    debug!("received frame: {}", line);
                    match pipeline.handle_frame(&line) {
                        FrameOutcome::Persisted { tier, alerts_recorded } => {
                            if alerts_recorded > 0 {
                                info!(
                                    "reading stored in {} with {} danger alert(s)",
                                    tier, alerts_recorded
                                );
                            }
                        }
                        FrameOutcome::Lost => {
                            // Already logged as a hard failure by the router.
                        }
                        FrameOutcome::Skipped | FrameOutcome::Malformed => {}
                    }
                }
                Ok(None) => continue,
                Err(e) => {
                    error!("fatal transport error, shutting down: {}", e);
                    return Err(e.into());
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
