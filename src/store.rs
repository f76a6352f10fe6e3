/// Tiered persistence: the failover core of the ingest pipeline.
///
/// Three destinations, tried in strict order, stop at first success:
///
///   1. primary relational store — authoritative and fastest
///   2. remote monitoring API    — the cross-host path when the local
///                                 database is unreachable
///   3. local fallback store     — last-resort durability net with no
///                                 dependency on network or the primary DB
///
/// Each tier lives behind the same `ReadingStore` capability so the chain
/// is an ordered list of substitutable implementations, injected at
/// construction. A failure in one tier never corrupts or blocks another.
///
/// The outcome is three-state, not boolean: a reading is rejected before
/// any tier (validation), `Stored` in exactly one tier, or `Lost` after
/// every tier failed. Alert evaluation must only follow `Stored`.

use crate::model::{PersistOutcome, SensorReading, StoreError, Tier, ValidationError};
use chrono::Utc;
use tracing::{error, info, warn};

// ---------------------------------------------------------------------------
// Store capability
// ---------------------------------------------------------------------------

/// One persistence destination in the failover chain.
pub trait ReadingStore {
    /// Which failover tier this store represents, for logging and outcomes.
    fn tier(&self) -> Tier;

    /// Attempts to durably record one reading. Implementations own their
    /// internal retry policy; a returned error means the tier is spent for
    /// this reading.
    fn store_reading(&mut self, reading: &SensorReading) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Drives one reading through the ordered failover chain.
pub struct PersistenceRouter {
    tiers: Vec<Box<dyn ReadingStore>>,
}

impl PersistenceRouter {
    /// Builds a router over injected tiers, tried in the given order.
    pub fn new(tiers: Vec<Box<dyn ReadingStore>>) -> Self {
        Self { tiers }
    }

    /// Persists one reading.
    ///
    /// Rejects with `ValidationError` — touching no tier — when a required
    /// field is missing. Stamps `reading_time` with the current time when
    /// absent, before the first attempt, so every tier sees the same
    /// timestamp. Otherwise walks the chain and stops at the first tier
    /// that accepts the reading.
    pub fn persist(
        &mut self,
        reading: &mut SensorReading,
    ) -> Result<PersistOutcome, ValidationError> {
        if let Some(missing) = reading.missing_required() {
            return Err(ValidationError { missing });
        }

        if reading.reading_time.is_none() {
            reading.reading_time = Some(Utc::now());
        }

        for store in &mut self.tiers {
            let tier = store.tier();
            match store.store_reading(reading) {
                Ok(()) => {
                    info!("reading stored in {}", tier);
                    return Ok(PersistOutcome::Stored(tier));
                }
                Err(e) => {
                    warn!("{} failed, falling through: {}", tier, e);
                }
            }
        }

        error!(
            "reading lost: every persistence tier failed (location {}, time {:?})",
            reading.location_id.unwrap_or(-1),
            reading.reading_time
        );
        Ok(PersistOutcome::Lost)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
