/// Section-name → location-id resolution against the primary store.
///
/// Frames carry human-readable section names ("North-Adit"); stores want
/// stable numeric ids. Lookups are idempotent: the same name always
/// resolves to the same id, and an unknown name causes exactly one
/// `mine_locations` insert with the configured site defaults.
///
/// Resolution never blocks ingestion: on any lookup/insert failure — the
/// primary store being down included — the configured fallback id is
/// substituted and the error logged. That degrades safety traceability in
/// exchange for availability; the trade-off is deliberate and documented,
/// not silently "correct".

use crate::config::LocationDefaults;
use chrono::Utc;
use postgres::Client;
use std::cell::RefCell;
use std::error::Error;
use std::rc::Rc;
use tracing::error;

// ---------------------------------------------------------------------------
// Directory seam
// ---------------------------------------------------------------------------

/// Resolves section names to location ids. Infallible by policy.
pub trait LocationDirectory {
    fn resolve(&mut self, section_name: &str) -> i64;
}

// ---------------------------------------------------------------------------
// Primary-store resolver
// ---------------------------------------------------------------------------

pub struct LocationResolver {
    client: Option<Rc<RefCell<Client>>>,
    defaults: LocationDefaults,
}

impl LocationResolver {
    pub fn new(client: Option<Rc<RefCell<Client>>>, defaults: LocationDefaults) -> Self {
        Self { client, defaults }
    }

    fn try_resolve(&self, section_name: &str) -> Result<i64, Box<dyn Error>> {
        let client = self
            .client
            .as_ref()
            .ok_or("primary store not connected")?;
        let mut client = client.borrow_mut();

        let rows = client.query(
            "SELECT location_id FROM mine_locations WHERE section_name = $1",
            &[&section_name],
        )?;
        if let Some(row) = rows.first() {
            return Ok(row.get(0));
        }

        // First reference to this section: create it with the site defaults.
        let now = Utc::now();
        let row = client.query_one(
            "INSERT INTO mine_locations (
                 mine_name, level_number, section_name, coordinates, depth,
                 ventilation_zone, is_active, created_at, updated_at
             ) VALUES ($1, $2, $3, NULL, $4, $5, TRUE, $6, $6)
             RETURNING location_id",
            &[
                &self.defaults.mine_name,
                &self.defaults.level_number,
                &section_name,
                &self.defaults.depth_m,
                &self.defaults.ventilation_zone,
                &now,
            ],
        )?;

        Ok(row.get(0))
    }
}

impl LocationDirectory for LocationResolver {
    fn resolve(&mut self, section_name: &str) -> i64 {
        match self.try_resolve(section_name) {
            Ok(id) => id,
            Err(e) => {
                error!(
                    "location lookup/insert failed for '{}': {}; substituting default id {}",
                    section_name, e, self.defaults.fallback_location_id
                );
                self.defaults.fallback_location_id
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
