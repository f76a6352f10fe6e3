/// minemon_service: underground mine environmental monitoring ingest service.
///
/// # Module structure
///
/// ```text
/// minemon_service
/// ├── model      — shared data types (SensorReading, Measurement, Tier, …)
/// ├── config     — runtime configuration loader (minemon.toml)
/// ├── db         — primary PostgreSQL store: validation + tier implementation
/// ├── fallback   — embedded SQLite last-resort store (reconciler bookkeeping)
/// ├── api        — monitoring API relay tier (JSON over HTTP, retried)
/// ├── store      — failover core: ReadingStore trait + PersistenceRouter
/// ├── locations  — section-name → location id resolver (lazy creation)
/// ├── normalize  — estimated-value fill-in for missing sensor channels
/// ├── alert
/// │   ├── thresholds — danger threshold rules and evaluation
/// │   └── (mod)      — AlertRecorder over ordered AlertSinks
/// ├── ingest
/// │   ├── frame   — DB_INSERT|… wire-frame parsing
/// │   └── fixtures (test only) — representative concentrator frames
/// ├── transport  — line-oriented serial transport (LineTransport seam)
/// └── daemon     — startup wiring + the sequential per-frame ingest loop
/// ```

/// Public modules
pub mod alert;
pub mod api;
pub mod config;
pub mod daemon;
pub mod db;
pub mod fallback;
pub mod ingest;
pub mod locations;
pub mod model;
pub mod normalize;
pub mod store;
pub mod transport;
