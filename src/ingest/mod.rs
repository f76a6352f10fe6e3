/// Serial frame ingestion: wire-format parsing for the sensor concentrator.
///
/// `frame` owns the `DB_INSERT|...` reading-frame format. Other frame types
/// the concentrator may emit are not parsed here; the daemon ignores them.

pub mod frame;

#[cfg(test)]
pub(crate) mod fixtures;
