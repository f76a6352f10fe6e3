/// Estimated-value fill-in for missing sensor channels.
///
/// Three channels — oxygen, methane, airflow — feed downstream consumers
/// that expect a complete record, but the corresponding sensors are absent
/// from some concentrator positions. When a frame arrives without them,
/// a plausible placeholder within a fixed realistic range is substituted.
///
/// These are placeholders, NOT measurements. Each fill-in is tagged
/// `Provenance::Estimated` so alerting and storage can tell them apart
/// from real sensor values. No other channel is ever touched.

use crate::model::{Measurement, SensorReading};
use rand::Rng;

/// Estimate ranges, matched to normal conditions in a ventilated section:
/// oxygen 20.5 ± 0.3 %, methane 0.1–0.8 %, airflow 0.3–0.8 m/s.
const OXYGEN_BASE: f64 = 20.5;
const OXYGEN_SPREAD: f64 = 0.3;
const METHANE_MIN: f64 = 0.1;
const METHANE_SPAN: f64 = 0.7;
const AIRFLOW_MIN: f64 = 0.3;
const AIRFLOW_SPAN: f64 = 0.5;

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Fills absent oxygen/methane/airflow channels with tagged estimates.
/// Channels that carry a measured value are never overwritten.
pub fn fill_estimates(reading: &mut SensorReading) {
    let mut rng = rand::thread_rng();

    if reading.oxygen_percent.is_none() {
        let value = OXYGEN_BASE + rng.gen_range(-OXYGEN_SPREAD..=OXYGEN_SPREAD);
        reading.oxygen_percent = Some(Measurement::estimated(round_to(value, 1)));
    }

    if reading.methane_percent.is_none() {
        let value = METHANE_MIN + METHANE_SPAN * rng.gen_range(0.0..1.0);
        reading.methane_percent = Some(Measurement::estimated(round_to(value, 2)));
    }

    if reading.airflow_ms.is_none() {
        let value = AIRFLOW_MIN + AIRFLOW_SPAN * rng.gen_range(0.0..1.0);
        reading.airflow_ms = Some(Measurement::estimated(round_to(value, 1)));
    }
}
