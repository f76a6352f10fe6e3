/// Danger threshold evaluation for persisted readings.
///
/// Three fixed rules, evaluated independently — one reading can trigger
/// zero, one, or several conditions in a single pass:
///
///   | condition   | trigger                | severity |
///   |-------------|------------------------|----------|
///   | High CO₂    | co2_ppm > 1000         | 8        |
///   | Low oxygen  | oxygen_percent < 19.5  | 9        |
///   | High H₂S    | h2s_ppm > 10           | 10       |
///
/// An absent channel takes a safe default (CO₂ 0, oxygen 21, H₂S 0):
/// a missing sensor must never raise an alarm by itself. Comparisons are
/// strict — a value exactly at the threshold does not trigger.

use crate::model::SensorReading;

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// CO₂ concentration above which a section is considered dangerous, ppm.
pub const CO2_PPM_MAX: f64 = 1000.0;

/// Oxygen fraction below which a section is considered dangerous, percent.
pub const OXYGEN_PERCENT_MIN: f64 = 19.5;

/// H₂S concentration above which a section is considered dangerous, ppm.
pub const H2S_PPM_MAX: f64 = 10.0;

/// Safe defaults substituted for absent channels during evaluation only.
const CO2_SAFE_DEFAULT: f64 = 0.0;
const OXYGEN_SAFE_DEFAULT: f64 = 21.0;
const H2S_SAFE_DEFAULT: f64 = 0.0;

// ---------------------------------------------------------------------------
// Detected conditions
// ---------------------------------------------------------------------------

/// One danger condition detected in one reading, carrying everything the
/// recorder needs to write the alert row.
#[derive(Debug, Clone, PartialEq)]
pub struct DangerCondition {
    pub type_id: i32,
    pub condition_id: i32,
    pub severity: i32,
    pub threshold: f64,
    pub measured: f64,
    pub description: &'static str,
    /// True when the triggering value was an estimate, not a measurement.
    pub from_estimate: bool,
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Evaluates every threshold rule against one reading. Pure; callers must
/// only invoke this after the reading is durably persisted.
pub fn evaluate(reading: &SensorReading) -> Vec<DangerCondition> {
    let mut conditions = Vec::new();

    let co2 = reading.co2_ppm.map(|m| m.value).unwrap_or(CO2_SAFE_DEFAULT);
    if co2 > CO2_PPM_MAX {
        conditions.push(DangerCondition {
            type_id: 1,
            condition_id: 1,
            severity: 8,
            threshold: CO2_PPM_MAX,
            measured: co2,
            description: "High CO2 levels",
            from_estimate: reading.co2_ppm.map(|m| m.is_estimated()).unwrap_or(false),
        });
    }

    let oxygen = reading
        .oxygen_percent
        .map(|m| m.value)
        .unwrap_or(OXYGEN_SAFE_DEFAULT);
    if oxygen < OXYGEN_PERCENT_MIN {
        conditions.push(DangerCondition {
            type_id: 2,
            condition_id: 2,
            severity: 9,
            threshold: OXYGEN_PERCENT_MIN,
            measured: oxygen,
            description: "Low oxygen levels",
            from_estimate: reading
                .oxygen_percent
                .map(|m| m.is_estimated())
                .unwrap_or(false),
        });
    }

    let h2s = reading.h2s_ppm.map(|m| m.value).unwrap_or(H2S_SAFE_DEFAULT);
    if h2s > H2S_PPM_MAX {
        conditions.push(DangerCondition {
            type_id: 3,
            condition_id: 3,
            severity: 10,
            threshold: H2S_PPM_MAX,
            measured: h2s,
            description: "High H2S levels",
            from_estimate: reading.h2s_ppm.map(|m| m.is_estimated()).unwrap_or(false),
        });
    }

    conditions
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
