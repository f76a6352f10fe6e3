/// Test fixtures: representative frames from the sensor concentrator.
///
/// These are real frame shapes observed on the serial line, trimmed to the
/// minimum needed to exercise the parser and the pipeline.
///
/// Reading frame wire order after the section name:
///   temperature | humidity | co2 | pm1 | pm2.5 | pm10 | no2 | nh3 | co
///   | [methane] | [oxygen] | [h2s] | [airflow]
///
/// The last four channels are optional; some concentrator firmware appends
/// checksum-like junk tokens that parsers must strip.

/// Complete frame with all thirteen values. The CO₂ value of 1200 ppm is
/// above the 1000 ppm danger threshold; oxygen (20.6%) and H₂S (1.0 ppm)
/// are safe.
#[cfg(test)]
pub(crate) fn fixture_full_frame() -> &'static str {
    "DB_INSERT|North-Adit|22.5|45.0|1200|5|8|12|0.2|1.0|3|0.5|20.6|1.0|0.4"
}

/// Nine required values only — the optional methane/oxygen/h2s/airflow
/// tail is entirely absent. Exercises the normalizer's estimate fill-in.
#[cfg(test)]
pub(crate) fn fixture_minimal_frame() -> &'static str {
    "DB_INSERT|Decline-1|24.0|52.0|450|3|6|9|0.1|0.4|2"
}

/// Nine values followed by a non-numeric trailing token, as emitted by
/// firmware that appends a checksum. The token must be discarded.
#[cfg(test)]
pub(crate) fn fixture_trailing_checksum_frame() -> &'static str {
    "DB_INSERT|Shaft-2|21.0|40.0|300|1|2|3|0.1|0.2|0.5|abc"
}

/// Oxygen at 18.9% — below the 19.5% danger threshold.
#[cfg(test)]
pub(crate) fn fixture_low_oxygen_frame() -> &'static str {
    "DB_INSERT|Stope-7|23.0|48.0|600|4|7|11|0.2|0.8|2|0.4|18.9|0.5|0.6"
}

/// A non-reading frame the concentrator emits between readings.
#[cfg(test)]
pub(crate) fn fixture_status_frame() -> &'static str {
    "STATUS|heartbeat|uptime=86400"
}

/// A reading frame with a non-numeric token in a required position.
#[cfg(test)]
pub(crate) fn fixture_malformed_frame() -> &'static str {
    "DB_INSERT|Adit-3|warm|45.0|300|1|2|3|0.1|0.2|0.5"
}
