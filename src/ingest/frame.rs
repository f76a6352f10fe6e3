/// Reading-frame parser for the sensor concentrator wire format.
///
/// A reading frame looks like:
///
///   DB_INSERT|<section_name>|<temp>|<humidity>|<co2>|<pm1>|<pm2.5>|<pm10>|<no2>|<nh3>|<co>|[<ch4>]|[<o2>]|[<h2s>]|[<airflow>]
///
/// Values are strictly positional. The concentrator appends checksum-like
/// junk tokens on some firmware revisions; trailing non-numeric tokens are
/// therefore stripped before positional mapping, not validated. The first
/// nine values are required; the last four channels are optional and absent
/// positions stay unset.

// ---------------------------------------------------------------------------
// Frame format
// ---------------------------------------------------------------------------

/// Prefix identifying a reading frame. Anything else on the line is some
/// other concentrator chatter and is ignored by the caller.
pub const FRAME_PREFIX: &str = "DB_INSERT|";

/// Positional field names, in wire order after the section name.
const FIELD_NAMES: [&str; 13] = [
    "temperature",
    "humidity",
    "co2_ppm",
    "pm1_ugm3",
    "pm25_ugm3",
    "pm10_ugm3",
    "no2_ppm",
    "nh3_ppm",
    "co_ppm",
    "methane_percent",
    "oxygen_percent",
    "h2s_ppm",
    "airflow_ms",
];

/// Number of leading values that must be present for a frame to be usable.
const REQUIRED_VALUES: usize = 9;

// ---------------------------------------------------------------------------
// Parsed frame
// ---------------------------------------------------------------------------

/// One successfully parsed reading frame. Values are exactly as they came
/// off the wire; no estimation or defaulting happens here.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFrame {
    pub location_name: String,
    pub temperature: f64,
    pub humidity: f64,
    pub co2_ppm: f64,
    pub pm1_ugm3: f64,
    pub pm25_ugm3: f64,
    pub pm10_ugm3: f64,
    pub no2_ppm: f64,
    pub nh3_ppm: f64,
    pub co_ppm: f64,
    pub methane_percent: Option<f64>,
    pub oxygen_percent: Option<f64>,
    pub h2s_ppm: Option<f64>,
    pub airflow_ms: Option<f64>,
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Why a line could not be parsed as a reading frame.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameError {
    /// The line does not carry the reading-frame prefix. Not malformed —
    /// just not ours.
    NotAReading,
    /// The section name field is empty.
    MissingLocation,
    /// Fewer numeric values than the nine required channels.
    TooFewValues { found: usize },
    /// A non-numeric token in a required or optional value position.
    InvalidNumber { field: &'static str, token: String },
}

impl std::fmt::Display for FrameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameError::NotAReading => write!(f, "not a reading frame"),
            FrameError::MissingLocation => write!(f, "reading frame has no section name"),
            FrameError::TooFewValues { found } => {
                write!(f, "reading frame has {} values, {} required", found, REQUIRED_VALUES)
            }
            FrameError::InvalidNumber { field, token } => {
                write!(f, "invalid numeric value for {}: '{}'", field, token)
            }
        }
    }
}

impl std::error::Error for FrameError {}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

fn is_number(token: &str) -> bool {
    token.trim().parse::<f64>().is_ok()
}

/// Parses one line into a reading frame.
///
/// Trailing non-numeric tokens are discarded before positional mapping.
/// Numeric tokens past the airflow position are ignored; the concentrator
/// has never emitted them with meaning.
pub fn parse_frame(line: &str) -> Result<ParsedFrame, FrameError> {
    if !line.starts_with(FRAME_PREFIX) {
        return Err(FrameError::NotAReading);
    }

    let mut parts = line.split('|');
    parts.next(); // the DB_INSERT tag

    let location_name = parts.next().unwrap_or("").trim().to_string();
    if location_name.is_empty() {
        return Err(FrameError::MissingLocation);
    }

    let mut tokens: Vec<&str> = parts.collect();
    while tokens.last().map(|t| !is_number(t)).unwrap_or(false) {
        tokens.pop();
    }

    if tokens.len() < REQUIRED_VALUES {
        return Err(FrameError::TooFewValues { found: tokens.len() });
    }

    let mut values: Vec<f64> = Vec::with_capacity(FIELD_NAMES.len());
    for (i, token) in tokens.iter().take(FIELD_NAMES.len()).enumerate() {
        let value = token.trim().parse::<f64>().map_err(|_| FrameError::InvalidNumber {
            field: FIELD_NAMES[i],
            token: token.trim().to_string(),
        })?;
        values.push(value);
    }

    let optional = |i: usize| values.get(i).copied();

    Ok(ParsedFrame {
        location_name,
        temperature: values[0],
        humidity: values[1],
        co2_ppm: values[2],
        pm1_ugm3: values[3],
        pm25_ugm3: values[4],
        pm10_ugm3: values[5],
        no2_ppm: values[6],
        nh3_ppm: values[7],
        co_ppm: values[8],
        methane_percent: optional(9),
        oxygen_percent: optional(10),
        h2s_ppm: optional(11),
        airflow_ms: optional(12),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
