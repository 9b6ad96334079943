//! Feature encoding for the delay model.
//!
//! Form fields are mapped through fixed code tables into the numeric
//! feature vector the model was trained on.

use serde::{Deserialize, Serialize};

/// Number of features the delay model expects.
pub const FEATURE_COUNT: usize = 5;

/// Airport codes known to the model. Unknown codes encode to 0.
pub const AIRPORTS: &[(&str, u8)] = &[
    ("DEL", 1),
    ("BOM", 2),
    ("BLR", 3),
    ("MAA", 4),
    ("HYD", 5),
    ("CCU", 6),
    ("JFK", 7),
    ("LAX", 8),
    ("ORD", 9),
    ("LHR", 10),
    ("DXB", 11),
    ("SIN", 12),
];

/// Carrier codes known to the model. Unknown codes encode to 0.
pub const CARRIERS: &[(&str, u8)] = &[
    ("AI", 1),
    ("6E", 2),
    ("UK", 3),
    ("UA", 4),
    ("AA", 5),
    ("DL", 6),
];

fn lookup(table: &[(&str, u8)], code: &str) -> u8 {
    table
        .iter()
        .find(|(known, _)| *known == code)
        .map_or(0, |(_, value)| *value)
}

/// Encode an airport code. Matching is exact; unknown codes encode to 0.
#[must_use]
pub fn encode_airport(code: &str) -> u8 {
    lookup(AIRPORTS, code)
}

/// Encode a carrier code. Matching is exact; unknown codes encode to 0.
#[must_use]
pub fn encode_carrier(code: &str) -> u8 {
    lookup(CARRIERS, code)
}

/// Model input for a single flight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Encoded origin airport.
    pub origin: u8,
    /// Encoded destination airport.
    pub dest: u8,
    /// Encoded carrier.
    pub carrier: u8,
    /// Temperature at departure.
    pub temperature: f64,
    /// Wind speed at departure.
    pub wind_speed: f64,
}

impl FeatureVector {
    /// Build a feature vector from raw codes and weather readings.
    #[must_use]
    pub fn encode(
        origin: &str,
        dest: &str,
        carrier: &str,
        temperature: f64,
        wind_speed: f64,
    ) -> Self {
        Self {
            origin: encode_airport(origin),
            dest: encode_airport(dest),
            carrier: encode_carrier(carrier),
            temperature,
            wind_speed,
        }
    }

    /// Convert to the ordered array passed to the model.
    #[must_use]
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            f64::from(self.origin),
            f64::from(self.dest),
            f64::from(self.carrier),
            self.temperature,
            self.wind_speed,
        ]
    }
}
