//! Translation of request parameters into store filters.
//!
//! Nothing here validates input. Zip codes are matched verbatim and
//! coordinates that fail numeric coercion travel to the store as `NaN`.

use mongodb::bson::{doc, Document};

/// Maximum number of records returned by a proximity lookup.
pub const PROXIMITY_LIMIT: i64 = 25;

/// Equality filter on the `zip` field.
pub fn zip_filter(zip: &str) -> Document {
    doc! { "zip": zip }
}

/// Nearest-records request around a coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub limit: i64,
}

impl ProximityQuery {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            limit: PROXIMITY_LIMIT,
        }
    }

    /// Build from raw path segments using loose numeric coercion.
    pub fn from_path(lat: &str, lon: &str) -> Self {
        Self::new(coerce_number(lat), coerce_number(lon))
    }

    /// `{loc: {$near: [lat, lon]}}`. The `zips` points are stored `{y, x}`,
    /// so latitude comes first.
    pub fn filter(&self) -> Document {
        doc! { "loc": { "$near": [self.latitude, self.longitude] } }
    }
}

/// Loose string-to-number coercion. Whitespace is trimmed and an empty
/// string is zero; `Infinity` and `0x`/`0o`/`0b` integers are recognised.
/// Anything else that is not a decimal literal yields `NaN`.
pub fn coerce_number(raw: &str) -> f64 {
    let s = raw.trim();
    if s.is_empty() {
        return 0.0;
    }

    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    let radix = match s.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &s[2..];
        if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
            return f64::NAN;
        }
        return digits
            .chars()
            .filter_map(|c| c.to_digit(radix))
            .fold(0.0, |acc, d| acc * f64::from(radix) + f64::from(d));
    }

    // Rust's float parser also accepts "inf" and "nan"; restrict the alphabet
    // to decimal literals first.
    let is_decimal = s
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    if !is_decimal {
        return f64::NAN;
    }

    s.parse::<f64>().unwrap_or(f64::NAN)
}
