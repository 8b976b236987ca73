use serde::{Deserialize, Serialize};

/// Legacy coordinate pair as stored in the `zips` collection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Point {
    /// Longitude.
    pub x: f64,
    /// Latitude.
    pub y: f64,
}

/// One postal-code location. Read-only; documents are owned by the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocationRecord {
    pub zip: String,
    pub city: String,
    pub state: String,
    pub loc: Point,
}

impl LocationRecord {
    pub fn new(zip: &str, city: &str, state: &str, y: f64, x: f64) -> Self {
        Self {
            zip: zip.to_string(),
            city: city.to_string(),
            state: state.to_string(),
            loc: Point { x, y },
        }
    }

    pub fn latitude(&self) -> f64 {
        self.loc.y
    }

    pub fn longitude(&self) -> f64 {
        self.loc.x
    }
}
