//! Spatial math for separation checks.

use crate::models::Snapshot;
use crate::rules::{HORIZONTAL_SEPARATION_NM, VERTICAL_SEPARATION};

/// Mean Earth radius in nautical miles.
pub const EARTH_RADIUS_NM: f64 = 3443.8;

/// Great-circle distance in nautical miles between two lat/lon points (degrees).
pub fn haversine_distance_nm(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    // Rounding can push `a` a hair past 1 for antipodal points.
    let c = 2.0 * a.clamp(0.0, 1.0).sqrt().asin();
    EARTH_RADIUS_NM * c
}

/// A point in the airspace: lat/lon in degrees plus altitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
    pub altitude: f64,
}

impl Position {
    pub fn new(lat: f64, lon: f64, altitude: f64) -> Self {
        Self { lat, lon, altitude }
    }
}

impl<T> From<&Snapshot<T>> for Position {
    fn from(snapshot: &Snapshot<T>) -> Self {
        Self::new(snapshot.lat, snapshot.lon, snapshot.baro_altitude)
    }
}

/// Horizontal and vertical separation between two positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Separation {
    pub horizontal_nm: f64,
    pub vertical: f64,
}

impl Separation {
    /// Horizontal separation is below the minimum.
    ///
    /// NaN never compares below the threshold, so invalid geometry reads as separated.
    pub fn horizontal_loss(&self) -> bool {
        self.horizontal_nm < HORIZONTAL_SEPARATION_NM
    }

    /// Vertical separation is below the minimum.
    pub fn vertical_loss(&self) -> bool {
        self.vertical < VERTICAL_SEPARATION
    }
}

/// Measure the separation between two positions.
pub fn evaluate(a: Position, b: Position) -> Separation {
    Separation {
        horizontal_nm: haversine_distance_nm(a.lat, a.lon, b.lat, b.lon),
        vertical: (a.altitude - b.altitude).abs(),
    }
}
