///! ECI position to latitude / longitude / altitude.
///!
///! Spherical-Earth approximation: no ellipsoid, no precession or nutation.
///! Longitude is corrected for Earth rotation using only the epoch's hour and
///! minute relative to 12:00 UTC, plus a fixed offset.

use chrono::Timelike;
use serde::Serialize;

use crate::error::TrackerError;
use crate::module::oem::StateVector;

/// Earth mean radius (IUGG), km.
pub const MEAN_EARTH_RADIUS_KM: f64 = 6371.0088;

/// Degrees added to the rotation-corrected longitude.
pub const LONGITUDE_OFFSET_DEG: f64 = 19.0;

const REFERENCE_HOUR: f64 = 12.0;
const EARTH_ROTATION_DEG_PER_HOUR: f64 = 360.0 / 24.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Geodetic {
    pub latitude: f64,
    pub longitude: f64,
    /// Height above the mean-radius sphere, km
    pub altitude: f64,
}

pub fn latitude_deg(x: f64, y: f64, z: f64) -> f64 {
    z.atan2((x * x + y * y).sqrt()).to_degrees()
}

pub fn altitude_km(x: f64, y: f64, z: f64) -> f64 {
    (x * x + y * y + z * z).sqrt() - MEAN_EARTH_RADIUS_KM
}

/// Longitude at `hour:minute` UTC, wrapped into [-180, 180].
pub fn longitude_deg(x: f64, y: f64, hour: u32, minute: u32) -> f64 {
    let elapsed_hours = (hour as f64 - REFERENCE_HOUR) + minute as f64 / 60.0;
    let lon = y.atan2(x).to_degrees() - elapsed_hours * EARTH_ROTATION_DEG_PER_HOUR + LONGITUDE_OFFSET_DEG;
    wrap_longitude(lon)
}

fn wrap_longitude(lon: f64) -> f64 {
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    // Keep +180 as +180 rather than folding it to -180
    if wrapped == -180.0 && lon > 0.0 { 180.0 } else { wrapped }
}

pub fn to_geodetic(position: [f64; 3], hour: u32, minute: u32) -> Geodetic {
    let [x, y, z] = position;
    Geodetic {
        latitude: latitude_deg(x, y, z),
        longitude: longitude_deg(x, y, hour, minute),
        altitude: altitude_km(x, y, z),
    }
}

/// Geodetic position of a state vector at its own epoch.
pub fn state_vector_geodetic(vector: &StateVector) -> Result<Geodetic, TrackerError> {
    let epoch = vector.epoch_time()?;
    Ok(to_geodetic(vector.position()?, epoch.hour(), epoch.minute()))
}
