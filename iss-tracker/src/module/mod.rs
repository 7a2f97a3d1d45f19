pub mod oem;
pub mod ephemeris;
pub mod geocode;
