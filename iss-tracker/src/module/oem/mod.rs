///! ISS trajectory feed (CCSDS OEM) module
///!
///! Downloads the NASA ISS ephemeris XML and decodes it into typed records.

pub mod types;
pub mod parser;
pub mod fetcher;

pub use fetcher::{FeedSource, HttpFeedSource};
pub use parser::parse_oem_xml;
pub use types::{Header, Metadata, OemDocument, Quantity, StateVector, parse_epoch};
