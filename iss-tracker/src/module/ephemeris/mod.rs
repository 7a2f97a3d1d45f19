///! Values derived from the trajectory feed
///!
///! - `analysis`: nearest-to-now epoch, sums of squares, speed
///! - `geodetic`: ECI position to latitude / longitude / altitude
///! - `summary`: whole-feed report

pub mod analysis;
pub mod geodetic;
pub mod summary;

pub use analysis::{average_speed, nearest_epoch_index, nearest_index, speed, sum_squares};
pub use geodetic::{Geodetic, MEAN_EARTH_RADIUS_KM, state_vector_geodetic, to_geodetic};
pub use summary::FeedSummary;
