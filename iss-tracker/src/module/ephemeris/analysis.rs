///! Derivations over lists of state vectors: nearest epoch, sums of squares, speed.

use chrono::NaiveDateTime;

use crate::error::TrackerError;
use crate::module::oem::{Quantity, StateVector};

/// Index of the record whose timestamp is closest to `now`.
///
/// Ties resolve to the earliest record. Fails on an empty list or on the
/// first timestamp that does not parse.
pub fn nearest_index<T, F>(items: &[T], now: NaiveDateTime, timestamp: F) -> Result<usize, TrackerError>
where
    F: Fn(&T) -> Result<NaiveDateTime, TrackerError>,
{
    let mut best: Option<(usize, chrono::TimeDelta)> = None;

    for (index, item) in items.iter().enumerate() {
        let diff = (timestamp(item)? - now).abs();
        match best {
            Some((_, best_diff)) if diff >= best_diff => {}
            _ => best = Some((index, diff)),
        }
    }

    best.map(|(index, _)| index).ok_or(TrackerError::EmptyFeed)
}

/// Index of the state vector whose `EPOCH` is closest to `now`.
pub fn nearest_epoch_index(vectors: &[StateVector], now: NaiveDateTime) -> Result<usize, TrackerError> {
    nearest_index(vectors, now, StateVector::epoch_time)
}

/// Sum of the squares of one field across all records.
///
/// Non-numeric values are skipped with a warning. Empty input sums to 0.
pub fn sum_squares<T, F>(items: &[T], field: F) -> f64
where
    F: Fn(&T) -> &Quantity,
{
    items
        .iter()
        .map(&field)
        .filter_map(|quantity| match quantity.value() {
            Ok(v) => Some(v * v),
            Err(_) => {
                tracing::warn!("encountered non-float value {:?} in sum_squares", quantity.text);
                None
            }
        })
        .sum()
}

/// Euclidean norm of a 3-vector.
pub fn magnitude(v: [f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

/// Instantaneous speed (km/s) of one state vector.
pub fn speed(vector: &StateVector) -> Result<f64, TrackerError> {
    Ok(magnitude(vector.velocity()?))
}

/// Root-mean-square speed (km/s) over the whole list.
pub fn average_speed(vectors: &[StateVector]) -> Result<f64, TrackerError> {
    if vectors.is_empty() {
        return Err(TrackerError::EmptyFeed);
    }

    let total = sum_squares(vectors, |v| &v.x_dot)
        + sum_squares(vectors, |v| &v.y_dot)
        + sum_squares(vectors, |v| &v.z_dot);

    Ok((total / vectors.len() as f64).sqrt())
}
