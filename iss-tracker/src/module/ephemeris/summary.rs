///! Whole-feed summary: covered time span, nearest epoch, average speed.

use std::fmt;

use chrono::{NaiveDateTime, TimeDelta};

use super::analysis::{average_speed, nearest_epoch_index};
use crate::error::TrackerError;
use crate::module::oem::{OemDocument, StateVector};

#[derive(Debug, Clone)]
pub struct FeedSummary {
    pub span: TimeDelta,
    pub nearest: StateVector,
    /// km/s
    pub average_speed: f64,
}

impl FeedSummary {
    pub fn from_document(doc: &OemDocument, now: NaiveDateTime) -> Result<Self, TrackerError> {
        let vectors = doc.state_vectors();
        let (first, last) = match (vectors.first(), vectors.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(TrackerError::EmptyFeed),
        };

        let span = (last.epoch_time()? - first.epoch_time()?).abs();
        let nearest = vectors[nearest_epoch_index(vectors, now)?].clone();

        Ok(Self {
            span,
            nearest,
            average_speed: average_speed(vectors)?,
        })
    }
}

fn format_span(span: TimeDelta) -> String {
    let secs = span.num_seconds();
    let (days, rem) = (secs / 86_400, secs % 86_400);
    format!("{} days, {:02}:{:02}:{:02}", days, rem / 3600, (rem % 3600) / 60, rem % 60)
}

impl fmt::Display for FeedSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = &self.nearest;
        writeln!(f, "This data covers a span of {}", format_span(self.span))?;
        writeln!(f)?;
        writeln!(f, "Most current data:")?;
        writeln!(f, "\tTime: {}", n.epoch)?;
        writeln!(f, "\tX-Coordinate (km): {}", n.x.text)?;
        writeln!(f, "\tY-Coordinate (km): {}", n.y.text)?;
        writeln!(f, "\tZ-Coordinate (km): {}", n.z.text)?;
        writeln!(f, "\tX-Velocity (km/s): {}", n.x_dot.text)?;
        writeln!(f, "\tY-Velocity (km/s): {}", n.y_dot.text)?;
        writeln!(f, "\tZ-Velocity (km/s): {}", n.z_dot.text)?;
        writeln!(f)?;
        write!(f, "Average Speed (km/s): {}", self.average_speed)
    }
}
