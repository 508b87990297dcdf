pub mod connection;
pub mod operations;

pub use connection::InfluxSink;

use crate::error::SinkError;
use crate::models::TimeSeriesPoint;

/// Destination for a decoded point batch
#[allow(async_fn_in_trait)]
pub trait PointSink {
    /// Persist the batch, returning how many points were written
    async fn write_points(&self, points: &[TimeSeriesPoint]) -> Result<usize, SinkError>;
}
