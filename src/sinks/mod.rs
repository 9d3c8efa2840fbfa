//! Downstream time-series stores receiving the fetched readings.

use anyhow::Result;

pub mod influx;
pub mod point;

use point::Point;

pub trait ReadingSink {
    /// Write one ordered batch. The batch is either accepted as a whole or
    /// the error is returned to the caller.
    fn write_points(&self, points: &[Point]) -> impl std::future::Future<Output = Result<()>> + Send;
}
