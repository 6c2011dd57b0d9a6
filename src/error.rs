use thiserror::Error;

/// Convenience alias for results produced by this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported when building a trapezoidal map.
#[derive(Debug, Error)]
pub enum Error {
    /// The endpoints of a segment share their x-coordinate. A vertical
    /// segment has no slope and cannot split a trapezoid into an upper and
    /// a lower part, so it is rejected before it touches the map.
    #[error("segment `{name}` is vertical at x = {x}: endpoint x-coordinates must differ")]
    DegenerateSegment { name: String, x: f64 },
}
