//! Points and segments making up the input of a trapezoidal map.

use std::fmt;

use crate::error::{Error, Result};

/// Identifier of a point registered in a [`TrapMap`](crate::TrapMap).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PointId(pub(crate) usize);

/// Identifier of a segment registered in a [`TrapMap`](crate::TrapMap).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SegmentId(pub(crate) usize);

/// A named 2D point.
///
/// Points carry identity, not just coordinates: registering the same
/// coordinates twice yields the same point, and the point remembers whether
/// the search structure already branches on it (see
/// [`TrapMap::add_point`](crate::TrapMap::add_point)).
#[derive(Clone, Debug)]
pub struct Point {
    name: String,
    pub x: f64,
    pub y: f64,
    /// Set once an x-node deciding on this point exists.
    pub(crate) introduced: bool,
}

impl Point {
    pub(crate) fn new(name: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            introduced: false,
        }
    }

    /// The name given when the point was first registered.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn coords(&self) -> [f64; 2] {
        [self.x, self.y]
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.name, self.x, self.y)
    }
}

/// A non-vertical segment with its endpoints ordered by increasing
/// x-coordinate.
///
/// The slope and intercept of the supporting line are computed once at
/// construction and reused by every query afterwards.
#[derive(Clone, Debug)]
pub struct Segment {
    name: String,
    left: PointId,
    right: PointId,
    slope: f64,
    intercept: f64,
    x_left: f64,
    x_right: f64,
}

impl Segment {
    /// Builds a segment between two registered points, swapping them if
    /// needed so that the left endpoint has the smaller x-coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DegenerateSegment`] when the endpoints share their
    /// x-coordinate.
    pub(crate) fn new(
        name: impl Into<String>,
        p: (PointId, [f64; 2]),
        q: (PointId, [f64; 2]),
    ) -> Result<Self> {
        let name = name.into();
        if p.1[0] == q.1[0] {
            return Err(Error::DegenerateSegment { name, x: p.1[0] });
        }
        let ((left, [xl, yl]), (right, [xr, yr])) = if q.1[0] < p.1[0] { (q, p) } else { (p, q) };
        let slope = (yr - yl) / (xr - xl);
        let intercept = yl - slope * xl;
        Ok(Self {
            name,
            left,
            right,
            slope,
            intercept,
            x_left: xl,
            x_right: xr,
        })
    }

    /// The name given when the segment was registered.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The endpoint with the smaller x-coordinate.
    pub fn left(&self) -> PointId {
        self.left
    }

    /// The endpoint with the larger x-coordinate.
    pub fn right(&self) -> PointId {
        self.right
    }

    /// Whether `point` lies strictly above the segment's supporting line.
    ///
    /// The test is against the infinite line, not the segment itself, and a
    /// point exactly on the line is not above it.
    pub fn is_point_above(&self, point: &[f64; 2]) -> bool {
        let &[x, y] = point;
        y > self.slope * x + self.intercept
    }

    /// The y-coordinate of the segment at `x`, or `None` when `x` falls
    /// outside the segment's horizontal extent.
    pub fn line_value_at(&self, x: f64) -> Option<f64> {
        (self.x_left..=self.x_right)
            .contains(&x)
            .then(|| self.slope * x + self.intercept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use anyhow::Result;
    use rstest::rstest;

    fn segment(p: [f64; 2], q: [f64; 2]) -> Result<Segment> {
        Ok(Segment::new("S", (PointId(0), p), (PointId(1), q))?)
    }

    #[test]
    fn endpoints_are_ordered_by_x() -> Result<()> {
        let segment = segment([8., 4.], [2., 1.])?;

        assert_eq!(segment.left(), PointId(1));
        assert_eq!(segment.right(), PointId(0));

        Ok(())
    }

    #[test]
    fn vertical_segments_are_rejected() {
        let res = Segment::new("S", (PointId(0), [3., 0.]), (PointId(1), [3., 10.]));

        assert!(matches!(
            res,
            Err(Error::DegenerateSegment { ref name, x }) if name == "S" && x == 3.
        ));
    }

    #[rstest]
    #[case([5., 7.], true)]
    #[case([5., 5.], false)] // exactly on the line
    #[case([5., 2.], false)]
    #[case([42., 43.], true)] // beyond the right endpoint, but above the line
    fn points_above_the_line_are_detected(
        #[case] point: [f64; 2],
        #[case] expected: bool,
    ) -> Result<()> {
        // Supporting line y = x.
        let segment = segment([2., 2.], [8., 8.])?;

        assert_eq!(segment.is_point_above(&point), expected);

        Ok(())
    }

    #[test]
    fn horizontal_segments_have_a_flat_line() -> Result<()> {
        let segment = segment([2., 5.], [8., 5.])?;

        assert!(segment.is_point_above(&[4., 5.1]));
        assert!(!segment.is_point_above(&[4., 5.]));
        assert_eq!(segment.line_value_at(3.), Some(5.));

        Ok(())
    }

    #[test]
    fn line_values_are_clamped_to_the_segment_extent() -> Result<()> {
        // Slope 0.5, intercept 0.
        let segment = segment([2., 1.], [8., 4.])?;

        assert_eq!(segment.line_value_at(5.), Some(2.5));
        assert_eq!(segment.line_value_at(2.), Some(1.));
        assert_eq!(segment.line_value_at(8.), Some(4.));
        assert_eq!(segment.line_value_at(1.9), None);
        assert_eq!(segment.line_value_at(8.1), None);

        Ok(())
    }
}
