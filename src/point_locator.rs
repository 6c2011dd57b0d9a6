use rayon::prelude::*;

/// A trait to locate one or several query points within a planar
/// subdivision.
pub trait PointLocator {
    /// Locates one query point.
    ///
    /// Returns the index of the region containing the point, or [`None`]
    /// if the point does not lie in any region of the subdivision.
    fn locate_one(&self, point: &[f64; 2]) -> Option<usize>;

    /// Locates several query points.
    fn locate_many(&self, points: &[[f64; 2]]) -> Vec<Option<usize>> {
        points.iter().map(|point| self.locate_one(point)).collect()
    }

    /// Locates several query points in parallel.
    ///
    /// The map is read-only once built, so queries can fan out freely.
    fn par_locate_many(&self, points: &[[f64; 2]]) -> Vec<Option<usize>>
    where
        Self: std::marker::Sync,
    {
        points
            .par_iter()
            .map(|point| self.locate_one(point))
            .collect()
    }
}
