//! Planar point location with an incrementally built trapezoidal map.
//!
//! A [`TrapMap`] starts out as a single bounding-box region and is refined
//! by inserting named, non-crossing segments one at a time. Each insertion
//! splits the regions the segment crosses and grows a search DAG of point
//! and segment decisions, so that locating a query point takes one walk
//! from the root to a leaf. Insertions are processed in the exact order
//! given, which makes the resulting structure fully deterministic.
//!
//! Points are registered up front and interned by coordinates, so segments
//! sharing an endpoint (polyline chains) reuse the same point identity.
//! After the last insertion, [`TrapMap::assign_names`] hands out the `T1`,
//! `T2`, ... identifiers used in reports and traversal-path displays.
//!
//! # Example
//!
//! ```
//! use tzmap::{PointLocator, TrapMap};
//!
//! # fn main() -> tzmap::Result<()> {
//! let mut map = TrapMap::new([0., 0.], [10., 10.])?;
//! let p = map.add_point("P1", [2., 2.]);
//! let q = map.add_point("Q1", [8., 8.]);
//! map.add_segment("S1", p, q)?;
//! map.assign_names();
//!
//! // The query point is above the segment.
//! let above = map.locate(&[5., 7.]);
//! assert_eq!(map.node_label(above), "T2");
//!
//! // Containment separates hits from misses.
//! assert!(map.locate_one(&[5., 7.]).is_some());
//! assert!(map.locate_one(&[42., 7.]).is_none());
//! # Ok(())
//! # }
//! ```

mod error;
mod geometry;
mod point_locator;
mod trapezoidal_map;

pub use crate::error::{Error, Result};
pub use crate::geometry::{Point, PointId, Segment, SegmentId};
pub use crate::point_locator::PointLocator;
pub use crate::trapezoidal_map::{TrapMap, Trapezoid};
