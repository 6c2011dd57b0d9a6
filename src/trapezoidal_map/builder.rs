//! Incremental insertion of segments into a [`TrapMap`].

use crate::error::Result;
use crate::geometry::{PointId, SegmentId};
use crate::trapezoidal_map::dag::{Node, Trapezoid};
use crate::trapezoidal_map::trap_map::TrapMap;

impl TrapMap {
    /// Inserts a named segment between two registered points.
    ///
    /// The endpoints may be given in either order; they are normalized so
    /// the left one has the smaller x-coordinate. The segment must not
    /// cross any segment already in the map and must fit inside the
    /// bounding box, but sharing endpoints with earlier segments is fine.
    /// Every region the segment passes through is replaced by a small
    /// decision subtree; the rest of the map is left alone.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DegenerateSegment`](crate::Error::DegenerateSegment)
    /// for a vertical segment, leaving the map unchanged.
    pub fn add_segment(
        &mut self,
        name: impl Into<String>,
        p: PointId,
        q: PointId,
    ) -> Result<SegmentId> {
        let sid = self.new_segment(name, p, q)?;

        let trap_ids = self.intersected_trapezoids(sid);
        assert!(
            !trap_ids.is_empty(),
            "Segments should always intersect at least one trapezoid."
        );

        if trap_ids.len() == 1 {
            self.add_segment_crossing_one_trapezoid(sid, trap_ids[0]);
        } else {
            self.add_segment_crossing_multiple_trapezoids(sid, trap_ids);
        }

        Ok(sid)
    }

    /// Collects the distinct regions crossed by the segment, in
    /// left-to-right discovery order.
    ///
    /// The search branches like a point query for the segment's left
    /// endpoint, except that an x-node whose point falls strictly inside
    /// the segment's x-range sends the search down both sides.
    fn intersected_trapezoids(&self, sid: SegmentId) -> Vec<usize> {
        let mut found = Vec::new();
        self.descend(self.root, sid, &mut found);
        found
    }

    fn descend(&self, idx: usize, sid: SegmentId, found: &mut Vec<usize>) {
        match self.dag.node(idx) {
            Node::Trap(..) => {
                if !found.contains(&idx) && self.region_contains_segment(idx, sid) {
                    found.push(idx);
                }
            }
            Node::X { point, left, right } => {
                let x = self.points[point.0].x;
                let segment = &self.segments[sid.0];
                if self.points[segment.left().0].x >= x {
                    self.descend(*right, sid, found);
                } else {
                    self.descend(*left, sid, found);
                    if self.points[segment.right().0].x >= x {
                        self.descend(*right, sid, found);
                    }
                }
            }
            Node::Y {
                segment: si,
                above,
                below,
            } => {
                let left = self.segments[sid.0].left();
                if self.point_above(*si, left) {
                    self.descend(*above, sid, found);
                } else {
                    self.descend(*below, sid, found);
                }
            }
        }
    }

    /// The segment fits entirely inside one region.
    ///
    /// The region is cut into four: a margin on each side of the segment's
    /// endpoints plus one part above and one below.
    ///
    /// ```text
    ///        +-----------------+          +----+----------+----+
    ///        |                 |          |    |  above   |    |
    ///        |      old        |   =>     |left|p--------q|rght|
    ///        |                 |          |    |  below   |    |
    ///        +-----------------+          +----+----------+----+
    /// ```
    fn add_segment_crossing_one_trapezoid(&mut self, sid: SegmentId, old: usize) {
        let (p, q) = {
            let segment = &self.segments[sid.0];
            (segment.left(), segment.right())
        };
        let old_trap = self.dag.trap(old);
        let (top, bottom, leftp, rightp) = (
            old_trap.top,
            old_trap.bottom,
            old_trap.leftp,
            old_trap.rightp,
        );

        let left = self.dag.add_trap(Trapezoid::new(top, bottom, leftp, Some(p)));
        let above = self.dag.add_trap(Trapezoid::new(top, sid, p, Some(q)));
        let below = self.dag.add_trap(Trapezoid::new(sid, bottom, p, Some(q)));
        let right = self.dag.add_trap(Trapezoid::new(top, bottom, q, rightp));

        let si = self.y_node(sid, above, below);
        let qi = self.x_node(q, si, right);
        let pi = self.x_node(p, left, qi);

        self.replace_trapezoid(old, pi);
    }

    /// The segment crosses several regions.
    ///
    /// The region holding the left endpoint keeps a left margin, the one
    /// holding the right endpoint keeps a right margin, and in between the
    /// segment accumulates an upper and a lower fragment. A fragment stays
    /// open (no right boundary yet) as long as the segment keeps running
    /// on the same side of the walls it crosses, which is how regions end
    /// up shared by several decision nodes.
    ///
    /// Endpoints that already have an x-node in the structure are not
    /// introduced a second time: their host region is left unsplit and
    /// only the fragment bookkeeping advances.
    fn add_segment_crossing_multiple_trapezoids(&mut self, sid: SegmentId, trap_ids: Vec<usize>) {
        let (p, q) = {
            let segment = &self.segments[sid.0];
            (segment.left(), segment.right())
        };
        let p_coords = self.points[p.0].coords();
        let q_coords = self.points[q.0].coords();

        // Fragments carried from one region to the next, and which of the
        // two survived the last wall.
        let mut upper: Option<usize> = None;
        let mut lower: Option<usize> = None;
        let mut merge_upper = false;

        for old in trap_ids {
            let old_trap = self.dag.trap(old);
            let (top, bottom, leftp, rightp) = (
                old_trap.top,
                old_trap.bottom,
                old_trap.leftp,
                old_trap.rightp,
            );
            let rightp = rightp.expect("There should be a right boundary point");

            if self.region_contains_point(old, &p_coords) {
                // Region holding the left endpoint: seed both fragments,
                // leaving open the one that crosses the right wall.
                let (up, low);
                if self.point_above(sid, rightp) {
                    up = self.dag.add_trap(Trapezoid::new(top, sid, p, Some(rightp)));
                    low = self.dag.add_trap(Trapezoid::new(sid, bottom, p, None));
                    merge_upper = false;
                } else {
                    up = self.dag.add_trap(Trapezoid::new(top, sid, p, None));
                    low = self.dag.add_trap(Trapezoid::new(sid, bottom, p, Some(rightp)));
                    merge_upper = true;
                }
                upper = Some(up);
                lower = Some(low);

                if self.points[p.0].introduced {
                    continue;
                }

                let left = self.dag.add_trap(Trapezoid::new(top, bottom, leftp, Some(p)));
                let si = self.y_node(sid, up, low);
                let pi = self.x_node(p, left, si);
                self.replace_trapezoid(old, pi);
            } else if self.region_contains_point(old, &q_coords) {
                // Region holding the right endpoint: close the carried
                // fragment and complete the other side.
                let (up, low);
                if merge_upper {
                    up = upper.expect("There should be an open upper fragment");
                    self.dag.trap_mut(up).rightp = Some(q);
                    low = self.dag.add_trap(Trapezoid::new(sid, bottom, leftp, Some(q)));
                } else {
                    up = self.dag.add_trap(Trapezoid::new(top, sid, leftp, Some(q)));
                    low = lower.expect("There should be an open lower fragment");
                    self.dag.trap_mut(low).rightp = Some(q);
                }
                upper = Some(up);
                lower = Some(low);

                if self.points[q.0].introduced {
                    continue;
                }

                let right = self.dag.add_trap(Trapezoid::new(top, bottom, q, Some(rightp)));
                let si = self.y_node(sid, up, low);
                let qi = self.x_node(q, si, right);
                self.replace_trapezoid(old, qi);
            } else {
                // Region crossed in the middle: continue the carried
                // fragment, start a fresh one on the other side, and close
                // whichever ends at this region's right wall.
                let (up, low);
                if merge_upper {
                    up = upper.expect("There should be an open upper fragment");
                    low = self.dag.add_trap(Trapezoid::new(sid, bottom, leftp, None));
                } else {
                    up = self.dag.add_trap(Trapezoid::new(top, sid, leftp, None));
                    low = lower.expect("There should be an open lower fragment");
                }
                if self.point_above(sid, rightp) {
                    self.dag.trap_mut(up).rightp = Some(rightp);
                    merge_upper = false;
                } else {
                    self.dag.trap_mut(low).rightp = Some(rightp);
                    merge_upper = true;
                }
                upper = Some(up);
                lower = Some(low);

                let si = self.y_node(sid, up, low);
                self.replace_trapezoid(old, si);
            }
        }
    }
}
