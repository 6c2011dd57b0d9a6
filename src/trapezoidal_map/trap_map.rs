use itertools::Itertools;
use std::collections::{HashMap, VecDeque};

use crate::error::Result;
use crate::geometry::{Point, PointId, Segment, SegmentId};
use crate::point_locator::PointLocator;
use crate::trapezoidal_map::dag::{Dag, Node, Trapezoid};

/// Trapezoidal map data structure.
///
/// The map decomposes a bounding box into trapezoids delimited above and
/// below by input segments, and on the sides by vertical walls through
/// segment endpoints. Queries run through a search DAG with three node
/// kinds:
/// - an x-node, branching on a boundary point's x-coordinate
/// - a y-node, branching on a segment (above or below?)
/// - a trapezoid-node (a leaf region of the map)
///
/// Leaves can be shared by several decision nodes, which is why the search
/// structure is a DAG and not a tree.
///
/// Construction is incremental: non-crossing segments are inserted one at a
/// time with [`add_segment`](TrapMap::add_segment), and each insertion
/// replaces the leaves the segment crosses with small decision subtrees.
/// Segments are processed in the exact order given, with no shuffling or
/// rebalancing, so the final shape of the DAG is a deterministic function of
/// the insertion order. Once every segment is in,
/// [`assign_names`](TrapMap::assign_names) hands out display identifiers to
/// the surviving regions and the map is ready for read-only queries,
/// possibly in parallel through [`PointLocator`].
#[derive(Debug)]
pub struct TrapMap {
    pub(crate) dag: Dag,
    pub(crate) root: usize,
    pub(crate) points: Vec<Point>,
    pub(crate) segments: Vec<Segment>,
    name_counter: usize,
}

impl TrapMap {
    /// Creates a map whose single region is the bounding box spanned by the
    /// two corners.
    ///
    /// The four corners are registered as points named `ll`, `lr`, `ul` and
    /// `ur`, and the horizontal box edges as segments named `bT` and `bB`.
    /// `lower_left` must be to the left of and below `upper_right`, and
    /// every segment inserted later must fit strictly inside the box.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DegenerateSegment`](crate::Error::DegenerateSegment)
    /// for a zero-width box.
    pub fn new(lower_left: [f64; 2], upper_right: [f64; 2]) -> Result<Self> {
        let [xmin, ymin] = lower_left;
        let [xmax, ymax] = upper_right;

        let mut trap_map = Self {
            dag: Dag::new(),
            root: 0,
            points: Vec::new(),
            segments: Vec::new(),
            name_counter: 0,
        };

        let ll = trap_map.add_point("ll", [xmin, ymin]);
        let ur = trap_map.add_point("ur", [xmax, ymax]);
        let lr = trap_map.add_point("lr", [xmax, ymin]);
        let ul = trap_map.add_point("ul", [xmin, ymax]);
        let top = trap_map.new_segment("bT", ul, ur)?;
        let bottom = trap_map.new_segment("bB", ll, lr)?;

        trap_map.root = trap_map
            .dag
            .add_trap(Trapezoid::new(top, bottom, ul, Some(ur)));

        Ok(trap_map)
    }

    /// Registers a named point and returns its identifier.
    ///
    /// Points are interned by exact coordinate equality: registering
    /// coordinates already seen returns the existing identifier and keeps
    /// the first name.
    pub fn add_point(&mut self, name: impl Into<String>, coords: [f64; 2]) -> PointId {
        if let Some((idx, _)) = self.points.iter().find_position(|p| p.coords() == coords) {
            return PointId(idx);
        }
        let [x, y] = coords;
        self.points.push(Point::new(name, x, y));
        PointId(self.points.len() - 1)
    }

    /// Normalizes and stores a segment without splicing it into the DAG.
    pub(crate) fn new_segment(
        &mut self,
        name: impl Into<String>,
        p: PointId,
        q: PointId,
    ) -> Result<SegmentId> {
        let segment = Segment::new(
            name,
            (p, self.points[p.0].coords()),
            (q, self.points[q.0].coords()),
        )?;
        self.segments.push(segment);
        Ok(SegmentId(self.segments.len() - 1))
    }

    /// The point registered under `id`.
    pub fn point(&self, id: PointId) -> &Point {
        &self.points[id.0]
    }

    /// The segment registered under `id`.
    pub fn segment(&self, id: SegmentId) -> &Segment {
        &self.segments[id.0]
    }

    /// Number of registered points, bounding box corners included.
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Number of registered segments, bounding box edges included.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Whether the point registered under `point` lies strictly above the
    /// supporting line of `segment`.
    pub(crate) fn point_above(&self, segment: SegmentId, point: PointId) -> bool {
        self.segments[segment.0].is_point_above(&self.points[point.0].coords())
    }

    /// Adds an x-node branching on `point` and marks the point as
    /// introduced in the search structure.
    pub(crate) fn x_node(&mut self, point: PointId, left: usize, right: usize) -> usize {
        self.points[point.0].introduced = true;
        self.dag.add_x(point, left, right)
    }

    /// Adds a y-node branching on `segment`.
    pub(crate) fn y_node(&mut self, segment: SegmentId, above: usize, below: usize) -> usize {
        self.dag.add_y(segment, above, below)
    }

    /// Replaces the leaf `old` with the subtree rooted at `new`.
    ///
    /// Every edge recorded in `old`'s back-references is redirected to
    /// `new`. A leaf without back-references is the root, in which case the
    /// root pointer moves instead.
    pub(crate) fn replace_trapezoid(&mut self, old: usize, new: usize) {
        if self.dag.trap(old).parents.is_empty() {
            debug_assert_eq!(old, self.root, "only the root has no incoming edges");
            self.root = new;
        } else {
            self.dag.replace(old, new);
        }
    }

    /// Finds the region leaf the search structure sends `point` to.
    ///
    /// The descent itself always ends at a leaf, even for points outside
    /// the bounding box; combine with
    /// [`region_contains_point`](TrapMap::region_contains_point) or use
    /// [`PointLocator::locate_one`] to tell hits from misses.
    pub fn locate(&self, point: &[f64; 2]) -> usize {
        let mut idx = self.root;
        loop {
            match self.dag.node(idx) {
                Node::Trap(..) => return idx,
                Node::X { point: p, left, right } => {
                    idx = if point[0] >= self.points[p.0].x {
                        *right
                    } else {
                        *left
                    };
                }
                Node::Y {
                    segment,
                    above,
                    below,
                } => {
                    idx = if self.segments[segment.0].is_point_above(point) {
                        *above
                    } else {
                        *below
                    };
                }
            }
        }
    }

    /// The full root-to-leaf decision path for `point`, ending with the
    /// leaf [`locate`](TrapMap::locate) returns.
    pub fn traversal_path(&self, point: &[f64; 2]) -> Vec<usize> {
        let mut path = vec![self.root];
        let mut idx = self.root;
        loop {
            match self.dag.node(idx) {
                Node::Trap(..) => return path,
                Node::X { point: p, left, right } => {
                    idx = if point[0] >= self.points[p.0].x {
                        *right
                    } else {
                        *left
                    };
                    path.push(idx);
                }
                Node::Y {
                    segment,
                    above,
                    below,
                } => {
                    idx = if self.segments[segment.0].is_point_above(point) {
                        *above
                    } else {
                        *below
                    };
                    path.push(idx);
                }
            }
        }
    }

    /// Whether `point` lies inside the region leaf `idx`.
    ///
    /// The region contains a point when it falls within the horizontal
    /// extent (both walls included), strictly above the bottom segment and
    /// not above the top one. Points exactly on a segment therefore belong
    /// to the region below it.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is not a leaf.
    pub fn region_contains_point(&self, idx: usize, point: &[f64; 2]) -> bool {
        let trap = self.dag.trap(idx);
        let rightp = trap
            .rightp
            .expect("There should be a right boundary point");
        let &[x, _] = point;
        self.points[trap.leftp.0].x <= x
            && x <= self.points[rightp.0].x
            && self.segments[trap.bottom.0].is_point_above(point)
            && !self.segments[trap.top.0].is_point_above(point)
    }

    /// Whether `segment` passes through the region leaf `idx`: one of its
    /// endpoints lies inside, or its supporting line crosses the region's
    /// left wall.
    pub fn region_contains_segment(&self, idx: usize, segment: SegmentId) -> bool {
        let segment = &self.segments[segment.0];
        let left = self.points[segment.left().0].coords();
        let right = self.points[segment.right().0].coords();
        if self.region_contains_point(idx, &left) || self.region_contains_point(idx, &right) {
            return true;
        }
        let wall_x = self.points[self.dag.trap(idx).leftp.0].x;
        segment
            .line_value_at(wall_x)
            .map_or(false, |y| self.region_contains_point(idx, &[wall_x, y]))
    }

    /// Hands out sequential display identifiers (`T1`, `T2`, ...) to the
    /// reachable regions, in pre-order (left/above subtree first), skipping
    /// regions that already have one. Returns the total number of
    /// identifiers handed out so far.
    ///
    /// Meant to run once, after the last insertion; running it again is a
    /// no-op and identifiers are never reused.
    pub fn assign_names(&mut self) -> usize {
        let mut stack = vec![self.root];
        while let Some(idx) = stack.pop() {
            if let Node::Trap(..) = self.dag.node(idx) {
                let trap = self.dag.trap_mut(idx);
                if trap.name.is_none() {
                    self.name_counter += 1;
                    trap.name = Some(self.name_counter);
                }
            } else {
                let children = self.dag.node(idx).children();
                // Pushed in reverse so the left/above child pops first.
                stack.push(children[1]);
                stack.push(children[0]);
            }
        }
        self.name_counter
    }

    /// Display label of a node: the point name for an x-node, the segment
    /// name for a y-node, and `T<n>` (or `T?` before
    /// [`assign_names`](TrapMap::assign_names) runs) for a leaf.
    pub fn node_label(&self, idx: usize) -> String {
        match self.dag.node(idx) {
            Node::X { point, .. } => self.points[point.0].name().to_string(),
            Node::Y { segment, .. } => self.segments[segment.0].name().to_string(),
            Node::Trap(trap) => trap
                .name
                .map_or_else(|| "T?".to_string(), |n| format!("T{}", n)),
        }
    }

    /// Indices of the nodes reachable from the root, in pre-order, each
    /// listed once. Replaced nodes still sitting in the arena don't show
    /// up here.
    fn reachable(&self) -> Vec<usize> {
        let mut seen = vec![false; self.dag.count()];
        let mut stack = vec![self.root];
        let mut order = Vec::new();
        while let Some(idx) = stack.pop() {
            if std::mem::replace(&mut seen[idx], true) {
                continue;
            }
            order.push(idx);
            stack.extend(self.dag.node(idx).children().into_iter().rev());
        }
        order
    }

    /// The reachable regions, in pre-order, with their node indices.
    pub fn trapezoids(&self) -> Vec<(usize, &Trapezoid)> {
        self.reachable()
            .into_iter()
            .filter_map(|idx| match self.dag.node(idx) {
                Node::Trap(trap) => Some((idx, trap)),
                _ => None,
            })
            .collect()
    }

    /// Returns the number of reachable x-nodes.
    pub fn x_node_count(&self) -> usize {
        self.reachable()
            .into_iter()
            .filter(|&idx| matches!(self.dag.node(idx), Node::X { .. }))
            .count()
    }

    /// Returns the number of reachable y-nodes.
    pub fn y_node_count(&self) -> usize {
        self.reachable()
            .into_iter()
            .filter(|&idx| matches!(self.dag.node(idx), Node::Y { .. }))
            .count()
    }

    /// Returns the number of reachable regions.
    pub fn trap_count(&self) -> usize {
        self.reachable()
            .into_iter()
            .filter(|&idx| matches!(self.dag.node(idx), Node::Trap(..)))
            .count()
    }

    /// Returns the reachable node counts as an (x, y, trapezoid) triple.
    pub fn node_count(&self) -> (usize, usize, usize) {
        self.reachable().into_iter().fold(
            (0, 0, 0),
            |(mut x_count, mut y_count, mut trap_count), idx| {
                match self.dag.node(idx) {
                    Node::X { .. } => x_count += 1,
                    Node::Y { .. } => y_count += 1,
                    Node::Trap(..) => trap_count += 1,
                };
                (x_count, y_count, trap_count)
            },
        )
    }

    /// Prints some statistics of the DAG.
    ///
    /// Useful for debugging purposes.
    ///
    /// These statistics are:
    /// - Number of reachable x-, y- and trapezoid-nodes
    /// - Average and max depth of the regions
    pub fn print_stats(&self) {
        let (x_node_count, y_node_count, trap_count) = self.node_count();
        println!(
            "Trapezoidal map counts:\n\t{} x-node(s)\n\t{} y-node(s)\n\t{} trapezoid(s)",
            x_node_count, y_node_count, trap_count,
        );
        println!();
        let (avg, max) = self.depth_stats();
        println!("Depth:\n\tmax {}\n\taverage {}", max, avg);
    }

    /// Maximum root-to-leaf depth over the reachable regions.
    pub fn depth(&self) -> usize {
        self.depth_stats().1
    }

    /// Average and maximum depth of the reachable regions. Shared regions
    /// count once, at their shallowest occurrence.
    fn depth_stats(&self) -> (f64, usize) {
        let mut depths = vec![usize::MAX; self.dag.count()];
        let mut queue = VecDeque::from([self.root]);
        depths[self.root] = 0;
        let mut trap_count = 0;
        let mut sum = 0;
        let mut max = 0;
        while let Some(idx) = queue.pop_front() {
            let depth = depths[idx];
            if matches!(self.dag.node(idx), Node::Trap(..)) {
                trap_count += 1;
                sum += depth;
                if depth > max {
                    max = depth;
                }
            }
            for child in self.dag.node(idx).children() {
                if depths[child] == usize::MAX {
                    depths[child] = depth + 1;
                    queue.push_back(child);
                }
            }
        }
        let avg = sum as f64 / trap_count as f64;
        (avg, max)
    }

    /// Checks some invariants of the DAG.
    ///
    /// This is meant for debugging purposes.
    ///
    /// # Panics
    ///
    /// Panics if a reachable leaf's back-references disagree with the
    /// decision edges actually pointing at it, if the root records a
    /// parent, or if a reachable region is incomplete or has its boundary
    /// points out of order.
    pub fn check(&self) {
        let reachable = self.reachable();

        // Incoming edges per node, recomputed from the decision nodes.
        let mut incoming: HashMap<usize, Vec<usize>> = HashMap::new();
        for &idx in &reachable {
            for child in self.dag.node(idx).children() {
                let entry = incoming.entry(child).or_default();
                if !entry.contains(&idx) {
                    entry.push(idx);
                }
            }
        }

        assert!(
            !incoming.contains_key(&self.root),
            "The root shouldn't have incoming edges"
        );

        for &idx in &reachable {
            let Node::Trap(trap) = self.dag.node(idx) else {
                continue;
            };
            let expected: Vec<usize> = incoming
                .remove(&idx)
                .unwrap_or_default()
                .into_iter()
                .sorted_unstable()
                .collect();
            let recorded: Vec<usize> = trap.parents.iter().copied().sorted_unstable().collect();
            assert_eq!(
                recorded, expected,
                "Back-references of leaf {} should match its incoming edges",
                idx
            );

            let rightp = trap.rightp.expect("There should be a right boundary point");
            assert!(
                self.points[trap.leftp.0].x <= self.points[rightp.0].x,
                "Boundary points of leaf {} should be ordered",
                idx
            );
        }
    }
}

impl PointLocator for TrapMap {
    fn locate_one(&self, point: &[f64; 2]) -> Option<usize> {
        let idx = self.locate(point);
        self.region_contains_point(idx, point).then_some(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    use anyhow::Result;

    #[test]
    fn initialize_empty_trapezoidal_map() -> Result<()> {
        let trap_map = TrapMap::new([0., 0.], [10., 10.])?;

        assert_eq!(trap_map.node_count(), (0, 0, 1));
        assert_eq!(trap_map.point_count(), 4);
        assert_eq!(trap_map.segment_count(), 2);

        let trapezoids = trap_map.trapezoids();
        assert_eq!(trapezoids.len(), 1);
        let (_, trap) = trapezoids[0];
        assert_eq!(trap_map.segment(trap.top()).name(), "bT");
        assert_eq!(trap_map.segment(trap.bottom()).name(), "bB");
        assert_eq!(trap_map.point(trap.left_point()).name(), "ul");
        let rightp = trap.right_point().expect("the box is complete");
        assert_eq!(trap_map.point(rightp).name(), "ur");

        trap_map.check();

        Ok(())
    }

    #[test]
    fn zero_width_box_is_rejected() {
        let res = TrapMap::new([0., 0.], [0., 10.]);

        assert!(matches!(
            res,
            Err(Error::DegenerateSegment { ref name, .. }) if name == "bT"
        ));
    }

    #[test]
    fn points_are_interned_by_coordinates() -> Result<()> {
        let mut trap_map = TrapMap::new([0., 0.], [10., 10.])?;

        let p = trap_map.add_point("P1", [2., 2.]);
        let same = trap_map.add_point("other name", [2., 2.]);
        let corner = trap_map.add_point("yet another", [0., 0.]);

        assert_eq!(p, same);
        assert_eq!(trap_map.point(p).name(), "P1");
        // The box corner was registered first, its name wins.
        assert_eq!(trap_map.point(corner).name(), "ll");
        assert_eq!(trap_map.point_count(), 5);

        Ok(())
    }

    #[test]
    fn locate_in_empty_trapezoidal_map() -> Result<()> {
        let trap_map = TrapMap::new([0., 0.], [10., 10.])?;

        let inside = trap_map.locate(&[5., 5.]);
        assert_eq!(inside, trap_map.trapezoids()[0].0);
        assert_eq!(trap_map.traversal_path(&[5., 5.]), vec![inside]);

        // The descent also ends there for outside points; containment is
        // what tells them apart.
        assert_eq!(trap_map.locate(&[42., 5.]), inside);
        assert!(!trap_map.region_contains_point(inside, &[42., 5.]));
        assert_eq!(trap_map.locate_one(&[42., 5.]), None);
        assert_eq!(trap_map.locate_one(&[5., 5.]), Some(inside));

        Ok(())
    }

    #[test]
    fn box_edges_belong_to_the_region_below() -> Result<()> {
        let trap_map = TrapMap::new([0., 0.], [10., 10.])?;
        let inside = trap_map.trapezoids()[0].0;

        // On the top edge: not above `bT`, so still inside.
        assert_eq!(trap_map.locate_one(&[5., 10.]), Some(inside));
        // On the bottom edge: not strictly above `bB`, so outside.
        assert_eq!(trap_map.locate_one(&[5., 0.]), None);

        Ok(())
    }

    #[test]
    fn assign_names_on_the_empty_map() -> Result<()> {
        let mut trap_map = TrapMap::new([0., 0.], [10., 10.])?;

        let root = trap_map.locate(&[5., 5.]);
        assert_eq!(trap_map.node_label(root), "T?");

        assert_eq!(trap_map.assign_names(), 1);
        assert_eq!(trap_map.node_label(root), "T1");

        // Running the pass again changes nothing.
        assert_eq!(trap_map.assign_names(), 1);
        assert_eq!(trap_map.node_label(root), "T1");

        Ok(())
    }
}
