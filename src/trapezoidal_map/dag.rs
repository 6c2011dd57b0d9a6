//! Arena-backed search structure of the trapezoidal map.
//!
//! Nodes live in a [`Vec`] and refer to each other by index, which sidesteps
//! the ownership puzzles of a pointer-linked graph with shared children. The
//! arena only ever grows: a leaf that gets replaced during an insertion is
//! not removed, it just becomes unreachable from the root and stays behind
//! as an inert entry.

use smallvec::{smallvec, SmallVec};

use crate::geometry::{PointId, SegmentId};

/// A node of the search DAG.
///
/// Decision nodes own their two child indices directly. Only leaves track
/// who points at them: a leaf can be shared by several decision nodes, and
/// the recorded back-references are what makes replacing it cheap.
#[derive(Clone, Debug)]
pub(crate) enum Node {
    /// Branches on a point: queries with a greater or equal x-coordinate go
    /// right, the others go left.
    X {
        point: PointId,
        left: usize,
        right: usize,
    },
    /// Branches on a segment: queries strictly above it go up, the others
    /// go down.
    Y {
        segment: SegmentId,
        above: usize,
        below: usize,
    },
    /// A trapezoidal region of the map.
    Trap(Trapezoid),
}

impl Node {
    /// Child indices in traversal order: left (resp. above) first.
    pub(crate) fn children(&self) -> SmallVec<[usize; 2]> {
        match *self {
            Node::X { left, right, .. } => smallvec![left, right],
            Node::Y { above, below, .. } => smallvec![above, below],
            Node::Trap(..) => SmallVec::new(),
        }
    }

    pub(crate) fn get_trap(&self) -> &Trapezoid {
        let Node::Trap(trap) = self else {
            panic!("This is not a Trapezoid")
        };
        trap
    }

    pub(crate) fn get_trap_mut(&mut self) -> &mut Trapezoid {
        let Node::Trap(trap) = self else {
            panic!("This is not a Trapezoid")
        };
        trap
    }
}

/// A trapezoidal region: bounded above and below by segments, and on the
/// sides by vertical walls through two boundary points.
#[derive(Clone, Debug)]
pub struct Trapezoid {
    pub(crate) top: SegmentId,
    pub(crate) bottom: SegmentId,
    pub(crate) leftp: PointId,
    /// `None` only while the region is an open fragment in the middle of an
    /// insertion; complete regions always have a right boundary.
    pub(crate) rightp: Option<PointId>,
    /// Decision nodes with an edge into this leaf.
    pub(crate) parents: SmallVec<[usize; 4]>,
    /// Sequential display number, handed out by the finishing pass.
    pub(crate) name: Option<usize>,
}

impl Trapezoid {
    pub(crate) fn new(
        top: SegmentId,
        bottom: SegmentId,
        leftp: PointId,
        rightp: Option<PointId>,
    ) -> Self {
        Self {
            top,
            bottom,
            leftp,
            rightp,
            parents: SmallVec::new(),
            name: None,
        }
    }

    /// The segment bounding the region from above.
    pub fn top(&self) -> SegmentId {
        self.top
    }

    /// The segment bounding the region from below.
    pub fn bottom(&self) -> SegmentId {
        self.bottom
    }

    /// The point whose vertical wall closes the region on the left.
    pub fn left_point(&self) -> PointId {
        self.leftp
    }

    /// The point whose vertical wall closes the region on the right, if the
    /// region is complete.
    pub fn right_point(&self) -> Option<PointId> {
        self.rightp
    }

    /// The display number assigned by
    /// [`TrapMap::assign_names`](crate::TrapMap::assign_names), if any.
    pub fn name(&self) -> Option<usize> {
        self.name
    }
}

/// The arena holding every node ever created for a map.
#[derive(Debug, Default)]
pub(crate) struct Dag {
    arena: Vec<Node>,
}

impl Dag {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Number of entries in the arena, unreachable ones included.
    pub(crate) fn count(&self) -> usize {
        self.arena.len()
    }

    pub(crate) fn node(&self, idx: usize) -> &Node {
        &self.arena[idx]
    }

    pub(crate) fn trap(&self, idx: usize) -> &Trapezoid {
        self.arena[idx].get_trap()
    }

    pub(crate) fn trap_mut(&mut self, idx: usize) -> &mut Trapezoid {
        self.arena[idx].get_trap_mut()
    }

    /// Adds a leaf and returns its index.
    pub(crate) fn add_trap(&mut self, trap: Trapezoid) -> usize {
        let idx = self.arena.len();
        self.arena.push(Node::Trap(trap));
        idx
    }

    /// Adds an x-node over the two children and returns its index.
    pub(crate) fn add_x(&mut self, point: PointId, left: usize, right: usize) -> usize {
        let idx = self.arena.len();
        self.arena.push(Node::X { point, left, right });
        self.register(left, idx);
        self.register(right, idx);
        idx
    }

    /// Adds a y-node over the two children and returns its index.
    pub(crate) fn add_y(&mut self, segment: SegmentId, above: usize, below: usize) -> usize {
        let idx = self.arena.len();
        self.arena.push(Node::Y {
            segment,
            above,
            below,
        });
        self.register(above, idx);
        self.register(below, idx);
        idx
    }

    /// Records `parent` in the back-references of `child` when the child is
    /// a leaf. Decision nodes have a single owner and track nothing.
    fn register(&mut self, child: usize, parent: usize) {
        if let Node::Trap(trap) = &mut self.arena[child] {
            if !trap.parents.contains(&parent) {
                trap.parents.push(parent);
            }
        }
    }

    /// Redirects every recorded edge into the leaf `old` towards `new`,
    /// draining `old`'s back-references. The caller handles the root case,
    /// where there is no edge to redirect.
    pub(crate) fn replace(&mut self, old: usize, new: usize) {
        let parents = std::mem::take(&mut self.trap_mut(old).parents);
        for &parent in &parents {
            match &mut self.arena[parent] {
                Node::X { left, right, .. } => {
                    if *left == old {
                        *left = new;
                    }
                    if *right == old {
                        *right = new;
                    }
                }
                Node::Y { above, below, .. } => {
                    if *above == old {
                        *above = new;
                    }
                    if *below == old {
                        *below = new;
                    }
                }
                Node::Trap(..) => unreachable!("a leaf cannot be a parent"),
            }
            self.register(new, parent);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf() -> Trapezoid {
        Trapezoid::new(SegmentId(0), SegmentId(1), PointId(0), Some(PointId(1)))
    }

    #[test]
    fn create_empty_dag() {
        let dag = Dag::new();

        assert_eq!(dag.count(), 0);
    }

    #[test]
    fn decision_nodes_register_on_their_leaves() {
        let mut dag = Dag::new();
        let above = dag.add_trap(leaf());
        let below = dag.add_trap(leaf());
        let left = dag.add_trap(leaf());

        let y = dag.add_y(SegmentId(2), above, below);
        let x = dag.add_x(PointId(2), left, y);

        assert_eq!(dag.count(), 5);
        assert_eq!(dag.trap(above).parents.as_slice(), &[y]);
        assert_eq!(dag.trap(below).parents.as_slice(), &[y]);
        assert_eq!(dag.trap(left).parents.as_slice(), &[x]);
        // `x`'s right child is a decision node, nothing gets recorded there.
        assert_eq!(dag.node(y).children().as_slice(), &[above, below]);
        assert_eq!(dag.node(x).children().as_slice(), &[left, y]);
    }

    #[test]
    fn parents_are_recorded_only_once() {
        let mut dag = Dag::new();
        let shared = dag.add_trap(leaf());

        let x = dag.add_x(PointId(2), shared, shared);

        assert_eq!(dag.trap(shared).parents.as_slice(), &[x]);
    }

    #[test]
    fn replace_redirects_every_parent() {
        let mut dag = Dag::new();
        let shared = dag.add_trap(leaf());
        let other = dag.add_trap(leaf());
        let y1 = dag.add_y(SegmentId(2), shared, other);
        let y2 = dag.add_y(SegmentId(3), other, shared);
        let fresh = dag.add_trap(leaf());

        dag.replace(shared, fresh);

        assert_eq!(dag.node(y1).children().as_slice(), &[fresh, other]);
        assert_eq!(dag.node(y2).children().as_slice(), &[other, fresh]);
        assert!(dag.trap(shared).parents.is_empty());
        assert_eq!(dag.trap(fresh).parents.as_slice(), &[y1, y2]);
        // The replaced leaf stays in the arena as an unreachable entry.
        assert_eq!(dag.count(), 5);
    }

    #[test]
    fn replace_with_a_decision_node() {
        let mut dag = Dag::new();
        let old = dag.add_trap(leaf());
        let x = dag.add_x(PointId(2), old, old);
        let above = dag.add_trap(leaf());
        let below = dag.add_trap(leaf());
        let y = dag.add_y(SegmentId(2), above, below);

        dag.replace(old, y);

        assert_eq!(dag.node(x).children().as_slice(), &[y, y]);
        assert!(dag.trap(old).parents.is_empty());
    }
}
