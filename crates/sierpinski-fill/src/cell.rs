//! Triangles of the subdivision hierarchy and their per-cell statistics.
//!
//! Every cell is a right triangle `ABC` with the right angle at `C` (the
//! "straight corner"). The fill curve enters the triangle through one edge
//! and leaves it through another; which pair of edges is recorded by the
//! cell's [`Direction`]. Subdividing a cell splits it at the midpoint `M`
//! of `AB` into `(M, A, C)` and `(M, C, B)`:
//!
//! ```text
//! |\         |\
//! |A \       |A \
//! |    \     |    \
//! |     C\   |C____B\
//! |      /   |C    A/
//! |    /     |    /
//! |B /       |B /
//! |/         |/
//! ```

use std::fmt;

use smallvec::SmallVec;

use crate::geom::{Aabb, Edge, Point};

/// Order in which the edges of a triangle are crossed by the curve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Enter through `AC`, leave through `AB`.
    AcToAb,
    /// Enter through `AC`, leave through `BC`.
    AcToBc,
    /// Enter through `AB`, leave through `BC`.
    AbToBc,
}

impl Direction {
    /// Directions of the first and second child of a cell with this direction.
    pub const fn child_directions(self) -> [Self; 2] {
        match self {
            Self::AbToBc => [Self::AcToBc, Self::AcToAb],
            Self::AcToAb => [Self::AbToBc, Self::AcToBc],
            Self::AcToBc => [Self::AbToBc, Self::AcToAb],
        }
    }

    /// Whether a cell with this direction must subdivide together with its
    /// successor when that successor is coarser.
    ///
    /// Such a cell leaves through its long edge `AB`, which it shares with
    /// the next cell.
    pub const fn needs_successor(self) -> bool {
        matches!(self, Self::AcToAb)
    }

    /// Whether a cell with this direction must subdivide together with its
    /// predecessor.
    ///
    /// Such a cell enters through its long edge `AB`, which it shares with
    /// the previous cell.
    pub const fn needs_predecessor(self) -> bool {
        matches!(self, Self::AbToBc)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AcToAb => "AC->AB",
            Self::AcToBc => "AC->BC",
            Self::AbToBc => "AB->BC",
        })
    }
}

/// Index of a cell in the [`Tree`](crate::tree::Tree) arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellId(pub(crate) u32);

impl CellId {
    /// Position of the cell in the arena.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Up to two cells that have to be subdivided as one.
pub type Unit = SmallVec<[CellId; 2]>;

/// A node of the subdivision tree.
#[derive(Clone, Debug)]
pub struct Cell {
    /// The right-angle corner `C`.
    pub straight_corner: Point,
    /// The corner nearer the start of the curve.
    pub a: Point,
    /// The corner nearer the end of the curve.
    pub b: Point,
    /// Which edges the curve crosses.
    pub direction: Direction,
    /// Recursion depth; the two roots have depth zero.
    pub depth: u32,
    /// Area of the triangle.
    pub area: f64,
    /// Length of the curve segment crossing this triangle unsubdivided.
    pub realized_length: f64,
    /// Length of curve the target density asks for inside this triangle.
    pub requested_length: f64,
    /// Sum of both children's [`Cell::realized_length`], zero for leaves.
    pub total_child_realized_length: f64,
    /// Value obtained from (positive) or lent to (negative) the previous cell.
    pub error_left: f64,
    /// Value obtained from (positive) or lent to (negative) the next cell.
    pub error_right: f64,
    /// The two children, or `None` for a leaf.
    pub children: Option<[CellId; 2]>,
}

impl Cell {
    /// Create a cell with geometric statistics filled in and an empty ledger.
    pub fn new(straight_corner: Point, a: Point, b: Point, direction: Direction, depth: u32) -> Self {
        let mut cell = Self {
            straight_corner,
            a,
            b,
            direction,
            depth,
            area: 0.5 * (a - straight_corner).cross(b - straight_corner).abs(),
            realized_length: 0.0,
            requested_length: 0.0,
            total_child_realized_length: 0.0,
            error_left: 0.0,
            error_right: 0.0,
            children: None,
        };
        cell.realized_length = cell.from_edge().midpoint().distance(cell.to_edge().midpoint());
        cell
    }

    /// The geometry of both children, in curve order.
    pub fn split(&self) -> [Self; 2] {
        let middle = self.a.midpoint(self.b);
        let [first, second] = self.direction.child_directions();
        [
            Self::new(middle, self.a, self.straight_corner, first, self.depth + 1),
            Self::new(middle, self.straight_corner, self.b, second, self.depth + 1),
        ]
    }

    /// The edge through which the curve enters this triangle.
    pub fn from_edge(&self) -> Edge {
        match self.direction {
            Direction::AcToAb | Direction::AcToBc => Edge::new(self.a, self.straight_corner),
            Direction::AbToBc => Edge::new(self.a, self.b),
        }
    }

    /// The edge through which the curve leaves this triangle.
    pub fn to_edge(&self) -> Edge {
        match self.direction {
            Direction::AcToAb => Edge::new(self.a, self.b),
            Direction::AcToBc | Direction::AbToBc => Edge::new(self.straight_corner, self.b),
        }
    }

    /// Bounding box of the triangle.
    pub fn bounds(&self) -> Aabb {
        let mut aabb = Aabb::new(self.a, self.a);
        aabb.include(self.b);
        aabb.include(self.straight_corner);
        aabb
    }

    /// Centroid of the triangle.
    pub fn centroid(&self) -> Point {
        (self.a + self.b + self.straight_corner) / 3.0
    }

    /// Whether the cell cannot be subdivided.
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Net value currently borrowed from both neighbors.
    pub fn total_error(&self) -> f64 {
        self.error_left + self.error_right
    }

    /// Requested length modulated by the ledger.
    pub fn errored_value(&self) -> f64 {
        self.requested_length + self.total_error()
    }

    /// Value left over if this cell were replaced by its children.
    pub fn subdivision_error(&self) -> f64 {
        self.errored_value() - self.total_child_realized_length
    }

    /// Value left over by the cell as it is.
    pub fn value_error(&self) -> f64 {
        self.errored_value() - self.realized_length
    }
}
