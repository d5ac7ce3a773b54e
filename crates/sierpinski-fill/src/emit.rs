//! Turning a sequence of cells into a polyline.

use crate::{geom::Point, sequence::Sequence, tree::Tree};

/// The cross fractal: the midpoint of every cell's entry edge, in curve
/// order.
pub fn cross_points(tree: &Tree, seq: &Sequence) -> Vec<Point> {
    seq.iter()
        .map(|id| tree[id].from_edge().midpoint())
        .collect()
}

/// The Sierpinski curve: the centroid of every cell, in curve order.
pub fn sierpinski_points(tree: &Tree, seq: &Sequence) -> Vec<Point> {
    seq.iter().map(|id| tree[id].centroid()).collect()
}

/// Length of an open polyline.
pub fn path_length(points: &[Point]) -> f64 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}
