//! Property-based tests of the error ledger and the shape of the sequence.
//!
//! Every phase only moves value between neighbors, so the ledger must stay
//! closed at both ends and balanced at every boundary, whatever the density.

#![allow(missing_docs, clippy::tests_outside_test_module)]

use proptest::prelude::*;
use sierpinski_fill::{
    FillConfig, SierpinskiFill,
    cell::Direction,
    geom::{Aabb, Edge, Point},
};

/// A density ramp from `left` to `right` across `region`.
fn ramp(region: Aabb, left: f64, right: f64) -> impl Fn(&Aabb) -> f64 {
    move |cell: &Aabb| {
        let t = ((cell.middle().x - region.min.x) / region.width()).clamp(0.0, 1.0);
        (left + (right - left) * t).clamp(0.0, 1.0)
    }
}

/// Whether `b` lies on the line through `a` and shares a stretch of it.
fn overlaps(a: Edge, b: Edge, scale: f64) -> bool {
    let dir = a.end - a.start;
    let len2 = dir.x * dir.x + dir.y * dir.y;
    let along = |p: Point| {
        let d = p - a.start;
        (d.x * dir.x + d.y * dir.y) / len2
    };
    let collinear = [b.start, b.end]
        .iter()
        .all(|&p| dir.cross(p - a.start).abs() <= 1e-9 * scale * dir.length());
    let (t0, t1) = (along(b.start), along(b.end));
    collinear && t0.max(t1).min(1.0) - t0.min(t1).max(0.0) > 1e-9
}

/// Fill configurations over regions of varied size, aspect and position.
fn configs() -> impl Strategy<Value = FillConfig> {
    (
        -20.0..20.0f64,
        1.0..50.0f64,
        0.5..2.0f64,
        0u32..=7,
        0.1..2.0f64,
        any::<[bool; 3]>(),
    )
        .prop_map(|(origin, size, aspect, depth, line_width, [dither, diffuse, errors])| {
            let region = Aabb::new(
                Point::new(origin, origin),
                Point::new(origin + size, origin + size * aspect),
            );
            FillConfig::new(region, depth, line_width)
                .expect("generated config is valid")
                .with_dithering(dither)
                .with_constraint_error_diffusion(diffuse)
                .with_errors_in_dithering(errors)
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The lower bound keeps the ledger closed and balanced, and every cell
    /// below the roots covers its own length.
    #[test]
    fn lower_bound_ledger(config in configs(), left in 0.0..=1.0f64, right in 0.0..=1.0f64) {
        let density = ramp(config.region(), left, right);
        let max_depth = config.max_depth();
        let fill = SierpinskiFill::lower_bound(config, &density).unwrap();
        prop_assert_eq!(fill.check_ledger(true), Ok(()));
        prop_assert!(fill.cells().all(|c| c.depth <= max_depth));
    }

    /// Settling keeps the ledger intact and a second settle changes nothing.
    #[test]
    fn settle_is_idempotent(config in configs(), left in 0.0..=1.0f64, right in 0.0..=1.0f64) {
        let density = ramp(config.region(), left, right);
        let mut fill = SierpinskiFill::lower_bound(config, &density).unwrap();
        fill.settle();
        prop_assert_eq!(fill.check_ledger(true), Ok(()));
        let settled: Vec<(f64, f64)> = fill.cells().map(|c| (c.error_left, c.error_right)).collect();
        prop_assert!(!fill.settle());
        let again: Vec<(f64, f64)> = fill.cells().map(|c| (c.error_left, c.error_right)).collect();
        prop_assert_eq!(settled, again);

        // Every cell of the settled sequence enters the diffusion carry once.
        let cells = fill.sequence().len();
        prop_assert_eq!(fill.diffuse().carried, cells);
    }

    /// The finished fill keeps the ledger balanced, respects the depth bound,
    /// shares every long edge with the paired neighbor and yields one point
    /// per cell.
    #[test]
    fn finished_fill(config in configs(), left in 0.0..=1.0f64, right in 0.0..=1.0f64) {
        let density = ramp(config.region(), left, right);
        let max_depth = config.max_depth();
        let region = config.region();
        let fill = SierpinskiFill::new(config, &density).unwrap();
        prop_assert_eq!(fill.check_ledger(false), Ok(()));

        let total: f64 = fill.cells().map(|c| c.error_left + c.error_right).sum();
        prop_assert!(total.abs() < 1e-2 * fill.stats().cells as f64);

        let cells: Vec<_> = fill.cells().collect();
        prop_assert!(cells.iter().all(|c| c.depth <= max_depth));
        let scale = region.width().max(region.height());
        for pair in cells.windows(2) {
            if pair[0].depth == pair[1].depth {
                let gap = pair[0].to_edge().midpoint().distance(pair[1].from_edge().midpoint());
                prop_assert!(gap < 1e-9 * scale);
            }
            if pair[1].direction == Direction::AbToBc || pair[0].direction == Direction::AcToAb {
                prop_assert!(overlaps(pair[0].to_edge(), pair[1].from_edge(), scale));
            }
        }

        let points = fill.cross_points();
        prop_assert_eq!(points.len(), cells.len());
        prop_assert_eq!(fill.sierpinski_points().len(), cells.len());
    }
}
