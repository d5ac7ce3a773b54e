//! Fill a square with a density that fades from left to right and print the path.

use std::error::Error;

use sierpinski_fill::{
    FillConfig, SierpinskiFill,
    geom::{Aabb, Point},
};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    // A 40mm square with lines at least 2mm apart.
    let bounds = Aabb::new(Point::new(0.0, 0.0), Point::new(40.0, 40.0));
    let config = FillConfig::fit(bounds, 2.0, 0.4)?;
    println!(
        "region {} at depth {}",
        config.region(),
        config.max_depth()
    );

    // Dense on the left edge, empty on the right.
    let fade = |region: &Aabb| (1.0 - region.middle().x / 40.0).clamp(0.0, 1.0) * 0.5;
    let fill = SierpinskiFill::new(config, &fade)?;

    let stats = fill.stats();
    println!(
        "{} cells between depth {} and {}, {:.1}mm of {:.1}mm requested",
        stats.cells, stats.min_depth, stats.max_depth, stats.realized_length, stats.requested_length
    );
    println!("path length {:.1}mm", stats.path_length);
    for point in fill.cross_points().iter().take(10) {
        println!("{point}");
    }

    Ok(())
}
