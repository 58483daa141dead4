use hough_tiles::overlay::render_overlay;
use hough_tiles::prelude::*;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    // Demo: a cross through the tile boundaries, run against the software accelerator.
    let size = 64usize;
    let image = BinaryImage::from_fn(size, size, |x, y| x == 32 || y == 32);

    let params = DispatchParams {
        timing: LinkTiming::immediate(),
        ..Default::default()
    };
    let dispatcher = TileDispatcher::new(params).map_err(|e| e.to_string())?;
    let mut link = SimulatedAccelerator::default();
    let report = dispatcher
        .run(&mut link, &image)
        .map_err(|e| e.to_string())?;

    let (lines, stats) = LineAggregator::default().aggregate(&report.detections);
    println!(
        "tiles={} raw={} lines={} elapsed_ms={:.3}",
        report.tiles.len(),
        stats.input,
        stats.accepted,
        report.timing.total_ms
    );
    for line in &lines {
        println!(
            "  rho={:6.2} theta={:3} votes={:3} tile=({}, {})",
            line.global_rho, line.theta_deg, line.votes, line.tile.tile_x, line.tile.tile_y
        );
    }
    print!("{}", render_overlay(Some(&image), lines.as_slice(), size));
    Ok(())
}
