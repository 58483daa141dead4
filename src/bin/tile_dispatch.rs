use hough_tiles::aggregate::{AggregateStats, LineAggregator};
use hough_tiles::config::dispatch;
use hough_tiles::diagnostics::DispatchReport;
use hough_tiles::dispatch::TileDispatcher;
use hough_tiles::image::io::{
    load_grayscale_image, save_binary_png, save_overlay_png, write_json_file,
};
use hough_tiles::image::BinaryImage;
use hough_tiles::overlay::render_overlay;
use hough_tiles::types::GlobalDetection;
use log::info;
use serde::Serialize;
use std::env;
use std::path::Path;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = dispatch::load_config(Path::new(&config_path))?;

    let gray = load_grayscale_image(&config.input)?;
    let image = BinaryImage::from_gray(&gray.as_view(), config.threshold);
    info!(
        "loaded {} ({}x{}, {} set pixels)",
        config.input.display(),
        image.w,
        image.h,
        image.count_set()
    );

    let dispatcher = TileDispatcher::new(config.dispatch.clone()).map_err(|e| e.to_string())?;
    let mut link = config.link.connect()?;
    info!("link: {}", config.link.describe());
    let report = dispatcher
        .run(link.as_mut(), &image)
        .map_err(|e| format!("Dispatch failed: {e}"))?;

    let aggregator = LineAggregator::new(config.aggregate.clone());
    let (lines, aggregate) = aggregator.aggregate(&report.detections);

    print_text_summary(&report, lines.as_slice(), &aggregate);

    let size = config.dispatch.geometry.image_size;
    let overlay = render_overlay(Some(&image), lines.as_slice(), size);
    if config.output.print_overlay {
        print!("\n{overlay}");
    }
    if let Some(path) = &config.output.overlay_png {
        save_overlay_png(&overlay, path)?;
        println!("Overlay written to {}", path.display());
    }
    if let Some(path) = &config.output.binary_png {
        save_binary_png(&image, path)?;
        println!("Binarized input written to {}", path.display());
    }
    if let Some(path) = &config.output.json_out {
        let summary = DispatchSummary {
            report: &report,
            aggregate: &aggregate,
            lines: lines.as_slice(),
        };
        write_json_file(path, &summary)?;
        println!("JSON report written to {}", path.display());
    }

    Ok(())
}

fn print_text_summary(report: &DispatchReport, lines: &[GlobalDetection], stats: &AggregateStats) {
    let s = &report.summary;
    println!("Dispatch summary");
    println!(
        "  tiles: {} (ok {}, silent {}, truncated {}, malformed {})",
        report.tiles.len(),
        s.ok,
        s.silent,
        s.truncated,
        s.malformed
    );
    println!(
        "  raw detections: {} (dropped {})",
        report.detections.len(),
        report.dropped()
    );
    println!(
        "  lines: {} (replaced {}, absorbed {}, dropped {})",
        stats.accepted, stats.replaced, stats.absorbed, stats.dropped
    );
    println!("  elapsed_ms: {:.3}", report.timing.total_ms);
    for line in lines {
        let fmt_opt = |v: Option<f32>| v.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"));
        println!(
            "    rho={:7.2} theta={:3} votes={:3} x_int={} y_int={}",
            line.global_rho,
            line.theta_deg,
            line.votes,
            fmt_opt(line.x_intercept),
            fmt_opt(line.y_intercept)
        );
    }
}

fn usage() -> String {
    "Usage: tile_dispatch <config.json>".to_string()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DispatchSummary<'a> {
    report: &'a DispatchReport,
    aggregate: &'a AggregateStats,
    lines: &'a [GlobalDetection],
}
