mod common;

use common::synthetic_image::{cross, cross_gray, horizontal_line};
use common::{approx_eq, init_logging};
use hough_tiles::aggregate::LineAggregator;
use hough_tiles::dispatch::{DispatchParams, TileDispatcher};
use hough_tiles::image::{BinaryImage, ImageU8};
use hough_tiles::overlay::{render_overlay, OverlayCell};
use hough_tiles::sim::SimulatedAccelerator;
use hough_tiles::transport::LinkTiming;
use hough_tiles::types::TileCoord;

fn fast_params() -> DispatchParams {
    DispatchParams {
        timing: LinkTiming::immediate(),
        ..Default::default()
    }
}

#[test]
fn cross_image_yields_horizontal_and_vertical_lines() {
    init_logging();
    let image = cross(64, 32, 32);
    let dispatcher = TileDispatcher::new(fast_params()).expect("default geometry");
    let mut link = SimulatedAccelerator::default();

    let report = dispatcher.run(&mut link, &image).expect("simulated link");
    assert_eq!(report.tiles.len(), 16);
    assert_eq!(link.frames_received(), 16);
    assert!(report.summary.all_ok(), "summary: {:?}", report.summary);
    assert_eq!(report.tiles[0].tile, TileCoord::new(0, 0));
    assert_eq!(report.tiles[15].tile, TileCoord::new(3, 3));

    let (lines, _) = LineAggregator::default().aggregate(&report.detections);
    assert!(lines.len() >= 2, "expected at least two lines, got {}", lines.len());

    let vertical = lines
        .iter()
        .find(|l| l.theta_deg < 15 || l.theta_deg > 165)
        .expect("vertical line");
    assert!(
        approx_eq(vertical.global_rho.abs(), 32.0, 1.5),
        "vertical rho={}",
        vertical.global_rho
    );

    let horizontal = lines
        .iter()
        .find(|l| (75..=105).contains(&l.theta_deg))
        .expect("horizontal line");
    assert!(
        approx_eq(horizontal.global_rho, 32.0, 1.5),
        "horizontal rho={}",
        horizontal.global_rho
    );
}

#[test]
fn empty_tiles_reply_with_zero_count() {
    init_logging();
    let image = horizontal_line(64, 8);
    let dispatcher = TileDispatcher::new(fast_params()).expect("default geometry");
    let mut link = SimulatedAccelerator::default();
    let report = dispatcher.run(&mut link, &image).expect("simulated link");

    // Only the top row of tiles contains the line.
    for t in &report.tiles {
        if t.tile.tile_y == 0 {
            assert!(t.detections > 0, "tile {:?}", t.tile);
        } else {
            assert_eq!(t.detections, 0, "tile {:?}", t.tile);
            assert_eq!(t.bytes_received, 1);
        }
    }
    let (lines, stats) = LineAggregator::default().aggregate(&report.detections);
    assert_eq!(stats.input, report.detections.len());
    assert!(lines
        .iter()
        .any(|l| l.theta_deg == 90 && approx_eq(l.global_rho, 8.0, 0.5)));
}

#[test]
fn gray_input_binarizes_then_dispatches() {
    init_logging();
    let gray = cross_gray(64, 32, 32, 200);
    let view = ImageU8::packed(64, 64, &gray);
    let image = BinaryImage::from_gray(&view, 127);
    assert_eq!(image, cross(64, 32, 32));

    let dispatcher = TileDispatcher::new(fast_params()).expect("default geometry");
    let report = dispatcher
        .run(&mut SimulatedAccelerator::default(), &image)
        .expect("simulated link");
    let (lines, _) = LineAggregator::default().aggregate(&report.detections);
    let overlay = render_overlay(Some(&image), lines.as_slice(), 64);
    assert_eq!(overlay.get(32, 32), OverlayCell::Overlap);
    assert_eq!(overlay.get(0, 0), OverlayCell::Empty);
}

#[test]
fn wrong_image_size_fails_before_touching_the_link() {
    let dispatcher = TileDispatcher::new(fast_params()).expect("default geometry");
    let mut link = SimulatedAccelerator::default();
    let err = dispatcher
        .run(&mut link, &BinaryImage::new(48, 48))
        .expect_err("48x48 does not match 64x64");
    assert!(err.to_string().contains("48x48"));
    assert_eq!(link.frames_received(), 0);
}
