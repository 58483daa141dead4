mod common;

use common::init_logging;
use common::synthetic_image::{cross, horizontal_line};
use hough_tiles::dispatch::{DispatchError, DispatchParams, TileDispatcher};
use hough_tiles::protocol::{DecodePolicy, ReplyStatus};
use hough_tiles::sim::{ReplyFault, SimulatedAccelerator, SimulatedAcceleratorConfig};
use hough_tiles::transport::{LinkError, LinkTiming, ReplyWait, StreamTransport};
use std::io::Cursor;
use hough_tiles::types::TileCoord;

fn params(policy: DecodePolicy) -> DispatchParams {
    DispatchParams {
        timing: LinkTiming::immediate(),
        decode_policy: policy,
        ..Default::default()
    }
}

/// Faults for the four tiles of the top row, remaining tiles reply normally.
fn top_row_faults() -> Vec<Option<ReplyFault>> {
    vec![
        Some(ReplyFault::Silent),
        Some(ReplyFault::TruncateTo(3)),
        Some(ReplyFault::CountOverride(200)),
        Some(ReplyFault::Trailing(vec![0xEE, 0xEE])),
    ]
}

#[test]
fn statuses_are_reported_per_tile_lenient() {
    init_logging();
    let image = horizontal_line(64, 4);
    let dispatcher = TileDispatcher::new(params(DecodePolicy::Lenient)).expect("geometry");
    let mut link = SimulatedAccelerator::default();
    link.script_faults(top_row_faults());

    let report = dispatcher.run(&mut link, &image).expect("simulated link");
    let tile = |x| report.tile(TileCoord::new(x, 0)).expect("top row tile");

    assert_eq!(tile(0).status, ReplyStatus::Silent);
    assert_eq!(tile(0).detections, 0);

    assert_eq!(
        tile(1).status,
        ReplyStatus::Truncated {
            declared: 1,
            received_groups: 0
        }
    );
    assert_eq!(tile(1).detections, 0);

    assert_eq!(tile(2).status, ReplyStatus::Malformed { declared: 200 });
    assert_eq!(tile(2).detections, 1);

    assert_eq!(tile(3).status, ReplyStatus::Ok { count: 1 });
    assert_eq!(tile(3).detections, 1);

    assert_eq!(report.summary.silent, 1);
    assert_eq!(report.summary.truncated, 1);
    assert_eq!(report.summary.malformed, 1);
    assert_eq!(report.summary.ok, 13);
    assert_eq!(report.detections.len(), 2);
}

#[test]
fn strict_policy_discards_malformed_replies() {
    init_logging();
    let image = horizontal_line(64, 4);
    let dispatcher = TileDispatcher::new(params(DecodePolicy::Strict)).expect("geometry");
    let mut link = SimulatedAccelerator::default();
    link.script_faults(top_row_faults());

    let report = dispatcher.run(&mut link, &image).expect("simulated link");
    let malformed = report.tile(TileCoord::new(2, 0)).expect("tile (2, 0)");
    assert_eq!(malformed.status, ReplyStatus::Malformed { declared: 200 });
    assert_eq!(malformed.detections, 0);
    // Only the trailing-noise tile survives on the top row.
    assert_eq!(report.detections.len(), 1);
}

#[test]
fn trailing_bytes_are_cleared_before_the_next_tile() {
    init_logging();
    let image = horizontal_line(64, 4);
    let dispatcher = TileDispatcher::new(params(DecodePolicy::Lenient)).expect("geometry");
    let mut link = SimulatedAccelerator::default();
    link.script_faults(vec![None, None, None, Some(ReplyFault::Trailing(vec![0xEE; 5]))]);

    let report = dispatcher.run(&mut link, &image).expect("simulated link");
    let next = report.tile(TileCoord::new(0, 1)).expect("tile (0, 1)");
    assert_eq!(next.stale_discarded, 5);
    assert_eq!(next.status, ReplyStatus::Ok { count: 0 });
}

#[test]
fn capacity_cap_drops_and_counts() {
    init_logging();
    let image = cross(64, 32, 32);
    let dispatcher = TileDispatcher::new(DispatchParams {
        max_detections: 3,
        ..params(DecodePolicy::Lenient)
    })
    .expect("geometry");
    let report = dispatcher
        .run(&mut SimulatedAccelerator::default(), &image)
        .expect("simulated link");
    assert_eq!(report.detections.len(), 3);
    assert!(report.dropped() > 0);
    assert_eq!(report.detections.len() + report.dropped(), 8);
}

#[test]
fn fixed_window_collects_a_delayed_reply() {
    init_logging();
    let image = horizontal_line(64, 4);
    let mut timing = LinkTiming::immediate();
    timing.reply_window_ms = 40;
    let dispatcher = TileDispatcher::new(DispatchParams {
        timing,
        reply_wait: ReplyWait::FixedWindow,
        ..Default::default()
    })
    .expect("geometry");
    let mut link = SimulatedAccelerator::new(SimulatedAcceleratorConfig {
        processing_delay_ms: 5,
        ..Default::default()
    });
    let report = dispatcher.run(&mut link, &image).expect("simulated link");
    assert!(report.summary.all_ok(), "summary: {:?}", report.summary);
    assert!(report.tiles.iter().all(|t| t.reply_ms >= 35.0));
}

#[test]
fn closed_stream_aborts_the_run_in_both_wait_modes() {
    init_logging();
    let image = horizontal_line(64, 4);
    for reply_wait in [ReplyWait::UntilComplete, ReplyWait::FixedWindow] {
        let mut timing = LinkTiming::immediate();
        timing.reply_window_ms = 40;
        let dispatcher = TileDispatcher::new(DispatchParams {
            timing,
            reply_wait,
            ..Default::default()
        })
        .expect("geometry");
        let mut link =
            StreamTransport::new(Cursor::new(Vec::new()), Vec::<u8>::new()).expect("spawn reader");
        let result = dispatcher.run(&mut link, &image);
        assert!(
            matches!(result, Err(DispatchError::Link(LinkError::Disconnected))),
            "{reply_wait:?}: {result:?}"
        );
    }
}
