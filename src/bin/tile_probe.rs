use hough_tiles::config::probe::{self, ProbeConfig};
use hough_tiles::image::io::write_json_file;
use hough_tiles::patterns::TestPattern;
use hough_tiles::protocol::{
    decode_reply, encode_echo_frame, expected_reply_len, match_ratio, transmit_frame,
    transmit_paced, EchoReceiver, PackedBitmap, ProtocolVariant, ReplyStatus,
};
use hough_tiles::transport::Transport;
use hough_tiles::types::LocalDetection;
use log::{info, warn};
use serde::Serialize;
use std::env;
use std::path::Path;
use std::thread;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = probe::load_config(Path::new(&config_path))?;
    let mut link = config.link.connect_with_rx_capacity(config.min_rx_capacity())?;
    info!(
        "probing {} over {:?}",
        config.link.describe(),
        config.variant
    );

    let mut results = Vec::new();
    for pattern in config.selected_patterns() {
        let result = match config.variant {
            ProtocolVariant::Headerless => probe_headerless(link.as_mut(), &config, pattern)?,
            ProtocolVariant::EchoSynced => probe_echo(link.as_mut(), &config, pattern)?,
        };
        print_result(&result);
        results.push(result);
        thread::sleep(config.timing.inter_tile_settle());
    }

    let passed = results.iter().filter(|r| r.passed).count();
    println!("\n{passed}/{} patterns OK", results.len());

    if let Some(path) = &config.json_out {
        write_json_file(path, &results)?;
        println!("JSON report written to {}", path.display());
    }
    Ok(())
}

fn probe_headerless(
    link: &mut dyn Transport,
    config: &ProbeConfig,
    pattern: TestPattern,
) -> Result<ProbeResult, String> {
    let tile = pattern.render(config.tile_edge);
    let bitmap = PackedBitmap::pack(&tile);
    let policy = config.decode_policy;

    link.rx().clear();
    transmit_frame(link, &bitmap, &config.frame, &config.timing).map_err(|e| e.to_string())?;
    let raw = link.rx().collect(
        config.reply_wait,
        config.timing.reply_window(),
        |bytes: &[u8]| bytes.first().map(|&n| expected_reply_len(n, policy)),
    );
    let reply = decode_reply(&raw.bytes, policy);
    Ok(ProbeResult {
        pattern,
        passed: reply.status.is_ok() && !reply.detections.is_empty(),
        status: Some(reply.status),
        detections: reply.detections,
        raw: raw.bytes,
        match_ratio: None,
        elapsed_ms: raw.elapsed.as_secs_f64() * 1000.0,
    })
}

fn probe_echo(
    link: &mut dyn Transport,
    config: &ProbeConfig,
    pattern: TestPattern,
) -> Result<ProbeResult, String> {
    let payload = echo_payload(pattern, config.tile_edge, config.echo_payload_len);
    let frame = encode_echo_frame(config.frame.header, &payload);

    link.rx().clear();
    transmit_paced(link, &frame, &config.timing).map_err(|e| e.to_string())?;

    let header = config.frame.header;
    let expected = payload.len();
    let raw = link.rx().collect(
        config.reply_wait,
        config.timing.reply_window(),
        |bytes: &[u8]| {
            let mut rx = EchoReceiver::with_header(header, expected);
            rx.feed_all(bytes).map(|_| bytes.len())
        },
    );

    let mut receiver = EchoReceiver::with_header(header, expected);
    let echoed = match receiver.feed_all(&raw.bytes) {
        Some(bytes) => bytes,
        None => {
            warn!(
                "{}: echo incomplete, state={:?} collected={}",
                pattern.name(),
                receiver.state(),
                receiver.collected().len()
            );
            let partial = receiver.collected().to_vec();
            receiver.reset();
            partial
        }
    };
    let ratio = match_ratio(&payload, &echoed);
    Ok(ProbeResult {
        pattern,
        passed: ratio >= 1.0,
        status: None,
        detections: Vec::new(),
        raw: raw.bytes,
        match_ratio: Some(ratio),
        elapsed_ms: raw.elapsed.as_secs_f64() * 1000.0,
    })
}

/// Unpacked pixel bytes of the pattern (`0xFF` set, `0x00` clear), cycled
/// or cut to `len`.
fn echo_payload(pattern: TestPattern, edge: usize, len: usize) -> Vec<u8> {
    let tile = pattern.render(edge);
    tile.data
        .iter()
        .map(|&px| if px { 0xFF } else { 0x00 })
        .cycle()
        .take(len)
        .collect()
}

fn print_result(result: &ProbeResult) {
    let mark = if result.passed { "OK" } else { "FAIL" };
    println!(
        "[{mark}] {:<15} {:.1} ms",
        result.pattern.name(),
        result.elapsed_ms
    );
    if let Some(status) = result.status {
        println!("    status: {status:?}");
    }
    if let Some(ratio) = result.match_ratio {
        println!("    echo match: {:.1}%", ratio * 100.0);
    }
    for d in &result.detections {
        println!(
            "    rho={:3} theta={:3} votes={:3}",
            d.rho, d.theta_deg, d.votes
        );
    }
}

fn usage() -> String {
    "Usage: tile_probe <config.json>".to_string()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProbeResult {
    pattern: TestPattern,
    passed: bool,
    status: Option<ReplyStatus>,
    detections: Vec<LocalDetection>,
    raw: Vec<u8>,
    match_ratio: Option<f32>,
    elapsed_ms: f64,
}
