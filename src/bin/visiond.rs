//! visiond - vision-to-telemetry bridge daemon
//!
//! This daemon:
//! 1. Loads configuration (JSON file + env overrides)
//! 2. Seeds the dashboard confidence threshold key
//! 3. Runs the frame loop: capture -> detect -> allocate -> publish -> stream
//! 4. Prints elapsed time and average FPS on exit

use std::path::PathBuf;
use std::sync::atomic::Ordering;

use anyhow::Result;
use clap::Parser;

use vision_bridge::{
    BridgeConfig, CameraSource, ConsoleStreamer, FrameLoop, InMemoryTable, ObjectDetector,
    SlotPublisher, StubDetector, ThresholdResolver,
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Config file path (falls back to the VISION_CONFIG env var).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Stop after this many frames (useful with stub:// sources).
    #[arg(long)]
    frames: Option<u64>,
    /// Camera URL override.
    #[arg(long)]
    camera: Option<String>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut cfg = BridgeConfig::load_from(args.config.as_deref())?;
    if let Some(url) = args.camera {
        cfg.camera.url = url;
    }

    let camera = CameraSource::new(cfg.camera.clone())?;
    let detector = StubDetector::new();
    let streamer = ConsoleStreamer::new();
    let exit_flag = streamer.exit_flag();
    ctrlc::set_handler(move || exit_flag.store(true, Ordering::Relaxed))?;

    let table = InMemoryTable::new();
    let publisher = SlotPublisher::new(cfg.capacities.clone())
        .with_reset_all_trailing_slots(cfg.reset_all_trailing_slots);
    let resolver = ThresholdResolver::new(cfg.default_confidence);

    log::info!("loaded model: {}", detector.model_id());
    log::info!(
        "visiond running: camera={} slots=Hatch:{} Ball:{} Tape:{}",
        cfg.camera.url,
        cfg.capacities.capacity(vision_bridge::Category::Hatch),
        cfg.capacities.capacity(vision_bridge::Category::Ball),
        cfg.capacities.capacity(vision_bridge::Category::Tape),
    );

    let mut frame_loop = FrameLoop::new(
        camera,
        detector,
        streamer,
        table,
        publisher,
        resolver,
        cfg.warmup,
    )
    .with_max_frames(args.frames);

    let run_result = frame_loop.run();

    // The summary is produced by the drain phase on fault paths too.
    if let Some(summary) = frame_loop.summary() {
        println!("elapsed time: {:.2}", summary.elapsed_seconds);
        println!("approx. FPS: {:.2}", summary.avg_fps);
    }
    println!("Program Ending");

    run_result.map(|_| ())
}
