//! Per-frame orchestration: warmup, the running loop, and guaranteed drain.
//!
//! The loop is single-threaded and cooperative: one frame is fully processed
//! (capture -> threshold -> detect -> allocate -> publish -> display) before
//! the next begins. Faults from capture, detection, or streaming are fatal
//! and never retried; draining (handle release plus the one-shot run
//! summary) happens on every exit path.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::detect::{Detection, ObjectDetector};
use crate::ingest::FrameSource;
use crate::publish::SlotPublisher;
use crate::slots::allocate;
use crate::stream::Streamer;
use crate::table::SharedTable;
use crate::threshold::ThresholdResolver;

/// Lifecycle of the frame loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Warmup,
    Running,
    Draining,
    Terminated,
}

/// Run summary, produced exactly once when the loop drains.
#[derive(Clone, Debug)]
pub struct LoopSummary {
    pub frames: u64,
    pub elapsed_seconds: f64,
    pub avg_fps: f64,
}

/// Frame-rate accounting for the end-of-run summary.
#[derive(Debug, Default)]
pub struct FpsTracker {
    started: Option<Instant>,
    elapsed: Option<Duration>,
    frames: u64,
}

impl FpsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.started = Some(Instant::now());
    }

    pub fn tick(&mut self) {
        self.frames += 1;
    }

    /// Freeze the elapsed clock. Idempotent; the first stop wins.
    pub fn stop(&mut self) {
        if self.elapsed.is_none() {
            if let Some(started) = self.started {
                self.elapsed = Some(started.elapsed());
            }
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn elapsed_seconds(&self) -> f64 {
        match (self.elapsed, self.started) {
            (Some(elapsed), _) => elapsed.as_secs_f64(),
            (None, Some(started)) => started.elapsed().as_secs_f64(),
            (None, None) => 0.0,
        }
    }

    pub fn fps(&self) -> f64 {
        let elapsed = self.elapsed_seconds();
        if elapsed > 0.0 {
            self.frames as f64 / elapsed
        } else {
            0.0
        }
    }
}

/// Drives the capture -> detect -> allocate -> publish -> display cycle.
pub struct FrameLoop<C, D, S, T>
where
    C: FrameSource,
    D: ObjectDetector,
    S: Streamer,
    T: SharedTable,
{
    camera: C,
    detector: D,
    streamer: S,
    table: T,
    publisher: SlotPublisher,
    resolver: ThresholdResolver,
    warmup: Duration,
    max_frames: Option<u64>,
    state: LoopState,
    fps: FpsTracker,
    summary: Option<LoopSummary>,
}

impl<C, D, S, T> FrameLoop<C, D, S, T>
where
    C: FrameSource,
    D: ObjectDetector,
    S: Streamer,
    T: SharedTable,
{
    pub fn new(
        camera: C,
        detector: D,
        streamer: S,
        table: T,
        publisher: SlotPublisher,
        resolver: ThresholdResolver,
        warmup: Duration,
    ) -> Self {
        Self {
            camera,
            detector,
            streamer,
            table,
            publisher,
            resolver,
            warmup,
            max_frames: None,
            state: LoopState::Warmup,
            fps: FpsTracker::new(),
            summary: None,
        }
    }

    /// Stop after this many frames, for bounded synthetic runs.
    pub fn with_max_frames(mut self, max_frames: Option<u64>) -> Self {
        self.max_frames = max_frames;
        self
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// The run summary, available once the loop has drained — on fault paths
    /// as well as clean exits.
    pub fn summary(&self) -> Option<LoopSummary> {
        self.summary.clone()
    }

    pub fn table(&self) -> &T {
        &self.table
    }

    pub fn camera(&self) -> &C {
        &self.camera
    }

    pub fn streamer(&self) -> &S {
        &self.streamer
    }

    /// Run to completion. Draining always executes, whatever way the running
    /// phase exits, so camera and streamer handles are released and the
    /// summary is produced exactly once.
    pub fn run(&mut self) -> Result<LoopSummary> {
        self.state = LoopState::Warmup;
        let result = self.warm_up_and_run();
        let summary = self.drain();
        self.state = LoopState::Terminated;
        result.map(|()| summary)
    }

    fn warm_up_and_run(&mut self) -> Result<()> {
        self.camera.open().context("open camera")?;
        self.resolver.seed(&mut self.table);
        if !self.warmup.is_zero() {
            log::info!("warming up camera for {:?}", self.warmup);
            std::thread::sleep(self.warmup);
        }

        self.state = LoopState::Running;
        self.fps.start();
        loop {
            if let Some(limit) = self.max_frames {
                if self.fps.frames() >= limit {
                    log::info!("frame limit {} reached", limit);
                    return Ok(());
                }
            }
            self.step()?;
            if self.streamer.exit_requested() {
                log::info!("exit requested by streamer");
                return Ok(());
            }
        }
    }

    fn step(&mut self) -> Result<()> {
        let frame = self.camera.next_frame().context("acquire frame")?;
        let threshold = self.resolver.resolve(&self.table);

        let inference_start = Instant::now();
        let detections = self
            .detector
            .detect(&frame, threshold)
            .context("run detection")?;
        let inference = inference_start.elapsed();

        let assignment = allocate(&detections, self.publisher.capacities());
        self.publisher.publish(&mut self.table, &assignment);

        let lines = overlay_lines(self.detector.model_id(), inference, &detections);
        self.streamer.send(&frame, &lines).context("stream frame")?;

        self.fps.tick();
        Ok(())
    }

    fn drain(&mut self) -> LoopSummary {
        self.state = LoopState::Draining;
        self.fps.stop();
        self.camera.close();
        self.streamer.close();
        let summary = LoopSummary {
            frames: self.fps.frames(),
            elapsed_seconds: self.fps.elapsed_seconds(),
            avg_fps: self.fps.fps(),
        };
        self.summary = Some(summary.clone());
        summary
    }
}

fn overlay_lines(model_id: &str, inference: Duration, detections: &[Detection]) -> Vec<String> {
    let mut lines = vec![
        format!("Model: {}", model_id),
        format!("Inference time: {:.3} s", inference.as_secs_f64()),
        "Objects:".to_string(),
    ];
    for detection in detections {
        lines.push(format!(
            "{}: {:.2}%",
            detection.label,
            detection.confidence * 100.0
        ));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::StubDetector;
    use crate::frame::Frame;
    use crate::ingest::{CameraConfig, CameraSource};
    use crate::slots::CapacityMap;
    use crate::stream::ScriptedStreamer;
    use crate::table::InMemoryTable;
    use crate::threshold::THRESHOLD_KEY;
    use anyhow::bail;

    fn stub_camera() -> CameraSource {
        CameraSource::new(CameraConfig {
            url: "stub://test".to_string(),
            target_fps: 30,
            width: 64,
            height: 48,
        })
        .unwrap()
    }

    fn frame_loop(
        camera: CameraSource,
        streamer: ScriptedStreamer,
    ) -> FrameLoop<CameraSource, StubDetector, ScriptedStreamer, InMemoryTable> {
        FrameLoop::new(
            camera,
            StubDetector::new(),
            streamer,
            InMemoryTable::new(),
            SlotPublisher::new(CapacityMap::default()),
            ThresholdResolver::default(),
            Duration::ZERO,
        )
    }

    #[test]
    fn runs_until_streamer_requests_exit() -> Result<()> {
        let mut pipeline = frame_loop(stub_camera(), ScriptedStreamer::exit_after(3));
        let summary = pipeline.run()?;

        assert_eq!(summary.frames, 3);
        assert_eq!(pipeline.state(), LoopState::Terminated);
        Ok(())
    }

    #[test]
    fn seeds_threshold_key_at_startup() -> Result<()> {
        let mut pipeline = frame_loop(stub_camera(), ScriptedStreamer::exit_after(1));
        pipeline.run()?;

        assert_eq!(
            pipeline.table().get_string(THRESHOLD_KEY).as_deref(),
            Some("0.5")
        );
        Ok(())
    }

    struct FailingCamera {
        frames_before_fault: u64,
        served: u64,
        closed: bool,
    }

    impl FrameSource for FailingCamera {
        fn open(&mut self) -> Result<()> {
            Ok(())
        }

        fn next_frame(&mut self) -> Result<Frame> {
            if self.served >= self.frames_before_fault {
                bail!("device disappeared");
            }
            self.served += 1;
            Ok(Frame::new(vec![0u8; 64 * 48 * 3], 64, 48, self.served))
        }

        fn close(&mut self) {
            self.closed = true;
        }
    }

    #[test]
    fn camera_fault_propagates_but_still_drains() {
        let camera = FailingCamera {
            frames_before_fault: 2,
            served: 0,
            closed: false,
        };
        let mut pipeline = FrameLoop::new(
            camera,
            StubDetector::new(),
            ScriptedStreamer::exit_after(u64::MAX),
            InMemoryTable::new(),
            SlotPublisher::new(CapacityMap::default()),
            ThresholdResolver::default(),
            Duration::ZERO,
        );

        let result = pipeline.run();
        assert!(result.is_err());

        // Draining still happened: handles released, summary produced once.
        assert_eq!(pipeline.state(), LoopState::Terminated);
        assert!(pipeline.camera().closed);
        assert!(pipeline.streamer().is_closed());
        let summary = pipeline.summary().expect("summary after fault");
        assert_eq!(summary.frames, 2);
    }

    #[test]
    fn frame_limit_bounds_the_run() -> Result<()> {
        let mut pipeline =
            frame_loop(stub_camera(), ScriptedStreamer::exit_after(u64::MAX)).with_max_frames(Some(5));
        let summary = pipeline.run()?;

        assert_eq!(summary.frames, 5);
        Ok(())
    }

    #[test]
    fn overlay_reports_model_and_percentages() {
        let detections = vec![Detection {
            label: "Ball".to_string(),
            center_x: 1.0,
            end_x: 2.0,
            end_y: 3.0,
            area: 4.0,
            confidence: 0.873,
        }];
        let lines = overlay_lines("stub/synthetic-ssd", Duration::from_millis(12), &detections);

        assert_eq!(lines[0], "Model: stub/synthetic-ssd");
        assert_eq!(lines[1], "Inference time: 0.012 s");
        assert_eq!(lines[2], "Objects:");
        assert_eq!(lines[3], "Ball: 87.30%");
    }
}
