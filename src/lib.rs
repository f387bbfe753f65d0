//! Vision-to-telemetry bridge.
//!
//! Reads frames from a camera, runs object detection at an operator-tunable
//! confidence threshold, and publishes per-object results into a shared
//! key-value table that a real-time robot controller polls once per control
//! cycle.
//!
//! # Publication contract
//!
//! Each detection category owns a fixed-capacity run of slots under
//! `VisionValues/`. After every frame, exactly the first `k` slots of a
//! category are active, where `k` is the frame's detection count capped at
//! capacity, with no gaps: the controller scans from slot 0 and stops at the
//! first inactive slot.
//!
//! # Module Structure
//!
//! - `ingest`: camera frame sources (`stub://` synthetic backend built in)
//! - `detect`: detector seam and stub backend
//! - `slots`: categories, capacities, per-frame slot allocation
//! - `publish`: the bounded-slot publication protocol
//! - `threshold`: live confidence threshold resolution
//! - `table`: shared key-value table seam
//! - `stream`: display/streaming seam
//! - `pipeline`: the per-frame loop driver
//! - `config`: daemon configuration (file + env)

pub mod config;
pub mod detect;
pub mod frame;
pub mod ingest;
pub mod pipeline;
pub mod publish;
pub mod slots;
pub mod stream;
pub mod table;
pub mod threshold;

pub use config::BridgeConfig;
pub use detect::{Detection, ObjectDetector, StubDetector};
pub use frame::Frame;
pub use ingest::{CameraConfig, CameraSource, CameraStats, FrameSource};
pub use pipeline::{FpsTracker, FrameLoop, LoopState, LoopSummary};
pub use publish::{slot_key, SlotPublisher, VISION_TABLE};
pub use slots::{allocate, Category, CapacityMap, SlotAssignment};
pub use stream::{ConsoleStreamer, ScriptedStreamer, Streamer};
pub use table::{InMemoryTable, SharedTable, WriteOp};
pub use threshold::{ThresholdResolver, DEFAULT_CONFIDENCE, THRESHOLD_KEY};
