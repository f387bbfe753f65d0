/// One captured video frame (RGB24, row-major, no padding).
///
/// Frames are produced by an ingest source, handed to the detector and the
/// streamer within the same loop iteration, and never retained across frames.
#[derive(Clone, Debug)]
pub struct Frame {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Monotonic capture sequence number, starting at 1.
    pub seq: u64,
}

impl Frame {
    pub fn new(pixels: Vec<u8>, width: u32, height: u32, seq: u64) -> Self {
        Self {
            pixels,
            width,
            height,
            seq,
        }
    }
}
