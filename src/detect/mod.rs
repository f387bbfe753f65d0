mod detector;
mod result;
mod stub;

pub use detector::ObjectDetector;
pub use result::Detection;
pub use stub::StubDetector;
