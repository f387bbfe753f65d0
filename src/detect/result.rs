/// One object detection for a single frame.
///
/// Geometry follows the upstream model's pixel conventions: `center_x` is
/// the horizontal center of the bounding box, `end_x`/`end_y` its far
/// corner, `area` the box area in square pixels. `confidence` is a 0..1
/// fraction; the publication protocol converts it to a 0-100 percentage.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    pub label: String,
    pub center_x: f64,
    pub end_x: f64,
    pub end_y: f64,
    pub area: f64,
    pub confidence: f64,
}
