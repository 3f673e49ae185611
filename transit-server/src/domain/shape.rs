//! Shape polyline point.

/// One GPS point of a route's physical path.
///
/// Points belonging to a shape are only meaningful once sorted by
/// `sequence`; the loader sorts each shape's points after the full load.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapePoint {
    pub shape_id: String,
    pub lat: f64,
    pub lon: f64,
    pub sequence: u32,
}

impl ShapePoint {
    pub fn new(shape_id: impl Into<String>, lat: f64, lon: f64, sequence: u32) -> Self {
        Self {
            shape_id: shape_id.into(),
            lat,
            lon,
            sequence,
        }
    }
}
