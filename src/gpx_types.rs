/// Parsed GPX data: every waypoint and track in file order.
///
/// Routes are only counted; their contents are skipped.
#[derive(Debug, Default)]
pub struct GpxData {
    pub waypoints: Vec<GpxPoint>,
    pub route_count: usize,
    pub tracks: Vec<GpxTrack>,
}

/// A single geographic point (wpt, trkpt, or an explicit catalog point).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpxPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GpxPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// A GPX track (<trk>).
#[derive(Debug, Default)]
pub struct GpxTrack {
    pub segments: Vec<GpxSegment>,
}

/// A GPX track segment (<trkseg>).
#[derive(Debug, Default)]
pub struct GpxSegment {
    pub points: Vec<GpxPoint>,
}
