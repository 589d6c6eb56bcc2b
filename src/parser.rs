use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::debug;

use crate::error::{Error, GpxError};
use crate::gpx_types::*;
use crate::options::SegmentPolicy;

type Result<T> = std::result::Result<T, GpxError>;

/// Parse a GPX XML string into GpxData.
///
/// Only structure and coordinates are kept; metadata, elevation, time and
/// extensions are skipped.
pub fn parse_gpx(xml: &str) -> Result<GpxData> {
    let mut reader = Reader::from_str(xml);
    let mut data = GpxData::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"wpt" => data.waypoints.push(parse_point(&e, &mut reader)?),
                b"rte" => {
                    reader.read_to_end(e.name())?;
                    data.route_count += 1;
                }
                b"trk" => data.tracks.push(parse_track(&mut reader)?),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"wpt" => data.waypoints.push(parse_lat_lon(&e)?),
                b"rte" => data.route_count += 1,
                b"trk" => data.tracks.push(GpxTrack::default()),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(GpxError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(data)
}

/// Extract the drawable points of the file's single track.
///
/// The file must hold exactly one `<trk>` and no `<rte>` or `<wpt>`. Under
/// [`SegmentPolicy::Single`] the track must have exactly one `<trkseg>`;
/// under [`SegmentPolicy::Concatenate`] all segments are joined in file order.
/// The result always has at least two points.
pub fn track_points(data: GpxData, policy: SegmentPolicy) -> Result<Vec<GpxPoint>> {
    if data.tracks.len() != 1 {
        return Err(GpxError::TrackCount(data.tracks.len()));
    }
    if data.route_count > 0 {
        return Err(GpxError::UnexpectedRoutes(data.route_count));
    }
    if !data.waypoints.is_empty() {
        return Err(GpxError::UnexpectedWaypoints(data.waypoints.len()));
    }

    let track = data.tracks.into_iter().next().unwrap_or_default();
    if policy == SegmentPolicy::Single && track.segments.len() != 1 {
        return Err(GpxError::SegmentCount(track.segments.len()));
    }

    let points: Vec<GpxPoint> = track
        .segments
        .into_iter()
        .flat_map(|seg| seg.points)
        .collect();
    if points.len() < 2 {
        return Err(GpxError::TooFewPoints(points.len()));
    }
    Ok(points)
}

/// Read a GPX file and return its track points.
///
/// The whole file is read and closed before parsing starts.
pub fn read_track(path: &Path, policy: SegmentPolicy) -> crate::error::Result<Vec<GpxPoint>> {
    let xml = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let points = parse_gpx(&xml)
        .and_then(|data| track_points(data, policy))
        .map_err(|source| Error::Track {
            path: path.to_path_buf(),
            source,
        })?;
    debug!(path = %path.display(), points = points.len(), "read track");
    Ok(points)
}

/// Parse lat/lon attributes from a point element's start tag.
fn parse_lat_lon(e: &BytesStart<'_>) -> Result<GpxPoint> {
    let element = point_element_name(e);
    let mut lat: Option<f64> = None;
    let mut lon: Option<f64> = None;

    for attr_result in e.attributes() {
        let attr = attr_result?;
        let val = std::str::from_utf8(&attr.value).unwrap_or_default();
        let parse = |attribute: &'static str| {
            val.trim()
                .parse::<f64>()
                .map_err(|_| GpxError::InvalidAttribute {
                    element,
                    attribute,
                    value: val.to_string(),
                })
        };
        match attr.key.local_name().as_ref() {
            b"lat" => lat = Some(parse("lat")?),
            b"lon" => lon = Some(parse("lon")?),
            _ => {}
        }
    }

    let lat = lat.ok_or(GpxError::MissingAttribute {
        element,
        attribute: "lat",
    })?;
    let lon = lon.ok_or(GpxError::MissingAttribute {
        element,
        attribute: "lon",
    })?;

    Ok(GpxPoint::new(lat, lon))
}

fn point_element_name(e: &BytesStart<'_>) -> &'static str {
    match e.local_name().as_ref() {
        b"wpt" => "wpt",
        _ => "trkpt",
    }
}

/// Parse a point element (wpt, trkpt), skipping its children.
/// Called after receiving Event::Start for the point element.
fn parse_point<'a>(start: &BytesStart<'a>, reader: &mut Reader<&'a [u8]>) -> Result<GpxPoint> {
    let point = parse_lat_lon(start)?;
    reader.read_to_end(start.name())?;
    Ok(point)
}

/// Parse a <trk> element.
fn parse_track<'a>(reader: &mut Reader<&'a [u8]>) -> Result<GpxTrack> {
    let mut track = GpxTrack::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"trkseg" => track.segments.push(parse_segment(reader)?),
                _ => {
                    reader.read_to_end(e.name())?;
                }
            },
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"trkseg" {
                    track.segments.push(GpxSegment::default());
                }
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"trk" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(GpxError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(track)
}

/// Parse a <trkseg> element.
fn parse_segment<'a>(reader: &mut Reader<&'a [u8]>) -> Result<GpxSegment> {
    let mut segment = GpxSegment::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"trkpt" => segment.points.push(parse_point(&e, reader)?),
                _ => {
                    reader.read_to_end(e.name())?;
                }
            },
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"trkpt" {
                    segment.points.push(parse_lat_lon(&e)?);
                }
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"trkseg" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(GpxError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(segment)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SINGLE_SEGMENT: &str = r#"<?xml version="1.0"?>
<gpx xmlns="http://www.topografix.com/GPX/1/1" version="1.1" creator="test">
  <trk>
    <name>Morning Run</name>
    <trkseg>
      <trkpt lat="46.0" lon="7.0"><ele>1600.0</ele></trkpt>
      <trkpt lat="46.001" lon="7.001"><ele>1610.0</ele></trkpt>
      <trkpt lat="46.002" lon="7.002"/>
    </trkseg>
  </trk>
</gpx>"#;

    const TWO_SEGMENTS: &str = r#"<?xml version="1.0"?>
<gpx version="1.1">
  <trk>
    <trkseg>
      <trkpt lat="35.0" lon="139.0"/>
      <trkpt lat="35.001" lon="139.001"/>
    </trkseg>
    <trkseg>
      <trkpt lat="36.0" lon="140.0"/>
      <trkpt lat="36.001" lon="140.001"/>
    </trkseg>
  </trk>
</gpx>"#;

    #[test]
    fn test_simple_track() {
        let data = parse_gpx(SINGLE_SEGMENT).unwrap();
        assert_eq!(data.tracks.len(), 1);
        assert_eq!(data.tracks[0].segments.len(), 1);
        assert_eq!(data.tracks[0].segments[0].points.len(), 3);
        let pt = data.tracks[0].segments[0].points[1];
        assert!((pt.lat - 46.001).abs() < 1e-10);
        assert!((pt.lon - 7.001).abs() < 1e-10);
    }

    #[test]
    fn test_single_segment_points() {
        let data = parse_gpx(SINGLE_SEGMENT).unwrap();
        let points = track_points(data, SegmentPolicy::Single).unwrap();
        assert_eq!(points.len(), 3);
        assert!((points[0].lat - 46.0).abs() < 1e-10);
        assert!((points[2].lon - 7.002).abs() < 1e-10);
    }

    #[test]
    fn test_multi_segment_rejected_when_single() {
        let data = parse_gpx(TWO_SEGMENTS).unwrap();
        let err = track_points(data, SegmentPolicy::Single).unwrap_err();
        assert!(matches!(err, GpxError::SegmentCount(2)));
    }

    #[test]
    fn test_multi_segment_concatenated_in_order() {
        let data = parse_gpx(TWO_SEGMENTS).unwrap();
        let points = track_points(data, SegmentPolicy::Concatenate).unwrap();
        let lats: Vec<f64> = points.iter().map(|p| p.lat).collect();
        assert_eq!(lats, vec![35.0, 35.001, 36.0, 36.001]);
    }

    #[test]
    fn test_no_track_rejected() {
        let xml = r#"<?xml version="1.0"?><gpx version="1.1"></gpx>"#;
        let err = track_points(parse_gpx(xml).unwrap(), SegmentPolicy::Single).unwrap_err();
        assert!(matches!(err, GpxError::TrackCount(0)));
    }

    #[test]
    fn test_two_tracks_rejected() {
        let xml = r#"<?xml version="1.0"?>
<gpx version="1.1">
  <trk><trkseg><trkpt lat="35.0" lon="139.0"/></trkseg></trk>
  <trk><trkseg><trkpt lat="36.0" lon="140.0"/></trkseg></trk>
</gpx>"#;
        let err = track_points(parse_gpx(xml).unwrap(), SegmentPolicy::Concatenate).unwrap_err();
        assert!(matches!(err, GpxError::TrackCount(2)));
    }

    #[test]
    fn test_route_rejected() {
        let xml = r#"<?xml version="1.0"?>
<gpx version="1.1">
  <rte>
    <name>Test Route</name>
    <rtept lat="35.0" lon="139.0"/>
    <rtept lat="36.0" lon="140.0"/>
  </rte>
  <trk><trkseg><trkpt lat="35.0" lon="139.0"/></trkseg></trk>
</gpx>"#;
        let data = parse_gpx(xml).unwrap();
        assert_eq!(data.route_count, 1);
        let err = track_points(data, SegmentPolicy::Single).unwrap_err();
        assert!(matches!(err, GpxError::UnexpectedRoutes(1)));
    }

    #[test]
    fn test_route_contents_skipped() {
        let xml = r#"<?xml version="1.0"?>
<gpx version="1.1">
  <rte><rtept lon="139.0"><name>no lat</name></rtept></rte>
  <rte/>
  <trk><trkseg><trkpt lat="35.0" lon="139.0"/><trkpt lat="35.1" lon="139.1"/></trkseg></trk>
</gpx>"#;
        let data = parse_gpx(xml).unwrap();
        assert_eq!(data.route_count, 2);
        assert_eq!(data.tracks.len(), 1);
        let err = track_points(data, SegmentPolicy::Single).unwrap_err();
        assert!(matches!(err, GpxError::UnexpectedRoutes(2)));
    }

    #[test]
    fn test_waypoint_rejected() {
        let xml = r#"<?xml version="1.0"?>
<gpx version="1.1">
  <wpt lat="35.6762" lon="139.6503"><name>Tokyo</name></wpt>
  <trk><trkseg><trkpt lat="35.0" lon="139.0"/></trkseg></trk>
</gpx>"#;
        let err = track_points(parse_gpx(xml).unwrap(), SegmentPolicy::Single).unwrap_err();
        assert!(matches!(err, GpxError::UnexpectedWaypoints(1)));
    }

    #[test]
    fn test_single_point_track_rejected() {
        let xml = r#"<?xml version="1.0"?>
<gpx version="1.1">
  <trk><trkseg><trkpt lat="35.0" lon="139.0"/></trkseg></trk>
</gpx>"#;
        let err = track_points(parse_gpx(xml).unwrap(), SegmentPolicy::Single).unwrap_err();
        assert!(matches!(err, GpxError::TooFewPoints(1)));
    }

    #[test]
    fn test_missing_lat_rejected() {
        let xml = r#"<?xml version="1.0"?>
<gpx version="1.1">
  <trk><trkseg><trkpt lon="139.0"/></trkseg></trk>
</gpx>"#;
        let err = parse_gpx(xml).unwrap_err();
        assert!(matches!(
            err,
            GpxError::MissingAttribute {
                element: "trkpt",
                attribute: "lat"
            }
        ));
    }

    #[test]
    fn test_invalid_lon_rejected() {
        let xml = r#"<?xml version="1.0"?>
<gpx version="1.1">
  <trk><trkseg><trkpt lat="35.0" lon="east"></trkpt></trkseg></trk>
</gpx>"#;
        match parse_gpx(xml).unwrap_err() {
            GpxError::InvalidAttribute {
                attribute, value, ..
            } => {
                assert_eq!(attribute, "lon");
                assert_eq!(value, "east");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_extensions_skipped() {
        let xml = r#"<?xml version="1.0"?>
<gpx version="1.1">
  <trk>
    <trkseg>
      <trkpt lat="35.0" lon="139.0">
        <extensions>
          <gpxtpx:TrackPointExtension xmlns:gpxtpx="http://www.garmin.com/xmlschemas/TrackPointExtension/v1">
            <gpxtpx:hr>150</gpxtpx:hr>
          </gpxtpx:TrackPointExtension>
        </extensions>
      </trkpt>
      <trkpt lat="35.001" lon="139.001"><speed>5.5</speed></trkpt>
    </trkseg>
  </trk>
</gpx>"#;
        let points = track_points(parse_gpx(xml).unwrap(), SegmentPolicy::Single).unwrap();
        assert_eq!(points.len(), 2);
    }

    #[test]
    fn test_malformed_xml() {
        let xml = r#"<?xml version="1.0"?><gpx><trk><trkseg></trk></gpx>"#;
        assert!(matches!(parse_gpx(xml), Err(GpxError::XmlParse(_))));
    }
}
