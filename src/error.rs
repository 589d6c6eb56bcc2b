use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading a single GPX track file.
#[derive(Debug, Error)]
pub enum GpxError {
    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),
    #[error("Missing attribute '{attribute}' on <{element}>")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },
    #[error("Invalid value '{value}' for attribute '{attribute}' on <{element}>")]
    InvalidAttribute {
        element: &'static str,
        attribute: &'static str,
        value: String,
    },
    #[error("expected exactly 1 <trk>, found {0}")]
    TrackCount(usize),
    #[error("expected no <rte> elements, found {0}")]
    UnexpectedRoutes(usize),
    #[error("expected no <wpt> elements, found {0}")]
    UnexpectedWaypoints(usize),
    #[error("expected exactly 1 <trkseg>, found {0}")]
    SegmentCount(usize),
    #[error("a track needs at least 2 points, found {0}")]
    TooFewPoints(usize),
}

impl From<quick_xml::events::attributes::AttrError> for GpxError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        Self::XmlParse(e.into())
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed catalog: {0}")]
    CatalogParse(#[source] serde_json::Error),
    #[error("malformed configuration: {0}")]
    Config(#[source] serde_json::Error),
    #[error("{record}: {reason}")]
    InvalidRecord { record: String, reason: String },
    #[error("track file name '{file}': {reason}")]
    TrackFilename { file: String, reason: String },
    #[error("{record}: activity link '{id}' is already used by another outing")]
    DuplicateActivityLink { record: String, id: String },
    #[error("malformed track {}: {source}", path.display())]
    Track {
        path: PathBuf,
        #[source]
        source: GpxError,
    },
    #[error("failed to serialize document: {0}")]
    Write(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
