use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Settings for one catalog-to-KML run.
///
/// Every field has a default, so an empty JSON object (or no config file at
/// all) reproduces the fixed-path invocation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ConvertOptions {
    /// Document `<name>` (default: "Outings")
    pub title: String,

    /// Catalog of outings, a JSON array (default: `outings.json`)
    pub catalog_path: PathBuf,

    /// Directory track file names are resolved against (default: `tracks`)
    pub track_dir: PathBuf,

    /// KML document to write (default: `outings.kml`)
    pub output_path: PathBuf,

    /// Curve simplification tolerance, in degrees (default: 0.00001)
    pub tolerance: f64,

    /// How multi-segment tracks are handled (default: single)
    pub segment_policy: SegmentPolicy,

    /// Prefix for an outing's `photoLink`
    pub photo_base_url: String,

    /// Prefix for each of an outing's `activityLinks`
    pub activity_base_url: String,

    /// Path width in pixels (default: 8)
    pub line_width: u32,

    /// Marker icon edge length in pixels (default: 40)
    pub icon_size: u32,

    /// Opacity applied to every style color (default: 0.8)
    pub opacity: f64,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            title: "Outings".to_string(),
            catalog_path: PathBuf::from("outings.json"),
            track_dir: PathBuf::from("tracks"),
            output_path: PathBuf::from("outings.kml"),
            tolerance: 0.00001,
            segment_policy: SegmentPolicy::Single,
            photo_base_url: "https://photos.app.goo.gl/".to_string(),
            activity_base_url: "https://www.strava.com/activities/".to_string(),
            line_width: 8,
            icon_size: 40,
            opacity: 0.8,
        }
    }
}

impl ConvertOptions {
    /// Load options from a JSON file; absent keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(Error::Config)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentPolicy {
    /// A track must have exactly one `<trkseg>`.
    #[default]
    Single,
    /// Points of all segments are joined in file order.
    Concatenate,
}
