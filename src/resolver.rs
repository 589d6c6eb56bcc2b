//! Turns catalog records into validated outings.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::catalog::OutingRecord;
use crate::error::{Error, Result};
use crate::filename::resolve_track_names;
use crate::gpx_types::GpxPoint;
use crate::style::{ActivityType, StyleRegistry};

static DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern is valid"));

/// A fully resolved outing, ready to be drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct Outing {
    pub title: String,
    pub date: NaiveDate,
    pub activity: ActivityType,
    pub points: Vec<GpxPoint>,
    pub tracks: Vec<PathBuf>,
    pub photo_link: Option<String>,
    pub activity_links: Vec<String>,
    pub note: Option<String>,
}

/// Resolves records against the style registry and the track directory.
pub struct Resolver<'a> {
    registry: &'a StyleRegistry,
    track_dir: &'a Path,
}

impl<'a> Resolver<'a> {
    pub fn new(registry: &'a StyleRegistry, track_dir: &'a Path) -> Self {
        Self {
            registry,
            track_dir,
        }
    }

    /// Resolve the record at `index` (0-based catalog position).
    ///
    /// Explicit `date`/`type`/`title` win over the values encoded in the
    /// first track file name.
    pub fn resolve(&self, index: usize, record: &OutingRecord) -> Result<Outing> {
        let file_names: Vec<&str> = record.tracks.iter().map(String::as_str).collect();
        let from_file = resolve_track_names(&file_names, self.registry).map_err(|e| {
            Error::InvalidRecord {
                record: record_label(index, record.title.as_deref()),
                reason: e.to_string(),
            }
        })?;

        let title = record
            .title
            .clone()
            .or_else(|| from_file.as_ref().map(|n| n.title.clone()))
            .unwrap_or_default();
        let label = record_label(index, Some(&title).filter(|t| !t.is_empty()).map(String::as_str));
        let invalid = |reason: String| Error::InvalidRecord {
            record: label.clone(),
            reason,
        };

        if title.trim().is_empty() {
            return Err(invalid("missing or empty title".to_string()));
        }

        let activity = match &record.activity_type {
            Some(key) => self
                .registry
                .lookup(key)
                .map(|style| style.activity)
                .ok_or_else(|| {
                    invalid(format!(
                        "unknown type '{key}' (known: {})",
                        self.registry.keys().join(", ")
                    ))
                })?,
            None => from_file
                .as_ref()
                .map(|n| n.activity)
                .ok_or_else(|| invalid("missing type".to_string()))?,
        };

        let date_str = record
            .date
            .clone()
            .or_else(|| from_file.as_ref().map(|n| n.date.clone()))
            .ok_or_else(|| invalid("missing date".to_string()))?;
        let date = parse_date(&date_str).ok_or_else(|| {
            invalid(format!("date '{date_str}' is not a valid YYYY-MM-DD date"))
        })?;

        if record.points.is_empty() && record.tracks.is_empty() {
            return Err(invalid("an outing needs at least one point or track".to_string()));
        }

        let points = record
            .points
            .iter()
            .map(|p| parse_point(p).map_err(&invalid))
            .collect::<Result<Vec<_>>>()?;

        let tracks = record
            .tracks
            .iter()
            .map(|t| self.track_dir.join(t))
            .collect();

        debug!(
            record = %label,
            %activity,
            points = points.len(),
            tracks = record.tracks.len(),
            "resolved outing"
        );

        Ok(Outing {
            title,
            date,
            activity,
            points,
            tracks,
            photo_link: record.photo_link.clone(),
            activity_links: record.activity_links.iter().map(ToString::to_string).collect(),
            note: record.note.clone(),
        })
    }
}

/// `outing #3 ('Piz Buin')`, or `outing #3` while the title is unknown.
pub fn record_label(index: usize, title: Option<&str>) -> String {
    match title {
        Some(t) => format!("outing #{} ('{t}')", index + 1),
        None => format!("outing #{}", index + 1),
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    if !DATE.is_match(s) {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// A point must be exactly `{"lat": <float>, "long": <float>}`.
fn parse_point(value: &JsonValue) -> std::result::Result<GpxPoint, String> {
    let shape_error = || format!("every point needs exactly float 'lat' and 'long': {value}");
    let obj = value.as_object().ok_or_else(shape_error)?;
    if obj.len() != 2 {
        return Err(shape_error());
    }
    let field = |key: &str| {
        obj.get(key)
            .filter(|v| v.is_f64())
            .and_then(JsonValue::as_f64)
            .ok_or_else(shape_error)
    };
    Ok(GpxPoint::new(field("lat")?, field("long")?))
}

/// Uniqueness checks across the whole catalog.
///
/// Grows monotonically while outings are assembled. Duplicate titles and
/// dates are only noticed; a reused activity link is fatal.
#[derive(Debug, Default)]
pub struct CatalogValidator {
    titles: HashSet<String>,
    dates: HashSet<NaiveDate>,
    activity_links: HashSet<String>,
    notices: Vec<String>,
}

impl CatalogValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, record: &str, outing: &Outing) -> Result<()> {
        for id in &outing.activity_links {
            if !self.activity_links.insert(id.clone()) {
                return Err(Error::DuplicateActivityLink {
                    record: record.to_string(),
                    id: id.clone(),
                });
            }
        }

        if !self.titles.insert(outing.title.clone()) {
            self.notice(format!("{record}: duplicate title '{}'", outing.title));
        }
        if !self.dates.insert(outing.date) {
            self.notice(format!("{record}: duplicate date {}", outing.date));
        }
        Ok(())
    }

    /// Duplicate title/date notices raised so far, in catalog order.
    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    fn notice(&mut self, message: String) {
        warn!("{message}");
        self.notices.push(message);
    }
}
