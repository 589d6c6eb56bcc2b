pub mod catalog;
pub mod converter;
pub mod error;
pub mod filename;
pub mod gpx_types;
pub mod kml;
pub mod options;
pub mod parser;
pub mod resolver;
pub mod simplify;
pub mod style;

use std::path::Path;

use tracing::{debug, info};

use crate::catalog::OutingRecord;
use crate::converter::Assembler;
use crate::error::{Error, Result};
use crate::gpx_types::GpxPoint;
use crate::options::ConvertOptions;
use crate::resolver::{CatalogValidator, Resolver, record_label};
use crate::style::StyleRegistry;

/// Outcome of a successful conversion.
#[derive(Debug)]
pub struct Conversion {
    /// The complete KML document.
    pub kml: String,
    /// Duplicate title/date notices, in catalog order.
    pub notices: Vec<String>,
    pub placemarks: usize,
    /// Track points read from GPX files, before simplification.
    pub track_points_read: usize,
    /// Track points left after simplification.
    pub track_points_kept: usize,
}

/// Convert catalog records to a KML document, reading tracks from
/// `opts.track_dir`. Nothing is written; any failure aborts the whole run.
pub fn convert_records(records: &[OutingRecord], opts: &ConvertOptions) -> Result<Conversion> {
    let registry = StyleRegistry::new(opts.line_width, opts.icon_size, opts.opacity);
    let resolver = Resolver::new(&registry, &opts.track_dir);
    let assembler = Assembler::new(opts, &registry);
    let mut validator = CatalogValidator::new();

    let mut placemarks = Vec::with_capacity(records.len());
    let mut track_points_read = 0;
    let mut track_points_kept = 0;

    for (index, record) in records.iter().enumerate() {
        let outing = resolver.resolve(index, record)?;
        let label = record_label(index, Some(outing.title.as_str()));
        validator.observe(&label, &outing)?;

        let mut tracks: Vec<Vec<GpxPoint>> = Vec::with_capacity(outing.tracks.len());
        for path in &outing.tracks {
            let points = parser::read_track(path, opts.segment_policy)?;
            let simplified = simplify::simplify(&points, opts.tolerance);
            debug!(
                path = %path.display(),
                before = points.len(),
                after = simplified.len(),
                "simplified track"
            );
            track_points_read += points.len();
            track_points_kept += simplified.len();
            tracks.push(simplified);
        }

        let placemark = assembler
            .placemark(&outing, &tracks)
            .map_err(|e| match e {
                Error::InvalidRecord { reason, .. } => Error::InvalidRecord {
                    record: label.clone(),
                    reason,
                },
                other => other,
            })?;
        placemarks.push(placemark);
    }

    let kml = kml::to_xml_string(&assembler.document(placemarks))?;
    Ok(Conversion {
        kml,
        notices: validator.notices().to_vec(),
        placemarks: records.len(),
        track_points_read,
        track_points_kept,
    })
}

/// Parse a catalog JSON string and convert it.
pub fn convert(catalog_json: &str, opts: &ConvertOptions) -> Result<Conversion> {
    let records = catalog::parse_catalog(catalog_json)?;
    convert_records(&records, opts)
}

/// Read the catalog, convert it and write the document to
/// `opts.output_path`. The output file is only touched on success.
pub fn run(opts: &ConvertOptions) -> Result<Conversion> {
    let records = catalog::read_catalog(&opts.catalog_path)?;
    info!(
        catalog = %opts.catalog_path.display(),
        outings = records.len(),
        "loaded catalog"
    );

    let conversion = convert_records(&records, opts)?;
    write_output(&opts.output_path, &conversion.kml)?;

    info!(
        output = %opts.output_path.display(),
        placemarks = conversion.placemarks,
        track_points_read = conversion.track_points_read,
        track_points_kept = conversion.track_points_kept,
        notices = conversion.notices.len(),
        "wrote document"
    );
    Ok(conversion)
}

fn write_output(path: &Path, kml: &str) -> Result<()> {
    std::fs::write(path, kml).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}
