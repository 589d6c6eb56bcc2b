use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueHint};
use tracing::error;
use tracing_subscriber::EnvFilter;

use outings2kml::error::Result;
use outings2kml::options::ConvertOptions;

#[derive(Parser, Debug)]
#[command(author, version, about = "Convert an outings catalog and its GPX tracks into a KML map overlay", long_about = None)]
struct Cli {
    /// JSON file with conversion options (absent keys keep their defaults)
    #[arg(long, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Catalog of outings (overrides the configured path)
    #[arg(long, value_hint = ValueHint::FilePath)]
    catalog: Option<PathBuf>,

    /// Directory holding the GPX tracks (overrides the configured path)
    #[arg(long, value_hint = ValueHint::DirPath)]
    tracks: Option<PathBuf>,

    /// KML file to write (overrides the configured path)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,

    /// Simplification tolerance in degrees
    #[arg(long)]
    tolerance: Option<f64>,
}

impl Cli {
    fn options(self) -> Result<ConvertOptions> {
        let mut opts = match &self.config {
            Some(path) => ConvertOptions::from_file(path)?,
            None => ConvertOptions::default(),
        };
        if let Some(catalog) = self.catalog {
            opts.catalog_path = catalog;
        }
        if let Some(tracks) = self.tracks {
            opts.track_dir = tracks;
        }
        if let Some(output) = self.output {
            opts.output_path = output;
        }
        if let Some(tolerance) = self.tolerance {
            opts.tolerance = tolerance;
        }
        Ok(opts)
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let result = Cli::parse()
        .options()
        .and_then(|opts| outings2kml::run(&opts));

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
