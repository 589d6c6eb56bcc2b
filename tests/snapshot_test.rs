use std::path::{Path, PathBuf};

use outings2kml::convert;
use outings2kml::options::ConvertOptions;

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_fixture(path: &str) -> String {
    std::fs::read_to_string(fixtures().join(path)).unwrap()
}

/// Compare the generated KML against the expected snapshot file.
/// When `UPDATE_SNAPSHOTS=1` is set, write/overwrite the expected file instead.
fn assert_snapshot(actual: &str, expected_path: &str) {
    let path = fixtures().join("expected").join(expected_path);

    if matches!(std::env::var("UPDATE_SNAPSHOTS").as_deref(), Ok("1")) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, actual.as_bytes()).unwrap();
        eprintln!("Updated snapshot: {}", path.display());
        return;
    }

    let expected = std::fs::read_to_string(&path).unwrap_or_else(|_| {
        panic!(
            "Expected file not found: {}. Run with UPDATE_SNAPSHOTS=1 to generate.",
            path.display()
        )
    });

    assert_eq!(
        actual,
        expected,
        "Snapshot mismatch for {}.\nRun with UPDATE_SNAPSHOTS=1 to update.",
        path.display()
    );
}

#[test]
fn snapshot_catalog() {
    let opts = ConvertOptions {
        track_dir: fixtures().join("tracks"),
        ..Default::default()
    };
    let conversion = convert(&load_fixture("catalog.json"), &opts).unwrap();
    assert_snapshot(&conversion.kml, "catalog.kml");
}

#[test]
fn snapshot_is_stable() {
    let opts = ConvertOptions {
        track_dir: fixtures().join("tracks"),
        ..Default::default()
    };
    let catalog = load_fixture("catalog.json");
    let first = convert(&catalog, &opts).unwrap().kml;
    let second = convert(&catalog, &opts).unwrap().kml;
    assert_eq!(first, second);
}
