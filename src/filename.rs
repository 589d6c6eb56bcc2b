//! Track file name grammar: `DATE__TYPE__TITLE[__N].ext`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};
use crate::style::{ActivityType, StyleRegistry};

static TRACK_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<date>\d{4}-\d{2}-\d{2})__(?P<type>[A-Za-z]+)__(?P<title>.+?)(?:__(?P<index>\d+))?\.(?P<ext>[A-Za-z0-9]+)$",
    )
    .expect("track name pattern is valid")
});

/// Fields encoded in a track file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackName {
    pub date: String,
    pub activity: ActivityType,
    /// Display title, underscores already replaced by spaces.
    pub title: String,
    /// 1-based part number of a multi-file outing.
    pub index: Option<u32>,
}

impl TrackName {
    /// Parse a bare file name (no directories) against the grammar.
    pub fn parse(file_name: &str, registry: &StyleRegistry) -> Result<Self> {
        let invalid = |reason: String| Error::TrackFilename {
            file: file_name.to_string(),
            reason,
        };

        let caps = TRACK_NAME.captures(file_name).ok_or_else(|| {
            invalid("expected DATE__TYPE__TITLE[__N].ext".to_string())
        })?;

        let type_str = &caps["type"];
        let activity = registry
            .lookup(type_str)
            .map(|style| style.activity)
            .ok_or_else(|| {
                invalid(format!(
                    "unknown activity type '{type_str}' (known: {})",
                    registry.keys().join(", ")
                ))
            })?;

        let index = caps
            .name("index")
            .map(|m| m.as_str().parse::<u32>())
            .transpose()
            .map_err(|e| invalid(format!("bad part number: {e}")))?;
        if index == Some(0) {
            return Err(invalid("part numbers start at 1".to_string()));
        }

        Ok(Self {
            date: caps["date"].to_string(),
            activity,
            title: caps["title"].replace('_', " "),
            index,
        })
    }

    fn same_outing(&self, other: &TrackName) -> bool {
        self.date == other.date && self.activity == other.activity && self.title == other.title
    }
}

/// Parse the file names of one outing's tracks and check that they agree.
///
/// A lone file may omit the part number (or carry `__1`). With several files
/// every name needs a part number, numbered 1, 2, ... in array order, and all
/// must share date, type and title. Returns the fields of the first file.
pub fn resolve_track_names(file_names: &[&str], registry: &StyleRegistry) -> Result<Option<TrackName>> {
    let names = file_names
        .iter()
        .map(|f| TrackName::parse(f, registry))
        .collect::<Result<Vec<_>>>()?;

    let Some(first) = names.first() else {
        return Ok(None);
    };

    let multi = names.len() > 1;
    for (pos, (name, file)) in names.iter().zip(file_names).enumerate() {
        let expected = pos as u32 + 1;
        let numbered_ok = match name.index {
            Some(n) => n == expected,
            None => !multi,
        };
        if !numbered_ok {
            return Err(Error::TrackFilename {
                file: file.to_string(),
                reason: format!("expected part number __{expected} at position {expected}"),
            });
        }
        if !name.same_outing(first) {
            return Err(Error::TrackFilename {
                file: file.to_string(),
                reason: format!("does not match date/type/title of '{}'", file_names[0]),
            });
        }
    }

    Ok(Some(first.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> StyleRegistry {
        StyleRegistry::default()
    }

    #[test]
    fn test_parse_plain_name() {
        let name = TrackName::parse("2023-06-15__Hike__Matterhorn_Traverse.gpx", &registry()).unwrap();
        assert_eq!(name.date, "2023-06-15");
        assert_eq!(name.activity, ActivityType::Hike);
        assert_eq!(name.title, "Matterhorn Traverse");
        assert_eq!(name.index, None);
    }

    #[test]
    fn test_parse_indexed_name() {
        let name = TrackName::parse("2022-02-03__skitour__Piz_Buin__2.gpx", &registry()).unwrap();
        assert_eq!(name.activity, ActivityType::SkiTour);
        assert_eq!(name.title, "Piz Buin");
        assert_eq!(name.index, Some(2));
    }

    #[test]
    fn test_unknown_type_rejected() {
        let err = TrackName::parse("2023-06-15__Kayak__Lake.gpx", &registry()).unwrap_err();
        assert!(err.to_string().contains("unknown activity type 'Kayak'"));
    }

    #[test]
    fn test_bad_grammar_rejected() {
        for bad in [
            "2023-06-15_Hike_Foo.gpx",
            "23-06-15__Hike__Foo.gpx",
            "2023-06-15__Hike__Foo",
            "2023-06-15__Hike__.gpx",
        ] {
            assert!(TrackName::parse(bad, &registry()).is_err(), "{bad}");
        }
    }

    #[test]
    fn test_part_zero_rejected() {
        assert!(TrackName::parse("2023-06-15__Hike__Foo__0.gpx", &registry()).is_err());
    }

    #[test]
    fn test_lone_part_two_rejected() {
        let err = resolve_track_names(&["2023-06-15__Hike__Foo__2.gpx"], &registry()).unwrap_err();
        assert!(matches!(err, Error::TrackFilename { .. }));
    }

    #[test]
    fn test_lone_part_one_accepted() {
        let name = resolve_track_names(&["2023-06-15__Hike__Foo__1.gpx"], &registry())
            .unwrap()
            .unwrap();
        assert_eq!(name.title, "Foo");
    }

    #[test]
    fn test_sequential_parts_accepted() {
        let name = resolve_track_names(
            &[
                "2021-08-01__hochtour__Dom__1.gpx",
                "2021-08-01__hochtour__Dom__2.gpx",
                "2021-08-01__hochtour__Dom__3.gpx",
            ],
            &registry(),
        )
        .unwrap()
        .unwrap();
        assert_eq!(name.activity, ActivityType::Hochtour);
        assert_eq!(name.index, Some(1));
    }

    #[test]
    fn test_multi_parts_need_numbers() {
        assert!(
            resolve_track_names(
                &["2021-08-01__hike__Dom.gpx", "2021-08-01__hike__Dom__2.gpx"],
                &registry()
            )
            .is_err()
        );
    }

    #[test]
    fn test_out_of_order_parts_rejected() {
        assert!(
            resolve_track_names(
                &["2021-08-01__hike__Dom__1.gpx", "2021-08-01__hike__Dom__3.gpx"],
                &registry()
            )
            .is_err()
        );
    }

    #[test]
    fn test_mismatched_parts_rejected() {
        let err = resolve_track_names(
            &["2021-08-01__hike__Dom__1.gpx", "2021-08-02__hike__Dom__2.gpx"],
            &registry(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("does not match"));
    }

    #[test]
    fn test_no_tracks() {
        assert_eq!(resolve_track_names(&[], &registry()).unwrap(), None);
    }
}
