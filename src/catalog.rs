use std::path::Path;

use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::error::{Error, Result};

/// One outing as written in the catalog, before resolution.
///
/// `date`, `type` and `title` may be left out when the first track file name
/// supplies them. Points stay untyped here so that shape errors can name the
/// offending record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OutingRecord {
    pub title: Option<String>,
    pub date: Option<String>,
    #[serde(rename = "type")]
    pub activity_type: Option<String>,
    #[serde(default)]
    pub points: Vec<JsonValue>,
    #[serde(default)]
    pub tracks: Vec<String>,
    pub photo_link: Option<String>,
    #[serde(default)]
    pub activity_links: Vec<ActivityId>,
    pub note: Option<String>,
}

/// External activity identifier; written as a string or an integer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(untagged)]
pub enum ActivityId {
    Text(String),
    Number(u64),
}

impl std::fmt::Display for ActivityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

/// Parse a catalog: a JSON array of outing records.
pub fn parse_catalog(json: &str) -> Result<Vec<OutingRecord>> {
    serde_json::from_str(json).map_err(Error::CatalogParse)
}

pub fn read_catalog(path: &Path) -> Result<Vec<OutingRecord>> {
    let json = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_catalog(&json)
}
