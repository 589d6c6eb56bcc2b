//! Activity types and their map styles.
//!
//! The registry is the single source of known activity types: both catalog
//! `type` fields and track file names are validated against it.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// Closed set of outing kinds, in style definition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityType {
    Hike,
    Hochtour,
    Climb,
    ViaFerrata,
    SkiTour,
    SnowshoeTour,
    Hut,
}

impl ActivityType {
    /// Style id used in the document and in catalog/file names.
    pub fn key(self) -> &'static str {
        match self {
            Self::Hike => "hike",
            Self::Hochtour => "hochtour",
            Self::Climb => "climb",
            Self::ViaFerrata => "viaferrata",
            Self::SkiTour => "skitour",
            Self::SnowshoeTour => "snowshoetour",
            Self::Hut => "hut",
        }
    }

    /// Human-readable label for descriptions.
    pub fn label(self) -> &'static str {
        match self {
            Self::Hike => "Hike",
            Self::Hochtour => "Alpine tour",
            Self::Climb => "Climb",
            Self::ViaFerrata => "Via ferrata",
            Self::SkiTour => "Ski tour",
            Self::SnowshoeTour => "Snowshoe tour",
            Self::Hut => "Hut",
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// An RGB color with an opacity in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub alpha: f64,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, alpha: f64) -> Self {
        Self { r, g, b, alpha }
    }

    pub fn alpha_byte(&self) -> u8 {
        (self.alpha.clamp(0.0, 1.0) * 255.0).round() as u8
    }

    /// KML color: `aabbggrr`, uppercase hex.
    pub fn kml_hex(&self) -> String {
        format!(
            "{:02X}{:02X}{:02X}{:02X}",
            self.alpha_byte(),
            self.b,
            self.g,
            self.r
        )
    }
}

// Colors borrowed from the SAC route portal; opacity comes from the options.
const PALETTE: [(ActivityType, (u8, u8, u8)); 7] = [
    (ActivityType::Hike, (35, 113, 0)),
    (ActivityType::Hochtour, (102, 45, 145)),
    (ActivityType::Climb, (255, 61, 18)),
    (ActivityType::ViaFerrata, (255, 136, 0)),
    (ActivityType::SkiTour, (0, 51, 255)),
    (ActivityType::SnowshoeTour, (0, 138, 121)),
    (ActivityType::Hut, (227, 6, 19)),
];

// Map marker from the Noun Project (term 5624), run through svgomg.
const MARKER_PATH: &str = "M50 14a24 24 0 00-24 24c0 13.3 24 48 24 48s24-34.8 24-48a24 24 0 00-24-24zm0 36.5a12 12 0 110-24 12 12 0 010 24z";

#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub activity: ActivityType,
    pub color: Rgba,
    pub line_width: u32,
    pub icon_size: u32,
}

impl Style {
    pub fn id(&self) -> &'static str {
        self.activity.key()
    }

    /// The marker icon tinted with this style's color.
    ///
    /// Renderers tend to ignore `<IconStyle><color>`, so the tint is baked
    /// into the SVG instead.
    pub fn icon_svg(&self) -> String {
        let Rgba { r, g, b, alpha } = self.color;
        format!(
            r#"<svg height="{size}" width="{size}" xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100"><path fill="rgba({r},{g},{b},{alpha})" d="{MARKER_PATH}"/></svg>"#,
            size = self.icon_size,
        )
    }

    pub fn icon_data_uri(&self) -> String {
        format!(
            "data:image/svg+xml;base64,{}",
            STANDARD.encode(self.icon_svg())
        )
    }
}

/// Fixed, ordered mapping from activity type to style.
#[derive(Debug, Clone)]
pub struct StyleRegistry {
    styles: Vec<Style>,
}

impl StyleRegistry {
    pub fn new(line_width: u32, icon_size: u32, opacity: f64) -> Self {
        let styles = PALETTE
            .iter()
            .map(|&(activity, (r, g, b))| Style {
                activity,
                color: Rgba::new(r, g, b, opacity),
                line_width,
                icon_size,
            })
            .collect();
        Self { styles }
    }

    #[cfg(test)]
    pub(crate) fn from_styles(styles: Vec<Style>) -> Self {
        Self { styles }
    }

    /// Styles in definition order.
    pub fn styles(&self) -> &[Style] {
        &self.styles
    }

    /// Case-insensitive lookup by style key.
    pub fn lookup(&self, key: &str) -> Option<&Style> {
        self.styles
            .iter()
            .find(|s| s.id().eq_ignore_ascii_case(key))
    }

    pub fn keys(&self) -> Vec<&'static str> {
        self.styles.iter().map(Style::id).collect()
    }
}

impl Default for StyleRegistry {
    fn default() -> Self {
        Self::new(8, 40, 0.8)
    }
}
