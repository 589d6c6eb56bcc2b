use crate::error::{Error, Result};
use crate::gpx_types::GpxPoint;
use crate::kml::{Element, KML_NAMESPACE};
use crate::options::ConvertOptions;
use crate::resolver::Outing;
use crate::style::{Style, StyleRegistry};

/// Builds the KML tree from resolved outings.
pub struct Assembler<'a> {
    opts: &'a ConvertOptions,
    registry: &'a StyleRegistry,
}

impl<'a> Assembler<'a> {
    pub fn new(opts: &'a ConvertOptions, registry: &'a StyleRegistry) -> Self {
        Self { opts, registry }
    }

    /// The `<kml>` root: document name, every style in registry order, then
    /// the placemarks in catalog order.
    pub fn document(&self, placemarks: Vec<Element>) -> Element {
        let document = Element::new("Document")
            .child(Element::with_text("name", self.opts.title.as_str()))
            .children(self.registry.styles().iter().map(style_element))
            .children(placemarks);
        Element::new("kml").attr("xmlns", KML_NAMESPACE).child(document)
    }

    /// One placemark per outing.
    ///
    /// `tracks` holds the already simplified points of each of the outing's
    /// track files, in the same order as `outing.tracks`.
    ///
    /// No `<name>`: some viewers print it next to every point, so the title
    /// goes into the description instead.
    pub fn placemark(&self, outing: &Outing, tracks: &[Vec<GpxPoint>]) -> Result<Element> {
        Ok(Element::new("Placemark")
            .child(Element::with_text(
                "styleUrl",
                format!("#{}", outing.activity.key()),
            ))
            .child(Element::new("description").cdata(self.description(outing)))
            .child(geometry(outing, tracks)?))
    }

    /// Raw HTML shown in the placemark balloon.
    pub fn description(&self, outing: &Outing) -> String {
        let mut html = format!(
            r#"<h4>{title}</h4><p><time datetime="{iso}">{human}</time></p><p>{label}</p>"#,
            title = outing.title,
            iso = outing.date.format("%Y-%m-%d"),
            human = outing.date.format("%B %-d, %Y"),
            label = outing.activity.label(),
        );

        if let Some(photo) = &outing.photo_link {
            html.push_str(&format!(
                r#"<p><a href="{}{photo}">See photos</a></p>"#,
                self.opts.photo_base_url
            ));
        }

        match outing.activity_links.as_slice() {
            [] => {}
            [id] => html.push_str(&format!(
                r#"<p><a href="{}{id}">See activity</a></p>"#,
                self.opts.activity_base_url
            )),
            ids => {
                for (n, id) in ids.iter().enumerate() {
                    html.push_str(&format!(
                        r#"<p><a href="{}{id}">See activities, part {}</a></p>"#,
                        self.opts.activity_base_url,
                        n + 1
                    ));
                }
            }
        }

        if let Some(note) = &outing.note {
            html.push_str(&format!("<p>{note}</p>"));
        }

        html
    }
}

fn style_element(style: &Style) -> Element {
    Element::new("Style")
        .attr("id", style.id())
        .child(
            Element::new("LineStyle")
                .child(Element::with_text("color", style.color.kml_hex()))
                .child(Element::with_text("width", style.line_width.to_string())),
        )
        .child(
            Element::new("IconStyle").child(
                Element::new("Icon").child(Element::with_text("href", style.icon_data_uri())),
            ),
        )
}

/// Explicit points first, then tracks. A single source is emitted bare;
/// anything more is wrapped in a `<MultiGeometry>`.
pub fn geometry(outing: &Outing, tracks: &[Vec<GpxPoint>]) -> Result<Element> {
    let mut parts: Vec<Element> = outing.points.iter().map(point_element).collect();
    parts.extend(tracks.iter().map(|t| line_string_element(t)));

    match parts.len() {
        0 => Err(Error::InvalidRecord {
            record: format!("'{}'", outing.title),
            reason: "nothing to draw".to_string(),
        }),
        1 => Ok(parts.remove(0)),
        _ => Ok(Element::new("MultiGeometry").children(parts)),
    }
}

fn point_element(point: &GpxPoint) -> Element {
    Element::new("Point")
        .child(Element::with_text("altitudeMode", "clampToGround"))
        .child(Element::with_text("coordinates", format_coordinate(point)))
}

fn line_string_element(points: &[GpxPoint]) -> Element {
    Element::new("LineString")
        .child(Element::with_text("altitudeMode", "clampToGround"))
        .child(Element::with_text("tessellate", "1"))
        .child(Element::with_text("coordinates", format_coordinates(points)))
}

/// `lon,lat`, five decimals each.
pub fn format_coordinate(point: &GpxPoint) -> String {
    format!("{:.5},{:.5}", point.lon, point.lat)
}

/// Space-separated `lon,lat` pairs in point order.
pub fn format_coordinates(points: &[GpxPoint]) -> String {
    points
        .iter()
        .map(format_coordinate)
        .collect::<Vec<_>>()
        .join(" ")
}
