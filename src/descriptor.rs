// THEORY:
// The `descriptor` turns processed masks into the `structure.xml` game profile that
// the autosplitter loads. Each WatchZone is one screen region: one geometry and the
// list of mask files compared against it.
//
// Masks are grouped by (directory, consolidated box). After the grouping stack has
// run, that pair identifies exactly one cluster. WatchZones are named after their
// directory through a naming scope separate from the mask-file names.

use crate::config::ProfileConfig;
use crate::core_modules::geometry::BoundingBox;
use crate::core_modules::grouping_orchestrator::ProcessedImage;
use crate::core_modules::naming::UniqueNamer;
use crate::error::{Result, RunError};
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use tracing::info;

const GENERATOR_COMMENT: &str = "Generated using vas_architect";
const ERROR_METRIC_OPTIONS: &str = "ErrorMetric options: default=PeakSignalToNoise | MeanErrorPerPixel | Absolute | StructuralDissimilarity";
const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";
const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// One output region and the masks watched inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchZone {
    /// Unique across the run.
    pub name: String,
    /// Name of the single watcher inside the zone; the directory name.
    pub watcher_name: String,
    pub bbox: BoundingBox,
    /// Member image paths relative to the root, `/`-separated.
    pub image_paths: Vec<String>,
    /// Member mask names in the same order as `image_paths`.
    pub mask_names: Vec<String>,
}

impl WatchZone {
    pub fn x(&self) -> u32 {
        self.bbox.x0
    }

    pub fn y(&self) -> u32 {
        self.bbox.y0
    }

    pub fn width(&self) -> u32 {
        self.bbox.width()
    }

    pub fn height(&self) -> u32 {
        self.bbox.height()
    }
}

/// Name of a path's final component without extension, like a file stem.
fn directory_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Expresses `path` relative to `root` with `/` separators, as stored in the archive.
pub fn relative_path(path: &Path, root: &Path) -> Result<String> {
    let relative = path.strip_prefix(root).map_err(|_| RunError::OutsideRoot {
        path: path.to_path_buf(),
        root: root.to_path_buf(),
    })?;
    Ok(relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/"))
}

/// Groups processed masks into named WatchZones, in first-seen order.
pub fn build_watch_zones(images: &[ProcessedImage], root: &Path) -> Result<Vec<WatchZone>> {
    info!("Beginning WatchZone grouping.");
    let mut grouped: IndexMap<(PathBuf, BoundingBox), Vec<&ProcessedImage>> = IndexMap::new();
    for image in images {
        grouped
            .entry((image.directory().to_path_buf(), image.bbox))
            .or_default()
            .push(image);
    }
    info!("Grouped {} sets of images.", grouped.len());

    let mut zone_names = UniqueNamer::new();
    let mut zones = Vec::with_capacity(grouped.len());

    for ((directory, bbox), members) in grouped {
        let watcher_name = directory_name(&directory);
        let name = zone_names.allocate(&watcher_name);
        info!("Creating WatchZone: {}", name);

        let mut image_paths = Vec::with_capacity(members.len());
        let mut mask_names = Vec::with_capacity(members.len());
        for image in members {
            image_paths.push(relative_path(&image.output_path, root)?);
            mask_names.push(image.mask_name());
            info!("Added {}.", image.mask_name());
        }

        zones.push(WatchZone {
            name,
            watcher_name,
            bbox,
            image_paths,
            mask_names,
        });
    }

    Ok(zones)
}

/// Every mask name, in WatchZone order.
pub fn collect_mask_names(zones: &[WatchZone]) -> Vec<String> {
    zones
        .iter()
        .flat_map(|zone| zone.mask_names.iter().cloned())
        .collect()
}

/// Tab-indented XML builder.
struct XmlWriter {
    out: String,
    depth: usize,
}

impl XmlWriter {
    fn new() -> Self {
        Self {
            out: String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n"),
            depth: 0,
        }
    }

    fn indent(&mut self) {
        for _ in 0..self.depth {
            self.out.push('\t');
        }
    }

    fn open(&mut self, tag: &str, attributes: &[(&str, &str)]) {
        self.indent();
        self.out.push('<');
        self.out.push_str(tag);
        for (key, value) in attributes {
            self.out
                .push_str(&format!(" {}=\"{}\"", key, escape_xml(value)));
        }
        self.out.push_str(">\n");
        self.depth += 1;
    }

    fn close(&mut self, tag: &str) {
        self.depth -= 1;
        self.indent();
        self.out.push_str(&format!("</{}>\n", tag));
    }

    fn leaf(&mut self, tag: &str, text: impl AsRef<str>) {
        self.indent();
        self.out
            .push_str(&format!("<{tag}>{}</{tag}>\n", escape_xml(text.as_ref())));
    }

    fn comment(&mut self, text: &str) {
        self.indent();
        self.out.push_str(&format!("<!--{}-->\n", text.replace("--", "- -")));
    }

    fn finish(self) -> String {
        self.out
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Renders the full `structure.xml` game profile.
pub fn render_structure(game_name: &str, profile: &ProfileConfig, zones: &[WatchZone]) -> String {
    let mut xml = XmlWriter::new();

    xml.open(
        "GameProfile",
        &[("xmlns:xsd", XSD_NAMESPACE), ("xmlns:xsi", XSI_NAMESPACE)],
    );
    xml.comment(GENERATOR_COMMENT);
    xml.leaf("Name", game_name);

    xml.open("Screens", &[]);
    xml.open("Screen", &[]);
    xml.leaf("Name", &profile.screen_name);
    xml.open("Geometry", &[]);
    xml.leaf("Width", profile.screen_width.to_string());
    xml.leaf("Height", profile.screen_height.to_string());
    xml.close("Geometry");

    xml.open("WatchZones", &[]);
    xml.comment(ERROR_METRIC_OPTIONS);
    for zone in zones {
        write_watch_zone(&mut xml, zone);
    }
    xml.close("WatchZones");

    xml.close("Screen");
    xml.close("Screens");
    xml.close("GameProfile");
    xml.finish()
}

fn write_watch_zone(xml: &mut XmlWriter, zone: &WatchZone) {
    xml.open("WatchZone", &[]);
    xml.leaf("Name", &zone.name);
    // Optional tuning knobs, left commented out for the runner to fill in.
    xml.comment("ErrorMetric></ErrorMetric");
    xml.comment("Equalize>false</Equalize");

    xml.open("Geometry", &[]);
    xml.leaf("X", zone.x().to_string());
    xml.leaf("Y", zone.y().to_string());
    xml.leaf("Width", zone.width().to_string());
    xml.leaf("Height", zone.height().to_string());
    xml.close("Geometry");

    xml.open("Watches", &[]);
    xml.open("Watcher", &[]);
    xml.leaf("Name", &zone.watcher_name);
    xml.open("WatchImages", &[]);
    for path in &zone.image_paths {
        xml.open("WatchImage", &[]);
        xml.leaf("FilePath", path);
        xml.close("WatchImage");
    }
    xml.close("WatchImages");
    xml.close("Watcher");
    xml.close("Watches");
    xml.close("WatchZone");
}
