//! Presentation loading and saving.

use super::parser::parse_slide;
use super::writer::render_slide;
use crate::container::Package;
use crate::error::{Error, Result};
use crate::model::Slide;
use std::collections::HashMap;
use std::path::Path;

/// MIME type of a `.pptx` file.
pub const PRESENTATION_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

/// Content type of the main presentation part.
const PRESENTATION_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";

const OFFICE_DOCUMENT_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";

const DEFAULT_PRESENTATION_PART: &str = "ppt/presentation.xml";

/// A parsed presentation that can be modified and written back.
///
/// # Example
///
/// ```no_run
/// use deckfill::Presentation;
///
/// let mut deck = Presentation::open("template.pptx")?;
/// for slide in deck.slides_mut() {
///     println!("{}: {} shapes", slide.part_name, slide.shapes.len());
/// }
/// deck.save("copy.pptx")?;
/// # Ok::<(), deckfill::Error>(())
/// ```
#[derive(Debug)]
pub struct Presentation {
    package: Package,
    slides: Vec<Slide>,
}

impl Presentation {
    /// Open a presentation file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let package = Package::open(path)?;
        Self::from_package(package)
    }

    /// Parse a presentation from bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let package = Package::from_bytes(data)?;
        Self::from_package(package)
    }

    fn from_package(package: Package) -> Result<Self> {
        ensure_presentation(&package)?;

        let main_part = main_part_name(&package)?;
        let rels = package.read_relationships(&main_part)?;
        let slide_rel_ids = parse_slide_list(&package.read_xml(&main_part)?)?;

        let mut slides = Vec::with_capacity(slide_rel_ids.len());
        for rel_id in slide_rel_ids {
            let rel = rels.get(&rel_id).ok_or_else(|| {
                Error::MissingComponent(format!("slide relationship {}", rel_id))
            })?;
            let part_name = Package::resolve_path(&main_part, &rel.target);
            let xml = package.read_xml(&part_name)?;
            slides.push(parse_slide(&part_name, &xml)?);
        }

        tracing::debug!(slides = slides.len(), "loaded presentation");
        Ok(Self { package, slides })
    }

    /// Slides in presentation order.
    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    /// Mutable access to the slides.
    pub fn slides_mut(&mut self) -> &mut [Slide] {
        &mut self.slides
    }

    /// Number of slides.
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// The underlying package.
    pub fn package(&self) -> &Package {
        &self.package
    }

    /// Serialise the presentation to `.pptx` bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut parts = HashMap::with_capacity(self.slides.len());
        for slide in &self.slides {
            parts.insert(slide.part_name.clone(), render_slide(slide)?.into_bytes());
        }
        self.package.write_with_parts(&parts)
    }

    /// Write the presentation to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let data = self.to_bytes()?;
        std::fs::write(path, data)?;
        Ok(())
    }
}

/// Reject packages that are not presentations.
fn ensure_presentation(package: &Package) -> Result<()> {
    let content_types = package.read_xml("[Content_Types].xml").map_err(|_| {
        Error::UnsupportedFormat("package has no [Content_Types].xml".to_string())
    })?;

    if content_types.contains(PRESENTATION_CONTENT_TYPE) {
        return Ok(());
    }

    let detected = if content_types.contains("wordprocessingml") {
        "word document"
    } else if content_types.contains("spreadsheetml") {
        "spreadsheet"
    } else {
        "unknown package"
    };
    Err(Error::UnsupportedFormat(format!(
        "{} is not a .pptx presentation",
        detected
    )))
}

/// Locate the main presentation part through the package relationships.
fn main_part_name(package: &Package) -> Result<String> {
    let rels = package.read_relationships("")?;
    let target = rels
        .find_by_type(OFFICE_DOCUMENT_REL)
        .map(|rel| Package::resolve_path("", &rel.target));

    Ok(match target {
        Some(part) if package.exists(&part) => part,
        _ => DEFAULT_PRESENTATION_PART.to_string(),
    })
}

/// Relationship IDs of the slides listed in `p:sldIdLst`, in order.
fn parse_slide_list(xml: &str) -> Result<Vec<String>> {
    let mut ids = Vec::new();
    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Empty(e)) | Ok(quick_xml::events::Event::Start(e))
                if e.local_name().as_ref() == b"sldId" =>
            {
                for attr in e.attributes().flatten() {
                    // r:id, as opposed to the numeric slide id
                    if attr.key.prefix().is_some() && attr.key.local_name().as_ref() == b"id" {
                        ids.push(attr.unescape_value()?.into_owned());
                    }
                }
            }
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => return Err(Error::XmlParse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(ids)
}
