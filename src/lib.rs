//! # deckfill
//!
//! Fill `{placeholder}` tokens in PowerPoint (.pptx) templates.
//!
//! The library loads a presentation, replaces tokens in every text shape and
//! table of every slide, and writes the package back with all other content
//! left as it was. With the `server` feature it also provides a small HTTP
//! service that stores one template and fills it on request.
//!
//! ## Quick Start
//!
//! ```no_run
//! use deckfill::{fill_file, FillOptions, Replacements};
//!
//! let mut values = Replacements::new();
//! values.insert("companyName", "Acme");
//! values.insert("region", "EMEA");
//!
//! let report = fill_file("template.pptx", "filled.pptx", &values, &FillOptions::default())?;
//! println!("{} placeholders replaced", report.replacements);
//! # Ok::<(), deckfill::Error>(())
//! ```
//!
//! ## Working with the slide model
//!
//! ```no_run
//! use deckfill::{fill_presentation, find_placeholders, FillOptions, Presentation, Replacements};
//!
//! let mut deck = Presentation::open("template.pptx")?;
//! for key in find_placeholders(&deck)? {
//!     println!("found {{{}}}", key);
//! }
//!
//! let values: Replacements = [("companyName", "Acme")].into_iter().collect();
//! fill_presentation(&mut deck, &values, &FillOptions::default())?;
//! deck.save("filled.pptx")?;
//! # Ok::<(), deckfill::Error>(())
//! ```
//!
//! ## Features
//!
//! - `server` (default): HTTP service built on axum

pub mod container;
pub mod error;
pub mod fill;
pub mod model;
pub mod pptx;
pub mod store;

#[cfg(feature = "server")]
pub mod service;

// Re-exports
pub use container::{Package, Relationship, Relationships};
pub use error::{Error, Result};
pub use fill::{
    fill_presentation, find_placeholders, FillOptions, FillReport, Replacements, Substitutor,
    TableMatching,
};
pub use model::{Cell, Paragraph, Row, Shape, ShapeKind, Slide, Table, TextFrame, TextRun};
pub use pptx::{Presentation, PRESENTATION_MIME_TYPE};
pub use store::TemplateStore;

use std::path::Path;

/// Fill a presentation held in memory and return the new package bytes.
///
/// # Example
///
/// ```no_run
/// use deckfill::{fill_bytes, FillOptions, Replacements};
///
/// let data = std::fs::read("template.pptx")?;
/// let values: Replacements = [("companyName", "Acme")].into_iter().collect();
/// let (filled, report) = fill_bytes(data, &values, &FillOptions::default())?;
/// std::fs::write("filled.pptx", filled)?;
/// # Ok::<(), deckfill::Error>(())
/// ```
pub fn fill_bytes(
    data: Vec<u8>,
    replacements: &Replacements,
    options: &FillOptions,
) -> Result<(Vec<u8>, FillReport)> {
    let mut presentation = Presentation::from_bytes(data)?;
    let report = fill_presentation(&mut presentation, replacements, options)?;
    let output = presentation.to_bytes()?;
    Ok((output, report))
}

/// Fill a presentation file and write the result to `output`.
pub fn fill_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    replacements: &Replacements,
    options: &FillOptions,
) -> Result<FillReport> {
    let mut presentation = Presentation::open(input)?;
    let report = fill_presentation(&mut presentation, replacements, options)?;
    presentation.save(output)?;
    Ok(report)
}
