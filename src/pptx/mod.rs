//! PPTX (PowerPoint) reading and writing.
//!
//! [`Presentation`] parses the slides of an Office Open XML presentation into
//! the [`crate::model`] tree and writes the package back after the tree has
//! been modified. Only slide text bodies are regenerated; every other part and
//! every other piece of slide XML is carried over unchanged.

mod parser;
mod presentation;
mod writer;

pub use presentation::{Presentation, PRESENTATION_MIME_TYPE};
