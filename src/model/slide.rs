//! Slide model.

use super::Shape;
use serde::Serialize;

/// Location of a text body inside a slide's shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TextSlot {
    /// The text frame of a text shape
    Shape(usize),
    /// The text frame of a table cell
    Cell { shape: usize, row: usize, col: usize },
}

/// A piece of slide XML: either copied verbatim or regenerated from the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Fragment {
    Xml(String),
    Text(TextSlot),
}

/// A slide and its top-level shapes.
#[derive(Debug, Clone, Serialize)]
pub struct Slide {
    /// Package path of the slide part (e.g. `ppt/slides/slide1.xml`)
    pub part_name: String,

    /// Top-level shapes in document order
    pub shapes: Vec<Shape>,

    #[serde(skip)]
    pub(crate) fragments: Vec<Fragment>,
}

impl Slide {
    /// Create a slide that is not backed by any XML.
    pub fn new(part_name: impl Into<String>, shapes: Vec<Shape>) -> Self {
        Self {
            part_name: part_name.into(),
            shapes,
            fragments: Vec::new(),
        }
    }

    /// Number of shapes carrying a table.
    pub fn table_count(&self) -> usize {
        self.shapes.iter().filter(|s| s.has_table()).count()
    }

    /// Number of shapes carrying a text frame.
    pub fn text_frame_count(&self) -> usize {
        self.shapes.iter().filter(|s| s.has_text_frame()).count()
    }
}
