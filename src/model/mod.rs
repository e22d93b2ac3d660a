//! In-memory document tree for presentations.
//!
//! Slides hold shapes; a shape carries a text frame, a table, or neither.
//! Text frames hold paragraphs of runs. The parser in [`crate::pptx`] builds
//! this tree and the writer regenerates slide XML from it.

mod shape;
mod slide;
mod text;

pub use shape::*;
pub use slide::Slide;
pub(crate) use slide::{Fragment, TextSlot};
pub use text::*;
