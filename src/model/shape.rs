//! Shape and table models.

use super::TextFrame;
use serde::Serialize;

/// A cell in a table. Every cell owns a text frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Cell {
    /// Cell content
    pub text_frame: TextFrame,
}

impl Cell {
    /// Create a cell with one paragraph of text.
    pub fn with_text(text: impl Into<String>) -> Self {
        let mut text_frame = TextFrame::cell();
        text_frame.paragraphs.push(super::Paragraph::with_text(text));
        Self { text_frame }
    }

    /// Get the plain text content.
    pub fn text(&self) -> String {
        self.text_frame.text()
    }
}

/// A row of table cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Row {
    pub cells: Vec<Cell>,
}

/// A table: a grid of rows and cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    pub rows: Vec<Row>,
}

impl Table {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get a cell by position.
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.cells.get(col))
    }

    /// Get a mutable cell by position.
    pub fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut Cell> {
        self.rows.get_mut(row).and_then(|r| r.cells.get_mut(col))
    }

    /// Iterate over all cells, row by row.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.rows.iter().flat_map(|r| r.cells.iter())
    }

    /// Iterate mutably over all cells, row by row.
    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.rows.iter_mut().flat_map(|r| r.cells.iter_mut())
    }
}

/// What a shape carries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeKind {
    /// A shape with a text body (text box, placeholder, autoshape)
    Text(TextFrame),
    /// A graphic frame holding a table
    Table(Table),
    /// Pictures, groups, connectors, charts, or shapes without text
    #[default]
    Other,
}

/// A top-level element of a slide's shape tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Shape {
    /// Shape ID from `p:cNvPr`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,

    /// Shape name from `p:cNvPr`
    pub name: String,

    /// Content carried by the shape
    pub kind: ShapeKind,
}

impl Shape {
    /// Create a text shape.
    pub fn text(name: impl Into<String>, frame: TextFrame) -> Self {
        Self {
            id: None,
            name: name.into(),
            kind: ShapeKind::Text(frame),
        }
    }

    /// Create a table shape.
    pub fn table(name: impl Into<String>, table: Table) -> Self {
        Self {
            id: None,
            name: name.into(),
            kind: ShapeKind::Table(table),
        }
    }

    pub fn has_text_frame(&self) -> bool {
        matches!(self.kind, ShapeKind::Text(_))
    }

    pub fn has_table(&self) -> bool {
        matches!(self.kind, ShapeKind::Table(_))
    }

    pub fn text_frame(&self) -> Option<&TextFrame> {
        match &self.kind {
            ShapeKind::Text(frame) => Some(frame),
            _ => None,
        }
    }

    pub fn text_frame_mut(&mut self) -> Option<&mut TextFrame> {
        match &mut self.kind {
            ShapeKind::Text(frame) => Some(frame),
            _ => None,
        }
    }

    pub fn table_ref(&self) -> Option<&Table> {
        match &self.kind {
            ShapeKind::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn table_mut(&mut self) -> Option<&mut Table> {
        match &mut self.kind {
            ShapeKind::Table(table) => Some(table),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_cell_access() {
        let table = Table {
            rows: vec![
                Row {
                    cells: vec![Cell::with_text("a"), Cell::with_text("b")],
                },
                Row {
                    cells: vec![Cell::with_text("c")],
                },
            ],
        };
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(0, 1).unwrap().text(), "b");
        assert!(table.cell(1, 1).is_none());
        assert_eq!(table.cells().count(), 3);
    }

    #[test]
    fn test_shape_variants() {
        let shape = Shape::text("Title 1", TextFrame::new());
        assert!(shape.has_text_frame());
        assert!(!shape.has_table());
        assert!(shape.table_ref().is_none());

        let other = Shape::default();
        assert!(!other.has_text_frame());
        assert!(!other.has_table());
    }
}
