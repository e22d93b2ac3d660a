//! Text frame, paragraph and run models.
//!
//! Formatting is not interpreted: run and paragraph property elements are kept
//! as the XML they were read from and written back unchanged, so that only the
//! text itself is ever rewritten.

use serde::Serialize;

/// Character used for a line break (`a:br`) inside a paragraph's text.
pub const LINE_BREAK: char = '\u{000B}';

/// The kind of inline element a run was read from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunKind {
    /// A regular text run (`a:r`)
    #[default]
    Text,
    /// A line break within the paragraph (`a:br`)
    LineBreak,
    /// A field such as a slide number (`a:fld`); keeps its original start tag
    Field {
        #[serde(skip)]
        open_tag: String,
    },
    /// Any other inline element, preserved verbatim and contributing no text
    Opaque {
        #[serde(skip)]
        xml: String,
    },
}

/// A run of text sharing one set of formatting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TextRun {
    /// What kind of element this run is
    pub kind: RunKind,

    /// The text content
    pub text: String,

    /// Raw run properties element (`a:rPr`), if any
    #[serde(skip)]
    pub properties: Option<String>,
}

impl TextRun {
    /// Create a plain text run with no properties.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            kind: RunKind::Text,
            text: text.into(),
            properties: None,
        }
    }

    /// Create a text run carrying the given raw properties element.
    pub fn styled(text: impl Into<String>, properties: Option<String>) -> Self {
        Self {
            kind: RunKind::Text,
            text: text.into(),
            properties,
        }
    }

    /// Create a line break run.
    pub fn line_break(properties: Option<String>) -> Self {
        Self {
            kind: RunKind::LineBreak,
            text: String::new(),
            properties,
        }
    }

    /// Check if this is a regular text run.
    pub fn is_text(&self) -> bool {
        matches!(self.kind, RunKind::Text)
    }

    /// Text this run contributes to its paragraph.
    pub fn visible_text(&self) -> &str {
        match self.kind {
            RunKind::Text | RunKind::Field { .. } => &self.text,
            RunKind::LineBreak => "\u{000B}",
            RunKind::Opaque { .. } => "",
        }
    }
}

/// A paragraph of runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Paragraph {
    /// Runs in document order
    pub runs: Vec<TextRun>,

    /// Raw paragraph properties element (`a:pPr`)
    #[serde(skip)]
    pub properties: Option<String>,

    /// Raw end-of-paragraph run properties element (`a:endParaRPr`)
    #[serde(skip)]
    pub end_properties: Option<String>,
}

impl Paragraph {
    /// Create a new empty paragraph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a paragraph holding one plain run.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            runs: vec![TextRun::plain(text)],
            ..Default::default()
        }
    }

    /// Create a paragraph from plain runs, one per fragment.
    pub fn with_runs<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            runs: fragments.into_iter().map(TextRun::plain).collect(),
            ..Default::default()
        }
    }

    /// Get the text of all runs, line breaks included.
    pub fn text(&self) -> String {
        self.runs.iter().map(TextRun::visible_text).collect()
    }

    /// Check if this paragraph has no text.
    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(|r| r.visible_text().is_empty())
    }
}

/// A text container: the body of a shape or of a table cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextFrame {
    /// Paragraphs in document order
    pub paragraphs: Vec<Paragraph>,

    /// Qualified name of the body element (`p:txBody` or `a:txBody`)
    #[serde(skip)]
    pub(crate) element: String,

    /// Raw start tag of the body element, namespace declarations included
    #[serde(skip)]
    pub(crate) open_tag: String,

    /// Namespace prefix used for the drawing elements (`a`)
    #[serde(skip)]
    pub(crate) prefix: String,

    /// Raw XML between the start tag and the first paragraph (`a:bodyPr`, `a:lstStyle`)
    #[serde(skip)]
    pub(crate) preamble: String,

    /// Raw XML after the last paragraph
    #[serde(skip)]
    pub(crate) trailer: String,
}

impl Default for TextFrame {
    fn default() -> Self {
        Self {
            paragraphs: Vec::new(),
            element: "p:txBody".to_string(),
            open_tag: "<p:txBody>".to_string(),
            prefix: "a".to_string(),
            preamble: "<a:bodyPr/><a:lstStyle/>".to_string(),
            trailer: String::new(),
        }
    }
}

impl TextFrame {
    /// Create an empty shape text frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty table cell text frame.
    pub fn cell() -> Self {
        Self {
            element: "a:txBody".to_string(),
            open_tag: "<a:txBody>".to_string(),
            ..Default::default()
        }
    }

    /// Create a shape text frame holding the given paragraphs.
    pub fn with_paragraphs(paragraphs: Vec<Paragraph>) -> Self {
        Self {
            paragraphs,
            ..Default::default()
        }
    }

    /// Full text of the frame, paragraphs separated by `\n`.
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Total number of runs across all paragraphs.
    pub fn run_count(&self) -> usize {
        self.paragraphs.iter().map(|p| p.runs.len()).sum()
    }

    /// Replace the whole content with `text`.
    ///
    /// Each `\n`-separated line becomes a paragraph with a single run; line
    /// break characters become `a:br` runs. Every new run takes the properties
    /// of the frame's first text run and every paragraph those of the first
    /// paragraph, so per-run formatting collapses to one uniform style.
    pub fn set_text(&mut self, text: &str) {
        let run_properties = self
            .paragraphs
            .iter()
            .flat_map(|p| p.runs.iter())
            .find(|r| matches!(r.kind, RunKind::Text | RunKind::Field { .. }))
            .and_then(|r| r.properties.clone());
        let (paragraph_properties, end_properties) = self
            .paragraphs
            .first()
            .map(|p| (p.properties.clone(), p.end_properties.clone()))
            .unwrap_or_default();

        self.paragraphs = text
            .split('\n')
            .map(|line| {
                let mut paragraph = Paragraph {
                    runs: Vec::new(),
                    properties: paragraph_properties.clone(),
                    end_properties: end_properties.clone(),
                };
                for (index, segment) in line.split(LINE_BREAK).enumerate() {
                    if index > 0 {
                        paragraph
                            .runs
                            .push(TextRun::line_break(run_properties.clone()));
                    }
                    if !segment.is_empty() {
                        paragraph
                            .runs
                            .push(TextRun::styled(segment, run_properties.clone()));
                    }
                }
                paragraph
            })
            .collect();
    }

    /// Check if the frame has no text.
    pub fn is_empty(&self) -> bool {
        self.paragraphs.iter().all(Paragraph::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_text_joins_paragraphs_and_breaks() {
        let mut first = Paragraph::with_runs(["Hello ", "world"]);
        first.runs.push(TextRun::line_break(None));
        first.runs.push(TextRun::plain("again"));
        let frame = TextFrame::with_paragraphs(vec![first, Paragraph::with_text("second")]);

        assert_eq!(frame.text(), "Hello world\u{000B}again\nsecond");
        assert_eq!(frame.run_count(), 5);
    }

    #[test]
    fn test_set_text_collapses_to_single_run() {
        let mut frame = TextFrame::with_paragraphs(vec![Paragraph {
            runs: vec![
                TextRun::styled("{compa", Some("<a:rPr b=\"1\"/>".to_string())),
                TextRun::styled("nyName}", Some("<a:rPr i=\"1\"/>".to_string())),
            ],
            properties: Some("<a:pPr algn=\"ctr\"/>".to_string()),
            end_properties: None,
        }]);

        frame.set_text("Acme");

        assert_eq!(frame.paragraphs.len(), 1);
        let paragraph = &frame.paragraphs[0];
        assert_eq!(paragraph.runs.len(), 1);
        assert_eq!(paragraph.runs[0].text, "Acme");
        assert_eq!(paragraph.runs[0].properties.as_deref(), Some("<a:rPr b=\"1\"/>"));
        assert_eq!(paragraph.properties.as_deref(), Some("<a:pPr algn=\"ctr\"/>"));
    }

    #[test]
    fn test_set_text_splits_lines_and_breaks() {
        let mut frame = TextFrame::with_paragraphs(vec![Paragraph::with_text("x")]);
        frame.set_text("one\u{000B}two\n\nthree");

        assert_eq!(frame.paragraphs.len(), 3);
        assert_eq!(frame.paragraphs[0].runs.len(), 3);
        assert_eq!(frame.paragraphs[0].runs[1].kind, RunKind::LineBreak);
        assert!(frame.paragraphs[1].runs.is_empty());
        assert_eq!(frame.text(), "one\u{000B}two\n\nthree");
    }

    #[test]
    fn test_opaque_runs_contribute_no_text() {
        let paragraph = Paragraph {
            runs: vec![
                TextRun::plain("a"),
                TextRun {
                    kind: RunKind::Opaque {
                        xml: "<a14:m/>".to_string(),
                    },
                    text: String::new(),
                    properties: None,
                },
                TextRun::plain("b"),
            ],
            ..Default::default()
        };
        assert_eq!(paragraph.text(), "ab");
    }
}
