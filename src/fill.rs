//! Placeholder substitution.
//!
//! Replaces `{key}` tokens in slide text with values from a [`Replacements`]
//! mapping. Two policies run over every shape:
//!
//! - text frames are flattened to one string, substituted, and rebuilt as a
//!   single uniform run per paragraph, so tokens split across runs still match;
//! - tables are substituted run by run ([`TableMatching::PerRun`]), so a token
//!   split across two runs of a cell is left as is. [`TableMatching::WholeCell`]
//!   treats each cell like a text frame instead.
//!
//! Substitution is a single left-to-right pass: replaced values are never
//! scanned again.

use crate::error::{Error, Result};
use crate::model::{Shape, ShapeKind, Slide, Table, TextFrame};
use crate::pptx::Presentation;
use regex::{Captures, Regex};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Pattern for discovering tokens in a template.
const PLACEHOLDER_PATTERN: &str = r"\{([^{}\s]+)\}";

/// A mapping from placeholder keys to replacement text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Replacements {
    values: BTreeMap<String, String>,
}

impl Replacements {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or overwrite a key, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.values.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Build a mapping from a JSON object of scalar values.
    ///
    /// Strings are used verbatim and numbers in their JSON spelling. Booleans
    /// render as `True`/`False` and `null` as `None`, the spelling templates
    /// written for the Flask service expect. Array and object values are
    /// skipped. The body must be a non-empty object.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            Error::InvalidData("replacements must be a JSON object".to_string())
        })?;
        if object.is_empty() {
            return Err(Error::InvalidData("replacements are empty".to_string()));
        }

        let mut replacements = Self::new();
        for (key, value) in object {
            let text = match value {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(true) => "True".to_string(),
                serde_json::Value::Bool(false) => "False".to_string(),
                serde_json::Value::Null => "None".to_string(),
                serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                    tracing::warn!(key = %key, "skipping non-scalar replacement value");
                    continue;
                }
            };
            replacements.insert(key.clone(), text);
        }
        Ok(replacements)
    }

    /// Parse a JSON document and build a mapping from it.
    pub fn from_json_slice(data: &[u8]) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_slice(data)
            .map_err(|e| Error::InvalidData(format!("invalid JSON: {}", e)))?;
        Self::from_json(&value)
    }
}

impl<K, V> FromIterator<(K, V)> for Replacements
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// How placeholders inside table cells are matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TableMatching {
    /// Match within each run only; tokens split across runs are not replaced
    #[default]
    PerRun,
    /// Flatten each cell like a text frame before matching
    WholeCell,
}

/// Options for filling a presentation.
#[derive(Debug, Clone, Default)]
pub struct FillOptions {
    /// Table cell matching policy
    pub table_matching: TableMatching,
}

impl FillOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the table cell matching policy.
    pub fn with_table_matching(mut self, matching: TableMatching) -> Self {
        self.table_matching = matching;
        self
    }
}

/// Counters collected while filling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FillReport {
    pub slides: usize,
    pub shapes: usize,
    pub text_frames: usize,
    pub table_cells: usize,
    /// Number of tokens replaced
    pub replacements: usize,
}

/// Compiled matcher for the tokens of a [`Replacements`] mapping.
#[derive(Debug)]
pub struct Substitutor {
    pattern: Option<Regex>,
    values: HashMap<String, String>,
}

impl Substitutor {
    /// Compile the tokens of a mapping.
    pub fn new(replacements: &Replacements) -> Result<Self> {
        let values: HashMap<String, String> = replacements
            .iter()
            .map(|(key, value)| (format!("{{{}}}", key), value.to_string()))
            .collect();

        // Longest first so that overlapping tokens resolve leftmost-longest
        let mut tokens: Vec<&String> = values.keys().collect();
        tokens.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        let pattern = if tokens.is_empty() {
            None
        } else {
            let alternation = tokens
                .iter()
                .map(|token| regex::escape(token))
                .collect::<Vec<_>>()
                .join("|");
            Some(Regex::new(&alternation)?)
        };

        Ok(Self { pattern, values })
    }

    /// Replace every token in `text`, returning the result and the number of
    /// tokens replaced.
    pub fn replace(&self, text: &str) -> (String, usize) {
        let Some(pattern) = &self.pattern else {
            return (text.to_string(), 0);
        };

        let mut count = 0;
        let replaced = pattern.replace_all(text, |caps: &Captures<'_>| {
            count += 1;
            self.values.get(&caps[0]).cloned().unwrap_or_default()
        });
        (replaced.into_owned(), count)
    }
}

/// Flatten, substitute and rebuild a text frame.
///
/// The frame is rebuilt even when nothing matched, collapsing its runs.
pub fn fill_text_frame(frame: &mut TextFrame, substitutor: &Substitutor) -> usize {
    let (text, count) = substitutor.replace(&frame.text());
    frame.set_text(&text);
    count
}

/// Substitute inside each text run of a frame independently.
pub fn fill_runs(frame: &mut TextFrame, substitutor: &Substitutor) -> usize {
    let mut count = 0;
    for run in frame
        .paragraphs
        .iter_mut()
        .flat_map(|p| p.runs.iter_mut())
        .filter(|r| r.is_text())
    {
        let (text, replaced) = substitutor.replace(&run.text);
        if replaced > 0 {
            run.text = text;
            count += replaced;
        }
    }
    count
}

/// Substitute inside every cell of a table.
pub fn fill_table(table: &mut Table, substitutor: &Substitutor, matching: TableMatching) -> usize {
    table
        .cells_mut()
        .map(|cell| match matching {
            TableMatching::PerRun => fill_runs(&mut cell.text_frame, substitutor),
            TableMatching::WholeCell => fill_text_frame(&mut cell.text_frame, substitutor),
        })
        .sum()
}

/// Apply the text frame and table policies to one shape.
pub fn fill_shape(
    shape: &mut Shape,
    substitutor: &Substitutor,
    options: &FillOptions,
    report: &mut FillReport,
) {
    report.shapes += 1;
    match &mut shape.kind {
        ShapeKind::Text(frame) => {
            report.text_frames += 1;
            report.replacements += fill_text_frame(frame, substitutor);
        }
        ShapeKind::Table(table) => {
            report.table_cells += table.cells().count();
            report.replacements += fill_table(table, substitutor, options.table_matching);
        }
        ShapeKind::Other => {}
    }
}

/// Fill every shape of the given slides.
pub fn fill_slides(
    slides: &mut [Slide],
    replacements: &Replacements,
    options: &FillOptions,
) -> Result<FillReport> {
    let substitutor = Substitutor::new(replacements)?;
    let mut report = FillReport::default();

    for slide in slides.iter_mut() {
        report.slides += 1;
        for shape in slide.shapes.iter_mut() {
            fill_shape(shape, &substitutor, options, &mut report);
        }
    }

    tracing::debug!(
        slides = report.slides,
        shapes = report.shapes,
        text_frames = report.text_frames,
        table_cells = report.table_cells,
        replacements = report.replacements,
        "filled placeholders"
    );
    Ok(report)
}

/// Fill every shape of a presentation in place.
pub fn fill_presentation(
    presentation: &mut Presentation,
    replacements: &Replacements,
    options: &FillOptions,
) -> Result<FillReport> {
    fill_slides(presentation.slides_mut(), replacements, options)
}

/// Collect the placeholder keys that appear in text frames and table cells.
pub fn find_placeholders(presentation: &Presentation) -> Result<BTreeSet<String>> {
    placeholders_in(presentation.slides())
}

fn placeholders_in(slides: &[Slide]) -> Result<BTreeSet<String>> {
    let pattern = Regex::new(PLACEHOLDER_PATTERN)?;
    let mut keys = BTreeSet::new();

    let mut collect = |text: String| {
        for caps in pattern.captures_iter(&text) {
            keys.insert(caps[1].to_string());
        }
    };

    for shape in slides.iter().flat_map(|s| s.shapes.iter()) {
        match &shape.kind {
            ShapeKind::Text(frame) => collect(frame.text()),
            ShapeKind::Table(table) => table.cells().for_each(|cell| collect(cell.text())),
            ShapeKind::Other => {}
        }
    }
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Cell, Paragraph, Row, TextRun};
    use serde_json::json;

    fn company() -> Replacements {
        [("companyName", "Acme")].into_iter().collect()
    }

    fn split_cell() -> Table {
        let mut frame = TextFrame::cell();
        frame.paragraphs.push(Paragraph::with_runs(["{compa", "nyName}"]));
        Table {
            rows: vec![Row {
                cells: vec![Cell { text_frame: frame }, Cell::with_text("{companyName} Inc")],
            }],
        }
    }

    #[test]
    fn test_replace_all_occurrences() {
        let substitutor = Substitutor::new(&company()).unwrap();
        let (text, count) = substitutor.replace("{companyName} and {companyName}");
        assert_eq!(text, "Acme and Acme");
        assert_eq!(count, 2);
    }

    #[test]
    fn test_unmatched_and_partial_tokens_untouched() {
        let substitutor = Substitutor::new(&company()).unwrap();
        let (text, count) = substitutor.replace("{unknown} {companyName {company");
        assert_eq!(text, "{unknown} {companyName {company");
        assert_eq!(count, 0);
    }

    #[test]
    fn test_values_are_not_substituted_again() {
        let replacements: Replacements = [("a", "{b}"), ("b", "{a}")].into_iter().collect();
        let substitutor = Substitutor::new(&replacements).unwrap();
        let (text, count) = substitutor.replace("{a}-{b}");
        assert_eq!(text, "{b}-{a}");
        assert_eq!(count, 2);
    }

    #[test]
    fn test_overlapping_tokens_prefer_longest() {
        let replacements: Replacements = [("a", "short"), ("a}b", "long")].into_iter().collect();
        let substitutor = Substitutor::new(&replacements).unwrap();
        assert_eq!(substitutor.replace("{a}b}").0, "long");
        assert_eq!(substitutor.replace("{a}").0, "short");
    }

    #[test]
    fn test_empty_mapping_is_a_no_op() {
        let substitutor = Substitutor::new(&Replacements::new()).unwrap();
        assert_eq!(substitutor.replace("{x}"), ("{x}".to_string(), 0));
    }

    #[test]
    fn test_regex_metacharacters_in_keys() {
        let replacements: Replacements = [("price.$", "10")].into_iter().collect();
        let substitutor = Substitutor::new(&replacements).unwrap();
        assert_eq!(substitutor.replace("{price.$} {priceX$}").0, "10 {priceX$}");
    }

    #[test]
    fn test_text_frame_exact_token() {
        let substitutor = Substitutor::new(&company()).unwrap();
        let mut frame = TextFrame::with_paragraphs(vec![Paragraph::with_text("{companyName}")]);

        assert_eq!(fill_text_frame(&mut frame, &substitutor), 1);
        assert_eq!(frame.text(), "Acme");
        assert_eq!(frame.run_count(), 1);
    }

    #[test]
    fn test_text_frame_split_token() {
        let substitutor = Substitutor::new(&company()).unwrap();
        let mut frame =
            TextFrame::with_paragraphs(vec![Paragraph::with_runs(["{compa", "nyName}"])]);

        assert_eq!(fill_text_frame(&mut frame, &substitutor), 1);
        assert_eq!(frame.paragraphs[0].runs, vec![TextRun::plain("Acme")]);
    }

    #[test]
    fn test_table_per_run_misses_split_token() {
        let substitutor = Substitutor::new(&company()).unwrap();
        let mut table = split_cell();

        assert_eq!(fill_table(&mut table, &substitutor, TableMatching::PerRun), 1);
        assert_eq!(table.cell(0, 0).unwrap().text(), "{companyName}");
        assert_eq!(table.cell(0, 0).unwrap().text_frame.run_count(), 2);
        assert_eq!(table.cell(0, 1).unwrap().text(), "Acme Inc");
    }

    #[test]
    fn test_table_whole_cell_matches_split_token() {
        let substitutor = Substitutor::new(&company()).unwrap();
        let mut table = split_cell();

        assert_eq!(fill_table(&mut table, &substitutor, TableMatching::WholeCell), 2);
        assert_eq!(table.cell(0, 0).unwrap().text(), "Acme");
        assert_eq!(table.cell(0, 0).unwrap().text_frame.run_count(), 1);
    }

    #[test]
    fn test_fill_slides_report() {
        let mut slides = vec![Slide::new(
            "ppt/slides/slide1.xml",
            vec![
                Shape::text(
                    "Title",
                    TextFrame::with_paragraphs(vec![Paragraph::with_text("{companyName}")]),
                ),
                Shape::table("Table", split_cell()),
                Shape::default(),
            ],
        )];

        let report = fill_slides(&mut slides, &company(), &FillOptions::new()).unwrap();
        assert_eq!(
            report,
            FillReport {
                slides: 1,
                shapes: 3,
                text_frames: 1,
                table_cells: 2,
                replacements: 2,
            }
        );
        assert_eq!(slides[0].shapes[2], Shape::default());
    }

    #[test]
    fn test_find_placeholders() {
        let slides = vec![Slide::new(
            "ppt/slides/slide1.xml",
            vec![
                Shape::text(
                    "Body",
                    TextFrame::with_paragraphs(vec![Paragraph::with_runs([
                        "{compa",
                        "nyName} in {city}, not { spaced }",
                    ])]),
                ),
                Shape::table("Table", split_cell()),
            ],
        )];

        let keys = placeholders_in(&slides).unwrap();
        assert_eq!(
            keys.into_iter().collect::<Vec<_>>(),
            vec!["city".to_string(), "companyName".to_string()]
        );
    }

    #[test]
    fn test_from_json_scalars() {
        let replacements = Replacements::from_json(&json!({
            "name": "Acme",
            "count": 3,
            "ratio": 1.5,
            "whole": 1.0,
            "active": true,
            "archived": false,
            "missing": null
        }))
        .unwrap();

        assert_eq!(replacements.len(), 7);
        assert_eq!(replacements.get("name"), Some("Acme"));
        assert_eq!(replacements.get("count"), Some("3"));
        assert_eq!(replacements.get("ratio"), Some("1.5"));
        assert_eq!(replacements.get("whole"), Some("1.0"));
        assert_eq!(replacements.get("active"), Some("True"));
        assert_eq!(replacements.get("archived"), Some("False"));
        assert_eq!(replacements.get("missing"), Some("None"));
    }

    #[test]
    fn test_from_json_skips_nested_values() {
        let replacements =
            Replacements::from_json(&json!({"a": "x", "b": [1, 2], "c": {"d": 1}})).unwrap();
        assert_eq!(replacements.len(), 1);
        assert_eq!(replacements.get("a"), Some("x"));
        assert_eq!(replacements.get("b"), None);

        let only_nested = Replacements::from_json(&json!({"nested": {"a": 1}})).unwrap();
        assert!(only_nested.is_empty());
    }

    #[test]
    fn test_from_json_rejects_bad_input() {
        assert!(Replacements::from_json(&json!({})).is_err());
        assert!(Replacements::from_json(&json!(["a"])).is_err());
        assert!(Replacements::from_json(&json!("text")).is_err());
        assert!(Replacements::from_json_slice(b"not json").is_err());
        assert!(Replacements::from_json_slice(b"").is_err());
    }
}
