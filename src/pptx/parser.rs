//! Slide XML parser.
//!
//! Builds the [`Slide`] model from a slide part. Text bodies become text
//! frames; everything else is remembered as verbatim XML fragments so the
//! writer can reproduce the part with only the text bodies regenerated.

use crate::error::{Error, Result};
use crate::model::{
    Cell, Fragment, Paragraph, Row, RunKind, Shape, ShapeKind, Slide, Table, TextFrame, TextRun,
    TextSlot,
};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Elements of a shape tree that count as shapes.
const SHAPE_ELEMENTS: [&[u8]; 6] = [
    b"sp",
    b"graphicFrame",
    b"pic",
    b"grpSp",
    b"cxnSp",
    b"contentPart",
];

/// A text body found while parsing, with its byte range in the slide XML.
struct TextSpan {
    begin: usize,
    end: usize,
    slot: TextSlot,
}

/// Event reader that tracks byte offsets into the source string.
struct SlideReader<'a> {
    xml: &'a str,
    reader: Reader<&'a [u8]>,
}

/// Parse a slide part into a [`Slide`].
pub(crate) fn parse_slide(part_name: &str, xml: &str) -> Result<Slide> {
    let mut cursor = SlideReader::new(xml);
    let mut shapes = Vec::new();
    let mut fragments = Vec::new();
    let mut copied_to = 0;
    let mut path: Vec<Vec<u8>> = Vec::new();

    loop {
        let (_, event) = cursor.next()?;
        match event {
            Event::Start(e) => {
                let local = e.local_name().as_ref().to_vec();
                if !in_shape_tree(&path) || !SHAPE_ELEMENTS.contains(&local.as_slice()) {
                    path.push(local);
                    continue;
                }

                let index = shapes.len();
                let mut spans = Vec::new();
                let shape = match local.as_slice() {
                    b"sp" => cursor.parse_text_shape(index, &mut spans)?,
                    b"graphicFrame" => cursor.parse_graphic_frame(index, &mut spans)?,
                    _ => cursor.parse_other_shape(&local)?,
                };
                shapes.push(shape);

                for span in spans {
                    fragments.push(Fragment::Xml(xml[copied_to..span.begin].to_string()));
                    fragments.push(Fragment::Text(span.slot));
                    copied_to = span.end;
                }
            }
            Event::Empty(e) => {
                if in_shape_tree(&path) && SHAPE_ELEMENTS.contains(&e.local_name().as_ref()) {
                    shapes.push(Shape::default());
                }
            }
            Event::End(_) => {
                path.pop();
            }
            Event::Eof => break,
            _ => {}
        }
    }
    fragments.push(Fragment::Xml(xml[copied_to..].to_string()));

    tracing::debug!(
        part = part_name,
        shapes = shapes.len(),
        text_bodies = fragments.len() / 2,
        "parsed slide"
    );

    Ok(Slide {
        part_name: part_name.to_string(),
        shapes,
        fragments,
    })
}

/// True when the innermost open elements are `p:cSld/p:spTree`.
fn in_shape_tree(path: &[Vec<u8>]) -> bool {
    matches!(path, [.., parent, last] if parent.as_slice() == b"cSld" && last.as_slice() == b"spTree")
}

fn prefix_of(e: &BytesStart<'_>) -> String {
    e.name()
        .prefix()
        .map(|p| String::from_utf8_lossy(p.as_ref()).into_owned())
        .unwrap_or_default()
}

fn unexpected_eof(element: &str) -> Error {
    Error::XmlParse(format!("unexpected end of document inside <{}>", element))
}

impl<'a> SlideReader<'a> {
    fn new(xml: &'a str) -> Self {
        let mut reader = Reader::from_str(xml);
        // Whitespace inside a:t is significant
        reader.config_mut().trim_text(false);
        Self { xml, reader }
    }

    fn position(&self) -> usize {
        self.reader.buffer_position() as usize
    }

    /// Read the next event along with the offset it starts at.
    fn next(&mut self) -> Result<(usize, Event<'a>)> {
        let begin = self.position();
        let event = self.reader.read_event()?;
        Ok((begin, event))
    }

    /// Source text from `begin` up to the current position.
    fn slice(&self, begin: usize) -> &'a str {
        &self.xml[begin..self.position()]
    }

    /// Consume the rest of an element whose start tag was just read.
    fn skip(&mut self, start: &BytesStart<'_>) -> Result<()> {
        self.reader.read_to_end(start.name())?;
        Ok(())
    }

    /// Consume an element whose start tag was just read and return its full XML.
    fn capture(&mut self, begin: usize, start: &BytesStart<'_>) -> Result<String> {
        self.skip(start)?;
        Ok(self.slice(begin).to_string())
    }

    fn read_identity(&self, e: &BytesStart<'_>, shape: &mut Shape) -> Result<()> {
        for attr in e.attributes() {
            let attr = attr?;
            match attr.key.as_ref() {
                b"id" => shape.id = attr.unescape_value()?.parse().ok(),
                b"name" => shape.name = attr.unescape_value()?.into_owned(),
                _ => {}
            }
        }
        Ok(())
    }

    /// Parse a `p:sp` after its start tag.
    fn parse_text_shape(&mut self, index: usize, spans: &mut Vec<TextSpan>) -> Result<Shape> {
        let mut shape = Shape::default();

        loop {
            let (begin, event) = self.next()?;
            match event {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"nvSpPr" => {}
                    b"cNvPr" => {
                        self.read_identity(&e, &mut shape)?;
                        self.skip(&e)?;
                    }
                    b"txBody" => {
                        let frame = self.parse_text_frame(begin, &e)?;
                        spans.push(TextSpan {
                            begin,
                            end: self.position(),
                            slot: TextSlot::Shape(index),
                        });
                        shape.kind = ShapeKind::Text(frame);
                    }
                    _ => self.skip(&e)?,
                },
                Event::Empty(e) if e.local_name().as_ref() == b"cNvPr" => {
                    self.read_identity(&e, &mut shape)?;
                }
                Event::End(e) if e.local_name().as_ref() == b"sp" => break,
                Event::Eof => return Err(unexpected_eof("sp")),
                _ => {}
            }
        }

        Ok(shape)
    }

    /// Parse a `p:graphicFrame` after its start tag; only tables are modelled.
    fn parse_graphic_frame(&mut self, index: usize, spans: &mut Vec<TextSpan>) -> Result<Shape> {
        let mut shape = Shape::default();

        loop {
            let (_, event) = self.next()?;
            match event {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"nvGraphicFramePr" | b"graphic" | b"graphicData" => {}
                    b"cNvPr" => {
                        self.read_identity(&e, &mut shape)?;
                        self.skip(&e)?;
                    }
                    b"tbl" => {
                        let table = self.parse_table(index, spans)?;
                        shape.kind = ShapeKind::Table(table);
                    }
                    _ => self.skip(&e)?,
                },
                Event::Empty(e) if e.local_name().as_ref() == b"cNvPr" => {
                    self.read_identity(&e, &mut shape)?;
                }
                Event::End(e) if e.local_name().as_ref() == b"graphicFrame" => break,
                Event::Eof => return Err(unexpected_eof("graphicFrame")),
                _ => {}
            }
        }

        Ok(shape)
    }

    /// Parse an `a:tbl` after its start tag.
    fn parse_table(&mut self, index: usize, spans: &mut Vec<TextSpan>) -> Result<Table> {
        let mut table = Table::new();
        let mut in_cell = false;

        loop {
            let (begin, event) = self.next()?;
            match event {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"tr" => table.rows.push(Row::default()),
                    b"tc" => {
                        let row = table
                            .rows
                            .last_mut()
                            .ok_or_else(|| Error::XmlParse("table cell outside a row".into()))?;
                        row.cells.push(Cell {
                            text_frame: TextFrame::cell(),
                        });
                        in_cell = true;
                    }
                    b"txBody" if in_cell => {
                        let frame = self.parse_text_frame(begin, &e)?;
                        let row = table.rows.len() - 1;
                        let cells = &mut table.rows[row].cells;
                        let col = cells.len() - 1;
                        cells[col].text_frame = frame;
                        spans.push(TextSpan {
                            begin,
                            end: self.position(),
                            slot: TextSlot::Cell {
                                shape: index,
                                row,
                                col,
                            },
                        });
                    }
                    _ => self.skip(&e)?,
                },
                Event::Empty(e) if e.local_name().as_ref() == b"tc" => {
                    if let Some(row) = table.rows.last_mut() {
                        row.cells.push(Cell {
                            text_frame: TextFrame::cell(),
                        });
                    }
                }
                Event::End(e) => match e.local_name().as_ref() {
                    b"tc" => in_cell = false,
                    b"tbl" => break,
                    _ => {}
                },
                Event::Eof => return Err(unexpected_eof("tbl")),
                _ => {}
            }
        }

        Ok(table)
    }

    /// Consume a shape that carries neither text nor a table, keeping its identity.
    fn parse_other_shape(&mut self, local: &[u8]) -> Result<Shape> {
        let mut shape = Shape::default();
        let mut identified = false;
        let mut depth = 0usize;

        loop {
            let (_, event) = self.next()?;
            match event {
                Event::Start(e) => {
                    if !identified && e.local_name().as_ref() == b"cNvPr" {
                        self.read_identity(&e, &mut shape)?;
                        identified = true;
                    }
                    depth += 1;
                }
                Event::Empty(e) => {
                    if !identified && e.local_name().as_ref() == b"cNvPr" {
                        self.read_identity(&e, &mut shape)?;
                        identified = true;
                    }
                }
                Event::End(_) => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                }
                Event::Eof => return Err(unexpected_eof(&String::from_utf8_lossy(local))),
                _ => {}
            }
        }

        Ok(shape)
    }

    /// Parse a text body (`p:txBody` or `a:txBody`) after its start tag.
    fn parse_text_frame(&mut self, begin: usize, start: &BytesStart<'_>) -> Result<TextFrame> {
        let mut frame = TextFrame {
            paragraphs: Vec::new(),
            element: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            open_tag: self.slice(begin).to_string(),
            prefix: "a".to_string(),
            preamble: String::new(),
            trailer: String::new(),
        };
        let mut prefix_seen = false;

        loop {
            let (begin, event) = self.next()?;
            match event {
                Event::Start(e) => {
                    if !prefix_seen {
                        frame.prefix = prefix_of(&e);
                        prefix_seen = true;
                    }
                    if e.local_name().as_ref() == b"p" {
                        let paragraph = self.parse_paragraph()?;
                        frame.paragraphs.push(paragraph);
                    } else {
                        let xml = self.capture(begin, &e)?;
                        frame.push_raw(&xml);
                    }
                }
                Event::Empty(e) => {
                    if !prefix_seen {
                        frame.prefix = prefix_of(&e);
                        prefix_seen = true;
                    }
                    if e.local_name().as_ref() == b"p" {
                        frame.paragraphs.push(Paragraph::new());
                    } else {
                        let xml = self.slice(begin).to_string();
                        frame.push_raw(&xml);
                    }
                }
                Event::End(e) if e.local_name().as_ref() == b"txBody" => break,
                Event::Eof => return Err(unexpected_eof("txBody")),
                Event::Text(_) if !frame.paragraphs.is_empty() => {}
                _ => {
                    let xml = self.slice(begin).to_string();
                    frame.push_raw(&xml);
                }
            }
        }

        Ok(frame)
    }

    /// Parse an `a:p` after its start tag.
    fn parse_paragraph(&mut self) -> Result<Paragraph> {
        let mut paragraph = Paragraph::new();

        loop {
            let (begin, event) = self.next()?;
            match event {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"pPr" => paragraph.properties = Some(self.capture(begin, &e)?),
                    b"endParaRPr" => paragraph.end_properties = Some(self.capture(begin, &e)?),
                    b"r" => paragraph.runs.push(self.parse_run_content(b"r")?),
                    b"br" => {
                        let properties = self.parse_run_content(b"br")?.properties;
                        paragraph.runs.push(TextRun::line_break(properties));
                    }
                    b"fld" => {
                        let open_tag = self.slice(begin).to_string();
                        let mut run = self.parse_run_content(b"fld")?;
                        run.kind = RunKind::Field { open_tag };
                        paragraph.runs.push(run);
                    }
                    _ => {
                        let xml = self.capture(begin, &e)?;
                        paragraph.runs.push(TextRun {
                            kind: RunKind::Opaque { xml },
                            text: String::new(),
                            properties: None,
                        });
                    }
                },
                Event::Empty(e) => {
                    let xml = self.slice(begin).to_string();
                    match e.local_name().as_ref() {
                        b"pPr" => paragraph.properties = Some(xml),
                        b"endParaRPr" => paragraph.end_properties = Some(xml),
                        b"br" => paragraph.runs.push(TextRun::line_break(None)),
                        b"r" => paragraph.runs.push(TextRun::plain("")),
                        _ => paragraph.runs.push(TextRun {
                            kind: RunKind::Opaque { xml },
                            text: String::new(),
                            properties: None,
                        }),
                    }
                }
                Event::End(e) if e.local_name().as_ref() == b"p" => break,
                Event::Eof => return Err(unexpected_eof("p")),
                _ => {}
            }
        }

        Ok(paragraph)
    }

    /// Parse the children of `a:r`, `a:br` or `a:fld` up to the matching end tag.
    fn parse_run_content(&mut self, element: &[u8]) -> Result<TextRun> {
        let mut run = TextRun::default();

        loop {
            let (begin, event) = self.next()?;
            match event {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"rPr" => run.properties = Some(self.capture(begin, &e)?),
                    b"t" => run.text.push_str(&self.read_text()?),
                    _ => self.skip(&e)?,
                },
                Event::Empty(e) if e.local_name().as_ref() == b"rPr" => {
                    run.properties = Some(self.slice(begin).to_string());
                }
                Event::End(e) if e.local_name().as_ref() == element => break,
                Event::Eof => return Err(unexpected_eof(&String::from_utf8_lossy(element))),
                _ => {}
            }
        }

        Ok(run)
    }

    /// Read the character content of `a:t` up to its end tag.
    fn read_text(&mut self) -> Result<String> {
        let mut text = String::new();
        loop {
            match self.reader.read_event()? {
                Event::Text(e) => text.push_str(&e.unescape()?),
                Event::CData(e) => text.push_str(&String::from_utf8_lossy(&e.into_inner())),
                Event::End(_) => break,
                Event::Eof => return Err(unexpected_eof("t")),
                _ => {}
            }
        }
        Ok(text)
    }
}

impl TextFrame {
    /// Keep non-paragraph XML in front of or behind the paragraphs.
    fn push_raw(&mut self, xml: &str) {
        if self.paragraphs.is_empty() {
            self.preamble.push_str(xml);
        } else {
            self.trailer.push_str(xml);
        }
    }
}
