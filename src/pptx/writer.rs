//! Slide XML writer.

use crate::error::{Error, Result};
use crate::model::{Fragment, Paragraph, RunKind, Slide, TextFrame, TextRun, TextSlot};
use std::borrow::Cow;

/// Regenerate a slide part: verbatim fragments plus re-rendered text bodies.
pub(crate) fn render_slide(slide: &Slide) -> Result<String> {
    if slide.fragments.is_empty() {
        return Err(Error::InvalidData(format!(
            "{}: slide was not read from a package",
            slide.part_name
        )));
    }

    let mut out = String::new();
    for fragment in &slide.fragments {
        match fragment {
            Fragment::Xml(xml) => out.push_str(xml),
            Fragment::Text(slot) => {
                let frame = lookup_frame(slide, *slot).ok_or_else(|| {
                    Error::InvalidData(format!(
                        "{}: text body {:?} is no longer present",
                        slide.part_name, slot
                    ))
                })?;
                write_text_frame(&mut out, frame);
            }
        }
    }
    Ok(out)
}

fn lookup_frame(slide: &Slide, slot: TextSlot) -> Option<&TextFrame> {
    match slot {
        TextSlot::Shape(index) => slide.shapes.get(index)?.text_frame(),
        TextSlot::Cell { shape, row, col } => slide
            .shapes
            .get(shape)?
            .table_ref()?
            .cell(row, col)
            .map(|cell| &cell.text_frame),
    }
}

fn qualify(prefix: &str, local: &str) -> String {
    if prefix.is_empty() {
        local.to_string()
    } else {
        format!("{}:{}", prefix, local)
    }
}

/// Characters XML 1.0 allows in content. C1 controls are allowed.
fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}

/// Escape text for element content, dropping characters XML 1.0 cannot carry.
fn escape_text(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_xml_char) {
        quick_xml::escape::escape(text)
    } else {
        let cleaned: String = text.chars().filter(|c| is_xml_char(*c)).collect();
        Cow::Owned(quick_xml::escape::escape(cleaned.as_str()).into_owned())
    }
}

pub(crate) fn write_text_frame(out: &mut String, frame: &TextFrame) {
    out.push_str(&frame.open_tag);
    out.push_str(&frame.preamble);
    for paragraph in &frame.paragraphs {
        write_paragraph(out, paragraph, &frame.prefix);
    }
    out.push_str(&frame.trailer);
    out.push_str("</");
    out.push_str(&frame.element);
    out.push('>');
}

fn write_paragraph(out: &mut String, paragraph: &Paragraph, prefix: &str) {
    let tag = qualify(prefix, "p");
    if paragraph.properties.is_none()
        && paragraph.runs.is_empty()
        && paragraph.end_properties.is_none()
    {
        out.push_str(&format!("<{}/>", tag));
        return;
    }

    out.push_str(&format!("<{}>", tag));
    if let Some(ref properties) = paragraph.properties {
        out.push_str(properties);
    }
    for run in &paragraph.runs {
        write_run(out, run, prefix);
    }
    if let Some(ref end_properties) = paragraph.end_properties {
        out.push_str(end_properties);
    }
    out.push_str(&format!("</{}>", tag));
}

fn write_run(out: &mut String, run: &TextRun, prefix: &str) {
    let properties = run.properties.as_deref().unwrap_or("");
    match &run.kind {
        RunKind::Text => {
            let r = qualify(prefix, "r");
            let t = qualify(prefix, "t");
            out.push_str(&format!(
                "<{r}>{properties}<{t}>{text}</{t}></{r}>",
                text = escape_text(&run.text)
            ));
        }
        RunKind::LineBreak => {
            let br = qualify(prefix, "br");
            if properties.is_empty() {
                out.push_str(&format!("<{}/>", br));
            } else {
                out.push_str(&format!("<{br}>{properties}</{br}>"));
            }
        }
        RunKind::Field { open_tag } => {
            let t = qualify(prefix, "t");
            out.push_str(open_tag);
            out.push_str(&format!(
                "{properties}<{t}>{text}</{t}></{fld}>",
                text = escape_text(&run.text),
                fld = qualify(prefix, "fld")
            ));
        }
        RunKind::Opaque { xml } => out.push_str(xml),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pptx::parser::parse_slide;
    use crate::pptx::parser::tests::SLIDE_XML;

    #[test]
    fn test_unchanged_slide_reparses_identically() {
        let slide = parse_slide("ppt/slides/slide1.xml", SLIDE_XML).unwrap();
        let xml = render_slide(&slide).unwrap();
        let again = parse_slide("ppt/slides/slide1.xml", &xml).unwrap();

        assert_eq!(slide.shapes, again.shapes);
        assert!(xml.contains(r#"<a:xfrm><a:off x="0" y="0"/><a:ext cx="100" cy="100"/></a:xfrm>"#));
        assert!(xml.contains("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>"));
        assert!(xml.contains("<a:t>nyName} &amp; co</a:t>"));
    }

    #[test]
    fn test_render_after_set_text() {
        let mut slide = parse_slide("ppt/slides/slide1.xml", SLIDE_XML).unwrap();
        slide.shapes[0]
            .text_frame_mut()
            .unwrap()
            .set_text("Acme <Ltd>");
        let xml = render_slide(&slide).unwrap();

        assert!(xml.contains(
            r#"<p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:pPr algn="ctr"/><a:r><a:rPr lang="en-US" b="1"/><a:t>Acme &lt;Ltd&gt;</a:t></a:r><a:endParaRPr lang="en-US"/></a:p></p:txBody>"#
        ));
    }

    #[test]
    fn test_render_detects_removed_shape() {
        let mut slide = parse_slide("ppt/slides/slide1.xml", SLIDE_XML).unwrap();
        slide.shapes.truncate(1);
        assert!(matches!(render_slide(&slide), Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_escape_text_drops_control_characters() {
        assert_eq!(escape_text("a\u{000B}b\u{0001}"), "ab");
        assert_eq!(escape_text("tab\there"), "tab\there");
        assert_eq!(escape_text("x & y"), "x &amp; y");
        assert_eq!(escape_text("\u{FFFE}z"), "z");
    }

    #[test]
    fn test_escape_text_keeps_c1_characters() {
        assert_eq!(escape_text("x\u{0085}y\u{009F}"), "x\u{0085}y\u{009F}");
    }

    #[test]
    fn test_slide_without_source_cannot_render() {
        let slide = Slide::new("ppt/slides/slide9.xml", Vec::new());
        assert!(render_slide(&slide).is_err());
    }
}
