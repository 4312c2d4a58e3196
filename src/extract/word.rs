use super::{ooxml, DocumentMetadata, ExtractError, Method};
use quick_xml::events::Event;
use quick_xml::Reader;

pub(crate) const METHODS: &[Method] = &[("docx", extract_text)];

/// Text of `word/document.xml`, split into top-level paragraphs and table cells
#[derive(Debug, Default)]
struct Body {
    paragraphs: Vec<String>,
    cells: Vec<String>,
}

/// Body paragraphs in document order, then table cells in row-major order
fn extract_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut package = ooxml::open(bytes)?;
    let xml = ooxml::read_part(&mut package, "word/document.xml")?;
    let body = parse_body(&xml)?;

    let mut lines = body.paragraphs;
    lines.extend(body.cells);
    Ok(lines.join("\n"))
}

pub(crate) fn extract_metadata(bytes: &[u8]) -> Result<DocumentMetadata, ExtractError> {
    let mut package = ooxml::open(bytes)?;
    Ok(DocumentMetadata {
        fields: ooxml::core_properties(&mut package)?,
        page_count: None,
    })
}

fn parse_body(xml: &str) -> Result<Body, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut body = Body::default();

    // Open paragraphs; more than one only inside text boxes
    let mut paragraphs: Vec<String> = Vec::new();
    // Open table cells, each collecting its paragraphs
    let mut cells: Vec<Vec<String>> = Vec::new();
    let mut in_run = false;
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"w:p" => paragraphs.push(String::new()),
                b"w:tc" => cells.push(Vec::new()),
                b"w:r" => in_run = true,
                b"w:t" => in_text = true,
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:p" => close_paragraph(String::new(), &paragraphs, &mut cells, &mut body),
                b"w:tc" => body.cells.push(String::new()),
                b"w:tab" if in_run => push_char(&mut paragraphs, '\t'),
                b"w:br" | b"w:cr" if in_run => push_char(&mut paragraphs, '\n'),
                _ => {}
            },
            Event::Text(t) if in_text => {
                let text = t.unescape()?;
                if let Some(paragraph) = paragraphs.last_mut() {
                    paragraph.push_str(&text);
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:r" => in_run = false,
                b"w:p" => {
                    if let Some(text) = paragraphs.pop() {
                        close_paragraph(text, &paragraphs, &mut cells, &mut body);
                    }
                }
                b"w:tc" => {
                    if let Some(cell) = cells.pop() {
                        body.cells.push(cell.join("\n"));
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(body)
}

fn close_paragraph(text: String, open: &[String], cells: &mut [Vec<String>], body: &mut Body) {
    // Text-box paragraphs nested in another paragraph are not part of the flow
    if !open.is_empty() {
        return;
    }
    match cells.last_mut() {
        Some(cell) => cell.push(text),
        None => body.paragraphs.push(text),
    }
}

fn push_char(paragraphs: &mut [String], c: char) {
    if let Some(paragraph) = paragraphs.last_mut() {
        paragraph.push(c);
    }
}
