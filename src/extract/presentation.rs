use super::{ExtractError, Method};

/// Returned for presentations when presentation support is compiled out
pub const PRESENTATION_UNAVAILABLE: &str =
    "PowerPoint document detected - presentation support required for text extraction";

pub(crate) const METHODS: &[Method] = &[("pptx", extract_text)];

#[cfg(not(feature = "presentation"))]
fn extract_text(_bytes: &[u8]) -> Result<String, ExtractError> {
    Ok(PRESENTATION_UNAVAILABLE.to_string())
}

/// Per slide: a `Slide <n>:` marker, each shape's text, then an empty line
#[cfg(feature = "presentation")]
fn extract_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut package = super::ooxml::open(bytes)?;
    let presentation = super::ooxml::read_part(&mut package, "ppt/presentation.xml")?;
    let rels = super::ooxml::read_part(&mut package, "ppt/_rels/presentation.xml.rels")?;

    let targets = pptx::relationship_targets(&rels)?;
    let mut lines = Vec::new();

    for (index, rel_id) in pptx::slide_ids(&presentation)?.iter().enumerate() {
        let path = targets
            .get(rel_id)
            .map(|target| pptx::resolve_target(target))
            .ok_or_else(|| ExtractError::MissingPart(format!("slide relationship {}", rel_id)))?;
        let slide = super::ooxml::read_part(&mut package, &path)?;

        lines.push(format!("Slide {}:", index + 1));
        lines.extend(pptx::shape_texts(&slide)?);
        lines.push(String::new());
    }

    Ok(lines.join("\n"))
}

#[cfg(feature = "presentation")]
mod pptx {
    use super::ExtractError;
    use quick_xml::events::{BytesStart, Event};
    use quick_xml::Reader;
    use std::collections::HashMap;

    fn attribute(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
        e.attributes()
            .flatten()
            .find(|attr| attr.key.as_ref() == key)
            .map(|attr| String::from_utf8_lossy(&attr.value).into_owned())
    }

    /// Relationship ids of the slides, in presentation order
    pub(super) fn slide_ids(xml: &str) -> Result<Vec<String>, ExtractError> {
        let mut reader = Reader::from_str(xml);
        let mut ids = Vec::new();

        loop {
            match reader.read_event()? {
                Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"p:sldId" => {
                    if let Some(id) = attribute(&e, b"r:id") {
                        ids.push(id);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(ids)
    }

    /// Maps relationship ids to their targets
    pub(super) fn relationship_targets(xml: &str) -> Result<HashMap<String, String>, ExtractError> {
        let mut reader = Reader::from_str(xml);
        let mut targets = HashMap::new();

        loop {
            match reader.read_event()? {
                Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                    if let (Some(id), Some(target)) =
                        (attribute(&e, b"Id"), attribute(&e, b"Target"))
                    {
                        targets.insert(id, target);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(targets)
    }

    /// Resolves a relationship target against the `ppt/` directory
    pub(super) fn resolve_target(target: &str) -> String {
        match target.strip_prefix('/') {
            Some(absolute) => absolute.to_string(),
            None => format!("ppt/{}", target.trim_start_matches("./")),
        }
    }

    /// Non-blank text of every shape on a slide, in shape order
    pub(super) fn shape_texts(xml: &str) -> Result<Vec<String>, ExtractError> {
        let mut reader = Reader::from_str(xml);
        let mut texts = Vec::new();
        let mut shape: Option<Vec<String>> = None;
        let mut in_text = false;

        loop {
            match reader.read_event()? {
                Event::Start(e) => match e.name().as_ref() {
                    b"p:sp" => shape = Some(Vec::new()),
                    b"a:p" => {
                        if let Some(paragraphs) = shape.as_mut() {
                            paragraphs.push(String::new());
                        }
                    }
                    b"a:t" => in_text = true,
                    _ => {}
                },
                Event::Empty(e) => match e.name().as_ref() {
                    b"a:p" => {
                        if let Some(paragraphs) = shape.as_mut() {
                            paragraphs.push(String::new());
                        }
                    }
                    b"a:br" => {
                        if let Some(paragraph) = shape.as_mut().and_then(|p| p.last_mut()) {
                            paragraph.push('\n');
                        }
                    }
                    _ => {}
                },
                Event::Text(t) if in_text => {
                    let text = t.unescape()?;
                    if let Some(paragraph) = shape.as_mut().and_then(|p| p.last_mut()) {
                        paragraph.push_str(&text);
                    }
                }
                Event::End(e) => match e.name().as_ref() {
                    b"a:t" => in_text = false,
                    b"p:sp" => {
                        if let Some(paragraphs) = shape.take() {
                            let text = paragraphs.join("\n");
                            if !text.trim().is_empty() {
                                texts.push(text);
                            }
                        }
                    }
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(texts)
    }
}


#[cfg(all(test, not(feature = "presentation")))]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_without_support() {
        assert_eq!(extract_text(b"").unwrap(), PRESENTATION_UNAVAILABLE);
    }
}
