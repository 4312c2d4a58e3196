use super::{DocumentMetadata, ExtractError, Method};
use lopdf::{Document, Object};

/// Layout-aware extraction first, page-by-page extraction as fallback
pub(crate) const METHODS: &[Method] = &[
    ("pdf-extract", extract_with_layout),
    ("lopdf", extract_by_page),
];

/// Info dictionary keys and the metadata names they are stored under
const INFO_KEYS: &[(&str, &str)] = &[
    ("Title", "title"),
    ("Author", "author"),
    ("Subject", "subject"),
    ("Creator", "creator"),
    ("Producer", "producer"),
    ("CreationDate", "creation_date"),
    ("ModDate", "modification_date"),
];

fn extract_with_layout(bytes: &[u8]) -> Result<String, ExtractError> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| ExtractError::Pdf(e.to_string()))?;
    Ok(text.trim().to_string())
}

fn extract_by_page(bytes: &[u8]) -> Result<String, ExtractError> {
    let doc = load(bytes)?;
    let mut text = String::new();

    for page_number in doc.get_pages().keys() {
        let page_text = doc
            .extract_text(&[*page_number])
            .map_err(|e| ExtractError::Pdf(format!("page {}: {}", page_number, e)))?;
        if !page_text.trim().is_empty() {
            text.push_str(&page_text);
            text.push('\n');
        }
    }

    Ok(text.trim().to_string())
}

/// Reads the trailer's info dictionary and the page count
pub(crate) fn extract_metadata(bytes: &[u8]) -> Result<DocumentMetadata, ExtractError> {
    let doc = load(bytes)?;
    let mut metadata = DocumentMetadata::default();

    if let Ok(info) = doc.trailer.get(b"Info") {
        let info = resolve(&doc, info)?
            .as_dict()
            .map_err(|e| ExtractError::Pdf(e.to_string()))?;

        for (key, name) in INFO_KEYS {
            if let Ok(value) = info.get(key.as_bytes()) {
                if let Object::String(raw, _) = resolve(&doc, value)? {
                    let value = decode_pdf_string(raw);
                    if !value.is_empty() {
                        metadata.fields.insert(name.to_string(), value);
                    }
                }
            }
        }
    }

    let page_count = doc.get_pages().len() as u32;
    metadata
        .fields
        .insert("page_count".to_string(), page_count.to_string());
    metadata.page_count = Some(page_count);

    Ok(metadata)
}

fn load(bytes: &[u8]) -> Result<Document, ExtractError> {
    Document::load_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))
}

fn resolve<'a>(doc: &'a Document, object: &'a Object) -> Result<&'a Object, ExtractError> {
    match object {
        Object::Reference(id) => doc
            .get_object(*id)
            .map_err(|e| ExtractError::Pdf(e.to_string())),
        other => Ok(other),
    }
}

/// Decodes a PDF text string: UTF-16BE when it carries a BOM, otherwise
/// treated as single-byte text
fn decode_pdf_string(raw: &[u8]) -> String {
    let decoded = match raw.strip_prefix(&[0xFE, 0xFF]) {
        Some(utf16) => {
            let units: Vec<u16> = utf16
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        None => raw.iter().map(|&b| b as char).collect(),
    };
    decoded.trim().to_string()
}

/// Builds a single-page PDF saying "Hello PDF" with an info dictionary;
/// without `base_font` the page font has no `BaseFont` entry
#[cfg(test)]
pub(crate) fn test_pdf(title: &str, base_font: Option<&str>) -> Vec<u8> {
    use lopdf::{dictionary, Dictionary, StringFormat};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut font = dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
    };
    if let Some(base_font) = base_font {
        font.set("BaseFont", Object::Name(base_font.as_bytes().to_vec()));
    }
    let font_id = doc.add_object(font);
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });
    let content = b"BT /F1 24 Tf 72 700 Td (Hello PDF) Tj ET".to_vec();
    let content_id = doc.add_object(lopdf::Stream::new(Dictionary::new(), content));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::String(title.as_bytes().to_vec(), StringFormat::Literal),
        "Author" => Object::String(b"Ada".to_vec(), StringFormat::Literal),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).expect("in-memory PDF");
    out
}
