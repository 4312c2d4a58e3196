//! Office Open XML package helpers shared by the Word and presentation extractors

use super::ExtractError;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use zip::result::ZipError;
use zip::ZipArchive;

pub(crate) type Package<'a> = ZipArchive<Cursor<&'a [u8]>>;

/// Core property elements and the metadata names they are stored under
const CORE_PROPERTIES: &[(&str, &str)] = &[
    ("title", "title"),
    ("creator", "author"),
    ("subject", "subject"),
    ("created", "created"),
    ("modified", "modified"),
];

pub(crate) fn open(bytes: &[u8]) -> Result<Package<'_>, ExtractError> {
    Ok(ZipArchive::new(Cursor::new(bytes))?)
}

/// Reads one part of the package as UTF-8 text
pub(crate) fn read_part(package: &mut Package<'_>, name: &str) -> Result<String, ExtractError> {
    let mut part = package.by_name(name).map_err(|e| match e {
        ZipError::FileNotFound => ExtractError::MissingPart(name.to_string()),
        other => ExtractError::Archive(other),
    })?;
    let mut xml = String::new();
    part.read_to_string(&mut xml)?;
    Ok(xml)
}

/// Reads `docProps/core.xml`; packages without it have no core properties
pub(crate) fn core_properties(
    package: &mut Package<'_>,
) -> Result<BTreeMap<String, String>, ExtractError> {
    let xml = match read_part(package, "docProps/core.xml") {
        Ok(xml) => xml,
        Err(ExtractError::MissingPart(_)) => return Ok(BTreeMap::new()),
        Err(e) => return Err(e),
    };

    let mut reader = Reader::from_str(&xml);
    let mut properties = BTreeMap::new();
    let mut current: Option<&str> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                current = CORE_PROPERTIES
                    .iter()
                    .find(|(local, _)| e.local_name().as_ref() == local.as_bytes())
                    .map(|(_, name)| *name);
            }
            Event::Text(t) => {
                if let Some(name) = current {
                    let value = t.unescape()?;
                    let value = value.trim();
                    if !value.is_empty() {
                        properties.insert(name.to_string(), value.to_string());
                    }
                }
            }
            Event::End(_) => current = None,
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(properties)
}
