use super::{ExtractError, Method};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;

pub(crate) const METHODS: &[Method] = &[("calamine", extract_text)];

/// Per sheet in workbook order: a `Sheet: <name>` line, then one line per
/// row of tab-joined non-empty cells. Cached values are used, not formulas.
fn extract_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let mut lines = Vec::new();

    for name in workbook.sheet_names() {
        lines.push(format!("Sheet: {}", name));

        let range = workbook.worksheet_range(&name)?;
        for row in range.rows() {
            let cells: Vec<String> = row
                .iter()
                .filter(|cell| !matches!(cell, Data::Empty))
                .map(|cell| cell.to_string())
                .filter(|value| !value.is_empty())
                .collect();
            if !cells.is_empty() {
                lines.push(cells.join("\t"));
            }
        }
    }

    Ok(lines.join("\n"))
}
