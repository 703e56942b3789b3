use super::spec::{ColumnSpec, ExportSpec, NamedRowCollection, NumberMode, SheetSpec};
use crate::error::{EngineError, EngineResult};
use crate::model::{CellValue, Row};
use crate::styles::{StyleDescriptor, apply_descriptor_to_style, data_style, header_style};
use crate::utils::column_number_to_name;
use std::collections::HashSet;
use std::io::Cursor;
use umya_spreadsheet::{Spreadsheet, Worksheet};

const MAX_SHEET_NAME: usize = 31;
const INVALID_SHEET_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// A column as it will be written: resolved header text plus whether the
/// values are numeric. `None` means decide per value.
struct PlannedColumn {
    field: String,
    label: String,
    numeric: Option<bool>,
}

impl From<&ColumnSpec> for PlannedColumn {
    fn from(spec: &ColumnSpec) -> Self {
        Self {
            field: spec.field.clone(),
            label: spec.header().to_string(),
            numeric: Some(spec.numeric),
        }
    }
}

fn plan_columns(sheet: Option<&SheetSpec>, collection: &NamedRowCollection) -> Vec<PlannedColumn> {
    match sheet.and_then(|sheet| sheet.columns.as_ref()) {
        Some(columns) => columns.iter().map(PlannedColumn::from).collect(),
        None => collection
            .rows
            .columns()
            .into_iter()
            .map(|field| PlannedColumn {
                label: field.clone(),
                field,
                numeric: None,
            })
            .collect(),
    }
}

/// Builds the in-memory workbook: one worksheet per non-empty collection,
/// in input order. Returns the sheet names actually written.
pub fn build_workbook(
    spec: &ExportSpec,
    collections: &[NamedRowCollection],
) -> EngineResult<(Spreadsheet, Vec<String>)> {
    let mut book = umya_spreadsheet::new_file_empty_worksheet();
    let mut written = Vec::new();
    let mut taken = HashSet::new();

    let header = header_style(spec.theme.fill_argb());
    let plain = data_style(None);
    let formatted = data_style(Some(&spec.number_format));

    for collection in collections {
        let sheet_spec = spec.sheet(&collection.name);
        let header_only = sheet_spec.is_some_and(|sheet| sheet.header_only);
        if collection.rows.is_empty() && !header_only {
            tracing::debug!(sheet = %collection.name, "empty collection, no worksheet");
            continue;
        }

        let columns = plan_columns(sheet_spec, collection);
        if columns.is_empty() {
            tracing::debug!(sheet = %collection.name, "no columns to write");
            continue;
        }

        let name = unique_sheet_name(&collection.name, &mut taken);
        let sheet = book
            .new_sheet(&name)
            .map_err(|err| EngineError::workbook(format!("failed to add sheet '{name}': {err}")))?;

        let offset = u32::from(spec.index_label.is_some());
        if let Some(label) = &spec.index_label {
            write_header(sheet, spec, 1, label, &header);
        }
        for (idx, column) in columns.iter().enumerate() {
            write_header(sheet, spec, idx as u32 + 1 + offset, &column.label, &header);
        }

        for (idx, row) in collection.rows.iter().enumerate() {
            let row_num = idx as u32 + 2;
            if spec.index_label.is_some() {
                let cell = sheet.get_cell_mut((1, row_num));
                cell.set_value_number((idx + 1) as f64);
                restyle(cell, &plain);
            }
            for (col_idx, column) in columns.iter().enumerate() {
                let col_num = col_idx as u32 + 1 + offset;
                write_data_cell(sheet, spec, (col_num, row_num), row, column, &plain, &formatted);
            }
        }

        tracing::debug!(
            sheet = %name,
            rows = collection.rows.len(),
            columns = columns.len(),
            "worksheet written"
        );
        written.push(name);
    }

    if written.is_empty() {
        return Err(EngineError::validation(
            "collections",
            "nothing to export: every collection is empty",
        ));
    }

    Ok((book, written))
}

fn write_header(
    sheet: &mut Worksheet,
    spec: &ExportSpec,
    col_num: u32,
    label: &str,
    style: &StyleDescriptor,
) {
    let cell = sheet.get_cell_mut((col_num, 1));
    cell.set_value_string(label);
    restyle(cell, style);
    sheet
        .get_column_dimension_mut(&column_number_to_name(col_num))
        .set_width(spec.column_width(label));
}

fn write_data_cell(
    sheet: &mut Worksheet,
    spec: &ExportSpec,
    coord: (u32, u32),
    row: &Row,
    column: &PlannedColumn,
    plain: &StyleDescriptor,
    formatted: &StyleDescriptor,
) {
    let cell = sheet.get_cell_mut(coord);
    let value = row.get(&column.field).unwrap_or(&CellValue::Null);
    let numeric = column
        .numeric
        .unwrap_or_else(|| matches!(value, CellValue::Number(_)));

    match (numeric, value.as_number()) {
        (true, Some(number)) => match spec.mode {
            NumberMode::DisplayString => {
                cell.set_value_string(spec.locale.format(number));
                restyle(cell, plain);
            }
            NumberMode::Native => {
                cell.set_value_number(number);
                restyle(cell, formatted);
            }
        },
        _ => {
            if !value.is_null() {
                cell.set_value_string(value.display());
            }
            restyle(cell, plain);
        }
    }
}

fn restyle(cell: &mut umya_spreadsheet::Cell, desc: &StyleDescriptor) {
    let mut style = cell.get_style().clone();
    apply_descriptor_to_style(&mut style, desc);
    cell.set_style(style);
}

/// Worksheet names are capped at 31 characters and may not contain
/// `[]:*?/\`; collisions get a ` (n)` suffix.
fn unique_sheet_name(raw: &str, taken: &mut HashSet<String>) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .map(|c| if INVALID_SHEET_CHARS.contains(&c) { '_' } else { c })
        .take(MAX_SHEET_NAME)
        .collect();
    let base = if cleaned.is_empty() { "Sheet".to_string() } else { cleaned };

    let mut candidate = base.clone();
    let mut n = 2;
    while !taken.insert(candidate.to_lowercase()) {
        let suffix = format!(" ({n})");
        let keep = MAX_SHEET_NAME.saturating_sub(suffix.chars().count());
        candidate = base.chars().take(keep).collect::<String>() + &suffix;
        n += 1;
    }
    candidate
}

pub fn workbook_bytes(book: &Spreadsheet) -> EngineResult<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    umya_spreadsheet::writer::xlsx::write_writer(book, &mut cursor)
        .map_err(EngineError::workbook)?;
    Ok(cursor.into_inner())
}
