use crate::model::CellValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use umya_spreadsheet::Worksheet;

pub const HEADER_ROW: u32 = 1;

/// Header labels recognized for each required column, matched by exact
/// trimmed text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderVocabulary {
    pub employee: Vec<String>,
    pub phone: Vec<String>,
    pub target: Vec<String>,
}

impl Default for HeaderVocabulary {
    fn default() -> Self {
        Self {
            employee: vec!["ລະຫັດພະນັກງານ".to_string()],
            phone: vec!["msisdn".to_string(), "ເບີໂທ".to_string()],
            target: vec!["xjaidee".to_string()],
        }
    }
}

impl HeaderVocabulary {
    fn classify(&self, label: &str) -> Option<RequiredColumn> {
        let label = label.trim();
        let hit = |labels: &[String]| labels.iter().any(|candidate| candidate.trim() == label);
        if hit(&self.employee) {
            Some(RequiredColumn::Employee)
        } else if hit(&self.phone) {
            Some(RequiredColumn::Phone)
        } else if hit(&self.target) {
            Some(RequiredColumn::Target)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredColumn {
    Employee,
    Phone,
    Target,
}

impl fmt::Display for RequiredColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequiredColumn::Employee => f.write_str("employee"),
            RequiredColumn::Phone => f.write_str("phone"),
            RequiredColumn::Target => f.write_str("target"),
        }
    }
}

/// 1-based column positions resolved from a worksheet header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndices {
    pub employee: u32,
    pub phone: u32,
    pub target: u32,
}

/// Cell values of one worksheet, keyed by row then column (both 1-based).
/// Only non-empty cells are stored.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SheetGrid {
    name: String,
    rows: BTreeMap<u32, BTreeMap<u32, CellValue>>,
}

impl SheetGrid {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: BTreeMap::new(),
        }
    }

    /// Captures every non-empty cell as text; identifiers keep their leading
    /// zeros this way.
    pub fn from_worksheet(sheet: &Worksheet) -> Self {
        let mut grid = Self::new(sheet.get_name());
        for cell in sheet.get_cell_collection() {
            let raw = cell.get_value();
            if raw.is_empty() {
                continue;
            }
            let coord = cell.get_coordinate();
            grid.set(
                *coord.get_row_num(),
                *coord.get_col_num(),
                CellValue::Text(raw.to_string()),
            );
        }
        grid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set(&mut self, row: u32, column: u32, value: CellValue) {
        self.rows.entry(row).or_default().insert(column, value);
    }

    pub fn get(&self, row: u32, column: u32) -> Option<&CellValue> {
        self.rows.get(&row).and_then(|cells| cells.get(&column))
    }

    pub fn header(&self) -> Option<&BTreeMap<u32, CellValue>> {
        self.rows.get(&HEADER_ROW)
    }

    /// Rows below the header, in row order.
    pub fn data_rows(&self) -> impl Iterator<Item = (u32, &BTreeMap<u32, CellValue>)> {
        self.rows
            .range(HEADER_ROW + 1..)
            .map(|(row, cells)| (*row, cells))
    }

    /// Scans the header left to right; the first matching cell wins for each
    /// required column. Returns what is missing when any column is absent.
    pub fn detect_columns(
        &self,
        vocabulary: &HeaderVocabulary,
    ) -> Result<ColumnIndices, Vec<RequiredColumn>> {
        let (mut employee, mut phone, mut target) = (None, None, None);
        if let Some(header) = self.header() {
            for (column, value) in header {
                let slot = match vocabulary.classify(&value.display()) {
                    Some(RequiredColumn::Employee) => &mut employee,
                    Some(RequiredColumn::Phone) => &mut phone,
                    Some(RequiredColumn::Target) => &mut target,
                    None => continue,
                };
                if slot.is_none() {
                    *slot = Some(*column);
                }
            }
        }

        match (employee, phone, target) {
            (Some(employee), Some(phone), Some(target)) => Ok(ColumnIndices {
                employee,
                phone,
                target,
            }),
            _ => {
                let mut missing = Vec::new();
                if employee.is_none() {
                    missing.push(RequiredColumn::Employee);
                }
                if phone.is_none() {
                    missing.push(RequiredColumn::Phone);
                }
                if target.is_none() {
                    missing.push(RequiredColumn::Target);
                }
                Err(missing)
            }
        }
    }
}
