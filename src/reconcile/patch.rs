use super::grid::{ColumnIndices, HeaderVocabulary, RequiredColumn, SheetGrid};
use super::key::{ReconciliationKey, ReconciliationMap};
use crate::error::{EngineError, EngineResult};
use crate::model::CellValue;
use serde::Serialize;
use std::io::Cursor;
use std::path::Path;
use umya_spreadsheet::Spreadsheet;

/// One target cell to overwrite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellPatch {
    pub row: u32,
    pub column: u32,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridPatch {
    pub cells: Vec<CellPatch>,
    /// Data rows whose key is not in the map
    pub unmatched_rows: usize,
    /// Data rows with a blank identifier or phone cell
    pub blank_key_rows: usize,
}

/// Works out which target cells change. Pure: neither the grid nor the map
/// is touched.
pub fn plan_patches(
    grid: &SheetGrid,
    columns: &ColumnIndices,
    map: &ReconciliationMap,
) -> GridPatch {
    let mut plan = GridPatch::default();
    let blank = CellValue::Null;
    for (row, cells) in grid.data_rows() {
        let identifier = cells.get(&columns.employee).unwrap_or(&blank);
        let phone = cells.get(&columns.phone).unwrap_or(&blank);
        let Some(key) = ReconciliationKey::from_values(identifier, phone) else {
            plan.blank_key_rows += 1;
            continue;
        };
        match map.get(&key) {
            Some(value) => plan.cells.push(CellPatch {
                row,
                column: columns.target,
                value,
            }),
            None => plan.unmatched_rows += 1,
        }
    }
    plan
}

impl SheetGrid {
    pub fn apply_patches(&mut self, plan: &GridPatch) {
        for patch in &plan.cells {
            self.set(patch.row, patch.column, CellValue::Number(patch.value));
        }
    }
}

/// `(grid, columns, map) -> patched grid`, leaving the input grid as it was.
pub fn patch_grid(
    grid: &SheetGrid,
    columns: &ColumnIndices,
    map: &ReconciliationMap,
) -> (SheetGrid, GridPatch) {
    let plan = plan_patches(grid, columns, map);
    let mut patched = grid.clone();
    patched.apply_patches(&plan);
    (patched, plan)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SheetStatus {
    Patched {
        rows_patched: usize,
        rows_unmatched: usize,
        rows_blank_key: usize,
    },
    Skipped {
        missing: Vec<RequiredColumn>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetOutcome {
    pub sheet: String,
    #[serde(flatten)]
    pub status: SheetStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PatchReport {
    pub sheets: Vec<SheetOutcome>,
}

impl PatchReport {
    pub fn skipped_sheets(&self) -> usize {
        self.sheets
            .iter()
            .filter(|outcome| matches!(outcome.status, SheetStatus::Skipped { .. }))
            .count()
    }

    pub fn cells_patched(&self) -> usize {
        self.sheets
            .iter()
            .map(|outcome| match outcome.status {
                SheetStatus::Patched { rows_patched, .. } => rows_patched,
                SheetStatus::Skipped { .. } => 0,
            })
            .sum()
    }

    pub fn rows_unmatched(&self) -> usize {
        self.sheets
            .iter()
            .map(|outcome| match outcome.status {
                SheetStatus::Patched { rows_unmatched, .. } => rows_unmatched,
                SheetStatus::Skipped { .. } => 0,
            })
            .sum()
    }

    pub fn outcome(&self, sheet: &str) -> Option<&SheetStatus> {
        self.sheets
            .iter()
            .find(|outcome| outcome.sheet == sheet)
            .map(|outcome| &outcome.status)
    }
}

/// A user-supplied workbook. Patching consumes it; the only way out is the
/// re-serialized bytes of the [`PatchedWorkbook`].
pub struct UploadedWorkbook {
    file_name: Option<String>,
    book: Spreadsheet,
}

impl UploadedWorkbook {
    pub fn from_bytes(bytes: &[u8]) -> EngineResult<Self> {
        let book = umya_spreadsheet::reader::xlsx::read_reader(Cursor::new(bytes), true)
            .map_err(EngineError::workbook)?;
        Ok(Self {
            file_name: None,
            book,
        })
    }

    pub fn open(path: &Path) -> EngineResult<Self> {
        let bytes = std::fs::read(path)?;
        let mut workbook = Self::from_bytes(&bytes)?;
        workbook.file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
        Ok(workbook)
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.book
            .get_sheet_collection()
            .iter()
            .map(|sheet| sheet.get_name().to_string())
            .collect()
    }

    /// Grids for every worksheet, in workbook order.
    pub fn grids(&self) -> Vec<SheetGrid> {
        self.book
            .get_sheet_collection()
            .iter()
            .map(SheetGrid::from_worksheet)
            .collect()
    }

    /// Patches every worksheet independently. Worksheets missing a required
    /// column are skipped and reported, not treated as errors.
    pub fn patch(
        mut self,
        map: &ReconciliationMap,
        vocabulary: &HeaderVocabulary,
    ) -> PatchedWorkbook {
        let mut report = PatchReport::default();

        for grid in self.grids() {
            let sheet_name = grid.name().to_string();
            let columns = match grid.detect_columns(vocabulary) {
                Ok(columns) => columns,
                Err(missing) => {
                    tracing::info!(
                        sheet = %sheet_name,
                        missing = ?missing,
                        "worksheet lacks required columns, skipped"
                    );
                    report.sheets.push(SheetOutcome {
                        sheet: sheet_name,
                        status: SheetStatus::Skipped { missing },
                    });
                    continue;
                }
            };

            let plan = plan_patches(&grid, &columns, map);
            if let Some(sheet) = self.book.get_sheet_by_name_mut(&sheet_name) {
                for patch in &plan.cells {
                    sheet
                        .get_cell_mut((patch.column, patch.row))
                        .set_value_number(patch.value);
                }
            }
            tracing::debug!(
                sheet = %sheet_name,
                patched = plan.cells.len(),
                unmatched = plan.unmatched_rows,
                blank = plan.blank_key_rows,
                "worksheet patched"
            );
            report.sheets.push(SheetOutcome {
                sheet: sheet_name,
                status: SheetStatus::Patched {
                    rows_patched: plan.cells.len(),
                    rows_unmatched: plan.unmatched_rows,
                    rows_blank_key: plan.blank_key_rows,
                },
            });
        }

        tracing::info!(
            sheets = report.sheets.len(),
            skipped = report.skipped_sheets(),
            cells = report.cells_patched(),
            "reconciliation pass complete"
        );

        PatchedWorkbook {
            file_name: updated_file_name(self.file_name.as_deref()),
            book: self.book,
            report,
        }
    }
}

pub struct PatchedWorkbook {
    file_name: String,
    book: Spreadsheet,
    report: PatchReport,
}

impl PatchedWorkbook {
    pub fn report(&self) -> &PatchReport {
        &self.report
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn to_bytes(&self) -> EngineResult<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        umya_spreadsheet::writer::xlsx::write_writer(&self.book, &mut cursor)
            .map_err(EngineError::workbook)?;
        Ok(cursor.into_inner())
    }

    /// Serializes and drops the workbook, returning the report alongside.
    pub fn into_bytes(self) -> EngineResult<(Vec<u8>, PatchReport)> {
        let bytes = self.to_bytes()?;
        Ok((bytes, self.report))
    }

    pub fn save(&self, path: &Path) -> EngineResult<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

fn updated_file_name(original: Option<&str>) -> String {
    let stem = original
        .map(Path::new)
        .and_then(|path| path.file_stem())
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "workbook".to_string());
    format!("{stem}_updated.xlsx")
}
