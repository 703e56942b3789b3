//! Keyed join between report rows and an uploaded workbook.
//!
//! A pass builds a [`ReconciliationMap`] from the current rows, then walks
//! every worksheet of the upload, resolves the identifier, phone and target
//! columns from the header row, and overwrites the target cell of each data
//! row whose key is in the map. Unmatched rows and unrelated worksheets are
//! left exactly as they were.

mod grid;
mod key;
mod patch;

pub use grid::{ColumnIndices, HEADER_ROW, HeaderVocabulary, RequiredColumn, SheetGrid};
pub use key::{KEY_DELIMITER, MapSpec, ReconciliationKey, ReconciliationMap, build_map};
pub use patch::{
    CellPatch, GridPatch, PatchReport, PatchedWorkbook, SheetOutcome, SheetStatus,
    UploadedWorkbook, patch_grid, plan_patches,
};

use crate::error::EngineResult;
use crate::model::{ReportKind, RowCollection};

/// Runs one full pass over an uploaded workbook's bytes.
pub fn reconcile_bytes(
    rows: &RowCollection,
    kind: ReportKind,
    upload: &[u8],
    vocabulary: &HeaderVocabulary,
) -> EngineResult<PatchedWorkbook> {
    let map = build_map(rows, &MapSpec::for_report(kind));
    let workbook = UploadedWorkbook::from_bytes(upload)?;
    Ok(workbook.patch(&map, vocabulary))
}
