//! Row collections to a styled `.xlsx` artifact.
//!
//! Each non-empty collection becomes one worksheet with a themed header
//! row and bordered data cells. Numbers are written either as grouped
//! display text or as native values with a number format, per
//! [`NumberMode`].

mod spec;
mod writer;

pub use spec::{
    ColumnSpec, DEFAULT_INDEX_LABEL, DEFAULT_NUMBER_FORMAT, ExportFileName, ExportSpec,
    MAX_COLUMN_WIDTH, MIN_COLUMN_WIDTH, NamedRowCollection, NumberMode, SheetSpec, Theme,
};
pub use writer::{build_workbook, workbook_bytes};

use crate::error::{EngineError, EngineResult};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// The serialized workbook plus the name it should be saved under.
#[derive(Debug, Clone, Serialize)]
pub struct ExportArtifact {
    pub file_name: String,
    pub sheets: Vec<String>,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    /// Writes into `dir` under the computed file name.
    pub fn save_in(&self, dir: &Path) -> EngineResult<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

pub fn export(
    spec: &ExportSpec,
    collections: &[NamedRowCollection],
    naming: &ExportFileName,
) -> EngineResult<ExportArtifact> {
    let (book, sheets) = build_workbook(spec, collections)?;
    let bytes = workbook_bytes(&book)?;
    let file_name = naming.render();
    tracing::info!(
        file = %file_name,
        sheets = sheets.len(),
        bytes = bytes.len(),
        "export complete"
    );
    Ok(ExportArtifact {
        file_name,
        sheets,
        bytes,
    })
}

/// [`export`] on the blocking pool; workbook serialization is CPU bound.
pub async fn export_async(
    spec: ExportSpec,
    collections: Vec<NamedRowCollection>,
    naming: ExportFileName,
) -> EngineResult<ExportArtifact> {
    tokio::task::spawn_blocking(move || export(&spec, &collections, &naming))
        .await
        .map_err(|err| EngineError::workbook(format!("export task failed: {err}")))?
}
