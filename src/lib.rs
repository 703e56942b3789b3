pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod filters;
pub mod logging;
pub mod model;
pub mod normalize;
pub mod reconcile;
pub mod remote;
pub mod session;
pub mod styles;
pub mod utils;
pub mod view;

pub use batch::{BatchInsertResult, InsertPayload, ItemOutcome, Submitter};
pub use config::{AppConfig, CliArgs, Command, ReportArgs, SettingsArgs};
pub use error::{EngineError, EngineResult, ErrorCode};
pub use export::{ExportArtifact, ExportFileName, ExportSpec, NamedRowCollection, export, export_async};
pub use filters::{Pager, filter_rows, paginate, total_pages};
pub use logging::{LoggingConfig, init_logging};
pub use model::{CellValue, DeductionStatus, ReportKind, Row, RowCollection};
pub use normalize::normalize;
pub use reconcile::{HeaderVocabulary, ReconciliationMap, UploadedWorkbook, build_map};
pub use remote::{RemoteClient, ReportQuery};
pub use session::{MemorySession, SessionStore};
pub use view::ReportView;
