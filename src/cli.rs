use crate::batch::{self, InsertPayload};
use crate::config::{AppConfig, CliArgs, Command, ReportArgs};
use crate::error::{EngineError, EngineResult};
use crate::export::{
    ColumnSpec, ExportFileName, ExportSpec, NamedRowCollection, NumberMode, SheetSpec, Theme,
    export_async,
};
use crate::logging::command_span;
use crate::model::{FieldKind, ReportKind, Row};
use crate::normalize::normalize;
use crate::reconcile::{MapSpec, UploadedWorkbook, build_map};
use crate::remote::{RemoteClient, ReportQuery};
use crate::session::{MemorySession, SessionStore};
use crate::view::ReportView;
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::Instrument;

/// Resolves configuration and runs one subcommand.
pub async fn run(args: CliArgs) -> Result<()> {
    let CliArgs { settings, command } = args;

    let session = MemorySession::new();
    if let Some(token) = settings.token.clone() {
        session.set(token);
    }

    let config = AppConfig::from_args(settings)?;
    config.validate()?;
    let client = RemoteClient::new(config.api_base_url.clone(), config.request_timeout)?;

    let ctx = Runner {
        config: &config,
        client: &client,
        session: &session,
    };

    match command {
        Command::Fetch {
            report,
            query,
            page,
        } => {
            let span = command_span("fetch", &report.kind.to_string());
            ctx.fetch(&report, &query, page).instrument(span).await
        }
        Command::Export {
            report,
            query,
            mode,
            theme,
            category,
        } => {
            let span = command_span("export", &report.kind.to_string());
            ctx.export(&report, &query, mode, theme, category)
                .instrument(span)
                .await
        }
        Command::Reconcile {
            report,
            workbook,
            output,
        } => {
            let span = command_span("reconcile", &report.kind.to_string());
            ctx.reconcile(&report, workbook, output).instrument(span).await
        }
        Command::Insert {
            report,
            effective_date,
        } => {
            let span = command_span("insert", &report.kind.to_string());
            ctx.insert(&report, effective_date).instrument(span).await
        }
    }
}

struct Runner<'a> {
    config: &'a AppConfig,
    client: &'a RemoteClient,
    session: &'a dyn SessionStore,
}

#[derive(Serialize)]
struct PageOutput<'a> {
    report: String,
    query: &'a str,
    page: usize,
    total_pages: usize,
    total_rows: usize,
    no_data: bool,
    rows: &'a [Row],
}

impl Runner<'_> {
    fn token(&self) -> EngineResult<String> {
        self.session.get().ok_or_else(|| {
            EngineError::validation(
                "token",
                "no session token; pass --token or set DEDUCTION_RECON_TOKEN",
            )
        })
    }

    /// The raw response body, from `--source` when given, otherwise from the
    /// reporting service.
    async fn load_raw(&self, report: &ReportArgs) -> EngineResult<Value> {
        if let Some(path) = &report.source {
            let contents = tokio::fs::read_to_string(path).await?;
            return serde_json::from_str(&contents).map_err(|err| {
                EngineError::fetch(report.kind, format!("{} is not JSON: {err}", path.display()))
            });
        }
        let token = self.token()?;
        let mut query = ReportQuery::new(report.kind, report.start, report.end);
        if let Some(region) = &report.region {
            query = query.with_region(region.clone());
        }
        self.client.fetch_report(&token, &query).await
    }

    async fn load_view(&self, report: &ReportArgs, query: &str) -> Result<ReportView> {
        let mut view = ReportView::new(
            report.kind,
            self.config.page_size,
            self.config.number_locale,
        );
        let fetched = self.load_raw(report).await;
        view.load(fetched)
            .with_context(|| format!("failed to load {} report", report.kind))?;
        view.set_query(query);
        Ok(view)
    }

    async fn fetch(&self, report: &ReportArgs, query: &str, page: usize) -> Result<()> {
        let mut view = self.load_view(report, query).await?;
        view.pager_mut().go_to(page);

        let output = PageOutput {
            report: report.kind.to_string(),
            query: view.query(),
            page: view.pager().page(),
            total_pages: view.pager().total_pages(),
            total_rows: view.filtered().len(),
            no_data: view.is_empty(),
            rows: view.current_page(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }

    async fn export(
        &self,
        report: &ReportArgs,
        query: &str,
        mode: NumberMode,
        theme: Theme,
        category: Option<String>,
    ) -> Result<()> {
        let view = self.load_view(report, query).await?;
        if view.is_empty() {
            tracing::info!(report = %report.kind, "no data to export");
            println!("no data");
            return Ok(());
        }

        let sheet_name = report.kind.sheet_title();
        let spec = match mode {
            NumberMode::DisplayString => ExportSpec::display(),
            NumberMode::Native => ExportSpec::native(),
        }
        .with_theme(theme)
        .with_locale(self.config.number_locale)
        .with_sheet(sheet_for(report.kind, sheet_name));

        let mut naming = ExportFileName::for_report(report.kind, report.start, report.end);
        if let Some(category) = category.or_else(|| report.region.clone()) {
            naming = naming.with_category(category);
        }

        let collections = vec![NamedRowCollection::new(sheet_name, view.filtered().clone())];
        let artifact = export_async(spec, collections, naming).await?;
        let path = artifact.save_in(&self.config.output_dir)?;
        println!("{}", path.display());
        Ok(())
    }

    async fn reconcile(
        &self,
        report: &ReportArgs,
        workbook: PathBuf,
        output: Option<PathBuf>,
    ) -> Result<()> {
        let raw = self.load_raw(report).await?;
        let rows = normalize(&raw, report.kind);
        let map = build_map(&rows, &MapSpec::for_report(report.kind));
        tracing::info!(
            keys = map.len(),
            skipped = map.skipped_rows(),
            overwritten = map.overwritten(),
            "reconciliation map built"
        );

        let vocabulary = self.config.header_vocabulary.clone();
        let patched = tokio::task::spawn_blocking(move || {
            UploadedWorkbook::open(&workbook).map(|upload| upload.patch(&map, &vocabulary))
        })
        .await
        .context("reconciliation task failed")??;

        let path = output.unwrap_or_else(|| self.config.resolve_output(patched.file_name()));
        ensure_parent(&path)?;
        patched.save(&path)?;

        println!("{}", serde_json::to_string_pretty(patched.report())?);
        println!("{}", path.display());
        Ok(())
    }

    async fn insert(
        &self,
        report: &ReportArgs,
        effective_date: Option<chrono::NaiveDate>,
    ) -> Result<()> {
        let raw = self.load_raw(report).await?;
        let rows = normalize(&raw, report.kind);
        let token = self.token()?;
        let submitter = self.client.clone().with_token(token);
        let kind = report.kind;

        let result = batch::run(
            &rows,
            effective_date,
            |row, date| InsertPayload::from_row(row, kind, date),
            &submitter,
            &self.config.status_field,
        )
        .await?;

        for failure in result.failures() {
            println!(
                "{}: {}",
                failure.id,
                failure.reason.as_deref().unwrap_or("unknown error")
            );
        }
        println!("{}", result.summary());
        Ok(())
    }
}

/// Explicit columns for known report kinds, so amounts are numeric even when
/// a row carries them as text.
fn sheet_for(kind: ReportKind, name: &str) -> SheetSpec {
    let schema = kind.schema();
    if schema.is_empty() {
        return SheetSpec::new(name);
    }
    let columns = schema
        .iter()
        .map(|field| {
            let column = ColumnSpec::new(field.name);
            match field.kind {
                FieldKind::Amount | FieldKind::Count => column.numeric(),
                _ => column,
            }
        })
        .collect();
    SheetSpec::new(name).with_columns(columns)
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    Ok(())
}
