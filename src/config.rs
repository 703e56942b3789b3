use crate::batch::DEFAULT_STATUS_FIELD;
use crate::export::{NumberMode, Theme};
use crate::filters::DEFAULT_PAGE_SIZE;
use crate::model::ReportKind;
use crate::reconcile::HeaderVocabulary;
use crate::utils::NumberLocale;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:3000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub page_size: usize,
    pub number_locale: NumberLocale,
    pub status_field: String,
    pub header_vocabulary: HeaderVocabulary,
    pub output_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            page_size: DEFAULT_PAGE_SIZE,
            number_locale: NumberLocale::default(),
            status_field: DEFAULT_STATUS_FIELD.to_string(),
            header_vocabulary: HeaderVocabulary::default(),
            output_dir: PathBuf::from("."),
        }
    }
}

impl AppConfig {
    /// CLI flags win over the config file, the file wins over defaults.
    pub fn from_args(args: SettingsArgs) -> Result<Self> {
        let SettingsArgs {
            config,
            api_base_url: cli_api_base_url,
            request_timeout_secs: cli_timeout,
            page_size: cli_page_size,
            number_locale: cli_number_locale,
            status_field: cli_status_field,
            employee_labels: cli_employee_labels,
            phone_labels: cli_phone_labels,
            target_labels: cli_target_labels,
            output_dir: cli_output_dir,
            token: _,
        } = args;

        let file_config = if let Some(path) = config.as_ref() {
            load_config_file(path)?
        } else {
            PartialConfig::default()
        };

        let PartialConfig {
            api_base_url: file_api_base_url,
            request_timeout_secs: file_timeout,
            page_size: file_page_size,
            number_locale: file_number_locale,
            status_field: file_status_field,
            header_vocabulary: file_vocabulary,
            output_dir: file_output_dir,
        } = file_config;

        let api_base_url = cli_api_base_url
            .or(file_api_base_url)
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
            .trim()
            .trim_end_matches('/')
            .to_string();

        let request_timeout = Duration::from_secs(
            cli_timeout
                .or(file_timeout)
                .unwrap_or(DEFAULT_TIMEOUT_SECS)
                .max(1),
        );

        let page_size = cli_page_size
            .or(file_page_size)
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .max(1);

        let number_locale = cli_number_locale.or(file_number_locale).unwrap_or_default();

        let status_field = cli_status_field
            .or(file_status_field)
            .unwrap_or_else(|| DEFAULT_STATUS_FIELD.to_string())
            .trim()
            .to_string();

        let file_vocabulary = file_vocabulary.unwrap_or_default();
        let defaults = HeaderVocabulary::default();
        let header_vocabulary = HeaderVocabulary {
            employee: labels(cli_employee_labels.or(file_vocabulary.employee), defaults.employee),
            phone: labels(cli_phone_labels.or(file_vocabulary.phone), defaults.phone),
            target: labels(cli_target_labels.or(file_vocabulary.target), defaults.target),
        };

        let output_dir = cli_output_dir
            .or(file_output_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            api_base_url,
            request_timeout,
            page_size,
            number_locale,
            status_field,
            header_vocabulary,
            output_dir,
        })
    }

    pub fn validate(&self) -> Result<()> {
        let url = reqwest::Url::parse(&self.api_base_url)
            .with_context(|| format!("invalid api base url {:?}", self.api_base_url))?;
        anyhow::ensure!(
            matches!(url.scheme(), "http" | "https"),
            "api base url must be http or https, got {:?}",
            url.scheme()
        );
        anyhow::ensure!(
            !self.status_field.is_empty(),
            "status field must not be empty"
        );
        for (name, list) in [
            ("employee", &self.header_vocabulary.employee),
            ("phone", &self.header_vocabulary.phone),
            ("target", &self.header_vocabulary.target),
        ] {
            anyhow::ensure!(
                !list.is_empty(),
                "at least one {name} header label must be provided"
            );
        }
        Ok(())
    }

    pub fn resolve_output<P: AsRef<Path>>(&self, relative: P) -> PathBuf {
        let relative = relative.as_ref();
        if relative.is_absolute() {
            relative.to_path_buf()
        } else {
            self.output_dir.join(relative)
        }
    }
}

/// Trimmed, de-duplicated, order-preserving; falls back when nothing is left.
fn labels(configured: Option<Vec<String>>, fallback: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for label in configured.unwrap_or_default() {
        let label = label.trim().to_string();
        if !label.is_empty() && !out.contains(&label) {
            out.push(label);
        }
    }
    if out.is_empty() { fallback } else { out }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "deduction-recon",
    about = "Deduction report reconciliation and export",
    version
)]
pub struct CliArgs {
    #[command(flatten)]
    pub settings: SettingsArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Default, Clone)]
pub struct SettingsArgs {
    #[arg(
        long,
        value_name = "FILE",
        help = "Path to a configuration file (YAML or JSON)",
        global = true
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        env = "DEDUCTION_RECON_API_URL",
        value_name = "URL",
        help = "Base URL of the reporting service",
        global = true
    )]
    pub api_base_url: Option<String>,

    #[arg(
        long,
        env = "DEDUCTION_RECON_TIMEOUT_SECS",
        value_name = "SECS",
        help = "Per-request timeout",
        value_parser = clap::value_parser!(u64),
        global = true
    )]
    pub request_timeout_secs: Option<u64>,

    #[arg(
        long,
        env = "DEDUCTION_RECON_PAGE_SIZE",
        value_name = "N",
        help = "Rows per page",
        value_parser = clap::value_parser!(usize),
        global = true
    )]
    pub page_size: Option<usize>,

    #[arg(
        long,
        env = "DEDUCTION_RECON_NUMBER_LOCALE",
        value_enum,
        value_name = "LOCALE",
        help = "Digit grouping for rendered numbers (dot or comma)",
        global = true
    )]
    pub number_locale: Option<NumberLocale>,

    #[arg(
        long,
        env = "DEDUCTION_RECON_STATUS_FIELD",
        value_name = "FIELD",
        help = "Response field that marks an insert as accepted",
        global = true
    )]
    pub status_field: Option<String>,

    #[arg(
        long,
        env = "DEDUCTION_RECON_EMPLOYEE_LABELS",
        value_name = "LABEL",
        value_delimiter = ',',
        help = "Header labels of the employee identifier column",
        global = true
    )]
    pub employee_labels: Option<Vec<String>>,

    #[arg(
        long,
        env = "DEDUCTION_RECON_PHONE_LABELS",
        value_name = "LABEL",
        value_delimiter = ',',
        help = "Header labels of the phone column",
        global = true
    )]
    pub phone_labels: Option<Vec<String>>,

    #[arg(
        long,
        env = "DEDUCTION_RECON_TARGET_LABELS",
        value_name = "LABEL",
        value_delimiter = ',',
        help = "Header labels of the column that receives computed amounts",
        global = true
    )]
    pub target_labels: Option<Vec<String>>,

    #[arg(
        long,
        env = "DEDUCTION_RECON_OUTPUT_DIR",
        value_name = "DIR",
        help = "Directory for written workbooks",
        global = true
    )]
    pub output_dir: Option<PathBuf>,

    #[arg(
        long,
        env = "DEDUCTION_RECON_TOKEN",
        value_name = "TOKEN",
        help = "Bearer token for the reporting service",
        hide_env_values = true,
        global = true
    )]
    pub token: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Filter and page a report, printing the page as JSON
    Fetch {
        #[command(flatten)]
        report: ReportArgs,
        #[arg(long, short = 'q', default_value = "")]
        query: String,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Write a report as a styled workbook
    Export {
        #[command(flatten)]
        report: ReportArgs,
        #[arg(long, short = 'q', default_value = "")]
        query: String,
        #[arg(long, value_enum, default_value_t = NumberMode::DisplayString)]
        mode: NumberMode,
        #[arg(long, default_value = "blue", value_parser = clap::value_parser!(Theme))]
        theme: Theme,
        #[arg(long, value_name = "NAME", help = "Category appended to the file name")]
        category: Option<String>,
    },
    /// Patch computed amounts into an uploaded workbook
    Reconcile {
        #[command(flatten)]
        report: ReportArgs,
        #[arg(long, value_name = "FILE")]
        workbook: PathBuf,
        #[arg(long, value_name = "FILE", help = "Defaults to <stem>_updated.xlsx in the output dir")]
        output: Option<PathBuf>,
    },
    /// Submit one insert per report row
    Insert {
        #[command(flatten)]
        report: ReportArgs,
        #[arg(long, value_name = "YYYY-MM-DD")]
        effective_date: Option<NaiveDate>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    #[arg(long, value_enum, default_value_t = ReportKind::Deductions)]
    pub kind: ReportKind,
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub start: NaiveDate,
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub end: NaiveDate,
    #[arg(long)]
    pub region: Option<String>,
    #[arg(
        long,
        value_name = "FILE",
        help = "Read a saved JSON response instead of calling the service"
    )]
    pub source: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PartialVocabulary {
    employee: Option<Vec<String>>,
    phone: Option<Vec<String>>,
    target: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct PartialConfig {
    api_base_url: Option<String>,
    request_timeout_secs: Option<u64>,
    page_size: Option<usize>,
    number_locale: Option<NumberLocale>,
    status_field: Option<String>,
    header_vocabulary: Option<PartialVocabulary>,
    output_dir: Option<PathBuf>,
}

fn load_config_file(path: &Path) -> Result<PartialConfig> {
    if !path.exists() {
        anyhow::bail!("config file {:?} does not exist", path);
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {:?}", path))?;
    let ext = path
        .extension()
        .and_then(|os| os.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse YAML config {:?}", path))?,
        "json" => serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse JSON config {:?}", path))?,
        other => anyhow::bail!("unsupported config extension: {other}"),
    };
    Ok(parsed)
}
