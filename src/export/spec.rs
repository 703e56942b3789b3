use crate::model::{ReportKind, RowCollection};
use crate::utils::{NumberLocale, sanitize_file_component};
use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const MIN_COLUMN_WIDTH: f64 = 12.0;
pub const MAX_COLUMN_WIDTH: f64 = 40.0;
pub const DEFAULT_NUMBER_FORMAT: &str = "#,##0";
pub const DEFAULT_INDEX_LABEL: &str = "#";

/// How numeric values land in the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum NumberMode {
    /// Thousands-grouped text, for reports read by people
    #[default]
    DisplayString,
    /// Real numbers carrying a number format code, for further calculation
    Native,
}

/// Header fill color.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Blue,
    Green,
    Orange,
    /// ARGB hex, e.g. `FF7030A0`
    Custom(String),
}

impl Theme {
    pub fn fill_argb(&self) -> &str {
        match self {
            Theme::Blue => "FF1F4E78",
            Theme::Green => "FF375623",
            Theme::Orange => "FFC55A11",
            Theme::Custom(argb) => argb.as_str(),
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    /// A theme name, or an 8-digit ARGB hex value.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        match raw.to_ascii_lowercase().as_str() {
            "blue" => Ok(Theme::Blue),
            "green" => Ok(Theme::Green),
            "orange" => Ok(Theme::Orange),
            _ if raw.len() == 8 && raw.chars().all(|c| c.is_ascii_hexdigit()) => {
                Ok(Theme::Custom(raw.to_ascii_uppercase()))
            }
            _ => Err(format!(
                "unknown theme '{raw}': expected blue, green, orange or an ARGB hex value"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub field: String,
    /// Header text; defaults to the field name
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub numeric: bool,
}

impl ColumnSpec {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            label: None,
            numeric: false,
        }
    }

    pub fn labelled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn numeric(mut self) -> Self {
        self.numeric = true;
        self
    }

    pub fn header(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.field)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetSpec {
    pub name: String,
    /// Explicit columns; when absent the first row's field names are used
    /// and numbers are detected from the values.
    #[serde(default)]
    pub columns: Option<Vec<ColumnSpec>>,
    /// Write the header even when the collection has no rows
    #[serde(default)]
    pub header_only: bool,
}

impl SheetSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: None,
            header_only: false,
        }
    }

    pub fn with_columns(mut self, columns: Vec<ColumnSpec>) -> Self {
        self.columns = Some(columns);
        self
    }

    pub fn header_only(mut self) -> Self {
        self.header_only = true;
        self
    }
}

/// Everything the exporter needs besides the rows. Built per export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSpec {
    pub mode: NumberMode,
    pub theme: Theme,
    #[serde(default)]
    pub sheets: Vec<SheetSpec>,
    /// Label of a leading 1-based row number column
    #[serde(default)]
    pub index_label: Option<String>,
    #[serde(default)]
    pub fixed_width: Option<f64>,
    #[serde(default)]
    pub locale: NumberLocale,
    pub number_format: String,
}

impl ExportSpec {
    /// Generic report export: grouped text numbers and a `#` column.
    pub fn display() -> Self {
        Self {
            mode: NumberMode::DisplayString,
            theme: Theme::Blue,
            sheets: Vec::new(),
            index_label: Some(DEFAULT_INDEX_LABEL.to_string()),
            fixed_width: None,
            locale: NumberLocale::default(),
            number_format: DEFAULT_NUMBER_FORMAT.to_string(),
        }
    }

    /// Structured export: native numbers with a format code.
    pub fn native() -> Self {
        Self {
            mode: NumberMode::Native,
            index_label: None,
            ..Self::display()
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_locale(mut self, locale: NumberLocale) -> Self {
        self.locale = locale;
        self
    }

    pub fn with_sheet(mut self, sheet: SheetSpec) -> Self {
        self.sheets.push(sheet);
        self
    }

    pub fn with_fixed_width(mut self, width: f64) -> Self {
        self.fixed_width = Some(width);
        self
    }

    pub fn sheet(&self, name: &str) -> Option<&SheetSpec> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }

    /// `clamp(max(12, label length), 40)` unless a fixed width is set.
    pub fn column_width(&self, label: &str) -> f64 {
        if let Some(width) = self.fixed_width {
            return width;
        }
        let len = label.chars().count() as f64;
        len.max(MIN_COLUMN_WIDTH).min(MAX_COLUMN_WIDTH)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamedRowCollection {
    pub name: String,
    pub rows: RowCollection,
}

impl NamedRowCollection {
    pub fn new(name: impl Into<String>, rows: RowCollection) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }
}

/// Filter context the download name is derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFileName {
    pub prefix: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub category: Option<String>,
}

impl ExportFileName {
    pub fn new(prefix: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            prefix: prefix.into(),
            start,
            end,
            category: None,
        }
    }

    pub fn for_report(kind: ReportKind, start: NaiveDate, end: NaiveDate) -> Self {
        Self::new(kind.to_string(), start, end)
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// `<prefix>_<start>_to_<end>[_<category>].xlsx`
    pub fn render(&self) -> String {
        let prefix = sanitize_file_component(&self.prefix);
        let prefix = if prefix.is_empty() { "report".to_string() } else { prefix };
        let mut name = format!(
            "{prefix}_{}_to_{}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        );
        if let Some(category) = self.category.as_deref().map(sanitize_file_component)
            && !category.is_empty()
        {
            name.push('_');
            name.push_str(&category);
        }
        name.push_str(".xlsx");
        name
    }
}
