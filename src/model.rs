use crate::utils::format_number_raw;
use clap::ValueEnum;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Scalar held by a row field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Null,
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Numeric reading of the value; text is parsed after trimming.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) if n.is_finite() => Some(*n),
            CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    /// Trimmed string form used for join keys. Integral numbers render
    /// without a fractional part so `5551000` and `"5551000"` agree.
    pub fn key_text(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Number(n) => format_number_raw(*n),
            CellValue::Text(s) => s.trim().to_string(),
        }
    }

    /// Plain string rendering; null renders empty.
    pub fn display(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Number(n) => format_number_raw(*n),
            CellValue::Text(s) => s.clone(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Number(f64::from(value))
    }
}

/// One normalized record. Field order is the order the remote produced.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    fields: IndexMap<String, CellValue>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<CellValue>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&CellValue> {
        self.fields.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Display text of a field, empty when the field is absent.
    pub fn text(&self, field: &str) -> String {
        self.get(field).map(CellValue::display).unwrap_or_default()
    }

    /// Numeric value of a field, zero when absent or not numeric.
    pub fn number(&self, field: &str) -> f64 {
        self.get(field).and_then(CellValue::as_number).unwrap_or(0.0)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = &CellValue> {
        self.fields.values()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<CellValue>> FromIterator<(K, V)> for Row {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut row = Row::new();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}

/// Ordered rows from one fetch/filter cycle; order is display and paging order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowCollection {
    rows: Vec<Row>,
}

impl RowCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    /// Columns shown for this collection: the first row's keys.
    pub fn columns(&self) -> Vec<String> {
        self.rows
            .first()
            .map(|row| row.keys().map(str::to_string).collect())
            .unwrap_or_default()
    }
}

impl From<Vec<Row>> for RowCollection {
    fn from(rows: Vec<Row>) -> Self {
        Self { rows }
    }
}

impl FromIterator<Row> for RowCollection {
    fn from_iter<T: IntoIterator<Item = Row>>(iter: T) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a RowCollection {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Kept as text so leading zeros and non-numeric ids survive
    Identifier,
    Amount,
    Count,
    Status,
    Text,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

const fn field(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec { name, kind }
}

const DEDUCTION_FIELDS: &[FieldSpec] = &[
    field("employee_id", FieldKind::Identifier),
    field("employee_name", FieldKind::Text),
    field("msisdn", FieldKind::Identifier),
    field("amount", FieldKind::Amount),
    field("interest", FieldKind::Amount),
    field("total", FieldKind::Amount),
    field("status", FieldKind::Status),
];

const LOAN_FIELDS: &[FieldSpec] = &[
    field("loan_id", FieldKind::Identifier),
    field("employee_id", FieldKind::Identifier),
    field("msisdn", FieldKind::Identifier),
    field("principal", FieldKind::Amount),
    field("interest", FieldKind::Amount),
    field("balance", FieldKind::Amount),
    field("installments", FieldKind::Count),
    field("status", FieldKind::Status),
];

const REPAYMENT_FIELDS: &[FieldSpec] = &[
    field("employee_id", FieldKind::Identifier),
    field("msisdn", FieldKind::Identifier),
    field("amount", FieldKind::Amount),
    field("interest", FieldKind::Amount),
    field("paid_at", FieldKind::Text),
    field("status", FieldKind::Status),
];

/// Remote report endpoints the tool knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, ValueEnum)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ReportKind {
    Deductions,
    Loans,
    Repayments,
    /// Any other recordset; no field coercion
    Generic,
}

impl ReportKind {
    pub fn schema(&self) -> &'static [FieldSpec] {
        match self {
            ReportKind::Deductions => DEDUCTION_FIELDS,
            ReportKind::Loans => LOAN_FIELDS,
            ReportKind::Repayments => REPAYMENT_FIELDS,
            ReportKind::Generic => &[],
        }
    }

    pub fn endpoint(&self) -> &'static str {
        match self {
            ReportKind::Deductions => "/api/reports/deductions",
            ReportKind::Loans => "/api/reports/loans",
            ReportKind::Repayments => "/api/reports/repayments",
            ReportKind::Generic => "/api/reports",
        }
    }

    /// Identifier and phone fields that form the reconciliation key.
    pub fn key_fields(&self) -> (&'static str, &'static str) {
        ("employee_id", "msisdn")
    }

    /// The two amount fields summed into the reconciled value.
    pub fn amount_fields(&self) -> (&'static str, &'static str) {
        match self {
            ReportKind::Loans => ("principal", "interest"),
            _ => ("amount", "interest"),
        }
    }

    pub fn sheet_title(&self) -> &'static str {
        match self {
            ReportKind::Deductions => "Deductions",
            ReportKind::Loans => "Loans",
            ReportKind::Repayments => "Repayments",
            ReportKind::Generic => "Report",
        }
    }
}

/// Allowed status values; anything else falls back to `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DeductionStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Completed,
}

impl DeductionStatus {
    pub fn parse_or_default(raw: &str) -> Self {
        raw.trim().parse().unwrap_or_default()
    }
}
