use clap::ValueEnum;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

pub fn column_number_to_name(column: u32) -> String {
    let mut column = column;
    let mut name = String::new();
    while column > 0 {
        let rem = ((column - 1) % 26) as u8;
        name.insert(0, (b'A' + rem) as char);
        column = (column - 1) / 26;
    }
    name
}

/// Renders a number without a trailing `.0` when it is integral.
pub fn format_number_raw(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Digit grouping convention for rendered numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum NumberLocale {
    /// `1.234.567,5`
    #[default]
    Dot,
    /// `1,234,567.5`
    Comma,
}

impl NumberLocale {
    pub fn thousands_separator(&self) -> char {
        match self {
            NumberLocale::Dot => '.',
            NumberLocale::Comma => ',',
        }
    }

    pub fn decimal_separator(&self) -> char {
        match self {
            NumberLocale::Dot => ',',
            NumberLocale::Comma => '.',
        }
    }

    /// Thousands-grouped rendering, at most two fraction digits, trailing
    /// zeros dropped.
    pub fn format(&self, value: f64) -> String {
        if !value.is_finite() {
            return value.to_string();
        }
        let rounded = (value * 100.0).round() / 100.0;
        let negative = rounded < 0.0;
        let abs = rounded.abs();
        let int_part = abs.trunc() as u64;
        let cents = ((abs - abs.trunc()) * 100.0).round() as u64;

        let digits = int_part.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (idx, ch) in digits.chars().enumerate() {
            if idx > 0 && (digits.len() - idx) % 3 == 0 {
                grouped.push(self.thousands_separator());
            }
            grouped.push(ch);
        }

        let mut out = String::new();
        if negative && (int_part > 0 || cents > 0) {
            out.push('-');
        }
        out.push_str(&grouped);
        if cents > 0 {
            let frac = format!("{cents:02}");
            out.push(self.decimal_separator());
            out.push_str(frac.trim_end_matches('0'));
        }
        out
    }
}

static UNSAFE_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[\\/:*?"<>|\s]+"#).expect("static regex"));

/// Makes a value safe to embed in a file name.
pub fn sanitize_file_component(raw: &str) -> String {
    UNSAFE_FILENAME_CHARS
        .replace_all(raw.trim(), "-")
        .trim_matches('-')
        .to_string()
}
