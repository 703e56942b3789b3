use crate::model::{CellValue, Row, RowCollection};
use crate::utils::{NumberLocale, format_number_raw};

pub const DEFAULT_PAGE_SIZE: usize = 15;

/// Case-insensitive substring search across every field of every row.
///
/// Numbers match against both their raw and thousands-grouped forms, so
/// `1.000` and `1000` both find an amount of 1000. A blank query keeps all
/// rows.
pub fn filter_rows(rows: &RowCollection, query: &str, locale: NumberLocale) -> RowCollection {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return rows.clone();
    }
    rows.iter()
        .filter(|row| row_matches(row, &needle, locale))
        .cloned()
        .collect()
}

fn row_matches(row: &Row, needle: &str, locale: NumberLocale) -> bool {
    row.values().any(|value| value_matches(value, needle, locale))
}

fn value_matches(value: &CellValue, needle: &str, locale: NumberLocale) -> bool {
    match value {
        CellValue::Null => false,
        CellValue::Text(text) => text.to_lowercase().contains(needle),
        CellValue::Number(n) => {
            format_number_raw(*n).contains(needle) || locale.format(*n).contains(needle)
        }
    }
}

pub fn total_pages(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size.max(1)).max(1)
}

/// One page of rows; `page` is 1-based. Out-of-range pages are empty.
pub fn paginate(rows: &RowCollection, page_size: usize, page: usize) -> &[Row] {
    let page_size = page_size.max(1);
    if page == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(page_size);
    let all = rows.rows();
    if start >= all.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(all.len());
    &all[start..end]
}

/// Page cursor over a collection of known length.
///
/// Navigation is refused at the bounds rather than wrapping; callers read
/// `has_next`/`has_prev` to disable controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    page: usize,
    page_size: usize,
    total_rows: usize,
}

impl Pager {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            total_rows: 0,
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.total_rows, self.page_size)
    }

    /// Replaces the row count and returns to page 1.
    pub fn reset(&mut self, total_rows: usize) {
        self.total_rows = total_rows;
        self.page = 1;
    }

    /// Replaces the row count but stays on the current page when it still
    /// exists.
    pub fn set_total(&mut self, total_rows: usize) {
        self.total_rows = total_rows;
        self.page = self.page.clamp(1, self.total_pages());
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn next(&mut self) -> bool {
        if self.has_next() {
            self.page += 1;
            true
        } else {
            false
        }
    }

    pub fn prev(&mut self) -> bool {
        if self.has_prev() {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    /// Jumps to `page`, clamped into `1..=total_pages`.
    pub fn go_to(&mut self, page: usize) {
        self.page = page.clamp(1, self.total_pages());
    }
}
