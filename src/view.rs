use crate::error::{EngineError, EngineResult};
use crate::filters::{Pager, filter_rows, paginate};
use crate::model::{ReportKind, Row, RowCollection};
use crate::normalize::normalize;
use crate::utils::NumberLocale;
use serde_json::Value;

/// On-screen state of one report: the fetched rows, the active search and
/// the page cursor over the filtered rows.
///
/// Any change to the rows or the query puts the cursor back on page 1.
#[derive(Debug, Clone)]
pub struct ReportView {
    kind: ReportKind,
    locale: NumberLocale,
    source: RowCollection,
    query: String,
    filtered: RowCollection,
    pager: Pager,
}

impl ReportView {
    pub fn new(kind: ReportKind, page_size: usize, locale: NumberLocale) -> Self {
        Self {
            kind,
            locale,
            source: RowCollection::new(),
            query: String::new(),
            filtered: RowCollection::new(),
            pager: Pager::new(page_size),
        }
    }

    pub fn kind(&self) -> ReportKind {
        self.kind
    }

    /// Applies the outcome of a fetch. A failure clears the rows before the
    /// error is handed back so no stale data stays on screen.
    pub fn load(&mut self, fetched: EngineResult<Value>) -> EngineResult<usize> {
        match fetched {
            Ok(raw) => {
                let rows = normalize(&raw, self.kind);
                let count = rows.len();
                self.set_rows(rows);
                tracing::debug!(report = %self.kind, rows = count, "report view loaded");
                Ok(count)
            }
            Err(err) => {
                self.set_rows(RowCollection::new());
                tracing::warn!(report = %self.kind, error = %err, "report fetch failed, view cleared");
                Err(match err {
                    EngineError::Fetch { .. } => err,
                    other => EngineError::fetch(self.kind, other.to_string()),
                })
            }
        }
    }

    pub fn set_rows(&mut self, rows: RowCollection) {
        self.source = rows;
        self.refilter();
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.refilter();
    }

    fn refilter(&mut self) {
        self.filtered = filter_rows(&self.source, &self.query, self.locale);
        self.pager.reset(self.filtered.len());
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn rows(&self) -> &RowCollection {
        &self.source
    }

    pub fn filtered(&self) -> &RowCollection {
        &self.filtered
    }

    pub fn current_page(&self) -> &[Row] {
        paginate(&self.filtered, self.pager.page_size(), self.pager.page())
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    pub fn pager_mut(&mut self) -> &mut Pager {
        &mut self.pager
    }

    /// True when there is nothing to show after filtering.
    pub fn is_empty(&self) -> bool {
        self.filtered.is_empty()
    }
}
