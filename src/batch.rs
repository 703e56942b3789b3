//! Sequential batch insert with per-row partial-failure accounting.
//!
//! Every row is submitted exactly once, strictly in collection order, and a
//! failed row never stops the rows after it. The run is a fold over the
//! rows with a [`BatchInsertResult`] accumulator.

use crate::error::{EngineError, EngineResult};
use crate::model::{ReportKind, Row, RowCollection};
use async_trait::async_trait;
use chrono::NaiveDate;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

pub const DEFAULT_STATUS_FIELD: &str = "status";

/// One remote write.
#[async_trait]
pub trait Submitter: Send + Sync {
    async fn submit(&self, payload: &InsertPayload) -> EngineResult<Value>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertPayload {
    pub employee_id: String,
    pub msisdn: String,
    pub amount: f64,
    pub effective_date: NaiveDate,
}

impl InsertPayload {
    /// Key fields of `kind` plus the sum of its two amount fields.
    pub fn from_row(row: &Row, kind: ReportKind, effective_date: NaiveDate) -> Self {
        let (id_field, phone_field) = kind.key_fields();
        let (base, extra) = kind.amount_fields();
        Self {
            employee_id: row.text(id_field).trim().to_string(),
            msisdn: row.text(phone_field).trim().to_string(),
            amount: row.number(base) + row.number(extra),
            effective_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemOutcome {
    /// Position in the submitted collection
    pub index: usize,
    pub id: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchInsertResult {
    pub items: Vec<ItemOutcome>,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchInsertResult {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    pub fn record_success(&mut self, index: usize, id: String) {
        self.items.push(ItemOutcome {
            index,
            id,
            success: true,
            reason: None,
        });
        self.attempted += 1;
        self.succeeded += 1;
    }

    pub fn record_failure(&mut self, index: usize, id: String, reason: String) {
        self.items.push(ItemOutcome {
            index,
            id,
            success: false,
            reason: Some(reason),
        });
        self.attempted += 1;
        self.failed += 1;
    }

    pub fn failures(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.items.iter().filter(|item| !item.success)
    }

    /// Percentage, 0-100.
    pub fn success_rate(&self) -> f64 {
        if self.attempted == 0 {
            return 0.0;
        }
        self.succeeded as f64 / self.attempted as f64 * 100.0
    }

    pub fn is_complete_success(&self) -> bool {
        self.attempted > 0 && self.failed == 0
    }

    pub fn summary(&self) -> String {
        format!("{} of {} succeeded", self.succeeded, self.attempted)
    }
}

/// Runs the batch. Preconditions (rows present, effective date chosen) are
/// checked before the first submission; breaking either returns
/// [`EngineError::Validation`] with nothing submitted.
pub async fn run<S, F>(
    rows: &RowCollection,
    effective_date: Option<NaiveDate>,
    build_payload: F,
    submitter: &S,
    status_field: &str,
) -> EngineResult<BatchInsertResult>
where
    S: Submitter + ?Sized,
    F: Fn(&Row, NaiveDate) -> InsertPayload,
{
    if rows.is_empty() {
        return Err(EngineError::validation("rows", "no rows to submit"));
    }
    let Some(effective_date) = effective_date else {
        return Err(EngineError::validation(
            "effective_date",
            "an effective date is required",
        ));
    };

    let build_payload = &build_payload;
    let result = futures::stream::iter(rows.iter().enumerate())
        .fold(
            BatchInsertResult::with_capacity(rows.len()),
            |mut acc, (index, row)| async move {
                let payload = build_payload(row, effective_date);
                let id = item_id(&payload, index);
                match submitter.submit(&payload).await {
                    Ok(response) if is_truthy(response.get(status_field)) => {
                        debug!(row = index, id = %id, "insert accepted");
                        acc.record_success(index, id);
                    }
                    Ok(response) => {
                        let reason = rejection_reason(&response, status_field);
                        warn!(row = index, id = %id, reason = %reason, "insert rejected");
                        acc.record_failure(index, id, reason);
                    }
                    Err(err) => {
                        warn!(row = index, id = %id, error = %err, "insert failed");
                        acc.record_failure(index, id, err.reason());
                    }
                }
                acc
            },
        )
        .await;

    info!(
        attempted = result.attempted,
        succeeded = result.succeeded,
        failed = result.failed,
        "batch insert complete"
    );
    Ok(result)
}

fn item_id(payload: &InsertPayload, index: usize) -> String {
    if payload.employee_id.is_empty() {
        format!("row {}", index + 1)
    } else {
        payload.employee_id.clone()
    }
}

/// Loose truthiness: `false`, `0`, `""`, `null` and a missing field are false.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

fn rejection_reason(response: &Value, status_field: &str) -> String {
    match response.get("message").and_then(Value::as_str) {
        Some(message) if !message.trim().is_empty() => message.trim().to_string(),
        _ => format!(
            "remote rejected the record ({status_field}={})",
            response.get(status_field).unwrap_or(&Value::Null)
        ),
    }
}
