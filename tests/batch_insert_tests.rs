mod support;

use assert_matches::assert_matches;
use async_trait::async_trait;
use chrono::NaiveDate;
use deduction_recon::batch::{self, InsertPayload, Submitter};
use deduction_recon::error::{EngineError, EngineResult};
use deduction_recon::model::{ReportKind, RowCollection};
use parking_lot::Mutex;
use serde_json::{Value, json};
use support::{collection, deduction_row};

/// Records every payload and answers from a per-employee script.
struct ScriptedSubmitter {
    calls: Mutex<Vec<String>>,
    answer: fn(&InsertPayload) -> EngineResult<Value>,
}

impl ScriptedSubmitter {
    fn new(answer: fn(&InsertPayload) -> EngineResult<Value>) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            answer,
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl Submitter for ScriptedSubmitter {
    async fn submit(&self, payload: &InsertPayload) -> EngineResult<Value> {
        self.calls.lock().push(payload.employee_id.clone());
        tokio::task::yield_now().await;
        (self.answer)(payload)
    }
}

fn effective() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(2024, 5, 25)
}

fn three_rows() -> RowCollection {
    collection(vec![
        deduction_row("E1", "5551000", 100.0, 20.0),
        deduction_row("E2", "5552000", 50.0, 5.0),
        deduction_row("E3", "5553000", 10.0, 0.0),
    ])
}

fn payload_for(row: &deduction_recon::Row, date: NaiveDate) -> InsertPayload {
    InsertPayload::from_row(row, ReportKind::Deductions, date)
}

#[tokio::test]
async fn second_row_rejected_yields_two_of_three() {
    let submitter = ScriptedSubmitter::new(|payload| {
        if payload.employee_id == "E2" {
            Ok(json!({"status": false, "message": "already deducted"}))
        } else {
            Ok(json!({"status": true}))
        }
    });

    let result = batch::run(&three_rows(), effective(), payload_for, &submitter, "status")
        .await
        .expect("batch");

    assert_eq!((result.attempted, result.succeeded, result.failed), (3, 2, 1));
    let ids: Vec<&str> = result.items.iter().map(|item| item.id.as_str()).collect();
    assert_eq!(ids, vec!["E1", "E2", "E3"]);
    assert!(result.items[0].success);
    assert!(!result.items[1].success);
    assert_eq!(result.items[1].reason.as_deref(), Some("already deducted"));
    assert!(result.items[2].success);
    assert_eq!(result.summary(), "2 of 3 succeeded");
    assert_eq!(submitter.calls(), vec!["E1", "E2", "E3"]);
}

#[tokio::test]
async fn transport_errors_do_not_abort_the_batch() {
    let submitter = ScriptedSubmitter::new(|payload| {
        if payload.employee_id == "E1" {
            Err(EngineError::submission("E1", "connection reset"))
        } else {
            Ok(json!({"status": 1}))
        }
    });

    let result = batch::run(&three_rows(), effective(), payload_for, &submitter, "status")
        .await
        .expect("batch");
    assert_eq!(result.failed, 1);
    assert_eq!(result.succeeded, 2);
    let failure = result.failures().next().expect("failure");
    assert_eq!(failure.index, 0);
    assert!(failure.reason.as_deref().unwrap_or_default().contains("connection reset"));
    assert_eq!(submitter.calls().len(), 3);
}

#[tokio::test]
async fn payload_carries_computed_amount_and_date() {
    let submitter = ScriptedSubmitter::new(|payload| {
        let expected = match payload.employee_id.as_str() {
            "E1" => 120.0,
            "E2" => 55.0,
            _ => 10.0,
        };
        let ok = payload.amount == expected
            && payload.effective_date == NaiveDate::from_ymd_opt(2024, 5, 25).unwrap();
        Ok(json!({ "status": ok }))
    });

    let result = batch::run(&three_rows(), effective(), payload_for, &submitter, "status")
        .await
        .expect("batch");
    assert!(result.is_complete_success());
}

#[tokio::test]
async fn custom_status_field_decides_success() {
    let submitter = ScriptedSubmitter::new(|_| Ok(json!({"status": true, "ok": ""})));
    let result = batch::run(&three_rows(), effective(), payload_for, &submitter, "ok")
        .await
        .expect("batch");
    assert_eq!(result.failed, 3);
}

#[tokio::test]
async fn missing_effective_date_submits_nothing() {
    let submitter = ScriptedSubmitter::new(|_| Ok(json!({"status": true})));
    let err = batch::run(&three_rows(), None, payload_for, &submitter, "status")
        .await
        .expect_err("validation");
    assert_matches!(err, EngineError::Validation { ref parameter, .. } if parameter == "effective_date");
    assert!(submitter.calls().is_empty());
}

#[tokio::test]
async fn empty_rows_submit_nothing() {
    let submitter = ScriptedSubmitter::new(|_| Ok(json!({"status": true})));
    let err = batch::run(&RowCollection::new(), effective(), payload_for, &submitter, "status")
        .await
        .expect_err("validation");
    assert_matches!(err, EngineError::Validation { .. });
    assert!(submitter.calls().is_empty());
}
