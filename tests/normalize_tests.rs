use deduction_recon::model::{CellValue, ReportKind};
use deduction_recon::normalize::{Payload, normalize, resolve_payload};
use serde_json::json;

#[test]
fn null_and_scalars_yield_no_rows() {
    for raw in [json!(null), json!(7), json!("text"), json!(true), json!({"data": null})] {
        assert!(normalize(&raw, ReportKind::Deductions).is_empty(), "{raw}");
    }
}

#[test]
fn every_response_shape_produces_rows() {
    let record = json!({"employee_id": "E1", "msisdn": "555", "amount": 10});
    let shapes = [
        json!([record.clone()]),
        json!({"data": [record.clone()]}),
        json!({"data": {"data": [record.clone()]}}),
        json!({"data": record.clone()}),
        record.clone(),
    ];
    for raw in shapes {
        let rows = normalize(&raw, ReportKind::Deductions);
        assert_eq!(rows.len(), 1, "{raw}");
        assert_eq!(rows.rows()[0].text("employee_id"), "E1");
    }
}

#[test]
fn non_object_array_elements_are_dropped() {
    let rows = normalize(&json!([1, {"a": "x"}, "y", null, {"a": "z"}]), ReportKind::Generic);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows.rows()[1].text("a"), "z");
}

#[test]
fn known_report_fields_are_coerced() {
    let raw = json!({"data": [{
        "employee_id": 123,
        "msisdn": "02055512345",
        "amount": "abc",
        "interest": "12.5",
        "status": "weird"
    }]});
    let rows = normalize(&raw, ReportKind::Deductions);
    let row = &rows.rows()[0];
    assert_eq!(row.get("employee_id"), Some(&CellValue::Text("123".into())));
    assert_eq!(row.get("msisdn"), Some(&CellValue::Text("02055512345".into())));
    assert_eq!(row.get("amount"), Some(&CellValue::Number(0.0)));
    assert_eq!(row.get("interest"), Some(&CellValue::Number(12.5)));
    assert_eq!(row.get("status"), Some(&CellValue::Text("pending".into())));
    // schema fields absent from the payload are still present
    assert_eq!(row.get("total"), Some(&CellValue::Number(0.0)));
    assert_eq!(row.get("employee_name"), Some(&CellValue::Text(String::new())));
}

#[test]
fn recognized_status_is_kept_case_insensitively() {
    let rows = normalize(&json!([{"status": "Approved"}]), ReportKind::Loans);
    assert_eq!(rows.rows()[0].text("status"), "approved");
}

#[test]
fn loan_installments_are_whole_numbers() {
    let rows = normalize(&json!([{"installments": "6.7"}]), ReportKind::Loans);
    assert_eq!(rows.rows()[0].number("installments"), 6.0);
}

#[test]
fn generic_reports_keep_values_as_sent() {
    let rows = normalize(&json!([{"id": 7, "flag": false, "tags": ["a"]}]), ReportKind::Generic);
    let row = &rows.rows()[0];
    assert_eq!(row.get("id"), Some(&CellValue::Number(7.0)));
    assert_eq!(row.get("flag"), Some(&CellValue::Text("false".into())));
    assert_eq!(row.get("tags"), Some(&CellValue::Text("[\"a\"]".into())));
}

#[test]
fn later_rows_present_first_row_columns() {
    let rows = normalize(&json!([{"a": 1, "b": 2}, {"b": 3, "c": 4}]), ReportKind::Generic);
    assert_eq!(rows.columns(), vec!["a".to_string(), "b".to_string()]);
    let second = &rows.rows()[1];
    assert_eq!(second.get("a"), Some(&CellValue::Null));
    assert_eq!(second.text("a"), "");
    assert_eq!(second.number("a"), 0.0);
}

#[test]
fn discriminator_is_explicit() {
    assert_eq!(resolve_payload(&json!({"data": 3})), Payload::Empty);
    assert!(matches!(resolve_payload(&json!({"x": 1})), Payload::SingleObject(_)));
}
