use deduction_recon::filters::{DEFAULT_PAGE_SIZE, Pager, filter_rows, paginate, total_pages};
use deduction_recon::model::{ReportKind, Row, RowCollection};
use deduction_recon::utils::NumberLocale;
use deduction_recon::view::ReportView;
use deduction_recon::EngineError;
use serde_json::json;

fn people() -> RowCollection {
    RowCollection::from(vec![
        Row::new().with("name", "Somchai").with("amount", 1000.0),
        Row::new().with("name", "Keo").with("amount", 250.0),
        Row::new().with("name", "Noy").with("amount", 1250000.0),
    ])
}

#[test]
fn blank_query_keeps_everything() {
    let rows = people();
    assert_eq!(filter_rows(&rows, "", NumberLocale::Dot), rows);
    assert_eq!(filter_rows(&rows, "   ", NumberLocale::Dot), rows);
}

#[test]
fn match_is_case_insensitive_substring() {
    let rows = filter_rows(&people(), "  SOM ", NumberLocale::Dot);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows.rows()[0].text("name"), "Somchai");
}

#[test]
fn numbers_match_raw_and_grouped_forms() {
    let rows = people();
    assert_eq!(filter_rows(&rows, "1000", NumberLocale::Dot).len(), 1);
    assert_eq!(filter_rows(&rows, "1.000", NumberLocale::Dot).len(), 1);
    assert_eq!(filter_rows(&rows, "1.250.000", NumberLocale::Dot).len(), 1);
    assert_eq!(filter_rows(&rows, "1,250,000", NumberLocale::Comma).len(), 1);
    assert!(filter_rows(&rows, "1,250,000", NumberLocale::Dot).is_empty());
}

#[test]
fn filter_preserves_order() {
    let rows = filter_rows(&people(), "o", NumberLocale::Dot);
    let names: Vec<String> = rows.iter().map(|row| row.text("name")).collect();
    assert_eq!(names, vec!["Somchai", "Keo", "Noy"]);
}

#[test]
fn page_count_is_at_least_one() {
    assert_eq!(total_pages(0, DEFAULT_PAGE_SIZE), 1);
    assert_eq!(total_pages(15, 15), 1);
    assert_eq!(total_pages(16, 15), 2);
    assert_eq!(total_pages(31, 15), 3);
}

#[test]
fn out_of_range_pages_are_empty() {
    let rows: RowCollection = (0..20i64).map(|i| Row::new().with("i", i)).collect();
    assert_eq!(paginate(&rows, 15, 1).len(), 15);
    assert_eq!(paginate(&rows, 15, 2).len(), 5);
    assert!(paginate(&rows, 15, 0).is_empty());
    assert!(paginate(&rows, 15, 3).is_empty());
    assert!(paginate(&rows, 15, usize::MAX).is_empty());
}

#[test]
fn pager_set_total_clamps_current_page() {
    let mut pager = Pager::new(10);
    pager.reset(45);
    pager.go_to(5);
    assert_eq!(pager.page(), 5);
    pager.set_total(25);
    assert_eq!(pager.page(), 3);
    assert!(!pager.has_next());
    pager.set_total(0);
    assert_eq!(pager.page(), 1);
    assert!(!pager.has_prev());
}

fn payload(count: usize) -> serde_json::Value {
    let rows: Vec<_> = (0..count)
        .map(|i| json!({"employee_id": format!("E{i}"), "msisdn": format!("555{i:04}"), "amount": i}))
        .collect();
    json!({"data": rows})
}

#[test]
fn changing_the_query_returns_to_page_one() {
    let mut view = ReportView::new(ReportKind::Deductions, 15, NumberLocale::Dot);
    view.load(Ok(payload(50))).expect("load");
    assert!(view.pager_mut().next());
    assert!(view.pager_mut().next());
    assert_eq!(view.pager().page(), 3);

    view.set_query("E1");
    assert_eq!(view.pager().page(), 1);
    assert!(view.filtered().len() < 50);
}

#[test]
fn reloading_rows_returns_to_page_one() {
    let mut view = ReportView::new(ReportKind::Deductions, 15, NumberLocale::Dot);
    view.load(Ok(payload(40))).expect("load");
    view.pager_mut().go_to(3);
    view.load(Ok(payload(40))).expect("reload");
    assert_eq!(view.pager().page(), 1);
    assert_eq!(view.current_page().len(), 15);
}

#[test]
fn failed_fetch_clears_stale_rows() {
    let mut view = ReportView::new(ReportKind::Loans, 15, NumberLocale::Dot);
    view.load(Ok(payload(5))).expect("load");
    assert!(!view.is_empty());

    let err = view
        .load(Err(EngineError::fetch(ReportKind::Loans, "connection refused")))
        .expect_err("fetch failure");
    assert!(matches!(err, EngineError::Fetch { .. }));
    assert!(view.is_empty());
    assert!(view.rows().is_empty());
    assert!(view.current_page().is_empty());
}
