mod support;

use chrono::NaiveDate;
use deduction_recon::export::{
    ColumnSpec, ExportFileName, ExportSpec, NamedRowCollection, SheetSpec, Theme, build_workbook,
    export, export_async,
};
use deduction_recon::model::{Row, RowCollection};
use deduction_recon::styles::{BORDER_THIN, WHITE, descriptor_from_style};
use deduction_recon::utils::NumberLocale;
use support::{TestWorkspace, cell_text, header_labels, read_book};

fn naming() -> ExportFileName {
    ExportFileName::new(
        "deductions",
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
    )
}

fn single_row() -> RowCollection {
    RowCollection::from(vec![Row::new().with("msisdn", 555.0).with("amount", 1000.0)])
}

#[test]
fn display_mode_round_trip_renders_grouped_numbers() {
    let collections = vec![NamedRowCollection::new("Report", single_row())];
    let artifact = export(&ExportSpec::display(), &collections, &naming()).expect("export");
    assert_eq!(artifact.sheets, vec!["Report".to_string()]);

    let book = read_book(&artifact.bytes);
    let sheet = book.get_sheet_by_name("Report").expect("sheet");
    assert_eq!(header_labels(sheet), vec!["#", "msisdn", "amount"]);
    assert_eq!(cell_text(&book, "Report", 1, 2), "1");
    assert_eq!(cell_text(&book, "Report", 2, 2), "555");
    assert_eq!(cell_text(&book, "Report", 3, 2), "1.000");
}

#[test]
fn comma_locale_groups_with_commas() {
    let rows = RowCollection::from(vec![Row::new().with("amount", 1234567.5)]);
    let spec = ExportSpec::display().with_locale(NumberLocale::Comma);
    let artifact = export(&spec, &[NamedRowCollection::new("R", rows)], &naming()).expect("export");
    let book = read_book(&artifact.bytes);
    assert_eq!(cell_text(&book, "R", 2, 2), "1,234,567.5");
}

#[test]
fn header_and_data_cells_are_styled() {
    let spec = ExportSpec::display().with_theme(Theme::Green);
    let (book, _) = build_workbook(&spec, &[NamedRowCollection::new("Report", single_row())])
        .expect("workbook");
    let sheet = book.get_sheet_by_name("Report").expect("sheet");

    let header = descriptor_from_style(sheet.get_cell((2, 1)).expect("header").get_style());
    let font = header.font.expect("font");
    assert_eq!(font.bold, Some(true));
    assert_eq!(font.color.as_deref(), Some(WHITE));
    assert_eq!(header.fill_color.as_deref(), Some(Theme::Green.fill_argb()));
    assert_eq!(header.horizontal.as_deref(), Some("center"));
    assert_eq!(header.border.expect("border").style, BORDER_THIN);

    let data = descriptor_from_style(sheet.get_cell((3, 2)).expect("data").get_style());
    assert_eq!(data.border.expect("border").style, BORDER_THIN);
    assert!(data.fill_color.is_none());
}

#[test]
fn native_mode_writes_numbers_with_format_code() {
    let rows = RowCollection::from(vec![
        Row::new()
            .with("employee_id", "0042")
            .with("amount", "1500")
            .with("note", "x"),
    ]);
    let spec = ExportSpec::native().with_sheet(SheetSpec::new("Loans").with_columns(vec![
        ColumnSpec::new("employee_id").labelled("Employee"),
        ColumnSpec::new("amount").labelled("Amount").numeric(),
    ]));
    let (book, _) =
        build_workbook(&spec, &[NamedRowCollection::new("Loans", rows)]).expect("workbook");
    let sheet = book.get_sheet_by_name("Loans").expect("sheet");

    assert_eq!(header_labels(sheet), vec!["Employee", "Amount"]);
    let id = sheet.get_cell((1, 2)).expect("id");
    assert_eq!(id.get_value(), "0042");

    let amount = sheet.get_cell((2, 2)).expect("amount");
    assert_eq!(amount.get_value(), "1500");
    let style = descriptor_from_style(amount.get_style());
    assert_eq!(style.number_format.as_deref(), Some("#,##0"));
}

#[test]
fn empty_collections_are_skipped_unless_header_only() {
    let columns = vec![ColumnSpec::new("a"), ColumnSpec::new("b")];
    let spec = ExportSpec::native()
        .with_sheet(SheetSpec::new("Pending").with_columns(columns).header_only());
    let collections = vec![
        NamedRowCollection::new("Report", single_row()),
        NamedRowCollection::new("Empty", RowCollection::new()),
        NamedRowCollection::new("Pending", RowCollection::new()),
    ];
    let artifact = export(&spec, &collections, &naming()).expect("export");
    assert_eq!(artifact.sheets, vec!["Report".to_string(), "Pending".to_string()]);

    let book = read_book(&artifact.bytes);
    assert!(book.get_sheet_by_name("Empty").is_none());
    let pending = book.get_sheet_by_name("Pending").expect("pending");
    assert_eq!(header_labels(pending), vec!["a", "b"]);
    assert_eq!(cell_text(&book, "Pending", 1, 2), "");
}

#[test]
fn column_widths_follow_heuristic_or_fixed_width() {
    let long_label = "a_rather_long_column_label_for_width";
    let rows = RowCollection::from(vec![Row::new().with("id", "1").with(long_label, "x")]);
    let collections = vec![NamedRowCollection::new("W", rows)];

    let (book, _) = build_workbook(&ExportSpec::native(), &collections).expect("workbook");
    let sheet = book.get_sheet_by_name("W").expect("sheet");
    assert_eq!(*sheet.get_column_dimension("A").expect("A").get_width(), 12.0);
    assert_eq!(
        *sheet.get_column_dimension("B").expect("B").get_width(),
        long_label.len() as f64
    );

    let fixed = ExportSpec::native().with_fixed_width(20.0);
    let (book, _) = build_workbook(&fixed, &collections).expect("workbook");
    let sheet = book.get_sheet_by_name("W").expect("sheet");
    assert_eq!(*sheet.get_column_dimension("B").expect("B").get_width(), 20.0);
}

#[tokio::test]
async fn async_export_saves_under_computed_name() {
    let workspace = TestWorkspace::new();
    let naming = naming().with_category("Vientiane");
    let artifact = export_async(
        ExportSpec::display(),
        vec![NamedRowCollection::new("Report", single_row())],
        naming,
    )
    .await
    .expect("export");
    assert_eq!(artifact.file_name, "deductions_2024-01-01_to_2024-01-31_Vientiane.xlsx");

    let path = artifact.save_in(workspace.root()).expect("save");
    assert!(path.ends_with("deductions_2024-01-01_to_2024-01-31_Vientiane.xlsx"));
    let book = read_book(&std::fs::read(path).expect("read"));
    assert_eq!(cell_text(&book, "Report", 3, 2), "1.000");
}
