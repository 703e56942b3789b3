#![allow(dead_code)]

use std::io::Cursor;
use std::path::{Path, PathBuf};

use deduction_recon::{Row, RowCollection};
use tempfile::{TempDir, tempdir};
use umya_spreadsheet::{self, Spreadsheet, Worksheet};

pub const EMPLOYEE_HEADER: &str = "ລະຫັດພະນັກງານ";
pub const PHONE_HEADER: &str = "ເບີໂທ";
pub const TARGET_HEADER: &str = "xjaidee";

pub fn write_workbook_to_path<F>(path: &Path, f: F)
where
    F: FnOnce(&mut Spreadsheet),
{
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create dir");
    }
    let mut book = umya_spreadsheet::new_file();
    f(&mut book);
    umya_spreadsheet::writer::xlsx::write(&book, path).expect("write workbook");
}

/// Serialized `.xlsx` bytes of a workbook built by `f`, starting from the
/// default single `Sheet1`.
pub fn workbook_bytes<F>(f: F) -> Vec<u8>
where
    F: FnOnce(&mut Spreadsheet),
{
    let mut book = umya_spreadsheet::new_file();
    f(&mut book);
    let mut cursor = Cursor::new(Vec::new());
    umya_spreadsheet::writer::xlsx::write_writer(&book, &mut cursor).expect("write workbook");
    cursor.into_inner()
}

pub fn read_book(bytes: &[u8]) -> Spreadsheet {
    umya_spreadsheet::reader::xlsx::read_reader(Cursor::new(bytes), true).expect("read workbook")
}

pub fn cell_text(book: &Spreadsheet, sheet: &str, col: u32, row: u32) -> String {
    book.get_sheet_by_name(sheet)
        .expect("sheet")
        .get_cell((col, row))
        .map(|cell| cell.get_value().to_string())
        .unwrap_or_default()
}

pub fn header_labels(sheet: &Worksheet) -> Vec<String> {
    let mut col = 1;
    let mut labels = Vec::new();
    while let Some(cell) = sheet.get_cell((col, 1)) {
        let value = cell.get_value();
        if value.is_empty() {
            break;
        }
        labels.push(value.to_string());
        col += 1;
    }
    labels
}

pub fn write_header(sheet: &mut Worksheet, labels: &[&str]) {
    for (idx, label) in labels.iter().enumerate() {
        sheet
            .get_cell_mut((idx as u32 + 1, 1))
            .set_value_string(*label);
    }
}

/// Writes a payroll-style sheet: `No | employee | name | phone | target`.
/// Rows are `(employee id, phone)`; blank strings leave the cell empty.
pub fn write_payroll_sheet(sheet: &mut Worksheet, rows: &[(&str, &str)]) {
    write_header(
        sheet,
        &["No", EMPLOYEE_HEADER, "ຊື່", PHONE_HEADER, TARGET_HEADER],
    );
    for (idx, (employee, phone)) in rows.iter().enumerate() {
        let row = idx as u32 + 2;
        sheet.get_cell_mut((1, row)).set_value_number(idx as f64 + 1.0);
        if !employee.is_empty() {
            sheet.get_cell_mut((2, row)).set_value_string(*employee);
        }
        sheet
            .get_cell_mut((3, row))
            .set_value_string(format!("name {}", idx + 1));
        if !phone.is_empty() {
            sheet.get_cell_mut((4, row)).set_value_string(*phone);
        }
    }
}

pub fn deduction_row(employee: &str, phone: &str, amount: f64, interest: f64) -> Row {
    Row::new()
        .with("employee_id", employee)
        .with("msisdn", phone)
        .with("amount", amount)
        .with("interest", interest)
}

pub fn collection(rows: Vec<Row>) -> RowCollection {
    RowCollection::from(rows)
}

pub struct TestWorkspace {
    _tempdir: TempDir,
    root: PathBuf,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let tempdir = tempdir().expect("tempdir");
        let root = tempdir.path().to_path_buf();
        Self {
            _tempdir: tempdir,
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn create_workbook<F>(&self, name: &str, f: F) -> PathBuf
    where
        F: FnOnce(&mut Spreadsheet),
    {
        let path = self.path(name);
        write_workbook_to_path(&path, f);
        path
    }

    pub fn write_json(&self, name: &str, value: &serde_json::Value) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, serde_json::to_vec_pretty(value).expect("json")).expect("write");
        path
    }
}
