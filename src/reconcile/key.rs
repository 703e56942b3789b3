use crate::model::{CellValue, ReportKind, RowCollection};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;

pub const KEY_DELIMITER: &str = "_";

/// `<identifier>_<phone>`, both parts trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReconciliationKey(String);

impl ReconciliationKey {
    /// Returns `None` when either part is blank, so blank-keyed rows can
    /// never match each other.
    pub fn new(identifier: &str, phone: &str) -> Option<Self> {
        let identifier = identifier.trim();
        let phone = phone.trim();
        if identifier.is_empty() || phone.is_empty() {
            return None;
        }
        Some(Self(format!("{identifier}{KEY_DELIMITER}{phone}")))
    }

    pub fn from_values(identifier: &CellValue, phone: &CellValue) -> Option<Self> {
        Self::new(&identifier.key_text(), &phone.key_text())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReconciliationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which row fields form the key and which two amounts are summed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapSpec {
    pub identifier_field: String,
    pub phone_field: String,
    pub amount_fields: (String, String),
}

impl MapSpec {
    pub fn new(
        identifier_field: impl Into<String>,
        phone_field: impl Into<String>,
        first_amount: impl Into<String>,
        second_amount: impl Into<String>,
    ) -> Self {
        Self {
            identifier_field: identifier_field.into(),
            phone_field: phone_field.into(),
            amount_fields: (first_amount.into(), second_amount.into()),
        }
    }

    pub fn for_report(kind: ReportKind) -> Self {
        let (identifier, phone) = kind.key_fields();
        let (first, second) = kind.amount_fields();
        Self::new(identifier, phone, first, second)
    }
}

/// Key to computed amount, built once per reconciliation pass.
///
/// Duplicate keys keep the value of the later row. That tie-break is
/// preserved as-is and only counted, see `overwritten`.
#[derive(Debug, Clone, Default)]
pub struct ReconciliationMap {
    values: HashMap<ReconciliationKey, f64>,
    skipped_rows: usize,
    overwritten: usize,
}

impl ReconciliationMap {
    pub fn build(rows: &RowCollection, spec: &MapSpec) -> Self {
        let mut map = Self::default();
        for (index, row) in rows.iter().enumerate() {
            let identifier = row.get(&spec.identifier_field).cloned().unwrap_or_default();
            let phone = row.get(&spec.phone_field).cloned().unwrap_or_default();
            let Some(key) = ReconciliationKey::from_values(&identifier, &phone) else {
                map.skipped_rows += 1;
                tracing::debug!(row = index, "row has a blank key component, not mapped");
                continue;
            };
            let value = row.number(&spec.amount_fields.0) + row.number(&spec.amount_fields.1);
            match map.values.entry(key) {
                Entry::Occupied(mut slot) => {
                    tracing::warn!(
                        key = %slot.key(),
                        previous = *slot.get(),
                        value,
                        "duplicate reconciliation key, later row wins"
                    );
                    slot.insert(value);
                    map.overwritten += 1;
                }
                Entry::Vacant(slot) => {
                    slot.insert(value);
                }
            }
        }
        tracing::debug!(
            keys = map.values.len(),
            skipped = map.skipped_rows,
            overwritten = map.overwritten,
            "reconciliation map built"
        );
        map
    }

    pub fn get(&self, key: &ReconciliationKey) -> Option<f64> {
        self.values.get(key).copied()
    }

    pub fn lookup(&self, identifier: &str, phone: &str) -> Option<f64> {
        ReconciliationKey::new(identifier, phone).and_then(|key| self.get(&key))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Source rows left out for a blank identifier or phone.
    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    /// Number of times a later row replaced an earlier row's value.
    pub fn overwritten(&self) -> usize {
        self.overwritten
    }
}

/// Key-to-amount map for one reconciliation pass.
pub fn build_map(rows: &RowCollection, spec: &MapSpec) -> ReconciliationMap {
    ReconciliationMap::build(rows, spec)
}
