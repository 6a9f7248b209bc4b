//! # Row Store
//!
//! In-memory tables exactly as fetched from the upstream provider.
//!
//! CSV has no native typing, so every value arrives as text. Numeric columns
//! are cast here, at the boundary, through fallible accessors:
//! - A missing column or an empty value reads as absent (`None`)
//! - A present value that is not an integer is a `CompileError::Parse`
//!   naming the table, column and row
//!
//! Resolvers decide what "absent" means for them (usually: skip the row).

use crate::CompileError;
use std::collections::BTreeMap;

// =============================================================================
// RAW TABLES
// =============================================================================

/// Raw table payloads in the order they were fetched.
///
/// This is the input of the change-detection hash, so order matters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTables {
    tables: Vec<(String, String)>,
}

impl RawTables {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a table payload.
    pub fn push(&mut self, name: impl Into<String>, payload: impl Into<String>) {
        self.tables.push((name.into(), payload.into()));
    }

    /// Iterate `(name, payload)` pairs in fetch order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tables
            .iter()
            .map(|(name, payload)| (name.as_str(), payload.as_str()))
    }

    /// Get the payload of a table by name.
    #[must_use]
    pub fn payload(&self, name: &str) -> Option<&str> {
        self.iter()
            .find(|(table, _)| *table == name)
            .map(|(_, payload)| payload)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

// =============================================================================
// TABLE
// =============================================================================

/// A parsed table: header row plus string records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    name: String,
    columns: BTreeMap<String, usize>,
    records: Vec<Vec<String>>,
}

impl Table {
    /// Parse a CSV payload. The first line is the header.
    ///
    /// Rows with fewer or more fields than the header are accepted; missing
    /// trailing fields read as absent.
    pub fn from_csv(name: &str, text: &str) -> Result<Self, CompileError> {
        let csv_error = |e: csv::Error| CompileError::Csv {
            table: name.to_string(),
            message: e.to_string(),
        };

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut columns = BTreeMap::new();
        for (index, header) in reader.headers().map_err(csv_error)?.iter().enumerate() {
            // First occurrence wins on duplicate headers.
            columns.entry(header.trim().to_string()).or_insert(index);
        }

        let mut records = Vec::new();
        for record in reader.records() {
            let record = record.map_err(csv_error)?;
            records.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self {
            name: name.to_string(),
            columns,
            records,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate rows in source order.
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        (0..self.records.len()).map(move |index| Row { table: self, index })
    }
}

// =============================================================================
// ROW
// =============================================================================

/// A borrowed view of one record with typed, fallible accessors.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a Table,
    index: usize,
}

impl<'a> Row<'a> {
    /// 1-based data row number, for error messages.
    #[must_use]
    pub fn number(&self) -> usize {
        self.index + 1
    }

    /// Text value of a column; `None` if the column is missing or empty.
    #[must_use]
    pub fn text(&self, column: &str) -> Option<&'a str> {
        let position = *self.table.columns.get(column)?;
        self.table.records[self.index]
            .get(position)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Integer value of a column; `Ok(None)` if absent.
    pub fn opt_i64(&self, column: &str) -> Result<Option<i64>, CompileError> {
        let Some(raw) = self.text(column) else {
            return Ok(None);
        };
        raw.trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| CompileError::Parse {
                table: self.table.name.clone(),
                column: column.to_string(),
                row: self.number(),
                value: raw.to_string(),
            })
    }

    /// Integer value of a column, or `default` if absent.
    pub fn i64_or(&self, column: &str, default: i64) -> Result<i64, CompileError> {
        Ok(self.opt_i64(column)?.unwrap_or(default))
    }
}

// =============================================================================
// ROW STORE
// =============================================================================

/// All tables of one compilation pass, by name.
#[derive(Debug, Clone, Default)]
pub struct RowStore {
    tables: BTreeMap<String, Table>,
}

impl RowStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse every raw payload into a table.
    pub fn from_raw(raw: &RawTables) -> Result<Self, CompileError> {
        let mut store = Self::new();
        for (name, payload) in raw.iter() {
            store.insert(Table::from_csv(name, payload)?);
        }
        Ok(store)
    }

    /// Insert or replace a table.
    pub fn insert(&mut self, table: Table) {
        self.tables.insert(table.name.clone(), table);
    }

    /// Get a table by name.
    ///
    /// Returns `CompileError::MissingTable` if it was never fetched.
    pub fn table(&self, name: &str) -> Result<&Table, CompileError> {
        self.tables
            .get(name)
            .ok_or_else(|| CompileError::MissingTable(name.to_string()))
    }

    /// Row counts per table, in name order.
    pub fn counts(&self) -> impl Iterator<Item = (&str, usize)> {
        self.tables
            .iter()
            .map(|(name, table)| (name.as_str(), table.len()))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    fn table(text: &str) -> Table {
        Table::from_csv("JournalInstance", text).expect("parse")
    }

    #[test]
    fn text_treats_empty_and_missing_as_absent() {
        let t = table("ID,Name_lang,MapID\n1,,33\n");
        let row = t.rows().next().expect("row");

        assert_eq!(row.text("ID"), Some("1"));
        assert_eq!(row.text("Name_lang"), None);
        assert_eq!(row.text("Flags"), None);
    }

    #[test]
    fn opt_i64_parses_negative_and_padded_values() {
        let t = table("ID,DifficultyMask\n 7 ,-1\n");
        let row = t.rows().next().expect("row");

        assert_eq!(row.opt_i64("ID").expect("id"), Some(7));
        assert_eq!(row.opt_i64("DifficultyMask").expect("mask"), Some(-1));
        assert_eq!(row.opt_i64("Missing").expect("missing"), None);
    }

    #[test]
    fn opt_i64_rejects_non_numeric_with_location() {
        let t = table("ID,MapID\n1,2\n2,oops\n");
        let row = t.rows().nth(1).expect("row");

        match row.opt_i64("MapID") {
            Err(CompileError::Parse {
                table,
                column,
                row,
                value,
            }) => {
                assert_eq!(table, "JournalInstance");
                assert_eq!(column, "MapID");
                assert_eq!(row, 2);
                assert_eq!(value, "oops");
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn ragged_rows_are_tolerated() {
        let t = table("ID,Name_lang,MapID\n1,Deadmines\n");
        let row = t.rows().next().expect("row");

        assert_eq!(row.text("Name_lang"), Some("Deadmines"));
        assert_eq!(row.opt_i64("MapID").expect("map"), None);
    }

    #[test]
    fn quoted_fields_keep_commas() {
        let t = table("ID,Name_lang\n1,\"Blackrock Depths, Upper\"\n");
        let row = t.rows().next().expect("row");
        assert_eq!(row.text("Name_lang"), Some("Blackrock Depths, Upper"));
    }

    #[test]
    fn store_reports_missing_table() {
        let store = RowStore::new();
        assert!(matches!(
            store.table("Map"),
            Err(CompileError::MissingTable(name)) if name == "Map"
        ));
    }

    #[test]
    fn raw_tables_keep_fetch_order() {
        let mut raw = RawTables::new();
        raw.push("B", "ID\n1\n");
        raw.push("A", "ID\n2\n");

        let names: Vec<_> = raw.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["B", "A"]);
        assert_eq!(raw.payload("A"), Some("ID\n2\n"));

        let store = RowStore::from_raw(&raw).expect("store");
        assert_eq!(store.table("A").expect("table").len(), 1);
    }
}
