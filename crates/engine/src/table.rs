//! A sheet read as a keyed table: row 0 holds the column headers and
//! column 0 holds the row keys.

use std::collections::BTreeMap;

use sheetdb_core::{CellRange, GridAddress, SheetId};

use crate::error::{LookupError, StoreError};
use crate::named::NameIndexed;
use crate::sheet::Sheet;
use crate::store::GridStore;

/// Header-to-value map of one table row.
pub type Record = BTreeMap<String, String>;

/// Rows whose `Enable` cell is not affirmative are skipped by
/// [`Table::records`]. A table without the column enables every row.
pub const ENABLE_COLUMN: &str = "Enable";

/// Header cells of row 0.
struct Headers<'a>(&'a Sheet);

impl NameIndexed for Headers<'_> {
    const KIND: &'static str = "column";

    fn names(&self) -> impl Iterator<Item = (usize, &str)> {
        let width = self.0.row(0).map_or(0, |r| r.len());
        (0..width).map(|col| (col, self.0.display(0, col)))
    }
}

/// Key cells of column 0, below the header row.
struct RowKeys<'a>(&'a Sheet);

impl NameIndexed for RowKeys<'_> {
    const KIND: &'static str = "row";

    fn names(&self) -> impl Iterator<Item = (usize, &str)> {
        self.0.rows().skip(1).map(|(idx, row)| (idx, row.display(0)))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Table<'s> {
    store: &'s GridStore,
    sheet: SheetId,
}

impl<'s> Table<'s> {
    pub fn open(store: &'s GridStore, title: &str) -> Result<Self, StoreError> {
        let sheet = store.read(|m| m.sheet_by_title(title).map(Sheet::id))?;
        Ok(Self { store, sheet })
    }

    pub fn sheet_id(&self) -> SheetId {
        self.sheet
    }

    fn with_sheet<R>(&self, f: impl FnOnce(&Sheet) -> Result<R, StoreError>) -> Result<R, StoreError> {
        self.store.read(|m| -> Result<R, StoreError> { f(m.sheet(self.sheet)?) })
    }

    pub fn headers(&self) -> Result<Vec<String>, StoreError> {
        self.with_sheet(|s| Ok(Headers(s).names().map(|(_, n)| n.to_string()).collect()))
    }

    /// Column index of the one header named `name`.
    pub fn column(&self, name: &str) -> Result<usize, StoreError> {
        self.with_sheet(|s| Ok(Headers(s).find_unique(name)?))
    }

    /// Row index of the one row keyed `key`.
    pub fn row_by_key(&self, key: &str) -> Result<usize, StoreError> {
        self.with_sheet(|s| Ok(RowKeys(s).find_unique(key)?))
    }

    /// Value at (`row_key`, `column`).
    pub fn lookup(&self, row_key: &str, column: &str) -> Result<String, StoreError> {
        self.with_sheet(|s| {
            let row = RowKeys(s).find_unique(row_key)?;
            let col = Headers(s).find_unique(column)?;
            Ok(s.display(row, col).to_string())
        })
    }

    /// Address of the cell at (`row_key`, `column`), for writing it back.
    pub fn cell_address(&self, row_key: &str, column: &str) -> Result<GridAddress, StoreError> {
        let row = self.row_by_key(row_key)?;
        let col = self.column(column)?;
        Ok(GridAddress::new(self.sheet, CellRange::cell(row, col)))
    }

    /// Every value below the header in the named column.
    pub fn column_values(&self, name: &str) -> Result<Vec<String>, StoreError> {
        self.with_sheet(|s| {
            let col = Headers(s).find_unique(name)?;
            Ok(s.rows().skip(1).map(|(_, row)| row.display(col).to_string()).collect())
        })
    }

    /// Non-empty row keys, top to bottom.
    pub fn keys(&self) -> Result<Vec<String>, StoreError> {
        self.with_sheet(|s| {
            Ok(RowKeys(s)
                .names()
                .filter(|(_, key)| !key.is_empty())
                .map(|(_, key)| key.to_string())
                .collect())
        })
    }

    /// Non-blank, enabled rows as header-to-value maps. Cells beyond the
    /// header row are keyed `Unnamed(n)` by column index.
    pub fn records(&self) -> Result<Vec<Record>, StoreError> {
        self.with_sheet(|s| {
            let enable = match Headers(s).find_unique(ENABLE_COLUMN) {
                Ok(col) => Some(col),
                Err(LookupError::NotFound { .. }) => None,
                Err(e) => return Err(e.into()),
            };
            Ok(s.rows()
                .skip(1)
                .filter(|(_, row)| !row.is_blank())
                .filter(|(idx, _)| enable.map_or(true, |col| s.affirm(*idx, col)))
                .map(|(idx, _)| record(s, idx))
                .collect())
        })
    }

    /// Non-blank rows keyed by the value in `key_column`. Rows with an
    /// empty key are skipped; a repeated key is an error.
    pub fn records_by_key(&self, key_column: &str) -> Result<BTreeMap<String, Record>, StoreError> {
        self.with_sheet(|s| {
            let key_col = Headers(s).find_unique(key_column)?;
            let mut out = BTreeMap::new();
            for (idx, row) in s.rows().skip(1) {
                let key = row.display(key_col);
                if row.is_blank() || key.is_empty() {
                    continue;
                }
                if out.insert(key.to_string(), record(s, idx)).is_some() {
                    let count = s.rows().skip(1).filter(|(_, r)| r.display(key_col) == key).count();
                    return Err(LookupError::Duplicate { kind: "row", name: key.to_string(), count }.into());
                }
            }
            Ok(out)
        })
    }
}

fn record(sheet: &Sheet, row: usize) -> Record {
    let index = Headers(sheet);
    let headers: Vec<&str> = index.names().map(|(_, n)| n).collect();
    let mut rec = Record::new();
    for (col, header) in headers.iter().enumerate() {
        let key = if header.is_empty() { format!("Unnamed({col})") } else { header.to_string() };
        rec.insert(key, sheet.display(row, col).to_string());
    }
    if let Some(r) = sheet.row(row) {
        for (col, cell) in r.cells().filter(|(col, c)| *col >= headers.len() && !c.is_blank()) {
            rec.insert(format!("Unnamed({col})"), cell.display().to_string());
        }
    }
    rec
}
