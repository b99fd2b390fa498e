//! In-memory copy of the remote grid.
//!
//! Populated wholesale from a [`GridSnapshot`] and afterwards changed only
//! by [`GridMirror::merge`], which applies the values read back after a
//! committed write.

use sheetdb_core::{parse_a1, AddressError, Bound, SheetId};
use sheetdb_protocol::{Color, GridSnapshot, ValueRange};

use crate::cell::Cell;
use crate::error::{LookupError, StoreError};
use crate::named::NameIndexed;
use crate::sheet::Sheet;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridMirror {
    sheets: Vec<Sheet>,
}

impl NameIndexed for GridMirror {
    const KIND: &'static str = "sheet";

    fn names(&self) -> impl Iterator<Item = (usize, &str)> {
        self.sheets.iter().enumerate().map(|(idx, s)| (idx, s.title()))
    }
}

impl GridMirror {
    pub fn from_snapshot(snapshot: &GridSnapshot) -> Self {
        Self { sheets: snapshot.sheets.iter().map(Sheet::from_data).collect() }
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet(&self, id: SheetId) -> Result<&Sheet, LookupError> {
        self.sheets.iter().find(|s| s.id() == id).ok_or_else(|| LookupError::NotFound {
            kind: Self::KIND,
            name: id.to_string(),
        })
    }

    /// The one sheet titled `title`. Duplicate titles are an error.
    pub fn sheet_by_title(&self, title: &str) -> Result<&Sheet, LookupError> {
        let idx = self.find_unique(title)?;
        Ok(&self.sheets[idx])
    }

    /// Apply read-back values. Every cell inside each range is overwritten;
    /// cells the service trimmed from the response become blank. Each
    /// merged cell records `highlight` as its background.
    ///
    /// Every range is resolved before any sheet changes, so an error leaves
    /// the mirror untouched. Returns the number of cells written.
    pub fn merge(&mut self, value_ranges: &[ValueRange], highlight: Color) -> Result<usize, StoreError> {
        let resolved = value_ranges
            .iter()
            .map(|vr| -> Result<_, StoreError> {
                let addr = parse_a1(&vr.range)?;
                let title = addr.sheet.ok_or_else(|| AddressError::InvalidSheetName(vr.range.clone()))?;
                Ok((self.find_unique(&title)?, addr.range, vr))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut merged = 0;
        for (idx, range, vr) in resolved {
            let sheet = &mut self.sheets[idx];
            let stored = sheet.extents();
            let value_rows = vr.values.len();
            let value_cols = vr.values.iter().map(Vec::len).max().unwrap_or(0);
            let end_row = resolve_end(range.end_row, stored.end_row, range.start_row.saturating_add(value_rows));
            let end_col = resolve_end(range.end_col, stored.end_col, range.start_col.saturating_add(value_cols));

            sheet.ensure_capacity(end_row, end_col);
            for row in range.start_row..end_row {
                for col in range.start_col..end_col {
                    let text = vr
                        .values
                        .get(row - range.start_row)
                        .and_then(|r| r.get(col - range.start_col))
                        .map(String::as_str)
                        .unwrap_or("");
                    sheet.set_cell(row, col, Some(Cell::rendered(text, Some(highlight))));
                    merged += 1;
                }
            }
            log::debug!("Merged {} into mirror ({} rows x {} cols read back)", vr.range, value_rows, value_cols);
        }
        Ok(merged)
    }
}

/// Finite end of a merged axis. An open end covers both what is stored and
/// what was returned.
fn resolve_end(requested: Bound, stored: Bound, returned: usize) -> usize {
    match requested {
        Bound::At(end) => end,
        Bound::Unbounded => stored.finite().unwrap_or(0).max(returned),
    }
}
