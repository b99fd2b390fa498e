//! Append-only sheets: lists, event logs and audit trails.

use chrono::{SecondsFormat, Utc};
use parking_lot::Mutex;
use sheetdb_core::{AddressError, CellRange, GridAddress, SheetId};

use crate::error::StoreError;
use crate::sheet::Sheet;
use crate::store::GridStore;
use crate::updater::Updater;

/// A sheet written to by appending rows after its last non-blank row.
#[derive(Debug)]
pub struct AppendList<'s> {
    store: &'s GridStore,
    sheet: SheetId,
    /// First line not yet handed out by this list.
    next_line: Mutex<usize>,
}

impl<'s> AppendList<'s> {
    pub fn open(store: &'s GridStore, title: &str) -> Result<Self, StoreError> {
        let sheet = store.read(|m| m.sheet_by_title(title).map(Sheet::id))?;
        Ok(Self { store, sheet, next_line: Mutex::new(0) })
    }

    pub fn store(&self) -> &'s GridStore {
        self.store
    }

    /// Row index for the next append, reserved for the caller.
    ///
    /// The first row after the last non-blank row, but never a row already
    /// handed out by this list, so appends queued before a sync do not
    /// overlap.
    pub fn append_line(&self) -> Result<usize, StoreError> {
        let mut next = self.next_line.lock();
        let line = self.free_line(*next)?;
        *next = line + 1;
        Ok(line)
    }

    /// Queue `rows` on `updater` at the next append line. The updater must
    /// belong to the same store. Returns the target address.
    ///
    /// The line is only reserved once the update is queued, so a rejected
    /// append leaves no gap.
    pub fn append(&self, updater: &Updater<'_>, rows: Vec<Vec<String>>) -> Result<GridAddress, StoreError> {
        let height = rows.len();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        if height == 0 || width == 0 {
            return Err(AddressError::EmptyRange.into());
        }

        let mut next = self.next_line.lock();
        let line = self.free_line(*next)?;
        let range = CellRange::checked_with_size(line, 0, height, width)
            .ok_or(AddressError::OutOfRange { row: line, col: 0 })?;
        let target = GridAddress::new(self.sheet, range);
        updater.update(target, rows)?;
        *next = line + 1;
        Ok(target)
    }

    fn free_line(&self, next: usize) -> Result<usize, StoreError> {
        let after_content = self.store.read(|m| -> Result<usize, StoreError> {
            Ok(m.sheet(self.sheet)?.last_nonblank_row().map_or(0, |r| r + 1))
        })?;
        Ok(after_content.max(next))
    }
}

/// A timestamped log sheet: `[timestamp, level, fields...]` per row.
#[derive(Debug)]
pub struct EventLog<'s> {
    list: AppendList<'s>,
}

impl<'s> EventLog<'s> {
    pub fn open(store: &'s GridStore, title: &str) -> Result<Self, StoreError> {
        Ok(Self { list: AppendList::open(store, title)? })
    }

    pub fn log(&self, fields: &[&str]) -> Result<GridAddress, StoreError> {
        self.write("INFO", fields)
    }

    pub fn log_error(&self, fields: &[&str]) -> Result<GridAddress, StoreError> {
        self.write("ERROR", fields)
    }

    pub fn log_data(&self, fields: &[&str]) -> Result<GridAddress, StoreError> {
        self.write("DATA", fields)
    }

    /// Queue an untimestamped entry on `updater` without syncing it.
    pub fn audit(&self, updater: &Updater<'_>, fields: &[&str]) -> Result<GridAddress, StoreError> {
        let row = fields.iter().map(|f| f.to_string()).collect();
        self.list.append(updater, vec![row])
    }

    /// Append one line and sync it on a private updater.
    fn write(&self, level: &str, fields: &[&str]) -> Result<GridAddress, StoreError> {
        let mut row = vec![Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true), level.to_string()];
        row.extend(fields.iter().map(|f| f.to_string()));

        let updater = self.list.store().updater();
        let target = self.list.append(&updater, vec![row])?;
        updater.sync()?;
        Ok(target)
    }
}
