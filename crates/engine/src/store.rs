use parking_lot::{Mutex, MutexGuard, RwLock};
use sheetdb_core::{format_address, parse_a1, AddressError, CellRange, GridAddress};
use sheetdb_protocol::{Color, ValueRange, HIGHLIGHT};

use crate::backend::GridBackend;
use crate::error::StoreError;
use crate::mirror::GridMirror;
use crate::updater::Updater;

/// A remote grid opened as a store: the backend, its mirror, and the lock
/// that serialises every sync against it.
pub struct GridStore {
    backend: Box<dyn GridBackend>,
    mirror: RwLock<GridMirror>,
    sync_lock: Mutex<()>,
    highlight: Color,
}

impl std::fmt::Debug for GridStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridStore")
            .field("sheets", &self.mirror.read().sheets().len())
            .field("highlight", &self.highlight)
            .finish_non_exhaustive()
    }
}

impl GridStore {
    /// Load the full grid from `backend`.
    pub fn open(backend: impl GridBackend + 'static) -> Result<Self, StoreError> {
        let snapshot = backend.load_grid().map_err(StoreError::backend("load grid"))?;
        let mirror = GridMirror::from_snapshot(&snapshot);
        log::info!("Loaded grid with {} sheets", mirror.sheets().len());
        Ok(Self {
            backend: Box::new(backend),
            mirror: RwLock::new(mirror),
            sync_lock: Mutex::new(()),
            highlight: HIGHLIGHT,
        })
    }

    /// Background given to written cells.
    pub fn with_highlight(mut self, color: Color) -> Self {
        self.highlight = color;
        self
    }

    pub fn highlight(&self) -> Color {
        self.highlight
    }

    /// Replace the mirror with a fresh load. Waits for any sync in flight.
    /// Baselines queued before the reload are checked against the new grid.
    pub fn reload(&self) -> Result<(), StoreError> {
        let _sync = self.lock_sync();
        let snapshot = self.backend.load_grid().map_err(StoreError::backend("reload grid"))?;
        *self.mirror.write() = GridMirror::from_snapshot(&snapshot);
        log::info!("Reloaded grid with {} sheets", snapshot.sheets.len());
        Ok(())
    }

    /// Scoped read access to the mirror.
    pub fn read<R>(&self, f: impl FnOnce(&GridMirror) -> R) -> R {
        f(&self.mirror.read())
    }

    /// Resolve an A1 address. Without a sheet prefix it addresses
    /// `current_sheet`, which must then be given.
    pub fn resolve(&self, text: &str, current_sheet: Option<&str>) -> Result<GridAddress, StoreError> {
        let parsed = parse_a1(text)?;
        let title = parsed
            .sheet
            .as_deref()
            .or(current_sheet)
            .ok_or_else(|| AddressError::InvalidSheetName(text.to_string()))?;
        let sheet = self.read(|m| m.sheet_by_title(title).map(|s| s.id()))?;
        Ok(GridAddress::new(sheet, parsed.range))
    }

    /// A `rows` x `cols` block at zero-based (`row`, `col`) on a named sheet.
    /// A block whose end does not fit in `usize` is `AddressError::OutOfRange`.
    pub fn address(
        &self,
        sheet_title: &str,
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    ) -> Result<GridAddress, StoreError> {
        let sheet = self.read(|m| m.sheet_by_title(sheet_title).map(|s| s.id()))?;
        let range = CellRange::checked_with_size(row, col, rows, cols)
            .ok_or(AddressError::OutOfRange { row, col })?;
        Ok(GridAddress::new(sheet, range))
    }

    /// `Sheet!A1:B2` form of an address.
    pub fn format(&self, address: &GridAddress) -> Result<String, StoreError> {
        self.read(|m| -> Result<String, StoreError> {
            let sheet = m.sheet(address.sheet)?;
            Ok(format_address(Some(sheet.title()), &address.range)?)
        })
    }

    /// A new, empty write queue bound to this store.
    pub fn updater(&self) -> Updater<'_> {
        Updater::new(self)
    }

    pub fn backend(&self) -> &dyn GridBackend {
        self.backend.as_ref()
    }

    pub(crate) fn lock_sync(&self) -> MutexGuard<'_, ()> {
        self.sync_lock.lock()
    }

    pub(crate) fn merge(&self, value_ranges: &[ValueRange]) -> Result<usize, StoreError> {
        let merged = self.mirror.write().merge(value_ranges, self.highlight)?;
        log::debug!("Merged {} cells from {} ranges", merged, value_ranges.len());
        Ok(merged)
    }
}
