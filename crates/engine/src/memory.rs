//! In-process grid service.
//!
//! Holds the authoritative grid behind a lock so that a store, a test and
//! any number of simulated clients can share it. Reads are answered the way
//! the remote service answers them: formatted strings with trailing empty
//! rows and cells trimmed.

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use sheetdb_core::{parse_a1, Bound};
use sheetdb_protocol::{
    BatchReadRequest, BatchReadResponse, BatchWriteRequest, BatchWriteResponse, CellData, Dimension,
    ExtendedValue, GridOp, GridRange, GridSnapshot, SheetData, ValueRange, ValueRender,
};

use crate::backend::{BackendError, GridBackend};
use crate::cell::{write_payload, Cell};

/// Which call an injected fault applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Call {
    Load,
    Write,
    Read,
}

#[derive(Debug, Clone)]
struct MemorySheet {
    id: i64,
    title: String,
    row_count: usize,
    col_count: usize,
    cells: FxHashMap<(usize, usize), CellData>,
}

impl MemorySheet {
    fn formatted(&self, row: usize, col: usize) -> String {
        self.render(row, col, ValueRender::Formatted)
    }

    fn render(&self, row: usize, col: usize, render: ValueRender) -> String {
        let Some(data) = self.cells.get(&(row, col)) else {
            return String::new();
        };
        let cell = Cell::from_data(data);
        match render {
            ValueRender::Formatted => cell.display().to_string(),
            ValueRender::Unformatted => cell.value().raw_display(),
        }
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    sheets: Vec<MemorySheet>,
    faults: FxHashMap<Call, BackendError>,
    calls: FxHashMap<Call, usize>,
}

impl MemoryState {
    fn sheet_mut(&mut self, id: i64) -> Result<&mut MemorySheet, BackendError> {
        self.sheets
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| BackendError::Rejected(format!("no sheet with id {id}")))
    }

    fn sheet_by_title(&self, title: &str) -> Option<&MemorySheet> {
        self.sheets.iter().find(|s| s.title == title)
    }

    /// Count the call and fire its one-shot fault, if any.
    fn enter(&mut self, call: Call) -> Result<(), BackendError> {
        *self.calls.entry(call).or_default() += 1;
        match self.faults.remove(&call) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Shared handle to an in-memory grid. Clones see the same grid.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a `rows` x `cols` sheet, all blank.
    pub fn with_sheet(self, id: i64, title: &str, rows: usize, cols: usize) -> Self {
        self.state.lock().sheets.push(MemorySheet {
            id,
            title: title.to_string(),
            row_count: rows,
            col_count: cols,
            cells: FxHashMap::default(),
        });
        self
    }

    /// Edit a cell directly, as another client would. Grows the sheet
    /// when needed. Returns false when there is no such sheet.
    pub fn set_cell(&self, title: &str, row: usize, col: usize, input: &str) -> bool {
        let mut data = write_payload(input, sheetdb_protocol::HIGHLIGHT);
        data.background = None;
        self.set_cell_data(title, row, col, data)
    }

    /// Store `data` verbatim, e.g. a value with service-side formatting
    /// such as `7` shown as `7.00`.
    pub fn set_cell_data(&self, title: &str, row: usize, col: usize, data: CellData) -> bool {
        let mut state = self.state.lock();
        let Some(sheet) = state.sheets.iter_mut().find(|s| s.title == title) else {
            return false;
        };
        sheet.row_count = sheet.row_count.max(row.saturating_add(1));
        sheet.col_count = sheet.col_count.max(col.saturating_add(1));
        sheet.cells.insert((row, col), data);
        true
    }

    /// Formatted value of a cell, `None` when the sheet does not exist.
    pub fn cell_text(&self, title: &str, row: usize, col: usize) -> Option<String> {
        let state = self.state.lock();
        state.sheet_by_title(title).map(|s| s.formatted(row, col))
    }

    pub fn cell_data(&self, title: &str, row: usize, col: usize) -> Option<CellData> {
        let state = self.state.lock();
        state.sheet_by_title(title).and_then(|s| s.cells.get(&(row, col)).cloned())
    }

    /// Grid size of a sheet as `(rows, cols)`.
    pub fn dimensions(&self, title: &str) -> Option<(usize, usize)> {
        let state = self.state.lock();
        state.sheet_by_title(title).map(|s| (s.row_count, s.col_count))
    }

    /// Make the next `call` fail with `error`.
    pub fn fail_next(&self, call: Call, error: BackendError) {
        self.state.lock().faults.insert(call, error);
    }

    /// Number of times `call` has been made, faults included.
    pub fn calls(&self, call: Call) -> usize {
        self.state.lock().calls.get(&call).copied().unwrap_or(0)
    }
}

impl GridBackend for MemoryBackend {
    fn load_grid(&self) -> Result<GridSnapshot, BackendError> {
        let mut state = self.state.lock();
        state.enter(Call::Load)?;
        let sheets = state
            .sheets
            .iter()
            .map(|s| SheetData {
                id: s.id,
                title: s.title.clone(),
                rows: (0..s.row_count)
                    .map(|r| (0..s.col_count).map(|c| s.cells.get(&(r, c)).cloned()).collect())
                    .collect(),
            })
            .collect();
        Ok(GridSnapshot { sheets })
    }

    /// Applies the whole batch or nothing.
    fn batch_write(&self, request: &BatchWriteRequest) -> Result<BatchWriteResponse, BackendError> {
        let mut state = self.state.lock();
        state.enter(Call::Write)?;

        let mut staged = MemoryState { sheets: state.sheets.clone(), ..MemoryState::default() };
        for op in &request.ops {
            apply(&mut staged, op)?;
        }
        state.sheets = staged.sheets;
        Ok(BatchWriteResponse { applied: request.ops.len() })
    }

    fn batch_read(&self, request: &BatchReadRequest) -> Result<BatchReadResponse, BackendError> {
        let mut state = self.state.lock();
        state.enter(Call::Read)?;

        let mut value_ranges = Vec::with_capacity(request.ranges.len());
        for text in &request.ranges {
            let addr = parse_a1(text).map_err(|e| BackendError::Rejected(e.to_string()))?;
            let title = addr.sheet.as_deref().unwrap_or_default();
            let sheet = state
                .sheet_by_title(title)
                .ok_or_else(|| BackendError::Rejected(format!("no sheet titled '{title}'")))?;

            let range = addr.range;
            let end_row = clip(range.end_row, sheet.row_count);
            let end_col = clip(range.end_col, sheet.col_count);
            let mut values: Vec<Vec<String>> = (range.start_row..end_row)
                .map(|r| {
                    let mut row: Vec<String> =
                        (range.start_col..end_col).map(|c| sheet.render(r, c, request.render)).collect();
                    while row.last().is_some_and(String::is_empty) {
                        row.pop();
                    }
                    row
                })
                .collect();
            while values.last().is_some_and(Vec::is_empty) {
                values.pop();
            }
            value_ranges.push(ValueRange { range: text.clone(), values });
        }
        Ok(BatchReadResponse { value_ranges })
    }
}

fn clip(end: Bound, size: usize) -> usize {
    match end {
        Bound::At(n) => n.min(size),
        Bound::Unbounded => size,
    }
}

fn apply(state: &mut MemoryState, op: &GridOp) -> Result<(), BackendError> {
    let sheet = state.sheet_mut(op.sheet_id())?;
    match op {
        GridOp::AppendDimension { dimension, length, .. } => {
            match dimension {
                Dimension::Rows => sheet.row_count += length,
                Dimension::Columns => sheet.col_count += length,
            }
        }
        GridOp::UpdateCells { range, rows, highlight } => {
            let (end_row, end_col) = write_extent(range, rows);
            if end_row > sheet.row_count || end_col > sheet.col_count {
                return Err(BackendError::Rejected(format!(
                    "range exceeds grid limits of sheet {} ({}x{})",
                    sheet.id, sheet.row_count, sheet.col_count
                )));
            }
            for row in range.start_row..end_row {
                for col in range.start_col..end_col {
                    let mut data = rows
                        .get(row - range.start_row)
                        .and_then(|r| r.get(col - range.start_col))
                        .cloned()
                        .unwrap_or_default();
                    data.background = Some(*highlight);
                    if data.value == ExtendedValue::Blank && data.formatted.is_none() {
                        sheet.cells.remove(&(row, col));
                    } else {
                        sheet.cells.insert((row, col), data);
                    }
                }
            }
        }
    }
    Ok(())
}

/// Exclusive ends covered by an update. Open ends take the payload's size.
fn write_extent(range: &GridRange, rows: &[Vec<CellData>]) -> (usize, usize) {
    let end_row = range.end_row.unwrap_or(range.start_row + rows.len());
    let end_col = range
        .end_col
        .unwrap_or(range.start_col + rows.iter().map(Vec::len).max().unwrap_or(0));
    (end_row, end_col)
}
