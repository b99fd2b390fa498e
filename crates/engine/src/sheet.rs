use sheetdb_core::{format_address, AddressError, CellRange, SheetId};
use sheetdb_protocol::SheetData;

use crate::cell::Cell;

/// One row of a mirrored sheet. Index = column, `None` = blank.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<Option<Cell>>,
}

impl Row {
    pub fn get(&self, col: usize) -> Option<&Cell> {
        self.cells.get(col).and_then(Option::as_ref)
    }

    /// Display string of a cell, `""` when absent.
    pub fn display(&self, col: usize) -> &str {
        self.get(col).map(Cell::display).unwrap_or("")
    }

    /// Stored width, including blank slots.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// True when every cell renders `""`.
    pub fn is_blank(&self) -> bool {
        self.cells.iter().flatten().all(Cell::is_blank)
    }

    /// Present cells with their column index.
    pub fn cells(&self) -> impl Iterator<Item = (usize, &Cell)> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(col, cell)| cell.as_ref().map(|c| (col, c)))
    }
}

/// A mirrored sheet. Rows and cells are only mutated through a merge.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    id: SheetId,
    title: String,
    rows: Vec<Row>,
}

impl Sheet {
    pub fn new(id: SheetId, title: impl Into<String>) -> Self {
        Self { id, title: title.into(), rows: Vec::new() }
    }

    pub(crate) fn from_data(data: &SheetData) -> Self {
        let rows = data
            .rows
            .iter()
            .map(|row| Row {
                cells: row.iter().map(|c| c.as_ref().map(Cell::from_data)).collect(),
            })
            .collect();
        Self { id: SheetId::from_raw(data.id), title: data.title.clone(), rows }
    }

    pub fn id(&self) -> SheetId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Bounding range of every stored slot, `[0, rows) x [0, cols)`.
    /// Rows without cells still count; a sheet without rows yields a
    /// zero-sized range.
    pub fn extents(&self) -> CellRange {
        let rows = self.rows.len();
        if rows == 0 {
            return CellRange::empty();
        }
        let cols = self.rows.iter().map(Row::len).max().unwrap_or(0);
        CellRange::with_size(0, 0, rows, cols)
    }

    pub fn row(&self, row: usize) -> Option<&Row> {
        self.rows.get(row)
    }

    /// Stored rows with their index.
    pub fn rows(&self) -> impl Iterator<Item = (usize, &Row)> {
        self.rows.iter().enumerate()
    }

    /// Present cells as `(row, col, cell)`, row-major.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, &Cell)> {
        self.rows()
            .flat_map(|(r, row)| row.cells().map(move |(c, cell)| (r, c, cell)))
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    pub fn display(&self, row: usize, col: usize) -> &str {
        self.cell(row, col).map(Cell::display).unwrap_or("")
    }

    pub fn affirm(&self, row: usize, col: usize) -> bool {
        self.cell(row, col).is_some_and(Cell::affirm)
    }

    pub fn is_row_blank(&self, row: usize) -> bool {
        self.rows.get(row).map_or(true, Row::is_blank)
    }

    pub fn last_nonblank_row(&self) -> Option<usize> {
        self.rows.iter().rposition(|r| !r.is_blank())
    }

    /// Dense grid of display strings covering `range`. Absent cells are `""`.
    pub fn snapshot(&self, range: &CellRange) -> Result<Vec<Vec<String>>, AddressError> {
        let (Some(end_row), Some(end_col)) = (range.end_row.finite(), range.end_col.finite()) else {
            let text = format_address(Some(&self.title), range).unwrap_or_else(|_| self.title.clone());
            return Err(AddressError::Unbounded(text));
        };
        Ok((range.start_row..end_row)
            .map(|r| (range.start_col..end_col).map(|c| self.display(r, c).to_string()).collect())
            .collect())
    }

    /// True when every cell of `range` still renders as in `snapshot`.
    /// A snapshot of a different shape never matches.
    pub fn matches(&self, range: &CellRange, snapshot: &[Vec<String>]) -> bool {
        match self.snapshot(range) {
            Ok(current) => current.as_slice() == snapshot,
            Err(_) => false,
        }
    }

    /// Grow storage so that `rows` x `cols` slots exist.
    pub(crate) fn ensure_capacity(&mut self, rows: usize, cols: usize) {
        if self.rows.len() < rows {
            self.rows.resize_with(rows, Row::default);
        }
        for row in &mut self.rows {
            if row.cells.len() < cols {
                row.cells.resize(cols, None);
            }
        }
    }

    /// Store `cell` at (`row`, `col`), growing only the rows and the one
    /// row that need it.
    pub(crate) fn set_cell(&mut self, row: usize, col: usize, cell: Option<Cell>) {
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Row::default);
        }
        let cells = &mut self.rows[row].cells;
        if cells.len() <= col {
            cells.resize(col + 1, None);
        }
        cells[col] = cell;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetdb_core::Bound;

    fn sheet_with(cells: &[(usize, usize, &str)]) -> Sheet {
        let mut sheet = Sheet::new(SheetId::from_raw(1), "Data");
        for &(r, c, v) in cells {
            sheet.set_cell(r, c, Some(Cell::from_input(v)));
        }
        sheet
    }

    #[test]
    fn test_extents() {
        assert!(Sheet::new(SheetId::from_raw(0), "Empty").extents().is_empty());

        let sheet = sheet_with(&[(0, 0, "a"), (4, 2, "b")]);
        assert_eq!(sheet.extents(), CellRange::with_size(0, 0, 5, 3));
    }

    #[test]
    fn test_extents_keep_rows_without_cells() {
        let data = SheetData { id: 2, title: "Tall".into(), rows: vec![vec![]; 5] };
        let sheet = Sheet::from_data(&data);
        assert_eq!(sheet.extents(), CellRange::with_size(0, 0, 5, 0));
        assert_eq!(sheet.extents().growth_needed(&CellRange::cell(0, 0)), (0, 1));
    }

    #[test]
    fn test_set_cell_grows_only_its_row() {
        let mut sheet = sheet_with(&[(0, 0, "a"), (1, 0, "b")]);
        sheet.set_cell(1, 3, Some(Cell::from_input("c")));
        assert_eq!(sheet.row(0).unwrap().len(), 1);
        assert_eq!(sheet.row(1).unwrap().len(), 4);
        assert_eq!(sheet.extents(), CellRange::with_size(0, 0, 2, 4));
    }

    #[test]
    fn test_snapshot_pads_absent_cells() {
        let sheet = sheet_with(&[(0, 0, "a"), (1, 1, "10")]);
        let snap = sheet.snapshot(&CellRange::with_size(0, 0, 3, 3)).unwrap();
        assert_eq!(snap, vec![
            vec!["a".to_string(), String::new(), String::new()],
            vec![String::new(), "10".to_string(), String::new()],
            vec![String::new(), String::new(), String::new()],
        ]);
    }

    #[test]
    fn test_snapshot_rejects_unbounded() {
        let sheet = sheet_with(&[(0, 0, "a")]);
        let whole_col = CellRange::new(0, Bound::Unbounded, 0, Bound::At(1));
        assert!(matches!(sheet.snapshot(&whole_col), Err(AddressError::Unbounded(_))));
    }

    #[test]
    fn test_matches() {
        let sheet = sheet_with(&[(2, 2, "x")]);
        let range = CellRange::cell(2, 2);
        assert!(sheet.matches(&range, &[vec!["x".to_string()]]));
        assert!(!sheet.matches(&range, &[vec!["y".to_string()]]));
        // shape mismatch
        assert!(!sheet.matches(&range, &[vec!["x".to_string(), String::new()]]));
    }

    #[test]
    fn test_blank_rows() {
        let mut sheet = sheet_with(&[(0, 0, "h"), (3, 1, "v")]);
        assert!(sheet.is_row_blank(1));
        assert!(sheet.is_row_blank(100));
        assert!(!sheet.is_row_blank(3));
        assert_eq!(sheet.last_nonblank_row(), Some(3));

        sheet.set_cell(3, 1, Some(Cell::from_input("")));
        assert!(sheet.is_row_blank(3));
        assert_eq!(sheet.last_nonblank_row(), Some(0));
    }

    #[test]
    fn test_cells_iter_is_row_major() {
        let sheet = sheet_with(&[(1, 0, "c"), (0, 1, "b"), (0, 0, "a")]);
        let seen: Vec<_> = sheet.cells().map(|(r, c, cell)| (r, c, cell.display().to_string())).collect();
        assert_eq!(seen, vec![
            (0, 0, "a".to_string()),
            (0, 1, "b".to_string()),
            (1, 0, "c".to_string()),
        ]);
    }
}
