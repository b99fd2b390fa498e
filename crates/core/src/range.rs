//! Numeric rectangles and the algebra over them.
//!
//! All coordinates are zero-based. Ends are exclusive. An end may be
//! [`Bound::Unbounded`], meaning the range runs to the edge of the sheet
//! on that axis (whole-row / whole-column references).

use serde::{Deserialize, Serialize};

/// Backend-assigned sheet identifier. Stable for the life of the sheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SheetId(i64);

impl SheetId {
    #[inline]
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for SheetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Exclusive end of a range axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bound {
    At(usize),
    Unbounded,
}

impl Bound {
    /// The finite value, if any.
    #[inline]
    pub fn finite(self) -> Option<usize> {
        match self {
            Bound::At(n) => Some(n),
            Bound::Unbounded => None,
        }
    }

    #[inline]
    pub fn is_unbounded(self) -> bool {
        matches!(self, Bound::Unbounded)
    }

    /// Larger of two ends; `Unbounded` dominates.
    pub fn max(self, other: Bound) -> Bound {
        match (self, other) {
            (Bound::At(a), Bound::At(b)) => Bound::At(a.max(b)),
            _ => Bound::Unbounded,
        }
    }

    /// True when `index` lies before this end.
    #[inline]
    pub fn covers(self, index: usize) -> bool {
        match self {
            Bound::At(n) => index < n,
            Bound::Unbounded => true,
        }
    }
}

impl From<usize> for Bound {
    fn from(n: usize) -> Self {
        Bound::At(n)
    }
}

/// A sheet-less rectangle: rows `start_row..end_row`, columns `start_col..end_col`.
///
/// Constructors keep `start <= end` on every finite axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRange {
    pub start_row: usize,
    pub end_row: Bound,
    pub start_col: usize,
    pub end_col: Bound,
}

impl CellRange {
    /// Build a range from explicit bounds, swapping reversed finite axes.
    pub fn new(start_row: usize, end_row: Bound, start_col: usize, end_col: Bound) -> Self {
        let (start_row, end_row) = order_axis(start_row, end_row);
        let (start_col, end_col) = order_axis(start_col, end_col);
        Self { start_row, end_row, start_col, end_col }
    }

    /// `rows` x `cols` block anchored at (`row`, `col`). Ends saturate at
    /// `usize::MAX`; use [`CellRange::checked_with_size`] for caller input.
    pub fn with_size(row: usize, col: usize, rows: usize, cols: usize) -> Self {
        Self {
            start_row: row,
            end_row: Bound::At(row.saturating_add(rows)),
            start_col: col,
            end_col: Bound::At(col.saturating_add(cols)),
        }
    }

    /// Like [`CellRange::with_size`], `None` when an end overflows.
    pub fn checked_with_size(row: usize, col: usize, rows: usize, cols: usize) -> Option<Self> {
        Some(Self {
            start_row: row,
            end_row: Bound::At(row.checked_add(rows)?),
            start_col: col,
            end_col: Bound::At(col.checked_add(cols)?),
        })
    }

    /// The same rectangle with reversed finite axes swapped. Ranges built
    /// field by field skip the check in [`CellRange::new`].
    pub fn normalized(self) -> Self {
        Self::new(self.start_row, self.end_row, self.start_col, self.end_col)
    }

    /// The single cell at (`row`, `col`).
    pub fn cell(row: usize, col: usize) -> Self {
        Self::with_size(row, col, 1, 1)
    }

    /// Zero-sized range at the origin (extent of an empty sheet).
    pub fn empty() -> Self {
        Self::with_size(0, 0, 0, 0)
    }

    pub fn is_finite(&self) -> bool {
        !self.end_row.is_unbounded() && !self.end_col.is_unbounded()
    }

    /// True when a finite axis has zero length.
    pub fn is_empty(&self) -> bool {
        self.height() == Some(0) || self.width() == Some(0)
    }

    /// Number of rows, `None` when unbounded.
    pub fn height(&self) -> Option<usize> {
        self.end_row.finite().map(|end| end.saturating_sub(self.start_row))
    }

    /// Number of columns, `None` when unbounded.
    pub fn width(&self) -> Option<usize> {
        self.end_col.finite().map(|end| end.saturating_sub(self.start_col))
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        row >= self.start_row
            && self.end_row.covers(row)
            && col >= self.start_col
            && self.end_col.covers(col)
    }

    /// True when `other` lies entirely inside `self`.
    pub fn encloses(&self, other: &CellRange) -> bool {
        other.start_row >= self.start_row
            && other.start_col >= self.start_col
            && end_within(other.end_row, self.end_row)
            && end_within(other.end_col, self.end_col)
    }

    /// Smallest range containing both.
    pub fn union(&self, other: &CellRange) -> CellRange {
        CellRange {
            start_row: self.start_row.min(other.start_row),
            end_row: self.end_row.max(other.end_row),
            start_col: self.start_col.min(other.start_col),
            end_col: self.end_col.max(other.end_col),
        }
    }

    /// Rows and columns that must be appended to `self` so that
    /// `requested` fits. Never negative; an unbounded requested end asks
    /// for nothing on that axis.
    pub fn growth_needed(&self, requested: &CellRange) -> (usize, usize) {
        (
            axis_growth(self.end_row, requested.end_row),
            axis_growth(self.end_col, requested.end_col),
        )
    }
}

/// A range on a specific sheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridAddress {
    pub sheet: SheetId,
    pub range: CellRange,
}

impl GridAddress {
    pub fn new(sheet: SheetId, range: CellRange) -> Self {
        Self { sheet, range }
    }

    pub fn row_start(&self) -> usize {
        self.range.start_row
    }

    pub fn row_end(&self) -> Bound {
        self.range.end_row
    }

    pub fn col_start(&self) -> usize {
        self.range.start_col
    }

    pub fn col_end(&self) -> Bound {
        self.range.end_col
    }
}

fn order_axis(start: usize, end: Bound) -> (usize, Bound) {
    match end {
        Bound::At(end) if end < start => (end, Bound::At(start)),
        _ => (start, end),
    }
}

fn end_within(inner: Bound, outer: Bound) -> bool {
    match (inner, outer) {
        (_, Bound::Unbounded) => true,
        (Bound::Unbounded, Bound::At(_)) => false,
        (Bound::At(a), Bound::At(b)) => a <= b,
    }
}

fn axis_growth(current: Bound, requested: Bound) -> usize {
    match (current, requested) {
        (Bound::At(have), Bound::At(want)) => want.saturating_sub(have),
        _ => 0,
    }
}
