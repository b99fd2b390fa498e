//! Grid service wire format.
//!
//! The backend grid service is an opaque RPC with three calls:
//!
//! - `LoadGrid()          -> GridSnapshot`
//! - `BatchWrite(ops)     -> BatchWriteResponse`
//! - `BatchRead(ranges)   -> BatchReadResponse`
//!
//! All payloads are JSON. Ranges on the wire are zero-based and end
//! exclusive; a missing end means "to the edge of the sheet".
//!
//! # Usage
//!
//! ```ignore
//! use sheetdb_protocol::{BatchWriteRequest, GridOp, Dimension};
//!
//! let req = BatchWriteRequest {
//!     ops: vec![GridOp::AppendDimension { sheet_id: 7, dimension: Dimension::Rows, length: 3 }],
//! };
//! let json = serde_json::to_string(&req)?;
//! ```

use serde::{Deserialize, Serialize};
use sheetdb_core::{Bound, CellRange, GridAddress, SheetId};

/// Current protocol version. Increment for breaking changes.
pub const PROTOCOL_VERSION: u32 = 1;

// =============================================================================
// Colors
// =============================================================================

/// RGB color, components in 0.0..=1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

impl Color {
    pub const fn from_rgb(red: f32, green: f32, blue: f32) -> Self {
        Self { red, green, blue }
    }

    /// Convert from hex u32 (0xRRGGBB)
    pub fn from_hex(hex: u32) -> Self {
        let red = ((hex >> 16) & 0xFF) as f32 / 255.0;
        let green = ((hex >> 8) & 0xFF) as f32 / 255.0;
        let blue = (hex & 0xFF) as f32 / 255.0;
        Self { red, green, blue }
    }
}

/// Background given to every written cell, a "recently written" marker.
pub const HIGHLIGHT: Color = Color::from_rgb(1.0, 1.0, 0.4);

// =============================================================================
// Ranges and cells
// =============================================================================

/// A rectangle on one sheet, as the service sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridRange {
    pub sheet_id: i64,
    pub start_row: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_row: Option<usize>,
    pub start_col: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_col: Option<usize>,
}

impl From<&GridAddress> for GridRange {
    fn from(addr: &GridAddress) -> Self {
        Self {
            sheet_id: addr.sheet.raw(),
            start_row: addr.range.start_row,
            end_row: addr.range.end_row.finite(),
            start_col: addr.range.start_col,
            end_col: addr.range.end_col.finite(),
        }
    }
}

impl From<&GridRange> for GridAddress {
    fn from(range: &GridRange) -> Self {
        let to_bound = |end: Option<usize>| end.map(Bound::At).unwrap_or(Bound::Unbounded);
        GridAddress::new(
            SheetId::from_raw(range.sheet_id),
            CellRange::new(range.start_row, to_bound(range.end_row), range.start_col, to_bound(range.end_col)),
        )
    }
}

/// Which axis an append grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Rows,
    Columns,
}

/// A typed cell value as entered by the user.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtendedValue {
    #[default]
    Blank,
    Number(f64),
    Text(String),
}

/// One cell as sent to or received from the service.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CellData {
    #[serde(default)]
    pub value: ExtendedValue,
    /// Rendered display string, as the service formats it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<Color>,
}

// =============================================================================
// BatchWrite
// =============================================================================

/// A single mutation in a write batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum GridOp {
    /// Grow a sheet by `length` rows or columns at its end.
    AppendDimension {
        sheet_id: i64,
        dimension: Dimension,
        length: usize,
    },
    /// Overwrite the cells of `range` with `rows`, marking each written cell.
    UpdateCells {
        range: GridRange,
        rows: Vec<Vec<CellData>>,
        highlight: Color,
    },
}

impl GridOp {
    pub fn sheet_id(&self) -> i64 {
        match self {
            GridOp::AppendDimension { sheet_id, .. } => *sheet_id,
            GridOp::UpdateCells { range, .. } => range.sheet_id,
        }
    }
}

/// Request body for `BatchWrite`. Applied in order, as one batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchWriteRequest {
    pub ops: Vec<GridOp>,
}

/// Response to `BatchWrite`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchWriteResponse {
    pub applied: usize,
}

// =============================================================================
// BatchRead
// =============================================================================

/// How read-back values are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueRender {
    #[default]
    Formatted,
    Unformatted,
}

/// Request body for `BatchRead`. Ranges are A1 text with sheet prefix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReadRequest {
    pub ranges: Vec<String>,
    #[serde(default)]
    pub render: ValueRender,
}

/// Values of one requested range. Trailing empty rows and cells may be
/// trimmed by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub range: String,
    #[serde(default)]
    pub values: Vec<Vec<String>>,
}

/// Response to `BatchRead`, one entry per requested range, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReadResponse {
    pub value_ranges: Vec<ValueRange>,
}

// =============================================================================
// LoadGrid
// =============================================================================

/// Full contents of one sheet. `None` cells are blank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetData {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub rows: Vec<Vec<Option<CellData>>>,
}

/// Response to `LoadGrid`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub sheets: Vec<SheetData>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_op_wire_shape() {
        let op = GridOp::AppendDimension { sheet_id: 3, dimension: Dimension::Columns, length: 2 };
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["op"], "append_dimension");
        assert_eq!(json["dimension"], "columns");
        assert_eq!(json["length"], 2);
    }

    #[test]
    fn test_update_cells_wire_shape() {
        let op = GridOp::UpdateCells {
            range: GridRange { sheet_id: 1, start_row: 4, end_row: Some(6), start_col: 10, end_col: Some(12) },
            rows: vec![vec![
                CellData { value: ExtendedValue::Number(1.5), formatted: Some("1.5".into()), background: Some(HIGHLIGHT) },
                CellData { value: ExtendedValue::Blank, formatted: None, background: Some(HIGHLIGHT) },
            ]],
            highlight: HIGHLIGHT,
        };
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["op"], "update_cells");
        assert_eq!(json["range"]["end_col"], 12);
        assert_eq!(json["rows"][0][0]["value"]["number"], 1.5);
        assert_eq!(json["rows"][0][1]["value"], "blank");
        assert!(json["rows"][0][1].get("formatted").is_none());

        let back: GridOp = serde_json::from_value(json).unwrap();
        assert_eq!(back, op);
    }

    #[test]
    fn test_unbounded_range_omits_end() {
        let range = GridRange { sheet_id: 0, start_row: 0, end_row: None, start_col: 1, end_col: Some(2) };
        let json = serde_json::to_value(range).unwrap();
        assert!(json.get("end_row").is_none());

        let addr = GridAddress::from(&range);
        assert_eq!(addr.row_end(), Bound::Unbounded);
        assert_eq!(GridRange::from(&addr), range);
    }

    #[test]
    fn test_snapshot_parses_sparse_rows() {
        let json = r#"{
            "sheets": [
                {"id": 0, "title": "Config", "rows": [
                    [{"value": {"text": "name"}, "formatted": "name"}, null],
                    []
                ]},
                {"id": 9, "title": "Empty"}
            ]
        }"#;
        let snap: GridSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snap.sheets.len(), 2);
        assert_eq!(snap.sheets[0].rows[0].len(), 2);
        assert!(snap.sheets[0].rows[0][1].is_none());
        assert!(snap.sheets[1].rows.is_empty());
    }

    #[test]
    fn test_read_request_default_render() {
        let req: BatchReadRequest = serde_json::from_str(r#"{"ranges": ["Config!A1:B2"]}"#).unwrap();
        assert_eq!(req.render, ValueRender::Formatted);
    }

    #[test]
    fn test_color_from_hex() {
        let c = Color::from_hex(0xFFFF66);
        assert_eq!(c.red, 1.0);
        assert_eq!(c.green, 1.0);
        assert!((c.blue - 0.4).abs() < 1e-6);
    }
}
