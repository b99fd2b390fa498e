//! Turns queued update intents into an ordered list of grid operations.

use rustc_hash::FxHashMap;
use sheetdb_core::{CellRange, SheetId};
use sheetdb_protocol::{Color, Dimension, GridOp, GridRange};

use crate::cell::write_payload;
use crate::error::StoreError;
use crate::mirror::GridMirror;
use crate::updater::UpdateIntent;

/// Plans growth and cell writes for a batch of intents.
///
/// Tracks each sheet's planned extents so that growth emitted for one
/// intent is credited to later intents on the same sheet.
pub struct BatchPlanner<'m> {
    mirror: &'m GridMirror,
    highlight: Color,
    extents: FxHashMap<SheetId, CellRange>,
}

impl<'m> BatchPlanner<'m> {
    pub fn new(mirror: &'m GridMirror, highlight: Color) -> Self {
        Self { mirror, highlight, extents: FxHashMap::default() }
    }

    /// Ops for one intent: rows growth, column growth, then the write.
    pub fn push(&mut self, intent: &UpdateIntent, ops: &mut Vec<GridOp>) -> Result<(), StoreError> {
        let target = intent.target();
        let current = match self.extents.get(&target.sheet) {
            Some(range) => *range,
            None => self.mirror.sheet(target.sheet)?.extents(),
        };

        let (rows, cols) = current.growth_needed(&target.range);
        let sheet_id = target.sheet.raw();
        if rows > 0 {
            ops.push(GridOp::AppendDimension { sheet_id, dimension: Dimension::Rows, length: rows });
        }
        if cols > 0 {
            ops.push(GridOp::AppendDimension { sheet_id, dimension: Dimension::Columns, length: cols });
        }
        let grown = CellRange::with_size(
            0,
            0,
            current.height().unwrap_or(0) + rows,
            current.width().unwrap_or(0) + cols,
        );
        self.extents.insert(target.sheet, grown);

        ops.push(GridOp::UpdateCells {
            range: GridRange::from(target),
            rows: self.payload(intent),
            highlight: self.highlight,
        });
        Ok(())
    }

    /// Dense payload covering the whole target; cells without a value are
    /// written blank.
    fn payload(&self, intent: &UpdateIntent) -> Vec<Vec<sheetdb_protocol::CellData>> {
        let range = &intent.target().range;
        let height = range.height().unwrap_or(0);
        let width = range.width().unwrap_or(0);
        (0..height)
            .map(|r| {
                (0..width)
                    .map(|c| {
                        let text = intent
                            .values()
                            .get(r)
                            .and_then(|row| row.get(c))
                            .map(String::as_str)
                            .unwrap_or("");
                        write_payload(text, self.highlight)
                    })
                    .collect()
            })
            .collect()
    }
}

/// Plan every intent in queue order.
pub fn plan(intents: &[UpdateIntent], mirror: &GridMirror, highlight: Color) -> Result<Vec<GridOp>, StoreError> {
    let mut planner = BatchPlanner::new(mirror, highlight);
    let mut ops = Vec::with_capacity(intents.len());
    for intent in intents {
        planner.push(intent, &mut ops)?;
    }
    log::debug!("Planned {} ops for {} intents", ops.len(), intents.len());
    Ok(ops)
}
