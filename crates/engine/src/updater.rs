//! Optimistic-concurrency write queue.
//!
//! `update` snapshots the target as the mirror currently renders it and
//! queues the write. `sync` re-checks every snapshot under the store's sync
//! lock, and only when all still match does it write, read back and merge.

use parking_lot::Mutex;
use sheetdb_core::{AddressError, GridAddress};
use sheetdb_protocol::{BatchReadRequest, BatchWriteRequest, ValueRender};

use crate::error::StoreError;
use crate::planner::plan;
use crate::store::GridStore;

/// One queued write. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateIntent {
    target: GridAddress,
    baseline: Vec<Vec<String>>,
    values: Vec<Vec<String>>,
}

impl UpdateIntent {
    pub fn new(target: GridAddress, baseline: Vec<Vec<String>>, values: Vec<Vec<String>>) -> Self {
        Self { target, baseline, values }
    }

    pub fn target(&self) -> &GridAddress {
        &self.target
    }

    /// Display strings of the target when the write was queued.
    pub fn baseline(&self) -> &[Vec<String>] {
        &self.baseline
    }

    pub fn values(&self) -> &[Vec<String>] {
        &self.values
    }
}

/// Queued intents plus a count of `clear` calls, so a sync can tell
/// whether the prefix it sent is still at the front.
#[derive(Debug, Default)]
struct Queue {
    intents: Vec<UpdateIntent>,
    generation: u64,
}

/// A write queue bound to one store. Safe to share between threads.
pub struct Updater<'s> {
    store: &'s GridStore,
    queue: Mutex<Queue>,
}

impl<'s> Updater<'s> {
    pub(crate) fn new(store: &'s GridStore) -> Self {
        Self { store, queue: Mutex::new(Queue::default()) }
    }

    pub fn store(&self) -> &'s GridStore {
        self.store
    }

    /// Queue `values` for `target`. No I/O.
    ///
    /// The target must be finite and expressible in A1, and `values` must
    /// fit inside it. Cells of the target not covered by `values` are
    /// written blank.
    pub fn update(&self, target: GridAddress, values: Vec<Vec<String>>) -> Result<(), StoreError> {
        let target = GridAddress::new(target.sheet, target.range.normalized());
        let address = self.store.format(&target)?;
        let (Some(height), Some(width)) = (target.range.height(), target.range.width()) else {
            return Err(AddressError::Unbounded(address).into());
        };

        let rows = values.len();
        let cols = values.iter().map(Vec::len).max().unwrap_or(0);
        if rows > height || cols > width {
            return Err(StoreError::InvalidValues { address, rows, cols });
        }

        let baseline = self.store.read(|mirror| -> Result<_, StoreError> {
            Ok(mirror.sheet(target.sheet)?.snapshot(&target.range)?)
        })?;

        self.queue.lock().intents.push(UpdateIntent::new(target, baseline, values));
        Ok(())
    }

    /// Queue a write addressed in A1 notation; the sheet prefix is required.
    pub fn update_a1(&self, address: &str, values: Vec<Vec<String>>) -> Result<(), StoreError> {
        let target = self.store.resolve(address, None)?;
        self.update(target, values)
    }

    pub fn len(&self) -> usize {
        self.queue.lock().intents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().intents.is_empty()
    }

    /// Copy of the queued intents, oldest first.
    pub fn pending(&self) -> Vec<UpdateIntent> {
        self.queue.lock().intents.clone()
    }

    /// Drop every queued intent.
    pub fn clear(&self) {
        let mut queue = self.queue.lock();
        queue.intents.clear();
        queue.generation += 1;
    }

    /// Commit the queue. Returns the number of intents committed.
    ///
    /// Any stale baseline fails the whole batch with
    /// [`StoreError::Conflict`] before anything is sent. On any error the
    /// queue is left as it was; RPCs that already succeeded are not undone.
    /// Intents queued while a sync is in flight stay queued for the next one,
    /// including after a concurrent [`Updater::clear`].
    pub fn sync(&self) -> Result<usize, StoreError> {
        let _sync = self.store.lock_sync();

        let (intents, generation) = {
            let queue = self.queue.lock();
            (queue.intents.clone(), queue.generation)
        };
        if intents.is_empty() {
            return Ok(0);
        }

        let highlight = self.store.highlight();
        let (ops, ranges) = self.store.read(|mirror| -> Result<_, StoreError> {
            let mut ranges = Vec::with_capacity(intents.len());
            for intent in &intents {
                let sheet = mirror.sheet(intent.target.sheet)?;
                let address = sheetdb_core::format_address(Some(sheet.title()), &intent.target.range)?;
                if !sheet.matches(&intent.target.range, &intent.baseline) {
                    log::warn!("Sync conflict at {}: cells changed since the update was queued", address);
                    return Err(StoreError::Conflict { address });
                }
                ranges.push(address);
            }
            Ok((plan(&intents, mirror, highlight)?, ranges))
        })?;

        let backend = self.store.backend();
        let written = backend
            .batch_write(&BatchWriteRequest { ops })
            .inspect_err(|e| log::warn!("Batch write failed, {} updates kept: {}", intents.len(), e))
            .map_err(StoreError::backend("batch write"))?;
        log::debug!("Batch write applied {} ops", written.applied);

        let read_back = backend
            .batch_read(&BatchReadRequest { ranges, render: ValueRender::Formatted })
            .inspect_err(|e| log::warn!("Read back after write failed: {}", e))
            .map_err(StoreError::backend("read back"))?;
        self.store.merge(&read_back.value_ranges)?;

        let committed = intents.len();
        let mut queue = self.queue.lock();
        // After a clear the front of the queue is no longer what was sent.
        if queue.generation == generation {
            queue.intents.drain(..committed);
        }
        drop(queue);
        log::info!("Synced {} updates", committed);
        Ok(committed)
    }
}
