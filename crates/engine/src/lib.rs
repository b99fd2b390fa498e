//! `sheetdb-engine`: a remote grid used as a tabular store.
//!
//! [`GridStore`] loads the grid into a [`GridMirror`]; an [`Updater`] queues
//! writes against snapshots of the mirror and commits them with
//! optimistic concurrency.

pub mod backend;
pub mod cell;
pub mod error;
pub mod list;
pub mod memory;
pub mod mirror;
pub mod named;
pub mod planner;
pub mod sheet;
pub mod store;
pub mod table;
pub mod updater;

pub use backend::{BackendError, GridBackend};
pub use cell::{Cell, CellValue, ValueKind};
pub use error::{LookupError, StoreError};
pub use list::{AppendList, EventLog};
pub use memory::MemoryBackend;
pub use mirror::GridMirror;
pub use named::NameIndexed;
pub use planner::{plan, BatchPlanner};
pub use sheet::{Row, Sheet};
pub use store::GridStore;
pub use table::{Record, Table};
pub use updater::{UpdateIntent, Updater};
