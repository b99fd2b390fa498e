//! `sheetdb-core`: address grammar and coordinate algebra.
//!
//! Pure and stateless: A1 text <-> numeric rectangles, plus union and
//! growth computations over those rectangles.

pub mod a1;
pub mod error;
pub mod range;

pub use a1::{format_address, format_range, parse_a1, parse_corner, A1Ref, Corner};
pub use error::AddressError;
pub use range::{Bound, CellRange, GridAddress, SheetId};
