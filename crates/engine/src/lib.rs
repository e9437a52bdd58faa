//! `sheetmerge-engine`: tabular data model shared by the readers, the merge
//! core and the writers.

pub mod cell;
pub mod table;

pub use cell::CellValue;
pub use table::{Column, Table, TableError};
