//! Tabula Storage - in-memory rows and batches.
//!
//! This crate provides the storage layer:
//!
//! - `MemoryBatch`: column-major batch with column and row structure editing
//! - `MemoryRow`: a standalone row owning its headers
//! - Row weights and batch metadata, stored alongside the cells
//! - `copy_row`, `copy_column`: value copies between equal structures
//!
//! # Example
//!
//! ```rust
//! use tabula_core::types::{Nominal, Numeric};
//! use tabula_core::{DataBatch, DataType, Headers, MutableDataBatch};
//! use tabula_storage::MemoryBatch;
//!
//! let mut batch = MemoryBatch::new();
//! batch.append_column("x", Numeric::new(true), false).unwrap();
//! batch
//!     .append_column("label", Nominal::new(false, ["no", "yes"]).unwrap(), true)
//!     .unwrap();
//! batch.push_row();
//!
//! let x = batch.representation("x", &Numeric::CANONICAL).unwrap();
//! assert!(batch.is_missing(&x, 0).unwrap());
//!
//! batch.set_value(&x, 0, 3.5).unwrap();
//! assert_eq!(batch.get_value(&x, 0), Ok(3.5));
//! ```

mod batch;
mod copy;
mod row;

pub use batch::MemoryBatch;
pub use copy::{copy_column, copy_row};
pub use row::MemoryRow;
