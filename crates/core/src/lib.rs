//! Tabula Core - typed headers, representations and data access traits.
//!
//! This crate provides the foundations of the Tabula tabular-data engine:
//!
//! - `types`: data-types (`Numeric`, `Nominal`, `WithMissingValues`) and the
//!   representations through which their values are read and written
//! - `headers`: column headers, the mutable header collection with
//!   structural versioning, and read-only header views
//! - `DataRow`, `DataBatch`, `DataColumn`, `DataStream`: access traits
//!   implemented by storage and by views
//! - `DataMetadata`, row weights and `format_row`: what a data-set says
//!   about itself and its rows
//! - `Error`: error types for all of the above
//!
//! # Example
//!
//! ```rust
//! use tabula_core::headers::{Headers, MutableHeaders};
//! use tabula_core::types::{DataType, Nominal, Numeric};
//!
//! let mut headers = MutableHeaders::new();
//! headers.append("age", Numeric::new(true), false).unwrap();
//! headers.append("height", Numeric::new(true), false).unwrap();
//!
//! let height = headers.representation("height", &Numeric::CANONICAL).unwrap();
//! assert_eq!(height.column_index(), 1);
//!
//! let label = Nominal::new(false, ["yes", "no"]).unwrap();
//! headers.insert(0, "label", label, true).unwrap();
//! assert_eq!(height.column_index(), 2);
//! ```

mod cache;
mod error;
mod format;
pub mod headers;
mod metadata;
pub mod types;
mod version;

mod batch;
mod column;
mod row;
mod stream;

pub use batch::{DataBatch, MutableDataBatch};
pub use cache::WeakCache;
pub use column::{DataColumn, MutableDataColumn};
pub use error::{ensure_index, Error, Result};
pub use format::{format_row, format_row_values};
pub use headers::{Header, Headers, HeadersView, MutableHeaders, Shared};
pub use metadata::{DataMetadata, WithMetadata};
pub use row::{DataRow, MutableDataRow};
pub use stream::DataStream;
pub use types::{AnyDataType, DataType, FiniteDataType, Representation};
pub use version::{ModificationCounter, Snapshot, StructureGuard};
