//! Tabula View - index-translating views over rows, columns, batches and
//! streams.
//!
//! A view selects an ordered subset of its source's columns (and, for
//! batches and columns, rows) and reads and writes through to the source.
//! Views may rename columns or change their target flags locally. Once the
//! source changes structure, every access to the view fails with
//! `Error::StaleView`.
//!
//! - `DataRowView`, `DataBatchView`, `DataStreamView`: column subsets
//! - `BatchRowView`, `BatchColumnView`, `RowColumnView`, `RowBatchView`:
//!   one shape seen as another
//! - `DataColumnView`: a row subset of a column
//! - `RowViews`, `BatchViews`, `StreamViews` and their mutable
//!   counterparts: view constructors on every source
//!
//! # Example
//!
//! ```rust
//! use tabula_core::types::Numeric;
//! use tabula_core::{DataBatch, DataType, Headers, MutableDataBatch};
//! use tabula_storage::MemoryBatch;
//! use tabula_view::BatchViews;
//!
//! let mut batch = MemoryBatch::new();
//! batch.append_column("x", Numeric::new(true), false).unwrap();
//! batch.append_column("y", Numeric::new(true), true).unwrap();
//! let y = batch.representation("y", &Numeric::CANONICAL).unwrap();
//! for i in 0..3 {
//!     batch.push_row();
//!     batch.set_value(&y, i, i as f64).unwrap();
//! }
//!
//! let view = batch.view(Some(vec![1]), Some(vec![2, 0])).unwrap();
//! assert_eq!(view.num_columns(), Ok(1));
//! assert_eq!(view.get_value(&y, 0), Ok(2.0));
//! ```

mod batch;
mod column;
mod row;
mod stream;
mod translation;

pub use batch::{
    BatchRowView, BatchViews, DataBatchView, MutableBatchRowView, MutableBatchViews,
    MutableDataBatchView, RowBatchView,
};
pub use column::{BatchColumnView, DataColumnView, MutableBatchColumnView, RowColumnView};
pub use row::{DataRowView, MutableDataRowView, MutableRowViews, RowViews};
pub use stream::{DataStreamView, StreamViews};
pub use translation::{
    all_columns_except, header_subset_indices, translate_column, translate_row,
    validate_columns, validate_rows,
};
