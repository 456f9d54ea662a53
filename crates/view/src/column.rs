//! Single-column views of batches, rows and other columns.

use crate::translation::{translate_row, validate_rows};
use std::fmt;
use tabula_core::types::Representation;
use tabula_core::{
    ensure_index, DataBatch, DataColumn, DataRow, DataType, Header, Headers, MutableDataBatch,
    MutableDataColumn, MutableDataRow, Result, StructureGuard,
};

/// One column of a batch, read through a fixed representation.
pub struct BatchColumnView<B, D: DataType, T> {
    source: B,
    representation: Representation<D, T>,
    column: usize,
    header: Header,
    guard: StructureGuard,
}

/// A batch column view which forwards writes to its source.
pub type MutableBatchColumnView<'a, B, D, T> = BatchColumnView<&'a mut B, D, T>;

impl<B: DataBatch, D: DataType, T> BatchColumnView<B, D, T> {
    /// Views the column of `representation` in `source`.
    ///
    /// Fails with `UnownedRepresentation` unless `source` owns it or an
    /// equivalent.
    pub fn new(source: B, representation: &Representation<D, T>) -> Result<Self> {
        let representation = source.ensure_ownership(representation)?;
        let column = source.column_of(&representation)?;
        let header = source.header(column)?;
        let guard = source.structure_guard()?;
        Ok(Self {
            source,
            representation,
            column,
            header,
            guard,
        })
    }

    /// The representation values are read through.
    pub fn representation(&self) -> &Representation<D, T> {
        &self.representation
    }

    /// The column's index in the source.
    pub fn column_index(&self) -> usize {
        self.column
    }
}

impl<B, D: DataType, T> fmt::Debug for BatchColumnView<B, D, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchColumnView")
            .field("header", &self.header)
            .field("representation", &self.representation)
            .finish()
    }
}

impl<B: DataBatch, D: DataType, T> DataColumn for BatchColumnView<B, D, T> {
    type Value = T;

    fn header(&self) -> Result<Header> {
        self.guard.guarded(|| Ok(self.header.clone()))
    }

    fn num_rows(&self) -> Result<usize> {
        self.guard.guarded(|| self.source.num_rows())
    }

    fn get(&self, row_index: usize) -> Result<T> {
        self.guard
            .guarded(|| self.source.get_value(&self.representation, row_index))
    }

    fn structure_guard(&self) -> Result<StructureGuard> {
        self.guard.guarded(|| Ok(self.guard.clone()))
    }
}

impl<B: MutableDataBatch, D: DataType, T: fmt::Debug> MutableDataColumn
    for BatchColumnView<B, D, T>
{
    fn set(&mut self, row_index: usize, value: T) -> Result<()> {
        self.guard.check()?;
        self.source.set_value(&self.representation, row_index, value)
    }

    fn clear(&mut self, row_index: usize) -> Result<()> {
        self.guard.check()?;
        self.source.clear_value(self.column, row_index)
    }
}

/// One column of a row, as a column of one value.
pub struct RowColumnView<R, D: DataType, T> {
    source: R,
    representation: Representation<D, T>,
    column: usize,
    header: Header,
    guard: StructureGuard,
}

impl<R: DataRow, D: DataType, T> RowColumnView<R, D, T> {
    /// Views the column of `representation` in `source`.
    pub fn new(source: R, representation: &Representation<D, T>) -> Result<Self> {
        let representation = source.ensure_ownership(representation)?;
        let column = source.column_of(&representation)?;
        let header = source.header(column)?;
        let guard = source.structure_guard()?;
        Ok(Self {
            source,
            representation,
            column,
            header,
            guard,
        })
    }
}

impl<R, D: DataType, T> fmt::Debug for RowColumnView<R, D, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowColumnView")
            .field("header", &self.header)
            .field("representation", &self.representation)
            .finish()
    }
}

impl<R: DataRow, D: DataType, T> DataColumn for RowColumnView<R, D, T> {
    type Value = T;

    fn header(&self) -> Result<Header> {
        self.guard.guarded(|| Ok(self.header.clone()))
    }

    fn num_rows(&self) -> Result<usize> {
        self.guard.guarded(|| Ok(1))
    }

    fn get(&self, row_index: usize) -> Result<T> {
        self.guard.check()?;
        ensure_index(row_index, 1)?;
        self.source.get_value(&self.representation)
    }

    fn structure_guard(&self) -> Result<StructureGuard> {
        self.guard.guarded(|| Ok(self.guard.clone()))
    }
}

impl<R: MutableDataRow, D: DataType, T: fmt::Debug> MutableDataColumn for RowColumnView<R, D, T> {
    fn set(&mut self, row_index: usize, value: T) -> Result<()> {
        self.guard.check()?;
        ensure_index(row_index, 1)?;
        self.source.set_value(&self.representation, value)
    }

    fn clear(&mut self, row_index: usize) -> Result<()> {
        self.guard.check()?;
        ensure_index(row_index, 1)?;
        self.source.clear_value(self.column)
    }
}

/// A view of a subset of another column's rows.
///
/// Rows may be selected more than once.
pub struct DataColumnView<C> {
    source: C,
    rows: Option<Vec<usize>>,
    guard: StructureGuard,
}

impl<C: DataColumn> DataColumnView<C> {
    /// Views `rows` of `source`, or all of them if `None`.
    pub fn new(source: C, rows: Option<Vec<usize>>) -> Result<Self> {
        if let Some(rows) = &rows {
            validate_rows(rows, source.num_rows()?)?;
        }
        let guard = source.structure_guard()?;
        Ok(Self {
            source,
            rows,
            guard,
        })
    }

    pub fn rows(&self) -> Option<&[usize]> {
        self.rows.as_deref()
    }

    fn source_row(&self, row_index: usize) -> Result<usize> {
        self.guard.check()?;
        translate_row(self.rows.as_deref(), row_index)
    }
}

impl<C: fmt::Debug> fmt::Debug for DataColumnView<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataColumnView")
            .field("source", &self.source)
            .field("rows", &self.rows)
            .finish()
    }
}

impl<C: DataColumn> DataColumn for DataColumnView<C> {
    type Value = C::Value;

    fn header(&self) -> Result<Header> {
        self.guard.guarded(|| self.source.header())
    }

    fn num_rows(&self) -> Result<usize> {
        self.guard.check()?;
        match &self.rows {
            Some(rows) => Ok(rows.len()),
            None => self.source.num_rows(),
        }
    }

    fn get(&self, row_index: usize) -> Result<C::Value> {
        let row = self.source_row(row_index)?;
        self.source.get(row)
    }

    fn structure_guard(&self) -> Result<StructureGuard> {
        self.guard.guarded(|| Ok(self.guard.clone()))
    }
}

impl<C: MutableDataColumn> MutableDataColumn for DataColumnView<C> {
    fn set(&mut self, row_index: usize, value: C::Value) -> Result<()> {
        let row = self.source_row(row_index)?;
        self.source.set(row, value)
    }

    fn clear(&mut self, row_index: usize) -> Result<()> {
        let row = self.source_row(row_index)?;
        self.source.clear(row)
    }
}
