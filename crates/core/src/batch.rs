//! Batch access: a fixed set of rows sharing one set of headers.

use crate::error::{ensure_index, Error, Result};
use crate::headers::{borrow_shared, borrow_shared_mut, Headers, Shared};
use crate::metadata::WithMetadata;
use crate::types::{DataType, RawValue, Representation};
use std::fmt;

/// Rows of typed values sharing the same headers.
pub trait DataBatch: Headers + WithMetadata {
    fn num_rows(&self) -> Result<usize>;

    /// Gets the value at `row_index` in the column of `representation`.
    fn get_value<D: DataType, T>(
        &self,
        representation: &Representation<D, T>,
        row_index: usize,
    ) -> Result<T>;

    /// Gets a stored value, `None` if missing.
    fn raw_value(&self, column_index: usize, row_index: usize) -> Result<Option<RawValue>>;

    /// The weight of a row; 1.0 unless the batch stores weights.
    fn row_weight(&self, row_index: usize) -> Result<f64> {
        ensure_index(row_index, self.num_rows()?)?;
        Ok(1.0)
    }

    fn is_missing<D: DataType, T>(
        &self,
        representation: &Representation<D, T>,
        row_index: usize,
    ) -> Result<bool> {
        match self.get_value(representation, row_index) {
            Ok(_) => Ok(false),
            Err(error) if error.is_missing_value() => Ok(true),
            Err(error) => Err(error),
        }
    }

    fn if_not_missing<D: DataType, T, R>(
        &self,
        representation: &Representation<D, T>,
        row_index: usize,
        block: impl FnOnce(T) -> R,
    ) -> Result<Option<R>> {
        match self.get_value(representation, row_index) {
            Ok(value) => Ok(Some(block(value))),
            Err(error) if error.is_missing_value() => Ok(None),
            Err(error) => Err(error),
        }
    }
}

/// A batch whose values can be written.
pub trait MutableDataBatch: DataBatch {
    fn set_value<D: DataType, T: fmt::Debug>(
        &mut self,
        representation: &Representation<D, T>,
        row_index: usize,
        value: T,
    ) -> Result<()>;

    fn clear_value(&mut self, column_index: usize, row_index: usize) -> Result<()>;

    fn set_raw_value(
        &mut self,
        column_index: usize,
        row_index: usize,
        value: Option<RawValue>,
    ) -> Result<()>;

    /// Sets every value of a column, one per row.
    fn set_column<D: DataType, T: fmt::Debug>(
        &mut self,
        representation: &Representation<D, T>,
        values: Vec<T>,
    ) -> Result<()> {
        let num_rows = self.num_rows()?;
        if values.len() != num_rows {
            return Err(Error::different_column_structure(format!(
                "Expected {} values, got {}",
                num_rows,
                values.len()
            )));
        }
        for value in &values {
            representation.validate(value)?;
        }
        for (row_index, value) in values.into_iter().enumerate() {
            self.set_value(representation, row_index, value)?;
        }
        Ok(())
    }

    /// Makes every value of a column missing.
    fn clear_column(&mut self, column_index: usize) -> Result<()> {
        for row_index in 0..self.num_rows()? {
            self.clear_value(column_index, row_index)?;
        }
        Ok(())
    }
}

impl<B: DataBatch + ?Sized> DataBatch for &B {
    fn num_rows(&self) -> Result<usize> {
        (**self).num_rows()
    }

    fn get_value<D: DataType, T>(
        &self,
        representation: &Representation<D, T>,
        row_index: usize,
    ) -> Result<T> {
        (**self).get_value(representation, row_index)
    }

    fn raw_value(&self, column_index: usize, row_index: usize) -> Result<Option<RawValue>> {
        (**self).raw_value(column_index, row_index)
    }

    fn row_weight(&self, row_index: usize) -> Result<f64> {
        (**self).row_weight(row_index)
    }
}

impl<B: DataBatch + ?Sized> DataBatch for &mut B {
    fn num_rows(&self) -> Result<usize> {
        (**self).num_rows()
    }

    fn get_value<D: DataType, T>(
        &self,
        representation: &Representation<D, T>,
        row_index: usize,
    ) -> Result<T> {
        (**self).get_value(representation, row_index)
    }

    fn raw_value(&self, column_index: usize, row_index: usize) -> Result<Option<RawValue>> {
        (**self).raw_value(column_index, row_index)
    }

    fn row_weight(&self, row_index: usize) -> Result<f64> {
        (**self).row_weight(row_index)
    }
}

impl<B: MutableDataBatch + ?Sized> MutableDataBatch for &mut B {
    fn set_value<D: DataType, T: fmt::Debug>(
        &mut self,
        representation: &Representation<D, T>,
        row_index: usize,
        value: T,
    ) -> Result<()> {
        (**self).set_value(representation, row_index, value)
    }

    fn clear_value(&mut self, column_index: usize, row_index: usize) -> Result<()> {
        (**self).clear_value(column_index, row_index)
    }

    fn set_raw_value(
        &mut self,
        column_index: usize,
        row_index: usize,
        value: Option<RawValue>,
    ) -> Result<()> {
        (**self).set_raw_value(column_index, row_index, value)
    }
}

impl<B: DataBatch> DataBatch for Shared<B> {
    fn num_rows(&self) -> Result<usize> {
        borrow_shared(self)?.num_rows()
    }

    fn get_value<D: DataType, T>(
        &self,
        representation: &Representation<D, T>,
        row_index: usize,
    ) -> Result<T> {
        borrow_shared(self)?.get_value(representation, row_index)
    }

    fn raw_value(&self, column_index: usize, row_index: usize) -> Result<Option<RawValue>> {
        borrow_shared(self)?.raw_value(column_index, row_index)
    }

    fn row_weight(&self, row_index: usize) -> Result<f64> {
        borrow_shared(self)?.row_weight(row_index)
    }
}

impl<B: MutableDataBatch> MutableDataBatch for Shared<B> {
    fn set_value<D: DataType, T: fmt::Debug>(
        &mut self,
        representation: &Representation<D, T>,
        row_index: usize,
        value: T,
    ) -> Result<()> {
        borrow_shared_mut(self)?.set_value(representation, row_index, value)
    }

    fn clear_value(&mut self, column_index: usize, row_index: usize) -> Result<()> {
        borrow_shared_mut(self)?.clear_value(column_index, row_index)
    }

    fn set_raw_value(
        &mut self,
        column_index: usize,
        row_index: usize,
        value: Option<RawValue>,
    ) -> Result<()> {
        borrow_shared_mut(self)?.set_raw_value(column_index, row_index, value)
    }
}
