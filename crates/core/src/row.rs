//! Row access.
//!
//! A row is a [`Headers`] with one value per column. Values are read and
//! written through representations; the row resolves each representation
//! to the one it owns before touching its storage.

use crate::error::Result;
use crate::headers::{borrow_shared, borrow_shared_mut, Headers, Shared};
use crate::types::{DataType, RawValue, Representation};
use std::fmt;

/// A row of typed values.
pub trait DataRow: Headers {
    /// Gets the value of the column of `representation`, presented by it.
    ///
    /// Fails with `MissingValue` if the column has no value, and with
    /// `UnownedRepresentation` if the representation doesn't belong to this
    /// row's headers.
    fn get_value<D: DataType, T>(&self, representation: &Representation<D, T>) -> Result<T>;

    /// Gets the stored value of a column, `None` if missing.
    fn raw_value(&self, column_index: usize) -> Result<Option<RawValue>>;

    /// The row's weight relative to its peers; 1.0 unless set.
    fn weight(&self) -> Result<f64> {
        Ok(1.0)
    }

    /// Whether the column of `representation` has no value.
    fn is_missing<D: DataType, T>(&self, representation: &Representation<D, T>) -> Result<bool> {
        match self.get_value(representation) {
            Ok(_) => Ok(false),
            Err(error) if error.is_missing_value() => Ok(true),
            Err(error) => Err(error),
        }
    }

    /// Applies `block` to the value if there is one.
    fn if_not_missing<D: DataType, T, R>(
        &self,
        representation: &Representation<D, T>,
        block: impl FnOnce(T) -> R,
    ) -> Result<Option<R>> {
        match self.get_value(representation) {
            Ok(value) => Ok(Some(block(value))),
            Err(error) if error.is_missing_value() => Ok(None),
            Err(error) => Err(error),
        }
    }
}

/// A row whose values can be written.
pub trait MutableDataRow: DataRow {
    /// Sets the value of the column of `representation`.
    ///
    /// Fails with `InvalidValue` if the value isn't valid for it.
    fn set_value<D: DataType, T: fmt::Debug>(
        &mut self,
        representation: &Representation<D, T>,
        value: T,
    ) -> Result<()>;

    /// Makes the value of a column missing.
    ///
    /// Fails with `DoesntSupportMissingValues` if its type has none.
    fn clear_value(&mut self, column_index: usize) -> Result<()>;

    /// Stores a value taken from a structure of the same shape.
    fn set_raw_value(&mut self, column_index: usize, value: Option<RawValue>) -> Result<()>;
}

impl<R: DataRow + ?Sized> DataRow for &R {
    fn get_value<D: DataType, T>(&self, representation: &Representation<D, T>) -> Result<T> {
        (**self).get_value(representation)
    }

    fn raw_value(&self, column_index: usize) -> Result<Option<RawValue>> {
        (**self).raw_value(column_index)
    }

    fn weight(&self) -> Result<f64> {
        (**self).weight()
    }
}

impl<R: DataRow + ?Sized> DataRow for &mut R {
    fn get_value<D: DataType, T>(&self, representation: &Representation<D, T>) -> Result<T> {
        (**self).get_value(representation)
    }

    fn raw_value(&self, column_index: usize) -> Result<Option<RawValue>> {
        (**self).raw_value(column_index)
    }

    fn weight(&self) -> Result<f64> {
        (**self).weight()
    }
}

impl<R: MutableDataRow + ?Sized> MutableDataRow for &mut R {
    fn set_value<D: DataType, T: fmt::Debug>(
        &mut self,
        representation: &Representation<D, T>,
        value: T,
    ) -> Result<()> {
        (**self).set_value(representation, value)
    }

    fn clear_value(&mut self, column_index: usize) -> Result<()> {
        (**self).clear_value(column_index)
    }

    fn set_raw_value(&mut self, column_index: usize, value: Option<RawValue>) -> Result<()> {
        (**self).set_raw_value(column_index, value)
    }
}

impl<R: DataRow> DataRow for Shared<R> {
    fn get_value<D: DataType, T>(&self, representation: &Representation<D, T>) -> Result<T> {
        borrow_shared(self)?.get_value(representation)
    }

    fn raw_value(&self, column_index: usize) -> Result<Option<RawValue>> {
        borrow_shared(self)?.raw_value(column_index)
    }

    fn weight(&self) -> Result<f64> {
        borrow_shared(self)?.weight()
    }
}

impl<R: MutableDataRow> MutableDataRow for Shared<R> {
    fn set_value<D: DataType, T: fmt::Debug>(
        &mut self,
        representation: &Representation<D, T>,
        value: T,
    ) -> Result<()> {
        borrow_shared_mut(self)?.set_value(representation, value)
    }

    fn clear_value(&mut self, column_index: usize) -> Result<()> {
        borrow_shared_mut(self)?.clear_value(column_index)
    }

    fn set_raw_value(&mut self, column_index: usize, value: Option<RawValue>) -> Result<()> {
        borrow_shared_mut(self)?.set_raw_value(column_index, value)
    }
}
