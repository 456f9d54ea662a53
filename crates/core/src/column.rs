//! Single-column access.

use crate::error::Result;
use crate::headers::Header;
use crate::version::StructureGuard;

/// One typed column of values.
pub trait DataColumn {
    type Value;

    /// The header of the column.
    fn header(&self) -> Result<Header>;

    fn num_rows(&self) -> Result<usize>;

    /// Gets the value at `row_index`, failing with `MissingValue` if absent.
    fn get(&self, row_index: usize) -> Result<Self::Value>;

    /// A guard that goes stale when the column's source changes structure.
    fn structure_guard(&self) -> Result<StructureGuard>;

    /// Gets every value, `None` where missing.
    fn values(&self) -> Result<Vec<Option<Self::Value>>> {
        (0..self.num_rows()?)
            .map(|row_index| match self.get(row_index) {
                Ok(value) => Ok(Some(value)),
                Err(error) if error.is_missing_value() => Ok(None),
                Err(error) => Err(error),
            })
            .collect()
    }
}

/// A column whose values can be written.
pub trait MutableDataColumn: DataColumn {
    fn set(&mut self, row_index: usize, value: Self::Value) -> Result<()>;

    /// Makes the value at `row_index` missing.
    fn clear(&mut self, row_index: usize) -> Result<()>;
}

impl<C: DataColumn + ?Sized> DataColumn for &C {
    type Value = C::Value;

    fn header(&self) -> Result<Header> {
        (**self).header()
    }

    fn num_rows(&self) -> Result<usize> {
        (**self).num_rows()
    }

    fn get(&self, row_index: usize) -> Result<Self::Value> {
        (**self).get(row_index)
    }

    fn structure_guard(&self) -> Result<StructureGuard> {
        (**self).structure_guard()
    }
}

impl<C: DataColumn + ?Sized> DataColumn for &mut C {
    type Value = C::Value;

    fn header(&self) -> Result<Header> {
        (**self).header()
    }

    fn num_rows(&self) -> Result<usize> {
        (**self).num_rows()
    }

    fn get(&self, row_index: usize) -> Result<Self::Value> {
        (**self).get(row_index)
    }

    fn structure_guard(&self) -> Result<StructureGuard> {
        (**self).structure_guard()
    }
}

impl<C: MutableDataColumn + ?Sized> MutableDataColumn for &mut C {
    fn set(&mut self, row_index: usize, value: Self::Value) -> Result<()> {
        (**self).set(row_index, value)
    }

    fn clear(&mut self, row_index: usize) -> Result<()> {
        (**self).clear(row_index)
    }
}
