//! Standalone in-memory rows.

use crate::batch::MemoryBatch;
use std::fmt;
use std::rc::Rc;
use tabula_core::headers::{HeadersIdentityToken, OwnedSlot};
use tabula_core::types::{AnyDataType, Lens, RawValue, Representation, RepresentationSlot};
use tabula_core::{
    format_row, DataBatch, DataRow, DataType, Error, Header, Headers, MutableDataBatch,
    MutableDataRow, MutableHeaders, Result, StructureGuard,
};

/// A single row that owns its headers.
///
/// Stored as a one-row [`MemoryBatch`], so column edits keep the values of
/// the other columns. Displays as `[name: value, ...]`.
pub struct MemoryRow {
    batch: MemoryBatch,
}

impl MemoryRow {
    /// Creates an empty row with no columns.
    pub fn new() -> Self {
        let mut batch = MemoryBatch::new();
        batch.push_row();
        Self { batch }
    }

    /// Creates a row with the structure of `headers`, its values seeded.
    pub fn with_structure(headers: &impl Headers) -> Result<Self> {
        Ok(Self {
            batch: MemoryBatch::with_structure(headers, 1)?,
        })
    }

    /// The row's own header collection.
    pub fn structure(&self) -> &MutableHeaders {
        self.batch.structure()
    }

    pub fn insert_column<D: DataType>(
        &mut self,
        index: usize,
        name: &str,
        data_type: D,
        is_target: bool,
    ) -> Result<()> {
        self.batch.insert_column(index, name, data_type, is_target)
    }

    pub fn insert_column_any(
        &mut self,
        index: usize,
        name: &str,
        data_type: Rc<dyn AnyDataType>,
        is_target: bool,
    ) -> Result<()> {
        self.batch.insert_column_any(index, name, data_type, is_target)
    }

    /// Inserts a column holding `value`, given in representation `lens`.
    pub fn insert_column_with_value<D: DataType, T: fmt::Debug>(
        &mut self,
        index: usize,
        name: &str,
        data_type: D,
        is_target: bool,
        lens: &Lens<D, T>,
        value: T,
    ) -> Result<()> {
        if !lens.is_valid(&data_type, &value) {
            return Err(Error::invalid_value(
                format!("{} of column \"{}\"", lens.name(), name),
                value,
            ));
        }
        let internal = lens.to_internal(&data_type, value);
        self.batch.insert_column(index, name, data_type, is_target)?;
        self.batch
            .set_raw_value(index, 0, Some(Box::new(internal) as RawValue))
    }

    pub fn append_column<D: DataType>(
        &mut self,
        name: &str,
        data_type: D,
        is_target: bool,
    ) -> Result<()> {
        self.batch.append_column(name, data_type, is_target)
    }

    pub fn delete_column(&mut self, index: usize, name: Option<&str>) -> Result<String> {
        self.batch.delete_column(index, name)
    }

    pub fn delete_column_by_name(&mut self, name: &str, index: Option<usize>) -> Result<usize> {
        self.batch.delete_column_by_name(name, index)
    }

    pub fn change_column<D: DataType>(
        &mut self,
        index: usize,
        name: &str,
        data_type: D,
        is_target: bool,
    ) -> Result<()> {
        self.batch.change_column(index, name, data_type, is_target)
    }

    pub fn change_column_any(
        &mut self,
        index: usize,
        name: &str,
        data_type: Rc<dyn AnyDataType>,
        is_target: bool,
    ) -> Result<()> {
        self.batch.change_column_any(index, name, data_type, is_target)
    }

    pub fn change_column_name(&mut self, index: usize, name: &str) -> Result<()> {
        self.batch.change_column_name(index, name)
    }

    pub fn change_column_is_target(&mut self, index: usize, is_target: bool) -> Result<()> {
        self.batch.change_column_is_target(index, is_target)
    }

    pub fn clear_columns(&mut self) {
        self.batch.clear_columns()
    }

    /// Makes every value missing.
    pub fn clear(&mut self) -> Result<()> {
        self.batch.clear_row(0)
    }

    /// Fails with [`Error::InvalidArgument`] unless `weight` is finite and
    /// not negative.
    pub fn set_weight(&mut self, weight: f64) -> Result<()> {
        self.batch.set_row_weight(0, weight)
    }
}

impl Default for MemoryRow {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryRow")
            .field("headers", self.batch.structure())
            .finish()
    }
}

impl fmt::Display for MemoryRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_row(self).map_err(|_| fmt::Error)?)
    }
}

impl Headers for MemoryRow {
    fn num_columns(&self) -> Result<usize> {
        self.batch.num_columns()
    }

    fn header(&self, index: usize) -> Result<Header> {
        self.batch.header(index)
    }

    fn index_of(&self, name: &str) -> Result<Option<usize>> {
        self.batch.index_of(name)
    }

    fn identity_token(&self) -> Result<HeadersIdentityToken> {
        self.batch.identity_token()
    }

    fn owned_slot(&self, slot: &Rc<RepresentationSlot>) -> Result<Option<OwnedSlot>> {
        self.batch.owned_slot(slot)
    }

    fn structure_guard(&self) -> Result<StructureGuard> {
        self.batch.structure().structure_guard()
    }
}

impl DataRow for MemoryRow {
    fn get_value<D: DataType, T>(&self, representation: &Representation<D, T>) -> Result<T> {
        self.batch.get_value(representation, 0)
    }

    fn raw_value(&self, column_index: usize) -> Result<Option<RawValue>> {
        self.batch.raw_value(column_index, 0)
    }

    fn weight(&self) -> Result<f64> {
        self.batch.row_weight(0)
    }
}

impl MutableDataRow for MemoryRow {
    fn set_value<D: DataType, T: fmt::Debug>(
        &mut self,
        representation: &Representation<D, T>,
        value: T,
    ) -> Result<()> {
        self.batch.set_value(representation, 0, value)
    }

    fn clear_value(&mut self, column_index: usize) -> Result<()> {
        self.batch.clear_value(column_index, 0)
    }

    fn set_raw_value(&mut self, column_index: usize, value: Option<RawValue>) -> Result<()> {
        self.batch.set_raw_value(column_index, 0, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_core::types::{Nominal, Numeric};

    #[test]
    fn test_new_row_values() {
        let mut row = MemoryRow::new();
        row.append_column("x", Numeric::new(true), false).unwrap();
        row.append_column("y", Numeric::new(false), false).unwrap();

        let x = row.representation("x", &Numeric::CANONICAL).unwrap();
        let y = row.representation("y", &Numeric::CANONICAL).unwrap();
        assert!(row.is_missing(&x).unwrap());
        assert_eq!(row.get_value(&y), Ok(0.0));

        row.set_value(&x, 3.5).unwrap();
        assert_eq!(row.get_value(&x), Ok(3.5));
        assert_eq!(row.if_not_missing(&x, |v| v * 2.0), Ok(Some(7.0)));
    }

    #[test]
    fn test_insert_column_with_value() {
        let mut row = MemoryRow::new();
        row.append_column("x", Numeric::new(true), false).unwrap();
        let x = row.representation("x", &Numeric::CANONICAL).unwrap();
        row.set_value(&x, 1.0).unwrap();

        let colour = Nominal::new(false, ["red", "green"]).unwrap();
        row.insert_column_with_value(0, "colour", colour, false, &Nominal::INDEX, 1)
            .unwrap();

        let canonical = row.representation("colour", &Nominal::CANONICAL).unwrap();
        assert_eq!(row.get_value(&canonical), Ok("green".to_string()));
        assert_eq!(x.column_index(), 1);
        assert_eq!(row.get_value(&x), Ok(1.0));
    }

    #[test]
    fn test_insert_column_with_invalid_value() {
        let mut row = MemoryRow::new();
        let colour = Nominal::new(false, ["red", "green"]).unwrap();
        let result = row.insert_column_with_value(0, "colour", colour, false, &Nominal::INDEX, 7);
        assert!(matches!(result, Err(Error::InvalidValue { .. })));
        assert_eq!(row.num_columns(), Ok(0));
    }

    #[test]
    fn test_clear() {
        let mut row = MemoryRow::new();
        row.append_column("x", Numeric::new(true), false).unwrap();
        let x = row.representation("x", &Numeric::CANONICAL).unwrap();
        row.set_value(&x, 2.0).unwrap();
        row.clear().unwrap();
        assert!(row.is_missing(&x).unwrap());

        assert!(matches!(
            row.clear_value(3),
            Err(Error::IndexOutOfBounds { index: 3, .. })
        ));
    }

    #[test]
    fn test_raw_values_between_rows() {
        let mut row = MemoryRow::new();
        row.append_column("x", Numeric::new(true), false).unwrap();
        let x = row.representation("x", &Numeric::CANONICAL).unwrap();
        row.set_value(&x, 9.0).unwrap();

        let mut other = MemoryRow::with_structure(&row).unwrap();
        other.set_raw_value(0, row.raw_value(0).unwrap()).unwrap();
        assert_eq!(other.get_value(&x), Ok(9.0));
    }

    #[test]
    fn test_weight() {
        let mut row = MemoryRow::new();
        assert_eq!(row.weight(), Ok(1.0));
        row.set_weight(0.25).unwrap();
        assert_eq!(row.weight(), Ok(0.25));

        assert!(matches!(row.set_weight(-1.0), Err(Error::InvalidArgument { .. })));
        assert!(matches!(row.set_weight(f64::NAN), Err(Error::InvalidArgument { .. })));
        assert_eq!(row.weight(), Ok(0.25));

        row.append_column("x", Numeric::new(true), false).unwrap();
        assert_eq!(row.weight(), Ok(0.25));
    }

    #[test]
    fn test_display() {
        let mut row = MemoryRow::new();
        row.append_column("x", Numeric::new(true), false).unwrap();
        row.append_column("colour", Nominal::new(false, ["red", "green"]).unwrap(), true)
            .unwrap();
        assert_eq!(row.to_string(), "[x: <missing>, colour: red]");
        assert_eq!(tabula_core::format_row_values(&row), Ok("<missing>,red,".to_string()));

        let x = row.representation("x", &Numeric::CANONICAL).unwrap();
        row.set_value(&x, 1.5).unwrap();
        assert_eq!(row.to_string(), "[x: 1.5, colour: red]");
        assert_eq!(MemoryRow::new().to_string(), "[]");
    }
}
