//! Column-major in-memory batches.
//!
//! A `MemoryBatch` owns its headers and one typed cell column per header.
//! Column-structure edits go through the headers (and so through their
//! modification counter); row-structure edits bump a separate row counter.
//! Both counters are part of the batch's structure guard. Each row carries
//! a weight, 1.0 until set; the batch as a whole carries its metadata.

use crate::row::MemoryRow;
use log::debug;
use std::any::type_name;
use std::fmt;
use std::rc::Rc;
use tabula_core::headers::{HeadersIdentityToken, OwnedSlot};
use tabula_core::types::{
    AnyDataType, Cells, Lens, RawValue, Representation, RepresentationSlot, TypedCells,
};
use tabula_core::{
    ensure_index, DataBatch, DataMetadata, DataRow, DataStream, DataType, Error, Header, Headers,
    ModificationCounter, MutableDataBatch, MutableDataRow, MutableHeaders, Result,
    StructureGuard, WithMetadata,
};

/// A batch of rows stored column by column.
pub struct MemoryBatch {
    headers: MutableHeaders,
    columns: Vec<Box<dyn Cells>>,
    num_rows: usize,
    weights: Vec<f64>,
    metadata: DataMetadata,
    rows_counter: ModificationCounter,
}

impl MemoryBatch {
    /// Creates a new batch with no columns and no rows.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates a new batch with room for `columns` columns.
    pub fn with_capacity(columns: usize) -> Self {
        Self {
            headers: MutableHeaders::with_capacity(columns),
            columns: Vec::with_capacity(columns),
            num_rows: 0,
            weights: Vec::new(),
            metadata: DataMetadata::default(),
            rows_counter: ModificationCounter::new(),
        }
    }

    /// Creates a batch with the structure of `headers` and `num_rows`
    /// freshly seeded rows.
    pub fn with_structure(headers: &impl Headers, num_rows: usize) -> Result<Self> {
        let headers = MutableHeaders::from_headers(headers)?;
        let columns = headers
            .iter()
            .map(|header| header.data_type().dyn_new_cells(num_rows))
            .collect();
        Ok(Self {
            headers,
            columns,
            num_rows,
            weights: vec![1.0; num_rows],
            metadata: DataMetadata::default(),
            rows_counter: ModificationCounter::new(),
        })
    }

    /// Gives the batch a name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.metadata.set_name(name);
        self
    }

    /// The batch's own header collection.
    pub fn structure(&self) -> &MutableHeaders {
        &self.headers
    }

    pub fn set_metadata(&mut self, metadata: DataMetadata) {
        self.metadata = metadata;
    }

    /// Sets the weight of the row at `index`.
    ///
    /// Fails with [`Error::InvalidArgument`] unless `weight` is finite and
    /// not negative.
    pub fn set_row_weight(&mut self, index: usize, weight: f64) -> Result<()> {
        ensure_index(index, self.num_rows)?;
        self.weights[index] = checked_weight(weight)?;
        Ok(())
    }

    /// Returns the number of rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.num_rows
    }

    /// Returns true if the batch has no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.num_rows == 0
    }

    pub fn insert_column<D: DataType>(
        &mut self,
        index: usize,
        name: &str,
        data_type: D,
        is_target: bool,
    ) -> Result<()> {
        self.insert_column_any(index, name, Rc::new(data_type), is_target)
    }

    /// Inserts a column whose cells are all freshly seeded.
    pub fn insert_column_any(
        &mut self,
        index: usize,
        name: &str,
        data_type: Rc<dyn AnyDataType>,
        is_target: bool,
    ) -> Result<()> {
        let cells = data_type.dyn_new_cells(self.num_rows);
        self.headers.insert_any(index, name, data_type, is_target)?;
        self.columns.insert(index, cells);
        debug!("inserted column {} \"{}\" over {} rows", index, name, self.num_rows);
        Ok(())
    }

    pub fn append_column<D: DataType>(
        &mut self,
        name: &str,
        data_type: D,
        is_target: bool,
    ) -> Result<()> {
        self.insert_column(self.columns.len(), name, data_type, is_target)
    }

    /// Inserts a column, taking the value of each row from `value_at`.
    ///
    /// Every value is validated before the batch is touched.
    pub fn insert_column_with<D: DataType, T: fmt::Debug>(
        &mut self,
        index: usize,
        name: &str,
        data_type: D,
        is_target: bool,
        lens: &Lens<D, T>,
        mut value_at: impl FnMut(usize) -> T,
    ) -> Result<()> {
        self.headers.check_insert(index, name)?;

        let seed = if data_type.supports_missing_values() {
            None
        } else {
            Some(data_type.initial())
        };
        let mut cells = TypedCells::<D::Internal>::new(seed, 0);
        for row_index in 0..self.num_rows {
            let value = value_at(row_index);
            if !lens.is_valid(&data_type, &value) {
                return Err(Error::invalid_value(
                    format!("{} of column \"{}\"", lens.name(), name),
                    value,
                ));
            }
            cells.push(Some(lens.to_internal(&data_type, value)));
        }

        self.headers.insert(index, name, data_type, is_target)?;
        self.columns.insert(index, Box::new(cells));
        debug!("inserted filled column {} \"{}\"", index, name);
        Ok(())
    }

    /// Appends a column, taking the value of each row from `value_at`.
    pub fn append_column_with<D: DataType, T: fmt::Debug>(
        &mut self,
        name: &str,
        data_type: D,
        is_target: bool,
        lens: &Lens<D, T>,
        value_at: impl FnMut(usize) -> T,
    ) -> Result<()> {
        self.insert_column_with(self.columns.len(), name, data_type, is_target, lens, value_at)
    }

    /// Deletes the column at `index`, returning its name.
    pub fn delete_column(&mut self, index: usize, name: Option<&str>) -> Result<String> {
        let name = self.headers.delete(index, name)?;
        self.columns.remove(index);
        debug!("deleted column {} \"{}\"", index, name);
        Ok(name)
    }

    /// Deletes the column named `name`, returning its index.
    pub fn delete_column_by_name(&mut self, name: &str, index: Option<usize>) -> Result<usize> {
        let index = self.headers.delete_by_name(name, index)?;
        self.columns.remove(index);
        debug!("deleted column {} \"{}\"", index, name);
        Ok(index)
    }

    pub fn change_column<D: DataType>(
        &mut self,
        index: usize,
        name: &str,
        data_type: D,
        is_target: bool,
    ) -> Result<()> {
        self.change_column_any(index, name, Rc::new(data_type), is_target)
    }

    /// Replaces the column at `index` with a freshly seeded one.
    pub fn change_column_any(
        &mut self,
        index: usize,
        name: &str,
        data_type: Rc<dyn AnyDataType>,
        is_target: bool,
    ) -> Result<()> {
        let cells = data_type.dyn_new_cells(self.num_rows);
        self.headers.set_any(index, name, data_type, is_target)?;
        self.columns[index] = cells;
        debug!("changed column {} to \"{}\"", index, name);
        Ok(())
    }

    /// Renames the column at `index`, keeping its values.
    pub fn change_column_name(&mut self, index: usize, name: &str) -> Result<()> {
        self.headers.change_name(index, name)
    }

    /// Changes whether the column at `index` is a target, keeping its values.
    pub fn change_column_is_target(&mut self, index: usize, is_target: bool) -> Result<()> {
        self.headers.change_is_target(index, is_target)
    }

    /// Removes every column. The row count is kept.
    pub fn clear_columns(&mut self) {
        self.headers.clear();
        self.columns.clear();
        debug!("cleared columns");
    }

    /// Appends a freshly seeded row, returning its index.
    pub fn push_row(&mut self) -> usize {
        for cells in &mut self.columns {
            cells.push_blank();
        }
        self.weights.push(1.0);
        self.num_rows += 1;
        self.rows_changed("push");
        self.num_rows - 1
    }

    /// Appends a copy of `row`, which must have this batch's structure.
    pub fn push_row_from(&mut self, row: &impl DataRow) -> Result<usize> {
        let values = self.take_row_values(row)?;
        let weight = checked_weight(row.weight()?)?;
        let index = self.push_row();
        self.store_row_values(index, values)?;
        self.weights[index] = weight;
        Ok(index)
    }

    /// Inserts a freshly seeded row at `index`.
    pub fn insert_row(&mut self, index: usize) -> Result<()> {
        if index > self.num_rows {
            return Err(Error::index_out_of_bounds(index, self.num_rows + 1));
        }
        for cells in &mut self.columns {
            cells.insert_blank(index);
        }
        self.weights.insert(index, 1.0);
        self.num_rows += 1;
        self.rows_changed("insert");
        Ok(())
    }

    pub fn delete_row(&mut self, index: usize) -> Result<()> {
        ensure_index(index, self.num_rows)?;
        for cells in &mut self.columns {
            cells.remove(index);
        }
        self.weights.remove(index);
        self.num_rows -= 1;
        self.rows_changed("delete");
        Ok(())
    }

    /// Removes every row.
    pub fn clear_rows(&mut self) {
        for cells in &mut self.columns {
            cells.clear_all();
        }
        self.weights.clear();
        self.num_rows = 0;
        self.rows_changed("clear");
    }

    /// Overwrites the row at `index` with the values and weight of `row`.
    ///
    /// Fails with [`Error::DifferentRowStructure`] unless `row` has this
    /// batch's structure.
    pub fn set_row(&mut self, index: usize, row: &impl DataRow) -> Result<()> {
        ensure_index(index, self.num_rows)?;
        let values = self.take_row_values(row)?;
        let weight = checked_weight(row.weight()?)?;
        self.store_row_values(index, values)?;
        self.weights[index] = weight;
        Ok(())
    }

    /// Makes every value of the row at `index` missing.
    ///
    /// Fails without changing anything if any column has no missing values.
    pub fn clear_row(&mut self, index: usize) -> Result<()> {
        ensure_index(index, self.num_rows)?;
        if let Some(header) = self.headers.iter().find(|h| !h.supports_missing_values()) {
            return Err(Error::doesnt_support_missing_values(
                header.index(),
                header.name(),
            ));
        }
        for cells in &mut self.columns {
            cells.clear(index);
        }
        Ok(())
    }

    /// Copies the row at `index` into a standalone row of the same structure.
    pub fn row(&self, index: usize) -> Result<MemoryRow> {
        ensure_index(index, self.num_rows)?;
        let mut row = MemoryRow::with_structure(&self.headers)?;
        for (column, cells) in self.columns.iter().enumerate() {
            row.set_raw_value(column, cells.get_raw(index))?;
        }
        row.set_weight(self.weights[index])?;
        Ok(row)
    }

    fn take_row_values(&self, row: &impl DataRow) -> Result<Vec<Option<RawValue>>> {
        let expected = self.headers.identity();
        let got = row.identity_token()?;
        if *expected != got {
            return Err(Error::different_row_structure(format!(
                "expected {}, got {}",
                expected, got
            )));
        }
        (0..self.columns.len())
            .map(|column| row.raw_value(column))
            .collect()
    }

    fn store_row_values(&mut self, index: usize, values: Vec<Option<RawValue>>) -> Result<()> {
        for (column, value) in values.into_iter().enumerate() {
            self.set_raw_value(column, index, value)?;
        }
        Ok(())
    }

    fn rows_changed(&self, operation: &str) {
        let version = self.rows_counter.bump();
        debug!(
            "{} row: {} rows, row version {}",
            operation, self.num_rows, version
        );
    }

    fn header_at(&self, column: usize) -> Result<&Header> {
        self.headers
            .get(column)
            .ok_or_else(|| Error::index_out_of_bounds(column, self.headers.len()))
    }

    fn typed_cells<D: DataType>(&self, column: usize) -> Result<&TypedCells<D::Internal>> {
        self.columns
            .get(column)
            .and_then(|cells| cells.as_any().downcast_ref())
            .ok_or_else(|| Error::type_mismatch(type_name::<D>(), column_type(&self.headers, column)))
    }

    fn typed_cells_mut<D: DataType>(
        &mut self,
        column: usize,
    ) -> Result<&mut TypedCells<D::Internal>> {
        let found = column_type(&self.headers, column);
        self.columns
            .get_mut(column)
            .and_then(|cells| cells.as_any_mut().downcast_mut())
            .ok_or_else(|| Error::type_mismatch(type_name::<D>(), found))
    }
}

fn checked_weight(weight: f64) -> Result<f64> {
    if weight.is_finite() && weight >= 0.0 {
        Ok(weight)
    } else {
        Err(Error::invalid_argument(format!(
            "row weight must be finite and not negative, got {}",
            weight
        )))
    }
}

fn column_type(headers: &MutableHeaders, column: usize) -> String {
    headers
        .get(column)
        .map_or_else(|| "no column".to_string(), |header| header.to_string())
}

impl Default for MemoryBatch {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryBatch")
            .field("headers", &self.headers)
            .field("metadata", &self.metadata)
            .field("num_rows", &self.num_rows)
            .finish()
    }
}

impl Headers for MemoryBatch {
    fn num_columns(&self) -> Result<usize> {
        self.headers.num_columns()
    }

    fn header(&self, index: usize) -> Result<Header> {
        self.headers.header(index)
    }

    fn index_of(&self, name: &str) -> Result<Option<usize>> {
        self.headers.index_of(name)
    }

    fn identity_token(&self) -> Result<HeadersIdentityToken> {
        self.headers.identity_token()
    }

    fn owned_slot(&self, slot: &Rc<RepresentationSlot>) -> Result<Option<OwnedSlot>> {
        self.headers.owned_slot(slot)
    }

    fn structure_guard(&self) -> Result<StructureGuard> {
        Ok(self.headers.structure_guard()?.and(&self.rows_counter))
    }
}

impl WithMetadata for MemoryBatch {
    fn metadata(&self) -> Result<DataMetadata> {
        Ok(self.metadata.clone())
    }
}

impl DataBatch for MemoryBatch {
    fn num_rows(&self) -> Result<usize> {
        Ok(self.num_rows)
    }

    fn get_value<D: DataType, T>(
        &self,
        representation: &Representation<D, T>,
        row_index: usize,
    ) -> Result<T> {
        let owned = self.headers.ensure_ownership(representation)?;
        let column = owned.column_index();
        ensure_index(row_index, self.num_rows)?;
        match self.typed_cells::<D>(column)?.get(row_index) {
            Some(value) => Ok(owned.from_internal(value)),
            None => Err(Error::missing_value(column, &*owned.column_name())),
        }
    }

    fn raw_value(&self, column_index: usize, row_index: usize) -> Result<Option<RawValue>> {
        ensure_index(column_index, self.columns.len())?;
        ensure_index(row_index, self.num_rows)?;
        Ok(self.columns[column_index].get_raw(row_index))
    }

    fn row_weight(&self, row_index: usize) -> Result<f64> {
        ensure_index(row_index, self.num_rows)?;
        Ok(self.weights[row_index])
    }
}

impl MutableDataBatch for MemoryBatch {
    fn set_value<D: DataType, T: fmt::Debug>(
        &mut self,
        representation: &Representation<D, T>,
        row_index: usize,
        value: T,
    ) -> Result<()> {
        let owned = self.headers.ensure_ownership(representation)?;
        ensure_index(row_index, self.num_rows)?;
        owned.validate(&value)?;
        let internal = owned.to_internal(value);
        self.typed_cells_mut::<D>(owned.column_index())?
            .set(row_index, Some(internal));
        Ok(())
    }

    fn clear_value(&mut self, column_index: usize, row_index: usize) -> Result<()> {
        let header = self.header_at(column_index)?;
        if !header.supports_missing_values() {
            return Err(Error::doesnt_support_missing_values(
                column_index,
                header.name(),
            ));
        }
        ensure_index(row_index, self.num_rows)?;
        self.columns[column_index].clear(row_index);
        Ok(())
    }

    fn set_raw_value(
        &mut self,
        column_index: usize,
        row_index: usize,
        value: Option<RawValue>,
    ) -> Result<()> {
        let header = self.header_at(column_index)?;
        if value.is_none() && !header.supports_missing_values() {
            return Err(Error::doesnt_support_missing_values(
                column_index,
                header.name(),
            ));
        }
        ensure_index(row_index, self.num_rows)?;
        if self.columns[column_index].set_raw(row_index, value) {
            Ok(())
        } else {
            Err(Error::type_mismatch(
                column_type(&self.headers, column_index),
                "raw value of another type",
            ))
        }
    }
}

impl DataStream for MemoryBatch {
    type Row = MemoryRow;

    fn rows(&self) -> Result<Box<dyn Iterator<Item = Result<MemoryRow>> + '_>> {
        Ok(Box::new((0..self.num_rows).map(move |index| self.row(index))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_core::types::{Nominal, Numeric};

    fn people() -> MemoryBatch {
        let mut batch = MemoryBatch::new();
        batch.append_column("age", Numeric::new(true), false).unwrap();
        batch
            .append_column("label", Nominal::new(false, ["no", "yes"]).unwrap(), true)
            .unwrap();
        batch.push_row();
        batch.push_row();
        batch
    }

    #[test]
    fn test_seeded_rows() {
        let batch = people();
        let age = batch.representation("age", &Numeric::CANONICAL).unwrap();
        let label = batch.representation("label", &Nominal::CANONICAL).unwrap();
        assert!(batch.is_missing(&age, 0).unwrap());
        assert_eq!(batch.get_value(&label, 1), Ok("no".to_string()));
    }

    #[test]
    fn test_set_and_get() {
        let mut batch = people();
        let age = batch.representation("age", &Numeric::CANONICAL).unwrap();
        let index = batch.representation("label", &Nominal::INDEX).unwrap();

        batch.set_value(&age, 1, 42.0).unwrap();
        batch.set_value(&index, 0, 1).unwrap();
        assert_eq!(batch.get_value(&age, 1), Ok(42.0));

        let label = batch.representation("label", &Nominal::CANONICAL).unwrap();
        assert_eq!(batch.get_value(&label, 0), Ok("yes".to_string()));
    }

    #[test]
    fn test_invalid_value() {
        let mut batch = people();
        let label = batch.representation("label", &Nominal::CANONICAL).unwrap();
        assert!(matches!(
            batch.set_value(&label, 0, "maybe".to_string()),
            Err(Error::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_clear_value() {
        let mut batch = people();
        let age = batch.representation("age", &Numeric::CANONICAL).unwrap();
        batch.set_value(&age, 0, 3.0).unwrap();
        batch.clear_value(0, 0).unwrap();
        assert!(matches!(
            batch.get_value(&age, 0),
            Err(Error::MissingValue { column: 0, .. })
        ));
        assert!(matches!(
            batch.clear_value(1, 0),
            Err(Error::DoesntSupportMissingValues { column: 1, .. })
        ));
    }

    #[test]
    fn test_row_structure_changes() {
        let mut batch = people();
        let age = batch.representation("age", &Numeric::CANONICAL).unwrap();
        batch.set_value(&age, 1, 7.0).unwrap();
        let guard = batch.structure_guard().unwrap();

        batch.insert_row(0).unwrap();
        assert!(!guard.is_current());
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.get_value(&age, 2), Ok(7.0));

        batch.delete_row(0).unwrap();
        assert_eq!(batch.get_value(&age, 1), Ok(7.0));
        assert!(matches!(
            batch.delete_row(5),
            Err(Error::IndexOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_insert_column_keeps_values() {
        let mut batch = people();
        let age = batch.representation("age", &Numeric::CANONICAL).unwrap();
        batch.set_value(&age, 0, 30.0).unwrap();

        batch
            .insert_column_with(0, "height", Numeric::new(false), false, &Numeric::CANONICAL, |row| {
                170.0 + row as f64
            })
            .unwrap();
        assert_eq!(age.column_index(), 1);
        assert_eq!(batch.get_value(&age, 0), Ok(30.0));

        let height = batch.representation("height", &Numeric::CANONICAL).unwrap();
        assert_eq!(batch.get_value(&height, 1), Ok(171.0));
    }

    #[test]
    fn test_insert_column_with_rejects_invalid() {
        let mut batch = people();
        let version = batch.structure().counter().version();
        let result = batch.insert_column_with(
            0,
            "colour",
            Nominal::new(false, ["red", "blue"]).unwrap(),
            false,
            &Nominal::CANONICAL,
            |_| "green".to_string(),
        );
        assert!(matches!(result, Err(Error::InvalidValue { .. })));
        assert_eq!(batch.structure().counter().version(), version);
        assert_eq!(batch.num_columns(), Ok(2));
    }

    #[test]
    fn test_delete_column_unowns() {
        let mut batch = people();
        let age = batch.representation("age", &Numeric::CANONICAL).unwrap();
        let label = batch.representation("label", &Nominal::CANONICAL).unwrap();

        assert_eq!(batch.delete_column(0, Some("age")), Ok("age".to_string()));
        assert!(matches!(
            batch.get_value(&age, 0),
            Err(Error::UnownedRepresentation { .. })
        ));
        assert_eq!(batch.get_value(&label, 0), Ok("no".to_string()));
    }

    #[test]
    fn test_change_column_reseeds() {
        let mut batch = people();
        let age = batch.representation("age", &Numeric::CANONICAL).unwrap();
        batch.set_value(&age, 0, 5.0).unwrap();
        batch.change_column(0, "age", Numeric::new(false), false).unwrap();

        let age = batch.representation("age", &Numeric::CANONICAL).unwrap();
        assert_eq!(batch.get_value(&age, 0), Ok(0.0));
    }

    #[test]
    fn test_rename_keeps_values() {
        let mut batch = people();
        let age = batch.representation("age", &Numeric::CANONICAL).unwrap();
        batch.set_value(&age, 0, 5.0).unwrap();
        batch.change_column_name(0, "years").unwrap();
        assert_eq!(&*age.column_name(), "years");
        assert_eq!(batch.get_value(&age, 0), Ok(5.0));
    }

    #[test]
    fn test_clear_row() {
        let mut batch = people();
        assert!(matches!(
            batch.clear_row(0),
            Err(Error::DoesntSupportMissingValues { .. })
        ));
        batch.delete_column_by_name("label", None).unwrap();
        let age = batch.representation("age", &Numeric::CANONICAL).unwrap();
        batch.set_value(&age, 0, 1.0).unwrap();
        batch.clear_row(0).unwrap();
        assert!(batch.is_missing(&age, 0).unwrap());
    }

    #[test]
    fn test_row_materialisation() {
        let mut batch = people();
        let age = batch.representation("age", &Numeric::CANONICAL).unwrap();
        batch.set_value(&age, 1, 64.0).unwrap();

        let row = batch.row(1).unwrap();
        assert!(row.same_structure(&batch).unwrap());
        assert_eq!(row.get_value(&age), Ok(64.0));

        let rows: Vec<MemoryRow> = batch.rows().unwrap().collect::<Result<_>>().unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_set_row_requires_same_structure() {
        let mut batch = people();
        let age = batch.representation("age", &Numeric::CANONICAL).unwrap();
        let mut row = batch.row(0).unwrap();
        row.set_value(&age, 12.0).unwrap();
        batch.set_row(1, &row).unwrap();
        assert_eq!(batch.get_value(&age, 1), Ok(12.0));

        let mut other = MemoryRow::new();
        other.append_column("age", Numeric::new(true), false).unwrap();
        assert!(matches!(
            batch.set_row(0, &other),
            Err(Error::DifferentRowStructure { .. })
        ));
        assert!(matches!(
            batch.push_row_from(&other),
            Err(Error::DifferentRowStructure { .. })
        ));
        assert_eq!(batch.push_row_from(&row), Ok(2));
    }

    #[test]
    fn test_with_structure() {
        let batch = people();
        let copy = MemoryBatch::with_structure(&batch, 3).unwrap();
        assert_eq!(copy.len(), 3);
        assert!(copy.same_structure(&batch).unwrap());
        let label = batch.representation("label", &Nominal::CANONICAL).unwrap();
        assert_eq!(copy.get_value(&label, 2), Ok("no".to_string()));
    }

    #[test]
    fn test_row_weights_follow_rows() {
        let mut batch = people();
        assert_eq!(batch.row_weight(0), Ok(1.0));
        batch.set_row_weight(1, 2.5).unwrap();
        batch.insert_row(0).unwrap();
        assert_eq!(batch.row_weight(0), Ok(1.0));
        assert_eq!(batch.row_weight(2), Ok(2.5));

        batch.delete_row(0).unwrap();
        assert_eq!(batch.row_weight(1), Ok(2.5));
        assert!(matches!(
            batch.row_weight(2),
            Err(Error::IndexOutOfBounds { index: 2, .. })
        ));
        assert!(matches!(
            batch.set_row_weight(0, f64::INFINITY),
            Err(Error::InvalidArgument { .. })
        ));

        batch.clear_rows();
        batch.push_row();
        assert_eq!(batch.row_weight(0), Ok(1.0));
    }

    #[test]
    fn test_row_weights_copied_with_rows() {
        let mut batch = people();
        batch.set_row_weight(0, 0.5).unwrap();
        let row = batch.row(0).unwrap();
        assert_eq!(row.weight(), Ok(0.5));

        batch.set_row(1, &row).unwrap();
        assert_eq!(batch.row_weight(1), Ok(0.5));
        let index = batch.push_row_from(&row).unwrap();
        assert_eq!(batch.row_weight(index), Ok(0.5));

        let weights = batch
            .rows()
            .unwrap()
            .map(|row| row?.weight())
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(weights, [0.5, 0.5, 0.5]);
    }

    #[test]
    fn test_metadata() {
        let mut batch = people().with_name("people");
        assert_eq!(batch.name(), Ok("people".to_string()));
        batch.set_metadata(DataMetadata::new("census"));
        assert_eq!(batch.metadata(), Ok(DataMetadata::new("census")));
        assert_eq!(MemoryBatch::with_structure(&batch, 1).unwrap().name(), Ok(String::new()));
    }
}
