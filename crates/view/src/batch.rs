//! Views of batches, batch rows, and rows as batches.

use crate::column::BatchColumnView;
use crate::translation::{all_columns_except, header_subset_indices, translate_row, validate_rows};
use log::trace;
use std::fmt;
use std::rc::Rc;
use tabula_core::headers::{HeadersIdentityToken, OwnedSlot};
use tabula_core::types::{RawValue, Representation, RepresentationSlot};
use tabula_core::{
    ensure_index, DataBatch, DataMetadata, DataRow, DataType, Header, Headers, HeadersView,
    MutableDataBatch, MutableDataRow, Result, StructureGuard, WithMetadata,
};

/// A view of a subset of a batch's columns and rows.
///
/// Column subsets are ordered and unique; row subsets are ordered and may
/// repeat. The view goes stale when the source changes column or row
/// structure.
pub struct DataBatchView<B> {
    source: B,
    headers: HeadersView,
    rows: Option<Vec<usize>>,
}

/// A batch view which forwards writes to its source.
pub type MutableDataBatchView<'a, B> = DataBatchView<&'a mut B>;

impl<B: DataBatch> DataBatchView<B> {
    /// Views `columns` and `rows` of `source`; `None` selects all of them.
    pub fn new(source: B, columns: Option<Vec<usize>>, rows: Option<Vec<usize>>) -> Result<Self> {
        let headers = HeadersView::new(&source, columns)?;
        if let Some(rows) = &rows {
            validate_rows(rows, source.num_rows()?)?;
        }
        trace!(
            "new batch view over columns {:?}, rows {:?}",
            headers.columns(),
            rows.as_ref().map(Vec::len)
        );
        Ok(Self {
            source,
            headers,
            rows,
        })
    }

    /// Views the columns of `source` whose headers match `predicate`.
    pub fn with_columns(source: B, predicate: impl FnMut(&Header) -> bool) -> Result<Self> {
        let headers = HeadersView::with_columns(&source, predicate)?;
        Ok(Self {
            source,
            headers,
            rows: None,
        })
    }

    pub fn source(&self) -> &B {
        &self.source
    }

    pub fn into_source(self) -> B {
        self.source
    }

    /// The selected source rows, `None` if the view selects all of them.
    pub fn rows(&self) -> Option<&[usize]> {
        self.rows.as_deref()
    }

    /// Renames a column in this view only.
    pub fn change_name(&mut self, index: usize, name: &str) -> Result<()> {
        self.headers.change_name(index, name)
    }

    /// Changes the target flag of a column in this view only.
    pub fn change_is_target(&mut self, index: usize, is_target: bool) -> Result<()> {
        self.headers.change_is_target(index, is_target)
    }

    fn source_row(&self, row_index: usize) -> Result<usize> {
        self.headers.check()?;
        match &self.rows {
            Some(rows) => translate_row(Some(rows.as_slice()), row_index),
            None => ensure_index(row_index, self.source.num_rows()?),
        }
    }
}

impl<B: fmt::Debug> fmt::Debug for DataBatchView<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataBatchView")
            .field("source", &self.source)
            .field("headers", &self.headers)
            .field("rows", &self.rows)
            .finish()
    }
}

impl<B: DataBatch> Headers for DataBatchView<B> {
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
        self.headers.structure_guard()
    }
}

impl<B: DataBatch> WithMetadata for DataBatchView<B> {
    fn metadata(&self) -> Result<DataMetadata> {
        self.source.metadata()
    }
}

impl<B: DataBatch> DataBatch for DataBatchView<B> {
    fn num_rows(&self) -> Result<usize> {
        self.headers.check()?;
        match &self.rows {
            Some(rows) => Ok(rows.len()),
            None => self.source.num_rows(),
        }
    }

    fn get_value<D: DataType, T>(
        &self,
        representation: &Representation<D, T>,
        row_index: usize,
    ) -> Result<T> {
        self.headers.column_of(representation)?;
        let row = self.source_row(row_index)?;
        self.source.get_value(representation, row)
    }

    fn raw_value(&self, column_index: usize, row_index: usize) -> Result<Option<RawValue>> {
        let column = self.headers.source_column(column_index)?;
        let row = self.source_row(row_index)?;
        self.source.raw_value(column, row)
    }

    fn row_weight(&self, row_index: usize) -> Result<f64> {
        let row = self.source_row(row_index)?;
        self.source.row_weight(row)
    }
}

impl<B: MutableDataBatch> MutableDataBatch for DataBatchView<B> {
    fn set_value<D: DataType, T: fmt::Debug>(
        &mut self,
        representation: &Representation<D, T>,
        row_index: usize,
        value: T,
    ) -> Result<()> {
        self.headers.column_of(representation)?;
        let row = self.source_row(row_index)?;
        self.source.set_value(representation, row, value)
    }

    fn clear_value(&mut self, column_index: usize, row_index: usize) -> Result<()> {
        let column = self.headers.source_column(column_index)?;
        let row = self.source_row(row_index)?;
        self.source.clear_value(column, row)
    }

    fn set_raw_value(
        &mut self,
        column_index: usize,
        row_index: usize,
        value: Option<RawValue>,
    ) -> Result<()> {
        let column = self.headers.source_column(column_index)?;
        let row = self.source_row(row_index)?;
        self.source.set_raw_value(column, row, value)
    }
}

/// One row of a batch, as a row.
pub struct BatchRowView<B> {
    source: B,
    row: usize,
    guard: StructureGuard,
}

/// A batch row view which forwards writes to its source.
pub type MutableBatchRowView<'a, B> = BatchRowView<&'a mut B>;

impl<B: DataBatch> BatchRowView<B> {
    /// Views row `row` of `source`.
    pub fn new(source: B, row: usize) -> Result<Self> {
        ensure_index(row, source.num_rows()?)?;
        let guard = source.structure_guard()?;
        Ok(Self { source, row, guard })
    }

    /// The index of the viewed row in the source.
    pub fn row_index(&self) -> usize {
        self.row
    }
}

impl<B: fmt::Debug> fmt::Debug for BatchRowView<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchRowView")
            .field("source", &self.source)
            .field("row", &self.row)
            .finish()
    }
}

impl<B: DataBatch> Headers for BatchRowView<B> {
    fn num_columns(&self) -> Result<usize> {
        self.guard.guarded(|| self.source.num_columns())
    }

    fn header(&self, index: usize) -> Result<Header> {
        self.guard.guarded(|| self.source.header(index))
    }

    fn index_of(&self, name: &str) -> Result<Option<usize>> {
        self.guard.guarded(|| self.source.index_of(name))
    }

    fn identity_token(&self) -> Result<HeadersIdentityToken> {
        self.guard.guarded(|| self.source.identity_token())
    }

    fn owned_slot(&self, slot: &Rc<RepresentationSlot>) -> Result<Option<OwnedSlot>> {
        self.guard.guarded(|| self.source.owned_slot(slot))
    }

    fn structure_guard(&self) -> Result<StructureGuard> {
        self.guard.guarded(|| Ok(self.guard.clone()))
    }
}

impl<B: DataBatch> DataRow for BatchRowView<B> {
    fn get_value<D: DataType, T>(&self, representation: &Representation<D, T>) -> Result<T> {
        self.guard
            .guarded(|| self.source.get_value(representation, self.row))
    }

    fn raw_value(&self, column_index: usize) -> Result<Option<RawValue>> {
        self.guard
            .guarded(|| self.source.raw_value(column_index, self.row))
    }

    fn weight(&self) -> Result<f64> {
        self.guard.guarded(|| self.source.row_weight(self.row))
    }
}

impl<B: MutableDataBatch> MutableDataRow for BatchRowView<B> {
    fn set_value<D: DataType, T: fmt::Debug>(
        &mut self,
        representation: &Representation<D, T>,
        value: T,
    ) -> Result<()> {
        self.guard.check()?;
        self.source.set_value(representation, self.row, value)
    }

    fn clear_value(&mut self, column_index: usize) -> Result<()> {
        self.guard.check()?;
        self.source.clear_value(column_index, self.row)
    }

    fn set_raw_value(&mut self, column_index: usize, value: Option<RawValue>) -> Result<()> {
        self.guard.check()?;
        self.source.set_raw_value(column_index, self.row, value)
    }
}

/// A row, as a batch of one row.
///
/// The batch's one row has the row's weight. Unless given, its metadata is
/// the unnamed default.
pub struct RowBatchView<R> {
    source: R,
    metadata: DataMetadata,
}

impl<R: DataRow> RowBatchView<R> {
    pub fn new(source: R) -> Self {
        Self::with_metadata(source, DataMetadata::default())
    }

    pub fn with_metadata(source: R, metadata: DataMetadata) -> Self {
        Self { source, metadata }
    }

    pub fn into_source(self) -> R {
        self.source
    }
}

impl<R: fmt::Debug> fmt::Debug for RowBatchView<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowBatchView")
            .field("source", &self.source)
            .field("metadata", &self.metadata)
            .finish()
    }
}

impl<R: DataRow> Headers for RowBatchView<R> {
    fn num_columns(&self) -> Result<usize> {
        self.source.num_columns()
    }

    fn header(&self, index: usize) -> Result<Header> {
        self.source.header(index)
    }

    fn index_of(&self, name: &str) -> Result<Option<usize>> {
        self.source.index_of(name)
    }

    fn identity_token(&self) -> Result<HeadersIdentityToken> {
        self.source.identity_token()
    }

    fn owned_slot(&self, slot: &Rc<RepresentationSlot>) -> Result<Option<OwnedSlot>> {
        self.source.owned_slot(slot)
    }

    fn structure_guard(&self) -> Result<StructureGuard> {
        self.source.structure_guard()
    }
}

impl<R: DataRow> WithMetadata for RowBatchView<R> {
    fn metadata(&self) -> Result<DataMetadata> {
        Ok(self.metadata.clone())
    }
}

impl<R: DataRow> DataBatch for RowBatchView<R> {
    fn num_rows(&self) -> Result<usize> {
        Ok(1)
    }

    fn get_value<D: DataType, T>(
        &self,
        representation: &Representation<D, T>,
        row_index: usize,
    ) -> Result<T> {
        ensure_index(row_index, 1)?;
        self.source.get_value(representation)
    }

    fn raw_value(&self, column_index: usize, row_index: usize) -> Result<Option<RawValue>> {
        ensure_index(row_index, 1)?;
        self.source.raw_value(column_index)
    }

    fn row_weight(&self, row_index: usize) -> Result<f64> {
        ensure_index(row_index, 1)?;
        self.source.weight()
    }
}

impl<R: MutableDataRow> MutableDataBatch for RowBatchView<R> {
    fn set_value<D: DataType, T: fmt::Debug>(
        &mut self,
        representation: &Representation<D, T>,
        row_index: usize,
        value: T,
    ) -> Result<()> {
        ensure_index(row_index, 1)?;
        self.source.set_value(representation, value)
    }

    fn clear_value(&mut self, column_index: usize, row_index: usize) -> Result<()> {
        ensure_index(row_index, 1)?;
        self.source.clear_value(column_index)
    }

    fn set_raw_value(
        &mut self,
        column_index: usize,
        row_index: usize,
        value: Option<RawValue>,
    ) -> Result<()> {
        ensure_index(row_index, 1)?;
        self.source.set_raw_value(column_index, value)
    }
}

/// Constructors for read-only views of a batch.
pub trait BatchViews: DataBatch {
    /// Views `columns` and `rows` of this batch; `None` selects all of them.
    fn view(
        &self,
        columns: Option<Vec<usize>>,
        rows: Option<Vec<usize>>,
    ) -> Result<DataBatchView<&Self>> {
        DataBatchView::new(self, columns, rows)
    }

    /// Views the columns whose headers match `predicate`.
    fn view_columns(
        &self,
        predicate: impl FnMut(&Header) -> bool,
    ) -> Result<DataBatchView<&Self>> {
        DataBatchView::with_columns(self, predicate)
    }

    /// Views every column but the one at `index`.
    fn view_except(&self, index: usize) -> Result<DataBatchView<&Self>> {
        DataBatchView::new(self, Some(all_columns_except(self, index)?), None)
    }

    /// Views the columns named `names`, in that order.
    fn view_named(&self, names: &[&str]) -> Result<DataBatchView<&Self>> {
        DataBatchView::new(self, Some(header_subset_indices(self, names)?), None)
    }

    fn view_rows(&self, rows: Vec<usize>) -> Result<DataBatchView<&Self>> {
        DataBatchView::new(self, None, Some(rows))
    }

    /// Views one row.
    fn row_view(&self, row: usize) -> Result<BatchRowView<&Self>> {
        BatchRowView::new(self, row)
    }

    /// Views the column of `representation`.
    fn column_view<D: DataType, T>(
        &self,
        representation: &Representation<D, T>,
    ) -> Result<BatchColumnView<&Self, D, T>> {
        BatchColumnView::new(self, representation)
    }
}

impl<B: DataBatch + ?Sized> BatchViews for B {}

/// Constructors for views which write through to a batch.
pub trait MutableBatchViews: MutableDataBatch {
    fn view_mut(
        &mut self,
        columns: Option<Vec<usize>>,
        rows: Option<Vec<usize>>,
    ) -> Result<DataBatchView<&mut Self>> {
        DataBatchView::new(self, columns, rows)
    }

    fn row_view_mut(&mut self, row: usize) -> Result<BatchRowView<&mut Self>> {
        BatchRowView::new(self, row)
    }

    fn column_view_mut<D: DataType, T>(
        &mut self,
        representation: &Representation<D, T>,
    ) -> Result<BatchColumnView<&mut Self, D, T>> {
        BatchColumnView::new(self, representation)
    }
}

impl<B: MutableDataBatch + ?Sized> MutableBatchViews for B {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::RowViews;
    use tabula_core::types::{Nominal, Numeric};
    use tabula_core::Error;
    use tabula_storage::{MemoryBatch, MemoryRow};

    fn batch() -> MemoryBatch {
        let mut batch = MemoryBatch::new();
        batch.append_column("a", Numeric::new(false), false).unwrap();
        batch.append_column("b", Numeric::new(true), false).unwrap();
        batch
            .append_column("c", Nominal::new(false, ["x", "y"]).unwrap(), true)
            .unwrap();
        let a = batch.representation("a", &Numeric::CANONICAL).unwrap();
        for i in 0..5 {
            batch.push_row();
            batch.set_value(&a, i, i as f64).unwrap();
        }
        batch
    }

    #[test]
    fn test_batch_view_translates() {
        let batch = batch();
        let a = batch.representation("a", &Numeric::CANONICAL).unwrap();
        let view = batch.view(Some(vec![2, 0]), Some(vec![4, 1, 1])).unwrap();

        assert_eq!(view.num_rows(), Ok(3));
        assert_eq!(view.num_columns(), Ok(2));
        assert_eq!(view.get_value(&a, 0), Ok(4.0));
        assert_eq!(view.get_value(&a, 2), Ok(1.0));
        assert_eq!(view.column_of(&a), Ok(1));
        assert!(matches!(
            view.get_value(&a, 3),
            Err(Error::IndexOutOfBounds { .. })
        ));

        let raw = view.raw_value(1, 0).unwrap().unwrap();
        assert_eq!(raw.downcast_ref::<f64>(), Some(&4.0));
    }

    #[test]
    fn test_batch_view_rejects_unselected() {
        let batch = batch();
        let b = batch.representation("b", &Numeric::CANONICAL).unwrap();
        let view = batch.view_except(1).unwrap();
        assert!(matches!(
            view.get_value(&b, 0),
            Err(Error::UnownedRepresentation { .. })
        ));
        assert!(matches!(
            batch.view(None, Some(vec![5])),
            Err(Error::IndexOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_mutable_batch_view() {
        let mut batch = batch();
        let b = batch.representation("b", &Numeric::CANONICAL).unwrap();
        {
            let mut view = batch.view_mut(Some(vec![1]), Some(vec![3])).unwrap();
            view.set_value(&b, 0, 9.0).unwrap();
            view.set_column(&b, vec![7.0]).unwrap();
            assert!(matches!(
                view.set_column(&b, vec![1.0, 2.0]),
                Err(Error::DifferentColumnStructure { .. })
            ));
        }
        assert_eq!(batch.get_value(&b, 3), Ok(7.0));
        assert!(batch.is_missing(&b, 2).unwrap());
    }

    #[test]
    fn test_batch_row_view() {
        let mut batch = batch();
        let a = batch.representation("a", &Numeric::CANONICAL).unwrap();
        let c = batch.representation("c", &Nominal::CANONICAL).unwrap();
        {
            let mut row = batch.row_view_mut(2).unwrap();
            assert_eq!(row.get_value(&a), Ok(2.0));
            row.set_value(&c, "y".to_string()).unwrap();
        }
        let row = batch.row_view(2).unwrap();
        assert_eq!(row.get_value(&c), Ok("y".to_string()));
        assert!(row.same_structure(&batch).unwrap());
        assert!(batch.row_view(5).is_err());
    }

    #[test]
    fn test_batch_row_view_goes_stale() {
        let batch = tabula_core::headers::shared(batch());
        let a = batch.representation("a", &Numeric::CANONICAL).unwrap();
        let row = BatchRowView::new(batch.clone(), 0).unwrap();
        assert_eq!(row.get_value(&a), Ok(0.0));

        batch.borrow_mut().delete_row(4).unwrap();
        assert_eq!(row.get_value(&a), Err(Error::StaleView));
    }

    #[test]
    fn test_row_batch_view() {
        let mut row = MemoryRow::new();
        row.append_column("x", Numeric::new(true), false).unwrap();
        let x = row.representation("x", &Numeric::CANONICAL).unwrap();
        row.set_value(&x, 1.0).unwrap();

        let batch = row.batch_view();
        assert_eq!(batch.num_rows(), Ok(1));
        assert_eq!(batch.get_value(&x, 0), Ok(1.0));
        assert!(batch.get_value(&x, 1).is_err());
    }

    #[test]
    fn test_renamed_batch_view() {
        let batch = batch();
        let mut view = batch.view_named(&["c"]).unwrap();
        view.change_name(0, "class").unwrap();
        let class = view.representation("class", &Nominal::INDEX).unwrap();
        assert_eq!(batch.get_value(&class, 0), Ok(0));
        assert_eq!(batch.index_of("class"), Ok(None));
    }

    #[test]
    fn test_views_carry_weights_and_metadata() {
        let mut batch = batch().with_name("grid");
        batch.set_row_weight(3, 4.0).unwrap();

        let view = batch.view(Some(vec![0]), Some(vec![3, 1])).unwrap();
        assert_eq!(view.name(), Ok("grid".to_string()));
        assert_eq!(view.row_weight(0), Ok(4.0));
        assert_eq!(view.row_weight(1), Ok(1.0));
        assert!(view.row_weight(2).is_err());
        assert_eq!(batch.row_view(3).unwrap().weight(), Ok(4.0));

        let mut row = MemoryRow::new();
        row.set_weight(0.5).unwrap();
        let single = row.batch_view();
        assert_eq!(single.row_weight(0), Ok(0.5));
        assert_eq!(single.name(), Ok(String::new()));
        let named = RowBatchView::with_metadata(&row, DataMetadata::new("one"));
        assert_eq!(named.name(), Ok("one".to_string()));
    }
}
