//! Views of rows.

use crate::batch::RowBatchView;
use crate::column::RowColumnView;
use crate::translation::{all_columns_except, header_subset_indices};
use log::trace;
use std::fmt;
use std::rc::Rc;
use tabula_core::headers::{HeadersIdentityToken, OwnedSlot};
use tabula_core::types::{RawValue, Representation, RepresentationSlot};
use tabula_core::{
    DataRow, DataType, Header, Headers, HeadersView, MutableDataRow, Result, StructureGuard,
};

/// A view of a subset of a row's columns, with its own names and target
/// flags.
///
/// The view owns the source's representations for the columns it selects.
/// Every access fails with `StaleView` once the source changes structure.
pub struct DataRowView<R> {
    source: R,
    headers: HeadersView,
}

/// A row view which forwards writes to its source.
pub type MutableDataRowView<'a, R> = DataRowView<&'a mut R>;

impl<R: DataRow> DataRowView<R> {
    /// Views `columns` of `source`, or all of them if `None`.
    pub fn new(source: R, columns: Option<Vec<usize>>) -> Result<Self> {
        let headers = HeadersView::new(&source, columns)?;
        trace!("new row view over {:?}", headers.columns());
        Ok(Self { source, headers })
    }

    /// Views the columns of `source` whose headers match `predicate`.
    pub fn with_columns(source: R, predicate: impl FnMut(&Header) -> bool) -> Result<Self> {
        let headers = HeadersView::with_columns(&source, predicate)?;
        Ok(Self { source, headers })
    }

    pub(crate) fn with_headers(source: R, headers: HeadersView) -> Self {
        Self { source, headers }
    }

    pub fn source(&self) -> &R {
        &self.source
    }

    pub fn into_source(self) -> R {
        self.source
    }

    /// The view's headers.
    pub fn view_headers(&self) -> &HeadersView {
        &self.headers
    }

    /// Renames a column in this view only.
    pub fn change_name(&mut self, index: usize, name: &str) -> Result<()> {
        self.headers.change_name(index, name)
    }

    /// Changes the target flag of a column in this view only.
    pub fn change_is_target(&mut self, index: usize, is_target: bool) -> Result<()> {
        self.headers.change_is_target(index, is_target)
    }
}

impl<R: fmt::Debug> fmt::Debug for DataRowView<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataRowView")
            .field("source", &self.source)
            .field("headers", &self.headers)
            .finish()
    }
}

impl<R: DataRow> Headers for DataRowView<R> {
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

impl<R: DataRow> DataRow for DataRowView<R> {
    fn get_value<D: DataType, T>(&self, representation: &Representation<D, T>) -> Result<T> {
        self.headers.column_of(representation)?;
        self.source.get_value(representation)
    }

    fn raw_value(&self, column_index: usize) -> Result<Option<RawValue>> {
        let column = self.headers.source_column(column_index)?;
        self.source.raw_value(column)
    }

    fn weight(&self) -> Result<f64> {
        self.headers.check()?;
        self.source.weight()
    }
}

impl<R: MutableDataRow> MutableDataRow for DataRowView<R> {
    fn set_value<D: DataType, T: fmt::Debug>(
        &mut self,
        representation: &Representation<D, T>,
        value: T,
    ) -> Result<()> {
        self.headers.column_of(representation)?;
        self.source.set_value(representation, value)
    }

    fn clear_value(&mut self, column_index: usize) -> Result<()> {
        let column = self.headers.source_column(column_index)?;
        self.source.clear_value(column)
    }

    fn set_raw_value(&mut self, column_index: usize, value: Option<RawValue>) -> Result<()> {
        let column = self.headers.source_column(column_index)?;
        self.source.set_raw_value(column, value)
    }
}

/// Constructors for read-only views of a row.
pub trait RowViews: DataRow {
    /// Views `columns` of this row, or all of them if `None`.
    fn view(&self, columns: Option<Vec<usize>>) -> Result<DataRowView<&Self>> {
        DataRowView::new(self, columns)
    }

    /// Views the columns whose headers match `predicate`.
    fn view_columns(&self, predicate: impl FnMut(&Header) -> bool) -> Result<DataRowView<&Self>> {
        DataRowView::with_columns(self, predicate)
    }

    /// Views every column but the one at `index`.
    fn view_except(&self, index: usize) -> Result<DataRowView<&Self>> {
        DataRowView::new(self, Some(all_columns_except(self, index)?))
    }

    /// Views the columns named `names`, in that order.
    fn view_named(&self, names: &[&str]) -> Result<DataRowView<&Self>> {
        DataRowView::new(self, Some(header_subset_indices(self, names)?))
    }

    /// Views the column of `representation` as a column of one value.
    fn column_view<D: DataType, T>(
        &self,
        representation: &Representation<D, T>,
    ) -> Result<RowColumnView<&Self, D, T>> {
        RowColumnView::new(self, representation)
    }

    /// Views this row as a batch of one row.
    fn batch_view(&self) -> RowBatchView<&Self> {
        RowBatchView::new(self)
    }
}

impl<R: DataRow + ?Sized> RowViews for R {}

/// Constructors for views which write through to a row.
pub trait MutableRowViews: MutableDataRow {
    fn view_mut(&mut self, columns: Option<Vec<usize>>) -> Result<DataRowView<&mut Self>> {
        DataRowView::new(self, columns)
    }

    fn column_view_mut<D: DataType, T>(
        &mut self,
        representation: &Representation<D, T>,
    ) -> Result<RowColumnView<&mut Self, D, T>> {
        RowColumnView::new(self, representation)
    }

    fn batch_view_mut(&mut self) -> RowBatchView<&mut Self> {
        RowBatchView::new(self)
    }
}

impl<R: MutableDataRow + ?Sized> MutableRowViews for R {}
