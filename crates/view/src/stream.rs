//! Views of streams.

use crate::row::DataRowView;
use log::trace;
use std::fmt;
use std::rc::Rc;
use tabula_core::headers::{HeadersIdentityToken, OwnedSlot};
use tabula_core::types::RepresentationSlot;
use tabula_core::{
    DataMetadata, DataStream, Header, Headers, HeadersView, Result, StructureGuard, WithMetadata,
};

/// A view of a subset of a stream's columns.
///
/// Each row the view yields is a [`DataRowView`] of the source row with the
/// stream view's names and target flags.
pub struct DataStreamView<S> {
    source: S,
    headers: HeadersView,
}

impl<S: DataStream> DataStreamView<S> {
    /// Views `columns` of `source`, or all of them if `None`.
    pub fn new(source: S, columns: Option<Vec<usize>>) -> Result<Self> {
        let headers = HeadersView::new(&source, columns)?;
        trace!("new stream view over {:?}", headers.columns());
        Ok(Self { source, headers })
    }

    /// Views the columns of `source` whose headers match `predicate`.
    pub fn with_columns(source: S, predicate: impl FnMut(&Header) -> bool) -> Result<Self> {
        let headers = HeadersView::with_columns(&source, predicate)?;
        Ok(Self { source, headers })
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn change_name(&mut self, index: usize, name: &str) -> Result<()> {
        self.headers.change_name(index, name)
    }

    pub fn change_is_target(&mut self, index: usize, is_target: bool) -> Result<()> {
        self.headers.change_is_target(index, is_target)
    }
}

impl<S: fmt::Debug> fmt::Debug for DataStreamView<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataStreamView")
            .field("source", &self.source)
            .field("headers", &self.headers)
            .finish()
    }
}

impl<S: DataStream> Headers for DataStreamView<S> {
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

impl<S: DataStream> WithMetadata for DataStreamView<S> {
    fn metadata(&self) -> Result<DataMetadata> {
        self.source.metadata()
    }
}

impl<S: DataStream> DataStream for DataStreamView<S> {
    type Row = DataRowView<S::Row>;

    fn rows(&self) -> Result<Box<dyn Iterator<Item = Result<Self::Row>> + '_>> {
        self.headers.check()?;
        let rows = self.source.rows()?;
        Ok(Box::new(rows.map(move |row| {
            let row = row?;
            let headers = self.headers.project(&row)?;
            Ok(DataRowView::with_headers(row, headers))
        })))
    }
}

/// Constructors for views of a stream.
pub trait StreamViews: DataStream {
    /// Views `columns` of this stream, or all of them if `None`.
    fn stream_view(&self, columns: Option<Vec<usize>>) -> Result<DataStreamView<&Self>> {
        DataStreamView::new(self, columns)
    }

    /// Views the columns whose headers match `predicate`.
    fn stream_view_columns(
        &self,
        predicate: impl FnMut(&Header) -> bool,
    ) -> Result<DataStreamView<&Self>> {
        DataStreamView::with_columns(self, predicate)
    }
}

impl<S: DataStream + ?Sized> StreamViews for S {}
