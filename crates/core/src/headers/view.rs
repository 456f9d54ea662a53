//! Read-only projections of header collections.

use crate::error::{ensure_index, Error, Result};
use crate::headers::{Header, HeaderIdentityToken, Headers, HeadersIdentityToken, OwnedSlot};
use crate::types::RepresentationSlot;
use crate::version::{ModificationCounter, StructureGuard};
use hashbrown::HashMap;
use log::trace;
use std::fmt;
use std::rc::Rc;

/// A projection of another collection's headers onto an optional ordered
/// subset of its columns.
///
/// The view shares its source's data-type bindings, so representations of
/// the source are owned by the view for the columns it selects. Local
/// renames and target changes only affect the view. Every accessor fails
/// with [`Error::StaleView`] once the source has changed structure.
pub struct HeadersView {
    headers: Vec<Header>,
    columns: Option<Vec<usize>>,
    names: HashMap<Rc<str>, usize>,
    by_binding: HashMap<HeaderIdentityToken, usize>,
    source_guard: StructureGuard,
    source_identity: HeadersIdentityToken,
    counter: ModificationCounter,
    identity: HeadersIdentityToken,
}

impl HeadersView {
    /// Creates a view of `columns` of `source`, or of every column if `None`.
    ///
    /// The columns must be in range and unique.
    pub fn new<H: Headers + ?Sized>(source: &H, columns: Option<Vec<usize>>) -> Result<Self> {
        let source_guard = source.structure_guard()?;
        let source_identity = source.identity_token()?;
        let num_source = source.num_columns()?;
        if let Some(columns) = &columns {
            validate_columns(columns, num_source)?;
        }
        let selected: Vec<usize> = match &columns {
            Some(columns) => columns.clone(),
            None => (0..num_source).collect(),
        };

        let mut headers = Vec::with_capacity(selected.len());
        let mut names = HashMap::with_capacity(selected.len());
        let mut by_binding = HashMap::with_capacity(selected.len());
        for (index, &source_index) in selected.iter().enumerate() {
            let source_header = source.header(source_index)?;
            let header = Header::view_of(
                &source_header,
                index,
                source_header.name_rc().clone(),
                source_header.is_target(),
            );
            if let Some(binding) = header.bound().header_token() {
                by_binding.insert(binding, index);
            }
            names.insert(header.name_rc().clone(), index);
            headers.push(header);
        }
        trace!("new headers view over {} of {} columns", headers.len(), num_source);

        let identity = identity_of(&headers);
        Ok(Self {
            headers,
            columns,
            names,
            by_binding,
            source_guard,
            source_identity,
            counter: ModificationCounter::new(),
            identity,
        })
    }

    /// A view of every column of `source`.
    pub fn all<H: Headers + ?Sized>(source: &H) -> Result<Self> {
        Self::new(source, None)
    }

    /// A view of the columns of `source` whose headers match `predicate`.
    pub fn with_columns<H: Headers + ?Sized>(
        source: &H,
        mut predicate: impl FnMut(&Header) -> bool,
    ) -> Result<Self> {
        let mut columns = Vec::new();
        for index in 0..source.num_columns()? {
            if predicate(&source.header(index)?) {
                columns.push(index);
            }
        }
        Self::new(source, Some(columns))
    }

    /// The selected source columns, `None` if the view selects all of them.
    pub fn columns(&self) -> Option<&[usize]> {
        self.columns.as_deref()
    }

    /// Translates a local column index to the source's.
    pub fn source_column(&self, index: usize) -> Result<usize> {
        self.source_guard.check()?;
        ensure_index(index, self.headers.len())?;
        Ok(match &self.columns {
            Some(columns) => columns[index],
            None => index,
        })
    }

    /// Fails with [`Error::StaleView`] if the source has changed structure.
    #[inline]
    pub fn check(&self) -> Result<()> {
        self.source_guard.check()
    }

    /// A view of `source` with this view's columns, names and target flags.
    ///
    /// `source` must have the structure this view was taken from, e.g. a
    /// row materialised from the same stream.
    pub fn project<H: Headers + ?Sized>(&self, source: &H) -> Result<Self> {
        self.check()?;
        if source.identity_token()? != self.source_identity {
            return Err(Error::different_row_structure(
                "source doesn't have the viewed structure",
            ));
        }
        let mut projected = Self::new(source, self.columns.clone())?;
        for (index, header) in self.headers.iter().enumerate() {
            let relabelled = Header::view_of(
                &projected.headers[index],
                index,
                header.name_rc().clone(),
                header.is_target(),
            );
            projected.headers[index] = relabelled;
        }
        projected.names = self
            .headers
            .iter()
            .map(|header| (header.name_rc().clone(), header.index()))
            .collect();
        projected.identity = identity_of(&projected.headers);
        Ok(projected)
    }

    /// Renames a column in this view only.
    pub fn change_name(&mut self, index: usize, name: &str) -> Result<()> {
        self.source_guard.check()?;
        ensure_index(index, self.headers.len())?;
        if let Some(&existing) = self.names.get(name) {
            if existing == index {
                return Ok(());
            }
            return Err(Error::invalid_argument(format!(
                "Header name \"{}\" already in use",
                name
            )));
        }
        let old = &self.headers[index];
        let renamed = Header::view_of(old, index, Rc::from(name), old.is_target());
        self.names.remove(old.name());
        self.names.insert(renamed.name_rc().clone(), index);
        self.headers[index] = renamed;
        self.changed("rename");
        Ok(())
    }

    /// Changes the target flag of a column in this view only.
    pub fn change_is_target(&mut self, index: usize, is_target: bool) -> Result<()> {
        self.source_guard.check()?;
        ensure_index(index, self.headers.len())?;
        let old = &self.headers[index];
        if old.is_target() == is_target {
            return Ok(());
        }
        let retargeted = Header::view_of(old, index, old.name_rc().clone(), is_target);
        self.headers[index] = retargeted;
        self.changed("retarget");
        Ok(())
    }

    fn changed(&mut self, operation: &str) {
        let version = self.counter.bump();
        self.identity = identity_of(&self.headers);
        trace!("headers view {}: version {}", operation, version);
    }
}

fn identity_of(headers: &[Header]) -> HeadersIdentityToken {
    HeadersIdentityToken::of(
        headers
            .iter()
            .map(|header| header.identity_token().clone())
            .collect(),
    )
}

/// Fails unless every column is below `num_columns` and none repeats.
pub fn validate_columns(columns: &[usize], num_columns: usize) -> Result<()> {
    let mut seen = vec![false; num_columns];
    for &column in columns {
        ensure_index(column, num_columns)?;
        if std::mem::replace(&mut seen[column], true) {
            return Err(Error::invalid_argument(format!(
                "Column {} selected more than once",
                column
            )));
        }
    }
    Ok(())
}

impl Headers for HeadersView {
    fn num_columns(&self) -> Result<usize> {
        self.source_guard.check()?;
        Ok(self.headers.len())
    }

    fn header(&self, index: usize) -> Result<Header> {
        self.source_guard.check()?;
        ensure_index(index, self.headers.len())?;
        Ok(self.headers[index].clone())
    }

    fn index_of(&self, name: &str) -> Result<Option<usize>> {
        self.source_guard.check()?;
        Ok(self.names.get(name).copied())
    }

    fn identity_token(&self) -> Result<HeadersIdentityToken> {
        self.source_guard.check()?;
        Ok(self.identity.clone())
    }

    fn owned_slot(&self, slot: &Rc<RepresentationSlot>) -> Result<Option<OwnedSlot>> {
        self.source_guard.check()?;
        let binding = match slot.header_token() {
            Some(binding) => binding,
            None => return Ok(None),
        };
        Ok(self.by_binding.get(&binding).and_then(|&index| {
            self.headers[index]
                .bound()
                .equivalent_slot(slot)
                .map(|owned| OwnedSlot::new(index, owned))
        }))
    }

    fn structure_guard(&self) -> Result<StructureGuard> {
        self.source_guard.check()?;
        Ok(self.source_guard.clone().and(&self.counter))
    }
}

impl fmt::Debug for HeadersView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadersView")
            .field("columns", &self.columns)
            .field("headers", &self.headers)
            .field("stale", &!self.source_guard.is_current())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headers::MutableHeaders;
    use crate::types::{Nominal, Numeric};

    fn source() -> MutableHeaders {
        let mut headers = MutableHeaders::new();
        headers.append("age", Numeric::new(true), false).unwrap();
        headers.append("height", Numeric::new(true), false).unwrap();
        headers
            .append("label", Nominal::new(false, ["a", "b"]).unwrap(), true)
            .unwrap();
        headers
    }

    #[test]
    fn test_projection() {
        let headers = source();
        let view = HeadersView::new(&headers, Some(vec![2, 0])).unwrap();
        assert_eq!(view.num_columns(), Ok(2));
        assert_eq!(view.header(0).unwrap().name(), "label");
        assert_eq!(view.header(1).unwrap().index(), 1);
        assert_eq!(view.index_of("age"), Ok(Some(1)));
        assert_eq!(view.index_of("height"), Ok(None));
        assert_eq!(view.source_column(0), Ok(2));
    }

    #[test]
    fn test_invalid_columns() {
        let headers = source();
        assert!(matches!(
            HeadersView::new(&headers, Some(vec![0, 0])),
            Err(Error::InvalidArgument { .. })
        ));
        assert!(matches!(
            HeadersView::new(&headers, Some(vec![3])),
            Err(Error::IndexOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_owns_source_representations() {
        let headers = source();
        let label = headers.get(2).unwrap().canonical::<Nominal>().unwrap();
        let age = headers.get(0).unwrap().canonical::<Numeric>().unwrap();
        let view = HeadersView::new(&headers, Some(vec![2])).unwrap();

        assert_eq!(view.column_of(&label), Ok(0));
        assert!(matches!(
            view.ensure_ownership(&age),
            Err(Error::UnownedRepresentation { .. })
        ));
    }

    #[test]
    fn test_stale_after_source_change() {
        let mut headers = source();
        let view = HeadersView::all(&headers).unwrap();
        let guard = view.structure_guard().unwrap();
        headers.append("weight", Numeric::new(true), false).unwrap();

        // the view holds a snapshot, so it can outlive the borrow
        assert_eq!(view.num_columns(), Err(Error::StaleView));
        assert_eq!(view.header(0).map(|_| ()), Err(Error::StaleView));
        assert!(!guard.is_current());
    }

    #[test]
    fn test_local_rename() {
        let headers = source();
        let mut view = HeadersView::all(&headers).unwrap();
        let guard = view.structure_guard().unwrap();
        view.change_name(0, "years").unwrap();

        assert_eq!(view.index_of("years"), Ok(Some(0)));
        assert_eq!(headers.index_of("years"), Ok(None));
        assert_eq!(headers.get(0).unwrap().name(), "age");
        assert!(!guard.is_current());
        assert!(matches!(
            view.change_name(1, "years"),
            Err(Error::InvalidArgument { .. })
        ));

        let age = headers.get(0).unwrap().canonical::<Numeric>().unwrap();
        assert_eq!(view.column_of(&age), Ok(0));
    }

    #[test]
    fn test_structure_matches_source() {
        let headers = source();
        let view = HeadersView::all(&headers).unwrap();
        assert!(view.same_structure(&headers).unwrap());

        let mut retargeted = HeadersView::all(&headers).unwrap();
        retargeted.change_is_target(0, true).unwrap();
        assert!(!retargeted.same_structure(&headers).unwrap());
    }

    #[test]
    fn test_with_columns() {
        let headers = source();
        let view = HeadersView::with_columns(&headers, |header| !header.is_target()).unwrap();
        assert_eq!(view.columns(), Some(&[0, 1][..]));
    }

    #[test]
    fn test_view_of_view() {
        let headers = source();
        let outer = HeadersView::new(&headers, Some(vec![1, 2])).unwrap();
        let inner = HeadersView::new(&outer, Some(vec![1])).unwrap();
        let label = headers.get(2).unwrap().canonical::<Nominal>().unwrap();
        assert_eq!(inner.column_of(&label), Ok(0));
        assert_eq!(inner.header(0).unwrap().name(), "label");
    }

    #[test]
    fn test_project_onto_equal_structure() {
        let headers = source();
        let mut view = HeadersView::new(&headers, Some(vec![0, 2])).unwrap();
        view.change_name(0, "years").unwrap();

        let copy = MutableHeaders::from_headers(&headers).unwrap();
        let projected = view.project(&copy).unwrap();
        assert_eq!(projected.index_of("years"), Ok(Some(0)));
        assert_eq!(projected.source_column(1), Ok(2));
        assert!(projected.same_structure(&view).unwrap());

        let label = copy.get(2).unwrap().canonical::<Nominal>().unwrap();
        assert_eq!(projected.column_of(&label), Ok(1));

        let mut other = MutableHeaders::new();
        other.append("age", Numeric::new(true), false).unwrap();
        assert!(matches!(
            view.project(&other),
            Err(Error::DifferentRowStructure { .. })
        ));
    }
}
