//! Column headers and header collections.
//!
//! The read-only contract is the [`Headers`] trait. [`MutableHeaders`] is the
//! owning collection; [`HeadersView`] projects a subset of another
//! collection's columns without copying their bindings.

mod header;
mod identity;
mod mutable;
mod shared;
mod token;
mod view;

pub use header::{ColumnHeader, Header};
pub use identity::HeadersIdentityToken;
pub use mutable::{MutableHeaders, OwnershipToken, ReadOnlyHeaders};
pub use shared::{borrow_shared, borrow_shared_mut, shared, Shared};
pub use token::HeaderIdentityToken;
pub use view::{validate_columns, HeadersView};

use crate::error::{Error, Result};
use crate::types::{DataType, Lens, Representation, RepresentationSlot};
use crate::version::StructureGuard;
use std::rc::Rc;

/// A representation slot owned by some headers, and the local index of its
/// column in them.
#[derive(Clone, Debug)]
pub struct OwnedSlot {
    pub column: usize,
    pub slot: Rc<RepresentationSlot>,
}

impl OwnedSlot {
    pub fn new(column: usize, slot: Rc<RepresentationSlot>) -> Self {
        Self { column, slot }
    }
}

impl PartialEq for OwnedSlot {
    fn eq(&self, other: &Self) -> bool {
        self.column == other.column && Rc::ptr_eq(&self.slot, &other.slot)
    }
}

/// Read access to an ordered list of column headers.
///
/// Every method can fail: views fail with [`Error::StaleView`] once their
/// source has changed structure, and shared sources fail with
/// [`Error::ConcurrentModification`] while mutably borrowed.
pub trait Headers {
    fn num_columns(&self) -> Result<usize>;

    /// Gets the header at `index`.
    fn header(&self, index: usize) -> Result<Header>;

    /// Gets the index of the header named `name`.
    fn index_of(&self, name: &str) -> Result<Option<usize>>;

    /// Identity of the current structure.
    fn identity_token(&self) -> Result<HeadersIdentityToken>;

    /// Gets `slot` itself if these headers own it, or else the owned slot
    /// it is equivalent to.
    fn owned_slot(&self, slot: &Rc<RepresentationSlot>) -> Result<Option<OwnedSlot>>;

    /// A guard that goes stale when these headers (or anything they are
    /// projected from) change structure.
    fn structure_guard(&self) -> Result<StructureGuard>;

    fn header_by_name(&self, name: &str) -> Result<Option<Header>> {
        match self.index_of(name)? {
            Some(index) => self.header(index).map(Some),
            None => Ok(None),
        }
    }

    fn headers(&self) -> Result<Vec<Header>> {
        (0..self.num_columns()?)
            .map(|index| self.header(index))
            .collect()
    }

    /// Gets the representation for `lens` of the header named `name`.
    fn representation<D: DataType, T>(
        &self,
        name: &str,
        lens: &Lens<D, T>,
    ) -> Result<Representation<D, T>>
    where
        Self: Sized,
    {
        let header = self
            .header_by_name(name)?
            .ok_or_else(|| Error::invalid_argument(format!("No header named \"{}\"", name)))?;
        header.representation(lens)
    }

    /// Gets `representation` if owned, or its owned equivalent.
    fn owned_equivalent<D: DataType, T>(
        &self,
        representation: &Representation<D, T>,
    ) -> Result<Option<Representation<D, T>>>
    where
        Self: Sized,
    {
        match self.owned_slot(representation.slot())? {
            Some(owned) if Rc::ptr_eq(&owned.slot, representation.slot()) => {
                Ok(Some(representation.clone()))
            }
            Some(owned) => representation.with_slot(owned.slot).map(Some),
            None => Ok(None),
        }
    }

    /// Like [`Headers::owned_equivalent`], failing with
    /// [`Error::UnownedRepresentation`] if there is none.
    fn ensure_ownership<D: DataType, T>(
        &self,
        representation: &Representation<D, T>,
    ) -> Result<Representation<D, T>>
    where
        Self: Sized,
    {
        self.owned_equivalent(representation)?
            .ok_or_else(|| Error::unowned(representation))
    }

    /// Local column index of `representation` (or its owned equivalent).
    fn column_of<D: DataType, T>(&self, representation: &Representation<D, T>) -> Result<usize>
    where
        Self: Sized,
    {
        self.owned_slot(representation.slot())?
            .map(|owned| owned.column)
            .ok_or_else(|| Error::unowned(representation))
    }

    /// Whether both have the same structure.
    fn same_structure(&self, other: &impl Headers) -> Result<bool>
    where
        Self: Sized,
    {
        Ok(self.identity_token()? == other.identity_token()?)
    }
}

/// Finds the slot in `headers` equivalent to `slot`: same registration site,
/// on the header at the position and with the identity `slot` was last
/// refreshed with.
pub(crate) fn find_equivalent(
    headers: &[Header],
    slot: &RepresentationSlot,
) -> Option<OwnedSlot> {
    let token = slot.header_token()?;
    let header = headers.get(token.index())?;
    if *header.identity_token() != token {
        return None;
    }
    header
        .bound()
        .equivalent_slot(slot)
        .map(|owned| OwnedSlot::new(token.index(), owned))
}

impl<H: Headers + ?Sized> Headers for &H {
    fn num_columns(&self) -> Result<usize> {
        (**self).num_columns()
    }

    fn header(&self, index: usize) -> Result<Header> {
        (**self).header(index)
    }

    fn index_of(&self, name: &str) -> Result<Option<usize>> {
        (**self).index_of(name)
    }

    fn identity_token(&self) -> Result<HeadersIdentityToken> {
        (**self).identity_token()
    }

    fn owned_slot(&self, slot: &Rc<RepresentationSlot>) -> Result<Option<OwnedSlot>> {
        (**self).owned_slot(slot)
    }

    fn structure_guard(&self) -> Result<StructureGuard> {
        (**self).structure_guard()
    }
}

impl<H: Headers + ?Sized> Headers for &mut H {
    fn num_columns(&self) -> Result<usize> {
        (**self).num_columns()
    }

    fn header(&self, index: usize) -> Result<Header> {
        (**self).header(index)
    }

    fn index_of(&self, name: &str) -> Result<Option<usize>> {
        (**self).index_of(name)
    }

    fn identity_token(&self) -> Result<HeadersIdentityToken> {
        (**self).identity_token()
    }

    fn owned_slot(&self, slot: &Rc<RepresentationSlot>) -> Result<Option<OwnedSlot>> {
        (**self).owned_slot(slot)
    }

    fn structure_guard(&self) -> Result<StructureGuard> {
        (**self).structure_guard()
    }
}
