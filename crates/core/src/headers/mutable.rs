//! The mutable header collection.

use crate::error::{ensure_index, Error, Result};
use crate::headers::{find_equivalent, Header, Headers, HeadersIdentityToken, OwnedSlot};
use crate::types::{AnyDataType, DataType, RepresentationSlot};
use crate::version::{ModificationCounter, StructureGuard};
use hashbrown::HashMap;
use log::debug;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

thread_local! {
    static NEXT_OWNER: Cell<u64> = const { Cell::new(0) };
}

#[derive(Debug)]
struct Owner {
    id: u64,
}

/// Marks the collection that owns a set of representations.
///
/// Each [`MutableHeaders`] has exactly one; comparison is by pointer.
#[derive(Clone, Debug)]
pub struct OwnershipToken(Rc<Owner>);

impl OwnershipToken {
    pub fn new() -> Self {
        let id = NEXT_OWNER.with(|next| {
            let id = next.get();
            next.set(id.wrapping_add(1));
            id
        });
        Self(Rc::new(Owner { id }))
    }
}

impl Default for OwnershipToken {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for OwnershipToken {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for OwnershipToken {}

impl fmt::Display for OwnershipToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "owner#{}", self.0.id)
    }
}

/// An ordered, uniquely named list of column headers.
///
/// Every structural edit bumps the modification counter, recomputes the
/// identity token and refreshes the cached state of every surviving
/// representation; removed headers have their representations detached.
pub struct MutableHeaders {
    headers: Vec<Header>,
    names: HashMap<Rc<str>, usize>,
    ownership: OwnershipToken,
    counter: ModificationCounter,
    identity: HeadersIdentityToken,
}

impl MutableHeaders {
    /// Create a new empty collection
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            headers: Vec::with_capacity(capacity),
            names: HashMap::with_capacity(capacity),
            ownership: OwnershipToken::new(),
            counter: ModificationCounter::new(),
            identity: HeadersIdentityToken::empty(),
        }
    }

    /// Creates a collection with the same structure as `source`, with fresh
    /// representations.
    pub fn from_headers(source: &impl Headers) -> Result<Self> {
        let headers = source.headers()?;
        let mut result = Self::with_capacity(headers.len());
        for header in headers {
            result.append_any(header.name(), header.bound().data_type_rc(), header.is_target())?;
        }
        Ok(result)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Header> {
        self.headers.get(index)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&Header> {
        self.names.get(name).map(|&index| &self.headers[index])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Header> {
        self.headers.iter()
    }

    pub fn ownership_token(&self) -> &OwnershipToken {
        &self.ownership
    }

    pub fn counter(&self) -> &ModificationCounter {
        &self.counter
    }

    pub fn identity(&self) -> &HeadersIdentityToken {
        &self.identity
    }

    /// A view which delegates every query straight to this collection.
    pub fn read_only(&self) -> ReadOnlyHeaders<'_> {
        ReadOnlyHeaders { source: self }
    }

    /// Checks that a header named `name` could be inserted at `index`.
    pub fn check_insert(&self, index: usize, name: &str) -> Result<()> {
        if index > self.headers.len() {
            return Err(Error::index_out_of_bounds(index, self.headers.len() + 1));
        }
        self.check_name_free(name, None)
    }

    /// Checks that the header at `index` could be replaced by one named `name`.
    pub fn check_set(&self, index: usize, name: &str) -> Result<()> {
        ensure_index(index, self.headers.len())?;
        self.check_name_free(name, Some(index))
    }

    /// Checks that the header at `index` could be deleted, returning its name.
    ///
    /// If `name` is given it must be the name of that header.
    pub fn check_delete(&self, index: usize, name: Option<&str>) -> Result<String> {
        ensure_index(index, self.headers.len())?;
        let actual = self.headers[index].name();
        match name {
            Some(name) if name != actual => Err(Error::invalid_argument(format!(
                "Header at {} is \"{}\", not \"{}\"",
                index, actual, name
            ))),
            _ => Ok(actual.to_string()),
        }
    }

    /// Checks that the header named `name` could be deleted, returning its
    /// index.
    ///
    /// If `index` is given it must be the index of that header.
    pub fn check_delete_by_name(&self, name: &str, index: Option<usize>) -> Result<usize> {
        let actual = self
            .names
            .get(name)
            .copied()
            .ok_or_else(|| Error::invalid_argument(format!("No header named \"{}\"", name)))?;
        match index {
            Some(index) if index != actual => Err(Error::invalid_argument(format!(
                "Header \"{}\" is at {}, not {}",
                name, actual, index
            ))),
            _ => Ok(actual),
        }
    }

    pub fn insert<D: DataType>(
        &mut self,
        index: usize,
        name: &str,
        data_type: D,
        is_target: bool,
    ) -> Result<()> {
        self.insert_any(index, name, Rc::new(data_type), is_target)
    }

    /// Inserts a header, shifting later headers up by one.
    pub fn insert_any(
        &mut self,
        index: usize,
        name: &str,
        data_type: Rc<dyn AnyDataType>,
        is_target: bool,
    ) -> Result<()> {
        self.check_insert(index, name)?;
        self.change_structure("insert", |this| {
            let header = Header::new(index, Rc::from(name), data_type, is_target);
            this.headers.insert(index, header);
            this.reindex_from(index);
        });
        Ok(())
    }

    pub fn append<D: DataType>(&mut self, name: &str, data_type: D, is_target: bool) -> Result<()> {
        self.insert(self.headers.len(), name, data_type, is_target)
    }

    pub fn append_any(
        &mut self,
        name: &str,
        data_type: Rc<dyn AnyDataType>,
        is_target: bool,
    ) -> Result<()> {
        self.insert_any(self.headers.len(), name, data_type, is_target)
    }

    /// Deletes the header at `index`, returning its name.
    pub fn delete(&mut self, index: usize, name: Option<&str>) -> Result<String> {
        let name = self.check_delete(index, name)?;
        self.remove_at(index);
        Ok(name)
    }

    /// Deletes the header named `name`, returning its index.
    pub fn delete_by_name(&mut self, name: &str, index: Option<usize>) -> Result<usize> {
        let index = self.check_delete_by_name(name, index)?;
        self.remove_at(index);
        Ok(index)
    }

    pub fn set<D: DataType>(
        &mut self,
        index: usize,
        name: &str,
        data_type: D,
        is_target: bool,
    ) -> Result<()> {
        self.set_any(index, name, Rc::new(data_type), is_target)
    }

    /// Replaces the header at `index` with a new one.
    ///
    /// The replaced header's representations are detached, even if the new
    /// header is structurally identical.
    pub fn set_any(
        &mut self,
        index: usize,
        name: &str,
        data_type: Rc<dyn AnyDataType>,
        is_target: bool,
    ) -> Result<()> {
        self.check_set(index, name)?;
        self.change_structure("set", |this| {
            let header = Header::new(index, Rc::from(name), data_type, is_target);
            let old = std::mem::replace(&mut this.headers[index], header);
            this.names.remove(old.name());
            old.bound().detach();
            this.reindex_from(index);
        });
        Ok(())
    }

    /// Renames the header at `index`. Does nothing if the name is unchanged.
    pub fn change_name(&mut self, index: usize, name: &str) -> Result<()> {
        self.check_set(index, name)?;
        if self.headers[index].name() == name {
            return Ok(());
        }
        self.change_structure("rename", |this| {
            let old = this.headers[index].name_rc().clone();
            this.names.remove(&old);
            this.headers[index].set_name(Rc::from(name));
            this.reindex_from(index);
        });
        Ok(())
    }

    /// Changes whether the header at `index` is a target. Does nothing if
    /// the flag is unchanged.
    pub fn change_is_target(&mut self, index: usize, is_target: bool) -> Result<()> {
        ensure_index(index, self.headers.len())?;
        if self.headers[index].is_target() == is_target {
            return Ok(());
        }
        self.change_structure("retarget", |this| {
            this.headers[index].set_is_target(is_target);
            this.reindex_from(index);
        });
        Ok(())
    }

    /// Removes every header.
    pub fn clear(&mut self) {
        self.change_structure("clear", |this| {
            for header in this.headers.drain(..) {
                header.bound().detach();
            }
            this.names.clear();
        });
    }

    fn remove_at(&mut self, index: usize) {
        self.change_structure("delete", |this| {
            let old = this.headers.remove(index);
            this.names.remove(old.name());
            old.bound().detach();
            this.reindex_from(index);
        });
    }

    fn check_name_free(&self, name: &str, replacing: Option<usize>) -> Result<()> {
        match self.names.get(name) {
            Some(&existing) if Some(existing) != replacing => Err(Error::invalid_argument(
                format!("Header name \"{}\" already in use", name),
            )),
            _ => Ok(()),
        }
    }

    /// Renumbers headers from `start` on and refreshes their representations.
    fn reindex_from(&mut self, start: usize) {
        let Self {
            headers,
            names,
            ownership,
            ..
        } = self;
        for (index, header) in headers.iter_mut().enumerate().skip(start) {
            if header.index() != index {
                header.set_index(index);
            }
            names.insert(header.name_rc().clone(), index);
            header.refresh_representations(Some(&*ownership));
        }
    }

    /// Runs a structural edit and publishes its effects.
    fn change_structure<R>(&mut self, operation: &str, block: impl FnOnce(&mut Self) -> R) -> R {
        let result = block(self);
        let version = self.counter.bump();
        self.identity = HeadersIdentityToken::of(
            self.headers
                .iter()
                .map(|header| header.identity_token().clone())
                .collect(),
        );
        debug!(
            "headers {} {}: {} columns, version {}",
            self.ownership,
            operation,
            self.headers.len(),
            version
        );
        result
    }
}

impl Default for MutableHeaders {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MutableHeaders {
    fn drop(&mut self) {
        for header in &self.headers {
            header.bound().detach();
        }
    }
}

impl fmt::Debug for MutableHeaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutableHeaders")
            .field("ownership", &self.ownership)
            .field("version", &self.counter.version())
            .field("headers", &self.headers)
            .finish()
    }
}

impl Headers for MutableHeaders {
    fn num_columns(&self) -> Result<usize> {
        Ok(self.headers.len())
    }

    fn header(&self, index: usize) -> Result<Header> {
        ensure_index(index, self.headers.len())?;
        Ok(self.headers[index].clone())
    }

    fn index_of(&self, name: &str) -> Result<Option<usize>> {
        Ok(self.names.get(name).copied())
    }

    fn identity_token(&self) -> Result<HeadersIdentityToken> {
        Ok(self.identity.clone())
    }

    fn owned_slot(&self, slot: &Rc<RepresentationSlot>) -> Result<Option<OwnedSlot>> {
        if slot.is_owned_by(&self.ownership) {
            let column = slot.column_index();
            return Ok(Some(OwnedSlot::new(column, slot.clone())));
        }
        if !self.identity.owns_equivalent(slot) {
            return Ok(None);
        }
        Ok(find_equivalent(&self.headers, slot))
    }

    fn structure_guard(&self) -> Result<StructureGuard> {
        Ok(StructureGuard::of(&self.counter))
    }
}

/// Read-only access to a [`MutableHeaders`].
#[derive(Clone, Copy, Debug)]
pub struct ReadOnlyHeaders<'a> {
    source: &'a MutableHeaders,
}

impl Headers for ReadOnlyHeaders<'_> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Nominal, Numeric};

    fn age_height() -> MutableHeaders {
        let mut headers = MutableHeaders::new();
        headers.append("age", Numeric::new(true), false).unwrap();
        headers.append("height", Numeric::new(true), false).unwrap();
        headers
    }

    #[test]
    fn test_insert_renumbers() {
        let mut headers = age_height();
        let height = headers
            .get(1)
            .unwrap()
            .canonical::<Numeric>()
            .unwrap();
        assert_eq!(height.column_index(), 1);

        headers
            .insert(0, "label", Nominal::new(false, ["a", "b"]).unwrap(), true)
            .unwrap();
        assert_eq!(height.column_index(), 2);
        assert_eq!(headers.index_of("height"), Ok(Some(2)));
        assert_eq!(headers.index_of("label"), Ok(Some(0)));
        assert!(headers.get(0).unwrap().is_target());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut headers = age_height();
        let version = headers.counter().version();
        let result = headers.append("age", Numeric::new(false), false);
        assert!(matches!(result, Err(Error::InvalidArgument { .. })));
        assert_eq!(headers.counter().version(), version);
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn test_insert_out_of_range() {
        let mut headers = age_height();
        let result = headers.insert(3, "x", Numeric::new(true), false);
        assert!(matches!(result, Err(Error::IndexOutOfBounds { .. })));
    }

    #[test]
    fn test_delete_detaches() {
        let mut headers = age_height();
        let age = headers.get(0).unwrap().canonical::<Numeric>().unwrap();
        let height = headers.get(1).unwrap().canonical::<Numeric>().unwrap();

        assert_eq!(headers.delete(0, Some("age")), Ok("age".to_string()));
        assert!(age.ownership_token().is_none());
        assert_eq!(height.column_index(), 0);
        assert_eq!(headers.owned_slot(age.slot()).unwrap(), None);
    }

    #[test]
    fn test_delete_checks_name() {
        let mut headers = age_height();
        assert!(matches!(
            headers.delete(0, Some("height")),
            Err(Error::InvalidArgument { .. })
        ));
        assert!(matches!(
            headers.delete_by_name("age", Some(1)),
            Err(Error::InvalidArgument { .. })
        ));
        assert_eq!(headers.delete_by_name("height", None), Ok(1));
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn test_set_replaces_representations() {
        let mut headers = age_height();
        let before = headers.get(1).unwrap().canonical::<Numeric>().unwrap();
        headers.set(1, "height", Numeric::new(true), false).unwrap();
        let after = headers.get(1).unwrap().canonical::<Numeric>().unwrap();

        assert!(before.ownership_token().is_none());
        assert!(before != after);
        let equivalent = headers.owned_equivalent(&before).unwrap();
        assert_eq!(equivalent, Some(after));
    }

    #[test]
    fn test_set_rejects_name_of_other_header() {
        let mut headers = age_height();
        assert!(matches!(
            headers.set(1, "age", Numeric::new(true), false),
            Err(Error::InvalidArgument { .. })
        ));
        assert!(headers.check_set(1, "height").is_ok());
    }

    #[test]
    fn test_change_name() {
        let mut headers = age_height();
        let age = headers.get(0).unwrap().canonical::<Numeric>().unwrap();
        let identity = headers.identity().clone();

        headers.change_name(0, "years").unwrap();
        assert_eq!(&*age.column_name(), "years");
        assert_eq!(headers.index_of("age"), Ok(None));
        assert_eq!(headers.index_of("years"), Ok(Some(0)));
        assert_ne!(headers.identity(), &identity);

        let version = headers.counter().version();
        headers.change_name(0, "years").unwrap();
        assert_eq!(headers.counter().version(), version);
    }

    #[test]
    fn test_change_is_target() {
        let mut headers = age_height();
        let version = headers.counter().version();
        headers.change_is_target(1, false).unwrap();
        assert_eq!(headers.counter().version(), version);

        headers.change_is_target(1, true).unwrap();
        assert!(headers.get(1).unwrap().is_target());
        assert_eq!(headers.counter().version(), version + 1);
    }

    #[test]
    fn test_clear() {
        let mut headers = age_height();
        let age = headers.get(0).unwrap().canonical::<Numeric>().unwrap();
        headers.clear();
        assert!(headers.is_empty());
        assert!(age.ownership_token().is_none());
        assert_eq!(headers.identity(), &HeadersIdentityToken::empty());
    }

    #[test]
    fn test_equal_structures_share_identity() {
        let a = age_height();
        let b = age_height();
        assert_eq!(a.identity(), b.identity());
        assert!(a.same_structure(&b).unwrap());
        assert_ne!(a.ownership_token(), b.ownership_token());
    }

    #[test]
    fn test_equivalent_representation_across_collections() {
        let a = age_height();
        let b = age_height();
        let height_in_a = a.get(1).unwrap().canonical::<Numeric>().unwrap();

        let in_b = b.ensure_ownership(&height_in_a).unwrap();
        assert_eq!(in_b.ownership_token().as_ref(), Some(b.ownership_token()));
        assert_eq!(in_b.column_index(), 1);
        assert!(in_b.is_equivalent_to(&height_in_a));

        let mut c = MutableHeaders::new();
        c.append("height", Numeric::new(true), false).unwrap();
        assert!(matches!(
            c.ensure_ownership(&height_in_a),
            Err(Error::UnownedRepresentation { .. })
        ));
    }

    #[test]
    fn test_read_only_delegates() {
        let mut headers = age_height();
        {
            let read_only = headers.read_only();
            assert_eq!(read_only.num_columns(), Ok(2));
            assert_eq!(read_only.identity_token(), headers.identity_token());
        }
        headers.append("weight", Numeric::new(true), false).unwrap();
        assert_eq!(headers.read_only().num_columns(), Ok(3));
    }

    #[test]
    fn test_from_headers_copies_structure() {
        let headers = age_height();
        let copy = MutableHeaders::from_headers(&headers).unwrap();
        assert_eq!(copy.identity(), headers.identity());
        assert_ne!(copy.ownership_token(), headers.ownership_token());
    }
}
