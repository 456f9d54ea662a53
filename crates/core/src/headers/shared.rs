//! Shared, interiorly mutable sources.
//!
//! A source which is written to while views over it stay alive is held as a
//! [`Shared`]. Views read through `try_borrow`, so a read during an ongoing
//! write fails instead of panicking.

use crate::error::{Error, Result};
use crate::headers::{Header, Headers, HeadersIdentityToken, OwnedSlot};
use crate::types::RepresentationSlot;
use crate::version::StructureGuard;
use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

/// A source shared between a writer and its views.
pub type Shared<T> = Rc<RefCell<T>>;

/// Wraps `value` for sharing.
pub fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}

/// Borrows a shared source for reading.
#[inline]
pub fn borrow_shared<T: ?Sized>(cell: &RefCell<T>) -> Result<Ref<'_, T>> {
    cell.try_borrow().map_err(|_| Error::ConcurrentModification)
}

/// Borrows a shared source for writing.
#[inline]
pub fn borrow_shared_mut<T: ?Sized>(cell: &RefCell<T>) -> Result<RefMut<'_, T>> {
    cell.try_borrow_mut()
        .map_err(|_| Error::ConcurrentModification)
}

impl<H: Headers + ?Sized> Headers for Rc<RefCell<H>> {
    fn num_columns(&self) -> Result<usize> {
        borrow_shared(self)?.num_columns()
    }

    fn header(&self, index: usize) -> Result<Header> {
        borrow_shared(self)?.header(index)
    }

    fn index_of(&self, name: &str) -> Result<Option<usize>> {
        borrow_shared(self)?.index_of(name)
    }

    fn identity_token(&self) -> Result<HeadersIdentityToken> {
        borrow_shared(self)?.identity_token()
    }

    fn owned_slot(&self, slot: &Rc<RepresentationSlot>) -> Result<Option<OwnedSlot>> {
        borrow_shared(self)?.owned_slot(slot)
    }

    fn structure_guard(&self) -> Result<StructureGuard> {
        borrow_shared(self)?.structure_guard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headers::MutableHeaders;
    use crate::types::Numeric;

    #[test]
    fn test_shared_headers() {
        let headers = shared(MutableHeaders::new());
        headers
            .borrow_mut()
            .append("x", Numeric::new(true), false)
            .unwrap();
        assert_eq!(headers.num_columns(), Ok(1));
        assert_eq!(headers.index_of("x"), Ok(Some(0)));
    }

    #[test]
    fn test_concurrent_modification() {
        let headers = shared(MutableHeaders::new());
        let _writer = headers.borrow_mut();
        assert_eq!(headers.num_columns(), Err(Error::ConcurrentModification));
    }
}
