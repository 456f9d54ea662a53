//! Column headers.

use crate::error::{Error, Result};
use crate::headers::{HeaderIdentityToken, OwnershipToken};
use crate::types::{AnyDataType, BoundType, DataType, Lens, Representation};
use std::fmt;
use std::rc::Rc;

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Header {}
    impl Sealed for crate::headers::HeaderIdentityToken {}
}

/// Anything describing a column: a header or a header's identity.
pub trait ColumnHeader: sealed::Sealed {
    fn index(&self) -> usize;
    fn name(&self) -> &str;
    fn data_type(&self) -> &dyn AnyDataType;
    fn is_target(&self) -> bool;
    fn identity_token(&self) -> HeaderIdentityToken;

    /// Whether both describe the same column at the same position.
    fn is_equivalent_to(&self, other: &dyn ColumnHeader) -> bool {
        self.identity_token() == other.identity_token()
    }
}

/// A column header: position, name, data-type and target flag.
///
/// Headers are values; a collection replaces them on edit. The data-type
/// binding (and so the column's representations) stays with the column for
/// as long as it lives in its collection. Two headers are equal iff they
/// have the same identity token.
#[derive(Clone)]
pub struct Header {
    index: usize,
    name: Rc<str>,
    is_target: bool,
    bound: Rc<BoundType>,
    token: HeaderIdentityToken,
}

impl Header {
    /// Creates a header with a fresh binding of `data_type`.
    pub(crate) fn new(
        index: usize,
        name: Rc<str>,
        data_type: Rc<dyn AnyDataType>,
        is_target: bool,
    ) -> Self {
        let token = HeaderIdentityToken::get(index, &name, &data_type, is_target);
        Self {
            index,
            name,
            is_target,
            bound: BoundType::bind(data_type),
            token,
        }
    }

    /// A header sharing `source`'s binding under a local position and name.
    pub(crate) fn view_of(source: &Header, index: usize, name: Rc<str>, is_target: bool) -> Self {
        let token = HeaderIdentityToken::get(index, &name, &source.bound.data_type_rc(), is_target);
        Self {
            index,
            name,
            is_target,
            bound: source.bound.clone(),
            token,
        }
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn name_rc(&self) -> &Rc<str> {
        &self.name
    }

    #[inline]
    pub fn is_target(&self) -> bool {
        self.is_target
    }

    pub fn data_type(&self) -> &dyn AnyDataType {
        self.bound.data_type()
    }

    pub fn bound(&self) -> &Rc<BoundType> {
        &self.bound
    }

    #[inline]
    pub fn identity_token(&self) -> &HeaderIdentityToken {
        &self.token
    }

    pub fn supports_missing_values(&self) -> bool {
        self.bound.data_type().dyn_supports_missing_values()
    }

    /// The concrete data-type, if it is a `D`.
    pub fn typed<D: DataType>(&self) -> Option<&D> {
        self.bound.data_type().as_any().downcast_ref::<D>()
    }

    /// Gets this header's representation for `lens`.
    ///
    /// Fails with [`Error::TypeMismatch`] if `lens` belongs to another
    /// data-type.
    pub fn representation<D: DataType, T>(&self, lens: &Lens<D, T>) -> Result<Representation<D, T>> {
        let slot = self
            .bound
            .slot(lens.position())
            .ok_or_else(|| Error::type_mismatch(format!("{:?}", lens), self))?;
        Representation::from_slot(slot.clone(), *lens)
    }

    /// Gets this header's canonical representation.
    pub fn canonical<D: DataType>(&self) -> Result<Representation<D, D::External>> {
        self.representation(&D::CANONICAL)
    }

    pub(crate) fn set_index(&mut self, index: usize) {
        self.index = index;
        self.recompute_token();
    }

    pub(crate) fn set_name(&mut self, name: Rc<str>) {
        self.name = name;
        self.recompute_token();
    }

    pub(crate) fn set_is_target(&mut self, is_target: bool) {
        self.is_target = is_target;
        self.recompute_token();
    }

    /// Pushes this header's state into its representation slots.
    pub(crate) fn refresh_representations(&self, ownership: Option<&OwnershipToken>) {
        self.bound
            .refresh(self.index, &self.name, self.is_target, &self.token, ownership);
    }

    fn recompute_token(&mut self) {
        self.token = HeaderIdentityToken::get(
            self.index,
            &self.name,
            &self.bound.data_type_rc(),
            self.is_target,
        );
    }
}

impl ColumnHeader for Header {
    fn index(&self) -> usize {
        self.index
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn data_type(&self) -> &dyn AnyDataType {
        self.bound.data_type()
    }

    fn is_target(&self) -> bool {
        self.is_target
    }

    fn identity_token(&self) -> HeaderIdentityToken {
        self.token.clone()
    }
}

impl ColumnHeader for HeaderIdentityToken {
    fn index(&self) -> usize {
        HeaderIdentityToken::index(self)
    }

    fn name(&self) -> &str {
        HeaderIdentityToken::name(self)
    }

    fn data_type(&self) -> &dyn AnyDataType {
        HeaderIdentityToken::data_type(self)
    }

    fn is_target(&self) -> bool {
        HeaderIdentityToken::is_target(self)
    }

    fn identity_token(&self) -> HeaderIdentityToken {
        self.clone()
    }
}

impl PartialEq for Header {
    fn eq(&self, other: &Self) -> bool {
        self.token == other.token
    }
}

impl Eq for Header {}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.token, f)
    }
}

impl fmt::Debug for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Header({})", self.token)
    }
}
