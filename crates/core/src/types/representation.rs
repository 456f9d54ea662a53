//! Representations: typed, ownership-tracked access to a column's values.
//!
//! A data-type declares its representations as [`Lens`] constants. When a
//! header is created, its data-type is bound into a [`BoundType`] holding one
//! [`RepresentationSlot`] per declared lens, in registration order. A
//! [`Representation`] is a lens paired with one such slot; the slot carries
//! the owning header's current position, name and ownership token, which the
//! owning collection refreshes after every structural edit.

use crate::cache::WeakCache;
use crate::error::{Error, Result};
use crate::headers::{HeaderIdentityToken, OwnershipToken};
use crate::types::{AnyDataType, DataType, FiniteDataType};
use log::trace;
use rand::Rng;
use std::any::{type_name, Any, TypeId};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A representation declared by a data-type: how to convert between values
/// of type `T` and the type's internal values.
pub struct Lens<D: DataType, T> {
    position: usize,
    to_internal: fn(&D, T) -> D::Internal,
    to_presented: fn(&D, &D::Internal) -> T,
    is_valid: fn(&D, &T) -> bool,
}

impl<D: DataType, T> Lens<D, T> {
    /// Declares a lens at registration `position` of `D`.
    pub const fn new(
        position: usize,
        to_internal: fn(&D, T) -> D::Internal,
        to_presented: fn(&D, &D::Internal) -> T,
        is_valid: fn(&D, &T) -> bool,
    ) -> Self {
        Self {
            position,
            to_internal,
            to_presented,
            is_valid,
        }
    }

    /// Registration position within `D`.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Registered name of this lens.
    pub fn name(&self) -> &'static str {
        D::REPRESENTATIONS
            .get(self.position)
            .copied()
            .unwrap_or("unregistered")
    }

    #[inline]
    pub fn is_valid(&self, data_type: &D, value: &T) -> bool {
        (self.is_valid)(data_type, value)
    }

    #[inline]
    pub fn to_internal(&self, data_type: &D, value: T) -> D::Internal {
        (self.to_internal)(data_type, value)
    }

    #[inline]
    pub fn to_presented(&self, data_type: &D, value: &D::Internal) -> T {
        (self.to_presented)(data_type, value)
    }
}

impl<D: DataType, T> Clone for Lens<D, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D: DataType, T> Copy for Lens<D, T> {}

impl<D: DataType, T> fmt::Debug for Lens<D, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lens({} of {})", self.name(), type_name::<D>())
    }
}

/// The entropic lens of a finite data-type, presenting each value as its
/// index in `[0, entropy)`.
pub const fn entropic<D: FiniteDataType>(position: usize) -> Lens<D, u128> {
    Lens::new(
        position,
        select_internal::<D>,
        index_of_internal::<D>,
        is_valid_selection::<D>,
    )
}

fn select_internal<D: FiniteDataType>(data_type: &D, selection: u128) -> D::Internal {
    match data_type.select(selection) {
        Some(value) => data_type.convert_to_internal(value),
        None => data_type.initial(),
    }
}

fn index_of_internal<D: FiniteDataType>(data_type: &D, value: &D::Internal) -> u128 {
    let external = data_type.convert_to_external(value);
    data_type
        .index_of(&external)
        .unwrap_or_else(|| data_type.entropy())
}

fn is_valid_selection<D: FiniteDataType>(data_type: &D, selection: &u128) -> bool {
    *selection < data_type.entropy()
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct SiteKey {
    declared_by: TypeId,
    position: usize,
}

struct Site {
    key: SiteKey,
    type_name: &'static str,
    name: &'static str,
}

impl Drop for Site {
    fn drop(&mut self) {
        let _ = SITES.try_with(|cache| {
            if let Ok(mut cache) = cache.try_borrow_mut() {
                cache.evict(&self.key);
            }
        });
    }
}

thread_local! {
    static SITES: RefCell<WeakCache<SiteKey, Site>> = RefCell::new(WeakCache::new());
}

/// Identity of a registration site: the declaring data-type and position.
///
/// Equal sites share the same token; comparison is by pointer.
#[derive(Clone)]
pub struct RepresentationIdentityToken(Rc<Site>);

impl RepresentationIdentityToken {
    /// Gets the token for `position` of the data-type of `data_type`.
    pub fn for_site(data_type: &dyn AnyDataType, position: usize) -> Self {
        let key = SiteKey {
            declared_by: data_type.as_any().type_id(),
            position,
        };
        let type_name = data_type.type_name();
        let name = data_type
            .dyn_representations()
            .get(position)
            .copied()
            .unwrap_or("unregistered");
        let site = SITES.with(|cache| {
            cache.borrow_mut().get_or_create(key, |key| {
                trace!("new representation site {} of {}", name, type_name);
                Site {
                    key: key.clone(),
                    type_name,
                    name,
                }
            })
        });
        Self(site)
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.0.key.position
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.0.name
    }

    /// The `TypeId` of the declaring data-type.
    #[inline]
    pub fn declared_by(&self) -> TypeId {
        self.0.key.declared_by
    }
}

impl PartialEq for RepresentationIdentityToken {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for RepresentationIdentityToken {}

impl fmt::Display for RepresentationIdentityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {}", self.0.name, self.0.type_name)
    }
}

impl fmt::Debug for RepresentationIdentityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RepresentationIdentityToken({})", self)
    }
}

#[derive(Debug)]
struct SlotState {
    column_index: usize,
    column_name: Rc<str>,
    is_target: bool,
    ownership: Option<OwnershipToken>,
    header_token: Option<HeaderIdentityToken>,
}

/// One registered representation of one header's data-type.
///
/// Slots are created when a header is created and never re-bound. The
/// owning collection refreshes the cached header state after each edit and
/// detaches the slots of removed headers.
pub struct RepresentationSlot {
    identity: RepresentationIdentityToken,
    data_type: Rc<dyn AnyDataType>,
    state: RefCell<SlotState>,
}

impl RepresentationSlot {
    fn new(identity: RepresentationIdentityToken, data_type: Rc<dyn AnyDataType>) -> Self {
        Self {
            identity,
            data_type,
            state: RefCell::new(SlotState {
                column_index: 0,
                column_name: Rc::from(""),
                is_target: false,
                ownership: None,
                header_token: None,
            }),
        }
    }

    #[inline]
    pub fn identity_token(&self) -> &RepresentationIdentityToken {
        &self.identity
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.identity.position()
    }

    pub fn data_type(&self) -> &dyn AnyDataType {
        &*self.data_type
    }

    pub fn data_type_rc(&self) -> Rc<dyn AnyDataType> {
        self.data_type.clone()
    }

    /// Index of the owning header when last refreshed.
    pub fn column_index(&self) -> usize {
        self.state.borrow().column_index
    }

    /// Name of the owning header when last refreshed.
    pub fn column_name(&self) -> Rc<str> {
        self.state.borrow().column_name.clone()
    }

    pub fn is_target(&self) -> bool {
        self.state.borrow().is_target
    }

    /// The owning collection's token, `None` once detached.
    pub fn ownership_token(&self) -> Option<OwnershipToken> {
        self.state.borrow().ownership.clone()
    }

    /// Identity of the owning header when last refreshed. Kept after detach.
    pub fn header_token(&self) -> Option<HeaderIdentityToken> {
        self.state.borrow().header_token.clone()
    }

    /// Whether the slot is currently owned by the collection with `token`.
    pub fn is_owned_by(&self, token: &OwnershipToken) -> bool {
        self.state
            .borrow()
            .ownership
            .as_ref()
            .map_or(false, |owner| owner == token)
    }

    /// Whether this and `other` are the same site, positionally equivalent.
    pub fn is_equivalent_to(&self, other: &RepresentationSlot) -> bool {
        if self.identity != other.identity {
            return false;
        }
        match (self.header_token(), other.header_token()) {
            (Some(ours), Some(theirs)) => ours == theirs,
            _ => false,
        }
    }

    /// Whether `other` belongs to the same header's data-type as this slot,
    /// or to a header with the same identity and data-type definition.
    pub fn shares_header_with(&self, other: &RepresentationSlot) -> bool {
        if Rc::ptr_eq(&self.data_type, &other.data_type) {
            return true;
        }
        if self.identity.declared_by() != other.identity.declared_by() {
            return false;
        }
        match (self.header_token(), other.header_token()) {
            (Some(ours), Some(theirs)) => ours == theirs,
            _ => false,
        }
    }

    fn refresh(
        &self,
        column_index: usize,
        column_name: &Rc<str>,
        is_target: bool,
        header_token: &HeaderIdentityToken,
        ownership: Option<&OwnershipToken>,
    ) {
        let mut state = self.state.borrow_mut();
        state.column_index = column_index;
        state.column_name = column_name.clone();
        state.is_target = is_target;
        state.header_token = Some(header_token.clone());
        state.ownership = ownership.cloned();
    }

    fn detach(&self) {
        self.state.borrow_mut().ownership = None;
    }
}

impl fmt::Display for RepresentationSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        write!(
            f,
            "{} at column {} \"{}\"",
            self.identity, state.column_index, state.column_name
        )
    }
}

impl fmt::Debug for RepresentationSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepresentationSlot")
            .field("identity", &self.identity)
            .field("state", &*self.state.borrow())
            .finish()
    }
}

/// A data-type bound into one header, with one slot per registered lens.
pub struct BoundType {
    data_type: Rc<dyn AnyDataType>,
    slots: Vec<Rc<RepresentationSlot>>,
}

impl BoundType {
    /// Binds every registered representation of `data_type`.
    pub(crate) fn bind(data_type: Rc<dyn AnyDataType>) -> Rc<Self> {
        let count = data_type.dyn_representations().len();
        let mut slots = Vec::with_capacity(count);
        for _ in 0..count {
            register(&mut slots, &data_type);
        }
        Rc::new(Self { data_type, slots })
    }

    pub fn data_type(&self) -> &dyn AnyDataType {
        &*self.data_type
    }

    pub fn data_type_rc(&self) -> Rc<dyn AnyDataType> {
        self.data_type.clone()
    }

    #[inline]
    pub fn slot(&self, position: usize) -> Option<&Rc<RepresentationSlot>> {
        self.slots.get(position)
    }

    pub fn slots(&self) -> &[Rc<RepresentationSlot>] {
        &self.slots
    }

    /// Identity of the header which currently owns this binding.
    pub fn header_token(&self) -> Option<HeaderIdentityToken> {
        self.slots.first().and_then(|slot| slot.header_token())
    }

    /// Gets the slot positionally equivalent to `other`: same site, bound
    /// to a header with the same identity.
    pub fn equivalent_slot(&self, other: &RepresentationSlot) -> Option<Rc<RepresentationSlot>> {
        let slot = self.slots.get(other.position())?;
        if slot.is_equivalent_to(other) {
            Some(slot.clone())
        } else {
            None
        }
    }

    pub(crate) fn refresh(
        &self,
        column_index: usize,
        column_name: &Rc<str>,
        is_target: bool,
        header_token: &HeaderIdentityToken,
        ownership: Option<&OwnershipToken>,
    ) {
        for slot in &self.slots {
            slot.refresh(column_index, column_name, is_target, header_token, ownership);
        }
    }

    pub(crate) fn detach(&self) {
        for slot in &self.slots {
            slot.detach();
        }
    }
}

impl fmt::Debug for BoundType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundType")
            .field("data_type", &self.data_type)
            .field("slots", &self.slots.len())
            .finish()
    }
}

/// Registers a new slot for `data_type`, returning its position.
fn register(slots: &mut Vec<Rc<RepresentationSlot>>, data_type: &Rc<dyn AnyDataType>) -> usize {
    let position = slots.len();
    let identity = RepresentationIdentityToken::for_site(&**data_type, position);
    slots.push(Rc::new(RepresentationSlot::new(identity, data_type.clone())));
    position
}

/// A lens bound to one slot of one header's data-type.
///
/// Two representations are equal iff they share the same slot.
pub struct Representation<D: DataType, T> {
    slot: Rc<RepresentationSlot>,
    data_type: Rc<D>,
    lens: Lens<D, T>,
}

impl<D: DataType, T> Representation<D, T> {
    /// Pairs `lens` with `slot`.
    ///
    /// Fails with [`Error::TypeMismatch`] unless the slot was registered by
    /// `D` at the lens's position.
    pub fn from_slot(slot: Rc<RepresentationSlot>, lens: Lens<D, T>) -> Result<Self> {
        let identity = slot.identity_token();
        if identity.declared_by() != TypeId::of::<D>() || identity.position() != lens.position() {
            return Err(Error::type_mismatch(
                format!("{} of {}", lens.name(), type_name::<D>()),
                identity,
            ));
        }
        let data_type = slot
            .data_type_rc()
            .into_any_rc()
            .downcast::<D>()
            .map_err(|_| Error::type_mismatch(type_name::<D>(), slot.data_type()))?;
        Ok(Self {
            slot,
            data_type,
            lens,
        })
    }

    /// The same lens bound to another slot of the same site.
    pub fn with_slot(&self, slot: Rc<RepresentationSlot>) -> Result<Self> {
        Self::from_slot(slot, self.lens)
    }

    #[inline]
    pub fn slot(&self) -> &Rc<RepresentationSlot> {
        &self.slot
    }

    #[inline]
    pub fn data_type(&self) -> &D {
        &self.data_type
    }

    #[inline]
    pub fn lens(&self) -> &Lens<D, T> {
        &self.lens
    }

    pub fn identity_token(&self) -> &RepresentationIdentityToken {
        self.slot.identity_token()
    }

    pub fn column_index(&self) -> usize {
        self.slot.column_index()
    }

    pub fn column_name(&self) -> Rc<str> {
        self.slot.column_name()
    }

    pub fn is_target(&self) -> bool {
        self.slot.is_target()
    }

    pub fn ownership_token(&self) -> Option<OwnershipToken> {
        self.slot.ownership_token()
    }

    pub fn header_identity_token(&self) -> Option<HeaderIdentityToken> {
        self.slot.header_token()
    }

    /// Any valid value in this representation.
    pub fn initial(&self) -> T {
        self.lens
            .to_presented(&self.data_type, &self.data_type.initial())
    }

    #[inline]
    pub fn is_valid(&self, value: &T) -> bool {
        self.lens.is_valid(&self.data_type, value)
    }

    /// Converts a value of this representation to internal form.
    #[inline]
    pub fn to_internal(&self, value: T) -> D::Internal {
        self.lens.to_internal(&self.data_type, value)
    }

    /// Presents an internal value in this representation.
    #[inline]
    pub fn from_internal(&self, value: &D::Internal) -> T {
        self.lens.to_presented(&self.data_type, value)
    }

    /// Whether both are bound to the same site of equivalent headers.
    pub fn is_equivalent_to<D2: DataType, T2>(&self, other: &Representation<D2, T2>) -> bool {
        Rc::ptr_eq(&self.slot, &other.slot) || self.slot.is_equivalent_to(&other.slot)
    }
}

impl<D: DataType, T: fmt::Debug> Representation<D, T> {
    /// Fails with [`Error::InvalidValue`] unless `value` is valid.
    pub fn validate(&self, value: &T) -> Result<()> {
        if self.is_valid(value) {
            Ok(())
        } else {
            Err(Error::invalid_value(self, value))
        }
    }

    /// Converts `value`, given in representation `from`, to this one.
    ///
    /// Fails with [`Error::UnownedRepresentation`] unless `from` is bound to
    /// this representation's header or to an equivalent one. The value is
    /// validated against this representation's data-type instance.
    pub fn convert<D2: DataType, I: fmt::Debug + 'static>(
        &self,
        value: I,
        from: &Representation<D2, I>,
    ) -> Result<T> {
        if !self.slot.shares_header_with(&from.slot) {
            return Err(Error::unowned(from));
        }
        let lens = (&from.lens as &dyn Any)
            .downcast_ref::<Lens<D, I>>()
            .ok_or_else(|| Error::unowned(from))?;
        if !lens.is_valid(&self.data_type, &value) {
            return Err(Error::invalid_value(from, &value));
        }
        let internal = lens.to_internal(&self.data_type, value);
        Ok(self.from_internal(&internal))
    }
}

impl<D: FiniteDataType, T> Representation<D, T> {
    /// Draws a value of the data-type uniformly from its entropy and
    /// presents it in this representation.
    ///
    /// Fails with [`Error::InvalidArgument`] if the type has no values.
    pub fn random<R: Rng>(&self, rng: &mut R) -> Result<T> {
        let entropy = self.data_type.entropy();
        if entropy == 0 {
            return Err(Error::invalid_argument(format!(
                "{} has no values to draw from",
                self.data_type
            )));
        }
        let internal = select_internal(&*self.data_type, rng.gen_range(0..entropy));
        Ok(self.from_internal(&internal))
    }
}

impl<D: DataType, T> Clone for Representation<D, T> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
            data_type: self.data_type.clone(),
            lens: self.lens,
        }
    }
}

impl<D: DataType, T> PartialEq for Representation<D, T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.slot, &other.slot)
    }
}

impl<D: DataType, T> fmt::Display for Representation<D, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.slot, self.data_type)
    }
}

impl<D: DataType, T> fmt::Debug for Representation<D, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Representation")
            .field("slot", &self.slot)
            .field("data_type", &self.data_type)
            .finish()
    }
}
