//! Data-type definitions for Tabula.
//!
//! A [`DataType`] is an immutable description of the values a column can
//! hold. It fixes the internal storage type of the column and declares, in
//! registration order, the representations through which values can be read
//! and written. Position 0 is always the canonical representation.

mod cells;
mod missing;
mod nominal;
mod numeric;
mod representation;

pub use cells::{Cells, RawValue, TypedCells};
pub use missing::{
    MissingValuesConverter, NanConverter, NoMissingValues, OptionConverter, SentinelConverter,
    WithMissingValues,
};
pub(crate) use missing::MISSING_LABEL;
pub use nominal::Nominal;
pub use numeric::Numeric;
pub use representation::{
    entropic, BoundType, Lens, Representation, RepresentationIdentityToken, RepresentationSlot,
};

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// The type of data in a column.
///
/// Equality is structural: two independently constructed instances with the
/// same domain parameters are equal. Implementations must be immutable.
pub trait DataType: Clone + PartialEq + Hash + fmt::Debug + fmt::Display + 'static {
    /// The type values are stored as.
    type Internal: Clone + fmt::Debug + 'static;
    /// The type values are presented as by the canonical representation.
    type External: Clone + fmt::Debug + 'static;

    /// Names of the representations of this data-type, in registration order.
    const REPRESENTATIONS: &'static [&'static str];

    /// The canonical representation, presenting values as [`Self::External`].
    const CANONICAL: Lens<Self, Self::External> = Lens::new(
        0,
        Self::convert_to_internal,
        Self::convert_to_external,
        Self::is_valid_external,
    );

    /// Whether columns of this type may have missing values.
    fn supports_missing_values(&self) -> bool;

    /// Any valid internal value, used to seed new cells.
    fn initial(&self) -> Self::Internal;

    /// Whether an internal value belongs to this type's domain.
    fn is_valid_internal(&self, value: &Self::Internal) -> bool;

    /// Whether an external value belongs to this type's domain.
    fn is_valid_external(&self, value: &Self::External) -> bool;

    /// Converts a valid external value to its internal form.
    fn convert_to_internal(&self, value: Self::External) -> Self::Internal;

    /// Converts a valid internal value to its external form.
    fn convert_to_external(&self, value: &Self::Internal) -> Self::External;

    /// Renders an internal value for display.
    fn format_internal(&self, value: &Self::Internal) -> String {
        format!("{:?}", self.convert_to_external(value))
    }

    /// The type this one widens, if equality is decided by it alone.
    fn wrapped_base(&self) -> Option<&dyn AnyDataType> {
        None
    }
}

/// A data-type that can only take one of finitely many values.
///
/// Every value maps to a unique index in `[0, entropy)`; this is the basis
/// for entropic representations and index-based sampling.
pub trait FiniteDataType: DataType {
    /// The number of distinct values of this type.
    fn entropy(&self) -> u128;

    /// Gets the value at `selection`, or `None` if it's not below the entropy.
    fn select(&self, selection: u128) -> Option<Self::External>;

    /// Gets the index of a value, the inverse of [`FiniteDataType::select`].
    fn index_of(&self, value: &Self::External) -> Option<u128>;
}

/// Object-safe view of any [`DataType`], as held by column headers.
pub trait AnyDataType: fmt::Debug + fmt::Display + 'static {
    /// Returns the data-type as `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Converts a shared data-type into a shared `Any` for downcasting.
    fn into_any_rc(self: Rc<Self>) -> Rc<dyn Any>;

    /// The Rust name of the concrete data-type.
    fn type_name(&self) -> &'static str;

    /// See [`DataType::supports_missing_values`].
    fn dyn_supports_missing_values(&self) -> bool;

    /// See [`DataType::REPRESENTATIONS`].
    fn dyn_representations(&self) -> &'static [&'static str];

    /// See [`DataType::format_internal`]; `None` if `value` isn't an
    /// internal value of this type.
    fn dyn_format_internal(&self, value: &dyn Any) -> Option<String>;

    /// See [`DataType::wrapped_base`].
    fn dyn_wrapped_base(&self) -> Option<&dyn AnyDataType>;

    /// Structural equality against another erased data-type.
    ///
    /// Wrapping types compare by their bases only.
    fn dyn_eq(&self, other: &dyn AnyDataType) -> bool;

    /// Hashes the concrete type and its structure.
    fn dyn_hash(&self, state: &mut dyn Hasher);

    /// Creates storage for `len` cells of this type.
    ///
    /// Cells start out missing if the type supports missing values, and at
    /// the type's initial value otherwise.
    fn dyn_new_cells(&self, len: usize) -> Box<dyn Cells>;
}

impl<D: DataType> AnyDataType for D {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any_rc(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<D>()
    }

    fn dyn_supports_missing_values(&self) -> bool {
        self.supports_missing_values()
    }

    fn dyn_representations(&self) -> &'static [&'static str] {
        D::REPRESENTATIONS
    }

    fn dyn_format_internal(&self, value: &dyn Any) -> Option<String> {
        value
            .downcast_ref::<D::Internal>()
            .map(|value| self.format_internal(value))
    }

    fn dyn_wrapped_base(&self) -> Option<&dyn AnyDataType> {
        self.wrapped_base()
    }

    fn dyn_eq(&self, other: &dyn AnyDataType) -> bool {
        match (self.wrapped_base(), other.dyn_wrapped_base()) {
            (Some(ours), Some(theirs)) => ours.dyn_eq(theirs),
            (None, None) => other
                .as_any()
                .downcast_ref::<D>()
                .map_or(false, |other| self == other),
            _ => false,
        }
    }

    fn dyn_hash(&self, mut state: &mut dyn Hasher) {
        match self.wrapped_base() {
            Some(base) => {
                TypeId::of::<WithMissingValues<()>>().hash(&mut state);
                base.dyn_hash(state);
            }
            None => {
                TypeId::of::<D>().hash(&mut state);
                self.hash(&mut state);
            }
        }
    }

    fn dyn_new_cells(&self, len: usize) -> Box<dyn Cells> {
        let seed = if self.supports_missing_values() {
            None
        } else {
            Some(self.initial())
        };
        Box::new(TypedCells::<D::Internal>::new(seed, len))
    }
}

impl PartialEq for dyn AnyDataType {
    fn eq(&self, other: &Self) -> bool {
        self.dyn_eq(other)
    }
}

impl Eq for dyn AnyDataType {}

impl Hash for dyn AnyDataType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.dyn_hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headers::HeaderIdentityToken;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(data_type: &dyn AnyDataType) -> u64 {
        let mut hasher = DefaultHasher::new();
        data_type.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_erased_equality() {
        let a: Rc<dyn AnyDataType> = Rc::new(Numeric::new(true));
        let b: Rc<dyn AnyDataType> = Rc::new(Numeric::new(true));
        let c: Rc<dyn AnyDataType> = Rc::new(Numeric::new(false));
        assert!(*a == *b);
        assert!(*a != *c);
        assert_eq!(hash_of(&*a), hash_of(&*b));
    }

    #[test]
    fn test_erased_equality_across_types() {
        let numeric: Rc<dyn AnyDataType> = Rc::new(Numeric::new(false));
        let nominal: Rc<dyn AnyDataType> = Rc::new(Nominal::new(false, ["a", "b"]).unwrap());
        assert!(*numeric != *nominal);
        assert!(!numeric.dyn_eq(&*nominal));
    }

    #[test]
    fn test_erased_equality_ignores_missing_encoding() {
        let optional: Rc<dyn AnyDataType> =
            Rc::new(WithMissingValues::optional(Numeric::new(false)));
        let nan: Rc<dyn AnyDataType> = Rc::new(
            WithMissingValues::new(Numeric::new(false), NanConverter, OptionConverter).unwrap(),
        );
        let other_base: Rc<dyn AnyDataType> =
            Rc::new(WithMissingValues::optional(Numeric::new(true)));
        assert!(optional.dyn_eq(&*nan));
        assert!(nan.dyn_eq(&*optional));
        assert_eq!(hash_of(&*optional), hash_of(&*nan));
        assert!(*optional != *other_base);

        let bare: Rc<dyn AnyDataType> = Rc::new(Numeric::new(false));
        assert!(*optional != *bare);
        assert!(*bare != *optional);

        let name: Rc<str> = Rc::from("x");
        assert_eq!(
            HeaderIdentityToken::get(0, &name, &optional, false),
            HeaderIdentityToken::get(0, &name, &nan, false)
        );
    }

    #[test]
    fn test_erased_downcast() {
        let erased: Rc<dyn AnyDataType> = Rc::new(Numeric::new(true));
        assert!(erased.as_any().downcast_ref::<Numeric>().is_some());
        let typed = erased.into_any_rc().downcast::<Numeric>().unwrap();
        assert!(typed.supports_missing_values());
    }

    #[test]
    fn test_new_cells_seeding() {
        let with_missing = Numeric::new(true).dyn_new_cells(2);
        assert!(!with_missing.is_present(0));

        let without_missing = Numeric::new(false).dyn_new_cells(2);
        assert!(without_missing.is_present(1));
        assert_eq!(without_missing.len(), 2);
    }
}
