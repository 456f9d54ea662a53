//! Missing-value support for arbitrary data-types.
//!
//! [`WithMissingValues`] wraps a base data-type and widens its internal and
//! external value types so one value denotes "missing". How the missing
//! value is encoded is decided by a [`MissingValuesConverter`] on each side.

use crate::error::{Error, Result};
use crate::types::{entropic, AnyDataType, DataType, FiniteDataType, Lens};
use std::fmt;
use std::hash::{Hash, Hasher};

/// How a missing value is rendered.
pub(crate) const MISSING_LABEL: &str = "<missing>";

/// Encodes a base value type plus an optional missing value.
pub trait MissingValuesConverter<Base>: Clone + fmt::Debug + 'static {
    /// The widened value type.
    type Value: Clone + fmt::Debug + 'static;

    fn is_missing(&self, value: &Self::Value) -> bool;

    /// The base value, `None` if `value` is missing.
    fn to_base(&self, value: &Self::Value) -> Option<Base>;

    fn from_base(&self, value: Base) -> Self::Value;

    /// The missing value, `None` if this encoding can't express one.
    fn missing(&self) -> Option<Self::Value>;
}

/// Missing is `None`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OptionConverter;

impl<B: Clone + fmt::Debug + 'static> MissingValuesConverter<B> for OptionConverter {
    type Value = Option<B>;

    fn is_missing(&self, value: &Option<B>) -> bool {
        value.is_none()
    }

    fn to_base(&self, value: &Option<B>) -> Option<B> {
        value.clone()
    }

    fn from_base(&self, value: B) -> Option<B> {
        Some(value)
    }

    fn missing(&self) -> Option<Option<B>> {
        Some(None)
    }
}

/// Missing is a reserved value of the base type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SentinelConverter<T> {
    sentinel: T,
}

impl<T> SentinelConverter<T> {
    pub fn new(sentinel: T) -> Self {
        Self { sentinel }
    }
}

impl<T: Clone + PartialEq + fmt::Debug + 'static> MissingValuesConverter<T>
    for SentinelConverter<T>
{
    type Value = T;

    fn is_missing(&self, value: &T) -> bool {
        *value == self.sentinel
    }

    fn to_base(&self, value: &T) -> Option<T> {
        if self.is_missing(value) {
            None
        } else {
            Some(value.clone())
        }
    }

    fn from_base(&self, value: T) -> T {
        value
    }

    fn missing(&self) -> Option<T> {
        Some(self.sentinel.clone())
    }
}

/// Missing is any NaN.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NanConverter;

impl MissingValuesConverter<f64> for NanConverter {
    type Value = f64;

    fn is_missing(&self, value: &f64) -> bool {
        value.is_nan()
    }

    fn to_base(&self, value: &f64) -> Option<f64> {
        if value.is_nan() {
            None
        } else {
            Some(*value)
        }
    }

    fn from_base(&self, value: f64) -> f64 {
        value
    }

    fn missing(&self) -> Option<f64> {
        Some(f64::NAN)
    }
}

/// The base encoding, without a missing value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NoMissingValues;

impl<T: Clone + fmt::Debug + 'static> MissingValuesConverter<T> for NoMissingValues {
    type Value = T;

    fn is_missing(&self, _value: &T) -> bool {
        false
    }

    fn to_base(&self, value: &T) -> Option<T> {
        Some(value.clone())
    }

    fn from_base(&self, value: T) -> T {
        value
    }

    fn missing(&self) -> Option<T> {
        None
    }
}

/// A base data-type widened with a missing value.
///
/// Validity and conversion go through the base type unless the value is
/// missing. Equality and hashing only consider the base type.
#[derive(Clone, Debug)]
pub struct WithMissingValues<B, CI = OptionConverter, CX = OptionConverter> {
    base: B,
    internal: CI,
    external: CX,
    missing_entropy: u128,
}

impl<B: DataType> WithMissingValues<B, OptionConverter, OptionConverter> {
    /// Widens `base` with `Option` on both sides.
    pub fn optional(base: B) -> Self {
        Self {
            base,
            internal: OptionConverter,
            external: OptionConverter,
            missing_entropy: 0,
        }
    }
}

impl<B, CI, CX> WithMissingValues<B, CI, CX>
where
    B: DataType,
    CI: MissingValuesConverter<B::Internal>,
    CX: MissingValuesConverter<B::External>,
{
    /// Widens `base` using the given encodings.
    ///
    /// Fails if external values can be missing but internal ones can't.
    pub fn new(base: B, internal: CI, external: CX) -> Result<Self> {
        if external.missing().is_some() && internal.missing().is_none() {
            return Err(Error::invalid_argument(format!(
                "{} can't store missing values but can present them",
                base
            )));
        }
        Ok(Self {
            base,
            internal,
            external,
            missing_entropy: 0,
        })
    }

    /// Reserves `entropy` indices after the base range for the missing value.
    pub fn with_missing_entropy(mut self, entropy: u128) -> Self {
        self.missing_entropy = entropy;
        self
    }

    pub fn base(&self) -> &B {
        &self.base
    }

    pub fn missing_entropy(&self) -> u128 {
        self.missing_entropy
    }

    /// The external missing value, if the external encoding has one.
    pub fn missing(&self) -> Option<CX::Value> {
        self.external.missing()
    }

    pub fn is_missing_internal(&self, value: &CI::Value) -> bool {
        self.internal.is_missing(value)
    }

    pub fn is_missing_external(&self, value: &CX::Value) -> bool {
        self.external.is_missing(value)
    }
}

impl<B, CI, CX> WithMissingValues<B, CI, CX>
where
    B: FiniteDataType,
    CI: MissingValuesConverter<B::Internal>,
    CX: MissingValuesConverter<B::External>,
{
    /// Presents values as their index; missing maps after the base range.
    pub const ENTROPIC: Lens<Self, u128> = entropic(1);
}

impl<B: PartialEq, CI, CX> PartialEq for WithMissingValues<B, CI, CX> {
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base
    }
}

impl<B: Hash, CI, CX> Hash for WithMissingValues<B, CI, CX> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.base.hash(state);
    }
}

impl<B: fmt::Display, CI, CX> fmt::Display for WithMissingValues<B, CI, CX> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} with missing values", self.base)
    }
}

impl<B, CI, CX> DataType for WithMissingValues<B, CI, CX>
where
    B: DataType,
    CI: MissingValuesConverter<B::Internal>,
    CX: MissingValuesConverter<B::External>,
{
    type Internal = CI::Value;
    type External = CX::Value;

    const REPRESENTATIONS: &'static [&'static str] = &["canonical", "entropic"];

    fn supports_missing_values(&self) -> bool {
        self.internal.missing().is_some()
    }

    fn initial(&self) -> CI::Value {
        match self.internal.missing() {
            Some(missing) => missing,
            None => self.internal.from_base(self.base.initial()),
        }
    }

    fn is_valid_internal(&self, value: &CI::Value) -> bool {
        match self.internal.to_base(value) {
            Some(base) => self.base.is_valid_internal(&base),
            None => self.internal.is_missing(value),
        }
    }

    fn is_valid_external(&self, value: &CX::Value) -> bool {
        match self.external.to_base(value) {
            Some(base) => self.base.is_valid_external(&base),
            None => self.external.is_missing(value),
        }
    }

    fn convert_to_internal(&self, value: CX::Value) -> CI::Value {
        match self.external.to_base(&value) {
            Some(base) => self.internal.from_base(self.base.convert_to_internal(base)),
            None => self.initial(),
        }
    }

    fn format_internal(&self, value: &CI::Value) -> String {
        match self.internal.to_base(value) {
            Some(base) => self.base.format_internal(&base),
            None => MISSING_LABEL.to_string(),
        }
    }

    fn wrapped_base(&self) -> Option<&dyn AnyDataType> {
        Some(&self.base)
    }

    fn convert_to_external(&self, value: &CI::Value) -> CX::Value {
        match self.internal.to_base(value) {
            Some(base) => self.external.from_base(self.base.convert_to_external(&base)),
            None => match self.external.missing() {
                Some(missing) => missing,
                None => self
                    .external
                    .from_base(self.base.convert_to_external(&self.base.initial())),
            },
        }
    }
}

impl<B, CI, CX> FiniteDataType for WithMissingValues<B, CI, CX>
where
    B: FiniteDataType,
    CI: MissingValuesConverter<B::Internal>,
    CX: MissingValuesConverter<B::External>,
{
    fn entropy(&self) -> u128 {
        self.base.entropy().saturating_add(self.missing_entropy)
    }

    fn select(&self, selection: u128) -> Option<CX::Value> {
        let base_entropy = self.base.entropy();
        if selection < base_entropy {
            self.base
                .select(selection)
                .map(|value| self.external.from_base(value))
        } else if selection < self.entropy() {
            self.external.missing()
        } else {
            None
        }
    }

    fn index_of(&self, value: &CX::Value) -> Option<u128> {
        match self.external.to_base(value) {
            Some(base) => self.base.index_of(&base),
            None if self.missing_entropy > 0 => Some(self.base.entropy()),
            None => None,
        }
    }
}
