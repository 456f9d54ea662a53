//! Data-set metadata.

use crate::error::Result;
use crate::headers::{borrow_shared, Shared};
use std::fmt;

/// Describes a whole data-set rather than any one of its columns.
///
/// The default metadata has an empty name; it is what sources without a
/// name of their own report.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DataMetadata {
    name: String,
}

impl DataMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }
}

impl fmt::Display for DataMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A structure carrying [`DataMetadata`].
pub trait WithMetadata {
    fn metadata(&self) -> Result<DataMetadata>;

    /// Shorthand for the metadata's name.
    fn name(&self) -> Result<String> {
        Ok(self.metadata()?.name)
    }
}

impl<T: WithMetadata + ?Sized> WithMetadata for &T {
    fn metadata(&self) -> Result<DataMetadata> {
        (**self).metadata()
    }
}

impl<T: WithMetadata + ?Sized> WithMetadata for &mut T {
    fn metadata(&self) -> Result<DataMetadata> {
        (**self).metadata()
    }
}

impl<T: WithMetadata + ?Sized> WithMetadata for Shared<T> {
    fn metadata(&self) -> Result<DataMetadata> {
        borrow_shared(self)?.metadata()
    }
}
