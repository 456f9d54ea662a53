//! Categorical data.

use crate::error::{Error, Result};
use crate::types::{entropic, DataType, FiniteDataType, Lens};
use std::fmt;
use std::rc::Rc;

/// One of a fixed, ordered set of string categories.
///
/// Values are stored as the index of their category. Two nominal types are
/// equal iff they have the same categories in the same order.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Nominal {
    categories: Rc<[String]>,
    supports_missing_values: bool,
}

impl Nominal {
    /// Presents values as their category index.
    pub const INDEX: Lens<Nominal, usize> = Lens::new(
        1,
        |_, index| index,
        |_, index| *index,
        |nominal, index| *index < nominal.categories.len(),
    );

    /// Presents values as their index, as for any finite type.
    pub const ENTROPIC: Lens<Nominal, u128> = entropic(2);

    /// Creates a nominal type over `categories`.
    ///
    /// There must be at least two categories and no duplicates.
    pub fn new<S: Into<String>>(
        supports_missing_values: bool,
        categories: impl IntoIterator<Item = S>,
    ) -> Result<Self> {
        let categories: Vec<String> = categories.into_iter().map(Into::into).collect();
        if categories.len() < 2 {
            return Err(Error::invalid_argument(format!(
                "Nominal type needs at least 2 categories, got {}",
                categories.len()
            )));
        }
        for (index, category) in categories.iter().enumerate() {
            if categories[..index].contains(category) {
                return Err(Error::invalid_argument(format!(
                    "Duplicate category \"{}\"",
                    category
                )));
            }
        }
        Ok(Self {
            categories: Rc::from(categories),
            supports_missing_values,
        })
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Index of the category named `label`.
    pub fn category_index(&self, label: &str) -> Option<usize> {
        self.categories.iter().position(|category| category == label)
    }
}

impl DataType for Nominal {
    type Internal = usize;
    type External = String;

    const REPRESENTATIONS: &'static [&'static str] = &["canonical", "index", "entropic"];

    fn supports_missing_values(&self) -> bool {
        self.supports_missing_values
    }

    fn initial(&self) -> usize {
        0
    }

    fn is_valid_internal(&self, value: &usize) -> bool {
        *value < self.categories.len()
    }

    fn is_valid_external(&self, value: &String) -> bool {
        self.category_index(value).is_some()
    }

    fn convert_to_internal(&self, value: String) -> usize {
        self.category_index(&value).unwrap_or(0)
    }

    fn convert_to_external(&self, value: &usize) -> String {
        self.categories.get(*value).cloned().unwrap_or_default()
    }

    fn format_internal(&self, value: &usize) -> String {
        self.convert_to_external(value)
    }
}

impl FiniteDataType for Nominal {
    fn entropy(&self) -> u128 {
        self.categories.len() as u128
    }

    fn select(&self, selection: u128) -> Option<String> {
        usize::try_from(selection)
            .ok()
            .and_then(|index| self.categories.get(index))
            .cloned()
    }

    fn index_of(&self, value: &String) -> Option<u128> {
        self.category_index(value).map(|index| index as u128)
    }
}

impl fmt::Display for Nominal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Nominal(")?;
        for (index, category) in self.categories.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "'{}'", category)?;
        }
        write!(f, ")")
    }
}
