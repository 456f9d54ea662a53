//! Error types for Tabula.
//!
//! Every variant signals a broken contract between a caller and a structure
//! (wrong representation, stale view, absent value). Nothing here is retried
//! or recovered internally; errors propagate to the caller.

use std::fmt;

/// Result type alias for Tabula operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types for Tabula operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The requested column has no value in this row.
    MissingValue {
        column: usize,
        name: String,
    },
    /// A value is not valid for the representation it was given in.
    InvalidValue {
        representation: String,
        value: String,
    },
    /// A representation was used against headers which don't own it, not
    /// even through an equivalent representation.
    UnownedRepresentation {
        representation: String,
    },
    /// Tried to clear a value in a column whose type has no missing values.
    DoesntSupportMissingValues {
        column: usize,
        name: String,
    },
    /// Two column headers were expected to be equivalent.
    DifferentColumnHeader {
        expected: String,
        got: String,
    },
    /// Two structures were expected to have the same columns.
    DifferentColumnStructure {
        message: String,
    },
    /// Two rows were expected to have the same structure.
    DifferentRowStructure {
        message: String,
    },
    /// An argument was rejected (duplicate name, disagreeing index/name...).
    InvalidArgument {
        message: String,
    },
    /// An index was outside `[0, len)`.
    IndexOutOfBounds {
        index: usize,
        len: usize,
    },
    /// A representation was requested for a header of a different data-type.
    TypeMismatch {
        expected: String,
        got: String,
    },
    /// The source of a view changed structure after the view was created.
    StaleView,
    /// A shared source was already borrowed for mutation.
    ConcurrentModification,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MissingValue { column, name } => {
                write!(f, "Value in column {} \"{}\" has no value", column, name)
            }
            Error::InvalidValue {
                representation,
                value,
            } => {
                write!(f, "Value {} is not valid for {}", value, representation)
            }
            Error::UnownedRepresentation { representation } => {
                write!(f, "{} is not owned by these headers", representation)
            }
            Error::DoesntSupportMissingValues { column, name } => {
                write!(
                    f,
                    "Column {} \"{}\" doesn't support missing values",
                    column, name
                )
            }
            Error::DifferentColumnHeader { expected, got } => {
                write!(f, "Different column header: expected {}, got {}", expected, got)
            }
            Error::DifferentColumnStructure { message } => {
                write!(f, "Different column structure: {}", message)
            }
            Error::DifferentRowStructure { message } => {
                write!(f, "Different row structure: {}", message)
            }
            Error::InvalidArgument { message } => {
                write!(f, "Invalid argument: {}", message)
            }
            Error::IndexOutOfBounds { index, len } => {
                write!(f, "Index must be in [0, {}), got {}", len, index)
            }
            Error::TypeMismatch { expected, got } => {
                write!(f, "Type mismatch: expected {}, got {}", expected, got)
            }
            Error::StaleView => {
                write!(f, "Source of view was structurally modified")
            }
            Error::ConcurrentModification => {
                write!(f, "Source is already borrowed for modification")
            }
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Creates a missing value error.
    pub fn missing_value(column: usize, name: impl Into<String>) -> Self {
        Error::MissingValue {
            column,
            name: name.into(),
        }
    }

    /// Creates an invalid value error.
    pub fn invalid_value(representation: impl fmt::Display, value: impl fmt::Debug) -> Self {
        Error::InvalidValue {
            representation: representation.to_string(),
            value: format!("{:?}", value),
        }
    }

    /// Creates an unowned representation error.
    pub fn unowned(representation: impl fmt::Display) -> Self {
        Error::UnownedRepresentation {
            representation: representation.to_string(),
        }
    }

    /// Creates a missing-values-unsupported error.
    pub fn doesnt_support_missing_values(column: usize, name: impl Into<String>) -> Self {
        Error::DoesntSupportMissingValues {
            column,
            name: name.into(),
        }
    }

    /// Creates a different column header error.
    pub fn different_column_header(expected: impl fmt::Display, got: impl fmt::Display) -> Self {
        Error::DifferentColumnHeader {
            expected: expected.to_string(),
            got: got.to_string(),
        }
    }

    /// Creates a different column structure error.
    pub fn different_column_structure(message: impl Into<String>) -> Self {
        Error::DifferentColumnStructure {
            message: message.into(),
        }
    }

    /// Creates a different row structure error.
    pub fn different_row_structure(message: impl Into<String>) -> Self {
        Error::DifferentRowStructure {
            message: message.into(),
        }
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates an index out of bounds error.
    pub fn index_out_of_bounds(index: usize, len: usize) -> Self {
        Error::IndexOutOfBounds { index, len }
    }

    /// Creates a type mismatch error.
    pub fn type_mismatch(expected: impl fmt::Display, got: impl fmt::Display) -> Self {
        Error::TypeMismatch {
            expected: expected.to_string(),
            got: got.to_string(),
        }
    }

    /// Returns true if this is a missing value error.
    #[inline]
    pub fn is_missing_value(&self) -> bool {
        matches!(self, Error::MissingValue { .. })
    }
}

/// Fails with [`Error::IndexOutOfBounds`] unless `index < len`.
#[inline]
pub fn ensure_index(index: usize, len: usize) -> Result<usize> {
    if index < len {
        Ok(index)
    } else {
        Err(Error::index_out_of_bounds(index, len))
    }
}
