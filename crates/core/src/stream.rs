//! Pull-based row streams.

use crate::error::Result;
use crate::headers::Headers;
use crate::metadata::WithMetadata;
use crate::row::DataRow;

/// A sequence of rows sharing one structure.
///
/// Each row is materialised: it has headers structurally equal to the
/// stream's, but its own representations.
pub trait DataStream: Headers + WithMetadata {
    type Row: DataRow;

    /// Iterates over the rows in order.
    fn rows(&self) -> Result<Box<dyn Iterator<Item = Result<Self::Row>> + '_>>;
}

impl<S: DataStream + ?Sized> DataStream for &S {
    type Row = S::Row;

    fn rows(&self) -> Result<Box<dyn Iterator<Item = Result<Self::Row>> + '_>> {
        (**self).rows()
    }
}
