//! Copying values between structures of the same shape.

use log::trace;
use tabula_core::{DataColumn, DataRow, Error, MutableDataColumn, MutableDataRow, Result};

/// Copies every value of `source` into `target`.
///
/// Both rows must have the same identity token; otherwise fails with
/// [`Error::DifferentRowStructure`] and leaves `target` untouched.
pub fn copy_row(source: &impl DataRow, target: &mut impl MutableDataRow) -> Result<()> {
    let expected = target.identity_token()?;
    let got = source.identity_token()?;
    if expected != got {
        return Err(Error::different_row_structure(format!(
            "expected {}, got {}",
            expected, got
        )));
    }

    let values = (0..expected.len())
        .map(|column| source.raw_value(column))
        .collect::<Result<Vec<_>>>()?;
    for (column, value) in values.into_iter().enumerate() {
        target.set_raw_value(column, value)?;
    }
    trace!("copied row of {} columns", expected.len());
    Ok(())
}

/// Copies every value of `source` into `target`, missing values included.
///
/// The columns may differ in position, name and target flag. Fails with
/// [`Error::DifferentColumnHeader`] unless both have equal data-types, and
/// with [`Error::DifferentColumnStructure`] if they differ in length.
pub fn copy_column<T, S, C>(source: &S, target: &mut C) -> Result<()>
where
    S: DataColumn<Value = T>,
    C: MutableDataColumn<Value = T>,
{
    let expected = target.header()?;
    let got = source.header()?;
    if *expected.data_type() != *got.data_type() {
        return Err(Error::different_column_header(expected, got));
    }

    let num_rows = target.num_rows()?;
    if source.num_rows()? != num_rows {
        return Err(Error::different_column_structure(format!(
            "expected {} rows, got {}",
            num_rows,
            source.num_rows()?
        )));
    }

    for (row_index, value) in source.values()?.into_iter().enumerate() {
        match value {
            Some(value) => target.set(row_index, value)?,
            None => target.clear(row_index)?,
        }
    }
    trace!("copied column \"{}\" of {} rows", expected.name(), num_rows);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryRow;
    use tabula_core::types::Numeric;
    use tabula_core::{DataType, Headers};

    fn xy() -> MemoryRow {
        let mut row = MemoryRow::new();
        row.append_column("x", Numeric::new(true), false).unwrap();
        row.append_column("y", Numeric::new(false), true).unwrap();
        row
    }

    #[test]
    fn test_copy_row() {
        let mut source = xy();
        let x = source.representation("x", &Numeric::CANONICAL).unwrap();
        let y = source.representation("y", &Numeric::CANONICAL).unwrap();
        source.set_value(&y, 4.0).unwrap();

        let mut target = xy();
        target.set_value(&x, 1.0).unwrap();
        copy_row(&source, &mut target).unwrap();

        assert!(target.is_missing(&x).unwrap());
        assert_eq!(target.get_value(&y), Ok(4.0));
    }

    #[test]
    fn test_copy_row_different_structure() {
        let source = xy();
        let mut target = MemoryRow::new();
        target.append_column("x", Numeric::new(true), false).unwrap();

        assert!(matches!(
            copy_row(&source, &mut target),
            Err(Error::DifferentRowStructure { .. })
        ));
    }
}
