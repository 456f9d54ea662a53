//! Index translation for views over a subset of rows or columns.

use tabula_core::{ensure_index, Error, Headers, Result};

pub use tabula_core::headers::validate_columns;

/// Translates a local column index through `columns`, or returns it
/// unchanged if there is no translation table.
#[inline]
pub fn translate_column(columns: Option<&[usize]>, index: usize) -> Result<usize> {
    translate(columns, index)
}

/// Translates a local row index through `rows`, or returns it unchanged if
/// there is no translation table.
#[inline]
pub fn translate_row(rows: Option<&[usize]>, index: usize) -> Result<usize> {
    translate(rows, index)
}

fn translate(table: Option<&[usize]>, index: usize) -> Result<usize> {
    match table {
        Some(table) => table
            .get(index)
            .copied()
            .ok_or_else(|| Error::index_out_of_bounds(index, table.len())),
        None => Ok(index),
    }
}

/// Fails unless every row is below `num_rows`. Rows may repeat.
pub fn validate_rows(rows: &[usize], num_rows: usize) -> Result<()> {
    for &row in rows {
        ensure_index(row, num_rows)?;
    }
    Ok(())
}

/// Every column index of `headers` except `index`, in order.
pub fn all_columns_except<H: Headers + ?Sized>(headers: &H, index: usize) -> Result<Vec<usize>> {
    let num_columns = headers.num_columns()?;
    ensure_index(index, num_columns)?;
    Ok((0..num_columns).filter(|&column| column != index).collect())
}

/// The indices of the headers named `names`, in the order given.
///
/// Fails with [`Error::InvalidArgument`] if a name is unknown or repeated.
pub fn header_subset_indices<H: Headers + ?Sized>(headers: &H, names: &[&str]) -> Result<Vec<usize>> {
    let columns = names
        .iter()
        .map(|name| {
            headers.index_of(name)?.ok_or_else(|| {
                Error::invalid_argument(format!("No header named \"{}\"", name))
            })
        })
        .collect::<Result<Vec<_>>>()?;
    validate_columns(&columns, headers.num_columns()?)?;
    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_core::types::Numeric;
    use tabula_core::MutableHeaders;

    fn headers() -> MutableHeaders {
        let mut headers = MutableHeaders::new();
        for name in ["a", "b", "c"] {
            headers.append(name, Numeric::new(true), false).unwrap();
        }
        headers
    }

    #[test]
    fn test_translate() {
        assert_eq!(translate_column(None, 4), Ok(4));
        assert_eq!(translate_column(Some(&[2, 0][..]), 1), Ok(0));
        assert_eq!(
            translate_row(Some(&[2, 2][..]), 2),
            Err(Error::index_out_of_bounds(2, 2))
        );
    }

    #[test]
    fn test_validate_rows() {
        assert!(validate_rows(&[1, 1, 0], 2).is_ok());
        assert_eq!(validate_rows(&[2], 2), Err(Error::index_out_of_bounds(2, 2)));
    }

    #[test]
    fn test_all_columns_except() {
        let headers = headers();
        assert_eq!(all_columns_except(&headers, 1), Ok(vec![0, 2]));
        assert!(all_columns_except(&headers, 3).is_err());
    }

    #[test]
    fn test_header_subset_indices() {
        let headers = headers();
        assert_eq!(header_subset_indices(&headers, &["c", "a"]), Ok(vec![2, 0]));
        assert!(matches!(
            header_subset_indices(&headers, &["d"]),
            Err(Error::InvalidArgument { .. })
        ));
        assert!(matches!(
            header_subset_indices(&headers, &["a", "a"]),
            Err(Error::InvalidArgument { .. })
        ));
    }
}
