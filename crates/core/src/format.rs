//! Rendering rows as text.

use crate::error::{Error, Result};
use crate::row::DataRow;
use crate::types::MISSING_LABEL;

/// Renders a row as `[name: value, ...]`, missing values as `<missing>`.
pub fn format_row<R: DataRow + ?Sized>(row: &R) -> Result<String> {
    let columns = (0..row.num_columns()?)
        .map(|column| {
            let header = row.header(column)?;
            Ok(format!("{}: {}", header.name(), format_value(row, column)?))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(format!("[{}]", columns.join(", ")))
}

/// Renders just the values of a row, each followed by a comma.
pub fn format_row_values<R: DataRow + ?Sized>(row: &R) -> Result<String> {
    let mut out = String::new();
    for column in 0..row.num_columns()? {
        out.push_str(&format_value(row, column)?);
        out.push(',');
    }
    Ok(out)
}

fn format_value<R: DataRow + ?Sized>(row: &R, column: usize) -> Result<String> {
    let header = row.header(column)?;
    match row.raw_value(column)? {
        None => Ok(MISSING_LABEL.to_string()),
        Some(raw) => header
            .data_type()
            .dyn_format_internal(&*raw)
            .ok_or_else(|| Error::type_mismatch(header.data_type(), "raw value of another type")),
    }
}
