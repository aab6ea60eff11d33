//! Type and whitespace normalization applied in the resolve stage.

use polars::prelude::*;
use tracing::debug;

use vpa_model::schema::{TEXT_IDENTITY_COLUMNS, VOLUME};

use crate::error::{Result, Stage};
use crate::frame::require_columns;

/// Cast `Volume` to `Float64`. Values that do not parse become null.
pub fn cast_volume(df: &mut DataFrame) -> Result<()> {
    require_columns(df, Stage::Resolve, &[VOLUME])?;
    let column = df.column(VOLUME)?;
    if column.dtype() == &DataType::Float64 {
        return Ok(());
    }
    let before = column.null_count();
    let cast = column.cast(&DataType::Float64)?;
    let unparsed = cast.null_count().saturating_sub(before);
    if unparsed > 0 {
        debug!(column = VOLUME, unparsed, "non-numeric values became null");
    }
    df.with_column(cast)?;
    Ok(())
}

/// Trim surrounding whitespace in the text identity columns.
///
/// Absent or non-text columns are left alone. Returns the number of values
/// that changed.
pub fn trim_identity_columns(df: &mut DataFrame) -> Result<usize> {
    let mut changed = 0;
    for name in TEXT_IDENTITY_COLUMNS {
        let Ok(column) = df.column(name) else {
            continue;
        };
        let Ok(values) = column.str() else {
            continue;
        };

        let mut builder = StringChunkedBuilder::new(name.into(), df.height());
        for value in values {
            match value {
                Some(raw) => {
                    let trimmed = raw.trim();
                    if trimmed.len() != raw.len() {
                        changed += 1;
                    }
                    builder.append_value(trimmed);
                }
                None => builder.append_null(),
            }
        }
        df.with_column(builder.finish().into_series())?;
    }
    if changed > 0 {
        debug!(changed, "trimmed identity text values");
    }
    Ok(changed)
}
