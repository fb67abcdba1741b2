//! Column normalization
//! Cleans raw CSV text (unit suffixes, thousands separators, percent signs,
//! date strings, boolean flags) into typed polars columns.

use crate::data::schema::{ColumnKind, ColumnSpec, SchemaError};
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use tracing::{debug, warn};

/// Date format used when a date column does not declare one.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// `NaiveDate::num_days_from_ce` of 1970-01-01; polars stores dates as days since then.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

fn clean_numeric(raw: &str, unit: Option<&str>) -> String {
    let mut s = raw.trim();
    if let Some(unit) = unit {
        s = s.strip_suffix(unit).unwrap_or(s).trim_end();
    }
    s.chars().filter(|c| *c != ',').collect()
}

/// Parse `"1,234"` or `"90 min"` (with `unit = Some(" min")`) into an integer.
pub fn parse_integer(raw: &str, unit: Option<&str>) -> Option<i64> {
    let cleaned = clean_numeric(raw, unit);
    if cleaned.is_empty() {
        return None;
    }
    if let Ok(v) = cleaned.parse::<i64>() {
        return Some(v);
    }
    // "1,500.0" style exports
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.fract() == 0.0 && v.is_finite())
        .map(|v| v as i64)
}

pub fn parse_float(raw: &str, unit: Option<&str>) -> Option<f64> {
    let cleaned = clean_numeric(raw, unit);
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// `"12.5%"` -> `12.5`. A bare number is accepted as already being a percentage.
pub fn parse_percent(raw: &str) -> Option<f64> {
    parse_float(raw, Some("%"))
}

/// Flags compare by value: only an explicit true-ish token is `true`.
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Some(true),
        "false" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

pub fn parse_date(raw: &str, format: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), format).ok()
}

pub fn date_to_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

pub fn days_to_date(days: i32) -> Option<NaiveDate> {
    days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)
        .and_then(NaiveDate::from_num_days_from_ce_opt)
}

fn parse_strings<T, F>(column: &Column, parse: F) -> PolarsResult<Vec<Option<T>>>
where
    F: Fn(&str) -> Option<T>,
{
    Ok(column
        .str()?
        .into_iter()
        .map(|v| v.and_then(&parse))
        .collect())
}

/// Whole-valued floats become integers; anything with a fraction becomes null.
fn floats_to_integers(column: &Column) -> PolarsResult<Vec<Option<i64>>> {
    Ok(column
        .cast(&DataType::Float64)?
        .f64()?
        .into_iter()
        .map(|v| v.filter(|v| v.is_finite() && v.fract() == 0.0).map(|v| v as i64))
        .collect())
}

fn is_integer_type(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

fn is_numeric_type(dtype: &DataType) -> bool {
    is_integer_type(dtype) || matches!(dtype, DataType::Float32 | DataType::Float64)
}

fn wrong_type(spec: &ColumnSpec, dtype: &DataType) -> SchemaError {
    SchemaError::WrongType {
        column: spec.name.clone(),
        expected: spec.kind,
        found: dtype.to_string(),
    }
}

/// Normalize one declared column in place, replacing it with its typed form.
pub fn normalize_column(df: &mut DataFrame, spec: &ColumnSpec) -> Result<(), SchemaError> {
    let column = df
        .column(&spec.name)
        .map_err(|_| SchemaError::MissingColumn {
            column: spec.name.clone(),
        })?;
    let name = column.name().clone();
    let unit = spec.unit.as_deref();
    let dtype = column.dtype().clone();
    let is_text = matches!(dtype, DataType::String);
    let nulls_before = column.null_count();

    let normalized: Column = match spec.kind {
        ColumnKind::Text | ColumnKind::Quarter => {
            if is_text {
                return Ok(());
            }
            column.cast(&DataType::String)?
        }
        ColumnKind::Integer => match dtype {
            DataType::String => {
                Column::new(name.clone(), parse_strings(column, |s| parse_integer(s, unit))?)
            }
            DataType::Float32 | DataType::Float64 => {
                Column::new(name.clone(), floats_to_integers(column)?)
            }
            _ => column.cast(&DataType::Int64)?,
        },
        ColumnKind::Float => {
            if is_text {
                Column::new(name.clone(), parse_strings(column, |s| parse_float(s, unit))?)
            } else {
                column.cast(&DataType::Float64)?
            }
        }
        ColumnKind::Percent => {
            if is_text {
                Column::new(name.clone(), parse_strings(column, parse_percent)?)
            } else {
                column.cast(&DataType::Float64)?
            }
        }
        ColumnKind::Date => match dtype {
            DataType::Date => return Ok(()),
            DataType::String => {
                let format = spec.format.as_deref().unwrap_or(DEFAULT_DATE_FORMAT);
                let days = parse_strings(column, |s| parse_date(s, format).map(date_to_days))?;
                Column::new(name.clone(), days).cast(&DataType::Date)?
            }
            ref d if is_integer_type(d) => column.cast(&DataType::Date)?,
            ref other => return Err(wrong_type(spec, other)),
        },
        ColumnKind::Flag => match dtype {
            DataType::Boolean => return Ok(()),
            DataType::String => Column::new(name.clone(), parse_strings(column, parse_flag)?),
            ref d if is_numeric_type(d) => {
                let values: Vec<Option<bool>> = column
                    .cast(&DataType::Float64)?
                    .f64()?
                    .into_iter()
                    .map(|v| v.map(|v| v != 0.0))
                    .collect();
                Column::new(name.clone(), values)
            }
            ref other => return Err(wrong_type(spec, other)),
        },
    };

    let lost = normalized.null_count().saturating_sub(nulls_before);
    if lost > 0 {
        warn!(column = %name, cells = lost, kind = ?spec.kind, "cells could not be normalized");
    } else {
        debug!(column = %name, kind = ?spec.kind, "normalized column");
    }

    df.with_column(normalized)?;
    Ok(())
}

/// Normalize every declared column that exists in the frame.
pub fn normalize_frame(df: &mut DataFrame, specs: &[ColumnSpec]) -> Result<(), SchemaError> {
    for spec in specs {
        normalize_column(df, spec)?;
    }
    Ok(())
}
