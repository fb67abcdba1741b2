//! Data Processor Module
//! Column extraction, grouping, filtering and date bucketing over normalized frames.

use crate::data::normalize::days_to_date;
use chrono::Datelike;
use polars::prelude::*;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("missing column '{0}'")]
    MissingColumn(String),
    #[error("column '{column}' is {found}, expected a date")]
    NotADate { column: String, found: String },
}

/// Aggregation applied per group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    #[default]
    Sum,
    Mean,
}

/// Totals of a named-vs-rest split.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BucketTotals {
    pub named: f64,
    pub other: f64,
}

impl BucketTotals {
    pub fn total(&self) -> f64 {
        self.named + self.other
    }
}

/// Restricts a computation to rows where `column == value`.
#[derive(Debug, Clone, Copy)]
pub struct CategoryFilter<'a> {
    pub column: &'a str,
    pub value: &'a str,
}

/// Stateless transformations over normalized DataFrames.
pub struct DataProcessor;

impl DataProcessor {
    pub fn require<'a>(df: &'a DataFrame, column: &str) -> Result<&'a Column, ProcessorError> {
        df.column(column)
            .map_err(|_| ProcessorError::MissingColumn(column.to_string()))
    }

    /// Column values rendered as axis labels (dates as `YYYY-MM-DD`).
    pub fn labels(df: &DataFrame, column: &str) -> Result<Vec<Option<String>>, ProcessorError> {
        let series = Self::require(df, column)?;
        if matches!(series.dtype(), DataType::Date) {
            let days = series.cast(&DataType::Int32)?;
            return Ok(days
                .i32()?
                .into_iter()
                .map(|d| d.and_then(days_to_date).map(|d| d.format("%Y-%m-%d").to_string()))
                .collect());
        }
        let text = series.cast(&DataType::String)?;
        Ok(text
            .str()?
            .into_iter()
            .map(|v| v.map(|s| s.to_string()))
            .collect())
    }

    pub fn numbers(df: &DataFrame, column: &str) -> Result<Vec<Option<f64>>, ProcessorError> {
        let series = Self::require(df, column)?;
        let values = series.cast(&DataType::Float64)?;
        Ok(values.f64()?.into_iter().collect())
    }

    /// Per-row flag state; nulls and other values count as not flagged.
    pub fn flags(df: &DataFrame, column: &str) -> Result<Vec<bool>, ProcessorError> {
        let series = Self::require(df, column)?;
        let values = series.cast(&DataType::Boolean)?;
        Ok(values
            .bool()?
            .into_iter()
            .map(|v| v == Some(true))
            .collect())
    }

    /// Rows whose flag column equals `true`.
    pub fn filter_flagged(df: &DataFrame, flag_column: &str) -> Result<DataFrame, ProcessorError> {
        let mask = Self::flags(df, flag_column)?;
        let mask = BooleanChunked::new("mask".into(), mask.as_slice());
        Ok(df.filter(&mask)?)
    }

    /// Rows where `column == value`.
    pub fn filter_equals(
        df: &DataFrame,
        column: &str,
        value: &str,
    ) -> Result<DataFrame, ProcessorError> {
        Self::require(df, column)?;
        let filtered = df
            .clone()
            .lazy()
            .filter(col(column).cast(DataType::String).eq(lit(value)))
            .collect()?;
        Ok(filtered)
    }

    /// Index of the first row where `column == value`, if any.
    pub fn find_row(df: &DataFrame, column: &str, value: &str) -> Result<Option<usize>, ProcessorError> {
        Ok(Self::labels(df, column)?
            .iter()
            .position(|label| label.as_deref() == Some(value)))
    }

    /// Distinct non-null values in order of first appearance.
    pub fn distinct_in_order(df: &DataFrame, column: &str) -> Result<Vec<String>, ProcessorError> {
        let mut seen = HashSet::new();
        Ok(Self::labels(df, column)?
            .into_iter()
            .flatten()
            .filter(|label| seen.insert(label.clone()))
            .collect())
    }

    /// Group by `category`, aggregate `value`, sort descending (ties by name).
    pub fn aggregate_by(
        df: &DataFrame,
        category: &str,
        value: &str,
        aggregation: Aggregation,
    ) -> Result<Vec<(String, f64)>, ProcessorError> {
        Self::require(df, category)?;
        Self::require(df, value)?;

        let value_expr = col(value).cast(DataType::Float64);
        let agg_expr = match aggregation {
            Aggregation::Sum => value_expr.sum(),
            Aggregation::Mean => value_expr.mean(),
        };
        let grouped = df
            .clone()
            .lazy()
            .group_by([col(category).cast(DataType::String)])
            .agg([agg_expr])
            .collect()?;

        let keys = Self::labels(&grouped, category)?;
        let totals = Self::numbers(&grouped, value)?;
        let mut result: Vec<(String, f64)> = keys
            .into_iter()
            .zip(totals)
            .filter_map(|(k, v)| Some((k?, v.unwrap_or(0.0))))
            .collect();

        result.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        Ok(result)
    }

    pub fn sum_by(df: &DataFrame, category: &str, value: &str) -> Result<Vec<(String, f64)>, ProcessorError> {
        Self::aggregate_by(df, category, value, Aggregation::Sum)
    }

    /// Split `value` totals into rows whose title contains any needle vs the rest.
    ///
    /// Every row (within `filter`, when given) lands in exactly one bucket.
    pub fn split_named(
        df: &DataFrame,
        title_column: &str,
        value_column: &str,
        needles: &[String],
        filter: Option<CategoryFilter<'_>>,
    ) -> Result<BucketTotals, ProcessorError> {
        let titles = Self::labels(df, title_column)?;
        let values = Self::numbers(df, value_column)?;
        let categories = match filter {
            Some(f) => Some(Self::labels(df, f.column)?),
            None => None,
        };

        let mut totals = BucketTotals {
            named: 0.0,
            other: 0.0,
        };
        for (row, (title, value)) in titles.iter().zip(values).enumerate() {
            if let (Some(f), Some(categories)) = (filter, &categories) {
                if categories[row].as_deref() != Some(f.value) {
                    continue;
                }
            }
            let value = value.unwrap_or(0.0);
            let is_named = title
                .as_deref()
                .is_some_and(|t| needles.iter().any(|n| t.contains(n.as_str())));
            if is_named {
                totals.named += value;
            } else {
                totals.other += value;
            }
        }
        Ok(totals)
    }

    /// Mean of `value` per calendar month of `date_column`, chronological, labelled `YYYY-MM`.
    pub fn mean_by_month(
        df: &DataFrame,
        date_column: &str,
        value_column: &str,
    ) -> Result<Vec<(String, f64)>, ProcessorError> {
        let dates = Self::require(df, date_column)?;
        if !matches!(dates.dtype(), DataType::Date) {
            return Err(ProcessorError::NotADate {
                column: date_column.to_string(),
                found: dates.dtype().to_string(),
            });
        }
        let days = dates.cast(&DataType::Int32)?;
        let values = Self::numbers(df, value_column)?;

        let mut buckets: BTreeMap<(i32, u32), (f64, usize)> = BTreeMap::new();
        for (day, value) in days.i32()?.into_iter().zip(values) {
            let (Some(date), Some(value)) = (day.and_then(days_to_date), value) else {
                continue;
            };
            let entry = buckets.entry((date.year(), date.month())).or_insert((0.0, 0));
            entry.0 += value;
            entry.1 += 1;
        }

        Ok(buckets
            .into_iter()
            .map(|((year, month), (sum, n))| (format!("{year:04}-{month:02}"), sum / n as f64))
            .collect())
    }
}
