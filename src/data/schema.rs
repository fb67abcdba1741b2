//! Schema contract
//! The set of columns a dataset must provide, with their expected types.

use crate::data::quarter::QuarterLabel;
use polars::prelude::*;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("missing column '{column}'")]
    MissingColumn { column: String },
    #[error("column '{column}' has type {found}, expected {expected:?}")]
    WrongType {
        column: String,
        expected: ColumnKind,
        found: String,
    },
    #[error("column '{column}' row {row}: invalid quarter label '{value}'")]
    InvalidQuarter {
        column: String,
        row: usize,
        value: String,
    },
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Logical type of a declared column; also selects its normalization rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Text,
    Quarter,
    Integer,
    Float,
    Percent,
    Date,
    Flag,
}

impl ColumnKind {
    fn accepts(&self, dtype: &DataType) -> bool {
        match self {
            ColumnKind::Text | ColumnKind::Quarter => matches!(dtype, DataType::String),
            ColumnKind::Integer => matches!(dtype, DataType::Int64),
            ColumnKind::Float | ColumnKind::Percent => matches!(dtype, DataType::Float64),
            ColumnKind::Date => matches!(dtype, DataType::Date),
            ColumnKind::Flag => matches!(dtype, DataType::Boolean),
        }
    }
}

/// One required column.
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: ColumnKind,
    /// Unit suffix stripped before numeric parsing, e.g. `" min"`.
    #[serde(default)]
    pub unit: Option<String>,
    /// strftime format for date columns.
    #[serde(default)]
    pub format: Option<String>,
    /// Other spellings of the same column found in older exports.
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
            unit: None,
            format: None,
            aliases: Vec::new(),
        }
    }
}

/// Named set of required columns, validated by the loader before handoff.
#[derive(Debug, Clone, Default)]
pub struct SchemaContract {
    pub columns: Vec<ColumnSpec>,
}

impl SchemaContract {
    pub fn new(columns: Vec<ColumnSpec>) -> Self {
        Self { columns }
    }

    /// Rename aliased columns to their canonical names; fail on any column
    /// found under neither.
    pub fn resolve_columns(&self, df: &mut DataFrame) -> Result<(), SchemaError> {
        for spec in &self.columns {
            if has_column(df, &spec.name) {
                continue;
            }
            let alias = spec
                .aliases
                .iter()
                .find(|alias| has_column(df, alias))
                .cloned()
                .ok_or_else(|| SchemaError::MissingColumn {
                    column: spec.name.clone(),
                })?;
            df.rename(&alias, spec.name.as_str().into())?;
        }
        Ok(())
    }

    /// Check the normalized frame against the declared types.
    pub fn validate(&self, df: &DataFrame) -> Result<(), SchemaError> {
        for spec in &self.columns {
            let column = df
                .column(&spec.name)
                .map_err(|_| SchemaError::MissingColumn {
                    column: spec.name.clone(),
                })?;

            if !spec.kind.accepts(column.dtype()) {
                return Err(SchemaError::WrongType {
                    column: spec.name.clone(),
                    expected: spec.kind,
                    found: column.dtype().to_string(),
                });
            }

            if spec.kind == ColumnKind::Quarter {
                for (row, value) in column.str()?.into_iter().enumerate() {
                    let Some(value) = value else { continue };
                    if value.parse::<QuarterLabel>().is_err() {
                        return Err(SchemaError::InvalidQuarter {
                            column: spec.name.clone(),
                            row,
                            value: value.to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == name)
}
