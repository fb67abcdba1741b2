//! CSV Data Loader Module
//! Resolves a dataset identifier (remote URL or local path) to a normalized,
//! schema-checked Polars DataFrame.

use crate::data::normalize::normalize_frame;
use crate::data::schema::{SchemaContract, SchemaError};
use polars::prelude::*;
use std::fmt;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("Failed to fetch {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to fetch {url}: HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Dataset '{dataset}': {source}")]
    Schema {
        dataset: String,
        #[source]
        source: SchemaError,
    },
}

impl LoaderError {
    /// Acquisition failures (network, file, parse), as opposed to schema violations.
    pub fn is_acquisition(&self) -> bool {
        !matches!(self, LoaderError::Schema { .. })
    }
}

/// Where a dataset's CSV text lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    Remote(String),
    Local(PathBuf),
}

impl DatasetSource {
    /// `http://` and `https://` identifiers are remote, everything else is a path.
    pub fn parse(identifier: &str) -> Self {
        let trimmed = identifier.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            DatasetSource::Remote(trimmed.to_string())
        } else {
            DatasetSource::Local(PathBuf::from(trimmed))
        }
    }

    /// Anchor a relative local path at `base` (the config file's directory).
    pub fn relative_to(self, base: &Path) -> Self {
        match self {
            DatasetSource::Local(path) if path.is_relative() => {
                DatasetSource::Local(base.join(path))
            }
            other => other,
        }
    }
}

impl fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetSource::Remote(url) => write!(f, "{url}"),
            DatasetSource::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A normalized table, rows in file order.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub id: String,
    pub df: DataFrame,
}

impl Dataset {
    pub fn new(id: impl Into<String>, df: DataFrame) -> Self {
        Self { id: id.into(), df }
    }

    pub fn row_count(&self) -> usize {
        self.df.height()
    }

    pub fn columns(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }
}

/// Fetches and parses CSV tables. One attempt per call, no caching.
pub struct DataLoader {
    client: reqwest::blocking::Client,
}

impl DataLoader {
    pub fn new() -> Result<Self, LoaderError> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(LoaderError::Client)?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }

    /// Load, normalize and validate one dataset.
    pub fn load(
        &self,
        id: &str,
        source: &DatasetSource,
        contract: &SchemaContract,
    ) -> Result<Dataset, LoaderError> {
        info!(dataset = id, %source, "loading dataset");
        let bytes = match source {
            DatasetSource::Remote(url) => self.fetch_remote(url)?,
            DatasetSource::Local(path) => std::fs::read(path).map_err(|source| LoaderError::Io {
                path: path.clone(),
                source,
            })?,
        };

        let mut df = Self::parse_csv(bytes)?;
        debug!(dataset = id, rows = df.height(), columns = df.width(), "parsed csv");

        let schema_err = |source: SchemaError| LoaderError::Schema {
            dataset: id.to_string(),
            source,
        };
        contract.resolve_columns(&mut df).map_err(schema_err)?;
        normalize_frame(&mut df, &contract.columns).map_err(schema_err)?;
        contract.validate(&df).map_err(schema_err)?;

        Ok(Dataset::new(id, df))
    }

    fn fetch_remote(&self, url: &str) -> Result<Vec<u8>, LoaderError> {
        let transport = |source| LoaderError::Transport {
            url: url.to_string(),
            source,
        };
        let response = self.client.get(url).send().map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            warn!(url, status = status.as_u16(), "remote dataset request failed");
            return Err(LoaderError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = response.bytes().map_err(transport)?;
        Ok(body.to_vec())
    }

    /// Parse CSV text with a header row.
    pub fn parse_csv(bytes: Vec<u8>) -> Result<DataFrame, LoaderError> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .into_reader_with_file_handle(Cursor::new(bytes))
            .finish()?;
        Ok(df)
    }
}
