//! Data module - CSV loading, normalization and processing

mod loader;
pub mod normalize;
mod processor;
mod quarter;
mod schema;

pub use loader::{DataLoader, Dataset, DatasetSource, LoaderError};
pub use processor::{Aggregation, BucketTotals, CategoryFilter, DataProcessor, ProcessorError};
pub use quarter::{QuarterLabel, QuarterParseError};
pub use schema::{has_column, ColumnKind, ColumnSpec, SchemaContract, SchemaError};
