//! Charts module - Chart intents, builders and specifications

mod builder;
mod intent;
mod spec;

pub use builder::{ChartBuilder, ChartError};
pub use intent::*;
pub use spec::*;
