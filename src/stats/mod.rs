//! Stats module - Descriptive statistics

mod calculator;

pub use calculator::{StatsCalculator, SummaryStats};
