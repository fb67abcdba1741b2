//! Streamboard - streaming subscription & viewing dashboards
//!
//! Loads CSV datasets described by a TOML dashboard config and turns each tab
//! into chart specifications a plotting surface can display.

pub mod charts;
pub mod config;
pub mod data;
pub mod stats;
pub mod tabs;
