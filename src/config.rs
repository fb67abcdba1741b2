//! Dashboard configuration
//! Declarative description of datasets and tabs, loaded from TOML.

use crate::charts::ChartIntent;
use crate::data::{ColumnSpec, DatasetSource, SchemaContract};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("duplicate dataset id '{0}'")]
    DuplicateDataset(String),
    #[error("duplicate tab title '{0}'")]
    DuplicateTab(String),
    #[error("tab '{tab}' references unknown dataset '{dataset}'")]
    UnknownDataset { tab: String, dataset: String },
    #[error("no tab titled '{0}'")]
    UnknownTab(String),
}

/// A named CSV source with its expected columns.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetConfig {
    pub id: String,
    pub source: String,
    #[serde(default)]
    pub columns: Vec<ColumnSpec>,
}

impl DatasetConfig {
    pub fn contract(&self) -> SchemaContract {
        SchemaContract::new(self.columns.clone())
    }
}

/// One sidebar entry.
#[derive(Debug, Clone, Deserialize)]
pub struct TabConfig {
    pub title: String,
    #[serde(default)]
    pub charts: Vec<ChartIntent>,
}

impl TabConfig {
    /// Dataset ids this tab reads, in first-use order.
    pub fn dataset_ids(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.charts
            .iter()
            .flat_map(|c| c.datasets())
            .filter(|id| seen.insert(*id))
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub datasets: Vec<DatasetConfig>,
    #[serde(default)]
    pub tabs: Vec<TabConfig>,
    /// Directory relative local sources resolve against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl DashboardConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml(&text)?;
        config.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut ids = HashSet::new();
        for ds in &self.datasets {
            if !ids.insert(ds.id.as_str()) {
                return Err(ConfigError::DuplicateDataset(ds.id.clone()));
            }
        }

        let mut titles = HashSet::new();
        for tab in &self.tabs {
            if !titles.insert(tab.title.as_str()) {
                return Err(ConfigError::DuplicateTab(tab.title.clone()));
            }
            if let Some(missing) = tab.dataset_ids().into_iter().find(|id| !ids.contains(id)) {
                return Err(ConfigError::UnknownDataset {
                    tab: tab.title.clone(),
                    dataset: missing.to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn tab(&self, title: &str) -> Result<&TabConfig, ConfigError> {
        self.tabs
            .iter()
            .find(|t| t.title == title)
            .ok_or_else(|| ConfigError::UnknownTab(title.to_string()))
    }

    pub fn tab_titles(&self) -> Vec<&str> {
        self.tabs.iter().map(|t| t.title.as_str()).collect()
    }

    pub fn dataset(&self, id: &str) -> Option<&DatasetConfig> {
        self.datasets.iter().find(|d| d.id == id)
    }

    pub fn source_of(&self, dataset: &DatasetConfig) -> DatasetSource {
        DatasetSource::parse(&dataset.source).relative_to(&self.base_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::{AxisValue, MarkerSelect};
    use crate::data::ColumnKind;

    const SAMPLE: &str = r#"
title = "Streaming"

[[datasets]]
id = "netflix"
source = "data/netflix.csv"

[[datasets.columns]]
name = "Quarter"
kind = "quarter"

[[datasets.columns]]
name = "Runtime"
kind = "integer"
unit = " min"

[[datasets]]
id = "disney"
source = "https://example.com/disney.csv"

[[datasets.columns]]
name = "Disney Sub Change Q2Q"
kind = "float"
aliases = ["Disney + Sub Change Q2Q"]

[[tabs]]
title = "Subscribers"

[[tabs.charts]]
kind = "time_series"
dataset = "netflix"
secondary_dataset = "disney"
x = "Quarter"
height = 370

[[tabs.charts.series]]
column = "Sub Increase Q2Q M"
name = "Netflix"

[[tabs.charts.markers]]
name = "Password Sharing Crackdown"
series = "Sub Increase Q2Q M"
select = { equals = "23Q1" }

[[tabs.charts.regions]]
x0 = "19Q4"
x1 = "20Q2"
y0 = 0
y1 = 16
label = "COVID-19 Pandemic"

[[tabs]]
title = "Genres"

[[tabs.charts]]
kind = "bar_ranking"
dataset = "netflix"
category = "Genre"
value = "Hours Viewed"
aggregate = "mean"
top_n = 5
"#;

    #[test]
    fn parses_datasets_and_tabs() {
        let config = DashboardConfig::from_toml(SAMPLE).unwrap();
        assert_eq!(config.title.as_deref(), Some("Streaming"));
        assert_eq!(config.tab_titles(), vec!["Subscribers", "Genres"]);

        let netflix = config.dataset("netflix").unwrap();
        assert_eq!(netflix.columns[1].kind, ColumnKind::Integer);
        assert_eq!(netflix.columns[1].unit.as_deref(), Some(" min"));
        assert_eq!(
            config.dataset("disney").unwrap().columns[0].aliases,
            vec!["Disney + Sub Change Q2Q"]
        );

        let tab = config.tab("Subscribers").unwrap();
        assert_eq!(tab.dataset_ids(), vec!["netflix", "disney"]);
        let ChartIntent::TimeSeries(chart) = &tab.charts[0] else {
            panic!("expected time series");
        };
        assert_eq!(chart.height, Some(370));
        assert!(matches!(&chart.markers[0].select, MarkerSelect::Equals(v) if v == "23Q1"));
        assert_eq!(chart.regions[0].x0, AxisValue::Label("19Q4".to_string()));
        assert_eq!(chart.regions[0].y1, 16.0);

        let ChartIntent::BarRanking(bar) = &config.tab("Genres").unwrap().charts[0] else {
            panic!("expected bar ranking");
        };
        assert_eq!(bar.top_n, Some(5));
    }

    #[test]
    fn relative_sources_resolve_against_config_dir() {
        let mut config = DashboardConfig::from_toml(SAMPLE).unwrap();
        config.base_dir = PathBuf::from("/srv/dash");
        let netflix = config.dataset("netflix").unwrap();
        assert_eq!(
            config.source_of(netflix),
            DatasetSource::Local(PathBuf::from("/srv/dash/data/netflix.csv"))
        );
        let disney = config.dataset("disney").unwrap();
        assert!(matches!(config.source_of(disney), DatasetSource::Remote(_)));
    }

    #[test]
    fn unknown_dataset_reference_is_rejected() {
        let text = r#"
[[tabs]]
title = "Broken"
[[tabs.charts]]
kind = "pie"
dataset = "nowhere"
category = "Genre"
value = "Hours"
"#;
        assert!(matches!(
            DashboardConfig::from_toml(text),
            Err(ConfigError::UnknownDataset { .. })
        ));
    }

    #[test]
    fn duplicate_tabs_and_unknown_lookup() {
        let text = r#"
[[tabs]]
title = "A"
[[tabs]]
title = "A"
"#;
        assert!(matches!(
            DashboardConfig::from_toml(text),
            Err(ConfigError::DuplicateTab(_))
        ));

        let config = DashboardConfig::from_toml(SAMPLE).unwrap();
        assert!(matches!(config.tab("Missing"), Err(ConfigError::UnknownTab(_))));
    }
}
