//! Tab Renderer
//! Generic routine turning one tab descriptor into chart specs and notices.
//! Datasets are loaded fresh on every render.

use crate::charts::{ChartBuilder, ChartError, ChartIntent, ChartSpec, SeriesPickerChart};
use crate::config::{ConfigError, DashboardConfig, TabConfig};
use crate::data::{has_column, DataLoader, Dataset, LoaderError};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{info, warn};

const DEFAULT_PROMPT: &str = "Select at least one series to display.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Prompt,
    Error,
}

/// A user-visible message shown in place of, or beside, charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn prompt(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Prompt,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// One rendered chart slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedChart {
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub spec: ChartSpec,
}

/// Everything the rendering surface needs for one tab.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TabView {
    pub title: String,
    pub charts: Vec<RenderedChart>,
    pub notices: Vec<Notice>,
}

impl TabView {
    fn empty(title: &str) -> Self {
        Self {
            title: title.to_string(),
            charts: Vec::new(),
            notices: Vec::new(),
        }
    }

    pub fn has_errors(&self) -> bool {
        self.notices.iter().any(|n| n.level == NoticeLevel::Error)
    }
}

/// What the caller picked on the input surface.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// Series offered to every picker; each picker keeps the ones it can plot.
    pub series: Vec<String>,
    /// Series for one picker, keyed by chart title. Replaces `series` for that chart.
    pub by_chart: HashMap<String, Vec<String>>,
    /// Titles of the charts to build; empty builds every chart of the tab.
    pub only: Vec<String>,
}

impl Selection {
    pub fn new(series: Vec<String>) -> Self {
        Self {
            series,
            ..Default::default()
        }
    }

    /// `col` applies to every picker, `chart=col` to the picker titled `chart`.
    pub fn from_args(select: Vec<String>, only: Vec<String>) -> Self {
        let mut selection = Self {
            only,
            ..Default::default()
        };
        for arg in select {
            match arg.split_once('=') {
                Some((chart, column)) => selection
                    .by_chart
                    .entry(chart.trim().to_string())
                    .or_default()
                    .push(column.trim().to_string()),
                None => selection.series.push(arg),
            }
        }
        selection
    }

    pub fn with_chart(mut self, chart: impl Into<String>, series: Vec<String>) -> Self {
        self.by_chart.insert(chart.into(), series);
        self
    }

    pub fn only(mut self, charts: Vec<String>) -> Self {
        self.only = charts;
        self
    }

    fn includes(&self, intent: &ChartIntent) -> bool {
        self.only.is_empty()
            || intent
                .title()
                .is_some_and(|title| self.only.iter().any(|t| t == title))
    }

    fn series_for(&self, chart: &SeriesPickerChart, ds: &Dataset) -> Vec<String> {
        if let Some(explicit) = chart.title.as_ref().and_then(|t| self.by_chart.get(t)) {
            return explicit.clone();
        }
        self.series
            .iter()
            .filter(|name| {
                if chart.options.is_empty() {
                    has_column(&ds.df, name)
                } else {
                    chart.option(name).is_some()
                }
            })
            .cloned()
            .collect()
    }
}

/// Renders tabs of one dashboard.
pub struct TabRenderer<'a> {
    config: &'a DashboardConfig,
    loader: &'a DataLoader,
}

impl<'a> TabRenderer<'a> {
    pub fn new(config: &'a DashboardConfig, loader: &'a DataLoader) -> Self {
        Self { config, loader }
    }

    pub fn render(&self, title: &str, selection: &Selection) -> Result<TabView, ConfigError> {
        let tab = self.config.tab(title)?;
        Ok(self.render_tab(tab, selection))
    }

    /// Load every dataset the selected charts need, then build them.
    ///
    /// A dataset that fails to load leaves the tab with one error notice and no
    /// charts. A chart that fails to build adds an error notice; the rest still render.
    pub fn render_tab(&self, tab: &TabConfig, selection: &Selection) -> TabView {
        info!(tab = %tab.title, "rendering tab");
        let mut view = TabView::empty(&tab.title);

        for wanted in &selection.only {
            if !tab.charts.iter().any(|c| c.title() == Some(wanted.as_str())) {
                view.notices
                    .push(Notice::error(format!("no chart titled '{wanted}' in this tab")));
            }
        }
        let charts: Vec<&ChartIntent> = tab.charts.iter().filter(|c| selection.includes(c)).collect();

        let datasets = match self.load_datasets(&charts) {
            Ok(datasets) => datasets,
            Err(err) => {
                warn!(tab = %tab.title, error = %err, "dataset load failed");
                let message = if err.is_acquisition() {
                    format!("Error fetching data: {err}")
                } else {
                    format!("Unexpected data shape: {err}")
                };
                view.notices.push(Notice::error(message));
                return view;
            }
        };

        for intent in charts {
            match Self::build_chart(intent, &datasets, selection) {
                Ok(Some(spec)) => view.charts.push(RenderedChart {
                    kind: intent.kind(),
                    title: intent.title().map(str::to_string),
                    spec,
                }),
                Ok(None) => {
                    let prompt = match intent {
                        ChartIntent::SeriesPicker(c) => c.prompt.as_deref(),
                        _ => None,
                    };
                    view.notices.push(Notice::prompt(prompt.unwrap_or(DEFAULT_PROMPT)));
                }
                Err(err) => {
                    warn!(tab = %tab.title, chart = intent.kind(), error = %err, "chart build failed");
                    let chart = intent.title().unwrap_or(intent.kind());
                    view.notices.push(Notice::error(format!("{chart}: {err}")));
                }
            }
        }

        info!(tab = %tab.title, charts = view.charts.len(), notices = view.notices.len(), "tab rendered");
        view
    }

    fn load_datasets(&self, charts: &[&ChartIntent]) -> Result<HashMap<String, Dataset>, LoaderError> {
        let mut seen = HashSet::new();
        let mut datasets = HashMap::new();
        for id in charts.iter().flat_map(|c| c.datasets()) {
            if !seen.insert(id) {
                continue;
            }
            // Config validation guarantees every referenced id is declared.
            let Some(ds_config) = self.config.dataset(id) else {
                continue;
            };
            let source = self.config.source_of(ds_config);
            let ds = self.loader.load(id, &source, &ds_config.contract())?;
            datasets.insert(id.to_string(), ds);
        }
        Ok(datasets)
    }

    /// Dispatch one intent to its builder. `Ok(None)` means "withhold and prompt".
    pub fn build_chart(
        intent: &ChartIntent,
        datasets: &HashMap<String, Dataset>,
        selection: &Selection,
    ) -> Result<Option<ChartSpec>, ChartError> {
        let primary = datasets
            .get(intent.dataset())
            .ok_or_else(|| ChartError::DatasetNotLoaded(intent.dataset().to_string()))?;
        let secondary = intent.secondary_dataset().and_then(|id| datasets.get(id));

        let spec = match intent {
            ChartIntent::TimeSeries(c) => ChartBuilder::time_series(c, primary, secondary)?,
            ChartIntent::BarRanking(c) => ChartBuilder::bar_ranking(c, primary)?,
            ChartIntent::TwoBucket(c) => ChartBuilder::two_bucket(c, primary)?,
            ChartIntent::Pie(c) => ChartBuilder::pie(c, primary)?,
            ChartIntent::AnimatedPie(c) => ChartBuilder::animated_pie(c, primary)?,
            ChartIntent::Histogram(c) => ChartBuilder::histogram(c, primary)?,
            ChartIntent::MonthlyMean(c) => ChartBuilder::monthly_mean(c, primary)?,
            ChartIntent::SeriesPicker(c) => {
                let picked = selection.series_for(c, primary);
                return ChartBuilder::series_picker(c, primary, &picked);
            }
        };
        Ok(Some(spec))
    }
}
