//! Chart intents
//! Declarative descriptions of one chart, deserialized from the dashboard
//! config and consumed by [`ChartBuilder`](super::ChartBuilder).

use crate::charts::spec::AxisValue;
use crate::data::Aggregation;
use serde::Deserialize;

fn default_true() -> bool {
    true
}

fn default_frame_ms() -> u32 {
    800
}

/// One plotted column.
#[derive(Debug, Clone, Deserialize)]
pub struct SeriesSpec {
    pub column: String,
    /// Legend name; defaults to the column name.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    /// Read from the chart's secondary dataset instead of the primary one.
    #[serde(default)]
    pub secondary: bool,
}

impl SeriesSpec {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            name: None,
            color: None,
            secondary: false,
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.column)
    }
}

/// Which rows an event marker highlights.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerSelect {
    /// Rows where this boolean column is `true`.
    Flag(String),
    /// The first row whose x value equals this literal.
    Equals(String),
}

/// Discrete points re-plotted on top of a series with their own styling.
#[derive(Debug, Clone, Deserialize)]
pub struct EventMarker {
    pub name: String,
    /// Column providing the y values of the highlighted points.
    pub series: String,
    pub select: MarkerSelect,
    #[serde(default)]
    pub secondary: bool,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub size: Option<f64>,
    #[serde(default)]
    pub color: Option<String>,
}

/// A literal shaded rectangle marking a known external event.
#[derive(Debug, Clone, Deserialize)]
pub struct Region {
    pub x0: AxisValue,
    pub x1: AxisValue,
    pub y0: f64,
    pub y1: f64,
    #[serde(default)]
    pub label: Option<String>,
    /// Height of the label arrow's tip; defaults to `y1`.
    #[serde(default)]
    pub label_y: Option<f64>,
    #[serde(default)]
    pub fill: Option<String>,
    #[serde(default)]
    pub border: Option<String>,
}

/// Restrict a chart to rows where `column == equals`.
#[derive(Debug, Clone, Deserialize)]
pub struct RowFilter {
    pub column: String,
    pub equals: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimeSeriesChart {
    pub dataset: String,
    #[serde(default)]
    pub secondary_dataset: Option<String>,
    pub x: String,
    pub series: Vec<SeriesSpec>,
    #[serde(default)]
    pub markers: Vec<EventMarker>,
    #[serde(default)]
    pub regions: Vec<Region>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub x_title: Option<String>,
    #[serde(default)]
    pub y_title: Option<String>,
    #[serde(default)]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BarRankingChart {
    pub dataset: String,
    pub category: String,
    pub value: String,
    #[serde(default)]
    pub aggregate: Aggregation,
    #[serde(default)]
    pub top_n: Option<usize>,
    #[serde(default)]
    pub filter: Option<RowFilter>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub x_title: Option<String>,
    #[serde(default)]
    pub y_title: Option<String>,
    #[serde(default)]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TwoBucketChart {
    pub dataset: String,
    /// Column searched for the named entries.
    pub title_column: String,
    pub value: String,
    /// Substrings identifying the named entries.
    pub named: Vec<String>,
    #[serde(default)]
    pub named_label: Option<String>,
    #[serde(default)]
    pub other_label: Option<String>,
    #[serde(default)]
    pub within: Option<RowFilter>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub y_title: Option<String>,
    #[serde(default)]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PieChart {
    pub dataset: String,
    pub category: String,
    pub value: String,
    /// Keep the largest N slices and fold the rest into "Other".
    #[serde(default)]
    pub top_n: Option<usize>,
    #[serde(default)]
    pub filter: Option<RowFilter>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnimatedPieChart {
    pub dataset: String,
    /// One frame per distinct value of this column.
    pub axis: String,
    /// Fixed set of columns shown as slices in every frame.
    pub categories: Vec<SeriesSpec>,
    #[serde(default = "default_frame_ms")]
    pub frame_ms: u32,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistogramChart {
    pub dataset: String,
    pub column: String,
    #[serde(default)]
    pub bins: Option<usize>,
    #[serde(default)]
    pub filter: Option<RowFilter>,
    /// Draw mean and median reference lines.
    #[serde(default = "default_true")]
    pub reference_lines: bool,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub x_title: Option<String>,
    #[serde(default)]
    pub y_title: Option<String>,
    #[serde(default)]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonthlyMeanChart {
    pub dataset: String,
    pub date: String,
    pub value: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub x_title: Option<String>,
    #[serde(default)]
    pub y_title: Option<String>,
    #[serde(default)]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeriesPickerChart {
    pub dataset: String,
    pub x: String,
    /// Selectable columns; when empty any dataset column may be picked.
    #[serde(default)]
    pub options: Vec<SeriesSpec>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub x_title: Option<String>,
    #[serde(default)]
    pub y_title: Option<String>,
    #[serde(default)]
    pub height: Option<u32>,
}

impl SeriesPickerChart {
    /// The configured option matching a column or legend name.
    pub fn option(&self, name: &str) -> Option<&SeriesSpec> {
        self.options
            .iter()
            .find(|o| o.column == name || o.name.as_deref() == Some(name))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartIntent {
    TimeSeries(TimeSeriesChart),
    BarRanking(BarRankingChart),
    TwoBucket(TwoBucketChart),
    Pie(PieChart),
    AnimatedPie(AnimatedPieChart),
    Histogram(HistogramChart),
    MonthlyMean(MonthlyMeanChart),
    SeriesPicker(SeriesPickerChart),
}

impl ChartIntent {
    pub fn dataset(&self) -> &str {
        match self {
            ChartIntent::TimeSeries(c) => &c.dataset,
            ChartIntent::BarRanking(c) => &c.dataset,
            ChartIntent::TwoBucket(c) => &c.dataset,
            ChartIntent::Pie(c) => &c.dataset,
            ChartIntent::AnimatedPie(c) => &c.dataset,
            ChartIntent::Histogram(c) => &c.dataset,
            ChartIntent::MonthlyMean(c) => &c.dataset,
            ChartIntent::SeriesPicker(c) => &c.dataset,
        }
    }

    pub fn secondary_dataset(&self) -> Option<&str> {
        match self {
            ChartIntent::TimeSeries(c) => c.secondary_dataset.as_deref(),
            _ => None,
        }
    }

    /// Every dataset id this chart reads.
    pub fn datasets(&self) -> Vec<&str> {
        let mut ids = vec![self.dataset()];
        ids.extend(self.secondary_dataset());
        ids
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            ChartIntent::TimeSeries(c) => c.title.as_deref(),
            ChartIntent::BarRanking(c) => c.title.as_deref(),
            ChartIntent::TwoBucket(c) => c.title.as_deref(),
            ChartIntent::Pie(c) => c.title.as_deref(),
            ChartIntent::AnimatedPie(c) => c.title.as_deref(),
            ChartIntent::Histogram(c) => c.title.as_deref(),
            ChartIntent::MonthlyMean(c) => c.title.as_deref(),
            ChartIntent::SeriesPicker(c) => c.title.as_deref(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ChartIntent::TimeSeries(_) => "time_series",
            ChartIntent::BarRanking(_) => "bar_ranking",
            ChartIntent::TwoBucket(_) => "two_bucket",
            ChartIntent::Pie(_) => "pie",
            ChartIntent::AnimatedPie(_) => "animated_pie",
            ChartIntent::Histogram(_) => "histogram",
            ChartIntent::MonthlyMean(_) => "monthly_mean",
            ChartIntent::SeriesPicker(_) => "series_picker",
        }
    }
}
