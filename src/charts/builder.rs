//! Chart Builder Module
//! Pure functions turning normalized datasets into chart specifications,
//! one per chart intent.

use crate::charts::intent::*;
use crate::charts::spec::*;
use crate::data::{CategoryFilter, DataProcessor, Dataset, ProcessorError};
use crate::stats::StatsCalculator;
use polars::prelude::DataFrame;
use std::borrow::Cow;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error(transparent)]
    Processor(#[from] ProcessorError),
    #[error("value '{value}' not found in column '{column}' of dataset '{dataset}'")]
    ValueNotFound {
        dataset: String,
        column: String,
        value: String,
    },
    #[error("series '{0}' reads the secondary dataset, but none was provided")]
    MissingSecondary(String),
    #[error("'{0}' is not one of the selectable series")]
    UnknownSelection(String),
    #[error("dataset '{0}' has no rows")]
    NoRows(String),
    #[error("dataset '{0}' was not loaded for this tab")]
    DatasetNotLoaded(String),
}

const REGION_FILL: &str = "rgba(0, 0, 255, 0.15)";
const REGION_BORDER: &str = "rgba(255, 0, 0, 0.5)";
const MEAN_COLOR: &str = "#2c3e50";
const MEDIAN_COLOR: &str = "#7f8c8d";
const SPREAD_FILL: &str = "rgba(44, 62, 80, 0.08)";
const OTHER_LABEL: &str = "Other";

fn layout(
    title: &Option<String>,
    x_title: &Option<String>,
    y_title: &Option<String>,
    height: Option<u32>,
) -> Layout {
    Layout {
        title: title.clone(),
        xaxis_title: x_title.clone(),
        yaxis_title: y_title.clone(),
        height,
        ..Default::default()
    }
}

/// Builds chart specifications. Every function is pure over its inputs.
pub struct ChartBuilder;

impl ChartBuilder {
    fn pick<'a>(
        secondary_flag: bool,
        what: &str,
        primary: &'a Dataset,
        secondary: Option<&'a Dataset>,
    ) -> Result<&'a Dataset, ChartError> {
        if secondary_flag {
            secondary.ok_or_else(|| ChartError::MissingSecondary(what.to_string()))
        } else {
            Ok(primary)
        }
    }

    fn filtered<'a>(ds: &'a Dataset, filter: &Option<RowFilter>) -> Result<Cow<'a, DataFrame>, ChartError> {
        Ok(match filter {
            Some(f) => Cow::Owned(DataProcessor::filter_equals(&ds.df, &f.column, &f.equals)?),
            None => Cow::Borrowed(&ds.df),
        })
    }

    /// One line trace of `series` against the x column; rows without an x value are skipped.
    fn line_trace(
        df: &DataFrame,
        x_column: &str,
        series: &SeriesSpec,
        index: usize,
    ) -> Result<Trace, ChartError> {
        let xs = DataProcessor::labels(df, x_column)?;
        let ys = DataProcessor::numbers(df, &series.column)?;
        let (x, y): (Vec<AxisValue>, Vec<Option<f64>>) = xs
            .into_iter()
            .zip(ys)
            .filter_map(|(x, y)| Some((AxisValue::Label(x?), y)))
            .unzip();

        let color = series.color.clone().unwrap_or_else(|| palette_color(index));
        Ok(Trace::Scatter(ScatterTrace {
            name: series.display_name().to_string(),
            x,
            y,
            mode: Mode::LinesMarkers,
            line: Some(LineStyle {
                color: Some(color),
                ..Default::default()
            }),
            marker: None,
        }))
    }

    fn marker_trace(
        chart: &TimeSeriesChart,
        marker: &EventMarker,
        primary: &Dataset,
        secondary: Option<&Dataset>,
    ) -> Result<Trace, ChartError> {
        let ds = Self::pick(marker.secondary, &marker.name, primary, secondary)?;
        let xs = DataProcessor::labels(&ds.df, &chart.x)?;
        let ys = DataProcessor::numbers(&ds.df, &marker.series)?;

        let rows: Vec<usize> = match &marker.select {
            MarkerSelect::Flag(column) => DataProcessor::flags(&ds.df, column)?
                .into_iter()
                .enumerate()
                .filter_map(|(i, flagged)| flagged.then_some(i))
                .collect(),
            MarkerSelect::Equals(value) => {
                let row = DataProcessor::find_row(&ds.df, &chart.x, value)?.ok_or_else(|| {
                    ChartError::ValueNotFound {
                        dataset: ds.id.clone(),
                        column: chart.x.clone(),
                        value: value.clone(),
                    }
                })?;
                vec![row]
            }
        };

        let (x, y) = rows
            .into_iter()
            .filter_map(|i| Some((AxisValue::Label(xs[i].clone()?), ys[i])))
            .unzip();

        Ok(Trace::Scatter(ScatterTrace {
            name: marker.name.clone(),
            x,
            y,
            mode: Mode::Markers,
            line: None,
            marker: Some(Marker {
                symbol: marker.symbol.clone(),
                size: marker.size,
                color: marker.color.clone(),
                ..Default::default()
            }),
        }))
    }

    fn region_overlay(region: &Region) -> (Shape, Option<Annotation>) {
        let shape = Shape {
            kind: ShapeKind::Rect,
            x0: region.x0.clone(),
            x1: region.x1.clone(),
            y0: region.y0,
            y1: region.y1,
            yref: "y".to_string(),
            fillcolor: Some(region.fill.clone().unwrap_or_else(|| REGION_FILL.to_string())),
            line: Some(LineStyle {
                color: Some(
                    region
                        .border
                        .clone()
                        .unwrap_or_else(|| REGION_BORDER.to_string()),
                ),
                ..Default::default()
            }),
        };
        let annotation = region.label.as_ref().map(|text| Annotation {
            x: region.x0.clone(),
            y: region.label_y.unwrap_or(region.y1),
            xref: "x".to_string(),
            yref: "y".to_string(),
            text: text.clone(),
            showarrow: true,
            arrowhead: Some(2),
            ax: Some(-100.0),
            ay: Some(-40.0),
        });
        (shape, annotation)
    }

    /// Series over the quarter/date axis, with optional event markers and shaded regions.
    pub fn time_series(
        chart: &TimeSeriesChart,
        primary: &Dataset,
        secondary: Option<&Dataset>,
    ) -> Result<ChartSpec, ChartError> {
        let mut data = Vec::with_capacity(chart.series.len() + chart.markers.len());
        for (i, series) in chart.series.iter().enumerate() {
            let ds = Self::pick(series.secondary, &series.column, primary, secondary)?;
            data.push(Self::line_trace(&ds.df, &chart.x, series, i)?);
        }
        for marker in &chart.markers {
            data.push(Self::marker_trace(chart, marker, primary, secondary)?);
        }

        let mut layout = layout(&chart.title, &chart.x_title, &chart.y_title, chart.height);
        for region in &chart.regions {
            let (shape, annotation) = Self::region_overlay(region);
            layout.shapes.push(shape);
            layout.annotations.extend(annotation);
        }

        Ok(ChartSpec {
            data,
            layout,
            frames: Vec::new(),
        })
    }

    /// Grouped totals per category, largest first.
    pub fn bar_ranking(chart: &BarRankingChart, ds: &Dataset) -> Result<ChartSpec, ChartError> {
        let df = Self::filtered(ds, &chart.filter)?;
        let mut totals = DataProcessor::aggregate_by(&df, &chart.category, &chart.value, chart.aggregate)?;
        if let Some(n) = chart.top_n {
            totals.truncate(n);
        }
        let (x, y) = totals.into_iter().unzip();

        Ok(ChartSpec {
            data: vec![Trace::Bar(BarTrace {
                name: chart.value.clone(),
                x,
                y,
                marker: Some(Marker {
                    color: Some(chart.color.clone().unwrap_or_else(|| palette_color(0))),
                    ..Default::default()
                }),
            })],
            layout: layout(&chart.title, &chart.x_title, &chart.y_title, chart.height),
            frames: Vec::new(),
        })
    }

    /// Named entries vs everything else, as two bars.
    pub fn two_bucket(chart: &TwoBucketChart, ds: &Dataset) -> Result<ChartSpec, ChartError> {
        let filter = chart.within.as_ref().map(|f| CategoryFilter {
            column: &f.column,
            value: &f.equals,
        });
        let totals = DataProcessor::split_named(&ds.df, &chart.title_column, &chart.value, &chart.named, filter)?;

        let named_label = chart
            .named_label
            .clone()
            .unwrap_or_else(|| chart.named.join(" + "));
        let other_label = chart
            .other_label
            .clone()
            .unwrap_or_else(|| "Everything else".to_string());

        Ok(ChartSpec {
            data: vec![Trace::Bar(BarTrace {
                name: chart.value.clone(),
                x: vec![named_label, other_label],
                y: vec![totals.named, totals.other],
                marker: Some(Marker {
                    colors: vec![palette_color(0), palette_color(9)],
                    ..Default::default()
                }),
            })],
            layout: layout(&chart.title, &None, &chart.y_title, chart.height),
            frames: Vec::new(),
        })
    }

    /// Grouped totals as pie slices, optionally folding the tail into "Other".
    pub fn pie(chart: &PieChart, ds: &Dataset) -> Result<ChartSpec, ChartError> {
        let df = Self::filtered(ds, &chart.filter)?;
        let mut totals = DataProcessor::sum_by(&df, &chart.category, &chart.value)?;
        if let Some(n) = chart.top_n {
            if totals.len() > n {
                let rest: f64 = totals.split_off(n).into_iter().map(|(_, v)| v).sum();
                totals.push((OTHER_LABEL.to_string(), rest));
            }
        }
        let (labels, values) = totals.into_iter().unzip();

        Ok(ChartSpec {
            data: vec![Trace::Pie(PieTrace {
                name: chart.value.clone(),
                labels,
                values,
                marker: None,
            })],
            layout: layout(&chart.title, &None, &None, chart.height),
            frames: Vec::new(),
        })
    }

    /// One pie frame per distinct axis value, in first-appearance order.
    pub fn animated_pie(chart: &AnimatedPieChart, ds: &Dataset) -> Result<ChartSpec, ChartError> {
        let axis = DataProcessor::labels(&ds.df, &chart.axis)?;
        let frame_names = DataProcessor::distinct_in_order(&ds.df, &chart.axis)?;
        if frame_names.is_empty() {
            return Err(ChartError::NoRows(ds.id.clone()));
        }

        let columns = chart
            .categories
            .iter()
            .map(|c| DataProcessor::numbers(&ds.df, &c.column))
            .collect::<Result<Vec<_>, _>>()?;
        let labels: Vec<String> = chart
            .categories
            .iter()
            .map(|c| c.display_name().to_string())
            .collect();
        let colors: Vec<String> = chart
            .categories
            .iter()
            .enumerate()
            .map(|(i, c)| c.color.clone().unwrap_or_else(|| palette_color(i)))
            .collect();

        let frames: Vec<Frame> = frame_names
            .into_iter()
            .map(|name| {
                // Rows sharing a label are summed into one frame.
                let values: Vec<f64> = columns
                    .iter()
                    .map(|column| {
                        axis.iter()
                            .zip(column)
                            .filter(|(label, _)| label.as_deref() == Some(name.as_str()))
                            .filter_map(|(_, v)| *v)
                            .sum::<f64>()
                    })
                    .collect();
                Frame {
                    data: vec![Trace::Pie(PieTrace {
                        name: name.clone(),
                        labels: labels.clone(),
                        values,
                        marker: Some(Marker {
                            colors: colors.clone(),
                            ..Default::default()
                        }),
                    })],
                    name,
                }
            })
            .collect();

        let mut layout = layout(&chart.title, &None, &None, chart.height);
        layout.updatemenus.push(UpdateMenu::play_pause(chart.frame_ms));
        layout.sliders.push(Slider::for_frames(&frames));

        Ok(ChartSpec {
            data: frames[0].data.clone(),
            layout,
            frames,
        })
    }

    /// Distribution of one numeric column with mean/median lines and a p05-p95 band.
    pub fn histogram(chart: &HistogramChart, ds: &Dataset) -> Result<ChartSpec, ChartError> {
        let df = Self::filtered(ds, &chart.filter)?;
        let values: Vec<f64> = DataProcessor::numbers(&df, &chart.column)?
            .into_iter()
            .flatten()
            .collect();

        let mut layout = layout(&chart.title, &chart.x_title, &chart.y_title, chart.height);
        if chart.reference_lines && !values.is_empty() {
            let stats = StatsCalculator::describe(&values);
            for (label, value, color) in [
                ("Mean", stats.mean, MEAN_COLOR),
                ("Median", stats.median, MEDIAN_COLOR),
            ] {
                layout.shapes.push(Shape {
                    kind: ShapeKind::Line,
                    x0: AxisValue::Number(value),
                    x1: AxisValue::Number(value),
                    y0: 0.0,
                    y1: 1.0,
                    yref: "paper".to_string(),
                    fillcolor: None,
                    line: Some(LineStyle {
                        color: Some(color.to_string()),
                        width: Some(2.0),
                        dash: Some("dash".to_string()),
                    }),
                });
                layout.annotations.push(Annotation {
                    x: AxisValue::Number(value),
                    y: 1.0,
                    xref: "x".to_string(),
                    yref: "paper".to_string(),
                    text: format!("{label}: {value:.1}"),
                    showarrow: false,
                    arrowhead: None,
                    ax: None,
                    ay: None,
                });
            }
            // Middle 90% of values.
            layout.shapes.push(Shape {
                kind: ShapeKind::Rect,
                x0: AxisValue::Number(stats.p05),
                x1: AxisValue::Number(stats.p95),
                y0: 0.0,
                y1: 1.0,
                yref: "paper".to_string(),
                fillcolor: Some(SPREAD_FILL.to_string()),
                line: Some(LineStyle {
                    width: Some(0.0),
                    ..Default::default()
                }),
            });
        }

        Ok(ChartSpec {
            data: vec![Trace::Histogram(HistogramTrace {
                name: chart.column.clone(),
                x: values,
                nbinsx: chart.bins,
                marker: Some(Marker {
                    color: Some(chart.color.clone().unwrap_or_else(|| palette_color(0))),
                    ..Default::default()
                }),
            })],
            layout,
            frames: Vec::new(),
        })
    }

    /// Mean of a value per calendar month of a date column.
    pub fn monthly_mean(chart: &MonthlyMeanChart, ds: &Dataset) -> Result<ChartSpec, ChartError> {
        let means = DataProcessor::mean_by_month(&ds.df, &chart.date, &chart.value)?;
        let (x, y) = means
            .into_iter()
            .map(|(month, mean)| (AxisValue::Label(month), Some(mean)))
            .unzip();

        Ok(ChartSpec {
            data: vec![Trace::Scatter(ScatterTrace {
                name: chart.name.clone().unwrap_or_else(|| chart.value.clone()),
                x,
                y,
                mode: Mode::LinesMarkers,
                line: Some(LineStyle {
                    color: Some(chart.color.clone().unwrap_or_else(|| palette_color(0))),
                    ..Default::default()
                }),
                marker: None,
            })],
            layout: layout(&chart.title, &chart.x_title, &chart.y_title, chart.height),
            frames: Vec::new(),
        })
    }

    /// One series per selected column. An empty selection builds nothing.
    pub fn series_picker(
        chart: &SeriesPickerChart,
        ds: &Dataset,
        selection: &[String],
    ) -> Result<Option<ChartSpec>, ChartError> {
        if selection.is_empty() {
            return Ok(None);
        }

        let mut data = Vec::with_capacity(selection.len());
        for (i, column) in selection.iter().enumerate() {
            let series = if chart.options.is_empty() {
                SeriesSpec::new(column.as_str())
            } else {
                chart
                    .option(column)
                    .cloned()
                    .ok_or_else(|| ChartError::UnknownSelection(column.clone()))?
            };
            data.push(Self::line_trace(&ds.df, &chart.x, &series, i)?);
        }

        Ok(Some(ChartSpec {
            data,
            layout: layout(&chart.title, &chart.x_title, &chart.y_title, chart.height),
            frames: Vec::new(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{normalize, ColumnKind, ColumnSpec};
    use polars::prelude::{df, Column, DataType};

    fn netflix() -> Dataset {
        let df = df!(
            "Quarter" => &["19Q4", "20Q1", "20Q2", "22Q4", "23Q1"],
            "Sub Increase Q2Q M" => &[8.76_f64, 15.77, 10.09, 7.66, 1.75],
            "Price Hike for at least 1 plan" => &[false, true, false, true, false]
        )
        .unwrap();
        Dataset::new("netflix", df)
    }

    fn disney() -> Dataset {
        let df = df!(
            "Quarter" => &["20Q1", "20Q2"],
            "Disney Sub Change Q2Q" => &[6.0_f64, 21.8]
        )
        .unwrap();
        Dataset::new("disney", df)
    }

    fn time_series_chart() -> TimeSeriesChart {
        TimeSeriesChart {
            dataset: "netflix".to_string(),
            secondary_dataset: None,
            x: "Quarter".to_string(),
            series: vec![SeriesSpec {
                column: "Sub Increase Q2Q M".to_string(),
                name: Some("Netflix".to_string()),
                color: Some("red".to_string()),
                secondary: false,
            }],
            markers: Vec::new(),
            regions: Vec::new(),
            title: None,
            x_title: Some("Quarter".to_string()),
            y_title: Some("Sub Increase in millions".to_string()),
            height: Some(370),
        }
    }

    fn scatter(trace: &Trace) -> &ScatterTrace {
        match trace {
            Trace::Scatter(s) => s,
            other => panic!("expected scatter, got {other:?}"),
        }
    }

    fn pie(trace: &Trace) -> &PieTrace {
        match trace {
            Trace::Pie(p) => p,
            other => panic!("expected pie, got {other:?}"),
        }
    }

    #[test]
    fn time_series_with_markers_and_region() {
        let mut chart = time_series_chart();
        chart.markers = vec![
            EventMarker {
                name: "Price Hike for at least 1 plan".to_string(),
                series: "Sub Increase Q2Q M".to_string(),
                select: MarkerSelect::Flag("Price Hike for at least 1 plan".to_string()),
                secondary: false,
                symbol: Some("x".to_string()),
                size: Some(13.0),
                color: Some("black".to_string()),
            },
            EventMarker {
                name: "Password Sharing Crackdown".to_string(),
                series: "Sub Increase Q2Q M".to_string(),
                select: MarkerSelect::Equals("23Q1".to_string()),
                secondary: false,
                symbol: Some("circle".to_string()),
                size: Some(10.0),
                color: Some("blue".to_string()),
            },
        ];
        chart.regions = vec![Region {
            x0: "19Q4".into(),
            x1: "20Q2".into(),
            y0: 0.0,
            y1: 16.0,
            label: Some("COVID-19 Pandemic".to_string()),
            label_y: Some(15.0),
            fill: None,
            border: None,
        }];

        let spec = ChartBuilder::time_series(&chart, &netflix(), None).unwrap();
        assert_eq!(
            spec.trace_names(),
            vec!["Netflix", "Price Hike for at least 1 plan", "Password Sharing Crackdown"]
        );

        let line = scatter(&spec.data[0]);
        assert_eq!(line.x.len(), 5);
        assert_eq!(line.mode, Mode::LinesMarkers);

        let hikes = scatter(&spec.data[1]);
        assert_eq!(hikes.x, vec![AxisValue::from("20Q1"), AxisValue::from("22Q4")]);
        assert_eq!(hikes.y, vec![Some(15.77), Some(7.66)]);
        assert_eq!(hikes.mode, Mode::Markers);

        let crackdown = scatter(&spec.data[2]);
        assert_eq!(crackdown.y, vec![Some(1.75)]);

        assert_eq!(spec.layout.shapes.len(), 1);
        assert_eq!(spec.layout.annotations[0].text, "COVID-19 Pandemic");
        assert_eq!(spec.layout.annotations[0].y, 15.0);
        assert_eq!(spec.layout.height, Some(370));
    }

    #[test]
    fn absent_literal_is_value_not_found() {
        let mut chart = time_series_chart();
        chart.markers = vec![EventMarker {
            name: "Crackdown".to_string(),
            series: "Sub Increase Q2Q M".to_string(),
            select: MarkerSelect::Equals("23Q1".to_string()),
            secondary: false,
            symbol: None,
            size: None,
            color: None,
        }];
        let err = ChartBuilder::time_series(&chart, &disney_as_primary(), None).unwrap_err();
        match err {
            ChartError::ValueNotFound { column, value, .. } => {
                assert_eq!(column, "Quarter");
                assert_eq!(value, "23Q1");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    fn disney_as_primary() -> Dataset {
        let df = df!(
            "Quarter" => &["22Q3", "22Q4"],
            "Sub Increase Q2Q M" => &[12.1_f64, 0.2]
        )
        .unwrap();
        Dataset::new("netflix", df)
    }

    #[test]
    fn secondary_dataset_series_align_by_label() {
        let mut chart = time_series_chart();
        chart.series.push(SeriesSpec {
            column: "Disney Sub Change Q2Q".to_string(),
            name: Some("Disney+".to_string()),
            color: None,
            secondary: true,
        });

        let d = disney();
        let spec = ChartBuilder::time_series(&chart, &netflix(), Some(&d)).unwrap();
        let second = scatter(&spec.data[1]);
        assert_eq!(second.x, vec![AxisValue::from("20Q1"), AxisValue::from("20Q2")]);
        assert_eq!(second.line.as_ref().unwrap().color.as_deref(), Some(PALETTE[1]));

        assert!(matches!(
            ChartBuilder::time_series(&chart, &netflix(), None),
            Err(ChartError::MissingSecondary(_))
        ));
    }

    fn viewing() -> Dataset {
        let mut df = df!(
            "Title" => &["Wednesday: Season 1", "Stranger Things 4", "Glass Onion", "Wednesday Doc"],
            "Genre" => &["Drama", "Drama", "Comedy", "Drama"],
            "Hours Viewed" => &["1,000", "500", "200", "50"],
            "Runtime" => &["90 min", "120 min", "139 min", "45 min"]
        )
        .unwrap();
        let mut runtime = ColumnSpec::new("Runtime", ColumnKind::Integer);
        runtime.unit = Some(" min".to_string());
        normalize::normalize_frame(
            &mut df,
            &[ColumnSpec::new("Hours Viewed", ColumnKind::Integer), runtime],
        )
        .unwrap();
        Dataset::new("viewing", df)
    }

    #[test]
    fn bar_ranking_sorted_descending_with_top_n() {
        let mut chart = BarRankingChart {
            dataset: "viewing".to_string(),
            category: "Genre".to_string(),
            value: "Hours Viewed".to_string(),
            aggregate: Default::default(),
            top_n: None,
            filter: None,
            color: None,
            title: None,
            x_title: None,
            y_title: None,
            height: None,
        };
        let spec = ChartBuilder::bar_ranking(&chart, &viewing()).unwrap();
        let Trace::Bar(bar) = &spec.data[0] else { panic!("expected bar") };
        assert_eq!(bar.x, vec!["Drama", "Comedy"]);
        assert_eq!(bar.y, vec![1550.0, 200.0]);

        chart.top_n = Some(1);
        let spec = ChartBuilder::bar_ranking(&chart, &viewing()).unwrap();
        let Trace::Bar(bar) = &spec.data[0] else { panic!("expected bar") };
        assert_eq!(bar.x, vec!["Drama"]);

        chart.top_n = None;
        chart.filter = Some(RowFilter {
            column: "Genre".to_string(),
            equals: "Comedy".to_string(),
        });
        let spec = ChartBuilder::bar_ranking(&chart, &viewing()).unwrap();
        let Trace::Bar(bar) = &spec.data[0] else { panic!("expected bar") };
        assert_eq!(bar.x, vec!["Comedy"]);
    }

    #[test]
    fn two_bucket_covers_category_total() {
        let chart = TwoBucketChart {
            dataset: "viewing".to_string(),
            title_column: "Title".to_string(),
            value: "Hours Viewed".to_string(),
            named: vec!["Wednesday".to_string(), "Stranger Things".to_string()],
            named_label: None,
            other_label: None,
            within: Some(RowFilter {
                column: "Genre".to_string(),
                equals: "Drama".to_string(),
            }),
            title: None,
            y_title: None,
            height: None,
        };
        let spec = ChartBuilder::two_bucket(&chart, &viewing()).unwrap();
        let Trace::Bar(bar) = &spec.data[0] else { panic!("expected bar") };
        assert_eq!(bar.x, vec!["Wednesday + Stranger Things", "Everything else"]);
        assert_eq!(bar.y, vec![1550.0, 0.0]);
        assert_eq!(bar.y.iter().sum::<f64>(), 1550.0);
    }

    #[test]
    fn pie_folds_tail_into_other() {
        let df = df!(
            "Region" => &["US", "EU", "APAC", "LATAM"],
            "Revenue" => &[40.0_f64, 30.0, 20.0, 10.0]
        )
        .unwrap();
        let chart = PieChart {
            dataset: "rev".to_string(),
            category: "Region".to_string(),
            value: "Revenue".to_string(),
            top_n: Some(2),
            filter: None,
            title: None,
            height: None,
        };
        let spec = ChartBuilder::pie(&chart, &Dataset::new("rev", df)).unwrap();
        let p = pie(&spec.data[0]);
        assert_eq!(p.labels, vec!["US", "EU", "Other"]);
        assert_eq!(p.values, vec![40.0, 30.0, 30.0]);
    }

    #[test]
    fn animated_pie_one_frame_per_quarter_in_order() {
        let df = df!(
            "Quarter" => &["21Q2", "21Q1", "21Q2", "21Q3"],
            "UCAN" => &[1.0_f64, 2.0, 3.0, 4.0],
            "EMEA" => &[10.0_f64, 20.0, 30.0, 40.0]
        )
        .unwrap();
        let chart = AnimatedPieChart {
            dataset: "regions".to_string(),
            axis: "Quarter".to_string(),
            categories: vec![SeriesSpec::new("UCAN"), SeriesSpec::new("EMEA")],
            frame_ms: 500,
            title: None,
            height: None,
        };
        let spec = ChartBuilder::animated_pie(&chart, &Dataset::new("regions", df)).unwrap();
        let names: Vec<&str> = spec.frames.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["21Q2", "21Q1", "21Q3"]);

        let first = pie(&spec.frames[0].data[0]);
        assert_eq!(first.labels, vec!["UCAN", "EMEA"]);
        assert_eq!(first.values, vec![4.0, 40.0]);
        assert_eq!(spec.data, spec.frames[0].data);
        assert_eq!(spec.layout.updatemenus[0].buttons[0].label, "Play");
        assert_eq!(spec.layout.sliders[0].steps.len(), 3);

        let empty = Dataset::new(
            "regions",
            df!("Quarter" => Vec::<&str>::new(), "UCAN" => Vec::<f64>::new(), "EMEA" => Vec::<f64>::new()).unwrap(),
        );
        assert!(matches!(
            ChartBuilder::animated_pie(&chart, &empty),
            Err(ChartError::NoRows(_))
        ));
    }

    #[test]
    fn histogram_carries_reference_lines() {
        let chart = HistogramChart {
            dataset: "viewing".to_string(),
            column: "Runtime".to_string(),
            bins: Some(10),
            filter: None,
            reference_lines: true,
            color: None,
            title: None,
            x_title: None,
            y_title: None,
            height: None,
        };
        let spec = ChartBuilder::histogram(&chart, &viewing()).unwrap();
        let Trace::Histogram(h) = &spec.data[0] else { panic!("expected histogram") };
        assert_eq!(h.x, vec![90.0, 120.0, 139.0, 45.0]);
        assert_eq!(h.nbinsx, Some(10));
        assert_eq!(spec.layout.shapes.len(), 3);
        assert_eq!(spec.layout.shapes[1].x0, AxisValue::Number(105.0));
        assert!(spec.layout.annotations[1].text.starts_with("Median: 105.0"));

        let band = &spec.layout.shapes[2];
        assert_eq!(band.kind, ShapeKind::Rect);
        let (AxisValue::Number(lo), AxisValue::Number(hi)) = (&band.x0, &band.x1) else {
            panic!("expected numeric band edges");
        };
        assert!((lo - 51.75).abs() < 1e-9);
        assert!((hi - 136.15).abs() < 1e-9);
    }

    #[test]
    fn monthly_mean_trend() {
        let days: Vec<Option<i32>> = ["2023-01-05", "2023-01-25", "2023-02-01"]
            .iter()
            .map(|s| normalize::parse_date(s, "%Y-%m-%d").map(normalize::date_to_days))
            .collect();
        let df = DataFrame::new(vec![
            Column::new("Release Date".into(), days).cast(&DataType::Date).unwrap(),
            Column::new("Runtime".into(), vec![100_i64, 80, 120]),
        ])
        .unwrap();
        let chart = MonthlyMeanChart {
            dataset: "titles".to_string(),
            date: "Release Date".to_string(),
            value: "Runtime".to_string(),
            name: None,
            color: None,
            title: None,
            x_title: None,
            y_title: None,
            height: None,
        };
        let spec = ChartBuilder::monthly_mean(&chart, &Dataset::new("titles", df)).unwrap();
        let line = scatter(&spec.data[0]);
        assert_eq!(line.x, vec![AxisValue::from("2023-01"), AxisValue::from("2023-02")]);
        assert_eq!(line.y, vec![Some(90.0), Some(120.0)]);
    }

    fn picker() -> SeriesPickerChart {
        SeriesPickerChart {
            dataset: "netflix".to_string(),
            x: "Quarter".to_string(),
            options: Vec::new(),
            prompt: None,
            title: None,
            x_title: None,
            y_title: None,
            height: None,
        }
    }

    #[test]
    fn series_picker_matches_selection() {
        let ds = netflix();
        assert!(ChartBuilder::series_picker(&picker(), &ds, &[]).unwrap().is_none());

        let selection = vec!["Sub Increase Q2Q M".to_string()];
        let spec = ChartBuilder::series_picker(&picker(), &ds, &selection)
            .unwrap()
            .unwrap();
        assert_eq!(spec.data.len(), 1);
        let line = scatter(&spec.data[0]);
        assert_eq!(line.y, vec![Some(8.76), Some(15.77), Some(10.09), Some(7.66), Some(1.75)]);

        let missing = vec!["Revenue".to_string()];
        assert!(matches!(
            ChartBuilder::series_picker(&picker(), &ds, &missing),
            Err(ChartError::Processor(ProcessorError::MissingColumn(_)))
        ));
    }

    #[test]
    fn series_picker_restricted_to_options() {
        let mut chart = picker();
        chart.options = vec![SeriesSpec {
            column: "Sub Increase Q2Q M".to_string(),
            name: Some("Netflix".to_string()),
            color: Some("red".to_string()),
            secondary: false,
        }];
        let ds = netflix();

        let by_name = vec!["Netflix".to_string()];
        let spec = ChartBuilder::series_picker(&chart, &ds, &by_name).unwrap().unwrap();
        assert_eq!(spec.trace_names(), vec!["Netflix"]);

        let other = vec!["Price Hike for at least 1 plan".to_string()];
        assert!(matches!(
            ChartBuilder::series_picker(&chart, &ds, &other),
            Err(ChartError::UnknownSelection(_))
        ));
    }
}
