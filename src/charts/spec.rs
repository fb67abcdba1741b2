//! Chart specification
//! Serializable description of one chart (traces, layout, frames) handed to
//! the rendering surface. Field names follow plotly's figure JSON.

use serde::{Deserialize, Serialize};
use serde_json::json;

/// Default series colours, cycled by trace index.
pub const PALETTE: [&str; 10] = [
    "#e74c3c", // Red
    "#2ecc71", // Green
    "#9b59b6", // Purple
    "#f39c12", // Orange
    "#1abc9c", // Teal
    "#e91e63", // Pink
    "#00bcd4", // Cyan
    "#ff5722", // Deep Orange
    "#795548", // Brown
    "#607d8b", // Blue Grey
];

pub fn palette_color(index: usize) -> String {
    PALETTE[index % PALETTE.len()].to_string()
}

/// A position on an axis: a category label (quarter, month, date) or a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AxisValue {
    Number(f64),
    Label(String),
}

impl From<&str> for AxisValue {
    fn from(s: &str) -> Self {
        AxisValue::Label(s.to_string())
    }
}

impl From<String> for AxisValue {
    fn from(s: String) -> Self {
        AxisValue::Label(s)
    }
}

impl From<f64> for AxisValue {
    fn from(v: f64) -> Self {
        AxisValue::Number(v)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Mode {
    #[serde(rename = "lines")]
    Lines,
    #[serde(rename = "markers")]
    Markers,
    #[serde(rename = "lines+markers")]
    LinesMarkers,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LineStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Marker {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub colors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterTrace {
    pub name: String,
    pub x: Vec<AxisValue>,
    pub y: Vec<Option<f64>>,
    pub mode: Mode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<LineStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarTrace {
    pub name: String,
    pub x: Vec<String>,
    pub y: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieTrace {
    pub name: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramTrace {
    pub name: String,
    pub x: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nbinsx: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Scatter(ScatterTrace),
    Bar(BarTrace),
    Pie(PieTrace),
    Histogram(HistogramTrace),
}

impl Trace {
    pub fn name(&self) -> &str {
        match self {
            Trace::Scatter(t) => &t.name,
            Trace::Bar(t) => &t.name,
            Trace::Pie(t) => &t.name,
            Trace::Histogram(t) => &t.name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rect,
    Line,
}

/// A static overlay drawn in data coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shape {
    #[serde(rename = "type")]
    pub kind: ShapeKind,
    pub x0: AxisValue,
    pub x1: AxisValue,
    pub y0: f64,
    pub y1: f64,
    /// `"y"` for data coordinates, `"paper"` to span the plot height.
    pub yref: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fillcolor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<LineStyle>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub x: AxisValue,
    pub y: f64,
    pub xref: String,
    pub yref: String,
    pub text: String,
    pub showarrow: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrowhead: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ax: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ay: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuButton {
    pub label: String,
    pub method: String,
    pub args: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateMenu {
    #[serde(rename = "type")]
    pub kind: String,
    pub showactive: bool,
    pub buttons: Vec<MenuButton>,
}

impl UpdateMenu {
    /// Static play/pause controls for an animated chart.
    pub fn play_pause(frame_duration_ms: u32) -> Self {
        Self {
            kind: "buttons".to_string(),
            showactive: false,
            buttons: vec![
                MenuButton {
                    label: "Play".to_string(),
                    method: "animate".to_string(),
                    args: json!([null, {
                        "frame": {"duration": frame_duration_ms, "redraw": true},
                        "fromcurrent": true,
                        "transition": {"duration": 0}
                    }]),
                },
                MenuButton {
                    label: "Pause".to_string(),
                    method: "animate".to_string(),
                    args: json!([[null], {
                        "frame": {"duration": 0, "redraw": false},
                        "mode": "immediate",
                        "transition": {"duration": 0}
                    }]),
                },
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SliderStep {
    pub label: String,
    pub method: String,
    pub args: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slider {
    pub active: usize,
    pub steps: Vec<SliderStep>,
}

impl Slider {
    /// One step per frame name, jumping straight to that frame.
    pub fn for_frames(frames: &[Frame]) -> Self {
        Self {
            active: 0,
            steps: frames
                .iter()
                .map(|f| SliderStep {
                    label: f.name.clone(),
                    method: "animate".to_string(),
                    args: json!([[f.name], {
                        "frame": {"duration": 0, "redraw": true},
                        "mode": "immediate"
                    }]),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Layout {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub shapes: Vec<Shape>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub updatemenus: Vec<UpdateMenu>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sliders: Vec<Slider>,
}

/// One animation frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub name: String,
    pub data: Vec<Trace>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartSpec {
    pub data: Vec<Trace>,
    pub layout: Layout,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub frames: Vec<Frame>,
}

impl ChartSpec {
    pub fn trace_names(&self) -> Vec<&str> {
        self.data.iter().map(Trace::name).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traces_serialize_with_type_tag() {
        let spec = ChartSpec {
            data: vec![Trace::Scatter(ScatterTrace {
                name: "Netflix".to_string(),
                x: vec!["23Q1".into(), "23Q2".into()],
                y: vec![Some(1.75), None],
                mode: Mode::LinesMarkers,
                line: Some(LineStyle {
                    color: Some("red".to_string()),
                    ..Default::default()
                }),
                marker: None,
            })],
            layout: Layout {
                xaxis_title: Some("Quarter".to_string()),
                ..Default::default()
            },
            frames: Vec::new(),
        };
        let v = serde_json::to_value(&spec).unwrap();
        assert_eq!(v["data"][0]["type"], "scatter");
        assert_eq!(v["data"][0]["mode"], "lines+markers");
        assert_eq!(v["data"][0]["x"][0], "23Q1");
        assert!(v["data"][0]["y"][1].is_null());
        assert_eq!(v["data"][0]["line"]["color"], "red");
        assert!(v["data"][0].get("marker").is_none());
        assert!(v.get("frames").is_none());
        assert!(v["layout"].get("shapes").is_none());
    }

    #[test]
    fn axis_values_deserialize_untagged() {
        let label: AxisValue = serde_json::from_str("\"19Q4\"").unwrap();
        assert_eq!(label, AxisValue::Label("19Q4".to_string()));
        let number: AxisValue = serde_json::from_str("3").unwrap();
        assert_eq!(number, AxisValue::Number(3.0));
    }

    #[test]
    fn slider_has_one_step_per_frame() {
        let frames = vec![
            Frame { name: "20Q1".to_string(), data: Vec::new() },
            Frame { name: "20Q2".to_string(), data: Vec::new() },
        ];
        let slider = Slider::for_frames(&frames);
        let labels: Vec<&str> = slider.steps.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["20Q1", "20Q2"]);
        assert_eq!(UpdateMenu::play_pause(800).buttons.len(), 2);
    }
}
