// Toolkit independent chart descriptions produced by the analysis runner

use serde::Serialize;

use crate::laps::Compound;

/// An sRGB color
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const FALLBACK_TEAM: Rgb = Rgb(0x22, 0x22, 0x22);
    pub const FALLBACK_TYRE: Rgb = Rgb(0xCC, 0xCC, 0xCC);

    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

const TEAM_COLORS: [(&str, Rgb); 11] = [
    ("Red Bull Racing", Rgb(0x36, 0x71, 0xC6)),
    ("Ferrari", Rgb(0xF9, 0x15, 0x36)),
    ("Mercedes", Rgb(0x6C, 0xD3, 0xBF)),
    ("McLaren", Rgb(0xFF, 0x80, 0x00)),
    ("Aston Martin", Rgb(0x22, 0x99, 0x71)),
    ("Alpine", Rgb(0x22, 0x93, 0xD1)),
    ("Williams", Rgb(0x37, 0xBE, 0xDD)),
    ("Racing Bulls", Rgb(0x66, 0x92, 0xFF)),
    ("RB", Rgb(0x66, 0x92, 0xFF)),
    ("Kick Sauber", Rgb(0x52, 0xE2, 0x52)),
    ("Haas F1 Team", Rgb(0xB6, 0xBA, 0xBD)),
];

pub fn team_color(team: &str) -> Rgb {
    TEAM_COLORS
        .iter()
        .find(|(name, _)| *name == team)
        .map(|(_, color)| *color)
        .unwrap_or(Rgb::FALLBACK_TEAM)
}

pub fn tyre_color(compound: Compound) -> Rgb {
    match compound {
        Compound::Soft => Rgb(0xF9, 0x15, 0x36),
        Compound::Medium => Rgb(0xFF, 0xD8, 0x00),
        Compound::Hard => Rgb(0xF5, 0xF5, 0xF5),
        Compound::Intermediate => Rgb(0x39, 0xB5, 0x4A),
        Compound::Wet => Rgb(0x00, 0x67, 0xB1),
        Compound::Unknown => Rgb(0xB6, 0xBA, 0xBD),
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BarItem {
    pub label: String,
    pub value: f64,
    pub color: Rgb,
    /// Text drawn next to the bar
    pub text: String,
    pub hover: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StackSegment {
    pub category: String,
    pub series: String,
    pub value: f64,
    pub color: Rgb,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HeatmapRow {
    pub label: String,
    pub values: Vec<Option<f64>>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub color: Rgb,
    pub points: Vec<[f64; 2]>,
    /// Drawn as a thin trend line rather than a primary trace
    pub is_trend: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TimelineBar {
    pub row: String,
    pub label: String,
    pub base: f64,
    pub length: f64,
    pub color: Rgb,
    pub hover: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Chart {
    /// Nothing to show
    Blank,
    /// Title only, used for prompts and data problems
    Placeholder { title: String },
    Bar {
        title: String,
        y_label: String,
        bars: Vec<BarItem>,
        y_range: (f64, f64),
    },
    StackedBar {
        title: String,
        y_label: String,
        categories: Vec<String>,
        segments: Vec<StackSegment>,
    },
    Heatmap {
        title: String,
        columns: Vec<String>,
        rows: Vec<HeatmapRow>,
    },
    Line {
        title: String,
        x_label: String,
        y_label: String,
        series: Vec<Series>,
    },
    Timeline {
        title: String,
        x_label: String,
        y_label: String,
        rows: Vec<String>,
        bars: Vec<TimelineBar>,
    },
}

impl Chart {
    pub fn placeholder(title: impl Into<String>) -> Self {
        Chart::Placeholder {
            title: title.into(),
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Chart::Blank => "",
            Chart::Placeholder { title }
            | Chart::Bar { title, .. }
            | Chart::StackedBar { title, .. }
            | Chart::Heatmap { title, .. }
            | Chart::Line { title, .. }
            | Chart::Timeline { title, .. } => title,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Chart::Placeholder { .. } | Chart::Blank)
    }

    /// Plain text rendering used by the command line report
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if !self.title().is_empty() {
            lines.push(self.title().to_string());
        }
        match self {
            Chart::Blank | Chart::Placeholder { .. } => {}
            Chart::Bar { bars, .. } => {
                for (position, bar) in bars.iter().enumerate() {
                    lines.push(format!(
                        "{:>2}. {:<20} {:>9.3} {}",
                        position + 1,
                        bar.label,
                        bar.value,
                        bar.text
                    ));
                }
            }
            Chart::StackedBar {
                categories,
                segments,
                ..
            } => {
                for category in categories {
                    let parts = segments
                        .iter()
                        .filter(|s| &s.category == category)
                        .map(|s| format!("{} {}", s.series, s.value))
                        .collect::<Vec<_>>();
                    lines.push(format!("{:<6} {}", category, parts.join(", ")));
                }
            }
            Chart::Heatmap { columns, rows, .. } => {
                lines.push(format!("{:<6} {}", "", columns.join("  ")));
                for row in rows {
                    let cells = row
                        .values
                        .iter()
                        .map(|v| match v {
                            Some(v) => format!("{:>8.3}", v),
                            None => format!("{:>8}", "--"),
                        })
                        .collect::<Vec<_>>();
                    lines.push(format!("{:<6} {}", row.label, cells.join(" ")));
                }
            }
            Chart::Line { series, .. } => {
                for s in series.iter().filter(|s| !s.is_trend) {
                    let times = s.points.iter().map(|p| p[1]);
                    let best = times.clone().fold(f64::INFINITY, f64::min);
                    let count = s.points.len();
                    if count == 0 {
                        lines.push(format!("{}: no laps", s.name));
                    } else {
                        lines.push(format!(
                            "{}: {} laps, best {:.3}s, average {:.3}s",
                            s.name,
                            count,
                            best,
                            times.sum::<f64>() / count as f64
                        ));
                    }
                }
            }
            Chart::Timeline { rows, bars, .. } => {
                for row in rows {
                    let stints = bars
                        .iter()
                        .filter(|b| &b.row == row)
                        .map(|b| format!("{} {}-{}", b.label, b.base, b.base + b.length - 1.))
                        .collect::<Vec<_>>();
                    lines.push(format!("{:<6} {}", row, stints.join(" | ")));
                }
            }
        }
        lines
    }
}

/// Y axis range around the values, padded by 15% of their spread
/// (one unit when every value is equal).
pub fn padded_range(values: impl IntoIterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values
        .into_iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !min.is_finite() || !max.is_finite() {
        return (0., 1.);
    }
    let spread = max - min;
    let margin = if spread > 0. { spread * 0.15 } else { 1. };
    (min - margin, max + margin)
}
