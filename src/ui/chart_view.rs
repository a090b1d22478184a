use std::ops::RangeInclusive;

use egui::{Align, Color32, Direction, Layout, RichText, Stroke, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{
    Bar, BarChart, GridMark, Legend, Line, LineStyle, Plot, PlotBounds, PlotPoint, PlotPoints,
    Points, Text,
};
use itertools::Itertools;

use crate::analysis::chart::{BarItem, Chart, HeatmapRow, Series, StackSegment, TimelineBar};

use super::{PALETTE_ORANGE, heat_color, to_color32};

const BAR_WIDTH: f64 = 0.6;

/// Axis formatter that prints category names at integer positions
fn category_formatter(
    labels: Vec<String>,
) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String + 'static {
    move |mark, _range| {
        let index = mark.value.round();
        if index < 0. || (mark.value - index).abs() > 1e-6 {
            return String::new();
        }
        labels.get(index as usize).cloned().unwrap_or_default()
    }
}

pub(crate) fn show_chart(ui: &mut Ui, chart: &Chart) {
    match chart {
        Chart::Blank => {}
        Chart::Placeholder { title } => show_placeholder(ui, title),
        Chart::Bar {
            title,
            y_label,
            bars,
            y_range,
        } => {
            show_title(ui, title);
            show_bars(ui, y_label, bars, *y_range);
        }
        Chart::StackedBar {
            title,
            y_label,
            categories,
            segments,
        } => {
            show_title(ui, title);
            show_stacked_bars(ui, y_label, categories, segments);
        }
        Chart::Heatmap {
            title,
            columns,
            rows,
        } => {
            show_title(ui, title);
            show_heatmap(ui, columns, rows);
        }
        Chart::Line {
            title,
            x_label,
            y_label,
            series,
        } => {
            show_title(ui, title);
            show_lines(ui, x_label, y_label, series);
        }
        Chart::Timeline {
            title,
            x_label,
            y_label,
            rows,
            bars,
        } => {
            show_title(ui, title);
            show_timeline(ui, x_label, y_label, rows, bars);
        }
    }
}

fn show_placeholder(ui: &mut Ui, title: &str) {
    ui.with_layout(Layout::centered_and_justified(Direction::TopDown), |ui| {
        ui.label(RichText::new(title).heading().color(Color32::WHITE));
    });
}

fn show_title(ui: &mut Ui, title: &str) {
    ui.with_layout(Layout::top_down(Align::Center), |ui| {
        ui.label(RichText::new(title).heading().strong().color(Color32::WHITE));
    });
    ui.add_space(6.);
}

fn show_bars(ui: &mut Ui, y_label: &str, items: &[BarItem], y_range: (f64, f64)) {
    let labels = items.iter().map(|b| b.label.clone()).collect_vec();
    let bars = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let color = to_color32(item.color);
            Bar::new(i as f64, item.value)
                .width(BAR_WIDTH)
                .fill(color)
                .stroke(Stroke::new(1., color))
                .name(&item.hover)
        })
        .collect_vec();

    Plot::new("bar_chart")
        .show_background(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .y_axis_label(y_label)
        .x_axis_formatter(category_formatter(labels))
        .show_grid([false, true])
        .show(ui, |plot_ui| {
            plot_ui.set_plot_bounds(PlotBounds::from_min_max(
                [-0.5, y_range.0],
                [items.len() as f64 - 0.5, y_range.1],
            ));
            plot_ui.bar_chart(BarChart::new("bars", bars));
            for (i, item) in items.iter().enumerate().filter(|(_, b)| !b.text.is_empty()) {
                plot_ui.text(
                    Text::new(
                        "bar_text",
                        PlotPoint::new(i as f64, item.value),
                        RichText::new(&item.text).color(Color32::WHITE),
                    )
                    .anchor(egui::Align2::CENTER_BOTTOM),
                );
            }
        });
}

fn show_stacked_bars(ui: &mut Ui, y_label: &str, categories: &[String], segments: &[StackSegment]) {
    let mut charts: Vec<BarChart> = Vec::new();
    for series in segments.iter().map(|s| s.series.as_str()).unique() {
        let segs = segments.iter().filter(|s| s.series == series).collect_vec();
        let Some(color) = segs.first().map(|s| to_color32(s.color)) else {
            continue;
        };
        // every series needs a bar per category for stacking to line up
        let bars = categories
            .iter()
            .enumerate()
            .map(|(i, category)| {
                let value = segs
                    .iter()
                    .filter(|s| &s.category == category)
                    .map(|s| s.value)
                    .sum::<f64>();
                Bar::new(i as f64, value)
                    .width(BAR_WIDTH)
                    .fill(color)
                    .stroke(Stroke::new(1., Color32::BLACK))
                    .name(format!("{}: {} {} laps", category, series, value))
            })
            .collect_vec();
        let chart = BarChart::new(series, bars).color(color);
        let below = charts.iter().collect_vec();
        let chart = chart.stack_on(&below);
        charts.push(chart);
    }

    Plot::new("stacked_bar_chart")
        .show_background(false)
        .legend(Legend::default())
        .y_axis_label(y_label)
        .x_axis_formatter(category_formatter(categories.to_vec()))
        .include_y(0.)
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

fn show_heatmap(ui: &mut Ui, columns: &[String], rows: &[HeatmapRow]) {
    let (min, max) = rows
        .iter()
        .flat_map(|r| r.values.iter().flatten())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)));

    TableBuilder::new(ui)
        .striped(false)
        .cell_layout(Layout::centered_and_justified(Direction::LeftToRight))
        .column(Column::auto().at_least(60.))
        .columns(Column::remainder(), columns.len())
        .header(24., |mut header| {
            header.col(|ui| {
                ui.strong("Driver");
            });
            for column in columns {
                header.col(|ui| {
                    ui.strong(column);
                });
            }
        })
        .body(|mut body| {
            for row in rows {
                body.row(28., |mut table_row| {
                    table_row.col(|ui| {
                        ui.label(RichText::new(&row.label).color(PALETTE_ORANGE).strong());
                    });
                    for value in &row.values {
                        table_row.col(|ui| match value {
                            Some(v) => {
                                ui.painter().rect_filled(ui.max_rect(), 0., heat_color(*v, min, max));
                                ui.label(RichText::new(format!("{:.3}", v)).color(Color32::WHITE));
                            }
                            None => {
                                ui.label("--");
                            }
                        });
                    }
                });
            }
        });
}

fn show_lines(ui: &mut Ui, x_label: &str, y_label: &str, series: &[Series]) {
    Plot::new("line_chart")
        .show_background(false)
        .legend(Legend::default())
        .x_axis_label(x_label)
        .y_axis_label(y_label)
        .show(ui, |plot_ui| {
            for s in series {
                let color = to_color32(s.color);
                if s.is_trend {
                    plot_ui.line(
                        Line::new(&s.name, PlotPoints::new(s.points.clone()))
                            .color(color)
                            .style(LineStyle::dashed_dense())
                            .width(1.),
                    );
                } else {
                    plot_ui.line(
                        Line::new(&s.name, PlotPoints::new(s.points.clone()))
                            .color(color)
                            .width(2.),
                    );
                    plot_ui.points(
                        Points::new(&s.name, PlotPoints::new(s.points.clone()))
                            .color(color)
                            .radius(3.),
                    );
                }
            }
        });
}

fn show_timeline(ui: &mut Ui, x_label: &str, y_label: &str, rows: &[String], bars: &[TimelineBar]) {
    let stints = bars
        .iter()
        .filter_map(|bar| {
            let row = rows.iter().position(|r| r == &bar.row)?;
            let color = to_color32(bar.color);
            Some(
                Bar::new(row as f64, bar.length)
                    .base_offset(bar.base)
                    .width(BAR_WIDTH)
                    .fill(color)
                    .stroke(Stroke::new(1., Color32::BLACK))
                    .name(&bar.hover),
            )
        })
        .collect_vec();

    Plot::new("timeline_chart")
        .show_background(false)
        .x_axis_label(x_label)
        .y_axis_label(y_label)
        .y_axis_formatter(category_formatter(rows.to_vec()))
        .include_x(0.)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new("stints", stints).horizontal());
        });
}
