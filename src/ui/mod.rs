use egui::{Color32, Visuals, style::Widgets};

use crate::analysis::Rgb;

mod chart_view;
pub mod dashboard;

pub use dashboard::DashboardApp;

pub(crate) const PALETTE_BLACK: Color32 = Color32::from_rgb(12, 12, 12);
pub(crate) const PALETTE_BROWN: Color32 = Color32::from_rgb(72, 30, 20);
pub(crate) const PALETTE_MAROON: Color32 = Color32::from_rgb(155, 57, 34);
pub(crate) const PALETTE_ORANGE: Color32 = Color32::from_rgb(242, 97, 63);

const DEFAULT_WINDOW_TRANSPARENCY: u8 = 230;

// plasma colour map stops, dark to bright
const HEAT_STOPS: [Color32; 5] = [
    Color32::from_rgb(13, 8, 135),
    Color32::from_rgb(126, 3, 168),
    Color32::from_rgb(204, 71, 120),
    Color32::from_rgb(248, 149, 64),
    Color32::from_rgb(240, 249, 33),
];

pub(crate) fn dark_visuals() -> Visuals {
    Visuals {
        dark_mode: true,
        hyperlink_color: PALETTE_ORANGE,
        faint_bg_color: PALETTE_BLACK,
        extreme_bg_color: PALETTE_BROWN,
        panel_fill: PALETTE_BLACK,
        button_frame: true,
        window_fill: Color32::from_rgba_premultiplied(
            PALETTE_BLACK.r(),
            PALETTE_BLACK.g(),
            PALETTE_BLACK.b(),
            DEFAULT_WINDOW_TRANSPARENCY,
        ),
        selection: egui::style::Selection {
            bg_fill: PALETTE_MAROON,
            ..Default::default()
        },
        widgets: Widgets::dark(),
        striped: false,
        ..Default::default()
    }
}

pub(crate) fn to_color32(color: Rgb) -> Color32 {
    Color32::from_rgb(color.0, color.1, color.2)
}

/// Linear interpolation between two colours, `y` in `0..=1`.
pub(crate) fn stroke_shade(start: Color32, end: Color32, y: f32) -> Color32 {
    let channel = |s: u8, e: u8| (s as f32 + y * (e as f32 - s as f32)).clamp(0., 255.) as u8;
    Color32::from_rgb(
        channel(start.r(), end.r()),
        channel(start.g(), end.g()),
        channel(start.b(), end.b()),
    )
}

/// Colour of `value` on a plasma-like ramp spanning `min..=max`.
pub(crate) fn heat_color(value: f64, min: f64, max: f64) -> Color32 {
    let t = if max > min {
        ((value - min) / (max - min)).clamp(0., 1.)
    } else {
        0.
    };
    let scaled = t * (HEAT_STOPS.len() - 1) as f64;
    let segment = (scaled.floor() as usize).min(HEAT_STOPS.len() - 2);
    stroke_shade(
        HEAT_STOPS[segment],
        HEAT_STOPS[segment + 1],
        (scaled - segment as f64) as f32,
    )
}
