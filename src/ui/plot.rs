use eframe::egui::{Color32, Stroke, Ui};
use egui_plot::{HLine, Legend, Line, LineStyle, MarkerShape, Plot, PlotPoints, PlotUi, Points, Polygon, VLine};

use crate::color::PitchPalette;
use crate::data::model::PitchRecord;

// Strike zone in plate coordinates ×100 (cm).
const ZONE_LEFT: f64 = -23.0;
const ZONE_RIGHT: f64 = 23.0;
const ZONE_BOTTOM: f64 = 46.0;
const ZONE_TOP: f64 = 105.0;
const ZONE_THIRD_X: f64 = 7.666;
const ZONE_THIRDS_Y: [f64; 2] = [65.0, 85.0];

const MOVEMENT_LIMIT: f64 = 70.0;

/// One series per pitch type, in legend order, so each type is listed once.
fn series_by_type(
    records: &[&PitchRecord],
    palette: &PitchPalette,
    point: impl Fn(&PitchRecord) -> Option<[f64; 2]>,
) -> Vec<(String, Color32, Vec<[f64; 2]>)> {
    let present = records.iter().filter_map(|r| r.pitch_type.as_deref());
    palette
        .legend_entries(present)
        .into_iter()
        .map(|(name, color)| {
            let pts = records
                .iter()
                .filter(|r| r.pitch_type.as_deref() == Some(name.as_str()))
                .filter_map(|r| point(r))
                .collect();
            (name, color, pts)
        })
        .collect()
}

fn draw_series(plot_ui: &mut PlotUi, series: Vec<(String, Color32, Vec<[f64; 2]>)>, radius: f32) {
    for (name, color, pts) in series {
        plot_ui.points(
            Points::new(PlotPoints::new(pts))
                .name(&name)
                .color(color)
                .shape(MarkerShape::Circle)
                .filled(true)
                .radius(radius),
        );
    }
}

fn dashed(plot_ui: &mut PlotUi, from: [f64; 2], to: [f64; 2]) {
    plot_ui.line(
        Line::new(PlotPoints::new(vec![from, to]))
            .color(Color32::GRAY)
            .style(LineStyle::dashed_dense()),
    );
}

// ---------------------------------------------------------------------------
// Plate location (catcher's view)
// ---------------------------------------------------------------------------

/// Scatter of where each pitch crossed the plate, with the strike zone.
pub fn location_plot(ui: &mut Ui, records: &[&PitchRecord], palette: &PitchPalette) {
    let series = series_by_type(records, palette, |r| {
        Some([r.plate_loc_side? * 100.0, r.plate_loc_height? * 100.0])
    });

    Plot::new("location_plot")
        .legend(Legend::default())
        .data_aspect(1.0)
        .include_x(-MOVEMENT_LIMIT)
        .include_x(MOVEMENT_LIMIT)
        .include_y(-10.0)
        .include_y(150.0)
        .show_axes(false)
        .show_grid(false)
        .height(ui.available_width().min(520.0) * 1.15)
        .show(ui, |plot_ui| {
            plot_ui.polygon(
                Polygon::new(PlotPoints::new(vec![
                    [ZONE_LEFT, ZONE_BOTTOM],
                    [ZONE_RIGHT, ZONE_BOTTOM],
                    [ZONE_RIGHT, ZONE_TOP],
                    [ZONE_LEFT, ZONE_TOP],
                ]))
                .fill_color(Color32::from_gray(128).gamma_multiply(0.2))
                .stroke(Stroke::new(1.0, Color32::GRAY)),
            );
            for y in ZONE_THIRDS_Y {
                dashed(plot_ui, [ZONE_LEFT, y], [ZONE_RIGHT, y]);
            }
            for x in [-ZONE_THIRD_X, ZONE_THIRD_X] {
                dashed(plot_ui, [x, ZONE_BOTTOM], [x, ZONE_TOP]);
            }
            draw_series(plot_ui, series, 5.0);
        });
}

// ---------------------------------------------------------------------------
// Movement (horizontal vs induced vertical break)
// ---------------------------------------------------------------------------

/// Scatter of horizontal against induced vertical break, in cm.
pub fn movement_plot(ui: &mut Ui, records: &[&PitchRecord], palette: &PitchPalette) {
    let series = series_by_type(records, palette, |r| {
        Some([r.horz_break?, r.induced_vert_break?])
    });

    Plot::new("movement_plot")
        .legend(Legend::default())
        .data_aspect(1.0)
        .include_x(-MOVEMENT_LIMIT)
        .include_x(MOVEMENT_LIMIT)
        .include_y(-MOVEMENT_LIMIT)
        .include_y(MOVEMENT_LIMIT)
        .x_axis_label("Horizontal break (cm)")
        .y_axis_label("Vertical break (cm)")
        .height(ui.available_width().min(520.0))
        .show(ui, |plot_ui| {
            let axis = Color32::DARK_GRAY;
            plot_ui.hline(HLine::new(0.0).color(axis).style(LineStyle::dashed_loose()));
            plot_ui.vline(VLine::new(0.0).color(axis).style(LineStyle::dashed_loose()));
            draw_series(plot_ui, series, 4.0);
        });
}
