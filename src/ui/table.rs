use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::color::PitchPalette;
use crate::data::aggregate::{PitchSummary, SUMMARY_COLUMNS};

/// Per-pitch-type summary table.
pub fn summary_table(ui: &mut Ui, summary: &[PitchSummary], palette: &PitchPalette) {
    TableBuilder::new(ui)
        .id_salt("summary_table")
        .striped(true)
        .columns(Column::auto().at_least(48.0), SUMMARY_COLUMNS.len())
        .header(20.0, |mut header| {
            for title in SUMMARY_COLUMNS {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|mut body| {
            for row in summary {
                let color = palette.color_for(Some(row.pitch_type.as_str()));
                body.row(18.0, |mut table_row| {
                    for (i, cell) in row.cells().into_iter().enumerate() {
                        table_row.col(|ui| {
                            if i == 0 {
                                ui.colored_label(color, cell);
                            } else {
                                ui.label(cell);
                            }
                        });
                    }
                });
            }
        });
}
