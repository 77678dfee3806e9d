use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::data::filter::{pitcher_suggestions, MonthFilter, RunnerFilter, SideFilter};
use crate::data::model::BatterSide;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    // Clone the Arc so the form can be mutated while reading the dataset.
    let Some(dataset) = state.dataset.clone() else {
        ui.label("No dataset loaded.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            let form = &mut state.form;

            // ---- Year / month ----
            ui.strong("Year");
            let year_text = form.year.map(|y| y.to_string()).unwrap_or_default();
            egui::ComboBox::from_id_salt("year")
                .selected_text(year_text)
                .show_ui(ui, |ui: &mut Ui| {
                    for &year in &dataset.years {
                        ui.selectable_value(&mut form.year, Some(year), year.to_string());
                    }
                });

            ui.strong("Month");
            let month_text = match form.month {
                MonthFilter::All => "All".to_string(),
                MonthFilter::Month(m) => m.to_string(),
            };
            egui::ComboBox::from_id_salt("month")
                .selected_text(month_text)
                .show_ui(ui, |ui: &mut Ui| {
                    ui.selectable_value(&mut form.month, MonthFilter::All, "All");
                    for m in 1..=12 {
                        ui.selectable_value(&mut form.month, MonthFilter::Month(m), m.to_string());
                    }
                });
            ui.separator();

            // ---- Explicit date range ----
            ui.checkbox(&mut form.use_date_range, "Date range");
            ui.add_enabled_ui(form.use_date_range, |ui: &mut Ui| {
                ui.horizontal(|ui: &mut Ui| {
                    ui.add(DatePickerButton::new(&mut form.range_start).id_salt("range_start"));
                    ui.label("–");
                    ui.add(DatePickerButton::new(&mut form.range_end).id_salt("range_end"));
                });
            });
            ui.separator();

            // ---- Pitcher search + select ----
            ui.strong("Pitcher");
            ui.add(
                egui::TextEdit::singleline(&mut form.pitcher_query).hint_text("Search name"),
            );
            let suggestions = pitcher_suggestions(&dataset, &form.pitcher_query);
            if suggestions.is_empty() {
                ui.label(RichText::new("No matching pitchers").weak());
            } else {
                let selected = form
                    .pitcher
                    .as_deref()
                    .filter(|name| suggestions.contains(name))
                    .unwrap_or("All pitchers")
                    .to_string();
                egui::ComboBox::from_id_salt("pitcher")
                    .selected_text(selected)
                    .show_ui(ui, |ui: &mut Ui| {
                        ui.selectable_value(&mut form.pitcher, None, "All pitchers");
                        for name in &suggestions {
                            ui.selectable_value(&mut form.pitcher, Some(name.to_string()), *name);
                        }
                    });
            }
            ui.separator();

            // ---- Batter side ----
            ui.strong("Batter");
            ui.horizontal(|ui: &mut Ui| {
                ui.radio_value(&mut form.batter_side, SideFilter::All, "All");
                ui.radio_value(
                    &mut form.batter_side,
                    SideFilter::Only(BatterSide::Right),
                    "Right",
                );
                ui.radio_value(
                    &mut form.batter_side,
                    SideFilter::Only(BatterSide::Left),
                    "Left",
                );
            });

            // ---- Runners ----
            ui.strong("Runners");
            ui.horizontal(|ui: &mut Ui| {
                ui.radio_value(&mut form.runners, RunnerFilter::All, "All");
                ui.radio_value(&mut form.runners, RunnerFilter::BasesEmpty, "Empty");
                ui.radio_value(&mut form.runners, RunnerFilter::RunnersOn, "On base");
            });
            ui.separator();

            // ---- Pitch types (empty selection = all) ----
            let n_selected = form.pitch_types.len();
            let n_total = dataset.pitch_types.len();
            egui::CollapsingHeader::new(
                RichText::new(format!("Pitch types  ({n_selected}/{n_total})")).strong(),
            )
            .id_salt("pitch_types")
            .default_open(true)
            .show(ui, |ui: &mut Ui| {
                if ui.small_button("Clear").clicked() {
                    form.pitch_types.clear();
                }
                for pt in &dataset.pitch_types {
                    let mut text = RichText::new(pt);
                    if let Some(palette) = &state.palette {
                        text = text.color(palette.color_for(Some(pt.as_str())));
                    }
                    let mut checked = form.pitch_types.contains(pt);
                    if ui.checkbox(&mut checked, text).changed() {
                        if checked {
                            form.pitch_types.insert(pt.clone());
                        } else {
                            form.pitch_types.remove(pt);
                        }
                    }
                }
            });
            ui.separator();

            if ui.button(RichText::new("Run").strong()).clicked() {
                state.run();
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload sources").clicked() {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();

        if ui
            .add_enabled(state.can_export(), egui::Button::new("Export CSV"))
            .clicked()
        {
            save_file_dialog(state);
        }

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} pitches loaded, {} selected",
                ds.len(),
                state.filtered_records().len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open pitch data")
        .add_filter("Supported files", &["xlsx", "xls", "xlsm", "xlsb", "csv", "json", "parquet", "pq"])
        .add_filter("Excel", &["xlsx", "xls", "xlsm", "xlsb"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        if let Err(e) = state.open_path(&path) {
            log::error!("Failed to load file: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

pub fn save_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export filtered pitches")
        .set_file_name(&state.config.export_file_name)
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        match state.export_to(&path) {
            Ok(_) => state.status_message = None,
            Err(e) => {
                log::error!("Export failed: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
