use std::sync::Arc;

use anyhow::Context as _;
use eframe::egui::{self, FontData, FontDefinitions, FontFamily, RichText, ScrollArea};

use crate::config::AppConfig;
use crate::data::pipeline::Outcome;
use crate::state::AppState;
use crate::ui::{panels, plot, table};

const FALLBACK_FONT: &str = "pitch_scope_font";

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct PitchScopeApp {
    pub state: AppState,
}

impl PitchScopeApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        if let Some(path) = &config.font_path {
            match install_font(&cc.egui_ctx, path) {
                Ok(()) => log::info!("Installed font {}", path.display()),
                Err(e) => log::error!("Font not installed: {e:#}"),
            }
        }

        let mut state = AppState::new(config);
        state.load_configured_sources();
        Self { state }
    }
}

/// Put the font at `path` first in both families so Hangul labels render.
fn install_font(ctx: &egui::Context, path: &std::path::Path) -> anyhow::Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let mut fonts = FontDefinitions::default();
    fonts
        .font_data
        .insert(FALLBACK_FONT.to_owned(), Arc::new(FontData::from_owned(bytes)));
    for family in [FontFamily::Proportional, FontFamily::Monospace] {
        fonts
            .families
            .entry(family)
            .or_default()
            .insert(0, FALLBACK_FONT.to_owned());
    }
    ctx.set_fonts(fonts);
    Ok(())
}

impl eframe::App for PitchScopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: summary + charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            let state = &self.state;
            if let Some(prompt) = state.prompt() {
                ui.centered_and_justified(|ui| {
                    ui.label(RichText::new(prompt).weak());
                });
                return;
            }
            let (Some(palette), Outcome::Ready(analysis)) = (&state.palette, &state.outcome) else {
                return;
            };

            let records = state.filtered_records();
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    ui.heading("Pitch summary");
                    ScrollArea::horizontal().id_salt("summary_scroll").show(ui, |ui| {
                        table::summary_table(ui, &analysis.summary, palette);
                    });
                    ui.separator();

                    ui.columns(2, |cols| {
                        cols[0].heading("Pitch location");
                        plot::location_plot(&mut cols[0], &records, palette);
                        cols[1].heading("Pitch movement");
                        plot::movement_plot(&mut cols[1], &records, palette);
                    });
                });
        });
    }
}
