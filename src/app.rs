use eframe::egui;

use crate::state::ViewState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SedimentPlotApp {
    pub state: ViewState,
}

impl SedimentPlotApp {
    pub fn new(state: ViewState) -> Self {
        Self { state }
    }
}

impl eframe::App for SedimentPlotApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Central panel: core panels ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::figure_view(ui, &self.state.figure);
        });
    }
}
