use std::path::PathBuf;

use eframe::egui::{self, Color32, RichText, Ui};

use crate::state::ViewState;

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut ViewState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Export SVG…").clicked() {
                save_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();
        ui.label(state.summary());

        if let Some(msg) = &state.status_message {
            ui.separator();
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                Color32::DARK_GREEN
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn save_file_dialog(state: &mut ViewState) {
    let mut dialog = rfd::FileDialog::new()
        .set_title("Export figure")
        .add_filter("SVG", &["svg"]);

    let default = state
        .export_path
        .clone()
        .unwrap_or_else(|| PathBuf::from("core-plot.svg"));
    if let Some(name) = default.file_name().and_then(|n| n.to_str()) {
        dialog = dialog.set_file_name(name);
    }
    if let Some(dir) = default.parent().filter(|d| d.is_dir()) {
        dialog = dialog.set_directory(dir);
    }

    if let Some(path) = dialog.save_file() {
        let result = crate::export::write_svg(&state.figure, &path);
        state.record_export(path, result);
    }
}
