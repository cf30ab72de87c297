use std::path::PathBuf;

use crate::figure::Figure;

// ---------------------------------------------------------------------------
// Viewer state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct ViewState {
    /// Assembled figure, fixed for the lifetime of the window.
    pub figure: Figure,

    /// Default target offered by the export dialog.
    pub export_path: Option<PathBuf>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl ViewState {
    pub fn new(figure: Figure, export_path: Option<PathBuf>) -> Self {
        Self {
            figure,
            export_path,
            status_message: None,
        }
    }

    /// One-line summary for the top bar: points drawn per panel.
    pub fn summary(&self) -> String {
        let counts = self.figure.point_counts();
        let parts: Vec<String> = self
            .figure
            .panels
            .iter()
            .zip(counts)
            .enumerate()
            .map(|(i, (panel, n))| {
                let name = panel
                    .title
                    .clone()
                    .unwrap_or_else(|| format!("panel {}", i + 1));
                if panel.is_inert() {
                    format!("{name}: –")
                } else {
                    format!("{name}: {n} pts")
                }
            })
            .collect();
        parts.join("  |  ")
    }

    /// Record the outcome of an export for the status line.
    pub fn record_export(&mut self, path: PathBuf, result: anyhow::Result<()>) {
        match result {
            Ok(()) => {
                log::info!("Exported figure to {}", path.display());
                self.status_message = Some(format!("Saved {}", path.display()));
                self.export_path = Some(path);
            }
            Err(e) => {
                log::error!("Failed to export figure: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
