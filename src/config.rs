//! Plot configuration
//!
//! Loaded from a JSON file. Every input file, column selector and figure
//! setting lives here; nothing is hard-coded in the loader or renderer.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::table::{default_na_values, ColumnSelector};
use crate::units::CmSize;

/// Top-level configuration for one figure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotConfig {
    #[serde(default)]
    pub figure: FigureConfig,

    /// Panel 1: age against depth. Hosts the secondary year axis.
    pub age_model: PanelConfig,

    /// Panel 2: XRF titanium counts against XRF depth.
    pub titanium: PanelConfig,

    /// Panels 3.. in order. The default holds a single inert panel, the
    /// slot reserved for magnetic susceptibility.
    #[serde(default = "default_extra_panels")]
    pub extra_panels: Vec<PanelConfig>,

    /// Secondary year scale overlaid on the age-model panel.
    #[serde(default)]
    pub age_scale: AgeScaleConfig,

    /// Optional SVG export of the figure.
    #[serde(default)]
    pub export: Option<ExportConfig>,

    /// Open the interactive window (blocks until closed).
    #[serde(default = "default_true")]
    pub display: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FigureConfig {
    /// Window / document title
    pub title: String,

    /// Figure size in centimetres: `[width, height]`
    pub size_cm: CmSize,

    /// Pixels per inch used to turn `size_cm` into a window size
    pub dpi: f64,

    /// Gap between panels as a fraction of the average panel width
    pub wspace: f64,

    /// Label of the shared depth axis
    pub depth_label: String,

    /// Put the shallowest depth at the top. Off by default: the shared
    /// depth axis is flipped by both primary panels, leaving the deepest
    /// sample at the top.
    pub depth_increases_downward: bool,
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            title: "Sediment core".to_string(),
            size_cm: CmSize::new(30.0, 9.6),
            dpi: 100.0,
            wspace: 0.5,
            depth_label: "Depth (mm)".to_string(),
            depth_increases_downward: false,
        }
    }
}

/// One plot panel and the series it shows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub title: Option<String>,
    pub x_label: Option<String>,
    pub y_label: Option<String>,

    /// Draw the value axis right-to-left
    pub invert_x: bool,

    /// Fit the value axis tightly to the data (no padding)
    pub zero_margins: bool,

    /// Line colour as `#rrggbb`; palette colour when absent
    pub color: Option<String>,

    /// Where the series comes from; `None` leaves the panel empty
    pub source: Option<SeriesSource>,
}

impl PanelConfig {
    /// The source, if one is configured and enabled.
    pub fn active_source(&self) -> Option<&SeriesSource> {
        self.source.as_ref().filter(|s| s.enabled)
    }
}

/// A (depth, value) column pair inside one spreadsheet file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesSource {
    pub path: PathBuf,

    /// Worksheet name for workbook formats; first sheet when absent
    #[serde(default)]
    pub sheet: Option<String>,

    pub depth_column: ColumnSelector,
    pub value_column: ColumnSelector,

    /// Cell texts read as missing values; replaces the default markers
    /// (`#N/A`, `N/A`, `NA`, `NULL`, `nan`, ...) when given
    #[serde(default = "default_na_values")]
    pub na_values: Vec<String>,

    /// Factor applied to the depth column (e.g. 10.0 for cm → mm)
    #[serde(default = "default_depth_scale")]
    pub depth_scale: f64,

    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgeScaleConfig {
    pub enabled: bool,
    pub label: String,
}

impl Default for AgeScaleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            label: "Years AD".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    pub path: PathBuf,
    #[serde(default)]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

fn default_depth_scale() -> f64 {
    1.0
}

fn default_extra_panels() -> Vec<PanelConfig> {
    vec![PanelConfig::default()]
}

impl PlotConfig {
    /// Read and parse a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let mut config: PlotConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        config.clamp_spacing();
        Ok(config)
    }

    /// Panel spacing must be a non-negative fraction of the panel width.
    fn clamp_spacing(&mut self) {
        let wspace = self.figure.wspace;
        if !wspace.is_finite() || wspace < 0.0 {
            log::warn!("figure.wspace {wspace} is invalid, using 0");
            self.figure.wspace = 0.0;
        }
    }

    /// Make relative input/output paths relative to the config file.
    pub fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        for panel in self.panels_mut() {
            if let Some(src) = panel.source.as_mut() {
                resolve(&mut src.path);
            }
        }
        if let Some(export) = self.export.as_mut() {
            resolve(&mut export.path);
        }
    }

    /// All panels in display order.
    pub fn panels(&self) -> impl Iterator<Item = &PanelConfig> {
        [&self.age_model, &self.titanium]
            .into_iter()
            .chain(self.extra_panels.iter())
    }

    fn panels_mut(&mut self) -> impl Iterator<Item = &mut PanelConfig> {
        [&mut self.age_model, &mut self.titanium]
            .into_iter()
            .chain(self.extra_panels.iter_mut())
    }

    /// Export target, if export is enabled.
    pub fn export_path(&self) -> Option<&Path> {
        self.export
            .as_ref()
            .filter(|e| e.enabled)
            .map(|e| e.path.as_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "age_model": {
            "title": "Age model",
            "invert_x": true,
            "source": {
                "path": "age-model.xlsx",
                "depth_column": {"letter": "A"},
                "value_column": {"letter": "F"}
            }
        },
        "titanium": {
            "source": {
                "path": "/data/xrf.csv",
                "depth_column": {"name": "depth"},
                "value_column": {"name": "Ti"},
                "enabled": false
            }
        }
    }"#;

    #[test]
    fn defaults_fill_missing_sections() {
        let cfg: PlotConfig = serde_json::from_str(MINIMAL).unwrap();
        assert_eq!(cfg.figure.size_cm, CmSize(30.0, 9.6));
        assert_eq!(cfg.figure.wspace, 0.5);
        assert!(!cfg.figure.depth_increases_downward);
        assert!(cfg.display);
        assert!(cfg.age_scale.enabled);
        assert_eq!(cfg.age_scale.label, "Years AD");
        assert_eq!(cfg.extra_panels.len(), 1);
        assert!(cfg.extra_panels[0].source.is_none());
        assert_eq!(cfg.panels().count(), 3);

        let src = cfg.age_model.source.as_ref().unwrap();
        assert_eq!(src.na_values, default_na_values());
        assert!(src.na_values.iter().any(|na| na == "#N/A"));
        assert_eq!(src.depth_scale, 1.0);
        assert!(src.enabled);
    }

    #[test]
    fn disabled_sources_are_inactive() {
        let cfg: PlotConfig = serde_json::from_str(MINIMAL).unwrap();
        assert!(cfg.age_model.active_source().is_some());
        assert!(cfg.titanium.active_source().is_none());
        assert!(cfg.export_path().is_none());
    }

    #[test]
    fn load_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plot.json");
        std::fs::write(&path, MINIMAL).unwrap();

        let cfg = PlotConfig::load(&path).unwrap();
        let age = cfg.age_model.source.unwrap();
        assert_eq!(age.path, dir.path().join("age-model.xlsx"));
        let ti = cfg.titanium.source.unwrap();
        assert_eq!(ti.path, PathBuf::from("/data/xrf.csv"));
    }

    #[test]
    fn load_reports_missing_config() {
        let err = PlotConfig::load(Path::new("/nonexistent/plot.json")).unwrap_err();
        assert!(format!("{err:#}").contains("reading config"));
    }

    #[test]
    fn negative_spacing_is_clamped_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plot.json");
        std::fs::write(
            &path,
            r#"{"figure": {"wspace": -1.0}, "age_model": {}, "titanium": {}}"#,
        )
        .unwrap();

        let cfg = PlotConfig::load(&path).unwrap();
        assert_eq!(cfg.figure.wspace, 0.0);
    }
}
