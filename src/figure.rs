//! Renderer-independent figure model
//!
//! `assemble` turns a configuration and the loaded series into a
//! [`Figure`]: side-by-side panels sharing one depth axis, plus an optional
//! twin year axis on the age-model panel. Both the egui view and the SVG
//! exporter draw from this model.

use crate::color::{generate_palette, panel_color, Rgb};
use crate::config::{PanelConfig, PlotConfig};
use crate::data::model::{finite_range, CoreDataset, Profile};
use crate::units::cm2inch;

/// Relative padding added around data on non-tight value axes.
pub const DEFAULT_MARGIN: f64 = 0.05;

// ---------------------------------------------------------------------------
// Axis direction
// ---------------------------------------------------------------------------

/// Direction of an axis relative to the renderer's natural one (values
/// growing rightward / upward). Inverted axes are drawn on negated
/// coordinates, so `to_plot` and `from_plot` are the same map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisDirection {
    #[default]
    Normal,
    Inverted,
}

impl AxisDirection {
    pub fn from_inverted(inverted: bool) -> Self {
        if inverted {
            AxisDirection::Inverted
        } else {
            AxisDirection::Normal
        }
    }

    /// Data value → plot coordinate.
    pub fn to_plot(self, value: f64) -> f64 {
        match self {
            AxisDirection::Normal => value,
            AxisDirection::Inverted => -value,
        }
    }

    /// Plot coordinate → data value.
    pub fn from_plot(self, coord: f64) -> f64 {
        self.to_plot(coord)
    }

    /// Data range (lo, hi) → plot range, still ordered low to high.
    pub fn plot_range(self, (lo, hi): (f64, f64)) -> (f64, f64) {
        let (a, b) = (self.to_plot(lo), self.to_plot(hi));
        (a.min(b), a.max(b))
    }
}

// ---------------------------------------------------------------------------
// Shared depth axis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct DepthAxis {
    pub label: String,
    /// Finite (min, max) depth over every panel; `None` when nothing loaded.
    pub range: Option<(f64, f64)>,
    pub direction: AxisDirection,
}

impl DepthAxis {
    /// Depth shown at the top edge of the panels.
    pub fn top_value(&self) -> Option<f64> {
        self.range.map(|(lo, hi)| match self.direction {
            AxisDirection::Normal => hi,
            AxisDirection::Inverted => lo,
        })
    }

    /// Depth shown at the bottom edge of the panels.
    pub fn bottom_value(&self) -> Option<f64> {
        self.range.map(|(lo, hi)| match self.direction {
            AxisDirection::Normal => lo,
            AxisDirection::Inverted => hi,
        })
    }

    /// Range in plot coordinates, bottom edge first.
    pub fn plot_range(&self) -> Option<(f64, f64)> {
        Some((
            self.direction.to_plot(self.bottom_value()?),
            self.direction.to_plot(self.top_value()?),
        ))
    }
}

// ---------------------------------------------------------------------------
// Twin (secondary) axis
// ---------------------------------------------------------------------------

/// A secondary vertical scale overlaid on one panel. It shares the host's
/// horizontal axis and spans its full height with an independent range.
#[derive(Debug, Clone, PartialEq)]
pub struct TwinAxis {
    /// Index of the host panel.
    pub host: usize,
    pub label: String,
    /// Value at the bottom edge of the host panel.
    pub bottom: f64,
    /// Value at the top edge of the host panel.
    pub top: f64,
}

impl TwinAxis {
    /// Year scale from an age series: last age at the bottom, first at
    /// the top. Only the endpoints matter.
    pub fn from_ages(host: usize, label: &str, ages: &Profile) -> Option<Self> {
        let (first, last) = ages.value_endpoints()?;
        Some(TwinAxis {
            host,
            label: label.to_string(),
            bottom: last,
            top: first,
        })
    }

    /// (bottom, top)
    pub fn range(&self) -> (f64, f64) {
        (self.bottom, self.top)
    }

    /// Value at fraction `t` of the panel height, 0 = bottom, 1 = top.
    pub fn value_at(&self, t: f64) -> f64 {
        self.bottom + t * (self.top - self.bottom)
    }

    /// Fraction of the panel height at which `value` sits; inverse of
    /// [`TwinAxis::value_at`].
    pub fn fraction_of(&self, value: f64) -> f64 {
        let span = self.top - self.bottom;
        if span.abs() < f64::EPSILON {
            return 0.0;
        }
        (value - self.bottom) / span
    }

    /// Spacing of the labelled values when about `count` are wanted.
    pub fn mark_step(&self, count: usize) -> f64 {
        let (bottom, top) = self.range();
        nice_step(top - bottom, count)
    }

    /// Round values (multiples of [`TwinAxis::mark_step`]) inside the
    /// scale, ascending.
    pub fn round_marks(&self, count: usize) -> Vec<f64> {
        let step = self.mark_step(count);
        if step <= 0.0 {
            return Vec::new();
        }
        let (bottom, top) = self.range();
        let (lo, hi) = (bottom.min(top), bottom.max(top));
        let first = (lo / step).ceil() as i64;
        let last = (hi / step + 1e-9).floor() as i64;
        (first..=last).map(|k| k as f64 * step).collect()
    }

    /// Value at plot coordinate `coord` when the host shows `[lo, hi]`
    /// (plot coordinates, bottom to top).
    pub fn value_at_coord(&self, coord: f64, lo: f64, hi: f64) -> f64 {
        let span = hi - lo;
        if span.abs() < f64::EPSILON {
            return self.bottom;
        }
        self.value_at((coord - lo) / span)
    }
}

// ---------------------------------------------------------------------------
// Panel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub title: Option<String>,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    /// `[value, depth]` per row, in data coordinates. Empty for inert panels.
    pub points: Vec<[f64; 2]>,
    pub x_direction: AxisDirection,
    /// Padding fraction around the data on the value axis.
    pub x_margin: f64,
    pub color: Rgb,
    /// Only the first panel labels the shared depth ticks.
    pub show_depth_ticks: bool,
}

impl Panel {
    fn build(cfg: &PanelConfig, profile: Option<&Profile>, color: Rgb, index: usize) -> Self {
        // A panel without an active source is drawn as bare axes.
        let labelled = cfg.active_source().is_some() || profile.is_some();
        let label = |l: &Option<String>| l.clone().filter(|_| labelled);
        Panel {
            title: label(&cfg.title),
            x_label: label(&cfg.x_label),
            y_label: label(&cfg.y_label),
            points: profile.map(Profile::points).unwrap_or_default(),
            x_direction: AxisDirection::from_inverted(cfg.invert_x),
            x_margin: if cfg.zero_margins { 0.0 } else { DEFAULT_MARGIN },
            color,
            show_depth_ticks: index == 0,
        }
    }

    /// A panel with no series to draw.
    pub fn is_inert(&self) -> bool {
        self.points.is_empty()
    }

    /// Runs of consecutive finite points. Missing values break the line.
    pub fn segments(&self) -> Vec<Vec<[f64; 2]>> {
        let mut segments = Vec::new();
        let mut current = Vec::new();
        for &p in &self.points {
            if p[0].is_finite() && p[1].is_finite() {
                current.push(p);
            } else if !current.is_empty() {
                segments.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            segments.push(current);
        }
        segments
    }

    /// Finite value range, padded by `x_margin`, in data coordinates.
    pub fn x_range(&self) -> Option<(f64, f64)> {
        let xs: Vec<f64> = self.points.iter().map(|p| p[0]).collect();
        let (lo, hi) = finite_range(&xs)?;
        let pad = (hi - lo) * self.x_margin;
        Some((lo - pad, hi + pad))
    }
}

// ---------------------------------------------------------------------------
// Figure
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub title: String,
    /// (width, height) in inches
    pub size_in: (f64, f64),
    pub dpi: f64,
    /// Gap between panels as a fraction of the average panel width
    pub wspace: f64,
    pub depth_axis: DepthAxis,
    pub panels: Vec<Panel>,
    pub twin: Option<TwinAxis>,
}

/// Horizontal placement of panels inside a given width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelLayout {
    pub width: f64,
    pub gap: f64,
}

impl PanelLayout {
    /// Left edge of panel `index`.
    pub fn offset(&self, index: usize) -> f64 {
        index as f64 * (self.width + self.gap)
    }
}

impl Figure {
    /// Window / canvas size in pixels.
    pub fn size_px(&self) -> (f64, f64) {
        (self.size_in.0 * self.dpi, self.size_in.1 * self.dpi)
    }

    /// Split `total_width` into equal panels separated by `wspace` × panel width.
    pub fn panel_layout(&self, total_width: f64) -> PanelLayout {
        panel_layout(total_width, self.panels.len(), self.wspace)
    }

    /// Vertical axis label for `panel`: its own label, else the shared
    /// depth label on the panel that carries the depth ticks.
    pub fn depth_label_for(&self, panel: &Panel) -> String {
        match &panel.y_label {
            Some(label) => label.clone(),
            None if panel.show_depth_ticks => self.depth_axis.label.clone(),
            None => String::new(),
        }
    }

    /// Number of plotted (finite) points per panel.
    pub fn point_counts(&self) -> Vec<usize> {
        self.panels
            .iter()
            .map(|p| p.segments().iter().map(Vec::len).sum())
            .collect()
    }
}

/// Tick label for a data value: integers without decimals, others trimmed.
pub fn format_tick(value: f64) -> String {
    // Avoid "-0" on the negated axes.
    let value = if value == 0.0 { 0.0 } else { value };
    if (value - value.round()).abs() < 1e-9 {
        format!("{value:.0}")
    } else {
        let s = format!("{value:.3}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// A 1, 2 or 5 × 10^k step splitting `span` into about `count` parts.
/// Zero for empty or non-finite spans.
pub fn nice_step(span: f64, count: usize) -> f64 {
    let raw = span.abs() / count.max(1) as f64;
    if !raw.is_finite() || raw <= 0.0 {
        return 0.0;
    }
    let magnitude = 10f64.powf(raw.log10().floor());
    let nice = match raw / magnitude {
        n if n <= 1.0 => 1.0,
        n if n <= 2.0 => 2.0,
        n if n <= 5.0 => 5.0,
        _ => 10.0,
    };
    nice * magnitude
}

pub fn panel_layout(total_width: f64, panels: usize, wspace: f64) -> PanelLayout {
    let wspace = wspace.max(0.0);
    if panels == 0 {
        return PanelLayout {
            width: total_width,
            gap: 0.0,
        };
    }
    let n = panels as f64;
    let width = total_width / (n + (n - 1.0) * wspace);
    PanelLayout {
        width,
        gap: width * wspace,
    }
}

/// Build the figure for `config` from the loaded `data`.
pub fn assemble(config: &PlotConfig, data: &CoreDataset) -> Figure {
    let panel_configs: Vec<&PanelConfig> = config.panels().collect();
    let profiles: Vec<Option<&Profile>> = data.panel_profiles().collect();
    let palette = generate_palette(panel_configs.len());

    let panels: Vec<Panel> = panel_configs
        .iter()
        .enumerate()
        .map(|(i, cfg)| {
            let profile = profiles.get(i).copied().flatten();
            let color = panel_color(cfg.color.as_deref(), &palette, i);
            let panel = Panel::build(cfg, profile, color, i);
            if panel.is_inert() && cfg.active_source().is_some() {
                log::warn!("Panel {} has an enabled source but no rows", i + 1);
            }
            panel
        })
        .collect();

    let twin = if config.age_scale.enabled {
        let twin = data
            .age_model
            .as_ref()
            .and_then(|ages| TwinAxis::from_ages(0, &config.age_scale.label, ages));
        if twin.is_none() {
            log::warn!("No finite ages loaded, skipping the year scale");
        }
        twin
    } else {
        None
    };

    let depth_axis = DepthAxis {
        label: config.figure.depth_label.clone(),
        range: data.depth_range(),
        direction: AxisDirection::from_inverted(config.figure.depth_increases_downward),
    };

    let size_in = cm2inch(config.figure.size_cm);
    log::debug!(
        "Assembled {} panels, {:.2}x{:.2} in, depth range {:?}",
        panels.len(),
        size_in.0,
        size_in.1,
        depth_axis.range
    );

    Figure {
        title: config.figure.title.clone(),
        size_in,
        dpi: config.figure.dpi,
        wspace: config.figure.wspace,
        depth_axis,
        panels,
        twin,
    }
}
