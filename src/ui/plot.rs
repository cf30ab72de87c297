use std::ops::RangeInclusive;

use eframe::egui::{self, Color32, RichText, Ui, Vec2, Vec2b};
use egui_plot::{
    log_grid_spacer, AxisHints, GridInput, GridMark, HPlacement, Line, Plot, PlotPoints,
};

use crate::figure::{format_tick, AxisDirection, Figure, Panel, TwinAxis};

/// About this many labelled values on the twin axis.
const TWIN_MARKS: usize = 5;

// ---------------------------------------------------------------------------
// Figure view (central panel)
// ---------------------------------------------------------------------------

/// Render all panels side by side with a shared, linked depth axis.
pub fn figure_view(ui: &mut Ui, figure: &Figure) {
    if figure.panels.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No panels configured");
        });
        return;
    }

    let layout = figure.panel_layout(ui.available_width() as f64);

    ui.scope(|ui: &mut Ui| {
        ui.spacing_mut().item_spacing.x = layout.gap as f32;
        ui.columns(figure.panels.len(), |columns: &mut [Ui]| {
            for (index, (col, panel)) in columns.iter_mut().zip(&figure.panels).enumerate() {
                panel_view(col, figure, index, panel);
            }
        });
    });
}

fn panel_view(ui: &mut Ui, figure: &Figure, index: usize, panel: &Panel) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.label(RichText::new(panel.title.as_deref().unwrap_or(" ")).strong());
    });

    let depth = &figure.depth_axis;
    let depth_dir = depth.direction;
    let x_dir = panel.x_direction;
    let show_ticks = panel.show_depth_ticks;

    let mut y_axes = vec![AxisHints::new_y()
        .label(figure.depth_label_for(panel))
        .placement(HPlacement::Left)
        .formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            if show_ticks && is_depth_mark(&mark) {
                format_tick(depth_dir.from_plot(mark.value))
            } else {
                String::new()
            }
        })];

    let twin = figure.twin.as_ref().filter(|t| t.host == index).cloned();
    if let Some(twin) = twin.clone() {
        y_axes.push(
            AxisHints::new_y()
                .label(twin.label.clone())
                .placement(HPlacement::Left)
                .formatter(move |mark: GridMark, range: &RangeInclusive<f64>| {
                    twin_tick(&twin, mark.value, range)
                }),
        );
    }

    let mut plot = Plot::new(("core_panel", index))
        .custom_y_axes(y_axes)
        .y_grid_spacer(move |input: GridInput| {
            let bounds = input.bounds;
            let mut marks = log_grid_spacer(10)(input);
            if let Some(twin) = &twin {
                marks.extend(twin_grid_marks(twin, bounds));
            }
            marks
        })
        .show_grid(false)
        .x_axis_label(panel.x_label.clone().unwrap_or_default())
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            format_tick(x_dir.from_plot(mark.value))
        })
        .link_axis(egui::Id::new("core_depth_axis"), Vec2b::new(false, true))
        .link_cursor(egui::Id::new("core_depth_axis"), Vec2b::new(false, true))
        .set_margin_fraction(Vec2::new(panel.x_margin as f32, 0.0))
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true);

    if let Some((lo, hi)) = depth.plot_range() {
        plot = plot.include_y(lo).include_y(hi);
    }
    if panel.is_inert() {
        plot = plot.include_x(0.0).include_x(1.0);
    }

    let color = Color32::from_rgb(panel.color.0, panel.color.1, panel.color.2);
    let name = panel.title.clone().unwrap_or_default();

    plot.show(ui, |plot_ui| {
        for segment in panel.segments() {
            let points: PlotPoints = to_plot_coords(&segment, x_dir, depth_dir)
                .into_iter()
                .collect();

            let line = Line::new(points).name(&name).color(color).width(1.5);
            plot_ui.line(line);
        }
    });
}

// ---------------------------------------------------------------------------
// Tick labels
// ---------------------------------------------------------------------------

/// Marks from the regular spacer sit on whole multiples of their step.
fn is_depth_mark(mark: &GridMark) -> bool {
    let k = mark.value / mark.step_size;
    (k - k.round()).abs() < 1e-6
}

/// Extra y marks at the plot coordinates of round twin-axis values, for
/// a host showing `(lo, hi)`.
pub fn twin_grid_marks(twin: &TwinAxis, (lo, hi): (f64, f64)) -> Vec<GridMark> {
    let (bottom, top) = twin.range();
    let span = (top - bottom).abs();
    if span < f64::EPSILON {
        return Vec::new();
    }
    let step_size = twin.mark_step(TWIN_MARKS) * (hi - lo).abs() / span;
    twin.round_marks(TWIN_MARKS)
        .into_iter()
        .map(|value| GridMark {
            value: lo + twin.fraction_of(value) * (hi - lo),
            step_size,
        })
        .collect()
}

/// Twin-axis label at plot coordinate `coord` of the host's visible range;
/// empty unless the value there is one of the round twin marks.
pub fn twin_tick(twin: &TwinAxis, coord: f64, range: &RangeInclusive<f64>) -> String {
    let value = twin.value_at_coord(coord, *range.start(), *range.end());
    let step = twin.mark_step(TWIN_MARKS);
    if step <= 0.0 {
        return String::new();
    }
    let rounded = (value / step).round() * step;
    if (value - rounded).abs() <= step * 1e-6 {
        format_tick(rounded)
    } else {
        String::new()
    }
}

/// Plot coordinates of `points` after applying both axis directions.
pub fn to_plot_coords(
    points: &[[f64; 2]],
    x_dir: AxisDirection,
    y_dir: AxisDirection,
) -> Vec<[f64; 2]> {
    points
        .iter()
        .map(|&[x, y]| [x_dir.to_plot(x), y_dir.to_plot(y)])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twin_ticks_follow_visible_range() {
        let twin = TwinAxis {
            host: 0,
            label: "Years AD".into(),
            bottom: 2000.0,
            top: 2020.0,
        };
        let range = 0.0..=20.0;
        assert_eq!(twin_tick(&twin, 0.0, &range), "2000");
        assert_eq!(twin_tick(&twin, 10.0, &range), "2010");
        assert_eq!(twin_tick(&twin, 20.0, &range), "2020");
        // 2003 is not a round mark for a twenty-year scale.
        assert_eq!(twin_tick(&twin, 3.0, &range), "");
    }

    #[test]
    fn twin_marks_land_on_round_years() {
        let twin = TwinAxis {
            host: 0,
            label: "Years AD".into(),
            bottom: 2003.4,
            top: 1850.2,
        };
        let bounds = (-25.0, 5.0);
        let range = bounds.0..=bounds.1;
        let marks = twin_grid_marks(&twin, bounds);
        assert_eq!(marks.len(), 3);
        let labels: Vec<String> = marks
            .iter()
            .map(|m| twin_tick(&twin, m.value, &range))
            .collect();
        assert_eq!(labels, vec!["1900", "1950", "2000"]);
        assert!(marks.iter().all(|m| m.step_size > 0.0));
    }

    #[test]
    fn depth_labels_only_on_regular_marks() {
        assert!(is_depth_mark(&GridMark {
            value: 30.0,
            step_size: 10.0
        }));
        assert!(is_depth_mark(&GridMark {
            value: -2.5,
            step_size: 0.5
        }));
        assert!(!is_depth_mark(&GridMark {
            value: 13.7,
            step_size: 9.79
        }));
    }

    #[test]
    fn inverted_axes_negate_coordinates() {
        let pts = [[2020.0, 0.0], [2000.0, 20.0]];
        let plotted = to_plot_coords(&pts, AxisDirection::Inverted, AxisDirection::Normal);
        assert_eq!(plotted, vec![[-2020.0, 0.0], [-2000.0, 20.0]]);
        // Larger ages land further left.
        assert!(plotted[0][0] < plotted[1][0]);
        assert_eq!(format_tick(AxisDirection::Inverted.from_plot(plotted[0][0])), "2020");
    }
}
