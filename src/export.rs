//! SVG export of an assembled figure.

use std::ops::Range;
use std::path::Path;

use anyhow::{bail, Context, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontTransform;

use crate::figure::{format_tick, Figure, Panel, TwinAxis};

const FONT: &str = "sans-serif";
/// Width reserved left of each panel for depth tick labels and title.
const LABEL_AREA: u32 = 55;
/// Extra room for the twin axis, outside the host's depth labels.
const TWIN_AREA: u32 = 60;
const TWIN_TICKS: usize = 5;

/// Write `figure` as an SVG file. Only `.svg` targets are supported.
pub fn write_svg(figure: &Figure, path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if ext != "svg" {
        bail!("Unsupported export extension: .{ext} (only .svg)");
    }

    let (w, h) = figure.size_px();
    let size = (w.round().max(1.0) as u32, h.round().max(1.0) as u32);

    let root = SVGBackend::new(path, size).into_drawing_area();
    draw_figure(&root, figure)?;
    root.present()
        .with_context(|| format!("writing {}", path.display()))?;

    log::info!(
        "Wrote {}x{} px figure to {}",
        size.0,
        size.1,
        path.display()
    );
    Ok(())
}

fn draw_figure<DB>(root: &DrawingArea<DB, Shift>, figure: &Figure) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;
    if figure.panels.is_empty() {
        return Ok(());
    }

    let (width, height) = root.dim_in_pixel();
    let twin_area = if figure.twin.is_some() { TWIN_AREA } else { 0 };
    let left = LABEL_AREA + twin_area + 10;
    let right = 15;
    let layout = figure.panel_layout(width.saturating_sub(left + right) as f64);

    for (index, panel) in figure.panels.iter().enumerate() {
        let x0 = left as f64 + layout.offset(index) - LABEL_AREA as f64;
        let area_w = layout.width + LABEL_AREA as f64;
        let area = root.clone().shrink(
            (x0.max(0.0).round() as u32, 0u32),
            (area_w.max(1.0).round() as u32, height),
        );

        let plot_px = draw_panel(&area, figure, panel)?;

        if let Some(twin) = figure.twin.as_ref().filter(|t| t.host == index) {
            draw_twin_axis(root, twin, plot_px.0.start - LABEL_AREA as i32, plot_px.1)?;
        }
    }
    Ok(())
}

/// Draw one panel; returns the pixel extent of its plotting area.
fn draw_panel<DB>(
    area: &DrawingArea<DB, Shift>,
    figure: &Figure,
    panel: &Panel,
) -> Result<(Range<i32>, Range<i32>)>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let depth_dir = figure.depth_axis.direction;
    let x_dir = panel.x_direction;
    let show_ticks = panel.show_depth_ticks;

    let x_range = widen(
        panel
            .x_range()
            .map(|r| x_dir.plot_range(r))
            .unwrap_or((0.0, 1.0)),
    );
    let y_range = widen(figure.depth_axis.plot_range().unwrap_or((0.0, 1.0)));

    let mut chart = ChartBuilder::on(area)
        .caption(panel.title.as_deref().unwrap_or(" "), (FONT, 16))
        .margin_top(6)
        .margin_right(4)
        .set_label_area_size(LabelAreaPosition::Left, LABEL_AREA)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(x_range.0..x_range.1, y_range.0..y_range.1)?;

    let x_fmt = |v: &f64| format_tick(x_dir.from_plot(*v));
    let y_fmt = |v: &f64| {
        if show_ticks {
            format_tick(depth_dir.from_plot(*v))
        } else {
            String::new()
        }
    };

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(5)
        .y_labels(6)
        .x_desc(panel.x_label.clone().unwrap_or_default())
        .y_desc(figure.depth_label_for(panel))
        .x_label_formatter(&x_fmt)
        .y_label_formatter(&y_fmt)
        .label_style((FONT, 12))
        .axis_desc_style((FONT, 13))
        .draw()?;

    let color = RGBColor(panel.color.0, panel.color.1, panel.color.2);
    for segment in panel.segments() {
        chart.draw_series(LineSeries::new(
            segment
                .iter()
                .map(|&[x, y]| (x_dir.to_plot(x), depth_dir.to_plot(y))),
            color.stroke_width(2),
        ))?;
    }

    Ok(chart.plotting_area().get_pixel_range())
}

/// Draw the twin scale as a free-standing axis at pixel column `x`,
/// spanning the host's plotting rows `rows` (top..bottom).
fn draw_twin_axis<DB>(
    root: &DrawingArea<DB, Shift>,
    twin: &TwinAxis,
    x: i32,
    rows: Range<i32>,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let (top, bottom) = (rows.start, rows.end);

    root.draw(&PathElement::new(
        vec![(x, top), (x, bottom)],
        BLACK.stroke_width(1),
    ))?;

    let tick_style =
        TextStyle::from((FONT, 12).into_font()).pos(Pos::new(HPos::Right, VPos::Center));
    for (value, y) in twin_ticks(twin, top, bottom) {
        root.draw(&PathElement::new(
            vec![(x - 5, y), (x, y)],
            BLACK.stroke_width(1),
        ))?;
        root.draw(&Text::new(format_tick(value), (x - 8, y), tick_style.clone()))?;
    }

    let label_font = (FONT, 13).into_font().transform(FontTransform::Rotate270);
    let label_style = TextStyle::from(label_font).pos(Pos::new(HPos::Center, VPos::Center));
    root.draw(&Text::new(
        twin.label.clone(),
        (x - TWIN_AREA as i32 + 8, (top + bottom) / 2),
        label_style,
    ))?;
    Ok(())
}

/// (value, pixel row) of each round twin-axis value between rows
/// `bottom` and `top`.
fn twin_ticks(twin: &TwinAxis, top: i32, bottom: i32) -> Vec<(f64, i32)> {
    twin.round_marks(TWIN_TICKS)
        .into_iter()
        .map(|value| {
            let t = twin.fraction_of(value);
            let y = bottom as f64 - t * (bottom - top) as f64;
            (value, y.round() as i32)
        })
        .collect()
}

/// Give degenerate ranges some extent so the coordinate system is valid.
fn widen((lo, hi): (f64, f64)) -> (f64, f64) {
    if (hi - lo).abs() < f64::EPSILON {
        (lo - 0.5, hi + 0.5)
    } else {
        (lo, hi)
    }
}
