//! Annotated heatmaps of the result matrices
use crate::aggregate::{ResultMatrix, SignalReport};
use crate::error::Result;
use crate::signals::signal_stem;
use std::path::{Path, PathBuf};

#[cfg(feature = "plot")]
use crate::error::HarnessError;

/// Values at or above this are drawn with the saturated end of the color map
pub const COLOR_SCALE_MAX: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric
{
    TimeRatio,
    MseRatio,
}

impl Metric
{
    pub fn file_suffix(self) -> &'static str
    {
        match self
        {
            Metric::TimeRatio => "_time_compare",
            Metric::MseRatio => "_mse_compare",
        }
    }

    pub fn title(self, signal_name: &str) -> String
    {
        match self
        {
            Metric::TimeRatio => format!("Encoding time ratio (%) for {}", signal_name),
            Metric::MseRatio => format!("MSE ratio vs IMA-ADPCM (%) for {}", signal_name),
        }
    }

    pub fn select(self, report: &SignalReport) -> &ResultMatrix
    {
        match self
        {
            Metric::TimeRatio => &report.time_ratio,
            Metric::MseRatio => &report.mse_ratio,
        }
    }
}

/// `<output_dir>/<stem><suffix>.png`
pub fn heatmap_path(output_dir: &Path, signal_name: &str, metric: Metric) -> PathBuf
{
    output_dir.join(format!("{}{}.png", signal_stem(signal_name), metric.file_suffix()))
}

/// Reversed cool-warm diverging map: `lo` is red, `hi` and above is blue.
/// Returns an RGB triple.
pub fn diverging_color(value: f64, lo: f64, hi: f64) -> (u8, u8, u8)
{
    const RED: (f64, f64, f64) = (180.0, 4.0, 38.0);
    const MID: (f64, f64, f64) = (221.0, 221.0, 221.0);
    const BLUE: (f64, f64, f64) = (59.0, 76.0, 192.0);

    let t = if hi > lo { ((value - lo) / (hi - lo)).clamp(0.0, 1.0) } else { 1.0 };
    let (from, to, s) = if t < 0.5 { (RED, MID, t * 2.0) } else { (MID, BLUE, (t - 0.5) * 2.0) };
    let lerp = |a: f64, b: f64| (a + (b - a) * s).round() as u8;

    (lerp(from.0, to.0), lerp(from.1, to.1), lerp(from.2, to.2))
}

/// Map a tick value back to the axis entry it sits on, if any
fn tick_label(value: f64, axis: &[u32], reversed: bool) -> String
{
    let index = value.round();
    if (value - index).abs() > 1e-6 || index < 0.0 || index as usize >= axis.len()
    {
        return String::new();
    }
    let index = index as usize;
    let index = if reversed { axis.len() - 1 - index } else { index };
    axis[index].to_string()
}

/// `(x, y, value)` per cell, centered on integer coordinates with width 1 on top
#[cfg(feature = "plot")]
fn cell_centers(matrix: &ResultMatrix) -> Vec<(f64, f64, f64)>
{
    let (rows, cols) = matrix.shape();
    (0..rows)
        .flat_map(|r| (0..cols).map(move |c| (r, c)))
        .map(|(r, c)| (c as f64, (rows - 1 - r) as f64, matrix.get(r, c)))
        .collect()
}

#[cfg(feature = "plot")]
type CellChart<'a, DB> = plotters::chart::ChartContext<
    'a,
    DB,
    plotters::coord::cartesian::Cartesian2d<plotters::coord::types::RangedCoordf64, plotters::coord::types::RangedCoordf64>,
>;

#[cfg(feature = "plot")]
fn fill_cells<DB: plotters::prelude::DrawingBackend>(
    chart: &mut CellChart<'_, DB>,
    cells: &[(f64, f64, f64)],
    lo: f64,
) -> std::result::Result<(), plotters::drawing::DrawingAreaErrorKind<DB::ErrorType>>
{
    use plotters::prelude::*;

    chart.draw_series(cells.iter().map(|&(x, y, value)|
    {
        let (red, green, blue) = diverging_color(value, lo, COLOR_SCALE_MAX);
        Rectangle::new([(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)], RGBColor(red, green, blue).filled())
    }))?;
    Ok(())
}

#[cfg(feature = "plot")]
fn paint_into(buffer: &mut [u8], matrix: &ResultMatrix, size: (u32, u32)) -> std::result::Result<(), Box<dyn std::error::Error>>
{
    use plotters::prelude::*;

    let (rows, cols) = matrix.shape();
    let root = BitMapBackend::with_buffer(buffer, size).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .build_cartesian_2d(-0.5f64..(cols as f64 - 0.5), -0.5f64..(rows as f64 - 0.5))?;
    fill_cells(&mut chart, &cell_centers(matrix), matrix.min().min(COLOR_SCALE_MAX))?;

    root.present()?;
    Ok(())
}

/// Colour cells only, no caption, axes or annotations, into an RGB buffer
/// of `width * height * 3` bytes. Needs no system fonts.
#[cfg(feature = "plot")]
pub fn paint_cells(matrix: &ResultMatrix, (width, height): (u32, u32)) -> Result<Vec<u8>>
{
    let mut buffer = vec![0u8; width as usize * height as usize * 3];
    paint_into(&mut buffer, matrix, (width, height))
        .map_err(|e| HarnessError::Render { path: PathBuf::from("<memory>"), message: e.to_string() })?;
    Ok(buffer)
}

#[cfg(feature = "plot")]
fn draw_heatmap(
    path: &Path,
    title: &str,
    matrix: &ResultMatrix,
    widths: &[u32],
    depths: &[u32],
) -> std::result::Result<(), Box<dyn std::error::Error>>
{
    use plotters::prelude::*;
    use plotters::style::text_anchor::{HPos, Pos, VPos};

    let (rows, cols) = matrix.shape();
    let lo = matrix.min().min(COLOR_SCALE_MAX);

    let root = BitMapBackend::new(path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    // Cells are centered on integer coordinates; width 1 is the top row
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(-0.5f64..(cols as f64 - 0.5), -0.5f64..(rows as f64 - 0.5))?;

    let x_formatter = |x: &f64| tick_label(*x, depths, false);
    let y_formatter = |y: &f64| tick_label(*y, widths, true);
    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("Search depth")
        .y_desc("Search width")
        .x_labels(cols)
        .y_labels(rows)
        .x_label_formatter(&x_formatter)
        .y_label_formatter(&y_formatter)
        .draw()?;

    let cells = cell_centers(matrix);
    fill_cells(&mut chart, &cells, lo)?;

    let annotation = TextStyle::from(("sans-serif", 12).into_font())
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Center));
    chart.draw_series(cells.iter().map(|&(x, y, value)|
    {
        Text::new(format!("{:.1}", value), (x, y), annotation.clone())
    }))?;

    root.present()?;
    Ok(())
}

/// Render one matrix of `report` to `<output_dir>/<stem><suffix>.png`
#[cfg(feature = "plot")]
pub fn render_heatmap(report: &SignalReport, metric: Metric, output_dir: &Path) -> Result<PathBuf>
{
    let path = heatmap_path(output_dir, &report.signal_name, metric);
    draw_heatmap(
        &path,
        &metric.title(&report.signal_name),
        metric.select(report),
        &report.widths,
        &report.depths,
    )
    .map_err(|e| HarnessError::Render { path: path.clone(), message: e.to_string() })?;

    log::info!("Wrote {:?}", path);
    Ok(path)
}

/// Render both heatmaps for one signal, time ratio first
#[cfg(feature = "plot")]
pub fn render_report(report: &SignalReport, output_dir: &Path) -> Result<Vec<PathBuf>>
{
    [Metric::TimeRatio, Metric::MseRatio]
        .into_iter()
        .map(|metric| render_heatmap(report, metric, output_dir))
        .collect()
}

#[cfg(not(feature = "plot"))]
pub fn render_report(report: &SignalReport, _output_dir: &Path) -> Result<Vec<PathBuf>>
{
    log::warn!("Built without the `plot` feature, skipping heatmaps for {}", report.signal_name);
    Ok(Vec::new())
}
