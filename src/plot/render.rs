//! Per-operation comparison charts rendered with the [`plotters`] crate.
//!
//! Every chart is an SVG with a logarithmic size axis and one line per
//! (method, hit-or-miss) pair: solid for hits, dashed for misses.

use super::rng_table::{format_rng_table, NS_PER_S};
use crate::config::{PlotConfig, Workspace};
use crate::model::analysis_file::{AggregateRecord, AnalysisFile};
use crate::model::method::{Lang, Method, Operation};
use crate::utilities::json::{read_commented, JsonError};
use crate::utilities::stats::quantile;
use log::{info, warn};
use plotters::coord::combinators::LogCoord;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during plot generation
#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Failed to load analysis: {0}")]
    Load(#[from] JsonError),

    #[error("Analysis columns have different lengths")]
    InconsistentTable,

    #[error("No RNG overhead recorded for language '{0}'")]
    MissingRng(Lang),

    #[error("Failed to create drawing area: {0}")]
    DrawingArea(String),

    #[error("Failed to configure chart: {0}")]
    ChartConfig(String),

    #[error("Failed to draw chart elements: {0}")]
    Drawing(String),

    #[error("Failed to save plot to file: {0}")]
    FileSave(#[from] std::io::Error),
}

type Result<T> = core::result::Result<T, PlotError>;

/// Line colour of each method.
pub fn method_color(method: Method) -> RGBColor {
    match method {
        Method::BTreeMap => RGBColor(0xe9, 0x1e, 0x63),
        Method::HashMap => RGBColor(0xf2, 0x93, 0x12),
        Method::Map => RGBColor(0x4c, 0xaf, 0x50),
        Method::UnorderedMap => RGBColor(0x21, 0x96, 0xf3),
    }
}

/// Colour of the RNG reference line of each language.
pub fn rng_color(lang: Lang) -> RGBColor {
    match lang {
        Lang::Rs => RGBColor(0xf2, 0x93, 0x12),
        Lang::Cpp => RGBColor(0x21, 0x96, 0xf3),
    }
}

/// A plotted point, with the SDOM of the underlying mean.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvePoint {
    pub size: f64,
    /// Nanoseconds per operation
    pub time: f64,
    pub sdom: f64,
}

/// One line of a chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    pub method: Method,
    pub is_hit: bool,
    /// Ordered by size
    pub points: Vec<CurvePoint>,
}

impl Curve {
    pub fn label(&self) -> String {
        let outcome = if self.is_hit { "hit" } else { "miss" };
        format!("{}-{}", self.method, outcome)
    }

    fn line(&self) -> Vec<(f64, f64)> {
        self.points.iter().map(|p| (p.size, p.time)).collect()
    }

    /// Closed outline of the band `time ± factor * sdom`.
    fn band(&self, factor: f64) -> Vec<(f64, f64)> {
        let upper = self.points.iter().map(|p| (p.size, p.time + factor * p.sdom));
        let lower = self
            .points
            .iter()
            .rev()
            .map(|p| (p.size, p.time - factor * p.sdom));
        upper.chain(lower).collect()
    }
}

/// Loads `analysis.json`, rejecting tables whose columns disagree in length.
pub fn load_analysis(path: &Path) -> Result<AnalysisFile> {
    let analysis: AnalysisFile = read_commented(path)?;
    if !analysis.data.is_consistent() {
        return Err(PlotError::InconsistentTable);
    }
    Ok(analysis)
}

/// Operations that have at least one record, in order.
pub fn operations(analysis: &AnalysisFile) -> Vec<Operation> {
    let mut operations: Vec<Operation> = analysis.data.operation.clone();
    operations.sort();
    operations.dedup();
    operations
}

/// Builds the lines of `operation`'s chart, in nanoseconds.
///
/// With [`PlotConfig::subtract_rng`], the RNG overhead of the method's language is
/// subtracted from every point.
pub fn curves_for(
    analysis: &AnalysisFile,
    operation: Operation,
    config: &PlotConfig,
) -> Result<Vec<Curve>> {
    let mut grouped: BTreeMap<(Method, bool), Vec<AggregateRecord>> = BTreeMap::new();
    for record in analysis.data.records().filter(|r| r.operation == operation) {
        grouped
            .entry((record.method, !record.is_hit))
            .or_default()
            .push(record);
    }

    let mut curves = Vec::with_capacity(grouped.len());
    for ((method, is_miss), mut records) in grouped {
        let offset = if config.subtract_rng {
            let lang = method.lang();
            let rng = analysis
                .t_rng
                .get(&lang)
                .ok_or(PlotError::MissingRng(lang))?;
            rng.field(config.rng_field) * NS_PER_S
        } else {
            0.0
        };

        records.sort_by_key(|record| record.size);
        let points = records
            .iter()
            .map(|record| {
                let value = if config.plot_min {
                    record.stats.min
                } else {
                    record.stats.mean
                };
                CurvePoint {
                    size: record.size as f64,
                    time: value * NS_PER_S - offset,
                    sdom: record.stats.sdom * NS_PER_S,
                }
            })
            .collect();

        curves.push(Curve {
            method,
            is_hit: !is_miss,
            points,
        });
    }
    Ok(curves)
}

/// Default upper limit of a linear time axis: 1.5 times the 95th percentile of the mean
/// times of `operation`, in nanoseconds.
pub fn linear_y_limit(analysis: &AnalysisFile, operation: Operation) -> Option<f64> {
    let means: Vec<f64> = analysis
        .data
        .records()
        .filter(|r| r.operation == operation)
        .map(|r| r.stats.mean * NS_PER_S)
        .collect();
    quantile(&means, 0.95)
        .map(|q| q * 1.5)
        .filter(|limit| *limit > 0.0)
}

/// Horizontal RNG reference lines, drawn when the overhead is not subtracted.
fn rng_lines(analysis: &AnalysisFile, config: &PlotConfig) -> Vec<(Lang, f64)> {
    if config.subtract_rng {
        return Vec::new();
    }
    analysis
        .t_rng
        .iter()
        .map(|(lang, summary)| (*lang, summary.field(config.rng_field) * NS_PER_S))
        .collect()
}

/// Renders the chart of `operation` into `output_path`.
///
/// # Arguments
/// * `analysis` - Aggregated records and RNG overhead, as read from `analysis.json`
/// * `operation` - Operation whose records are drawn
/// * `config` - Plotted statistic, RNG handling, axis scale and chart size
/// * `output_path` - Path where the SVG file should be saved
///
/// # Returns
/// * `Ok(())` - If the chart was successfully created and saved
/// * `Err(PlotError)` - If RNG overhead is missing or drawing failed
pub fn render_operation(
    analysis: &AnalysisFile,
    operation: Operation,
    config: &PlotConfig,
    output_path: &Path,
) -> Result<()> {
    let curves = curves_for(analysis, operation, config)?;
    let rng_lines = rng_lines(analysis, config);

    let (x_min, x_max) = x_range(&curves);

    let root = SVGBackend::new(output_path, (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

    let y_desc = format!("time per {} /ns", operation);
    let mut builder = ChartBuilder::on(&root);
    builder
        .caption(operation.to_string(), ("sans-serif", 40))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(85);

    if config.log_y {
        let (y_min, y_max) = log_y_range(&curves, &rng_lines);
        let mut chart = builder
            .build_cartesian_2d((x_min..x_max).log_scale(), (y_min..y_max).log_scale())
            .map_err(|e| PlotError::ChartConfig(e.to_string()))?;
        chart
            .configure_mesh()
            .x_desc("size")
            .y_desc(y_desc)
            .x_label_formatter(&|x| format!("{:.0}", x))
            .label_style(("sans-serif", 20))
            .draw()
            .map_err(|e| PlotError::Drawing(e.to_string()))?;
        draw_chart(&mut chart, &curves, &rng_lines, (x_min, x_max), config)?;
    } else {
        let y_max = linear_y_limit(analysis, operation).unwrap_or(1.0);
        let mut chart = builder
            .build_cartesian_2d((x_min..x_max).log_scale(), 0.0..y_max)
            .map_err(|e| PlotError::ChartConfig(e.to_string()))?;
        chart
            .configure_mesh()
            .x_desc("size")
            .y_desc(y_desc)
            .x_label_formatter(&|x| format!("{:.0}", x))
            .label_style(("sans-serif", 20))
            .draw()
            .map_err(|e| PlotError::Drawing(e.to_string()))?;
        draw_chart(&mut chart, &curves, &rng_lines, (x_min, x_max), config)?;
    }

    present(&root)
}

fn present<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>) -> Result<()> {
    root.present()
        .map_err(|e| PlotError::Drawing(e.to_string()))
}

/// Size axis range. A single size is widened to a decade.
fn x_range(curves: &[Curve]) -> (f64, f64) {
    let sizes = curves.iter().flat_map(|c| c.points.iter().map(|p| p.size));
    let (min, max) = sizes.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() {
        return (1.0, 10.0);
    }
    let min = min.max(1.0);
    if max > min {
        (min, max)
    } else {
        (min, min * 10.0)
    }
}

/// Range of a logarithmic time axis covering every positive plotted value.
fn log_y_range(curves: &[Curve], rng_lines: &[(Lang, f64)]) -> (f64, f64) {
    let values = curves
        .iter()
        .flat_map(|c| c.points.iter().map(|p| p.time))
        .chain(rng_lines.iter().map(|(_, value)| *value))
        .filter(|value| *value > 0.0);
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if min.is_finite() && max > min {
        (min * 0.8, max * 1.25)
    } else {
        (1.0, 10.0)
    }
}

fn draw_chart<'a, DB, Y>(
    chart: &mut ChartContext<'a, DB, Cartesian2d<LogCoord<f64>, Y>>,
    curves: &[Curve],
    rng_lines: &[(Lang, f64)],
    (x_min, x_max): (f64, f64),
    config: &PlotConfig,
) -> Result<()>
where
    DB: DrawingBackend + 'a,
    Y: Ranged<ValueType = f64>,
{
    if config.draws_err_bars() {
        for curve in curves {
            let fill = method_color(curve.method).mix(0.2).filled();
            for factor in [1.0, 0.5] {
                chart
                    .draw_series(std::iter::once(Polygon::new(curve.band(factor), fill)))
                    .map_err(|e| PlotError::Drawing(e.to_string()))?;
            }
        }
    }

    for curve in curves {
        let style = method_color(curve.method).mix(0.7).stroke_width(2);
        let annotation = if curve.is_hit {
            chart.draw_series(LineSeries::new(curve.line(), style))
        } else {
            chart.draw_series(DashedLineSeries::new(curve.line(), 10, 6, style))
        }
        .map_err(|e| PlotError::Drawing(e.to_string()))?;
        annotation
            .label(curve.label())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
    }

    for &(lang, value) in rng_lines {
        let style = rng_color(lang).stroke_width(1);
        chart
            .draw_series(DashedLineSeries::new(
                vec![(x_min, value), (x_max, value)],
                2,
                4,
                style,
            ))
            .map_err(|e| PlotError::Drawing(e.to_string()))?
            .label(format!("rng:{}", lang))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(("sans-serif", 18))
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    Ok(())
}

/// Runs the plot stage: `analysis.json` to `plots/plot-<operation>.svg`.
///
/// Prints the RNG overhead table and returns the paths of the written charts.
pub fn run_plot(config: &PlotConfig, workspace: &Workspace) -> Result<Vec<PathBuf>> {
    let analysis = load_analysis(&workspace.analysis_file())?;
    println!("{}", format_rng_table(&analysis.t_rng));

    let operations = operations(&analysis);
    if operations.is_empty() {
        warn!("Analysis has no records; nothing to plot");
        return Ok(Vec::new());
    }

    let plots_dir = workspace.plots_dir();
    fs::create_dir_all(&plots_dir)?;

    let mut written = Vec::with_capacity(operations.len());
    for operation in operations {
        let path = plots_dir.join(format!("plot-{}.svg", operation));
        render_operation(&analysis, operation, config, &path)?;
        info!("Wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}
