//! Rolling line charts over `Series` history.
//!
//! Every plotted line is resampled to the drawable width, and the Y axis
//! spans zero to the largest visible value across all lines, so two
//! series on one chart always share a scale.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    symbols::Marker,
    text::Span,
    widgets::{Axis, Block, BorderType, Borders, Chart, Dataset, GraphType},
};

use mihoctl_core::Series;
use mihoctl_core::timeseries::{sample, scale_max};

use crate::theme;

/// One line on a chart.
pub struct Line<'a> {
    pub label: &'a str,
    pub color: Color,
    pub series: &'a Series,
}

/// Points for each line, resampled to `width`, plus the shared Y max.
#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
pub fn plot_points(lines: &[Line<'_>], width: usize) -> (Vec<Vec<(f64, f64)>>, u64) {
    let sampled: Vec<Vec<u64>> = lines
        .iter()
        .map(|l| sample(&l.series.to_vec(), width))
        .collect();
    let refs: Vec<&[u64]> = sampled.iter().map(Vec::as_slice).collect();
    let y_max = scale_max(&refs);

    let points = sampled
        .iter()
        .map(|values| {
            values
                .iter()
                .enumerate()
                .map(|(x, &y)| (x as f64, y as f64))
                .collect()
        })
        .collect();
    (points, y_max)
}

/// Draw `lines` inside a bordered block titled `title`. `fmt_axis`
/// renders the Y-axis bound labels.
#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
pub fn render(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    lines: &[Line<'_>],
    fmt_axis: fn(u64) -> String,
) {
    let label_width = 6;
    let width = usize::from(area.width.saturating_sub(2 + label_width)).max(1);
    let (points, y_max) = plot_points(lines, width);

    let datasets: Vec<Dataset<'_>> = lines
        .iter()
        .zip(&points)
        .map(|(line, data)| {
            Dataset::default()
                .name(line.label)
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(line.color))
                .data(data)
        })
        .collect();

    let block = Block::default()
        .title(format!(" {title} "))
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_default());

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(Axis::default().bounds([0.0, (width.saturating_sub(1)).max(1) as f64]))
        .y_axis(
            Axis::default()
                .style(theme::key_hint())
                .bounds([0.0, y_max as f64])
                .labels([Span::raw("0"), Span::raw(fmt_axis(y_max))]),
        );
    frame.render_widget(chart, area);
}
