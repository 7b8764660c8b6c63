//! Static Chart Renderer
//! Draws chart descriptions to PNG files with plotters.
//!
//! Each chart is rendered on its own image:
//! 1. Caption: the chart title
//! 2. Plot area: bars, line, node-link graph, treemap tiles or heatmap cells
//! 3. Legend for stacked series, footnote for the heatmap

use super::spec::{
    BarSeries, ChartBody, ChartSpec, ColorScale, GraphEdge, GraphNode, LinePoint, Rgb,
    TreemapTile, EDGE_COLOR,
};
use chrono::{Datelike, NaiveDate};
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

const FONT: &str = "sans-serif";
const GREY: RGBColor = RGBColor(128, 128, 128);

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Drawing failed: {0}")]
    Draw(String),
    #[error("Failed to write chart: {0}")]
    Io(#[from] std::io::Error),
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for RenderError {
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        RenderError::Draw(err.to_string())
    }
}

fn rgb(color: Rgb) -> RGBColor {
    RGBColor(color.0, color.1, color.2)
}

fn day_number(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

/// Label at `value` if it lands on one of `positions`.
fn tick_label(positions: &[f64], labels: &[String], value: f64) -> String {
    positions
        .iter()
        .position(|p| (p - value).abs() < 1e-6)
        .and_then(|i| labels.get(i).cloned())
        .unwrap_or_default()
}

pub struct ChartRenderer;

impl ChartRenderer {
    /// Render every chart into `dir` as `chart_{n}_{slug}.png`.
    pub fn export_all(
        charts: &[ChartSpec],
        dir: &Path,
        size: (u32, u32),
    ) -> Result<Vec<PathBuf>, RenderError> {
        std::fs::create_dir_all(dir)?;

        charts
            .iter()
            .enumerate()
            .map(|(i, spec)| {
                let path = dir.join(format!("chart_{}_{}.png", i + 1, spec.id.slug()));
                Self::render_png(spec, &path, size)?;
                debug!(path = %path.display(), "chart rendered");
                Ok(path)
            })
            .collect()
    }

    /// Render one chart to a PNG file.
    pub fn render_png(spec: &ChartSpec, path: &Path, size: (u32, u32)) -> Result<(), RenderError> {
        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE)?;

        if spec.is_empty() {
            Self::draw_placeholder(&root, spec, size)?;
            root.present()?;
            return Ok(());
        }

        match &spec.body {
            ChartBody::Histogram { bins, series } => {
                let positions: Vec<f64> = bins.iter().map(|&b| b as f64).collect();
                let labels: Vec<String> = bins.iter().map(|b| b.to_string()).collect();
                Self::draw_bars(&root, spec, &positions, &labels, series, false)?;
            }
            ChartBody::Bar { categories, series } => {
                let positions: Vec<f64> = (0..categories.len()).map(|i| i as f64).collect();
                Self::draw_bars(&root, spec, &positions, categories, series, true)?;
            }
            ChartBody::Line { points, color } => {
                Self::draw_line(&root, spec, points, *color)?;
            }
            ChartBody::Network { nodes, edges, .. } => {
                Self::draw_network(&root, spec, nodes, edges)?;
            }
            ChartBody::Treemap { tiles } => {
                Self::draw_treemap(&root, spec, tiles)?;
            }
            ChartBody::Heatmap {
                columns,
                rows,
                values,
                color_scale,
                footnote,
            } => {
                Self::draw_heatmap(&root, spec, columns, rows, values, *color_scale)?;
                root.draw(&Text::new(
                    footnote.as_str(),
                    (20, size.1 as i32 - 24),
                    (FONT, 14).into_font().color(&GREY),
                ))?;
            }
        }

        root.present()?;
        Ok(())
    }

    fn draw_placeholder<DB: DrawingBackend>(
        root: &DrawingArea<DB, Shift>,
        spec: &ChartSpec,
        size: (u32, u32),
    ) -> Result<(), RenderError> {
        root.draw(&Text::new(
            spec.title.as_str(),
            (20, 20),
            (FONT, 22).into_font(),
        ))?;
        root.draw(&Text::new(
            "No data for this selection",
            (size.0 as i32 / 2 - 110, size.1 as i32 / 2),
            (FONT, 18).into_font().color(&GREY),
        ))?;
        Ok(())
    }

    fn draw_bars<DB: DrawingBackend>(
        root: &DrawingArea<DB, Shift>,
        spec: &ChartSpec,
        positions: &[f64],
        labels: &[String],
        series: &[BarSeries],
        rotate_labels: bool,
    ) -> Result<(), RenderError> {
        let mut totals = vec![0.0f64; positions.len()];
        for s in series {
            for (total, value) in totals.iter_mut().zip(&s.values) {
                *total += value;
            }
        }
        let y_max = totals.iter().copied().fold(0.0, f64::max).max(1.0) * 1.1;
        let x_min = positions.first().copied().unwrap_or(0.0) - 0.5;
        let x_max = positions.last().copied().unwrap_or(0.0) + 0.5;

        let mut chart = ChartBuilder::on(root)
            .caption(spec.title.as_str(), (FONT, 22))
            .margin(15)
            .x_label_area_size(if rotate_labels { 140 } else { 50 })
            .y_label_area_size(70)
            .build_cartesian_2d(x_min..x_max, 0f64..y_max)?;

        let x_formatter = |x: &f64| tick_label(positions, labels, *x);
        let label_style = if rotate_labels {
            (FONT, 13).into_font().transform(FontTransform::Rotate90)
        } else {
            (FONT, 13).into_font()
        };
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(positions.len() + 1)
            .x_label_formatter(&x_formatter)
            .x_label_style(label_style)
            .x_desc(spec.x_label.as_str())
            .y_desc(spec.y_label.as_str())
            .draw()?;

        let mut base = vec![0.0f64; positions.len()];
        for s in series {
            let color = rgb(s.color);
            let rects: Vec<Rectangle<(f64, f64)>> = positions
                .iter()
                .zip(&s.values)
                .zip(base.iter_mut())
                .map(|((&x, &value), bottom)| {
                    let rect = Rectangle::new(
                        [(x - 0.4, *bottom), (x + 0.4, *bottom + value)],
                        color.filled(),
                    );
                    *bottom += value;
                    rect
                })
                .collect();

            chart
                .draw_series(rects)?
                .label(s.name.as_str())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
        }

        if series.len() > 1 {
            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .position(SeriesLabelPosition::UpperRight)
                .draw()?;
        }

        Ok(())
    }

    fn draw_line<DB: DrawingBackend>(
        root: &DrawingArea<DB, Shift>,
        spec: &ChartSpec,
        points: &[LinePoint],
        color: Rgb,
    ) -> Result<(), RenderError> {
        let x_min = points.first().map(|p| day_number(p.date)).unwrap_or(0.0);
        let x_max = points
            .last()
            .map(|p| day_number(p.date))
            .unwrap_or(0.0)
            .max(x_min + 1.0);
        let y_max = points.iter().map(|p| p.value).fold(0.0, f64::max).max(1.0) * 1.1;

        let mut chart = ChartBuilder::on(root)
            .caption(spec.title.as_str(), (FONT, 22))
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(x_min..x_max, 0f64..y_max)?;

        let x_formatter = |x: &f64| {
            NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
                .map(|d| d.format("%b %d, %Y").to_string())
                .unwrap_or_default()
        };
        chart
            .configure_mesh()
            .x_labels(6)
            .x_label_formatter(&x_formatter)
            .x_desc(spec.x_label.as_str())
            .y_desc(spec.y_label.as_str())
            .draw()?;

        chart.draw_series(LineSeries::new(
            points.iter().map(|p| (day_number(p.date), p.value)),
            rgb(color).stroke_width(2),
        ))?;

        Ok(())
    }

    fn draw_network<DB: DrawingBackend>(
        root: &DrawingArea<DB, Shift>,
        spec: &ChartSpec,
        nodes: &[GraphNode],
        edges: &[GraphEdge],
    ) -> Result<(), RenderError> {
        let mut chart = ChartBuilder::on(root)
            .caption(spec.title.as_str(), (FONT, 22))
            .margin(30)
            .build_cartesian_2d(-1.2f64..1.2f64, -1.2f64..1.2f64)?;

        chart.draw_series(edges.iter().map(|edge| {
            PathElement::new(
                vec![(edge.from[0], edge.from[1]), (edge.to[0], edge.to[1])],
                rgb(EDGE_COLOR).stroke_width(1),
            )
        }))?;

        chart.draw_series(nodes.iter().map(|node| {
            Circle::new(
                (node.position[0], node.position[1]),
                7,
                rgb(node.color).filled(),
            )
        }))?;
        chart.draw_series(nodes.iter().map(|node| {
            Circle::new((node.position[0], node.position[1]), 7, BLACK.stroke_width(1))
        }))?;

        chart.draw_series(nodes.iter().map(|node| {
            Text::new(
                node.label.clone(),
                (node.position[0] + 0.03, node.position[1] + 0.03),
                (FONT, 13).into_font(),
            )
        }))?;

        Ok(())
    }

    fn draw_treemap<DB: DrawingBackend>(
        root: &DrawingArea<DB, Shift>,
        spec: &ChartSpec,
        tiles: &[TreemapTile],
    ) -> Result<(), RenderError> {
        let mut chart = ChartBuilder::on(root)
            .caption(spec.title.as_str(), (FONT, 22))
            .margin(15)
            .build_cartesian_2d(0f64..1f64, 0f64..1f64)?;

        let visible = || {
            tiles
                .iter()
                .filter(|t| t.rect[2] > t.rect[0] && t.rect[3] > t.rect[1])
        };

        chart.draw_series(visible().filter(|t| t.parent.is_some()).map(|tile| {
            let [x0, y0, x1, y1] = tile.rect;
            Rectangle::new([(x0, y0), (x1, y1)], rgb(tile.color).mix(0.8).filled())
        }))?;
        chart.draw_series(visible().map(|tile| {
            let [x0, y0, x1, y1] = tile.rect;
            let width = if tile.parent.is_none() { 3 } else { 1 };
            Rectangle::new([(x0, y0), (x1, y1)], WHITE.stroke_width(width))
        }))?;

        chart.draw_series(visible().map(|tile| {
            let [x0, y0, _, y1] = tile.rect;
            match tile.parent {
                None => Text::new(
                    format!("{} ({:.0})", tile.label, tile.value),
                    (x0 + 0.01, y1 - 0.02),
                    (FONT, 15).into_font().style(FontStyle::Bold),
                ),
                Some(_) => Text::new(
                    format!("{} ({:.0})", tile.label, tile.value),
                    (x0 + 0.01, (y0 + y1) / 2.0),
                    (FONT, 12).into_font(),
                ),
            }
        }))?;

        Ok(())
    }

    fn draw_heatmap<DB: DrawingBackend>(
        root: &DrawingArea<DB, Shift>,
        spec: &ChartSpec,
        columns: &[String],
        rows: &[String],
        values: &[Vec<f64>],
        color_scale: ColorScale,
    ) -> Result<(), RenderError> {
        let column_positions: Vec<f64> = (0..columns.len()).map(|i| i as f64).collect();
        let row_positions: Vec<f64> = (0..rows.len()).map(|i| i as f64).collect();

        let mut chart = ChartBuilder::on(root)
            .caption(spec.title.as_str(), (FONT, 22))
            .margin(15)
            .margin_bottom(40)
            .x_label_area_size(160)
            .y_label_area_size(200)
            .build_cartesian_2d(
                -0.5f64..columns.len() as f64 - 0.5,
                -0.5f64..rows.len() as f64 - 0.5,
            )?;

        let x_formatter = |x: &f64| tick_label(&column_positions, columns, *x);
        let y_formatter = |y: &f64| tick_label(&row_positions, rows, *y);
        chart
            .configure_mesh()
            .disable_mesh()
            .x_labels(columns.len() + 1)
            .y_labels(rows.len() + 1)
            .x_label_formatter(&x_formatter)
            .y_label_formatter(&y_formatter)
            .x_label_style((FONT, 12).into_font().transform(FontTransform::Rotate90))
            .x_desc(spec.x_label.as_str())
            .y_desc(spec.y_label.as_str())
            .draw()?;

        let cells = || {
            values.iter().enumerate().flat_map(|(r, row)| {
                row.iter()
                    .enumerate()
                    .map(move |(c, &value)| (c as f64, r as f64, value))
            })
        };

        chart.draw_series(cells().map(|(x, y, value)| {
            Rectangle::new(
                [(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)],
                rgb(color_scale.sample(value)).filled(),
            )
        }))?;
        chart.draw_series(cells().map(|(x, y, value)| {
            Text::new(
                format!("{:.2}", value),
                (x - 0.15, y + 0.1),
                (FONT, 11).into_font(),
            )
        }))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_labels_only_on_positions() {
        let positions = [0.0, 1.0, 2.0];
        let labels = ["Iraq".to_string(), "Syria".to_string(), "Yemen".to_string()];

        assert_eq!(tick_label(&positions, &labels, 1.0), "Syria");
        assert_eq!(tick_label(&positions, &labels, 1.5), "");
        assert_eq!(tick_label(&positions, &labels, 3.0), "");
    }

    #[test]
    fn drawing_errors_convert() {
        let err: RenderError =
            DrawingAreaErrorKind::<std::io::Error>::LayoutError.into();
        assert!(matches!(err, RenderError::Draw(_)));
    }
}
