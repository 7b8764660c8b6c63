//! Chart Plotter Module
//! Draws chart descriptions interactively using egui_plot.

use super::spec::{
    BarSeries, ChartBody, ChartSpec, ColorScale, GraphEdge, GraphNode, LinePoint, Rgb,
    TreemapTile, EDGE_COLOR,
};
use chrono::{Datelike, NaiveDate};
use egui::{Color32, RichText, Stroke};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoint, PlotPoints, Points, Polygon, Text};

/// Default plot height inside a chart card.
pub const PLOT_HEIGHT: f32 = 320.0;

pub fn color32(color: Rgb) -> Color32 {
    Color32::from_rgb(color.0, color.1, color.2)
}

/// Label of the category whose integer slot the grid mark falls on.
fn category_label(labels: &[String], value: f64) -> String {
    let idx = value.round();
    if (value - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

/// Creates interactive charts using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Draw any chart description; empty charts show a placeholder.
    pub fn draw(ui: &mut egui::Ui, spec: &ChartSpec, height: f32) {
        if spec.is_empty() {
            ui.allocate_ui(egui::vec2(ui.available_width(), height), |ui| {
                ui.centered_and_justified(|ui| {
                    ui.label(RichText::new("No data for this selection").color(Color32::GRAY));
                });
            });
            return;
        }

        let id = spec.id.slug();
        match &spec.body {
            ChartBody::Histogram { bins, series } => {
                let positions: Vec<f64> = bins.iter().map(|&b| b as f64).collect();
                Self::draw_stacked_bars(ui, id, spec, height, &positions, series, None);
            }
            ChartBody::Bar { categories, series } => {
                let positions: Vec<f64> = (0..categories.len()).map(|i| i as f64).collect();
                Self::draw_stacked_bars(ui, id, spec, height, &positions, series, Some(categories));
            }
            ChartBody::Line { points, color } => {
                Self::draw_line(ui, id, spec, height, points, *color);
            }
            ChartBody::Network { nodes, edges, .. } => {
                Self::draw_network(ui, id, height, nodes, edges);
            }
            ChartBody::Treemap { tiles } => {
                Self::draw_treemap(ui, id, height, tiles);
            }
            ChartBody::Heatmap {
                columns,
                rows,
                values,
                color_scale,
                footnote,
            } => {
                Self::draw_heatmap(ui, id, spec, height, columns, rows, values, *color_scale);
                ui.label(RichText::new(footnote).size(10.0).color(Color32::GRAY));
            }
        }
    }

    fn draw_stacked_bars(
        ui: &mut egui::Ui,
        id: &str,
        spec: &ChartSpec,
        height: f32,
        positions: &[f64],
        series: &[BarSeries],
        categories: Option<&Vec<String>>,
    ) {
        let mut charts: Vec<BarChart> = Vec::with_capacity(series.len());
        for s in series {
            let color = color32(s.color);
            let bars = positions
                .iter()
                .zip(&s.values)
                .map(|(&x, &v)| Bar::new(x, v).width(0.8).fill(color))
                .collect();

            let chart = BarChart::new(bars).color(color).name(&s.name);
            let below: Vec<&BarChart> = charts.iter().collect();
            let chart = if below.is_empty() {
                chart
            } else {
                chart.stack_on(&below)
            };
            charts.push(chart);
        }

        let mut plot = Plot::new(format!("plot_{}", id))
            .height(height)
            .legend(Legend::default())
            .allow_scroll(false)
            .x_axis_label(spec.x_label.as_str())
            .y_axis_label(spec.y_label.as_str());

        if let Some(categories) = categories {
            let labels = categories.clone();
            plot = plot.x_axis_formatter(move |mark, _range| category_label(&labels, mark.value));
        }

        plot.show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
    }

    fn draw_line(
        ui: &mut egui::Ui,
        id: &str,
        spec: &ChartSpec,
        height: f32,
        points: &[LinePoint],
        color: Rgb,
    ) {
        let line_points: PlotPoints = points
            .iter()
            .map(|p| [p.date.num_days_from_ce() as f64, p.value])
            .collect();

        Plot::new(format!("plot_{}", id))
            .height(height)
            .allow_scroll(false)
            .x_axis_label(spec.x_label.as_str())
            .y_axis_label(spec.y_label.as_str())
            .x_axis_formatter(|mark, _range| {
                NaiveDate::from_num_days_from_ce_opt(mark.value.round() as i32)
                    .map(|d| d.format("%b %d, %Y").to_string())
                    .unwrap_or_default()
            })
            .label_formatter(|_name, value| {
                let date = NaiveDate::from_num_days_from_ce_opt(value.x.round() as i32)
                    .map(|d| d.format("%B %d, %Y").to_string())
                    .unwrap_or_default();
                format!("{}\n{:.2}", date, value.y)
            })
            .show(ui, |plot_ui| {
                plot_ui.line(Line::new(line_points).color(color32(color)).width(2.0));
            });
    }

    fn draw_network(
        ui: &mut egui::Ui,
        id: &str,
        height: f32,
        nodes: &[GraphNode],
        edges: &[GraphEdge],
    ) {
        Plot::new(format!("plot_{}", id))
            .height(height)
            .show_axes(false)
            .show_grid(false)
            .allow_scroll(false)
            .data_aspect(1.0)
            .show(ui, |plot_ui| {
                for edge in edges {
                    plot_ui.line(
                        Line::new(PlotPoints::from(vec![edge.from, edge.to]))
                            .color(color32(EDGE_COLOR))
                            .width(0.5),
                    );
                }

                for node in nodes {
                    plot_ui.points(
                        Points::new(vec![node.position])
                            .radius(5.0)
                            .color(color32(node.color))
                            .name(format!("{} ({} connections)", node.label, node.degree)),
                    );
                    plot_ui.text(
                        Text::new(
                            PlotPoint::new(node.position[0], node.position[1] + 0.06),
                            RichText::new(&node.label).size(10.0),
                        )
                        .color(Color32::LIGHT_GRAY),
                    );
                }
            });
    }

    fn draw_treemap(ui: &mut egui::Ui, id: &str, height: f32, tiles: &[TreemapTile]) {
        Plot::new(format!("plot_{}", id))
            .height(height)
            .show_axes(false)
            .show_grid(false)
            .allow_scroll(false)
            .include_x(0.0)
            .include_x(1.0)
            .include_y(0.0)
            .include_y(1.0)
            .show(ui, |plot_ui| {
                for tile in tiles {
                    let [x0, y0, x1, y1] = tile.rect;
                    if x1 - x0 <= 0.0 || y1 - y0 <= 0.0 {
                        continue;
                    }
                    let corners = vec![[x0, y0], [x1, y0], [x1, y1], [x0, y1]];

                    // Parents only frame their children.
                    let polygon = if tile.parent.is_none() {
                        Polygon::new(PlotPoints::from(corners))
                            .fill_color(Color32::TRANSPARENT)
                            .stroke(Stroke::new(2.5, Color32::WHITE))
                    } else {
                        Polygon::new(PlotPoints::from(corners))
                            .fill_color(color32(tile.color).gamma_multiply(0.8))
                            .stroke(Stroke::new(1.0, Color32::WHITE))
                    };
                    plot_ui.polygon(polygon.name(format!("{}: {:.0}", tile.id, tile.value)));

                    let text = match &tile.parent {
                        None => RichText::new(&tile.label).strong().size(12.0),
                        Some(_) => RichText::new(format!("{}\n{:.0}", tile.label, tile.value))
                            .size(10.0),
                    };
                    let anchor = match tile.parent {
                        None => PlotPoint::new((x0 + x1) / 2.0, y1 - 0.03),
                        Some(_) => PlotPoint::new((x0 + x1) / 2.0, (y0 + y1) / 2.0),
                    };
                    plot_ui.text(Text::new(anchor, text).color(Color32::BLACK));
                }
            });
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_heatmap(
        ui: &mut egui::Ui,
        id: &str,
        spec: &ChartSpec,
        height: f32,
        columns: &[String],
        rows: &[String],
        values: &[Vec<f64>],
        color_scale: ColorScale,
    ) {
        let column_labels = columns.to_vec();
        let row_labels = rows.to_vec();

        Plot::new(format!("plot_{}", id))
            .height(height)
            .allow_scroll(false)
            .show_grid(false)
            .x_axis_label(spec.x_label.as_str())
            .y_axis_label(spec.y_label.as_str())
            .x_axis_formatter(move |mark, _range| category_label(&column_labels, mark.value))
            .y_axis_formatter(move |mark, _range| category_label(&row_labels, mark.value))
            .show(ui, |plot_ui| {
                for (r, row) in values.iter().enumerate() {
                    for (c, &value) in row.iter().enumerate() {
                        let (x, y) = (c as f64, r as f64);
                        let corners = vec![
                            [x - 0.5, y - 0.5],
                            [x + 0.5, y - 0.5],
                            [x + 0.5, y + 0.5],
                            [x - 0.5, y + 0.5],
                        ];
                        plot_ui.polygon(
                            Polygon::new(PlotPoints::from(corners))
                                .fill_color(color32(color_scale.sample(value)))
                                .stroke(Stroke::new(0.5, Color32::WHITE))
                                .name(format!(
                                    "Region: {}\nAttack Type: {}\nSeverity: {:.2}",
                                    rows[r], columns[c], value
                                )),
                        );
                        plot_ui.text(
                            Text::new(
                                PlotPoint::new(x, y),
                                RichText::new(format!("{:.2}", value)).size(8.0),
                            )
                            .color(Color32::BLACK),
                        );
                    }
                }
            });
    }
}
