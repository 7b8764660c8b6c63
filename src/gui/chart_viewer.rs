//! Chart Viewer Widget
//! Right side scrollable panel showing the seven dashboard charts.
//! Supports responsive multi-column layout based on available width.

use crate::charts::{ChartPlotter, ChartSpec, PLOT_HEIGHT};
use crate::dashboard::DashboardFigures;
use egui::{Color32, RichText, ScrollArea};

/// Chart card configuration
const CHART_SPACING: f32 = 15.0;
const CARD_HEIGHT: f32 = 420.0; // Height for each card
const CHART_WIDTH: f32 = 680.0; // Fixed width for each chart card

/// Scrollable chart display area with responsive multi-column layout.
#[derive(Default)]
pub struct ChartViewer {
    /// Charts of the last completed update
    figures: Option<DashboardFigures>,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every chart at once.
    pub fn set_figures(&mut self, figures: DashboardFigures) {
        self.figures = Some(figures);
    }

    pub fn figures(&self) -> Option<&DashboardFigures> {
        self.figures.as_ref()
    }

    /// Draw the chart viewer with responsive multi-column layout
    pub fn show(&mut self, ui: &mut egui::Ui) {
        let Some(figures) = &self.figures else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("Computing charts...").size(20.0));
            });
            return;
        };

        // Calculate how many columns fit in available width
        let avail_width = ui.available_width();
        let card_total_width = CHART_WIDTH + CHART_SPACING;
        let num_columns = ((avail_width / card_total_width).floor() as usize).max(1);

        let total_items = figures.charts.len();
        let total_rows = total_items.div_ceil(num_columns);
        let row_height = CARD_HEIGHT + CHART_SPACING;

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show_rows(ui, row_height, total_rows, |ui, row_range| {
                for row in row_range {
                    ui.horizontal(|ui| {
                        for col in 0..num_columns {
                            let idx = row * num_columns + col;
                            if let Some(spec) = figures.charts.get(idx) {
                                Self::draw_chart_card(ui, spec);
                                ui.add_space(CHART_SPACING);
                            }
                        }
                    });
                    ui.add_space(CHART_SPACING);
                }
            });
    }

    /// Draw a single chart card with fixed width
    fn draw_chart_card(ui: &mut egui::Ui, spec: &ChartSpec) {
        let card_width = CHART_WIDTH - 20.0;
        let border_color = if spec.is_empty() {
            Color32::GRAY
        } else {
            Color32::from_rgb(100, 149, 237)
        };

        egui::Frame::none()
            .rounding(8.0)
            .stroke(egui::Stroke::new(1.5, border_color))
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.set_width(card_width);
                ui.vertical(|ui| {
                    ui.label(RichText::new(&spec.title).size(15.0).strong());
                    ui.add_space(8.0);
                    ChartPlotter::draw(ui, spec, PLOT_HEIGHT);
                });
            });
    }
}
