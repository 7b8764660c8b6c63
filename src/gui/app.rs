//! GTD Dashboard Main Application
//! Main window with control panel and chart viewer.

use crate::charts::ChartRenderer;
use crate::config::DashboardConfig;
use crate::dashboard::{BinderState, DashboardFigures, ReactiveBinder};
use crate::data::{IncidentTable, Selection};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use egui::SidePanel;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Main application window.
pub struct DashboardApp {
    config: DashboardConfig,
    binder: ReactiveBinder,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,
}

impl DashboardApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        table: Arc<IncidentTable>,
        config: DashboardConfig,
    ) -> Self {
        let initial = table
            .default_selection()
            .unwrap_or_else(|| Selection::new(String::new(), 1));

        let control_panel =
            ControlPanel::new(table.regions().to_vec(), &initial, &config.source, table.len());
        let mut binder = ReactiveBinder::new(table, config.pipeline_settings());
        binder.select(initial);

        Self {
            config,
            binder,
            control_panel,
            chart_viewer: ChartViewer::new(),
        }
    }

    /// Collect a finished update from the binder, if any
    fn check_results(&mut self) {
        if let Some(figures) = self.binder.poll() {
            let count = figures.charts.len();
            self.chart_viewer.set_figures(figures);
            self.control_panel.export_enabled = true;
            if self.binder.state() == BinderState::Idle {
                self.control_panel
                    .set_status(false, &format!("Complete! {} charts ready", count));
            }
        }

        if self.binder.state() == BinderState::Computing {
            self.control_panel.set_status(true, "Computing charts...");
        }
    }

    /// Render the displayed charts to PNG files in a user picked folder
    fn handle_export_png(&mut self) {
        let Some(figures) = self.chart_viewer.figures() else {
            self.control_panel.set_status(false, "No charts to export");
            return;
        };

        let Some(dir) = rfd::FileDialog::new().pick_folder() else {
            return; // User cancelled
        };

        match Self::export(figures, &dir, self.config.export_size()) {
            Ok(count) => {
                info!(dir = %dir.display(), count, "charts exported");
                self.control_panel
                    .set_status(false, &format!("Exported {} charts", count));
                if let Err(e) = open::that(&dir) {
                    warn!(error = %e, "could not open export folder");
                }
            }
            Err(e) => {
                warn!(error = %e, "chart export failed");
                self.control_panel
                    .set_status(false, &format!("Error: {}", e));
            }
        }
    }

    fn export(figures: &DashboardFigures, dir: &Path, size: (u32, u32)) -> anyhow::Result<usize> {
        let paths = ChartRenderer::export_all(&figures.charts, dir, size)?;
        std::fs::write(dir.join("figures.json"), figures.to_json()?)?;
        Ok(paths.len())
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for background results
        self.check_results();

        // Request repaint while calculating
        if self.binder.state() == BinderState::Computing {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui);

                    match action {
                        ControlPanelAction::SelectionChanged(selection) => {
                            self.binder.select(selection);
                        }
                        ControlPanelAction::ExportPng => self.handle_export_png(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Chart Viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ui);
        });
    }
}
