//! Control Panel Widget
//! Left side panel with the region/month selectors and export controls.

use crate::data::{Selection, MONTHS};
use egui::{Color32, ComboBox, RichText};

/// Left side control panel with selection and export controls.
pub struct ControlPanel {
    pub regions: Vec<String>,
    pub selected_region: String,
    pub selected_month: u32,
    pub source: String,
    pub row_count: usize,
    pub status: String,
    pub busy: bool,
    pub export_enabled: bool,
}

impl ControlPanel {
    pub fn new(regions: Vec<String>, initial: &Selection, source: &str, row_count: usize) -> Self {
        Self {
            regions,
            selected_region: initial.region.clone(),
            selected_month: initial.month,
            source: source.to_string(),
            row_count,
            status: "Ready".to_string(),
            busy: false,
            export_enabled: false,
        }
    }

    pub fn selection(&self) -> Selection {
        Selection::new(self.selected_region.clone(), self.selected_month)
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🌍 GTD Dashboard")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Global Terrorism Data: Jan to June 2021")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.add(egui::Label::new(RichText::new(&self.source).size(11.0)).truncate());
                ui.label(
                    RichText::new(format!("{} incidents", self.row_count))
                        .size(11.0)
                        .color(Color32::GRAY),
                );
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Selection Section =====
        ui.label(RichText::new("🔧 Filters").size(14.0).strong());
        ui.add_space(8.0);

        let label_width = 70.0;
        let combo_width = 190.0;
        let before = self.selection();

        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("Region:"));
            ComboBox::from_id_salt("region")
                .width(combo_width)
                .selected_text(&self.selected_region)
                .show_ui(ui, |ui| {
                    for region in &self.regions {
                        ui.selectable_value(&mut self.selected_region, region.clone(), region);
                    }
                });
        });

        ui.add_space(5.0);

        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("Month:"));
            ComboBox::from_id_salt("month")
                .width(combo_width)
                .selected_text(format!("Month {}", self.selected_month))
                .show_ui(ui, |ui| {
                    for month in MONTHS {
                        ui.selectable_value(
                            &mut self.selected_month,
                            month,
                            format!("Month {}", month),
                        );
                    }
                });
        });

        if self.selection() != before {
            action = ControlPanelAction::SelectionChanged(self.selection());
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Action Buttons =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.export_enabled, |ui| {
                let button = egui::Button::new(RichText::new("📄 Export PNG").size(14.0))
                    .min_size(egui::vec2(150.0, 30.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::ExportPng;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status Section =====
        ui.label(RichText::new("📊 Status").size(14.0).strong());
        ui.add_space(5.0);

        ui.horizontal(|ui| {
            if self.busy {
                ui.spinner();
            }
            let status_color = if self.status.contains("Error") {
                Color32::from_rgb(220, 53, 69)
            } else if self.status.contains("Complete") || self.status.contains("Exported") {
                Color32::from_rgb(40, 167, 69)
            } else {
                Color32::GRAY
            };
            ui.label(RichText::new(&self.status).size(11.0).color(status_color));
        });

        action
    }

    /// Set busy flag and status
    pub fn set_status(&mut self, busy: bool, status: &str) {
        self.busy = busy;
        self.status = status.to_string();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    SelectionChanged(Selection),
    ExportPng,
}
