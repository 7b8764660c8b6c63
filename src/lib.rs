//! GTD Dashboard - Global Terrorism Database incident explorer
//!
//! Loads the incident extract, aggregates it for a (region, month) selection
//! and describes seven charts that the GUI draws and the exporter renders.

pub mod charts;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod gui;
pub mod stats;
