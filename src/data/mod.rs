//! Data module - CSV loading and processing

mod incident;
mod loader;
mod processor;

pub use incident::{Incident, IncidentTable, Selection, MONTHS};
pub use loader::{columns, DataLoader, LoadError};
pub use processor::{
    CountryWeaponRow, DataProcessor, DayTotal, MonthBucket, MonthLabel, MonthlyHistogram,
    TimeSeriesPoint, TreemapRow,
};
