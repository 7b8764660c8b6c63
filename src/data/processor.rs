//! Data Processor Module
//! Filter / group-by / aggregate operations over the typed incident table.

use super::incident::{IncidentTable, Selection, MONTHS};
use crate::stats::StatsCalculator;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::trace;

/// Highlight label of a monthly histogram bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MonthLabel {
    Selected,
    Other,
}

impl MonthLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            MonthLabel::Selected => "Selected Month",
            MonthLabel::Other => "Other Months",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthBucket {
    pub month: u32,
    pub label: MonthLabel,
    pub fatalities: f64,
}

/// Fatalities per month for one region, always twelve buckets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyHistogram {
    pub region: String,
    pub selected_month: u32,
    pub buckets: Vec<MonthBucket>,
}

impl MonthlyHistogram {
    pub fn total(&self) -> f64 {
        self.buckets.iter().map(|b| b.fatalities).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayTotal {
    pub day: u32,
    pub fatalities: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryWeaponRow {
    pub country: String,
    pub weapon_type: String,
    pub fatalities: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesPoint {
    pub date: NaiveDate,
    pub fatalities: f64,
    /// Trailing rolling mean of `fatalities`.
    pub smoothed: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreemapRow {
    pub country: String,
    pub attack_type: String,
    pub casualties: f64,
}

/// Aggregations driven by the current selection.
///
/// Rows missing a field an aggregation needs are skipped by that
/// aggregation only.
pub struct DataProcessor;

impl DataProcessor {
    /// Sum fatalities per month within the selected region, labelling the
    /// selected month's bucket.
    pub fn monthly_histogram(table: &IncidentTable, selection: &Selection) -> MonthlyHistogram {
        let mut sums = [0.0f64; 12];

        for incident in table.incidents() {
            if !incident.in_region(&selection.region) {
                continue;
            }
            let Some(month) = incident.month.filter(|m| MONTHS.contains(m)) else {
                trace!("monthly histogram: row without a valid month skipped");
                continue;
            };
            sums[(month - 1) as usize] += incident.fatalities.unwrap_or(0.0);
        }

        let buckets = MONTHS
            .zip(sums)
            .map(|(month, fatalities)| MonthBucket {
                month,
                label: if month == selection.month {
                    MonthLabel::Selected
                } else {
                    MonthLabel::Other
                },
                fatalities,
            })
            .collect();

        MonthlyHistogram {
            region: selection.region.clone(),
            selected_month: selection.month,
            buckets,
        }
    }

    /// Sum fatalities per day of the selected region and month.
    pub fn daily_fatalities(table: &IncidentTable, selection: &Selection) -> Vec<DayTotal> {
        let mut by_day: BTreeMap<u32, f64> = BTreeMap::new();

        for incident in table.incidents().iter().filter(|i| i.matches(selection)) {
            match (incident.day.filter(|d| (1..=31).contains(d)), incident.fatalities) {
                (Some(day), Some(fatalities)) => *by_day.entry(day).or_default() += fatalities,
                _ => trace!("daily fatalities: row without day or fatalities skipped"),
            }
        }

        by_day
            .into_iter()
            .map(|(day, fatalities)| DayTotal { day, fatalities })
            .collect()
    }

    /// Group the whole table by (country, weapon, region, month), then keep
    /// the groups of the current selection.
    pub fn country_weapon(table: &IncidentTable, selection: &Selection) -> Vec<CountryWeaponRow> {
        let mut groups: BTreeMap<(&str, &str, &str, u32), f64> = BTreeMap::new();

        for incident in table.incidents() {
            let (Some(country), Some(weapon), Some(fatalities), Some(region), Some(month)) = (
                incident.country.as_deref(),
                incident.weapon_type.as_deref(),
                incident.fatalities,
                incident.region.as_deref(),
                incident.month,
            ) else {
                continue;
            };
            *groups.entry((country, weapon, region, month)).or_default() += fatalities;
        }

        groups
            .into_iter()
            .filter(|((_, _, region, month), _)| {
                *region == selection.region && *month == selection.month
            })
            .map(|((country, weapon, _, _), fatalities)| CountryWeaponRow {
                country: country.to_string(),
                weapon_type: weapon.to_string(),
                fatalities,
            })
            .collect()
    }

    /// Daily fatalities of a region with a trailing rolling mean.
    ///
    /// The window counts dated observations, not calendar days, and the
    /// first `window - 1` points average whatever is available.
    pub fn time_series(table: &IncidentTable, region: &str, window: usize) -> Vec<TimeSeriesPoint> {
        let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();

        for incident in table.incidents().iter().filter(|i| i.in_region(region)) {
            match (incident.date(), incident.fatalities) {
                (Some(date), Some(fatalities)) => *by_date.entry(date).or_default() += fatalities,
                _ => trace!("time series: row without a valid date or fatalities skipped"),
            }
        }

        let totals: Vec<f64> = by_date.values().copied().collect();
        let smoothed = StatsCalculator::rolling_mean(&totals, window);

        by_date
            .into_iter()
            .zip(smoothed)
            .map(|((date, fatalities), smoothed)| TimeSeriesPoint {
                date,
                fatalities,
                smoothed,
            })
            .collect()
    }

    /// Total casualties per (country, attack type) for the current selection.
    pub fn treemap(table: &IncidentTable, selection: &Selection) -> Vec<TreemapRow> {
        let mut groups: BTreeMap<(&str, &str), f64> = BTreeMap::new();

        for incident in table.incidents().iter().filter(|i| i.matches(selection)) {
            let (Some(country), Some(attack), Some(casualties)) = (
                incident.country.as_deref(),
                incident.attack_type.as_deref(),
                incident.total_casualties(),
            ) else {
                continue;
            };
            *groups.entry((country, attack)).or_default() += casualties;
        }

        groups
            .into_iter()
            .map(|((country, attack), casualties)| TreemapRow {
                country: country.to_string(),
                attack_type: attack.to_string(),
                casualties,
            })
            .collect()
    }
}
