//! Incident Records
//! Typed row schema for the incident table and the viewer's selection.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::ops::RangeInclusive;

/// Months offered by the month selector.
pub const MONTHS: RangeInclusive<u32> = 1..=12;

/// One recorded terrorism event.
///
/// Every attribute is optional: the published sheet has gaps, and each
/// aggregation decides for itself which fields it cannot do without.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Incident {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub fatalities: Option<f64>,
    pub wounded: Option<f64>,
    pub weapon_type: Option<String>,
    pub attack_type: Option<String>,
    pub target_type: Option<String>,
}

impl Incident {
    pub fn in_region(&self, region: &str) -> bool {
        self.region.as_deref() == Some(region)
    }

    /// True when the incident falls inside both the selected region and month.
    pub fn matches(&self, selection: &Selection) -> bool {
        self.in_region(&selection.region) && self.month == Some(selection.month)
    }

    /// Calendar date, if year/month/day are present and form a real date.
    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year?, self.month?, self.day?)
    }

    /// Fatalities plus wounded. A missing wound count counts as zero,
    /// a missing fatality count leaves the total undefined.
    pub fn total_casualties(&self) -> Option<f64> {
        Some(self.fatalities? + self.wounded.unwrap_or(0.0))
    }
}

/// The raw incident table, loaded once and never mutated.
#[derive(Debug, Clone, Default)]
pub struct IncidentTable {
    incidents: Vec<Incident>,
    regions: Vec<String>,
    weapon_types: Vec<String>,
}

impl IncidentTable {
    pub fn new(incidents: Vec<Incident>) -> Self {
        let mut seen = HashSet::new();
        let regions = incidents
            .iter()
            .filter_map(|incident| incident.region.as_deref())
            .filter(|region| seen.insert(*region))
            .map(str::to_string)
            .collect();

        let weapon_types = incidents
            .iter()
            .filter_map(|incident| incident.weapon_type.as_deref())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect();

        Self {
            incidents,
            regions,
            weapon_types,
        }
    }

    pub fn incidents(&self) -> &[Incident] {
        &self.incidents
    }

    /// Distinct regions in order of first appearance.
    pub fn regions(&self) -> &[String] {
        &self.regions
    }

    /// Distinct weapon types, sorted.
    pub fn weapon_types(&self) -> &[String] {
        &self.weapon_types
    }

    pub fn len(&self) -> usize {
        self.incidents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.incidents.is_empty()
    }

    /// First region in the table, January.
    pub fn default_selection(&self) -> Option<Selection> {
        self.regions
            .first()
            .map(|region| Selection::new(region.clone(), *MONTHS.start()))
    }
}

/// Current values of the region and month selectors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Selection {
    pub region: String,
    pub month: u32,
}

impl Selection {
    pub fn new(region: impl Into<String>, month: u32) -> Self {
        Self {
            region: region.into(),
            month,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn incident(region: &str, month: u32) -> Incident {
        Incident {
            region: Some(region.to_string()),
            month: Some(month),
            ..Default::default()
        }
    }

    #[test]
    fn regions_keep_first_appearance_order() {
        let table = IncidentTable::new(vec![
            incident("South Asia", 1),
            incident("Middle East & North Africa", 2),
            incident("South Asia", 3),
            Incident::default(),
            incident("Sub-Saharan Africa", 1),
        ]);

        assert_eq!(
            table.regions(),
            &["South Asia", "Middle East & North Africa", "Sub-Saharan Africa"]
        );
        assert_eq!(
            table.default_selection(),
            Some(Selection::new("South Asia", 1))
        );
    }

    #[test]
    fn weapon_types_are_sorted_and_distinct() {
        let weapon = |name: &str| Incident {
            weapon_type: Some(name.to_string()),
            ..incident("South Asia", 1)
        };
        let table = IncidentTable::new(vec![
            weapon("Firearms"),
            weapon("Explosives"),
            incident("South Asia", 2),
            weapon("Firearms"),
        ]);

        assert_eq!(table.weapon_types(), &["Explosives", "Firearms"]);
    }

    #[test]
    fn empty_table_has_no_default_selection() {
        assert_eq!(IncidentTable::new(Vec::new()).default_selection(), None);
    }

    #[test]
    fn invalid_calendar_day_has_no_date() {
        let mut row = incident("South Asia", 2);
        row.year = Some(2021);
        row.day = Some(30);
        assert_eq!(row.date(), None);

        row.day = Some(0);
        assert_eq!(row.date(), None);

        row.day = Some(28);
        assert_eq!(row.date(), NaiveDate::from_ymd_opt(2021, 2, 28));
    }

    #[test]
    fn casualties_treat_missing_wounded_as_zero() {
        let row = Incident {
            fatalities: Some(3.0),
            ..Default::default()
        };
        assert_eq!(row.total_casualties(), Some(3.0));

        let row = Incident {
            wounded: Some(4.0),
            ..Default::default()
        };
        assert_eq!(row.total_casualties(), None);
    }
}
