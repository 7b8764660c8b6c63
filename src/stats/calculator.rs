//! Statistics Calculator Module
//! Rolling means, min-max scaling and the attack severity heatmap.

use crate::data::IncidentTable;
use serde::Serialize;
use statrs::statistics::Statistics;
use std::collections::{BTreeMap, BTreeSet};

/// Region × attack-type matrix of mean normalized severity.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeverityHeatmap {
    /// Row labels, sorted.
    pub regions: Vec<String>,
    /// Column labels, sorted.
    pub attack_types: Vec<String>,
    /// `cells[row][col]`, 0 where no incident falls in the cell.
    pub cells: Vec<Vec<f64>>,
}

impl SeverityHeatmap {
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty() || self.attack_types.is_empty()
    }
}

/// Handles numeric reductions shared by the aggregations.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Trailing mean over the last `window` values, requiring one observation.
    pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
        let window = window.max(1);
        (0..values.len())
            .map(|i| {
                let start = (i + 1).saturating_sub(window);
                values[start..=i].iter().mean()
            })
            .collect()
    }

    /// `casualties * (1 + ln(len(attack_type) + 1))`, length in characters.
    pub fn severity_index(casualties: f64, attack_type: &str) -> f64 {
        let len = attack_type.chars().count() as f64;
        casualties * (1.0 + (len + 1.0).ln())
    }

    /// Scale values into [0, 1]. A zero range maps everything to 0.
    pub fn min_max_normalize(values: &[f64]) -> Vec<f64> {
        if values.is_empty() {
            return Vec::new();
        }

        let min = Statistics::min(values.iter());
        let max = Statistics::max(values.iter());
        let range = max - min;

        if !range.is_finite() || range <= 0.0 {
            return vec![0.0; values.len()];
        }

        values.iter().map(|v| (v - min) / range).collect()
    }

    /// Mean normalized severity per (region, attack type) over the whole table.
    ///
    /// Only rows reporting both fatalities and wounded are scored.
    /// Normalization spans every scored row; the pivot then only keeps rows
    /// that also carry a region.
    pub fn severity_heatmap(table: &IncidentTable) -> SeverityHeatmap {
        let scored: Vec<(Option<&str>, &str, f64)> = table
            .incidents()
            .iter()
            .filter_map(|incident| {
                let attack = incident.attack_type.as_deref()?;
                let casualties = incident.fatalities? + incident.wounded?;
                Some((
                    incident.region.as_deref(),
                    attack,
                    Self::severity_index(casualties, attack),
                ))
            })
            .collect();

        let severities: Vec<f64> = scored.iter().map(|(_, _, s)| *s).collect();
        let normalized = Self::min_max_normalize(&severities);

        let mut cells: BTreeMap<(&str, &str), Vec<f64>> = BTreeMap::new();
        let mut regions = BTreeSet::new();
        let mut attack_types = BTreeSet::new();

        for ((region, attack, _), value) in scored.iter().zip(normalized) {
            let Some(region) = region else {
                continue;
            };
            regions.insert(*region);
            attack_types.insert(*attack);
            cells.entry((*region, *attack)).or_default().push(value);
        }

        let regions: Vec<&str> = regions.into_iter().collect();
        let attack_types: Vec<&str> = attack_types.into_iter().collect();

        let cells = regions
            .iter()
            .map(|region| {
                attack_types
                    .iter()
                    .map(|attack| {
                        cells
                            .get(&(*region, *attack))
                            .map(|values| values.iter().mean())
                            .unwrap_or(0.0)
                    })
                    .collect()
            })
            .collect();

        SeverityHeatmap {
            regions: regions.into_iter().map(str::to_string).collect(),
            attack_types: attack_types.into_iter().map(str::to_string).collect(),
            cells,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Incident;
    use approx::assert_relative_eq;

    fn incident(region: &str, attack: &str, nkill: f64, nwound: Option<f64>) -> Incident {
        Incident {
            region: Some(region.to_string()),
            attack_type: Some(attack.to_string()),
            fatalities: Some(nkill),
            wounded: nwound,
            ..Default::default()
        }
    }

    #[test]
    fn rolling_mean_uses_partial_window_first() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let means = StatsCalculator::rolling_mean(&values, 7);

        assert_relative_eq!(means[0], 1.0);
        assert_relative_eq!(means[2], 2.0);
        assert_relative_eq!(means[6], 4.0);
        assert_relative_eq!(means[7], 5.0);
    }

    #[test]
    fn rolling_mean_of_nothing_is_empty() {
        assert!(StatsCalculator::rolling_mean(&[], 7).is_empty());
    }

    #[test]
    fn severity_index_grows_with_label_length() {
        let short = StatsCalculator::severity_index(10.0, "Arson");
        assert_relative_eq!(short, 10.0 * (1.0 + 6f64.ln()));
        assert!(StatsCalculator::severity_index(10.0, "Bombing/Explosion") > short);
        assert_eq!(StatsCalculator::severity_index(0.0, "Arson"), 0.0);
    }

    #[test]
    fn constant_values_normalize_to_zero() {
        let normalized = StatsCalculator::min_max_normalize(&[2.5, 2.5, 2.5]);
        assert_eq!(normalized, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn normalize_spans_unit_interval() {
        let normalized = StatsCalculator::min_max_normalize(&[2.0, 4.0, 6.0]);
        assert_eq!(normalized, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn heatmap_averages_and_fills_missing_cells() {
        let table = IncidentTable::new(vec![
            incident("South Asia", "Hijacking", 0.0, Some(0.0)),
            incident("South Asia", "Hijacking", 10.0, Some(10.0)),
            incident("Western Europe", "Arson", 1.0, Some(0.0)),
        ]);

        let heatmap = StatsCalculator::severity_heatmap(&table);

        assert_eq!(heatmap.regions, vec!["South Asia", "Western Europe"]);
        assert_eq!(heatmap.attack_types, vec!["Arson", "Hijacking"]);
        // Hijacking severities are the min (0) and the max (1).
        assert_relative_eq!(heatmap.cells[0][1], 0.5);
        assert_eq!(heatmap.cells[0][0], 0.0);
        assert_eq!(heatmap.cells[1][1], 0.0);
        assert!(heatmap.cells[1][0] > 0.0 && heatmap.cells[1][0] < 1.0);
    }

    #[test]
    fn heatmap_with_equal_severity_is_all_zero() {
        let table = IncidentTable::new(vec![
            incident("South Asia", "Arson", 2.0, Some(0.0)),
            incident("Western Europe", "Arson", 1.0, Some(1.0)),
        ]);

        let heatmap = StatsCalculator::severity_heatmap(&table);

        assert!(heatmap
            .cells
            .iter()
            .flatten()
            .all(|v| *v == 0.0 && !v.is_nan()));
    }

    #[test]
    fn heatmap_skips_rows_without_fatalities() {
        let mut row = incident("South Asia", "Arson", 0.0, Some(4.0));
        row.fatalities = None;
        let table = IncidentTable::new(vec![row]);

        assert!(StatsCalculator::severity_heatmap(&table).is_empty());
    }

    #[test]
    fn heatmap_skips_rows_without_wounded() {
        let table = IncidentTable::new(vec![
            incident("A", "Arson", 2.0, None),
            incident("A", "Arson", 0.0, Some(0.0)),
            incident("B", "Arson", 10.0, Some(0.0)),
        ]);

        let heatmap = StatsCalculator::severity_heatmap(&table);

        assert_eq!(heatmap.regions, vec!["A", "B"]);
        assert_eq!(heatmap.cells, vec![vec![0.0], vec![1.0]]);
    }
}
