use approx::assert_relative_eq;
use gtd_dashboard::charts::{ChartBody, ChartId};
use gtd_dashboard::dashboard::{BinderState, Pipeline, PipelineSettings, ReactiveBinder};
use gtd_dashboard::data::{DataLoader, DataProcessor, Incident, IncidentTable, Selection};
use gtd_dashboard::stats::{LayoutSettings, NetworkBuilder};
use proptest::prelude::*;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/incidents_sample.csv")
}

fn fixture() -> &'static IncidentTable {
    static TABLE: OnceLock<IncidentTable> = OnceLock::new();
    TABLE.get_or_init(|| {
        DataLoader::default()
            .load(fixture_path().to_str().unwrap())
            .unwrap()
    })
}

#[test]
fn fixture_loads_with_regions_in_file_order() {
    let table = fixture();

    assert_eq!(table.len(), 20);
    assert_eq!(
        table.regions(),
        [
            "Middle East & North Africa",
            "South Asia",
            "Sub-Saharan Africa",
            "Western Europe"
        ]
    );
    assert_eq!(
        table.default_selection(),
        Some(Selection::new("Middle East & North Africa", 1))
    );

    let blank_country = &table.incidents()[12];
    assert_eq!(blank_country.region.as_deref(), Some("South Asia"));
    assert!(blank_country.country.is_none());
    assert!(table.incidents()[2].wounded.is_none());
}

#[test]
fn histogram_buckets_sum_to_region_total() {
    let table = fixture();

    for (region, expected) in [
        ("Middle East & North Africa", 17.0),
        ("South Asia", 21.0),
        ("Sub-Saharan Africa", 19.0),
        ("Western Europe", 0.0),
    ] {
        let histogram = DataProcessor::monthly_histogram(table, &Selection::new(region, 2));
        assert_eq!(histogram.buckets.len(), 12);
        assert_relative_eq!(histogram.total(), expected);
    }
}

#[test]
fn country_weapon_keeps_only_the_selection() {
    let rows = DataProcessor::country_weapon(
        fixture(),
        &Selection::new("Middle East & North Africa", 1),
    );

    let keys: Vec<(&str, &str)> = rows
        .iter()
        .map(|r| (r.country.as_str(), r.weapon_type.as_str()))
        .collect();
    assert_eq!(
        keys,
        [
            ("Iraq", "Explosives"),
            ("Iraq", "Firearms"),
            ("Syria", "Explosives"),
            ("Yemen", "Explosives"),
        ]
    );
    assert_relative_eq!(rows[3].fatalities, 7.0);
}

#[test]
fn treemap_drops_rows_without_country() {
    let rows = DataProcessor::treemap(fixture(), &Selection::new("South Asia", 2));

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].country, "Afghanistan");
    assert_relative_eq!(rows[0].casualties, 13.0);
}

#[test]
fn time_series_ignores_the_month() {
    let table = fixture();
    let settings = PipelineSettings::default();

    for region in table.regions() {
        let january = Pipeline::chart(
            ChartId::TimeSeries,
            table,
            &Selection::new(region.as_str(), 1),
            &settings,
        );
        let february = Pipeline::chart(
            ChartId::TimeSeries,
            table,
            &Selection::new(region.as_str(), 2),
            &settings,
        );
        assert_eq!(january, february);
    }
}

#[test]
fn network_for_empty_selection_is_empty() {
    let graph = NetworkBuilder::build(
        fixture(),
        &Selection::new("Western Europe", 1),
        &LayoutSettings::default(),
    );
    assert!(graph.is_empty());

    let figures = Pipeline::compute(
        fixture(),
        &Selection::new("Western Europe", 1),
        &PipelineSettings::default(),
    );
    assert!(figures.chart(ChartId::Network).unwrap().is_empty());
    assert!(!figures.chart(ChartId::SeverityHeatmap).unwrap().is_empty());
}

#[test]
fn figures_serialize_to_json() {
    let figures = Pipeline::compute(
        fixture(),
        &Selection::new("South Asia", 1),
        &PipelineSettings::default(),
    );

    let json: serde_json::Value = serde_json::from_str(&figures.to_json().unwrap()).unwrap();
    let charts = json["charts"].as_array().unwrap();
    assert_eq!(charts.len(), 7);
    assert_eq!(charts[0]["id"], "severity_heatmap");
    assert_eq!(charts[0]["body"]["kind"], "heatmap");
    assert_eq!(json["selection"]["region"], "South Asia");
}

#[test]
fn binder_settles_on_newest_selection() {
    let table = Arc::new(fixture().clone());
    let mut binder = ReactiveBinder::new(table, PipelineSettings::default());

    binder.select(Selection::new("South Asia", 1));
    binder.select(Selection::new("South Asia", 2));
    binder.select(Selection::new("Sub-Saharan Africa", 3));

    let mut last = None;
    while let Some(figures) = binder.wait() {
        last = Some(figures.selection);
    }

    assert_eq!(last, Some(Selection::new("Sub-Saharan Africa", 3)));
    assert_eq!(binder.state(), BinderState::Idle);
}

#[test]
fn fixture_file_missing_region_column_is_rejected() {
    let csv = b"iyear,imonth,iday,country_txt,nkill\n2021,1,1,Iraq,2\n".to_vec();
    assert!(DataLoader::parse_csv(csv).is_err());
}

fn region_name(index: usize) -> String {
    ["North America", "South Asia", "Eastern Europe"][index].to_string()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn no_chart_carries_nan(region in 0usize..4, month in 1u32..=12) {
        let table = fixture();
        let selection = Selection::new(table.regions()[region].as_str(), month);

        let figures = Pipeline::compute(table, &selection, &PipelineSettings::default());

        prop_assert_eq!(figures.charts.len(), 7);
        for chart in &figures.charts {
            for value in chart.body.measures() {
                prop_assert!(value.is_finite(), "{:?} carries {}", chart.id, value);
            }
        }
    }

    #[test]
    fn histogram_conserves_fatalities(
        rows in prop::collection::vec(
            (0usize..3, 1u32..=12, prop::option::of(0.0f64..50.0)),
            0..60,
        ),
        region in 0usize..3,
        month in 1u32..=12,
    ) {
        let incidents: Vec<Incident> = rows
            .iter()
            .map(|(r, m, nkill)| Incident {
                month: Some(*m),
                region: Some(region_name(*r)),
                fatalities: *nkill,
                ..Default::default()
            })
            .collect();
        let expected: f64 = rows
            .iter()
            .filter(|(r, _, _)| *r == region)
            .filter_map(|(_, _, nkill)| *nkill)
            .sum();

        let table = IncidentTable::new(incidents);
        let histogram = DataProcessor::monthly_histogram(
            &table,
            &Selection::new(region_name(region), month),
        );

        prop_assert_eq!(histogram.buckets.len(), 12);
        prop_assert!((histogram.total() - expected).abs() < 1e-6);
        let selected: Vec<u32> = histogram
            .buckets
            .iter()
            .filter(|b| b.label.as_str() == "Selected Month")
            .map(|b| b.month)
            .collect();
        prop_assert_eq!(selected, vec![month]);
    }

    #[test]
    fn histogram_chart_matches_aggregation(region in 0usize..4, month in 1u32..=12) {
        let table = fixture();
        let selection = Selection::new(table.regions()[region].as_str(), month);
        let histogram = DataProcessor::monthly_histogram(table, &selection);

        let chart = Pipeline::chart(
            ChartId::MonthlyHistogram,
            table,
            &selection,
            &PipelineSettings::default(),
        );

        let ChartBody::Histogram { bins, .. } = &chart.body else {
            panic!("monthly histogram is not a histogram body");
        };
        prop_assert_eq!(bins.len(), 12);
        let drawn: f64 = chart.body.measures().iter().sum();
        prop_assert!((drawn - histogram.total()).abs() < 1e-6);
    }
}
