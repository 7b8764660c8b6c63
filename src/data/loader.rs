//! CSV Data Loader Module
//! Fetches the incident CSV and materializes it as a typed table using Polars.

use super::incident::{Incident, IncidentTable};
use polars::prelude::*;
use std::io::Cursor;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Column names of the published incident sheet.
pub mod columns {
    pub const YEAR: &str = "iyear";
    pub const MONTH: &str = "imonth";
    pub const DAY: &str = "iday";
    pub const REGION: &str = "region_txt";
    pub const COUNTRY: &str = "country_txt";
    pub const FATALITIES: &str = "nkill";
    pub const WOUNDED: &str = "nwound";
    pub const WEAPON_TYPE: &str = "weaptype1_txt";
    pub const ATTACK_TYPE: &str = "attacktype1_txt";
    pub const TARGET_TYPE: &str = "targtype1_txt";
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to fetch CSV: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Server answered {status} for {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("Failed to load CSV: {0}")]
    Csv(#[from] PolarsError),
    #[error("CSV has no '{0}' column")]
    MissingColumn(&'static str),
    #[error("No data loaded")]
    NoData,
}

/// Loads the incident table from a URL or a local CSV file.
pub struct DataLoader {
    timeout: Duration,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new(Duration::from_secs(60))
    }
}

impl DataLoader {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Load the table from `source`, an `http(s)://` URL or a file path.
    pub fn load(&self, source: &str) -> Result<IncidentTable, LoadError> {
        let df = if source.starts_with("http://") || source.starts_with("https://") {
            let bytes = self.fetch(source)?;
            Self::read_frame(bytes)?
        } else {
            LazyCsvReader::new(source)
                .with_infer_schema_length(Some(10000))
                .with_ignore_errors(true)
                .finish()?
                .collect()?
        };

        let table = Self::from_dataframe(&df)?;
        info!(
            rows = table.len(),
            regions = table.regions().len(),
            "incident table loaded"
        );
        Ok(table)
    }

    /// Parse an in-memory CSV payload.
    pub fn parse_csv(bytes: Vec<u8>) -> Result<IncidentTable, LoadError> {
        let df = Self::read_frame(bytes)?;
        Self::from_dataframe(&df)
    }

    fn fetch(&self, url: &str) -> Result<Vec<u8>, LoadError> {
        info!(url, "fetching incident CSV");
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()?;
        let response = client.get(url).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                url: url.to_string(),
                status,
            });
        }

        let bytes = response.bytes()?;
        debug!(bytes = bytes.len(), "CSV payload received");
        Ok(bytes.to_vec())
    }

    fn read_frame(bytes: Vec<u8>) -> Result<DataFrame, LoadError> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .into_reader_with_file_handle(Cursor::new(bytes))
            .finish()?;
        Ok(df)
    }

    /// Convert a DataFrame into typed incident rows.
    ///
    /// Only the selector columns are required. Any other missing column
    /// reads as `None` in every row.
    pub fn from_dataframe(df: &DataFrame) -> Result<IncidentTable, LoadError> {
        for required in [columns::REGION, columns::MONTH] {
            if df.column(required).is_err() {
                return Err(LoadError::MissingColumn(required));
            }
        }
        if df.height() == 0 {
            return Err(LoadError::NoData);
        }

        let years = Self::float_column(df, columns::YEAR)?;
        let months = Self::float_column(df, columns::MONTH)?;
        let days = Self::float_column(df, columns::DAY)?;
        let fatalities = Self::float_column(df, columns::FATALITIES)?;
        let wounded = Self::float_column(df, columns::WOUNDED)?;
        let regions = Self::text_column(df, columns::REGION)?;
        let countries = Self::text_column(df, columns::COUNTRY)?;
        let weapons = Self::text_column(df, columns::WEAPON_TYPE)?;
        let attacks = Self::text_column(df, columns::ATTACK_TYPE)?;
        let targets = Self::text_column(df, columns::TARGET_TYPE)?;

        let incidents = (0..df.height())
            .map(|i| Incident {
                year: years[i].map(|v| v as i32),
                month: months[i].and_then(Self::whole_number),
                day: days[i].and_then(Self::whole_number),
                region: regions[i].clone(),
                country: countries[i].clone(),
                fatalities: fatalities[i],
                wounded: wounded[i],
                weapon_type: weapons[i].clone(),
                attack_type: attacks[i].clone(),
                target_type: targets[i].clone(),
            })
            .collect();

        Ok(IncidentTable::new(incidents))
    }

    fn float_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, LoadError> {
        let Ok(column) = df.column(name) else {
            return Ok(vec![None; df.height()]);
        };

        let values = column.cast(&DataType::Float64)?;
        Ok(values
            .f64()?
            .into_iter()
            .map(|v| v.filter(|v| v.is_finite()))
            .collect())
    }

    fn text_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, LoadError> {
        let Ok(column) = df.column(name) else {
            return Ok(vec![None; df.height()]);
        };

        let values = column.cast(&DataType::String)?;
        Ok(values
            .as_materialized_series()
            .str()?
            .into_iter()
            .map(|v| {
                v.map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            })
            .collect())
    }

    fn whole_number(value: f64) -> Option<u32> {
        (value >= 0.0 && value.fract() == 0.0).then_some(value as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
iyear,imonth,iday,region_txt,country_txt,nkill,nwound,weaptype1_txt,attacktype1_txt,targtype1_txt
2021,1,3,South Asia,Afghanistan,2,5,Explosives,Bombing/Explosion,Police
2021,1,4,South Asia,Pakistan,,1,Firearms,Armed Assault,Military
2021,2,0,Sub-Saharan Africa,Nigeria,7,,Firearms,Armed Assault,Private Citizens & Property
";

    #[test]
    fn parses_typed_rows() {
        let table = DataLoader::parse_csv(SAMPLE.as_bytes().to_vec()).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.regions(), &["South Asia", "Sub-Saharan Africa"]);

        let first = &table.incidents()[0];
        assert_eq!(first.year, Some(2021));
        assert_eq!(first.month, Some(1));
        assert_eq!(first.day, Some(3));
        assert_eq!(first.country.as_deref(), Some("Afghanistan"));
        assert_eq!(first.fatalities, Some(2.0));
        assert_eq!(first.wounded, Some(5.0));
        assert_eq!(first.attack_type.as_deref(), Some("Bombing/Explosion"));

        assert_eq!(table.incidents()[1].fatalities, None);
        assert_eq!(table.incidents()[2].wounded, None);
        assert_eq!(table.incidents()[2].day, Some(0));
    }

    #[test]
    fn optional_columns_may_be_absent() {
        let csv = "imonth,region_txt,nkill\n3,Western Europe,1\n";
        let table = DataLoader::parse_csv(csv.as_bytes().to_vec()).unwrap();

        let row = &table.incidents()[0];
        assert_eq!(row.month, Some(3));
        assert_eq!(row.wounded, None);
        assert_eq!(row.country, None);
        assert_eq!(row.target_type, None);
    }

    #[test]
    fn rejects_table_without_region() {
        let csv = "iyear,imonth,nkill\n2021,1,4\n";
        let err = DataLoader::parse_csv(csv.as_bytes().to_vec()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn(columns::REGION)));
    }

    #[test]
    fn rejects_header_only_payload() {
        let csv = "imonth,region_txt\n";
        assert!(DataLoader::parse_csv(csv.as_bytes().to_vec()).is_err());
    }
}
