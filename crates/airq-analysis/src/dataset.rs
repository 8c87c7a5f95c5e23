//! In-memory air-pollution dataset and its CSV loader
//!
//! The source data is a wide table: one row per monitoring day and site, with
//! one numeric column per pollutant. Loading melts it into a flat list of
//! [`Observation`]s, one per (row, series column).
//!
//! ```text
//! Date,State,City,O3 1st Max Hour,CO 1st Max Hour,...
//! 2000-01-01,Arizona,Phoenix,9,23,...
//!        ↓
//! Observation { region: "Arizona", sub_region: "Phoenix", series: "O3 1st Max Hour", year: 2000, value: Some(9.0) }
//! Observation { region: "Arizona", sub_region: "Phoenix", series: "CO 1st Max Hour", year: 2000, value: Some(23.0) }
//! ```
//!
//! A [`Dataset`] is immutable once loaded and is passed explicitly to every
//! query.

use std::{collections::HashSet, io, sync::Arc};

use chrono::{Datelike as _, NaiveDate, NaiveDateTime};
use tracing::debug;

/// Series columns of the reference pollution dataset (hour of the daily peak).
pub const DEFAULT_SERIES_COLUMNS: [&str; 4] = [
    "O3 1st Max Hour",
    "CO 1st Max Hour",
    "SO2 1st Max Hour",
    "NO2 1st Max Hour",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum LoadDatasetError {
    #[display("failed to read CSV data: {_0}")]
    #[from]
    Csv(csv::Error),
    #[display("column '{name}' not found in CSV header")]
    MissingColumn { name: String },
    #[display("invalid date '{value}' on line {line}")]
    InvalidDate { line: u64, value: String },
}

/// One labelled reading: a series value for a place and a year.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Top-level location facet (a state).
    pub region: Arc<str>,
    /// Location within the region (a city).
    pub sub_region: Arc<str>,
    /// Series name (a pollutant column).
    pub series: Arc<str>,
    /// Calendar year derived from the row's date.
    pub year: i32,
    /// Reading, or `None` when the cell was empty or not a number.
    pub value: Option<f64>,
}

impl Observation {
    /// Returns the value if it is present and finite.
    #[must_use]
    pub fn finite_value(&self) -> Option<f64> {
        self.value.filter(|v| v.is_finite())
    }
}

/// Column names used to read a dataset from CSV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSchema {
    pub date_column: String,
    pub region_column: String,
    pub sub_region_column: String,
    pub series_columns: Vec<String>,
}

impl Default for DatasetSchema {
    fn default() -> Self {
        Self {
            date_column: "Date".to_owned(),
            region_column: "State".to_owned(),
            sub_region_column: "City".to_owned(),
            series_columns: DEFAULT_SERIES_COLUMNS.map(str::to_owned).to_vec(),
        }
    }
}

/// Immutable collection of observations.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    observations: Vec<Observation>,
    series: Vec<Arc<str>>,
}

impl Dataset {
    /// Creates a dataset from observations.
    ///
    /// The series list is derived in order of first occurrence.
    #[must_use]
    pub fn new(observations: Vec<Observation>) -> Self {
        let series = distinct(observations.iter().map(|obs| &obs.series));
        Self {
            observations,
            series,
        }
    }

    /// Reads a wide-format CSV table.
    ///
    /// Every data row yields one observation per series column, in schema order.
    /// Empty or non-numeric cells become missing values; an unparseable date is
    /// an error.
    ///
    /// # Examples
    ///
    /// ```
    /// use airq_analysis::dataset::{Dataset, DatasetSchema};
    ///
    /// let csv = "\
    /// Date,State,City,O3 1st Max Hour,CO 1st Max Hour,SO2 1st Max Hour,NO2 1st Max Hour
    /// 2000-01-01,Arizona,Phoenix,9,23,,19
    /// ";
    /// let dataset = Dataset::from_csv_reader(csv.as_bytes(), &DatasetSchema::default()).unwrap();
    /// assert_eq!(dataset.len(), 4);
    /// assert_eq!(dataset.observations()[2].value, None);
    /// ```
    pub fn from_csv_reader<R>(reader: R, schema: &DatasetSchema) -> Result<Self, LoadDatasetError>
    where
        R: io::Read,
    {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = reader.headers()?.clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|header| header == name)
                .ok_or_else(|| LoadDatasetError::MissingColumn {
                    name: name.to_owned(),
                })
        };

        let date_idx = column(&schema.date_column)?;
        let region_idx = column(&schema.region_column)?;
        let sub_region_idx = column(&schema.sub_region_column)?;

        let mut interner = Interner::default();
        let series_columns = schema
            .series_columns
            .iter()
            .map(|name| Ok((interner.intern(name), column(name)?)))
            .collect::<Result<Vec<_>, LoadDatasetError>>()?;

        let mut observations = vec![];
        let mut record = csv::StringRecord::new();
        let mut rows = 0_usize;
        while reader.read_record(&mut record)? {
            rows += 1;
            let date = record.get(date_idx).unwrap_or_default();
            let year = parse_year(date).ok_or_else(|| LoadDatasetError::InvalidDate {
                line: record.position().map_or(0, csv::Position::line),
                value: date.to_owned(),
            })?;
            let region = interner.intern(record.get(region_idx).unwrap_or_default());
            let sub_region = interner.intern(record.get(sub_region_idx).unwrap_or_default());

            observations.extend(series_columns.iter().map(|(series, idx)| Observation {
                region: Arc::clone(&region),
                sub_region: Arc::clone(&sub_region),
                series: Arc::clone(series),
                year,
                value: parse_value(record.get(*idx).unwrap_or_default()),
            }));
        }

        debug!(
            rows,
            observations = observations.len(),
            "parsed CSV dataset"
        );

        Ok(Self {
            observations,
            series: series_columns.into_iter().map(|(series, _)| series).collect(),
        })
    }

    #[must_use]
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Returns the series names in dataset order.
    #[must_use]
    pub fn series(&self) -> &[Arc<str>] {
        &self.series
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Returns the distinct regions in order of first occurrence.
    #[must_use]
    pub fn regions(&self) -> Vec<Arc<str>> {
        distinct(self.observations.iter().map(|obs| &obs.region))
    }

    /// Returns the distinct sub-regions of `region` in order of first occurrence.
    #[must_use]
    pub fn sub_regions(&self, region: &str) -> Vec<Arc<str>> {
        distinct(
            self.observations
                .iter()
                .filter(|obs| &*obs.region == region)
                .map(|obs| &obs.sub_region),
        )
    }
}

fn distinct<'a, I>(names: I) -> Vec<Arc<str>>
where
    I: IntoIterator<Item = &'a Arc<str>>,
{
    let mut seen = HashSet::new();
    names
        .into_iter()
        .filter(|name| seen.insert(Arc::clone(name)))
        .cloned()
        .collect()
}

/// Shares one allocation per distinct label.
#[derive(Debug, Default)]
struct Interner {
    strings: HashSet<Arc<str>>,
}

impl Interner {
    fn intern(&mut self, text: &str) -> Arc<str> {
        if let Some(interned) = self.strings.get(text) {
            return Arc::clone(interned);
        }
        let interned = Arc::<str>::from(text);
        self.strings.insert(Arc::clone(&interned));
        interned
    }
}

fn parse_year(text: &str) -> Option<i32> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .or_else(|| {
            DATETIME_FORMATS.iter().find_map(|format| {
                NaiveDateTime::parse_from_str(text, format)
                    .ok()
                    .map(|datetime| datetime.date())
            })
        })
        .map(|date| date.year())
}

fn parse_value(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Date,Address,State,City,O3 1st Max Hour,CO 1st Max Hour,SO2 1st Max Hour,NO2 1st Max Hour
2000-01-01,1645 E ROOSEVELT,Arizona,Phoenix,9,23,21,19
2000-01-02,1645 E ROOSEVELT,Arizona,Phoenix,9,0,,8
2001-03-04,1645 E ROOSEVELT,Arizona,Tucson,10,n/a,12,7
2001-03-04,500 MAIN ST,Colorado,Denver,11,6,8,20
";

    fn load(csv: &str) -> Result<Dataset, LoadDatasetError> {
        Dataset::from_csv_reader(csv.as_bytes(), &DatasetSchema::default())
    }

    #[test]
    fn test_load_fans_out_series() {
        let dataset = load(SAMPLE).unwrap();
        assert_eq!(dataset.len(), 16);
        assert_eq!(dataset.series().len(), 4);
        assert_eq!(&*dataset.series()[0], "O3 1st Max Hour");

        let first = &dataset.observations()[0];
        assert_eq!(&*first.region, "Arizona");
        assert_eq!(&*first.sub_region, "Phoenix");
        assert_eq!(&*first.series, "O3 1st Max Hour");
        assert_eq!(first.year, 2000);
        assert_eq!(first.value, Some(9.0));
    }

    #[test]
    fn test_missing_and_non_numeric_values() {
        let dataset = load(SAMPLE).unwrap();
        let obs = dataset.observations();
        // Row 2, SO2 is empty.
        assert_eq!(obs[6].value, None);
        // Row 2, CO is a genuine zero.
        assert_eq!(obs[5].value, Some(0.0));
        // Row 3, CO is not a number.
        assert_eq!(obs[9].value, None);
    }

    #[test]
    fn test_regions_and_sub_regions_in_first_occurrence_order() {
        let dataset = load(SAMPLE).unwrap();
        let regions = dataset.regions();
        assert_eq!(
            regions.iter().map(|r| &**r).collect::<Vec<_>>(),
            ["Arizona", "Colorado"]
        );
        let cities = dataset.sub_regions("Arizona");
        assert_eq!(
            cities.iter().map(|c| &**c).collect::<Vec<_>>(),
            ["Phoenix", "Tucson"]
        );
        assert!(dataset.sub_regions("Nowhere").is_empty());
    }

    #[test]
    fn test_labels_are_interned() {
        let dataset = load(SAMPLE).unwrap();
        let obs = dataset.observations();
        assert!(Arc::ptr_eq(&obs[0].region, &obs[4].region));
        assert!(Arc::ptr_eq(&obs[0].series, &obs[4].series));
    }

    #[test]
    fn test_missing_column() {
        let err = load("Date,State,City\n2000-01-01,Arizona,Phoenix\n").unwrap_err();
        assert!(matches!(
            err,
            LoadDatasetError::MissingColumn { ref name } if name == "O3 1st Max Hour"
        ));
    }

    #[test]
    fn test_invalid_date_reports_line() {
        let schema = DatasetSchema {
            series_columns: vec!["O3".to_owned()],
            ..DatasetSchema::default()
        };
        let csv = "Date,State,City,O3\n2000-01-01,A,B,1\nyesterday,A,B,2\n";
        let err = Dataset::from_csv_reader(csv.as_bytes(), &schema).unwrap_err();
        assert!(matches!(
            err,
            LoadDatasetError::InvalidDate { line: 3, ref value } if value == "yesterday"
        ));
        assert_eq!(err.to_string(), "invalid date 'yesterday' on line 3");
    }

    #[test]
    fn test_custom_schema() {
        let schema = DatasetSchema {
            date_column: "day".to_owned(),
            region_column: "country".to_owned(),
            sub_region_column: "station".to_owned(),
            series_columns: vec!["pm25".to_owned()],
        };
        let csv = "station,day,pm25,country\nX1,2019-05-06 13:00:00,12.5,NL\n";
        let dataset = Dataset::from_csv_reader(csv.as_bytes(), &schema).unwrap();
        let obs = &dataset.observations()[0];
        assert_eq!(&*obs.region, "NL");
        assert_eq!(&*obs.sub_region, "X1");
        assert_eq!(obs.year, 2019);
        assert_eq!(obs.value, Some(12.5));
    }

    #[test]
    fn test_date_formats() {
        assert_eq!(parse_year("2023-12-31"), Some(2023));
        assert_eq!(parse_year("07/04/2010"), Some(2010));
        assert_eq!(parse_year("2015-06-01T08:30:00"), Some(2015));
        assert_eq!(parse_year("2015"), None);
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value(" 3.5 "), Some(3.5));
        assert_eq!(parse_value(""), None);
        assert_eq!(parse_value("NaN"), None);
        assert_eq!(parse_value("inf"), None);
    }

    #[test]
    fn test_new_derives_series_order() {
        let obs = |series: &str| Observation {
            region: Arc::from("R"),
            sub_region: Arc::from("S"),
            series: Arc::from(series),
            year: 2000,
            value: Some(1.0),
        };
        let dataset = Dataset::new(vec![obs("NO2"), obs("O3"), obs("NO2")]);
        assert_eq!(
            dataset.series().iter().map(|s| &**s).collect::<Vec<_>>(),
            ["NO2", "O3"]
        );
    }
}
