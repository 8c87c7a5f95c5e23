//! Arguments shared by several subcommands.

use std::path::PathBuf;

use airq_analysis::{
    dataset::{DEFAULT_SERIES_COLUMNS, Dataset, DatasetSchema},
    scene::SceneConfig,
    selection::{Facets, SeriesSelection},
};
use anyhow::{Context, bail};

use crate::util;

/// Input file and the columns to read from it.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct DatasetArg {
    /// Pollution CSV file path
    pub data: PathBuf,

    /// Column holding the observation date
    #[arg(long, default_value = "Date")]
    pub date_column: String,

    /// Column holding the region (state)
    #[arg(long, default_value = "State")]
    pub region_column: String,

    /// Column holding the sub-region (city)
    #[arg(long, default_value = "City")]
    pub sub_region_column: String,

    /// Numeric series columns (comma-separated)
    #[arg(long, value_delimiter = ',', default_values = DEFAULT_SERIES_COLUMNS)]
    pub series: Vec<String>,
}

impl DatasetArg {
    pub fn schema(&self) -> DatasetSchema {
        DatasetSchema {
            date_column: self.date_column.clone(),
            region_column: self.region_column.clone(),
            sub_region_column: self.sub_region_column.clone(),
            series_columns: self.series.clone(),
        }
    }

    pub fn load(&self) -> anyhow::Result<Dataset> {
        let dataset = util::read_dataset_file(&self.data, &self.schema())?;
        if dataset.is_empty() {
            bail!("{} contains no observations", self.data.display());
        }
        Ok(dataset)
    }
}

/// Facet selection given on the command line.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct FacetArg {
    /// State to show (defaults to the first state in the data)
    #[arg(long)]
    pub state: Option<String>,

    /// City to show (defaults to the first city of the state)
    #[arg(long)]
    pub city: Option<String>,

    /// Pollutant column to show, or "All"
    #[arg(long, default_value = "All")]
    pub pollutant: SeriesSelection,
}

impl FacetArg {
    /// Resolves the selection against the dataset, filling in defaults.
    pub fn resolve(&self, dataset: &Dataset) -> anyhow::Result<Facets> {
        let facets = Facets::default_for(dataset).context("Dataset contains no locations")?;
        let facets = match &self.state {
            Some(state) => {
                if !dataset.regions().iter().any(|region| **region == **state) {
                    bail!("State {state} not found in dataset");
                }
                facets.with_region(dataset, state)
            }
            None => facets,
        };
        let facets = match &self.city {
            Some(city) => {
                let cities = dataset.sub_regions(&facets.region);
                if !cities.iter().any(|sub_region| **sub_region == **city) {
                    bail!("City {city} not found in {}", facets.region);
                }
                Facets {
                    sub_region: city.clone(),
                    ..facets
                }
            }
            None => facets,
        };
        if let SeriesSelection::Single(name) = &self.pollutant
            && !dataset.series().iter().any(|series| **series == **name)
        {
            bail!("Pollutant {name} is not a series column");
        }
        Ok(Facets {
            series: self.pollutant.clone(),
            ..facets
        })
    }
}

/// Chart and histogram settings.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SceneArg {
    /// Number of histogram buckets
    #[arg(long, default_value_t = 12, value_parser = clap::value_parser!(u16).range(1..))]
    pub buckets: u16,

    /// Lower bound of the box plot y axis (fitted to the data if unset)
    #[arg(long, requires = "y_max")]
    pub y_min: Option<f64>,

    /// Upper bound of the box plot y axis (fitted to the data if unset)
    #[arg(long, requires = "y_min")]
    pub y_max: Option<f64>,
}

impl SceneArg {
    pub fn bucket_count(&self) -> usize {
        usize::from(self.buckets)
    }

    pub fn scene_config(&self) -> SceneConfig {
        SceneConfig {
            y_domain: self.y_min.zip(self.y_max),
            ..SceneConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use airq_analysis::dataset::Observation;
    use clap::Parser;

    use super::*;

    #[derive(Debug, Parser)]
    struct TestArgs {
        #[clap(flatten)]
        dataset: DatasetArg,
        #[clap(flatten)]
        facets: FacetArg,
        #[clap(flatten)]
        scene: SceneArg,
    }

    fn parse(args: &[&str]) -> Result<TestArgs, clap::Error> {
        TestArgs::try_parse_from(std::iter::once("airq").chain(args.iter().copied()))
    }

    fn dataset() -> Dataset {
        let obs = |region: &str, sub_region: &str, series: &str| Observation {
            region: Arc::from(region),
            sub_region: Arc::from(sub_region),
            series: Arc::from(series),
            year: 2000,
            value: Some(1.0),
        };
        Dataset::new(vec![
            obs("Arizona", "Phoenix", "O3"),
            obs("Arizona", "Phoenix", "CO"),
            obs("Colorado", "Denver", "O3"),
            obs("Colorado", "Boulder", "O3"),
        ])
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["data.csv"]).unwrap();
        assert_eq!(args.dataset.schema(), DatasetSchema::default());
        assert_eq!(args.facets.pollutant, SeriesSelection::All);
        assert_eq!(args.scene.bucket_count(), 12);
        assert_eq!(args.scene.scene_config().y_domain, None);
    }

    #[test]
    fn test_custom_columns_and_axis() {
        let args = parse(&[
            "data.csv",
            "--series",
            "pm25,pm10",
            "--date-column",
            "day",
            "--y-min",
            "0",
            "--y-max",
            "23",
            "--buckets",
            "6",
        ])
        .unwrap();
        let schema = args.dataset.schema();
        assert_eq!(schema.series_columns, ["pm25", "pm10"]);
        assert_eq!(schema.date_column, "day");
        assert_eq!(args.scene.scene_config().y_domain, Some((0.0, 23.0)));
        assert_eq!(args.scene.bucket_count(), 6);
    }

    #[test]
    fn test_invalid_arguments() {
        assert!(parse(&["data.csv", "--buckets", "0"]).is_err());
        assert!(parse(&["data.csv", "--y-min", "0"]).is_err());
    }

    #[test]
    fn test_resolve_defaults() {
        let args = parse(&["data.csv"]).unwrap();
        let facets = args.facets.resolve(&dataset()).unwrap();
        assert_eq!(facets.region, "Arizona");
        assert_eq!(facets.sub_region, "Phoenix");
        assert_eq!(facets.series, SeriesSelection::All);
    }

    #[test]
    fn test_resolve_state_picks_first_city() {
        let args = parse(&["data.csv", "--state", "Colorado", "--pollutant", "O3"]).unwrap();
        let facets = args.facets.resolve(&dataset()).unwrap();
        assert_eq!(facets.region, "Colorado");
        assert_eq!(facets.sub_region, "Denver");
        assert_eq!(facets.series, SeriesSelection::Single("O3".to_owned()));

        let args = parse(&["data.csv", "--state", "Colorado", "--city", "Boulder"]).unwrap();
        let facets = args.facets.resolve(&dataset()).unwrap();
        assert_eq!(facets.sub_region, "Boulder");
    }

    #[test]
    fn test_resolve_rejects_unknown_values() {
        let dataset = dataset();
        for args in [
            &["data.csv", "--state", "Utah"][..],
            &["data.csv", "--city", "Denver"][..],
            &["data.csv", "--pollutant", "PM10"][..],
        ] {
            let args = parse(args).unwrap();
            assert!(args.facets.resolve(&dataset).is_err(), "{args:?}");
        }
    }
}
