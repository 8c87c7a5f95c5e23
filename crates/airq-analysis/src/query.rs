//! Faceted box plot query over a dataset.

use std::{fmt, sync::Arc};

use airq_stats::{
    boxplot::BoxPlotStats,
    histogram::{Histogram, HistogramError},
};
use tracing::debug;

use crate::{
    aggregate::{Aggregation, Grouping},
    dataset::{Dataset, Observation},
    selection::{Facets, SeriesSelection},
};

/// Identifies one box of the chart: a year and a series.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupKey {
    pub year: i32,
    pub series: Arc<str>,
}

impl GroupKey {
    #[must_use]
    pub fn new(year: i32, series: &Arc<str>) -> Self {
        Self {
            year,
            series: Arc::clone(series),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.series, self.year)
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum DrillDownError {
    #[display("no data for {key}")]
    UnknownGroup { key: GroupKey },
    #[display("cannot bin group values: {_0}")]
    #[from]
    Histogram(HistogramError),
}

/// Statistics for one facet selection, plus the raw values behind them.
#[derive(Debug, Clone)]
pub struct QueryResult {
    facets: Facets,
    series: Vec<Arc<str>>,
    grouping: Grouping<GroupKey>,
    stats: Aggregation<GroupKey>,
}

impl QueryResult {
    /// Runs the query for `facets` over `dataset`.
    ///
    /// Observations are filtered by region and sub-region. Each series of the
    /// selection is then aggregated by year on its own, and the results are
    /// merged series by series. Groups without a finite value are omitted.
    ///
    /// # Examples
    ///
    /// ```
    /// use airq_analysis::{
    ///     dataset::{Dataset, DatasetSchema},
    ///     query::QueryResult,
    ///     selection::Facets,
    /// };
    ///
    /// let csv = "\
    /// Date,State,City,O3 1st Max Hour,CO 1st Max Hour,SO2 1st Max Hour,NO2 1st Max Hour
    /// 2000-01-01,Arizona,Phoenix,9,23,,19
    /// 2000-01-02,Arizona,Phoenix,10,0,,8
    /// ";
    /// let dataset = Dataset::from_csv_reader(csv.as_bytes(), &DatasetSchema::default()).unwrap();
    /// let facets = Facets::default_for(&dataset).unwrap();
    /// let result = QueryResult::compute(&dataset, &facets);
    /// // SO2 has no values for 2000 and is left out.
    /// assert_eq!(result.len(), 3);
    /// assert_eq!(result.years(), [2000]);
    /// ```
    #[must_use]
    pub fn compute(dataset: &Dataset, facets: &Facets) -> Self {
        let located = dataset
            .observations()
            .iter()
            .filter(|obs| facets.matches_location(obs))
            .collect::<Vec<_>>();

        let requested = match &facets.series {
            SeriesSelection::All => dataset.series().to_vec(),
            SeriesSelection::Single(_) => facets.series.expand(dataset),
        };

        let mut grouping = Grouping::default();
        let mut stats = Aggregation::default();
        for series in &requested {
            let series_grouping = group_series(&located, series);
            stats.append(series_grouping.summarize());
            grouping.append(series_grouping);
        }

        let series = requested
            .into_iter()
            .filter(|series| stats.keys().any(|key| key.series == *series))
            .collect::<Vec<_>>();

        debug!(
            region = %facets.region,
            sub_region = %facets.sub_region,
            selection = %facets.series,
            observations = located.len(),
            groups = stats.len(),
            "computed box plot query"
        );

        Self {
            facets: facets.clone(),
            series,
            grouping,
            stats,
        }
    }

    #[must_use]
    pub fn facets(&self) -> &Facets {
        &self.facets
    }

    /// Returns the statistics per group, series by series.
    #[must_use]
    pub fn stats(&self) -> &Aggregation<GroupKey> {
        &self.stats
    }

    #[must_use]
    pub fn grouping(&self) -> &Grouping<GroupKey> {
        &self.grouping
    }

    #[must_use]
    pub fn get(&self, key: &GroupKey) -> Option<&BoxPlotStats> {
        self.stats.get(key)
    }

    /// Returns the number of non-empty groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stats.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    /// Returns the series with at least one non-empty group, in selection order.
    #[must_use]
    pub fn series(&self) -> &[Arc<str>] {
        &self.series
    }

    /// Returns the position of `series` in [`QueryResult::series`].
    #[must_use]
    pub fn series_index(&self, series: &str) -> Option<usize> {
        self.series.iter().position(|s| &**s == series)
    }

    /// Returns the distinct years with data, in ascending order.
    #[must_use]
    pub fn years(&self) -> Vec<i32> {
        let mut years = self.stats.keys().map(|key| key.year).collect::<Vec<_>>();
        years.sort_unstable();
        years.dedup();
        years
    }

    /// Returns the group keys ordered by year, then by series order.
    ///
    /// This is the left-to-right order of the boxes in the chart.
    #[must_use]
    pub fn keys_by_year(&self) -> Vec<&GroupKey> {
        let mut keys = self.stats.keys().collect::<Vec<_>>();
        keys.sort_by_key(|key| (key.year, self.series_index(&key.series)));
        keys
    }

    /// Bins the raw values of one group into `bucket_count` buckets.
    ///
    /// # Errors
    ///
    /// * [`DrillDownError::UnknownGroup`] - if the group has no data
    /// * [`DrillDownError::Histogram`] - if `bucket_count` is zero
    pub fn drill_down(
        &self,
        key: &GroupKey,
        bucket_count: usize,
    ) -> Result<Histogram, DrillDownError> {
        if !self.stats.contains_key(key) {
            return Err(DrillDownError::UnknownGroup { key: key.clone() });
        }
        let histogram = Histogram::new(self.grouping.finite_values(key), bucket_count)?;
        Ok(histogram)
    }
}

fn group_series(observations: &[&Observation], series: &Arc<str>) -> Grouping<GroupKey> {
    Grouping::by(
        observations
            .iter()
            .copied()
            .filter(|obs| obs.series == *series),
        |obs| GroupKey::new(obs.year, series),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(city: &str, series: &str, year: i32, value: Option<f64>) -> Observation {
        Observation {
            region: Arc::from("Arizona"),
            sub_region: Arc::from(city),
            series: Arc::from(series),
            year,
            value,
        }
    }

    fn dataset() -> Dataset {
        Dataset::new(vec![
            obs("Phoenix", "O3", 2001, Some(9.0)),
            obs("Phoenix", "CO", 2001, Some(23.0)),
            obs("Phoenix", "O3", 2000, Some(10.0)),
            obs("Phoenix", "CO", 2000, None),
            obs("Phoenix", "O3", 2000, Some(12.0)),
            obs("Tucson", "O3", 2000, Some(1.0)),
            obs("Tucson", "CO", 2002, Some(2.0)),
        ])
    }

    fn key(year: i32, series: &str) -> GroupKey {
        GroupKey {
            year,
            series: Arc::from(series),
        }
    }

    fn phoenix(series: SeriesSelection) -> Facets {
        Facets {
            region: "Arizona".to_owned(),
            sub_region: "Phoenix".to_owned(),
            series,
        }
    }

    #[test]
    fn test_all_series_are_merged_series_major() {
        let dataset = dataset();
        let result = QueryResult::compute(&dataset, &phoenix(SeriesSelection::All));
        let keys = result.stats().keys().cloned().collect::<Vec<_>>();
        assert_eq!(
            keys,
            [key(2001, "O3"), key(2000, "O3"), key(2001, "CO")],
            "CO 2000 has no values and must be omitted"
        );
        assert_eq!(result.years(), [2000, 2001]);
        assert_eq!(
            result.series().iter().map(|s| &**s).collect::<Vec<_>>(),
            ["O3", "CO"]
        );
        assert_eq!(result.get(&key(2000, "O3")).unwrap().median, 11.0);
    }

    #[test]
    fn test_single_series() {
        let dataset = dataset();
        let result =
            QueryResult::compute(&dataset, &phoenix(SeriesSelection::Single("CO".to_owned())));
        assert_eq!(result.len(), 1);
        assert_eq!(result.get(&key(2001, "CO")).unwrap().median, 23.0);
        assert!(result.get(&key(2001, "O3")).is_none());
    }

    #[test]
    fn test_location_filter() {
        let dataset = dataset();
        let facets = phoenix(SeriesSelection::All).with_region(&dataset, "Arizona");
        assert_eq!(facets.sub_region, "Phoenix");
        let tucson = Facets {
            sub_region: "Tucson".to_owned(),
            ..facets
        };
        let result = QueryResult::compute(&dataset, &tucson);
        assert_eq!(result.years(), [2000, 2002]);
        assert_eq!(result.get(&key(2000, "O3")).unwrap().count, 1);
    }

    #[test]
    fn test_unknown_series_gives_empty_result() {
        let dataset = dataset();
        let result = QueryResult::compute(
            &dataset,
            &phoenix(SeriesSelection::Single("PM10".to_owned())),
        );
        assert!(result.is_empty());
        assert!(result.series().is_empty());
        assert!(result.years().is_empty());
    }

    #[test]
    fn test_keys_by_year() {
        let dataset = dataset();
        let result = QueryResult::compute(&dataset, &phoenix(SeriesSelection::All));
        let keys = result.keys_by_year().into_iter().cloned().collect::<Vec<_>>();
        assert_eq!(keys, [key(2000, "O3"), key(2001, "O3"), key(2001, "CO")]);
    }

    #[test]
    fn test_drill_down() {
        let dataset = dataset();
        let result = QueryResult::compute(&dataset, &phoenix(SeriesSelection::All));
        let histogram = result.drill_down(&key(2000, "O3"), 2).unwrap();
        assert_eq!(histogram.bins.len(), 2);
        assert_eq!(histogram.total_count(), 2);

        let err = result.drill_down(&key(2000, "CO"), 12).unwrap_err();
        assert!(matches!(err, DrillDownError::UnknownGroup { .. }));
        assert_eq!(err.to_string(), "no data for CO 2000");

        let err = result.drill_down(&key(2000, "O3"), 0).unwrap_err();
        assert!(matches!(
            err,
            DrillDownError::Histogram(HistogramError::ZeroBuckets)
        ));
    }

    #[test]
    fn test_recompute_is_identical() {
        let dataset = dataset();
        let facets = phoenix(SeriesSelection::All);
        let first = QueryResult::compute(&dataset, &facets);
        let second = QueryResult::compute(&dataset, &facets);
        assert_eq!(first.stats(), second.stats());
    }
}
