use airq_analysis::query::{DrillDownError, QueryResult};
use airq_stats::{boxplot::BoxPlotStats, histogram::HistogramBin};
use serde::{Deserialize, Serialize};

/// Statistics and drill-down histograms for one facet selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryExport {
    pub state: String,
    pub city: String,
    /// Pollutant column name, or `All`
    pub pollutant: String,
    /// Number of buckets each histogram was binned into
    pub bucket_count: usize,
    /// Groups ordered by year, then by pollutant
    pub groups: Vec<GroupExport>,
}

/// One box of the chart together with its histogram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupExport {
    pub year: i32,
    pub series: String,
    pub stats: StatsExport,
    pub histogram: Vec<BinExport>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsExport {
    pub count: usize,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub whisker_low: f64,
    pub whisker_high: f64,
    pub outliers: Vec<f64>,
}

/// A histogram bin; every bin is `[low, high)` except the last, which is closed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinExport {
    pub low: f64,
    pub high: f64,
    pub count: u64,
}

impl QueryExport {
    pub(crate) fn from_result(
        result: &QueryResult,
        bucket_count: usize,
    ) -> Result<Self, DrillDownError> {
        let facets = result.facets();
        let groups = result
            .keys_by_year()
            .into_iter()
            .filter_map(|key| result.get(key).map(|stats| (key, stats)))
            .map(|(key, stats)| {
                let histogram = result.drill_down(key, bucket_count)?;
                Ok(GroupExport {
                    year: key.year,
                    series: key.series.to_string(),
                    stats: StatsExport::from(stats),
                    histogram: histogram.bins.iter().map(BinExport::from).collect(),
                })
            })
            .collect::<Result<Vec<_>, DrillDownError>>()?;

        Ok(Self {
            state: facets.region.clone(),
            city: facets.sub_region.clone(),
            pollutant: facets.series.to_string(),
            bucket_count,
            groups,
        })
    }
}

impl From<&BoxPlotStats> for StatsExport {
    fn from(stats: &BoxPlotStats) -> Self {
        Self {
            count: stats.count,
            q1: stats.q1,
            median: stats.median,
            q3: stats.q3,
            whisker_low: stats.whisker_low,
            whisker_high: stats.whisker_high,
            outliers: stats.outliers.clone(),
        }
    }
}

impl From<&HistogramBin> for BinExport {
    fn from(bin: &HistogramBin) -> Self {
        Self {
            low: bin.low,
            high: bin.high,
            count: bin.count,
        }
    }
}
