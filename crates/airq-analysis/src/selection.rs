//! Facet selection: which place and which series to plot.

use std::{convert::Infallible, fmt, str::FromStr, sync::Arc};

use crate::dataset::{Dataset, Observation};

/// Which series to include in a query.
///
/// `All` is expanded explicitly by the query into one aggregation per series.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum SeriesSelection {
    /// A single named series.
    Single(String),
    /// Every series of the dataset.
    #[default]
    All,
}

impl SeriesSelection {
    /// Returns the series names this selection stands for.
    ///
    /// `All` yields the dataset's series in dataset order. `Single` yields
    /// exactly the named series, even if the dataset does not contain it.
    ///
    /// # Examples
    ///
    /// ```
    /// use airq_analysis::{dataset::Dataset, selection::SeriesSelection};
    ///
    /// let dataset = Dataset::default();
    /// let selection: SeriesSelection = "O3 1st Max Hour".parse().unwrap();
    /// let names = selection.expand(&dataset);
    /// assert_eq!(&*names[0], "O3 1st Max Hour");
    /// ```
    #[must_use]
    pub fn expand(&self, dataset: &Dataset) -> Vec<Arc<str>> {
        match self {
            Self::All => dataset.series().to_vec(),
            Self::Single(name) => {
                let series = dataset
                    .series()
                    .iter()
                    .find(|series| ***series == **name)
                    .cloned()
                    .unwrap_or_else(|| Arc::from(name.as_str()));
                vec![series]
            }
        }
    }

    #[must_use]
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

impl FromStr for SeriesSelection {
    type Err = Infallible;

    /// Parses `all` (any case) as [`SeriesSelection::All`], anything else as a series name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            Ok(Self::Single(s.to_owned()))
        }
    }
}

impl fmt::Display for SeriesSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(name) => f.write_str(name),
            Self::All => f.write_str("All"),
        }
    }
}

/// The current facet selection: a place and a series choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Facets {
    pub region: String,
    pub sub_region: String,
    pub series: SeriesSelection,
}

impl Facets {
    /// Returns the initial selection for a dataset: its first region, the
    /// first sub-region of that region, and all series.
    ///
    /// Returns `None` for an empty dataset.
    #[must_use]
    pub fn default_for(dataset: &Dataset) -> Option<Self> {
        let region = dataset.regions().into_iter().next()?;
        let sub_region = dataset.sub_regions(&region).into_iter().next()?;
        Some(Self {
            region: region.to_string(),
            sub_region: sub_region.to_string(),
            series: SeriesSelection::All,
        })
    }

    /// Switches to `region` and resets the sub-region to its first entry.
    ///
    /// The sub-region becomes empty when the region has no data.
    #[must_use]
    pub fn with_region(self, dataset: &Dataset, region: &str) -> Self {
        let sub_region = dataset
            .sub_regions(region)
            .first()
            .map(ToString::to_string)
            .unwrap_or_default();
        Self {
            region: region.to_owned(),
            sub_region,
            ..self
        }
    }

    /// Returns whether the observation belongs to the selected place.
    #[must_use]
    pub fn matches_location(&self, observation: &Observation) -> bool {
        *observation.region == *self.region && *observation.sub_region == *self.sub_region
    }
}
