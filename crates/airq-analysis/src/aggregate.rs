//! Grouping observations by a composite key and summarizing each group.
//!
//! Aggregation runs in two steps:
//!
//! 1. [`Grouping::by`] partitions observations by a key selector, keeping the
//!    raw values of every group (needed later for drill-down histograms).
//! 2. [`Grouping::summarize`] computes [`BoxPlotStats`] per group, omitting
//!    groups without a single finite value.
//!
//! Both preserve the order in which keys first occur in the input. Callers
//! that need sorted output sort the keys themselves.

use std::{collections::HashMap, hash::Hash};

use airq_stats::boxplot::BoxPlotStats;

use crate::dataset::Observation;

/// Raw values partitioned by key, in order of first key occurrence.
#[derive(Debug, Clone)]
pub struct Grouping<K> {
    groups: Vec<(K, Vec<Option<f64>>)>,
    index: HashMap<K, usize>,
}

impl<K> Default for Grouping<K> {
    fn default() -> Self {
        Self {
            groups: vec![],
            index: HashMap::new(),
        }
    }
}

impl<K> Grouping<K>
where
    K: Clone + Eq + Hash,
{
    /// Partitions observations by the key returned from `key`.
    ///
    /// Every observation lands in exactly one group, missing values included.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    ///
    /// use airq_analysis::{aggregate::Grouping, dataset::Observation};
    ///
    /// let obs = |year, value| Observation {
    ///     region: Arc::from("Arizona"),
    ///     sub_region: Arc::from("Phoenix"),
    ///     series: Arc::from("O3"),
    ///     year,
    ///     value,
    /// };
    /// let observations = [obs(2001, Some(9.0)), obs(2000, None), obs(2001, Some(7.0))];
    /// let grouping = Grouping::by(&observations, |obs| obs.year);
    /// assert_eq!(grouping.keys().copied().collect::<Vec<_>>(), [2001, 2000]);
    /// assert_eq!(grouping.finite_values(&2001).collect::<Vec<_>>(), [9.0, 7.0]);
    /// ```
    pub fn by<'a, I, F>(observations: I, mut key: F) -> Self
    where
        I: IntoIterator<Item = &'a Observation>,
        F: FnMut(&Observation) -> K,
    {
        let mut grouping = Self::default();
        for obs in observations {
            grouping.push(key(obs), obs.value);
        }
        grouping
    }

    /// Adds one raw value to the group of `key`, creating the group if needed.
    pub fn push(&mut self, key: K, value: Option<f64>) {
        let idx = *self.index.entry(key.clone()).or_insert_with(|| {
            self.groups.push((key, vec![]));
            self.groups.len() - 1
        });
        self.groups[idx].1.push(value);
    }

    /// Moves all groups of `other` after the groups of `self`.
    ///
    /// Values of a key present in both are appended to the existing group.
    pub fn append(&mut self, other: Self) {
        for (key, values) in other.groups {
            for value in values {
                self.push(key.clone(), value);
            }
        }
    }

    /// Returns the raw values of a group, missing ones included.
    #[must_use]
    pub fn values(&self, key: &K) -> Option<&[Option<f64>]> {
        let &idx = self.index.get(key)?;
        Some(&self.groups[idx].1)
    }

    /// Returns the finite values of a group; empty for an unknown key.
    pub fn finite_values(&self, key: &K) -> impl Iterator<Item = f64> + '_ {
        self.values(key)
            .unwrap_or_default()
            .iter()
            .filter_map(|v| v.filter(|v| v.is_finite()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.groups.iter().map(|(key, _)| key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &[Option<f64>])> + '_ {
        self.groups
            .iter()
            .map(|(key, values)| (key, values.as_slice()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Computes box plot statistics for every group with at least one finite value.
    #[must_use]
    pub fn summarize(&self) -> Aggregation<K> {
        let mut aggregation = Aggregation::default();
        for (key, values) in &self.groups {
            if let Some(stats) = BoxPlotStats::new(values.iter().filter_map(|v| *v)) {
                aggregation.insert(key.clone(), stats);
            }
        }
        aggregation
    }
}

/// Box plot statistics per key, in order of first key occurrence.
#[derive(Debug, Clone)]
pub struct Aggregation<K> {
    entries: Vec<(K, BoxPlotStats)>,
    index: HashMap<K, usize>,
}

impl<K: PartialEq> PartialEq for Aggregation<K> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K> Default for Aggregation<K> {
    fn default() -> Self {
        Self {
            entries: vec![],
            index: HashMap::new(),
        }
    }
}

impl<K> Aggregation<K>
where
    K: Clone + Eq + Hash,
{
    fn insert(&mut self, key: K, stats: BoxPlotStats) {
        if let Some(&idx) = self.index.get(&key) {
            self.entries[idx].1 = stats;
        } else {
            self.index.insert(key.clone(), self.entries.len());
            self.entries.push((key, stats));
        }
    }

    /// Moves all entries of `other` after the entries of `self`.
    ///
    /// An entry of `other` replaces an entry of `self` with the same key.
    pub fn append(&mut self, other: Self) {
        for (key, stats) in other.entries {
            self.insert(key, stats);
        }
    }

    #[must_use]
    pub fn get(&self, key: &K) -> Option<&BoxPlotStats> {
        let &idx = self.index.get(key)?;
        Some(&self.entries[idx].1)
    }

    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.entries.iter().map(|(key, _)| key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &BoxPlotStats)> + '_ {
        self.entries.iter().map(|(key, stats)| (key, stats))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Groups observations by `key` and computes box plot statistics per group.
///
/// Missing and non-finite values are skipped. Groups left without values are
/// omitted from the result.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use airq_analysis::{aggregate::aggregate, dataset::Observation};
///
/// let obs = |series: &str, year, value| Observation {
///     region: Arc::from("Arizona"),
///     sub_region: Arc::from("Phoenix"),
///     series: Arc::from(series),
///     year,
///     value,
/// };
/// let observations = [
///     obs("O3", 2000, Some(10.0)),
///     obs("O3", 2000, Some(20.0)),
///     obs("CO", 2000, None),
/// ];
/// let stats = aggregate(&observations, |obs| (obs.year, obs.series.clone()));
/// assert_eq!(stats.len(), 1);
/// assert_eq!(stats.get(&(2000, Arc::from("O3"))).unwrap().median, 15.0);
/// ```
pub fn aggregate<'a, I, K, F>(observations: I, key: F) -> Aggregation<K>
where
    I: IntoIterator<Item = &'a Observation>,
    K: Clone + Eq + Hash,
    F: FnMut(&Observation) -> K,
{
    Grouping::by(observations, key).summarize()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    use super::*;

    fn obs(series: &str, year: i32, value: Option<f64>) -> Observation {
        Observation {
            region: Arc::from("Arizona"),
            sub_region: Arc::from("Phoenix"),
            series: Arc::from(series),
            year,
            value,
        }
    }

    #[test]
    fn test_single_group_quartiles() {
        let observations = [10.0, 20.0, 30.0, 1000.0].map(|v| obs("O3", 2000, Some(v)));
        let stats = aggregate(&observations, |obs| obs.year);
        let group = stats.get(&2000).unwrap();
        assert_abs_diff_eq!(group.q1, 17.5);
        assert_abs_diff_eq!(group.median, 25.0);
        assert_abs_diff_eq!(group.q3, 272.5);
        // Upper fence is 272.5 + 1.5 * 255 = 655. The largest surviving
        // value (30) lies inside the box, so the whisker stops at Q3.
        assert_eq!(group.whisker_low, 10.0);
        assert_abs_diff_eq!(group.whisker_high, 272.5);
        assert_eq!(group.outliers, vec![1000.0]);
    }

    #[test]
    fn test_empty_groups_are_omitted() {
        let observations = [
            obs("O3", 2000, Some(1.0)),
            obs("CO", 2000, None),
            obs("CO", 2000, Some(f64::NAN)),
        ];
        let grouping = Grouping::by(&observations, |obs| obs.series.clone());
        assert_eq!(grouping.len(), 2);
        let stats = grouping.summarize();
        assert_eq!(stats.len(), 1);
        assert!(stats.contains_key(&Arc::from("O3")));
        assert!(!stats.contains_key(&Arc::from("CO")));
    }

    #[test]
    fn test_key_order_is_first_occurrence() {
        let observations = [
            obs("O3", 2003, Some(1.0)),
            obs("O3", 2001, Some(1.0)),
            obs("O3", 2003, Some(2.0)),
            obs("O3", 2002, Some(1.0)),
        ];
        let stats = aggregate(&observations, |obs| obs.year);
        assert_eq!(stats.keys().copied().collect::<Vec<_>>(), [2003, 2001, 2002]);
    }

    #[test]
    fn test_grouping_values_and_finite_values() {
        let observations = [
            obs("O3", 2000, Some(3.0)),
            obs("O3", 2000, None),
            obs("O3", 2000, Some(f64::INFINITY)),
        ];
        let grouping = Grouping::by(&observations, |obs| obs.year);
        assert_eq!(grouping.values(&2000).map(<[_]>::len), Some(3));
        assert_eq!(grouping.finite_values(&2000).collect::<Vec<_>>(), [3.0]);
        assert!(grouping.values(&1999).is_none());
        assert_eq!(grouping.finite_values(&1999).count(), 0);
    }

    #[test]
    fn test_append_keeps_order_and_merges() {
        let mut left = Grouping::default();
        left.push("a", Some(1.0));
        left.push("b", Some(2.0));
        let mut right = Grouping::default();
        right.push("c", Some(3.0));
        right.push("a", Some(4.0));
        left.append(right);
        assert_eq!(left.keys().copied().collect::<Vec<_>>(), ["a", "b", "c"]);
        assert_eq!(left.values(&"a"), Some(&[Some(1.0), Some(4.0)][..]));

        let mut stats = left.summarize();
        let mut more = Grouping::default();
        more.push("d", Some(5.0));
        stats.append(more.summarize());
        assert_eq!(stats.keys().copied().collect::<Vec<_>>(), ["a", "b", "c", "d"]);
        assert_eq!(stats.get(&"a").unwrap().median, 2.5);
    }

    fn arb_observations() -> impl Strategy<Value = Vec<Observation>> {
        let series = prop::sample::select(vec!["O3", "CO", "SO2", "NO2"]);
        let value = prop::option::weighted(0.8, 0.0..24.0_f64);
        prop::collection::vec((series, 2000..2005_i32, value), 0..200).prop_map(|rows| {
            rows.into_iter()
                .map(|(series, year, value)| obs(series, year, value))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn test_grouping_is_a_partition(observations in arb_observations()) {
            let grouping = Grouping::by(&observations, |obs| (obs.year, obs.series.clone()));
            let total = grouping.iter().map(|(_, values)| values.len()).sum::<usize>();
            prop_assert_eq!(total, observations.len());

            for (key, values) in grouping.iter() {
                let expected = observations
                    .iter()
                    .filter(|obs| (obs.year, obs.series.clone()) == *key)
                    .map(|obs| obs.value)
                    .collect::<Vec<_>>();
                prop_assert_eq!(values, expected.as_slice());
            }
        }

        #[test]
        fn test_aggregation_is_idempotent(observations in arb_observations()) {
            let first = aggregate(&observations, |obs| (obs.year, obs.series.clone()));
            let second = aggregate(&observations, |obs| (obs.year, obs.series.clone()));
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(
                first.keys().collect::<Vec<_>>(),
                second.keys().collect::<Vec<_>>()
            );
        }

        #[test]
        fn test_group_stats_are_ordered(observations in arb_observations()) {
            let stats = aggregate(&observations, |obs| obs.year);
            for (_, group) in stats.iter() {
                prop_assert!(group.whisker_low <= group.q1);
                prop_assert!(group.q1 <= group.median);
                prop_assert!(group.median <= group.q3);
                prop_assert!(group.q3 <= group.whisker_high);
            }
        }
    }
}
