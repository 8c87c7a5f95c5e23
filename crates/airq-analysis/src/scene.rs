//! Pure layout of drawable scenes from query results and histograms.
//!
//! A scene is a list of positioned shapes in screen coordinates (origin at
//! the top-left corner, y growing downward). Layout never touches a drawing
//! backend; front ends only consume scenes.

use std::sync::Arc;

use airq_stats::{boxplot::BoxPlotStats, histogram::Histogram, nice};

use crate::{
    query::{GroupKey, QueryResult},
    scale::{BandScale, LinearScale},
};

/// Inner padding between series boxes sharing one year band.
const SERIES_PADDING: f64 = 0.1;

/// Space reserved around the plot area for axes and titles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margin {
    pub const ZERO: Self = Self {
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
        left: 0.0,
    };
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            top: 40.0,
            right: 40.0,
            bottom: 50.0,
            left: 60.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    /// Total scene width, margins included.
    pub width: f64,
    /// Total scene height, margins included.
    pub height: f64,
    pub margin: Margin,
    /// Padding of the year bands, as a fraction of the band step.
    pub band_padding: f64,
    /// Fixed y domain; `None` fits the domain to the data.
    pub y_domain: Option<(f64, f64)>,
    /// Approximate number of y axis ticks.
    pub y_tick_count: usize,
    pub x_title: String,
    pub y_title: String,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            width: 960.0,
            height: 500.0,
            margin: Margin::default(),
            band_padding: 0.4,
            y_domain: None,
            y_tick_count: 10,
            x_title: "Year".to_owned(),
            y_title: "Peak Hour".to_owned(),
        }
    }
}

impl SceneConfig {
    /// Returns the plot area left inside the margins.
    #[must_use]
    pub fn plot_area(&self) -> PlotArea {
        let left = self.margin.left.min(self.width);
        let top = self.margin.top.min(self.height);
        PlotArea {
            left,
            top,
            right: (self.width - self.margin.right).max(left),
            bottom: (self.height - self.margin.bottom).max(top),
        }
    }
}

/// Rectangle in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotArea {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl PlotArea {
    #[must_use]
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

/// Axis tick: a data value, its screen position along the axis, and its label.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub value: f64,
    pub position: f64,
    pub label: String,
}

/// One box-and-whisker glyph.
///
/// All vertical fields are screen y coordinates, so `box_top <= box_bottom`.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxGlyph {
    pub key: GroupKey,
    /// Index of the series in the scene's legend, for colouring.
    pub series_index: usize,
    pub x: f64,
    pub width: f64,
    /// Y of the third quartile.
    pub box_top: f64,
    /// Y of the first quartile.
    pub box_bottom: f64,
    pub median: f64,
    pub whisker_top: f64,
    pub whisker_bottom: f64,
    /// Y of every outlier, in ascending value order.
    pub outliers: Vec<f64>,
}

impl BoxGlyph {
    /// Returns the x coordinate of the whisker line.
    #[must_use]
    pub fn center(&self) -> f64 {
        self.x + self.width / 2.0
    }

    /// Returns whether the screen point lies on the glyph's column.
    #[must_use]
    pub fn contains_x(&self, x: f64) -> bool {
        self.x <= x && x <= self.x + self.width
    }
}

/// Box plot of every group of a query, years along x.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxPlotScene {
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    pub area: PlotArea,
    pub x_ticks: Vec<Tick>,
    pub y_ticks: Vec<Tick>,
    pub y_scale: LinearScale,
    /// Glyphs ordered left to right.
    pub glyphs: Vec<BoxGlyph>,
    /// Series legend; glyphs refer to it through `series_index`.
    pub series: Vec<Arc<str>>,
}

impl BoxPlotScene {
    /// Lays out one glyph per group of `result`.
    ///
    /// Each year gets a band of the x axis. When several series are plotted,
    /// the year band is split into one sub-band per series so boxes do not
    /// overlap.
    #[must_use]
    pub fn layout(result: &QueryResult, config: &SceneConfig) -> Self {
        let area = config.plot_area();
        let years = result.years();
        let x = BandScale::new(years.len(), (area.left, area.right), config.band_padding);
        let series_padding = if result.series().len() > 1 {
            SERIES_PADDING
        } else {
            0.0
        };
        let sub_x = BandScale::with_padding(
            result.series().len(),
            (0.0, x.bandwidth()),
            series_padding,
            0.0,
        );

        let y_domain = config
            .y_domain
            .unwrap_or_else(|| fit_domain(result.stats().iter().map(|(_, s)| s), config));
        let y_scale = LinearScale::new(y_domain, (area.bottom, area.top));

        let glyphs = result
            .keys_by_year()
            .into_iter()
            .filter_map(|key| {
                let stats = result.get(key)?;
                let year_idx = years.binary_search(&key.year).ok()?;
                let series_index = result.series_index(&key.series)?;
                let left = x.position(year_idx)? + sub_x.position(series_index)?;
                Some(BoxGlyph {
                    key: key.clone(),
                    series_index,
                    x: left,
                    width: sub_x.bandwidth(),
                    box_top: y_scale.map(stats.q3),
                    box_bottom: y_scale.map(stats.q1),
                    median: y_scale.map(stats.median),
                    whisker_top: y_scale.map(stats.whisker_high),
                    whisker_bottom: y_scale.map(stats.whisker_low),
                    outliers: stats.outliers.iter().map(|&v| y_scale.map(v)).collect(),
                })
            })
            .collect();

        let x_ticks = years
            .iter()
            .enumerate()
            .filter_map(|(i, &year)| {
                Some(Tick {
                    value: f64::from(year),
                    position: x.center(i)?,
                    label: year.to_string(),
                })
            })
            .collect();

        let facets = result.facets();
        Self {
            title: format!(
                "Peak emission hours over time – {}, {}",
                facets.sub_region, facets.region
            ),
            x_title: config.x_title.clone(),
            y_title: config.y_title.clone(),
            area,
            x_ticks,
            y_ticks: y_ticks(&y_scale, config.y_tick_count),
            y_scale,
            glyphs,
            series: result.series().to_vec(),
        }
    }

    #[must_use]
    pub fn glyph(&self, key: &GroupKey) -> Option<&BoxGlyph> {
        self.glyphs.iter().find(|glyph| glyph.key == *key)
    }

    /// Returns the glyph under screen x coordinate `x`, if any.
    #[must_use]
    pub fn hit_test(&self, x: f64) -> Option<&BoxGlyph> {
        self.glyphs.iter().find(|glyph| glyph.contains_x(x))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

/// One histogram bar.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBar {
    pub low: f64,
    pub high: f64,
    pub count: u64,
    pub x: f64,
    pub width: f64,
    /// Screen y of the bar top; equals `bottom` for an empty bin.
    pub top: f64,
    pub bottom: f64,
}

/// Drill-down histogram of one group.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramScene {
    pub title: String,
    pub x_title: String,
    pub area: PlotArea,
    pub x_ticks: Vec<Tick>,
    pub y_ticks: Vec<Tick>,
    pub bars: Vec<HistogramBar>,
}

impl HistogramScene {
    /// Lays out one bar per bin of `histogram`.
    ///
    /// Bars span their bin edges on x; heights are proportional to counts on
    /// a y axis starting at zero.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn layout(histogram: &Histogram, key: &GroupKey, config: &SceneConfig) -> Self {
        let area = config.plot_area();
        let x_scale = LinearScale::new(histogram.domain(), (area.left, area.right));
        let max_count = histogram.max_count().max(1) as f64;
        let y_domain = nice::nice_domain(0.0, max_count, config.y_tick_count);
        let y_scale = LinearScale::new(y_domain, (area.bottom, area.top));

        let bars = histogram
            .bins
            .iter()
            .map(|bin| {
                let x = x_scale.map(bin.low);
                HistogramBar {
                    low: bin.low,
                    high: bin.high,
                    count: bin.count,
                    x,
                    width: x_scale.map(bin.high) - x,
                    top: y_scale.map(bin.count as f64),
                    bottom: area.bottom,
                }
            })
            .collect::<Vec<_>>();

        let x_ticks = histogram
            .bins
            .iter()
            .map(|bin| bin.low)
            .chain(histogram.bins.last().map(|bin| bin.high))
            .map(|value| Tick {
                value,
                position: x_scale.map(value),
                label: format_value(value),
            })
            .collect();

        // Counts are whole numbers; fractional ticks would be misleading.
        let y_ticks = y_ticks(&y_scale, config.y_tick_count)
            .into_iter()
            .filter(|tick| tick.value.fract() == 0.0)
            .collect();

        Self {
            title: format!("Distribution of {} peak hours in {}", key.series, key.year),
            x_title: config.y_title.clone(),
            area,
            x_ticks,
            y_ticks,
            bars,
        }
    }
}

/// Returns the tooltip text of one group, one line per field.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use airq_analysis::{query::GroupKey, scene::tooltip_lines};
/// use airq_stats::boxplot::BoxPlotStats;
///
/// let key = GroupKey { year: 2000, series: Arc::from("O3 1st Max Hour") };
/// let stats = BoxPlotStats::new([8.0, 9.0, 10.0]).unwrap();
/// let lines = tooltip_lines(&key, &stats);
/// assert_eq!(lines[0], "O3 1st Max Hour");
/// assert_eq!(lines[3], "Median: 9.00");
/// ```
#[must_use]
pub fn tooltip_lines(key: &GroupKey, stats: &BoxPlotStats) -> Vec<String> {
    vec![
        key.series.to_string(),
        format!("Year: {}", key.year),
        format!("Q1: {:.2}", stats.q1),
        format!("Median: {:.2}", stats.median),
        format!("Q3: {:.2}", stats.q3),
        format!("Min: {:.2}", stats.whisker_low),
        format!("Max: {:.2}", stats.whisker_high),
        format!("Outliers: {}", stats.outliers.len()),
    ]
}

fn fit_domain<'a, I>(stats: I, config: &SceneConfig) -> (f64, f64)
where
    I: IntoIterator<Item = &'a BoxPlotStats>,
{
    let extent = stats
        .into_iter()
        .map(BoxPlotStats::extent)
        .reduce(|(lo, hi), (l, h)| (lo.min(l), hi.max(h)));
    let Some((min, max)) = extent else {
        return (0.0, 1.0);
    };
    // Peak hours and concentrations are never negative; keep zero on the axis.
    let min = min.min(0.0);
    if min == max {
        return (min, min + 1.0);
    }
    nice::nice_domain(min, max, config.y_tick_count)
}

fn y_ticks(y_scale: &LinearScale, count: usize) -> Vec<Tick> {
    let (min, max) = y_scale.domain;
    nice::ticks(min.min(max), min.max(max), count)
        .into_iter()
        .map(|value| Tick {
            value,
            position: y_scale.map(value),
            label: format_value(value),
        })
        .collect()
}

fn format_value(value: f64) -> String {
    // Adding zero turns -0.0 into 0.0.
    format!("{}", value + 0.0)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::{
        dataset::{Dataset, Observation},
        selection::{Facets, SeriesSelection},
    };

    fn obs(series: &str, year: i32, value: f64) -> Observation {
        Observation {
            region: Arc::from("Arizona"),
            sub_region: Arc::from("Phoenix"),
            series: Arc::from(series),
            year,
            value: Some(value),
        }
    }

    fn result(selection: SeriesSelection) -> QueryResult {
        let mut observations = vec![];
        for (year, values) in [(2000, [7.0, 8.0, 9.0, 10.0]), (2001, [6.0, 8.0, 10.0, 22.0])] {
            for v in values {
                observations.push(obs("O3", year, v));
                observations.push(obs("CO", year, v + 1.0));
            }
        }
        let dataset = Dataset::new(observations);
        let facets = Facets {
            region: "Arizona".to_owned(),
            sub_region: "Phoenix".to_owned(),
            series: selection,
        };
        QueryResult::compute(&dataset, &facets)
    }

    fn config() -> SceneConfig {
        SceneConfig {
            width: 200.0,
            height: 100.0,
            margin: Margin::ZERO,
            band_padding: 0.0,
            y_domain: Some((0.0, 25.0)),
            ..SceneConfig::default()
        }
    }

    #[test]
    fn test_single_series_boxes_fill_year_bands() {
        let scene = BoxPlotScene::layout(
            &result(SeriesSelection::Single("O3".to_owned())),
            &config(),
        );
        assert_eq!(scene.glyphs.len(), 2);
        assert_eq!(scene.glyphs[0].x, 0.0);
        assert_eq!(scene.glyphs[0].width, 100.0);
        assert_eq!(scene.glyphs[1].x, 100.0);
        assert_eq!(
            scene.x_ticks.iter().map(|t| t.label.as_str()).collect::<Vec<_>>(),
            ["2000", "2001"]
        );
        assert_eq!(scene.x_ticks[0].position, 50.0);
        assert_eq!(scene.title, "Peak emission hours over time – Phoenix, Arizona");
    }

    #[test]
    fn test_vertical_positions() {
        let scene = BoxPlotScene::layout(
            &result(SeriesSelection::Single("O3".to_owned())),
            &config(),
        );
        // 2000: 7, 8, 9, 10 -> Q1 7.75, median 8.5, Q3 9.25.
        let glyph = &scene.glyphs[0];
        assert_abs_diff_eq!(glyph.box_bottom, 100.0 - 7.75 * 4.0);
        assert_abs_diff_eq!(glyph.median, 100.0 - 8.5 * 4.0);
        assert_abs_diff_eq!(glyph.box_top, 100.0 - 9.25 * 4.0);
        assert!(glyph.whisker_top <= glyph.box_top);
        assert!(glyph.box_bottom <= glyph.whisker_bottom);
        assert!(glyph.outliers.is_empty());

        // 2001: 6, 8, 10, 22 -> Q3 13, upper fence 13 + 1.5 * 5.5 = 21.25.
        let glyph = &scene.glyphs[1];
        assert_eq!(glyph.outliers, vec![100.0 - 22.0 * 4.0]);
    }

    #[test]
    fn test_all_series_split_year_bands() {
        let scene = BoxPlotScene::layout(&result(SeriesSelection::All), &config());
        assert_eq!(scene.glyphs.len(), 4);
        assert_eq!(
            scene.series.iter().map(|s| &**s).collect::<Vec<_>>(),
            ["O3", "CO"]
        );
        let keys = scene
            .glyphs
            .iter()
            .map(|g| (g.key.year, &*g.key.series, g.series_index))
            .collect::<Vec<_>>();
        assert_eq!(
            keys,
            [(2000, "O3", 0), (2000, "CO", 1), (2001, "O3", 0), (2001, "CO", 1)]
        );
        // Boxes of one year stay inside the year band and do not overlap.
        let (o3, co) = (&scene.glyphs[0], &scene.glyphs[1]);
        assert!(o3.x >= 0.0);
        assert!(o3.x + o3.width < co.x);
        assert!(co.x + co.width <= 100.0 + 1e-9);
        assert_eq!(scene.hit_test(co.center()).map(|g| &g.key), Some(&co.key));
    }

    #[test]
    fn test_fitted_domain_covers_outliers() {
        let config = SceneConfig {
            y_domain: None,
            ..config()
        };
        let scene = BoxPlotScene::layout(&result(SeriesSelection::All), &config);
        let (min, max) = scene.y_scale.domain;
        assert_eq!(min, 0.0);
        assert!(max >= 23.0);
        assert!(scene.y_ticks.iter().all(|t| t.position >= 0.0 && t.position <= 100.0));
        assert_eq!(scene.y_ticks[0].label, "0");
    }

    #[test]
    fn test_empty_result() {
        let scene = BoxPlotScene::layout(
            &result(SeriesSelection::Single("PM10".to_owned())),
            &SceneConfig::default(),
        );
        assert!(scene.is_empty());
        assert!(scene.x_ticks.is_empty());
        assert_eq!(scene.y_scale.domain, (0.0, 1.0));
    }

    #[test]
    fn test_histogram_scene() {
        let histogram = Histogram::new([0.0, 1.0, 1.5, 3.0], 4).unwrap();
        let key = GroupKey::new(2000, &Arc::from("O3"));
        let config = SceneConfig {
            width: 80.0,
            height: 40.0,
            margin: Margin::ZERO,
            y_tick_count: 2,
            ..SceneConfig::default()
        };
        let scene = HistogramScene::layout(&histogram, &key, &config);
        assert_eq!(scene.bars.len(), 4);
        assert_eq!(scene.bars[0].x, 0.0);
        assert_eq!(scene.bars[0].width, 20.0);
        // The tallest bin (count 2) reaches the top of the nice domain [0, 2].
        assert_eq!(scene.bars[1].count, 2);
        assert_eq!(scene.bars[1].top, 0.0);
        assert_eq!(scene.bars[2].top, scene.bars[2].bottom);
        assert_eq!(
            scene.x_ticks.iter().map(|t| t.label.as_str()).collect::<Vec<_>>(),
            ["0", "1", "2", "3", "4"]
        );
        assert!(scene.y_ticks.iter().all(|t| t.value.fract() == 0.0));
        assert_eq!(scene.title, "Distribution of O3 peak hours in 2000");
    }

    #[test]
    fn test_tooltip_lines() {
        let key = GroupKey::new(2001, &Arc::from("CO"));
        let stats = BoxPlotStats::new([6.0, 8.0, 10.0, 22.0]).unwrap();
        assert_eq!(
            tooltip_lines(&key, &stats),
            [
                "CO",
                "Year: 2001",
                "Q1: 7.50",
                "Median: 9.00",
                "Q3: 13.00",
                "Min: 6.00",
                "Max: 13.00",
                "Outliers: 1",
            ]
        );
    }
}
