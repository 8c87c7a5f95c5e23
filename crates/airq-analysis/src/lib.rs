//! Faceted box plot analysis of air-pollution readings
//!
//! This crate turns a loaded dataset into what the dashboard draws: per-year,
//! per-series box plot statistics, drill-down histograms, and screen-space
//! scenes for both.
//!
//! # Overview
//!
//! 1. **Load** ([`dataset::Dataset`]): read a wide CSV table into observations
//! 2. **Select** ([`selection::Facets`]): pick a region, a sub-region and a
//!    [`selection::SeriesSelection`]
//! 3. **Query** ([`query::QueryResult`]): filter, group by (year, series) and
//!    summarize each group ([`aggregate`])
//! 4. **Drill down** ([`query::QueryResult::drill_down`]): bin the raw values
//!    of one group
//! 5. **Lay out** ([`scene`]): map statistics and bins to positioned shapes
//!
//! Every step is a pure function of its inputs. The dataset is passed
//! explicitly; nothing is cached between queries.
//!
//! # Examples
//!
//! ```
//! use airq_analysis::{
//!     dataset::{Dataset, DatasetSchema},
//!     query::QueryResult,
//!     scene::{BoxPlotScene, SceneConfig},
//!     selection::Facets,
//! };
//!
//! let csv = "\
//! Date,State,City,O3 1st Max Hour,CO 1st Max Hour,SO2 1st Max Hour,NO2 1st Max Hour
//! 2000-01-01,Arizona,Phoenix,9,23,21,19
//! 2000-01-02,Arizona,Phoenix,10,0,,8
//! 2001-01-01,Arizona,Phoenix,11,6,3,20
//! ";
//! let dataset = Dataset::from_csv_reader(csv.as_bytes(), &DatasetSchema::default())?;
//! let facets = Facets::default_for(&dataset).expect("dataset is not empty");
//!
//! let result = QueryResult::compute(&dataset, &facets);
//! assert_eq!(result.years(), [2000, 2001]);
//!
//! let key = result.keys_by_year()[0].clone();
//! let histogram = result.drill_down(&key, 12)?;
//! assert_eq!(histogram.bins.len(), 12);
//!
//! let scene = BoxPlotScene::layout(&result, &SceneConfig::default());
//! assert_eq!(scene.glyphs.len(), result.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod aggregate;
pub mod dataset;
pub mod query;
pub mod scale;
pub mod scene;
pub mod selection;
