//! Statistical building blocks for the airq dashboard.
//!
//! This crate provides:
//!
//! - **Percentiles**: linear-interpolated quantiles over sorted data
//! - **Box plot statistics**: quartiles, whiskers and outliers for one group of values
//! - **Nice numbers**: round steps for bin boundaries and axis ticks
//! - **Histograms**: fixed-count, equal-width binning over a rounded domain
//!
//! Every function treats NaN and infinite values as missing data.
//!
//! # Modules
//!
//! - [`percentiles`]: Quantile computation
//! - [`boxplot`]: Box-and-whisker summary statistics
//! - [`nice`]: Round-number steps and ticks
//! - [`histogram`]: Histogram construction for drill-down views
//!
//! # Examples
//!
//! ## Computing box plot statistics
//!
//! ```
//! use airq_stats::boxplot::BoxPlotStats;
//!
//! let values = [7.0, 8.0, 8.0, 9.0, 10.0, 23.0];
//! let stats = BoxPlotStats::new(values).unwrap();
//! assert_eq!(stats.median, 8.5);
//! assert_eq!(stats.outliers, vec![23.0]);
//! ```
//!
//! ## Creating a histogram
//!
//! ```
//! use airq_stats::histogram::Histogram;
//!
//! let hours = [0.0, 3.0, 7.0, 8.0, 9.0, 13.0, 23.0];
//! let histogram = Histogram::new(hours, 12).unwrap();
//! assert_eq!(histogram.domain(), (0.0, 24.0));
//! assert_eq!(histogram.total_count(), 7);
//! ```

pub mod boxplot;
pub mod histogram;
pub mod nice;
pub mod percentiles;
