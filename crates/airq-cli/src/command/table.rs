//! Box plot statistics and histogram table display
//!
//! Shared by the text subcommands so both print groups in the same layout.

use airq_analysis::query::GroupKey;
use airq_stats::{boxplot::BoxPlotStats, histogram::Histogram};

/// Width of the widest histogram bar, in characters.
const BAR_WIDTH: usize = 40;

/// A row in the statistics table
pub(super) struct StatsTableRow<'a> {
    pub key: &'a GroupKey,
    pub stats: &'a BoxPlotStats,
}

impl<'a> StatsTableRow<'a> {
    pub(super) fn new(key: &'a GroupKey, stats: &'a BoxPlotStats) -> Self {
        Self { key, stats }
    }
}

fn print_stats_table_header() {
    println!(
        "  {:<6} {:<20} {:>6} {:>8} {:>8} {:>8} {:>8} {:>8} {:>9}",
        "Year", "Pollutant", "N", "Min", "Q1", "Median", "Q3", "Max", "Outliers",
    );
}

fn print_stats_table_separator() {
    // year(6) + pollutant(20) + n(6) + 5 * value(8) + outliers(9) + spaces(8)
    println!("  {}", "-".repeat(89));
}

fn print_stats_table_row(row: &StatsTableRow) {
    let stats = row.stats;
    println!(
        "  {:<6} {:<20} {:>6} {:>8.2} {:>8.2} {:>8.2} {:>8.2} {:>8.2} {:>9}",
        row.key.year,
        row.key.series,
        stats.count,
        stats.whisker_low,
        stats.q1,
        stats.median,
        stats.q3,
        stats.whisker_high,
        stats.outliers.len(),
    );
}

/// Print a formatted statistics table, one row per group
pub(super) fn print_stats_table(rows: Vec<StatsTableRow>) {
    print_stats_table_header();
    print_stats_table_separator();

    for row in rows {
        print_stats_table_row(&row);
    }
}

/// Print legend explaining table columns
pub(super) fn print_legend() {
    println!("Legend:");
    println!("  N        : Number of readings in the group");
    println!("  Min/Max  : Whisker ends (most extreme readings within 1.5 IQR of the box)");
    println!("  Q1/Q3    : First and third quartiles (linear interpolation)");
    println!("  Outliers : Readings beyond the whiskers");
}

/// Print one line per bin with a bar scaled to the fullest bin
pub(super) fn print_histogram_table(histogram: &Histogram) {
    println!("  {:>17} {:>7}", "Range", "Count");
    println!("  {}", "-".repeat(27 + BAR_WIDTH));

    let max_count = histogram.max_count();
    let last = histogram.bins.len().saturating_sub(1);
    for (i, bin) in histogram.bins.iter().enumerate() {
        let close = if i == last { ']' } else { ')' };
        let range = format!("[{}, {}{close}", bin.low, bin.high);
        println!(
            "  {range:>17} {:>7}  {}",
            bin.count,
            bar(bin.count, max_count, BAR_WIDTH)
        );
    }
    println!("  Total: {}", histogram.total_count());
}

/// Returns a bar of `#` proportional to `count / max`.
///
/// Non-zero counts always get at least one character.
fn bar(count: u64, max: u64, width: usize) -> String {
    if count == 0 || max == 0 {
        return String::new();
    }
    let width_u64 = u64::try_from(width).unwrap_or(u64::MAX);
    let len = count.saturating_mul(width_u64).div_ceil(max).min(width_u64);
    "#".repeat(usize::try_from(len).unwrap_or(width))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar() {
        assert_eq!(bar(0, 10, 40), "");
        assert_eq!(bar(3, 0, 40), "");
        assert_eq!(bar(10, 10, 40).len(), 40);
        assert_eq!(bar(5, 10, 40).len(), 20);
        assert_eq!(bar(1, 1000, 40), "#");
    }
}
