//! Box plot statistics as a text table.

use airq_analysis::query::QueryResult;
use tracing::info;

use crate::command::{
    args::{DatasetArg, FacetArg},
    table::{self, StatsTableRow},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SummaryArg {
    #[clap(flatten)]
    dataset: DatasetArg,
    #[clap(flatten)]
    facets: FacetArg,
}

pub(crate) fn run(arg: &SummaryArg) -> anyhow::Result<()> {
    let dataset = arg.dataset.load()?;
    let facets = arg.facets.resolve(&dataset)?;
    let result = QueryResult::compute(&dataset, &facets);
    info!(groups = result.len(), "computed statistics");

    println!(
        "Peak Hour Summary: {}, {} ({})",
        facets.sub_region, facets.region, facets.series
    );
    println!("==========================================\n");

    if result.is_empty() {
        println!("No data for this selection.");
        return Ok(());
    }

    table::print_legend();
    println!();

    let rows = result
        .keys_by_year()
        .into_iter()
        .filter_map(|key| Some(StatsTableRow::new(key, result.get(key)?)))
        .collect();
    table::print_stats_table(rows);

    Ok(())
}
