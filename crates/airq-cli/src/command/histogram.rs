//! Drill-down histograms as text.

use airq_analysis::query::QueryResult;
use anyhow::bail;
use tracing::info;

use crate::command::{
    args::{DatasetArg, FacetArg, SceneArg},
    table,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct HistogramArg {
    #[clap(flatten)]
    dataset: DatasetArg,
    #[clap(flatten)]
    facets: FacetArg,
    #[clap(flatten)]
    scene: SceneArg,

    /// Year to bin
    #[arg(long)]
    year: i32,
}

pub(crate) fn run(arg: &HistogramArg) -> anyhow::Result<()> {
    let dataset = arg.dataset.load()?;
    let facets = arg.facets.resolve(&dataset)?;
    let result = QueryResult::compute(&dataset, &facets);

    let keys = result
        .keys_by_year()
        .into_iter()
        .filter(|key| key.year == arg.year)
        .collect::<Vec<_>>();
    if keys.is_empty() {
        bail!(
            "No {} data for {} in {}, {}",
            facets.series,
            arg.year,
            facets.sub_region,
            facets.region
        );
    }

    for key in keys {
        let histogram = result.drill_down(key, arg.scene.bucket_count())?;
        info!(%key, bins = histogram.bins.len(), "binned group");

        println!("{key} ({}, {})", facets.sub_region, facets.region);
        println!("==========================================\n");
        table::print_histogram_table(&histogram);
        println!();
    }

    Ok(())
}
