use std::path::PathBuf;

use airq_analysis::query::QueryResult;
use tracing::info;

use crate::{
    command::args::{DatasetArg, FacetArg, SceneArg},
    schema::export::QueryExport,
    util::Output,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ExportArg {
    #[clap(flatten)]
    dataset: DatasetArg,
    #[clap(flatten)]
    facets: FacetArg,
    #[clap(flatten)]
    scene: SceneArg,

    /// Output file path (stdout if omitted)
    #[arg(long, short)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &ExportArg) -> anyhow::Result<()> {
    let dataset = arg.dataset.load()?;
    let facets = arg.facets.resolve(&dataset)?;
    let result = QueryResult::compute(&dataset, &facets);

    let export = QueryExport::from_result(&result, arg.scene.bucket_count())?;
    info!(groups = export.groups.len(), "exporting statistics");

    Output::save_json(&export, arg.output.clone())?;
    Ok(())
}
