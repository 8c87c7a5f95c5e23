use anyhow::Context as _;
use ratatui::layout::Rect;
use tracing::info;

use crate::{
    command::args::{DatasetArg, FacetArg, SceneArg},
    tui::Runtime,
};

use self::app::DashboardApp;

mod app;
mod view;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct DashboardArg {
    #[clap(flatten)]
    dataset: DatasetArg,
    #[clap(flatten)]
    facets: FacetArg,
    #[clap(flatten)]
    scene: SceneArg,
}

pub(crate) fn run(arg: &DashboardArg) -> anyhow::Result<()> {
    let DashboardArg {
        dataset,
        facets,
        scene,
    } = arg;

    let dataset = dataset.load()?;
    let facets = facets.resolve(&dataset)?;
    let (width, height) =
        crossterm::terminal::size().context("Failed to query terminal size")?;

    info!(
        state = %facets.region,
        city = %facets.sub_region,
        pollutant = %facets.series,
        "starting dashboard"
    );
    let mut app = DashboardApp::new(
        dataset,
        facets,
        scene.bucket_count(),
        scene.scene_config(),
        Rect::new(0, 0, width, height),
    );
    Runtime::new()
        .run(&mut app)
        .context("Terminal dashboard failed")?;

    Ok(())
}
