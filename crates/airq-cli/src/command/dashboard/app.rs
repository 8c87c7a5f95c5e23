use std::sync::Arc;

use airq_analysis::{
    dataset::Dataset,
    query::{DrillDownError, GroupKey, QueryResult},
    scene::{BoxPlotScene, HistogramScene, Margin, SceneConfig},
    selection::{Facets, SeriesSelection},
};
use airq_stats::histogram::Histogram;
use crossterm::event::{Event, KeyCode, KeyEventKind};
use ratatui::{Frame, layout::Rect};
use tracing::{debug, warn};

use crate::{command::dashboard::view, tui::App};

/// Space kept free inside a chart pane for tick labels.
const CHART_MARGIN: Margin = Margin {
    top: 1.0,
    right: 1.0,
    bottom: 2.0,
    left: 6.0,
};

/// Which pane receives `↑/↓`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Focus {
    State,
    City,
    Pollutant,
    Plot,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Self::State => Self::City,
            Self::City => Self::Pollutant,
            Self::Pollutant => Self::Plot,
            Self::Plot => Self::State,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::State => Self::Plot,
            Self::City => Self::State,
            Self::Pollutant => Self::City,
            Self::Plot => Self::Pollutant,
        }
    }
}

/// Dashboard state.
///
/// Every selection change re-runs the query on the dataset and lays out new
/// scenes; [`DashboardApp::draw`] only reads them.
#[derive(Debug)]
pub(crate) struct DashboardApp {
    dataset: Dataset,
    bucket_count: usize,
    base_config: SceneConfig,
    viewport: Rect,
    states: Vec<Arc<str>>,
    cities: Vec<Arc<str>>,
    pollutants: Vec<SeriesSelection>,
    facets: Facets,
    focus: Focus,
    result: QueryResult,
    cursor: usize,
    box_scene: BoxPlotScene,
    histogram: Option<Result<Histogram, DrillDownError>>,
    histogram_scene: Option<HistogramScene>,
    should_exit: bool,
}

impl DashboardApp {
    pub(crate) fn new(
        dataset: Dataset,
        facets: Facets,
        bucket_count: usize,
        base_config: SceneConfig,
        viewport: Rect,
    ) -> Self {
        let states = dataset.regions();
        let cities = dataset.sub_regions(&facets.region);
        let pollutants = std::iter::once(SeriesSelection::All)
            .chain(
                dataset
                    .series()
                    .iter()
                    .map(|series| SeriesSelection::Single(series.to_string())),
            )
            .collect();
        let result = QueryResult::compute(&dataset, &facets);
        let box_scene = BoxPlotScene::layout(&result, &base_config);

        let mut app = Self {
            dataset,
            bucket_count,
            base_config,
            viewport,
            states,
            cities,
            pollutants,
            facets,
            focus: Focus::State,
            result,
            cursor: 0,
            box_scene,
            histogram: None,
            histogram_scene: None,
            should_exit: false,
        };
        app.relayout();
        app
    }

    #[cfg(test)]
    pub(crate) fn facets(&self) -> &Facets {
        &self.facets
    }

    pub(crate) fn focus(&self) -> Focus {
        self.focus
    }

    pub(crate) fn states(&self) -> &[Arc<str>] {
        &self.states
    }

    pub(crate) fn cities(&self) -> &[Arc<str>] {
        &self.cities
    }

    pub(crate) fn pollutants(&self) -> &[SeriesSelection] {
        &self.pollutants
    }

    pub(crate) fn state_index(&self) -> Option<usize> {
        self.states
            .iter()
            .position(|state| **state == *self.facets.region)
    }

    pub(crate) fn city_index(&self) -> Option<usize> {
        self.cities
            .iter()
            .position(|city| **city == *self.facets.sub_region)
    }

    pub(crate) fn pollutant_index(&self) -> Option<usize> {
        self.pollutants
            .iter()
            .position(|pollutant| *pollutant == self.facets.series)
    }

    pub(crate) fn result(&self) -> &QueryResult {
        &self.result
    }

    pub(crate) fn box_scene(&self) -> &BoxPlotScene {
        &self.box_scene
    }

    pub(crate) fn histogram(&self) -> Option<&Result<Histogram, DrillDownError>> {
        self.histogram.as_ref()
    }

    pub(crate) fn histogram_scene(&self) -> Option<&HistogramScene> {
        self.histogram_scene.as_ref()
    }

    /// Returns the group under the plot cursor.
    pub(crate) fn selected_key(&self) -> Option<&GroupKey> {
        self.box_scene
            .glyphs
            .get(self.cursor)
            .map(|glyph| &glyph.key)
    }

    pub(crate) fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_exit = true,
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.prev(),
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::Left => self.move_cursor(-1),
            KeyCode::Right => self.move_cursor(1),
            _ => {}
        }
    }

    /// Recomputes the chart layout for a new terminal size.
    pub(crate) fn resize(&mut self, viewport: Rect) {
        self.viewport = viewport;
        self.relayout();
    }

    fn move_selection(&mut self, delta: isize) {
        match self.focus {
            Focus::State => {
                if let Some(idx) = step(self.state_index(), delta, self.states.len()) {
                    let state = Arc::clone(&self.states[idx]);
                    self.facets = self.facets.clone().with_region(&self.dataset, &state);
                    self.cities = self.dataset.sub_regions(&state);
                    self.refresh();
                }
            }
            Focus::City => {
                if let Some(idx) = step(self.city_index(), delta, self.cities.len()) {
                    self.facets.sub_region = self.cities[idx].to_string();
                    self.refresh();
                }
            }
            Focus::Pollutant => {
                if let Some(idx) = step(self.pollutant_index(), delta, self.pollutants.len()) {
                    self.facets.series = self.pollutants[idx].clone();
                    self.refresh();
                }
            }
            Focus::Plot => self.move_cursor(delta),
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.box_scene.glyphs.len();
        if len == 0 {
            return;
        }
        let cursor = self.cursor.saturating_add_signed(delta).min(len - 1);
        if cursor != self.cursor {
            self.cursor = cursor;
            self.drill_down();
        }
    }

    /// Re-runs the query for the current facets.
    ///
    /// The cursor stays on the same group when the new result still has it.
    fn refresh(&mut self) {
        let previous = self.selected_key().cloned();
        self.result = QueryResult::compute(&self.dataset, &self.facets);
        if self.result.is_empty() {
            warn!(
                state = %self.facets.region,
                city = %self.facets.sub_region,
                pollutant = %self.facets.series,
                "selection has no data"
            );
        }
        self.cursor = previous
            .and_then(|key| {
                self.result
                    .keys_by_year()
                    .iter()
                    .position(|candidate| **candidate == key)
            })
            .unwrap_or(0);
        self.relayout();
    }

    fn relayout(&mut self) {
        let panes = view::DashboardLayout::new(self.viewport);
        self.box_scene = BoxPlotScene::layout(
            &self.result,
            &self.chart_config(view::chart_area(panes.plot)),
        );
        self.cursor = self
            .cursor
            .min(self.box_scene.glyphs.len().saturating_sub(1));
        self.drill_down();
    }

    fn drill_down(&mut self) {
        let panes = view::DashboardLayout::new(self.viewport);
        let config = self.chart_config(view::chart_area(panes.histogram));
        let Some(key) = self.selected_key().cloned() else {
            self.histogram = None;
            self.histogram_scene = None;
            return;
        };
        debug!(%key, buckets = self.bucket_count, "drilling down");
        let histogram = self.result.drill_down(&key, self.bucket_count);
        self.histogram_scene = histogram
            .as_ref()
            .ok()
            .map(|histogram| HistogramScene::layout(histogram, &key, &config));
        self.histogram = Some(histogram);
    }

    fn chart_config(&self, area: Rect) -> SceneConfig {
        SceneConfig {
            width: f64::from(area.width),
            height: f64::from(area.height),
            margin: CHART_MARGIN,
            y_tick_count: usize::from(area.height / 3).max(2),
            ..self.base_config.clone()
        }
    }
}

impl App for DashboardApp {
    fn should_exit(&self) -> bool {
        self.should_exit
    }

    fn handle_event(&mut self, event: &Event) {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => self.handle_key(key.code),
            Event::Resize(width, height) => self.resize(Rect::new(0, 0, *width, *height)),
            _ => {}
        }
    }

    fn draw(&self, frame: &mut Frame) {
        view::draw(self, frame);
    }
}

/// Moves a list selection by `delta`, wrapping around.
fn step(current: Option<usize>, delta: isize, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let Some(current) = current else {
        return Some(0);
    };
    let len = isize::try_from(len).ok()?;
    let current = isize::try_from(current).ok()?;
    usize::try_from((current + delta).rem_euclid(len)).ok()
}
