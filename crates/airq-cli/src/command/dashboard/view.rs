use airq_analysis::{
    query::GroupKey,
    scene::{BoxPlotScene, HistogramScene, PlotArea, Tick, tooltip_lines},
};
use ratatui::{
    Frame,
    buffer::Buffer,
    layout::{Constraint, Layout, Rect, Spacing},
    style::{Color, Modifier, Style},
    symbols::{Marker, merge::MergeStrategy},
    text::{Line, Span, Text},
    widgets::{
        Block, List, ListItem, ListState, Paragraph, StatefulWidget, Widget,
        canvas::{Canvas, Context, Line as CanvasLine, Points, Rectangle},
    },
};

use crate::command::dashboard::app::{DashboardApp, Focus};

const AXIS_COLOR: Color = Color::DarkGray;
const CURSOR_COLOR: Color = Color::Yellow;

/// d3 `schemeCategory10`, for series without a fixed colour.
const CATEGORY10: [Color; 10] = [
    Color::Rgb(0x1f, 0x77, 0xb4),
    Color::Rgb(0xff, 0x7f, 0x0e),
    Color::Rgb(0x2c, 0xa0, 0x2c),
    Color::Rgb(0xd6, 0x27, 0x28),
    Color::Rgb(0x94, 0x67, 0xbd),
    Color::Rgb(0x8c, 0x56, 0x4b),
    Color::Rgb(0xe3, 0x77, 0xc2),
    Color::Rgb(0x7f, 0x7f, 0x7f),
    Color::Rgb(0xbc, 0xbd, 0x22),
    Color::Rgb(0x17, 0xbe, 0xcf),
];

/// Returns the colour of a series, keyed by the pollutant name it starts with.
pub(crate) fn series_color(series: &str, index: usize) -> Color {
    match series.split_whitespace().next() {
        Some("O3") => Color::Rgb(0x2c, 0xa0, 0x2c),
        Some("CO") => Color::Rgb(0x8b, 0x45, 0x13),
        Some("SO2") => Color::Rgb(0x1f, 0x77, 0xb4),
        Some("NO2") => Color::Rgb(0xd6, 0x27, 0x28),
        _ => CATEGORY10[index % CATEGORY10.len()],
    }
}

/// Pane rectangles of the dashboard.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DashboardLayout {
    pub state: Rect,
    pub city: Rect,
    pub pollutant: Rect,
    pub plot: Rect,
    pub histogram: Rect,
    pub tooltip: Rect,
    pub help: Rect,
}

impl DashboardLayout {
    pub(crate) fn new(area: Rect) -> Self {
        // Layout: main area + help line at bottom
        let [main_area, help] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(area);

        let [left_area, right_area] =
            Layout::horizontal([Constraint::Length(28), Constraint::Fill(1)])
                .spacing(Spacing::Overlap(1))
                .areas(main_area);

        let [state, city, pollutant] = Layout::vertical([
            Constraint::Fill(2),
            Constraint::Fill(2),
            Constraint::Fill(1),
        ])
        .spacing(Spacing::Overlap(1))
        .areas(left_area);

        let [plot, bottom_area] =
            Layout::vertical([Constraint::Percentage(60), Constraint::Fill(1)])
                .spacing(Spacing::Overlap(1))
                .areas(right_area);

        let [histogram, tooltip] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Length(28)])
                .spacing(Spacing::Overlap(1))
                .areas(bottom_area);

        Self {
            state,
            city,
            pollutant,
            plot,
            histogram,
            tooltip,
            help,
        }
    }
}

/// Returns the drawable area of a bordered chart pane.
pub(crate) fn chart_area(pane: Rect) -> Rect {
    Block::bordered().inner(pane)
}

pub(crate) fn draw(app: &DashboardApp, frame: &mut Frame) {
    let panes = DashboardLayout::new(frame.area());

    let state_list = Selector {
        title: "State",
        items: app.states().iter().map(ToString::to_string).collect(),
        selected: app.state_index(),
        focused: app.focus() == Focus::State,
    };
    let city_list = Selector {
        title: "City",
        items: app.cities().iter().map(ToString::to_string).collect(),
        selected: app.city_index(),
        focused: app.focus() == Focus::City,
    };
    let pollutant_list = Selector {
        title: "Pollutant",
        items: app.pollutants().iter().map(ToString::to_string).collect(),
        selected: app.pollutant_index(),
        focused: app.focus() == Focus::Pollutant,
    };

    let selected_key = app.selected_key();
    let box_plot = BoxPlotChart {
        scene: app.box_scene(),
        selected: selected_key,
        focused: app.focus() == Focus::Plot,
    };
    let histogram = HistogramChart {
        scene: app.histogram_scene(),
        message: match app.histogram() {
            None => "No group selected".to_owned(),
            Some(Ok(_)) => String::new(),
            Some(Err(err)) => err.to_string(),
        },
    };
    let tooltip = Tooltip {
        lines: selected_key
            .and_then(|key| Some(tooltip_lines(key, app.result().get(key)?)))
            .unwrap_or_default(),
    };

    frame.render_widget(state_list, panes.state);
    frame.render_widget(city_list, panes.city);
    frame.render_widget(pollutant_list, panes.pollutant);
    frame.render_widget(box_plot, panes.plot);
    frame.render_widget(histogram, panes.histogram);
    frame.render_widget(tooltip, panes.tooltip);

    let help_text =
        Text::from("Tab/Shift-Tab: Focus | ↑/↓: Select | ←/→: Group | q/Esc: Quit")
            .style(Style::default().fg(Color::DarkGray))
            .centered();
    frame.render_widget(help_text, panes.help);
}

fn pane_block(title: impl Into<Line<'static>>, focused: bool) -> Block<'static> {
    let border_style = if focused {
        Style::default().fg(CURSOR_COLOR)
    } else {
        Style::default()
    };
    let title: Line<'static> = title.into();
    Block::bordered()
        .title(title)
        .border_style(border_style)
        .merge_borders(MergeStrategy::Exact)
}

struct Selector {
    title: &'static str,
    items: Vec<String>,
    selected: Option<usize>,
    focused: bool,
}

impl Widget for Selector {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let list = List::new(self.items.into_iter().map(ListItem::new))
            .block(pane_block(self.title, self.focused))
            .highlight_style(
                Style::default()
                    .fg(CURSOR_COLOR)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol(">> ");

        let mut list_state = ListState::default();
        list_state.select(self.selected);

        StatefulWidget::render(list, area, buf, &mut list_state);
    }
}

struct BoxPlotChart<'a> {
    scene: &'a BoxPlotScene,
    selected: Option<&'a GroupKey>,
    focused: bool,
}

impl Widget for BoxPlotChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let scene = self.scene;
        let legend = scene
            .series
            .iter()
            .enumerate()
            .flat_map(|(i, series)| {
                [
                    Span::styled("■ ", Style::default().fg(series_color(series, i))),
                    Span::raw(format!("{series}  ")),
                ]
            })
            .collect::<Vec<_>>();
        let block = pane_block(scene.title.clone(), self.focused)
            .title_bottom(Line::from(legend))
            .title_bottom(
                Line::from(format!("{} by {}", scene.y_title, scene.x_title)).right_aligned(),
            );

        if scene.is_empty() {
            Paragraph::new("No data for this selection")
                .centered()
                .block(block)
                .render(area, buf);
            return;
        }

        let inner = block.inner(area);
        let height = f64::from(inner.height);
        let canvas = Canvas::default()
            .block(block)
            .marker(Marker::Braille)
            .x_bounds([0.0, f64::from(inner.width)])
            .y_bounds([0.0, height])
            .paint(|ctx| {
                draw_axes(ctx, scene.area, height, &scene.x_ticks, &scene.y_ticks);
                for glyph in &scene.glyphs {
                    let color = if Some(&glyph.key) == self.selected {
                        CURSOR_COLOR
                    } else {
                        series_color(&glyph.key.series, glyph.series_index)
                    };
                    let flip = |y: f64| height - y;
                    let center = glyph.center();
                    let right = glyph.x + glyph.width;

                    ctx.draw(&Rectangle {
                        x: glyph.x,
                        y: flip(glyph.box_bottom),
                        width: glyph.width,
                        height: glyph.box_bottom - glyph.box_top,
                        color,
                    });
                    ctx.draw(&CanvasLine::new(
                        glyph.x,
                        flip(glyph.median),
                        right,
                        flip(glyph.median),
                        Color::White,
                    ));
                    for (from, to) in [
                        (glyph.box_top, glyph.whisker_top),
                        (glyph.box_bottom, glyph.whisker_bottom),
                    ] {
                        ctx.draw(&CanvasLine::new(center, flip(from), center, flip(to), color));
                        ctx.draw(&CanvasLine::new(
                            glyph.x + glyph.width / 4.0,
                            flip(to),
                            right - glyph.width / 4.0,
                            flip(to),
                            color,
                        ));
                    }
                    let outliers = glyph
                        .outliers
                        .iter()
                        .map(|&y| (center, flip(y)))
                        .collect::<Vec<_>>();
                    ctx.draw(&Points {
                        coords: &outliers,
                        color: Color::Red,
                    });
                }
            });
        canvas.render(area, buf);
    }
}

struct HistogramChart<'a> {
    scene: Option<&'a HistogramScene>,
    message: String,
}

impl Widget for HistogramChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let Some(scene) = self.scene else {
            Paragraph::new(self.message)
                .centered()
                .block(pane_block("Distribution", false))
                .render(area, buf);
            return;
        };

        let block = pane_block(scene.title.clone(), false)
            .title_bottom(Line::from(format!("Count by {}", scene.x_title)).right_aligned());
        let inner = block.inner(area);
        let height = f64::from(inner.height);
        let canvas = Canvas::default()
            .block(block)
            .marker(Marker::Braille)
            .x_bounds([0.0, f64::from(inner.width)])
            .y_bounds([0.0, height])
            .paint(|ctx| {
                draw_axes(ctx, scene.area, height, &scene.x_ticks, &scene.y_ticks);
                for bar in scene.bars.iter().filter(|bar| bar.count > 0) {
                    ctx.draw(&Rectangle {
                        x: bar.x,
                        y: height - bar.bottom,
                        width: bar.width,
                        height: bar.bottom - bar.top,
                        color: Color::Cyan,
                    });
                }
            });
        canvas.render(area, buf);
    }
}

struct Tooltip {
    lines: Vec<String>,
}

impl Widget for Tooltip {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let text = if self.lines.is_empty() {
            vec![Line::raw("  No group selected")]
        } else {
            self.lines
                .into_iter()
                .map(|line| Line::raw(format!("  {line}")))
                .collect()
        };
        Paragraph::new(text)
            .block(pane_block("Group", false))
            .render(area, buf);
    }
}

/// Draws both axis lines and their tick labels.
///
/// Scene y coordinates grow downward; the canvas grows upward.
fn draw_axes(ctx: &mut Context, area: PlotArea, height: f64, x_ticks: &[Tick], y_ticks: &[Tick]) {
    let flip = |y: f64| height - y;
    ctx.draw(&CanvasLine::new(
        area.left,
        flip(area.bottom),
        area.right,
        flip(area.bottom),
        AXIS_COLOR,
    ));
    ctx.draw(&CanvasLine::new(
        area.left,
        flip(area.top),
        area.left,
        flip(area.bottom),
        AXIS_COLOR,
    ));
    for tick in y_ticks {
        ctx.print(
            0.0,
            flip(tick.position),
            Line::styled(tick.label.clone(), Style::default().fg(AXIS_COLOR)),
        );
    }
    let mut next_free = f64::NEG_INFINITY;
    for tick in x_ticks {
        // Labels are one cell per character; skip those that would overlap.
        #[expect(clippy::cast_precision_loss)]
        let half = tick.label.chars().count() as f64 / 2.0;
        let x = tick.position - half;
        if x < next_free {
            continue;
        }
        next_free = tick.position + half + 1.0;
        ctx.print(
            x.max(0.0),
            flip(area.bottom) - 1.0,
            Line::styled(tick.label.clone(), Style::default().fg(AXIS_COLOR)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_colors() {
        assert_eq!(series_color("O3 1st Max Hour", 3), Color::Rgb(0x2c, 0xa0, 0x2c));
        assert_eq!(series_color("NO2", 0), Color::Rgb(0xd6, 0x27, 0x28));
        assert_eq!(series_color("PM10", 1), CATEGORY10[1]);
        assert_eq!(series_color("", 11), CATEGORY10[1]);
    }

    #[test]
    fn test_layout_covers_terminal() {
        let panes = DashboardLayout::new(Rect::new(0, 0, 120, 40));
        assert_eq!(panes.help.y, 39);
        assert_eq!(panes.state.x, 0);
        assert!(panes.plot.x > panes.state.x);
        assert!(panes.histogram.y > panes.plot.y);
        assert_eq!(
            chart_area(panes.plot).width,
            panes.plot.width.saturating_sub(2)
        );
    }
}
