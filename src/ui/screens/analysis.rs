use crate::app::{AnalysisState, AnalysisStatus, ChatEntry};
use crate::logic::calculations::{recent_rain, tail, EXPLANATION_WINDOW_DAYS};
use crate::logic::explain::{recommend, why};
use crate::logic::generator::SERIES_DAYS;
use crate::logic::scoring::display_stress;
use crate::logic::snapshot;
use crate::models::{FilterState, IrrigationAdvice, Parcel, SignalPoint};
use crate::ui::components::{et_gauge, ndvi_gauge, rain_gauge, stress_gauge, FactorBars};
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Sparkline, Widget, Wrap,
    },
};

pub struct AnalysisScreen<'a> {
    pub parcel: Option<&'a Parcel>,
    pub filters: &'a FilterState,
    pub state: &'a AnalysisState,
    pub backend_available: bool,
}

impl<'a> AnalysisScreen<'a> {
    pub fn new(
        parcel: Option<&'a Parcel>,
        filters: &'a FilterState,
        state: &'a AnalysisState,
    ) -> Self {
        Self {
            parcel,
            filters,
            state,
            backend_available: false,
        }
    }

    pub fn with_backend(mut self, available: bool) -> Self {
        self.backend_available = available;
        self
    }

    /// Backend risk when present, otherwise the snapshot stress under the scenario.
    fn shown_stress(&self, snap: &SignalPoint) -> u8 {
        match &self.state.prediction {
            Some(prediction) => prediction.display_stress(),
            None => display_stress(snap.stress, self.filters.rain_factor),
        }
    }

    fn advice(&self, parcel: &Parcel, snap: &SignalPoint) -> IrrigationAdvice {
        match &self.state.remote_advice {
            Some(advice) => advice.clone(),
            None => recommend(parcel, snap, self.filters.rain_factor),
        }
    }
}

impl Widget for AnalysisScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),  // Title
                Constraint::Length(4),  // KPIs
                Constraint::Length(14), // Trends and explanation
                Constraint::Min(8),     // Advice and chat
                Constraint::Length(1),  // Nav
            ])
            .split(area);

        let nav = Theme::nav_bar(&[
            ("c", "Ask"),
            ("[ ]", "Scenario"),
            ("1", "Parcels"),
            ("Esc", "Back"),
        ]);
        Paragraph::new(nav).render(chunks[4], buf);

        let Some(parcel) = self.parcel else {
            Paragraph::new(Span::styled("Analysis", Theme::title())).render(chunks[0], buf);
            Paragraph::new(Span::styled(
                "Select a parcel on the dashboard to analyze it.",
                Theme::dim(),
            ))
            .render(chunks[1], buf);
            return;
        };

        self.render_title(parcel, chunks[0], buf);

        let Some(snap) = snapshot(parcel, self.filters.from, self.filters.to) else {
            Paragraph::new(Span::styled("No data for this parcel.", Theme::dim()))
                .render(chunks[1], buf);
            return;
        };

        self.render_kpis(parcel, snap, chunks[1], buf);

        let middle = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(chunks[2]);
        self.render_trends(parcel, middle[0], buf);
        self.render_why(parcel, snap, middle[1], buf);

        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(chunks[3]);
        self.render_advice(parcel, snap, bottom[0], buf);
        self.render_chat(bottom[1], buf);
    }
}

impl AnalysisScreen<'_> {
    fn render_title(&self, parcel: &Parcel, area: Rect, buf: &mut Buffer) {
        let mut spans = vec![
            Span::styled(parcel.name.as_str(), Theme::title()),
            Span::styled(
                format!(
                    " ({}) {}, {} | {} | {}",
                    parcel.id,
                    parcel.district,
                    parcel.province,
                    parcel.source.as_str(),
                    self.filters.scenario_label()
                ),
                Theme::dim(),
            ),
        ];
        match &self.state.status {
            AnalysisStatus::Loading => {
                spans.push(Span::styled("  Loading backend analysis...", Theme::warning()))
            }
            AnalysisStatus::Error(e) => {
                spans.push(Span::styled(format!("  Backend error: {}", e), Theme::error()))
            }
            AnalysisStatus::Idle | AnalysisStatus::Ready => {}
        }
        Paragraph::new(Line::from(spans)).render(area, buf);
    }

    fn render_kpis(&self, parcel: &Parcel, snap: &SignalPoint, area: Rect, buf: &mut Buffer) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(25),
                Constraint::Percentage(25),
                Constraint::Percentage(25),
                Constraint::Percentage(25),
            ])
            .split(area);

        let stress_title = if self.state.prediction.is_some() {
            "Risk 7d"
        } else {
            "Stress"
        };
        stress_gauge(stress_title, Some(self.shown_stress(snap) as f64)).render(cols[0], buf);
        ndvi_gauge("NDVI", Some(snap.ndvi)).render(cols[1], buf);
        rain_gauge("Rain 7d", Some(recent_rain(&parcel.series))).render(cols[2], buf);
        et_gauge("ET", Some(snap.et)).render(cols[3], buf);
    }

    fn render_trends(&self, parcel: &Parcel, area: Rect, buf: &mut Buffer) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(6),
                Constraint::Length(4),
                Constraint::Length(4),
            ])
            .split(area);

        let window = tail(&parcel.series, SERIES_DAYS);
        let ndvi: Vec<(f64, f64)> = window
            .iter()
            .enumerate()
            .map(|(i, p)| (i as f64, p.ndvi))
            .collect();
        ndvi_chart(window, &ndvi).render(rows[0], buf);

        let recent = tail(&parcel.series, EXPLANATION_WINDOW_DAYS);
        let rain: Vec<u64> = recent.iter().map(|p| p.rain.max(0.0).round() as u64).collect();
        let et: Vec<u64> = recent
            .iter()
            .map(|p| (p.et.max(0.0) * 10.0).round() as u64)
            .collect();

        trend("Rain mm (14d)", rain, Theme::RAIN).render(rows[1], buf);
        trend("ET (14d)", et, Theme::ET).render(rows[2], buf);
    }

    fn render_why(&self, parcel: &Parcel, snap: &SignalPoint, area: Rect, buf: &mut Buffer) {
        let explanation = why(parcel, snap, self.shown_stress(snap));

        let block = Block::default()
            .title(Span::styled(explanation.headline.clone(), Theme::header()))
            .borders(Borders::ALL)
            .border_style(Theme::border());
        let inner = block.inner(area);
        block.render(area, buf);

        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(explanation.factors.len() as u16 + 1),
                Constraint::Min(2),
            ])
            .split(inner);

        FactorBars::new(&explanation.factors).render(parts[0], buf);
        Paragraph::new(Span::styled(explanation.summary.as_str(), Theme::dim()))
            .wrap(Wrap { trim: true })
            .render(parts[1], buf);
    }

    fn render_advice(&self, parcel: &Parcel, snap: &SignalPoint, area: Rect, buf: &mut Buffer) {
        let advice = self.advice(parcel, snap);

        let block = Block::default()
            .title(Span::styled("Irrigation advice", Theme::header()))
            .borders(Borders::ALL)
            .border_style(Theme::border());
        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines = vec![
            Line::from(Span::styled(advice.headline(), Theme::highlight())),
            Line::from(vec![
                Span::styled("Source: ", Theme::dim()),
                Span::styled(advice.origin.as_str(), Theme::normal()),
            ]),
            Line::from(Span::styled(advice.rationale.clone(), Theme::normal())),
        ];

        if !advice.data_points.is_empty() {
            let points = advice
                .data_points
                .iter()
                .map(|dp| format!("{}: {}", dp.label, dp.value))
                .collect::<Vec<_>>()
                .join("  ");
            lines.push(Line::from(Span::styled(points, Theme::dim())));
        }

        if let Some(prediction) = &self.state.prediction {
            lines.push(Line::from(""));
            let mut spans = vec![
                Span::styled("Prediction: ", Theme::dim()),
                Span::styled(
                    format!("risk 7d {:.0}", prediction.risk_7d),
                    Theme::normal(),
                ),
            ];
            if let Some(risk_14d) = prediction.risk_14d {
                spans.push(Span::styled(format!("  risk 14d {:.0}", risk_14d), Theme::normal()));
            }
            if let Some(ndvi) = prediction.ndvi_7d_pred {
                spans.push(Span::styled(format!("  NDVI 7d {:.3}", ndvi), Theme::normal()));
            }
            lines.push(Line::from(spans));
            if !prediction.top_factors.is_empty() {
                lines.push(Line::from(vec![
                    Span::styled("Top factors: ", Theme::dim()),
                    Span::styled(prediction.top_factors.join(", "), Theme::normal()),
                ]));
            }
        }

        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .render(inner, buf);
    }

    fn render_chat(&self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.state.chat_editing {
            Theme::border_focused()
        } else {
            Theme::border()
        };
        let block = Block::default()
            .title(Span::styled("Ask the backend", Theme::header()))
            .borders(Borders::ALL)
            .border_style(border_style);
        let inner = block.inner(area);
        block.render(area, buf);

        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(inner);

        let mut lines: Vec<Line> = Vec::new();
        if !self.backend_available {
            lines.push(Line::from(Span::styled(
                "Backend unavailable. Questions need a reachable backend.",
                Theme::dim(),
            )));
        }
        for entry in &self.state.chat_log {
            lines.extend(chat_lines(entry));
        }

        // Keep the newest exchange in view.
        let overflow = lines.len().saturating_sub(parts[0].height as usize);
        Paragraph::new(lines.split_off(overflow))
            .wrap(Wrap { trim: true })
            .render(parts[0], buf);

        let prompt = if self.state.chat_editing {
            Line::from(vec![
                Span::styled("> ", Theme::highlight()),
                Span::styled(self.state.chat_input.as_str(), Theme::normal()),
                Span::styled(" ", Theme::selected()),
            ])
        } else {
            Line::from(Span::styled("Press c to ask a question", Theme::dim()))
        };
        Paragraph::new(prompt).render(parts[1], buf);
    }
}

fn chat_lines(entry: &ChatEntry) -> Vec<Line<'_>> {
    let answer = match &entry.answer {
        None => Span::styled("...", Theme::dim()),
        Some(Ok(text)) => Span::styled(text.as_str(), Theme::normal()),
        Some(Err(e)) => Span::styled(format!("Failed: {}", e), Theme::error()),
    };
    vec![
        Line::from(vec![
            Span::styled("Q: ", Theme::highlight()),
            Span::styled(entry.question.as_str(), Theme::normal()),
        ]),
        Line::from(vec![Span::styled("A: ", Theme::dim()), answer]),
    ]
}

fn ndvi_chart<'a>(window: &[SignalPoint], data: &'a [(f64, f64)]) -> Chart<'a> {
    let (lo, hi) = data.iter().fold((1.0_f64, 0.0_f64), |(lo, hi), &(_, y)| {
        (lo.min(y), hi.max(y))
    });
    // Pad so a flat series still has a visible band.
    let (lo, hi) = ((lo - 0.05).max(0.0), (hi + 0.05).min(1.0));
    let last = data.len().saturating_sub(1).max(1) as f64;

    let x_labels = match (window.first(), window.last()) {
        (Some(first), Some(end)) => vec![
            first.date.format("%d.%m").to_string(),
            end.date.format("%d.%m").to_string(),
        ],
        _ => Vec::new(),
    };

    let dataset = Dataset::default()
        .name("NDVI")
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Theme::ndvi_color(window.last().map_or(0.0, |p| p.ndvi))))
        .data(data);

    Chart::new(vec![dataset])
        .block(
            Block::default()
                .title(format!("NDVI ({}d)", data.len()))
                .borders(Borders::ALL)
                .border_style(Theme::border()),
        )
        .x_axis(
            Axis::default()
                .style(Theme::dim())
                .bounds([0.0, last])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(Theme::dim())
                .bounds([lo, hi])
                .labels(vec![format!("{:.2}", lo), format!("{:.2}", hi)]),
        )
}

fn trend(title: &str, data: Vec<u64>, color: Color) -> Sparkline<'_> {
    Sparkline::default()
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Theme::border()),
        )
        .data(data)
        .style(Style::default().fg(color))
}
