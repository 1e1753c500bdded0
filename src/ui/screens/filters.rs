use crate::models::{FilterState, SignalSource, StressBucket};
use crate::ui::components::{InputWidget, SelectWidget};
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Province,
    Source,
    Stress,
    From,
    To,
    RainFactor,
}

impl FilterField {
    pub fn all() -> &'static [FilterField] {
        &[
            FilterField::Province,
            FilterField::Source,
            FilterField::Stress,
            FilterField::From,
            FilterField::To,
            FilterField::RainFactor,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            FilterField::Province => "Province",
            FilterField::Source => "Source",
            FilterField::Stress => "Stress",
            FilterField::From => "From (YYYY-MM-DD)",
            FilterField::To => "To (YYYY-MM-DD)",
            FilterField::RainFactor => "Rain factor",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            FilterField::Province => FilterField::Source,
            FilterField::Source => FilterField::Stress,
            FilterField::Stress => FilterField::From,
            FilterField::From => FilterField::To,
            FilterField::To => FilterField::RainFactor,
            FilterField::RainFactor => FilterField::Province,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            FilterField::Province => FilterField::RainFactor,
            FilterField::Source => FilterField::Province,
            FilterField::Stress => FilterField::Source,
            FilterField::From => FilterField::Stress,
            FilterField::To => FilterField::From,
            FilterField::RainFactor => FilterField::To,
        }
    }

    /// Free-text fields; the rest cycle with Left/Right.
    pub fn is_text(&self) -> bool {
        matches!(self, FilterField::From | FilterField::To)
    }
}

pub struct FiltersScreen<'a> {
    pub filters: &'a FilterState,
    pub provinces: &'a [String],
    pub focused_field: FilterField,
    pub editing: bool,
    pub edit_buffer: &'a str,
    pub status_message: Option<&'a str>,
}

impl<'a> FiltersScreen<'a> {
    pub fn new(filters: &'a FilterState, provinces: &'a [String]) -> Self {
        Self {
            filters,
            provinces,
            focused_field: FilterField::Province,
            editing: false,
            edit_buffer: "",
            status_message: None,
        }
    }

    pub fn with_focus(mut self, field: FilterField) -> Self {
        self.focused_field = field;
        self
    }

    pub fn editing(mut self, editing: bool, buffer: &'a str) -> Self {
        self.editing = editing;
        self.edit_buffer = buffer;
        self
    }

    pub fn with_status(mut self, status: Option<&'a str>) -> Self {
        self.status_message = status;
        self
    }

    fn field_value(&self, field: FilterField) -> String {
        match field {
            FilterField::Province => self.filters.province_label().to_string(),
            FilterField::Source => self
                .filters
                .source
                .map(|s| s.as_str())
                .unwrap_or("all")
                .to_string(),
            FilterField::Stress => self
                .filters
                .stress_bucket
                .map(|b| b.as_str())
                .unwrap_or("all")
                .to_string(),
            FilterField::From => date_value(self.filters.from),
            FilterField::To => date_value(self.filters.to),
            FilterField::RainFactor => format!(
                "{:.1} ({})",
                self.filters.rain_factor,
                self.filters.scenario_label()
            ),
        }
    }

    /// Index among the field's options, counting "all" as the first.
    fn position(&self, field: FilterField) -> Option<(usize, usize)> {
        match field {
            FilterField::Province => {
                let index = self
                    .filters
                    .province
                    .as_ref()
                    .and_then(|p| self.provinces.iter().position(|x| x == p))
                    .map_or(0, |i| i + 1);
                Some((index, self.provinces.len() + 1))
            }
            FilterField::Source => {
                let all = SignalSource::all();
                let index = self
                    .filters
                    .source
                    .and_then(|s| all.iter().position(|x| *x == s))
                    .map_or(0, |i| i + 1);
                Some((index, all.len() + 1))
            }
            FilterField::Stress => {
                let index = match self.filters.stress_bucket {
                    None => 0,
                    Some(StressBucket::Low) => 1,
                    Some(StressBucket::Medium) => 2,
                    Some(StressBucket::High) => 3,
                };
                Some((index, 4))
            }
            _ => None,
        }
    }
}

fn date_value(date: Option<chrono::NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

impl Widget for FiltersScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),  // Title
                Constraint::Min(20),    // Form (6 fields * 3 lines + borders)
                Constraint::Length(5),  // Help
                Constraint::Length(1),  // Status
                Constraint::Length(1),  // Nav
            ])
            .split(area);

        let title = Line::from(vec![
            Span::styled("Filters", Theme::title()),
            Span::styled(" - Parcel selection and scenario", Theme::dim()),
        ]);
        Paragraph::new(title).render(chunks[0], buf);

        self.render_form(chunks[1], buf);
        self.render_help(chunks[2], buf);

        if let Some(msg) = self.status_message {
            let style = if msg.starts_with("Invalid") {
                Theme::warning()
            } else {
                Theme::success()
            };
            Paragraph::new(Span::styled(msg, style)).render(chunks[3], buf);
        }

        let nav = Theme::nav_bar(&[
            ("↑↓", "Navigate"),
            ("←→", "Change"),
            ("Enter", "Edit"),
            ("r", "Reset"),
            ("Esc", "Cancel/Back"),
        ]);
        Paragraph::new(nav).render(chunks[4], buf);
    }
}

impl FiltersScreen<'_> {
    fn render_form(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("Filters")
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        let constraints: Vec<Constraint> = FilterField::all()
            .iter()
            .map(|_| Constraint::Length(3))
            .collect();

        let field_areas = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(inner);

        for (i, field) in FilterField::all().iter().enumerate() {
            let focused = *field == self.focused_field;
            let editing = focused && self.editing;

            if editing {
                InputWidget::new(field.label(), self.edit_buffer)
                    .focused(true)
                    .editing(true)
                    .render(field_areas[i], buf);
            } else if field.is_text() {
                let value = self.field_value(*field);
                InputWidget::new(field.label(), &value)
                    .placeholder("any")
                    .focused(focused)
                    .render(field_areas[i], buf);
            } else {
                let value = self.field_value(*field);
                let mut select = SelectWidget::new(field.label(), &value).focused(focused);
                if let Some((index, count)) = self.position(*field) {
                    select = select.position(index, count);
                }
                select.render(field_areas[i], buf);
            }
        }
    }

    fn render_help(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("Help")
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        let help_text = match self.focused_field {
            FilterField::Province => "Only show parcels in one province. 'all' shows every one.",
            FilterField::Source => "Filter by signal source: ndvi_era5, ndvi or manual.",
            FilterField::Stress => {
                "Filter by stress bucket under the scenario. Parcels without data are hidden."
            }
            FilterField::From => "Snapshot window start. The snapshot is the last day inside it.",
            FilterField::To => "Snapshot window end. An empty window falls back to the latest day.",
            FilterField::RainFactor => {
                "Rainfall scenario: 1.0 is observed rain, lower is drier. Also [ and ] anywhere."
            }
        };

        Paragraph::new(help_text)
            .style(Theme::dim())
            .wrap(ratatui::widgets::Wrap { trim: true })
            .render(inner, buf);
    }
}
