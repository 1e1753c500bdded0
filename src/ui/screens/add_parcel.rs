use crate::datasources::mock::{DEFAULT_DISTRICT, DEFAULT_PROVINCE};
use crate::datasources::NewParcel;
use crate::ui::components::InputWidget;
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewParcelField {
    Province,
    District,
}

impl NewParcelField {
    pub fn all() -> &'static [NewParcelField] {
        &[NewParcelField::Province, NewParcelField::District]
    }

    pub fn label(&self) -> &'static str {
        match self {
            NewParcelField::Province => "Province",
            NewParcelField::District => "District",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            NewParcelField::Province => NewParcelField::District,
            NewParcelField::District => NewParcelField::Province,
        }
    }

    fn placeholder(&self) -> &'static str {
        match self {
            NewParcelField::Province => DEFAULT_PROVINCE,
            NewParcelField::District => DEFAULT_DISTRICT,
        }
    }
}

/// Form for synthesizing a demo parcel.
pub struct NewParcelScreen<'a> {
    pub input: &'a NewParcel,
    pub focused_field: NewParcelField,
}

impl<'a> NewParcelScreen<'a> {
    pub fn new(input: &'a NewParcel) -> Self {
        Self {
            input,
            focused_field: NewParcelField::Province,
        }
    }

    pub fn with_focus(mut self, field: NewParcelField) -> Self {
        self.focused_field = field;
        self
    }

    fn value(&self, field: NewParcelField) -> &'a str {
        match field {
            NewParcelField::Province => &self.input.province,
            NewParcelField::District => &self.input.district,
        }
    }
}

impl Widget for NewParcelScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Title
                Constraint::Length(8), // Form
                Constraint::Min(4),    // Preview
                Constraint::Length(1), // Nav
            ])
            .split(area);

        let title = Line::from(vec![
            Span::styled("New Parcel", Theme::title()),
            Span::styled(" - Demo data", Theme::dim()),
        ]);
        Paragraph::new(title).render(chunks[0], buf);

        self.render_form(chunks[1], buf);
        self.render_preview(chunks[2], buf);

        let nav = Theme::nav_bar(&[("Tab", "Next field"), ("Enter", "Create"), ("Esc", "Back")]);
        Paragraph::new(nav).render(chunks[3], buf);
    }
}

impl NewParcelScreen<'_> {
    fn render_form(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("Location")
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        let field_areas = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Length(3)])
            .split(inner);

        for (i, field) in NewParcelField::all().iter().enumerate() {
            let focused = *field == self.focused_field;
            InputWidget::new(field.label(), self.value(*field))
                .placeholder(field.placeholder())
                .focused(focused)
                .editing(focused)
                .render(field_areas[i], buf);
        }
    }

    fn render_preview(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("Preview")
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        let lines = vec![
            Line::from(vec![
                Span::styled("Name:  ", Theme::dim()),
                Span::styled(
                    format!("{} / Parcel (new)", self.input.district()),
                    Theme::normal(),
                ),
            ]),
            Line::from(vec![
                Span::styled("Where: ", Theme::dim()),
                Span::styled(
                    format!("{}, {}", self.input.district(), self.input.province()),
                    Theme::normal(),
                ),
            ]),
            Line::from(Span::styled(
                "A random outline and 28 days of synthetic signals are generated.",
                Theme::dim(),
            )),
            Line::from(Span::styled(
                "Nothing is sent to the backend.",
                Theme::dim(),
            )),
        ];

        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen_text(buf: &Buffer) -> String {
        let area = buf.area;
        (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn blank_form_previews_defaults() {
        let input = NewParcel::default();
        let area = Rect::new(0, 0, 80, 20);
        let mut buf = Buffer::empty(area);
        NewParcelScreen::new(&input)
            .with_focus(NewParcelField::District)
            .render(area, &mut buf);

        let text = screen_text(&buf);
        assert!(text.contains("Merkez / Parcel (new)"));
        assert!(text.contains("Merkez, Konya"));
    }

    #[test]
    fn typed_values_are_shown() {
        let input = NewParcel {
            province: "Aksaray".into(),
            district: "Ortakoy".into(),
        };
        let area = Rect::new(0, 0, 80, 20);
        let mut buf = Buffer::empty(area);
        NewParcelScreen::new(&input).render(area, &mut buf);

        let text = screen_text(&buf);
        assert!(text.contains("Ortakoy / Parcel (new)"));
        assert!(text.contains("Ortakoy, Aksaray"));
    }

    #[test]
    fn field_toggle_wraps() {
        assert_eq!(NewParcelField::Province.next(), NewParcelField::District);
        assert_eq!(NewParcelField::District.next(), NewParcelField::Province);
    }
}
