use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Bordered single-line text field.
pub struct InputWidget<'a> {
    label: &'a str,
    value: &'a str,
    placeholder: &'a str,
    focused: bool,
    editing: bool,
}

impl<'a> InputWidget<'a> {
    pub fn new(label: &'a str, value: &'a str) -> Self {
        Self {
            label,
            value,
            placeholder: "",
            focused: false,
            editing: false,
        }
    }

    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = placeholder;
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Show a block cursor after the text.
    pub fn editing(mut self, editing: bool) -> Self {
        self.editing = editing;
        self
    }
}

impl Widget for InputWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            Theme::border_focused()
        } else {
            Theme::border()
        };

        let block = Block::default()
            .title(self.label)
            .borders(Borders::ALL)
            .border_style(border_style);

        let inner = block.inner(area);
        block.render(area, buf);

        let mut spans = if self.value.is_empty() && !self.editing {
            vec![Span::styled(self.placeholder, Theme::dim())]
        } else {
            let style = if self.editing {
                Theme::highlight()
            } else if self.focused {
                Theme::selected()
            } else {
                Theme::normal()
            };
            vec![Span::styled(self.value, style)]
        };
        if self.editing {
            spans.push(Span::styled(" ", Theme::selected()));
        }

        Paragraph::new(Line::from(spans)).render(inner, buf);
    }
}

/// Bordered field cycling through a fixed set of values.
pub struct SelectWidget<'a> {
    label: &'a str,
    value: &'a str,
    position: Option<(usize, usize)>,
    focused: bool,
}

impl<'a> SelectWidget<'a> {
    pub fn new(label: &'a str, value: &'a str) -> Self {
        Self {
            label,
            value,
            position: None,
            focused: false,
        }
    }

    /// 0-based index of the value among `count` options.
    pub fn position(mut self, index: usize, count: usize) -> Self {
        self.position = Some((index, count));
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }
}

impl Widget for SelectWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            Theme::border_focused()
        } else {
            Theme::border()
        };

        let block = Block::default()
            .title(self.label)
            .borders(Borders::ALL)
            .border_style(border_style);

        let inner = block.inner(area);
        block.render(area, buf);

        let (display, style) = if self.focused {
            (format!("< {} >", self.value), Theme::highlight())
        } else {
            (self.value.to_string(), Theme::normal())
        };

        let mut spans = vec![Span::styled(display, style)];
        if let Some((index, count)) = self.position {
            spans.push(Span::styled(
                format!("  ({}/{})", index + 1, count),
                Theme::dim(),
            ));
        }

        Paragraph::new(Line::from(spans)).render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn empty_input_shows_placeholder() {
        let area = Rect::new(0, 0, 24, 3);
        let mut buf = Buffer::empty(area);
        InputWidget::new("District", "")
            .placeholder("Merkez")
            .render(area, &mut buf);
        assert!(row_text(&buf, 1).contains("Merkez"));
    }

    #[test]
    fn focused_select_shows_arrows_and_position() {
        let area = Rect::new(0, 0, 30, 3);
        let mut buf = Buffer::empty(area);
        SelectWidget::new("Source", "ndvi")
            .position(1, 4)
            .focused(true)
            .render(area, &mut buf);
        let text = row_text(&buf, 1);
        assert!(text.contains("< ndvi >"));
        assert!(text.contains("(2/4)"));
    }
}
