use crate::datasources::SourceKind;
use crate::logic::ParcelRow;
use crate::models::{FilterState, StressBucket};
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, StatefulWidget, Table, TableState, Widget},
};

pub struct DashboardScreen<'a> {
    pub rows: &'a [ParcelRow],
    pub filters: &'a FilterState,
    pub total_parcels: usize,
    pub selected_index: usize,
    pub origin: SourceKind,
    pub backend_available: bool,
    pub status_message: Option<&'a str>,
}

impl<'a> DashboardScreen<'a> {
    pub fn new(rows: &'a [ParcelRow], filters: &'a FilterState, total_parcels: usize) -> Self {
        Self {
            rows,
            filters,
            total_parcels,
            selected_index: 0,
            origin: SourceKind::Mock,
            backend_available: false,
            status_message: None,
        }
    }

    pub fn with_selection(mut self, index: usize) -> Self {
        self.selected_index = index;
        self
    }

    pub fn with_source(mut self, origin: SourceKind, backend_available: bool) -> Self {
        self.origin = origin;
        self.backend_available = backend_available;
        self
    }

    pub fn with_status(mut self, status: Option<&'a str>) -> Self {
        self.status_message = status;
        self
    }

    fn bucket_count(&self, bucket: StressBucket) -> usize {
        self.rows.iter().filter(|r| r.bucket == Some(bucket)).count()
    }
}

impl Widget for DashboardScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(8),    // Table and summary
                Constraint::Length(1), // Status message
                Constraint::Length(1), // Nav bar
            ])
            .split(area);

        self.render_header(chunks[0], buf);

        let middle = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(40), Constraint::Length(28)])
            .split(chunks[1]);

        self.render_table(middle[0], buf);
        self.render_summary(middle[1], buf);

        self.render_status_message(chunks[2], buf);

        let nav = Theme::nav_bar(&[
            ("1", "Parcels"),
            ("2", "Map"),
            ("3", "Analysis"),
            ("4", "Filters"),
            ("5", "New"),
            ("↑↓", "Select"),
            ("Enter", "Analyze"),
            ("[ ]", "Scenario"),
            ("q", "Quit"),
        ]);
        Paragraph::new(nav).render(chunks[3], buf);
    }
}

impl DashboardScreen<'_> {
    fn render_header(&self, area: Rect, buf: &mut Buffer) {
        let title = format!(
            "AquaGuard - {} of {} parcels",
            self.rows.len(),
            self.total_parcels
        );

        let block = Block::default()
            .title(Span::styled(title, Theme::title()))
            .borders(Borders::BOTTOM)
            .border_style(Theme::border());

        let source_style = if self.backend_available {
            Theme::success()
        } else {
            Theme::warning()
        };

        let info = Line::from(vec![
            Span::styled(self.origin.as_str(), source_style),
            Span::styled(" | ", Theme::dim()),
            Span::styled(self.filters.scenario_label(), Theme::highlight()),
            Span::styled(
                format!(
                    " | province: {}  source: {}  stress: {}",
                    self.filters.province_label(),
                    self.filters.source_label(),
                    self.filters.bucket_label()
                ),
                Theme::dim(),
            ),
        ]);

        Paragraph::new(info).block(block).render(area, buf);
    }

    fn render_table(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(Span::styled("Parcels", Theme::header()))
            .borders(Borders::ALL)
            .border_style(Theme::border());

        if self.rows.is_empty() {
            let inner = block.inner(area);
            block.render(area, buf);
            Paragraph::new(Span::styled("No results", Theme::dim())).render(inner, buf);
            return;
        }

        let header_cells = ["Parcel", "ID", "Province", "Stress", "Date", "Source"]
            .iter()
            .map(|h| Cell::from(*h).style(Theme::header()));
        let header = Row::new(header_cells).height(1);

        let rows: Vec<Row> = self
            .rows
            .iter()
            .map(|row| {
                let stress_style = row
                    .bucket
                    .map(Theme::bucket)
                    .unwrap_or_else(Theme::dim);
                let symbol = row.bucket.map(|b| b.symbol()).unwrap_or(" ");

                Row::new(vec![
                    Cell::from(row.name.as_str()),
                    Cell::from(row.id.as_str()).style(Theme::dim()),
                    Cell::from(row.province.as_str()),
                    Cell::from(format!("{} {}", symbol, row.stress_text())).style(stress_style),
                    Cell::from(row.date_text()),
                    Cell::from(row.source_label),
                ])
            })
            .collect();

        let widths = [
            Constraint::Min(20),
            Constraint::Length(8),
            Constraint::Length(10),
            Constraint::Length(14),
            Constraint::Length(6),
            Constraint::Length(12),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(Theme::selected());

        let mut state = TableState::default();
        state.select(Some(self.selected_index.min(self.rows.len() - 1)));
        StatefulWidget::render(table, area, buf, &mut state);
    }

    fn render_summary(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(Span::styled("Stress buckets", Theme::header()))
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines: Vec<Line> = [StressBucket::High, StressBucket::Medium, StressBucket::Low]
            .iter()
            .map(|b| {
                Line::from(vec![
                    Span::styled(
                        format!("{} {:<8}", b.symbol(), b.as_str()),
                        Theme::bucket(*b),
                    ),
                    Span::styled(format!("{:>3}", self.bucket_count(*b)), Theme::normal()),
                ])
            })
            .collect();

        let no_data = self.rows.iter().filter(|r| r.bucket.is_none()).count();
        if no_data > 0 {
            lines.push(Line::from(Span::styled(
                format!("  No data  {:>3}", no_data),
                Theme::dim(),
            )));
        }

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Stress shown under the",
            Theme::dim(),
        )));
        lines.push(Line::from(Span::styled(
            format!("{}.", self.filters.scenario_label()),
            Theme::dim(),
        )));

        Paragraph::new(lines).render(inner, buf);
    }

    fn render_status_message(&self, area: Rect, buf: &mut Buffer) {
        if let Some(msg) = self.status_message {
            let style = if msg.contains("unavailable")
                || msg.contains("failed")
                || msg.contains("Invalid")
            {
                Theme::warning()
            } else {
                Style::default().fg(Theme::SUCCESS)
            };
            Paragraph::new(Span::styled(msg, style)).render(area, buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen_text(buf: &Buffer) -> String {
        let area = buf.area;
        (area.y..area.y + area.height)
            .map(|y| {
                (area.x..area.x + area.width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn row(id: &str, stress: Option<u8>) -> ParcelRow {
        ParcelRow {
            id: id.into(),
            name: format!("{} field", id),
            province: "Konya".into(),
            source_label: "NDVI",
            display_stress: stress,
            bucket: stress.map(StressBucket::from_score),
            snapshot_date: chrono::NaiveDate::from_ymd_opt(2025, 7, 3),
            ndvi: Some(0.5),
        }
    }

    #[test]
    fn empty_set_renders_no_results() {
        let filters = FilterState::default();
        let area = Rect::new(0, 0, 100, 20);
        let mut buf = Buffer::empty(area);
        DashboardScreen::new(&[], &filters, 4).render(area, &mut buf);

        let text = screen_text(&buf);
        assert!(text.contains("No results"));
        assert!(text.contains("0 of 4 parcels"));
    }

    #[test]
    fn rows_show_stress_and_counts() {
        let filters = FilterState::default();
        let rows = vec![row("P-1", Some(80)), row("P-2", Some(20)), row("P-3", None)];
        let area = Rect::new(0, 0, 110, 20);
        let mut buf = Buffer::empty(area);
        DashboardScreen::new(&rows, &filters, 3)
            .with_selection(1)
            .render(area, &mut buf);

        let text = screen_text(&buf);
        assert!(text.contains("High (80)"));
        assert!(text.contains("Low (20)"));
        assert!(text.contains("No data"));
        assert!(text.contains("03.07"));
        assert!(text.contains("100% rainfall scenario"));
    }
}
