use crate::logic::ParcelRow;
use crate::models::{Bounds, Parcel};
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::canvas::{Canvas, Line as CanvasLine},
    widgets::{Block, Borders, List, ListItem, Paragraph, Widget},
};

/// Smallest extent drawn, in degrees.
const MIN_EXTENT: f64 = 0.02;

struct Outline {
    edges: Vec<(f64, f64, f64, f64)>,
    color: Color,
    label: Option<(f64, f64, String)>,
}

pub struct MapScreen<'a> {
    pub parcels: Vec<&'a Parcel>,
    pub rows: &'a [ParcelRow],
    pub selected_id: Option<&'a str>,
}

impl<'a> MapScreen<'a> {
    /// `rows` and `parcels` are the visible set, in the same order.
    pub fn new(parcels: Vec<&'a Parcel>, rows: &'a [ParcelRow]) -> Self {
        Self {
            parcels,
            rows,
            selected_id: None,
        }
    }

    pub fn with_selection(mut self, id: Option<&'a str>) -> Self {
        self.selected_id = id;
        self
    }

    fn bounds(&self) -> Option<Bounds> {
        let bounds = self
            .parcels
            .iter()
            .filter_map(|p| p.geometry.bounds())
            .reduce(Bounds::union)?
            .pad(0.1);

        Some(widen(bounds))
    }

    fn outlines(&self) -> Vec<Outline> {
        let mut outlines: Vec<Outline> = self
            .parcels
            .iter()
            .zip(self.rows)
            .map(|(parcel, row)| {
                let selected = self.selected_id == Some(parcel.id.as_str());
                let color = if selected {
                    Theme::HIGHLIGHT
                } else {
                    row.bucket.map(|b| b.color()).unwrap_or(Theme::DIM)
                };
                let edges = parcel
                    .geometry
                    .rings
                    .iter()
                    .flat_map(|ring| {
                        ring.windows(2)
                            .map(|w| (w[0].lng, w[0].lat, w[1].lng, w[1].lat))
                            .collect::<Vec<_>>()
                    })
                    .collect();
                let label = if selected {
                    parcel
                        .geometry
                        .bounds()
                        .map(|b| (b.min_lng, b.max_lat, parcel.name.clone()))
                } else {
                    None
                };
                Outline {
                    edges,
                    color,
                    label,
                }
            })
            .collect();

        // Draw the selection last so it stays on top.
        outlines.sort_by_key(|o| o.label.is_some());
        outlines
    }
}

/// Keep a degenerate extent drawable.
fn widen(b: Bounds) -> Bounds {
    let mut b = b;
    if b.max_lng - b.min_lng < MIN_EXTENT {
        let mid = (b.max_lng + b.min_lng) / 2.0;
        b.min_lng = mid - MIN_EXTENT / 2.0;
        b.max_lng = mid + MIN_EXTENT / 2.0;
    }
    if b.max_lat - b.min_lat < MIN_EXTENT {
        let mid = (b.max_lat + b.min_lat) / 2.0;
        b.min_lat = mid - MIN_EXTENT / 2.0;
        b.max_lat = mid + MIN_EXTENT / 2.0;
    }
    b
}

impl Widget for MapScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Title
                Constraint::Min(10),   // Map and legend
                Constraint::Length(1), // Nav
            ])
            .split(area);

        let title = Line::from(vec![
            Span::styled("Map", Theme::title()),
            Span::styled(format!(" ({} parcels)", self.rows.len()), Theme::dim()),
        ]);
        Paragraph::new(title).render(chunks[0], buf);

        let content = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(30), Constraint::Length(32)])
            .split(chunks[1]);

        self.render_map(content[0], buf);
        self.render_legend(content[1], buf);

        let nav = Theme::nav_bar(&[
            ("↑↓", "Select"),
            ("Enter", "Analyze"),
            ("[ ]", "Scenario"),
            ("Esc", "Back"),
        ]);
        Paragraph::new(nav).render(chunks[2], buf);
    }
}

impl MapScreen<'_> {
    fn render_map(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(Span::styled("Parcels", Theme::header()))
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let Some(bounds) = self.bounds() else {
            let inner = block.inner(area);
            block.render(area, buf);
            Paragraph::new(Span::styled("No results", Theme::dim())).render(inner, buf);
            return;
        };

        let outlines = self.outlines();
        Canvas::default()
            .block(block)
            .marker(Marker::Braille)
            .x_bounds([bounds.min_lng, bounds.max_lng])
            .y_bounds([bounds.min_lat, bounds.max_lat])
            .paint(|ctx| {
                for outline in &outlines {
                    for &(x1, y1, x2, y2) in &outline.edges {
                        ctx.draw(&CanvasLine::new(x1, y1, x2, y2, outline.color));
                    }
                }
                for outline in &outlines {
                    if let Some((x, y, ref name)) = outline.label {
                        ctx.print(x, y, Line::styled(name.clone(), Theme::highlight()));
                    }
                }
            })
            .render(area, buf);
    }

    fn render_legend(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(Span::styled("Legend", Theme::header()))
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let items: Vec<ListItem> = self
            .rows
            .iter()
            .map(|row| {
                let selected = self.selected_id == Some(row.id.as_str());
                let style = match row.bucket {
                    Some(b) => Style::default().fg(b.color()),
                    None => Theme::dim(),
                };
                let marker = if selected { "▶ " } else { "  " };
                let name_style = if selected {
                    Theme::highlight()
                } else {
                    Theme::normal()
                };
                ListItem::new(Line::from(vec![
                    Span::styled(marker, Theme::highlight()),
                    Span::styled(row.bucket.map(|b| b.symbol()).unwrap_or(" "), style),
                    Span::raw(" "),
                    Span::styled(row.name.as_str(), name_style),
                ]))
            })
            .collect();

        List::new(items).block(block).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Polygon, SignalSource, StressBucket};

    fn parcel(id: &str, lng: f64, lat: f64) -> Parcel {
        Parcel {
            id: id.into(),
            name: format!("{} field", id),
            province: "Konya".into(),
            district: "Merkez".into(),
            source: SignalSource::Ndvi,
            geometry: Polygon::rectangle(lng, lat, 0.02, 0.01),
            series: Vec::new(),
        }
    }

    fn row(id: &str, bucket: Option<StressBucket>) -> ParcelRow {
        ParcelRow {
            id: id.into(),
            name: format!("{} field", id),
            province: "Konya".into(),
            source_label: "NDVI",
            display_stress: None,
            bucket,
            snapshot_date: None,
            ndvi: None,
        }
    }

    #[test]
    fn bounds_cover_all_parcels() {
        let a = parcel("P-1", 32.5, 37.5);
        let b = parcel("P-2", 32.8, 37.9);
        let rows = vec![row("P-1", None), row("P-2", None)];
        let screen = MapScreen::new(vec![&a, &b], &rows);

        let bounds = screen.bounds().unwrap();
        assert!(bounds.min_lng < 32.5 && bounds.max_lng > 32.82);
        assert!(bounds.min_lat < 37.5 && bounds.max_lat > 37.91);
    }

    #[test]
    fn degenerate_bounds_are_widened() {
        let b = widen(Bounds {
            min_lng: 32.0,
            min_lat: 37.0,
            max_lng: 32.0,
            max_lat: 37.0,
        });
        assert!((b.max_lng - b.min_lng - MIN_EXTENT).abs() < 1e-9);
        assert!((b.max_lat - b.min_lat - MIN_EXTENT).abs() < 1e-9);
    }

    #[test]
    fn selected_outline_is_drawn_last_and_labelled() {
        let a = parcel("P-1", 32.5, 37.5);
        let b = parcel("P-2", 32.8, 37.9);
        let rows = vec![row("P-1", Some(StressBucket::High)), row("P-2", None)];
        let screen = MapScreen::new(vec![&a, &b], &rows).with_selection(Some("P-1"));

        let outlines = screen.outlines();
        assert_eq!(outlines.len(), 2);
        assert_eq!(outlines[0].color, Theme::DIM);
        assert_eq!(outlines[1].color, Theme::HIGHLIGHT);
        assert_eq!(outlines[1].edges.len(), 4);
        assert!(outlines[1].label.is_some());
    }

    #[test]
    fn empty_map_renders_no_results() {
        let rows: Vec<ParcelRow> = Vec::new();
        let area = Rect::new(0, 0, 80, 20);
        let mut buf = Buffer::empty(area);
        MapScreen::new(Vec::new(), &rows).render(area, &mut buf);

        let text: String = (0..area.height)
            .flat_map(|y| (0..area.width).map(move |x| (x, y)))
            .map(|p| buf[p].symbol().to_string())
            .collect();
        assert!(text.contains("No results"));
    }
}
