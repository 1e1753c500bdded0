use crate::logic::scoring::{HIGH_THRESHOLD, MEDIUM_THRESHOLD};
use crate::models::StressBucket;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

pub struct Theme;

impl Theme {
    // Base colors
    pub const FG: Color = Color::White;
    pub const DIM: Color = Color::DarkGray;
    pub const ACCENT: Color = Color::Cyan;
    pub const HIGHLIGHT: Color = Color::LightCyan;

    // Status colors
    pub const SUCCESS: Color = Color::Green;
    pub const WARNING: Color = Color::Yellow;
    pub const ERROR: Color = Color::Red;

    // Signal colors
    pub const NDVI_SPARSE: Color = Color::Yellow;
    pub const NDVI_MODERATE: Color = Color::LightGreen;
    pub const NDVI_DENSE: Color = Color::Green;
    pub const RAIN: Color = Color::LightBlue;
    pub const ET: Color = Color::Magenta;

    // Styles
    pub fn title() -> Style {
        Style::default()
            .fg(Self::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    pub fn header() -> Style {
        Style::default().fg(Self::FG).add_modifier(Modifier::BOLD)
    }

    pub fn normal() -> Style {
        Style::default().fg(Self::FG)
    }

    pub fn dim() -> Style {
        Style::default().fg(Self::DIM)
    }

    pub fn highlight() -> Style {
        Style::default()
            .fg(Self::HIGHLIGHT)
            .add_modifier(Modifier::BOLD)
    }

    pub fn selected() -> Style {
        Style::default()
            .bg(Color::DarkGray)
            .fg(Self::FG)
            .add_modifier(Modifier::BOLD)
    }

    pub fn success() -> Style {
        Style::default().fg(Self::SUCCESS)
    }

    pub fn warning() -> Style {
        Style::default().fg(Self::WARNING)
    }

    pub fn error() -> Style {
        Style::default().fg(Self::ERROR)
    }

    pub fn bucket(bucket: StressBucket) -> Style {
        Style::default().fg(bucket.color())
    }

    pub fn stress_color(score: f64) -> Color {
        if score >= HIGH_THRESHOLD as f64 {
            StressBucket::High.color()
        } else if score >= MEDIUM_THRESHOLD as f64 {
            StressBucket::Medium.color()
        } else {
            StressBucket::Low.color()
        }
    }

    pub fn ndvi_color(ndvi: f64) -> Color {
        if ndvi < 0.45 {
            Self::NDVI_SPARSE
        } else if ndvi < 0.6 {
            Self::NDVI_MODERATE
        } else {
            Self::NDVI_DENSE
        }
    }

    pub fn nav_key() -> Style {
        Style::default()
            .fg(Self::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    pub fn nav_label() -> Style {
        Style::default().fg(Self::DIM)
    }

    /// Key hint bar, e.g. `[q]Quit`.
    pub fn nav_bar(items: &[(&'static str, &'static str)]) -> Line<'static> {
        let spans: Vec<Span<'static>> = items
            .iter()
            .enumerate()
            .flat_map(|(i, (key, label))| {
                let label = if i + 1 < items.len() {
                    format!("{} ", label)
                } else {
                    label.to_string()
                };
                [
                    Span::styled(format!("[{}]", key), Self::nav_key()),
                    Span::styled(label, Self::nav_label()),
                ]
            })
            .collect();
        Line::from(spans)
    }

    pub fn border() -> Style {
        Style::default().fg(Self::DIM)
    }

    pub fn border_focused() -> Style {
        Style::default().fg(Self::ACCENT)
    }
}
