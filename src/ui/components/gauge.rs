use crate::logic::scoring::{HIGH_THRESHOLD, MEDIUM_THRESHOLD};
use crate::models::{FactorScore, StressBucket};
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

pub struct GaugeWidget<'a> {
    title: &'a str,
    value: Option<f64>,
    unit: &'a str,
    min: f64,
    max: f64,
    thresholds: Vec<(f64, Color)>,
    precision: usize,
    caption: Option<String>,
}

impl<'a> GaugeWidget<'a> {
    pub fn new(title: &'a str, value: Option<f64>, unit: &'a str) -> Self {
        Self {
            title,
            value,
            unit,
            min: 0.0,
            max: 100.0,
            thresholds: Vec::new(),
            precision: 1,
            caption: None,
        }
    }

    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn thresholds(mut self, thresholds: Vec<(f64, Color)>) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Dim text shown after the value.
    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    fn get_color(&self, value: f64) -> Color {
        for (threshold, color) in self.thresholds.iter().rev() {
            if value >= *threshold {
                return *color;
            }
        }
        Theme::FG
    }
}

impl Widget for GaugeWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 3 || area.width < 10 {
            return;
        }

        let block = Block::default()
            .title(self.title)
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        let Some(value) = self.value else {
            Paragraph::new(Span::styled("N/A", Theme::dim())).render(inner, buf);
            return;
        };

        let color = self.get_color(value);
        let mut spans = vec![Span::styled(
            format!("{:.prec$}{}", value, self.unit, prec = self.precision),
            Style::default().fg(color),
        )];
        if let Some(caption) = self.caption {
            spans.push(Span::styled(format!(" {}", caption), Theme::dim()));
        }
        Paragraph::new(Line::from(spans)).render(inner, buf);

        if inner.height >= 2 {
            let bar_area = Rect {
                x: inner.x,
                y: inner.y + 1,
                width: inner.width,
                height: 1,
            };
            let ratio = ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0);
            render_bar(bar_area, buf, ratio, color);
        }
    }
}

fn render_bar(area: Rect, buf: &mut Buffer, ratio: f64, color: Color) {
    let filled = (area.width as f64 * ratio.clamp(0.0, 1.0)).round() as u16;
    for x in area.x..area.x + area.width {
        let ch = if x < area.x + filled { '█' } else { '░' };
        buf[(x, area.y)].set_char(ch).set_fg(color);
    }
}

pub fn stress_gauge(title: &str, value: Option<f64>) -> GaugeWidget<'_> {
    let caption = value
        .map(|v| StressBucket::from_score(v.round().clamp(0.0, 100.0) as u8).as_str())
        .unwrap_or_default();
    GaugeWidget::new(title, value, "")
        .range(0.0, 100.0)
        .precision(0)
        .caption(caption)
        .thresholds(vec![
            (0.0, StressBucket::Low.color()),
            (MEDIUM_THRESHOLD as f64, StressBucket::Medium.color()),
            (HIGH_THRESHOLD as f64, StressBucket::High.color()),
        ])
}

pub fn ndvi_gauge(title: &str, value: Option<f64>) -> GaugeWidget<'_> {
    GaugeWidget::new(title, value, "")
        .range(0.0, 1.0)
        .precision(3)
        .thresholds(vec![
            (0.0, Theme::NDVI_SPARSE),
            (0.45, Theme::NDVI_MODERATE),
            (0.6, Theme::NDVI_DENSE),
        ])
}

pub fn rain_gauge(title: &str, value: Option<f64>) -> GaugeWidget<'_> {
    GaugeWidget::new(title, value, " mm")
        .range(0.0, 60.0)
        .precision(0)
        .thresholds(vec![(0.0, Theme::WARNING), (10.0, Theme::RAIN)])
}

pub fn et_gauge(title: &str, value: Option<f64>) -> GaugeWidget<'_> {
    GaugeWidget::new(title, value, "")
        .range(0.0, 10.0)
        .precision(1)
        .thresholds(vec![(0.0, Theme::SUCCESS), (4.2, Theme::WARNING), (6.0, Theme::ERROR)])
}

/// Horizontal bars for explanation factor scores.
pub struct FactorBars<'a> {
    factors: &'a [FactorScore],
    label_width: u16,
}

impl<'a> FactorBars<'a> {
    pub fn new(factors: &'a [FactorScore]) -> Self {
        Self {
            factors,
            label_width: 16,
        }
    }
}

impl Widget for FactorBars<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // label, bar, 5 columns of percentage
        if area.width <= self.label_width + 6 {
            return;
        }
        let bar_width = area.width - self.label_width - 6;

        for (i, factor) in self.factors.iter().enumerate() {
            let y = area.y + i as u16;
            if y >= area.y + area.height {
                break;
            }
            let color = Theme::stress_color(factor.score * 100.0);

            let label_area = Rect {
                x: area.x,
                y,
                width: self.label_width,
                height: 1,
            };
            Paragraph::new(Span::styled(factor.label.as_str(), Theme::normal()))
                .render(label_area, buf);

            let bar_area = Rect {
                x: area.x + self.label_width,
                y,
                width: bar_width,
                height: 1,
            };
            render_bar(bar_area, buf, factor.score, color);

            let pct_area = Rect {
                x: bar_area.x + bar_width + 1,
                y,
                width: 5,
                height: 1,
            };
            Paragraph::new(Span::styled(
                format!("{:>3}%", factor.percent()),
                Style::default().fg(color),
            ))
            .render(pct_area, buf);
        }
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
    fn gauge_shows_value_and_bar() {
        let area = Rect::new(0, 0, 20, 4);
        let mut buf = Buffer::empty(area);
        stress_gauge("Stress", Some(75.0)).render(area, &mut buf);

        assert!(row_text(&buf, 1).contains("75 High"));
        let bar = row_text(&buf, 2);
        assert!(bar.contains('█'));
        assert!(bar.contains('░'));
        assert_eq!(buf[(1, 2)].fg, StressBucket::High.color());
    }

    #[test]
    fn gauge_without_value_shows_na() {
        let area = Rect::new(0, 0, 20, 4);
        let mut buf = Buffer::empty(area);
        ndvi_gauge("NDVI", None).render(area, &mut buf);
        assert!(row_text(&buf, 1).contains("N/A"));
    }

    #[test]
    fn factor_bars_render_percentages() {
        let factors = vec![
            FactorScore {
                id: "ndvi_drop".into(),
                label: "NDVI drop".into(),
                magnitude: 0.15,
                score: 0.5,
            },
            FactorScore {
                id: "rain_deficit".into(),
                label: "Rain deficit".into(),
                magnitude: 40.0,
                score: 1.0,
            },
        ];
        let area = Rect::new(0, 0, 40, 2);
        let mut buf = Buffer::empty(area);
        FactorBars::new(&factors).render(area, &mut buf);

        assert!(row_text(&buf, 0).starts_with("NDVI drop"));
        assert!(row_text(&buf, 0).contains(" 50%"));
        assert!(row_text(&buf, 1).contains("100%"));
        assert!(!row_text(&buf, 1).contains('░'));
    }
}
