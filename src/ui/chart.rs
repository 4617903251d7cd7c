use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

use crate::indicator::overlay::ChartOverlay;

pub struct PriceChart<'a> {
    prices: &'a [u64],
    overlay: Option<&'a ChartOverlay>,
    title: &'a str,
}

impl<'a> PriceChart<'a> {
    pub fn new(prices: &'a [u64]) -> Self {
        Self {
            prices,
            overlay: None,
            title: " Price ",
        }
    }

    pub fn overlay(mut self, overlay: &'a ChartOverlay) -> Self {
        self.overlay = Some(overlay);
        self
    }

    pub fn title(mut self, title: &'a str) -> Self {
        self.title = title;
        self
    }
}

struct Scale {
    min: f64,
    range: f64,
    rows: usize,
}

impl Scale {
    fn row(&self, value: f64) -> usize {
        let normalized = ((value - self.min) / self.range).clamp(0.0, 1.0);
        let from_bottom = (normalized * (self.rows - 1) as f64).round() as usize;
        self.rows - 1 - from_bottom.min(self.rows - 1)
    }
}

impl Widget for PriceChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(self.title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.prices.is_empty() || inner.height < 3 || inner.width < 4 {
            return;
        }

        let chart_height = inner.height.saturating_sub(1) as usize; // last row is the legend
        let chart_width = inner.width as usize;
        let start = self.prices.len().saturating_sub(chart_width);
        let visible = &self.prices[start..];

        // Overlay values share the price axis, so they widen the range too.
        let overlay_at = |i: usize| -> [Option<f64>; 5] {
            let Some(o) = self.overlay else {
                return [None; 5];
            };
            let idx = start + i;
            let band = o.bands.get(idx).copied().flatten();
            [
                o.short_ma.get(idx).copied().flatten().map(|v| v as f64),
                o.long_ma.get(idx).copied().flatten().map(|v| v as f64),
                band.map(|b| b.upper as f64),
                band.map(|b| b.lower as f64),
                o.trend.get(idx).copied().flatten().map(|v| v as f64),
            ]
        };

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for (i, &p) in visible.iter().enumerate() {
            for v in std::iter::once(Some(p as f64)).chain(overlay_at(i)).flatten() {
                min = min.min(v);
                max = max.max(v);
            }
        }
        let range = max - min;
        let scale = Scale {
            min,
            range: if range < 1.0 { 1.0 } else { range },
            rows: chart_height,
        };

        // Draw back to front: bands, trend, averages, then price on top.
        const LAYERS: [(usize, &str, Color); 5] = [
            (2, "·", Color::DarkGray),
            (3, "·", Color::DarkGray),
            (4, "~", Color::Magenta),
            (1, "-", Color::Yellow),
            (0, "-", Color::Green),
        ];
        for (i, _) in visible.iter().enumerate() {
            let x = inner.x + i as u16;
            let values = overlay_at(i);
            for (slot, glyph, color) in LAYERS {
                if let Some(v) = values[slot] {
                    let y = inner.y + scale.row(v) as u16;
                    buf.set_string(x, y, glyph, Style::default().fg(color));
                }
            }
        }

        let mut prev: Option<u64> = None;
        for (i, &price) in visible.iter().enumerate() {
            let x = inner.x + i as u16;
            let y = inner.y + scale.row(price as f64) as u16;
            let color = match prev {
                Some(p) if price > p => Color::Green,
                Some(p) if price < p => Color::Red,
                _ => Color::Cyan,
            };
            buf.set_string(x, y, "●", Style::default().fg(color));
            prev = Some(price);
        }

        let max_label = format!("{:.0}", max);
        let min_label = format!("{:.0}", min);
        buf.set_string(inner.x, inner.y, &max_label, Style::default().fg(Color::DarkGray));
        buf.set_string(
            inner.x,
            inner.y + chart_height as u16 - 1,
            &min_label,
            Style::default().fg(Color::DarkGray),
        );

        if self.overlay.is_some() {
            let legend = Line::from(vec![
                Span::styled("● price ", Style::default().fg(Color::Cyan)),
                Span::styled("- MA short ", Style::default().fg(Color::Green)),
                Span::styled("- MA long ", Style::default().fg(Color::Yellow)),
                Span::styled("· bands ", Style::default().fg(Color::DarkGray)),
                Span::styled("~ trend", Style::default().fg(Color::Magenta)),
            ]);
            buf.set_line(inner.x, inner.y + inner.height - 1, &legend, inner.width);
        }
    }
}
