use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

use crate::game::{FinalScore, GameState, GameStatus};
use crate::leaderboard::LeaderboardEntry;
use crate::modifier::{ItemKind, ModifierBook};
use crate::progress::{Achievement, QuestProgress};

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
}

fn signed_color(val: f64) -> Color {
    if val > 0.0 {
        Color::Green
    } else if val < 0.0 {
        Color::Red
    } else {
        Color::White
    }
}

fn label(text: &str) -> Span<'_> {
    Span::styled(text, Style::default().fg(Color::DarkGray))
}

/// Thousands separators, e.g. `1,000,000`.
pub fn format_amount(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub struct AccountPanel<'a> {
    game: &'a GameState,
    quantity: u64,
}

impl<'a> AccountPanel<'a> {
    pub fn new(game: &'a GameState, quantity: u64) -> Self {
        Self { game, quantity }
    }
}

impl Widget for AccountPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let p = self.game.portfolio();
        let price = self.game.current_price();
        let profit = self.game.profit_rate();
        let order_cost = self.quantity.saturating_mul(price);

        let lines = vec![
            Line::from(vec![
                label("Cash:    "),
                Span::styled(format_amount(p.cash), Style::default().fg(Color::White)),
            ]),
            Line::from(vec![
                label("Shares:  "),
                Span::styled(p.holdings.to_string(), Style::default().fg(Color::White)),
            ]),
            Line::from(vec![
                label("AvgCost: "),
                Span::styled(
                    if p.is_flat() {
                        "---".to_string()
                    } else {
                        format!("{:.0}", p.avg_cost)
                    },
                    Style::default().fg(Color::White),
                ),
            ]),
            Line::from(vec![
                label("Value:   "),
                Span::styled(
                    format_amount(p.holdings_value(price)),
                    Style::default().fg(Color::White),
                ),
            ]),
            Line::from(vec![
                label("Total:   "),
                Span::styled(
                    format_amount(self.game.total_assets()),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(vec![
                label("Profit:  "),
                Span::styled(
                    format!("{:+.2}%", profit),
                    Style::default().fg(signed_color(profit)),
                ),
            ]),
            Line::from(vec![
                label("Qty:     "),
                Span::styled(
                    format!("{} ({})", self.quantity, format_amount(order_cost)),
                    Style::default().fg(Color::Yellow),
                ),
            ]),
        ];

        Paragraph::new(lines)
            .block(panel(" Account "))
            .render(area, buf);
    }
}

pub struct ItemPanel<'a> {
    book: &'a ModifierBook,
    prices: [u64; 3],
    current_price: u64,
    now_ms: u64,
}

impl<'a> ItemPanel<'a> {
    pub fn new(game: &'a GameState, now_ms: u64) -> Self {
        let items = &game.settings().items;
        Self {
            book: game.modifiers(),
            prices: ItemKind::ALL.map(|k| items.spec(k).price),
            current_price: game.current_price(),
            now_ms,
        }
    }
}

impl Widget for ItemPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines: Vec<Line> = ItemKind::ALL
            .iter()
            .enumerate()
            .map(|(i, &kind)| {
                let (status, color) = match self.book.get(kind) {
                    Some(m) => {
                        let mut status = format!("ON {}s", m.remaining_secs(self.now_ms));
                        if let Some(pct) = m.gain_since_activation(self.current_price) {
                            status.push_str(&format!(" {:+.1}%", pct));
                        }
                        (status, Color::Green)
                    }
                    None if self.book.can_purchase(kind).is_err() => {
                        ("used".to_string(), Color::DarkGray)
                    }
                    None => (format_amount(self.prices[i]), Color::White),
                };
                Line::from(vec![
                    Span::styled(format!("[{}] ", i + 1), Style::default().fg(Color::Yellow)),
                    Span::styled(format!("{:<12}", kind.label()), Style::default().fg(color)),
                    Span::styled(status, Style::default().fg(color)),
                ])
            })
            .collect();

        Paragraph::new(lines)
            .block(panel(" Items "))
            .render(area, buf);
    }
}

pub struct ProgressPanel<'a> {
    quests: &'a [QuestProgress],
    unlocked: &'a [Achievement],
}

impl<'a> ProgressPanel<'a> {
    pub fn new(quests: &'a [QuestProgress], unlocked: &'a [Achievement]) -> Self {
        Self { quests, unlocked }
    }
}

impl Widget for ProgressPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut lines: Vec<Line> = self
            .quests
            .iter()
            .map(|q| {
                let (mark, color) = if q.completed {
                    ("✔", Color::Green)
                } else {
                    (" ", Color::White)
                };
                Line::from(vec![
                    Span::styled(format!("{} ", mark), Style::default().fg(color)),
                    Span::styled(
                        format!("{:<24}", q.quest.description()),
                        Style::default().fg(color),
                    ),
                    Span::styled(
                        format!("{:>3.0}%", q.percent()),
                        Style::default().fg(Color::DarkGray),
                    ),
                ])
            })
            .collect();

        let badges = Achievement::ALL
            .iter()
            .map(|a| {
                if self.unlocked.contains(a) {
                    Span::styled("★ ", Style::default().fg(Color::Yellow))
                } else {
                    Span::styled("☆ ", Style::default().fg(Color::DarkGray))
                }
            })
            .collect::<Vec<_>>();
        lines.push(Line::from(badges));
        if let Some(latest) = self.unlocked.last() {
            lines.push(Line::from(Span::styled(
                latest.title(),
                Style::default().fg(Color::Yellow),
            )));
        }

        Paragraph::new(lines)
            .block(panel(" Quests & Achievements "))
            .render(area, buf);
    }
}

pub struct LogPanel<'a> {
    title: &'a str,
    messages: &'a [String],
    newest_first: bool,
}

impl<'a> LogPanel<'a> {
    /// Market and item events, already newest first.
    pub fn events(messages: &'a [String]) -> Self {
        Self {
            title: " Events ",
            messages,
            newest_first: true,
        }
    }

    /// Player-facing notices, oldest first; shows the tail.
    pub fn system(messages: &'a [String]) -> Self {
        Self {
            title: " Log ",
            messages,
            newest_first: false,
        }
    }
}

impl Widget for LogPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let max_lines = area.height.saturating_sub(2) as usize;
        let picked: Vec<&String> = if self.newest_first {
            self.messages.iter().take(max_lines).collect()
        } else {
            let start = self.messages.len().saturating_sub(max_lines);
            self.messages[start..].iter().collect()
        };
        let lines: Vec<Line> = picked
            .into_iter()
            .map(|msg| {
                let color = if msg.starts_with("Rejected") {
                    Color::Red
                } else {
                    Color::White
                };
                Line::from(Span::styled(msg.as_str(), Style::default().fg(color)))
            })
            .collect();

        Paragraph::new(lines)
            .block(panel(self.title))
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}

pub struct StatusBar<'a> {
    pub game: &'a GameState,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let game = self.game;
        let status = match game.status() {
            GameStatus::Ready => Span::styled(" READY ", Style::default().fg(Color::Yellow)),
            GameStatus::Running => Span::styled(" RUNNING ", Style::default().fg(Color::Green)),
            GameStatus::Finished => Span::styled(
                " FINISHED ",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
        };
        let frozen = game.modifiers().is_clock_frozen();
        let timer_color = if frozen {
            Color::Cyan
        } else if game.time_left_secs() <= 10 {
            Color::Red
        } else {
            Color::White
        };
        let change = game.series().change_percent();

        let line = Line::from(vec![
            Span::styled(
                " stock-rush ",
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("| ", Style::default().fg(Color::DarkGray)),
            Span::styled(game.difficulty().as_str(), Style::default().fg(Color::Cyan)),
            Span::styled(" |", Style::default().fg(Color::DarkGray)),
            status,
            Span::styled("| ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!(
                    "{}:{:02}{}",
                    game.time_left_secs() / 60,
                    game.time_left_secs() % 60,
                    if frozen { " (frozen)" } else { "" }
                ),
                Style::default().fg(timer_color),
            ),
            Span::styled(" | ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format_amount(game.current_price()),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" ({:+.2}%)", change),
                Style::default().fg(signed_color(change)),
            ),
        ]);

        buf.set_line(area.x, area.y, &line, area.width);
    }
}

pub struct KeybindBar;

impl Widget for KeybindBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow));
        let text = |t: &'static str| Span::styled(t, Style::default().fg(Color::DarkGray));
        let line = Line::from(vec![
            key(" [N]"),
            text("ew  "),
            key("[R]"),
            text("eset  "),
            key("[B]"),
            text("uy  "),
            key("[S]"),
            text("ell  "),
            key("[+/-]"),
            text(" qty  "),
            key("[D]"),
            text("ifficulty  "),
            key("[1-3]"),
            text(" items  "),
            key("[L]"),
            text("eaderboard  "),
            key("[Q]"),
            text("uit"),
        ]);

        buf.set_line(area.x, area.y, &line, area.width);
    }
}

pub struct LeaderboardPanel<'a> {
    entries: &'a [LeaderboardEntry],
}

impl<'a> LeaderboardPanel<'a> {
    pub fn new(entries: &'a [LeaderboardEntry]) -> Self {
        Self { entries }
    }
}

impl Widget for LeaderboardPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);
        let mut lines = vec![Line::from(Span::styled(
            format!(
                "{:<4}{:<20} {:>14} {:>9} {:<7}",
                "#", "Name", "Assets", "Profit", "Level"
            ),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        ))];
        if self.entries.is_empty() {
            lines.push(Line::from(label("no records yet")));
        }
        for (i, e) in self.entries.iter().enumerate() {
            let color = match i {
                0 => Color::Yellow,
                1 | 2 => Color::White,
                _ => Color::Gray,
            };
            lines.push(Line::from(vec![
                Span::styled(
                    format!(
                        "{:<4}{:<20} {:>14} ",
                        i + 1,
                        e.name,
                        format_amount(e.score.max(0) as u64)
                    ),
                    Style::default().fg(color),
                ),
                Span::styled(
                    format!("{:>8.2}%", e.profit_rate),
                    Style::default().fg(signed_color(e.profit_rate)),
                ),
                Span::styled(format!(" {:<7}", e.difficulty), Style::default().fg(color)),
            ]));
        }

        Paragraph::new(lines)
            .block(
                panel(" Leaderboard ")
                    .border_style(Style::default().fg(Color::Yellow)),
            )
            .render(area, buf);
    }
}

pub struct GameOverPopup<'a> {
    score: &'a FinalScore,
    name: &'a str,
    qualifies: bool,
}

impl<'a> GameOverPopup<'a> {
    pub fn new(score: &'a FinalScore, name: &'a str, qualifies: bool) -> Self {
        Self {
            score,
            name,
            qualifies,
        }
    }
}

impl Widget for GameOverPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);
        let mut lines = vec![
            Line::from(vec![
                label("Total assets: "),
                Span::styled(
                    format_amount(self.score.total_assets),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(vec![
                label("Profit rate:  "),
                Span::styled(
                    format!("{:+.2}%", self.score.profit_rate),
                    Style::default().fg(signed_color(self.score.profit_rate)),
                ),
            ]),
            Line::from(""),
        ];
        if self.qualifies {
            lines.push(Line::from(vec![
                label("Name: "),
                Span::styled(
                    format!("{}_", self.name),
                    Style::default().fg(Color::Yellow),
                ),
            ]));
            lines.push(Line::from(label("[Enter] save  [Esc] skip")));
        } else {
            lines.push(Line::from(label("Not a top score this time.")));
            lines.push(Line::from(label("[Esc] close")));
        }

        Paragraph::new(lines)
            .block(
                panel(" Game Over ")
                    .border_style(Style::default().fg(Color::Red)),
            )
            .render(area, buf);
    }
}
