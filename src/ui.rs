//! Layout and drawing: welcome, header banner, board, counters, next preview, overlays, farewell.

use crate::app::Screen;
use crate::field::{FIELD_HEIGHT, FIELD_WIDTH};
use crate::game::{GameInfo, PauseState, Phase};
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};
use std::time::Instant;
use tachyonfx::{Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx};

/// Every field cell is two terminal columns wide so bricks look square.
const CELL_WIDTH: u16 = 2;
const BOARD_WIDTH: u16 = FIELD_WIDTH as u16 * CELL_WIDTH + 2;
const BOARD_HEIGHT: u16 = FIELD_HEIGHT as u16 + 2;
const SIDEBAR_WIDTH: u16 = 24;
const HEADER_HEIGHT: u16 = 3;

const GAME_OVER_FADE_MS: u32 = 600;

const CONTROLS: [(&str, &str); 8] = [
    ("left / right", "move"),
    ("down", "drop (hold: hard)"),
    ("space", "rotate"),
    ("enter", "start"),
    ("esc / p", "pause"),
    ("q", "quit"),
    ("! @ #", "default/dark/light"),
    ("[ ]", "brightness"),
];

/// Game-over fade, kept by the host between frames.
#[derive(Default)]
pub struct FadeState {
    effect: Option<Effect>,
    last_frame: Option<Instant>,
}

impl FadeState {
    pub fn reset(&mut self) {
        self.effect = None;
        self.last_frame = None;
    }

    pub fn is_done(&self) -> bool {
        self.effect.as_ref().is_some_and(Effect::done)
    }
}

/// Banner text for the header, chosen from the pause tri-state.
pub fn banner(pause: PauseState) -> &'static str {
    match pause {
        PauseState::Running => "T E T R I S",
        PauseState::Paused => "P A U S E",
        PauseState::GameOver => "G A M E   O V E R",
    }
}

/// Draw the current screen. The game-over fade runs only when `animate` is set.
pub fn draw(
    frame: &mut Frame,
    screen: Screen,
    info: &GameInfo,
    phase: Phase,
    theme: &Theme,
    fade: &mut FadeState,
    animate: bool,
    now: Instant,
) {
    let area = frame.area();
    fill(frame.buffer_mut(), area, Style::default().bg(theme.background));
    match screen {
        Screen::Welcome => draw_welcome(frame, theme, area),
        Screen::Playing => {
            let board = draw_game(frame, info, theme, area);
            match phase {
                Phase::Ready => draw_ready_overlay(frame, theme, board),
                Phase::GameOver => {
                    if animate {
                        apply_game_over_fade(frame, fade, theme, board, now);
                    }
                    draw_game_over_overlay(frame, info, theme, board);
                }
                _ => {}
            }
        }
        Screen::Farewell => draw_farewell(frame, info, theme, area),
    }
}

fn fill(buf: &mut Buffer, area: Rect, style: Style) {
    let area = area.intersection(buf.area);
    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            buf[(x, y)].set_symbol(" ").set_style(style);
        }
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

fn panel(theme: &Theme, title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.on_surface).bg(theme.surface))
        .style(Style::default().fg(theme.on_surface).bg(theme.surface))
        .title(Span::styled(
            format!(" {title} "),
            Style::default()
                .fg(theme.on_secondary)
                .bg(theme.secondary)
                .add_modifier(Modifier::BOLD),
        ))
}

/// Header + board + sidebar. Returns the board's inner rect.
fn draw_game(frame: &mut Frame, info: &GameInfo, theme: &Theme, area: Rect) -> Rect {
    let total_w = BOARD_WIDTH + SIDEBAR_WIDTH;

    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Length(BOARD_HEIGHT),
            Constraint::Fill(1),
        ])
        .split(horiz[1]);

    draw_header(frame, info.pause, theme, vert[1]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(BOARD_WIDTH),
            Constraint::Length(SIDEBAR_WIDTH),
        ])
        .split(vert[2]);

    let board = draw_board(frame, info, theme, body[0]);
    draw_sidebar(frame, info, theme, body[1]);
    board
}

fn draw_header(frame: &mut Frame, pause: PauseState, theme: &Theme, area: Rect) {
    let style = match pause {
        PauseState::GameOver => Style::default().fg(theme.warning).bg(theme.primary),
        _ => Style::default().fg(theme.on_primary).bg(theme.primary),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.on_surface).bg(theme.primary))
        .style(style);
    Paragraph::new(Line::from(Span::styled(
        banner(pause),
        style.add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center)
    .block(block)
    .render(area, frame.buffer_mut());
}

/// Symbol and style of one field cell. Paused boards lose their colours.
fn cell_look(tag: u8, paused: bool, theme: &Theme) -> (&'static str, Style) {
    match theme.brick_color(tag) {
        None => ("  ", Style::default().bg(theme.surface)),
        Some(_) if paused => (
            "░░",
            Style::default()
                .fg(theme.on_surface)
                .bg(theme.surface)
                .add_modifier(Modifier::DIM),
        ),
        Some(color) => ("  ", Style::default().bg(color)),
    }
}

fn draw_board(frame: &mut Frame, info: &GameInfo, theme: &Theme, area: Rect) -> Rect {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.on_surface).bg(theme.surface));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());

    let paused = info.pause == PauseState::Paused;
    let buf = frame.buffer_mut();
    for (y, row) in info.field.iter().enumerate() {
        let ry = inner.y + y as u16;
        if ry >= inner.bottom() {
            break;
        }
        for (x, tag) in row.iter().enumerate() {
            let rx = inner.x + x as u16 * CELL_WIDTH;
            if rx + CELL_WIDTH > inner.right() {
                break;
            }
            let (symbol, style) = cell_look(*tag, paused, theme);
            buf.set_string(rx, ry, symbol, style);
        }
    }
    inner
}

fn draw_sidebar(frame: &mut Frame, info: &GameInfo, theme: &Theme, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // next: border + 4 rows
            Constraint::Length(6), // counters
            Constraint::Fill(1),
        ])
        .split(area);

    let next_block = panel(theme, "Next");
    let next_inner = next_block.inner(chunks[0]);
    next_block.render(chunks[0], frame.buffer_mut());
    draw_next_preview(frame, info, theme, next_inner);

    let label = Style::default().fg(theme.on_surface).add_modifier(Modifier::DIM);
    let value = Style::default()
        .fg(theme.on_surface)
        .add_modifier(Modifier::BOLD);
    let counters = [
        ("Score", info.score.to_string()),
        ("High score", info.high_score.to_string()),
        ("Level", info.level.to_string()),
        ("Speed", format!("{} ms", info.speed)),
    ];
    let lines: Vec<Line> = counters
        .into_iter()
        .map(|(name, v)| {
            Line::from(vec![
                Span::styled(format!("{name:<11}"), label),
                Span::styled(v, value),
            ])
        })
        .collect();
    Paragraph::new(Text::from(lines))
        .block(panel(theme, "Stats"))
        .render(chunks[1], frame.buffer_mut());

    let hint = match info.pause {
        PauseState::Running => "esc pause   q quit",
        PauseState::Paused => "esc/enter resume",
        PauseState::GameOver => "enter restart   q quit",
    };
    Paragraph::new(Line::from(Span::styled(hint, label)))
        .alignment(Alignment::Center)
        .render(
            Rect {
                height: chunks[2].height.min(1),
                ..chunks[2]
            },
            frame.buffer_mut(),
        );
}

fn draw_next_preview(frame: &mut Frame, info: &GameInfo, theme: &Theme, area: Rect) {
    let paused = info.pause == PauseState::Paused;
    let width = info.next[0].len() as u16 * CELL_WIDTH;
    let off_x = area.width.saturating_sub(width) / 2;
    let buf = frame.buffer_mut();
    for (y, row) in info.next.iter().enumerate() {
        let ry = area.y + y as u16;
        if ry >= area.bottom() {
            break;
        }
        for (x, tag) in row.iter().enumerate() {
            let rx = area.x + off_x + x as u16 * CELL_WIDTH;
            if rx + CELL_WIDTH > area.right() {
                break;
            }
            let (symbol, style) = cell_look(*tag, paused, theme);
            buf.set_string(rx, ry, symbol, style);
        }
    }
}

fn popup(frame: &mut Frame, theme: &Theme, board: Rect, lines: Vec<Line<'static>>) {
    let rect = centered(board, board.width.saturating_sub(2), lines.len() as u16 + 2);
    Clear.render(rect, frame.buffer_mut());
    Paragraph::new(Text::from(lines))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.on_secondary).bg(theme.secondary))
                .style(Style::default().fg(theme.on_secondary).bg(theme.secondary)),
        )
        .render(rect, frame.buffer_mut());
}

fn draw_ready_overlay(frame: &mut Frame, theme: &Theme, board: Rect) {
    popup(
        frame,
        theme,
        board,
        vec![
            Line::from(Span::styled(
                "READY",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from("enter  start"),
            Line::from("q      quit"),
        ],
    );
}

fn draw_game_over_overlay(frame: &mut Frame, info: &GameInfo, theme: &Theme, board: Rect) {
    let mut lines = vec![
        Line::from(Span::styled(
            "GAME OVER",
            Style::default()
                .fg(theme.warning)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!("score {}", info.score)),
    ];
    if info.score > 0 && info.score == info.high_score {
        lines.push(Line::from(Span::styled(
            "new record!",
            Style::default()
                .fg(theme.success)
                .add_modifier(Modifier::BOLD),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from("enter  restart"));
    lines.push(Line::from("q      quit"));
    popup(frame, theme, board, lines);
}

/// Fade the board out once the game is over.
fn apply_game_over_fade(
    frame: &mut Frame,
    fade: &mut FadeState,
    theme: &Theme,
    board: Rect,
    now: Instant,
) {
    let delta = fade
        .last_frame
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
    fade.last_frame = Some(now);

    let effect = fade.effect.get_or_insert_with(|| {
        fx::fade_to(
            theme.on_surface,
            theme.surface,
            (GAME_OVER_FADE_MS, Interpolation::Linear),
        )
        .with_area(board)
    });
    frame.render_effect(effect, board, TfxDuration::from_millis(delta_ms));
}

fn draw_welcome(frame: &mut Frame, theme: &Theme, area: Rect) {
    let key = Style::default()
        .fg(theme.on_surface)
        .add_modifier(Modifier::BOLD);
    let dim = Style::default().fg(theme.on_surface).add_modifier(Modifier::DIM);

    let mut lines = vec![
        Line::from(Span::styled(
            banner(PauseState::Running),
            Style::default()
                .fg(theme.on_primary)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    lines.extend(CONTROLS.iter().map(|(k, what)| {
        Line::from(vec![
            Span::styled(format!("{k:>14}  "), key),
            Span::styled(format!("{what:<20}"), dim),
        ])
    }));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("press enter to play", key)));

    let rect = centered(area, 44, lines.len() as u16 + 2);
    Paragraph::new(Text::from(lines))
        .alignment(Alignment::Center)
        .block(panel(theme, "Welcome"))
        .render(rect, frame.buffer_mut());
}

fn draw_farewell(frame: &mut Frame, info: &GameInfo, theme: &Theme, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(
            "thanks for playing",
            Style::default()
                .fg(theme.on_surface)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!("score       {}", info.score)),
        Line::from(format!("high score  {}", info.high_score)),
    ];
    let rect = centered(area, 32, lines.len() as u16 + 2);
    Paragraph::new(Text::from(lines))
        .alignment(Alignment::Center)
        .block(panel(theme, "Bye"))
        .render(rect, frame.buffer_mut());
}
