use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Circle, Context, Rectangle},
        Paragraph, Widget,
    },
};

use crate::quadrant::{Quadrant, ALL_QUADRANTS};
use crate::session::{Phase, Session, PLAYFIELD_HEIGHT, PLAYFIELD_WIDTH};

const TARGET_COLOR: Color = Color::Yellow;
const QUAD_ENABLED_COLOR: Color = Color::Yellow;
const QUAD_DISABLED_COLOR: Color = Color::DarkGray;

/// "Start next round" affordance on the summary screen, in playfield
/// coordinates: center x, center y, radius. Shared between the renderer and
/// the click dispatch in main.
pub const START_CIRCLE: (f64, f64, f64) = (PLAYFIELD_WIDTH / 2.0, 350.0, 50.0);

const SUMMARY_TITLE_Y: f64 = 200.0;

// Quadrant indicator grid below the start circle
const QUAD_INDICATOR_WIDTH: f64 = 80.0;
const QUAD_INDICATOR_HEIGHT: f64 = 50.0;
const QUAD_GRID_TOP: f64 = START_CIRCLE.1 + START_CIRCLE.2 + 30.0;

pub fn start_circle_contains(x: f64, y: f64) -> bool {
    let (cx, cy, r) = START_CIRCLE;
    (x - cx).powi(2) + (y - cy).powi(2) <= r * r
}

/// Splits the frame into progress line, playfield, and status line.
pub fn layout(area: Rect) -> (Rect, Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);
    (chunks[0], chunks[1], chunks[2])
}

/// Maps a terminal cell inside the playfield area to playfield coordinates
/// (top-left origin, y growing downward). `None` for clicks outside it.
pub fn cell_to_playfield(field: Rect, column: u16, row: u16) -> Option<(f64, f64)> {
    if field.width == 0 || field.height == 0 {
        return None;
    }
    if column < field.x
        || column >= field.x + field.width
        || row < field.y
        || row >= field.y + field.height
    {
        return None;
    }

    let x = (column - field.x) as f64 + 0.5;
    let y = (row - field.y) as f64 + 0.5;
    Some((
        x / field.width as f64 * PLAYFIELD_WIDTH,
        y / field.height as f64 * PLAYFIELD_HEIGHT,
    ))
}

/// Full-screen game widget; polls the session through its read accessors.
pub struct GameScreen<'a> {
    pub session: &'a Session,
}

impl Widget for GameScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (progress, field, status) = layout(area);

        match self.session.phase() {
            Phase::RoundActive => {
                render_progress(self.session, progress, buf);
                render_playfield(self.session, field, buf);
            }
            Phase::AwaitingStart | Phase::RoundSummary => {
                render_summary(self.session, field, buf);
            }
        }
        render_status(self.session, status, buf);
    }
}

fn render_progress(session: &Session, area: Rect, buf: &mut Buffer) {
    let text = format!(
        "Clicks: {}/{}",
        session.clicks_in_round(),
        session.clicks_per_round()
    );
    Paragraph::new(text)
        .alignment(Alignment::Center)
        .render(area, buf);
}

fn render_status(session: &Session, area: Rect, buf: &mut Buffer) {
    let n = session.history_window();
    let line = Line::from(vec![
        Span::raw(format!("Last Score: {}", session.last_points())),
        Span::raw("   "),
        Span::raw(format!("Avg Score ({n}): {}", session.avg_points())),
        Span::raw("   "),
        Span::raw(format!("Last Time: {:.2}s", session.last_reaction())),
        Span::raw("   "),
        Span::raw(format!("Avg Time ({n}): {:.2}s", session.avg_reaction())),
        Span::raw("   "),
        Span::styled(
            "q quit / r reset / e end round",
            Style::default().add_modifier(Modifier::DIM),
        ),
    ]);
    Paragraph::new(line).render(area, buf);
}

fn render_playfield(session: &Session, area: Rect, buf: &mut Buffer) {
    Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([0.0, PLAYFIELD_WIDTH])
        .y_bounds([0.0, PLAYFIELD_HEIGHT])
        .paint(|ctx| {
            for target in session.targets() {
                ctx.draw(&Circle {
                    x: target.x,
                    y: PLAYFIELD_HEIGHT - target.y,
                    radius: target.radius,
                    color: TARGET_COLOR,
                });
            }
        })
        .render(area, buf);
}

fn render_summary(session: &Session, area: Rect, buf: &mut Buffer) {
    let welcome = session.phase() == Phase::AwaitingStart;
    Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([0.0, PLAYFIELD_WIDTH])
        .y_bounds([0.0, PLAYFIELD_HEIGHT])
        .paint(|ctx| {
            paint_summary_text(ctx, session, welcome);
            paint_start_circle(ctx, welcome);
            paint_quadrant_grid(ctx, session);
            if session.no_quadrant_notice() {
                print_centered(
                    ctx,
                    QUAD_GRID_TOP + QUAD_INDICATOR_HEIGHT * 2.0 + 30.0,
                    "At least one quadrant must be enabled to start!".to_string(),
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                );
            }
        })
        .render(area, buf);
}

fn paint_summary_text(ctx: &mut Context, session: &Session, welcome: bool) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    if welcome {
        print_centered(ctx, SUMMARY_TITLE_Y, "Welcome to plink!".to_string(), bold);
        print_centered(
            ctx,
            SUMMARY_TITLE_Y + 40.0,
            "Click the circle below to start".to_string(),
            Style::default(),
        );
        print_centered(
            ctx,
            SUMMARY_TITLE_Y + 70.0,
            format!("Each round lasts {} circles", session.clicks_per_round()),
            Style::default(),
        );
    } else if let Some(summary) = session.last_summary() {
        print_centered(
            ctx,
            SUMMARY_TITLE_Y,
            format!("Round {} Complete!", summary.round),
            bold,
        );
        print_centered(
            ctx,
            SUMMARY_TITLE_Y + 40.0,
            format!("Avg Score this Round: {}", summary.avg_points),
            Style::default(),
        );
        print_centered(
            ctx,
            SUMMARY_TITLE_Y + 70.0,
            format!("Avg Time this Round: {:.2}s", summary.avg_reaction),
            Style::default(),
        );
    }
}

fn paint_start_circle(ctx: &mut Context, welcome: bool) {
    let (cx, cy, r) = START_CIRCLE;
    ctx.draw(&Circle {
        x: cx,
        y: PLAYFIELD_HEIGHT - cy,
        radius: r,
        color: TARGET_COLOR,
    });
    let label = if welcome { "Start Round" } else { "Start Next Round" };
    print_centered(
        ctx,
        cy,
        label.to_string(),
        Style::default().add_modifier(Modifier::BOLD),
    );
}

fn paint_quadrant_grid(ctx: &mut Context, session: &Session) {
    let grid_left = PLAYFIELD_WIDTH / 2.0 - QUAD_INDICATOR_WIDTH;

    for quadrant in ALL_QUADRANTS {
        let (col, row) = match quadrant {
            Quadrant::TopLeft => (0.0, 0.0),
            Quadrant::TopRight => (1.0, 0.0),
            Quadrant::BottomLeft => (0.0, 1.0),
            Quadrant::BottomRight => (1.0, 1.0),
        };
        let x0 = grid_left + col * QUAD_INDICATOR_WIDTH;
        let y0 = QUAD_GRID_TOP + row * QUAD_INDICATOR_HEIGHT;

        let enabled = session.quadrants().is_enabled(quadrant);
        let color = if enabled {
            QUAD_ENABLED_COLOR
        } else {
            QUAD_DISABLED_COLOR
        };

        ctx.draw(&Rectangle {
            x: x0,
            y: PLAYFIELD_HEIGHT - y0 - QUAD_INDICATOR_HEIGHT,
            width: QUAD_INDICATOR_WIDTH,
            height: QUAD_INDICATOR_HEIGHT,
            color,
        });

        let text_style = if enabled {
            Style::default().fg(Color::White)
        } else {
            Style::default().add_modifier(Modifier::DIM)
        };
        ctx.print(
            x0 + QUAD_INDICATOR_WIDTH / 2.0,
            PLAYFIELD_HEIGHT - (y0 + QUAD_INDICATOR_HEIGHT / 2.0),
            Span::styled(quadrant.toggle_key().to_string(), text_style),
        );
    }
}

fn print_centered(ctx: &mut Context, y: f64, text: String, style: Style) {
    // Center by character count; canvas print anchors at the left edge
    let offset = text.len() as f64 * 2.0;
    ctx.print(
        PLAYFIELD_WIDTH / 2.0 - offset,
        PLAYFIELD_HEIGHT - y,
        Span::styled(text, style),
    );
}
