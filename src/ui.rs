use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Line as CanvasLine},
        Block, Borders, Paragraph, Widget,
    },
};

use glowline::{geometry::Point, pane::ROW_HEIGHT_PX};

use crate::{App, CELL_WIDTH_PX};

const LINE_RGB: (u8, u8, u8) = (229, 9, 20);
const MARKER_RGB: (u8, u8, u8) = (255, 255, 255);
const CURSOR_BLINK_MS: u128 = 500;

/// Colour faded towards the black background
fn faded((r, g, b): (u8, u8, u8), alpha: f64) -> Color {
    let a = alpha.clamp(0.0, 1.0);
    Color::Rgb(
        (r as f64 * a).round() as u8,
        (g as f64 * a).round() as u8,
        (b as f64 * a).round() as u8,
    )
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let canvas_area = self.layout.canvas.intersection(area);
        render_lines(self, canvas_area, buf);
        render_avatar(self, canvas_area, buf);

        if let Some(pane_area) = self.layout.pane {
            render_pane(self, pane_area.intersection(area), buf);
        }

        render_cursor(self, area, buf);
    }
}

fn render_lines(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(animator) = app.animator.as_ref() else {
        return;
    };
    let viewport = animator.viewport();
    let now = app.now;
    // canvas y grows upwards, screen y downwards
    let flip = |p: Point| (p.x, viewport.height - p.y);

    Canvas::default()
        .background_color(Color::Reset)
        .x_bounds([0.0, viewport.width])
        .y_bounds([0.0, viewport.height])
        .marker(ratatui::symbols::Marker::Braille)
        .paint(|ctx| {
            for line in animator.lines() {
                let alpha = line.opacity(now);
                let color = faded(LINE_RGB, alpha);

                for (a, b) in line.drawn_segments(now) {
                    let (x1, y1) = flip(a);
                    let (x2, y2) = flip(b);
                    ctx.draw(&CanvasLine::new(x1, y1, x2, y2, color));
                }

                if let Some(marker) = line.marker_position(now) {
                    let (x, y) = flip(marker);
                    ctx.print(
                        x,
                        y,
                        Span::styled(
                            "●",
                            Style::default()
                                .fg(faded(MARKER_RGB, alpha))
                                .add_modifier(Modifier::BOLD),
                        ),
                    );
                }
            }
        })
        .render(area, buf);
}

fn render_avatar(app: &App, area: Rect, buf: &mut Buffer) {
    // the line target never moves, so neither does the box drawn around it
    let avatar = app
        .animator
        .as_ref()
        .map_or_else(|| app.layout.avatar(), |animator| animator.avatar());
    let rect = avatar.rect();
    let cell = Rect {
        x: area.x + (rect.left / CELL_WIDTH_PX) as u16,
        y: area.y + (rect.top / ROW_HEIGHT_PX) as u16,
        width: (rect.width / CELL_WIDTH_PX) as u16,
        height: (rect.height / ROW_HEIGHT_PX) as u16,
    }
    .intersection(area);

    let glowing = app
        .animator
        .as_ref()
        .is_some_and(|animator| animator.is_glowing(app.now));

    let border_style = if glowing {
        Style::default()
            .fg(Color::Rgb(255, 80, 80))
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let face_style = if glowing {
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };

    Paragraph::new(Span::styled("◉", face_style))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(border_style))
        .render(cell, buf);
}

fn render_pane(app: &App, area: Rect, buf: &mut Buffer) {
    let following = app.typist.as_ref().is_some_and(|t| t.auto_scroll());
    let title = if following {
        " transmission "
    } else {
        " transmission (paused, End to follow) "
    };

    let mut rows = app.pane.rows();
    let blink_on = (app.now.as_millis() / CURSOR_BLINK_MS) % 2 == 0;
    if app.pane.cursor_block().is_some() && blink_on {
        if let Some(last) = rows.last_mut() {
            last.push('▌');
        }
    }

    let text_style = Style::default().fg(Color::Gray);
    let lines: Vec<Line> = rows
        .into_iter()
        .map(|row| Line::from(Span::styled(row, text_style)))
        .collect();

    Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(title),
        )
        .scroll((app.pane.row_offset(), 0))
        .render(area, buf);
}

fn render_cursor(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(translation) = app.cursor.translation() else {
        return;
    };
    let position = Position::new(
        (translation.x / CELL_WIDTH_PX) as u16,
        (translation.y / ROW_HEIGHT_PX) as u16,
    );
    if !area.contains(position) {
        return;
    }

    if let Some(cell) = buf.cell_mut(position) {
        cell.set_symbol("✦").set_style(
            Style::default()
                .fg(Color::Rgb(229, 9, 20))
                .add_modifier(Modifier::BOLD),
        );
    }
}
