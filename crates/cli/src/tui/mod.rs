pub mod modal;
pub mod viewport;

use std::io::stdout;
use std::time::Duration;

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame, Terminal,
};

use livegrid_client::{
    col_to_letters, CellCoord, ConnectionStatus, Connector, EditKey, Session,
};

use crate::util;
use modal::ModalData;
use viewport::Viewport;

const CONNECT_LABEL: &str = " Connect ";

struct TuiApp<C: Connector> {
    session: Session<C>,
    cursor: CellCoord,
    viewport: Viewport,
    modal: Option<ModalData>,
    should_quit: bool,
}

/// Header, grid, status bar.
fn split(area: Rect) -> [Rect; 3] {
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(2),
        Constraint::Length(1),
    ])
    .split(area);
    [chunks[0], chunks[1], chunks[2]]
}

/// The Connect button sits at the right end of the header.
fn connect_button(header: Rect) -> Rect {
    let width = (CONNECT_LABEL.len() as u16).min(header.width);
    Rect::new(header.x + header.width - width, header.y, width, 1)
}

fn status_color(status: ConnectionStatus) -> Color {
    match status {
        ConnectionStatus::Connected => Color::Green,
        ConnectionStatus::Connecting => Color::Yellow,
        ConnectionStatus::Disconnected => Color::Red,
    }
}

fn help_modal() -> ModalData {
    ModalData::new(
        "Keys",
        [
            "arrows            Move selection",
            "Enter / F2 / click  Edit cell (when connected)",
            "Enter / Tab       Commit edit",
            "Esc               Discard edit",
            "c                 Connect",
            "?                 This help",
            "q                 Quit",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
    )
}

impl<C: Connector> TuiApp<C> {
    fn new(session: Session<C>, viewport: Viewport) -> Self {
        Self {
            session,
            cursor: CellCoord::new(0, 0),
            viewport,
            modal: None,
            should_quit: false,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if self.modal.is_some() {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') | KeyCode::Char('?')) {
                self.modal = None;
            }
            return;
        }

        if self.session.pending_edit().is_some() {
            self.handle_edit_key(key);
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.modal = Some(help_modal()),
            KeyCode::Char('c') => {
                self.session.connect();
            }
            KeyCode::Up => self.move_cursor(0, -1),
            KeyCode::Down => self.move_cursor(0, 1),
            KeyCode::Left => self.move_cursor(-1, 0),
            KeyCode::Right => self.move_cursor(1, 0),
            KeyCode::Enter | KeyCode::F(2) => {
                self.session.click_cell(self.cursor);
            }
            _ => {}
        }
    }

    fn handle_edit_key(&mut self, key: KeyEvent) {
        // The terminal reports keypad Enter as Enter.
        match key.code {
            KeyCode::Enter => {
                self.session.key(EditKey::Enter);
            }
            KeyCode::Tab => {
                self.session.key(EditKey::Tab);
            }
            KeyCode::Esc => {
                self.session.key(EditKey::Escape);
            }
            KeyCode::Backspace => self.session.backspace(),
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.session.insert_char(ch)
            }
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent, area: Rect) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) || self.modal.is_some() {
            return;
        }
        let [header, grid, _] = split(area);

        if connect_button(header).contains(Position::new(mouse.column, mouse.row)) {
            self.session.connect();
            return;
        }

        match self.viewport.hit_test(grid, mouse.column, mouse.row) {
            Some(coord) => {
                // click_cell only acts while connected; leaving a cell must commit regardless
                if self.session.pending_edit().map_or(false, |p| p.coord != coord) {
                    self.session.blur();
                }
                self.cursor = coord;
                self.session.click_cell(coord);
            }
            None => {
                self.session.blur();
            }
        }
    }

    fn move_cursor(&mut self, dx: i64, dy: i64) {
        let x = (self.cursor.x as i64 + dx).max(0) as u32;
        let y = (self.cursor.y as i64 + dy).max(0) as u32;
        self.cursor = self.viewport.clamp(CellCoord::new(x, y));
    }

    fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let [header, grid, status] = split(area);

        self.draw_header(frame, header);
        self.draw_grid(frame, grid);
        self.draw_status(frame, status);

        if let Some(modal) = &self.modal {
            modal::draw(frame, area, modal);
        }
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect) {
        let connection = &self.session.state().connection;
        let title = Span::styled(
            " LiveGrid ",
            Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD),
        );
        let status = Span::styled(
            format!(" {} ", connection.status_text()),
            Style::default().fg(status_color(connection.status())).add_modifier(Modifier::BOLD),
        );
        frame.render_widget(Paragraph::new(Line::from(vec![title, status])), area);

        let button_style = if connection.can_connect() {
            Style::default().fg(Color::White).bg(Color::Blue).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray).bg(Color::Black)
        };
        frame.render_widget(
            Paragraph::new(Span::styled(CONNECT_LABEL, button_style)),
            connect_button(area),
        );
    }

    fn draw_grid(&self, frame: &mut Frame, area: Rect) {
        let vp = &self.viewport;
        let cells = &self.session.state().cells;
        let w = vp.col_width as usize;
        let gutter = vp.gutter_width() as usize;
        let cols = vp.scroll_col..vp.scroll_col + vp.visible_cols(area);
        let rows = vp.scroll_row..vp.scroll_row + vp.visible_rows(area);

        let mut lines: Vec<Line> = Vec::with_capacity(rows.len() + 1);

        let mut header = vec![Span::raw(" ".repeat(gutter + 1))];
        for x in cols.clone() {
            let style = if x == self.cursor.x {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            };
            let letters = col_to_letters(x);
            let pad = w.saturating_sub(letters.len());
            let centred = format!("{}{}", " ".repeat(pad / 2), letters);
            header.push(Span::styled(format!("{} ", util::pad_right(&centred, w)), style));
        }
        lines.push(Line::from(header));

        let pending = self.session.pending_edit();
        for y in rows {
            let row_style = if y == self.cursor.y {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            let mut spans = vec![Span::styled(format!("{:>gutter$} ", y + 1), row_style)];

            for x in cols.clone() {
                let coord = CellCoord::new(x, y);
                let is_cursor = coord == self.cursor;

                let (text, style) = match pending.filter(|p| p.coord == coord) {
                    Some(edit) => (
                        util::pad_right(&format!("{}_", util::tail_display(&edit.text, w - 1)), w),
                        Style::default().fg(Color::Black).bg(Color::Yellow),
                    ),
                    None => match cells.select(x, y) {
                        Some(cell) if cell.error.is_some() => (
                            util::pad_right(cell.display_text(), w),
                            Style::default().fg(Color::White).bg(Color::Red),
                        ),
                        Some(cell) => (util::align_cell(cell.display_text(), w), Style::default().fg(Color::Gray)),
                        None => (" ".repeat(w), Style::default()),
                    },
                };
                let style = if is_cursor && pending.is_none() {
                    style.add_modifier(Modifier::REVERSED)
                } else {
                    style
                };
                spans.push(Span::styled(text, style));
                spans.push(Span::raw(" "));
            }
            lines.push(Line::from(spans));
        }

        frame.render_widget(Paragraph::new(lines), area);
    }

    fn draw_status(&self, frame: &mut Frame, area: Rect) {
        let cell = self.session.state().cells.select(self.cursor.x, self.cursor.y);
        let detail = match cell {
            Some(c) => match (&c.expression, &c.error) {
                (_, Some(error)) => format!("! {}", error),
                (Some(expr), None) => expr.clone(),
                (None, None) => c.value.clone().unwrap_or_default(),
            },
            None => String::new(),
        };

        let left = format!(" {}  {}", self.cursor, detail);
        let right = if self.session.pending_edit().is_some() {
            "Enter/Tab: commit  Esc: discard "
        } else {
            "?: help  q: quit "
        };
        let padding = (area.width as usize).saturating_sub(util::display_width(&left) + right.len());
        let text = format!("{}{:pad$}{}", left, "", right, pad = padding);

        frame.render_widget(
            Paragraph::new(Span::styled(text, Style::default().fg(Color::Black).bg(Color::DarkGray)))
                .style(Style::default().bg(Color::DarkGray)),
            area,
        );
    }
}

/// Run the interactive grid until the user quits.
pub fn run<C: Connector>(session: Session<C>, viewport: Viewport, auto_connect: bool) -> Result<(), String> {
    let mut app = TuiApp::new(session, viewport);
    if auto_connect {
        app.session.connect();
    }

    terminal::enable_raw_mode().map_err(|e| format!("failed to enable raw mode: {}", e))?;
    stdout()
        .execute(EnterAlternateScreen)
        .map_err(|e| format!("failed to enter alternate screen: {}", e))?;
    let _ = stdout().execute(EnableMouseCapture);

    struct Cleanup;
    impl Drop for Cleanup {
        fn drop(&mut self) {
            let _ = stdout().execute(DisableMouseCapture);
            let _ = stdout().execute(LeaveAlternateScreen);
            let _ = terminal::disable_raw_mode();
        }
    }
    let _cleanup = Cleanup;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend).map_err(|e| format!("failed to create terminal: {}", e))?;

    loop {
        app.session.pump_events();

        let area = terminal
            .size()
            .map(|s| Rect::new(0, 0, s.width, s.height))
            .unwrap_or_default();
        let [_, grid, _] = split(area);
        app.viewport.ensure_visible(app.cursor, grid);

        terminal
            .draw(|frame| app.draw(frame))
            .map_err(|e| format!("draw error: {}", e))?;

        if event::poll(Duration::from_millis(50)).map_err(|e| format!("event poll error: {}", e))? {
            match event::read().map_err(|e| format!("event read error: {}", e))? {
                Event::Key(key) => app.handle_key(key),
                Event::Mouse(mouse) => app.handle_mouse(mouse, area),
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
