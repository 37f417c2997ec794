use std::mem;
use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use log::{debug, info};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Row, Table, TableState, Wrap};
use ratatui::Frame;

use crate::cache::QueryClient;
use crate::gateway::Record;
use crate::models::Venue;
use crate::router::Route;

use super::forms::{EntityForm, FormControls};
use super::helpers::{centered_rect, corner_stack};
use super::screens::{table_view, CrudScreen, EventScreen, ScreenView, TableRow, VenueScreen};
use super::toast::{Toast, ToastKind, Toasts};

const HEADER_HEIGHT: u16 = 3;

const FOOTER_HEIGHT: u16 = 3;

/// Three field lines, a spacer, the hint and the borders.
const FORM_HEIGHT: u16 = 7;

const TOAST_WIDTH: u16 = 42;

const PAGE: isize = 10;

/// What is mounted under the current location.
enum Screen {
    Index,
    Venues(VenueScreen),
    Events(EventScreen),
    /// No route matched; nothing is rendered.
    Blank,
}

enum Mode {
    Normal,
    /// Keys go to the form of the mounted screen.
    Form,
    /// Typing a path into the location bar.
    Location(String),
}

/// What a key did to a mounted screen.
enum Outcome {
    Stay,
    FocusForm,
    LeaveForm,
    Notify(Toast),
}

pub struct App {
    client: QueryClient,
    location: String,
    screen: Screen,
    mode: Mode,
    toasts: Toasts,
}

impl App {
    pub fn new(client: QueryClient, toast_ttl: Duration) -> Self {
        let mut app = Self {
            client,
            location: String::new(),
            screen: Screen::Blank,
            mode: Mode::Normal,
            toasts: Toasts::new(toast_ttl),
        };
        app.navigate(Route::Index.path());
        app
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn route(&self) -> Option<Route> {
        Route::resolve(&self.location)
    }

    /// Move to `location`. A different route unmounts the current screen,
    /// dropping its form, and mounts the new one; the same route is left alone.
    pub fn navigate(&mut self, location: &str) {
        let location = location.trim().to_string();
        let target = Route::resolve(&location);
        let unchanged = target.is_some() && target == self.route();
        self.location = location;
        self.mode = Mode::Normal;
        if unchanged {
            return;
        }

        self.screen = match target {
            Some(Route::Index) => Screen::Index,
            Some(Route::Venues) => Screen::Venues(VenueScreen::mount(&mut self.client)),
            Some(Route::Events) => Screen::Events(EventScreen::mount(&mut self.client)),
            None => Screen::Blank,
        };
        info!("navigated to {}", self.location);
    }

    /// Work that happens between frames: outstanding fetches and toast
    /// expiry. Returns true when the screen should be redrawn right away.
    pub fn tick(&mut self, now: Instant) -> bool {
        let fetched = self.client.run_pending();
        if fetched {
            self.clamp_selection();
        }
        let expired = self.toasts.expire(now);
        fetched || expired
    }

    /// Handle one key press. Returns true when the app should exit.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);
        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit),
            Mode::Form => self.handle_form_key(code),
            Mode::Location(input) => self.handle_location_key(code, input),
        };
        exit
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        match code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                *exit = true;
                return Mode::Normal;
            }
            KeyCode::Char('g') | KeyCode::Char('G') => {
                return Mode::Location(self.location.clone());
            }
            KeyCode::Char('1') => {
                self.navigate(Route::Index.path());
                return Mode::Normal;
            }
            KeyCode::Char('2') => {
                self.navigate(Route::Venues.path());
                return Mode::Normal;
            }
            KeyCode::Char('3') => {
                self.navigate(Route::Events.path());
                return Mode::Normal;
            }
            _ => {}
        }

        let client = &mut self.client;
        let outcome = match &mut self.screen {
            Screen::Venues(screen) => table_key(screen, client, code),
            Screen::Events(screen) => table_key(screen, client, code),
            Screen::Index | Screen::Blank => Outcome::Stay,
        };
        match outcome {
            Outcome::FocusForm => Mode::Form,
            Outcome::Notify(toast) => {
                self.notify(toast);
                Mode::Normal
            }
            Outcome::Stay | Outcome::LeaveForm => Mode::Normal,
        }
    }

    fn handle_form_key(&mut self, code: KeyCode) -> Mode {
        let client = &mut self.client;
        let outcome = match &mut self.screen {
            Screen::Venues(screen) => form_key(screen, client, code),
            Screen::Events(screen) => form_key(screen, client, code),
            Screen::Index | Screen::Blank => Outcome::LeaveForm,
        };
        match outcome {
            Outcome::LeaveForm => Mode::Normal,
            Outcome::Notify(toast) => {
                self.notify(toast);
                Mode::Form
            }
            Outcome::Stay | Outcome::FocusForm => Mode::Form,
        }
    }

    fn handle_location_key(&mut self, code: KeyCode, mut input: String) -> Mode {
        match code {
            KeyCode::Esc => Mode::Normal,
            KeyCode::Enter => {
                self.navigate(&input);
                Mode::Normal
            }
            KeyCode::Backspace => {
                input.pop();
                Mode::Location(input)
            }
            KeyCode::Char(ch) if !ch.is_control() => {
                input.push(ch);
                Mode::Location(input)
            }
            _ => Mode::Location(input),
        }
    }

    fn notify(&mut self, toast: Toast) {
        debug!("toast: {}", toast.title);
        self.toasts.push(toast, Instant::now());
    }

    fn clamp_selection(&mut self) {
        let client = &self.client;
        match &mut self.screen {
            Screen::Venues(screen) => {
                let len = screen.row_count(client);
                screen.ensure_in_bounds(len);
            }
            Screen::Events(screen) => {
                let len = screen.row_count(client);
                screen.ensure_in_bounds(len);
            }
            Screen::Index | Screen::Blank => {}
        }
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        self.draw_header(frame, chunks[0]);
        match &self.screen {
            Screen::Index => self.draw_index(frame, chunks[1]),
            Screen::Venues(screen) => self.draw_crud(frame, chunks[1], screen),
            Screen::Events(screen) => self.draw_crud(frame, chunks[1], screen),
            Screen::Blank => {}
        }
        self.draw_footer(frame, chunks[2]);

        if let Mode::Location(input) = &self.mode {
            self.draw_location_bar(frame, area, input);
        }
        self.draw_toasts(frame, area);
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect) {
        let current = self.route();
        let mut spans = Vec::new();
        for (index, route) in Route::ALL.into_iter().enumerate() {
            let style = if Some(route) == current {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            spans.push(Span::styled(format!(" {} {} ", index + 1, route.title()), style));
        }
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            self.location.clone(),
            Style::default().fg(Color::DarkGray),
        ));

        let block = Block::default().borders(Borders::ALL).title("Venue Manager");
        frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
    }

    fn draw_index(&self, frame: &mut Frame, area: Rect) {
        let lines = vec![
            Line::from(Span::styled(
                "Welcome",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from("Press 2 to manage venues or 3 to manage events."),
        ];
        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn draw_crud<F>(&self, frame: &mut Frame, area: Rect, screen: &CrudScreen<F>)
    where
        F: EntityForm + FormControls,
        F::Record: TableRow,
    {
        let rows = match table_view::<F::Record>(&self.client) {
            ScreenView::Loading => {
                frame.render_widget(Paragraph::new("Loading..."), area);
                return;
            }
            ScreenView::Error(message) => {
                let paragraph = Paragraph::new(Span::styled(
                    format!("Error: {message}"),
                    ToastKind::Error.style(),
                ))
                .wrap(Wrap { trim: true });
                frame.render_widget(paragraph, area);
                return;
            }
            ScreenView::Rows(rows) => rows,
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(FORM_HEIGHT), Constraint::Min(0)])
            .split(area);
        self.draw_form(frame, chunks[0], &screen.form);
        self.draw_table(frame, chunks[1], <F::Record as TableRow>::HEADERS, rows, screen.selected);
    }

    fn draw_form<F>(&self, frame: &mut Frame, area: Rect, form: &F)
    where
        F: EntityForm + FormControls,
    {
        let noun = <F::Record as Record>::NOUN;
        let action = if form.is_editing() { "Update" } else { "Add" };
        let focused = matches!(self.mode, Mode::Form);

        let border_style = if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let block = Block::default()
            .title(format!("{action} {noun}"))
            .borders(Borders::ALL)
            .border_style(border_style);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let mut lines = form.lines(self.client.read::<Venue>().data);
        lines.push(Line::from(""));
        let hint = if focused {
            format!("Enter to {action} {noun} • Tab to switch field • ←/→ to choose • Esc to leave")
        } else {
            "Tab to fill in the form".to_string()
        };
        lines.push(Line::from(Span::styled(hint, Style::default().fg(Color::Gray))));
        frame.render_widget(Paragraph::new(lines), inner);

        if focused {
            if let Some((row, column)) = form.cursor() {
                frame.set_cursor_position((inner.x + column, inner.y + row));
            }
        }
    }

    fn draw_table(
        &self,
        frame: &mut Frame,
        area: Rect,
        headers: [&'static str; 3],
        rows: Vec<[String; 3]>,
        selected: usize,
    ) {
        let block = Block::default().borders(Borders::ALL);
        if rows.is_empty() {
            let paragraph = Paragraph::new(Span::styled(
                "Nothing here yet.",
                Style::default().fg(Color::DarkGray),
            ))
            .block(block);
            frame.render_widget(paragraph, area);
            return;
        }

        let header = Row::new(headers).style(Style::default().add_modifier(Modifier::BOLD));
        let table = Table::new(
            rows.into_iter().map(Row::new),
            [
                Constraint::Percentage(45),
                Constraint::Percentage(25),
                Constraint::Percentage(30),
            ],
        )
        .header(header)
        .block(block)
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("▶ ");

        let mut state = TableState::default().with_selected(Some(selected));
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let paragraph = Paragraph::new(self.footer_instructions()).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        match (&self.screen, &self.mode) {
            (_, Mode::Location(_)) => Line::from(vec![
                Span::styled("[Enter]", key_style),
                Span::raw(" Go   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Cancel"),
            ]),
            (_, Mode::Form) => Line::from(vec![
                Span::styled("[Tab]", key_style),
                Span::raw(" Next Field   "),
                Span::styled("[←→]", key_style),
                Span::raw(" Choose   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" Submit   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Back to List"),
            ]),
            (Screen::Venues(_) | Screen::Events(_), Mode::Normal) => Line::from(vec![
                Span::styled("[↑↓]", key_style),
                Span::raw(" Navigate   "),
                Span::styled("[Tab]", key_style),
                Span::raw(" Form   "),
                Span::styled("[e]", key_style),
                Span::raw(" Edit   "),
                Span::styled("[d]", key_style),
                Span::raw(" Delete   "),
                Span::styled("[1-3]", key_style),
                Span::raw(" Pages   "),
                Span::styled("[g]", key_style),
                Span::raw(" Go To   "),
                Span::styled("[q]", key_style),
                Span::raw(" Quit"),
            ]),
            (Screen::Index | Screen::Blank, Mode::Normal) => Line::from(vec![
                Span::styled("[1-3]", key_style),
                Span::raw(" Pages   "),
                Span::styled("[g]", key_style),
                Span::raw(" Go To   "),
                Span::styled("[q]", key_style),
                Span::raw(" Quit"),
            ]),
        }
    }

    /// Three rows tall, pulled up when the terminal is too short to fit it
    /// where it would be centered.
    fn draw_location_bar(&self, frame: &mut Frame, area: Rect, input: &str) {
        let popup = centered_rect(60, 20, area);
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            y: popup.y.min(area.bottom() - height),
            height,
            ..popup
        };
        frame.render_widget(Clear, popup_area);

        let block = Block::default().borders(Borders::ALL).title("Go to");
        let paragraph = Paragraph::new(Span::raw(format!("Path: {input}"))).block(block.clone());
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        if inner.height > 0 {
            let cursor_x = inner.x + "Path: ".len() as u16 + input.chars().count() as u16;
            frame.set_cursor_position((cursor_x, inner.y));
        }
    }

    fn draw_toasts(&self, frame: &mut Frame, area: Rect) {
        if self.toasts.is_empty() {
            return;
        }
        let heights: Vec<u16> = self
            .toasts
            .iter()
            .map(|toast| if toast.description.is_some() { 4 } else { 3 })
            .collect();
        let rects = corner_stack(area, TOAST_WIDTH, &heights);

        for (toast, rect) in self.toasts.iter().zip(rects) {
            frame.render_widget(Clear, rect);
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(toast.kind.style());
            let mut lines = vec![Line::from(Span::styled(
                toast.title.clone(),
                toast.kind.style().add_modifier(Modifier::BOLD),
            ))];
            if let Some(description) = &toast.description {
                lines.push(Line::from(description.clone()));
            }
            let paragraph = Paragraph::new(lines).block(block);
            frame.render_widget(paragraph, rect);
        }
    }
}

/// Keys for a list screen while the form does not have focus. Nothing but
/// navigation works until the screen's table has loaded.
fn table_key<F>(screen: &mut CrudScreen<F>, client: &mut QueryClient, code: KeyCode) -> Outcome
where
    F: EntityForm + FormControls,
    F::Record: TableRow,
{
    if !matches!(table_view::<F::Record>(client), ScreenView::Rows(_)) {
        return Outcome::Stay;
    }
    let len = screen.row_count(client);
    match code {
        KeyCode::Up | KeyCode::Char('k') => screen.move_selection(-1, len),
        KeyCode::Down | KeyCode::Char('j') => screen.move_selection(1, len),
        KeyCode::PageUp => screen.move_selection(-PAGE, len),
        KeyCode::PageDown => screen.move_selection(PAGE, len),
        KeyCode::Home => screen.select_first(),
        KeyCode::End => screen.select_last(len),
        KeyCode::Tab | KeyCode::Char('a') | KeyCode::Char('A') => return Outcome::FocusForm,
        KeyCode::Char('e') | KeyCode::Char('E') | KeyCode::Enter => {
            if screen.edit_selected(client) {
                return Outcome::FocusForm;
            }
        }
        KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Delete => {
            if let Some(toast) = screen.delete_selected(client) {
                return Outcome::Notify(toast);
            }
        }
        _ => {}
    }
    Outcome::Stay
}

/// Keys while the form has focus. Esc leaves the form with its contents kept.
fn form_key<F>(screen: &mut CrudScreen<F>, client: &mut QueryClient, code: KeyCode) -> Outcome
where
    F: EntityForm + FormControls,
    F::Record: TableRow,
{
    if !matches!(table_view::<F::Record>(client), ScreenView::Rows(_)) {
        return Outcome::LeaveForm;
    }
    match code {
        KeyCode::Esc => return Outcome::LeaveForm,
        KeyCode::Tab | KeyCode::Down => screen.form.next_field(),
        KeyCode::BackTab | KeyCode::Up => screen.form.previous_field(),
        KeyCode::Left => screen.form.cycle(-1, client.read::<Venue>().data),
        KeyCode::Right => screen.form.cycle(1, client.read::<Venue>().data),
        KeyCode::Backspace => screen.form.backspace(),
        KeyCode::Enter => return Outcome::Notify(screen.submit(client)),
        KeyCode::Char(ch) => {
            screen.form.push_char(ch);
        }
        _ => {}
    }
    Outcome::Stay
}

#[cfg(test)]
mod tests {
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    use super::*;
    use crate::error::GatewayError;
    use crate::gateway::fake::{Call, FakeGateway};
    use crate::models::VenueType;

    fn hall() -> Venue {
        Venue {
            id: 1,
            name: "Hall A".to_string(),
            capacity: 200,
            kind: VenueType::Indoor,
        }
    }

    fn app_over(gateway: &FakeGateway) -> App {
        App::new(
            QueryClient::new(Box::new(gateway.clone())),
            Duration::from_secs(5),
        )
    }

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for row in buffer.content.chunks(buffer.area.width as usize) {
            for cell in row {
                out.push_str(cell.symbol());
            }
            out.push('\n');
        }
        out
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.handle_key(KeyCode::Char(ch));
        }
    }

    #[test]
    fn starts_on_the_index() {
        let gateway = FakeGateway::default();
        let app = app_over(&gateway);
        assert_eq!(app.route(), Some(Route::Index));
        assert!(render(&app).contains("Welcome"));
        assert!(gateway.calls().is_empty());
    }

    #[test]
    fn venue_screen_shows_loading_then_rows() {
        let gateway = FakeGateway::with_rows(vec![hall()], vec![]);
        let mut app = app_over(&gateway);

        app.handle_key(KeyCode::Char('2'));
        assert_eq!(app.location(), "/venues");
        assert!(render(&app).contains("Loading..."));

        assert!(app.tick(Instant::now()));
        let screen = render(&app);
        assert!(screen.contains("Hall A"));
        assert!(screen.contains("Add Venue"));
    }

    #[test]
    fn failed_fetch_replaces_the_screen_with_the_error() {
        let gateway = FakeGateway::default();
        gateway.fail_lists(Some(GatewayError::Network("network error".to_string())));
        let mut app = app_over(&gateway);

        app.navigate("/venues");
        app.tick(Instant::now());
        let screen = render(&app);
        assert!(screen.contains("Error: network error"));
        assert!(!screen.contains("Add Venue"));

        app.handle_key(KeyCode::Tab);
        assert!(matches!(app.mode, Mode::Normal));
    }

    #[test]
    fn adding_a_venue_from_the_keyboard() {
        let gateway = FakeGateway::default();
        let mut app = app_over(&gateway);
        app.navigate("/venues");
        app.tick(Instant::now());
        gateway.clear_calls();

        app.handle_key(KeyCode::Tab);
        type_text(&mut app, "Field B");
        app.handle_key(KeyCode::Tab);
        type_text(&mut app, "500");
        app.handle_key(KeyCode::Tab);
        app.handle_key(KeyCode::Right);
        app.handle_key(KeyCode::Right);
        app.handle_key(KeyCode::Enter);

        assert!(render(&app).contains("Venue added."));
        assert!(matches!(gateway.calls().first(), Some(Call::InsertVenue(_))));

        app.tick(Instant::now());
        let venues = gateway.venues();
        assert_eq!(venues.len(), 1);
        assert_eq!(venues[0].kind, VenueType::Outdoor);
        assert!(render(&app).contains("Field B"));
    }

    #[test]
    fn escape_keeps_the_form_and_navigation_drops_it() {
        let gateway = FakeGateway::default();
        let mut app = app_over(&gateway);
        app.navigate("/venues");
        app.tick(Instant::now());

        app.handle_key(KeyCode::Tab);
        type_text(&mut app, "Draft");
        app.handle_key(KeyCode::Esc);
        assert!(render(&app).contains("Draft"));

        app.navigate("/venues/");
        assert!(render(&app).contains("Draft"));

        app.handle_key(KeyCode::Char('1'));
        app.handle_key(KeyCode::Char('2'));
        app.tick(Instant::now());
        assert!(!render(&app).contains("Draft"));
    }

    #[test]
    fn location_bar_routes_and_unknown_paths_render_nothing() {
        let gateway = FakeGateway::default();
        let mut app = app_over(&gateway);

        app.handle_key(KeyCode::Char('g'));
        for _ in 0.."/".len() {
            app.handle_key(KeyCode::Backspace);
        }
        type_text(&mut app, "/nowhere");
        app.handle_key(KeyCode::Enter);

        assert_eq!(app.location(), "/nowhere");
        assert_eq!(app.route(), None);
        let screen = render(&app);
        assert!(!screen.contains("Welcome"));
        assert!(!screen.contains("Loading..."));
    }

    #[test]
    fn location_bar_fits_short_terminals() {
        let gateway = FakeGateway::default();
        let mut app = app_over(&gateway);
        app.handle_key(KeyCode::Char('g'));

        for height in 1..=12 {
            let mut terminal = Terminal::new(TestBackend::new(80, height)).unwrap();
            terminal.draw(|frame| app.draw(frame)).unwrap();
        }
        assert!(render(&app).contains("Path: /"));
    }

    #[test]
    fn toasts_disappear_after_their_lifetime() {
        let gateway = FakeGateway::with_rows(vec![hall()], vec![]);
        let mut app = app_over(&gateway);
        app.navigate("/venues");
        app.tick(Instant::now());

        app.handle_key(KeyCode::Char('d'));
        assert!(render(&app).contains("Venue deleted."));

        assert!(app.tick(Instant::now() + Duration::from_secs(6)));
        assert!(!render(&app).contains("Venue deleted."));
    }

    #[test]
    fn q_quits_outside_the_form_only() {
        let gateway = FakeGateway::default();
        let mut app = app_over(&gateway);
        app.navigate("/venues");
        app.tick(Instant::now());

        app.handle_key(KeyCode::Tab);
        assert!(!app.handle_key(KeyCode::Char('q')));
        app.handle_key(KeyCode::Esc);
        assert!(app.handle_key(KeyCode::Char('q')));
    }
}
