use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use fah_terminal::config::{self, DisplayConfig};
use fah_terminal::feed;
use fah_terminal::state::{
    self, AppState, Phase, ProviderCommand, RefreshTimer, SETTINGS_FIELDS, Screen,
    settings_field_label,
};
use fah_terminal::summary::IndicatorAction;

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: mpsc::Sender<ProviderCommand>,
    timer: RefreshTimer,
}

impl App {
    fn new(config: DisplayConfig, cmd_tx: mpsc::Sender<ProviderCommand>) -> Self {
        let timer = RefreshTimer::new(config.refresh_interval, Instant::now());
        Self {
            state: AppState::new(config),
            should_quit: false,
            cmd_tx,
            timer,
        }
    }

    fn bootstrap(&mut self) {
        if self.state.config.has_user() {
            self.request_refresh(false);
        } else {
            self.state.set_configure_needed();
            self.state.open_settings();
            self.state.push_log("[INFO] No user ID configured yet");
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match self.state.screen {
            Screen::Status => self.on_status_key(key),
            Screen::Settings => self.on_settings_key(key),
        }
    }

    fn on_status_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('r') => self.request_refresh(true),
            KeyCode::Char('s') => self.state.open_settings(),
            KeyCode::Char('x') => self.reset_config(),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Enter => match self.state.indicator.action {
                IndicatorAction::Retry => self.request_refresh(true),
                IndicatorAction::OpenSettings => self.state.open_settings(),
            },
            _ => {}
        }
    }

    fn on_settings_key(&mut self, key: KeyEvent) {
        if self.state.settings.editing {
            match key.code {
                KeyCode::Enter => self.state.settings.commit_edit(),
                KeyCode::Esc => self.state.settings.cancel_edit(),
                KeyCode::Backspace => self.state.settings.backspace(),
                KeyCode::Char(ch) => self.state.settings.input_char(ch),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.state.settings.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.settings.select_prev(),
            KeyCode::Enter => self.state.settings.activate(),
            KeyCode::Char('s') => self.save_settings(),
            KeyCode::Char('b') | KeyCode::Esc => self.state.close_settings(),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => {}
        }
    }

    fn request_refresh(&mut self, announce: bool) {
        if !self.state.config.has_user() {
            self.state.set_configure_needed();
            return;
        }
        self.state.begin_loading();
        let user_id = self.state.config.user_name.trim().to_string();
        if self
            .cmd_tx
            .send(ProviderCommand::FetchStats { user_id })
            .is_err()
        {
            self.state.push_log("[WARN] Stats request failed");
        } else if announce {
            self.state.push_log("[INFO] Refresh requested");
        }
        self.timer.rearm(Instant::now());
    }

    fn maybe_refresh(&mut self) {
        if self.timer.is_due(Instant::now()) {
            self.request_refresh(false);
        }
    }

    fn save_settings(&mut self) {
        let Some(config) = self.state.settings.finish() else {
            return;
        };
        if let Err(err) = config::save(&config) {
            self.state.push_log(format!("[WARN] Config save failed: {err:#}"));
        }
        let interval_changed = config.refresh_interval != self.state.config.refresh_interval;
        self.state.config = config;
        if interval_changed {
            // Rearm from now; the old deadline is gone with the old timer.
            self.timer
                .set_period(self.state.config.refresh_interval, Instant::now());
            self.state.push_log(format!(
                "[INFO] Refresh interval set to {}s",
                self.state.config.refresh_interval
            ));
        }
        self.state.close_settings();
        if self.state.config.has_user() {
            self.request_refresh(true);
        } else {
            self.state.set_configure_needed();
        }
    }

    fn reset_config(&mut self) {
        match config::reset() {
            Ok(config) => {
                self.timer
                    .set_period(config.refresh_interval, Instant::now());
                self.state.config = config;
                self.state.push_log("[INFO] Configuration cleared");
                self.state.set_configure_needed();
                self.state.open_settings();
            }
            Err(err) => {
                self.state
                    .push_log(format!("[WARN] Config reset failed: {err:#}"));
            }
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    feed::spawn_provider(tx, cmd_rx);

    let mut app = App::new(config::load(), cmd_tx);
    app.bootstrap();
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<state::Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            state::apply_delta(&mut app.state, delta);
        }

        app.maybe_refresh();

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Status => render_status(frame, chunks[1], &app.state),
        Screen::Settings => render_settings(frame, chunks[1], &app.state),
    }

    let footer = Paragraph::new(footer_text(&app.state))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[2]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let user = if state.config.has_user() {
        format!("user {}", state.config.user_name.trim())
    } else {
        "no user configured".to_string()
    };
    format!(
        "FAH TERMINAL | {} | refresh every {}s",
        user, state.config.refresh_interval
    )
}

fn footer_text(state: &AppState) -> String {
    match state.screen {
        Screen::Status => {
            "r Refresh | Enter Action | s Settings | x Reset | ? Help | q Quit".to_string()
        }
        Screen::Settings => {
            if state.settings.editing {
                "Type to edit | Enter Apply | Esc Cancel".to_string()
            } else {
                "j/k/↑/↓ Move | Enter Edit/Toggle | s Save | b/Esc Back | q Quit".to_string()
            }
        }
    }
}

fn render_status(frame: &mut Frame, area: Rect, state: &AppState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(6),
        ])
        .split(area);

    let indicator = Paragraph::new(state.indicator.status.clone())
        .style(phase_style(state.indicator.phase))
        .block(Block::default().title("Status").borders(Borders::ALL));
    frame.render_widget(indicator, sections[0]);

    let details_title = match &state.last_updated {
        Some(at) => format!("Details (updated {at})"),
        None => "Details".to_string(),
    };
    let details = Paragraph::new(state.indicator.tooltip.clone())
        .wrap(Wrap { trim: false })
        .block(Block::default().title(details_title).borders(Borders::ALL));
    frame.render_widget(details, sections[1]);

    let console = Paragraph::new(console_text(state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, sections[2]);
}

fn phase_style(phase: Phase) -> Style {
    match phase {
        Phase::Idle => Style::default().fg(Color::DarkGray),
        Phase::Loading => Style::default().fg(Color::Yellow),
        Phase::Displaying => Style::default(),
        Phase::ErrorDisplayed => Style::default().fg(Color::Red),
    }
}

fn render_settings(frame: &mut Frame, area: Rect, state: &AppState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(SETTINGS_FIELDS.len() as u16 + 2),
            Constraint::Length(2),
            Constraint::Min(1),
        ])
        .split(area);

    let form = &state.settings;
    let mut lines = Vec::new();
    for (idx, field) in SETTINGS_FIELDS.iter().enumerate() {
        let selected = idx == form.selected;
        let marker = if selected { "> " } else { "  " };
        let value = if selected && form.editing {
            format!("{}_", form.buffer)
        } else {
            form.field_value(*field)
        };
        let style = if selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        lines.push(Line::styled(
            format!("{marker}{:<22}{value}", settings_field_label(*field)),
            style,
        ));
    }
    let fields = Paragraph::new(lines)
        .block(Block::default().title("Settings").borders(Borders::ALL));
    frame.render_widget(fields, sections[0]);

    if let Some(error) = &form.error {
        let error_line = Paragraph::new(error.clone()).style(Style::default().fg(Color::Red));
        frame.render_widget(error_line, sections[1]);
    }

    let hint = Paragraph::new(
        "User ID is your numeric Folding@Home donor id.\n\
         The passkey is display-only and never sent anywhere.",
    )
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(hint, sections[2]);
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(4)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "FAH Terminal - Help",
        "",
        "Status:",
        "  r            Refresh now",
        "  Enter        Run indicator action (retry / open settings)",
        "  s            Settings",
        "  x            Reset configuration",
        "",
        "Settings:",
        "  j/k or ↑/↓   Move",
        "  Enter        Edit field / toggle",
        "  s            Save and refresh",
        "  b / Esc      Back without saving",
        "",
        "Global:",
        "  ?            Toggle help",
        "  q            Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
