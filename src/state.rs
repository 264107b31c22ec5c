use std::collections::VecDeque;
use std::time::{Duration, Instant};

use chrono::{Local, Utc};

use crate::config::{DisplayConfig, MIN_REFRESH_SECS};
use crate::stats_fetch::{FetchError, UserStats};
use crate::summary::{self, IndicatorAction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Status,
    Settings,
}

/// Indicator lifecycle: every trigger goes back through `Loading`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Displaying,
    ErrorDisplayed,
}

#[derive(Debug, Clone)]
pub struct Indicator {
    pub phase: Phase,
    pub status: String,
    pub tooltip: String,
    pub action: IndicatorAction,
}

impl Indicator {
    fn idle() -> Self {
        Self {
            phase: Phase::Idle,
            status: "FAH".to_string(),
            tooltip: "Folding@Home statistics".to_string(),
            action: IndicatorAction::Retry,
        }
    }
}

/// The single refresh timer. Replacing the period discards the old deadline,
/// so there is never more than one pending fire.
#[derive(Debug, Clone, Copy)]
pub struct RefreshTimer {
    period: Duration,
    deadline: Instant,
}

impl RefreshTimer {
    pub fn new(period_secs: u64, now: Instant) -> Self {
        let period = Duration::from_secs(period_secs.max(MIN_REFRESH_SECS));
        Self {
            period,
            deadline: now + period,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn set_period(&mut self, period_secs: u64, now: Instant) {
        *self = Self::new(period_secs, now);
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.deadline
    }

    pub fn rearm(&mut self, now: Instant) {
        self.deadline = now + self.period;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    UserId,
    TeamName,
    Passkey,
    RefreshInterval,
    ShowLastWork,
}

pub const SETTINGS_FIELDS: [SettingsField; 5] = [
    SettingsField::UserId,
    SettingsField::TeamName,
    SettingsField::Passkey,
    SettingsField::RefreshInterval,
    SettingsField::ShowLastWork,
];

pub fn settings_field_label(field: SettingsField) -> &'static str {
    match field {
        SettingsField::UserId => "User ID",
        SettingsField::TeamName => "Preferred Team",
        SettingsField::Passkey => "Passkey",
        SettingsField::RefreshInterval => "Refresh Interval (s)",
        SettingsField::ShowLastWork => "Show Last Work",
    }
}

#[derive(Debug, Clone)]
pub struct SettingsForm {
    pub selected: usize,
    pub editing: bool,
    pub buffer: String,
    pub draft: DisplayConfig,
    pub error: Option<String>,
}

impl SettingsForm {
    pub fn open(config: &DisplayConfig) -> Self {
        Self {
            selected: 0,
            editing: false,
            buffer: String::new(),
            draft: config.clone(),
            error: None,
        }
    }

    pub fn selected_field(&self) -> SettingsField {
        SETTINGS_FIELDS[self.selected.min(SETTINGS_FIELDS.len() - 1)]
    }

    pub fn select_next(&mut self) {
        self.selected = (self.selected + 1) % SETTINGS_FIELDS.len();
    }

    pub fn select_prev(&mut self) {
        if self.selected == 0 {
            self.selected = SETTINGS_FIELDS.len() - 1;
        } else {
            self.selected -= 1;
        }
    }

    pub fn field_value(&self, field: SettingsField) -> String {
        match field {
            SettingsField::UserId => self.draft.user_name.clone(),
            SettingsField::TeamName => self.draft.team_name.clone(),
            SettingsField::Passkey => summary::mask_passkey(&self.draft.passkey),
            SettingsField::RefreshInterval => self.draft.refresh_interval.to_string(),
            SettingsField::ShowLastWork => {
                if self.draft.show_last_work { "yes" } else { "no" }.to_string()
            }
        }
    }

    /// Enter on a text field starts editing; on the toggle it flips the value.
    pub fn activate(&mut self) {
        self.error = None;
        match self.selected_field() {
            SettingsField::ShowLastWork => {
                self.draft.show_last_work = !self.draft.show_last_work;
            }
            SettingsField::UserId => self.start_edit(self.draft.user_name.clone()),
            SettingsField::TeamName => self.start_edit(self.draft.team_name.clone()),
            // Edit the real passkey, not its masked rendering.
            SettingsField::Passkey => self.start_edit(self.draft.passkey.clone()),
            SettingsField::RefreshInterval => {
                self.start_edit(self.draft.refresh_interval.to_string())
            }
        }
    }

    fn start_edit(&mut self, current: String) {
        self.editing = true;
        self.buffer = current;
    }

    pub fn input_char(&mut self, ch: char) {
        if self.editing {
            self.buffer.push(ch);
        }
    }

    pub fn backspace(&mut self) {
        if self.editing {
            self.buffer.pop();
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editing = false;
        self.buffer.clear();
    }

    pub fn commit_edit(&mut self) {
        if !self.editing {
            return;
        }
        let value = self.buffer.trim().to_string();
        match self.selected_field() {
            SettingsField::UserId => self.draft.user_name = value,
            SettingsField::TeamName => self.draft.team_name = value,
            SettingsField::Passkey => self.draft.passkey = value,
            SettingsField::RefreshInterval => match value.parse::<u64>() {
                Ok(secs) => {
                    self.draft.refresh_interval = secs.max(MIN_REFRESH_SECS);
                }
                Err(_) => {
                    self.error = Some("Refresh interval must be a number of seconds".to_string());
                }
            },
            SettingsField::ShowLastWork => {}
        }
        self.editing = false;
        self.buffer.clear();
    }

    /// Validate the draft for saving. An empty user id is allowed (the
    /// indicator falls back to configure guidance); a non-numeric one is not.
    pub fn finish(&mut self) -> Option<DisplayConfig> {
        let user = self.draft.user_name.trim();
        if !user.is_empty() && !user.bytes().all(|b| b.is_ascii_digit()) {
            self.error = Some("User ID must be numeric (e.g. 123456789)".to_string());
            return None;
        }
        let mut config = self.draft.clone();
        config.user_name = user.to_string();
        config.team_name = config.team_name.trim().to_string();
        config.passkey = config.passkey.trim().to_string();
        config.clamp_interval();
        Some(config)
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub config: DisplayConfig,
    pub indicator: Indicator,
    pub last_updated: Option<String>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
    pub settings: SettingsForm,
}

impl AppState {
    pub fn new(config: DisplayConfig) -> Self {
        let settings = SettingsForm::open(&config);
        Self {
            screen: Screen::Status,
            config,
            indicator: Indicator::idle(),
            last_updated: None,
            logs: VecDeque::with_capacity(200),
            help_overlay: false,
            settings,
        }
    }

    pub fn begin_loading(&mut self) {
        self.indicator.phase = Phase::Loading;
        self.indicator.status = "FAH: Loading stats…".to_string();
        // Tooltip keeps the previous content until the fetch settles.
    }

    pub fn set_configure_needed(&mut self) {
        self.indicator = Indicator {
            phase: Phase::Idle,
            status: "FAH: Configure user ID".to_string(),
            tooltip: "No Folding@Home user ID is configured.\n\nPress Enter to open settings."
                .to_string(),
            action: IndicatorAction::OpenSettings,
        };
    }

    pub fn open_settings(&mut self) {
        self.settings = SettingsForm::open(&self.config);
        self.screen = Screen::Settings;
    }

    pub fn close_settings(&mut self) {
        self.screen = Screen::Status;
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }
}

#[derive(Debug)]
pub enum Delta {
    StatsFetched { user: UserStats },
    StatsFailed { error: FetchError },
    Log(String),
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    FetchStats { user_id: String },
}

/// Fold a provider delta into app state. Whichever response lands last wins;
/// there is no ordering guarantee between overlapping fetches.
pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::StatsFetched { user } => {
            let (status, tooltip) = summary::build_presentation(&user, &state.config, Utc::now());
            state.indicator = Indicator {
                phase: Phase::Displaying,
                status,
                tooltip,
                action: IndicatorAction::Retry,
            };
            state.last_updated = Some(Local::now().format("%H:%M:%S").to_string());
            state.push_log("[INFO] Stats updated");
        }
        Delta::StatsFailed { error } => {
            let presented = summary::present_error(&error);
            state.indicator = Indicator {
                phase: Phase::ErrorDisplayed,
                status: presented.status,
                tooltip: presented.tooltip,
                action: presented.action,
            };
            state.push_log(format!("[WARN] Fetch failed: {error}"));
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}
