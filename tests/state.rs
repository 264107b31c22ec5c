use std::time::{Duration, Instant};

use fah_terminal::config::{DEFAULT_REFRESH_SECS, DisplayConfig, MIN_REFRESH_SECS};
use fah_terminal::state::{
    AppState, Delta, Phase, RefreshTimer, Screen, SettingsField, SettingsForm, apply_delta,
};
use fah_terminal::stats_fetch::{FetchError, UserStats};
use fah_terminal::summary::IndicatorAction;

fn configured() -> DisplayConfig {
    DisplayConfig {
        user_name: "862139".to_string(),
        ..DisplayConfig::default()
    }
}

#[test]
fn timer_fires_only_after_its_period() {
    let now = Instant::now();
    let timer = RefreshTimer::new(300, now);
    assert!(!timer.is_due(now + Duration::from_secs(299)));
    assert!(timer.is_due(now + Duration::from_secs(300)));
}

#[test]
fn changing_the_period_replaces_the_old_deadline() {
    let now = Instant::now();
    let mut timer = RefreshTimer::new(300, now);
    timer.set_period(60, now);
    // One timer, one deadline: the new period applies, the old one is gone.
    assert_eq!(timer.period(), Duration::from_secs(60));
    assert!(!timer.is_due(now + Duration::from_secs(59)));
    assert!(timer.is_due(now + Duration::from_secs(60)));
}

#[test]
fn timer_period_clamps_to_the_minimum() {
    let now = Instant::now();
    let timer = RefreshTimer::new(3, now);
    assert_eq!(timer.period(), Duration::from_secs(MIN_REFRESH_SECS));
}

#[test]
fn rearm_pushes_the_deadline_forward() {
    let now = Instant::now();
    let mut timer = RefreshTimer::new(60, now);
    let later = now + Duration::from_secs(60);
    assert!(timer.is_due(later));
    timer.rearm(later);
    assert!(!timer.is_due(later + Duration::from_secs(59)));
    assert!(timer.is_due(later + Duration::from_secs(60)));
}

#[test]
fn config_defaults_match_the_documented_surface() {
    let config = DisplayConfig::default();
    assert_eq!(config.refresh_interval, DEFAULT_REFRESH_SECS);
    assert!(config.show_last_work);
    assert!(!config.has_user());
    assert!(config.preferred_team().is_none());
}

#[test]
fn config_deserializes_with_defaults_for_missing_fields() {
    let config: DisplayConfig = serde_json::from_str("{}").expect("empty object");
    assert_eq!(config.refresh_interval, DEFAULT_REFRESH_SECS);
    assert!(config.show_last_work);
    assert_eq!(config.user_name, "");
}

#[test]
fn interval_clamps_to_minimum() {
    let mut config = DisplayConfig {
        refresh_interval: 2,
        ..DisplayConfig::default()
    };
    config.clamp_interval();
    assert_eq!(config.refresh_interval, MIN_REFRESH_SECS);
}

#[test]
fn successful_fetch_moves_indicator_to_displaying() {
    let mut state = AppState::new(configured());
    state.begin_loading();
    assert_eq!(state.indicator.phase, Phase::Loading);

    let user = UserStats {
        name: Some("jsmith".to_string()),
        score: Some(1_000),
        ..UserStats::default()
    };
    apply_delta(&mut state, Delta::StatsFetched { user });
    assert_eq!(state.indicator.phase, Phase::Displaying);
    assert!(state.indicator.status.contains("jsmith"));
    assert_eq!(state.indicator.action, IndicatorAction::Retry);
    assert!(state.last_updated.is_some());
}

#[test]
fn failed_fetch_moves_indicator_to_error() {
    let mut state = AppState::new(configured());
    state.begin_loading();
    apply_delta(
        &mut state,
        Delta::StatsFailed {
            error: FetchError::NotFound("no such user".to_string()),
        },
    );
    assert_eq!(state.indicator.phase, Phase::ErrorDisplayed);
    assert_eq!(state.indicator.status, "FAH: User not found");
    assert_eq!(state.indicator.action, IndicatorAction::OpenSettings);
}

#[test]
fn next_trigger_returns_to_loading_after_an_error() {
    let mut state = AppState::new(configured());
    apply_delta(
        &mut state,
        Delta::StatsFailed {
            error: FetchError::Timeout,
        },
    );
    assert_eq!(state.indicator.phase, Phase::ErrorDisplayed);
    state.begin_loading();
    assert_eq!(state.indicator.phase, Phase::Loading);
}

#[test]
fn log_deltas_land_in_the_console_buffer() {
    let mut state = AppState::new(configured());
    apply_delta(&mut state, Delta::Log("[INFO] hello".to_string()));
    assert_eq!(state.logs.back().map(String::as_str), Some("[INFO] hello"));
}

#[test]
fn log_buffer_is_bounded() {
    let mut state = AppState::new(configured());
    for i in 0..500 {
        state.push_log(format!("line {i}"));
    }
    assert!(state.logs.len() <= 200);
    assert_eq!(state.logs.back().map(String::as_str), Some("line 499"));
}

#[test]
fn settings_form_edits_land_in_the_draft() {
    let mut form = SettingsForm::open(&DisplayConfig::default());
    assert_eq!(form.selected_field(), SettingsField::UserId);
    form.activate();
    assert!(form.editing);
    for ch in "862139".chars() {
        form.input_char(ch);
    }
    form.commit_edit();
    assert!(!form.editing);
    assert_eq!(form.draft.user_name, "862139");
}

#[test]
fn settings_form_rejects_non_numeric_interval() {
    let mut form = SettingsForm::open(&DisplayConfig::default());
    while form.selected_field() != SettingsField::RefreshInterval {
        form.select_next();
    }
    form.activate();
    form.buffer.clear();
    for ch in "soon".chars() {
        form.input_char(ch);
    }
    form.commit_edit();
    assert!(form.error.is_some());
    assert_eq!(form.draft.refresh_interval, DEFAULT_REFRESH_SECS);
}

#[test]
fn settings_form_clamps_low_intervals() {
    let mut form = SettingsForm::open(&DisplayConfig::default());
    while form.selected_field() != SettingsField::RefreshInterval {
        form.select_next();
    }
    form.activate();
    form.buffer.clear();
    form.input_char('5');
    form.commit_edit();
    assert_eq!(form.draft.refresh_interval, MIN_REFRESH_SECS);
}

#[test]
fn settings_form_refuses_to_save_non_numeric_user_id() {
    let mut form = SettingsForm::open(&DisplayConfig::default());
    form.draft.user_name = "abc123".to_string();
    assert!(form.finish().is_none());
    assert!(form.error.is_some());
}

#[test]
fn settings_form_toggle_flips_show_last_work() {
    let mut form = SettingsForm::open(&DisplayConfig::default());
    while form.selected_field() != SettingsField::ShowLastWork {
        form.select_next();
    }
    form.activate();
    assert!(!form.draft.show_last_work);
    form.activate();
    assert!(form.draft.show_last_work);
}

#[test]
fn settings_form_masks_the_passkey_preview() {
    let mut config = DisplayConfig::default();
    config.passkey = "abcdef0123456789".to_string();
    let form = SettingsForm::open(&config);
    let shown = form.field_value(SettingsField::Passkey);
    assert_eq!(shown, "abcd…");
}

#[test]
fn configure_needed_points_at_settings() {
    let mut state = AppState::new(DisplayConfig::default());
    state.set_configure_needed();
    assert_eq!(state.indicator.status, "FAH: Configure user ID");
    assert_eq!(state.indicator.action, IndicatorAction::OpenSettings);
    state.open_settings();
    assert_eq!(state.screen, Screen::Settings);
    state.close_settings();
    assert_eq!(state.screen, Screen::Status);
}
