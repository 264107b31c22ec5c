use chrono::{DateTime, Utc};

use crate::config::DisplayConfig;
use crate::stats_fetch::{FetchError, TeamStats, Timestamp, UserStats};
use crate::team_select::select_team;

/// What pressing Enter on the indicator does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorAction {
    Retry,
    OpenSettings,
}

#[derive(Debug, Clone)]
pub struct ErrorPresentation {
    pub status: String,
    pub tooltip: String,
    pub action: IndicatorAction,
}

/// Status line plus tooltip for a successful fetch.
pub fn build_presentation(
    user: &UserStats,
    config: &DisplayConfig,
    now: DateTime<Utc>,
) -> (String, String) {
    let team = select_team(&user.teams, config.preferred_team());
    let recency = if config.show_last_work {
        format_recency(user.last.as_ref(), now)
    } else {
        None
    };
    let status = build_status_line(user, team, recency.as_deref(), config);
    let tooltip = build_tooltip(user, team, config);
    (status, tooltip)
}

pub fn build_status_line(
    user: &UserStats,
    team: Option<&TeamStats>,
    recency: Option<&str>,
    config: &DisplayConfig,
) -> String {
    let name = user.name.as_deref().unwrap_or(config.user_name.trim());
    let rank = format_magnitude(user.rank.unwrap_or(0));
    let score = format_magnitude(user.score.unwrap_or(0));

    let mut line = String::from("FAH • ");
    if let Some(recency) = recency {
        line.push_str(recency);
        line.push_str(" • ");
    }
    line.push_str(&format!("{name}: #{rank} • {score} pts"));

    if let Some(team) = team {
        let team_name = team.name.as_deref().unwrap_or("Team");
        let trank = format_magnitude(team.trank.unwrap_or(0));
        let tscore = format_magnitude(team.tscore.unwrap_or(0));
        line.push_str(&format!(" | {team_name} #{trank} • {tscore} pts"));
    }
    line
}

pub fn build_tooltip(
    user: &UserStats,
    team: Option<&TeamStats>,
    config: &DisplayConfig,
) -> String {
    let mut parts: Vec<String> = Vec::new();

    let name = user.name.as_deref().unwrap_or(config.user_name.trim());
    let id = user
        .id
        .map(|id| id.to_string())
        .unwrap_or_else(|| config.user_name.trim().to_string());
    let rank = user.rank.unwrap_or(0);

    parts.push("User Stats:".to_string());
    parts.push(format!("User: {name} #{id}"));
    parts.push(format!(
        "Score: {}",
        group_thousands(user.score.unwrap_or(0))
    ));
    match percentile(user.rank, user.users) {
        Some(pct) => parts.push(format!(
            "Rank: {} (Top {pct:.2}%)",
            group_thousands(rank)
        )),
        None => parts.push(format!("Rank: {}", group_thousands(rank))),
    }
    parts.push(format!("Work Units: {}", group_thousands(user.wus.unwrap_or(0))));
    if let Some(active) = user.active_50 {
        parts.push(format!("Active (50 days): {active}"));
    }
    if let Some(active) = user.active_7 {
        parts.push(format!("Active (7 days): {active}"));
    }

    if let Some(team) = team {
        let team_name = team.name.as_deref().unwrap_or("Team");
        parts.push(String::new());
        parts.push("Team Stats:".to_string());
        parts.push(format!("Team: {team_name} #{}", team.team.unwrap_or(0)));
        parts.push(format!(
            "Score: {}",
            group_thousands(team.tscore.unwrap_or(0))
        ));
        parts.push(format!("Rank: {}", group_thousands(team.trank.unwrap_or(0))));
        parts.push(format!(
            "Work Units: {}",
            group_thousands(team.twus.unwrap_or(0))
        ));
        parts.push(format!(
            "Contributions: {}",
            group_thousands(team.score.unwrap_or(0))
        ));
        parts.push(format!(
            "Contributed WUs: {}",
            group_thousands(team.wus.unwrap_or(0))
        ));
    }

    if !config.passkey.trim().is_empty() {
        parts.push(String::new());
        parts.push(format!("Passkey: {}", mask_passkey(&config.passkey)));
    }

    parts.join("\n")
}

pub fn present_error(err: &FetchError) -> ErrorPresentation {
    match err {
        FetchError::InvalidInput(msg) => ErrorPresentation {
            status: "FAH: Invalid user ID".to_string(),
            tooltip: format!(
                "Invalid request: {msg}.\nPlease verify your user ID is a valid numeric value (e.g. 123456789).\n\nPress Enter to open settings."
            ),
            action: IndicatorAction::OpenSettings,
        },
        FetchError::NotFound(msg) => ErrorPresentation {
            status: "FAH: User not found".to_string(),
            tooltip: format!(
                "User not found: {msg}.\nPlease verify your user ID is correct.\n\nPress Enter to open settings."
            ),
            action: IndicatorAction::OpenSettings,
        },
        FetchError::Timeout => ErrorPresentation {
            status: "FAH: Timeout".to_string(),
            tooltip: "Request timeout: the API did not respond in time.\n\nPress Enter to retry."
                .to_string(),
            action: IndicatorAction::Retry,
        },
        FetchError::Network(msg) => ErrorPresentation {
            status: "FAH: Network error".to_string(),
            tooltip: format!(
                "Network error: {msg}.\nPlease check your internet connection.\n\nPress Enter to retry."
            ),
            action: IndicatorAction::Retry,
        },
        FetchError::Upstream { status, message } => ErrorPresentation {
            status: "FAH: Error".to_string(),
            tooltip: format!(
                "Failed to fetch Folding@Home statistics.\n\nhttp {status}: {message}\n\nPress Enter to retry."
            ),
            action: IndicatorAction::Retry,
        },
    }
}

/// Scale to a T/B/M/K suffix with one decimal. The boundary check happens
/// before division, so 999999 stays "1000.0K" rather than rounding into M.
pub fn format_magnitude(n: u64) -> String {
    const TIERS: [(u64, &str); 4] = [
        (1_000_000_000_000, "T"),
        (1_000_000_000, "B"),
        (1_000_000, "M"),
        (1_000, "K"),
    ];
    for (threshold, suffix) in TIERS {
        if n >= threshold {
            return format!("{:.1}{suffix}", n as f64 / threshold as f64);
        }
    }
    n.to_string()
}

/// Coarse relative phrase for the last-work timestamp, or `None` when the
/// value is absent or unparseable (the recency clause is cosmetic and is
/// simply omitted).
pub fn format_recency(last: Option<&Timestamp>, now: DateTime<Utc>) -> Option<String> {
    let parsed = last?.to_utc()?;
    Some(relative_phrase((now - parsed).num_seconds()))
}

fn relative_phrase(elapsed_secs: i64) -> String {
    let secs = elapsed_secs.max(0);
    if secs < 45 {
        return "just now".to_string();
    }
    if secs < 90 {
        return "a minute ago".to_string();
    }
    let mins = div_round(secs, 60);
    if mins < 45 {
        return format!("{mins} minutes ago");
    }
    if mins < 90 {
        return "an hour ago".to_string();
    }
    let hours = div_round(mins, 60);
    if hours < 22 {
        return format!("{hours} hours ago");
    }
    if hours < 36 {
        return "a day ago".to_string();
    }
    let days = div_round(hours, 24);
    if days < 26 {
        return format!("{days} days ago");
    }
    if days < 46 {
        return "a month ago".to_string();
    }
    let months = div_round(days, 30);
    if months < 11 {
        return format!("{months} months ago");
    }
    if months < 18 {
        return "a year ago".to_string();
    }
    format!("{} years ago", div_round(months, 12))
}

fn div_round(value: i64, by: i64) -> i64 {
    (value as f64 / by as f64).round() as i64
}

pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `rank / users * 100`; `None` when either side is missing or rank is 0.
pub fn percentile(rank: Option<u64>, users: Option<u64>) -> Option<f64> {
    let rank = rank.filter(|r| *r > 0)?;
    let users = users.filter(|u| *u > 0)?;
    Some(rank as f64 / users as f64 * 100.0)
}

/// First four characters, rest hidden. Short keys are hidden entirely.
pub fn mask_passkey(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    if trimmed.chars().count() <= 4 {
        return "••••".to_string();
    }
    let head: String = trimmed.chars().take(4).collect();
    format!("{head}…")
}
