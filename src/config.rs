use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const CONFIG_DIR: &str = "fah_terminal";
const CONFIG_FILE: &str = "config.json";
const CONFIG_VERSION: u32 = 1;

pub const DEFAULT_REFRESH_SECS: u64 = 300;
pub const MIN_REFRESH_SECS: u64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub team_name: String,
    // Display-only; never sent with requests.
    #[serde(default)]
    pub passkey: String,
    #[serde(default = "default_refresh")]
    pub refresh_interval: u64,
    #[serde(default = "default_show_last_work")]
    pub show_last_work: bool,
}

fn default_refresh() -> u64 {
    DEFAULT_REFRESH_SECS
}

fn default_show_last_work() -> bool {
    true
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            user_name: String::new(),
            team_name: String::new(),
            passkey: String::new(),
            refresh_interval: DEFAULT_REFRESH_SECS,
            show_last_work: true,
        }
    }
}

impl DisplayConfig {
    pub fn has_user(&self) -> bool {
        !self.user_name.trim().is_empty()
    }

    pub fn preferred_team(&self) -> Option<&str> {
        let trimmed = self.team_name.trim();
        if trimmed.is_empty() { None } else { Some(trimmed) }
    }

    pub fn clamp_interval(&mut self) {
        if self.refresh_interval < MIN_REFRESH_SECS {
            self.refresh_interval = MIN_REFRESH_SECS;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct ConfigFile {
    version: u32,
    #[serde(default)]
    config: DisplayConfig,
}

/// File config with env overrides applied on top; interval clamped last so
/// neither source can push it below the minimum.
pub fn load() -> DisplayConfig {
    let mut config = load_file().unwrap_or_default();
    apply_env_overrides(&mut config);
    config.clamp_interval();
    config
}

fn load_file() -> Option<DisplayConfig> {
    let path = config_path()?;
    let raw = fs::read_to_string(path).ok()?;
    let file = serde_json::from_str::<ConfigFile>(&raw).ok()?;
    if file.version != CONFIG_VERSION {
        return None;
    }
    Some(file.config)
}

pub fn save(config: &DisplayConfig) -> Result<()> {
    let Some(path) = config_path() else {
        return Ok(());
    };
    let Some(dir) = path.parent() else {
        return Ok(());
    };
    fs::create_dir_all(dir).ok();
    let file = ConfigFile {
        version: CONFIG_VERSION,
        config: config.clone(),
    };
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string_pretty(&file).context("serialize config")?;
    fs::write(&tmp, json).context("write config")?;
    fs::rename(&tmp, &path).context("swap config")?;
    Ok(())
}

pub fn reset() -> Result<DisplayConfig> {
    let config = DisplayConfig::default();
    save(&config)?;
    Ok(config)
}

fn apply_env_overrides(config: &mut DisplayConfig) {
    if let Some(value) = env_string("FAH_USER_ID") {
        config.user_name = value;
    }
    if let Some(value) = env_string("FAH_TEAM_NAME") {
        config.team_name = value;
    }
    if let Some(value) = env_string("FAH_PASSKEY") {
        config.passkey = value;
    }
    if let Some(value) = env_string("FAH_REFRESH_SECS").and_then(|v| v.parse::<u64>().ok()) {
        config.refresh_interval = value;
    }
    if let Some(value) = env_string("FAH_SHOW_LAST_WORK") {
        config.show_last_work = parse_bool(&value, config.show_last_work);
    }
}

fn env_string(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn parse_bool(raw: &str, default: bool) -> bool {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

fn config_path() -> Option<PathBuf> {
    if let Ok(base) = env::var("XDG_CONFIG_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CONFIG_DIR).join(CONFIG_FILE));
        }
    }
    let home = env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".config")
            .join(CONFIG_DIR)
            .join(CONFIG_FILE),
    )
}
