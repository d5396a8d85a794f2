/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::domain::color::DEFAULT_VARIATION;
use crate::domain::variant::Variant;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub rules: RulesConfig,
    pub speed: SpeedConfig,
    pub gamepad: GamepadConfig,
    pub log: LogConfig,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RulesConfig {
    pub variant: Variant,
    pub status_delay_ms: u64,   // banner lifetime and correct-answer restart delay
    pub similar_variation: u8,  // near-miss spread; each channel moves by at most half
}

impl RulesConfig {
    pub fn status_delay(&self) -> Duration {
        Duration::from_millis(self.status_delay_ms)
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        RulesConfig {
            variant: Variant::default(),
            status_delay_ms: default_status_delay(),
            similar_variation: default_similar_variation(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SpeedConfig {
    pub tick_rate_ms: u64,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub confirm: Vec<String>,
    pub new_game: Vec<String>,
    pub change_color: Vec<String>,
    pub quit: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct LogConfig {
    pub file: PathBuf,
    pub level: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config.toml parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    game: TomlGame,
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    log: TomlLog,
}

#[derive(Deserialize, Debug)]
struct TomlGame {
    #[serde(default, deserialize_with = "de_variant")]
    variant: Variant,
    #[serde(default = "default_status_delay")]
    status_delay_ms: u64,
    #[serde(default = "default_similar_variation")]
    similar_variation: u8,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_new_game")]
    new_game: Vec<String>,
    #[serde(default = "default_change_color")]
    change_color: Vec<String>,
    #[serde(default = "default_quit")]
    quit: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlLog {
    #[serde(default = "default_log_file")]
    file: String,
    #[serde(default = "default_log_level")]
    level: String,
}

// ── Defaults ──

fn default_status_delay() -> u64 { 1500 }
fn default_similar_variation() -> u8 { DEFAULT_VARIATION }
fn default_tick_rate() -> u64 { 16 }

fn default_confirm() -> Vec<String> { vec!["A".into()] }
fn default_new_game() -> Vec<String> { vec!["Start".into()] }
fn default_change_color() -> Vec<String> { vec!["Y".into(), "X".into()] }
fn default_quit() -> Vec<String> { vec!["Select".into()] }
fn default_log_file() -> String { "hueguess.log".into() }
fn default_log_level() -> String { "info".into() }

impl Default for TomlGame {
    fn default() -> Self {
        TomlGame {
            variant: Variant::default(),
            status_delay_ms: default_status_delay(),
            similar_variation: default_similar_variation(),
        }
    }
}

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed { tick_rate_ms: default_tick_rate() }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            confirm: default_confirm(),
            new_game: default_new_game(),
            change_color: default_change_color(),
            quit: default_quit(),
        }
    }
}

impl Default for TomlLog {
    fn default() -> Self {
        TomlLog {
            file: default_log_file(),
            level: default_log_level(),
        }
    }
}

// ── Loading ──

impl Default for GameConfig {
    fn default() -> Self {
        resolve(TomlConfig::default(), &[])
    }
}

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) `~/.local/share/hueguess`.
    /// Missing file or missing keys gracefully fall back to defaults;
    /// a broken file is reported and ignored.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        match find_config(&search_dirs) {
            Some(path) => Self::load_from(&path),
            None => GameConfig::default(),
        }
    }

    /// Load a specific config file (found by `load`, or named by `--config`).
    /// Relative paths inside it resolve against the file's directory.
    pub fn load_from(path: &Path) -> Self {
        let dirs: Vec<PathBuf> = path.parent().map(Path::to_path_buf).into_iter().collect();
        let result = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })
            .and_then(|text| Self::parse(&text, &dirs));
        match result {
            Ok(cfg) => cfg,
            Err(e) => {
                // Logging is not up yet; the terminal is still in cooked mode.
                eprintln!("Warning: {e}");
                eprintln!("Using default settings.");
                GameConfig::default()
            }
        }
    }

    /// Parse config text. Relative log paths resolve against `base_dirs[0]`.
    pub fn parse(text: &str, base_dirs: &[PathBuf]) -> Result<Self, ConfigError> {
        let toml_cfg = toml::from_str::<TomlConfig>(text)?;
        Ok(resolve(toml_cfg, base_dirs))
    }
}

fn de_variant<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Variant, D::Error> {
    let name = String::deserialize(deserializer)?;
    name.parse().map_err(serde::de::Error::custom)
}

fn resolve(toml_cfg: TomlConfig, base_dirs: &[PathBuf]) -> GameConfig {
    let log_file = PathBuf::from(&toml_cfg.log.file);
    let log_file = match base_dirs.first() {
        Some(dir) if log_file.is_relative() => dir.join(log_file),
        _ => log_file,
    };

    GameConfig {
        rules: RulesConfig {
            variant: toml_cfg.game.variant,
            status_delay_ms: toml_cfg.game.status_delay_ms,
            similar_variation: toml_cfg.game.similar_variation,
        },
        speed: SpeedConfig {
            tick_rate_ms: toml_cfg.speed.tick_rate_ms.max(1),
        },
        gamepad: GamepadConfig {
            confirm: toml_cfg.gamepad.confirm,
            new_game: toml_cfg.gamepad.new_game,
            change_color: toml_cfg.gamepad.change_color,
            quit: toml_cfg.gamepad.quit,
        },
        log: LogConfig {
            file: log_file,
            level: toml_cfg.log.level,
        },
    }
}

/// Candidate directories to search: exe dir + CWD + XDG data home (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/hueguess)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/hueguess");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

fn find_config(search_dirs: &[PathBuf]) -> Option<PathBuf> {
    search_dirs
        .iter()
        .map(|dir| dir.join("config.toml"))
        .find(|path| path.exists())
}
