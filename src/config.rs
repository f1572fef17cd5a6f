/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Missing file or missing keys fall back to defaults; a broken file is
/// reported as a `ConfigError` and the caller falls back to defaults.
///
/// Only the driver is configurable. Simulation constants are fixed.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

// ── Public Config Struct ──

#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    /// Fixed RNG seed; `None` draws one from the OS.
    pub seed: Option<u64>,
    /// Where tracing output goes; `None` disables logging.
    pub log_file: Option<PathBuf>,
    pub timing: TimingConfig,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TimingConfig {
    /// Sleep between loop iterations.
    pub frame_sleep: Duration,
    /// Frames with a longer delta are dropped so no tick moves a body more
    /// than a tile.
    pub max_frame_time: f32,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config parse error in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("max_frame_time must be positive, got {0}")]
    InvalidFrameTime(f32),
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    timing: TomlTiming,
}

#[derive(Deserialize, Debug, Default)]
struct TomlGeneral {
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    log_file: Option<String>,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_frame_sleep")]
    frame_sleep_ms: u64,
    #[serde(default = "default_max_frame_time")]
    max_frame_time: f32,
}

// ── Defaults ──

fn default_frame_sleep() -> u64 { 5 }
fn default_max_frame_time() -> f32 { 0.1 }

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            frame_sleep_ms: default_frame_sleep(),
            max_frame_time: default_max_frame_time(),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        // Built from the TOML defaults so the two never drift apart.
        GameConfig::from_toml(TomlConfig::default(), &[])
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// A missing file is not an error.
    pub fn load() -> Result<Self, ConfigError> {
        let search_dirs = candidate_dirs();
        match find_config(&search_dirs) {
            Some(path) => {
                let text = std::fs::read_to_string(&path)
                    .map_err(|source| ConfigError::Read { path: path.clone(), source })?;
                GameConfig::parse(&text, &path, &search_dirs)
            }
            None => Ok(GameConfig::default()),
        }
    }

    /// Parse config text. Relative log paths are resolved against the first
    /// search directory.
    fn parse(text: &str, path: &Path, search_dirs: &[PathBuf]) -> Result<Self, ConfigError> {
        let toml_cfg = toml::from_str::<TomlConfig>(text)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
        if toml_cfg.timing.max_frame_time <= 0.0 {
            return Err(ConfigError::InvalidFrameTime(toml_cfg.timing.max_frame_time));
        }
        Ok(GameConfig::from_toml(toml_cfg, search_dirs))
    }

    fn from_toml(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        let log_file = toml_cfg.general.log_file.map(|name| {
            let path = PathBuf::from(name);
            match search_dirs.first() {
                Some(dir) if path.is_relative() => dir.join(path),
                _ => path,
            }
        });

        GameConfig {
            seed: toml_cfg.general.seed,
            log_file,
            timing: TimingConfig {
                frame_sleep: Duration::from_millis(toml_cfg.timing.frame_sleep_ms),
                max_frame_time: toml_cfg.timing.max_frame_time,
            },
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
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
