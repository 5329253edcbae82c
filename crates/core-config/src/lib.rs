//! Configuration loading and parsing.
//!
//! Parses `reword.toml` (or an override path supplied by the front end):
//!
//! * `[shortcuts]` one key chord string per format plus `palette`. The strings
//!   are user-editable elsewhere; this crate only carries them, the keymap
//!   crate parses them.
//! * `[platform] os` resolves the `mod` chord modifier (`auto` by default).
//! * `[transport] timeout_ms` bounds each reformat call (0 disables).
//! * `[logging]` file name, directory and default filter.
//!
//! Missing file or a parse error falls back to defaults so a broken config
//! never prevents a session from starting. Unknown fields are ignored.

use anyhow::Result;
use core_format::FormatKind;
use serde::Deserialize;
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

pub const CONFIG_FILE_NAME: &str = "reword.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsSetting {
    #[default]
    Auto,
    Macos,
    Windows,
    Linux,
}

/// Concrete platform after resolving `OsSetting::Auto`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Windows,
    Linux,
}

impl Platform {
    pub fn detect() -> Self {
        if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else {
            Platform::Linux
        }
    }
}

impl OsSetting {
    pub fn resolve(self) -> Platform {
        match self {
            OsSetting::Auto => Platform::detect(),
            OsSetting::Macos => Platform::MacOs,
            OsSetting::Windows => Platform::Windows,
            OsSetting::Linux => Platform::Linux,
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PlatformConfig {
    #[serde(default)]
    pub os: OsSetting,
}

/// Key chord per logical action. Values use the `mod+shift+g` grammar.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ShortcutSettings {
    #[serde(default = "ShortcutSettings::default_translate")]
    pub translate: String,
    #[serde(default = "ShortcutSettings::default_grammar")]
    pub grammar: String,
    #[serde(default = "ShortcutSettings::default_condense")]
    pub condense: String,
    #[serde(default = "ShortcutSettings::default_formality")]
    pub formality: String,
    #[serde(default = "ShortcutSettings::default_emoji")]
    pub emoji: String,
    #[serde(default = "ShortcutSettings::default_improve")]
    pub improve: String,
    #[serde(default = "ShortcutSettings::default_palette")]
    pub palette: String,
}

impl Default for ShortcutSettings {
    fn default() -> Self {
        Self {
            translate: Self::default_translate(),
            grammar: Self::default_grammar(),
            condense: Self::default_condense(),
            formality: Self::default_formality(),
            emoji: Self::default_emoji(),
            improve: Self::default_improve(),
            palette: Self::default_palette(),
        }
    }
}

impl ShortcutSettings {
    fn default_translate() -> String {
        "mod+alt+t".to_string()
    }
    fn default_grammar() -> String {
        "mod+alt+g".to_string()
    }
    fn default_condense() -> String {
        "mod+alt+c".to_string()
    }
    fn default_formality() -> String {
        "mod+alt+f".to_string()
    }
    fn default_emoji() -> String {
        "mod+alt+e".to_string()
    }
    fn default_improve() -> String {
        "mod+alt+i".to_string()
    }
    fn default_palette() -> String {
        "mod+k".to_string()
    }

    pub fn chord_for(&self, kind: FormatKind) -> &str {
        match kind {
            FormatKind::Translate => &self.translate,
            FormatKind::Grammar => &self.grammar,
            FormatKind::Condense => &self.condense,
            FormatKind::Formality => &self.formality,
            FormatKind::Emoji => &self.emoji,
            FormatKind::Improve => &self.improve,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TransportConfig {
    #[serde(default = "TransportConfig::default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_ms: Self::default_timeout_ms(),
        }
    }
}

impl TransportConfig {
    const fn default_timeout_ms() -> u64 {
        30_000
    }

    /// `None` when the timeout wrapper is disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_directory")]
    pub directory: PathBuf,
    #[serde(default = "LoggingConfig::default_file")]
    pub file: String,
    /// Used when `RUST_LOG` is unset.
    #[serde(default = "LoggingConfig::default_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: Self::default_directory(),
            file: Self::default_file(),
            filter: Self::default_filter(),
        }
    }
}

impl LoggingConfig {
    fn default_directory() -> PathBuf {
        PathBuf::from(".")
    }
    fn default_file() -> String {
        "reword.log".to_string()
    }
    fn default_filter() -> String {
        "info".to_string()
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub shortcuts: ShortcutSettings,
    #[serde(default)]
    pub platform: PlatformConfig,
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub file: ConfigFile, // parsed (or default) data
}

impl Config {
    pub fn shortcuts(&self) -> &ShortcutSettings {
        &self.file.shortcuts
    }

    pub fn platform(&self) -> Platform {
        self.file.platform.os.resolve()
    }
}

/// Best-effort config path following platform conventions (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    // Prefer a `reword.toml` in the working directory before the platform config dir.
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("reword").join(CONFIG_FILE_NAME);
    }
    PathBuf::from(CONFIG_FILE_NAME)
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        info!(target: "config", path = %path.display(), "config_missing_using_defaults");
        return Ok(Config::default());
    };
    Ok(parse(content))
}

/// Parse already-read TOML content, falling back to defaults on error.
pub fn parse(content: String) -> Config {
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => Config { file },
        Err(e) => {
            warn!(target: "config", error = %e, "config_parse_failed_using_defaults");
            Config::default()
        }
    }
}
