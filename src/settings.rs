//! Settings for the input-method switcher.
//!
//! A `mathswitch.toml` next to (or above) the workspace root configures which
//! input methods to switch between and which external selector tool performs
//! the switch:
//!
//! ```toml
//! [ime]
//! math_input = "com.apple.keylayout.ABC"
//! restore = "com.tencent.inputmethod.wetype.pinyin"
//! selector_tool = "/opt/homebrew/bin/macism"
//!
//! [scan]
//! strategy = "structural"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::scanner::ScanStrategy;

const SETTINGS_FILE: &str = "mathswitch.toml";

/// Root settings structure loaded from mathswitch.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Input-method switching configuration.
    pub ime: ImeSettings,
    /// Scan strategy selection.
    pub scan: ScanSettings,
}

/// Which input methods to activate and the tool that activates them.
///
/// Defaults match the common macOS setup: ABC for math, a CJK input method
/// restored outside, switched via `macism`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImeSettings {
    /// Input method to activate when the caret enters a math span.
    pub math_input: String,
    /// Input method to restore when the caret leaves a math span.
    pub restore: String,
    /// Path to the external input-method selector executable.
    pub selector_tool: PathBuf,
}

impl Default for ImeSettings {
    fn default() -> Self {
        Self {
            math_input: "com.apple.keylayout.ABC".to_string(),
            restore: "com.tencent.inputmethod.wetype.pinyin".to_string(),
            selector_tool: PathBuf::from("/opt/homebrew/bin/macism"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    /// Strategy the scanner uses, fixed at document-open time.
    pub strategy: ScanStrategy,
}

/// Load settings from a mathswitch.toml file.
///
/// Returns default settings if the file doesn't exist or can't be parsed.
pub fn load_settings(path: &Path) -> Settings {
    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => settings,
            Err(e) => {
                eprintln!("Warning: failed to parse {}: {}", SETTINGS_FILE, e);
                Settings::default()
            }
        },
        Err(_) => Settings::default(),
    }
}

/// Discover mathswitch.toml by searching up the directory tree, then direct
/// children.
///
/// Search order:
/// 1. Walk up from `start_dir` to filesystem root
/// 2. If not found, check immediate child directories of `start_dir`
///
/// Returns `(settings, settings_dir)` where `settings_dir` is the directory
/// containing the found file. If not found, returns defaults with
/// `start_dir`.
pub fn discover_settings(start_dir: &Path) -> (Settings, PathBuf) {
    let mut current = Some(start_dir);
    while let Some(dir) = current {
        let candidate = dir.join(SETTINGS_FILE);
        if candidate.is_file() {
            return (load_settings(&candidate), dir.to_path_buf());
        }
        current = dir.parent();
    }

    if let Ok(entries) = std::fs::read_dir(start_dir) {
        for entry in entries.flatten() {
            if entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false) {
                let candidate = entry.path().join(SETTINGS_FILE);
                if candidate.is_file() {
                    return (load_settings(&candidate), entry.path());
                }
            }
        }
    }

    (Settings::default(), start_dir.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_common_macos_setup() {
        let settings = Settings::default();
        assert_eq!(settings.ime.math_input, "com.apple.keylayout.ABC");
        assert_eq!(settings.ime.restore, "com.tencent.inputmethod.wetype.pinyin");
        assert_eq!(
            settings.ime.selector_tool,
            PathBuf::from("/opt/homebrew/bin/macism")
        );
        assert_eq!(settings.scan.strategy, ScanStrategy::Structural);
    }

    #[test]
    fn parses_partial_settings() {
        let settings: Settings = toml::from_str(
            r#"
            [ime]
            selector_tool = "/usr/local/bin/im-select"

            [scan]
            strategy = "textual"
            "#,
        )
        .unwrap();
        assert_eq!(
            settings.ime.selector_tool,
            PathBuf::from("/usr/local/bin/im-select")
        );
        // Unspecified fields keep their defaults.
        assert_eq!(settings.ime.math_input, "com.apple.keylayout.ABC");
        assert_eq!(settings.scan.strategy, ScanStrategy::Textual);
    }

    #[test]
    fn missing_file_degrades_to_defaults() {
        let settings = load_settings(Path::new("/nonexistent/mathswitch.toml"));
        assert_eq!(settings.ime.math_input, "com.apple.keylayout.ABC");
    }
}
