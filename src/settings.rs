use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::overlay::OverlayPolicy;

const DEFAULT_SETTINGS_TOML: &str = include_str!("../settings.toml");

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_url: String,
    pub default_mode: String,
    pub min_width: u32,
    pub min_height: u32,
    pub url_keywords: Vec<String>,
    pub alt_keywords: Vec<String>,
    pub marker_class: String,
    pub text_class: String,
    pub overlay_policy: OverlayPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000".to_string(),
            default_mode: "natural".to_string(),
            min_width: 400,
            min_height: 400,
            url_keywords: vec![
                "manga".to_string(),
                "comic".to_string(),
                "page".to_string(),
            ],
            alt_keywords: vec!["manga".to_string()],
            marker_class: "manga-overlay".to_string(),
            text_class: "manga-overlay-text".to_string(),
            overlay_policy: OverlayPolicy::Replace,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    backend: Option<BackendSettings>,
    selector: Option<SelectorSettings>,
    overlay: Option<OverlaySettings>,
}

#[derive(Debug, Default, Deserialize)]
struct BackendSettings {
    api_url: Option<String>,
    mode: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SelectorSettings {
    min_width: Option<u32>,
    min_height: Option<u32>,
    url_keywords: Option<Vec<String>>,
    alt_keywords: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct OverlaySettings {
    marker_class: Option<String>,
    text_class: Option<String>,
    policy: Option<String>,
}

pub fn load_settings(extra_path: Option<&Path>) -> Result<Settings> {
    let mut settings = Settings::default();
    ensure_home_settings_file()?;

    let mut ordered_paths = Vec::new();
    ordered_paths.push(PathBuf::from("settings.toml"));
    ordered_paths.push(PathBuf::from("settings.local.toml"));

    if let Some(home) = home_dir() {
        ordered_paths.push(home.join("settings.toml"));
        ordered_paths.push(home.join("settings.local.toml"));
    }

    if let Some(extra) = extra_path {
        if !extra.exists() {
            return Err(anyhow!("settings file not found: {}", extra.display()));
        }
        ordered_paths.push(extra.to_path_buf());
    }

    for path in ordered_paths {
        if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("failed to read settings: {}", path.display()))?;
            let parsed: SettingsFile = toml::from_str(&content)
                .with_context(|| format!("failed to parse settings: {}", path.display()))?;
            settings.merge(parsed);
        }
    }

    Ok(settings)
}

impl Settings {
    fn merge(&mut self, incoming: SettingsFile) {
        if let Some(backend) = incoming.backend {
            if let Some(api_url) = backend.api_url {
                if !api_url.trim().is_empty() {
                    self.api_url = api_url.trim_end_matches('/').to_string();
                }
            }
            if let Some(mode) = backend.mode {
                if !mode.trim().is_empty() {
                    self.default_mode = mode;
                }
            }
        }
        if let Some(selector) = incoming.selector {
            if let Some(width) = selector.min_width {
                if width > 0 {
                    self.min_width = width;
                }
            }
            if let Some(height) = selector.min_height {
                if height > 0 {
                    self.min_height = height;
                }
            }
            if let Some(keywords) = selector.url_keywords {
                self.url_keywords = keywords;
            }
            if let Some(keywords) = selector.alt_keywords {
                self.alt_keywords = keywords;
            }
        }
        if let Some(overlay) = incoming.overlay {
            if let Some(class) = overlay.marker_class {
                if !class.trim().is_empty() {
                    self.marker_class = class;
                }
            }
            if let Some(class) = overlay.text_class {
                if !class.trim().is_empty() {
                    self.text_class = class;
                }
            }
            if let Some(policy) = overlay.policy {
                if let Some(parsed) = OverlayPolicy::parse(&policy) {
                    self.overlay_policy = parsed;
                }
            }
        }
    }
}

fn ensure_home_settings_file() -> Result<()> {
    let Some(home) = home_dir() else {
        return Ok(());
    };
    fs::create_dir_all(&home)
        .with_context(|| format!("failed to create settings directory: {}", home.display()))?;
    let path = home.join("settings.toml");
    if !path.exists() {
        fs::write(&path, DEFAULT_SETTINGS_TOML)
            .with_context(|| format!("failed to write settings: {}", path.display()))?;
    }
    Ok(())
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().and_then(|home| {
        let home = home.trim();
        if home.is_empty() {
            None
        } else {
            Some(Path::new(home).join(".manga-translator-rust"))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_overrides_only_present_values() {
        let mut settings = Settings::default();
        let parsed: SettingsFile = toml::from_str(
            r#"
            [backend]
            api_url = "http://127.0.0.1:9000/"

            [selector]
            min_width = 300
            url_keywords = ["scan"]

            [overlay]
            policy = "stack"
            "#,
        )
        .expect("parse");
        settings.merge(parsed);

        assert_eq!(settings.api_url, "http://127.0.0.1:9000");
        assert_eq!(settings.default_mode, "natural");
        assert_eq!(settings.min_width, 300);
        assert_eq!(settings.min_height, 400);
        assert_eq!(settings.url_keywords, vec!["scan".to_string()]);
        assert_eq!(settings.alt_keywords, vec!["manga".to_string()]);
        assert_eq!(settings.overlay_policy, OverlayPolicy::Stack);
    }

    #[test]
    fn merge_ignores_empty_and_invalid_values() {
        let mut settings = Settings::default();
        let parsed: SettingsFile = toml::from_str(
            r#"
            [backend]
            api_url = "  "

            [selector]
            min_width = 0

            [overlay]
            marker_class = ""
            policy = "merge"
            "#,
        )
        .expect("parse");
        settings.merge(parsed);

        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn embedded_defaults_match_builtin_defaults() {
        let mut settings = Settings::default();
        let parsed: SettingsFile = toml::from_str(DEFAULT_SETTINGS_TOML).expect("parse");
        settings.merge(parsed);
        assert_eq!(settings, Settings::default());
    }
}
