use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::schedule::GridScale;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ClockFormat {
    #[default]
    Hour24,      // "14:30"
    Hour12,      // "2:30pm"
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ViewMode {
    #[default]
    Week,        // Mon-Sun columns
    Day,         // Single column
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_web_base_url")]
    pub web_base_url: String,
    #[serde(default)]
    pub last_email: String,
    #[serde(default)]
    pub clock_format: ClockFormat,
    #[serde(default)]
    pub view_mode: ViewMode,
    #[serde(default)]
    pub grid: GridScale,
}

fn default_api_base_url() -> String {
    "http://localhost:3000/api".to_string()
}

fn default_web_base_url() -> String {
    "http://localhost:3000".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            web_base_url: default_web_base_url(),
            last_email: String::new(),
            clock_format: ClockFormat::Hour24,
            view_mode: ViewMode::Week,
            grid: GridScale::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let contents = fs::read_to_string(&config_path)
                .context("Failed to read config file")?;
            Self::from_json(&contents)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        // Ensure directory exists
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(&config_path, contents)?;

        Ok(())
    }

    fn from_json(contents: &str) -> Result<Self> {
        serde_json::from_str(contents).context("Failed to parse config file")
    }

    fn config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "shiftboard", "shiftboard")
            .context("Could not determine config directory")?;
        Ok(proj_dirs.config_dir().join("config.json"))
    }

    /// API root without trailing slashes
    pub fn api_root(&self) -> String {
        self.api_base_url.trim().trim_end_matches('/').to_string()
    }

    /// Link into the web app, e.g. `page_url("register")`
    pub fn page_url(&self, page: &str) -> String {
        format!("{}/{}", self.web_base_url.trim().trim_end_matches('/'), page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config = Config::from_json(r#"{ "last_email": "ops@example.com" }"#).unwrap();
        assert_eq!(config.last_email, "ops@example.com");
        assert_eq!(config.grid, GridScale::default());
        assert_eq!(config.view_mode, ViewMode::Week);
        assert_eq!(config.clock_format, ClockFormat::Hour24);
    }

    #[test]
    fn grid_scale_can_be_overridden() {
        let config = Config::from_json(
            r#"{ "grid": { "pixels_per_hour": 48.0, "first_hour": 6 } }"#,
        )
        .unwrap();
        assert_eq!(config.grid.pixels_per_hour, 48.0);
        assert_eq!(config.grid.first_hour, 6);
    }

    #[test]
    fn urls_are_trimmed() {
        let config = Config {
            api_base_url: " https://shifts.example.com/api/ ".into(),
            web_base_url: "https://shifts.example.com/".into(),
            ..Config::default()
        };
        assert_eq!(config.api_root(), "https://shifts.example.com/api");
        assert_eq!(config.page_url("register"), "https://shifts.example.com/register");
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(Config::from_json("not json").is_err());
    }
}
