use std::path::PathBuf;
use anyhow::{Context, Result};
use simplelog::LevelFilter;
use url::Url;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080/api/";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_url: Url,
    pub session_file: PathBuf,
    pub preferences_file: PathBuf,
    pub calendar_out: PathBuf,
    pub log_level: LevelFilter,
    pub split_overlaps: bool,
}

impl Config {
    /// Reads `COURSEREG_*` variables from the process environment (and `.env`, once loaded).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| {
            lookup(key).filter(|v| !v.trim().is_empty()).unwrap_or_else(|| default.to_string())
        };

        // `Url::join` drops the last path segment unless the base ends with a slash.
        let mut api_url = var("COURSEREG_API_URL", DEFAULT_API_URL);
        if !api_url.ends_with('/') {
            api_url.push('/');
        }
        let api_url = Url::parse(&api_url)
            .with_context(|| format!("COURSEREG_API_URL is not a valid URL: {}", api_url))?;

        let log_level = var("COURSEREG_LOG_LEVEL", "info");
        let log_level = log_level.parse::<LevelFilter>().map_err(|_| {
            anyhow::anyhow!(
                "COURSEREG_LOG_LEVEL must be one of off, error, warn, info, debug, trace, got '{}'",
                log_level
            )
        })?;

        let split_overlaps = var("COURSEREG_SPLIT_OVERLAPS", "false");
        let split_overlaps = matches!(
            split_overlaps.to_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        );

        Ok(Self {
            api_url,
            session_file: PathBuf::from(var("COURSEREG_SESSION_FILE", "session.json")),
            preferences_file: PathBuf::from(var("COURSEREG_PREFERENCES_FILE", "preferences.json")),
            calendar_out: PathBuf::from(var("COURSEREG_CALENDAR_OUT", "calendar.html")),
            log_level,
            split_overlaps,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.api_url.as_str(), DEFAULT_API_URL);
        assert_eq!(cfg.session_file, PathBuf::from("session.json"));
        assert_eq!(cfg.calendar_out, PathBuf::from("calendar.html"));
        assert_eq!(cfg.log_level, LevelFilter::Info);
        assert!(!cfg.split_overlaps);
    }

    #[test]
    fn api_url_gains_trailing_slash() {
        let cfg = config(&[("COURSEREG_API_URL", "https://reg.example.edu/api")]).unwrap();
        assert_eq!(
            cfg.api_url.join("courses").unwrap().as_str(),
            "https://reg.example.edu/api/courses"
        );
    }

    #[test]
    fn overrides_are_parsed() {
        let cfg = config(&[
            ("COURSEREG_LOG_LEVEL", "debug"),
            ("COURSEREG_SPLIT_OVERLAPS", "YES"),
            ("COURSEREG_CALENDAR_OUT", "/tmp/week.html"),
        ])
        .unwrap();
        assert_eq!(cfg.log_level, LevelFilter::Debug);
        assert!(cfg.split_overlaps);
        assert_eq!(cfg.calendar_out, PathBuf::from("/tmp/week.html"));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(config(&[("COURSEREG_API_URL", "not a url")]).is_err());
        assert!(config(&[("COURSEREG_LOG_LEVEL", "loud")]).is_err());
    }
}
