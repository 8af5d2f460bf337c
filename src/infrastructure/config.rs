use crate::domain::chart::ChartMode;
use crate::presentation::theme::{Theme, ThemeMode};
use anyhow::anyhow;
use chrono_tz::Tz;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_SERVER_TIMEZONE: &str = "Europe/Paris";
const DEFAULT_DEADLINE_SECS: u64 = 10;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub aggregation: AggregationSettings,
    #[serde(default)]
    pub theme: ThemeSettings,
    #[serde(default)]
    pub selection: SelectionSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// IANA zone the server writes wall-clock sample times in.
    #[serde(default = "default_server_timezone")]
    pub server_timezone: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AggregationSettings {
    /// How long a recomputation waits for its fetches before emitting
    /// whatever has arrived.
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ThemeSettings {
    #[serde(default)]
    pub mode: ThemeMode,
    pub text_color: Option<String>,
    pub text_color_secondary: Option<String>,
    pub surface_border: Option<String>,
}

/// Selection replayed by the binary, one change at a time.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SelectionSettings {
    pub airport: Option<String>,
    #[serde(default)]
    pub sensors: Vec<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    #[serde(default)]
    pub mode: ChartMode,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_server_timezone() -> String {
    DEFAULT_SERVER_TIMEZONE.to_string()
}

fn default_deadline_secs() -> u64 {
    DEFAULT_DEADLINE_SECS
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            server_timezone: default_server_timezone(),
        }
    }
}

impl Default for AggregationSettings {
    fn default() -> Self {
        Self {
            deadline_secs: default_deadline_secs(),
        }
    }
}

impl ApiSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn server_zone(&self) -> anyhow::Result<Tz> {
        self.server_timezone
            .trim()
            .parse::<Tz>()
            .map_err(|e| anyhow!("Invalid api.server_timezone '{}': {}", self.server_timezone, e))
    }
}

impl AggregationSettings {
    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }
}

impl ThemeSettings {
    /// The palette of `mode` with any configured color overriding it.
    pub fn resolve(&self) -> Theme {
        let mut theme = Theme::for_mode(self.mode);
        if let Some(color) = &self.text_color {
            theme.text_color = color.clone();
        }
        if let Some(color) = &self.text_color_secondary {
            theme.text_color_secondary = color.clone();
        }
        if let Some(color) = &self.surface_border {
            theme.surface_border = color.clone();
        }
        theme
    }
}

/// Load `config/dashboard.*` (optional) overlaid with `DASHBOARD__*`
/// environment variables, e.g. `DASHBOARD__API__BASE_URL`.
pub fn load_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(
            config::Environment::with_prefix("DASHBOARD")
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("selection.sensors")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{Config, File, FileFormat};

    fn parse(source: &str) -> AppConfig {
        Config::builder()
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse("");
        assert_eq!(config.api.base_url, "http://localhost:8080");
        assert_eq!(config.api.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.api.server_zone().unwrap(), chrono_tz::Europe::Paris);
        assert_eq!(config.aggregation.deadline(), Duration::from_secs(10));
        assert_eq!(config.theme.resolve(), Theme::light());
        assert_eq!(config.selection.mode, ChartMode::TimeSeries);
        assert!(config.selection.sensors.is_empty());
    }

    #[test]
    fn test_full_file() {
        let config = parse(
            r##"
            [api]
            base_url = "http://sensors.internal:8080"
            request_timeout_secs = 3
            server_timezone = "America/Sao_Paulo"

            [aggregation]
            deadline_secs = 20

            [theme]
            mode = "dark"
            surface_border = "#222222"

            [selection]
            airport = "MRS"
            sensors = ["temperature", "wind"]
            start = "2024-01-01"
            end = "2024-01-02"
            mode = "daily_average"
            "##,
        );

        assert_eq!(config.api.base_url, "http://sensors.internal:8080");
        assert_eq!(config.api.server_zone().unwrap(), chrono_tz::America::Sao_Paulo);
        assert_eq!(config.aggregation.deadline(), Duration::from_secs(20));

        let theme = config.theme.resolve();
        assert_eq!(theme.text_color, Theme::dark().text_color);
        assert_eq!(theme.surface_border, "#222222");

        assert_eq!(config.selection.airport.as_deref(), Some("MRS"));
        assert_eq!(config.selection.sensors, vec!["temperature", "wind"]);
        assert_eq!(config.selection.mode, ChartMode::DailyAverage);
    }

    #[test]
    fn test_unknown_server_timezone_is_rejected() {
        let config = parse("[api]\nserver_timezone = \"Mars/Olympus\"");
        let err = config.api.server_zone().unwrap_err();
        assert!(err.to_string().contains("Mars/Olympus"));
    }
}
