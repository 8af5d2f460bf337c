// Theme colors handed to the chart widget
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

/// The custom properties `--text-color`, `--text-color-secondary` and
/// `--surface-border` of the active theme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub text_color: String,
    pub text_color_secondary: String,
    pub surface_border: String,
}

impl Theme {
    pub fn light() -> Self {
        Self {
            text_color: "#495057".to_string(),
            text_color_secondary: "#6c757d".to_string(),
            surface_border: "#dee2e6".to_string(),
        }
    }

    pub fn dark() -> Self {
        Self {
            text_color: "rgba(255, 255, 255, 0.87)".to_string(),
            text_color_secondary: "rgba(255, 255, 255, 0.6)".to_string(),
            surface_border: "#383838".to_string(),
        }
    }

    pub fn for_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Light => Self::light(),
            ThemeMode::Dark => Self::dark(),
        }
    }
}
