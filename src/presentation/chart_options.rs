// Chart widget options per display mode
use crate::domain::chart::{ChartDataset, ChartMode};
use crate::presentation::theme::Theme;
use serde::Serialize;

const TIME_SERIES_ASPECT_RATIO: f64 = 0.6;
const DAILY_AVERAGE_ASPECT_RATIO: f64 = 0.8;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOptions {
    pub maintain_aspect_ratio: bool,
    pub aspect_ratio: f64,
    pub plugins: Plugins,
    pub scales: Scales,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plugins {
    pub legend: Legend,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub labels: LegendLabels,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendLabels {
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scales {
    pub x: Axis,
    pub y: Axis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub ticks: Ticks,
    pub grid: Grid,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ticks {
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Font {
    pub weight: String,
}

impl Font {
    fn bold() -> Self {
        Self {
            weight: "bold".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grid {
    pub color: String,
}

/// What the chart widget receives for one recomputation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPayload {
    pub generation: u64,
    pub mode: ChartMode,
    pub data: ChartDataset,
    pub options: ChartOptions,
}

#[derive(Debug, Clone)]
pub struct ChartPresentationAdapter {
    theme: Theme,
}

impl ChartPresentationAdapter {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    pub fn options(&self, mode: ChartMode) -> ChartOptions {
        let (aspect_ratio, x_font) = match mode {
            ChartMode::TimeSeries => (TIME_SERIES_ASPECT_RATIO, None),
            ChartMode::DailyAverage => (DAILY_AVERAGE_ASPECT_RATIO, Some(Font::bold())),
        };

        ChartOptions {
            maintain_aspect_ratio: false,
            aspect_ratio,
            plugins: Plugins {
                legend: Legend {
                    labels: LegendLabels {
                        color: self.theme.text_color.clone(),
                    },
                },
            },
            scales: Scales {
                x: self.axis(x_font),
                y: self.axis(None),
            },
        }
    }

    pub fn present(&self, generation: u64, mode: ChartMode, data: ChartDataset) -> ChartPayload {
        ChartPayload {
            generation,
            mode,
            data,
            options: self.options(mode),
        }
    }

    fn axis(&self, font: Option<Font>) -> Axis {
        Axis {
            ticks: Ticks {
                color: self.theme.text_color_secondary.clone(),
                font,
            },
            grid: Grid {
                color: self.theme.surface_border.clone(),
            },
        }
    }
}
