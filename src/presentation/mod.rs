// Presentation layer - What the chart widget consumes
pub mod chart_options;
pub mod chart_session;
pub mod theme;
