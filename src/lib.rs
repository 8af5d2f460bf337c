// Airport sensor charts - measurement aggregation for the chart widget
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
