// Domain layer - Value types shared by every other layer
pub mod airport;
pub mod chart;
pub mod color;
pub mod date_range;
pub mod measurement;
