// Airport and sensor domain models
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Airport {
    pub code: String,
}

impl Airport {
    pub fn new(code: impl AsRef<str>) -> Self {
        Self {
            code: Self::normalize_code(code.as_ref()),
        }
    }

    fn normalize_code(code: &str) -> String {
        // " mrs" -> "MRS"
        code.trim().to_ascii_uppercase()
    }
}

/// A measurement type reported by an airport, e.g. `temperature`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SensorKind {
    pub name: String,
}

impl SensorKind {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// First occurrence of each name, in selection order.
    pub fn distinct(sensors: &[SensorKind]) -> Vec<SensorKind> {
        let mut seen = HashSet::new();
        sensors
            .iter()
            .filter(|sensor| seen.insert(sensor.name.as_str()))
            .cloned()
            .collect()
    }
}
