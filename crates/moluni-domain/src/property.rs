use std::fmt;

use serde::{Deserialize, Serialize};

/// Valor de una propiedad: numérico o texto.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Number(f64),
    Text(String),
}

impl PropertyValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Number(_) => None,
            Self::Text(s) => Some(s),
        }
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Propiedad nombrada de una Calculation completada.
///
/// `name` es único por cálculo; la pertenencia (`calculation_id`) la fija el
/// store al insertar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub value: PropertyValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
}

impl Property {
    pub fn new(name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        Self { name: name.into(),
               value: value.into(),
               units: None }
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untagged_value_accepts_numbers_and_text() {
        let n: PropertyValue = serde_json::from_str("-76.4").unwrap();
        assert_eq!(n.as_number(), Some(-76.4));
        let t: PropertyValue = serde_json::from_str("\"C2v\"").unwrap();
        assert_eq!(t.as_text(), Some("C2v"));
    }

    #[test]
    fn property_builder_sets_units() {
        let p = Property::new("total_energy", -76.4).with_units("Ha");
        assert_eq!(p.units.as_deref(), Some("Ha"));
        assert_eq!(p.value.to_string(), "-76.4");
    }
}
