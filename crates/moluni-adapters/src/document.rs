//! Interpretación del documento de estado devuelto por la API remota.
//!
//! Formato aceptado:
//! ```json
//! { "job_id": "...", "status": "COMPLETED",
//!   "formula": "H2O",                // o metadata.formula
//!   "properties": [{"name": "total_energy", "value": -76.4, "units": "Hartree"}] }
//! ```
//! `properties` también puede ser un mapa `{nombre: {value, units}}` o
//! `{nombre: valor}`.

use log::warn;
use moluni_core::{QueryError, RemoteReport, RemoteStatus};
use moluni_domain::{Property, PropertyValue};
use serde_json::{Map, Value};

/// Convierte un documento de estado en `RemoteReport`. Las propiedades sólo
/// se leen cuando el job está completado; el documento completo queda en
/// `raw`.
pub fn parse_status_document(doc: Value) -> Result<RemoteReport, QueryError> {
    let obj = doc.as_object()
                 .ok_or_else(|| QueryError::InvalidResponse("status document is not a JSON object".into()))?;
    let tag = obj.get("status")
                 .and_then(Value::as_str)
                 .ok_or_else(|| QueryError::InvalidResponse("status document without `status`".into()))?;
    let status = RemoteStatus::from_tag(tag);
    if let RemoteStatus::Unrecognized(tag) = &status {
        warn!("remote:unrecognized status tag={tag:?}; treated as pending");
    }
    let formula = obj.get("formula")
                     .and_then(Value::as_str)
                     .or_else(|| obj.get("metadata").and_then(|m| m.get("formula")).and_then(Value::as_str))
                     .map(str::to_string);
    let properties = if status == RemoteStatus::Completed {
        parse_properties(obj.get("properties"))?
    } else {
        Vec::new()
    };
    Ok(RemoteReport { status,
                      formula,
                      properties,
                      raw: Some(doc) })
}

/// Lee la sección `properties` (lista o mapa). Las propiedades sin valor
/// utilizable se omiten con un warning.
pub fn parse_properties(section: Option<&Value>) -> Result<Vec<Property>, QueryError> {
    match section {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                let Some(obj) = item.as_object() else {
                    return Err(QueryError::InvalidResponse(format!("property item is not an object: {item}")));
                };
                let Some(name) = obj.get("name").and_then(Value::as_str) else {
                    return Err(QueryError::InvalidResponse(format!("property item without name: {item}")));
                };
                if let Some(p) = property_from_object(name, obj) {
                    out.push(p);
                }
            }
            Ok(out)
        }
        Some(Value::Object(map)) => Ok(map.iter()
                                          .filter_map(|(name, v)| match v {
                                              Value::Object(obj) => property_from_object(name, obj),
                                              other => scalar_value(name, other).map(|value| Property { name: name.clone(),
                                                                                                       value,
                                                                                                       units: None }),
                                          })
                                          .collect()),
        Some(other) => Err(QueryError::InvalidResponse(format!("`properties` must be a list or a map, got {other}"))),
    }
}

fn property_from_object(name: &str, obj: &Map<String, Value>) -> Option<Property> {
    let value = scalar_value(name, obj.get("value").unwrap_or(&Value::Null))?;
    Some(Property { name: name.to_string(),
                    value,
                    units: obj.get("units").and_then(Value::as_str).map(str::to_string) })
}

fn scalar_value(name: &str, v: &Value) -> Option<PropertyValue> {
    match v {
        Value::Number(n) => n.as_f64().map(PropertyValue::Number),
        Value::String(s) => Some(PropertyValue::Text(s.clone())),
        other => {
            warn!("remote:property {name} skipped (unsupported value {other})");
            None
        }
    }
}
