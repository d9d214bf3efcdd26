//! Style-spec JSON for the thematic fill layers.

use serde_json::{Value, json};

use crate::geojson::FeatureCollection;
use crate::registry::{LayerEntry, UNMATCHED_CLASS_COLOR};

pub const DEFAULT_FILL_OPACITY: f64 = 0.7;

/// `["match", ["get", "class"], 0, c0, 1, c1, ..., fallback]`
pub fn fill_color_expression(entry: &LayerEntry) -> Value {
    let mut expression = vec![json!("match"), json!(["get", "class"])];
    for (class, color) in entry.colors.iter().enumerate() {
        expression.push(json!(class));
        expression.push(json!(color));
    }
    expression.push(json!(UNMATCHED_CLASS_COLOR));
    Value::Array(expression)
}

/// Fill layer for a thematic layer; the layer and its source share the id.
pub fn fill_layer(entry: &LayerEntry, opacity: f64) -> Value {
    json!({
        "id": entry.id,
        "type": "fill",
        "source": entry.id,
        "paint": {
            "fill-color": fill_color_expression(entry),
            "fill-opacity": opacity,
        }
    })
}

pub fn geojson_source(data: &FeatureCollection) -> Result<Value, serde_json::Error> {
    Ok(json!({
        "type": "geojson",
        "data": serde_json::to_value(data)?,
    }))
}

/// Clamp a slider reading into the valid opacity range.
pub fn normalize_opacity(value: f64) -> f64 {
    if value.is_nan() {
        DEFAULT_FILL_OPACITY
    } else {
        value.clamp(0.0, 1.0)
    }
}
