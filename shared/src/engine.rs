use serde_json::Value;
use thiserror::Error;

use crate::view_state::LngLat;

/// Failure reported by the map engine for a mutating call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("map engine rejected {operation} on {target}: {message}")]
pub struct EngineError {
    pub operation: &'static str,
    pub target: String,
    pub message: String,
}

impl EngineError {
    pub fn new(operation: &'static str, target: &str, message: impl Into<String>) -> Self {
        Self {
            operation,
            target: target.to_string(),
            message: message.into(),
        }
    }
}

/// The subset of a map rendering engine the viewer drives.
///
/// Sources, layers and property values are passed as style-spec JSON.
/// Removal is only called after an existence check, so implementations may
/// treat removing something missing as a no-op.
pub trait MapEngine {
    fn has_source(&self, id: &str) -> bool;
    fn has_layer(&self, id: &str) -> bool;
    fn add_source(&mut self, id: &str, source: &Value) -> Result<(), EngineError>;
    fn remove_source(&mut self, id: &str);
    /// Add a layer on top, or below `before` when given.
    fn add_layer(&mut self, layer: &Value, before: Option<&str>) -> Result<(), EngineError>;
    fn remove_layer(&mut self, id: &str);
    fn set_paint_property(&mut self, layer: &str, name: &str, value: &Value)
    -> Result<(), EngineError>;
    fn set_layout_property(
        &mut self,
        layer: &str,
        name: &str,
        value: &Value,
    ) -> Result<(), EngineError>;
    fn center(&self) -> LngLat;
    fn zoom(&self) -> f64;
}
