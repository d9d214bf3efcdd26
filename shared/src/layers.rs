//! Thematic layer lifecycle.
//!
//! At most one thematic layer is on the map at any time. Selecting a layer
//! first tears down whatever is rendered, then hands out a [`LoadTicket`] for
//! the geometry fetch. The fetch result is applied with
//! [`LayerSwapController::complete`]; only the ticket of the latest selection
//! is honoured, older ones resolve as [`LoadOutcome::Stale`].

use serde_json::json;
use thiserror::Error;

use crate::engine::{EngineError, MapEngine};
use crate::geojson::FeatureCollection;
use crate::legend::{self, Legend};
use crate::registry::{self, LayerEntry};
use crate::style::{self, DEFAULT_FILL_OPACITY};
use crate::topology::{self, TopologyError};

#[derive(Error, Debug)]
pub enum LayerLoadError {
    #[error("unknown layer: {0}")]
    UnknownLayer(String),

    #[error("fetch error: {0}")]
    Fetch(String),

    #[error("decode error: {0}")]
    Decode(#[from] TopologyError),

    #[error("source encoding error: {0}")]
    Source(#[from] serde_json::Error),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Decode a fetched TopoJSON body into features.
pub fn decode_resource(text: &str) -> Result<FeatureCollection, LayerLoadError> {
    Ok(topology::decode_first_object(text)?)
}

/// Permission to apply one fetch result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    request: u64,
    layer: &'static LayerEntry,
}

impl LoadTicket {
    pub fn request(&self) -> u64 {
        self.request
    }

    pub fn layer_id(&self) -> &'static str {
        self.layer.id
    }

    pub fn resource_path(&self) -> String {
        self.layer.resource_path()
    }
}

#[derive(Debug)]
pub enum LoadOutcome {
    /// The layer is rendered and its legend drawn.
    Activated(&'static str),
    /// A newer selection superseded this ticket; nothing changed.
    Stale,
    /// Nothing is rendered; the error explains why.
    Failed(LayerLoadError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerState {
    Empty,
    Active(&'static LayerEntry),
}

#[derive(Debug)]
pub struct LayerSwapController {
    active: Option<&'static LayerEntry>,
    legend: Option<Legend>,
    opacity: f64,
    latest_request: u64,
    pending: Option<u64>,
}

impl Default for LayerSwapController {
    fn default() -> Self {
        Self::new(DEFAULT_FILL_OPACITY)
    }
}

impl LayerSwapController {
    pub fn new(opacity: f64) -> Self {
        Self {
            active: None,
            legend: None,
            opacity: style::normalize_opacity(opacity),
            latest_request: 0,
            pending: None,
        }
    }

    pub fn state(&self) -> LayerState {
        match self.active {
            Some(entry) => LayerState::Active(entry),
            None => LayerState::Empty,
        }
    }

    pub fn active_id(&self) -> Option<&'static str> {
        self.active.map(|entry| entry.id)
    }

    pub fn legend(&self) -> Option<&Legend> {
        self.legend.as_ref()
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    /// Whether a fetch for the latest selection is still outstanding.
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Tear down the current layer and, for `Some(id)`, issue a ticket to
    /// load `id`. Any outstanding ticket becomes stale.
    pub fn select<E: MapEngine>(
        &mut self,
        engine: &mut E,
        layer_id: Option<&str>,
    ) -> Result<Option<LoadTicket>, LayerLoadError> {
        self.teardown(engine);
        self.latest_request = self.latest_request.wrapping_add(1);
        self.pending = None;

        let Some(layer_id) = layer_id else {
            return Ok(None);
        };
        let layer = registry::layer(layer_id)
            .ok_or_else(|| LayerLoadError::UnknownLayer(layer_id.to_string()))?;

        self.pending = Some(self.latest_request);
        Ok(Some(LoadTicket {
            request: self.latest_request,
            layer,
        }))
    }

    /// Apply the result of a ticket's fetch.
    pub fn complete<E: MapEngine>(
        &mut self,
        engine: &mut E,
        ticket: LoadTicket,
        features: Result<FeatureCollection, LayerLoadError>,
    ) -> LoadOutcome {
        if self.pending != Some(ticket.request) {
            return LoadOutcome::Stale;
        }
        self.pending = None;

        match features.and_then(|features| self.activate(engine, ticket.layer, &features)) {
            Ok(()) => LoadOutcome::Activated(ticket.layer.id),
            Err(e) => {
                self.teardown(engine);
                LoadOutcome::Failed(e)
            }
        }
    }

    /// Update the fill opacity of the active layer. Stored either way so the
    /// next layer starts with it.
    pub fn set_opacity<E: MapEngine>(
        &mut self,
        engine: &mut E,
        value: f64,
    ) -> Result<(), EngineError> {
        self.stage_opacity(value);
        let Some(entry) = self.active else {
            return Ok(());
        };
        engine.set_paint_property(entry.id, "fill-opacity", &json!(self.opacity))
    }

    pub fn stage_opacity(&mut self, value: f64) {
        self.opacity = style::normalize_opacity(value);
    }

    fn activate<E: MapEngine>(
        &mut self,
        engine: &mut E,
        entry: &'static LayerEntry,
        features: &FeatureCollection,
    ) -> Result<(), LayerLoadError> {
        remove_rendered(engine, entry.id);

        let source = style::geojson_source(features)?;
        engine.add_source(entry.id, &source)?;
        if let Err(e) = engine.add_layer(&style::fill_layer(entry, self.opacity), None) {
            remove_rendered(engine, entry.id);
            return Err(e.into());
        }

        self.active = Some(entry);
        self.legend = Some(legend::render_entry(entry));
        Ok(())
    }

    fn teardown<E: MapEngine>(&mut self, engine: &mut E) {
        if let Some(entry) = self.active.take() {
            remove_rendered(engine, entry.id);
        }
        self.legend = None;
    }
}

fn remove_rendered<E: MapEngine>(engine: &mut E, id: &str) {
    if engine.has_layer(id) {
        engine.remove_layer(id);
    }
    if engine.has_source(id) {
        engine.remove_source(id);
    }
}
