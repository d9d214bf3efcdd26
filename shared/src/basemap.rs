//! Basemap choices.
//!
//! The vector style is the map's base style. The orthophoto is a raster
//! layer installed once on top of it and shown or hidden through its
//! `visibility` layout property, so switching never touches the thematic
//! layer.

use serde_json::{Value, json};

use crate::engine::{EngineError, MapEngine};

pub const VECTOR_STYLE_URL: &str = "https://tiles.openfreemap.org/styles/liberty";
pub const ORTHOPHOTO_SOURCE_ID: &str = "ortofoto";
pub const ORTHOPHOTO_LAYER_ID: &str = "base-ortofoto";
pub const ORTHOPHOTO_TILES: &str =
    "https://sitmappe.comune.bologna.it/tms/tileserver/Ortofoto2024/{z}/{x}/{y}.png";
pub const ORTHOPHOTO_ATTRIBUTION: &str = "© Comune di Bologna, 2024";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Basemap {
    #[default]
    Vector,
    Orthophoto,
}

impl Basemap {
    /// Radio button order; the URL hash background index refers to it.
    pub const ALL: [Basemap; 2] = [Basemap::Vector, Basemap::Orthophoto];

    pub fn index(self) -> usize {
        match self {
            Self::Vector => 0,
            Self::Orthophoto => 1,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Radio input value.
    pub fn value(self) -> &'static str {
        match self {
            Self::Vector => "osm",
            Self::Orthophoto => "ortofoto",
        }
    }

    pub fn from_value(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|basemap| basemap.value() == value)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Vector => "Mappa",
            Self::Orthophoto => "Ortofoto 2024",
        }
    }
}

pub fn orthophoto_source() -> Value {
    json!({
        "type": "raster",
        "tiles": [ORTHOPHOTO_TILES],
        "tileSize": 256,
        "attribution": ORTHOPHOTO_ATTRIBUTION,
    })
}

pub fn orthophoto_layer(visible: bool) -> Value {
    json!({
        "id": ORTHOPHOTO_LAYER_ID,
        "type": "raster",
        "source": ORTHOPHOTO_SOURCE_ID,
        "layout": {"visibility": visibility(visible)},
    })
}

fn visibility(visible: bool) -> &'static str {
    if visible { "visible" } else { "none" }
}

/// Tracks the current basemap and keeps the orthophoto layer in sync.
#[derive(Debug, Clone, Default)]
pub struct BasemapSwitcher {
    current: Basemap,
}

impl BasemapSwitcher {
    pub fn new(initial: Basemap) -> Self {
        Self { current: initial }
    }

    pub fn current(&self) -> Basemap {
        self.current
    }

    /// Record a choice without touching the map (before the map is ready).
    pub fn stage(&mut self, basemap: Basemap) {
        self.current = basemap;
    }

    /// Add the orthophoto source and layer below `below` (usually the
    /// active thematic layer), visible only if it is the current choice.
    pub fn install<E: MapEngine>(
        &self,
        engine: &mut E,
        below: Option<&str>,
    ) -> Result<(), EngineError> {
        if !engine.has_source(ORTHOPHOTO_SOURCE_ID) {
            engine.add_source(ORTHOPHOTO_SOURCE_ID, &orthophoto_source())?;
        }
        if !engine.has_layer(ORTHOPHOTO_LAYER_ID) {
            let before = below.filter(|id| engine.has_layer(id));
            engine.add_layer(
                &orthophoto_layer(self.current == Basemap::Orthophoto),
                before,
            )?;
        }
        Ok(())
    }

    pub fn switch<E: MapEngine>(
        &mut self,
        engine: &mut E,
        basemap: Basemap,
    ) -> Result<(), EngineError> {
        self.current = basemap;
        if !engine.has_layer(ORTHOPHOTO_LAYER_ID) {
            return Err(EngineError::new(
                "switch_basemap",
                ORTHOPHOTO_LAYER_ID,
                "orthophoto layer not installed",
            ));
        }
        engine.set_layout_property(
            ORTHOPHOTO_LAYER_ID,
            "visibility",
            &json!(visibility(basemap == Basemap::Orthophoto)),
        )
    }
}
