pub mod basemap;
pub mod engine;
pub mod geocode;
pub mod geojson;
pub mod hash;
pub mod layers;
pub mod legend;
pub mod registry;
pub mod style;
pub mod topology;
pub mod view_state;
pub mod viewer;

pub use basemap::{Basemap, BasemapSwitcher};
pub use engine::{EngineError, MapEngine};
pub use geojson::{Feature, FeatureCollection, Geometry};
pub use layers::{LayerLoadError, LayerSwapController, LoadOutcome, LoadTicket};
pub use legend::{Legend, LegendRow};
pub use registry::{LayerChoice, LayerEntry};
pub use view_state::{LngLat, ViewState};
pub use viewer::{ControlCommand, Followup, Startup, Viewer, ViewerError};
