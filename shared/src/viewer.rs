//! UI commands in, map mutations out.
//!
//! [`Viewer`] owns the layer chooser selection, the thematic layer
//! controller and the basemap switcher. The page turns widget events into
//! [`ControlCommand`]s and performs whatever [`Followup`] the viewer asks
//! for: fetching a layer resource, or re-encoding the URL hash.

use thiserror::Error;

use crate::basemap::{Basemap, BasemapSwitcher};
use crate::engine::{EngineError, MapEngine};
use crate::geojson::FeatureCollection;
use crate::hash;
use crate::layers::{LayerLoadError, LayerSwapController, LoadOutcome, LoadTicket};
use crate::legend::Legend;
use crate::registry::LayerChoice;
use crate::style::DEFAULT_FILL_OPACITY;
use crate::view_state::ViewState;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlCommand {
    SelectLayer(LayerChoice),
    SetOpacity(f64),
    SetBasemap(Basemap),
}

#[derive(Debug, PartialEq, Eq)]
pub enum Followup {
    Nothing,
    /// Fetch the ticket's resource and hand the result to [`Viewer::complete`].
    Fetch(LoadTicket),
    /// The addressable view changed; write a fresh URL hash.
    EncodeHash,
}

#[derive(Error, Debug)]
pub enum ViewerError {
    #[error(transparent)]
    Layer(#[from] LayerLoadError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Result of [`Viewer::start`]. The basemap install and the initial layer
/// selection fail independently.
#[derive(Debug)]
pub struct Startup {
    pub layer: Result<Followup, ViewerError>,
    pub basemap: Result<(), EngineError>,
}

#[derive(Debug)]
pub struct Viewer {
    selection: LayerChoice,
    layers: LayerSwapController,
    basemap: BasemapSwitcher,
    ready: bool,
}

impl Viewer {
    /// Build the initial selection from a decoded view state; missing
    /// indices keep the chooser defaults.
    pub fn new(initial: &ViewState) -> Self {
        let selection = initial
            .foreground_index
            .and_then(LayerChoice::at)
            .unwrap_or_default();
        let basemap = initial
            .background_index
            .and_then(Basemap::from_index)
            .unwrap_or_default();

        Self {
            selection,
            layers: LayerSwapController::new(DEFAULT_FILL_OPACITY),
            basemap: BasemapSwitcher::new(basemap),
            ready: false,
        }
    }

    pub fn selection(&self) -> LayerChoice {
        self.selection
    }

    pub fn basemap(&self) -> Basemap {
        self.basemap.current()
    }

    pub fn opacity(&self) -> f64 {
        self.layers.opacity()
    }

    pub fn layers(&self) -> &LayerSwapController {
        &self.layers
    }

    pub fn legend(&self) -> Option<&Legend> {
        self.layers.legend()
    }

    /// The map finished loading: install the basemaps and load the selected
    /// layer. A basemap failure does not hold back the thematic layer.
    pub fn start<E: MapEngine>(&mut self, engine: &mut E) -> Startup {
        self.ready = true;
        let basemap = self.basemap.install(engine, self.layers.active_id());
        Startup {
            layer: self.select(engine),
            basemap,
        }
    }

    /// Apply a command. Before [`Viewer::start`] the command is only recorded.
    pub fn dispatch<E: MapEngine>(
        &mut self,
        engine: &mut E,
        command: ControlCommand,
    ) -> Result<Followup, ViewerError> {
        if !self.ready {
            self.stage(command);
            return Ok(Followup::Nothing);
        }

        match command {
            ControlCommand::SelectLayer(choice) => {
                self.selection = choice;
                self.select(engine)
            }
            ControlCommand::SetOpacity(value) => {
                self.layers.set_opacity(engine, value)?;
                Ok(Followup::Nothing)
            }
            ControlCommand::SetBasemap(basemap) => {
                self.basemap.switch(engine, basemap)?;
                Ok(Followup::EncodeHash)
            }
        }
    }

    /// Record a command without touching the map.
    pub fn stage(&mut self, command: ControlCommand) {
        match command {
            ControlCommand::SelectLayer(choice) => self.selection = choice,
            ControlCommand::SetOpacity(value) => self.layers.stage_opacity(value),
            ControlCommand::SetBasemap(basemap) => self.basemap.stage(basemap),
        }
    }

    pub fn complete<E: MapEngine>(
        &mut self,
        engine: &mut E,
        ticket: LoadTicket,
        features: Result<FeatureCollection, LayerLoadError>,
    ) -> LoadOutcome {
        self.layers.complete(engine, ticket, features)
    }

    /// Current view as the URL hash encodes it.
    pub fn view_state<E: MapEngine>(&self, engine: &E) -> ViewState {
        ViewState {
            zoom: engine.zoom(),
            center: engine.center(),
            foreground_index: Some(self.selection.index()),
            background_index: Some(self.basemap.current().index()),
        }
    }

    pub fn encode_hash<E: MapEngine>(&self, engine: &E) -> String {
        hash::encode(&self.view_state(engine))
    }

    fn select<E: MapEngine>(&mut self, engine: &mut E) -> Result<Followup, ViewerError> {
        let ticket = self
            .layers
            .select(engine, self.selection.entry().map(|entry| entry.id))?;
        Ok(ticket.map_or(Followup::Nothing, Followup::Fetch))
    }
}

#[cfg(test)]
mod tests {
    use super::{ControlCommand, Followup, Viewer};
    use crate::engine::{EngineError, MapEngine};
    use crate::basemap::{Basemap, ORTHOPHOTO_LAYER_ID, ORTHOPHOTO_SOURCE_ID};
    use crate::engine::fake::FakeEngine;
    use crate::hash;
    use crate::layers::{LayerLoadError, LoadOutcome, decode_resource};
    use crate::registry::{LayerChoice, layer};
    use crate::view_state::{LngLat, ViewState};
    use serde_json::json;

    const EMPTY_COLLECTION: &str = r#"{
        "type": "Topology",
        "objects": {"zones": {"type": "GeometryCollection", "geometries": []}},
        "arcs": []
    }"#;

    fn choice(id: &str) -> LayerChoice {
        LayerChoice::Layer(layer(id).expect("registry layer"))
    }

    fn fetch(followup: Followup) -> crate::layers::LoadTicket {
        match followup {
            Followup::Fetch(ticket) => ticket,
            other => panic!("expected fetch, got {other:?}"),
        }
    }

    #[test]
    fn initial_indices_from_hash_pick_chooser_options() {
        let view = hash::decode("#12.5/44.5/11.3/2/1", LayerChoice::COUNT, Basemap::ALL.len())
            .expect("decodes");
        let viewer = Viewer::new(&view);
        assert_eq!(viewer.selection().value(), "albedo_class");
        assert_eq!(viewer.basemap(), Basemap::Orthophoto);
    }

    #[test]
    fn missing_indices_keep_defaults() {
        let viewer = Viewer::new(&ViewState::default());
        assert_eq!(viewer.selection(), LayerChoice::default());
        assert_eq!(viewer.basemap(), Basemap::Vector);
    }

    #[test]
    fn start_installs_basemap_below_and_requests_selected_layer() {
        let mut engine = FakeEngine::default();
        let mut viewer = Viewer::new(&ViewState {
            foreground_index: Some(1),
            ..ViewState::default()
        });

        let ticket = fetch(viewer.start(&mut engine).layer.expect("start"));
        assert_eq!(ticket.layer_id(), "ndvi_class");
        assert_eq!(ticket.resource_path(), "topojson/ndvi_class.topojson");

        let outcome = viewer.complete(&mut engine, ticket, decode_resource(EMPTY_COLLECTION));
        assert!(matches!(outcome, LoadOutcome::Activated("ndvi_class")));
        assert_eq!(
            engine.layer_ids(),
            vec![ORTHOPHOTO_LAYER_ID.to_string(), "ndvi_class".to_string()]
        );
    }

    #[test]
    fn start_with_no_layer_choice_fetches_nothing() {
        let mut engine = FakeEngine::default();
        let mut viewer = Viewer::new(&ViewState {
            foreground_index: Some(LayerChoice::COUNT - 1),
            ..ViewState::default()
        });
        assert_eq!(viewer.start(&mut engine).layer.expect("start"), Followup::Nothing);
    }

    #[test]
    fn commands_before_start_are_staged() {
        let mut engine = FakeEngine::default();
        let mut viewer = Viewer::new(&ViewState::default());

        let staged = [
            ControlCommand::SelectLayer(choice("uhei_class")),
            ControlCommand::SetOpacity(0.25),
            ControlCommand::SetBasemap(Basemap::Orthophoto),
        ];
        for command in staged {
            assert_eq!(
                viewer.dispatch(&mut engine, command).expect("staged"),
                Followup::Nothing
            );
        }
        assert!(engine.calls.is_empty());

        let ticket = fetch(viewer.start(&mut engine).layer.expect("start"));
        assert_eq!(ticket.layer_id(), "uhei_class");
        viewer.complete(&mut engine, ticket, decode_resource(EMPTY_COLLECTION));

        assert_eq!(
            engine.layer(ORTHOPHOTO_LAYER_ID).expect("ortho")["layout"]["visibility"],
            json!("visible")
        );
        assert_eq!(
            engine.layer("uhei_class").expect("fill")["paint"]["fill-opacity"],
            json!(0.25)
        );
    }

    #[test]
    fn basemap_switch_keeps_thematic_layer_and_requests_hash() {
        let mut engine = FakeEngine::default();
        let mut viewer = Viewer::new(&ViewState::default());
        let ticket = fetch(viewer.start(&mut engine).layer.expect("start"));
        viewer.complete(&mut engine, ticket, decode_resource(EMPTY_COLLECTION));
        engine.calls.clear();

        let followup = viewer
            .dispatch(&mut engine, ControlCommand::SetBasemap(Basemap::Orthophoto))
            .expect("switch");
        assert_eq!(followup, Followup::EncodeHash);
        assert_eq!(
            engine.calls,
            vec!["set_layout_property:base-ortofoto:visibility=\"visible\""]
        );
        assert_eq!(viewer.layers().active_id(), Some("z_score_class"));
        assert!(viewer.legend().is_some());
    }

    #[test]
    fn layer_change_does_not_request_hash_update() {
        let mut engine = FakeEngine::default();
        let mut viewer = Viewer::new(&ViewState::default());
        viewer.start(&mut engine).layer.expect("start");

        let followup = viewer
            .dispatch(&mut engine, ControlCommand::SelectLayer(choice("ndvi_class")))
            .expect("select");
        assert!(matches!(followup, Followup::Fetch(_)));

        let followup = viewer
            .dispatch(&mut engine, ControlCommand::SelectLayer(LayerChoice::Nothing))
            .expect("clear");
        assert_eq!(followup, Followup::Nothing);
    }

    #[test]
    fn failed_initial_fetch_leaves_map_without_thematic_layer() {
        let mut engine = FakeEngine::default();
        let mut viewer = Viewer::new(&ViewState::default());
        let ticket = fetch(viewer.start(&mut engine).layer.expect("start"));

        let outcome = viewer.complete(
            &mut engine,
            ticket,
            Err(LayerLoadError::Fetch("HTTP 404".into())),
        );
        assert!(matches!(outcome, LoadOutcome::Failed(_)));
        assert_eq!(engine.layer_ids(), vec![ORTHOPHOTO_LAYER_ID.to_string()]);
        assert_eq!(engine.sources.len(), 1);
        assert!(viewer.legend().is_none());
    }

    #[test]
    fn encode_hash_reflects_engine_view_and_chooser_state() {
        let mut engine = FakeEngine {
            center: Some(LngLat {
                lon: 11.3426871,
                lat: 44.4938112,
            }),
            zoom: Some(13.456),
            ..Default::default()
        };
        let mut viewer = Viewer::new(&ViewState::default());
        viewer.start(&mut engine).layer.expect("start");
        viewer
            .dispatch(&mut engine, ControlCommand::SelectLayer(choice("heat_veg_class")))
            .expect("select");
        viewer
            .dispatch(&mut engine, ControlCommand::SetBasemap(Basemap::Orthophoto))
            .expect("switch");

        assert_eq!(viewer.encode_hash(&engine), "#13.46/44.493811/11.342687/4/1");
    }

    /// Engine that refuses the orthophoto source.
    #[derive(Default)]
    struct NoOrthophoto(FakeEngine);

    impl MapEngine for NoOrthophoto {
        fn has_source(&self, id: &str) -> bool {
            self.0.has_source(id)
        }
        fn has_layer(&self, id: &str) -> bool {
            self.0.has_layer(id)
        }
        fn add_source(&mut self, id: &str, source: &serde_json::Value) -> Result<(), EngineError> {
            if id == ORTHOPHOTO_SOURCE_ID {
                return Err(EngineError::new("add_source", id, "tile server unreachable"));
            }
            self.0.add_source(id, source)
        }
        fn remove_source(&mut self, id: &str) {
            self.0.remove_source(id)
        }
        fn add_layer(
            &mut self,
            layer: &serde_json::Value,
            before: Option<&str>,
        ) -> Result<(), EngineError> {
            self.0.add_layer(layer, before)
        }
        fn remove_layer(&mut self, id: &str) {
            self.0.remove_layer(id)
        }
        fn set_paint_property(
            &mut self,
            layer: &str,
            name: &str,
            value: &serde_json::Value,
        ) -> Result<(), EngineError> {
            self.0.set_paint_property(layer, name, value)
        }
        fn set_layout_property(
            &mut self,
            layer: &str,
            name: &str,
            value: &serde_json::Value,
        ) -> Result<(), EngineError> {
            self.0.set_layout_property(layer, name, value)
        }
        fn center(&self) -> LngLat {
            self.0.center()
        }
        fn zoom(&self) -> f64 {
            self.0.zoom()
        }
    }

    #[test]
    fn basemap_failure_still_loads_thematic_layer() {
        let mut engine = NoOrthophoto::default();
        let mut viewer = Viewer::new(&ViewState::default());

        let startup = viewer.start(&mut engine);
        assert!(startup.basemap.is_err());
        let ticket = fetch(startup.layer.expect("layer selection"));
        assert_eq!(ticket.layer_id(), "z_score_class");

        let outcome = viewer.complete(&mut engine, ticket, decode_resource(EMPTY_COLLECTION));
        assert!(matches!(outcome, LoadOutcome::Activated("z_score_class")));
        assert_eq!(engine.0.layer_ids(), vec!["z_score_class".to_string()]);
        assert!(viewer.legend().is_some());

        let switched = viewer.dispatch(&mut engine, ControlCommand::SetBasemap(Basemap::Orthophoto));
        assert!(switched.is_err());
        assert_eq!(viewer.layers().active_id(), Some("z_score_class"));
    }
}
