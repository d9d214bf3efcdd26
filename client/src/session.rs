use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use uhi_shared::layers::decode_resource;
use uhi_shared::{
    Basemap, ControlCommand, FeatureCollection, Followup, LayerChoice, LayerLoadError, Legend,
    LoadOutcome, LoadTicket, ViewState, Viewer, ViewerError, hash,
};

use crate::geocoder;
use crate::maplibre::MapLibreEngine;

pub(crate) const MAP_CONTAINER_ID: &str = "map";

/// Viewer state plus the map it drives. The map is absent until the
/// container element has been mounted.
pub(crate) struct Session {
    viewer: Viewer,
    initial: ViewState,
    engine: Option<MapLibreEngine>,
}

impl Session {
    pub(crate) fn new(initial: ViewState) -> Self {
        Self {
            viewer: Viewer::new(&initial),
            initial,
            engine: None,
        }
    }

    pub(crate) fn viewer(&self) -> &Viewer {
        &self.viewer
    }
}

/// Page-lifetime session, shared through Leptos context.
#[derive(Clone, Copy)]
pub(crate) struct SessionStore(pub StoredValue<Session, LocalStorage>);

/// Legend of the active thematic layer.
#[derive(Clone, Copy)]
pub(crate) struct ActiveLegend(pub RwSignal<Option<Legend>>);

/// The view addressed by the current URL hash, or the default view.
pub(crate) fn initial_view() -> ViewState {
    let fragment = web_sys::window()
        .and_then(|window| window.location().hash().ok())
        .unwrap_or_default();
    hash::decode(&fragment, LayerChoice::COUNT, Basemap::ALL.len()).unwrap_or_default()
}

/// Create the map and wire its lifecycle events. Safe to call more than once.
pub(crate) fn mount_map(store: SessionStore, legend: ActiveLegend) {
    if store.0.with_value(|session| session.engine.is_some()) {
        return;
    }
    let initial = store.0.with_value(|session| session.initial);
    let engine = match MapLibreEngine::create(MAP_CONTAINER_ID, &initial) {
        Ok(engine) => engine,
        Err(e) => {
            web_sys::console::error_1(&format!("Map creation failed: {e}").into());
            return;
        }
    };

    engine.on("load", {
        let engine = engine.clone();
        move || {
            geocoder::attach(&engine);
            engine.add_navigation_controls();
            let startup = store.0.try_update_value(|session| {
                let Session { viewer, engine, .. } = session;
                engine.as_mut().map(|engine| viewer.start(engine))
            });
            let Some(Some(startup)) = startup else {
                return;
            };
            if let Err(e) = startup.basemap {
                web_sys::console::warn_1(&format!("Orthophoto unavailable: {e}").into());
            }
            apply_followup(store, legend, startup.layer);
        }
    });
    engine.on("moveend", move || write_hash(store));

    store.0.update_value(|session| session.engine = Some(engine));
    write_hash(store);
}

/// Route a widget command through the viewer and run its followup.
pub(crate) fn dispatch(store: SessionStore, legend: ActiveLegend, command: ControlCommand) {
    let result = store.0.try_update_value(|session| {
        let Session { viewer, engine, .. } = session;
        match engine.as_mut() {
            Some(engine) => viewer.dispatch(engine, command),
            None => {
                viewer.stage(command);
                Ok(Followup::Nothing)
            }
        }
    });
    if let Some(result) = result {
        apply_followup(store, legend, result);
    }
}

fn apply_followup(store: SessionStore, legend: ActiveLegend, result: Result<Followup, ViewerError>) {
    publish_legend(store, legend);
    match result {
        Ok(Followup::Nothing) => {}
        Ok(Followup::Fetch(ticket)) => load_layer(store, legend, ticket),
        Ok(Followup::EncodeHash) => write_hash(store),
        Err(e) => web_sys::console::warn_1(&format!("Map update failed: {e}").into()),
    }
}

fn publish_legend(store: SessionStore, legend: ActiveLegend) {
    let current = store
        .0
        .with_value(|session| session.viewer.legend().cloned());
    legend.0.set(current);
}

fn write_hash(store: SessionStore) {
    let fragment = store.0.with_value(|session| {
        session
            .engine
            .as_ref()
            .map(|engine| session.viewer.encode_hash(engine))
    });
    let (Some(fragment), Some(window)) = (fragment, web_sys::window()) else {
        return;
    };
    if let Err(e) = window.location().set_hash(&fragment) {
        web_sys::console::warn_1(&format!("Hash update failed: {e:?}").into());
    }
}

fn load_layer(store: SessionStore, legend: ActiveLegend, ticket: LoadTicket) {
    spawn_local(async move {
        let features = fetch_layer(&ticket.resource_path()).await;
        let outcome = store.0.try_update_value(|session| {
            let Session { viewer, engine, .. } = session;
            engine
                .as_mut()
                .map(|engine| viewer.complete(engine, ticket, features))
        });
        match outcome.flatten() {
            Some(LoadOutcome::Activated(_)) => publish_legend(store, legend),
            Some(LoadOutcome::Failed(e)) => {
                web_sys::console::warn_1(&format!("Layer load failed: {e}").into());
                publish_legend(store, legend);
            }
            Some(LoadOutcome::Stale) => {
                web_sys::console::info_1(&"Discarded superseded layer result".into());
            }
            None => {}
        }
    });
}

async fn fetch_layer(path: &str) -> Result<FeatureCollection, LayerLoadError> {
    let resp = gloo_net::http::Request::get(path)
        .send()
        .await
        .map_err(|e| LayerLoadError::Fetch(e.to_string()))?;
    if !resp.ok() {
        return Err(LayerLoadError::Fetch(format!("HTTP {}", resp.status())));
    }
    let text = resp
        .text()
        .await
        .map_err(|e| LayerLoadError::Fetch(e.to_string()))?;
    decode_resource(&text)
}
