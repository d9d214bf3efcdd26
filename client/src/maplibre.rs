//! Bindings to the `maplibregl` global and the [`MapEngine`] implementation
//! on top of them.

use js_sys::{Function, Reflect};
use serde::Serialize;
use serde_json::{Value, json};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use uhi_shared::basemap::VECTOR_STYLE_URL;
use uhi_shared::view_state::{MAX_BOUNDS, MAX_ZOOM, MIN_ZOOM};
use uhi_shared::{EngineError, LngLat, MapEngine, ViewState};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = maplibregl)]
    #[derive(Debug, Clone)]
    pub type Map;

    #[wasm_bindgen(constructor, js_namespace = maplibregl, catch)]
    fn new(options: &JsValue) -> Result<Map, JsValue>;

    #[wasm_bindgen(method, js_name = addSource, catch)]
    fn add_source(this: &Map, id: &str, source: &JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(method, js_name = removeSource, catch)]
    fn remove_source(this: &Map, id: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(method, js_name = getSource)]
    fn get_source(this: &Map, id: &str) -> JsValue;

    #[wasm_bindgen(method, js_name = addLayer, catch)]
    fn add_layer(this: &Map, layer: &JsValue, before_id: &JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(method, js_name = removeLayer, catch)]
    fn remove_layer(this: &Map, id: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(method, js_name = getLayer)]
    fn get_layer(this: &Map, id: &str) -> JsValue;

    #[wasm_bindgen(method, js_name = setPaintProperty, catch)]
    fn set_paint_property(
        this: &Map,
        layer: &str,
        name: &str,
        value: &JsValue,
    ) -> Result<(), JsValue>;

    #[wasm_bindgen(method, js_name = setLayoutProperty, catch)]
    fn set_layout_property(
        this: &Map,
        layer: &str,
        name: &str,
        value: &JsValue,
    ) -> Result<(), JsValue>;

    #[wasm_bindgen(method, js_name = getCenter)]
    fn get_center(this: &Map) -> MapLngLat;

    #[wasm_bindgen(method, js_name = getZoom)]
    fn get_zoom(this: &Map) -> f64;

    #[wasm_bindgen(method)]
    fn on(this: &Map, event: &str, handler: &Function);

    #[wasm_bindgen(method, js_name = addControl)]
    fn add_control(this: &Map, control: &JsValue, position: &str);

    #[wasm_bindgen(method, js_name = setMaxBounds)]
    fn set_max_bounds(this: &Map, bounds: &JsValue);

    #[wasm_bindgen(js_namespace = maplibregl, js_name = LngLat)]
    type MapLngLat;

    #[wasm_bindgen(method, getter)]
    fn lng(this: &MapLngLat) -> f64;

    #[wasm_bindgen(method, getter)]
    fn lat(this: &MapLngLat) -> f64;

    #[wasm_bindgen(js_namespace = maplibregl)]
    type ScaleControl;

    #[wasm_bindgen(constructor, js_namespace = maplibregl)]
    fn new(options: &JsValue) -> ScaleControl;

    #[wasm_bindgen(js_namespace = maplibregl)]
    type NavigationControl;

    #[wasm_bindgen(constructor, js_namespace = maplibregl)]
    fn new() -> NavigationControl;

    #[wasm_bindgen(js_namespace = maplibregl)]
    type GeolocateControl;

    #[wasm_bindgen(constructor, js_namespace = maplibregl)]
    fn new(options: &JsValue) -> GeolocateControl;
}

/// Convert style-spec JSON into a plain JS object.
pub(crate) fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, String> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| e.to_string())
}

pub(crate) fn js_error_message(error: &JsValue) -> String {
    if let Some(error) = error.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    error.as_string().unwrap_or_else(|| format!("{error:?}"))
}

fn is_present(value: &JsValue) -> bool {
    !value.is_undefined() && !value.is_null()
}

/// A live MapLibre map.
#[derive(Debug, Clone)]
pub(crate) struct MapLibreEngine {
    map: Map,
}

impl MapLibreEngine {
    /// Create the map in `container`, positioned at `view`.
    pub(crate) fn create(container: &str, view: &ViewState) -> Result<Self, String> {
        let options = to_js(&json!({
            "container": container,
            "style": VECTOR_STYLE_URL,
            "center": [view.center.lon, view.center.lat],
            "zoom": view.zoom,
            "minZoom": MIN_ZOOM,
            "maxZoom": MAX_ZOOM,
        }))?;
        let map = Map::new(&options).map_err(|e| js_error_message(&e))?;
        map.set_max_bounds(&to_js(&MAX_BOUNDS.to_array())?);

        let scale = ScaleControl::new(&to_js(&json!({"maxWidth": 200, "unit": "metric"}))?);
        map.add_control(scale.as_ref(), "bottom-right");

        Ok(Self { map })
    }

    /// Navigation and geolocation buttons.
    pub(crate) fn add_navigation_controls(&self) {
        self.map
            .add_control(NavigationControl::new().as_ref(), "top-right");
        match to_js(&json!({
            "positionOptions": {"enableHighAccuracy": true},
            "trackUserLocation": true,
        })) {
            Ok(options) => self
                .map
                .add_control(GeolocateControl::new(&options).as_ref(), "top-right"),
            Err(e) => web_sys::console::warn_1(&format!("Geolocate control skipped: {e}").into()),
        }
    }

    pub(crate) fn add_control(&self, control: &JsValue, position: &str) {
        self.map.add_control(control, position);
    }

    /// Register a handler for a map event for the lifetime of the page.
    pub(crate) fn on(&self, event: &str, handler: impl FnMut() + 'static) {
        let callback = Closure::<dyn FnMut()>::new(handler);
        self.map.on(event, callback.as_ref().unchecked_ref());
        callback.forget();
    }
}

/// The `maplibregl` namespace object, needed by plugins that take it as an
/// option.
pub(crate) fn namespace() -> JsValue {
    Reflect::get(&js_sys::global(), &JsValue::from_str("maplibregl")).unwrap_or(JsValue::UNDEFINED)
}

impl MapEngine for MapLibreEngine {
    fn has_source(&self, id: &str) -> bool {
        is_present(&self.map.get_source(id))
    }

    fn has_layer(&self, id: &str) -> bool {
        is_present(&self.map.get_layer(id))
    }

    fn add_source(&mut self, id: &str, source: &Value) -> Result<(), EngineError> {
        let source = to_js(source).map_err(|e| EngineError::new("add_source", id, e))?;
        self.map
            .add_source(id, &source)
            .map_err(|e| EngineError::new("add_source", id, js_error_message(&e)))
    }

    fn remove_source(&mut self, id: &str) {
        if let Err(e) = self.map.remove_source(id) {
            web_sys::console::warn_1(
                &format!("removeSource({id}) failed: {}", js_error_message(&e)).into(),
            );
        }
    }

    fn add_layer(&mut self, layer: &Value, before: Option<&str>) -> Result<(), EngineError> {
        let id = layer.get("id").and_then(Value::as_str).unwrap_or_default();
        let layer_js = to_js(layer).map_err(|e| EngineError::new("add_layer", id, e))?;
        let before = before.map(JsValue::from_str).unwrap_or(JsValue::UNDEFINED);
        self.map
            .add_layer(&layer_js, &before)
            .map_err(|e| EngineError::new("add_layer", id, js_error_message(&e)))
    }

    fn remove_layer(&mut self, id: &str) {
        if let Err(e) = self.map.remove_layer(id) {
            web_sys::console::warn_1(
                &format!("removeLayer({id}) failed: {}", js_error_message(&e)).into(),
            );
        }
    }

    fn set_paint_property(
        &mut self,
        layer: &str,
        name: &str,
        value: &Value,
    ) -> Result<(), EngineError> {
        let value = to_js(value).map_err(|e| EngineError::new("set_paint_property", layer, e))?;
        self.map
            .set_paint_property(layer, name, &value)
            .map_err(|e| EngineError::new("set_paint_property", layer, js_error_message(&e)))
    }

    fn set_layout_property(
        &mut self,
        layer: &str,
        name: &str,
        value: &Value,
    ) -> Result<(), EngineError> {
        let value = to_js(value).map_err(|e| EngineError::new("set_layout_property", layer, e))?;
        self.map
            .set_layout_property(layer, name, &value)
            .map_err(|e| EngineError::new("set_layout_property", layer, js_error_message(&e)))
    }

    fn center(&self) -> LngLat {
        let center = self.map.get_center();
        LngLat {
            lon: center.lng(),
            lat: center.lat(),
        }
    }

    fn zoom(&self) -> f64 {
        self.map.get_zoom()
    }
}
