//! Place search box backed by Nominatim.

use js_sys::{Object, Promise, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use uhi_shared::geocode::{self, NominatimResponse, PlaceResults};

use crate::maplibre::{self, MapLibreEngine};

#[wasm_bindgen]
extern "C" {
    type MaplibreGeocoder;

    #[wasm_bindgen(constructor)]
    fn new(options: &JsValue) -> MaplibreGeocoder;
}

/// Add the search box to the map, above the navigation buttons.
pub(crate) fn attach(engine: &MapLibreEngine) {
    let forward = Closure::<dyn Fn(JsValue) -> Promise>::new(|config: JsValue| {
        let query = Reflect::get(&config, &JsValue::from_str("query"))
            .ok()
            .and_then(|query| query.as_string())
            .unwrap_or_default();
        future_to_promise(async move {
            let results = search(&query).await.map_err(|e| {
                web_sys::console::warn_1(&format!("Geocoding failed: {e}").into());
                JsValue::from_str(&e)
            })?;
            maplibre::to_js(&results).map_err(|e| JsValue::from_str(&e))
        })
    });

    let options = Object::new();
    set(&options, "maplibregl", &maplibre::namespace());
    set(&options, "marker", &JsValue::TRUE);
    set(&options, "placeholder", &JsValue::from_str(geocode::PLACEHOLDER));
    set(&options, "language", &JsValue::from_str(geocode::LANGUAGE));
    set(&options, "forwardGeocode", forward.as_ref());
    forward.forget();

    let control = MaplibreGeocoder::new(&options);
    engine.add_control(control.as_ref(), "top-right");
}

fn set(target: &Object, key: &str, value: &JsValue) {
    let _ = Reflect::set(target, &JsValue::from_str(key), value);
}

async fn search(query: &str) -> Result<PlaceResults, String> {
    let url = geocode::search_url(query).map_err(|e| format!("bad query: {e}"))?;
    let resp = gloo_net::http::Request::get(url.as_str())
        .send()
        .await
        .map_err(|e| format!("fetch error: {e}"))?;
    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }
    let response: NominatimResponse = resp
        .json()
        .await
        .map_err(|e| format!("parse error: {e}"))?;
    Ok(geocode::to_place_results(response))
}
