//! Place search through Nominatim, reshaped for the map geocoder control.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

pub const NOMINATIM_SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";
pub const RESULT_LIMIT: usize = 5;
pub const PLACEHOLDER: &str = "Cerca un luogo...";
pub const LANGUAGE: &str = "it";

/// Search URL for a free-text query.
pub fn search_url(query: &str) -> Result<Url, url::ParseError> {
    let limit = RESULT_LIMIT.to_string();
    Url::parse_with_params(
        NOMINATIM_SEARCH_URL,
        [("format", "geojson"), ("limit", limit.as_str()), ("q", query)],
    )
}

#[derive(Debug, Clone, Deserialize)]
pub struct NominatimResponse {
    #[serde(default)]
    pub features: Vec<NominatimFeature>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NominatimFeature {
    pub geometry: Value,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

/// A feature in the shape the geocoder control expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceFeature {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub geometry: Value,
    pub properties: Map<String, Value>,
    pub place_name: String,
    pub center: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceResults {
    pub features: Vec<PlaceFeature>,
}

pub fn to_place_results(response: NominatimResponse) -> PlaceResults {
    let features = response
        .features
        .into_iter()
        .map(|feature| {
            let place_name = feature
                .properties
                .get("display_name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let center = feature
                .geometry
                .get("coordinates")
                .cloned()
                .unwrap_or(Value::Null);
            PlaceFeature {
                kind: "Feature",
                geometry: feature.geometry,
                properties: feature.properties,
                place_name,
                center,
            }
        })
        .collect();
    PlaceResults { features }
}

#[cfg(test)]
mod tests {
    use super::{NominatimResponse, search_url, to_place_results};
    use serde_json::json;

    #[test]
    fn search_url_encodes_query() {
        let url = search_url("Piazza Maggiore, Bologna").expect("valid url");
        assert_eq!(
            url.as_str(),
            "https://nominatim.openstreetmap.org/search?format=geojson&limit=5&q=Piazza+Maggiore%2C+Bologna"
        );
    }

    #[test]
    fn maps_display_name_and_point_center() {
        let response: NominatimResponse = serde_json::from_value(json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [11.3426, 44.4938]},
                "properties": {"display_name": "Piazza Maggiore, Bologna", "osm_id": 1}
            }]
        }))
        .expect("nominatim payload");

        let results = to_place_results(response);
        assert_eq!(results.features.len(), 1);
        let place = &results.features[0];
        assert_eq!(place.place_name, "Piazza Maggiore, Bologna");
        assert_eq!(place.center, json!([11.3426, 44.4938]));

        let value = serde_json::to_value(place).expect("serialize");
        assert_eq!(value["type"], "Feature");
        assert_eq!(value["properties"]["osm_id"], 1);
    }

    #[test]
    fn missing_fields_degrade_gracefully() {
        let response: NominatimResponse = serde_json::from_value(json!({
            "features": [{"geometry": {"type": "Polygon"}}]
        }))
        .expect("payload");
        let results = to_place_results(response);
        assert_eq!(results.features[0].place_name, "");
        assert_eq!(results.features[0].center, serde_json::Value::Null);
    }
}
