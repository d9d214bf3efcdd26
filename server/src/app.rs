use std::path::Path;

use axum::{
    Router,
    extract::Request,
    http::{HeaderValue, header},
    middleware::{self, Next},
    response::Response,
};
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;

use uhi_shared::registry::LAYERS;

pub(crate) fn build_app(site_dir: &Path) -> Router {
    Router::new()
        .fallback_service(
            ServeDir::new(site_dir)
                .precompressed_br()
                .precompressed_gzip(),
        )
        .layer(middleware::from_fn(set_static_headers))
        .layer(CompressionLayer::new())
}

/// Registry layers whose TopoJSON resource is missing from `site_dir`.
pub(crate) fn missing_layer_resources(site_dir: &Path) -> Vec<String> {
    LAYERS
        .iter()
        .map(|entry| entry.resource_path())
        .filter(|path| !site_dir.join(path).is_file())
        .collect()
}

async fn set_static_headers(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    let mut response = next.run(request).await;

    if !response.status().is_success() {
        return response;
    }
    if is_topojson(&path) {
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
    }
    if let Some(cache_control) = cache_control_for_path(&path) {
        response.headers_mut().insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static(cache_control),
        );
    }

    response
}

fn is_topojson(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("topojson"))
}

fn cache_control_for_path(path: &str) -> Option<&'static str> {
    if is_hashed_bundle_asset(path) {
        return Some("public, max-age=31536000, immutable");
    }

    if is_topojson(path) {
        return Some("public, max-age=86400");
    }

    None
}

/// Trunk names bundles with a content hash, e.g. `uhi-client-<hex>_bg.wasm`
/// or `style-<hex>.css`.
fn is_hashed_bundle_asset(path: &str) -> bool {
    let path = Path::new(path);
    let is_bundle = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| matches!(ext, "wasm" | "js" | "css"));
    if !is_bundle {
        return false;
    }

    path.file_stem()
        .and_then(|stem| stem.to_str())
        .is_some_and(|stem| stem.split(['-', '_']).any(is_content_hash))
}

fn is_content_hash(segment: &str) -> bool {
    segment.len() >= 8 && segment.bytes().all(|b| b.is_ascii_hexdigit())
}
