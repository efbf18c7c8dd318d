//! Router assembly and middleware stack

use crate::handlers::{analytics, gallery, health, library, map_filter, sample};
use crate::middleware::{
    rate_limit::{rate_limit, RateLimit},
    track_metrics,
};
use crate::AppState;
use axum::{
    extract::Request,
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use tower::{limit::GlobalConcurrencyLimitLayer, ServiceBuilder};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use std::time::Duration;
use tracing::Span;

fn request_span(request: &Request) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "http_request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    )
}

/// Slow requests are answered with 408
fn timeout_layer(timeout: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout)
}

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    let config = state.config.clone();

    let analytics_routes = Router::new()
        .route("/block/{block_id}", get(analytics::block_analytics))
        .route("/contractor/{contractor_id}/summary", get(analytics::contractor_summary))
        .route("/associate-stations-blocks", post(analytics::associate_stations_blocks));

    let gallery_routes = Router::new()
        .route("/media", get(gallery::media))
        .route("/{media_id}/download", get(gallery::download));

    let library_routes = Router::new()
        .route("/list", get(library::list))
        .route("/upload", post(library::upload))
        .route("/contractors", get(library::contractors))
        .route("/themes", get(library::themes));

    let map_filter_routes = Router::new()
        .route("/contractors", get(map_filter::contractors))
        .route("/contractor-areas", get(map_filter::contractor_areas))
        .route("/contractor-area-blocks", get(map_filter::contractor_area_blocks))
        .route("/cruises", get(map_filter::cruises))
        .route("/stations", get(map_filter::stations))
        .route("/samples", get(map_filter::samples))
        .route("/media", get(map_filter::media))
        .route("/map-data", get(map_filter::map_data))
        .route("/filter-options", get(map_filter::filter_options))
        .route("/contract-types", get(map_filter::contract_types))
        .route("/contract-statuses", get(map_filter::contract_statuses))
        .route("/sponsoring-states", get(map_filter::sponsoring_states))
        .route("/contractual-years", get(map_filter::contractual_years))
        .route("/area-geojson/{area_id}", get(map_filter::area_geojson))
        .route(
            "/contractor-areas-geojson/{contractor_id}",
            get(map_filter::contractor_areas_geojson),
        );

    let sample_routes = Router::new()
        .route("/list", get(sample::list))
        .route("/sampletypes", get(sample::sample_types))
        .route("/matrixtypes", get(sample::matrix_types))
        .route("/habitattypes", get(sample::habitat_types))
        .route("/analyses", get(sample::analyses))
        .route("/stations", get(sample::stations))
        .route("/cruises", get(sample::cruises))
        .route("/contractors", get(sample::contractors))
        .route("/qualifiers", get(sample::qualifiers))
        .route("/valid-values", get(sample::valid_values));

    let api_routes = Router::new()
        // Probes
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .nest("/Analytics", analytics_routes)
        .nest("/Gallery", gallery_routes)
        .nest("/Library", library_routes)
        .nest("/MapFilter", map_filter_routes)
        .nest("/Sample", sample_routes);

    let mut router = Router::new().nest("/api", api_routes);

    if config.rate_limit.enabled {
        router = router.layer(from_fn_with_state(RateLimit::new(&config.rate_limit), rate_limit));
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router
        .layer(
            ServiceBuilder::new()
                // Request ID first so the trace span can record it
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(request_span))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(from_fn(track_metrics))
                .layer(cors)
                .layer(CompressionLayer::new())
                .layer(timeout_layer(config.request_timeout()))
                .layer(GlobalConcurrencyLimitLayer::new(config.server.max_concurrent_requests)),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method};
    use seabed_common::config::AppConfig;
    use seabed_common::db::testing::seeded_pool;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn app() -> Router {
        let mut config = AppConfig::default();
        // Nothing listens here, so blob fetches fail fast
        config.storage.blob_base_url = "http://127.0.0.1:9".to_string();
        config.storage.download_timeout_secs = 2;

        create_router(AppState {
            config: Arc::new(config),
            db: seeded_pool().await,
            cache: None,
            http: reqwest::Client::new(),
        })
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = axum::http::Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
        send(app, Method::GET, uri, None).await
    }

    #[tokio::test]
    async fn test_slow_request_times_out() {
        let app: Router = Router::new()
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    "done"
                }),
            )
            .layer(timeout_layer(Duration::from_millis(20)));

        let (status, _) = get_json(&app, "/slow").await;
        assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    }

    #[tokio::test]
    async fn test_health() {
        let app = app().await;
        let (status, body) = get_json(&app, "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");

        let (status, body) = get_json(&app, "/api/ready").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["checks"]["database"]["status"], "up");
        assert_eq!(body["checks"]["cache"]["status"], "disabled");
    }

    #[tokio::test]
    async fn test_contractor_two_has_area_two_and_block_two() {
        let app = app().await;
        let (status, body) = get_json(&app, "/api/MapFilter/contractors?contractorId=2").await;
        assert_eq!(status, StatusCode::OK);

        let contractors = body.as_array().unwrap();
        assert_eq!(contractors.len(), 1);
        assert_eq!(
            contractors[0]["name"],
            "China Ocean Mineral Resources Research and Development Association"
        );
        assert_eq!(contractors[0]["areas"][0]["id"], 2);
        assert_eq!(contractors[0]["areas"][0]["blocks"][0]["id"], 2);
    }

    #[tokio::test]
    async fn test_block_six_analytics() {
        let app = app().await;
        let (status, body) = get_json(&app, "/api/Analytics/block/6").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["blockName"], "TAG Hydrothermal Field");
        assert!(body["counts"]["stations"].as_u64().unwrap() >= 1);

        let copper = body["resourceMetrics"]
            .as_array()
            .unwrap()
            .iter()
            .find(|m| m["name"] == "Copper")
            .unwrap();
        assert_eq!(copper["value"], 15.8);
    }

    #[tokio::test]
    async fn test_unknown_ids_are_404_with_error_body() {
        let app = app().await;

        let (status, body) = get_json(&app, "/api/Analytics/contractor/999/summary").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"]["message"].as_str().unwrap().contains("999"));

        let (status, _) = get_json(&app, "/api/Analytics/block/999").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = get_json(&app, "/api/MapFilter/area-geojson/999").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_malformed_query_is_400() {
        let app = app().await;
        let (status, body) = get_json(&app, "/api/MapFilter/stations?blockId=six").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_object());

        let (status, _) = get_json(&app, "/api/Analytics/block/six").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_contractor_summary() {
        let app = app().await;
        let (status, body) = get_json(&app, "/api/Analytics/contractor/6/summary").await;
        assert_eq!(status, StatusCode::OK);

        let by_area: f64 = body["areas"]
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["totalAreaKm2"].as_f64().unwrap())
            .sum();
        assert_eq!(body["totalAreaKm2"].as_f64().unwrap(), by_area);
        assert_eq!(body["counts"]["blocks"], 2);
    }

    #[tokio::test]
    async fn test_association_is_idempotent() {
        let app = app().await;
        let uri = "/api/Analytics/associate-stations-blocks";

        let (status, first) = send(&app, Method::POST, uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["assigned"], 4);
        let (_, after_first) = get_json(&app, "/api/MapFilter/stations").await;

        let (_, second) = send(&app, Method::POST, uri, None).await;
        assert_eq!(second["assigned"], 0);
        assert_eq!(second["unmatched"], first["unmatched"]);
        let (_, after_second) = get_json(&app, "/api/MapFilter/stations").await;

        assert_eq!(after_first, after_second);
    }

    #[tokio::test]
    async fn test_gallery_contractor_six() {
        let app = app().await;
        let (status, body) = get_json(&app, "/api/Gallery/media?contractorId=6").await;
        assert_eq!(status, StatusCode::OK);

        let items = body.as_array().unwrap();
        assert!(!items.is_empty());
        assert!(items.iter().all(|i| i["contractorId"] == 6));
    }

    #[tokio::test]
    async fn test_download_errors() {
        let app = app().await;

        let (status, body) = get_json(&app, "/api/Gallery/999/download").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].is_object());

        let (status, _) = get_json(&app, "/api/Gallery/1/download").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_library_upload() {
        let app = app().await;
        let upload = json!({
            "contractorId": 2,
            "theme": "Annual Report",
            "title": "COMRA annual report 2023",
            "year": 2024,
            "country": "China",
            "isConfidential": true,
            "fileName": "comra_annual_2023.pdf"
        });

        let (status, body) = send(&app, Method::POST, "/api/Library/upload", Some(upload.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(body["fileUrl"].is_null());

        let (_, listed) = get_json(&app, "/api/Library/list?contractorId=2").await;
        assert_eq!(listed.as_array().unwrap().len(), 3);

        let mut bad = upload;
        bad["fileName"] = json!("../etc/passwd");
        let (status, _) = send(&app, Method::POST, "/api/Library/upload", Some(bad)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_map_data_and_facets() {
        let app = app().await;

        let (status, body) = get_json(&app, "/api/MapFilter/map-data").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["summary"]["contractors"], 7);
        assert_eq!(body["summary"]["samples"], 16);

        let (status, body) =
            get_json(&app, "/api/MapFilter/filter-options?contractorId=6&activeFilter=contractorId").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["contractors"].as_array().unwrap().len(), 7);
        let cruises: Vec<i64> = body["cruises"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["id"].as_i64().unwrap())
            .collect();
        assert_eq!(cruises, vec![7, 8]);
    }

    #[tokio::test]
    async fn test_geojson_endpoints() {
        let app = app().await;

        let (status, feature) = get_json(&app, "/api/MapFilter/area-geojson/6").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(feature["type"], "Feature");
        assert_eq!(feature["properties"]["featureType"], "area");

        let (status, collection) = get_json(&app, "/api/MapFilter/contractor-areas-geojson/6").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(collection["type"], "FeatureCollection");
        assert_eq!(collection["features"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_sample_lookups() {
        let app = app().await;

        let (_, values) = get_json(&app, "/api/Sample/valid-values?field=media_type").await;
        assert_eq!(values.as_array().unwrap().len(), 2);

        let (_, qualifiers) = get_json(&app, "/api/Sample/qualifiers").await;
        assert_eq!(qualifiers.as_array().unwrap().len(), 4);

        let (status, listing) = get_json(&app, "/api/Sample/list?contractorId=6&sampleType=Sulphide").await;
        assert_eq!(status, StatusCode::OK);
        assert!(listing.as_array().unwrap().iter().all(|s| s["contractorId"] == 6));
    }
}
