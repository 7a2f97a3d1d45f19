///! HTTP API over the ISS trajectory feed.
///!
///! Every handler fetches and parses the full upstream document on its own;
///! nothing is shared between requests except the HTTP clients.
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{NaiveDateTime, Utc};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::config::TrackerConfig;
use crate::error::TrackerError;
use crate::module::ephemeris::{
    FeedSummary, Geodetic, nearest_epoch_index, speed, state_vector_geodetic,
};
use crate::module::geocode::{NominatimGeocoder, ReverseGeocoder, describe_location};
use crate::module::oem::{FeedSource, HttpFeedSource, OemDocument, StateVector};

const DEFAULT_OFFSET: i64 = 1;

#[derive(Clone)]
pub struct AppState {
    pub feed: Arc<dyn FeedSource>,
    pub geocoder: Arc<dyn ReverseGeocoder>,
}

impl AppState {
    pub fn new(feed: Arc<dyn FeedSource>, geocoder: Arc<dyn ReverseGeocoder>) -> Self {
        Self { feed, geocoder }
    }

    /// HTTP-backed feed and geocoder sharing one client.
    pub fn from_config(config: &TrackerConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self::new(
            Arc::new(HttpFeedSource::new(client.clone(), &config.feed_url)),
            Arc::new(NominatimGeocoder::new(client, &config.geocoder_url)),
        ))
    }
}

/// The feed summary printed at startup, or `None` if the feed is unusable.
pub async fn startup_report(feed: &dyn FeedSource, now: NaiveDateTime) -> Option<String> {
    let doc = match feed.fetch().await {
        Ok(doc) => doc,
        Err(e) => {
            tracing::warn!("Initial feed fetch failed: {}", e);
            return None;
        }
    };

    match FeedSummary::from_document(&doc, now) {
        Ok(summary) => Some(summary.to_string()),
        Err(e) => {
            tracing::warn!("Failed to summarize feed: {}", e);
            None
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/epochs", get(epochs))
        .route("/epochs/{epoch}", get(epoch))
        .route("/epochs/{epoch}/speed", get(epoch_speed))
        .route("/epochs/{epoch}/location", get(epoch_location))
        .route("/now", get(now))
        .route("/comment", get(comment))
        .route("/header", get(header))
        .route("/metadata", get(metadata))
        .route("/summary", get(summary))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Parse an optional integer query parameter, clamping negatives to 0.
///
/// `Err` carries the plain-text message returned to the client.
fn parse_index_param(raw: Option<&String>, name: &str, default: i64) -> Result<usize, String> {
    let value = match raw {
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("Invalid {} parameter; must be an integer.", name))?,
        None => default,
    };
    Ok(value.max(0) as usize)
}

/// Slice of all epochs. `offset` defaults to 1, `limit` to the remainder.
async fn epochs(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, TrackerError> {
    let doc = state.feed.fetch().await?;
    let vectors = doc.state_vectors();

    let offset = match parse_index_param(params.get("offset"), "offset", DEFAULT_OFFSET) {
        Ok(offset) => offset.min(vectors.len()),
        Err(message) => return Ok(message.into_response()),
    };
    let remaining = (vectors.len() - offset) as i64;
    let limit = match parse_index_param(params.get("limit"), "limit", remaining) {
        Ok(limit) => limit,
        Err(message) => return Ok(message.into_response()),
    };

    let end = offset.saturating_add(limit).min(vectors.len());
    Ok(Json(&vectors[offset..end]).into_response())
}

/// Epoch index from the URL path; axum's own rejection text is not used.
fn parse_epoch_index(raw: &str) -> Result<usize, TrackerError> {
    raw.trim()
        .parse::<usize>()
        .map_err(|_| TrackerError::InvalidIndex(raw.to_string()))
}

async fn epoch(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Json<StateVector>, TrackerError> {
    let index = parse_epoch_index(&raw)?;
    let doc = state.feed.fetch().await?;
    Ok(Json(doc.state_vector(index)?.clone()))
}

async fn epoch_speed(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<String, TrackerError> {
    let index = parse_epoch_index(&raw)?;
    let doc = state.feed.fetch().await?;
    let speed = speed(doc.state_vector(index)?)?;
    Ok(format!("Speed at this instance: {}", speed))
}

#[derive(Debug, Serialize)]
struct Altitude {
    value: f64,
    units: &'static str,
}

#[derive(Debug, Serialize)]
struct Location {
    epoch: String,
    latitude: f64,
    longitude: f64,
    altitude: Altitude,
    geo: String,
}

async fn locate(state: &AppState, vector: &StateVector) -> Result<(Geodetic, String), TrackerError> {
    let position = state_vector_geodetic(vector)?;
    let geo = describe_location(state.geocoder.as_ref(), position.latitude, position.longitude).await;
    Ok((position, geo))
}

async fn epoch_location(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Json<Location>, TrackerError> {
    let index = parse_epoch_index(&raw)?;
    let doc = state.feed.fetch().await?;
    let vector = doc.state_vector(index)?;
    let (position, geo) = locate(&state, vector).await?;

    Ok(Json(Location {
        epoch: vector.epoch.clone(),
        latitude: position.latitude,
        longitude: position.longitude,
        altitude: Altitude {
            value: position.altitude,
            units: "km",
        },
        geo,
    }))
}

fn nearest_now(doc: &OemDocument) -> Result<&StateVector, TrackerError> {
    let vectors = doc.state_vectors();
    Ok(&vectors[nearest_epoch_index(vectors, Utc::now().naive_utc())?])
}

async fn now(State(state): State<AppState>) -> Result<String, TrackerError> {
    let doc = state.feed.fetch().await?;
    let vector = nearest_now(&doc)?;
    let [vx, vy, vz] = vector.velocity()?;
    let speed = speed(vector)?;
    let (position, geo) = locate(&state, vector).await?;

    Ok(format!(
        "Epoch: {}\n\
         Speed at this instance: {}\n\
         X Velocity: {}\nY Velocity: {}\nZ Velocity: {}\n\
         Latitude: {}\nLongitude: {}\nAltitude (km): {}\n\
         Geoposition: {}",
        vector.epoch, speed, vx, vy, vz, position.latitude, position.longitude, position.altitude, geo
    ))
}

async fn comment(State(state): State<AppState>) -> Result<Json<Vec<String>>, TrackerError> {
    let doc = state.feed.fetch().await?;
    Ok(Json(doc.comments().to_vec()))
}

async fn header(State(state): State<AppState>) -> Result<Response, TrackerError> {
    let doc = state.feed.fetch().await?;
    Ok(Json(doc.header()).into_response())
}

async fn metadata(State(state): State<AppState>) -> Result<Response, TrackerError> {
    let doc = state.feed.fetch().await?;
    Ok(Json(doc.metadata()).into_response())
}

async fn summary(State(state): State<AppState>) -> Result<String, TrackerError> {
    let doc = state.feed.fetch().await?;
    Ok(FeedSummary::from_document(&doc, Utc::now().naive_utc())?.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::module::geocode::NOT_FOUND;
    use crate::module::oem::parse_oem_xml;
    use crate::module::oem::parser::tests::SAMPLE_OEM;

    struct StaticFeed(Result<String, u16>);

    #[async_trait]
    impl FeedSource for StaticFeed {
        async fn fetch(&self) -> Result<OemDocument, TrackerError> {
            match &self.0 {
                Ok(xml) => parse_oem_xml(xml),
                Err(code) => Err(TrackerError::UpstreamStatus(*code)),
            }
        }
    }

    struct StaticGeocoder(Option<&'static str>);

    #[async_trait]
    impl ReverseGeocoder for StaticGeocoder {
        async fn reverse(&self, _: f64, _: f64) -> Result<Option<String>, TrackerError> {
            Ok(self.0.map(str::to_string))
        }
    }

    fn app(feed: StaticFeed, geo: Option<&'static str>) -> Router {
        router(AppState::new(Arc::new(feed), Arc::new(StaticGeocoder(geo))))
    }

    fn sample_app() -> Router {
        app(StaticFeed(Ok(SAMPLE_OEM.to_string())), Some("Somewhere, Earth"))
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let (status, body) = get(app, uri).await;
        (status, serde_json::from_str(&body).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        assert_eq!(get(sample_app(), "/health").await, (StatusCode::OK, "OK".to_string()));
    }

    #[tokio::test]
    async fn test_epochs_default_offset_skips_first() {
        let (status, json) = get_json(sample_app(), "/epochs").await;
        assert_eq!(status, StatusCode::OK);
        let epochs = json.as_array().unwrap();
        assert_eq!(epochs.len(), 2);
        assert_eq!(epochs[0]["EPOCH"], "2024-047T12:04:00.000Z");
    }

    #[tokio::test]
    async fn test_epochs_offset_and_limit() {
        let (_, json) = get_json(sample_app(), "/epochs?offset=0&limit=2").await;
        let epochs = json.as_array().unwrap();
        assert_eq!(epochs.len(), 2);
        assert_eq!(epochs[0]["EPOCH"], "2024-047T12:00:00.000Z");
        assert_eq!(epochs[0]["X"], serde_json::json!({"@units": "km", "#text": "3"}));

        let (_, json) = get_json(sample_app(), "/epochs?offset=2&limit=50").await;
        assert_eq!(json.as_array().unwrap().len(), 1);

        let (_, json) = get_json(sample_app(), "/epochs?offset=99").await;
        assert!(json.as_array().unwrap().is_empty());

        let (_, json) = get_json(sample_app(), "/epochs?offset=-5&limit=1").await;
        assert_eq!(json[0]["EPOCH"], "2024-047T12:00:00.000Z");
    }

    #[tokio::test]
    async fn test_epochs_invalid_params() {
        assert_eq!(
            get(sample_app(), "/epochs?offset=abc").await,
            (StatusCode::OK, "Invalid offset parameter; must be an integer.".to_string())
        );
        assert_eq!(
            get(sample_app(), "/epochs?limit=1.5").await,
            (StatusCode::OK, "Invalid limit parameter; must be an integer.".to_string())
        );
    }

    #[tokio::test]
    async fn test_single_epoch() {
        let (status, json) = get_json(sample_app(), "/epochs/1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["EPOCH"], "2024-047T12:04:00.000Z");
        assert_eq!(json["Z_DOT"]["#text"], "3.0441");
    }

    #[tokio::test]
    async fn test_single_epoch_out_of_range() {
        let (status, body) = get(sample_app(), "/epochs/3").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "epoch index 3 out of range (feed has 3 epochs)");
    }

    #[tokio::test]
    async fn test_invalid_epoch_index() {
        for uri in ["/epochs/-1", "/epochs/abc/speed", "/epochs/1.5/location"] {
            let (status, body) = get(sample_app(), uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert!(body.starts_with("invalid epoch index '"), "{}", body);
            assert!(body.ends_with("'; must be a non-negative integer"), "{}", body);
        }
        let (_, body) = get(sample_app(), "/epochs/-1").await;
        assert_eq!(body, "invalid epoch index '-1'; must be a non-negative integer");
    }

    #[tokio::test]
    async fn test_epoch_speed() {
        assert_eq!(
            get(sample_app(), "/epochs/0/speed").await,
            (StatusCode::OK, "Speed at this instance: 3".to_string())
        );
        let (status, _) = get(sample_app(), "/epochs/2/speed").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_epoch_location() {
        let (status, json) = get_json(sample_app(), "/epochs/0/location").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["epoch"], "2024-047T12:00:00.000Z");
        assert_eq!(json["latitude"], 0.0);
        assert_eq!(json["altitude"]["units"], "km");
        let altitude = json["altitude"]["value"].as_f64().unwrap();
        assert!((altitude - (5.0 - 6371.0088)).abs() < 1e-9);
        assert_eq!(json["geo"], "Somewhere, Earth");
    }

    #[tokio::test]
    async fn test_epoch_location_over_ocean() {
        let app = app(StaticFeed(Ok(SAMPLE_OEM.to_string())), None);
        let (_, json) = get_json(app, "/epochs/1/location").await;
        assert_eq!(json["geo"], NOT_FOUND);
    }

    #[tokio::test]
    async fn test_now_picks_latest_for_stale_feed() {
        // The sample feed is in the past, so the last epoch is nearest to now
        let numeric = SAMPLE_OEM.replace(">N/A<", ">0<");
        let (status, body) = get(app(StaticFeed(Ok(numeric)), None), "/now").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.starts_with("Epoch: 2024-047T12:08:00.000Z\n"));
        assert!(body.contains("Speed at this instance: 0\n"));
        assert!(body.ends_with(&format!("Geoposition: {}", NOT_FOUND)));
    }

    #[tokio::test]
    async fn test_now_non_numeric_velocity() {
        // Nearest epoch has X_DOT = "N/A"
        let (status, body) = get(sample_app(), "/now").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body, "non-numeric value 'N/A'");
    }

    #[tokio::test]
    async fn test_envelope_routes() {
        let (_, json) = get_json(sample_app(), "/comment").await;
        assert_eq!(json.as_array().unwrap().len(), 2);

        let (_, json) = get_json(sample_app(), "/header").await;
        assert_eq!(json["ORIGINATOR"], "JSC");

        let (_, json) = get_json(sample_app(), "/metadata").await;
        assert_eq!(json["OBJECT_NAME"], "ISS");
        assert_eq!(json["CENTER_NAME"], "EARTH");
    }

    #[tokio::test]
    async fn test_summary_route() {
        let (status, body) = get(sample_app(), "/summary").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.starts_with("This data covers a span of 0 days, 00:08:00"));
    }

    #[tokio::test]
    async fn test_upstream_failure_is_bad_gateway() {
        let app = app(StaticFeed(Err(503)), None);
        let (status, body) = get(app, "/epochs/0").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body, "upstream returned HTTP 503");
    }

    #[tokio::test]
    async fn test_startup_report() {
        let feed = StaticFeed(Ok(SAMPLE_OEM.to_string()));
        let now = crate::module::oem::parse_epoch("2024-047T12:05:00.000Z").unwrap();
        let report = startup_report(&feed, now).await.unwrap();
        assert!(report.starts_with("This data covers a span of 0 days, 00:08:00\n"));
        assert!(report.contains("\tTime: 2024-047T12:04:00.000Z\n"));

        assert!(startup_report(&StaticFeed(Err(500)), now).await.is_none());
    }

    #[test]
    fn test_parse_index_param() {
        assert_eq!(parse_index_param(None, "offset", 1), Ok(1));
        assert_eq!(parse_index_param(Some(&"7".to_string()), "offset", 1), Ok(7));
        assert_eq!(parse_index_param(Some(&"-3".to_string()), "offset", 1), Ok(0));
        assert_eq!(
            parse_index_param(Some(&"x".to_string()), "limit", 1),
            Err("Invalid limit parameter; must be an integer.".to_string())
        );
    }
}
