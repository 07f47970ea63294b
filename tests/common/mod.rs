//! Common test utilities

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::Value;
use tower::util::ServiceExt;

use tour_service::api::{self, AppState};
use tour_service::enrichment::{Geocoder, WeatherProvider};
use tour_service::{EnrichmentError, InMemoryTourStore, Location, StopEnricher, Weather};

/// Geocoder answering from a fixed table
pub struct StaticGeocoder {
    locations: HashMap<String, Location>,
    delay: Duration,
    pub calls: AtomicUsize,
}

impl StaticGeocoder {
    pub fn portland() -> Self {
        let mut locations = HashMap::new();
        for (code, city, region) in [
            ("97214", "Portland", "OR"),
            ("97201", "Portland", "OR"),
            ("98101", "Seattle", "WA"),
        ] {
            locations.insert(
                code.to_string(),
                Location {
                    postal_code: code.to_string(),
                    city: Some(city.to_string()),
                    region: region.to_string(),
                    country: Some("US".to_string()),
                    latitude: 45.5152,
                    longitude: -122.6406,
                },
            );
        }
        Self {
            locations,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    /// Answer every lookup only after `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl Geocoder for StaticGeocoder {
    async fn geocode(&self, postal_code: &str) -> Result<Location, EnrichmentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.locations
            .get(postal_code)
            .cloned()
            .ok_or_else(|| EnrichmentError::LocationNotFound(postal_code.to_string()))
    }
}

/// Weather provider that can be switched into a failing state
pub struct SwitchableWeather {
    pub failing: AtomicBool,
    pub calls: AtomicUsize,
}

impl SwitchableWeather {
    pub fn new() -> Self {
        Self {
            failing: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl WeatherProvider for SwitchableWeather {
    async fn current_conditions(&self, _location: &Location) -> Result<Weather, EnrichmentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(EnrichmentError::WeatherUnavailable("provider down".to_string()));
        }
        Ok(Weather {
            temperature: 58.3,
            condition: Some("Light Rain".to_string()),
            wind_speed: Some(6.2),
            observed_at: Utc::now(),
        })
    }
}

/// Router over an in-memory store and stub providers
pub struct TestApp {
    pub router: Router,
    pub geocoder: Arc<StaticGeocoder>,
    pub weather: Arc<SwitchableWeather>,
}

pub fn test_app() -> TestApp {
    test_app_with_geocoder(StaticGeocoder::portland())
}

pub fn test_app_with_geocoder(geocoder: StaticGeocoder) -> TestApp {
    let geocoder = Arc::new(geocoder);
    let weather = Arc::new(SwitchableWeather::new());
    let enricher = StopEnricher::new(geocoder.clone(), weather.clone());
    let state = AppState::new(Arc::new(InMemoryTourStore::new()), enricher);

    TestApp {
        router: api::build_router(state),
        geocoder,
        weather,
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestApp {
    pub async fn request(&self, method: &str, uri: &str, body: Option<Value>) -> TestResponse {
        self.request_with_headers(method, uri, body, &[]).await
    }

    pub async fn request_with_headers(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&json).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

/// Connect to the test database and start from an empty `tours` table
pub async fn setup_test_db() -> sqlx::PgPool {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for tests");

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    sqlx::query(include_str!("../../migrations/0001_create_tours.sql"))
        .execute(&pool)
        .await
        .expect("Failed to apply migration");

    sqlx::query("TRUNCATE TABLE tours")
        .execute(&pool)
        .await
        .expect("Failed to clean up DB");

    pool
}
