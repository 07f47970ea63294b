//! API Integration Tests
//!
//! Drives the full router (middleware included) over the in-memory store and
//! stub providers.

use std::sync::atomic::Ordering;
use std::time::Duration;

use axum::http::StatusCode;
use serde_json::{json, Value};

mod common;

use common::{test_app, test_app_with_geocoder, StaticGeocoder, TestApp};

async fn create_tour(app: &TestApp, body: Value) -> Value {
    let response = app.request("POST", "/tours", Some(body)).await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    response.body
}

async fn get_tour(app: &TestApp, id: &str) -> Value {
    let response = app.request("GET", &format!("/tours/{}", id), None).await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    response.body
}

#[tokio::test]
async fn test_tour_and_stop_scenario() {
    let app = test_app();

    // 1. Create
    let tour = create_tour(&app, json!({ "title": "T", "activities": ["a"], "stops": [] })).await;
    let id = tour["id"].as_str().unwrap().to_string();
    assert_eq!(tour["version"], 0);
    assert_eq!(tour["title"], "T");
    assert_eq!(tour["activities"], json!(["a"]));
    assert_eq!(tour["stops"], json!([]));
    assert!(tour["launchDate"].is_string());

    // Round trip reproduces every field, including the defaulted launch date
    assert_eq!(get_tour(&app, &id).await, tour);

    // 2. Add a stop
    let response = app
        .request("POST", &format!("/tours/{}/stops", id), Some(json!({ "postalCode": "97214" })))
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    let stop = response.body;
    let stop_id = stop["id"].as_str().unwrap().to_string();
    assert_eq!(stop["location"]["region"], "OR");
    assert!(stop["weather"]["temperature"].is_number());
    assert!(stop["attendance"].is_null());

    let loaded = get_tour(&app, &id).await;
    assert_eq!(loaded["version"], 1);
    assert_eq!(loaded["stops"][0]["location"]["postalCode"], "97214");
    assert_eq!(loaded["stops"][0], stop);

    // 3. Update attendance
    let response = app
        .request(
            "PUT",
            &format!("/tours/{}/stops/{}", id, stop_id),
            Some(json!({ "attendance": 93 })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    assert_eq!(response.body["attendance"], 93);
    assert_eq!(get_tour(&app, &id).await["version"], 2);

    // 4. Remove the only stop
    let response = app
        .request("DELETE", &format!("/tours/{}/stops/{}", id, stop_id), None)
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let loaded = get_tour(&app, &id).await;
    assert_eq!(loaded["stops"], json!([]));
    assert_eq!(loaded["version"], 3);
}

#[tokio::test]
async fn test_list_returns_projection_in_creation_order() {
    let app = test_app();
    let first = create_tour(&app, json!({ "title": "Mongo Mystique", "activities": ["id clowning"] })).await;
    let second = create_tour(&app, json!({ "title": "Marvelous Mongoose" })).await;

    let response = app.request("GET", "/tours", None).await;
    assert_eq!(response.status, StatusCode::OK);

    let project = |t: &Value| json!({ "id": t["id"], "title": t["title"], "launchDate": t["launchDate"] });
    assert_eq!(response.body, json!([project(&first), project(&second)]));
}

#[tokio::test]
async fn test_create_keeps_supplied_launch_date() {
    let app = test_app();

    let tour = create_tour(
        &app,
        json!({ "title": "Dated", "launchDate": "2030-05-01T12:00:00Z" }),
    )
    .await;

    assert_eq!(tour["launchDate"], "2030-05-01T12:00:00Z");
}

#[tokio::test]
async fn test_create_validation_errors() {
    let app = test_app();

    let response = app.request("POST", "/tours", Some(json!({ "title": "  " }))).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error_code"], "validation_error");

    let response = app.request("POST", "/tours", Some(json!({ "activities": [] }))).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error_code"], "invalid_request");

    let response = app
        .request("POST", "/tours", Some(json!({ "title": "T", "activities": "not a list" })))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    // Nothing was stored
    let response = app.request("GET", "/tours", None).await;
    assert_eq!(response.body, json!([]));
}

#[tokio::test]
async fn test_replace_tour_keeps_stops_and_bumps_version() {
    let app = test_app();
    let tour = create_tour(&app, json!({ "title": "Marvelous Mongoose", "activities": ["data type taming"] })).await;
    let id = tour["id"].as_str().unwrap().to_string();
    app.request("POST", &format!("/tours/{}/stops", id), Some(json!({ "zip": "97214" })))
        .await;
    let before = get_tour(&app, &id).await;

    // Full document echoed back, as a client would send it
    let mut document = before.clone();
    document["activities"] = json!(["data type taming", "validation feats of strength"]);
    document["launchDate"] = json!("1999-01-01T00:00:00Z");
    document["stops"] = json!([]);

    let response = app.request("PUT", &format!("/tours/{}", id), Some(document)).await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    assert_eq!(response.headers["etag"], "\"2\"");

    let updated = response.body;
    assert_eq!(updated["version"], 2);
    assert_eq!(updated["activities"][2], "validation feats of strength");
    assert_eq!(updated["launchDate"], before["launchDate"]);
    assert_eq!(updated["stops"], before["stops"]);
    assert_eq!(get_tour(&app, &id).await, updated);
}

#[tokio::test]
async fn test_replace_with_stale_if_match_is_rejected() {
    let app = test_app();
    let tour = create_tour(&app, json!({ "title": "T" })).await;
    let uri = format!("/tours/{}", tour["id"].as_str().unwrap());

    let response = app
        .request_with_headers("PUT", &uri, Some(json!({ "title": "T2" })), &[("if-match", "\"0\"")])
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .request_with_headers("PUT", &uri, Some(json!({ "title": "T3" })), &[("if-match", "\"0\"")])
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["error_code"], "version_conflict");

    let loaded = app.request("GET", &uri, None).await.body;
    assert_eq!(loaded["title"], "T2");
    assert_eq!(loaded["version"], 1);

    let response = app
        .request_with_headers("PUT", &uri, Some(json!({ "title": "T3" })), &[("if-match", "latest")])
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_replace_if_match_wildcard_and_weak_tag() {
    let app = test_app();
    let tour = create_tour(&app, json!({ "title": "T" })).await;
    let uri = format!("/tours/{}", tour["id"].as_str().unwrap());

    let response = app
        .request_with_headers("PUT", &uri, Some(json!({ "title": "T2" })), &[("if-match", "*")])
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["version"], 1);

    let response = app
        .request_with_headers("PUT", &uri, Some(json!({ "title": "T3" })), &[("if-match", "W/\"1\"")])
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error_code"], "invalid_request");
    assert_eq!(app.request("GET", &uri, None).await.body["title"], "T2");

    // A wildcard still requires the tour to exist
    let missing = format!("/tours/{}", uuid::Uuid::new_v4());
    let response = app
        .request_with_headers("PUT", &missing, Some(json!({ "title": "T" })), &[("if-match", "*")])
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_tour_then_404() {
    let app = test_app();
    let tour = create_tour(&app, json!({ "title": "T" })).await;
    let uri = format!("/tours/{}", tour["id"].as_str().unwrap());

    let response = app.request("DELETE", &uri, None).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = app.request("GET", &uri, None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error_code"], "tour_not_found");

    let response = app.request("DELETE", &uri, None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app.request("PUT", &uri, Some(json!({ "title": "ghost" }))).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_tour_id_is_bad_request() {
    let app = test_app();

    let response = app.request("GET", "/tours/not-a-uuid", None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error_code"], "invalid_request");
}

#[tokio::test]
async fn test_weather_failure_leaves_tour_unchanged() {
    let app = test_app();
    let tour = create_tour(&app, json!({ "title": "T" })).await;
    let id = tour["id"].as_str().unwrap().to_string();
    app.weather.failing.store(true, Ordering::SeqCst);

    let response = app
        .request("POST", &format!("/tours/{}/stops", id), Some(json!({ "postalCode": "97214" })))
        .await;

    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert_eq!(response.body["error_code"], "weather_unavailable");
    assert_eq!(app.geocoder.calls.load(Ordering::SeqCst), 1);

    let loaded = get_tour(&app, &id).await;
    assert_eq!(loaded, tour);

    // Retrying once the provider recovers succeeds
    app.weather.failing.store(false, Ordering::SeqCst);
    let response = app
        .request("POST", &format!("/tours/{}/stops", id), Some(json!({ "postalCode": "97214" })))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(get_tour(&app, &id).await["version"], 1);
}

#[tokio::test]
async fn test_add_stop_enrichment_input_errors() {
    let app = test_app();
    let tour = create_tour(&app, json!({ "title": "T" })).await;
    let uri = format!("/tours/{}/stops", tour["id"].as_str().unwrap());

    let response = app.request("POST", &uri, Some(json!({ "postalCode": "97A14" }))).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error_code"], "invalid_identifier");
    assert_eq!(app.geocoder.calls.load(Ordering::SeqCst), 0);

    let response = app.request("POST", &uri, Some(json!({ "postalCode": "00000" }))).await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.body["error_code"], "location_not_found");
    assert_eq!(app.weather.calls.load(Ordering::SeqCst), 0);

    let response = app.request("POST", &uri, Some(json!({}))).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    assert_eq!(get_tour(&app, tour["id"].as_str().unwrap()).await, tour);
}

#[tokio::test]
async fn test_add_stop_to_unknown_tour_calls_no_provider() {
    let app = test_app();

    let response = app
        .request(
            "POST",
            "/tours/550e8400-e29b-41d4-a716-446655440000/stops",
            Some(json!({ "postalCode": "97214" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(app.geocoder.calls.load(Ordering::SeqCst), 0);
    assert_eq!(app.weather.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_update_stop_only_patches_attendance() {
    let app = test_app();
    let tour = create_tour(&app, json!({ "title": "T" })).await;
    let id = tour["id"].as_str().unwrap().to_string();
    let stop = app
        .request("POST", &format!("/tours/{}/stops", id), Some(json!({ "postalCode": "97214" })))
        .await
        .body;

    // Client echoes the stop back with tampered enrichment fields
    let mut body = stop.clone();
    body["attendance"] = json!(93);
    body["location"]["region"] = json!("XX");
    body["weather"]["temperature"] = json!(-40);

    let response = app
        .request(
            "PUT",
            &format!("/tours/{}/stops/{}", id, stop["id"].as_str().unwrap()),
            Some(body),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["attendance"], 93);
    assert_eq!(response.body["location"], stop["location"]);
    assert_eq!(response.body["weather"], stop["weather"]);
}

#[tokio::test]
async fn test_unknown_stop_is_not_found() {
    let app = test_app();
    let tour = create_tour(&app, json!({ "title": "T" })).await;
    let uri = format!(
        "/tours/{}/stops/550e8400-e29b-41d4-a716-446655440000",
        tour["id"].as_str().unwrap()
    );

    let response = app.request("PUT", &uri, Some(json!({ "attendance": 1 }))).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error_code"], "stop_not_found");

    let response = app.request("DELETE", &uri, None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    assert_eq!(get_tour(&app, tour["id"].as_str().unwrap()).await["version"], 0);
}

#[tokio::test]
async fn test_stops_keep_insertion_order() {
    let app = test_app();
    let tour = create_tour(&app, json!({ "title": "T" })).await;
    let id = tour["id"].as_str().unwrap().to_string();

    for code in ["97214", "98101", "97201"] {
        let response = app
            .request("POST", &format!("/tours/{}/stops", id), Some(json!({ "postalCode": code })))
            .await;
        assert_eq!(response.status, StatusCode::OK);
    }

    let loaded = get_tour(&app, &id).await;
    let codes: Vec<&str> = loaded["stops"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["location"]["postalCode"].as_str().unwrap())
        .collect();
    assert_eq!(codes, ["97214", "98101", "97201"]);
    assert_eq!(loaded["version"], 3);
}

#[tokio::test]
async fn test_abandoned_add_stop_still_completes() {
    let app = test_app_with_geocoder(StaticGeocoder::portland().with_delay(Duration::from_millis(200)));
    let tour = create_tour(&app, json!({ "title": "T" })).await;
    let id = tour["id"].as_str().unwrap().to_string();

    // The caller gives up while the geocoder is still resolving
    let abandoned = tokio::time::timeout(
        Duration::from_millis(50),
        app.request("POST", &format!("/tours/{}/stops", id), Some(json!({ "postalCode": "97214" }))),
    )
    .await;
    assert!(abandoned.is_err());

    let mut loaded = get_tour(&app, &id).await;
    for _ in 0..40 {
        if loaded["version"] == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
        loaded = get_tour(&app, &id).await;
    }

    assert_eq!(loaded["stops"].as_array().unwrap().len(), 1);
    assert_eq!(loaded["version"], 1);
    assert_eq!(app.weather.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_correlation_id_is_echoed() {
    let app = test_app();
    let correlation_id = "7f1f6a62-3c43-4c8f-9d3e-0a3c1f0c9b11";

    let response = app
        .request_with_headers("GET", "/tours", None, &[("x-correlation-id", correlation_id)])
        .await;
    assert_eq!(response.headers["x-correlation-id"], correlation_id);

    let response = app.request("GET", "/tours", None).await;
    assert!(response.headers.contains_key("x-correlation-id"));
}

#[tokio::test]
async fn test_health_check() {
    let app = test_app();

    let response = app.request("GET", "/health", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, Value::String("OK".to_string()));
}
