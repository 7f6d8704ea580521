use assert_matches::assert_matches;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{NaiveTime, TimeZone, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use doctor_cell::router::doctor_routes;
use doctor_cell::{AvailabilityError, AvailabilityService};
use shared_utils::test_utils::{JwtTestUtils, MockSupabaseResponses, TestConfig, TestUser};

fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

#[tokio::test]
async fn slots_exclude_booked_and_cover_requested_days() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
    let doctor_id = Uuid::new_v4();
    let now = Utc.with_ymd_and_hms(2030, 1, 7, 0, 0, 0).unwrap();

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("id", format!("eq.{}", doctor_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::doctor_row(doctor_id, "user_vet", "VERIFIED")
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/availabilities"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::availability_row(doctor_id, hm(9, 0), hm(17, 0))
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("status", "eq.SCHEDULED"))
        .and(query_param("end_time", "gt.2030-01-07T00:00:00Z"))
        .and(query_param("start_time", "lt.2030-01-09T00:00:00Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::appointment_row(
                Uuid::new_v4(),
                Uuid::new_v4(),
                doctor_id,
                Utc.with_ymd_and_hms(2030, 1, 7, 10, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2030, 1, 7, 10, 30, 0).unwrap(),
                "SCHEDULED",
            )
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let days = AvailabilityService::new(&config)
        .get_available_slots(doctor_id, Some(2), now)
        .await
        .unwrap();

    assert_eq!(days.len(), 2);
    assert_eq!(days[0].slots.len(), 15);
    assert_eq!(days[1].slots.len(), 16);
    assert!(days[0]
        .slots
        .iter()
        .all(|s| s.start_time != Utc.with_ymd_and_hms(2030, 1, 7, 10, 0, 0).unwrap()));
}

#[tokio::test]
async fn slots_already_started_are_hidden() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
    let doctor_id = Uuid::new_v4();
    let now = Utc.with_ymd_and_hms(2030, 1, 7, 16, 10, 0).unwrap();

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::doctor_row(doctor_id, "user_vet", "VERIFIED")
        ])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/availabilities"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::availability_row(doctor_id, hm(9, 0), hm(17, 0))
        ])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let days = AvailabilityService::new(&config)
        .get_available_slots(doctor_id, Some(1), now)
        .await
        .unwrap();

    // Only 16:30 - 17:00 is still ahead.
    assert_eq!(days[0].slots.len(), 1);
}

#[tokio::test]
async fn slot_starting_right_now_is_not_offered() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
    let doctor_id = Uuid::new_v4();
    let now = Utc.with_ymd_and_hms(2030, 1, 7, 16, 0, 0).unwrap();

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::doctor_row(doctor_id, "user_vet", "VERIFIED")
        ])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/availabilities"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::availability_row(doctor_id, hm(9, 0), hm(17, 0))
        ])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let days = AvailabilityService::new(&config)
        .get_available_slots(doctor_id, Some(1), now)
        .await
        .unwrap();

    // Booking requires a start strictly in the future, so 16:00 is gone.
    let starts: Vec<_> = days[0].slots.iter().map(|s| s.start_time).collect();
    assert_eq!(starts, vec![Utc.with_ymd_and_hms(2030, 1, 7, 16, 30, 0).unwrap()]);
}

#[tokio::test]
async fn unverified_doctor_has_no_public_calendar() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
    let doctor_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::doctor_row(doctor_id, "user_vet", "PENDING")
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/availabilities"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let result = AvailabilityService::new(&config)
        .get_available_slots(doctor_id, None, Utc::now())
        .await;
    assert_matches!(result, Err(AvailabilityError::DoctorNotFound));
}

#[tokio::test]
async fn verified_doctor_replaces_window() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri());
    let caller = TestUser::new("vet@example.com");
    let token = JwtTestUtils::create_test_token(&caller, &config.jwt_secret, Some(1));
    let doctor_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("auth_id", format!("eq.{}", caller.id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::doctor_row(doctor_id, &caller.id, "VERIFIED")
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/availabilities"))
        .and(query_param("on_conflict", "doctor_id"))
        .and(body_partial_json(json!({"start_time": "08:00:00", "end_time": "12:00:00"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::availability_row(doctor_id, hm(8, 0), hm(12, 0))
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = doctor_routes(config.to_arc())
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/me/availability")
                .header("authorization", format!("Bearer {}", token))
                .header("content-type", "application/json")
                .body(Body::from(json!({"start_time": "08:00:00", "end_time": "12:00:00"}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["availability"]["start_time"], "08:00:00");
}

#[tokio::test]
async fn overnight_window_is_rejected_before_any_write() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri());
    let caller = TestUser::new("vet@example.com");
    let token = JwtTestUtils::create_test_token(&caller, &config.jwt_secret, Some(1));

    Mock::given(method("POST"))
        .and(path("/rest/v1/availabilities"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&mock_server)
        .await;

    let response = doctor_routes(config.to_arc())
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/me/availability")
                .header("authorization", format!("Bearer {}", token))
                .header("content-type", "application/json")
                .body(Body::from(json!({"start_time": "22:00:00", "end_time": "02:00:00"}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn directory_filters_by_specialty() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("role", "eq.DOCTOR"))
        .and(query_param("verification_status", "eq.VERIFIED"))
        .and(query_param("specialty", "eq.General Practice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::doctor_row(Uuid::new_v4(), "user_vet", "VERIFIED")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = doctor_routes(config.to_arc())
        .oneshot(
            Request::builder()
                .uri("/?specialty=General%20Practice")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["total"], 1);
    // The public view never exposes credentials or balances.
    assert!(body["doctors"][0].get("credits").is_none());
    assert!(body["doctors"][0].get("credential_url").is_none());
}
