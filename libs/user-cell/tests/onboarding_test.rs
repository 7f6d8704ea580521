use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shared_utils::test_utils::{JwtTestUtils, MockSupabaseResponses, TestConfig, TestUser};
use user_cell::router::user_routes;

fn app(config: &TestConfig) -> Router {
    user_routes(config.to_arc())
}

fn authed(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json");
    match body {
        Some(json) => builder.body(Body::from(json.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn first_sync_creates_unassigned_user() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri());
    let caller = TestUser::new("owner@example.com");
    let token = JwtTestUtils::create_test_token(&caller, &config.jwt_secret, Some(1));
    let user_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("auth_id", format!("eq.{}", caller.id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/users"))
        .and(body_partial_json(json!({"auth_id": caller.id, "role": "UNASSIGNED", "credits": 0})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::user_row(user_id, &caller.id, "UNASSIGNED", 0)
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = app(&config)
        .oneshot(authed("POST", "/me", &token, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["role"], "UNASSIGNED");
}

#[tokio::test]
async fn doctor_onboarding_sets_pending_verification() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri());
    let caller = TestUser::new("vet@example.com");
    let token = JwtTestUtils::create_test_token(&caller, &config.jwt_secret, Some(1));
    let user_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::user_row(user_id, &caller.id, "UNASSIGNED", 0)
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/users"))
        .and(query_param("role", "eq.UNASSIGNED"))
        .and(body_partial_json(json!({"role": "DOCTOR", "verification_status": "PENDING"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::doctor_row(user_id, &caller.id, "PENDING")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = json!({
        "role": "DOCTOR",
        "specialty": "General Practice",
        "experience": 8,
        "credential_url": "https://example.com/license.pdf",
        "description": "Small animal medicine"
    });

    let response = app(&config)
        .oneshot(authed("POST", "/onboarding", &token, Some(request)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["user"]["verification_status"], "PENDING");
    assert_eq!(body["redirect"], "/doctor/verification");
}

#[tokio::test]
async fn onboarding_twice_is_a_conflict() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri());
    let caller = TestUser::new("owner@example.com");
    let token = JwtTestUtils::create_test_token(&caller, &config.jwt_secret, Some(1));

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::user_row(Uuid::new_v4(), &caller.id, "PATIENT", 2)
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let response = app(&config)
        .oneshot(authed("POST", "/onboarding", &token, Some(json!({"role": "PATIENT"}))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn unknown_user_is_not_found() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri());
    let caller = TestUser::default();
    let token = JwtTestUtils::create_test_token(&caller, &config.jwt_secret, Some(1));

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let response = app(&config)
        .oneshot(authed("GET", "/me", &token, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn specialties_are_public() {
    let config = TestConfig::default();
    let response = app(&config)
        .oneshot(Request::builder().uri("/specialties").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["specialties"].as_array().unwrap().iter().any(|s| s == "Dermatology"));
}
