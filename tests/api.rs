use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use bookpilot::api::{router, AppState};
use bookpilot::booking::SiteProfile;
use bookpilot::core::{BrowserTrait, Config};
use bookpilot::testing::FakeBrowser;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

fn fast_config() -> Config {
    let mut config = Config::default();
    config.resolver.element_timeout_ms = 50;
    config.resolver.settle_ms = 10;
    config.resolver.poll_interval_ms = 5;
    config.resolver.results_wait_ms = 200;
    config.resolver.overlay_budget_ms = 20;
    config.session.navigation_timeout_ms = 100;
    config.session.navigation_retries = 1;
    config
}

fn app(fake: &FakeBrowser) -> Router {
    let prototype = fake.clone();
    let state = AppState::new(fast_config(), SiteProfile::default(), move || {
        prototype.clone()
    });
    router(state)
}

/// Fake page good for the whole flow: two rooms, every tag/click lands,
/// stage markers show up when polled.
fn stub_booking_site(fake: &FakeBrowser) {
    fake.respond("readyState", json!("complete"));
    fake.respond(").length", json!(2));
    fake.respond(
        "tryText",
        json!([
            {"name": "Camera Standard", "priceText": "€80,00", "features": [], "images": [], "options": []},
            {"name": "Camera Deluxe", "priceText": "€120,00", "features": [], "images": [], "options": []}
        ]),
    );
    fake.respond("setAttribute('data-bp-hit'", json!(true));
    fake.respond("el.click();", json!({"success": true}));
    fake.respond("dispatchEvent", json!({"success": true}));
    fake.respond("CustomerDataCollectionPage", json!(true));
    fake.respond("GuaranteeDataCollectionPage", json!(true));
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(body) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn start_search_body() -> Value {
    json!({
        "hotel": {"id": "h1", "name": "Hotel Mare", "baseUrl": "https://book.example/?hotel=h1"},
        "checkinDate": "2026-09-01",
        "checkoutDate": "2026-09-04",
        "adults": 2,
        "children": 0
    })
}

#[tokio::test]
async fn health_reports_active_sessions() {
    let fake = FakeBrowser::new();
    let app = app(&fake);
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["activeSessions"], 0);
}

#[tokio::test]
async fn start_search_rejects_bad_dates() {
    let fake = FakeBrowser::new();
    let app = app(&fake);
    let mut body = start_search_body();
    body["checkinDate"] = json!("not-a-date");
    let (status, body) = send(&app, Method::POST, "/api/booking/start-search", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let fake = FakeBrowser::new();
    let app = app(&fake);
    let (status, _) = send(
        &app,
        Method::GET,
        "/api/booking/available-rooms/nope",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/booking/select-room",
        Some(json!({"sessionId": "nope", "roomId": "room-1"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn full_booking_flow_in_test_mode() {
    let fake = FakeBrowser::new();
    stub_booking_site(&fake);
    let app = app(&fake);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/booking/start-search",
        Some(start_search_body()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "room-selection");
    assert_eq!(body["data"]["rooms"].as_array().unwrap().len(), 2);
    let session_id = body["sessionId"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/booking/available-rooms/{session_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rooms"][0]["id"], "room-1");
    assert_eq!(body["rooms"][1]["formattedPrice"], "€120,00");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/booking/select-room",
        Some(json!({"sessionId": session_id, "roomId": "room-1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["roomId"], "room-1");
    assert_eq!(body["data"]["onCustomerDataPage"], true);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/booking/fill-personal-data",
        Some(json!({
            "sessionId": session_id,
            "personalData": {
                "firstName": "Ada",
                "lastName": "Rossi",
                "email": "ada@example.com"
            }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["currentStep"], "payment");
    assert_eq!(body["nextAction"], "complete-booking");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/booking/complete-booking",
        Some(json!({"sessionId": session_id, "testMode": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["testMode"], true);
    assert_eq!(body["result"]["testMode"], true);
    assert_eq!(body["result"]["outcome"], "success");
    assert!(!fake.script_ran("book now"));

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/booking/session/{session_id}/status"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["currentStep"], "payment");
    assert_eq!(body["availableRooms"], 2);
    assert_eq!(body["selectedRoom"]["roomId"], "room-1");
    assert_eq!(body["searchParams"]["checkinDate"], "2026-09-01");

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/api/booking/session/{session_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(!fake.is_running());

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/api/booking/session/{session_id}/status"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn dead_browser_evicts_the_session() {
    let fake = FakeBrowser::new();
    stub_booking_site(&fake);
    let app = app(&fake);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/booking/start-search",
        Some(start_search_body()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let session_id = body["sessionId"].as_str().unwrap().to_string();

    // The browser process dies out from under the session.
    let mut killer = fake.clone();
    killer.close().await.unwrap();

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/booking/available-rooms/{session_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["success"], false);

    // Evicted, not lingering: the id stops answering entirely.
    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/api/booking/session/{session_id}/status"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn replayed_stage_call_conflicts() {
    let fake = FakeBrowser::new();
    stub_booking_site(&fake);
    let app = app(&fake);

    let (_, body) = send(
        &app,
        Method::POST,
        "/api/booking/start-search",
        Some(start_search_body()),
    )
    .await;
    let session_id = body["sessionId"].as_str().unwrap().to_string();

    let select = json!({"sessionId": session_id, "roomId": "room-1"});
    let (status, _) = send(&app, Method::POST, "/api/booking/select-room", Some(select.clone())).await;
    assert_eq!(status, StatusCode::OK);

    // Same call again: the session already moved on, nothing re-runs.
    let (status, body) = send(&app, Method::POST, "/api/booking/select-room", Some(select)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
}
