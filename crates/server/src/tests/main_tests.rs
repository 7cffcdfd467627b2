use super::*;
use crate::dto::{RefreshDto, RefreshStatus};
use axum::{
    Json, body,
    body::Body,
    http::{Request, StatusCode},
    response::IntoResponse,
};
use serde_json::{Value, json};
use tower::ServiceExt;

async fn fake_upstream() -> String {
    let app = Router::new()
        .route(
            "/companies/c01/buses",
            get(|| async {
                Json(json!([
                    { "Id": "bus-1", "Name": "Bus 1", "Bus_Status__c": "Available",
                      "Passengers__r": [{ "Id": "p1" }, { "Id": "p2" }] },
                    { "Id": "bus-2", "Name": "Bus 2", "Bus_Status__c": "Full" }
                ]))
            }),
        )
        .route(
            "/companies/broken/buses",
            get(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "message": "Apex CPU time limit exceeded" })),
                )
                    .into_response()
            }),
        )
        .route(
            "/companies/c01",
            get(|| async { Json(json!({ "Id": "c01", "Name": "Harbour Lines" })) }),
        );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

fn test_app(company_id: &str, base_url: &str) -> (Router, Arc<AppState>, Subscription) {
    let notifications = Arc::new(QueueNotifier::new(4));
    let controller = Arc::new(RefreshController::new(
        company_id,
        HttpUpstream::new(base_url),
        notifications.clone(),
    ));
    let (pushes, rx) = mpsc::channel(4);
    let subscription = controller.subscribe(rx);
    let state = Arc::new(AppState {
        controller,
        pushes,
        notifications,
    });
    (build_router(state.clone()), state, subscription)
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

async fn wait_until_loaded(state: &AppState) {
    while state.controller.snapshot().await.is_loading {
        tokio::task::yield_now().await;
    }
}

fn post(uri: &str, body: Body) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(body)
        .expect("request")
}

#[tokio::test]
async fn pushed_snapshot_is_served() {
    let (app, state, _subscription) = test_app("c01", "http://127.0.0.1:1");
    let payload = json!({ "data": [
        { "Id": "bus-1", "Passengers__r": [{ "Id": "p1" }] },
        { "Id": "bus-2" }
    ]});
    let response = app
        .clone()
        .oneshot(post("/push", Body::from(payload.to_string())))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    wait_until_loaded(&state).await;

    let response = app
        .oneshot(Request::get("/dashboard").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let dashboard = json_body(response).await;
    assert_eq!(dashboard["hasBuses"], true);
    assert_eq!(dashboard["buses"][0]["occupancyPercentage"], 5);
    assert_eq!(dashboard["buses"][1]["passengerListLabel"], "View Passengers (0)");
}

#[tokio::test]
async fn pushed_error_is_reported() {
    let (app, state, _subscription) = test_app("c01", "http://127.0.0.1:1");
    let payload = json!({ "error": { "code": "upstream", "message": "Insufficient access" } });
    app.clone()
        .oneshot(post("/push", Body::from(payload.to_string())))
        .await
        .expect("response");
    wait_until_loaded(&state).await;

    let snapshot = state.controller.snapshot().await;
    assert_eq!(
        snapshot.error.as_deref(),
        Some("Error loading buses: Insufficient access")
    );
    assert!(state.notifications.drain().is_empty());
}

#[tokio::test]
async fn toggle_routes() {
    let (app, state, _subscription) = test_app("c01", "http://127.0.0.1:1");
    state
        .controller
        .on_data_pushed(Push::Data(Some(vec![BusRecord::new("bus-1")])))
        .await;

    let response = app
        .clone()
        .oneshot(post("/buses/bus-1/toggle", Body::empty()))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let view = json_body(response).await;
    assert_eq!(view["showPassengers"], true);
    assert_eq!(view["passengerListIcon"], "utility:chevrondown");

    let response = app
        .oneshot(post("/buses/missing/toggle", Body::empty()))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn refresh_pulls_from_upstream() {
    let base_url = fake_upstream().await;
    let (app, state, _subscription) = test_app("c01", &base_url);
    state
        .controller
        .resolve_company(&HttpUpstream::new(base_url.as_str()))
        .await;

    let response = app
        .clone()
        .oneshot(post("/refresh", Body::empty()))
        .await
        .expect("response");
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let dto: RefreshDto = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(dto.status, RefreshStatus::Refreshed);
    assert_eq!(dto.count, Some(2));

    let snapshot = state.controller.snapshot().await;
    assert_eq!(snapshot.company_name.as_deref(), Some("Harbour Lines"));
    assert_eq!(snapshot.buses[0].occupancy_percentage, 10);

    let response = app
        .oneshot(Request::get("/notifications").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    let notifications = json_body(response).await;
    assert_eq!(notifications[0]["variant"], "success");
    assert_eq!(notifications[0]["message"], "Bus data refreshed successfully");
}

#[tokio::test]
async fn failed_refresh_reports_upstream_message() {
    let base_url = fake_upstream().await;
    let (app, state, _subscription) = test_app("broken", &base_url);

    let response = app
        .oneshot(post("/refresh", Body::empty()))
        .await
        .expect("response");
    let dto = json_body(response).await;
    assert_eq!(dto["status"], "failed");

    let snapshot = state.controller.snapshot().await;
    assert!(snapshot.buses.is_empty());
    assert!(!snapshot.is_loading);
    assert_eq!(
        snapshot.error.as_deref(),
        Some("Error refreshing data: Apex CPU time limit exceeded")
    );
    let sent = state.notifications.drain();
    assert_eq!(sent, vec![Notification::refresh_failed()]);
}

#[tokio::test]
async fn pushed_upstream_error_shape_is_reported() {
    let (app, state, _subscription) = test_app("c01", "http://127.0.0.1:1");
    state
        .controller
        .on_data_pushed(Push::Data(Some(vec![BusRecord::new("bus-1")])))
        .await;

    let payload = json!({ "error": { "body": { "message": "Insufficient access" } } });
    let response = app
        .oneshot(post("/push", Body::from(payload.to_string())))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    while state.controller.snapshot().await.error.is_none() {
        tokio::task::yield_now().await;
    }

    let snapshot = state.controller.snapshot().await;
    assert!(snapshot.buses.is_empty());
    assert!(!snapshot.is_loading);
    assert_eq!(
        snapshot.error.as_deref(),
        Some("Error loading buses: Insufficient access")
    );
}

struct HungUpstream;

impl BusSource for HungUpstream {
    async fn fetch(&self, _company_id: &str) -> Result<Vec<BusRecord>, ErrorInfo> {
        std::future::pending().await
    }
}

#[tokio::test(start_paused = true)]
async fn hung_initial_push_times_out() {
    let (pushes, mut rx) = mpsc::channel(1);
    initial_push(&HungUpstream, "c01", &pushes, Duration::from_secs(5)).await;

    let push = rx.recv().await.unwrap();
    assert_eq!(
        push,
        Push::Error(ErrorInfo::new(
            ErrorCode::Timeout,
            "Request timed out after 5s"
        ))
    );
}
