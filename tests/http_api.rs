use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use broadside::referee::{Referee, RefereeSettings};
use broadside::store::MemoryStore;
use broadside::AppState;

// "ann:secret"
const ANN_BASIC: &str = "Basic YW5uOnNlY3JldA==";
// "ann:wrong"
const ANN_WRONG: &str = "Basic YW5uOndyb25n";

async fn router() -> Router {
    let referee = Referee::start(MemoryStore::new(), RefereeSettings::default()).await.unwrap();
    broadside::app(AppState {
        jwt_secret: "test-secret".to_string(),
        token_duration: 600,
        referee: Arc::new(referee),
    })
}

async fn send(app: &Router, method: Method, uri: &str, auth: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        request = request.header(header::AUTHORIZATION, auth);
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

// Sign ann up, log in and return the bearer header
async fn login(app: &Router) -> String {
    let (status, player) = send(
        app,
        Method::POST,
        "/signup",
        None,
        Some(json!({"name": "ann", "password": "secret"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(player["nickname"], "ann");

    let (status, token) = send(app, Method::GET, "/login", Some(ANN_BASIC), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(token["token_type"], "bearer");
    format!("Bearer {}", token["access_token"].as_str().unwrap())
}

#[tokio::test]
async fn catalog_is_public() {
    let app = router().await;
    let (status, vessels) = send(&app, Method::GET, "/vessels", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let sizes: Vec<u64> = vessels.as_array().unwrap().iter().map(|v| v["size"].as_u64().unwrap()).collect();
    assert_eq!(sizes, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn wrong_password_is_refused() {
    let app = router().await;
    login(&app).await;
    let (status, body) = send(&app, Method::GET, "/login", Some(ANN_WRONG), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["kind"], "wrong_password");
}

#[tokio::test]
async fn games_need_a_valid_token() {
    let app = router().await;
    let (status, _) = send(&app, Method::GET, "/games", None, None).await;
    assert!(status.is_client_error());

    let (status, body) = send(&app, Method::GET, "/games", Some("Bearer nonsense"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["kind"], "invalid_token");
}

#[tokio::test]
async fn signed_in_player_plays_against_the_cpu() {
    let app = router().await;
    let bearer = login(&app).await;

    let (status, view) = send(&app, Method::POST, "/games", Some(&bearer), Some(json!({}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(view["game"]["phase"], "placement");
    assert_eq!(view["opponent"]["prepared"], true);
    let game = view["game"]["id"].as_u64().unwrap();
    let me = view["player"]["id"].as_u64().unwrap();

    let (status, games) = send(&app, Method::GET, "/games", Some(&bearer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(games.as_array().unwrap().len(), 1);

    let shots = format!("/games/{game}/players/{me}/shots");
    let (status, body) = send(&app, Method::POST, &shots, Some(&bearer), Some(json!({"row": 0, "col": 0}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "wrong_phase");

    let vessels = format!("/games/{game}/players/{me}/vessels");
    let (status, report) = send(
        &app,
        Method::POST,
        &vessels,
        Some(&bearer),
        Some(json!({"vessel": 2, "ri": 3, "ci": 4, "rf": 2, "cf": 4})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(report["placement"]["ri"], 2);
    assert_eq!(report["prepared"], false);

    let (status, body) = send(
        &app,
        Method::POST,
        &vessels,
        Some(&bearer),
        Some(json!({"vessel": 3, "ri": 2, "ci": 3, "rf": 2, "cf": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "vessel_overlap");

    let players = format!("/games/{game}/players");
    let (status, seated) = send(&app, Method::GET, &players, Some(&bearer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(seated[0]["role"], "owner");
    assert_eq!(seated[1]["role"], "cpu");

    let (status, _) = send(&app, Method::DELETE, &format!("/games/{game}"), Some(&bearer), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(&app, Method::GET, &format!("/games/{game}"), Some(&bearer), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "game_not_found");
}
