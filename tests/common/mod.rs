use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Extension, Router,
};
use hybrid_market::{
    clients::HttpBackend,
    create_app,
    repositories::InMemorySessionRepository,
    services::{AdminService, CartService, CatalogService},
    AppServices, Metrics, RequestLimits,
};
use reqwest::Client;
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Password the mock backend accepts for admin calls
pub const ADMIN_PASSWORD: &str = "letmein";

/// In-memory state of the mock catalog and order backend
#[derive(Debug, Default)]
pub struct BackendState {
    pub butcher: Vec<Value>,
    pub grocery: Vec<Value>,
    pub orders: Vec<Value>,
    /// When set, order submission answers 503 with this detail
    pub order_failure: Option<String>,
    next_id: u32,
}

impl BackendState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }
}

type SharedBackend = Arc<Mutex<BackendState>>;

pub struct TestEnvironment {
    pub client: Client,
    pub base_url: String,
    pub backend_url: String,
    pub backend: SharedBackend,
}

fn seeded_state() -> BackendState {
    BackendState {
        butcher: vec![
            json!({"_id": "b1", "title": "Lamb chops", "description": "Fresh", "price_per_kg": 18.90, "available": true, "image": null}),
            json!({"_id": "b2", "title": "Beef mince", "description": "15% fat", "price_per_kg": 10.50, "available": true, "image": null}),
            json!({"_id": "b3", "title": "Veal shank", "description": "", "price_per_kg": 22.00, "available": false, "image": null}),
        ],
        grocery: vec![
            json!({"_id": "g1", "title": "Ayran", "description": null, "price": 1.20, "available": true, "image": "https://cdn.example.com/ayran.jpg"}),
            json!({"_id": "g2", "title": "Lavash", "description": "Flatbread", "price": 2.49, "available": true, "image": null}),
            json!({"_id": "g3", "title": "Pomegranate syrup", "price": 4.75, "available": false}),
        ],
        ..BackendState::default()
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"detail": "Invalid admin password"})),
    )
        .into_response()
}

// Mock backend handlers
async fn mock_list_butcher(Extension(state): Extension<SharedBackend>) -> Json<Value> {
    let state = state.lock().unwrap();
    Json(Value::Array(state.butcher.clone()))
}

async fn mock_list_grocery(Extension(state): Extension<SharedBackend>) -> Json<Value> {
    let state = state.lock().unwrap();
    Json(Value::Array(state.grocery.clone()))
}

async fn mock_submit_order(
    Extension(state): Extension<SharedBackend>,
    Json(mut order): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap();

    if let Some(detail) = state.order_failure.clone() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"detail": detail})),
        )
            .into_response();
    }

    let id = state.next_id("order");
    order["_id"] = json!(id);
    order["status"] = json!("Pending");
    state.orders.push(order);

    (StatusCode::CREATED, Json(json!({"_id": id}))).into_response()
}

async fn mock_list_orders(
    Extension(state): Extension<SharedBackend>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if params.get("auth_password").map(String::as_str) != Some(ADMIN_PASSWORD) {
        return unauthorized();
    }

    let state = state.lock().unwrap();
    Json(Value::Array(state.orders.clone())).into_response()
}

async fn mock_update_status(
    Extension(state): Extension<SharedBackend>,
    Path(order_id): Path<String>,
    Json(payload): Json<Value>,
) -> Response {
    if payload["password"] != ADMIN_PASSWORD {
        return unauthorized();
    }

    let mut state = state.lock().unwrap();
    match state.orders.iter_mut().find(|order| order["_id"] == order_id) {
        Some(order) => {
            order["status"] = payload["status"].clone();
            Json(json!({"ok": true})).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"detail": "Order not found"})),
        )
            .into_response(),
    }
}

async fn mock_create_butcher(
    Extension(state): Extension<SharedBackend>,
    Json(mut payload): Json<Value>,
) -> Response {
    if payload["password"] != ADMIN_PASSWORD {
        return unauthorized();
    }

    let mut state = state.lock().unwrap();
    let id = state.next_id("b");
    if let Some(fields) = payload.as_object_mut() {
        fields.remove("password");
        fields.insert("_id".to_string(), json!(id));
    }
    state.butcher.push(payload);

    (StatusCode::CREATED, Json(json!({"_id": id}))).into_response()
}

async fn mock_create_grocery(
    Extension(state): Extension<SharedBackend>,
    Json(mut payload): Json<Value>,
) -> Response {
    if payload["password"] != ADMIN_PASSWORD {
        return unauthorized();
    }

    let mut state = state.lock().unwrap();
    let id = state.next_id("g");
    if let Some(fields) = payload.as_object_mut() {
        fields.remove("password");
        fields.insert("_id".to_string(), json!(id));
    }
    state.grocery.push(payload);

    // Some backends answer item creation with an empty body
    StatusCode::CREATED.into_response()
}

fn create_mock_backend(state: SharedBackend) -> Router {
    Router::new()
        .route("/api/butcher/raw", get(mock_list_butcher))
        .route("/api/grocery/raw", get(mock_list_grocery))
        .route("/api/orders", post(mock_submit_order))
        .route("/api/admin/orders", get(mock_list_orders))
        .route("/api/admin/orders/:order_id/status", post(mock_update_status))
        .route("/api/admin/butcher", post(mock_create_butcher))
        .route("/api/admin/grocery", post(mock_create_grocery))
        .layer(Extension(state))
}

async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind listener");
    let addr = listener.local_addr().expect("Failed to get local address");

    tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .expect("Failed to serve app");
    });

    format!("http://{}", addr)
}

/// Wire the real service against `backend_url` the same way the binary does
fn build_storefront(backend_url: &str) -> Router {
    let metrics = Arc::new(Metrics::new().expect("Failed to create metrics"));
    let backend = Arc::new(
        HttpBackend::new(backend_url, Duration::from_secs(2))
            .expect("Failed to create backend client")
            .with_metrics(metrics.clone()),
    );

    let catalog_service = Arc::new(CatalogService::new(backend.clone()));
    let cart_service = Arc::new(CartService::new(
        Arc::new(InMemorySessionRepository::new()),
        catalog_service.clone(),
        backend.clone(),
        metrics.clone(),
    ));
    let admin_service = Arc::new(AdminService::new(backend.clone(), backend));

    create_app(
        AppServices {
            metrics,
            catalog_service,
            cart_service,
            admin_service,
        },
        RequestLimits {
            max_request_size: 1024 * 1024,
            request_timeout: Duration::from_secs(5),
        },
    )
}

impl TestEnvironment {
    pub async fn new() -> Self {
        let backend = Arc::new(Mutex::new(seeded_state()));
        let backend_url = serve(create_mock_backend(backend.clone())).await;
        let base_url = serve(build_storefront(&backend_url)).await;

        // Wait for both servers to start
        tokio::time::sleep(Duration::from_millis(100)).await;

        Self {
            client: Client::new(),
            base_url,
            backend_url,
            backend,
        }
    }

    /// Storefront pointed at an address where nothing listens
    pub async fn with_unreachable_backend() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind listener");
        let backend_url = format!(
            "http://{}",
            listener.local_addr().expect("Failed to get local address")
        );
        drop(listener);

        let base_url = serve(build_storefront(&backend_url)).await;
        tokio::time::sleep(Duration::from_millis(100)).await;

        Self {
            client: Client::new(),
            base_url,
            backend_url,
            backend: Arc::new(Mutex::new(BackendState::default())),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Start a session and return its id
    pub async fn create_session(&self) -> String {
        let response = self
            .client
            .post(self.url("/api/sessions"))
            .send()
            .await
            .expect("Failed to create session");

        assert_eq!(response.status().as_u16(), 201);
        let body: Value = response.json().await.expect("Failed to parse response");
        body["session_id"]
            .as_str()
            .expect("Missing session id")
            .to_string()
    }

    pub async fn add_line(&self, session_id: &str, counter: &str, body: Value) -> reqwest::Response {
        self.client
            .post(self.url(&format!("/api/sessions/{}/cart/{}", session_id, counter)))
            .json(&body)
            .send()
            .await
            .expect("Failed to send request")
    }

    pub async fn cart(&self, session_id: &str) -> Value {
        let response = self
            .client
            .get(self.url(&format!("/api/sessions/{}/cart", session_id)))
            .send()
            .await
            .expect("Failed to send request");

        assert_eq!(response.status().as_u16(), 200);
        response.json().await.expect("Failed to parse response")
    }

    pub fn fail_orders_with(&self, detail: &str) {
        self.backend.lock().unwrap().order_failure = Some(detail.to_string());
    }

    pub fn submitted_orders(&self) -> Vec<Value> {
        self.backend.lock().unwrap().orders.clone()
    }
}
