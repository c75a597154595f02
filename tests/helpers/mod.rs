#![allow(dead_code)] // Test helpers appear unused when compiled independently

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;

const PAGE_QUERY_KEY: &str = "skipToken";

/// Best-effort check for whether binding to loopback is permitted in the
/// current sandbox.
pub async fn can_bind_loopback() -> bool {
    match TcpListener::bind("127.0.0.1:0").await {
        Ok(listener) => {
            drop(listener);
            true
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => false,
        Err(_) => true, // treat other errors as non-fatal for skipping
    }
}

#[derive(Clone)]
struct ArmState {
    subscription: String,
    authorized: bool,
    page_size: usize,
    base_url: String,
    // name -> resource group JSON, insertion order preserved
    groups: Arc<Mutex<Vec<(String, Value)>>>,
    fail_creates: Arc<AtomicBool>,
}

/// In-process stand-in for the ARM REST surface the CLI talks to:
/// subscription lookup plus resource-group get/list/head/put with
/// nextLink pagination.
pub struct StubArm {
    pub base_url: String,
    shutdown_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
    groups: Arc<Mutex<Vec<(String, Value)>>>,
    fail_creates: Arc<AtomicBool>,
}

pub struct StubArmBuilder {
    subscription: String,
    authorized: bool,
    page_size: usize,
    seed: Vec<(String, String)>,
}

impl StubArmBuilder {
    pub fn new(subscription: &str) -> Self {
        Self {
            subscription: subscription.to_string(),
            authorized: true,
            page_size: 100,
            seed: Vec::new(),
        }
    }

    /// Make the subscription lookup fail with 403.
    pub fn unauthorized(mut self) -> Self {
        self.authorized = false;
        self
    }

    /// Resource groups per list page (forces nextLink pagination).
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Pre-create a resource group.
    pub fn seed_group(mut self, name: &str, location: &str) -> Self {
        self.seed.push((name.to_string(), location.to_string()));
        self
    }

    pub async fn spawn(self) -> StubArm {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind stub ARM listener");
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let groups: Arc<Mutex<Vec<(String, Value)>>> = Arc::new(Mutex::new(Vec::new()));
        {
            let mut locked = groups.try_lock().unwrap();
            for (name, location) in &self.seed {
                let body = group_json(&self.subscription, name, location, None);
                locked.push((name.clone(), body));
            }
        }

        let fail_creates = Arc::new(AtomicBool::new(false));
        let state = ArmState {
            subscription: self.subscription,
            authorized: self.authorized,
            page_size: self.page_size,
            base_url: base_url.clone(),
            groups: groups.clone(),
            fail_creates: fail_creates.clone(),
        };

        let app = Router::new()
            .route("/subscriptions/:sub", get(get_subscription))
            .route("/subscriptions/:sub/resourcegroups", get(list_groups))
            .route(
                "/subscriptions/:sub/resourcegroups/:name",
                get(get_group).put(put_group),
            )
            .with_state(state);

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            });
            if let Err(err) = server.await {
                eprintln!("stub ARM server error: {}", err);
            }
        });

        StubArm {
            base_url,
            shutdown_tx,
            handle,
            groups,
            fail_creates,
        }
    }
}

impl StubArm {
    /// Flip PUT handling between success and HTTP 500.
    pub fn set_fail_creates(&self, fail: bool) {
        self.fail_creates.store(fail, Ordering::SeqCst);
    }

    /// Names of the groups currently stored, in creation order.
    pub async fn group_names(&self) -> Vec<String> {
        self.groups
            .lock()
            .await
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(());
        let _ = self.handle.await;
    }
}

fn group_json(sub: &str, name: &str, location: &str, tags: Option<&Value>) -> Value {
    let mut body = json!({
        "id": format!("/subscriptions/{}/resourceGroups/{}", sub, name),
        "name": name,
        "location": location,
        "properties": { "provisioningState": "Succeeded" }
    });
    if let Some(tags) = tags {
        body["tags"] = tags.clone();
    }
    body
}

fn error_json(code: &str, message: &str) -> Value {
    json!({ "error": { "code": code, "message": message } })
}

async fn get_subscription(
    State(state): State<ArmState>,
    Path(sub): Path<String>,
) -> impl IntoResponse {
    if !state.authorized {
        return (
            StatusCode::FORBIDDEN,
            Json(error_json(
                "AuthorizationFailed",
                "The client does not have authorization to perform action on the subscription.",
            )),
        );
    }
    if sub != state.subscription {
        return (
            StatusCode::NOT_FOUND,
            Json(error_json(
                "SubscriptionNotFound",
                &format!("The subscription '{}' could not be found.", sub),
            )),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "id": format!("/subscriptions/{}", sub),
            "subscriptionId": sub,
            "displayName": "Stub Subscription",
            "state": "Enabled"
        })),
    )
}

async fn list_groups(
    State(state): State<ArmState>,
    Path(sub): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let offset: usize = params
        .get(PAGE_QUERY_KEY)
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);

    let groups = state.groups.lock().await;
    let page: Vec<Value> = groups
        .iter()
        .skip(offset)
        .take(state.page_size)
        .map(|(_, body)| body.clone())
        .collect();

    let next_offset = offset + page.len();
    let mut body = json!({ "value": page });
    if next_offset < groups.len() {
        body["nextLink"] = json!(format!(
            "{}/subscriptions/{}/resourcegroups?api-version=2021-04-01&{}={}",
            state.base_url, sub, PAGE_QUERY_KEY, next_offset
        ));
    }
    (StatusCode::OK, Json(body))
}

// Serves HEAD existence checks as well: axum answers HEAD on GET routes
// with the status alone.
async fn get_group(
    State(state): State<ArmState>,
    Path((_sub, name)): Path<(String, String)>,
) -> impl IntoResponse {
    let groups = state.groups.lock().await;
    match groups.iter().find(|(n, _)| *n == name) {
        Some((_, body)) => (StatusCode::OK, Json(body.clone())),
        None => (
            StatusCode::NOT_FOUND,
            Json(error_json(
                "ResourceGroupNotFound",
                &format!("Resource group '{}' could not be found.", name),
            )),
        ),
    }
}

async fn put_group(
    State(state): State<ArmState>,
    Path((sub, name)): Path<(String, String)>,
    Json(request): Json<Value>,
) -> impl IntoResponse {
    if state.fail_creates.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(error_json("InternalServerError", "simulated create failure")),
        );
    }

    let location = request
        .get("location")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown");
    let body = group_json(&sub, &name, location, request.get("tags"));

    let mut groups = state.groups.lock().await;
    if let Some(pos) = groups.iter().position(|(n, _)| *n == name) {
        // create-or-update: same name keeps the same id
        groups[pos].1 = body.clone();
        (StatusCode::OK, Json(body))
    } else {
        groups.push((name, body.clone()));
        (StatusCode::CREATED, Json(body))
    }
}
