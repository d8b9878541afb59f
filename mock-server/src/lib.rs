use std::{collections::BTreeMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, Method, StatusCode},
    routing::{any, get},
    Json,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

pub use axum::Router;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
}

#[derive(Deserialize)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserPage {
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub users: Vec<User>,
}

#[derive(Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

/// What `/echo` saw of the incoming request.
#[derive(Debug, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

pub const API_KEY_HEADER: &str = "x-api-key";
pub const API_KEY: &str = "secret";

/// Users ordered by insertion, so paging is stable.
pub type Db = Arc<RwLock<BTreeMap<(u64, Uuid), User>>>;

#[derive(Clone, Default)]
pub struct AppState {
    db: Db,
    next_seq: Arc<RwLock<u64>>,
}

impl AppState {
    async fn insert(&self, name: String, email: String) -> User {
        let mut seq = self.next_seq.write().await;
        *seq += 1;
        let user = User {
            id: Uuid::new_v4(),
            name,
            email,
        };
        self.db.write().await.insert((*seq, user.id), user.clone());
        user
    }
}

/// Router with an empty user store.
pub fn app() -> Router {
    app_with_state(AppState::default())
}

/// Router with `users` inserted in order.
pub async fn seeded_app(users: &[(&str, &str)]) -> Router {
    let state = AppState::default();
    for (name, email) in users {
        state.insert(name.to_string(), email.to_string()).await;
    }
    app_with_state(state)
}

fn app_with_state(state: AppState) -> Router {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{id}",
            get(get_user)
                .put(update_user)
                .patch(update_user)
                .delete(delete_user),
        )
        .route("/echo", any(echo))
        .route("/status/{code}", any(status))
        .route("/malformed", get(malformed))
        .route("/secure", get(secure))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, app()).await
}

pub async fn serve(listener: TcpListener, app: Router) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "mock server listening");
    }
    axum::serve(listener, app).await
}

async fn list_users(State(state): State<AppState>, Query(q): Query<PageQuery>) -> Json<UserPage> {
    let page = q.page.unwrap_or(1).max(1);
    let per_page = q.per_page.unwrap_or(10).max(1);
    let db = state.db.read().await;
    let users = db
        .values()
        .skip(page.saturating_sub(1).saturating_mul(per_page))
        .take(per_page)
        .cloned()
        .collect();
    debug!(page, per_page, "list users");
    Json(UserPage {
        page,
        per_page,
        total: db.len(),
        users,
    })
}

async fn create_user(
    State(state): State<AppState>,
    Json(input): Json<CreateUser>,
) -> (StatusCode, Json<User>) {
    let user = state.insert(input.name, input.email).await;
    (StatusCode::CREATED, Json(user))
}

async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, StatusCode> {
    let db = state.db.read().await;
    db.values()
        .find(|u| u.id == id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateUser>,
) -> Result<Json<User>, StatusCode> {
    let mut db = state.db.write().await;
    let user = db
        .values_mut()
        .find(|u| u.id == id)
        .ok_or(StatusCode::NOT_FOUND)?;
    if let Some(name) = input.name {
        user.name = name;
    }
    if let Some(email) = input.email {
        user.email = email;
    }
    Ok(Json(user.clone()))
}

async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, StatusCode> {
    let mut db = state.db.write().await;
    let key = db
        .iter()
        .find(|(_, u)| u.id == id)
        .map(|(k, _)| *k)
        .ok_or(StatusCode::NOT_FOUND)?;
    db.remove(&key).map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn echo(
    method: Method,
    headers: HeaderMap,
    Query(query): Query<Vec<(String, String)>>,
    body: Bytes,
) -> Json<Echo> {
    let headers = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();
    let body = serde_json::from_slice(&body).ok();
    Json(Echo {
        method: method.to_string(),
        query,
        headers,
        body,
    })
}

async fn status(Path(code): Path<u16>) -> Result<(StatusCode, Json<serde_json::Value>), StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok((status, Json(serde_json::json!({ "status": code }))))
}

async fn malformed() -> &'static str {
    "this is not json"
}

async fn secure(headers: HeaderMap) -> Result<Json<serde_json::Value>, StatusCode> {
    match headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok()) {
        Some(API_KEY) => Ok(Json(serde_json::json!({ "authorized": true }))),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}
