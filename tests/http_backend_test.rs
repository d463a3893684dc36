// Drives the HTTP repositories against a stub PixelHub API on an ephemeral port.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tempfile::TempDir;

use pixelhub::account::AccountSync;
use pixelhub::auth::{LoginFlow, RegistrationFlow, Session, SessionStore};
use pixelhub::donation::DonationSubmitter;
use pixelhub::error::{ClientError, INVALID_CREDENTIALS_MESSAGE};
use pixelhub::gateway::Gateway;
use pixelhub::repository::HttpBackend;
use pixelhub::routes::Route;
use pixelhub::threads::list::PLACEHOLDER_IMAGE;
use pixelhub::threads::{Category, ThreadDetail, ThreadDraft, ThreadList};

#[derive(Debug, Clone)]
struct Seen {
    method: &'static str,
    path: String,
    auth: Option<String>,
    body: Option<Value>,
}

#[derive(Clone, Default)]
struct Stub {
    seen: Arc<Mutex<Vec<Seen>>>,
}

impl Stub {
    fn record(&self, method: &'static str, path: String, headers: &HeaderMap, body: Option<Value>) {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.seen.lock().unwrap().push(Seen {
            method,
            path,
            auth,
            body,
        });
    }

    fn requests(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }

    fn last(&self, method: &str, path: &str) -> Seen {
        self.requests()
            .into_iter()
            .rev()
            .find(|s| s.method == method && s.path == path)
            .unwrap_or_else(|| panic!("no {} {} observed", method, path))
    }
}

fn thread_json(id: i64, category: &str, title: &str) -> Value {
    json!({
        "id": id,
        "authorId": 1,
        "authorName": "MaSamaniego",
        "category": category,
        "title": title,
        "description": "Discuss.",
        "imageUrl": null,
        "createdAt": "2024-05-01T12:00:00Z",
        "likeCount": 3,
        "commentCount": 1
    })
}

async fn login(State(stub): State<Stub>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    stub.record("POST", "/api/v1/auth/login".into(), &headers, Some(body.clone()));
    if body["username"] == "vega" && body["password"] == "1234" {
        Json(json!({"token": "t1", "userId": 7, "username": "vega", "roleId": 2})).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, "Bad credentials").into_response()
    }
}

async fn register(State(stub): State<Stub>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    stub.record("POST", "/api/v1/users".into(), &headers, Some(body.clone()));
    if body["username"] == "vega" {
        return (StatusCode::CONFLICT, "Username already exists").into_response();
    }
    Json(json!({
        "id": 42,
        "username": body["username"],
        "email": body["email"],
        "phone": body["phone"],
        "roleId": body["role"]["roleId"]
    }))
    .into_response()
}

async fn get_user(State(stub): State<Stub>, Path(id): Path<i64>, headers: HeaderMap) -> Response {
    stub.record("GET", format!("/api/v1/users/{}", id), &headers, None);
    if id != 7 {
        return StatusCode::NOT_FOUND.into_response();
    }
    Json(json!({"id": 7, "username": "vega", "email": "vega@pixelhub.cl", "phone": "987654321", "roleId": 2}))
        .into_response()
}

async fn put_user(
    State(stub): State<Stub>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    stub.record("PUT", format!("/api/v1/users/{}", id), &headers, Some(body.clone()));
    Json(json!({"id": id, "username": body["username"], "email": body["email"], "roleId": 2}))
        .into_response()
}

async fn list_threads(State(stub): State<Stub>, headers: HeaderMap) -> Response {
    stub.record("GET", "/api/publicaciones".into(), &headers, None);
    Json(json!([
        thread_json(1, "Shooter", "Best FPS games of 2024"),
        thread_json(2, "Indie", "Indie gems you should try"),
        thread_json(3, "Estrategia", "Not a tab")
    ]))
    .into_response()
}

async fn get_thread(State(stub): State<Stub>, Path(id): Path<i64>, headers: HeaderMap) -> Response {
    stub.record("GET", format!("/api/publicaciones/{}", id), &headers, None);
    match id {
        1 => Json(thread_json(1, "Shooter", "Best FPS games of 2024")).into_response(),
        _ => (StatusCode::NOT_FOUND, "").into_response(),
    }
}

async fn create_thread(State(stub): State<Stub>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    stub.record("POST", "/api/publicaciones/publicar".into(), &headers, Some(body.clone()));
    let mut created = body.clone();
    created["id"] = json!(500);
    created["createdAt"] = json!("2024-06-01T09:00:00Z");
    Json(created).into_response()
}

async fn list_comments(State(stub): State<Stub>, Path(id): Path<i64>, headers: HeaderMap) -> Response {
    stub.record("GET", format!("/api/comentarios/publicacion/{}", id), &headers, None);
    Json(json!([
        {"id": 101, "threadId": id, "authorName": "MaSamaniego", "content": "Doom Eternal", "createdAt": "2024-05-02T10:00:00Z"}
    ]))
    .into_response()
}

async fn create_comment(State(stub): State<Stub>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    stub.record("POST", "/api/comentarios/comentar".into(), &headers, Some(body.clone()));
    Json(json!({
        "id": 900,
        "threadId": body["threadId"],
        "authorId": body["userId"],
        "authorName": body["authorName"],
        "content": body["content"],
        "createdAt": "2024-06-01T09:30:00Z"
    }))
    .into_response()
}

async fn donate(State(stub): State<Stub>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    stub.record("POST", "/api/donaciones".into(), &headers, Some(body.clone()));
    let mut receipt = body.clone();
    receipt["id"] = json!(77);
    Json(receipt).into_response()
}

async fn spawn_stub() -> (Stub, HttpBackend) {
    let stub = Stub::default();
    let app = Router::new()
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/users", post(register))
        .route("/api/v1/users/{id}", get(get_user).put(put_user))
        .route("/api/publicaciones", get(list_threads))
        .route("/api/publicaciones/publicar", post(create_thread))
        .route("/api/publicaciones/{id}", get(get_thread))
        .route("/api/comentarios/publicacion/{id}", get(list_comments))
        .route("/api/comentarios/comentar", post(create_comment))
        .route("/api/donaciones", post(donate))
        .with_state(stub.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let gateway = Gateway::new(&format!("http://{}", addr), Duration::from_secs(5)).unwrap();
    (stub, HttpBackend::new(gateway))
}

fn session() -> Session {
    Session {
        token: Some("t1".into()),
        user_id: Some(7),
        display_name: Some("vega".into()),
        role_id: Some(2),
    }
}

#[tokio::test]
async fn login_stores_session_and_later_requests_carry_bearer() {
    let (stub, backend) = spawn_stub().await;
    let backend = Arc::new(backend);
    let tmp = TempDir::new().unwrap();
    let mut store = SessionStore::open(tmp.path().join("session.json")).unwrap();

    let mut flow = LoginFlow::new();
    flow.form.edit("username", |f| f.username = "vega".into());
    flow.form.edit("password", |f| f.password = "1234".into());
    let outcome = flow.submit(&mut store, backend.as_ref()).await.unwrap();

    assert_eq!(outcome.to, Route::Home);
    assert_eq!(outcome.value.token.as_deref(), Some("t1"));
    assert_eq!(outcome.value.user_id, Some(7));
    assert_eq!(outcome.value.display_name.as_deref(), Some("vega"));
    assert_eq!(stub.last("POST", "/api/v1/auth/login").auth, None);

    // A fresh process restores the same session from disk.
    let reopened = SessionStore::open(tmp.path().join("session.json")).unwrap();
    assert_eq!(reopened.current(), outcome.value);

    let mut list = ThreadList::new(backend.clone());
    list.fetch_all(&reopened.current()).await.unwrap();
    assert_eq!(
        stub.last("GET", "/api/publicaciones").auth.as_deref(),
        Some("Bearer t1")
    );
}

#[tokio::test]
async fn rejected_login_reads_as_generic_error() {
    let (_stub, backend) = spawn_stub().await;
    let mut store = SessionStore::in_memory();

    let mut flow = LoginFlow::new();
    flow.form.edit("username", |f| f.username = "vega".into());
    flow.form.edit("password", |f| f.password = "wrong".into());
    let err = flow.submit(&mut store, &backend).await.unwrap_err();

    assert_eq!(err.user_message(), INVALID_CREDENTIALS_MESSAGE);
    assert!(!store.current().is_authenticated());
}

#[tokio::test]
async fn unreachable_server_also_reads_as_generic_login_error() {
    let gateway = Gateway::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
    let backend = HttpBackend::new(gateway);
    let mut store = SessionStore::in_memory();

    let mut flow = LoginFlow::new();
    flow.form.edit("username", |f| f.username = "vega".into());
    flow.form.edit("password", |f| f.password = "1234".into());
    let err = flow.submit(&mut store, &backend).await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidCredentials));
}

#[tokio::test]
async fn registration_posts_active_status_and_default_role() {
    let (stub, backend) = spawn_stub().await;
    let mut flow = RegistrationFlow::new();
    flow.form.edit("username", |f| f.username = "nuevo".into());
    flow.form.edit("phone", |f| f.phone = "912345678".into());
    flow.form.edit("email", |f| f.email = "nuevo@pixelhub.cl".into());
    flow.form.edit("password", |f| f.password = "secret".into());

    let outcome = flow.submit(&backend).await.unwrap();
    assert_eq!(outcome.to, Route::Login);
    assert_eq!(outcome.value.id, 42);

    let body = stub.last("POST", "/api/v1/users").body.unwrap();
    assert_eq!(body["status"], "ACTIVO");
    assert_eq!(body["role"]["roleId"], 2);
    assert_eq!(body["phone"], "912345678");
}

#[tokio::test]
async fn registration_conflict_surfaces_backend_text() {
    let (_stub, backend) = spawn_stub().await;
    let mut flow = RegistrationFlow::new();
    flow.form.edit("username", |f| f.username = "vega".into());
    flow.form.edit("phone", |f| f.phone = "912345678".into());
    flow.form.edit("email", |f| f.email = "vega@pixelhub.cl".into());
    flow.form.edit("password", |f| f.password = "secret".into());

    let err = flow.submit(&backend).await.unwrap_err();
    assert_eq!(err.user_message(), "Username already exists");
}

#[tokio::test]
async fn thread_list_filters_tabs_and_prepends_new_thread() {
    let (stub, backend) = spawn_stub().await;
    let mut list = ThreadList::new(Arc::new(backend));
    list.fetch_all(&session()).await.unwrap();

    assert_eq!(list.threads().len(), 3);
    assert_eq!(list.visible().len(), 1);
    let all_tabs: usize = Category::ALL
        .iter()
        .map(|c| list.filter_by_category(*c).len())
        .sum();
    assert_eq!(all_tabs, 2);

    let draft = ThreadDraft {
        category: "Indie".into(),
        title: "Hades II impressions".into(),
        description: "Early access thoughts".into(),
        image_url: "".into(),
    };
    let created = list.submit(&session(), &draft).await.unwrap();
    assert_eq!(created.id, 500);
    assert_eq!(list.active_category(), Category::Indie);
    assert_eq!(list.visible()[0].id, 500);

    let seen = stub.last("POST", "/api/publicaciones/publicar");
    assert_eq!(seen.auth.as_deref(), Some("Bearer t1"));
    let body = seen.body.unwrap();
    assert_eq!(body["authorId"], 7);
    assert_eq!(body["authorName"], "vega");
    assert_eq!(body["imageUrl"], PLACEHOLDER_IMAGE);
    // Posting does not trigger a refetch.
    let fetches = stub
        .requests()
        .iter()
        .filter(|s| s.method == "GET" && s.path == "/api/publicaciones")
        .count();
    assert_eq!(fetches, 1);
}

#[tokio::test]
async fn missing_thread_is_not_found() {
    let (_stub, backend) = spawn_stub().await;
    let err = ThreadDetail::open(Arc::new(backend), &session(), 999, None)
        .await
        .err()
        .unwrap();
    assert!(matches!(err, ClientError::NotFound(_)));
}

#[tokio::test]
async fn carried_snapshot_skips_thread_fetch() {
    let (stub, backend) = spawn_stub().await;
    let backend = Arc::new(backend);
    let mut list = ThreadList::new(backend.clone());
    list.fetch_all(&session()).await.unwrap();
    let snapshot = list.threads()[0].clone();

    let detail = ThreadDetail::open(backend, &session(), snapshot.id, Some(snapshot.clone()))
        .await
        .unwrap();
    assert_eq!(detail.thread(), &snapshot);
    assert!(stub
        .requests()
        .iter()
        .all(|s| !s.path.starts_with("/api/publicaciones/1")));
}

#[tokio::test]
async fn comment_is_posted_and_appended() {
    let (stub, backend) = spawn_stub().await;
    let mut detail = ThreadDetail::open(Arc::new(backend), &session(), 1, None)
        .await
        .unwrap();
    detail.load_comments(&session()).await.unwrap();
    assert_eq!(detail.comment_count(), 1);

    detail.post_comment(&session(), "Titanfall 2 still holds up").await.unwrap();
    assert_eq!(detail.comment_count(), 2);
    assert_eq!(detail.comments()[1].content, "Titanfall 2 still holds up");

    let body = stub.last("POST", "/api/comentarios/comentar").body.unwrap();
    assert_eq!(body["threadId"], 1);
    assert_eq!(body["userId"], 7);
    assert_eq!(body["authorName"], "vega");
}

#[tokio::test]
async fn account_update_sends_only_username_and_email() {
    let (stub, backend) = spawn_stub().await;
    let mut account = AccountSync::new(Arc::new(backend));
    account.load(&session(), 7).await.unwrap();
    account.select_photo("image/jpeg", &[0xff, 0xd8]).unwrap();
    account.set_email("vega@retro.cl");

    account.save(&session()).await.unwrap();
    assert!(!account.is_dirty());

    let seen = stub.last("PUT", "/api/v1/users/7");
    assert_eq!(seen.auth.as_deref(), Some("Bearer t1"));
    let body = seen.body.unwrap();
    let mut keys: Vec<&String> = body.as_object().unwrap().keys().collect();
    keys.sort();
    assert_eq!(keys, ["email", "username"]);
    assert_eq!(body["email"], "vega@retro.cl");
}

#[tokio::test]
async fn zero_donation_sends_nothing_and_valid_one_posts() {
    let (stub, backend) = spawn_stub().await;
    let mut submitter = DonationSubmitter::new(Arc::new(backend));
    submitter.form.set_card_name("Juan Perez");
    submitter.form.set_card_number("4111111111111111");
    submitter.form.set_custom_amount("0");

    assert!(submitter.submit(&session()).await.is_err());
    assert!(stub.requests().is_empty());

    submitter.form.select_preset(10000).unwrap();
    let outcome = submitter.submit(&session()).await.unwrap();
    assert_eq!(outcome.to, Route::Home);
    assert_eq!(outcome.value.id, 77);

    let body = stub.last("POST", "/api/donaciones").body.unwrap();
    assert_eq!(body["amount"], 10000);
    assert_eq!(body["donorId"], 7);
    assert_eq!(body["paymentMethod"], "CARD");
}
