use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, seeded_app, Echo, User, UserPage, API_KEY, API_KEY_HEADER};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

// --- list ---

#[tokio::test]
async fn list_users_empty() {
    let resp = app().oneshot(get("/users")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let page: UserPage = body_json(resp).await;
    assert_eq!(page.page, 1);
    assert_eq!(page.total, 0);
    assert!(page.users.is_empty());
}

#[tokio::test]
async fn list_users_pages_in_insertion_order() {
    let app = seeded_app(&[
        ("Ada", "ada@example.com"),
        ("Grace", "grace@example.com"),
        ("Linus", "linus@example.com"),
    ])
    .await;

    let resp = app.oneshot(get("/users?page=2&per_page=2")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let page: UserPage = body_json(resp).await;
    assert_eq!(page.total, 3);
    assert_eq!(page.users.len(), 1);
    assert_eq!(page.users[0].name, "Linus");
}

#[tokio::test]
async fn list_users_page_past_end_is_empty() {
    let app = seeded_app(&[("Ada", "ada@example.com")]).await;

    let uri = format!("/users?page={}&per_page=2", usize::MAX);
    let resp = app.oneshot(get(&uri)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let page: UserPage = body_json(resp).await;
    assert_eq!(page.page, usize::MAX);
    assert_eq!(page.total, 1);
    assert!(page.users.is_empty());
}

// --- create ---

#[tokio::test]
async fn create_user_returns_201() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/users",
            r#"{"name":"Ada","email":"ada@example.com"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let user: User = body_json(resp).await;
    assert_eq!(user.name, "Ada");
    assert_eq!(user.email, "ada@example.com");
}

#[tokio::test]
async fn create_user_malformed_json_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/users", r#"{"name":"Ada"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// --- get / update / delete ---

#[tokio::test]
async fn get_user_not_found() {
    let resp = app()
        .oneshot(get("/users/00000000-0000-0000-0000-000000000000"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_user_bad_uuid_returns_400() {
    let resp = app().oneshot(get("/users/not-a-uuid")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn patch_user_not_found() {
    let resp = app()
        .oneshot(json_request(
            "PATCH",
            "/users/00000000-0000-0000-0000-000000000000",
            r#"{"name":"x"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_user_not_found() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/users/00000000-0000-0000-0000-000000000000")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- echo ---

#[tokio::test]
async fn echo_reflects_query_order_and_headers() {
    let req = Request::builder()
        .method("POST")
        .uri("/echo?tag=b&page=1&tag=a")
        .header("x-trace", "1")
        .header("x-trace", "2")
        .body(r#"{"k":"v"}"#.to_string())
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let echo: Echo = body_json(resp).await;
    assert_eq!(echo.method, "POST");
    assert_eq!(
        echo.query,
        vec![
            ("tag".to_string(), "b".to_string()),
            ("page".to_string(), "1".to_string()),
            ("tag".to_string(), "a".to_string()),
        ]
    );
    let traces: Vec<&str> = echo
        .headers
        .iter()
        .filter(|(k, _)| k == "x-trace")
        .map(|(_, v)| v.as_str())
        .collect();
    assert_eq!(traces, vec!["1", "2"]);
    assert_eq!(echo.body.unwrap()["k"], "v");
}

#[tokio::test]
async fn echo_without_query_or_body() {
    let resp = app().oneshot(get("/echo")).await.unwrap();

    let echo: Echo = body_json(resp).await;
    assert_eq!(echo.method, "GET");
    assert!(echo.query.is_empty());
    assert!(echo.body.is_none());
}

// --- status / malformed / secure ---

#[tokio::test]
async fn status_route_replies_with_requested_code() {
    let resp = app().oneshot(get("/status/418")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::IM_A_TEAPOT);
}

#[tokio::test]
async fn malformed_is_not_json() {
    let resp = app().oneshot(get("/malformed")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = body_bytes(resp).await;
    assert!(serde_json::from_slice::<serde_json::Value>(&bytes).is_err());
}

#[tokio::test]
async fn secure_requires_api_key() {
    let resp = app().oneshot(get("/secure")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = Request::builder()
        .uri("/secure")
        .header(API_KEY_HEADER, API_KEY)
        .body(String::new())
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
