mod common;

use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use blossom_souvenir_api::routes::create_app;
use serde_json::{Value, json};
use tower::ServiceExt;

use common::setup_state;

async fn body_json(response: axum::response::Response) -> anyhow::Result<Value> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn json_request(method: &str, uri: &str, body: Value) -> anyhow::Result<Request<Body>> {
    Ok(Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))?)
}

#[tokio::test]
async fn health_reports_database() -> anyhow::Result<()> {
    let (state, _dir) = setup_state().await?;
    let app = create_app(state);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await?;
    assert_eq!(body["data"]["database"], "ok");
    Ok(())
}

#[tokio::test]
async fn unknown_path_is_json_404() -> anyhow::Result<()> {
    let (state, _dir) = setup_state().await?;
    let app = create_app(state);

    let response = app
        .oneshot(Request::builder().uri("/api/nope").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await?;
    assert_eq!(body["data"]["path"], "/api/nope");
    Ok(())
}

#[tokio::test]
async fn session_gates_profile_access() -> anyhow::Result<()> {
    let (state, _dir) = setup_state().await?;
    let app = create_app(state);

    let anonymous = app
        .clone()
        .oneshot(Request::builder().uri("/api/users/me").body(Body::empty())?)
        .await?;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let registered = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            json!({ "name": "Owner", "email": "owner@example.com", "password": "secret-pass" }),
        )?)
        .await?;
    assert_eq!(registered.status(), StatusCode::CREATED);
    let body = body_json(registered).await?;
    let token = body["data"]["token"]
        .as_str()
        .expect("first user receives a token")
        .to_string();

    let me = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/users/me")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(me.status(), StatusCode::OK);
    let body = body_json(me).await?;
    assert_eq!(body["data"]["role"], "ADMIN");

    // Pending accounts can log in but the extractor turns them away.
    app.clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            json!({ "name": "Kofi", "email": "kofi@example.com", "password": "secret-pass" }),
        )?)
        .await?;
    let login = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            json!({ "email": "kofi@example.com", "password": "secret-pass" }),
        )?)
        .await?;
    assert_eq!(login.status(), StatusCode::OK);
    let body = body_json(login).await?;
    let pending_token = body["data"]["token"].as_str().expect("token").to_string();

    let blocked = app
        .oneshot(
            Request::builder()
                .uri("/api/cart")
                .header(header::AUTHORIZATION, format!("Bearer {pending_token}"))
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(blocked.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn wrong_password_is_unauthorized() -> anyhow::Result<()> {
    let (state, _dir) = setup_state().await?;
    let app = create_app(state);

    app.clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            json!({ "name": "Owner", "email": "owner@example.com", "password": "secret-pass" }),
        )?)
        .await?;
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            json!({ "email": "owner@example.com", "password": "wrong" }),
        )?)
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

fn bearer_get(uri: &str, token: &str) -> anyhow::Result<Request<Body>> {
    Ok(Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())?)
}

/// Registers the admin, then a second customer who stays pending, and returns
/// the pending customer's login token.
async fn pending_token(app: &axum::Router) -> anyhow::Result<String> {
    for (name, email) in [("Owner", "owner@example.com"), ("Kofi", "kofi@example.com")] {
        app.clone()
            .oneshot(json_request(
                "POST",
                "/api/auth/register",
                json!({ "name": name, "email": email, "password": "secret-pass" }),
            )?)
            .await?;
    }
    let login = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            json!({ "email": "kofi@example.com", "password": "secret-pass" }),
        )?)
        .await?;
    let body = body_json(login).await?;
    Ok(body["data"]["token"].as_str().expect("token").to_string())
}

#[tokio::test]
async fn pending_users_are_forbidden_from_session_routes() -> anyhow::Result<()> {
    let (state, _dir) = setup_state().await?;
    let app = create_app(state);
    let token = pending_token(&app).await?;

    for uri in ["/api/users/me", "/api/notifications", "/api/wishlist", "/api/orders"] {
        let response = app.clone().oneshot(bearer_get(uri, &token)?).await?;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{uri}");
    }
    Ok(())
}

#[tokio::test]
async fn live_socket_rejects_bad_and_pending_tokens() -> anyhow::Result<()> {
    let (state, _dir) = setup_state().await?;
    let app = create_app(state);
    let token = pending_token(&app).await?;

    let bogus = app
        .clone()
        .oneshot(Request::builder().uri("/ws?token=bogus").body(Body::empty())?)
        .await?;
    assert_eq!(bogus.status(), StatusCode::UNAUTHORIZED);

    let pending = app.clone().oneshot(bearer_get("/ws", &token)?).await?;
    assert_eq!(pending.status(), StatusCode::FORBIDDEN);

    // Without a token the request reaches the upgrade step, which wants real
    // websocket headers.
    let anonymous = app
        .oneshot(Request::builder().uri("/ws").body(Body::empty())?)
        .await?;
    assert_ne!(anonymous.status(), StatusCode::UNAUTHORIZED);
    assert_ne!(anonymous.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn contact_form_falls_back_to_anonymous_on_bad_tokens() -> anyhow::Result<()> {
    let (state, _dir) = setup_state().await?;
    let app = create_app(state);
    let pending = pending_token(&app).await?;

    for token in ["bogus", pending.as_str()] {
        let request = Request::builder()
            .method("POST")
            .uri("/api/messages")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::from(
                json!({
                    "name": "Visitor",
                    "email": "visitor@example.com",
                    "message": "Do you ship to Kumasi?"
                })
                .to_string(),
            ))?;
        let response = app.clone().oneshot(request).await?;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await?;
        assert!(body["data"]["user_id"].is_null());
    }
    Ok(())
}
