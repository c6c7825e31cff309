//! Router-level tests for the console API

use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use cysim_web::{WebConfig, WebServer, SESSION_HEADER};

fn app_with_delay(delay_ms: u64) -> Router {
    let mut cfg = WebConfig::default();
    cfg.run_delay_ms = delay_ms;
    WebServer::new(cfg).router()
}

fn app() -> Router {
    app_with_delay(0)
}

async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(SESSION_HEADER, token);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, value)
}

async fn login(app: &Router) -> String {
    let (status, body) = call(app, "POST", "/api/session/login?skipCaptcha=true", None, Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

async fn run(app: &Router, token: &str, input: &str) -> (StatusCode, Value) {
    call(app, "POST", "/api/run", Some(token), Some(json!({ "input": input }))).await
}

#[tokio::test]
async fn health_and_index() {
    let app = app();
    let (status, body) = call(&app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "cysim-web");

    let (status, body) = call(&app, "GET", "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_str().unwrap().contains("Let's get started!"));
}

#[tokio::test]
async fn run_covers_every_category() {
    let app = app();
    let token = login(&app).await;

    let (status, body) = run(&app, &token, "cy.log(\"Yay!\")").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"]["category"], "success");
    assert!(body["text"]
        .as_str()
        .unwrap()
        .contains("cy.log(\"Yay!\") // Logged message \"Yay!\""));

    let (_, body) = run(&app, &token, "cy.run()").await;
    assert_eq!(body["outcome"]["category"], "error");
    assert!(body["text"].as_str().unwrap().contains("Invalid Cypress command: cy.run()"));

    let (_, body) = run(&app, &token, "cy.contains(\"Login\")").await;
    assert_eq!(body["outcome"]["category"], "warning");
    assert!(body["text"]
        .as_str()
        .unwrap()
        .contains("The `cy.contains` command has not been implemented yet."));

    let (_, body) = run(&app, &token, "cy.visit").await;
    assert!(body["text"].as_str().unwrap().contains("Missing parentheses on `cy.visit` command"));

    let (_, body) = run(&app, &token, "help").await;
    assert_eq!(body["outcome"]["category"], "help");
    let html = body["html"].as_str().unwrap();
    assert!(html.contains("href=\"https://docs.cypress.io/api/table-of-contents\""));
    assert!(html.contains("target=\"_blank\""));
    assert!(html.contains("rel=\"noopener noreferrer\""));
}

#[tokio::test]
async fn run_requires_session_and_input() {
    let app = app();
    let (status, _) = call(&app, "POST", "/api/run", None, Some(json!({ "input": "cy.log('a')" }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = run(&app, "no-such-token", "cy.log('a')").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = login(&app).await;
    let (status, body) = run(&app, &token, "   ").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn login_without_captcha_is_forbidden() {
    let app = app();
    let (status, _) = call(&app, "POST", "/api/session/login", None, Some(json!({}))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn wrong_captcha_answer_issues_new_challenge() {
    let app = app();
    let (_, challenge) = call(&app, "GET", "/api/captcha", None, None).await;
    let id = challenge["id"].as_str().unwrap().to_string();
    assert!(challenge["question"].as_str().unwrap().starts_with("What is "));

    let (status, body) = call(
        &app,
        "POST",
        "/api/captcha/verify",
        None,
        Some(json!({ "id": id, "answer": "999" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], false);
    assert_eq!(body["error"], "Incorrect answer, please try again.");
    assert_ne!(body["next"]["id"].as_str().unwrap(), id);
}

#[tokio::test]
async fn consent_banner_follows_choice() {
    let app = app();
    let (_, status) = call(&app, "GET", "/api/session", None, None).await;
    assert_eq!(status["show_consent_banner"], false);

    let token = login(&app).await;
    let (_, status) = call(&app, "GET", "/api/session", Some(&token), None).await;
    assert_eq!(status["show_consent_banner"], true);

    let (code, status) = call(&app, "POST", "/api/consent", Some(&token), Some(json!({ "choice": "declined" }))).await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(status["show_consent_banner"], false);
    assert_eq!(status["consent"], "declined");
}

#[tokio::test]
async fn panel_toggles_per_session() {
    let app = app();
    let token = login(&app).await;
    let (_, body) = call(&app, "POST", "/api/panel/toggle", Some(&token), None).await;
    assert_eq!(body["panel"], "expanded");
    let (_, body) = call(&app, "POST", "/api/panel/toggle", Some(&token), None).await;
    assert_eq!(body["panel"], "collapsed");
}

#[tokio::test]
async fn logout_ends_session() {
    let app = app();
    let token = login(&app).await;
    let (status, _) = call(&app, "POST", "/api/session/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, status) = call(&app, "GET", "/api/session", Some(&token), None).await;
    assert_eq!(status["logged_in"], false);

    let (status, _) = run(&app, &token, "cy.log('a')").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn concurrent_run_is_rejected() {
    let app = app_with_delay(300);
    let token = login(&app).await;

    let first = {
        let app = app.clone();
        let token = token.clone();
        tokio::spawn(async move { run(&app, &token, "cy.log('a')").await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    let (status, _) = run(&app, &token, "cy.log('b')").await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = first.await.unwrap();
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn logout_during_run_discards_result() {
    let app = app_with_delay(300);
    let token = login(&app).await;

    let pending = {
        let app = app.clone();
        let token = token.clone();
        tokio::spawn(async move { run(&app, &token, "cy.log('a')").await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    call(&app, "POST", "/api/session/logout", Some(&token), None).await;

    let (status, _) = pending.await.unwrap();
    assert_eq!(status, StatusCode::GONE);
}

#[tokio::test]
async fn dropped_run_releases_session() {
    let app = app_with_delay(300);
    let token = login(&app).await;

    let abandoned = tokio::time::timeout(Duration::from_millis(50), run(&app, &token, "cy.log('a')")).await;
    assert!(abandoned.is_err());

    tokio::time::sleep(Duration::from_millis(500)).await;
    let (_, status) = call(&app, "GET", "/api/session", Some(&token), None).await;
    assert_eq!(status["running"], false);

    let (status, body) = run(&app, &token, "cy.log('b')").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"]["category"], "success");
}

#[tokio::test]
async fn evaluate_and_command_listing() {
    let app = app();
    let (status, body) = call(&app, "POST", "/api/evaluate", None, Some(json!({ "input": "cy.log('hi')" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"]["message"], "cy.log('hi') // Logged message \"hi\"");

    let (_, body) = call(&app, "GET", "/api/commands", None, None).await;
    let commands = body.as_array().unwrap();
    assert!(commands.iter().any(|c| c["name"] == "cy.log" && c["implemented"] == true));
    assert!(commands.iter().all(|c| c["name"] != "cy.run"));
}

#[tokio::test]
async fn unknown_routes_are_404() {
    let app = app();
    let (status, _) = call(&app, "GET", "/api/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = call(&app, "GET", "/static/missing.js", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
