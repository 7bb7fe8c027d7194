//! # `/api/qstash` の統合テスト
//!
//! QStash と同じ形式のトークンを `jsonwebtoken::encode` で発行し、
//! 署名検証から配信までを通しで検証する。

use std::{collections::HashMap, sync::Arc};

use axum::{Router, body::Body};
use http::{Request, StatusCode};
use jsonwebtoken::{Algorithm, EncodingKey, Header, get_current_timestamp};
use mailswitch_api::{AppState, ApiConfig, build_app};
use mailswitch_infra::{EmailSwitch, mock::MockEmailTransport, signature::body_hash};
use pretty_assertions::assert_eq;
use serde_json::json;
use tower::ServiceExt;

const CURRENT_KEY: &str = "sig_current";
const NEXT_KEY: &str = "sig_next";
const DESTINATION: &str = "https://mail.example.com/api/qstash";

const BODY: &str = r#"{"fromEmail":"noreply@example.com","to":["user@example.com"],"subject":"s","text":"t"}"#;

fn config(extra: &[(&'static str, &'static str)]) -> ApiConfig {
    let mut vars = HashMap::from([
        ("ROOT_API_KEY", "root-api-key"),
        ("QSTASH", "true"),
        ("QSTASH_CURRENT_SIGNING_KEY", CURRENT_KEY),
        ("QSTASH_NEXT_SIGNING_KEY", NEXT_KEY),
    ]);
    vars.extend(extra.iter().copied());
    ApiConfig::from_lookup(|name| vars.get(name).map(|v| (*v).to_string())).unwrap()
}

fn app(config: &ApiConfig, transport: &MockEmailTransport) -> Router {
    let state = AppState {
        switch:   Arc::new(EmailSwitch::new(vec![Box::new(transport.clone())])),
        verifier: config.qstash.as_ref().map(|qstash| qstash.verifier()),
    };
    build_app(config, Arc::new(state))
}

fn sign(key: &str, body: &str) -> String {
    let now = get_current_timestamp();
    let claims = json!({
        "iss": "Upstash",
        "sub": DESTINATION,
        "iat": now,
        "nbf": now,
        "exp": now + 300,
        "jti": "msg_1",
        "body": body_hash(body.as_bytes()),
    });
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(key.as_bytes()),
    )
    .unwrap()
}

fn post_qstash(signature: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/qstash")
        .header("content-type", "application/json");
    if let Some(token) = signature {
        builder = builder.header("upstash-signature", token);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn test_current鍵の署名なら配信して200() {
    // Given
    let transport = MockEmailTransport::succeeding();
    let app = app(&config(&[]), &transport);
    let token = sign(CURRENT_KEY, BODY);

    // When
    let response = app.oneshot(post_qstash(Some(&token), BODY)).await.unwrap();

    // Then
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn test_next鍵の署名でも200() {
    let transport = MockEmailTransport::succeeding();
    let app = app(&config(&[]), &transport);
    let token = sign(NEXT_KEY, BODY);

    let response = app.oneshot(post_qstash(Some(&token), BODY)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_api_keyは不要() {
    let transport = MockEmailTransport::succeeding();
    let app = app(&config(&[]), &transport);
    let token = sign(CURRENT_KEY, BODY);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/qstash")
                .header("upstash-signature", token)
                .header("authorization", "Bearer wrong")
                .body(Body::from(BODY))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_署名ヘッダーがなければ400() {
    let transport = MockEmailTransport::succeeding();
    let app = app(&config(&[]), &transport);

    let response = app.oneshot(post_qstash(None, BODY)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_署名後にボディを変えたら400() {
    let transport = MockEmailTransport::succeeding();
    let app = app(&config(&[]), &transport);
    let token = sign(CURRENT_KEY, BODY);
    let tampered = BODY.replace("user@example.com", "evil@example.com");

    let response = app
        .oneshot(post_qstash(Some(&token), &tampered))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["detail"], "署名を検証できませんでした");
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_未知の鍵で署名されていたら400() {
    let transport = MockEmailTransport::succeeding();
    let app = app(&config(&[]), &transport);
    let token = sign("unknown_key", BODY);

    let response = app.oneshot(post_qstash(Some(&token), BODY)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_署名が正しくても本文が不正なら400() {
    let transport = MockEmailTransport::succeeding();
    let app = app(&config(&[]), &transport);
    let body = r#"{"fromEmail":"noreply@example.com","to":[],"subject":"s","text":"t"}"#;
    let token = sign(CURRENT_KEY, body);

    let response = app.oneshot(post_qstash(Some(&token), body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_配信に失敗したら500() {
    let transport = MockEmailTransport::failing();
    let app = app(&config(&[]), &transport);
    let token = sign(CURRENT_KEY, BODY);

    let response = app.oneshot(post_qstash(Some(&token), BODY)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_qstash_urlが異なれば400() {
    let transport = MockEmailTransport::succeeding();
    let app = app(
        &config(&[("QSTASH_URL", "https://other.example.com/api/qstash")]),
        &transport,
    );
    let token = sign(CURRENT_KEY, BODY);

    let response = app.oneshot(post_qstash(Some(&token), BODY)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_qstash_urlが一致すれば200() {
    let transport = MockEmailTransport::succeeding();
    let app = app(&config(&[("QSTASH_URL", DESTINATION)]), &transport);
    let token = sign(CURRENT_KEY, BODY);

    let response = app.oneshot(post_qstash(Some(&token), BODY)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
