//! # `/api/emails` と `/health` の統合テスト
//!
//! `build_app` で main.rs と同じルーターを組み立て、`oneshot` で検証する。

use std::{collections::HashMap, sync::Arc};

use axum::{Router, body::Body};
use http::{Request, StatusCode};
use mailswitch_api::{AppState, ApiConfig, build_app};
use mailswitch_infra::{EmailSwitch, mock::MockEmailTransport};
use pretty_assertions::assert_eq;
use rstest::rstest;
use tower::ServiceExt;

const ROOT_API_KEY: &str = "root-api-key";

const VALID_BODY: &str = r#"{
    "fromEmail": "noreply@example.com",
    "fromName": "Example",
    "to": ["user@example.com"],
    "subject": "ようこそ",
    "text": "本文",
    "html": "<p>本文</p>"
}"#;

fn config() -> ApiConfig {
    let vars = HashMap::from([
        ("ROOT_API_KEY", ROOT_API_KEY),
        ("PROVIDERS_VALUE", r#"[{"id":"test"}]"#),
    ]);
    ApiConfig::from_lookup(|name| vars.get(name).map(|v| (*v).to_string())).unwrap()
}

/// プロバイダ設定 `[{"id":"test"}]` で main.rs と同じ構成のアプリを作る
fn app_with_test_provider() -> Router {
    let config = config();
    let providers = config.providers.load().unwrap();
    let state = AppState::from_config(&config, &providers).unwrap();
    build_app(&config, Arc::new(state))
}

fn app_with_transports(transports: Vec<MockEmailTransport>) -> Router {
    let switch = EmailSwitch::new(
        transports
            .into_iter()
            .map(|t| Box::new(t) as Box<dyn mailswitch_infra::EmailTransport>)
            .collect(),
    );
    let state = AppState {
        switch:   Arc::new(switch),
        verifier: None,
    };
    build_app(&config(), Arc::new(state))
}

fn post_email(authorization: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/emails")
        .header("content-type", "application/json");
    if let Some(value) = authorization {
        builder = builder.header("authorization", value);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_正しい認証と本文でtestプロバイダなら200() {
    // Given
    let app = app_with_test_provider();

    // When
    let response = app
        .oneshot(post_email(Some(&format!("Bearer {ROOT_API_KEY}")), VALID_BODY))
        .await
        .unwrap();

    // Then
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(bytes.is_empty());
}

#[rstest]
#[case::キーなしのbearer(Some("Bearer"))]
#[case::ヘッダーなし(None)]
#[case::キー不一致(Some("Bearer wrong-key"))]
#[case::要素が多い(Some("Bearer root-api-key extra"))]
#[tokio::test]
async fn test_認証に失敗したら401(#[case] authorization: Option<&str>) {
    let transport = MockEmailTransport::succeeding();
    let app = app_with_transports(vec![transport.clone()]);

    let response = app
        .oneshot(post_email(authorization, VALID_BODY))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["status"], 401);
    assert_eq!(json["detail"], "認証に失敗しました");
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_解釈できないボディは400() {
    let transport = MockEmailTransport::succeeding();
    let app = app_with_transports(vec![transport.clone()]);

    let response = app
        .oneshot(post_email(Some(&format!("Bearer {ROOT_API_KEY}")), "{not json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["detail"], "Can't deserialize body");
    assert_eq!(transport.call_count(), 0);
}

#[rstest]
#[case::送信元に_at_がない(r#"{"fromEmail":"noreply","to":["u@example.com"],"subject":"s","text":"t"}"#)]
#[case::宛先が空(r#"{"fromEmail":"n@example.com","to":[],"subject":"s","text":"t"}"#)]
#[case::件名が空白(r#"{"fromEmail":"n@example.com","to":["u@example.com"],"subject":" ","text":"t"}"#)]
#[case::本文がない(r#"{"fromEmail":"n@example.com","to":["u@example.com"],"subject":"s","text":"","html":" "}"#)]
#[tokio::test]
async fn test_検証ルール違反は400で配信しない(#[case] body: &str) {
    let transport = MockEmailTransport::succeeding();
    let app = app_with_transports(vec![transport.clone()]);

    let response = app
        .oneshot(post_email(Some(&format!("Bearer {ROOT_API_KEY}")), body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["title"], "Validation Error");
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_全プロバイダが失敗したら500() {
    let first = MockEmailTransport::failing();
    let second = MockEmailTransport::failing();
    let app = app_with_transports(vec![first.clone(), second.clone()]);

    let response = app
        .oneshot(post_email(Some(&format!("Bearer {ROOT_API_KEY}")), VALID_BODY))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["detail"], "メールを送信できませんでした");
    assert_eq!(first.call_count(), 1);
    assert_eq!(second.call_count(), 1);
}

#[tokio::test]
async fn test_先頭が失敗しても次のプロバイダで200() {
    let first = MockEmailTransport::failing();
    let second = MockEmailTransport::succeeding();
    let third = MockEmailTransport::succeeding();
    let app = app_with_transports(vec![first.clone(), second.clone(), third.clone()]);

    let response = app
        .oneshot(post_email(Some(&format!("Token {ROOT_API_KEY}")), VALID_BODY))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(second.received()[0].subject(), "ようこそ");
    assert_eq!(third.call_count(), 0);
}

#[tokio::test]
async fn test_qstash無効時は_api_qstash_が存在しない() {
    let app = app_with_test_provider();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/qstash")
                .body(Body::from(VALID_BODY))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_healthは認証なしで200() {
    let app = app_with_test_provider();

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_readyはトランスポートがあれば200() {
    let app = app_with_test_provider();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health/ready")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ready");
    assert_eq!(json["checks"]["transports"], "ok");
}

#[tokio::test]
async fn test_readyはトランスポートがなければ503() {
    let app = app_with_transports(Vec::new());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health/ready")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(response).await;
    assert_eq!(json["status"], "not_ready");
}
