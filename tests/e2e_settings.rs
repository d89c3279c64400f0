//! E2E tests for the settings API and settings form

mod common;

use activitypub_settings::auth::Capability;
use chrono::Duration;
use common::TestServer;
use serde_json::{Value, json};

#[tokio::test]
async fn test_settings_require_auth() {
    let server = TestServer::new().await;

    let response = server
        .client
        .get(&server.url("/api/v1/settings"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_token_outliving_session_max_age_is_rejected() {
    let server = TestServer::new().await;
    let token = server.token_with_lifetime(
        "1",
        vec![Capability::Read, Capability::ManageOptions],
        Duration::days(30),
    );

    let response = server
        .client
        .get(&server.url("/api/v1/settings"))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_settings_require_manage_options() {
    let server = TestServer::new().await;
    let token = server.author_token("2");

    let response = server
        .client
        .get(&server.url("/api/v1/settings"))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn test_list_exposed_settings_with_defaults() {
    let server = TestServer::new().await;
    let token = server.admin_token();

    let response = server
        .client
        .get(&server.url("/api/v1/settings"))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let json: Value = response.json().await.unwrap();
    let entries = json.as_array().unwrap();

    let names: Vec<&str> = entries
        .iter()
        .map(|entry| entry["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec![
            "activitypub_post_content_type",
            "activitypub_custom_post_content",
            "activitypub_object_type",
            "activitypub_support_post_types",
        ]
    );

    assert_eq!(entries[0]["value"], "content");
    assert_eq!(entries[2]["value"], "note");
    assert_eq!(entries[3]["value"], json!(["post", "pages"]));
}

#[tokio::test]
async fn test_update_object_type_round_trip() {
    let server = TestServer::new().await;
    let token = server.admin_token();

    let response = server
        .client
        .put(&server.url("/api/v1/settings/activitypub_object_type"))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "value": "article" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["value"], "article");

    let response = server
        .client
        .get(&server.url("/api/v1/settings/activitypub_object_type"))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["value"], "article");
}

#[tokio::test]
async fn test_update_rejects_value_not_allowed() {
    let server = TestServer::new().await;
    let token = server.admin_token();

    let response = server
        .client
        .put(&server.url("/api/v1/settings/activitypub_post_content_type"))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "value": "summary" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 422);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["kind"], "value_not_allowed");

    // Previous value untouched
    let value = server
        .state
        .settings
        .read_option("activitypub_post_content_type")
        .await
        .unwrap();
    assert_eq!(value.as_str(), Some("content"));
}

#[tokio::test]
async fn test_update_reports_numeric_value_as_type_mismatch() {
    let server = TestServer::new().await;
    let token = server.admin_token();

    for value in [json!(1), json!(null), json!({ "a": 1 })] {
        let response = server
            .client
            .put(&server.url("/api/v1/settings/activitypub_object_type"))
            .header("Authorization", format!("Bearer {}", token))
            .json(&json!({ "value": value }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 422, "{}", value);
        let json: Value = response.json().await.unwrap();
        assert_eq!(json["kind"], "type_mismatch", "{}", value);
    }

    let value = server
        .state
        .settings
        .read_option("activitypub_object_type")
        .await
        .unwrap();
    assert_eq!(value.as_str(), Some("note"));
}

#[tokio::test]
async fn test_settings_form_rejects_integer_boolean() {
    let server = TestServer::new().await;
    let token = server.admin_token();

    let response = server
        .client
        .post(&server.url("/admin/settings"))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "activitypub_object_type": "article",
            "activitypub_use_hashtags": 0
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 422);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["kind"], "type_mismatch");

    let value = server
        .state
        .settings
        .read_option("activitypub_object_type")
        .await
        .unwrap();
    assert_eq!(value.as_str(), Some("note"));
}

#[tokio::test]
async fn test_unexposed_and_unknown_options_are_not_found() {
    let server = TestServer::new().await;
    let token = server.admin_token();

    for name in ["activitypub_use_hashtags", "activitypub_missing"] {
        let response = server
            .client
            .put(&server.url(&format!("/api/v1/settings/{}", name)))
            .header("Authorization", format!("Bearer {}", token))
            .json(&json!({ "value": true }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 404, "{}", name);
    }
}

#[tokio::test]
async fn test_settings_form_is_all_or_nothing() {
    let server = TestServer::new().await;
    let token = server.admin_token();

    let response = server
        .client
        .post(&server.url("/admin/settings"))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "activitypub_use_hashtags": true,
            "activitypub_use_shortlink": "yes"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 422);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["kind"], "type_mismatch");

    let hashtags = server
        .state
        .settings
        .read_option("activitypub_use_hashtags")
        .await
        .unwrap();
    assert_eq!(hashtags.as_bool(), Some(false));

    let response = server
        .client
        .post(&server.url("/admin/settings"))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "activitypub_use_hashtags": true,
            "activitypub_use_shortlink": true
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 204);
    let hashtags = server
        .state
        .settings
        .read_option("activitypub_use_hashtags")
        .await
        .unwrap();
    assert_eq!(hashtags.as_bool(), Some(true));
}

#[tokio::test]
async fn test_preview_applies_options() {
    let server = TestServer::new().await;
    let token = server.admin_token();

    server
        .state
        .settings
        .write_option("activitypub_object_type", "article".into())
        .await
        .unwrap();

    let response = server
        .client
        .post(&server.url("/api/v1/preview"))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "title": "Hello",
            "content": "<p>Body</p><iframe src=\"x\"></iframe>",
            "permalink": "https://test.example.com/?p=1"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["type"], "Article");
    let content = json["content"].as_str().unwrap();
    assert!(content.contains("<p>Body</p>"));
    assert!(!content.contains("iframe"));
}
