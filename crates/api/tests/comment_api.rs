//! HTTP-level tests for comments.

mod common;

use axum::http::StatusCode;
use common::{admin_token, body_json, build_test_app, create_review, get, post_json};

#[tokio::test]
async fn anonymous_comment_is_stored_and_listed() {
    let test = build_test_app().await;
    let token = admin_token(test.app()).await;
    let review = create_review(test.app(), &token, "Dune").await;
    let id = review["id"].as_i64().unwrap();

    let body = serde_json::json!({ "username": "reader", "comment": "Loved it", "reviewId": id });
    let response = post_json(test.app(), "/api/v1/comments", body).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await["data"].clone();
    assert_eq!(created["reviewId"], id);
    assert_eq!(created["username"], "reader");
    assert!(created["date"].is_string());

    let json = body_json(get(test.app(), &format!("/api/v1/reviews/{id}/comments")).await).await;
    assert_eq!(json["data"], serde_json::json!([created]));
}

#[tokio::test]
async fn comments_are_scoped_to_their_review() {
    let test = build_test_app().await;
    let token = admin_token(test.app()).await;
    let a = create_review(test.app(), &token, "Dune").await["id"].as_i64().unwrap();
    let b = create_review(test.app(), &token, "Hyperion").await["id"].as_i64().unwrap();

    for (review_id, text) in [(a, "first"), (b, "elsewhere"), (a, "second")] {
        let body = serde_json::json!({ "username": "u", "comment": text, "reviewId": review_id });
        post_json(test.app(), "/api/v1/comments", body).await;
    }

    let json = body_json(get(test.app(), &format!("/api/v1/reviews/{a}/comments")).await).await;
    let texts: Vec<_> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["comment"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(texts, vec!["first", "second"]);
}

/// A comment without a username is rejected.
#[tokio::test]
async fn missing_username_is_invalid_input() {
    let test = build_test_app().await;

    let body = serde_json::json!({ "username": "", "comment": "text", "reviewId": 42 });
    let response = post_json(test.app(), "/api/v1/comments", body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["error"].as_str().unwrap().contains("username"));
}

#[tokio::test]
async fn comment_on_unknown_review_is_404() {
    let test = build_test_app().await;

    let body = serde_json::json!({ "username": "u", "comment": "hello?", "reviewId": 777 });
    let response = post_json(test.app(), "/api/v1/comments", body).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(test.repos.comments.list_for_review(777).await.is_empty());
}

#[tokio::test]
async fn listing_comments_of_unknown_review_is_empty() {
    let test = build_test_app().await;

    let response = get(test.app(), "/api/v1/reviews/555/comments").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"], serde_json::json!([]));
}
