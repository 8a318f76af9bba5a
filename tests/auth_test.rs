mod common;

use serde_json::Value;

#[tokio::test]
async fn register_login_and_me() {
    let app = common::spawn_app().await;
    let username = common::unique("alice");

    let resp = app
        .client
        .post(app.url("/auth/register"))
        .json(&serde_json::json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": "password_123"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert!(resp.headers().get(reqwest::header::SET_COOKIE).is_some());

    let resp = app
        .client
        .post(app.url("/auth/login"))
        .json(&serde_json::json!({
            "username": username,
            "password": "password_123"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let resp = app
        .client
        .get(app.url("/auth/me"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["username"], username.as_str());
    assert_eq!(body["data"]["is_superuser"], false);
}

#[tokio::test]
async fn duplicate_username_conflicts() {
    let app = common::spawn_app().await;
    let user = common::create_test_user(&app, "bob").await;

    let resp = app
        .client
        .post(app.url("/auth/register"))
        .json(&serde_json::json!({
            "username": user.username,
            "email": format!("other_{}@example.com", user.username),
            "password": "password_123"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = common::spawn_app().await;
    let user = common::create_test_user(&app, "carol").await;

    let resp = app
        .client
        .post(app.url("/auth/login"))
        .json(&serde_json::json!({
            "username": user.username,
            "password": "not_the_password"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn access_cookie_authenticates() {
    let app = common::spawn_app().await;
    let user = common::create_test_user(&app, "dave").await;

    let resp = app
        .client
        .get(app.url("/auth/me"))
        .header(
            reqwest::header::COOKIE,
            format!("access_token={}", user.token),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn protected_routes_require_auth() {
    let app = common::spawn_app().await;

    for path in ["/auth/me", "/notices", "/notices/settings", "/notice-types"] {
        let resp = app.client.get(app.url(path)).send().await.unwrap();
        assert_eq!(resp.status(), 401, "GET {path} should require auth");
    }

    let resp = app
        .client
        .post(app.url("/notices/mark-all-seen"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn responses_carry_security_headers() {
    let app = common::spawn_app().await;

    let resp = app.client.get(app.url("/auth/me")).send().await.unwrap();
    assert_eq!(resp.status(), 401);
    let headers = resp.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert!(headers.contains_key("content-security-policy"));
}
