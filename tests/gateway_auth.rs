use std::collections::HashMap;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, StatusCode, header},
};
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{Value, json};
use tower::ServiceExt;

use gateway_auth::app::{build_router, build_state};
use gateway_auth::config::Config;

const SECRET: &str = "integration-test-secret";

fn config(overrides: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> =
        HashMap::from([("SECURITY_JWT_SECRET".to_string(), SECRET.to_string())]);
    for (k, v) in overrides {
        vars.insert(k.to_string(), v.to_string());
    }
    Config::from_lookup(|key| vars.get(key).cloned()).expect("test config")
}

fn app(overrides: &[(&str, &str)]) -> Router {
    let config = config(overrides);
    let state = build_state(&config).expect("state");
    build_router(state, &config)
}

fn token(sub: &str, authorities: &[&str], exp_offset: i64) -> String {
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &json!({
            "sub": sub,
            "authorities": authorities,
            "exp": Utc::now().timestamp() + exp_offset,
        }),
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

async fn get(app: Router, uri: &str, authorization: Option<String>) -> Response<Body> {
    let mut req = Request::builder().uri(uri);
    if let Some(value) = authorization {
        req = req.header(header::AUTHORIZATION, value);
    }
    app.oneshot(req.body(Body::empty()).unwrap()).await.unwrap()
}

async fn json_body(res: Response<Body>) -> Value {
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn set_cookies(res: &Response<Body>) -> Vec<String> {
    res.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn admin_token_reaches_secured_page() {
    let res = get(
        app(&[]),
        "/securedPage/x",
        Some(format!("Bearer {}", token("alice", &["ADMIN"], 3600))),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body = json_body(res).await;
    assert_eq!(body["path"], "/securedPage/x");
    assert_eq!(body["identity"]["principal"], "alice");
    assert_eq!(body["identity"]["authorities"], json!(["ADMIN"]));
}

#[tokio::test]
async fn anonymous_is_redirected_to_login_and_remembered() {
    let res = get(app(&[]), "/securedPage/x", None).await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(res.headers()[header::LOCATION], "/login");
    let cookies = set_cookies(&res);
    assert!(
        cookies
            .iter()
            .any(|c| c.starts_with("forwardPage=/securedPage/x;")),
        "{cookies:?}"
    );
}

#[tokio::test]
async fn expired_token_does_not_block_public_path() {
    let res = get(
        app(&[]),
        "/auth/login",
        Some(format!("Bearer {}", token("alice", &["ADMIN"], -3600))),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    assert!(set_cookies(&res).is_empty());
    let body = json_body(res).await;
    assert_eq!(body["identity"], json!({"anonymous": true}));
}

#[tokio::test]
async fn missing_role_is_forbidden() {
    let res = get(
        app(&[]),
        "/securedPage/x",
        Some(format!("Bearer {}", token("bob", &["USER"], 3600))),
    )
    .await;

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body = json_body(res).await;
    assert_eq!(body["error"]["code"], "FORBIDDEN");
}

#[tokio::test]
async fn authenticated_user_reaches_default_route() {
    let res = get(
        app(&[]),
        "/orders/7",
        Some(format!("Bearer {}", token("bob", &["USER"], 3600))),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(res).await["identity"]["principal"], "bob");
}

#[tokio::test]
async fn foreign_scheme_is_treated_as_anonymous() {
    let res = get(app(&[]), "/orders/7", Some("Basic xyz".into())).await;
    assert_eq!(res.status(), StatusCode::FOUND);
}

#[tokio::test]
async fn unauthorized_entry_point_answers_401() {
    let res = get(
        app(&[("SECURITY_ENTRY_POINT", "unauthorized")]),
        "/orders/7",
        None,
    )
    .await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(res.headers().get(header::LOCATION).is_none());
    assert_eq!(json_body(res).await["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn query_carrier_authenticates() {
    let uri = format!(
        "/securedPage/x?access_token=Bearer+{}",
        token("alice", &["ADMIN"], 3600)
    );
    let res = get(app(&[("SECURITY_JWT_CARRIER", "query")]), &uri, None).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(res).await["identity"]["principal"], "alice");
}

#[tokio::test]
async fn login_view_is_public_and_not_remembered() {
    let res = get(app(&[]), "/login", None).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert!(set_cookies(&res).is_empty());
    assert_eq!(json_body(res).await, json!({"view": "login"}));
}

#[tokio::test]
async fn health_is_public_and_tagged_with_request_id() {
    let res = get(app(&[]), "/health", None).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));
    assert_eq!(json_body(res).await, json!({"status": "ok"}));
}

#[tokio::test]
async fn permit_all_default_lets_anonymous_through() {
    let res = get(
        app(&[("SECURITY_DEFAULT_ACCESS", "permit_all")]),
        "/orders/7",
        None,
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(res).await["identity"], json!({"anonymous": true}));
}

#[tokio::test]
async fn role_prefix_is_applied_to_role_rules() {
    let app = app(&[("SECURITY_ROLE_PREFIX", "ROLE_")]);

    let res = get(
        app.clone(),
        "/securedPage/x",
        Some(format!("Bearer {}", token("alice", &["ROLE_ADMIN"], 3600))),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = get(
        app,
        "/securedPage/x",
        Some(format!("Bearer {}", token("alice", &["ADMIN"], 3600))),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn encoded_path_is_matched_after_decoding() {
    let res = get(
        app(&[]),
        "/%73ecuredPage/x",
        Some(format!("Bearer {}", token("bob", &["USER"], 3600))),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = get(
        app(&[]),
        "/%73ecuredPage/x",
        Some(format!("Bearer {}", token("alice", &["ADMIN"], 3600))),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn non_canonical_paths_are_refused() {
    let app = app(&[]);
    for uri in [
        "//securedPage/x",
        "/x/../securedPage/x",
        "/securedPage%2Fx",
        "/securedPage;jsessionid=1/x",
    ] {
        let res = get(
            app.clone(),
            uri,
            Some(format!("Bearer {}", token("bob", &["USER"], 3600))),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{uri}");
        assert!(set_cookies(&res).is_empty(), "{uri}");
        assert_eq!(json_body(res).await["error"]["code"], "BAD_REQUEST", "{uri}");
    }
}

#[tokio::test]
async fn memo_records_the_decoded_path() {
    let res = get(app(&[]), "/%73ecuredPage/x", None).await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert!(
        set_cookies(&res)
            .iter()
            .any(|c| c.starts_with("forwardPage=/securedPage/x;"))
    );
}
