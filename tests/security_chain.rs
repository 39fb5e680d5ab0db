//! Drives the assembled Router end to end: HTTP layers -> security chain -> handlers.

use anyhow::Result;
use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::{Algorithm, EncodingKey, Header, get_current_timestamp};
use serde_json::{Value, json};
use store_auth::{
    app,
    config::{AppEnv, Config, DefaultPolicy, HttpConfig, SecurityConfig, SecurityProfile},
};
use tower::ServiceExt;

const JWT_SECRET: &str = "integration-test-secret";
const DEMO_BASIC: &str = "Basic dXNlcjpwYXNzd29yZA==";

fn config(default_policy: DefaultPolicy, profile: SecurityProfile) -> Config {
    let mut security = SecurityConfig::development(JWT_SECRET);
    security.bcrypt_cost = 4;
    security.default_policy = default_policy;
    security.profile = profile;

    Config {
        addr: "127.0.0.1:0".parse().unwrap(),
        app_env: AppEnv::Development,
        http: HttpConfig::default(),
        security,
    }
}

fn build(default_policy: DefaultPolicy, profile: SecurityProfile) -> Router {
    let config = config(default_policy, profile);
    let state = app::build_state(&config).unwrap();
    app::build_router(state, &config)
}

fn strict_app() -> Router {
    build(DefaultPolicy::Permit, SecurityProfile::Strict)
}

fn sign(claims: Value) -> String {
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

fn valid_token(scope: &str) -> String {
    sign(json!({
        "sub": "3f9a7c2e-user",
        "exp": get_current_timestamp() + 300,
        "scope": scope,
    }))
}

/// Well-formed JWT with `alg: none` and no signature.
fn unsigned_token() -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(
        json!({"sub": "mallory", "exp": get_current_timestamp() + 300, "scope": "admin"})
            .to_string(),
    );
    format!("{header}.{payload}.")
}

struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Reply {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

async fn send(app: &Router, method: &str, uri: &str, headers: &[(&str, &str)]) -> Result<Reply> {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }

    let res = app.clone().oneshot(builder.body(Body::empty())?).await?;
    let status = res.status();
    let headers = res.headers().clone();
    let body = axum::body::to_bytes(res.into_body(), usize::MAX).await?;

    Ok(Reply {
        status,
        headers,
        body: body.to_vec(),
    })
}

#[tokio::test]
async fn delete_with_valid_api_key_reaches_handler_as_api_key_user() -> Result<()> {
    let app = strict_app();

    let reply = send(&app, "DELETE", "/products/5", &[("X-API-Key", "APIKEY1234")]).await?;

    assert_eq!(reply.status, StatusCode::OK);
    let body = reply.json();
    assert_eq!(body["method"], "DELETE");
    assert_eq!(body["path"], "/products/5");
    assert_eq!(body["mechanism"], "api_key");
    assert_eq!(body["principal"]["name"], "api_key_user");
    assert_eq!(body["principal"]["roles"], json!(["API_KEY_USER"]));
    Ok(())
}

#[tokio::test]
async fn delete_without_exact_api_key_is_rejected() -> Result<()> {
    let app = strict_app();

    for headers in [
        vec![("X-API-Key", "wrong")],
        vec![("X-API-Key", "apikey1234")],
        vec![("X-API-Key", "APIKEY1234 ")],
        vec![],
    ] {
        let reply = send(&app, "DELETE", "/products/5", &headers).await?;
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED, "headers: {headers:?}");
        assert!(reply.headers.get(header::WWW_AUTHENTICATE).is_none());
    }
    Ok(())
}

#[tokio::test]
async fn get_with_demo_basic_credentials_is_allowed() -> Result<()> {
    let app = strict_app();

    let reply = send(&app, "GET", "/orders/3", &[("Authorization", DEMO_BASIC)]).await?;

    assert_eq!(reply.status, StatusCode::OK);
    let body = reply.json();
    assert_eq!(body["mechanism"], "basic");
    assert_eq!(body["principal"]["name"], "user");
    assert_eq!(body["principal"]["roles"], json!(["USER"]));
    Ok(())
}

#[tokio::test]
async fn get_with_bad_basic_credentials_is_challenged() -> Result<()> {
    let app = strict_app();

    for authorization in [
        // user:wrong
        "Basic dXNlcjp3cm9uZw==",
        // admin:password
        "Basic YWRtaW46cGFzc3dvcmQ=",
        "Basic not-base64!",
        "Basic dXNlcnBhc3N3b3Jk",
    ] {
        let reply = send(&app, "GET", "/orders/3", &[("Authorization", authorization)]).await?;
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED, "{authorization}");
        assert_eq!(
            reply.headers.get(header::WWW_AUTHENTICATE).unwrap(),
            "Basic realm=\"store\""
        );
    }

    let reply = send(&app, "GET", "/orders/3", &[]).await?;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn post_with_verified_token_carries_token_scopes() -> Result<()> {
    let app = strict_app();
    let bearer = format!("Bearer {}", valid_token("orders.write profile"));

    let reply = send(&app, "POST", "/orders", &[("Authorization", bearer.as_str())]).await?;

    assert_eq!(reply.status, StatusCode::OK);
    let body = reply.json();
    assert_eq!(body["mechanism"], "bearer");
    assert_eq!(body["principal"]["name"], "authenticated_user");
    assert_eq!(body["principal"]["roles"], json!(["orders.write", "profile"]));
    Ok(())
}

#[tokio::test]
async fn post_with_signed_token_without_subject_is_allowed() -> Result<()> {
    let app = strict_app();
    let token = sign(json!({
        "exp": get_current_timestamp() + 300,
        "scp": "products.write products.read",
    }));
    let bearer = format!("Bearer {token}");

    let reply = send(&app, "POST", "/products", &[("Authorization", bearer.as_str())]).await?;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(
        reply.json()["principal"]["roles"],
        json!(["products.write", "products.read"])
    );
    Ok(())
}

#[tokio::test]
async fn post_with_unsigned_token_is_rejected_by_bearer_stage() -> Result<()> {
    let app = strict_app();
    let bearer = format!("Bearer {}", unsigned_token());

    let reply = send(&app, "POST", "/orders", &[("Authorization", bearer.as_str())]).await?;

    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.headers.get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");
    assert_eq!(reply.text(), "Unauthorized");
    Ok(())
}

#[tokio::test]
async fn post_with_expired_or_foreign_token_is_rejected() -> Result<()> {
    let app = strict_app();

    let expired = sign(json!({"sub": "u", "exp": get_current_timestamp() - 3600}));
    let foreign = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &json!({"sub": "u", "exp": get_current_timestamp() + 300}),
        &EncodingKey::from_secret(b"some-other-issuer-secret"),
    )?;

    for token in [expired, foreign] {
        let bearer = format!("Bearer {token}");
        let reply = send(&app, "POST", "/products", &[("Authorization", bearer.as_str())]).await?;
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    }

    let reply = send(&app, "POST", "/products", &[]).await?;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn credential_must_match_the_verb() -> Result<()> {
    let app = strict_app();
    let bearer = format!("Bearer {}", valid_token("orders.write"));

    // API key is only honoured on DELETE
    let reply = send(&app, "GET", "/products/1", &[("X-API-Key", "APIKEY1234")]).await?;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);

    // Basic is not accepted for DELETE or POST
    let reply = send(&app, "DELETE", "/products/1", &[("Authorization", DEMO_BASIC)]).await?;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    let reply = send(&app, "POST", "/products", &[("Authorization", DEMO_BASIC)]).await?;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);

    // A verified token is not accepted for GET
    let reply = send(&app, "GET", "/orders/1", &[("Authorization", bearer.as_str())]).await?;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn same_request_twice_gets_same_verdict() -> Result<()> {
    let app = strict_app();

    for (method, headers) in [
        ("GET", vec![("Authorization", DEMO_BASIC)]),
        ("DELETE", vec![("X-API-Key", "wrong")]),
    ] {
        let first = send(&app, method, "/orders/3", &headers).await?;
        let second = send(&app, method, "/orders/3", &headers).await?;
        assert_eq!(first.status, second.status);
        assert_eq!(first.body, second.body);
    }
    Ok(())
}

#[tokio::test]
async fn health_needs_no_credentials() -> Result<()> {
    let app = build(DefaultPolicy::Deny, SecurityProfile::Strict);

    let reply = send(&app, "GET", "/health", &[]).await?;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json(), json!({"status": "ok"}));
    Ok(())
}

#[tokio::test]
async fn catch_all_follows_default_policy() -> Result<()> {
    // PUT has no route: reaching the router means 405
    let permit = build(DefaultPolicy::Permit, SecurityProfile::Strict);
    let reply = send(&permit, "PUT", "/products/5", &[]).await?;
    assert_eq!(reply.status, StatusCode::METHOD_NOT_ALLOWED);

    let authenticated = build(DefaultPolicy::Authenticated, SecurityProfile::Strict);
    let reply = send(&authenticated, "PUT", "/products/5", &[]).await?;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    let reply = send(&authenticated, "PUT", "/products/5", &[("Authorization", DEMO_BASIC)]).await?;
    assert_eq!(reply.status, StatusCode::METHOD_NOT_ALLOWED);

    let deny = build(DefaultPolicy::Deny, SecurityProfile::Strict);
    let reply = send(&deny, "PUT", "/products/5", &[("Authorization", DEMO_BASIC)]).await?;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    let reply = send(&deny, "GET", "/unknown", &[]).await?;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn rejected_requests_still_get_a_request_id() -> Result<()> {
    let app = strict_app();

    let reply = send(
        &app,
        "DELETE",
        "/orders/9",
        &[("X-API-Key", "wrong"), ("x-request-id", "req-42")],
    )
    .await?;

    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.headers.get("x-request-id").unwrap(), "req-42");
    Ok(())
}

#[tokio::test]
async fn contract_profile_checks_credential_shape_only() -> Result<()> {
    let app = build(DefaultPolicy::Permit, SecurityProfile::Contract);

    let reply = send(&app, "POST", "/orders", &[("Authorization", "Bearer anything")]).await?;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json()["principal"]["name"], "Authenticated User");

    // someone:else
    let reply = send(&app, "GET", "/orders/1", &[("Authorization", "Basic c29tZW9uZTplbHNl")]).await?;
    assert_eq!(reply.status, StatusCode::OK);

    let reply = send(&app, "DELETE", "/orders/1", &[("X-API-Key", "not-the-real-key")]).await?;
    assert_eq!(reply.status, StatusCode::OK);

    let reply = send(&app, "PUT", "/orders/1", &[("X-API-Key", "k")]).await?;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.text(), "Authentication failed");
    Ok(())
}
