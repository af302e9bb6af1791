//! Integration tests for the web UI: registration, login, the auth gate
//! and the external-table listing pages.
//!
//! These drive the real router over an in-memory SQLite database, with a
//! stub table fetcher standing in for the external service.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

use frota_painel::db::Database;
use frota_painel::orders::OrderStore;
use frota_painel::routes::{AppState, build_router};
use frota_painel::sessions::SessionStore;
use frota_painel::supabase::{ExternalRow, TableFetcher};
use frota_painel::users::UserStore;

const SECRET: &str = "chave-de-teste";

/// Stub fetcher: canned rows per table, or a forced failure.
struct StubFetcher {
    rows: Vec<ExternalRow>,
    fail: bool,
}

#[async_trait]
impl TableFetcher for StubFetcher {
    async fn fetch_rows(&self, _table: &str, _limit: u32) -> Result<Vec<ExternalRow>> {
        if self.fail {
            return Err(anyhow!("service unavailable"));
        }
        Ok(self.rows.clone())
    }
}

async fn test_app_with_fetcher(fetcher: StubFetcher) -> Router {
    let db = Database::new_in_memory().await.unwrap();
    let state = Arc::new(AppState {
        users: UserStore::new(db.pool()),
        sessions: SessionStore::new(db.pool(), 3600),
        fetcher: Arc::new(fetcher),
        orders: OrderStore::with_demo_data(),
        secret_key: SECRET.to_string(),
        session_timeout_secs: 3600,
    });
    build_router(state)
}

async fn test_app() -> Router {
    test_app_with_fetcher(StubFetcher {
        rows: Vec::new(),
        fail: false,
    })
    .await
}

fn form_request(path: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(path: &str) -> Request<Body> {
    Request::builder().uri(path).body(Body::empty()).unwrap()
}

fn get_with_cookie(path: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(path)
        .header(header::COOKIE, cookie.to_string())
        .body(Body::empty())
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Register a user and log in, returning the session cookie pair.
async fn login(app: &Router, email: &str, password: &str) -> String {
    let register_body = format!(
        "full_name=Maria+Silva&email={email}&password={password}&confirm_password={password}"
    );
    let response = app
        .clone()
        .oneshot(form_request("/cadastro", &register_body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = app
        .clone()
        .oneshot(form_request(
            "/login",
            &format!("email={email}&password={password}"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/dashboard"
    );

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login must set a session cookie")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

#[tokio::test]
async fn home_redirects_to_login() {
    let app = test_app().await;
    let response = app.oneshot(get_request("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/login");
}

#[tokio::test]
async fn protected_paths_redirect_without_session() {
    let app = test_app().await;

    for path in [
        "/dashboard",
        "/orders",
        "/orders/ML-2031",
        "/shipping",
        "/reports",
        "/settings",
        "/clientes",
        "/produtos",
        "/motoristas",
        "/veiculos",
        "/entregas",
        "/itens",
    ] {
        let response = app.clone().oneshot(get_request(path)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "path {path}");
        let location = response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(location.starts_with("/login"), "path {path} -> {location}");
    }
}

#[tokio::test]
async fn register_then_login_establishes_session() {
    let app = test_app().await;
    let cookie = login(&app, "maria@exemplo.com", "senha123").await;

    let response = app
        .oneshot(get_with_cookie("/dashboard", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("maria@exemplo.com"));
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let app = test_app().await;
    let body = "full_name=Maria+Silva&email=maria@exemplo.com&password=senha123&confirm_password=senha123";

    let response = app.clone().oneshot(form_request("/cadastro", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    // Second registration with the same email re-renders the form
    let response = app.clone().oneshot(form_request("/cadastro", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let text = body_text(response).await;
    assert!(text.contains("cadastrado"));
}

#[tokio::test]
async fn password_mismatch_creates_no_account() {
    let app = test_app().await;
    let body = "full_name=Maria+Silva&email=maria@exemplo.com&password=senha123&confirm_password=senha124";

    let response = app.clone().oneshot(form_request("/cadastro", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let text = body_text(response).await;
    assert!(text.contains("senhas"));

    // The email is still free
    let response = app
        .clone()
        .oneshot(form_request(
            "/cadastro",
            "full_name=Maria+Silva&email=maria@exemplo.com&password=senha123&confirm_password=senha123",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn unknown_email_gets_generic_message_and_no_cookie() {
    let app = test_app().await;

    let response = app
        .oneshot(form_request(
            "/login",
            "email=usuario@exemplo.com&password=12345",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    let text = body_text(response).await;
    assert!(text.contains("Login inválido. Verifique seu e-mail e senha."));
}

#[tokio::test]
async fn wrong_password_matches_unknown_email_message() {
    let app = test_app().await;
    let _cookie = login(&app, "maria@exemplo.com", "senha123").await;

    let wrong_password = app
        .clone()
        .oneshot(form_request(
            "/login",
            "email=maria@exemplo.com&password=errada1",
        ))
        .await
        .unwrap();
    let unknown_email = app
        .clone()
        .oneshot(form_request(
            "/login",
            "email=ninguem@exemplo.com&password=errada1",
        ))
        .await
        .unwrap();

    assert_eq!(wrong_password.status(), StatusCode::OK);
    assert_eq!(unknown_email.status(), StatusCode::OK);
    assert_eq!(
        body_text(wrong_password).await,
        body_text(unknown_email).await
    );
}

#[tokio::test]
async fn logout_invalidates_session_and_is_idempotent() {
    let app = test_app().await;
    let cookie = login(&app, "maria@exemplo.com", "senha123").await;

    let response = app
        .clone()
        .oneshot(get_with_cookie("/logout", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/login");

    // The old cookie no longer opens protected pages
    let response = app
        .clone()
        .oneshot(get_with_cookie("/dashboard", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    // Logging out again with the dead cookie is harmless
    let response = app
        .clone()
        .oneshot(get_with_cookie("/logout", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn tampered_cookie_is_treated_as_logged_out() {
    let app = test_app().await;
    let cookie = login(&app, "maria@exemplo.com", "senha123").await;

    // Flip a character inside the signed value
    let mut tampered = cookie.clone();
    let last = tampered.pop().unwrap();
    tampered.push(if last == 'a' { 'b' } else { 'a' });

    let response = app
        .oneshot(get_with_cookie("/dashboard", &tampered))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn clientes_page_renders_fetched_rows() {
    let rows = vec![
        serde_json::json!({
            "id_cliente": 1,
            "nome": "Transportes Lima",
            "endereco": "Rua A, 10",
            "telefone": "11 98888-0000",
            "email": "contato@lima.com"
        })
        .as_object()
        .unwrap()
        .clone(),
    ];
    let app = test_app_with_fetcher(StubFetcher { rows, fail: false }).await;
    let cookie = login(&app, "maria@exemplo.com", "senha123").await;

    let response = app
        .oneshot(get_with_cookie("/clientes", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Transportes Lima"));
    assert!(body.contains("contato@lima.com"));
}

#[tokio::test]
async fn listing_page_fails_open_when_fetch_errors() {
    let app = test_app_with_fetcher(StubFetcher {
        rows: Vec::new(),
        fail: true,
    })
    .await;
    let cookie = login(&app, "maria@exemplo.com", "senha123").await;

    let response = app
        .oneshot(get_with_cookie("/produtos", &cookie))
        .await
        .unwrap();

    // Never an error page: just an empty listing
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Nenhum registro para exibir."));
}

#[tokio::test]
async fn order_detail_and_missing_order() {
    let app = test_app().await;
    let cookie = login(&app, "maria@exemplo.com", "senha123").await;

    let response = app
        .clone()
        .oneshot(get_with_cookie("/orders/ML-2031", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Mercado Livre"));

    let response = app
        .clone()
        .oneshot(get_with_cookie("/orders/XX-0000", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(location.starts_with("/orders?aviso="));
}

#[tokio::test]
async fn register_alias_paths_serve_the_same_form() {
    let app = test_app().await;

    for path in ["/register", "/cadastro"] {
        let response = app.clone().oneshot(get_request(path)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("Criar conta"), "path {path}");
    }
}
