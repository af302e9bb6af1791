//! HTTP route handlers for the dashboard.
//!
//! Public routes cover login, registration and logout; everything else sits
//! behind [`require_session`], the auth-gate middleware layered over the
//! protected sub-router. Unauthenticated requests never reach a protected
//! handler — they are redirected to the login page with a warning.

use crate::listing::{self, TableSpec, list_rows};
use crate::orders::OrderStore;
use crate::sessions::{SESSION_COOKIE, SessionRecord, SessionStore, cookie_value, verify_cookie};
use crate::supabase::TableFetcher;
use crate::templates::*;
use crate::users::{RegisterError, UserStore};
use askama::Template;
use axum::{
    Extension, Form, Router,
    extract::{Path, Query, Request, State},
    http::{StatusCode, header},
    middleware::{self, Next},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::error;

/// State shared by all routes
pub struct AppState {
    /// User accounts
    pub users: UserStore,
    /// Server-side sessions
    pub sessions: SessionStore,
    /// External table fetcher (Supabase in production, stub in tests)
    pub fetcher: Arc<dyn TableFetcher>,
    /// Demo order data
    pub orders: OrderStore,
    /// Cookie-signing key
    pub secret_key: String,
    /// Session lifetime, echoed into the cookie Max-Age
    pub session_timeout_secs: u64,
}

/// Build the complete router.
pub fn build_router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/dashboard", get(dashboard))
        .route("/orders", get(orders_page))
        .route("/orders/{id}", get(order_detail))
        .route("/shipping", get(shipping_page))
        .route("/reports", get(reports_page))
        .route("/settings", get(settings_page))
        .route("/clientes", get(clientes_page))
        .route("/produtos", get(produtos_page))
        .route("/motoristas", get(motoristas_page))
        .route("/veiculos", get(veiculos_page))
        .route("/entregas", get(entregas_page))
        .route("/itens", get(itens_page))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    Router::new()
        .route("/", get(home))
        .route("/login", get(login_page).post(login_submit))
        .route("/register", get(cadastro_page).post(cadastro_submit))
        .route("/cadastro", get(cadastro_page).post(cadastro_submit))
        .route("/logout", get(logout))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Auth gate: resolve the session cookie or short-circuit to the login page.
///
/// A missing cookie, a bad signature and an unknown/expired session all
/// behave identically. On success the session record is stored as a request
/// extension for handlers to extract.
async fn require_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    match resolve_session(&state, &jar).await {
        Some(session) => {
            req.extensions_mut().insert(session);
            next.run(req).await
        }
        None => redirect_with_aviso("/login", "Faça login para acessar esta página."),
    }
}

/// Look up the session referenced by the request's cookie, if any.
async fn resolve_session(state: &AppState, jar: &CookieJar) -> Option<SessionRecord> {
    let cookie = jar.get(SESSION_COOKIE)?.value().to_string();
    let session_id = verify_cookie(&cookie, &state.secret_key)?;
    state.sessions.load_session(&session_id).await.ok()?
}

/// Redirect carrying a user-visible warning as a query parameter.
fn redirect_with_aviso(path: &str, msg: &str) -> Response {
    Redirect::to(&format!("{path}?aviso={}", urlencoding::encode(msg))).into_response()
}

/// Render a template to an HTML response.
fn render<T: Template>(template: T) -> Response {
    Html(
        template
            .render()
            .unwrap_or_else(|e| format!("Template error: {e}")),
    )
    .into_response()
}

/// Flash-style warning passed between redirects.
#[derive(Deserialize)]
struct FlashQuery {
    aviso: Option<String>,
}

// ── Public routes ───────────────────────────────────────────────────

/// GET / — everything starts at the login page.
async fn home() -> Redirect {
    Redirect::to("/login")
}

/// Login page handler.
async fn login_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FlashQuery>,
    jar: CookieJar,
) -> Response {
    // If already logged in, go straight to the dashboard
    if resolve_session(&state, &jar).await.is_some() {
        return Redirect::to("/dashboard").into_response();
    }

    render(LoginTemplate {
        error: None,
        aviso: query.aviso,
    })
}

/// Login form data.
#[derive(Deserialize)]
struct LoginForm {
    email: String,
    password: String,
}

/// Login form submission handler.
async fn login_submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Response {
    let user = match state.users.authenticate(&form.email, &form.password).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            // One message for unknown email and wrong password alike
            return render(LoginTemplate {
                error: Some("Login inválido. Verifique seu e-mail e senha.".to_string()),
                aviso: None,
            });
        }
        Err(e) => {
            error!("Login error: {}", e);
            return render(LoginTemplate {
                error: Some("Ocorreu um erro. Tente novamente.".to_string()),
                aviso: None,
            });
        }
    };

    let session_id = match state.sessions.create_session(&user).await {
        Ok(id) => id,
        Err(e) => {
            error!("Failed to create session: {}", e);
            return render(LoginTemplate {
                error: Some("Ocorreu um erro. Tente novamente.".to_string()),
                aviso: None,
            });
        }
    };

    let cookie = format!(
        "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Strict; Max-Age={}",
        cookie_value(&session_id, &state.secret_key),
        state.session_timeout_secs,
    );

    Response::builder()
        .status(StatusCode::SEE_OTHER)
        .header(header::LOCATION, "/dashboard")
        .header(header::SET_COOKIE, cookie)
        .body(axum::body::Body::empty())
        .unwrap()
}

/// Registration page handler.
async fn cadastro_page() -> Response {
    render(CadastroTemplate { error: None })
}

/// Registration form data.
#[derive(Deserialize)]
struct CadastroForm {
    full_name: String,
    email: String,
    password: String,
    confirm_password: String,
}

/// Registration form submission handler.
async fn cadastro_submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<CadastroForm>,
) -> Response {
    match state
        .users
        .register(
            &form.full_name,
            &form.email,
            &form.password,
            &form.confirm_password,
        )
        .await
    {
        Ok(user) => redirect_with_aviso(
            "/login",
            &format!("Conta criada para {}! Faça login.", user.full_name),
        ),
        Err(e @ (RegisterError::Validation(_) | RegisterError::DuplicateEmail)) => {
            render(CadastroTemplate {
                error: Some(e.to_string()),
            })
        }
        Err(RegisterError::Storage(e)) => {
            error!("Registration error: {}", e);
            render(CadastroTemplate {
                error: Some("Ocorreu um erro. Tente novamente.".to_string()),
            })
        }
    }
}

/// Logout handler.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    // Delete the session from the database, if the cookie checks out
    if let Some(session) = resolve_session(&state, &jar).await
        && let Err(e) = state.sessions.destroy_session(&session.session_id).await
    {
        error!("Failed to delete session: {}", e);
    }

    // Clear cookie by setting it to expire in the past
    let cookie = format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0");

    Response::builder()
        .status(StatusCode::SEE_OTHER)
        .header(header::LOCATION, "/login")
        .header(header::SET_COOKIE, cookie)
        .body(axum::body::Body::empty())
        .unwrap()
}

// ── Protected routes ────────────────────────────────────────────────

fn base(session: &SessionRecord) -> BaseContext {
    BaseContext {
        email: session.user_email.clone(),
    }
}

/// Dashboard handler.
async fn dashboard(Extension(session): Extension<SessionRecord>) -> Response {
    render(DashboardTemplate {
        base: base(&session),
    })
}

/// Demo order list.
async fn orders_page(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionRecord>,
    Query(query): Query<FlashQuery>,
) -> Response {
    let orders = state.orders.list().into_iter().cloned().collect();
    render(PedidosTemplate {
        base: base(&session),
        orders,
        aviso: query.aviso,
    })
}

/// Demo order detail.
async fn order_detail(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionRecord>,
    Path(id): Path<String>,
) -> Response {
    match state.orders.get(&id) {
        Some(order) => render(PedidoDetalheTemplate {
            base: base(&session),
            order: order.clone(),
        }),
        None => redirect_with_aviso("/orders", &format!("Pedido {id} não encontrado.")),
    }
}

async fn shipping_page(Extension(session): Extension<SessionRecord>) -> Response {
    render(EnviosTemplate {
        base: base(&session),
    })
}

async fn reports_page(Extension(session): Extension<SessionRecord>) -> Response {
    render(RelatoriosTemplate {
        base: base(&session),
    })
}

async fn settings_page(Extension(session): Extension<SessionRecord>) -> Response {
    render(ConfiguracoesTemplate {
        base: base(&session),
    })
}

/// Shared handler body for the six external-table pages.
async fn listing_page(state: &AppState, session: &SessionRecord, spec: &TableSpec) -> Response {
    let rows = list_rows(state.fetcher.as_ref(), spec).await;
    render(TabelaTemplate {
        base: base(session),
        title: spec.title,
        headers: spec.headers(),
        rows,
    })
}

async fn clientes_page(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionRecord>,
) -> Response {
    listing_page(&state, &session, &listing::CLIENTES).await
}

async fn produtos_page(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionRecord>,
) -> Response {
    listing_page(&state, &session, &listing::PRODUTOS).await
}

async fn motoristas_page(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionRecord>,
) -> Response {
    listing_page(&state, &session, &listing::MOTORISTAS).await
}

async fn veiculos_page(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionRecord>,
) -> Response {
    listing_page(&state, &session, &listing::VEICULOS).await
}

async fn entregas_page(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionRecord>,
) -> Response {
    listing_page(&state, &session, &listing::ENTREGAS).await
}

async fn itens_page(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionRecord>,
) -> Response {
    listing_page(&state, &session, &listing::ITENS_ENTREGA).await
}
