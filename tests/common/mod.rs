#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use tenantctl::api::{ApiClient, HttpTransport};
use tenantctl::session::{MemorySessionStore, Session, SessionStore, UserProfile};

pub const ADMIN_TOKEN: &str = "admin-token";
pub const USER_TOKEN: &str = "user-token";
pub const COMPANY: &str = "test-company";

/// In-process backend speaking the REST dialect the client targets:
/// JWT bearer auth, `X-Company-ID` tenant header, DRF pagination envelope.
/// Each call spawns a fresh instance with its own lead data.
pub struct FixtureBackend {
    pub base_url: String,
    pub port: u16,
}

#[derive(Clone)]
struct AppState {
    leads: Arc<Mutex<Vec<Value>>>,
}

pub async fn spawn() -> Result<FixtureBackend> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let state = AppState { leads: Arc::new(Mutex::new(seed_leads())) };

    let app = Router::new()
        .route("/api/v1/auth/login/", post(login))
        .route("/api/v1/auth/logout/", post(logout))
        .route("/api/v1/auth/profile/", get(profile))
        .route("/api/v1/companies/", get(companies))
        .route("/api/v1/leads/", get(list_leads).post(create_lead))
        .route(
            "/api/v1/leads/:id/",
            get(get_lead).patch(patch_lead).delete(delete_lead),
        )
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind fixture backend")?;
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fixture backend");
    });

    Ok(FixtureBackend { base_url: format!("http://127.0.0.1:{}", port), port })
}

/// Session store pre-authenticated as the superuser.
pub fn admin_store() -> Arc<MemorySessionStore> {
    Arc::new(MemorySessionStore::new(Session {
        user: Some(serde_json::from_value::<UserProfile>(admin_user()).expect("admin profile")),
        access_token: Some(ADMIN_TOKEN.to_string()),
        company: Some(COMPANY.to_string()),
        logged_in_at: None,
    }))
}

/// Session store pre-authenticated as the ordinary (non-superuser) user.
pub fn user_store() -> Arc<MemorySessionStore> {
    Arc::new(MemorySessionStore::new(Session {
        user: Some(serde_json::from_value::<UserProfile>(ordinary_user()).expect("user profile")),
        access_token: Some(USER_TOKEN.to_string()),
        company: Some(COMPANY.to_string()),
        logged_in_at: None,
    }))
}

pub fn client_for(backend: &FixtureBackend, store: Arc<dyn SessionStore>) -> Arc<ApiClient> {
    let transport = Arc::new(HttpTransport::new(5).expect("transport"));
    Arc::new(ApiClient::new(&backend.base_url, "/api/v1", transport, store).expect("client"))
}

// --- fixture data --------------------------------------------------------

const STATUSES: &[(&str, &str)] = &[
    ("new", "Novo"),
    ("contacted", "Contactado"),
    ("qualified", "Qualificado"),
    ("converted", "Convertido"),
    ("lost", "Perdido"),
];

fn seed_leads() -> Vec<Value> {
    (1..=30)
        .map(|i| {
            let (status, label) = STATUSES[i % STATUSES.len()];
            json!({
                "id": format!("lead-{:02}", i),
                "name": format!("Lead {:02}", i),
                "email": format!("lead{:02}@empresa.com.br", i),
                "phone": null,
                "client_company": format!("Empresa {}", i % 3),
                "status": status,
                "status_display": label,
                "notes": null,
                "source": "site",
                "created_at": format!("2024-01-{:02}T10:00:00Z", i),
                "updated_at": format!("2024-01-{:02}T10:00:00Z", i),
            })
        })
        .collect()
}

fn admin_user() -> Value {
    json!({
        "id": "11111111-1111-1111-1111-111111111111",
        "email": "admin@saas.test",
        "first_name": "Admin",
        "last_name": "Root",
        "is_superuser": true,
        "permissions": [],
        "company": null,
    })
}

fn ordinary_user() -> Value {
    json!({
        "id": "22222222-2222-2222-2222-222222222222",
        "email": "user@saas.test",
        "first_name": "Ana",
        "last_name": "Silva",
        "is_superuser": false,
        "permissions": ["leads.view_lead", "leads.add_lead", "leads.change_lead"],
        "company": {
            "id": "33333333-3333-3333-3333-333333333333",
            "name": "Test Company",
            "slug": COMPANY,
            "is_active": true,
        },
    })
}

// --- request guards ------------------------------------------------------

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

fn authenticated(headers: &HeaderMap) -> Result<Value, (StatusCode, Json<Value>)> {
    match bearer(headers).as_deref() {
        Some(ADMIN_TOKEN) => Ok(admin_user()),
        Some(USER_TOKEN) => Ok(ordinary_user()),
        _ => Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "As credenciais de autenticação não foram fornecidas."})),
        )),
    }
}

fn tenant_checked(headers: &HeaderMap) -> Result<(), (StatusCode, Json<Value>)> {
    let slug = headers
        .get("x-company-id")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .unwrap_or("");
    if slug == COMPANY {
        Ok(())
    } else {
        Err((StatusCode::FORBIDDEN, Json(json!({"detail": "Acesso negado"}))))
    }
}

// --- handlers ------------------------------------------------------------

async fn login(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let email = body.get("email").and_then(Value::as_str).unwrap_or("");
    let password = body.get("password").and_then(Value::as_str).unwrap_or("");

    let (user, token) = match (email, password) {
        ("admin@saas.test", "secret") => (admin_user(), ADMIN_TOKEN),
        ("user@saas.test", "secret") => (ordinary_user(), USER_TOKEN),
        _ => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({"error": "Credenciais inválidas."})),
            )
        }
    };

    (
        StatusCode::OK,
        Json(json!({
            "message": "Login realizado com sucesso.",
            "user": user,
            "access": token,
        })),
    )
}

async fn logout(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if let Err(denied) = authenticated(&headers) {
        return denied;
    }
    (StatusCode::OK, Json(json!({"message": "Logout realizado com sucesso."})))
}

async fn profile(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    match authenticated(&headers) {
        Ok(user) => (StatusCode::OK, Json(user)),
        Err(denied) => denied,
    }
}

async fn companies(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if let Err(denied) = authenticated(&headers) {
        return denied;
    }
    // Bare array, no pagination envelope.
    (
        StatusCode::OK,
        Json(json!([
            {
                "id": "33333333-3333-3333-3333-333333333333",
                "name": "Test Company",
                "slug": COMPANY,
                "is_active": true,
            },
            {
                "id": "44444444-4444-4444-4444-444444444444",
                "name": "Other Company",
                "slug": "other-company",
                "is_active": true,
            },
        ])),
    )
}

async fn list_leads(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    if let Err(denied) = authenticated(&headers) {
        return denied;
    }
    if let Err(denied) = tenant_checked(&headers) {
        return denied;
    }

    let mut rows: Vec<Value> = state.leads.lock().unwrap().clone();

    if let Some(status) = params.get("status") {
        rows.retain(|r| r["status"].as_str() == Some(status));
    }
    if let Some(search) = params.get("search") {
        let needle = search.to_lowercase();
        rows.retain(|r| {
            ["name", "email", "client_company"].iter().any(|field| {
                r[*field]
                    .as_str()
                    .map(|v| v.to_lowercase().contains(&needle))
                    .unwrap_or(false)
            })
        });
    }
    if let Some(ordering) = params.get("ordering") {
        let (key, desc) = match ordering.strip_prefix('-') {
            Some(key) => (key.to_string(), true),
            None => (ordering.clone(), false),
        };
        rows.sort_by(|a, b| {
            let a = a[&key].as_str().unwrap_or("");
            let b = b[&key].as_str().unwrap_or("");
            if desc { b.cmp(a) } else { a.cmp(b) }
        });
    }

    let page: usize = params.get("page").and_then(|v| v.parse().ok()).unwrap_or(1);
    let page_size: usize = params
        .get("page_size")
        .and_then(|v| v.parse().ok())
        .unwrap_or(25);
    let count = rows.len();
    let start = (page.max(1) - 1) * page_size;
    let results: Vec<Value> = rows.into_iter().skip(start).take(page_size).collect();

    (
        StatusCode::OK,
        Json(json!({
            "count": count,
            "next": null,
            "previous": null,
            "results": results,
        })),
    )
}

async fn create_lead(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if let Err(denied) = authenticated(&headers) {
        return denied;
    }
    if let Err(denied) = tenant_checked(&headers) {
        return denied;
    }

    let email = body.get("email").and_then(Value::as_str).unwrap_or("");
    if !email.contains('@') {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"email": ["Informe um endereço de email válido."]})),
        );
    }
    // Server-side-only rule, invisible to client validation.
    if email.ends_with("@blocked.test") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"email": ["Este domínio está bloqueado."]})),
        );
    }

    let status = body.get("status").and_then(Value::as_str).unwrap_or("new");
    let label = STATUSES
        .iter()
        .find(|(value, _)| *value == status)
        .map(|(_, label)| *label)
        .unwrap_or("Novo");

    let mut lead = json!({
        "id": uuid::Uuid::new_v4().to_string(),
        "phone": null,
        "client_company": null,
        "status": status,
        "status_display": label,
        "notes": null,
        "source": null,
        "created_at": "2024-06-01T12:00:00Z",
        "updated_at": "2024-06-01T12:00:00Z",
    });
    merge(&mut lead, &body);

    state.leads.lock().unwrap().insert(0, lead.clone());
    (StatusCode::CREATED, Json(lead))
}

async fn get_lead(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    if let Err(denied) = authenticated(&headers) {
        return denied;
    }
    if let Err(denied) = tenant_checked(&headers) {
        return denied;
    }

    let leads = state.leads.lock().unwrap();
    match leads.iter().find(|r| r["id"].as_str() == Some(&id)) {
        Some(lead) => (StatusCode::OK, Json(lead.clone())),
        None => (StatusCode::NOT_FOUND, Json(json!({"detail": "Não encontrado."}))),
    }
}

async fn patch_lead(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if let Err(denied) = authenticated(&headers) {
        return denied;
    }
    if let Err(denied) = tenant_checked(&headers) {
        return denied;
    }

    let mut leads = state.leads.lock().unwrap();
    match leads.iter_mut().find(|r| r["id"].as_str() == Some(&id)) {
        Some(lead) => {
            merge(lead, &body);
            if let Some(status) = lead["status"].as_str() {
                let label = STATUSES
                    .iter()
                    .find(|(value, _)| *value == status)
                    .map(|(_, label)| *label)
                    .unwrap_or("Novo");
                lead["status_display"] = json!(label);
            }
            (StatusCode::OK, Json(lead.clone()))
        }
        None => (StatusCode::NOT_FOUND, Json(json!({"detail": "Não encontrado."}))),
    }
}

async fn delete_lead(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if let Err(denied) = authenticated(&headers) {
        return denied.into_response();
    }
    if let Err(denied) = tenant_checked(&headers) {
        return denied.into_response();
    }

    let mut leads = state.leads.lock().unwrap();
    let before = leads.len();
    leads.retain(|r| r["id"].as_str() != Some(&id));
    if leads.len() < before {
        // Soft delete on the real backend: 204, empty body.
        StatusCode::NO_CONTENT.into_response()
    } else {
        (StatusCode::NOT_FOUND, Json(json!({"detail": "Não encontrado."}))).into_response()
    }
}

fn merge(target: &mut Value, patch: &Value) {
    if let (Some(target), Some(patch)) = (target.as_object_mut(), patch.as_object()) {
        for (key, value) in patch {
            target.insert(key.clone(), value.clone());
        }
    }
}
