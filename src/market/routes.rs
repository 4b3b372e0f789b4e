//! HTTP routes for the listings/booking API

use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    http::{header::CONTENT_TYPE, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info, warn};

use super::error::MarketError;
use super::models::{
    BookingId, BookingQuery, BookingView, Listing, ListingId, LoginRequest, NewBooking, NewListing,
    RegisterRequest, Role,
};
use super::password::PasswordHasher;
use super::store::MarketStore;
use crate::config::ServerConfig;
use crate::metrics::Metrics;

pub struct AppState {
    pub store: MarketStore,
    pub hasher: PasswordHasher,
    pub metrics: Arc<Metrics>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(store: MarketStore, hasher: PasswordHasher, metrics: Arc<Metrics>) -> SharedState {
        let state = Arc::new(Self { store, hasher, metrics });
        state.sync_gauges();
        state
    }

    /// Copy table sizes into the metrics gauges
    pub fn sync_gauges(&self) {
        match self.store.counts() {
            Ok(counts) => {
                self.metrics.users_total.store(counts.users as u64, Ordering::Relaxed);
                self.metrics.listings_total.store(counts.listings as u64, Ordering::Relaxed);
                self.metrics.bookings_total.store(counts.bookings as u64, Ordering::Relaxed);
            }
            Err(e) => warn!("Failed to read table sizes: {}", e),
        }
    }
}

pub fn router(state: SharedState, config: &ServerConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(config.cors_max_age);

    Router::new()
        .route("/api/register", post(register_handler))
        .route("/api/login", post(login_handler))
        .route("/api/listings", get(listings_handler).post(create_listing_handler))
        .route("/api/listings/{id}", get(listing_handler).delete(delete_listing_handler))
        .route("/api/bookings", get(bookings_handler).post(create_booking_handler))
        .route("/api/bookings/{id}", delete(delete_booking_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/metrics/json", get(metrics_json_handler))
        .layer(middleware::from_fn_with_state(state.clone(), track_requests))
        .layer(cors)
        .with_state(state)
}

async fn track_requests(State(state): State<SharedState>, request: Request, next: Next) -> Response {
    state.metrics.http_requests.fetch_add(1, Ordering::Relaxed);

    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let response = next.run(request).await;

    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        state.metrics.http_errors.fetch_add(1, Ordering::Relaxed);
    }
    debug!(%method, path = %path, status = status.as_u16(), "request");
    response
}

/// Run blocking work (PBKDF2, SQLite) off the async workers
async fn blocking<T, F>(f: F) -> Result<T, MarketError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| MarketError::Internal(format!("blocking task failed: {e}")))
}

/// Run a store operation on the blocking pool
async fn with_store<T, F>(state: &SharedState, f: F) -> Result<T, MarketError>
where
    F: FnOnce(&MarketStore) -> Result<T, MarketError> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    blocking(move || f(&state.store)).await?
}

fn success() -> Json<Value> {
    Json(json!({ "success": true }))
}

pub async fn register_handler(
    State(state): State<SharedState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), MarketError> {
    let (Some(email), Some(password)) = (payload.email, payload.password) else {
        return Err(MarketError::MissingFields);
    };
    let email = email.trim().to_string();
    if email.is_empty() || password.is_empty() {
        return Err(MarketError::MissingFields);
    }

    let lookup = email.clone();
    if with_store(&state, move |store| store.has_user(&lookup)).await? {
        return Err(MarketError::DuplicateUser);
    }

    let role = Role::parse_lenient(payload.role.as_deref());
    let hasher = state.hasher.clone();
    let password_hash = blocking(move || hasher.hash(&password)).await??;

    let user = with_store(&state, move |store| store.insert_user(&email, password_hash, role)).await?;
    state.sync_gauges();
    info!(user = user.id, role = ?user.role, "User registered");

    Ok((StatusCode::CREATED, success()))
}

pub async fn login_handler(
    State(state): State<SharedState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Value>, MarketError> {
    let email = payload.email.trim().to_string();
    let user = with_store(&state, move |store| store.user_by_email(&email))
        .await?
        .ok_or(MarketError::InvalidCredentials)?;

    let hasher = state.hasher.clone();
    let stored = user.password_hash.clone();
    let password = payload.password;
    let valid = blocking(move || hasher.verify(&password, &stored)).await?;
    if !valid {
        return Err(MarketError::InvalidCredentials);
    }

    debug!(user = user.id, "Login");
    Ok(Json(json!({ "user": user.public() })))
}

pub async fn listings_handler(State(state): State<SharedState>) -> Result<Json<Vec<Listing>>, MarketError> {
    with_store(&state, |store| store.listings()).await.map(Json)
}

pub async fn listing_handler(
    State(state): State<SharedState>,
    Path(id): Path<ListingId>,
) -> Result<Json<Listing>, MarketError> {
    with_store(&state, move |store| store.listing(id))
        .await?
        .map(Json)
        .ok_or(MarketError::ListingNotFound)
}

pub async fn create_listing_handler(
    State(state): State<SharedState>,
    Json(payload): Json<NewListing>,
) -> Result<(StatusCode, Json<Value>), MarketError> {
    let id = with_store(&state, move |store| store.create_listing(payload)).await?;
    state.sync_gauges();
    info!(listing = id, "Listing created");
    Ok((StatusCode::CREATED, Json(json!({ "id": id, "success": true }))))
}

pub async fn delete_listing_handler(
    State(state): State<SharedState>,
    Path(id): Path<ListingId>,
) -> Result<Json<Value>, MarketError> {
    let removed = with_store(&state, move |store| store.delete_listing(id)).await?;
    state.sync_gauges();
    info!(listing = id, bookings_removed = removed, "Listing deleted");
    Ok(success())
}

pub async fn create_booking_handler(
    State(state): State<SharedState>,
    Json(payload): Json<NewBooking>,
) -> Result<(StatusCode, Json<Value>), MarketError> {
    let id = with_store(&state, move |store| store.create_booking(payload)).await?;
    state.sync_gauges();
    info!(booking = id, "Booking created");
    Ok((StatusCode::CREATED, Json(json!({ "id": id, "success": true }))))
}

pub async fn bookings_handler(
    State(state): State<SharedState>,
    Query(query): Query<BookingQuery>,
) -> Result<Json<Vec<BookingView>>, MarketError> {
    let role = Role::parse_lenient(query.role.as_deref());
    with_store(&state, move |store| store.bookings_for(query.email.as_deref(), role))
        .await
        .map(Json)
}

pub async fn delete_booking_handler(
    State(state): State<SharedState>,
    Path(id): Path<BookingId>,
) -> Result<Json<Value>, MarketError> {
    if with_store(&state, move |store| store.delete_booking(id)).await? {
        state.sync_gauges();
        info!(booking = id, "Booking deleted");
    }
    Ok(success())
}

pub async fn health_handler(State(state): State<SharedState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "uptime_seconds": state.metrics.uptime_seconds(),
    }))
}

pub async fn metrics_handler(State(state): State<SharedState>) -> impl IntoResponse {
    state.sync_gauges();
    (
        [(CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        state.metrics.to_prometheus(),
    )
}

pub async fn metrics_json_handler(State(state): State<SharedState>) -> Json<Value> {
    state.sync_gauges();
    Json(state.metrics.to_json())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::seed::seed_demo_data;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request as HttpRequest};
    use tower::ServiceExt;

    fn state() -> SharedState {
        AppState::new(
            MarketStore::open_in_memory().unwrap(),
            PasswordHasher::new(1_000),
            Arc::new(Metrics::new()),
        )
    }

    fn seeded() -> SharedState {
        let state = state();
        seed_demo_data(&state.store, &state.hasher).unwrap();
        state.sync_gauges();
        state
    }

    fn register_body(email: &str, password: &str, role: &str) -> RegisterRequest {
        RegisterRequest {
            email: Some(email.into()),
            password: Some(password.into()),
            role: Some(role.into()),
        }
    }

    fn login_body(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.into(),
            password: password.into(),
        }
    }

    fn new_booking(listing_id: Option<ListingId>, email: Option<&str>) -> NewBooking {
        NewBooking {
            listing_id,
            user_email: email.map(Into::into),
            date: Some("2025-08-14".into()),
        }
    }

    fn admin_query() -> BookingQuery {
        BookingQuery {
            email: None,
            role: Some("admin".into()),
        }
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let state = state();

        let (status, body) =
            register_handler(State(state.clone()), Json(register_body("new@vu.lt", "pw", "host")))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body.0["success"], true);

        let Json(body) = login_handler(State(state.clone()), Json(login_body("new@vu.lt", "pw")))
            .await
            .unwrap();
        assert_eq!(body["user"]["email"], "new@vu.lt");
        assert_eq!(body["user"]["role"], "host");
        assert!(body["user"].get("password").is_none());
        assert_eq!(state.metrics.users_total.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_register_duplicate_is_conflict() {
        let state = seeded();
        let err = register_handler(State(state), Json(register_body("guest@vu.lt", "x", "guest")))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_register_missing_fields() {
        let state = state();
        let payload = RegisterRequest {
            email: Some("a@vu.lt".into()),
            ..RegisterRequest::default()
        };
        let err = register_handler(State(state), Json(payload)).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login_wrong_password_and_unknown_user() {
        let state = seeded();

        let err = login_handler(State(state.clone()), Json(login_body("admin@vu.lt", "nope")))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);

        let err = login_handler(State(state), Json(login_body("ghost@vu.lt", "123")))
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_seeded_login() {
        let state = seeded();
        let Json(body) = login_handler(State(state), Json(login_body("admin@vu.lt", "123")))
            .await
            .unwrap();
        assert_eq!(body["user"]["role"], "admin");
    }

    #[tokio::test]
    async fn test_listing_crud() {
        let state = state();
        let payload: NewListing =
            serde_json::from_value(json!({"title": "Cabin", "price": 85, "host_email": "host@vu.lt"})).unwrap();

        let (status, Json(body)) = create_listing_handler(State(state.clone()), Json(payload))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        let id = body["id"].as_u64().unwrap();

        let Json(listing) = listing_handler(State(state.clone()), Path(id)).await.unwrap();
        assert_eq!(listing.title, "Cabin");

        let Json(all) = listings_handler(State(state.clone())).await.unwrap();
        assert_eq!(all.len(), 1);

        let Json(body) = delete_listing_handler(State(state.clone()), Path(id)).await.unwrap();
        assert_eq!(body["success"], true);

        let err = listing_handler(State(state), Path(id)).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_booking_validation() {
        let state = seeded();

        let err = create_booking_handler(State(state.clone()), Json(new_booking(None, Some("guest@vu.lt"))))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);

        let err = create_booking_handler(State(state.clone()), Json(new_booking(Some(1), None)))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);

        let err = create_booking_handler(State(state), Json(new_booking(Some(99), Some("guest@vu.lt"))))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_bookings_visibility_by_role() {
        let state = seeded();
        let (status, _) =
            create_booking_handler(State(state.clone()), Json(new_booking(Some(1), Some("guest@vu.lt"))))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);

        let query = |email: &str, role: &str| BookingQuery {
            email: Some(email.into()),
            role: Some(role.into()),
        };
        let visible = |q: BookingQuery| {
            let state = state.clone();
            async move { bookings_handler(State(state), Query(q)).await.unwrap().0 }
        };

        let admin = visible(query("admin@vu.lt", "admin")).await;
        let host = visible(query("host@vu.lt", "host")).await;
        let guest = visible(query("guest@vu.lt", "guest")).await;
        let other = visible(query("other@vu.lt", "guest")).await;

        assert_eq!(admin.len(), 1);
        assert_eq!(host.len(), 1);
        assert_eq!(guest.len(), 1);
        assert!(other.is_empty());
        assert_eq!(guest[0].title, "Prabangus loftas senamiestyje");
        assert_eq!(guest[0].price, 120.0);
    }

    #[tokio::test]
    async fn test_delete_listing_removes_its_bookings() {
        let state = seeded();
        create_booking_handler(State(state.clone()), Json(new_booking(Some(2), Some("guest@vu.lt"))))
            .await
            .unwrap();
        assert_eq!(state.metrics.bookings_total.load(Ordering::Relaxed), 1);

        delete_listing_handler(State(state.clone()), Path(2)).await.unwrap();

        let Json(all) = bookings_handler(State(state.clone()), Query(admin_query())).await.unwrap();
        assert!(all.is_empty());
        assert_eq!(state.metrics.bookings_total.load(Ordering::Relaxed), 0);
        assert_eq!(state.metrics.listings_total.load(Ordering::Relaxed), 3);
    }

    #[tokio::test]
    async fn test_delete_booking_is_idempotent() {
        let state = seeded();
        let Json(body) = delete_booking_handler(State(state), Path(77)).await.unwrap();
        assert_eq!(body["success"], true);
    }

    #[tokio::test]
    async fn test_metrics_endpoints() {
        let state = seeded();

        let Json(json) = metrics_json_handler(State(state.clone())).await;
        assert_eq!(json["market"]["listings"], 4);
        assert_eq!(json["market"]["users"], 3);

        let response = metrics_handler(State(state.clone())).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let Json(health) = health_handler(State(state)).await;
        assert_eq!(health["status"], "ok");
    }

    #[tokio::test]
    async fn test_router_get_listing_by_id() {
        let state = seeded();
        let app = router(state.clone(), &ServerConfig::default());

        let response = app
            .clone()
            .oneshot(HttpRequest::get("/api/listings/1").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["id"], 1);
        assert_eq!(body["host_email"], "host@vu.lt");

        let response = app
            .oneshot(HttpRequest::get("/api/listings/999").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_json(response).await["error"].is_string());

        assert_eq!(state.metrics.http_requests.load(Ordering::Relaxed), 2);
        assert_eq!(state.metrics.http_errors.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_router_booking_rejects_malformed_body() {
        let state = seeded();
        let app = router(state.clone(), &ServerConfig::default());

        let response = app
            .clone()
            .oneshot(
                HttpRequest::post("/api/bookings")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{\"listing_id\": 1,"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(
                HttpRequest::post("/api/bookings")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"listing_id": 1, "user_email": "guest@vu.lt", "date": "2025-09-01"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["success"], true);

        let Json(all) = bookings_handler(State(state.clone()), Query(admin_query())).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(state.metrics.http_requests.load(Ordering::Relaxed), 2);
    }

    #[tokio::test]
    async fn test_router_bookings_query_and_delete() {
        let state = seeded();
        let app = router(state.clone(), &ServerConfig::default());
        create_booking_handler(State(state.clone()), Json(new_booking(Some(3), Some("guest@vu.lt"))))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(
                HttpRequest::get("/api/bookings?email=host@vu.lt&role=host")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["status"], "confirmed");

        let response = app
            .oneshot(HttpRequest::delete("/api/bookings/1").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(state.metrics.bookings_total.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn test_router_cors_preflight() {
        let app = router(state(), &ServerConfig::default());

        let response = app
            .oneshot(
                HttpRequest::options("/api/listings")
                    .header(header::ORIGIN, "http://localhost:5173")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response.status().is_success());
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }
}
