//! # API REST
//!
//! REST API implementation for the OT status board.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - Session-token role gating for the staff desk and the public display
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS)
//!
//! Uses `api-shared` for wire types and `otboard-core` for all board behaviour.

#![warn(rust_2018_idioms)]

use axum::{
    extract::{Path as AxumPath, Query, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use api_shared::dto::{
    BannerDto, BoardRes, HealthRes, ListRecordsRes, LoginReq, LoginRes, PatientRecordDto,
    RecentQuery, SessionRes, StaffFormDto, StaffViewRes, TickerRes,
};
use api_shared::{authorise, AccessError, HealthService, SESSION_HEADER};
use otboard_core::constants::{DEFAULT_RECENT_LIMIT, TIP_PLACEHOLDER};
use otboard_core::views::{display, staff};
use otboard_core::{
    AuthFailure, CoreConfig, Role, SessionGate, SharedRecordStore, AUTH_FAILURE_MESSAGE,
};
use otboard_tip::TipCache;

type ApiError = (StatusCode, &'static str);

const ANY_ROLE: &[Role] = &[Role::Staff, Role::Display];
const STAFF_ONLY: &[Role] = &[Role::Staff];

/// Application state shared across REST API handlers
///
/// Holds the resolved configuration, the record store, the session registry and the most
/// recent ticker tip.
#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<CoreConfig>,
    pub store: SharedRecordStore,
    pub sessions: SessionGate,
    pub tips: TipCache,
}

impl AppState {
    pub fn new(cfg: Arc<CoreConfig>, store: SharedRecordStore) -> Self {
        Self {
            cfg,
            store,
            sessions: SessionGate::new(),
            tips: TipCache::new(TIP_PLACEHOLDER),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        login,
        current_session,
        logout,
        list_records,
        recent_records,
        staff_view,
        staff_submit,
        staff_edit,
        staff_delete,
        display_board,
        display_ticker,
    ),
    components(schemas(
        HealthRes,
        LoginReq,
        LoginRes,
        SessionRes,
        PatientRecordDto,
        ListRecordsRes,
        StaffFormDto,
        BannerDto,
        StaffViewRes,
        BoardRes,
        TickerRes,
    ))
)]
pub struct ApiDoc;

/// Builds the full REST router, including Swagger UI and permissive CORS.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/session",
            post(login).get(current_session).delete(logout),
        )
        .route("/records", get(list_records))
        .route("/records/recent", get(recent_records))
        .route("/staff", get(staff_view))
        .route("/staff/records", post(staff_submit))
        .route("/staff/records/:uhid", delete(staff_delete))
        .route("/staff/records/:uhid/edit", get(staff_edit))
        .route("/display/board", get(display_board))
        .route("/display/ticker", get(display_ticker))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers.get(SESSION_HEADER).and_then(|v| v.to_str().ok())
}

fn require_role(state: &AppState, headers: &HeaderMap, allowed: &[Role]) -> Result<Role, ApiError> {
    authorise(&state.sessions, session_token(headers), allowed).map_err(|e| match e {
        AccessError::MissingToken => (StatusCode::UNAUTHORIZED, "Missing x-session-token header"),
        AccessError::UnknownSession => (StatusCode::UNAUTHORIZED, "Session is not active"),
        AccessError::Forbidden(role) => {
            tracing::debug!(role = %role, "role refused");
            (StatusCode::FORBIDDEN, "Role may not use this view")
        }
    })
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    post,
    path = "/session",
    request_body = LoginReq,
    responses(
        (status = 200, description = "Session opened", body = LoginRes),
        (status = 401, description = "Invalid ID or Password")
    )
)]
/// Exchange an identifier/secret pair for a session token
///
/// Every rejected pair gets the same response, whichever field was wrong.
#[axum::debug_handler]
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginReq>,
) -> Result<Json<LoginRes>, ApiError> {
    match state.sessions.login(&req.identifier, &req.secret) {
        Ok(session) => Ok(Json(LoginRes {
            token: session.token,
            role: session.role.as_str().to_string(),
            view_title: session.role.view_title().to_string(),
        })),
        Err(AuthFailure) => Err((StatusCode::UNAUTHORIZED, AUTH_FAILURE_MESSAGE)),
    }
}

#[utoipa::path(
    get,
    path = "/session",
    responses(
        (status = 200, description = "Active session", body = SessionRes),
        (status = 401, description = "No active session")
    )
)]
/// Role of the caller's session
#[axum::debug_handler]
async fn current_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SessionRes>, ApiError> {
    let role = require_role(&state, &headers, ANY_ROLE)?;
    Ok(Json(SessionRes {
        role: role.as_str().to_string(),
        view_title: role.view_title().to_string(),
    }))
}

#[utoipa::path(
    delete,
    path = "/session",
    responses(
        (status = 204, description = "Session closed"),
        (status = 401, description = "No active session")
    )
)]
/// Log out, returning the client to the unauthenticated state
#[axum::debug_handler]
async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<StatusCode, ApiError> {
    require_role(&state, &headers, ANY_ROLE)?;
    if let Some(token) = session_token(&headers) {
        state.sessions.logout(token.trim());
    }
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/records",
    responses(
        (status = 200, description = "All records in storage order", body = ListRecordsRes),
        (status = 401, description = "No active session")
    )
)]
/// List every patient record
#[axum::debug_handler]
async fn list_records(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ListRecordsRes>, ApiError> {
    require_role(&state, &headers, ANY_ROLE)?;
    Ok(Json(ListRecordsRes::new(&state.store.list())))
}

#[utoipa::path(
    get,
    path = "/records/recent",
    params(RecentQuery),
    responses(
        (status = 200, description = "Most recently updated records first", body = ListRecordsRes),
        (status = 401, description = "No active session")
    )
)]
/// Most recently updated records, newest first
#[axum::debug_handler]
async fn recent_records(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<RecentQuery>,
) -> Result<Json<ListRecordsRes>, ApiError> {
    require_role(&state, &headers, ANY_ROLE)?;
    let limit = query.limit.unwrap_or(DEFAULT_RECENT_LIMIT);
    Ok(Json(ListRecordsRes::new(&state.store.recent_updates(limit))))
}

#[utoipa::path(
    get,
    path = "/staff",
    responses(
        (status = 200, description = "Staff desk with empty form", body = StaffViewRes),
        (status = 401, description = "No active session"),
        (status = 403, description = "Not a staff session")
    )
)]
/// Open the staff desk
#[axum::debug_handler]
async fn staff_view(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<StaffViewRes>, ApiError> {
    require_role(&state, &headers, STAFF_ONLY)?;
    Ok(Json(staff::open(&state.store).into()))
}

#[utoipa::path(
    post,
    path = "/staff/records",
    request_body = StaffFormDto,
    responses(
        (status = 200, description = "Record saved; form reset", body = StaffViewRes),
        (status = 400, description = "Unknown status"),
        (status = 422, description = "UHID or name missing; form kept", body = StaffViewRes),
        (status = 500, description = "Internal server error")
    )
)]
/// Submit the status update form
///
/// Creates the record for a new UHID or overwrites the existing one.
#[axum::debug_handler]
async fn staff_submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<StaffFormDto>,
) -> Result<(StatusCode, Json<StaffViewRes>), ApiError> {
    require_role(&state, &headers, STAFF_ONLY)?;

    let form = req.into_form().map_err(|e| {
        tracing::debug!("rejected staff form: {}", e);
        (StatusCode::BAD_REQUEST, "Unknown status")
    })?;

    match staff::submit(&state.store, form) {
        Ok(view) => {
            let accepted = view
                .banner
                .as_ref()
                .map(|b| b.kind == staff::BannerKind::Success)
                .unwrap_or(false);
            let code = if accepted {
                StatusCode::OK
            } else {
                StatusCode::UNPROCESSABLE_ENTITY
            };
            Ok((code, Json(view.into())))
        }
        Err(e) => {
            tracing::error!("Staff submit error: {:?}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Internal error"))
        }
    }
}

#[utoipa::path(
    get,
    path = "/staff/records/{uhid}/edit",
    params(("uhid" = String, Path, description = "UHID of the record, in any case")),
    responses(
        (status = 200, description = "Form prefilled from the record", body = StaffFormDto),
        (status = 404, description = "No such record")
    )
)]
/// Prefill the form from an existing record
#[axum::debug_handler]
async fn staff_edit(
    State(state): State<AppState>,
    headers: HeaderMap,
    AxumPath(uhid): AxumPath<String>,
) -> Result<Json<StaffFormDto>, ApiError> {
    require_role(&state, &headers, STAFF_ONLY)?;
    staff::edit(&state.store, &uhid)
        .map(|form| Json(form.into()))
        .ok_or((StatusCode::NOT_FOUND, "Record not found"))
}

#[utoipa::path(
    delete,
    path = "/staff/records/{uhid}",
    params(("uhid" = String, Path, description = "UHID of the record, in any case")),
    responses(
        (status = 200, description = "Remaining records", body = StaffViewRes),
        (status = 500, description = "Internal server error")
    )
)]
/// Delete a record immediately
///
/// Deleting an unknown UHID succeeds and leaves the records unchanged.
#[axum::debug_handler]
async fn staff_delete(
    State(state): State<AppState>,
    headers: HeaderMap,
    AxumPath(uhid): AxumPath<String>,
) -> Result<Json<StaffViewRes>, ApiError> {
    require_role(&state, &headers, STAFF_ONLY)?;
    match staff::delete(&state.store, &uhid) {
        Ok(view) => Ok(Json(view.into())),
        Err(e) => {
            tracing::error!("Staff delete error: {:?}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Internal error"))
        }
    }
}

#[utoipa::path(
    get,
    path = "/display/board",
    responses(
        (status = 200, description = "Board snapshot for one poll", body = BoardRes),
        (status = 401, description = "No active session")
    )
)]
/// Current board snapshot
///
/// Displays poll this every `refresh_in_secs` seconds.
#[axum::debug_handler]
async fn display_board(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<BoardRes>, ApiError> {
    require_role(&state, &headers, ANY_ROLE)?;
    Ok(Json(
        display::board(&state.store, state.cfg.poll_interval()).into(),
    ))
}

#[utoipa::path(
    get,
    path = "/display/ticker",
    responses(
        (status = 200, description = "Ticker lines and current tip", body = TickerRes),
        (status = 401, description = "No active session")
    )
)]
/// Ticker contents: recent updates, tip and help desk notice
#[axum::debug_handler]
async fn display_ticker(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<TickerRes>, ApiError> {
    require_role(&state, &headers, ANY_ROLE)?;
    Ok(Json(display::ticker(&state.store, &state.tips.get()).into()))
}
