use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Multipart, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use crate::error::AppError;
use crate::roster::{RosterFetcher, RosterTable};
use crate::service::DrawService;
use crate::signups::{NewSignup, SignupStore};
use crate::winners::OutcomeKind;

#[derive(Debug, Deserialize)]
pub struct WinnerParams {
    pub name: Option<String>,
    pub company: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WinnerResponse {
    pub prize: Option<String>,
    pub id: Option<String>,
    pub outcome: OutcomeKind,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct CompaniesResponse {
    pub companies: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Router builder exposing the lucky-draw endpoints.
pub fn draw_router<F, S, T>(service: Arc<DrawService<F, S, T>>) -> Router
where
    F: RosterFetcher + 'static,
    S: SignupStore + 'static,
    T: RosterTable + 'static,
{
    Router::new()
        .route("/winner", get(winner_handler::<F, S, T>))
        .route("/companies", get(companies_handler::<F, S, T>))
        .route("/signup", post(signup_handler::<F, S, T>))
        .route("/export_signups", get(export_handler::<F, S, T>))
        .route("/upload_prizes", post(upload_handler::<F, S, T>))
        .with_state(service)
}

pub(crate) async fn winner_handler<F, S, T>(
    State(service): State<Arc<DrawService<F, S, T>>>,
    Query(params): Query<WinnerParams>,
) -> Result<Json<WinnerResponse>, AppError>
where
    F: RosterFetcher + 'static,
    S: SignupStore + 'static,
    T: RosterTable + 'static,
{
    let name = params
        .name
        .filter(|name| !name.is_empty())
        .ok_or_else(|| AppError::validation("Name is required"))?;

    let outcome = service
        .find_winner(&name, params.company.as_deref())
        .await?;

    Ok(Json(WinnerResponse {
        prize: outcome.legacy_prize().map(str::to_string),
        id: outcome.joined_ids(),
        outcome: outcome.kind(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}

pub(crate) async fn companies_handler<F, S, T>(
    State(service): State<Arc<DrawService<F, S, T>>>,
) -> Json<CompaniesResponse>
where
    F: RosterFetcher + 'static,
    S: SignupStore + 'static,
    T: RosterTable + 'static,
{
    Json(CompaniesResponse {
        companies: service.companies().await,
    })
}

pub(crate) async fn signup_handler<F, S, T>(
    State(service): State<Arc<DrawService<F, S, T>>>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, AppError>
where
    F: RosterFetcher + 'static,
    S: SignupStore + 'static,
    T: RosterTable + 'static,
{
    let Json(request) = payload.map_err(|rejection| {
        AppError::validation(format!("invalid signup payload: {}", rejection.body_text()))
    })?;

    let signup = NewSignup::new(
        request.name.as_deref().unwrap_or_default(),
        request.company.as_deref().unwrap_or_default(),
        request.phone.as_deref(),
    )
    .ok_or_else(|| AppError::validation("Missing fields"))?;

    service.sign_in(signup).await?;
    Ok(Json(json!({ "success": true })))
}

pub(crate) async fn export_handler<F, S, T>(
    State(service): State<Arc<DrawService<F, S, T>>>,
) -> Result<Response, AppError>
where
    F: RosterFetcher + 'static,
    S: SignupStore + 'static,
    T: RosterTable + 'static,
{
    let csv = service.export_signups().await?;
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"signups.csv\"",
            ),
        ],
        csv,
    )
        .into_response())
}

pub(crate) async fn upload_handler<F, S, T>(
    State(service): State<Arc<DrawService<F, S, T>>>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, AppError>
where
    F: RosterFetcher + 'static,
    S: SignupStore + 'static,
    T: RosterTable + 'static,
{
    let mut password = None;
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::validation(format!("malformed upload: {}", err.body_text())))?
    {
        match field.name() {
            Some("password") => {
                let text = field.text().await.map_err(|err| {
                    AppError::validation(format!("malformed password field: {}", err.body_text()))
                })?;
                password = Some(text);
            }
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(|err| {
                    AppError::validation(format!("malformed file field: {}", err.body_text()))
                })?;
                upload = Some((file_name, bytes));
            }
            _ => {}
        }
    }

    if !service.authorize(password.as_deref().unwrap_or_default()) {
        warn!("rejected roster upload with invalid admin password");
        return Err(AppError::Unauthorized);
    }

    let (file_name, bytes) = upload
        .filter(|(_, bytes)| !bytes.is_empty())
        .ok_or_else(|| AppError::validation("No file uploaded"))?;

    let count = service.upload_roster(&file_name, &bytes).await?;
    Ok(Json(json!({
        "message": "Updated successfully",
        "count": count,
    })))
}
