use crate::auth::{require_admin, require_auth, AuthUser};
use crate::entities::{charity_fund, user, CharityFund, FundStatus, User, UserRole};
use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Select, Set,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct FundResponse {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    pub website: String,
    pub contact_email: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub status: FundStatus,
    /// Creator's user id
    pub creator: i64,
    pub creator_username: Option<String>,
    pub rejection_reason: String,
}

impl FundResponse {
    fn from_model(fund: charity_fund::Model, creator: Option<user::Model>) -> Self {
        FundResponse {
            id: fund.id,
            name: fund.name,
            description: fund.description,
            image_url: fund.image_url,
            website: fund.website,
            contact_email: fund.contact_email,
            is_active: fund.is_active,
            created_at: fund.created_at,
            status: fund.status,
            creator: fund.creator_id,
            creator_username: creator.map(|u| u.username),
            rejection_reason: fund.rejection_reason,
        }
    }

    fn with_creator_username(mut self, username: String) -> Self {
        self.creator_username = Some(username);
        self
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateFundRequest {
    name: String,
    description: String,
    image_url: Option<String>,
    #[serde(default)]
    website: String,
    #[serde(default)]
    contact_email: String,
    #[serde(default = "default_true")]
    is_active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateFundRequest {
    name: Option<String>,
    description: Option<String>,
    image_url: Option<String>,
    website: Option<String>,
    contact_email: Option<String>,
    is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RejectFundRequest {
    /// Why the fund was turned down; stored and shown to the creator
    #[serde(default)]
    reason: String,
}

/// Role-scoped fund visibility: admins see everything, fund creators see
/// their own funds plus all approved ones, everyone else only approved and
/// active funds.
fn visible_funds(viewer: Option<&AuthUser>) -> Select<CharityFund> {
    match viewer {
        Some(u) if u.role == UserRole::Admin => CharityFund::find(),
        Some(u) if u.role == UserRole::FundCreator => CharityFund::find().filter(
            Condition::any()
                .add(charity_fund::Column::CreatorId.eq(u.user_id))
                .add(charity_fund::Column::Status.eq(FundStatus::Approved)),
        ),
        _ => CharityFund::find()
            .filter(charity_fund::Column::Status.eq(FundStatus::Approved))
            .filter(charity_fund::Column::IsActive.eq(true)),
    }
}

/// List charity funds visible to the caller
#[utoipa::path(
    get,
    path = "/api/funds",
    responses(
        (status = 200, description = "Funds visible to the caller", body = [FundResponse])
    )
)]
pub async fn list_funds(
    State(state): State<AppState>,
    Extension(auth): Extension<Option<AuthUser>>,
) -> Result<impl IntoResponse, AppError> {
    let funds = visible_funds(auth.as_ref())
        .find_also_related(User)
        .order_by_desc(charity_fund::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let body: Vec<FundResponse> = funds
        .into_iter()
        .map(|(fund, creator)| FundResponse::from_model(fund, creator))
        .collect();
    Ok(Json(body))
}

/// Fetch a single fund, subject to the same visibility rules as the list
#[utoipa::path(
    get,
    path = "/api/funds/{id}",
    params(("id" = i64, Path, description = "Fund id")),
    responses(
        (status = 200, description = "The fund", body = FundResponse),
        (status = 404, description = "Unknown or not visible to the caller")
    )
)]
pub async fn get_fund(
    State(state): State<AppState>,
    Extension(auth): Extension<Option<AuthUser>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let found = visible_funds(auth.as_ref())
        .filter(charity_fund::Column::Id.eq(id))
        .find_also_related(User)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Fund not found".to_string()))?;

    Ok(Json(FundResponse::from_model(found.0, found.1)))
}

/// Submit a new charity fund; it starts in pending status
#[utoipa::path(
    post,
    path = "/api/funds",
    request_body = CreateFundRequest,
    responses(
        (status = 201, description = "Fund submitted for review", body = FundResponse),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, auth, payload))]
pub async fn create_fund(
    State(state): State<AppState>,
    Extension(auth): Extension<Option<AuthUser>>,
    Json(payload): Json<CreateFundRequest>,
) -> Result<impl IntoResponse, AppError> {
    let auth = require_auth(auth.as_ref())?;

    if payload.name.trim().is_empty() {
        return Err(AppError::validation("name", "Fund name is required"));
    }
    if payload.description.trim().is_empty() {
        return Err(AppError::validation("description", "Fund description is required"));
    }

    let fund = charity_fund::ActiveModel {
        name: Set(payload.name),
        description: Set(payload.description),
        image_url: Set(payload.image_url),
        website: Set(payload.website),
        contact_email: Set(payload.contact_email),
        creator_id: Set(auth.user_id),
        // The caller never picks the status; every new fund awaits review
        status: Set(FundStatus::Pending),
        rejection_reason: Set(String::new()),
        is_active: Set(payload.is_active),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
        ..Default::default()
    };
    let created = fund.insert(&state.db).await?;

    let username = auth.username.clone();
    Ok((
        StatusCode::CREATED,
        Json(FundResponse::from_model(created, None).with_creator_username(username)),
    ))
}

/// Update a fund's own details; only the creator may do this
#[utoipa::path(
    put,
    path = "/api/funds/{id}",
    params(("id" = i64, Path, description = "Fund id")),
    request_body = UpdateFundRequest,
    responses(
        (status = 200, description = "Updated fund", body = FundResponse),
        (status = 403, description = "Caller does not own the fund"),
        (status = 404, description = "Unknown fund")
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, auth, payload))]
pub async fn update_fund(
    State(state): State<AppState>,
    Extension(auth): Extension<Option<AuthUser>>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateFundRequest>,
) -> Result<impl IntoResponse, AppError> {
    let auth = require_auth(auth.as_ref())?;

    let fund = CharityFund::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Fund not found".to_string()))?;

    if fund.creator_id != auth.user_id {
        return Err(AppError::Forbidden("You are not the owner of this fund".to_string()));
    }

    let mut active: charity_fund::ActiveModel = fund.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(image_url) = payload.image_url {
        active.image_url = Set(Some(image_url));
    }
    if let Some(website) = payload.website {
        active.website = Set(website);
    }
    if let Some(contact_email) = payload.contact_email {
        active.contact_email = Set(contact_email);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    active.updated_at = Set(Utc::now());

    let updated = active.update(&state.db).await?;
    let username = auth.username.clone();
    Ok(Json(FundResponse::from_model(updated, None).with_creator_username(username)))
}

/// Delete a fund; only the creator may do this
#[utoipa::path(
    delete,
    path = "/api/funds/{id}",
    params(("id" = i64, Path, description = "Fund id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Caller does not own the fund"),
        (status = 404, description = "Unknown fund")
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, auth))]
pub async fn delete_fund(
    State(state): State<AppState>,
    Extension(auth): Extension<Option<AuthUser>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let auth = require_auth(auth.as_ref())?;

    let fund = CharityFund::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Fund not found".to_string()))?;

    if fund.creator_id != auth.user_id {
        return Err(AppError::Forbidden("You are not the owner of this fund".to_string()));
    }

    let active: charity_fund::ActiveModel = fund.into();
    active.delete(&state.db).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Approve a pending fund (admin only)
#[utoipa::path(
    post,
    path = "/api/funds/{id}/approve",
    params(("id" = i64, Path, description = "Fund id")),
    responses(
        (status = 200, description = "Fund approved"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Unknown fund")
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, auth))]
pub async fn approve_fund(
    State(state): State<AppState>,
    Extension(auth): Extension<Option<AuthUser>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    require_admin(auth.as_ref())?;

    let fund = CharityFund::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Fund not found".to_string()))?;

    let name = fund.name.clone();
    let mut active: charity_fund::ActiveModel = fund.into();
    active.status = Set(FundStatus::Approved);
    active.updated_at = Set(Utc::now());
    active.update(&state.db).await?;

    tracing::info!("Fund '{}' approved", name);
    Ok(Json(json!({ "status": "fund approved" })))
}

/// Reject a pending fund with an optional reason (admin only)
#[utoipa::path(
    post,
    path = "/api/funds/{id}/reject",
    params(("id" = i64, Path, description = "Fund id")),
    request_body = RejectFundRequest,
    responses(
        (status = 200, description = "Fund rejected"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Unknown fund")
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, auth, payload))]
pub async fn reject_fund(
    State(state): State<AppState>,
    Extension(auth): Extension<Option<AuthUser>>,
    Path(id): Path<i64>,
    payload: Option<Json<RejectFundRequest>>,
) -> Result<impl IntoResponse, AppError> {
    require_admin(auth.as_ref())?;

    let fund = CharityFund::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Fund not found".to_string()))?;

    let reason = payload.map(|Json(p)| p.reason).unwrap_or_default();

    let mut active: charity_fund::ActiveModel = fund.into();
    active.status = Set(FundStatus::Rejected);
    active.rejection_reason = Set(reason);
    active.updated_at = Set(Utc::now());
    active.update(&state.db).await?;

    Ok(Json(json!({ "status": "fund rejected" })))
}

/// Funds created by the current user, newest first
#[utoipa::path(
    get,
    path = "/api/my-funds",
    responses(
        (status = 200, description = "Caller's funds", body = [FundResponse]),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn my_funds(
    State(state): State<AppState>,
    Extension(auth): Extension<Option<AuthUser>>,
) -> Result<impl IntoResponse, AppError> {
    let auth = require_auth(auth.as_ref())?;

    let funds = CharityFund::find()
        .filter(charity_fund::Column::CreatorId.eq(auth.user_id))
        .find_also_related(User)
        .order_by_desc(charity_fund::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let body: Vec<FundResponse> = funds
        .into_iter()
        .map(|(fund, creator)| FundResponse::from_model(fund, creator))
        .collect();
    Ok(Json(body))
}

/// Funds awaiting review, newest first (admin only)
#[utoipa::path(
    get,
    path = "/api/admin/pending-funds",
    responses(
        (status = 200, description = "Pending funds", body = [FundResponse]),
        (status = 403, description = "Admin role required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn pending_funds(
    State(state): State<AppState>,
    Extension(auth): Extension<Option<AuthUser>>,
) -> Result<impl IntoResponse, AppError> {
    require_admin(auth.as_ref())?;

    let funds = CharityFund::find()
        .filter(charity_fund::Column::Status.eq(FundStatus::Pending))
        .find_also_related(User)
        .order_by_desc(charity_fund::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let body: Vec<FundResponse> = funds
        .into_iter()
        .map(|(fund, creator)| FundResponse::from_model(fund, creator))
        .collect();
    Ok(Json(body))
}
