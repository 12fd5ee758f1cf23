use crate::auth::{require_fund_creator, AuthUser};
use crate::entities::{
    charity_fund, fundraiser, CharityFund, Fundraiser, FundraiserStatus,
};
use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Serialize, ToSchema)]
pub struct FundraiserResponse {
    pub id: i64,
    /// Owning fund's id
    pub fund: i64,
    pub fund_name: Option<String>,
    pub title: String,
    pub description: String,
    pub goal_amount: f64,
    pub current_amount: f64,
    /// Collected share of the goal, clamped to [0, 100]
    pub progress_percentage: f64,
    pub image_url: Option<String>,
    pub status: FundraiserStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl FundraiserResponse {
    fn from_model(model: fundraiser::Model, fund: Option<charity_fund::Model>) -> Self {
        let progress_percentage = model.progress_percentage();
        FundraiserResponse {
            id: model.id,
            fund: model.fund_id,
            fund_name: fund.map(|f| f.name),
            title: model.title,
            description: model.description,
            goal_amount: model.goal_amount,
            current_amount: model.current_amount,
            progress_percentage,
            image_url: model.image_url,
            status: model.status,
            start_date: model.start_date,
            end_date: model.end_date,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FundraiserListQuery {
    /// Restrict to a single fund's fundraisers
    #[param(required = false)]
    fund: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateFundraiserRequest {
    /// Fund the fundraiser belongs to; must be owned by the caller
    fund: i64,
    title: String,
    description: String,
    goal_amount: f64,
    image_url: Option<String>,
    #[serde(default = "default_status")]
    status: FundraiserStatus,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
}

fn default_status() -> FundraiserStatus {
    FundraiserStatus::Active
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateFundraiserRequest {
    title: Option<String>,
    description: Option<String>,
    goal_amount: Option<f64>,
    image_url: Option<String>,
    status: Option<FundraiserStatus>,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
}

/// Look up a fundraiser and prove the caller owns its fund.
async fn owned_fundraiser(
    state: &AppState,
    auth: &AuthUser,
    id: i64,
) -> Result<(fundraiser::Model, charity_fund::Model), AppError> {
    let (model, fund) = Fundraiser::find_by_id(id)
        .filter(fundraiser::Column::Status.eq(FundraiserStatus::Active))
        .find_also_related(CharityFund)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Fundraiser not found".to_string()))?;

    let fund = fund.ok_or_else(|| AppError::NotFound("Fund not found".to_string()))?;
    if fund.creator_id != auth.user_id {
        return Err(AppError::Forbidden("You are not the owner of this fund".to_string()));
    }

    Ok((model, fund))
}

/// List active fundraisers, optionally for a single fund
#[utoipa::path(
    get,
    path = "/api/fundraisers",
    params(FundraiserListQuery),
    responses(
        (status = 200, description = "Active fundraisers", body = [FundraiserResponse])
    )
)]
pub async fn list_fundraisers(
    State(state): State<AppState>,
    Query(query): Query<FundraiserListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let mut select = Fundraiser::find()
        .filter(fundraiser::Column::Status.eq(FundraiserStatus::Active));
    if let Some(fund_id) = query.fund {
        select = select.filter(fundraiser::Column::FundId.eq(fund_id));
    }

    let rows = select
        .find_also_related(CharityFund)
        .order_by_desc(fundraiser::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let body: Vec<FundraiserResponse> = rows
        .into_iter()
        .map(|(model, fund)| FundraiserResponse::from_model(model, fund))
        .collect();
    Ok(Json(body))
}

/// Fetch one active fundraiser
#[utoipa::path(
    get,
    path = "/api/fundraisers/{id}",
    params(("id" = i64, Path, description = "Fundraiser id")),
    responses(
        (status = 200, description = "The fundraiser", body = FundraiserResponse),
        (status = 404, description = "Unknown or inactive fundraiser")
    )
)]
pub async fn get_fundraiser(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let found = Fundraiser::find_by_id(id)
        .filter(fundraiser::Column::Status.eq(FundraiserStatus::Active))
        .find_also_related(CharityFund)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Fundraiser not found".to_string()))?;

    Ok(Json(FundraiserResponse::from_model(found.0, found.1)))
}

/// Start a fundraiser under one of the caller's funds
#[utoipa::path(
    post,
    path = "/api/fundraisers",
    request_body = CreateFundraiserRequest,
    responses(
        (status = 201, description = "Fundraiser created", body = FundraiserResponse),
        (status = 403, description = "Fund creator role required, or fund not owned by the caller"),
        (status = 400, description = "Validation failed")
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, auth, payload))]
pub async fn create_fundraiser(
    State(state): State<AppState>,
    Extension(auth): Extension<Option<AuthUser>>,
    Json(payload): Json<CreateFundraiserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let auth = require_fund_creator(auth.as_ref())?;

    let fund = CharityFund::find_by_id(payload.fund)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::validation("fund", "Fund not found"))?;

    if fund.creator_id != auth.user_id {
        return Err(AppError::Forbidden("You are not the owner of this fund".to_string()));
    }

    let model = fundraiser::ActiveModel {
        fund_id: Set(fund.id),
        title: Set(payload.title),
        description: Set(payload.description),
        goal_amount: Set(payload.goal_amount),
        // Collected amount only moves through recorded donations, never the API
        current_amount: Set(0.0),
        image_url: Set(payload.image_url),
        status: Set(payload.status),
        start_date: Set(payload.start_date),
        end_date: Set(payload.end_date),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let created = model.insert(&state.db).await?;

    Ok((
        StatusCode::CREATED,
        Json(FundraiserResponse::from_model(created, Some(fund))),
    ))
}

/// Update a fundraiser under one of the caller's funds
#[utoipa::path(
    put,
    path = "/api/fundraisers/{id}",
    params(("id" = i64, Path, description = "Fundraiser id")),
    request_body = UpdateFundraiserRequest,
    responses(
        (status = 200, description = "Updated fundraiser", body = FundraiserResponse),
        (status = 403, description = "Caller does not own the fund"),
        (status = 404, description = "Unknown or inactive fundraiser")
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, auth, payload))]
pub async fn update_fundraiser(
    State(state): State<AppState>,
    Extension(auth): Extension<Option<AuthUser>>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateFundraiserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let auth = require_fund_creator(auth.as_ref())?;
    let (model, fund) = owned_fundraiser(&state, auth, id).await?;

    let mut active: fundraiser::ActiveModel = model.into();
    if let Some(title) = payload.title {
        active.title = Set(title);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(goal_amount) = payload.goal_amount {
        active.goal_amount = Set(goal_amount);
    }
    if let Some(image_url) = payload.image_url {
        active.image_url = Set(Some(image_url));
    }
    if let Some(status) = payload.status {
        active.status = Set(status);
    }
    if let Some(start_date) = payload.start_date {
        active.start_date = Set(start_date);
    }
    if let Some(end_date) = payload.end_date {
        active.end_date = Set(end_date);
    }

    let updated = active.update(&state.db).await?;
    Ok(Json(FundraiserResponse::from_model(updated, Some(fund))))
}

/// Delete a fundraiser under one of the caller's funds
#[utoipa::path(
    delete,
    path = "/api/fundraisers/{id}",
    params(("id" = i64, Path, description = "Fundraiser id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Caller does not own the fund"),
        (status = 404, description = "Unknown or inactive fundraiser")
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, auth))]
pub async fn delete_fundraiser(
    State(state): State<AppState>,
    Extension(auth): Extension<Option<AuthUser>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let auth = require_fund_creator(auth.as_ref())?;
    let (model, _fund) = owned_fundraiser(&state, auth, id).await?;

    let active: fundraiser::ActiveModel = model.into();
    active.delete(&state.db).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Fundraisers across all of the caller's funds, newest first
#[utoipa::path(
    get,
    path = "/api/my-fundraisers",
    responses(
        (status = 200, description = "Caller's fundraisers", body = [FundraiserResponse]),
        (status = 403, description = "Fund creator role required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn my_fundraisers(
    State(state): State<AppState>,
    Extension(auth): Extension<Option<AuthUser>>,
) -> Result<impl IntoResponse, AppError> {
    let auth = require_fund_creator(auth.as_ref())?;

    let rows = Fundraiser::find()
        .find_also_related(CharityFund)
        .filter(charity_fund::Column::CreatorId.eq(auth.user_id))
        .order_by_desc(fundraiser::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let body: Vec<FundraiserResponse> = rows
        .into_iter()
        .map(|(model, fund)| FundraiserResponse::from_model(model, fund))
        .collect();
    Ok(Json(body))
}
