use crate::auth::{require_auth, AuthUser};
use crate::entities::{
    help_request, user, HelpRequest, RequestCategory, RequestUrgency, User, UserRole,
};
use crate::error::AppError;
use crate::geo;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Select, Set,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Serialize, ToSchema)]
pub struct HelpRequestResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: RequestCategory,
    /// Human-readable category label
    pub category_display: String,
    pub urgency: RequestUrgency,
    /// Human-readable urgency label
    pub urgency_display: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub contact_name: String,
    pub contact_phone: String,
    pub contact_email: String,
    pub is_active: bool,
    pub is_fulfilled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Linked user's id, when the request was filed by an account
    pub user: Option<i64>,
    pub username: Option<String>,
}

impl HelpRequestResponse {
    fn from_model(model: help_request::Model, owner: Option<user::Model>) -> Self {
        HelpRequestResponse {
            id: model.id,
            title: model.title,
            description: model.description,
            category: model.category,
            category_display: model.category.display().to_string(),
            urgency: model.urgency,
            urgency_display: model.urgency.display().to_string(),
            address: model.address,
            latitude: model.latitude,
            longitude: model.longitude,
            contact_name: model.contact_name,
            contact_phone: model.contact_phone,
            contact_email: model.contact_email,
            is_active: model.is_active,
            is_fulfilled: model.is_fulfilled,
            created_at: model.created_at,
            updated_at: model.updated_at,
            user: model.user_id,
            username: owner.map(|u| u.username),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HelpRequestListQuery {
    /// Filter by category
    #[param(required = false)]
    category: Option<RequestCategory>,
    /// Filter by urgency
    #[param(required = false)]
    urgency: Option<RequestUrgency>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NearbyQuery {
    /// Centre latitude
    #[param(required = false)]
    lat: Option<f64>,
    /// Centre longitude
    #[param(required = false)]
    lng: Option<f64>,
    /// Search radius in kilometres, default 10
    #[param(required = false)]
    radius: Option<f64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateHelpRequestRequest {
    title: String,
    description: String,
    category: RequestCategory,
    #[serde(default = "default_urgency")]
    urgency: RequestUrgency,
    address: String,
    latitude: f64,
    longitude: f64,
    contact_name: String,
    contact_phone: String,
    #[serde(default)]
    contact_email: String,
}

fn default_urgency() -> RequestUrgency {
    RequestUrgency::Medium
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateHelpRequestRequest {
    title: Option<String>,
    description: Option<String>,
    category: Option<RequestCategory>,
    urgency: Option<RequestUrgency>,
    address: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    contact_name: Option<String>,
    contact_phone: Option<String>,
    contact_email: Option<String>,
    is_active: Option<bool>,
    is_fulfilled: Option<bool>,
}

/// Only open requests are browsable: active and not yet fulfilled.
fn open_requests() -> Select<HelpRequest> {
    HelpRequest::find()
        .filter(help_request::Column::IsActive.eq(true))
        .filter(help_request::Column::IsFulfilled.eq(false))
}

/// May the caller modify this request? Owners manage their own rows;
/// admins manage everything, including anonymous rows.
fn can_modify(model: &help_request::Model, auth: &AuthUser) -> bool {
    if auth.role == UserRole::Admin {
        return true;
    }
    model.user_id == Some(auth.user_id)
}

fn into_responses(rows: Vec<(help_request::Model, Option<user::Model>)>) -> Vec<HelpRequestResponse> {
    rows.into_iter()
        .map(|(model, owner)| HelpRequestResponse::from_model(model, owner))
        .collect()
}

/// List open help requests, with optional category/urgency filters
#[utoipa::path(
    get,
    path = "/api/help-requests",
    params(HelpRequestListQuery),
    responses(
        (status = 200, description = "Open help requests", body = [HelpRequestResponse])
    )
)]
pub async fn list_help_requests(
    State(state): State<AppState>,
    Query(query): Query<HelpRequestListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let mut select = open_requests();
    if let Some(category) = query.category {
        select = select.filter(help_request::Column::Category.eq(category));
    }
    if let Some(urgency) = query.urgency {
        select = select.filter(help_request::Column::Urgency.eq(urgency));
    }

    let rows = select
        .find_also_related(User)
        .order_by_desc(help_request::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(into_responses(rows)))
}

/// Open help requests inside an approximate bounding box around a point
#[utoipa::path(
    get,
    path = "/api/help-requests/nearby",
    params(NearbyQuery),
    responses(
        (status = 200, description = "Open requests inside the box", body = [HelpRequestResponse]),
        (status = 400, description = "Missing or invalid coordinates")
    )
)]
#[tracing::instrument(skip(state, query))]
pub async fn nearby_help_requests(
    State(state): State<AppState>,
    Query(query): Query<NearbyQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (lat, lng) = match (query.lat, query.lng) {
        (Some(lat), Some(lng)) => (lat, lng),
        _ => {
            return Err(AppError::InvalidRequest(
                "lat and lng parameters are required".to_string(),
            ))
        }
    };
    let radius = query.radius.unwrap_or(10.0);

    let bbox = geo::bounding_box(lat, lng, radius);

    let rows = open_requests()
        .filter(help_request::Column::Latitude.between(bbox.min_lat, bbox.max_lat))
        .filter(help_request::Column::Longitude.between(bbox.min_lng, bbox.max_lng))
        .find_also_related(User)
        .order_by_desc(help_request::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(into_responses(rows)))
}

/// Fetch one open help request
#[utoipa::path(
    get,
    path = "/api/help-requests/{id}",
    params(("id" = i64, Path, description = "Help request id")),
    responses(
        (status = 200, description = "The request", body = HelpRequestResponse),
        (status = 404, description = "Unknown, inactive or fulfilled request")
    )
)]
pub async fn get_help_request(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let found = open_requests()
        .filter(help_request::Column::Id.eq(id))
        .find_also_related(User)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Help request not found".to_string()))?;

    Ok(Json(HelpRequestResponse::from_model(found.0, found.1)))
}

async fn insert_help_request(
    state: &AppState,
    payload: CreateHelpRequestRequest,
    user_id: Option<i64>,
    username: Option<String>,
) -> Result<impl IntoResponse, AppError> {
    let model = help_request::ActiveModel {
        title: Set(payload.title),
        description: Set(payload.description),
        category: Set(payload.category),
        urgency: Set(payload.urgency),
        address: Set(payload.address),
        latitude: Set(payload.latitude),
        longitude: Set(payload.longitude),
        contact_name: Set(payload.contact_name),
        contact_phone: Set(payload.contact_phone),
        contact_email: Set(payload.contact_email),
        is_active: Set(true),
        is_fulfilled: Set(false),
        user_id: Set(user_id),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
        ..Default::default()
    };
    let created = model.insert(&state.db).await?;

    let mut response = HelpRequestResponse::from_model(created, None);
    response.username = username;
    Ok((StatusCode::CREATED, Json(response)))
}

/// File a help request. Anonymous callers are welcome; authenticated
/// callers get the request linked to their account.
#[utoipa::path(
    post,
    path = "/api/help-requests",
    request_body = CreateHelpRequestRequest,
    responses(
        (status = 201, description = "Request filed", body = HelpRequestResponse),
        (status = 400, description = "Validation failed")
    )
)]
#[tracing::instrument(skip(state, auth, payload))]
pub async fn create_help_request(
    State(state): State<AppState>,
    Extension(auth): Extension<Option<AuthUser>>,
    Json(payload): Json<CreateHelpRequestRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (user_id, username) = match auth.as_ref() {
        Some(user) => (Some(user.user_id), Some(user.username.clone())),
        None => (None, None),
    };
    insert_help_request(&state, payload, user_id, username).await
}

/// File a help request linked to the calling account
#[utoipa::path(
    post,
    path = "/api/requests/create",
    request_body = CreateHelpRequestRequest,
    responses(
        (status = 201, description = "Request filed", body = HelpRequestResponse),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, auth, payload))]
pub async fn create_my_help_request(
    State(state): State<AppState>,
    Extension(auth): Extension<Option<AuthUser>>,
    Json(payload): Json<CreateHelpRequestRequest>,
) -> Result<impl IntoResponse, AppError> {
    let auth = require_auth(auth.as_ref())?;
    insert_help_request(&state, payload, Some(auth.user_id), Some(auth.username.clone())).await
}

/// Update an open help request; owners may close or fulfill their own
#[utoipa::path(
    put,
    path = "/api/help-requests/{id}",
    params(("id" = i64, Path, description = "Help request id")),
    request_body = UpdateHelpRequestRequest,
    responses(
        (status = 200, description = "Updated request", body = HelpRequestResponse),
        (status = 403, description = "Caller may not modify this request"),
        (status = 404, description = "Unknown, inactive or fulfilled request")
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, auth, payload))]
pub async fn update_help_request(
    State(state): State<AppState>,
    Extension(auth): Extension<Option<AuthUser>>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateHelpRequestRequest>,
) -> Result<impl IntoResponse, AppError> {
    let auth = require_auth(auth.as_ref())?;

    let model = open_requests()
        .filter(help_request::Column::Id.eq(id))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Help request not found".to_string()))?;

    if !can_modify(&model, auth) {
        return Err(AppError::Forbidden("You may not modify this request".to_string()));
    }

    let mut active: help_request::ActiveModel = model.into();
    if let Some(title) = payload.title {
        active.title = Set(title);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(category) = payload.category {
        active.category = Set(category);
    }
    if let Some(urgency) = payload.urgency {
        active.urgency = Set(urgency);
    }
    if let Some(address) = payload.address {
        active.address = Set(address);
    }
    if let Some(latitude) = payload.latitude {
        active.latitude = Set(latitude);
    }
    if let Some(longitude) = payload.longitude {
        active.longitude = Set(longitude);
    }
    if let Some(contact_name) = payload.contact_name {
        active.contact_name = Set(contact_name);
    }
    if let Some(contact_phone) = payload.contact_phone {
        active.contact_phone = Set(contact_phone);
    }
    if let Some(contact_email) = payload.contact_email {
        active.contact_email = Set(contact_email);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    if let Some(is_fulfilled) = payload.is_fulfilled {
        active.is_fulfilled = Set(is_fulfilled);
    }
    active.updated_at = Set(Utc::now());

    let updated = active.update(&state.db).await?;
    let owner = match updated.user_id {
        Some(owner_id) => User::find_by_id(owner_id).one(&state.db).await?,
        None => None,
    };
    Ok(Json(HelpRequestResponse::from_model(updated, owner)))
}

/// Delete a help request
#[utoipa::path(
    delete,
    path = "/api/help-requests/{id}",
    params(("id" = i64, Path, description = "Help request id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Caller may not modify this request"),
        (status = 404, description = "Unknown, inactive or fulfilled request")
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, auth))]
pub async fn delete_help_request(
    State(state): State<AppState>,
    Extension(auth): Extension<Option<AuthUser>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let auth = require_auth(auth.as_ref())?;

    let model = open_requests()
        .filter(help_request::Column::Id.eq(id))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Help request not found".to_string()))?;

    if !can_modify(&model, auth) {
        return Err(AppError::Forbidden("You may not modify this request".to_string()));
    }

    let active: help_request::ActiveModel = model.into();
    active.delete(&state.db).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// The caller's own help requests, regardless of state, newest first
#[utoipa::path(
    get,
    path = "/api/my-requests",
    responses(
        (status = 200, description = "Caller's requests", body = [HelpRequestResponse]),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn my_requests(
    State(state): State<AppState>,
    Extension(auth): Extension<Option<AuthUser>>,
) -> Result<impl IntoResponse, AppError> {
    let auth = require_auth(auth.as_ref())?;

    let rows = HelpRequest::find()
        .filter(help_request::Column::UserId.eq(auth.user_id))
        .find_also_related(User)
        .order_by_desc(help_request::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(into_responses(rows)))
}
