use crate::auth::{hash_password, require_auth, verify_password, AuthUser, TokenType};
use crate::entities::{charity_fund, user, FundStatus, User, UserRole};
use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    username: String,
    email: String,
    /// Plaintext password, at least 6 characters
    password: String,
    /// Must repeat `password` exactly
    password2: String,
    /// Either "user" (donor) or "fund" (fund creator). Defaults to "user".
    #[serde(default = "default_account_type")]
    account_type: String,
    /// Required when account_type is "fund"
    #[serde(default)]
    fund_name: String,
    /// Required when account_type is "fund"
    #[serde(default)]
    fund_description: String,
}

fn default_account_type() -> String {
    "user".to_string()
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: UserRole,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub user: LoginUser,
    /// Short-lived token sent as `Authorization: Bearer <access>`
    pub access: String,
    /// Long-lived token for POST /api/auth/token/refresh
    pub refresh: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshRequest {
    refresh: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RefreshResponse {
    pub access: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar_url: Option<String>,
    pub date_joined: DateTime<Utc>,
    pub role: UserRole,
}

impl From<user::Model> for ProfileResponse {
    fn from(user: user::Model) -> Self {
        ProfileResponse {
            id: user.id,
            username: user.username,
            email: user.email,
            phone: user.phone,
            first_name: user.first_name,
            last_name: user.last_name,
            avatar_url: user.avatar_url,
            date_joined: user.date_joined,
            role: user.role,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    username: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    avatar_url: Option<String>,
}

/// Register a new account, optionally submitting a charity fund for review
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = ProfileResponse),
        (status = 400, description = "Validation failed")
    )
)]
#[tracing::instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.password.len() < 6 {
        return Err(AppError::validation("password", "Password must be at least 6 characters"));
    }
    if payload.password != payload.password2 {
        return Err(AppError::validation("password", "Passwords do not match"));
    }

    let username_taken = User::find()
        .filter(user::Column::Username.eq(&payload.username))
        .one(&state.db)
        .await?
        .is_some();
    if username_taken {
        return Err(AppError::validation("username", "A user with that username already exists"));
    }

    let email_taken = User::find()
        .filter(user::Column::Email.eq(&payload.email))
        .one(&state.db)
        .await?
        .is_some();
    if email_taken {
        return Err(AppError::validation("email", "A user with that email already exists"));
    }

    let role = match payload.account_type.as_str() {
        "user" => UserRole::User,
        "fund" => {
            if payload.fund_name.trim().is_empty() {
                return Err(AppError::validation("fund_name", "Fund name is required"));
            }
            if payload.fund_description.trim().is_empty() {
                return Err(AppError::validation("fund_description", "Fund description is required"));
            }
            UserRole::FundCreator
        }
        _ => return Err(AppError::validation("account_type", "Invalid account type")),
    };

    let password_hash = hash_password(&payload.password)?;

    let new_user = user::ActiveModel {
        username: Set(payload.username.clone()),
        email: Set(payload.email.clone()),
        password_hash: Set(password_hash),
        first_name: Set(String::new()),
        last_name: Set(String::new()),
        phone: Set(String::new()),
        avatar_url: Set(None),
        role: Set(role),
        date_joined: Set(Utc::now()),
        ..Default::default()
    };
    let created = new_user.insert(&state.db).await?;

    // A fund account immediately files its fund for admin review
    if role == UserRole::FundCreator {
        let fund = charity_fund::ActiveModel {
            name: Set(payload.fund_name.clone()),
            description: Set(payload.fund_description.clone()),
            image_url: Set(None),
            website: Set(String::new()),
            contact_email: Set(created.email.clone()),
            creator_id: Set(created.id),
            status: Set(FundStatus::Pending),
            rejection_reason: Set(String::new()),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        fund.insert(&state.db).await?;
        tracing::info!("Fund application submitted by {}", created.username);
    }

    Ok((StatusCode::CREATED, Json(ProfileResponse::from(created))))
}

/// Log in and receive an access/refresh token pair
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
#[tracing::instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = User::find()
        .filter(user::Column::Username.eq(&payload.username))
        .one(&state.db)
        .await?;

    let user = match user {
        Some(u) if verify_password(&payload.password, &u.password_hash) => u,
        _ => return Err(AppError::Unauthorized("Invalid credentials".to_string())),
    };

    let pair = state
        .jwt
        .issue_pair(user.id, &user.username, user.role)
        .map_err(|e| AppError::InternalError(e.to_string()))?;

    Ok(Json(LoginResponse {
        user: LoginUser {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
        },
        access: pair.access,
        refresh: pair.refresh,
    }))
}

/// Exchange a refresh token for a fresh access token
#[utoipa::path(
    post,
    path = "/api/auth/token/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New access token issued", body = RefreshResponse),
        (status = 401, description = "Invalid or expired refresh token")
    )
)]
#[tracing::instrument(skip(state, payload))]
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<impl IntoResponse, AppError> {
    let claims = state
        .jwt
        .verify_token(&payload.refresh)
        .map_err(|_| AppError::Unauthorized("Invalid or expired refresh token".to_string()))?;

    if claims.token_type != TokenType::Refresh {
        return Err(AppError::Unauthorized("Token is not a refresh token".to_string()));
    }

    let access = state
        .jwt
        .refresh_access(&claims)
        .map_err(|e| AppError::InternalError(e.to_string()))?;

    Ok(Json(RefreshResponse { access }))
}

/// Current user's profile
#[utoipa::path(
    get,
    path = "/api/auth/profile",
    responses(
        (status = 200, description = "Profile of the authenticated user", body = ProfileResponse),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<Option<AuthUser>>,
) -> Result<impl IntoResponse, AppError> {
    let auth = require_auth(auth.as_ref())?;

    let user = User::find_by_id(auth.user_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(ProfileResponse::from(user)))
}

/// Update the current user's profile. Role and join date are read-only.
#[utoipa::path(
    patch,
    path = "/api/auth/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = ProfileResponse),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, auth, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<Option<AuthUser>>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    let auth = require_auth(auth.as_ref())?;

    let user = User::find_by_id(auth.user_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if let Some(username) = &payload.username {
        if username != &user.username {
            let taken = User::find()
                .filter(user::Column::Username.eq(username))
                .one(&state.db)
                .await?
                .is_some();
            if taken {
                return Err(AppError::validation("username", "A user with that username already exists"));
            }
        }
    }
    if let Some(email) = &payload.email {
        if email != &user.email {
            let taken = User::find()
                .filter(user::Column::Email.eq(email))
                .one(&state.db)
                .await?
                .is_some();
            if taken {
                return Err(AppError::validation("email", "A user with that email already exists"));
            }
        }
    }

    let mut active: user::ActiveModel = user.into();
    if let Some(username) = payload.username {
        active.username = Set(username);
    }
    if let Some(email) = payload.email {
        active.email = Set(email);
    }
    if let Some(phone) = payload.phone {
        active.phone = Set(phone);
    }
    if let Some(first_name) = payload.first_name {
        active.first_name = Set(first_name);
    }
    if let Some(last_name) = payload.last_name {
        active.last_name = Set(last_name);
    }
    if let Some(avatar_url) = payload.avatar_url {
        active.avatar_url = Set(Some(avatar_url));
    }

    let updated = active.update(&state.db).await?;
    Ok(Json(ProfileResponse::from(updated)))
}
