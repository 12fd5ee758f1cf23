use crate::entities::UserRole;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const ACCESS_TOKEN_MINUTES: i64 = 60;
const REFRESH_TOKEN_DAYS: i64 = 7;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT Claims - data stored in the token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,           // Subject (user id as string)
    pub user_id: i64,          // User primary key
    pub username: String,      // For logging/debugging
    pub role: UserRole,        // Role at issue time
    pub token_type: TokenType, // Access tokens authenticate requests, refresh tokens only renew
    pub exp: i64,              // Expiration timestamp
    pub iat: i64,              // Issued at timestamp
    pub iss: String,           // Issuer
    pub jti: String,           // JWT ID (unique token identifier)
}

/// Access/refresh pair issued at login
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// JWT Service - creates and verifies JWT tokens
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
}

impl JwtService {
    pub fn new(secret: &str, issuer: String) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
        }
    }

    /// Issue an access/refresh pair for a user.
    ///
    /// Access tokens expire after 60 minutes, refresh tokens after 7 days.
    pub fn issue_pair(
        &self,
        user_id: i64,
        username: &str,
        role: UserRole,
    ) -> Result<TokenPair, jsonwebtoken::errors::Error> {
        Ok(TokenPair {
            access: self.create_token(
                user_id,
                username,
                role,
                TokenType::Access,
                chrono::Duration::minutes(ACCESS_TOKEN_MINUTES),
            )?,
            refresh: self.create_token(
                user_id,
                username,
                role,
                TokenType::Refresh,
                chrono::Duration::days(REFRESH_TOKEN_DAYS),
            )?,
        })
    }

    /// Issue a fresh access token from verified refresh-token claims.
    pub fn refresh_access(&self, claims: &Claims) -> Result<String, jsonwebtoken::errors::Error> {
        self.create_token(
            claims.user_id,
            &claims.username,
            claims.role,
            TokenType::Access,
            chrono::Duration::minutes(ACCESS_TOKEN_MINUTES),
        )
    }

    fn create_token(
        &self,
        user_id: i64,
        username: &str,
        role: UserRole,
        token_type: TokenType,
        lifetime: chrono::Duration,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = chrono::Utc::now();

        let claims = Claims {
            sub: user_id.to_string(),
            user_id,
            username: username.to_string(),
            role,
            token_type,
            exp: (now + lifetime).timestamp(),
            iat: now.timestamp(),
            iss: self.issuer.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
    }

    /// Verify and decode a JWT token.
    ///
    /// Returns claims if the token is valid, unexpired and from this issuer.
    pub fn verify_token(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);

        decode::<Claims>(token, &self.decoding_key, &validation).map(|data| data.claims)
    }
}
