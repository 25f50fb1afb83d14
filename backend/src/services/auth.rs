//! Authentication service for login and token management

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use shared::Role;

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt_secret: String,
    access_token_expiry: i64,
    refresh_token_expiry: i64,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User ID
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<String>,
    pub permissions: Vec<String>,
    pub exp: i64,
    pub iat: i64,
}

/// Authentication tokens
#[derive(Debug, Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Revokes a live refresh token and returns its active owner.
///
/// The `revoked_at IS NULL` guard makes the claim single-use: of two
/// concurrent refreshes with the same token only one gets a row back.
const CLAIM_REFRESH_TOKEN_SQL: &str = r#"
    WITH claimed AS (
        UPDATE refresh_tokens
        SET revoked_at = NOW()
        WHERE token_hash = $1
          AND revoked_at IS NULL
          AND expires_at > NOW()
        RETURNING user_id
    )
    SELECT u.id, u.role, u.zone_id
    FROM claimed
    JOIN users u ON u.id = claimed.user_id
    WHERE u.is_active = true
"#;

/// Credentials row loaded for login
#[derive(Debug, sqlx::FromRow)]
pub struct CredentialRow {
    pub id: Uuid,
    pub role: String,
    pub zone_id: Option<Uuid>,
    pub password_hash: String,
    pub is_active: bool,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            db,
            jwt_secret: config.jwt.secret.clone(),
            access_token_expiry: config.jwt.access_token_expiry,
            refresh_token_expiry: config.jwt.refresh_token_expiry,
        }
    }

    /// Authenticate user with email and password
    pub async fn login(&self, email: &str, password: &str) -> AppResult<AuthTokens> {
        let user = sqlx::query_as::<_, CredentialRow>(
            r#"
            SELECT id, role, zone_id, password_hash, is_active
            FROM users
            WHERE LOWER(email) = LOWER($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

        if !user.is_active {
            return Err(AppError::Unauthorized("Account is disabled".to_string()));
        }

        let valid = verify(password, &user.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;

        if !valid {
            tracing::info!(user_id = %user.id, "rejected login with wrong password");
            return Err(AppError::InvalidCredentials);
        }

        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(user.id)
            .execute(&self.db)
            .await?;

        let role = parse_role(&user.role)?;
        let tokens = self.generate_tokens(user.id, role, user.zone_id)?;
        self.store_refresh_token(&self.db, user.id, &tokens.refresh_token)
            .await?;

        Ok(tokens)
    }

    /// Refresh access token using refresh token
    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<AuthTokens> {
        let token_hash = hash_token(refresh_token);

        let mut tx = self.db.begin().await?;

        // Rotate: the presented token can be used once
        let (user_id, role, zone_id) =
            sqlx::query_as::<_, (Uuid, String, Option<Uuid>)>(CLAIM_REFRESH_TOKEN_SQL)
                .bind(&token_hash)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| {
                    AppError::Unauthorized("Invalid or expired refresh token".to_string())
                })?;

        let role = parse_role(&role)?;
        let tokens = self.generate_tokens(user_id, role, zone_id)?;
        self.store_refresh_token(&mut *tx, user_id, &tokens.refresh_token)
            .await?;

        tx.commit().await?;

        Ok(tokens)
    }

    /// Generate access and refresh tokens
    fn generate_tokens(&self, user_id: Uuid, role: Role, zone_id: Option<Uuid>) -> AppResult<AuthTokens> {
        let now = Utc::now();
        let access_exp = now + Duration::seconds(self.access_token_expiry);

        let access_claims = Claims {
            sub: user_id.to_string(),
            role: role.as_str().to_string(),
            zone_id: zone_id.map(|z| z.to_string()),
            permissions: role.permission_strings(),
            exp: access_exp.timestamp(),
            iat: now.timestamp(),
        };

        let access_token = encode(
            &Header::default(),
            &access_claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

        // Refresh token is opaque; only its digest is stored
        let refresh_token = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());

        Ok(AuthTokens {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
        })
    }

    /// Store refresh token in database
    async fn store_refresh_token<'e, E>(&self, executor: E, user_id: Uuid, token: &str) -> AppResult<()>
    where
        E: PgExecutor<'e>,
    {
        let token_hash = hash_token(token);
        let expires_at = Utc::now() + Duration::seconds(self.refresh_token_expiry);

        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (user_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user_id)
        .bind(&token_hash)
        .bind(expires_at)
        .execute(executor)
        .await?;

        Ok(())
    }
}

/// Hash a password for storage
pub fn hash_password(password: &str) -> AppResult<String> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// SHA-256 hex digest of a refresh token
pub fn hash_token(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

fn parse_role(role: &str) -> AppResult<Role> {
    role.parse::<Role>()
        .map_err(|e| AppError::Internal(format!("Stored user has invalid role: {}", e)))
}
