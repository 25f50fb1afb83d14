//! User account administration

use serde::Deserialize;
use shared::{PaginatedResponse, Pagination, Role};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{map_unique_violation, AppError, AppResult};
use crate::models::{User, UserRow};
use crate::services::auth::hash_password;

const USER_COLUMNS: &str = "id, email, name, role, zone_id, is_active, created_at, updated_at";

/// User service
#[derive(Clone)]
pub struct UserService {
    db: PgPool,
}

/// Input for creating a user
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserInput {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
    pub password: String,
    pub role: Role,
    pub zone_id: Option<Uuid>,
}

/// Input for updating a user
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserInput {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    pub zone_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

/// Field staff must be assigned to a zone
fn validate_zone_assignment(role: Role, zone_id: Option<Uuid>) -> AppResult<()> {
    if role.is_zone_scoped() && zone_id.is_none() {
        return Err(AppError::validation(
            "zone_id",
            "Field staff must be assigned to a zone",
        ));
    }
    Ok(())
}

impl UserService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list_users(&self, pagination: &Pagination) -> AppResult<PaginatedResponse<User>> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.db)
            .await?;

        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users ORDER BY name ASC LIMIT $1 OFFSET $2",
            USER_COLUMNS
        ))
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        let data = rows
            .into_iter()
            .map(User::try_from)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(PaginatedResponse {
            data,
            pagination: pagination.meta(total.max(0) as u64),
        })
    }

    pub async fn get_user(&self, user_id: Uuid) -> AppResult<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        row.try_into()
    }

    pub async fn create_user(&self, input: CreateUserInput) -> AppResult<User> {
        input.validate()?;
        shared::validate_password(&input.password)?;
        validate_zone_assignment(input.role, input.zone_id)?;

        let password_hash = hash_password(&input.password)?;

        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (email, password_hash, name, role, zone_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(input.email.trim())
        .bind(&password_hash)
        .bind(input.name.trim())
        .bind(input.role.as_str())
        .bind(input.zone_id)
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_unique_violation(e, "email"))?;

        tracing::info!(user_id = %row.id, role = %row.role, "user created");
        row.try_into()
    }

    pub async fn update_user(&self, user_id: Uuid, input: UpdateUserInput) -> AppResult<User> {
        input.validate()?;
        let existing = self.get_user(user_id).await?;

        let role = input.role.unwrap_or(existing.role);
        let zone_id = input.zone_id.or(existing.zone_id);
        validate_zone_assignment(role, zone_id)?;

        let name = input.name.unwrap_or(existing.name);
        let is_active = input.is_active.unwrap_or(existing.is_active);

        let mut tx = self.db.begin().await?;

        if let Some(password) = input.password.as_deref() {
            shared::validate_password(password)?;
            let password_hash = hash_password(password)?;
            sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
                .bind(&password_hash)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
        }

        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
            SET name = $1, role = $2, zone_id = $3, is_active = $4, updated_at = NOW()
            WHERE id = $5
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(&name)
        .bind(role.as_str())
        .bind(zone_id)
        .bind(is_active)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        row.try_into()
    }

    /// Deactivate a user and revoke their refresh tokens
    pub async fn deactivate_user(&self, user_id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let result = sqlx::query("UPDATE users SET is_active = FALSE, updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User".to_string()));
        }

        sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = NOW() WHERE user_id = $1 AND revoked_at IS NULL",
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!(%user_id, "user deactivated");
        Ok(())
    }
}
