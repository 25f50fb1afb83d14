//! Authentication middleware
//!
//! JWT authentication and role-based access control middleware

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, errors::ErrorKind, DecodingKey, Validation};
use shared::{Action, Resource, Role};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::auth::Claims;
use crate::AppState;

/// Authenticated user information extracted from JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: Role,
    /// Assigned zone for field staff
    pub zone_id: Option<Uuid>,
    pub permissions: Vec<String>,
}

impl AuthUser {
    /// Check if user has a specific permission
    pub fn has_permission(&self, resource: Resource, action: Action) -> bool {
        let permission = format!("{}:{}", resource.as_str(), action.as_str());
        self.permissions.contains(&permission)
    }

    /// Zone the user is restricted to, `None` when unrestricted
    pub fn zone_scope(&self) -> AppResult<Option<Uuid>> {
        if !self.role.is_zone_scoped() {
            return Ok(None);
        }
        self.zone_id
            .map(Some)
            .ok_or_else(|| AppError::Forbidden("No zone assigned to this account".to_string()))
    }

    /// Reject access to a record outside the user's zone
    pub fn ensure_zone(&self, zone_id: Uuid) -> AppResult<()> {
        match self.zone_scope()? {
            Some(own) if own != zone_id => Err(AppError::Forbidden(
                "Plant lot belongs to another zone".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

impl TryFrom<Claims> for AuthUser {
    type Error = AppError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Unauthorized("Invalid user ID in token".to_string()))?;
        let role = claims
            .role
            .parse::<Role>()
            .map_err(|_| AppError::Unauthorized("Invalid role in token".to_string()))?;
        let zone_id = claims
            .zone_id
            .as_deref()
            .map(Uuid::parse_str)
            .transpose()
            .map_err(|_| AppError::Unauthorized("Invalid zone ID in token".to_string()))?;

        Ok(AuthUser {
            user_id,
            role,
            zone_id,
            permissions: claims.permissions,
        })
    }
}

/// Authentication middleware that validates JWT tokens
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(token) => token,
        None => {
            return AppError::Unauthorized("Missing or invalid Authorization header".to_string())
                .into_response();
        }
    };

    let auth_user = match decode_jwt(token, &state.config.jwt.secret).and_then(AuthUser::try_from) {
        Ok(user) => user,
        Err(e) => return e.into_response(),
    };

    tracing::debug!(user_id = %auth_user.user_id, role = auth_user.role.as_str(), "authenticated request");
    request.extensions_mut().insert(auth_user);

    next.run(request).await
}

/// Decode and validate JWT token
pub fn decode_jwt(token: &str, secret: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AppError::TokenExpired,
        _ => AppError::InvalidToken,
    })
}

/// Permission guard for use in handlers
/// Returns an error if the user doesn't have the required permission
pub fn check_permission(user: &AuthUser, resource: Resource, action: Action) -> AppResult<()> {
    if user.has_permission(resource, action) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "Permission denied: requires {}:{}",
            resource.as_str(),
            action.as_str()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role, zone_id: Option<Uuid>) -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            role,
            zone_id,
            permissions: role.permission_strings(),
        }
    }

    #[test]
    fn test_field_staff_permissions() {
        let staff = user(Role::FieldStaff, Some(Uuid::new_v4()));
        assert!(check_permission(&staff, Resource::HealthLog, Action::Create).is_ok());
        assert!(check_permission(&staff, Resource::PlantLot, Action::Create).is_err());
        assert!(check_permission(&staff, Resource::Report, Action::View).is_err());
    }

    #[test]
    fn test_zone_scope() {
        let zone = Uuid::new_v4();
        let staff = user(Role::FieldStaff, Some(zone));
        assert!(staff.ensure_zone(zone).is_ok());
        assert!(staff.ensure_zone(Uuid::new_v4()).is_err());

        let manager = user(Role::Manager, None);
        assert_eq!(manager.zone_scope().unwrap(), None);
        assert!(manager.ensure_zone(zone).is_ok());

        let unassigned = user(Role::FieldStaff, None);
        assert!(unassigned.zone_scope().is_err());
    }

    #[test]
    fn test_claims_conversion() {
        let claims = Claims {
            sub: Uuid::nil().to_string(),
            role: "analytics".to_string(),
            zone_id: None,
            permissions: vec!["report:view".to_string()],
            exp: 0,
            iat: 0,
        };
        let user = AuthUser::try_from(claims).unwrap();
        assert_eq!(user.role, Role::Analytics);
        assert!(user.has_permission(Resource::Report, Action::View));
    }
}
