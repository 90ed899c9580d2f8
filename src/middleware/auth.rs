use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::error::AppError;
use crate::models::UserRole;
use crate::token::TokenKeys;

/// Authenticated caller, extracted from the `Authorization: Bearer` header.
///
/// Carries the user summary embedded in the token. Handlers that need the
/// current database state of the caller (linkage, trainer code) re-fetch it.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: String,
    pub nome: String,
    pub email: String,
    pub tipo: UserRole,
}

impl AuthUser {
    pub fn is_trainer(&self) -> bool {
        self.tipo.is_trainer()
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let keys = parts
            .extensions
            .get::<TokenKeys>()
            .ok_or_else(|| AppError::Internal("token keys not configured".to_string()))?;

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| AppError::Unauthorized("Autenticação necessária".to_string()))?;

        let claims = keys.verify(token)?;

        Ok(AuthUser {
            id: claims.user.id,
            nome: claims.user.nome,
            email: claims.user.email,
            tipo: claims.user.tipo,
        })
    }
}
