use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{User, UserRole};

pub const TOKEN_TTL_DAYS: i64 = 30;

/// User summary carried inside the signed token, mirroring what the
/// API returns as `usuario`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenUser {
    pub id: String,
    pub nome: String,
    pub email: String,
    pub tipo: UserRole,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user: TokenUser,
    pub exp: usize,
}

/// HS256 signing and verification keys shared via an Extension layer.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenKeys {
    pub fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn sign(&self, user: &User) -> Result<String> {
        let exp = (Utc::now() + Duration::days(TOKEN_TTL_DAYS)).timestamp() as usize;
        let claims = Claims {
            user: TokenUser {
                id: user.id.clone(),
                nome: user.nome.clone(),
                email: user.email.clone(),
                tipo: user.tipo,
            },
            exp,
        };
        encode(&Header::default(), &claims, &self.encoding).map_err(|_| AppError::Token)
    }

    pub fn verify(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::Unauthorized("Token expirado".to_string())
                }
                _ => AppError::Unauthorized("Token inválido".to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_user() -> User {
        User {
            id: "u1".to_string(),
            nome: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            senha_hash: "x".to_string(),
            tipo: UserRole::Trainer,
            codigo_personal: Some("123456".to_string()),
            personal_id: None,
            desvinculado: false,
            criado_em: Utc::now(),
        }
    }

    #[test]
    fn test_sign_and_verify_round_trip() {
        let keys = TokenKeys::from_secret("segredo");
        let token = keys.sign(&sample_user()).unwrap();
        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.user.id, "u1");
        assert_eq!(claims.user.tipo, UserRole::Trainer);
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let keys = TokenKeys::from_secret("segredo");
        assert!(keys.verify("not-a-token").is_err());
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let keys = TokenKeys::from_secret("segredo");
        let token = keys.sign(&sample_user()).unwrap();
        let other = TokenKeys::from_secret("outro-segredo");
        assert!(other.verify(&token).is_err());
    }
}
