use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde_json::json;

use crate::error::{AppError, Result};
use crate::models::{LoginRequest, RegisterRequest, UserRole, UserSummary};
use crate::repositories::UserRepository;
use crate::token::TokenKeys;

#[derive(Clone)]
pub struct AuthState {
    pub user_repo: UserRepository,
}

pub async fn register(
    State(state): State<AuthState>,
    Extension(keys): Extension<TokenKeys>,
    Json(body): Json<RegisterRequest>,
) -> Result<Response> {
    if body.nome.trim().is_empty() || body.email.trim().is_empty() || body.senha.is_empty() {
        return Err(AppError::Validation(
            "Todos os campos são obrigatórios".to_string(),
        ));
    }

    let tipo = UserRole::parse(&body.tipo)
        .ok_or_else(|| AppError::Validation("Tipo de usuário inválido".to_string()))?;

    if state.user_repo.find_by_email(&body.email).await?.is_some() {
        return Err(AppError::Validation("Email já está em uso".to_string()));
    }

    let (codigo_personal, personal_id) = match tipo {
        UserRole::Student => {
            let codigo = body.codigo_personal.as_deref().ok_or_else(|| {
                AppError::Validation("Código do personal é obrigatório para alunos".to_string())
            })?;
            let trainer = state
                .user_repo
                .find_trainer_by_code(codigo)
                .await?
                .ok_or_else(|| {
                    AppError::Validation("Código de personal inválido".to_string())
                })?;
            (None, Some(trainer.id))
        }
        UserRole::Trainer => {
            let codigo = state.user_repo.generate_unique_code().await?;
            (Some(codigo), None)
        }
    };

    let user = state
        .user_repo
        .create(
            &body.nome,
            &body.email,
            &body.senha,
            tipo,
            codigo_personal,
            personal_id,
        )
        .await?;

    tracing::info!(user_id = %user.id, tipo = tipo.as_str(), "user registered");

    let token = keys.sign(&user)?;
    Ok(Json(json!({
        "token": token,
        "usuario": UserSummary::from(&user),
    }))
    .into_response())
}

pub async fn login(
    State(state): State<AuthState>,
    Extension(keys): Extension<TokenKeys>,
    Json(body): Json<LoginRequest>,
) -> Result<Response> {
    if body.email.trim().is_empty() || body.senha.is_empty() {
        return Err(AppError::Validation(
            "Todos os campos são obrigatórios".to_string(),
        ));
    }

    let mut user = state
        .user_repo
        .verify_password(&body.email, &body.senha)
        .await?
        .ok_or_else(|| AppError::Validation("Credenciais inválidas".to_string()))?;

    // A student without an active trainer link may relink during login by
    // supplying a fresh code. With no code, signal the unlinked state
    // instead of issuing a token.
    if user.tipo == UserRole::Student && !user.has_active_link() {
        match &body.novo_codigo_personal {
            Some(codigo) => {
                let trainer = state
                    .user_repo
                    .find_trainer_by_code(codigo)
                    .await?
                    .ok_or_else(|| {
                        AppError::Validation("Código de personal inválido".to_string())
                    })?;
                state.user_repo.relink(&user.id, &trainer.id).await?;
                user.personal_id = Some(trainer.id);
                user.desvinculado = false;
            }
            None => {
                return Ok((
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "desvinculado": true,
                        "mensagem": "Você não está vinculado a nenhum personal. Por favor, forneça um código de personal válido.",
                    })),
                )
                    .into_response());
            }
        }
    }

    let token = keys.sign(&user)?;
    Ok(Json(json!({
        "success": true,
        "token": token,
        "usuario": UserSummary::from(&user),
    }))
    .into_response())
}
