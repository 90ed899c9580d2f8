use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::repositories::{UserRepository, WorkoutRepository};

#[derive(Clone)]
pub struct UsersState {
    pub user_repo: UserRepository,
    pub workout_repo: WorkoutRepository,
}

fn require_trainer(auth_user: &AuthUser) -> Result<()> {
    if !auth_user.is_trainer() {
        return Err(AppError::Forbidden(
            "Apenas personal trainers podem acessar esta rota".to_string(),
        ));
    }
    Ok(())
}

/// GET /usuarios/alunos — the caller's actively linked students.
pub async fn list_students(
    State(state): State<UsersState>,
    auth_user: AuthUser,
) -> Result<Response> {
    require_trainer(&auth_user)?;

    let alunos = state.user_repo.find_students(&auth_user.id, false).await?;
    Ok(Json(alunos).into_response())
}

/// GET /usuarios/aluno/{id} — a single student, visible to the student
/// themself and to their current trainer.
pub async fn get_student(
    State(state): State<UsersState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Response> {
    let aluno = state
        .user_repo
        .find_student(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Aluno não encontrado".to_string()))?;

    let is_self = auth_user.id == aluno.id;
    let is_their_trainer = aluno.is_active_student_of(&auth_user.id);
    if !is_self && !is_their_trainer {
        return Err(AppError::Forbidden(
            "Sem permissão para acessar este aluno".to_string(),
        ));
    }

    Ok(Json(json!({
        "id": aluno.id,
        "nome": aluno.nome,
        "email": aluno.email,
        "tipo": aluno.tipo,
        "personal_id": aluno.personal_id,
    }))
    .into_response())
}

/// DELETE /usuarios/alunos/{id} — unlink a student and drop every workout
/// the caller created for them.
pub async fn unlink_student(
    State(state): State<UsersState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Response> {
    require_trainer(&auth_user)?;

    let unlinked = state.user_repo.unlink(&id, &auth_user.id).await?;
    if !unlinked {
        return Err(AppError::NotFound(
            "Aluno não encontrado ou não está vinculado a você".to_string(),
        ));
    }

    let removed = state
        .workout_repo
        .delete_for_pair(&auth_user.id, &id)
        .await?;
    tracing::info!(aluno_id = %id, treinos_removidos = removed, "student unlinked");

    Ok(Json(json!({ "mensagem": "Aluno desvinculado com sucesso" })).into_response())
}

/// GET /usuarios/alunos/inativos — previously unlinked students of the caller.
pub async fn list_inactive_students(
    State(state): State<UsersState>,
    auth_user: AuthUser,
) -> Result<Response> {
    require_trainer(&auth_user)?;

    let alunos = state.user_repo.find_students(&auth_user.id, true).await?;
    Ok(Json(alunos).into_response())
}

/// POST /usuarios/alunos/{id}/reativar — restore a deactivated link.
pub async fn reactivate_student(
    State(state): State<UsersState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Response> {
    require_trainer(&auth_user)?;

    let reactivated = state.user_repo.reactivate(&id, &auth_user.id).await?;
    if !reactivated {
        return Err(AppError::NotFound(
            "Aluno não encontrado ou não está desvinculado".to_string(),
        ));
    }

    let aluno = state
        .user_repo
        .find_student(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Aluno não encontrado".to_string()))?;

    Ok(Json(json!({
        "mensagem": "Aluno reativado com sucesso",
        "aluno": {
            "id": aluno.id,
            "nome": aluno.nome,
            "email": aluno.email,
            "desvinculado": false,
        },
    }))
    .into_response())
}
