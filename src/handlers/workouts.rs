use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::workout::is_dia_semana;
use crate::models::{is_cataloged, CreateExercise, CreateWorkout, Workout, WorkoutCopy};
use crate::repositories::{UserRepository, WorkoutRepository};

#[derive(Clone)]
pub struct WorkoutsState {
    pub workout_repo: WorkoutRepository,
    pub user_repo: UserRepository,
}

#[derive(Deserialize)]
pub struct ToggleCompletion {
    pub concluido: bool,
}

fn validate_workout_input(nome: &str, dia_semana: &str, exercicios: &[CreateExercise]) -> Result<()> {
    if nome.trim().is_empty() {
        return Err(AppError::Validation(
            "Nome do treino é obrigatório".to_string(),
        ));
    }
    if !is_dia_semana(dia_semana) {
        return Err(AppError::Validation(
            "Dia da semana inválido".to_string(),
        ));
    }
    for ex in exercicios {
        if !is_cataloged(&ex.nome) {
            return Err(AppError::Validation(format!(
                "Exercício fora do catálogo: {}",
                ex.nome
            )));
        }
        if ex.series < 1 || ex.repeticoes < 1 {
            return Err(AppError::Validation(
                "Séries e repetições devem ser maiores que zero".to_string(),
            ));
        }
    }
    Ok(())
}

/// The student, when given, must be actively linked to this trainer.
async fn validate_assignment(
    user_repo: &UserRepository,
    personal_id: &str,
    aluno_id: Option<&str>,
) -> Result<()> {
    if let Some(aluno_id) = aluno_id {
        let aluno = user_repo.find_student(aluno_id).await?;
        let pertence = aluno
            .map(|a| a.is_active_student_of(personal_id))
            .unwrap_or(false);
        if !pertence {
            return Err(AppError::Validation(
                "Aluno não encontrado ou não pertence a este personal".to_string(),
            ));
        }
    }
    Ok(())
}

fn find_owned(workout: Workout, auth_user: &AuthUser, action: &str) -> Result<Workout> {
    // Ownership failures are reported as 404 so a trainer cannot probe
    // another trainer's workout ids.
    if !workout.owned_by(&auth_user.id) {
        return Err(AppError::NotFound(format!(
            "Treino não encontrado ou sem permissão para {action}"
        )));
    }
    Ok(workout)
}

/// GET /treinos/personal — every workout owned by the calling trainer.
pub async fn list_for_trainer(
    State(state): State<WorkoutsState>,
    auth_user: AuthUser,
) -> Result<Response> {
    if !auth_user.is_trainer() {
        return Err(AppError::Forbidden(
            "Acesso negado. Usuário não é um personal trainer".to_string(),
        ));
    }

    let treinos = state.workout_repo.find_by_trainer(&auth_user.id).await?;
    Ok(Json(treinos).into_response())
}

/// GET /treinos/aluno/{id} — a student's workouts, visible to the student
/// themself and to their current trainer.
pub async fn list_for_student(
    State(state): State<WorkoutsState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Response> {
    let autorizado = if auth_user.is_trainer() {
        state
            .user_repo
            .find_student(&id)
            .await?
            .map(|aluno| aluno.is_active_student_of(&auth_user.id))
            .unwrap_or(false)
    } else {
        auth_user.id == id
    };

    if !autorizado {
        return Err(AppError::Forbidden(
            "Sem permissão para acessar estes treinos".to_string(),
        ));
    }

    let treinos = state.workout_repo.find_by_student(&id).await?;
    Ok(Json(treinos).into_response())
}

/// POST /treinos
pub async fn create(
    State(state): State<WorkoutsState>,
    auth_user: AuthUser,
    Json(body): Json<CreateWorkout>,
) -> Result<Response> {
    if !auth_user.is_trainer() {
        return Err(AppError::Forbidden(
            "Apenas personal trainers podem criar treinos".to_string(),
        ));
    }

    validate_workout_input(&body.nome, &body.dia_semana, &body.exercicios)?;
    validate_assignment(&state.user_repo, &auth_user.id, body.aluno_id.as_deref()).await?;

    let treino = state
        .workout_repo
        .create(
            &auth_user.id,
            &body.nome,
            &body.dia_semana,
            body.aluno_id,
            body.exercicios,
        )
        .await?;

    tracing::debug!(treino_id = %treino.id, "workout created");

    Ok((StatusCode::CREATED, Json(treino)).into_response())
}

/// GET /treinos/{id}
pub async fn show(
    State(state): State<WorkoutsState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Response> {
    let treino = state
        .workout_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Treino não encontrado".to_string()))?;

    if !treino.readable_by(&auth_user.id) {
        return Err(AppError::Forbidden(
            "Sem permissão para acessar este treino".to_string(),
        ));
    }

    Ok(Json(treino).into_response())
}

/// PUT /treinos/{id}
pub async fn update(
    State(state): State<WorkoutsState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<CreateWorkout>,
) -> Result<Response> {
    let treino = state
        .workout_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound("Treino não encontrado ou sem permissão para editar".to_string())
        })?;
    let treino = find_owned(treino, &auth_user, "editar")?;

    validate_workout_input(&body.nome, &body.dia_semana, &body.exercicios)?;
    validate_assignment(&state.user_repo, &auth_user.id, body.aluno_id.as_deref()).await?;

    let atualizado = state
        .workout_repo
        .update(
            &treino.id,
            &body.nome,
            &body.dia_semana,
            body.aluno_id,
            body.exercicios,
        )
        .await?;

    Ok(Json(atualizado).into_response())
}

/// DELETE /treinos/{id}
pub async fn delete(
    State(state): State<WorkoutsState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Response> {
    let treino = state
        .workout_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound("Treino não encontrado ou sem permissão para excluir".to_string())
        })?;
    let treino = find_owned(treino, &auth_user, "excluir")?;

    state.workout_repo.delete(&treino.id).await?;

    Ok(Json(json!({ "mensagem": "Treino excluído com sucesso" })).into_response())
}

/// PATCH /treinos/{treino_id}/exercicios/{exercicio_id}/concluir
pub async fn toggle_completion(
    State(state): State<WorkoutsState>,
    auth_user: AuthUser,
    Path((treino_id, exercicio_id)): Path<(String, String)>,
    Json(body): Json<ToggleCompletion>,
) -> Result<Response> {
    let treino = state
        .workout_repo
        .find_by_id(&treino_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Treino não encontrado".to_string()))?;

    if !treino.completion_editable_by(&auth_user.id) {
        return Err(AppError::Forbidden(
            "Sem permissão para marcar exercício como concluído".to_string(),
        ));
    }

    let exercicio = state
        .workout_repo
        .set_exercise_completion(&treino_id, &exercicio_id, body.concluido)
        .await?
        .ok_or_else(|| {
            AppError::NotFound("Exercício não encontrado neste treino".to_string())
        })?;

    Ok(Json(exercicio).into_response())
}

/// POST /treinos/{id}/resetar-conclusao
pub async fn reset_completion(
    State(state): State<WorkoutsState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Response> {
    let treino = state
        .workout_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Treino não encontrado".to_string()))?;

    if !treino.completion_editable_by(&auth_user.id) {
        return Err(AppError::Forbidden(
            "Sem permissão para resetar este treino".to_string(),
        ));
    }

    state.workout_repo.reset_completion(&id).await?;

    let atualizado = state
        .workout_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Treino não encontrado".to_string()))?;

    Ok(Json(atualizado).into_response())
}

/// GET /treinos/{id}/copiar — detached projection for client-side reuse.
pub async fn copy(
    State(state): State<WorkoutsState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Response> {
    let treino = state
        .workout_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Treino não encontrado".to_string()))?;

    if !treino.owned_by(&auth_user.id) {
        return Err(AppError::Forbidden(
            "Sem permissão para copiar este treino".to_string(),
        ));
    }

    Ok(Json(WorkoutCopy::from_workout(&treino)).into_response())
}
