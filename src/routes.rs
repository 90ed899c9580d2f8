use axum::{
    routing::{delete, get, patch, post},
    Extension, Router,
};

use crate::handlers::{auth, users, workouts};
use crate::token::TokenKeys;

pub fn create_router(
    auth_state: auth::AuthState,
    users_state: users::UsersState,
    workouts_state: workouts::WorkoutsState,
    keys: TokenKeys,
) -> Router {
    Router::new()
        // Auth routes
        .route("/auth/registro", post(auth::register))
        .route("/auth/login", post(auth::login))
        .with_state(auth_state)
        // Workout routes
        .route("/treinos/personal", get(workouts::list_for_trainer))
        .route("/treinos/aluno/{id}", get(workouts::list_for_student))
        .route("/treinos", post(workouts::create))
        .route(
            "/treinos/{id}",
            get(workouts::show)
                .put(workouts::update)
                .delete(workouts::delete),
        )
        .route(
            "/treinos/{treino_id}/exercicios/{exercicio_id}/concluir",
            patch(workouts::toggle_completion),
        )
        .route(
            "/treinos/{id}/resetar-conclusao",
            post(workouts::reset_completion),
        )
        .route("/treinos/{id}/copiar", get(workouts::copy))
        .with_state(workouts_state)
        // User / linkage routes
        .route("/usuarios/alunos", get(users::list_students))
        .route("/usuarios/alunos/inativos", get(users::list_inactive_students))
        .route("/usuarios/aluno/{id}", get(users::get_student))
        .route("/usuarios/alunos/{id}", delete(users::unlink_student))
        .route(
            "/usuarios/alunos/{id}/reativar",
            post(users::reactivate_student),
        )
        .with_state(users_state)
        // Token keys via Extension layer
        .layer(Extension(keys))
}
