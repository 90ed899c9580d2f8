#![allow(dead_code)] // Each test binary uses a subset of these helpers

use axum::body::Body;
use axum::response::Response;
use axum::Router;
use http::{header, Request};
use http_body_util::BodyExt;
use serde_json::Value;

use treino_api::db::{create_memory_pool, DbPool};
use treino_api::handlers::{auth, users, workouts};
use treino_api::migrations::run_migrations_for_tests;
use treino_api::models::{User, UserRole};
use treino_api::repositories::{UserRepository, WorkoutRepository};
use treino_api::routes::create_router;
use treino_api::token::TokenKeys;

pub const TEST_SECRET: &str = "segredo-de-teste";

pub fn setup_test_db() -> DbPool {
    let pool = create_memory_pool().expect("Failed to create test database");
    run_migrations_for_tests(&pool).expect("Failed to run migrations");
    pool
}

pub struct TestApp {
    pub router: Router,
    pub keys: TokenKeys,
}

pub fn create_test_app(pool: DbPool) -> TestApp {
    let user_repo = UserRepository::new(pool.clone());
    let workout_repo = WorkoutRepository::new(pool.clone());
    let keys = TokenKeys::from_secret(TEST_SECRET);

    let auth_state = auth::AuthState {
        user_repo: user_repo.clone(),
    };
    let users_state = users::UsersState {
        user_repo: user_repo.clone(),
        workout_repo: workout_repo.clone(),
    };
    let workouts_state = workouts::WorkoutsState {
        user_repo,
        workout_repo,
    };

    let router = create_router(auth_state, users_state, workouts_state, keys.clone());

    TestApp { router, keys }
}

pub async fn create_test_trainer(pool: &DbPool, nome: &str, email: &str) -> User {
    let repo = UserRepository::new(pool.clone());
    let codigo = repo.generate_unique_code().await.unwrap();
    repo.create(nome, email, "senha123", UserRole::Trainer, Some(codigo), None)
        .await
        .unwrap()
}

pub async fn create_test_student(pool: &DbPool, nome: &str, email: &str, personal_id: &str) -> User {
    let repo = UserRepository::new(pool.clone());
    repo.create(
        nome,
        email,
        "senha123",
        UserRole::Student,
        None,
        Some(personal_id.to_string()),
    )
    .await
    .unwrap()
}

pub fn bearer(keys: &TokenKeys, user: &User) -> String {
    format!("Bearer {}", keys.sign(user).unwrap())
}

pub fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, token);
    }
    match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
