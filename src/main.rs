use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use treino_api::config::Config;
use treino_api::db;
use treino_api::handlers::{auth, users, workouts};
use treino_api::migrations::run_migrations;
use treino_api::repositories::{UserRepository, WorkoutRepository};
use treino_api::routes;
use treino_api::token::TokenKeys;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "treino_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    tracing::info!("Connecting to database: {}", config.database_url);

    let pool = db::create_pool(&config.database_url)?;
    run_migrations(&pool)?;

    let keys = TokenKeys::from_secret(&config.jwt_secret);

    let user_repo = UserRepository::new(pool.clone());
    let workout_repo = WorkoutRepository::new(pool.clone());

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

    let app = routes::create_router(auth_state, users_state, workouts_state, keys);

    let addr = config.server_addr();
    tracing::info!("Starting server at http://{}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
