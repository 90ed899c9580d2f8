pub mod exercise;
pub mod from_row;
pub mod user;
pub mod workout;

pub use exercise::{is_cataloged, CreateExercise, Exercise, CATALOGO_EXERCICIOS};
pub use from_row::FromSqliteRow;
pub use user::{
    LoginRequest, RegisterRequest, StudentSummary, User, UserRole, UserSummary,
};
pub use workout::{
    CreateWorkout, Workout, WorkoutCopy, WorkoutCopyExercise, DIAS_SEMANA,
};
