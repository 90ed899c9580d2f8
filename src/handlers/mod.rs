pub mod auth;
pub mod users;
pub mod workouts;
