pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod migrations;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod token;
