pub mod commands;
pub mod config;
pub mod controller;
pub mod handlers;
pub mod models;
pub mod presentation;
pub mod repository;
pub mod routes;
pub mod state;
pub mod store;
pub mod utils;
