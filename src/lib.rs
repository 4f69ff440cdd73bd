pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod identity;
pub mod models;
pub mod schedule;
pub mod services;
pub mod state;
