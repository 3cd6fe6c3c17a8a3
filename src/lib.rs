pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod domain;
pub mod engine;
pub mod jobs;
pub mod notifications;
pub mod requests;
pub mod resources;
pub mod shared;
