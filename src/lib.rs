pub mod ads;
pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod routes;
pub mod token_store;
pub mod webhook;
